#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(all(test, not(feature = "std")))]
extern crate std;

/// A Robin Hood hash table with backward-shift deletion.
///
/// This module provides [`RobinHoodTable`], its entry API and iterators, and
/// (with the `stats` feature) probe-distance diagnostics.
pub mod hash_table;

/// Key hashing and equality strategies.
///
/// A table is parameterized by a [`KeyHasher`] producing the 32-bit hash
/// stored in every slot and a [`KeyEq`] resolving collisions.
///
/// [`KeyHasher`]: hashing::KeyHasher
/// [`KeyEq`]: hashing::KeyEq
pub mod hashing;

mod hash_table_proptest;

pub use hash_table::Entry;
pub use hash_table::RobinHoodTable;
pub use hashing::KeyEq;
pub use hashing::KeyHasher;
