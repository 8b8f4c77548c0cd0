use core::hash::BuildHasher;
use core::hash::Hash;
use core::ptr::NonNull;

/// Produces the 32-bit hash a [`RobinHoodTable`] stores next to each entry.
///
/// Implementations must be stable: equal keys (as decided by the table's
/// [`KeyEq`] strategy) must always hash to the same value. Any value is
/// acceptable, including 0; the table remaps 0 internally.
///
/// [`RobinHoodTable`]: crate::RobinHoodTable
pub trait KeyHasher<K: ?Sized> {
    /// Hashes `key` to 32 bits.
    fn hash_key(&self, key: &K) -> u32;
}

/// Decides whether two keys with equal hashes are the same key.
pub trait KeyEq<K: ?Sized> {
    /// Returns `true` if `a` and `b` denote the same key.
    fn key_eq(&self, a: &K, b: &K) -> bool;
}

/// Key equality through [`PartialEq`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StdEq;

impl<K: PartialEq + ?Sized> KeyEq<K> for StdEq {
    #[inline(always)]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline(always)]
fn mix_block(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline(always)]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// MurmurHash3, x86 32-bit variant, over `bytes`.
pub fn murmur3_32(bytes: &[u8], seed: u32) -> u32 {
    let mut h = seed;

    let mut blocks = bytes.chunks_exact(4);
    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= mix_block(k);
        h = h.rotate_left(13).wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, &byte) in tail.iter().enumerate() {
            k |= (byte as u32) << (8 * i);
        }
        h ^= mix_block(k);
    }

    // Only the low 32 bits of the length are mixed in.
    h ^= bytes.len() as u32;
    fmix32(h)
}

/// Hashes byte-like keys (`str`, `String`, `[u8]`, ...) with MurmurHash3.
///
/// # Examples
///
/// ```rust
/// use robin_hood_table::hashing::KeyHasher;
/// use robin_hood_table::hashing::Murmur3;
///
/// let hasher = Murmur3::default();
/// assert_eq!(hasher.hash_key("abc"), 0xb3dd_93fa);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3 {
    seed: u32,
}

impl Murmur3 {
    /// Creates a hasher with the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self { seed }
    }

    /// Returns the seed mixed into every hash.
    pub const fn seed(&self) -> u32 {
        self.seed
    }
}

impl<K: AsRef<[u8]> + ?Sized> KeyHasher<K> for Murmur3 {
    #[inline]
    fn hash_key(&self, key: &K) -> u32 {
        murmur3_32(key.as_ref(), self.seed)
    }
}

/// Hashes pointer keys by address, for identity-keyed side tables.
///
/// Two keys are the same exactly when they point at the same address, so
/// pair it with [`StdEq`] on raw pointers or [`NonNull`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddressHasher {
    inner: Murmur3,
}

impl AddressHasher {
    /// Creates a hasher with the given seed.
    pub const fn with_seed(seed: u32) -> Self {
        Self {
            inner: Murmur3::with_seed(seed),
        }
    }

    #[inline]
    fn hash_addr(&self, addr: usize) -> u32 {
        murmur3_32(&addr.to_ne_bytes(), self.inner.seed())
    }
}

impl<T: ?Sized> KeyHasher<*const T> for AddressHasher {
    #[inline]
    fn hash_key(&self, key: &*const T) -> u32 {
        self.hash_addr(key.cast::<()>() as usize)
    }
}

impl<T: ?Sized> KeyHasher<*mut T> for AddressHasher {
    #[inline]
    fn hash_key(&self, key: &*mut T) -> u32 {
        self.hash_addr(key.cast::<()>() as usize)
    }
}

impl<T: ?Sized> KeyHasher<NonNull<T>> for AddressHasher {
    #[inline]
    fn hash_key(&self, key: &NonNull<T>) -> u32 {
        self.hash_addr(key.cast::<()>().as_ptr() as usize)
    }
}

/// Adapts a [`BuildHasher`] to [`KeyHasher`] by folding its 64-bit output
/// down to 32 bits.
///
/// # Examples
///
/// ```rust
/// use robin_hood_table::RobinHoodTable;
/// use robin_hood_table::hashing::FoldedHasher;
///
/// # #[cfg(feature = "std")]
/// # {
/// let hasher = FoldedHasher::new(std::hash::RandomState::new());
/// let mut table: RobinHoodTable<u64, &str, _> = RobinHoodTable::with_hasher(hasher);
/// table.put(7, "seven");
/// assert_eq!(table.get(&7), Some(&"seven"));
/// # }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldedHasher<S> {
    hash_builder: S,
}

impl<S> FoldedHasher<S> {
    /// Wraps `hash_builder`.
    pub const fn new(hash_builder: S) -> Self {
        Self { hash_builder }
    }

    /// Returns the wrapped hasher builder.
    pub fn hash_builder(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, S> KeyHasher<K> for FoldedHasher<S>
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(&self, key: &K) -> u32 {
        let hash = self.hash_builder.hash_one(key);
        (hash ^ (hash >> 32)) as u32
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher used when a table is built without an explicit one.
        pub type DefaultKeyHasher = FoldedHasher<foldhash::fast::RandomState>;
    } else if #[cfg(feature = "std")] {
        /// The hasher used when a table is built without an explicit one.
        pub type DefaultKeyHasher = FoldedHasher<std::hash::RandomState>;
    } else {
        /// The hasher used when a table is built without an explicit one.
        pub type DefaultKeyHasher = Murmur3;
    }
}
