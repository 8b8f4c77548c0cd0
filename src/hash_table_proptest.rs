#![cfg(test)]

// Property tests for RobinHoodTable, checked against std's HashMap with the
// Robin Hood order re-derived from stored hashes after every operation.

use std::collections::HashMap;
use std::string::String;
use std::vec::Vec;

use proptest::prelude::*;

use crate::hash_table::RobinHoodTable;
use crate::hashing::KeyHasher;
use crate::hashing::Murmur3;

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Upsert(usize, i32),
    Retain(i32),
    Reserve(usize),
    Iterate,
}

fn arb_ops(pool_len: usize) -> impl Strategy<Value = Vec<Op>> {
    let idx = 0..pool_len;
    let op = prop_oneof![
        4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
        3 => idx.clone().prop_map(Op::Remove),
        2 => idx.clone().prop_map(Op::Get),
        1 => (idx, any::<i32>()).prop_map(|(i, d)| Op::Upsert(i, d)),
        1 => (2..5i32).prop_map(Op::Retain),
        1 => (0..40usize).prop_map(Op::Reserve),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..200)
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::hash_set("[a-z]{0,6}", 1..=48).prop_flat_map(|pool| {
        let pool: Vec<String> = pool.into_iter().collect();
        arb_ops(pool.len()).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Keeps only the masked bits of a Murmur3 hash, so keys collide constantly
/// and some hash to 0.
#[derive(Clone, Copy)]
struct MaskedHasher {
    mask: u32,
}

impl KeyHasher<u32> for MaskedHasher {
    fn hash_key(&self, key: &u32) -> u32 {
        Murmur3::default().hash_key(&key.to_le_bytes()) & self.mask
    }
}

fn run_ops<K, H>(
    table: &mut RobinHoodTable<K, i32, H>,
    pool: &[K],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    K: Clone + Eq + core::hash::Hash + core::fmt::Debug,
    H: KeyHasher<K>,
{
    let mut model: HashMap<K, i32> = HashMap::new();

    for op in ops {
        let capacity_before = table.capacity();
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let present = model.contains_key(&k);
                prop_assert_eq!(table.put(k.clone(), v), model.insert(k, v));
                if present {
                    prop_assert_eq!(table.capacity(), capacity_before, "update never grows");
                }
            }
            Op::Remove(i) => {
                prop_assert_eq!(table.remove(&pool[i]), model.remove(&pool[i]));
                prop_assert_eq!(table.capacity(), capacity_before, "remove never shrinks");
            }
            Op::Get(i) => {
                prop_assert_eq!(table.get(&pool[i]), model.get(&pool[i]));
            }
            Op::Upsert(i, d) => {
                let k = pool[i].clone();
                let present = model.contains_key(&k);
                let slot = table.entry(k.clone()).or_insert(0);
                *slot = slot.wrapping_add(d);
                let expected = model.entry(k).or_insert(0);
                *expected = expected.wrapping_add(d);
                prop_assert_eq!(*slot, *expected);
                if present {
                    prop_assert_eq!(table.capacity(), capacity_before, "update never grows");
                }
            }
            Op::Retain(m) => {
                table.retain(|_, v| *v % m != 0);
                model.retain(|_, v| *v % m != 0);
            }
            Op::Reserve(n) => {
                table.reserve(n);
                prop_assert!(table.len() + n <= table.capacity() * 85 / 100);
            }
            Op::Iterate => {
                let mut seen: HashMap<K, i32> = HashMap::new();
                for (k, v) in table.iter() {
                    prop_assert!(seen.insert(k.clone(), *v).is_none(), "key yielded twice");
                }
                prop_assert_eq!(&seen, &model);
            }
        }

        table.assert_invariants();
        prop_assert_eq!(table.len(), model.len());
        prop_assert!(table.capacity().is_power_of_two());
        let capacity = table.capacity();
        prop_assert!(
            capacity == capacity_before || capacity / capacity_before >= 2,
            "capacity {} -> {} is not a doubling",
            capacity_before,
            capacity
        );
    }

    for (k, v) in &model {
        prop_assert_eq!(table.get(k), Some(v));
    }
    Ok(())
}

// Property: state-machine equivalence with std::collections::HashMap.
// - put/remove/get/entry agree with the model, including returned values.
// - Robin Hood order and the used count hold after every operation.
// - Capacity stays a power of two, only ever doubles, and never shrinks.
// - Iteration yields each live entry exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut table: RobinHoodTable<String, i32, Murmur3> = RobinHoodTable::with_capacity(2);
        run_ops(&mut table, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_colliding(
        mask in prop_oneof![Just(0u32), Just(1), Just(7), Just(0x3f)],
        ops in arb_ops(64),
    ) {
        let pool: Vec<u32> = (0..64).collect();
        let mut table: RobinHoodTable<u32, i32, MaskedHasher> =
            RobinHoodTable::with_capacity_and_hasher(1, MaskedHasher { mask });
        run_ops(&mut table, &pool, ops)?;
    }

    #[test]
    fn prop_drain_returns_everything(pairs in proptest::collection::vec((0u32..500, any::<i32>()), 0..300)) {
        let mut table: RobinHoodTable<u32, i32, MaskedHasher> =
            RobinHoodTable::with_capacity_and_hasher(16, MaskedHasher { mask: u32::MAX });
        let mut model: HashMap<u32, i32> = HashMap::new();
        for (k, v) in pairs {
            table.put(k, v);
            model.insert(k, v);
        }

        let capacity = table.capacity();
        let drained: HashMap<u32, i32> = table.drain().collect();
        prop_assert_eq!(drained, model);
        prop_assert!(table.is_empty());
        prop_assert_eq!(table.capacity(), capacity);
        table.assert_invariants();
    }
}
