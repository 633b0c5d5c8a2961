#![cfg(test)]

// Property tests for both map variants kept inside the crate so they can
// drive the shared `KeyValueMap` contract and the open-address internals.

use crate::{ChainedHashMap, KeyValueMap, MapError, OpenHashMap, SlotHash, SlotState};
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

// Every key lands in slot 0: one chain, or one probe cluster.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Colliding(String);
impl fmt::Debug for Colliding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl SlotHash for Colliding {
    fn slot_index(&self, _capacity: usize) -> usize {
        0
    }
}

// Pool-indexed operations shrink well: indices shrink toward earlier keys
// and op lists shrink in length. Pool keys never put stay as misses.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    Delete(usize),
    Contains(usize),
    Bump(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=10).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            1 => idx.clone().prop_map(Op::Get),
            2 => idx.clone().prop_map(Op::Delete),
            1 => idx.clone().prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Bump(i, d)),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// One step of the state machine against a hashbrown model.
// Invariants exercised after every op:
// - `put` returns the model's previous value; overwrite keeps `len`.
// - `get`/`contains` parity with the model; misses are `KeyNotFound`.
// - `delete` returns the stored value, then the key is absent.
// - `get_mut` updates are visible to later reads.
// - `items` yields each live entry exactly once.
fn apply<K, M>(
    sut: &mut M,
    model: &mut HashMap<K, i32>,
    pool: &[K],
    op: &Op,
) -> Result<(), TestCaseError>
where
    K: SlotHash + Hash + Eq + Ord + Clone + fmt::Debug,
    M: KeyValueMap<K, i32>,
{
    match *op {
        Op::Put(i, v) => {
            let k = pool[i].clone();
            let prev = sut
                .put(k.clone(), v)
                .map_err(|e| TestCaseError::fail(format!("put failed: {}", e)))?;
            prop_assert_eq!(prev, model.insert(k, v));
        }
        Op::Get(i) => {
            let k = &pool[i];
            match model.get(k) {
                Some(v) => prop_assert_eq!(sut.get(k), Ok(v)),
                None => prop_assert_eq!(sut.get(k), Err(MapError::KeyNotFound)),
            }
        }
        Op::Delete(i) => {
            let k = &pool[i];
            match model.remove(k) {
                Some(v) => prop_assert_eq!(sut.delete(k), Ok(v)),
                None => prop_assert_eq!(sut.delete(k), Err(MapError::KeyNotFound)),
            }
            prop_assert!(!sut.contains(k));
        }
        Op::Contains(i) => {
            prop_assert_eq!(sut.contains(&pool[i]), model.contains_key(&pool[i]));
        }
        Op::Bump(i, d) => {
            let k = &pool[i];
            match (sut.get_mut(k), model.get_mut(k)) {
                (Ok(v), Some(mv)) => {
                    *v = v.wrapping_add(d);
                    *mv = mv.wrapping_add(d);
                }
                (Err(MapError::KeyNotFound), None) => {}
                (s, m) => {
                    return Err(TestCaseError::fail(format!(
                        "get_mut disagrees with model: {:?} vs {:?}",
                        s, m
                    )))
                }
            }
        }
        Op::Iterate => {
            let seen: BTreeMap<K, i32> = sut.items().map(|(k, v)| (k.clone(), *v)).collect();
            let expected: BTreeMap<K, i32> =
                model.iter().map(|(k, v)| (k.clone(), *v)).collect();
            prop_assert_eq!(sut.keys().count(), model.len());
            prop_assert_eq!(seen, expected);
        }
    }
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    Ok(())
}

// Open-address bookkeeping checked after every op.
fn check_open_layout<K, V>(m: &OpenHashMap<K, V>, initial: usize) -> Result<(), TestCaseError> {
    let cap = m.capacity();
    prop_assert_eq!(cap % initial, 0);
    prop_assert!((cap / initial).is_power_of_two());
    prop_assert!(m.len() + m.tombstones() <= cap);
    prop_assert!(m.len() as f64 <= m.max_load_factor() * cap as f64 + 1.0);
    let tombstones = (0..cap)
        .filter(|&i| m.slot_state(i) == Some(SlotState::Tombstone))
        .count();
    let occupied = (0..cap)
        .filter(|&i| m.slot_state(i) == Some(SlotState::Occupied))
        .count();
    prop_assert_eq!(tombstones, m.tombstones());
    prop_assert_eq!(occupied, m.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_chained_matches_model((pool, ops) in arb_scenario(), cap in 1usize..16) {
        let mut sut: ChainedHashMap<String, i32> = ChainedHashMap::with_capacity(cap);
        let mut model = HashMap::new();
        for op in &ops {
            apply(&mut sut, &mut model, &pool, op)?;
        }
        prop_assert_eq!(sut.capacity(), cap);
    }

    #[test]
    fn prop_open_matches_model((pool, ops) in arb_scenario(), cap in 1usize..16) {
        let mut sut: OpenHashMap<String, i32> = OpenHashMap::with_capacity(cap);
        let mut model = HashMap::new();
        for op in &ops {
            apply(&mut sut, &mut model, &pool, op)?;
            check_open_layout(&sut, cap)?;
        }
    }

    #[test]
    fn prop_chained_matches_model_with_collisions((pool, ops) in arb_scenario(), cap in 1usize..16) {
        let pool: Vec<Colliding> = pool.into_iter().map(Colliding).collect();
        let mut sut: ChainedHashMap<Colliding, i32> = ChainedHashMap::with_capacity(cap);
        let mut model = HashMap::new();
        for op in &ops {
            apply(&mut sut, &mut model, &pool, op)?;
        }
        prop_assert_eq!(sut.chain_len(0), Some(sut.len()));
    }

    #[test]
    fn prop_open_matches_model_with_collisions((pool, ops) in arb_scenario(), cap in 1usize..16) {
        let pool: Vec<Colliding> = pool.into_iter().map(Colliding).collect();
        let mut sut: OpenHashMap<Colliding, i32> = OpenHashMap::with_capacity(cap);
        let mut model = HashMap::new();
        for op in &ops {
            apply(&mut sut, &mut model, &pool, op)?;
            check_open_layout(&sut, cap)?;
        }
    }

    // Property: a rebuild preserves every live entry. Growth-triggering puts
    // are interleaved with deletes so rebuilds see tombstones.
    #[test]
    fn prop_open_rebuild_preserves_content(
        ops in proptest::collection::vec((any::<bool>(), 0u16..256), 1..300),
        cap in 1usize..8,
    ) {
        let mut m: OpenHashMap<u16, u16> = OpenHashMap::with_capacity(cap);
        let mut model: HashMap<u16, u16> = HashMap::new();
        for (insert, k) in ops {
            let before = m.capacity();
            if insert {
                let v = k.wrapping_mul(3);
                m.put(k, v).map_err(|e| TestCaseError::fail(e.to_string()))?;
                model.insert(k, v);
            } else {
                let _ = m.delete(&k);
                model.remove(&k);
            }
            prop_assert!(m.capacity() >= before);
            if m.capacity() != before {
                prop_assert_eq!(m.capacity(), before * 2);
                prop_assert_eq!(m.tombstones(), 0);
            }
            for (k, v) in &model {
                prop_assert_eq!(m.get(k), Ok(v));
            }
            check_open_layout(&m, cap)?;
        }
    }
}
