#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::rc::Rc;

use common::{shared_list, shared_map, MapDetector, Pool, StrDetector};
use dirtywatch_core::{Identity, OrderedWatchIndex};
use proptest::prelude::*;

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn names(indices: &[usize]) -> Vec<&'static str> {
    indices.iter().map(|i| NAMES[*i]).collect()
}

fn sequence() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..NAMES.len(), 0..12)
}

#[derive(Debug, Clone)]
enum IndexOp {
    Insert(u16),
    Remove(u16),
    RemoveRange(u16, u16),
}

fn index_op() -> impl Strategy<Value = IndexOp> {
    prop_oneof![
        (0u16..200).prop_map(IndexOp::Insert),
        (0u16..200).prop_map(IndexOp::Remove),
        (0u16..200, 0u16..200).prop_map(|(a, b)| IndexOp::RemoveRange(a, b)),
    ]
}

proptest! {
    #[test]
    fn prop_index_agrees_with_btreemap(ops in prop::collection::vec(index_op(), 0..200)) {
        let mut index = OrderedWatchIndex::new();
        let mut model = BTreeMap::new();
        for op in ops {
            match op {
                IndexOp::Insert(key) => {
                    let inserted = index.insert(key, key as u32).is_ok();
                    prop_assert_eq!(inserted, !model.contains_key(&key));
                    model.entry(key).or_insert(key as u32);
                }
                IndexOp::Remove(key) => {
                    prop_assert_eq!(index.remove(&key), model.remove(&key));
                }
                IndexOp::RemoveRange(from, to) => {
                    let doomed: Vec<u16> = if from < to {
                        model.range(from..to).map(|(k, _)| *k).collect()
                    } else {
                        Vec::new()
                    };
                    for key in &doomed {
                        model.remove(key);
                    }
                    prop_assert_eq!(index.remove_range(&from, &to), doomed.len());
                }
            }
            prop_assert_eq!(index.len(), model.len());
        }
        let entries: Vec<(u16, u32)> = index.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, u32)> = model.into_iter().collect();
        prop_assert_eq!(entries, expected);
    }

    #[test]
    fn prop_sequence_record_rebuilds_new_sequence(before in sequence(), after in sequence()) {
        let pool = Pool::new(&NAMES);
        let old = pool.list(&names(&before));
        let new = pool.list(&names(&after));
        let list = shared_list(old.clone());
        let mut detector = StrDetector::new();
        detector.register_sequence(list.clone(), 1, "list").unwrap();

        *list.borrow_mut() = new.clone();
        let records = detector.run_cycle();

        match records.sequences().head() {
            None => prop_assert_eq!(before, after),
            Some(record) => {
                let rebuilt = record.apply_to(&old).unwrap();
                prop_assert_eq!(rebuilt.len(), new.len());
                prop_assert!(rebuilt.iter().zip(&new).all(|(a, b)| a.same(b)));
            }
        }
    }

    #[test]
    fn prop_no_identity_is_both_added_and_removed(before in sequence(), after in sequence()) {
        let pool = Pool::new(&NAMES);
        let list = shared_list(pool.list(&names(&before)));
        let mut detector = StrDetector::new();
        detector.register_sequence(list.clone(), 1, "list").unwrap();

        *list.borrow_mut() = pool.list(&names(&after));
        let records = detector.run_cycle();

        if let Some(record) = records.sequences().head() {
            let added: HashSet<_> = record.additions().iter().map(|e| e.item().identity_key()).collect();
            let removed: HashSet<_> = record.removals().iter().map(|e| e.item().identity_key()).collect();
            prop_assert!(added.is_disjoint(&removed));

            let mut previous: Vec<usize> = record.removals().iter().filter_map(|e| e.previous_index()).collect();
            let sorted = { let mut p = previous.clone(); p.sort_unstable(); p };
            prop_assert_eq!(&previous, &sorted);
            previous.dedup();
            prop_assert_eq!(previous.len(), record.removals().len());
        }
    }

    #[test]
    fn prop_second_cycle_is_empty(before in sequence(), after in sequence(), value in 0u32..5) {
        let pool = Pool::new(&NAMES);
        let list = shared_list(pool.list(&names(&before)));
        let map = shared_map(&[("k", 0)]);
        let mut sequences = StrDetector::new();
        sequences.register_sequence(list.clone(), 1, "list").unwrap();
        let mut maps = MapDetector::new();
        maps.register_associative(map.clone(), 1, "map").unwrap();

        *list.borrow_mut() = pool.list(&names(&after));
        map.borrow_mut().insert("k", value);
        sequences.run_cycle();
        maps.run_cycle();

        prop_assert!(sequences.run_cycle().is_empty());
        prop_assert!(maps.run_cycle().is_empty());
    }

    #[test]
    fn prop_chains_are_strictly_ascending(ids in prop::collection::btree_set(0u32..1000, 1..40)) {
        let pool = Pool::new(&NAMES);
        let ids: Vec<u32> = ids.into_iter().rev().collect();
        let lists: Vec<_> = ids.iter().map(|_| shared_list(pool.list(&["a"]))).collect();
        let mut detector = StrDetector::new();
        for (id, list) in ids.iter().zip(&lists) {
            detector.register_sequence(list.clone(), *id, "list").unwrap();
        }
        for list in &lists {
            list.borrow_mut().push(pool.get("b"));
        }

        let emitted = detector.run_cycle().sequence_ids();
        prop_assert!(emitted.windows(2).all(|w| w[0] < w[1]));
        let expected: BTreeSet<u32> = ids.into_iter().collect();
        prop_assert_eq!(emitted, expected.into_iter().collect::<Vec<_>>());
    }
}

#[test]
fn test_fresh_allocations_never_match_pool() {
    let pool = Pool::new(&NAMES);
    let fresh: Rc<str> = Pool::fresh("a");
    assert!(!fresh.same(&pool.get("a")));
    assert!(pool.get("a").same(&pool.get("a")));
}
