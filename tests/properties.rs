//! Model tests: random operation sequences checked against `BTreeMap`.

use std::collections::BTreeMap;

use proptest::prelude::*;
use skiplist::SkipList;

#[derive(Debug, Clone)]
enum Op {
    Put(Vec<u8>, u32),
    Remove(Vec<u8>),
    Get(Vec<u8>),
}

// short keys over a small alphabet so operations collide often
fn key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0u8..4, 0..4)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (key(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        2 => key().prop_map(Op::Remove),
        1 => key().prop_map(Op::Get),
    ]
}

proptest! {
    #[test]
    fn matches_btreemap(seed in any::<u64>(), ops in prop::collection::vec(op(), 0..200)) {
        let mut list = SkipList::with_seed(seed);
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    let entry = list.put(k.clone(), v);
                    prop_assert_eq!(entry.key(), k.as_slice());
                    prop_assert_eq!(*entry.value(), v);
                    model.insert(k, v);
                }
                Op::Remove(k) => {
                    let removed = list.remove(&k).map(|e| e.into_parts());
                    prop_assert_eq!(removed, model.remove_entry(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(list.get(&k).map(|e| *e.value()), model.get(&k).copied());
                    prop_assert_eq!(list.exists(&k), model.contains_key(&k));
                }
            }
            prop_assert_eq!(list.len(), model.len());
        }

        let actual: Vec<(Vec<u8>, u32)> = list.iter().map(|(k, v)| (k.to_vec(), *v)).collect();
        let expected: Vec<(Vec<u8>, u32)> = model.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn walk_from_front_is_strictly_ascending(keys in prop::collection::vec(any::<Vec<u8>>(), 0..100)) {
        let list: SkipList<()> = keys.iter().map(|k| (k.clone(), ())).collect();

        let mut walked = Vec::new();
        let mut cursor = list.front();
        while let Some(entry) = cursor {
            walked.push(entry.key().to_vec());
            cursor = entry.next();
        }

        prop_assert!(walked.windows(2).all(|w| w[0] < w[1]));
        let mut distinct = keys.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(walked, distinct);
    }

    #[test]
    fn put_twice_keeps_last_value(k in key(), v1 in any::<u32>(), v2 in any::<u32>()) {
        let mut list = SkipList::with_seed(0);
        list.put(k.clone(), v1);
        list.put(k.clone(), v2);
        prop_assert_eq!(list.len(), 1);
        prop_assert_eq!(list.get(&k).map(|e| *e.value()), Some(v2));
    }
}
