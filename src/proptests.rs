use super::*;

use alloc::vec::Vec;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Put(i64, u32),
    Insert(i64, u32),
    Get(i64),
    Remove(i64),
    ContainsKey(i64),
    Clear,
    Shrink,
}

fn validate_map<V>(map: &LongMap<V>) {
    map.validate_table();
    assert_eq!(map.keys().count(), map.len(), "len must match enumerated entries");
    assert_eq!(map.keys().len(), map.values().count());
}

fn key_strategy() -> impl Strategy<Value = i64> + Clone {
    // Small keys collide often; wide keys exercise the high-half fold.
    prop_oneof![
        4 => -4i64..300,
        1 => any::<i64>(),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let k = key_strategy();
    let op = prop_oneof![
        6 => (k.clone(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
        3 => (k.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => k.clone().prop_map(Op::Get),
        3 => k.clone().prop_map(Op::Remove),
        2 => k.prop_map(Op::ContainsKey),
        1 => Just(Op::Clear),
        1 => Just(Op::Shrink),
    ];
    prop::collection::vec(op, 0..400)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_std(ops in ops_strategy()) {
        let mut map: LongMap<u32> = LongMap::new();
        let mut reference: HashMap<i64, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(key, value) => {
                    let got = map.put(key, value).map(|v| *v);
                    if key < 0 {
                        prop_assert!(got.is_err());
                    } else {
                        prop_assert_eq!(got, Ok(value));
                        reference.insert(key, value);
                    }
                }
                Op::Insert(key, value) => {
                    let got = map.insert(key, value);
                    if key < 0 {
                        prop_assert!(got.unwrap_err().is_invalid_key());
                    } else {
                        prop_assert_eq!(got, Ok(reference.insert(key, value)));
                    }
                }
                Op::Get(key) => {
                    let got = map.get(key).map(|v| v.copied());
                    if key < 0 {
                        prop_assert!(got.is_err());
                    } else {
                        prop_assert_eq!(got, Ok(reference.get(&key).copied()));
                    }
                }
                Op::Remove(key) => {
                    let allocated = key >= 0 && map.is_bucket_allocated(key);
                    match map.remove(key) {
                        Ok(removed) => {
                            prop_assert!(allocated);
                            prop_assert_eq!(removed, reference.remove(&key));
                        }
                        Err(Error::NoSuchBucket { key: k, .. }) => {
                            prop_assert!(!allocated);
                            prop_assert_eq!(k, key);
                            prop_assert!(!reference.contains_key(&key));
                        }
                        Err(Error::InvalidKey(_)) => {
                            prop_assert!(key < 0);
                        }
                    }
                }
                Op::ContainsKey(key) => {
                    let got = map.contains_key(key);
                    if key < 0 {
                        prop_assert!(got.is_err());
                    } else {
                        prop_assert_eq!(got, Ok(reference.contains_key(&key)));
                    }
                }
                Op::Clear => {
                    let capacity = map.capacity();
                    map.clear();
                    reference.clear();
                    prop_assert_eq!(map.capacity(), capacity);
                }
                Op::Shrink => map.shrink_to_fit(),
            }

            prop_assert_eq!(map.len(), reference.len());
            prop_assert_eq!(map.is_empty(), reference.is_empty());
        }

        validate_map(&map);
        let mut got: Vec<(i64, u32)> = map.iter().map(|(k, v)| (k, *v)).collect();
        let mut expected: Vec<(i64, u32)> = reference.into_iter().collect();
        got.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_put_then_get(key in 0i64..=i64::MAX, value in any::<u64>()) {
        let mut map = LongMap::new();
        map.put(key, value).unwrap();
        prop_assert_eq!(map.get(key).unwrap(), Some(&value));
    }

    #[test]
    fn prop_two_keys_then_remove_one(
        k1 in 0i64..=i64::MAX,
        k2 in 0i64..=i64::MAX,
        v1 in any::<u8>(),
        v2 in any::<u8>(),
    ) {
        prop_assume!(k1 != k2);
        let mut map = LongMap::new();
        map.put(k1, v1).unwrap();
        map.put(k2, v2).unwrap();
        prop_assert_eq!(map.len(), 2);

        prop_assert_eq!(map.remove(k1).unwrap(), Some(v1));
        prop_assert!(!map.contains_key(k1).unwrap());
        prop_assert!(map.contains_key(k2).unwrap());
    }

    #[test]
    fn prop_overwrite_keeps_len(key in 0i64..1000, v1 in any::<i32>(), v2 in any::<i32>()) {
        let mut map = LongMap::new();
        map.put(key, v1).unwrap();
        let len = map.len();
        map.put(key, v2).unwrap();
        prop_assert_eq!(map.len(), len);
        prop_assert_eq!(map.get(key).unwrap(), Some(&v2));
    }

    #[test]
    fn prop_clear_forgets_everything(keys in prop::collection::vec(0i64..10_000, 0..200)) {
        let mut map = LongMap::new();
        for &key in &keys {
            map.put(key, ()).unwrap();
        }
        map.clear();
        prop_assert_eq!(map.len(), 0);
        prop_assert!(map.is_empty());
        for &key in &keys {
            prop_assert!(!map.contains_key(key).unwrap());
        }
    }

    #[test]
    fn prop_negative_keys_rejected(key in i64::MIN..0) {
        let mut map: LongMap<()> = LongMap::new();
        prop_assert!(map.put(key, ()).unwrap_err().is_invalid_key());
        prop_assert!(map.get(key).unwrap_err().is_invalid_key());
        prop_assert!(map.contains_key(key).unwrap_err().is_invalid_key());
        prop_assert!(map.remove(key).unwrap_err().is_invalid_key());
        prop_assert!(map.is_empty());
    }
}

#[test]
fn growth_keeps_every_key_retrievable() {
    let mut map = LongMap::new();
    for key in 0..100i64 {
        map.put(key, key * 7).unwrap();
        validate_map(&map);
    }
    // 16 -> 32 -> 64 -> 128 -> 256
    assert_eq!(map.capacity(), 256);
    for key in 0..100i64 {
        assert_eq!(map.get(key).unwrap(), Some(&(key * 7)));
    }
}
