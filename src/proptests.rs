use super::*;

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

fn validate_tree<V>(t: &RadixTree<V>) {
    let issues = t.verify_integrity();
    assert!(issues.is_empty(), "integrity issues: {:?}\n{}", issues, t.dump());
}

/// Smallest `len >= floor` at which every truncated key is distinct.
fn brute_minimal_length(keys: &BTreeSet<Vec<u8>>, floor: usize) -> usize {
    let longest = keys.iter().map(Vec::len).max().unwrap_or(0);
    (floor..=longest.max(floor))
        .find(|&len| {
            let truncated: BTreeSet<&[u8]> = keys.iter().map(|k| &k[..len.min(k.len())]).collect();
            truncated.len() == keys.len()
        })
        .unwrap_or(longest + 1)
}

fn hex_key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Narrow alphabet and short keys so shared prefixes and prefix keys are common.
    prop::collection::vec(prop::sample::select(b"012a".to_vec()), 0..=8)
}

fn wide_key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Large fanout at a few positions, to reach Node48 and Node256.
    (any::<u8>(), any::<u8>(), prop::collection::vec(any::<u8>(), 0..=3)).prop_map(|(a, b, rest)| {
        let mut key = vec![b'k', a % 4, b];
        key.extend(rest);
        key
    })
}

fn uuid_key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // Normalized UUIDs sharing a long run, so inline prefixes get truncated.
    (0usize..32, any::<u128>()).prop_map(|(shared, bits)| {
        let id = uuid::Uuid::from_u128(bits).to_string();
        let mut key = key::normalize(&id);
        for b in key.iter_mut().take(shared) {
            *b = b'0';
        }
        key
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_minimal_length_is_unique_and_minimal(
        keys in prop::collection::btree_set(hex_key_strategy(), 0..=64),
        floor in 0usize..6,
    ) {
        let mut t: RadixTree<()> = RadixTree::new();
        for key in &keys {
            prop_assert!(t.insert(key, ()));
        }
        validate_tree(&t);
        prop_assert_eq!(t.minimal_length(floor), brute_minimal_length(&keys, floor));
    }

    #[test]
    fn prop_minimal_length_uuid_keys(
        keys in prop::collection::btree_set(uuid_key_strategy(), 1..=128),
        floor in 0usize..10,
    ) {
        let mut t: RadixTree<usize> = RadixTree::new();
        for (i, key) in keys.iter().enumerate() {
            prop_assert!(t.insert(key, i));
        }
        validate_tree(&t);

        let len = t.minimal_length(floor);
        prop_assert!(len >= floor);
        prop_assert_eq!(len, brute_minimal_length(&keys, floor));
    }

    #[test]
    fn prop_for_each_matches_model(
        keys in prop::collection::vec(
            prop_oneof![hex_key_strategy(), wide_key_strategy()],
            0..=400,
        ),
    ) {
        let mut t: RadixTree<usize> = RadixTree::new();
        let mut m: BTreeMap<Vec<u8>, usize> = BTreeMap::new();

        for (i, key) in keys.into_iter().enumerate() {
            let fresh = !m.contains_key(&key);
            prop_assert_eq!(t.insert(&key, i), fresh);
            m.entry(key).or_insert(i);
            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let mut got: Vec<(Vec<u8>, usize)> = Vec::new();
        t.for_each(|k, v| got.push((k.to_vec(), *v)));
        let expected: Vec<(Vec<u8>, usize)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);

        for (k, v) in &m {
            prop_assert_eq!(t.get(k), Some(v));
        }
    }

    #[test]
    fn prop_reinsert_is_noop(
        keys in prop::collection::vec(
            prop_oneof![hex_key_strategy(), uuid_key_strategy()],
            0..=100,
        ),
    ) {
        let mut once: RadixTree<usize> = RadixTree::new();
        let mut twice: RadixTree<usize> = RadixTree::new();
        for (i, key) in keys.iter().enumerate() {
            once.insert(key, i);
            twice.insert(key, i);
            twice.insert(key, i + 1_000);
        }

        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.stats(), twice.stats());
        prop_assert_eq!(once.dump(), twice.dump());
        prop_assert_eq!(once.minimal_length(0), twice.minimal_length(0));

        let mut a = Vec::new();
        once.for_each(|k, v| a.push((k.to_vec(), *v)));
        let mut b = Vec::new();
        twice.for_each(|k, v| b.push((k.to_vec(), *v)));
        prop_assert_eq!(a, b);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"ab".to_vec(),
        b"aab".to_vec(),
        b"aaab".to_vec(),
        b"ba".to_vec(),
    ];
    let set: BTreeSet<Vec<u8>> = keys.iter().cloned().collect();
    let expected: Vec<Vec<u8>> = set.iter().cloned().collect();

    for_each_permutation(&keys, |perm| {
        let mut t: RadixTree<()> = RadixTree::new();
        for k in &perm {
            assert!(t.insert(k, ()));
        }

        validate_tree(&t);
        let mut got = Vec::new();
        t.for_each(|k, _| got.push(k.to_vec()));
        assert_eq!(got, expected, "insertion order {:?}", perm);
        assert_eq!(t.minimal_length(0), brute_minimal_length(&set, 0));
    });
}
