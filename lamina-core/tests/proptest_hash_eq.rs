// lamina-core - Property-based tests for equality and hashing
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for hash/equality coherence:
//! - deep_equal(a, b) implies hash_code(a) == hash_code(b)
//! - unordered hashing is permutation-invariant
//! - cross-backend equality (list vs seq vs stack)
//! - sort stability

use proptest::prelude::*;

use lamina_core::{Collection, List, Map, Seq, Set, Stack, Value};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Int),
        "[a-z]{0,6}".prop_map(Value::string),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A list equals the seq and the stack over the same values, and all
    /// three hash identically.
    #[test]
    fn cross_backend_equality_and_hash(values in prop::collection::vec(arb_scalar(), 0..12)) {
        let list = List::from_values(values.clone());
        let seq = Seq::from_values(values.clone());
        let stack = Stack::from_values(values);
        prop_assert!(list.equals(&seq));
        prop_assert!(list.equals(&stack));
        prop_assert_eq!(list.hash_code(), seq.hash_code());
        prop_assert_eq!(list.hash_code(), stack.hash_code());
    }

    /// Insertion order does not affect unordered equality or hashing.
    #[test]
    fn unordered_permutation_invariance(by_key in prop::collection::btree_map(
        -50i64..50,
        arb_scalar(),
        0..10,
    )) {
        let pairs: Vec<(Value, Value)> = by_key
            .into_iter()
            .map(|(k, v)| (Value::Int(k), v))
            .collect();
        let forward = Map::from_pairs(pairs.clone());
        let backward = Map::from_pairs(pairs.into_iter().rev());
        prop_assert!(forward.equals(&backward));
        prop_assert_eq!(forward.hash_code(), backward.hash_code());
    }

    /// Same for sets built in different orders.
    #[test]
    fn set_permutation_invariance(values in prop::collection::vec(arb_scalar(), 0..10)) {
        let forward = Set::from_values(values.clone());
        let backward = Set::from_values(values.into_iter().rev());
        prop_assert!(forward.equals(&backward));
        prop_assert_eq!(forward.hash_code(), backward.hash_code());
    }

    /// Reversing twice is the identity, through the lazy layer.
    #[test]
    fn double_reverse_is_identity(values in prop::collection::vec(arb_scalar(), 0..12)) {
        let seq = Seq::from_values(values);
        let back = seq.reverse().reverse();
        prop_assert!(seq.equals(&back));
        prop_assert_eq!(seq.hash_code(), back.hash_code());
    }

    /// Caching never changes what a seq equals or hashes to.
    #[test]
    fn caching_preserves_equality(values in prop::collection::vec(arb_scalar(), 0..12)) {
        let plain = Seq::from_values(values.clone());
        let cached = Seq::from_values(values);
        cached.cache_result().unwrap();
        prop_assert!(plain.equals(&cached));
        prop_assert_eq!(plain.hash_code(), cached.hash_code());
    }

    /// Sorting by a constant key preserves the original order exactly.
    #[test]
    fn sort_by_constant_key_is_stable(values in prop::collection::vec(arb_scalar(), 0..12)) {
        let seq = Seq::from_values(values.clone());
        let sorted: Vec<Value> = seq
            .sort_by(|_, _| Value::Int(0))
            .unwrap()
            .values()
            .collect();
        prop_assert_eq!(sorted, values);
    }

    /// Sorted output is ordered under the default comparator.
    #[test]
    fn sort_orders_ints(values in prop::collection::vec(-1000i64..1000, 0..12)) {
        let seq = Seq::from_values(values.iter().copied().map(Value::Int));
        let sorted: Vec<Value> = seq.sort().unwrap().values().collect();
        let mut expected = values;
        expected.sort();
        let expected: Vec<Value> = expected.into_iter().map(Value::Int).collect();
        prop_assert_eq!(sorted, expected);
    }
}
