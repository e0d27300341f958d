// lamina-core - Merge family integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for `merge`, `merge_with`, and the deep and nested
//! variants.

use lamina_core::{merge, merge_deep, merge_deep_with, merge_in, merge_with, update};
use lamina_core::{Coll, Error, Value};

fn key(s: &str) -> Value {
    Value::from(s)
}

fn as_int(v: &Value) -> i64 {
    match v {
        Value::Int(n) => *n,
        other => panic!("expected int, got {}", other),
    }
}

// =============================================================================
// Keyed merge
// =============================================================================

#[test]
fn merge_overwrites_on_collision() {
    let target = Value::map([(key("a"), Value::Int(1)), (key("b"), Value::Int(2))]);
    let source = Value::map([(key("b"), Value::Int(3)), (key("c"), Value::Int(4))]);
    let merged = merge(&target, &[source]).unwrap();
    assert_eq!(
        merged,
        Value::map([
            (key("a"), Value::Int(1)),
            (key("b"), Value::Int(3)),
            (key("c"), Value::Int(4)),
        ])
    );
}

#[test]
fn merge_with_combines_collisions() {
    let target = Value::map([(key("a"), Value::Int(1))]);
    let source = Value::map([(key("a"), Value::Int(2))]);
    let merged = merge_with(
        |old, new, _k| Value::Int(as_int(old) + as_int(new)),
        &target,
        &[source],
    )
    .unwrap();
    assert_eq!(merged, Value::map([(key("a"), Value::Int(3))]));
}

#[test]
fn merge_applies_sources_left_to_right() {
    let target = Value::map([]);
    let merged = merge(
        &target,
        &[
            Value::map([(key("a"), Value::Int(1))]),
            Value::map([(key("a"), Value::Int(2))]),
        ],
    )
    .unwrap();
    assert_eq!(update::get(&merged, &key("a")), Some(Value::Int(2)));
}

#[test]
fn merge_skips_nil_sources() {
    let target = Value::map([(key("a"), Value::Int(1))]);
    let merged = merge(&target, &[Value::Nil]).unwrap();
    assert_eq!(merged, target);
}

#[test]
fn no_op_merge_returns_original() {
    let target = Value::map([(key("a"), Value::Int(1))]);
    let merged = merge(&target, &[Value::map([(key("a"), Value::Int(1))])]).unwrap();
    match (&target, &merged) {
        (Value::Coll(a), Value::Coll(b)) => assert!(a.ptr_eq(b)),
        _ => panic!("expected collections"),
    }
    let empty = merge(&target, &[]).unwrap();
    match (&target, &empty) {
        (Value::Coll(a), Value::Coll(b)) => assert!(a.ptr_eq(b)),
        _ => panic!("expected collections"),
    }
}

// =============================================================================
// Indexed and set merge
// =============================================================================

#[test]
fn indexed_targets_append() {
    let target = Value::list([Value::Int(1), Value::Int(2)]);
    let merged = merge(&target, &[Value::list([Value::Int(3)])]).unwrap();
    assert_eq!(
        merged,
        Value::list([Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn set_targets_union() {
    let target = Value::set([Value::Int(1), Value::Int(2)]);
    let merged = merge(&target, &[Value::set([Value::Int(2), Value::Int(3)])]).unwrap();
    match &merged {
        Value::Coll(Coll::Set(s)) => {
            assert_eq!(s.len(), 3);
            assert!(s.contains(&Value::Int(3)));
        }
        other => panic!("expected set, got {}", other),
    }
}

// =============================================================================
// Deep merge
// =============================================================================

#[test]
fn merge_deep_recurses_into_same_shape() {
    let target = Value::map([(
        key("user"),
        Value::map([(key("name"), Value::from("ada")), (key("age"), Value::Int(36))]),
    )]);
    let source = Value::map([(
        key("user"),
        Value::map([(key("age"), Value::Int(37))]),
    )]);
    let merged = merge_deep(&target, &[source]).unwrap();
    assert_eq!(
        update::get_in(&merged, &[key("user"), key("name")]),
        Some(Value::from("ada"))
    );
    assert_eq!(
        update::get_in(&merged, &[key("user"), key("age")]),
        Some(Value::Int(37))
    );
}

#[test]
fn merge_deep_appends_nested_lists() {
    let target = Value::map([(key("xs"), Value::list([Value::Int(1)]))]);
    let source = Value::map([(key("xs"), Value::list([Value::Int(2)]))]);
    let merged = merge_deep(&target, &[source]).unwrap();
    assert_eq!(
        update::get(&merged, &key("xs")),
        Some(Value::list([Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn merge_deep_falls_back_on_shape_mismatch() {
    let target = Value::map([(key("x"), Value::list([Value::Int(1)]))]);
    let source = Value::map([(key("x"), Value::map([(key("y"), Value::Int(2))]))]);
    let merged = merge_deep(&target, &[source]).unwrap();
    // Different shapes overwrite instead of merging.
    assert_eq!(
        update::get(&merged, &key("x")),
        Some(Value::map([(key("y"), Value::Int(2))]))
    );
}

#[test]
fn merge_deep_with_combiner_on_leaves() {
    let target = Value::map([(key("a"), Value::map([(key("n"), Value::Int(1))]))]);
    let source = Value::map([(key("a"), Value::map([(key("n"), Value::Int(2))]))]);
    let merged = merge_deep_with(
        |old, new, _k| Value::Int(as_int(old) + as_int(new)),
        &target,
        &[source],
    )
    .unwrap();
    assert_eq!(
        update::get_in(&merged, &[key("a"), key("n")]),
        Some(Value::Int(3))
    );
}

// =============================================================================
// Nested merge
// =============================================================================

#[test]
fn merge_in_merges_at_a_path() {
    let target = Value::map([(
        key("config"),
        Value::map([(key("a"), Value::Int(1))]),
    )]);
    let merged = merge_in(
        &target,
        &[key("config")],
        &[Value::map([(key("b"), Value::Int(2))])],
    )
    .unwrap();
    assert_eq!(
        update::get_in(&merged, &[key("config"), key("b")]),
        Some(Value::Int(2))
    );
}

#[test]
fn merge_in_materializes_missing_slot() {
    let target = Value::map([]);
    let merged = merge_in(
        &target,
        &[key("new")],
        &[Value::map([(key("a"), Value::Int(1))])],
    )
    .unwrap();
    assert_eq!(
        update::get_in(&merged, &[key("new"), key("a")]),
        Some(Value::Int(1))
    );
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn merge_rejects_non_collections() {
    assert!(matches!(
        merge(&Value::Int(1), &[Value::map([])]),
        Err(Error::TypeError { .. })
    ));
    let target = Value::map([]);
    assert!(matches!(
        merge(&target, &[Value::Int(1)]),
        Err(Error::TypeError { .. })
    ));
}
