// lamina-core - JSON boundary integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for the host JSON conversions.

use serde_json::json;

use lamina_core::{from_json, to_json, update, Coll, Error, Seq, Value};

// =============================================================================
// from_json
// =============================================================================

#[test]
fn from_json_builds_nested_collections() {
    let data = from_json(&json!({
        "name": "ada",
        "tags": ["math", "engines"],
        "meta": { "age": 36, "active": true, "score": 1.5 }
    }));
    assert_eq!(
        update::get(&data, &Value::from("name")),
        Some(Value::from("ada"))
    );
    assert_eq!(
        update::get_in(&data, &[Value::from("tags"), Value::Int(0)]),
        Some(Value::from("math"))
    );
    assert_eq!(
        update::get_in(&data, &[Value::from("meta"), Value::from("age")]),
        Some(Value::Int(36))
    );
    assert_eq!(
        update::get_in(&data, &[Value::from("meta"), Value::from("score")]),
        Some(Value::Float(1.5))
    );
    match &data {
        Value::Coll(Coll::Map(_)) => {}
        other => panic!("expected map, got {}", other),
    }
}

#[test]
fn from_json_null_is_nil() {
    assert_eq!(from_json(&json!(null)), Value::Nil);
    assert_eq!(from_json(&json!([null])), Value::list([Value::Nil]));
}

// =============================================================================
// to_json
// =============================================================================

#[test]
fn to_json_round_trips() {
    let original = json!({
        "a": 1,
        "b": [true, null, "s"],
        "c": { "d": 2.5 }
    });
    let value = from_json(&original);
    assert_eq!(to_json(&value).unwrap(), original);
}

#[test]
fn keyed_becomes_object_indexed_becomes_array() {
    let map = Value::map([(Value::from("a"), Value::Int(1))]);
    assert_eq!(to_json(&map).unwrap(), json!({"a": 1}));

    let list = Value::list([Value::Int(1), Value::Int(2)]);
    assert_eq!(to_json(&list).unwrap(), json!([1, 2]));

    let set = Value::set([Value::Int(1)]);
    assert_eq!(to_json(&set).unwrap(), json!([1]));
}

#[test]
fn seqs_serialize_like_their_variant() {
    let seq = Seq::from_values([Value::Int(1), Value::Int(2)]);
    assert_eq!(to_json(&Value::from(seq)).unwrap(), json!([1, 2]));
}

#[test]
fn scalar_keys_stringify() {
    let map = Value::map([(Value::Int(1), Value::from("one"))]);
    assert_eq!(to_json(&map).unwrap(), json!({"1": "one"}));
}

#[test]
fn non_finite_numbers_become_null() {
    let list = Value::list([Value::Float(f64::NAN), Value::Float(f64::INFINITY)]);
    assert_eq!(to_json(&list).unwrap(), json!([null, null]));
}

#[test]
fn to_json_fails_on_unbounded_sequences() {
    let unbounded = Value::from(Seq::repeat(Value::Int(1), None));
    assert!(matches!(to_json(&unbounded), Err(Error::Unbounded { .. })));

    let nested = Value::map([(Value::from("xs"), unbounded)]);
    assert!(matches!(to_json(&nested), Err(Error::Unbounded { .. })));
}
