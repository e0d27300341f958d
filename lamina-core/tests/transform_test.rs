// lamina-core - Transformer factory integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for the derived transformers: slice and the while
//! family, reverse, flatten, interpose, zip, concat, splice, sorting.

use lamina_core::{Collection, List, Seq, Size, Value};

fn int_seq(values: impl IntoIterator<Item = i64>) -> Seq {
    Seq::from_values(values.into_iter().map(Value::Int))
}

fn to_ints(seq: &Seq) -> Vec<i64> {
    seq.values()
        .map(|v| match v {
            Value::Int(n) => n,
            other => panic!("expected int, got {}", other),
        })
        .collect()
}

// =============================================================================
// Slice family
// =============================================================================

#[test]
fn slice_clamps_and_reindexes() {
    let seq = int_seq([0, 1, 2, 3, 4]);
    assert_eq!(to_ints(&seq.slice(1, Some(3)).unwrap()), vec![1, 2]);
    assert_eq!(to_ints(&seq.slice(3, Some(99)).unwrap()), vec![3, 4]);
    assert_eq!(to_ints(&seq.slice(4, Some(2)).unwrap()), Vec::<i64>::new());
    assert_eq!(seq.slice(1, Some(3)).unwrap().size(), Size::Known(2));
    // Fresh indices on the sliced view.
    let entries: Vec<_> = seq.slice(2, None).unwrap().entries().collect();
    assert_eq!(entries[0], (Value::Int(0), Value::Int(2)));
}

#[test]
fn slice_resolves_negative_bounds() {
    let seq = int_seq([0, 1, 2, 3, 4]);
    assert_eq!(to_ints(&seq.slice(-2, None).unwrap()), vec![3, 4]);
    assert_eq!(to_ints(&seq.slice(0, Some(-1)).unwrap()), vec![0, 1, 2, 3]);
    assert_eq!(to_ints(&seq.slice(-4, Some(-2)).unwrap()), vec![1, 2]);
}

#[test]
fn take_and_skip_while() {
    let seq = int_seq([1, 2, 3, 1, 2]);
    let below = seq.take_while(|v, _| matches!(v, Value::Int(n) if *n < 3));
    assert_eq!(to_ints(&below), vec![1, 2]);
    let after = seq.skip_while(|v, _| matches!(v, Value::Int(n) if *n < 3));
    assert_eq!(to_ints(&after), vec![3, 1, 2]);
}

#[test]
fn rest_and_but_last() {
    let seq = int_seq([1, 2, 3]);
    assert_eq!(to_ints(&seq.rest()), vec![2, 3]);
    assert_eq!(to_ints(&seq.but_last().unwrap()), vec![1, 2]);
    assert_eq!(to_ints(&seq.take_last(2).unwrap()), vec![2, 3]);
    assert_eq!(to_ints(&seq.skip_last(2).unwrap()), vec![1]);
}

// =============================================================================
// Reverse
// =============================================================================

#[test]
fn reverse_is_lazy_and_reindexes() {
    let seq = int_seq([1, 2, 3]);
    let reversed = seq.reverse();
    assert_eq!(reversed.size(), Size::Known(3));
    assert_eq!(to_ints(&reversed), vec![3, 2, 1]);
    let entries: Vec<_> = reversed.entries().collect();
    assert_eq!(entries[0], (Value::Int(0), Value::Int(3)));
}

#[test]
fn reverse_of_keyed_keeps_keys() {
    let pairs = Seq::from_pairs([
        (Value::from("a"), Value::Int(1)),
        (Value::from("b"), Value::Int(2)),
    ]);
    let entries: Vec<_> = pairs.reverse().entries().collect();
    assert_eq!(entries[0], (Value::from("b"), Value::Int(2)));
    assert_eq!(entries[1], (Value::from("a"), Value::Int(1)));
}

// =============================================================================
// Flatten
// =============================================================================

#[test]
fn flatten_inlines_nested_collections() {
    let nested = Seq::from_values([
        Value::list([Value::Int(1), Value::Int(2)]),
        Value::list([Value::Int(3), Value::list([Value::Int(4)])]),
    ]);
    assert_eq!(to_ints(&nested.flatten(None)), vec![1, 2, 3, 4]);

    let shallow: Vec<Value> = nested.flatten(Some(1)).values().collect();
    assert_eq!(
        shallow,
        vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::list([Value::Int(4)]),
        ]
    );
}

#[test]
fn flatten_iterator_suspends_mid_depth() {
    let nested = Seq::from_values([
        Value::list([Value::Int(1), Value::Int(2), Value::Int(3)]),
        Value::list([Value::Int(4)]),
    ]);
    let mut iter = nested.flatten(None).entries();
    assert_eq!(iter.next(), Some((Value::Int(0), Value::Int(1))));
    assert_eq!(iter.next(), Some((Value::Int(1), Value::Int(2))));
    // Abandon the traversal two levels in; nothing else is derived.
    drop(iter);
}

#[test]
fn flat_map_inlines_one_level() {
    let seq = int_seq([1, 2, 3]);
    let doubled = seq.flat_map(|v, _| match v {
        Value::Int(n) => Value::list([Value::Int(*n), Value::Int(n * 10)]),
        other => other.clone(),
    });
    assert_eq!(to_ints(&doubled), vec![1, 10, 2, 20, 3, 30]);
}

// =============================================================================
// Interpose, zip, concat
// =============================================================================

#[test]
fn interpose_alternates_with_separator() {
    let seq = int_seq([1, 2, 3]);
    assert_eq!(to_ints(&seq.interpose(Value::Int(0))), vec![1, 0, 2, 0, 3]);
    assert_eq!(seq.interpose(Value::Int(0)).size(), Size::Known(5));
    assert_eq!(int_seq([]).interpose(Value::Int(0)).size(), Size::Known(0));
}

#[test]
fn zip_stops_at_shortest() {
    let a = int_seq([1, 2, 3]);
    let b = int_seq([1, 2]);
    let zipped: Vec<Value> = a.zip(&[b]).values().collect();
    assert_eq!(
        zipped,
        vec![
            Value::list([Value::Int(1), Value::Int(1)]),
            Value::list([Value::Int(2), Value::Int(2)]),
        ]
    );
}

#[test]
fn zip_all_pads_with_nil() {
    let a = int_seq([1, 2, 3]);
    let b = int_seq([1, 2]);
    let zipped: Vec<Value> = a.zip_all(&[b]).values().collect();
    assert_eq!(zipped.len(), 3);
    assert_eq!(
        zipped[2],
        Value::list([Value::Int(3), Value::Nil])
    );
}

#[test]
fn zip_with_combines() {
    let a = int_seq([1, 2]);
    let b = int_seq([10, 20]);
    let summed = Collection::zip_with(
        &a,
        |values| {
            let total: i64 = values
                .iter()
                .map(|v| match v {
                    Value::Int(n) => *n,
                    _ => 0,
                })
                .sum();
            Value::Int(total)
        },
        &[b],
    );
    assert_eq!(to_ints(&summed), vec![11, 22]);
}

#[test]
fn zip_sizes() {
    let bounded = int_seq([1, 2, 3]);
    let unbounded = Seq::range(0, None, 1);
    assert_eq!(bounded.zip(&[unbounded.clone()]).size(), Size::Known(3));
    assert_eq!(bounded.zip_all(&[unbounded]).size(), Size::Infinite);
}

#[test]
fn zip_against_infinite_operand() {
    let letters = Seq::from_values([Value::from("a"), Value::from("b")]);
    let indexed: Vec<Value> = letters.zip(&[Seq::range(0, None, 1)]).values().collect();
    assert_eq!(
        indexed,
        vec![
            Value::list([Value::from("a"), Value::Int(0)]),
            Value::list([Value::from("b"), Value::Int(1)]),
        ]
    );
}

#[test]
fn interleave_alternates_operands() {
    let a = int_seq([1, 2, 3]);
    let b = int_seq([10, 20]);
    assert_eq!(to_ints(&a.interleave(&[b])), vec![1, 10, 2, 20]);
}

#[test]
fn concat_appends_and_sums_sizes() {
    let a = int_seq([1, 2]);
    let b = int_seq([3]);
    let joined = a.concat(&[b]);
    assert_eq!(joined.size(), Size::Known(3));
    assert_eq!(to_ints(&joined), vec![1, 2, 3]);
    let entries: Vec<_> = joined.entries().collect();
    assert_eq!(entries[2], (Value::Int(2), Value::Int(3)));
}

// =============================================================================
// Splice
// =============================================================================

#[test]
fn splice_replaces_a_window() {
    let list = List::from_values([Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
    let spliced = list.splice(1, 2, vec![Value::Int(9)]).unwrap();
    assert_eq!(to_ints(&spliced), vec![1, 9, 4]);
}

#[test]
fn splice_without_removal_or_values_is_a_no_op() {
    let list = List::from_values([Value::Int(1), Value::Int(2)]);
    let spliced = list.splice(1, 0, vec![]).unwrap();
    assert_eq!(to_ints(&spliced), vec![1, 2]);
}

#[test]
fn splice_resolves_negative_index() {
    let list = List::from_values([Value::Int(1), Value::Int(2), Value::Int(3)]);
    let spliced = list.splice(-1, 1, vec![Value::Int(9)]).unwrap();
    assert_eq!(to_ints(&spliced), vec![1, 2, 9]);
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn sort_uses_default_comparator() {
    let seq = int_seq([3, 1, 2]);
    assert_eq!(to_ints(&seq.sort().unwrap()), vec![1, 2, 3]);
}

#[test]
fn sort_treats_nil_as_greatest() {
    let seq = Seq::from_values([Value::Nil, Value::Int(2), Value::Int(1)]);
    let sorted: Vec<Value> = seq.sort().unwrap().values().collect();
    assert_eq!(sorted, vec![Value::Int(1), Value::Int(2), Value::Nil]);
}

#[test]
fn sort_by_is_stable() {
    let words = Seq::from_values([
        Value::from("bb"),
        Value::from("aa"),
        Value::from("c"),
        Value::from("dd"),
    ]);
    let by_len = words
        .sort_by(|v, _| match v {
            Value::Str(s) => Value::Int(s.len() as i64),
            _ => Value::Nil,
        })
        .unwrap();
    let sorted: Vec<Value> = by_len.values().collect();
    // Equal-length strings keep their original relative order.
    assert_eq!(
        sorted,
        vec![
            Value::from("c"),
            Value::from("bb"),
            Value::from("aa"),
            Value::from("dd"),
        ]
    );
}

#[test]
fn sort_with_custom_comparator() {
    let seq = int_seq([1, 3, 2]);
    let descending = seq.sort_with(|a, b| b.cmp(a)).unwrap();
    assert_eq!(to_ints(&descending), vec![3, 2, 1]);
}

#[test]
fn sorted_keyed_seq_keeps_entries() {
    let pairs = Seq::from_pairs([
        (Value::from("b"), Value::Int(2)),
        (Value::from("a"), Value::Int(1)),
    ]);
    let sorted = pairs.sort().unwrap();
    let entries: Vec<_> = sorted.entries().collect();
    assert_eq!(entries[0], (Value::from("a"), Value::Int(1)));
    assert_eq!(entries[1], (Value::from("b"), Value::Int(2)));
}
