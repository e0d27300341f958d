// lamina-core - The polymorphic collection contract
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `Collection` trait.
//!
//! One required method — `seq()`, the cheap lazy view carrying the two
//! iteration primitives and the size — and the full derived query surface
//! as provided methods. Concrete backends override the handful of lookups
//! they can answer natively (`get`, `has`, `size`, `first`); everything
//! else is inherited.
//!
//! Operations that need a definite element count (`count`, `every`,
//! `join`, `for_each`, the materializers, anything traversing in reverse)
//! fail immediately on an unbounded sequence. `some`, `find` and
//! `includes` can short-circuit, so they carry no such guard. The only
//! cancellation mechanism anywhere is the visitor returning `false`.

use std::cmp::Ordering;
use std::collections::HashMap as StdHashMap;
use std::rc::Rc;

use lamina_value::seq::{CmpFn, MapFn};
use lamina_value::{
    default_compare, Coll, Error, List, Map, Result, Seq, Set, Size, SortedMap, SortedSet, Stack,
    Value, Variant,
};

fn bounded(size: Size, op: &'static str) -> Result<()> {
    if size.is_infinite() {
        Err(Error::unbounded(op))
    } else {
        Ok(())
    }
}

/// Decompose a `[key, value]` pair list, padding with `Nil`.
fn split_pair(pair: &Value) -> (Value, Value) {
    match pair.as_coll() {
        Some(coll) => (
            coll.get(&Value::Int(0)).unwrap_or(Value::Nil),
            coll.get(&Value::Int(1)).unwrap_or(Value::Nil),
        ),
        None => (Value::Nil, Value::Nil),
    }
}

/// The new-candidate-wins tie-break used by `max`: on a comparator tie, a
/// nil or NaN candidate that is not the incumbent replaces it.
fn max_takes(ord: Ordering, candidate: &Value, current: &Value) -> bool {
    ord == Ordering::Greater
        || (ord == Ordering::Equal
            && !Value::is(candidate, current)
            && (candidate.is_nil() || candidate.is_nan()))
}

pub trait Collection {
    /// The lazy view of this collection. Cheap; never iterates.
    fn seq(&self) -> Seq;

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    fn variant(&self) -> Variant {
        self.seq().variant()
    }

    fn ordered(&self) -> bool {
        self.seq().ordered()
    }

    fn size(&self) -> Size {
        self.seq().size()
    }

    fn is_empty(&self) -> bool {
        match self.size() {
            Size::Known(n) => n == 0,
            Size::Infinite => false,
            Size::Unknown => self.seq().entries_iter(false).next().is_none(),
        }
    }

    /// Exact element count, iterating (and caching) when unknown.
    fn count(&self) -> Result<usize> {
        match self.size() {
            Size::Known(n) => Ok(n),
            Size::Infinite => Err(Error::unbounded("count")),
            Size::Unknown => {
                self.seq().cache_result()?;
                match self.seq().size() {
                    Size::Known(n) => Ok(n),
                    _ => Err(Error::unbounded("count")),
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    fn get(&self, key: &Value) -> Option<Value> {
        self.seq().get(key)
    }

    fn get_or(&self, key: &Value, not_set: Value) -> Value {
        self.get(key).unwrap_or(not_set)
    }

    fn has(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Membership by value. Short-circuits, so it is safe on unbounded
    /// sequences that do contain the value.
    fn includes(&self, value: &Value) -> bool {
        self.seq().values().any(|v| &v == value)
    }

    fn first(&self) -> Option<Value> {
        self.seq().values().next()
    }

    fn last(&self) -> Option<Value> {
        if self.size().is_infinite() {
            return None;
        }
        self.seq().entries_iter(true).next().map(|(_, v)| v)
    }

    // ------------------------------------------------------------------
    // Eager traversal
    // ------------------------------------------------------------------

    /// Visit every `(value, key)` entry; the visitor returns `false` to
    /// stop. Returns the number of entries visited.
    fn for_each(&self, mut f: impl FnMut(&Value, &Value) -> bool) -> Result<usize> {
        bounded(self.size(), "for_each")?;
        self.seq().iterate(false, &mut |k, v| f(v, k))
    }

    /// Reduce seeded by the first element; errors on an empty collection.
    fn reduce(&self, mut f: impl FnMut(Value, &Value, &Value) -> Value) -> Result<Value> {
        bounded(self.size(), "reduce")?;
        let mut acc: Option<Value> = None;
        self.seq().iterate(false, &mut |k, v| {
            acc = Some(match acc.take() {
                None => v.clone(),
                Some(a) => f(a, v, k),
            });
            true
        })?;
        acc.ok_or(Error::EmptyReduce)
    }

    fn reduce_init(
        &self,
        init: Value,
        mut f: impl FnMut(Value, &Value, &Value) -> Value,
    ) -> Result<Value> {
        bounded(self.size(), "reduce")?;
        let mut acc = init;
        self.seq().iterate(false, &mut |k, v| {
            let prev = std::mem::replace(&mut acc, Value::Nil);
            acc = f(prev, v, k);
            true
        })?;
        Ok(acc)
    }

    fn reduce_right(&self, mut f: impl FnMut(Value, &Value, &Value) -> Value) -> Result<Value> {
        bounded(self.size(), "reduce_right")?;
        let mut acc: Option<Value> = None;
        self.seq().iterate(true, &mut |k, v| {
            acc = Some(match acc.take() {
                None => v.clone(),
                Some(a) => f(a, v, k),
            });
            true
        })?;
        acc.ok_or(Error::EmptyReduce)
    }

    fn reduce_right_init(
        &self,
        init: Value,
        mut f: impl FnMut(Value, &Value, &Value) -> Value,
    ) -> Result<Value> {
        bounded(self.size(), "reduce_right")?;
        let mut acc = init;
        self.seq().iterate(true, &mut |k, v| {
            let prev = std::mem::replace(&mut acc, Value::Nil);
            acc = f(prev, v, k);
            true
        })?;
        Ok(acc)
    }

    /// True when every entry satisfies the predicate. Must visit every
    /// entry to answer `true`, so unbounded sequences are an error.
    fn every(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> Result<bool> {
        bounded(self.size(), "every")?;
        let mut all = true;
        self.seq().iterate(false, &mut |k, v| {
            if pred(v, k) {
                true
            } else {
                all = false;
                false
            }
        })?;
        Ok(all)
    }

    /// True when some entry satisfies the predicate. Short-circuits.
    fn some(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> bool {
        self.seq().entries_iter(false).any(|(k, v)| pred(&v, &k))
    }

    /// Join values into a string; nil renders empty, strings render raw.
    fn join(&self, separator: &str) -> Result<String> {
        bounded(self.size(), "join")?;
        let mut out = String::new();
        let mut first = true;
        self.seq().iterate(false, &mut |_k, v| {
            if !first {
                out.push_str(separator);
            }
            first = false;
            match v {
                Value::Nil => {}
                Value::Str(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
            true
        })?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    fn find(&self, pred: impl FnMut(&Value, &Value) -> bool) -> Option<Value> {
        self.find_entry(pred).map(|(_, v)| v)
    }

    fn find_entry(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> Option<(Value, Value)> {
        self.seq().entries_iter(false).find(|(k, v)| pred(v, k))
    }

    fn find_last(&self, pred: impl FnMut(&Value, &Value) -> bool) -> Result<Option<Value>> {
        self.find_last_entry(pred).map(|e| e.map(|(_, v)| v))
    }

    fn find_last_entry(
        &self,
        mut pred: impl FnMut(&Value, &Value) -> bool,
    ) -> Result<Option<(Value, Value)>> {
        bounded(self.size(), "find_last")?;
        Ok(self.seq().entries_iter(true).find(|(k, v)| pred(v, k)))
    }

    fn find_key(&self, pred: impl FnMut(&Value, &Value) -> bool) -> Option<Value> {
        self.find_entry(pred).map(|(k, _)| k)
    }

    fn find_last_key(&self, pred: impl FnMut(&Value, &Value) -> bool) -> Result<Option<Value>> {
        self.find_last_entry(pred).map(|e| e.map(|(k, _)| k))
    }

    /// The key of the first entry holding `value`.
    fn key_of(&self, value: &Value) -> Option<Value> {
        self.find_key(|v, _| v == value)
    }

    fn last_key_of(&self, value: &Value) -> Result<Option<Value>> {
        self.find_last_key(|v, _| v == value)
    }

    /// Position of the first entry holding `value`, by traversal order.
    fn index_of(&self, value: &Value) -> Option<i64> {
        self.find_index(|v, _| v == value)
    }

    fn last_index_of(&self, value: &Value) -> Result<Option<i64>> {
        self.find_last_index(|v, _| v == value)
    }

    fn find_index(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> Option<i64> {
        self.seq()
            .entries_iter(false)
            .position(|(k, v)| pred(&v, &k))
            .map(|p| p as i64)
    }

    fn find_last_index(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> Result<Option<i64>> {
        bounded(self.size(), "find_last_index")?;
        let n = self.count()?;
        Ok(self
            .seq()
            .entries_iter(true)
            .position(|(k, v)| pred(&v, &k))
            .map(|p| (n - 1 - p) as i64))
    }

    // ------------------------------------------------------------------
    // Extremes
    // ------------------------------------------------------------------

    fn min(&self) -> Result<Option<Value>> {
        self.min_with(default_compare)
    }

    fn max(&self) -> Result<Option<Value>> {
        self.max_with(default_compare)
    }

    fn min_with(&self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) -> Result<Option<Value>> {
        bounded(self.size(), "min")?;
        let mut best: Option<Value> = None;
        self.seq().iterate(false, &mut |_k, v| {
            best = Some(match best.take() {
                None => v.clone(),
                Some(cur) => {
                    if cmp(&cur, v) == Ordering::Greater {
                        v.clone()
                    } else {
                        cur
                    }
                }
            });
            true
        })?;
        Ok(best)
    }

    fn max_with(&self, mut cmp: impl FnMut(&Value, &Value) -> Ordering) -> Result<Option<Value>> {
        bounded(self.size(), "max")?;
        let mut best: Option<Value> = None;
        self.seq().iterate(false, &mut |_k, v| {
            best = Some(match best.take() {
                None => v.clone(),
                Some(cur) => {
                    if max_takes(cmp(v, &cur), v, &cur) {
                        v.clone()
                    } else {
                        cur
                    }
                }
            });
            true
        })?;
        Ok(best)
    }

    fn min_by(&self, mut key_fn: impl FnMut(&Value, &Value) -> Value) -> Result<Option<Value>> {
        bounded(self.size(), "min_by")?;
        let mut best: Option<(Value, Value)> = None;
        self.seq().iterate(false, &mut |k, v| {
            let key = key_fn(v, k);
            best = Some(match best.take() {
                None => (v.clone(), key),
                Some((cur, cur_key)) => {
                    if default_compare(&cur_key, &key) == Ordering::Greater {
                        (v.clone(), key)
                    } else {
                        (cur, cur_key)
                    }
                }
            });
            true
        })?;
        Ok(best.map(|(v, _)| v))
    }

    fn max_by(&self, mut key_fn: impl FnMut(&Value, &Value) -> Value) -> Result<Option<Value>> {
        bounded(self.size(), "max_by")?;
        let mut best: Option<(Value, Value)> = None;
        self.seq().iterate(false, &mut |k, v| {
            let key = key_fn(v, k);
            best = Some(match best.take() {
                None => (v.clone(), key),
                Some((cur, cur_key)) => {
                    if max_takes(default_compare(&key, &cur_key), &key, &cur_key) {
                        (v.clone(), key)
                    } else {
                        (cur, cur_key)
                    }
                }
            });
            true
        })?;
        Ok(best.map(|(v, _)| v))
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Group entries by `f`, each group a collection of the source's
    /// variant (keyed sources group into maps, others into lists).
    fn group_by(&self, mut f: impl FnMut(&Value, &Value) -> Value) -> Result<Map> {
        bounded(self.size(), "group_by")?;
        let keyed = self.variant() == Variant::Keyed;
        let mut order: Vec<Value> = Vec::new();
        let mut groups: StdHashMap<Value, Vec<(Value, Value)>> = StdHashMap::new();
        self.seq().iterate(false, &mut |k, v| {
            let group = f(v, k);
            let bucket = groups.entry(group.clone()).or_insert_with(|| {
                order.push(group.clone());
                Vec::new()
            });
            bucket.push((k.clone(), v.clone()));
            true
        })?;
        let mut result = Map::new().to_mutable();
        for group in order {
            if let Some(entries) = groups.remove(&group) {
                let coll = if keyed {
                    Value::map(entries)
                } else {
                    Value::list(entries.into_iter().map(|(_, v)| v))
                };
                result.set(group, coll);
            }
        }
        Ok(result.freeze())
    }

    /// Count entries by `f`.
    fn count_by(&self, mut f: impl FnMut(&Value, &Value) -> Value) -> Result<Map> {
        bounded(self.size(), "count_by")?;
        let mut counts: StdHashMap<Value, i64> = StdHashMap::new();
        self.seq().iterate(false, &mut |k, v| {
            *counts.entry(f(v, k)).or_insert(0) += 1;
            true
        })?;
        let mut result = Map::new().to_mutable();
        for (group, n) in counts {
            result.set(group, Value::Int(n));
        }
        Ok(result.freeze())
    }

    // ------------------------------------------------------------------
    // Lazy transforms
    // ------------------------------------------------------------------

    fn map(&self, f: impl Fn(&Value, &Value) -> Value + 'static) -> Seq {
        self.seq().map(f)
    }

    fn filter(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.seq().filter(pred)
    }

    fn filter_not(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.seq().filter(move |v, k| !pred(v, k))
    }

    fn flat_map(&self, f: impl Fn(&Value, &Value) -> Value + 'static) -> Seq {
        self.seq().flat_map(f)
    }

    fn flatten(&self, depth: Option<usize>) -> Seq {
        self.seq().flatten(depth)
    }

    fn reverse(&self) -> Seq {
        self.seq().reverse()
    }

    fn slice(&self, begin: i64, end: Option<i64>) -> Result<Seq> {
        self.seq().slice(begin, end)
    }

    fn take(&self, n: usize) -> Seq {
        self.seq().take(n)
    }

    fn skip(&self, n: usize) -> Seq {
        self.seq().skip(n)
    }

    fn take_while(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.seq().take_while(pred)
    }

    fn skip_while(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.seq().skip_while(pred)
    }

    fn rest(&self) -> Seq {
        self.seq().skip(1)
    }

    fn but_last(&self) -> Result<Seq> {
        self.seq().slice(0, Some(-1))
    }

    fn take_last(&self, n: usize) -> Result<Seq> {
        if n == 0 {
            return Ok(self.seq().take(0));
        }
        self.seq().slice(-(n as i64), None)
    }

    fn skip_last(&self, n: usize) -> Result<Seq> {
        if n == 0 {
            return Ok(self.seq());
        }
        self.seq().slice(0, Some(-(n as i64)))
    }

    fn concat(&self, others: &[Seq]) -> Seq {
        self.seq().concat(others)
    }

    fn sort(&self) -> Result<Seq> {
        self.seq().sorted(None, None)
    }

    fn sort_with(&self, cmp: impl Fn(&Value, &Value) -> Ordering + 'static) -> Result<Seq> {
        let cmp: CmpFn = Rc::new(cmp);
        self.seq().sorted(None, Some(cmp))
    }

    fn sort_by(&self, key_fn: impl Fn(&Value, &Value) -> Value + 'static) -> Result<Seq> {
        let key_fn: MapFn = Rc::new(key_fn);
        self.seq().sorted(Some(key_fn), None)
    }

    fn sort_by_with(
        &self,
        key_fn: impl Fn(&Value, &Value) -> Value + 'static,
        cmp: impl Fn(&Value, &Value) -> Ordering + 'static,
    ) -> Result<Seq> {
        let key_fn: MapFn = Rc::new(key_fn);
        let cmp: CmpFn = Rc::new(cmp);
        self.seq().sorted(Some(key_fn), Some(cmp))
    }

    // ------------------------------------------------------------------
    // Keyed transforms
    // ------------------------------------------------------------------

    /// Swap key and value roles.
    fn flip(&self) -> Seq {
        self.seq().flip()
    }

    /// Map over keys, keeping values.
    fn map_keys(&self, f: impl Fn(&Value) -> Value + 'static) -> Seq {
        self.seq().flip().map(move |key, _| f(key)).flip()
    }

    /// Map over whole `[key, value]` entries.
    fn map_entries(&self, f: impl Fn(&Value, &Value) -> (Value, Value) + 'static) -> Seq {
        self.seq()
            .entry_seq()
            .map(move |pair, _| {
                let (k, v) = split_pair(pair);
                let (k2, v2) = f(&k, &v);
                Value::list([k2, v2])
            })
            .from_entry_seq()
    }

    fn key_seq(&self) -> Seq {
        self.seq().key_seq()
    }

    fn value_seq(&self) -> Seq {
        self.seq().value_seq()
    }

    fn entry_seq(&self) -> Seq {
        self.seq().entry_seq()
    }

    fn to_keyed_seq(&self) -> Seq {
        self.seq().to_keyed_seq()
    }

    fn to_indexed_seq(&self) -> Seq {
        self.seq().to_indexed_seq()
    }

    fn to_set_seq(&self) -> Seq {
        self.seq().to_set_seq()
    }

    // ------------------------------------------------------------------
    // Indexed transforms
    // ------------------------------------------------------------------

    /// Replace `remove` entries at `index` with `values`. A no-op when
    /// nothing is removed and nothing is given; a negative index resolves
    /// against the size, counting if it is not yet known.
    fn splice(&self, index: i64, remove: usize, values: Vec<Value>) -> Result<Seq> {
        let s = self.seq();
        if remove == 0 && values.is_empty() {
            return Ok(s);
        }
        let resolved = if index < 0 {
            let len = match s.size() {
                Size::Known(n) => n,
                Size::Infinite => return Err(Error::unbounded("splice with negative index")),
                Size::Unknown => self.count()?,
            };
            (index + len as i64).max(0) as usize
        } else {
            index as usize
        };
        let head = s.take(resolved);
        let tail = s.skip(resolved + remove);
        Ok(head.concat(&[Seq::from_values(values), tail]))
    }

    /// Alternate entries of all operands, element-wise.
    fn interleave(&self, others: &[Seq]) -> Seq {
        self.zip(others).flatten(Some(1))
    }

    fn interpose(&self, separator: Value) -> Seq {
        self.seq().interpose(separator)
    }

    /// Element-wise tuples; length is the shortest operand's.
    fn zip(&self, others: &[Seq]) -> Seq {
        self.seq()
            .zip_with(|values| Value::list(values.to_vec()), others)
    }

    /// Element-wise tuples; length is the longest operand's, missing slots
    /// filled with nil.
    fn zip_all(&self, others: &[Seq]) -> Seq {
        self.seq()
            .zip_all_with(|values| Value::list(values.to_vec()), others)
    }

    fn zip_with(&self, f: impl Fn(&[Value]) -> Value + 'static, others: &[Seq]) -> Seq {
        self.seq().zip_with(f, others)
    }

    // ------------------------------------------------------------------
    // Materialization
    // ------------------------------------------------------------------

    fn to_vec(&self) -> Result<Vec<Value>> {
        bounded(self.size(), "to_vec")?;
        let mut out = Vec::new();
        self.seq().iterate(false, &mut |_k, v| {
            out.push(v.clone());
            true
        })?;
        Ok(out)
    }

    fn to_entries(&self) -> Result<Vec<(Value, Value)>> {
        bounded(self.size(), "to_entries")?;
        let mut out = Vec::new();
        self.seq().iterate(false, &mut |k, v| {
            out.push((k.clone(), v.clone()));
            true
        })?;
        Ok(out)
    }

    fn to_list(&self) -> Result<List> {
        Ok(List::from_values(self.to_vec()?))
    }

    fn to_stack(&self) -> Result<Stack> {
        Ok(Stack::from_values(self.to_vec()?))
    }

    fn to_map(&self) -> Result<Map> {
        Ok(Map::from_pairs(self.to_entries()?))
    }

    fn to_sorted_map(&self) -> Result<SortedMap> {
        Ok(SortedMap::from_pairs(self.to_entries()?))
    }

    fn to_set(&self) -> Result<Set> {
        Ok(Set::from_values(self.to_vec()?))
    }

    fn to_sorted_set(&self) -> Result<SortedSet> {
        Ok(SortedSet::from_values(self.to_vec()?))
    }

    /// Deep conversion to host JSON. Fails the same infinite-collection
    /// check as `to_vec`.
    fn to_json(&self) -> Result<serde_json::Value> {
        crate::convert::to_json(&Value::Coll(Coll::Seq(self.seq())))
    }

    // ------------------------------------------------------------------
    // Equality and hashing
    // ------------------------------------------------------------------

    /// Deep structural equality with any other collection.
    fn equals<C: Collection + ?Sized>(&self, other: &C) -> bool {
        Coll::Seq(self.seq()).deep_equal(&Coll::Seq(other.seq()))
    }

    /// Structural hash, coherent with `equals`. Unbounded sequences hash
    /// to 0.
    fn hash_code(&self) -> u32 {
        self.seq().hash_code()
    }
}

// ============================================================================
// Implementations
// ============================================================================

impl Collection for Seq {
    fn seq(&self) -> Seq {
        self.clone()
    }

    fn get(&self, key: &Value) -> Option<Value> {
        Seq::get(self, key)
    }

    fn size(&self) -> Size {
        Seq::size(self)
    }
}

impl Collection for Coll {
    fn seq(&self) -> Seq {
        self.to_seq()
    }

    fn get(&self, key: &Value) -> Option<Value> {
        Coll::get(self, key)
    }

    fn has(&self, key: &Value) -> bool {
        Coll::has(self, key)
    }

    fn size(&self) -> Size {
        Coll::size(self)
    }

    fn variant(&self) -> Variant {
        Coll::variant(self)
    }

    fn ordered(&self) -> bool {
        Coll::ordered(self)
    }
}

impl Collection for List {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::List(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        match key {
            Value::Int(i) => self.nth(*i).cloned(),
            _ => None,
        }
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn first(&self) -> Option<Value> {
        List::first(self).cloned()
    }

    fn last(&self) -> Option<Value> {
        List::last(self).cloned()
    }
}

impl Collection for Stack {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::Stack(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        match key {
            Value::Int(i) => self.nth(*i).cloned(),
            _ => None,
        }
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }

    fn first(&self) -> Option<Value> {
        self.peek().cloned()
    }
}

impl Collection for Map {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::Map(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        self.lookup(key).cloned()
    }

    fn has(&self, key: &Value) -> bool {
        self.contains(key)
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl Collection for SortedMap {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::SortedMap(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        self.lookup(key).cloned()
    }

    fn has(&self, key: &Value) -> bool {
        self.contains(key)
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl Collection for Set {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::Set(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        if self.contains(key) {
            Some(key.clone())
        } else {
            None
        }
    }

    fn has(&self, key: &Value) -> bool {
        self.contains(key)
    }

    fn includes(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl Collection for SortedSet {
    fn seq(&self) -> Seq {
        Seq::from_backend(Coll::SortedSet(self.clone()))
    }

    fn get(&self, key: &Value) -> Option<Value> {
        if self.contains(key) {
            Some(key.clone())
        } else {
            None
        }
    }

    fn has(&self, key: &Value) -> bool {
        self.contains(key)
    }

    fn includes(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn size(&self) -> Size {
        Size::Known(self.len())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}
