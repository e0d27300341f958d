// lamina-value - Lazy sequence engine
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The lazy `Seq` layer.
//!
//! A `Seq` wraps a source (materialized entries, a concrete backend, a
//! numeric range or repeat, or a transformer node closing over another
//! `Seq`) and derives its output on every traversal. Constructing a
//! transformer never touches the source; only consumption does.
//!
//! Lifecycle: created uncached; `cache_result` materializes the full entry
//! list exactly once and fixes the size. The transition is one-way — there
//! is no invalidation. A cached seq replays the frozen snapshot, forwards
//! or backwards, regardless of what happens to the original source.

mod iter;

pub use iter::{Entries, Keys, SeqIter, Values};

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::coll::{Coll, Entry};
use crate::error::{Error, Result};
use crate::hash::hash_collection;
use crate::value::{Size, Value, Variant};

/// Shared `(value, key) -> value` closure.
pub type MapFn = Rc<dyn Fn(&Value, &Value) -> Value>;
/// Shared `(value, key) -> bool` closure.
pub type PredFn = Rc<dyn Fn(&Value, &Value) -> bool>;
/// Shared zip combiner over one value per operand.
pub type ZipFn = Rc<dyn Fn(&[Value]) -> Value>;
/// Shared comparator closure.
pub type CmpFn = Rc<dyn Fn(&Value, &Value) -> Ordering>;

/// Where a seq's entries come from.
pub(crate) enum Source {
    /// Materialized `(key, value)` entries
    Entries(Rc<Vec<Entry>>),
    /// Indexed view over plain values
    Values(Rc<Vec<Value>>),
    /// A concrete backend collection (never `Coll::Seq`)
    Backend(Coll),
    /// Arithmetic progression; `count: None` is unbounded
    Range {
        start: i64,
        step: i64,
        count: Option<usize>,
    },
    /// The same value over and over; `times: None` is unbounded
    Repeat {
        value: Value,
        times: Option<usize>,
    },
    Map {
        source: Seq,
        f: MapFn,
    },
    Filter {
        source: Seq,
        pred: PredFn,
    },
    /// Resolved slice: drop `skip`, then yield at most `limit`
    Slice {
        source: Seq,
        skip: usize,
        limit: Option<usize>,
    },
    TakeWhile {
        source: Seq,
        pred: PredFn,
    },
    SkipWhile {
        source: Seq,
        pred: PredFn,
    },
    Reverse {
        source: Seq,
    },
    /// Swap key and value roles
    Flip {
        source: Seq,
    },
    /// Same entries, different variant tag
    Retag {
        source: Seq,
    },
    KeySeq {
        source: Seq,
    },
    ValueSeq {
        source: Seq,
    },
    /// Indexed seq of `[key, value]` pair lists
    EntrySeq {
        source: Seq,
    },
    /// Keyed seq from an indexed seq of `[key, value]` pair lists
    FromEntries {
        source: Seq,
    },
    /// Inline nested collections up to `depth` levels; `None` = unlimited
    Flatten {
        source: Seq,
        depth: Option<usize>,
    },
    Interpose {
        source: Seq,
        separator: Value,
    },
    /// Lock-step traversal of all operands
    Zip {
        sources: Vec<Seq>,
        f: ZipFn,
        all: bool,
    },
    Concat {
        parts: Vec<Seq>,
    },
}

pub(crate) struct SeqInner {
    pub(crate) variant: Variant,
    pub(crate) ordered: bool,
    pub(crate) declared: Size,
    pub(crate) source: Source,
    pub(crate) cache: RefCell<Option<Rc<Vec<Entry>>>>,
}

/// A lazy collection view. Cheap to clone; all clones share the source and
/// the entry cache.
#[derive(Clone)]
pub struct Seq {
    pub(crate) inner: Rc<SeqInner>,
}

fn make(variant: Variant, ordered: bool, declared: Size, source: Source) -> Seq {
    Seq {
        inner: Rc::new(SeqInner {
            variant,
            // Positional addressing implies a definite order.
            ordered: ordered || variant == Variant::Indexed,
            declared,
            source,
            cache: RefCell::new(None),
        }),
    }
}

// ============================================================================
// Construction
// ============================================================================

impl Seq {
    pub fn empty(variant: Variant) -> Seq {
        make(variant, true, Size::Known(0), Source::Entries(Rc::new(Vec::new())))
    }

    /// Indexed seq over plain values.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Seq {
        let values: Vec<Value> = values.into_iter().collect();
        let n = values.len();
        make(
            Variant::Indexed,
            true,
            Size::Known(n),
            Source::Values(Rc::new(values)),
        )
    }

    /// Keyed seq over `(key, value)` pairs, in the given order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Seq {
        let pairs: Vec<Entry> = pairs.into_iter().collect();
        let n = pairs.len();
        make(
            Variant::Keyed,
            true,
            Size::Known(n),
            Source::Entries(Rc::new(pairs)),
        )
    }

    /// Lazy view of a concrete backend.
    pub fn from_backend(coll: Coll) -> Seq {
        debug_assert!(!matches!(coll, Coll::Seq(_)));
        make(
            coll.variant(),
            coll.ordered(),
            coll.size(),
            Source::Backend(coll),
        )
    }

    /// Arithmetic progression from `start` by `step`; unbounded when `end`
    /// is `None`. A zero step repeats `start` forever.
    pub fn range(start: i64, end: Option<i64>, step: i64) -> Seq {
        match end {
            None => make(
                Variant::Indexed,
                true,
                Size::Infinite,
                Source::Range {
                    start,
                    step,
                    count: None,
                },
            ),
            Some(end) => {
                let count = if step == 0 {
                    0
                } else {
                    let span = if step > 0 { end - start } else { start - end };
                    if span <= 0 {
                        0
                    } else {
                        let abs_step = step.unsigned_abs() as i64;
                        ((span + abs_step - 1) / abs_step) as usize
                    }
                };
                make(
                    Variant::Indexed,
                    true,
                    Size::Known(count),
                    Source::Range {
                        start,
                        step,
                        count: Some(count),
                    },
                )
            }
        }
    }

    /// `value` repeated `times` times, or forever.
    pub fn repeat(value: Value, times: Option<usize>) -> Seq {
        let size = match times {
            Some(n) => Size::Known(n),
            None => Size::Infinite,
        };
        make(Variant::Indexed, true, size, Source::Repeat { value, times })
    }
}

// ============================================================================
// Inspection
// ============================================================================

impl Seq {
    pub fn variant(&self) -> Variant {
        self.inner.variant
    }

    pub fn ordered(&self) -> bool {
        self.inner.ordered
    }

    /// Declared size until cached; exact size afterwards.
    pub fn size(&self) -> Size {
        if let Some(cache) = self.inner.cache.borrow().as_ref() {
            return Size::Known(cache.len());
        }
        self.inner.declared
    }

    pub fn is_cached(&self) -> bool {
        self.inner.cache.borrow().is_some()
    }

    pub fn ptr_eq(&self, other: &Seq) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The output key for the entry at traversal position `pos` whose
    /// source key was `key` and whose value is `value`. Indexed seqs
    /// address positionally, set seqs key each value by itself, keyed seqs
    /// pass source keys through.
    pub(crate) fn out_key(&self, pos: usize, key: &Value, value: &Value) -> Value {
        match self.inner.variant {
            Variant::Indexed => Value::Int(pos as i64),
            Variant::Set => value.clone(),
            Variant::Keyed => key.clone(),
        }
    }
}

// ============================================================================
// Caching
// ============================================================================

impl Seq {
    /// Materialize the full entry list into the internal cache and fix the
    /// size. One-way; a second call is a no-op. Fails on an unbounded seq.
    pub fn cache_result(&self) -> Result<()> {
        self.force_entries().map(|_| ())
    }

    pub(crate) fn force_entries(&self) -> Result<Rc<Vec<Entry>>> {
        if let Some(cache) = self.inner.cache.borrow().clone() {
            return Ok(cache);
        }
        if self.size().is_infinite() {
            return Err(Error::unbounded("materialization"));
        }
        let mut entries = Vec::new();
        self.iterate(false, &mut |k, v| {
            entries.push((k.clone(), v.clone()));
            true
        })?;
        let cache = Rc::new(entries);
        *self.inner.cache.borrow_mut() = Some(cache.clone());
        Ok(cache)
    }
}

// ============================================================================
// Eager iteration
// ============================================================================

impl Seq {
    /// Visit entries in order (or reverse), stopping when the visitor
    /// returns `false`. Returns the number of entries visited.
    ///
    /// A cached seq replays its snapshot. An uncached seq re-derives from
    /// the live source; transforms that cannot run backwards structurally
    /// (slice, flatten, zip, interpose, the while-transforms) materialize
    /// through the cache first when `reverse` is requested.
    pub fn iterate(
        &self,
        reverse: bool,
        f: &mut dyn FnMut(&Value, &Value) -> bool,
    ) -> Result<usize> {
        let cached = self.inner.cache.borrow().clone();
        if let Some(cache) = cached {
            return Ok(walk(&cache, reverse, f));
        }

        match &self.inner.source {
            Source::Entries(entries) => Ok(walk(entries, reverse, f)),
            Source::Values(values) => {
                let n = values.len();
                let mut visited = 0;
                if reverse {
                    for (j, v) in values.iter().rev().enumerate() {
                        visited += 1;
                        if !f(&Value::Int((n - 1 - j) as i64), v) {
                            break;
                        }
                    }
                } else {
                    for (i, v) in values.iter().enumerate() {
                        visited += 1;
                        if !f(&Value::Int(i as i64), v) {
                            break;
                        }
                    }
                }
                Ok(visited)
            }
            Source::Backend(coll) => coll.iterate(reverse, f),
            Source::Range { start, step, count } => {
                let mut visited = 0;
                match count {
                    Some(n) => {
                        let mut pos_iter: Box<dyn Iterator<Item = usize>> = if reverse {
                            Box::new((0..*n).rev())
                        } else {
                            Box::new(0..*n)
                        };
                        let mut idx = 0usize;
                        loop {
                            let pos = match pos_iter.next() {
                                Some(p) => p,
                                None => break,
                            };
                            let v = Value::Int(start + *step * pos as i64);
                            let k = Value::Int(if reverse { idx as i64 } else { pos as i64 });
                            idx += 1;
                            visited += 1;
                            if !f(&k, &v) {
                                break;
                            }
                        }
                        Ok(visited)
                    }
                    None => {
                        if reverse {
                            return Err(Error::unbounded("reverse iteration"));
                        }
                        let mut pos = 0i64;
                        loop {
                            let v = Value::Int(start + *step * pos);
                            visited += 1;
                            if !f(&Value::Int(pos), &v) {
                                break;
                            }
                            pos += 1;
                        }
                        Ok(visited)
                    }
                }
            }
            Source::Repeat { value, times } => {
                let mut visited = 0;
                match times {
                    Some(n) => {
                        for i in 0..*n {
                            visited += 1;
                            if !f(&Value::Int(i as i64), value) {
                                break;
                            }
                        }
                        Ok(visited)
                    }
                    None => {
                        if reverse {
                            return Err(Error::unbounded("reverse iteration"));
                        }
                        let mut i = 0i64;
                        loop {
                            visited += 1;
                            if !f(&Value::Int(i), value) {
                                break;
                            }
                            i += 1;
                        }
                        Ok(visited)
                    }
                }
            }
            Source::Map { source, f: mapper } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, v| {
                    let mapped = mapper(v, k);
                    let key = self.out_key(visited, k, &mapped);
                    visited += 1;
                    f(&key, &mapped)
                })?;
                Ok(visited)
            }
            Source::Filter { source, pred } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, v| {
                    if pred(v, k) {
                        let key = self.out_key(visited, k, v);
                        visited += 1;
                        f(&key, v)
                    } else {
                        true
                    }
                })?;
                Ok(visited)
            }
            Source::Slice { source, skip, limit } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let mut seen = 0usize;
                let mut visited = 0usize;
                source.iterate(false, &mut |k, v| {
                    seen += 1;
                    if seen <= *skip {
                        return true;
                    }
                    if let Some(limit) = limit {
                        if visited >= *limit {
                            return false;
                        }
                    }
                    let key = self.out_key(visited, k, v);
                    visited += 1;
                    let keep_going = f(&key, v);
                    match limit {
                        Some(limit) => keep_going && visited < *limit,
                        None => keep_going,
                    }
                })?;
                Ok(visited)
            }
            Source::TakeWhile { source, pred } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let mut visited = 0;
                source.iterate(false, &mut |k, v| {
                    if !pred(v, k) {
                        return false;
                    }
                    let key = self.out_key(visited, k, v);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::SkipWhile { source, pred } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let mut skipping = true;
                let mut visited = 0;
                source.iterate(false, &mut |k, v| {
                    if skipping && pred(v, k) {
                        return true;
                    }
                    skipping = false;
                    let key = self.out_key(visited, k, v);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::Reverse { source } => {
                let mut visited = 0;
                source.iterate(!reverse, &mut |k, v| {
                    let key = self.out_key(visited, k, v);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::Flip { source } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, v| {
                    visited += 1;
                    f(v, k)
                })?;
                Ok(visited)
            }
            Source::Retag { source } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, v| {
                    let key = self.out_key(visited, k, v);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::KeySeq { source } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, _v| {
                    let key = Value::Int(visited as i64);
                    visited += 1;
                    f(&key, k)
                })?;
                Ok(visited)
            }
            Source::ValueSeq { source } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |_k, v| {
                    let key = self.out_key(visited, _k, v);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::EntrySeq { source } => {
                let mut visited = 0;
                source.iterate(reverse, &mut |k, v| {
                    let pair = Value::list([k.clone(), v.clone()]);
                    let key = Value::Int(visited as i64);
                    visited += 1;
                    f(&key, &pair)
                })?;
                Ok(visited)
            }
            Source::FromEntries { source } => {
                let mut err = None;
                let mut visited = 0;
                source.iterate(reverse, &mut |_k, v| match entry_of(v) {
                    Ok((ek, ev)) => {
                        visited += 1;
                        f(&ek, &ev)
                    }
                    Err(e) => {
                        err = Some(e);
                        false
                    }
                })?;
                match err {
                    Some(e) => Err(e),
                    None => Ok(visited),
                }
            }
            Source::Flatten { source, depth } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let use_keys = self.inner.variant == Variant::Keyed;
                let mut visited = 0usize;
                let mut stopped = false;
                let mut err = None;
                flatten_eager(
                    source,
                    *depth,
                    use_keys,
                    &mut visited,
                    &mut stopped,
                    &mut err,
                    f,
                );
                match err {
                    Some(e) => Err(e),
                    None => Ok(visited),
                }
            }
            Source::Interpose { source, separator } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let mut visited = 0usize;
                source.iterate(false, &mut |_k, v| {
                    if visited > 0 {
                        let key = Value::Int(visited as i64);
                        visited += 1;
                        if !f(&key, separator) {
                            return false;
                        }
                    }
                    let key = Value::Int(visited as i64);
                    visited += 1;
                    f(&key, v)
                })?;
                Ok(visited)
            }
            Source::Zip { sources, f: zipper, all } => {
                if reverse {
                    return self.iterate_via_cache(reverse, f);
                }
                let mut iters: Vec<SeqIter> =
                    sources.iter().map(|s| s.entries_iter(false)).collect();
                let mut visited = 0usize;
                loop {
                    let mut values = Vec::with_capacity(iters.len());
                    let mut exhausted = 0usize;
                    for it in iters.iter_mut() {
                        match it.next() {
                            Some((_k, v)) => values.push(v),
                            None => {
                                exhausted += 1;
                                values.push(Value::Nil);
                            }
                        }
                    }
                    if exhausted == iters.len() || (!*all && exhausted > 0) {
                        break;
                    }
                    let zipped = zipper(&values);
                    let key = Value::Int(visited as i64);
                    visited += 1;
                    if !f(&key, &zipped) {
                        break;
                    }
                }
                Ok(visited)
            }
            Source::Concat { parts } => {
                let mut visited = 0usize;
                let mut stopped = false;
                let order: Vec<&Seq> = if reverse {
                    parts.iter().rev().collect()
                } else {
                    parts.iter().collect()
                };
                for part in order {
                    if stopped {
                        break;
                    }
                    part.iterate(reverse, &mut |k, v| {
                        let key = self.out_key(visited, k, v);
                        visited += 1;
                        if f(&key, v) {
                            true
                        } else {
                            stopped = true;
                            false
                        }
                    })?;
                }
                Ok(visited)
            }
        }
    }

    fn iterate_via_cache(
        &self,
        reverse: bool,
        f: &mut dyn FnMut(&Value, &Value) -> bool,
    ) -> Result<usize> {
        let entries = self.force_entries()?;
        Ok(walk(&entries, reverse, f))
    }

    /// External pull iterator over `(key, value)` entries.
    pub fn entries_iter(&self, reverse: bool) -> SeqIter {
        SeqIter::new(self, reverse)
    }

    /// External iterator over keys.
    pub fn keys(&self) -> Keys {
        Keys::new(self.entries_iter(false))
    }

    /// External iterator over values.
    pub fn values(&self) -> Values {
        Values::new(self.entries_iter(false))
    }

    /// External iterator over `(key, value)` entries.
    pub fn entries(&self) -> Entries {
        Entries::new(self.entries_iter(false))
    }
}

fn walk(entries: &[Entry], reverse: bool, f: &mut dyn FnMut(&Value, &Value) -> bool) -> usize {
    let mut visited = 0;
    if reverse {
        for (k, v) in entries.iter().rev() {
            visited += 1;
            if !f(k, v) {
                break;
            }
        }
    } else {
        for (k, v) in entries.iter() {
            visited += 1;
            if !f(k, v) {
                break;
            }
        }
    }
    visited
}

/// Split a `[key, value]` pair list into its parts.
pub(crate) fn entry_of(v: &Value) -> Result<(Value, Value)> {
    if let Value::Coll(coll) = v {
        if coll.variant() == Variant::Indexed {
            let k = coll.get(&Value::Int(0));
            let val = coll.get(&Value::Int(1));
            if let (Some(k), Some(val)) = (k, val) {
                return Ok((k, val));
            }
        }
    }
    Err(Error::invalid_input(
        "from_entry_seq",
        format!("expected [key, value] entry, got {}", v.type_name()),
    ))
}

/// Eager flatten over the host call stack; bounded by nesting depth.
#[allow(clippy::too_many_arguments)]
fn flatten_eager(
    seq: &Seq,
    depth: Option<usize>,
    use_keys: bool,
    visited: &mut usize,
    stopped: &mut bool,
    err: &mut Option<Error>,
    f: &mut dyn FnMut(&Value, &Value) -> bool,
) {
    let result = seq.iterate(false, &mut |k, v| {
        let descend = match v {
            Value::Coll(_) => depth.map_or(true, |d| d > 0),
            _ => false,
        };
        if descend {
            if let Value::Coll(coll) = v {
                let nested = coll.to_seq();
                flatten_eager(
                    &nested,
                    depth.map(|d| d - 1),
                    use_keys,
                    visited,
                    stopped,
                    err,
                    f,
                );
            }
            !*stopped && err.is_none()
        } else {
            let key = if use_keys {
                k.clone()
            } else {
                Value::Int(*visited as i64)
            };
            *visited += 1;
            if f(&key, v) {
                true
            } else {
                *stopped = true;
                false
            }
        }
    });
    if let Err(e) = result {
        *err = Some(e);
    }
}

// ============================================================================
// Transformer factories
// ============================================================================

impl Seq {
    fn derive(&self, variant: Variant, size: Size, source: Source) -> Seq {
        make(variant, self.inner.ordered, size, source)
    }

    /// Lazy map over values. Preserves keys and size.
    pub fn map(&self, f: impl Fn(&Value, &Value) -> Value + 'static) -> Seq {
        self.derive(
            self.inner.variant,
            self.size(),
            Source::Map {
                source: self.clone(),
                f: Rc::new(f),
            },
        )
    }

    /// Lazy filter. Size becomes unknown.
    pub fn filter(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.derive(
            self.inner.variant,
            Size::Unknown,
            Source::Filter {
                source: self.clone(),
                pred: Rc::new(pred),
            },
        )
    }

    /// Resolved slice: drop `skip` entries, then yield at most `limit`.
    pub fn slice_from(&self, skip: usize, limit: Option<usize>) -> Seq {
        if skip == 0 && limit.is_none() {
            return self.clone();
        }
        let size = match (self.size(), limit) {
            (Size::Known(n), Some(l)) => Size::Known(n.saturating_sub(skip).min(l)),
            (Size::Known(n), None) => Size::Known(n.saturating_sub(skip)),
            (Size::Infinite, Some(l)) => Size::Known(l),
            (Size::Infinite, None) => Size::Infinite,
            (Size::Unknown, _) => Size::Unknown,
        };
        self.derive(
            self.inner.variant,
            size,
            Source::Slice {
                source: self.clone(),
                skip,
                limit,
            },
        )
    }

    /// Slice with possibly-negative bounds. Negative bounds resolve
    /// against the size, counting if it is not yet known; resolving a
    /// negative bound against an unbounded seq is an error.
    pub fn slice(&self, begin: i64, end: Option<i64>) -> Result<Seq> {
        let needs_size = begin < 0 || end.map_or(false, |e| e < 0);
        if needs_size && self.size().is_infinite() {
            return Err(Error::unbounded("slice with negative bounds"));
        }
        let len = if needs_size {
            match self.size().known() {
                Some(n) => Some(n),
                None => Some(self.force_entries()?.len()),
            }
        } else {
            self.size().known()
        };
        let resolve = |bound: i64| -> usize {
            if bound < 0 {
                let len = len.unwrap_or(0);
                (bound + len as i64).max(0) as usize
            } else {
                bound as usize
            }
        };
        let skip = resolve(begin);
        let limit = end.map(|e| resolve(e).saturating_sub(skip));
        Ok(self.slice_from(skip, limit))
    }

    pub fn take(&self, n: usize) -> Seq {
        self.slice_from(0, Some(n))
    }

    pub fn skip(&self, n: usize) -> Seq {
        self.slice_from(n, None)
    }

    pub fn take_while(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.derive(
            self.inner.variant,
            Size::Unknown,
            Source::TakeWhile {
                source: self.clone(),
                pred: Rc::new(pred),
            },
        )
    }

    pub fn skip_while(&self, pred: impl Fn(&Value, &Value) -> bool + 'static) -> Seq {
        self.derive(
            self.inner.variant,
            Size::Unknown,
            Source::SkipWhile {
                source: self.clone(),
                pred: Rc::new(pred),
            },
        )
    }

    /// Lazy reverse. Preserves size; indexed output is re-addressed from
    /// the other end.
    pub fn reverse(&self) -> Seq {
        self.derive(
            self.inner.variant,
            self.size(),
            Source::Reverse {
                source: self.clone(),
            },
        )
    }

    /// Swap key and value roles. The result is keyed.
    pub fn flip(&self) -> Seq {
        self.derive(
            Variant::Keyed,
            self.size(),
            Source::Flip {
                source: self.clone(),
            },
        )
    }

    /// Same entries, keyed tag (indexed seqs key by position already).
    pub fn to_keyed_seq(&self) -> Seq {
        if self.inner.variant == Variant::Keyed {
            return self.clone();
        }
        self.derive(
            Variant::Keyed,
            self.size(),
            Source::Retag {
                source: self.clone(),
            },
        )
    }

    /// Values, indexed by position.
    pub fn to_indexed_seq(&self) -> Seq {
        if self.inner.variant == Variant::Indexed {
            return self.clone();
        }
        self.value_seq()
    }

    /// Values keyed by themselves.
    pub fn to_set_seq(&self) -> Seq {
        if self.inner.variant == Variant::Set {
            return self.clone();
        }
        self.derive(
            Variant::Set,
            self.size(),
            Source::ValueSeq {
                source: self.clone(),
            },
        )
    }

    /// Indexed seq of this seq's keys.
    pub fn key_seq(&self) -> Seq {
        self.derive(
            Variant::Indexed,
            self.size(),
            Source::KeySeq {
                source: self.clone(),
            },
        )
    }

    /// Indexed seq of this seq's values.
    pub fn value_seq(&self) -> Seq {
        self.derive(
            Variant::Indexed,
            self.size(),
            Source::ValueSeq {
                source: self.clone(),
            },
        )
    }

    /// Indexed seq of `[key, value]` pair lists.
    pub fn entry_seq(&self) -> Seq {
        self.derive(
            Variant::Indexed,
            self.size(),
            Source::EntrySeq {
                source: self.clone(),
            },
        )
    }

    /// Keyed seq from an indexed seq of `[key, value]` pair lists.
    pub fn from_entry_seq(&self) -> Seq {
        self.derive(
            Variant::Keyed,
            self.size(),
            Source::FromEntries {
                source: self.clone(),
            },
        )
    }

    /// Inline nested collections up to `depth` levels deep (`None` =
    /// unlimited). Keyed seqs keep leaf keys; others re-address.
    pub fn flatten(&self, depth: Option<usize>) -> Seq {
        let variant = match self.inner.variant {
            Variant::Keyed => Variant::Keyed,
            _ => Variant::Indexed,
        };
        self.derive(
            variant,
            Size::Unknown,
            Source::Flatten {
                source: self.clone(),
                depth,
            },
        )
    }

    /// Map, then inline one level of returned collections.
    pub fn flat_map(&self, f: impl Fn(&Value, &Value) -> Value + 'static) -> Seq {
        self.map(f).flatten(Some(1))
    }

    /// Alternate entries with `separator`, omitting it before the first.
    pub fn interpose(&self, separator: Value) -> Seq {
        let size = match self.size() {
            Size::Known(0) => Size::Known(0),
            Size::Known(n) => Size::Known(2 * n - 1),
            other => other,
        };
        self.derive(
            Variant::Indexed,
            size,
            Source::Interpose {
                source: self.clone(),
                separator,
            },
        )
    }

    /// Lock-step traversal of `self` and `others`, combining values with
    /// `f`. Ends when any operand exhausts.
    pub fn zip_with(&self, f: impl Fn(&[Value]) -> Value + 'static, others: &[Seq]) -> Seq {
        self.zip_mode(Rc::new(f), others, false)
    }

    /// Lock-step traversal that ends only when every operand has
    /// exhausted, substituting `Nil` for the missing slots.
    pub fn zip_all_with(&self, f: impl Fn(&[Value]) -> Value + 'static, others: &[Seq]) -> Seq {
        self.zip_mode(Rc::new(f), others, true)
    }

    fn zip_mode(&self, f: ZipFn, others: &[Seq], all: bool) -> Seq {
        let mut sources = Vec::with_capacity(1 + others.len());
        sources.push(self.clone());
        sources.extend(others.iter().cloned());
        let size = sources
            .iter()
            .map(|s| s.size())
            .reduce(|a, b| if all { a.zip_max(b) } else { a.zip_min(b) })
            .unwrap_or(Size::Known(0));
        make(Variant::Indexed, true, size, Source::Zip { sources, f, all })
    }

    /// Concatenation; keyed seqs keep their keys, others re-address.
    pub fn concat(&self, others: &[Seq]) -> Seq {
        if others.is_empty() {
            return self.clone();
        }
        let mut parts = Vec::with_capacity(1 + others.len());
        parts.push(self.clone());
        parts.extend(others.iter().cloned());
        let size = parts
            .iter()
            .map(|p| p.size())
            .fold(Size::Known(0), Size::plus);
        self.derive(self.inner.variant, size, Source::Concat { parts })
    }

    /// Eager, stable sort. Snapshots `(key, value, insertion index, sort
    /// key)` tuples; ties resolve by insertion index regardless of host
    /// sort behavior. The result is an eager seq of the same variant.
    pub fn sorted(&self, key_fn: Option<MapFn>, cmp: Option<CmpFn>) -> Result<Seq> {
        if self.size().is_infinite() {
            return Err(Error::unbounded("sort"));
        }
        let mut snapshot: Vec<(Value, Value, usize, Value)> = Vec::new();
        self.iterate(false, &mut |k, v| {
            let sort_key = match &key_fn {
                Some(f) => f(v, k),
                None => v.clone(),
            };
            let idx = snapshot.len();
            snapshot.push((k.clone(), v.clone(), idx, sort_key));
            true
        })?;
        snapshot.sort_by(|a, b| {
            let ord = match &cmp {
                Some(cmp) => cmp(&a.3, &b.3),
                None => default_compare(&a.3, &b.3),
            };
            ord.then(a.2.cmp(&b.2))
        });
        let variant = self.inner.variant;
        let entries: Vec<Entry> = snapshot
            .into_iter()
            .enumerate()
            .map(|(i, (k, v, _, _))| match variant {
                Variant::Indexed => (Value::Int(i as i64), v),
                Variant::Set => (v.clone(), v),
                Variant::Keyed => (k, v),
            })
            .collect();
        let n = entries.len();
        Ok(make(
            variant,
            true,
            Size::Known(n),
            Source::Entries(Rc::new(entries)),
        ))
    }
}

/// Default sort comparator: `Nil` sorts greatest, numbers compare
/// numerically (NaN ties with everything), strings lexicographically, and
/// mixed types fall back to the total value order.
pub fn default_compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Nil, Value::Nil) => Ordering::Equal,
        (Value::Nil, _) => Ordering::Greater,
        (_, Value::Nil) => Ordering::Less,
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.cmp(b),
        },
    }
}

// ============================================================================
// Lookup fast paths
// ============================================================================

impl Seq {
    /// Lookup by key. Structural transforms answer in O(1) against their
    /// source; everything else scans.
    pub fn get(&self, key: &Value) -> Option<Value> {
        let key = match self.resolve_key(key) {
            Some(k) => k,
            None => return None,
        };
        let cached = self.inner.cache.borrow().clone();
        if let Some(cache) = cached {
            return lookup_entries(&cache, self.inner.variant, &key);
        }
        match &self.inner.source {
            Source::Entries(entries) => lookup_entries(entries, self.inner.variant, &key),
            Source::Values(values) => match &key {
                Value::Int(i) if *i >= 0 => values.get(*i as usize).cloned(),
                _ => None,
            },
            Source::Backend(coll) => coll.get(&key),
            Source::Range { start, step, count } => match &key {
                Value::Int(i) if *i >= 0 => {
                    let within = count.map_or(true, |n| (*i as usize) < n);
                    if within {
                        Some(Value::Int(start + step * *i))
                    } else {
                        None
                    }
                }
                _ => None,
            },
            Source::Repeat { value, times } => match &key {
                Value::Int(i) if *i >= 0 => {
                    let within = times.map_or(true, |n| (*i as usize) < n);
                    if within {
                        Some(value.clone())
                    } else {
                        None
                    }
                }
                _ => None,
            },
            Source::Map { source, f } if self.inner.variant != Variant::Set => {
                source.get(&key).map(|v| f(&v, &key))
            }
            Source::Slice { source, skip, limit }
                if self.inner.variant == Variant::Indexed
                    && source.variant() == Variant::Indexed =>
            {
                match &key {
                    Value::Int(i) if *i >= 0 => {
                        let within = limit.map_or(true, |l| (*i as usize) < l);
                        if within {
                            source.get(&Value::Int(*i + *skip as i64))
                        } else {
                            None
                        }
                    }
                    _ => None,
                }
            }
            _ => self.scan_for(&key),
        }
    }

    pub fn has(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Resolve a negative indexed key against the size, counting if
    /// needed. Returns `None` when the key cannot address this seq.
    fn resolve_key(&self, key: &Value) -> Option<Value> {
        if self.inner.variant != Variant::Indexed {
            return Some(key.clone());
        }
        match key {
            Value::Int(i) if *i < 0 => {
                let len = match self.size() {
                    Size::Known(n) => n,
                    Size::Infinite => return None,
                    Size::Unknown => self.force_entries().ok()?.len(),
                };
                let resolved = *i + len as i64;
                if resolved < 0 {
                    None
                } else {
                    Some(Value::Int(resolved))
                }
            }
            _ => Some(key.clone()),
        }
    }

    fn scan_for(&self, key: &Value) -> Option<Value> {
        let mut found = None;
        let _ = self.iterate(false, &mut |k, v| {
            if k == key {
                found = Some(v.clone());
                false
            } else {
                true
            }
        });
        found
    }

    /// Structural hash; unbounded seqs hash to 0.
    pub fn hash_code(&self) -> u32 {
        if self.size().is_infinite() {
            return 0;
        }
        match self.force_entries() {
            Ok(entries) => hash_collection(
                self.inner.variant,
                self.inner.ordered,
                entries.iter().cloned(),
            ),
            Err(_) => 0,
        }
    }
}

fn lookup_entries(entries: &[Entry], variant: Variant, key: &Value) -> Option<Value> {
    if variant == Variant::Indexed {
        if let Value::Int(i) = key {
            if *i >= 0 {
                return entries.get(*i as usize).map(|(_, v)| v.clone());
            }
        }
        return None;
    }
    entries
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Display never forces an uncached transformer.
        let eager = self.inner.cache.borrow().clone().or_else(|| {
            match &self.inner.source {
                Source::Entries(e) => Some(e.clone()),
                _ => None,
            }
        });
        let keyed = self.inner.variant == Variant::Keyed;
        let (open, close) = if self.inner.variant == Variant::Indexed {
            ("[", "]")
        } else {
            ("{", "}")
        };
        write!(f, "Seq {}", open)?;
        match eager {
            Some(entries) => {
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if keyed {
                        write!(f, " {}: {}", k, v)?;
                    } else {
                        write!(f, " {}", v)?;
                    }
                }
                write!(f, " {}", close)
            }
            None => write!(f, " … {}", close),
        }
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
