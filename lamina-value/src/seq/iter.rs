// lamina-value - External iterators over lazy sequences
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Pull-based iteration.
//!
//! `SeqIter` is the external counterpart of `Seq::iterate`: it derives the
//! same entries but can be suspended between `next()` calls. Flatten keeps
//! an explicit stack of parent iterators rather than recursing, so a
//! consumer can abandon traversal at any nesting depth. Transforms that
//! cannot run backwards structurally materialize lazily through the
//! sequence cache on first pull.

use std::rc::Rc;

use crate::coll::Entry;
use crate::value::{Value, Variant};

use super::{entry_of, Seq, Source, ZipFn};

enum IterState {
    Done,
    Boxed(Box<dyn Iterator<Item = Entry>>),
    /// Explicit stack of `(iterator, remaining depth)` frames
    Flatten {
        stack: Vec<(SeqIter, Option<usize>)>,
        use_keys: bool,
        pos: usize,
    },
    /// Lock-step pull over every operand
    Zip {
        iters: Vec<SeqIter>,
        f: ZipFn,
        all: bool,
        pos: usize,
        done: bool,
    },
    /// Deferred materialization for reverse traversal of one-way transforms
    Lazy {
        seq: Seq,
        reverse: bool,
    },
}

/// External iterator over a seq's `(key, value)` entries.
pub struct SeqIter {
    state: IterState,
}

/// Re-address entries for the output variant: indexed seqs key by pull
/// position, set seqs key each value by itself, keyed seqs pass through.
fn rekey(
    variant: Variant,
    inner: impl Iterator<Item = Entry> + 'static,
) -> Box<dyn Iterator<Item = Entry>> {
    match variant {
        Variant::Keyed => Box::new(inner),
        Variant::Indexed => Box::new(
            inner
                .enumerate()
                .map(|(i, (_k, v))| (Value::Int(i as i64), v)),
        ),
        Variant::Set => Box::new(inner.map(|(_k, v)| (v.clone(), v))),
    }
}

fn boxed_entries(cache: Rc<Vec<Entry>>, reverse: bool) -> IterState {
    let n = cache.len();
    if reverse {
        IterState::Boxed(Box::new((0..n).rev().map(move |i| cache[i].clone())))
    } else {
        IterState::Boxed(Box::new((0..n).map(move |i| cache[i].clone())))
    }
}

impl SeqIter {
    pub(crate) fn new(seq: &Seq, reverse: bool) -> SeqIter {
        let variant = seq.variant();
        let cached = seq.inner.cache.borrow().clone();
        if let Some(cache) = cached {
            return SeqIter {
                state: boxed_entries(cache, reverse),
            };
        }
        let state = match &seq.inner.source {
            Source::Entries(entries) => boxed_entries(entries.clone(), reverse),
            Source::Values(values) => {
                let values = values.clone();
                let n = values.len();
                if reverse {
                    IterState::Boxed(Box::new(
                        (0..n)
                            .rev()
                            .map(move |i| (Value::Int(i as i64), values[i].clone())),
                    ))
                } else {
                    IterState::Boxed(Box::new(
                        (0..n).map(move |i| (Value::Int(i as i64), values[i].clone())),
                    ))
                }
            }
            Source::Backend(coll) => IterState::Boxed(coll.entries_iter(reverse)),
            Source::Range { start, step, count } => {
                let start = *start;
                let step = *step;
                match count {
                    Some(n) => {
                        let n = *n;
                        if reverse {
                            IterState::Boxed(Box::new((0..n).rev().enumerate().map(
                                move |(idx, pos)| {
                                    (Value::Int(idx as i64), Value::Int(start + step * pos as i64))
                                },
                            )))
                        } else {
                            IterState::Boxed(Box::new((0..n).map(move |pos| {
                                (Value::Int(pos as i64), Value::Int(start + step * pos as i64))
                            })))
                        }
                    }
                    None => {
                        if reverse {
                            IterState::Done
                        } else {
                            IterState::Boxed(Box::new((0u64..).map(move |pos| {
                                (
                                    Value::Int(pos as i64),
                                    Value::Int(start + step * pos as i64),
                                )
                            })))
                        }
                    }
                }
            }
            Source::Repeat { value, times } => {
                let value = value.clone();
                match times {
                    Some(n) => {
                        let n = *n;
                        IterState::Boxed(Box::new(
                            (0..n).map(move |i| (Value::Int(i as i64), value.clone())),
                        ))
                    }
                    None => {
                        if reverse {
                            IterState::Done
                        } else {
                            IterState::Boxed(Box::new(
                                (0u64..).map(move |i| (Value::Int(i as i64), value.clone())),
                            ))
                        }
                    }
                }
            }
            Source::Map { source, f } => {
                let f = f.clone();
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(rekey(
                    variant,
                    inner.map(move |(k, v)| {
                        let mapped = f(&v, &k);
                        (k, mapped)
                    }),
                ))
            }
            Source::Filter { source, pred } => {
                let pred = pred.clone();
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(rekey(variant, inner.filter(move |(k, v)| pred(v, k))))
            }
            Source::Slice { source, skip, limit } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    let inner = SeqIter::new(source, false).skip(*skip);
                    match limit {
                        Some(limit) => {
                            IterState::Boxed(rekey(variant, inner.take(*limit)))
                        }
                        None => IterState::Boxed(rekey(variant, inner)),
                    }
                }
            }
            Source::TakeWhile { source, pred } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    let pred = pred.clone();
                    let inner = SeqIter::new(source, false);
                    IterState::Boxed(rekey(variant, inner.take_while(move |(k, v)| pred(v, k))))
                }
            }
            Source::SkipWhile { source, pred } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    let pred = pred.clone();
                    let inner = SeqIter::new(source, false);
                    IterState::Boxed(rekey(variant, inner.skip_while(move |(k, v)| pred(v, k))))
                }
            }
            Source::Reverse { source } => {
                let inner = SeqIter::new(source, !reverse);
                IterState::Boxed(rekey(variant, inner))
            }
            Source::Flip { source } => {
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(Box::new(inner.map(|(k, v)| (v, k))))
            }
            Source::Retag { source } | Source::ValueSeq { source } => {
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(rekey(variant, inner))
            }
            Source::KeySeq { source } => {
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(Box::new(
                    inner
                        .enumerate()
                        .map(|(i, (k, _v))| (Value::Int(i as i64), k)),
                ))
            }
            Source::EntrySeq { source } => {
                let inner = SeqIter::new(source, reverse);
                IterState::Boxed(Box::new(inner.enumerate().map(|(i, (k, v))| {
                    (Value::Int(i as i64), Value::list([k, v]))
                })))
            }
            Source::FromEntries { source } => {
                let inner = SeqIter::new(source, reverse);
                // Ends at the first malformed entry, where eager iteration
                // reports an error.
                IterState::Boxed(Box::new(
                    inner.map_while(|(_k, v)| entry_of(&v).ok()),
                ))
            }
            Source::Flatten { source, depth } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    IterState::Flatten {
                        stack: vec![(SeqIter::new(source, false), *depth)],
                        use_keys: variant == Variant::Keyed,
                        pos: 0,
                    }
                }
            }
            Source::Interpose { source, separator } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    let sep = separator.clone();
                    let inner = SeqIter::new(source, false);
                    let alternated = inner
                        .flat_map(move |(_k, v)| {
                            vec![(Value::Nil, sep.clone()), (Value::Nil, v)].into_iter()
                        })
                        .skip(1);
                    IterState::Boxed(rekey(Variant::Indexed, alternated))
                }
            }
            Source::Zip { sources, f, all } => {
                if reverse {
                    IterState::Lazy {
                        seq: seq.clone(),
                        reverse,
                    }
                } else {
                    IterState::Zip {
                        iters: sources.iter().map(|s| SeqIter::new(s, false)).collect(),
                        f: f.clone(),
                        all: *all,
                        pos: 0,
                        done: false,
                    }
                }
            }
            Source::Concat { parts } => {
                let ordered: Vec<Seq> = if reverse {
                    parts.iter().rev().cloned().collect()
                } else {
                    parts.to_vec()
                };
                let chained = ordered
                    .into_iter()
                    .flat_map(move |part| SeqIter::new(&part, reverse));
                IterState::Boxed(rekey(variant, chained))
            }
        };
        SeqIter { state }
    }
}

impl Iterator for SeqIter {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if matches!(self.state, IterState::Lazy { .. }) {
            let state = std::mem::replace(&mut self.state, IterState::Done);
            if let IterState::Lazy { seq, reverse } = state {
                self.state = match seq.force_entries() {
                    Ok(cache) => boxed_entries(cache, reverse),
                    Err(_) => IterState::Done,
                };
            }
        }
        match &mut self.state {
            IterState::Done => None,
            IterState::Lazy { .. } => None,
            IterState::Boxed(inner) => inner.next(),
            IterState::Flatten {
                stack,
                use_keys,
                pos,
            } => loop {
                let (next, depth) = match stack.last_mut() {
                    None => return None,
                    Some((iter, depth)) => (iter.next(), *depth),
                };
                match next {
                    None => {
                        stack.pop();
                    }
                    Some((k, v)) => {
                        let descend = matches!(v, Value::Coll(_))
                            && depth.map_or(true, |d| d > 0);
                        if descend {
                            if let Value::Coll(coll) = v {
                                stack.push((
                                    SeqIter::new(&coll.to_seq(), false),
                                    depth.map(|d| d - 1),
                                ));
                            }
                        } else {
                            let key = if *use_keys {
                                k
                            } else {
                                Value::Int(*pos as i64)
                            };
                            *pos += 1;
                            return Some((key, v));
                        }
                    }
                }
            },
            IterState::Zip {
                iters,
                f,
                all,
                pos,
                done,
            } => {
                if *done {
                    return None;
                }
                let mut values = Vec::with_capacity(iters.len());
                let mut exhausted = 0usize;
                for iter in iters.iter_mut() {
                    match iter.next() {
                        Some((_k, v)) => values.push(v),
                        None => {
                            exhausted += 1;
                            values.push(Value::Nil);
                        }
                    }
                }
                if exhausted == iters.len() || (!*all && exhausted > 0) {
                    *done = true;
                    return None;
                }
                let key = Value::Int(*pos as i64);
                *pos += 1;
                Some((key, f(&values)))
            }
        }
    }
}

// ============================================================================
// Mode adapters
// ============================================================================

/// Iterator over a seq's keys.
pub struct Keys(SeqIter);

impl Keys {
    pub(crate) fn new(inner: SeqIter) -> Keys {
        Keys(inner)
    }
}

impl Iterator for Keys {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.0.next().map(|(k, _)| k)
    }
}

/// Iterator over a seq's values.
pub struct Values(SeqIter);

impl Values {
    pub(crate) fn new(inner: SeqIter) -> Values {
        Values(inner)
    }
}

impl Iterator for Values {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.0.next().map(|(_, v)| v)
    }
}

/// Iterator over a seq's `(key, value)` entries.
pub struct Entries(SeqIter);

impl Entries {
    pub(crate) fn new(inner: SeqIter) -> Entries {
        Entries(inner)
    }
}

impl Iterator for Entries {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        self.0.next()
    }
}
