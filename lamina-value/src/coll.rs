// lamina-value - Concrete persistent collection backends
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The concrete collection backends: thin wrappers over the `im` tries,
//! plus the closed `Coll` variant enum the rest of the library dispatches
//! on. Each backend supplies the iteration primitives and native
//! `get`/`set`/`remove`/`size`; everything else is derived generically.
//!
//! Structural-sharing invariant: an update that does not change a slot
//! returns the receiver's own root (`ptr_eq` holds), never a rebuilt copy.

use std::cmp::Ordering;
use std::fmt;

use im::{HashMap, HashSet, OrdMap, OrdSet, Vector};

use crate::error::{Error, Result};
use crate::hash::hash_collection;
use crate::seq::Seq;
use crate::value::{Size, Value, Variant};

pub(crate) type Entry = (Value, Value);

/// Resolve a possibly-negative index against a known length.
pub(crate) fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index < 0 {
        let wrapped = index + len as i64;
        if wrapped < 0 {
            None
        } else {
            Some(wrapped as usize)
        }
    } else {
        Some(index as usize)
    }
}

// ============================================================================
// List
// ============================================================================

/// Indexed persistent list backed by `im::Vector`.
#[derive(Clone, Default)]
pub struct List {
    pub(crate) items: Vector<Value>,
}

impl List {
    pub fn new() -> List {
        List {
            items: Vector::new(),
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> List {
        List {
            items: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element at `index`; negative indices wrap from the end.
    pub fn nth(&self, index: i64) -> Option<&Value> {
        let idx = resolve_index(index, self.items.len())?;
        self.items.get(idx)
    }

    pub fn first(&self) -> Option<&Value> {
        self.items.front()
    }

    pub fn last(&self) -> Option<&Value> {
        self.items.back()
    }

    pub fn push(&self, value: Value) -> List {
        let mut items = self.items.clone();
        items.push_back(value);
        List { items }
    }

    pub fn pop(&self) -> List {
        if self.items.is_empty() {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.pop_back();
        List { items }
    }

    /// Replace the slot at `index`, padding with `Nil` when setting past
    /// the end. Returns the receiver unchanged when the slot already holds
    /// an identical value.
    pub fn set_at(&self, index: i64, value: Value) -> Result<List> {
        let idx = resolve_index(index, self.items.len()).ok_or(Error::IndexOutOfBounds {
            index,
            length: self.items.len(),
        })?;
        if let Some(existing) = self.items.get(idx) {
            if Value::is(existing, &value) {
                return Ok(self.clone());
            }
            let mut items = self.items.clone();
            items.set(idx, value);
            Ok(List { items })
        } else {
            let mut items = self.items.clone();
            while items.len() < idx {
                items.push_back(Value::Nil);
            }
            items.push_back(value);
            Ok(List { items })
        }
    }

    /// Remove the slot at `index`; out-of-range removal is a no-op.
    pub fn remove_at(&self, index: i64) -> List {
        match resolve_index(index, self.items.len()) {
            Some(idx) if idx < self.items.len() => {
                let mut items = self.items.clone();
                items.remove(idx);
                List { items }
            }
            _ => self.clone(),
        }
    }

    pub fn insert_at(&self, index: usize, value: Value) -> Result<List> {
        if index > self.items.len() {
            return Err(Error::IndexOutOfBounds {
                index: index as i64,
                length: self.items.len(),
            });
        }
        let mut items = self.items.clone();
        items.insert(index, value);
        Ok(List { items })
    }

    pub fn iter(&self) -> im::vector::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        self.items.ptr_eq(&other.items)
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> List {
        List::from_values(iter)
    }
}

// ============================================================================
// Map and SortedMap
// ============================================================================

/// Unordered persistent map backed by `im::HashMap`.
#[derive(Clone, Default)]
pub struct Map {
    pub(crate) entries: HashMap<Value, Value>,
}

/// Key-ordered persistent map backed by `im::OrdMap`. Iterates in key
/// order, and hashes order-sensitively.
#[derive(Clone, Default)]
pub struct SortedMap {
    pub(crate) entries: OrdMap<Value, Value>,
}

macro_rules! map_impl {
    ($name:ident) => {
        impl $name {
            pub fn new() -> $name {
                $name {
                    entries: Default::default(),
                }
            }

            pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> $name {
                $name {
                    entries: pairs.into_iter().collect(),
                }
            }

            pub fn len(&self) -> usize {
                self.entries.len()
            }

            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }

            pub fn lookup(&self, key: &Value) -> Option<&Value> {
                self.entries.get(key)
            }

            pub fn contains(&self, key: &Value) -> bool {
                self.entries.contains_key(key)
            }

            /// Insert, returning the receiver unchanged when the key already
            /// holds an identical value.
            pub fn insert(&self, key: Value, value: Value) -> $name {
                if let Some(existing) = self.entries.get(&key) {
                    if Value::is(existing, &value) {
                        return self.clone();
                    }
                }
                let mut entries = self.entries.clone();
                entries.insert(key, value);
                $name { entries }
            }

            /// Remove a key; removing an absent key is a no-op.
            pub fn without(&self, key: &Value) -> $name {
                if !self.entries.contains_key(key) {
                    return self.clone();
                }
                let mut entries = self.entries.clone();
                entries.remove(key);
                $name { entries }
            }

            pub fn ptr_eq(&self, other: &$name) -> bool {
                self.entries.ptr_eq(&other.entries)
            }
        }

        impl FromIterator<(Value, Value)> for $name {
            fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> $name {
                $name::from_pairs(iter)
            }
        }
    };
}

map_impl!(Map);
map_impl!(SortedMap);

// ============================================================================
// Set and SortedSet
// ============================================================================

/// Unordered persistent set backed by `im::HashSet`.
#[derive(Clone, Default)]
pub struct Set {
    pub(crate) values: HashSet<Value>,
}

/// Ordered persistent set backed by `im::OrdSet`.
#[derive(Clone, Default)]
pub struct SortedSet {
    pub(crate) values: OrdSet<Value>,
}

macro_rules! set_impl {
    ($name:ident) => {
        impl $name {
            pub fn new() -> $name {
                $name {
                    values: Default::default(),
                }
            }

            pub fn from_values(values: impl IntoIterator<Item = Value>) -> $name {
                $name {
                    values: values.into_iter().collect(),
                }
            }

            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn contains(&self, value: &Value) -> bool {
                self.values.contains(value)
            }

            /// Add a value; adding a present value is a no-op.
            pub fn add(&self, value: Value) -> $name {
                if self.values.contains(&value) {
                    return self.clone();
                }
                let mut values = self.values.clone();
                values.insert(value);
                $name { values }
            }

            /// Remove a value; removing an absent value is a no-op.
            pub fn without(&self, value: &Value) -> $name {
                if !self.values.contains(value) {
                    return self.clone();
                }
                let mut values = self.values.clone();
                values.remove(value);
                $name { values }
            }

            pub fn ptr_eq(&self, other: &$name) -> bool {
                self.values.ptr_eq(&other.values)
            }
        }

        impl FromIterator<Value> for $name {
            fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> $name {
                $name::from_values(iter)
            }
        }
    };
}

set_impl!(Set);
set_impl!(SortedSet);

// ============================================================================
// Stack
// ============================================================================

/// Indexed persistent stack; `push`/`pop`/`peek` operate on the front.
#[derive(Clone, Default)]
pub struct Stack {
    pub(crate) items: Vector<Value>,
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            items: Vector::new(),
        }
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Stack {
        Stack {
            items: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.items.front()
    }

    pub fn nth(&self, index: i64) -> Option<&Value> {
        let idx = resolve_index(index, self.items.len())?;
        self.items.get(idx)
    }

    pub fn push(&self, value: Value) -> Stack {
        let mut items = self.items.clone();
        items.push_front(value);
        Stack { items }
    }

    pub fn pop(&self) -> Stack {
        if self.items.is_empty() {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.pop_front();
        Stack { items }
    }

    pub fn ptr_eq(&self, other: &Stack) -> bool {
        self.items.ptr_eq(&other.items)
    }
}

impl FromIterator<Value> for Stack {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Stack {
        Stack::from_values(iter)
    }
}

// ============================================================================
// Coll - the closed collection variant
// ============================================================================

/// Any lamina collection. The variant is resolved at construction time;
/// operations dispatch on it with a single match, never per-call flag
/// introspection.
#[derive(Clone)]
pub enum Coll {
    List(List),
    Map(Map),
    SortedMap(SortedMap),
    Set(Set),
    SortedSet(SortedSet),
    Stack(Stack),
    Seq(Seq),
}

impl Coll {
    pub fn variant(&self) -> Variant {
        match self {
            Coll::List(_) | Coll::Stack(_) => Variant::Indexed,
            Coll::Map(_) | Coll::SortedMap(_) => Variant::Keyed,
            Coll::Set(_) | Coll::SortedSet(_) => Variant::Set,
            Coll::Seq(s) => s.variant(),
        }
    }

    pub fn ordered(&self) -> bool {
        match self {
            Coll::List(_) | Coll::Stack(_) => true,
            Coll::SortedMap(_) | Coll::SortedSet(_) => true,
            Coll::Map(_) | Coll::Set(_) => false,
            Coll::Seq(s) => s.ordered(),
        }
    }

    pub fn size(&self) -> Size {
        match self {
            Coll::List(l) => Size::Known(l.len()),
            Coll::Map(m) => Size::Known(m.len()),
            Coll::SortedMap(m) => Size::Known(m.len()),
            Coll::Set(s) => Size::Known(s.len()),
            Coll::SortedSet(s) => Size::Known(s.len()),
            Coll::Stack(s) => Size::Known(s.len()),
            Coll::Seq(s) => s.size(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Coll::List(_) => "list",
            Coll::Map(_) => "map",
            Coll::SortedMap(_) => "sorted map",
            Coll::Set(_) => "set",
            Coll::SortedSet(_) => "sorted set",
            Coll::Stack(_) => "stack",
            Coll::Seq(_) => "seq",
        }
    }

    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            Coll::List(_) => "List",
            Coll::Map(_) => "Map",
            Coll::SortedMap(_) => "SortedMap",
            Coll::Set(_) => "Set",
            Coll::SortedSet(_) => "SortedSet",
            Coll::Stack(_) => "Stack",
            Coll::Seq(_) => "Seq",
        }
    }

    /// Root-pointer identity between collections of the same backend.
    pub fn ptr_eq(&self, other: &Coll) -> bool {
        match (self, other) {
            (Coll::List(a), Coll::List(b)) => a.ptr_eq(b),
            (Coll::Map(a), Coll::Map(b)) => a.ptr_eq(b),
            (Coll::SortedMap(a), Coll::SortedMap(b)) => a.ptr_eq(b),
            (Coll::Set(a), Coll::Set(b)) => a.ptr_eq(b),
            (Coll::SortedSet(a), Coll::SortedSet(b)) => a.ptr_eq(b),
            (Coll::Stack(a), Coll::Stack(b)) => a.ptr_eq(b),
            (Coll::Seq(a), Coll::Seq(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Lazy view of this collection. A `Seq` is its own view.
    pub fn to_seq(&self) -> Seq {
        match self {
            Coll::Seq(s) => s.clone(),
            other => Seq::from_backend(other.clone()),
        }
    }

    /// Entry iteration over the collection, `(key, value)` pairs.
    ///
    /// Indexed collections key by position, sets key each value by itself.
    /// Reverse order materializes for the unordered backends.
    pub fn entries_iter(&self, reverse: bool) -> Box<dyn Iterator<Item = Entry>> {
        match self {
            Coll::List(l) => {
                let n = l.items.len();
                if reverse {
                    Box::new(
                        l.items
                            .clone()
                            .into_iter()
                            .rev()
                            .enumerate()
                            .map(move |(j, v)| (Value::Int((n - 1 - j) as i64), v)),
                    )
                } else {
                    Box::new(
                        l.items
                            .clone()
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (Value::Int(i as i64), v)),
                    )
                }
            }
            Coll::Stack(s) => {
                let n = s.items.len();
                if reverse {
                    Box::new(
                        s.items
                            .clone()
                            .into_iter()
                            .rev()
                            .enumerate()
                            .map(move |(j, v)| (Value::Int((n - 1 - j) as i64), v)),
                    )
                } else {
                    Box::new(
                        s.items
                            .clone()
                            .into_iter()
                            .enumerate()
                            .map(|(i, v)| (Value::Int(i as i64), v)),
                    )
                }
            }
            Coll::Map(m) => {
                if reverse {
                    let mut entries: Vec<Entry> = m.entries.clone().into_iter().collect();
                    entries.reverse();
                    Box::new(entries.into_iter())
                } else {
                    Box::new(m.entries.clone().into_iter())
                }
            }
            Coll::SortedMap(m) => {
                if reverse {
                    let mut entries: Vec<Entry> = m.entries.clone().into_iter().collect();
                    entries.reverse();
                    Box::new(entries.into_iter())
                } else {
                    Box::new(m.entries.clone().into_iter())
                }
            }
            Coll::Set(s) => {
                if reverse {
                    let mut values: Vec<Value> = s.values.clone().into_iter().collect();
                    values.reverse();
                    Box::new(values.into_iter().map(|v| (v.clone(), v)))
                } else {
                    Box::new(s.values.clone().into_iter().map(|v| (v.clone(), v)))
                }
            }
            Coll::SortedSet(s) => {
                if reverse {
                    let mut values: Vec<Value> = s.values.clone().into_iter().collect();
                    values.reverse();
                    Box::new(values.into_iter().map(|v| (v.clone(), v)))
                } else {
                    Box::new(s.values.clone().into_iter().map(|v| (v.clone(), v)))
                }
            }
            Coll::Seq(s) => Box::new(s.entries_iter(reverse)),
        }
    }

    /// Eager visitor iteration; the visitor returns `false` to stop.
    /// Returns the number of entries visited.
    pub fn iterate(
        &self,
        reverse: bool,
        f: &mut dyn FnMut(&Value, &Value) -> bool,
    ) -> Result<usize> {
        match self {
            Coll::Seq(s) => s.iterate(reverse, f),
            _ => {
                let mut visited = 0usize;
                for (k, v) in self.entries_iter(reverse) {
                    visited += 1;
                    if !f(&k, &v) {
                        break;
                    }
                }
                Ok(visited)
            }
        }
    }

    /// Native lookup. Indexed collections resolve negative indices against
    /// their length; sets return the value itself when present.
    pub fn get(&self, key: &Value) -> Option<Value> {
        match self {
            Coll::List(l) => match key {
                Value::Int(i) => l.nth(*i).cloned(),
                _ => None,
            },
            Coll::Stack(s) => match key {
                Value::Int(i) => s.nth(*i).cloned(),
                _ => None,
            },
            Coll::Map(m) => m.lookup(key).cloned(),
            Coll::SortedMap(m) => m.lookup(key).cloned(),
            Coll::Set(s) => {
                if s.contains(key) {
                    Some(key.clone())
                } else {
                    None
                }
            }
            Coll::SortedSet(s) => {
                if s.contains(key) {
                    Some(key.clone())
                } else {
                    None
                }
            }
            Coll::Seq(s) => s.get(key),
        }
    }

    pub fn has(&self, key: &Value) -> bool {
        match self {
            Coll::Seq(s) => s.has(key),
            other => other.get(key).is_some(),
        }
    }

    /// Native update of a single slot. Preserves reference identity for
    /// no-op writes. Not every collection is associative: `set` on a set,
    /// stack or seq is a structural error.
    pub fn set(&self, key: &Value, value: Value) -> Result<Coll> {
        match self {
            Coll::List(l) => match key {
                Value::Int(i) => Ok(Coll::List(l.set_at(*i, value)?)),
                other => Err(Error::type_error_in("set", "integer index", other.type_name())),
            },
            Coll::Map(m) => Ok(Coll::Map(m.insert(key.clone(), value))),
            Coll::SortedMap(m) => Ok(Coll::SortedMap(m.insert(key.clone(), value))),
            other => Err(Error::type_error_in(
                "set",
                "associative collection",
                other.type_name(),
            )),
        }
    }

    /// Native removal of a single slot; removing an absent key is a no-op
    /// returning the receiver.
    pub fn remove(&self, key: &Value) -> Result<Coll> {
        match self {
            Coll::List(l) => match key {
                Value::Int(i) => Ok(Coll::List(l.remove_at(*i))),
                other => Err(Error::type_error_in(
                    "remove",
                    "integer index",
                    other.type_name(),
                )),
            },
            Coll::Map(m) => Ok(Coll::Map(m.without(key))),
            Coll::SortedMap(m) => Ok(Coll::SortedMap(m.without(key))),
            Coll::Set(s) => Ok(Coll::Set(s.without(key))),
            Coll::SortedSet(s) => Ok(Coll::SortedSet(s.without(key))),
            other => Err(Error::type_error_in(
                "remove",
                "associative collection",
                other.type_name(),
            )),
        }
    }

    /// Deep structural equality: variant, ordered flag and entries.
    ///
    /// Collections of different backends compare equal when their shape
    /// flags and contents match (a `List` equals an indexed `Seq` over the
    /// same values); an unordered collection never equals an ordered one.
    pub fn deep_equal(&self, other: &Coll) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.variant() != other.variant() || self.ordered() != other.ordered() {
            return false;
        }
        if self.size().is_infinite() || other.size().is_infinite() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.size().known(), other.size().known()) {
            if a != b {
                return false;
            }
        }
        if self.ordered() {
            let mut a = self.entries_iter(false);
            let mut b = other.entries_iter(false);
            loop {
                match (a.next(), b.next()) {
                    (None, None) => return true,
                    (Some((ak, av)), Some((bk, bv))) => {
                        if ak != bk || av != bv {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        } else {
            // Unordered: containment with matched cardinality.
            let mut count = 0usize;
            for (k, v) in self.entries_iter(false) {
                count += 1;
                match other.get(&k) {
                    Some(found) if found == v => {}
                    _ => return false,
                }
            }
            match other.size().known() {
                Some(n) => n == count,
                None => other.entries_iter(false).count() == count,
            }
        }
    }

    /// Total order over collections, consistent with `deep_equal`: shape
    /// flags first, then lexicographic entry comparison.
    pub fn cmp_coll(&self, other: &Coll) -> Ordering {
        let rank = |c: &Coll| (c.variant().rank(), c.ordered() as u8);
        rank(self)
            .cmp(&rank(other))
            .then_with(|| self.entries_iter(false).cmp(other.entries_iter(false)))
    }

    /// Structural hash. Infinite collections hash to 0.
    pub fn hash_code(&self) -> u32 {
        if self.size().is_infinite() {
            return 0;
        }
        hash_collection(self.variant(), self.ordered(), self.entries_iter(false))
    }
}

impl fmt::Display for Coll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Coll::Seq(s) = self {
            return write!(f, "{}", s);
        }
        write!(f, "{} ", self.display_name())?;
        let keyed = self.variant() == Variant::Keyed;
        let (open, close) = if self.variant() == Variant::Indexed {
            ("[", "]")
        } else {
            ("{", "}")
        };
        write!(f, "{}", open)?;
        for (i, (k, v)) in self.entries_iter(false).enumerate() {
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
}

impl fmt::Debug for Coll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
