// lamina-value - Transient builders for batched mutation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Mutation batching.
//!
//! `to_mutable()` produces a builder owning a working copy of the backing
//! trie; builder methods edit it in place. `freeze()` converts back to the
//! persistent type. `with_mutations` wraps the cycle and returns the
//! original handle untouched when no edit actually changed anything, so
//! no-op batches preserve reference identity.
//!
//! A builder must not outlive its batch: single ownership of the mutable
//! phase is enforced by the `&mut` borrow handed to the edit closure.

use crate::coll::{Coll, List, Map, Set, SortedMap, SortedSet, Stack};
use crate::error::{Error, Result};
use crate::value::Value;

// ============================================================================
// List
// ============================================================================

/// Temporarily-mutable working copy of a [`List`].
pub struct ListBuilder {
    items: im::Vector<Value>,
    altered: bool,
}

impl ListBuilder {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn push(&mut self, value: Value) {
        self.items.push_back(value);
        self.altered = true;
    }

    pub fn pop(&mut self) -> Option<Value> {
        let popped = self.items.pop_back();
        if popped.is_some() {
            self.altered = true;
        }
        popped
    }

    /// Replace a slot; writing an identical value does not count as an
    /// alteration.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match self.items.get(index) {
            Some(existing) => {
                if !Value::is(existing, &value) {
                    self.items.set(index, value);
                    self.altered = true;
                }
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                index: index as i64,
                length: self.items.len(),
            }),
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<Value> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfBounds {
                index: index as i64,
                length: self.items.len(),
            });
        }
        self.altered = true;
        Ok(self.items.remove(index))
    }

    pub fn altered(&self) -> bool {
        self.altered
    }

    pub fn freeze(self) -> List {
        List { items: self.items }
    }
}

impl List {
    pub fn to_mutable(&self) -> ListBuilder {
        ListBuilder {
            items: self.items.clone(),
            altered: false,
        }
    }

    /// Run a batch of edits; returns `self` by reference identity when the
    /// batch made no change.
    pub fn with_mutations(&self, edit: impl FnOnce(&mut ListBuilder)) -> List {
        let mut builder = self.to_mutable();
        edit(&mut builder);
        if builder.altered {
            builder.freeze()
        } else {
            self.clone()
        }
    }
}

// ============================================================================
// Map and SortedMap
// ============================================================================

macro_rules! map_builder {
    ($coll:ident, $builder:ident, $tree:ty) => {
        /// Temporarily-mutable working copy of a keyed collection.
        pub struct $builder {
            entries: $tree,
            altered: bool,
        }

        impl $builder {
            pub fn len(&self) -> usize {
                self.entries.len()
            }

            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }

            pub fn get(&self, key: &Value) -> Option<&Value> {
                self.entries.get(key)
            }

            pub fn contains(&self, key: &Value) -> bool {
                self.entries.contains_key(key)
            }

            /// Insert; writing an identical value does not count as an
            /// alteration.
            pub fn set(&mut self, key: Value, value: Value) {
                if let Some(existing) = self.entries.get(&key) {
                    if Value::is(existing, &value) {
                        return;
                    }
                }
                self.entries.insert(key, value);
                self.altered = true;
            }

            pub fn remove(&mut self, key: &Value) -> Option<Value> {
                let removed = self.entries.remove(key);
                if removed.is_some() {
                    self.altered = true;
                }
                removed
            }

            pub fn altered(&self) -> bool {
                self.altered
            }

            pub fn freeze(self) -> $coll {
                $coll {
                    entries: self.entries,
                }
            }
        }

        impl $coll {
            pub fn to_mutable(&self) -> $builder {
                $builder {
                    entries: self.entries.clone(),
                    altered: false,
                }
            }

            /// Run a batch of edits; returns `self` by reference identity
            /// when the batch made no change.
            pub fn with_mutations(&self, edit: impl FnOnce(&mut $builder)) -> $coll {
                let mut builder = self.to_mutable();
                edit(&mut builder);
                if builder.altered {
                    builder.freeze()
                } else {
                    self.clone()
                }
            }
        }
    };
}

map_builder!(Map, MapBuilder, im::HashMap<Value, Value>);
map_builder!(SortedMap, SortedMapBuilder, im::OrdMap<Value, Value>);

// ============================================================================
// Set and SortedSet
// ============================================================================

macro_rules! set_builder {
    ($coll:ident, $builder:ident, $tree:ty) => {
        /// Temporarily-mutable working copy of a set.
        pub struct $builder {
            values: $tree,
            altered: bool,
        }

        impl $builder {
            pub fn len(&self) -> usize {
                self.values.len()
            }

            pub fn is_empty(&self) -> bool {
                self.values.is_empty()
            }

            pub fn contains(&self, value: &Value) -> bool {
                self.values.contains(value)
            }

            /// Add; adding a present value does not count as an alteration.
            pub fn add(&mut self, value: Value) {
                if self.values.contains(&value) {
                    return;
                }
                self.values.insert(value);
                self.altered = true;
            }

            pub fn remove(&mut self, value: &Value) -> bool {
                if self.values.remove(value).is_some() {
                    self.altered = true;
                    true
                } else {
                    false
                }
            }

            pub fn altered(&self) -> bool {
                self.altered
            }

            pub fn freeze(self) -> $coll {
                $coll {
                    values: self.values,
                }
            }
        }

        impl $coll {
            pub fn to_mutable(&self) -> $builder {
                $builder {
                    values: self.values.clone(),
                    altered: false,
                }
            }

            /// Run a batch of edits; returns `self` by reference identity
            /// when the batch made no change.
            pub fn with_mutations(&self, edit: impl FnOnce(&mut $builder)) -> $coll {
                let mut builder = self.to_mutable();
                edit(&mut builder);
                if builder.altered {
                    builder.freeze()
                } else {
                    self.clone()
                }
            }
        }
    };
}

set_builder!(Set, SetBuilder, im::HashSet<Value>);
set_builder!(SortedSet, SortedSetBuilder, im::OrdSet<Value>);

// ============================================================================
// Stack
// ============================================================================

/// Temporarily-mutable working copy of a [`Stack`].
pub struct StackBuilder {
    items: im::Vector<Value>,
    altered: bool,
}

impl StackBuilder {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.items.front()
    }

    pub fn push(&mut self, value: Value) {
        self.items.push_front(value);
        self.altered = true;
    }

    pub fn pop(&mut self) -> Option<Value> {
        let popped = self.items.pop_front();
        if popped.is_some() {
            self.altered = true;
        }
        popped
    }

    pub fn altered(&self) -> bool {
        self.altered
    }

    pub fn freeze(self) -> Stack {
        Stack { items: self.items }
    }
}

impl Stack {
    pub fn to_mutable(&self) -> StackBuilder {
        StackBuilder {
            items: self.items.clone(),
            altered: false,
        }
    }

    /// Run a batch of edits; returns `self` by reference identity when the
    /// batch made no change.
    pub fn with_mutations(&self, edit: impl FnOnce(&mut StackBuilder)) -> Stack {
        let mut builder = self.to_mutable();
        edit(&mut builder);
        if builder.altered {
            builder.freeze()
        } else {
            self.clone()
        }
    }
}

// ============================================================================
// Generic builder over any concrete backend
// ============================================================================

/// Builder over a [`Coll`], used where the backend is not statically known
/// (the merge family). Dispatches each edit to the matching typed builder
/// operation.
pub enum CollBuilder {
    List(ListBuilder),
    Map(MapBuilder),
    SortedMap(SortedMapBuilder),
    Set(SetBuilder),
    SortedSet(SortedSetBuilder),
    Stack(StackBuilder),
}

impl CollBuilder {
    /// Keyed insert. Structural error on non-associative backends.
    pub fn set(&mut self, key: Value, value: Value) -> Result<()> {
        match self {
            CollBuilder::Map(b) => {
                b.set(key, value);
                Ok(())
            }
            CollBuilder::SortedMap(b) => {
                b.set(key, value);
                Ok(())
            }
            CollBuilder::List(b) => match key {
                Value::Int(i) if i >= 0 && (i as usize) < b.len() => b.set(i as usize, value),
                Value::Int(i) if i >= 0 && (i as usize) == b.len() => {
                    b.push(value);
                    Ok(())
                }
                Value::Int(i) => Err(Error::IndexOutOfBounds {
                    index: i,
                    length: b.len(),
                }),
                other => Err(Error::type_error_in(
                    "set",
                    "integer index",
                    other.type_name(),
                )),
            },
            _ => Err(Error::type_error_in(
                "set",
                "associative collection",
                self.type_name(),
            )),
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        match self {
            CollBuilder::Map(b) => b.get(key).cloned(),
            CollBuilder::SortedMap(b) => b.get(key).cloned(),
            CollBuilder::List(b) => match key {
                Value::Int(i) if *i >= 0 => b.get(*i as usize).cloned(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Append for merge: indexed backends push, sets union in.
    pub fn append(&mut self, value: Value) -> Result<()> {
        match self {
            CollBuilder::List(b) => {
                b.push(value);
                Ok(())
            }
            CollBuilder::Stack(b) => {
                b.push(value);
                Ok(())
            }
            CollBuilder::Set(b) => {
                b.add(value);
                Ok(())
            }
            CollBuilder::SortedSet(b) => {
                b.add(value);
                Ok(())
            }
            _ => Err(Error::type_error_in(
                "merge",
                "appendable collection",
                self.type_name(),
            )),
        }
    }

    pub fn altered(&self) -> bool {
        match self {
            CollBuilder::List(b) => b.altered(),
            CollBuilder::Map(b) => b.altered(),
            CollBuilder::SortedMap(b) => b.altered(),
            CollBuilder::Set(b) => b.altered(),
            CollBuilder::SortedSet(b) => b.altered(),
            CollBuilder::Stack(b) => b.altered(),
        }
    }

    pub fn freeze(self) -> Coll {
        match self {
            CollBuilder::List(b) => Coll::List(b.freeze()),
            CollBuilder::Map(b) => Coll::Map(b.freeze()),
            CollBuilder::SortedMap(b) => Coll::SortedMap(b.freeze()),
            CollBuilder::Set(b) => Coll::Set(b.freeze()),
            CollBuilder::SortedSet(b) => Coll::SortedSet(b.freeze()),
            CollBuilder::Stack(b) => Coll::Stack(b.freeze()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            CollBuilder::List(_) => "list",
            CollBuilder::Map(_) => "map",
            CollBuilder::SortedMap(_) => "sorted map",
            CollBuilder::Set(_) => "set",
            CollBuilder::SortedSet(_) => "sorted set",
            CollBuilder::Stack(_) => "stack",
        }
    }
}

impl Coll {
    /// Generic `to_mutable`. A lazy seq has no transient form.
    pub fn to_builder(&self) -> Result<CollBuilder> {
        match self {
            Coll::List(l) => Ok(CollBuilder::List(l.to_mutable())),
            Coll::Map(m) => Ok(CollBuilder::Map(m.to_mutable())),
            Coll::SortedMap(m) => Ok(CollBuilder::SortedMap(m.to_mutable())),
            Coll::Set(s) => Ok(CollBuilder::Set(s.to_mutable())),
            Coll::SortedSet(s) => Ok(CollBuilder::SortedSet(s.to_mutable())),
            Coll::Stack(s) => Ok(CollBuilder::Stack(s.to_mutable())),
            Coll::Seq(_) => Err(Error::type_error_in("to_mutable", "concrete collection", "seq")),
        }
    }

    /// Generic `with_mutations` over any concrete backend.
    pub fn with_mutations(
        &self,
        edit: impl FnOnce(&mut CollBuilder) -> Result<()>,
    ) -> Result<Coll> {
        let mut builder = self.to_builder()?;
        edit(&mut builder)?;
        if builder.altered() {
            Ok(builder.freeze())
        } else {
            Ok(self.clone())
        }
    }
}
