// lamina-value - Value model and lazy sequence engine for lamina
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # lamina-value
//!
//! The value model for lamina's persistent collections: the `Value` enum,
//! deep equality and structural hashing, the `im`-backed concrete backends
//! with their transient builders, and the lazy `Seq` engine.

pub mod builder;
pub mod coll;
pub mod error;
pub mod hash;
pub mod seq;
pub mod value;

pub use builder::{
    CollBuilder, ListBuilder, MapBuilder, SetBuilder, SortedMapBuilder, SortedSetBuilder,
    StackBuilder,
};
pub use coll::{Coll, List, Map, Set, SortedMap, SortedSet, Stack};
pub use error::{Error, Result};
pub use hash::{hash_collection, hash_value};
pub use seq::{default_compare, CmpFn, Entries, Keys, MapFn, PredFn, Seq, SeqIter, Values, ZipFn};
pub use value::{Size, Value, Variant};
