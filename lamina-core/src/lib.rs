// lamina-core - Collection contract and path-update algebra for lamina
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # lamina-core
//!
//! The operation surface over `lamina-value`: the polymorphic `Collection`
//! contract, the structural path-update algebra with its deep-path and
//! merge forms, and the host JSON boundary.
//!
//! ```
//! use lamina_core::{update, Value};
//!
//! let data = Value::map([
//!     (Value::from("user"), Value::map([
//!         (Value::from("name"), Value::from("ada")),
//!     ])),
//! ]);
//! let path = [Value::from("user"), Value::from("name")];
//! assert_eq!(update::get_in(&data, &path), Some(Value::from("ada")));
//!
//! let renamed = update::set_in(&data, &path, Value::from("grace")).unwrap();
//! assert_eq!(update::get_in(&renamed, &path), Some(Value::from("grace")));
//! assert_eq!(update::get_in(&data, &path), Some(Value::from("ada")));
//! ```

pub mod collection;
pub mod convert;
pub mod merge;
pub mod update;

pub use collection::Collection;
pub use convert::{from_json, to_json};
pub use merge::{merge, merge_deep, merge_deep_in, merge_deep_with, merge_in, merge_with};

pub use lamina_value::{
    default_compare, Coll, CollBuilder, Entries, Error, Keys, List, ListBuilder, Map, MapBuilder,
    Result, Seq, SeqIter, Set, SetBuilder, Size, SortedMap, SortedMapBuilder, SortedSet,
    SortedSetBuilder, Stack, StackBuilder, Value, Values, Variant,
};
