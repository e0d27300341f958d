// lamina-core - Structural path-update algebra
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `get`/`set`/`has`/`remove`/`update` over any value, and their deep-path
//! `*_in` forms.
//!
//! Absence is an `Option`: `None` means the key is not present, which is
//! distinct from a present `Value::Nil`. An updater returning `None`
//! deletes the key.
//!
//! Structural sharing: a parent is rebuilt only when its resolved child
//! actually changed identity; writing a slot to an identical value returns
//! the original container by reference.

use lamina_value::{Coll, Error, Map, Result, Value};

/// Lookup a key in any value. Scalars hold nothing.
pub fn get(value: &Value, key: &Value) -> Option<Value> {
    match value {
        Value::Coll(coll) => coll.get(key),
        _ => None,
    }
}

pub fn get_or(value: &Value, key: &Value, not_set: Value) -> Value {
    get(value, key).unwrap_or(not_set)
}

pub fn has(value: &Value, key: &Value) -> bool {
    match value {
        Value::Coll(coll) => coll.has(key),
        _ => false,
    }
}

/// Set a single slot. Updating a scalar is a structural error; writing an
/// identical value returns the original.
pub fn set(value: &Value, key: &Value, new_value: Value) -> Result<Value> {
    match value {
        Value::Coll(coll) => Ok(Value::Coll(coll.set(key, new_value)?)),
        other => Err(Error::type_error_in(
            "set",
            "data structure",
            other.type_name(),
        )),
    }
}

/// Remove a single slot. Removing an absent key returns the original.
pub fn remove(value: &Value, key: &Value) -> Result<Value> {
    match value {
        Value::Coll(coll) => Ok(Value::Coll(coll.remove(key)?)),
        other => Err(Error::type_error_in(
            "remove",
            "data structure",
            other.type_name(),
        )),
    }
}

/// Update a single slot through `f`. The updater sees `None` when the key
/// is absent and deletes the key by returning `None`.
pub fn update(
    value: &Value,
    key: &Value,
    f: impl FnOnce(Option<Value>) -> Option<Value>,
) -> Result<Value> {
    let existing = get(value, key);
    let new_value = f(existing.clone());
    match (existing, new_value) {
        (None, None) => Ok(value.clone()),
        (Some(old), Some(new)) if Value::is(&old, &new) => Ok(value.clone()),
        (_, Some(new)) => set(value, key, new),
        (Some(_), None) => remove(value, key),
    }
}

/// Walk a key path; `None` as soon as a segment is absent or cannot be
/// descended into.
pub fn get_in(value: &Value, path: &[Value]) -> Option<Value> {
    let mut current = value.clone();
    for key in path {
        current = get(&current, key)?;
    }
    Some(current)
}

pub fn get_in_or(value: &Value, path: &[Value], not_set: Value) -> Value {
    get_in(value, path).unwrap_or(not_set)
}

pub fn has_in(value: &Value, path: &[Value]) -> bool {
    get_in(value, path).is_some()
}

/// Set a nested slot, creating empty maps along a previously-absent path.
pub fn set_in(value: &Value, path: &[Value], new_value: Value) -> Result<Value> {
    update_in(value, path, move |_| Some(new_value))
}

/// Remove a nested slot; an absent path returns the original.
pub fn remove_in(value: &Value, path: &[Value]) -> Result<Value> {
    update_in(value, path, |_| None)
}

/// Update a nested slot through `f`.
///
/// Depth-first walk down `path`; the updater runs at the end with the
/// existing value (or `None`). Walking back up, a parent is rebuilt only
/// when its child changed identity, so untouched subtrees come back by the
/// same reference. A missing intermediate materializes as an empty map; a
/// present non-container along the path is a path-conflict error.
pub fn update_in(
    value: &Value,
    path: &[Value],
    f: impl FnOnce(Option<Value>) -> Option<Value>,
) -> Result<Value> {
    Ok(update_in_step(Some(value.clone()), path, f)?.unwrap_or(Value::Nil))
}

fn update_in_step(
    current: Option<Value>,
    path: &[Value],
    f: impl FnOnce(Option<Value>) -> Option<Value>,
) -> Result<Option<Value>> {
    let (key, rest) = match path.split_first() {
        None => return Ok(f(current)),
        Some(split) => split,
    };
    let container = match &current {
        None => None,
        Some(Value::Coll(coll)) => Some(coll.clone()),
        Some(other) => {
            return Err(Error::path_conflict(key.to_string(), other.type_name()));
        }
    };
    let child = container.as_ref().and_then(|c| c.get(key));
    let new_child = update_in_step(child.clone(), rest, f)?;
    match (child, new_child) {
        // Nothing was there and nothing was produced: untouched.
        (None, None) => Ok(current),
        // The child kept its identity: hand back the original parent.
        (Some(old), Some(new)) if Value::is(&old, &new) => Ok(current),
        (_, Some(new)) => {
            let base = match container {
                Some(coll) => coll,
                None => Coll::Map(Map::new()),
            };
            Ok(Some(Value::Coll(base.set(key, new)?)))
        }
        (Some(_), None) => match container {
            Some(coll) => Ok(Some(Value::Coll(coll.remove(key)?))),
            None => Ok(current),
        },
    }
}
