// lamina-core - Merge family
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! `merge`, `merge_with`, and the deep and nested variants.
//!
//! Keyed targets overwrite on collision, or hand the collision to a
//! combiner. Indexed targets append each source element; set targets union
//! them in. The deep forms recurse whenever both colliding values are
//! collections of the same shape, falling back to the base behavior
//! otherwise. A merge that changes nothing returns the original handle.

use lamina_value::{Error, Map, Result, Value, Variant};

use crate::update::update_in;

type Combiner<'a> = &'a dyn Fn(&Value, &Value, &Value) -> Value;

/// Merge `sources` into `target`, later entries overwriting earlier ones.
pub fn merge(target: &Value, sources: &[Value]) -> Result<Value> {
    merge_sources(target, sources, None, false)
}

/// Merge with `combiner(old, new, key)` deciding keyed collisions.
pub fn merge_with(
    combiner: impl Fn(&Value, &Value, &Value) -> Value,
    target: &Value,
    sources: &[Value],
) -> Result<Value> {
    merge_sources(target, sources, Some(&combiner), false)
}

/// Merge, recursing into colliding values of the same shape.
pub fn merge_deep(target: &Value, sources: &[Value]) -> Result<Value> {
    merge_sources(target, sources, None, true)
}

/// Deep merge with `combiner(old, new, key)` deciding non-recursable
/// collisions.
pub fn merge_deep_with(
    combiner: impl Fn(&Value, &Value, &Value) -> Value,
    target: &Value,
    sources: &[Value],
) -> Result<Value> {
    merge_sources(target, sources, Some(&combiner), true)
}

/// Merge into a nested slot, materializing an empty map when absent.
pub fn merge_in(target: &Value, path: &[Value], sources: &[Value]) -> Result<Value> {
    merge_at(target, path, sources, false)
}

/// Deep merge into a nested slot.
pub fn merge_deep_in(target: &Value, path: &[Value], sources: &[Value]) -> Result<Value> {
    merge_at(target, path, sources, true)
}

fn merge_at(target: &Value, path: &[Value], sources: &[Value], deep: bool) -> Result<Value> {
    let mut failed = None;
    let merged = update_in(target, path, |current| {
        let base = current.unwrap_or_else(|| Value::from(Map::new()));
        match merge_sources(&base, sources, None, deep) {
            Ok(value) => Some(value),
            Err(e) => {
                failed = Some(e);
                Some(base)
            }
        }
    })?;
    match failed {
        Some(e) => Err(e),
        None => Ok(merged),
    }
}

/// Both sides are collections of the same shape, so a deep merge can
/// recurse instead of overwriting.
fn mergeable(old: &Value, new: &Value) -> bool {
    match (old, new) {
        (Value::Coll(a), Value::Coll(b)) => a.variant() == b.variant(),
        _ => false,
    }
}

fn merge_sources(
    target: &Value,
    sources: &[Value],
    combiner: Option<Combiner<'_>>,
    deep: bool,
) -> Result<Value> {
    let coll = match target {
        Value::Coll(coll) => coll,
        other => {
            return Err(Error::type_error_in(
                "merge",
                "data structure",
                other.type_name(),
            ));
        }
    };
    if sources.is_empty() {
        return Ok(target.clone());
    }
    let keyed = coll.variant() == Variant::Keyed;
    let merged = coll.with_mutations(|builder| {
        for source in sources {
            let source_coll = match source {
                Value::Nil => continue,
                Value::Coll(c) => c,
                other => {
                    return Err(Error::type_error_in(
                        "merge",
                        "data structure",
                        other.type_name(),
                    ));
                }
            };
            for (key, new_value) in source_coll.entries_iter(false) {
                if !keyed {
                    builder.append(new_value)?;
                    continue;
                }
                let resolved = match builder.get(&key) {
                    Some(old) if deep && mergeable(&old, &new_value) => {
                        merge_sources(&old, std::slice::from_ref(&new_value), combiner, true)?
                    }
                    Some(old) => match combiner {
                        Some(combine) => combine(&old, &new_value, &key),
                        None => new_value,
                    },
                    None => new_value,
                };
                builder.set(key, resolved)?;
            }
        }
        Ok(())
    })?;
    Ok(Value::Coll(merged))
}
