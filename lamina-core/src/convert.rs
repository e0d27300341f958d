// lamina-core - Host JSON boundary
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Deep conversion between lamina values and host JSON.
//!
//! Keyed collections become objects, indexed and set collections become
//! arrays. Conversion is eager and fails the same infinite-collection
//! check as the other materializers. Non-finite numbers serialize as null,
//! matching host JSON semantics.

use serde_json::{Map as JsonMap, Value as Json};

use lamina_value::{Coll, Error, Result, Value, Variant};

/// Build a lamina value from host JSON: objects become maps, arrays become
/// lists.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::string(s.as_str()),
        Json::Array(items) => Value::list(items.iter().map(from_json)),
        Json::Object(fields) => Value::map(
            fields
                .iter()
                .map(|(k, v)| (Value::string(k.as_str()), from_json(v))),
        ),
    }
}

/// Deep conversion to host JSON.
pub fn to_json(value: &Value) -> Result<Json> {
    match value {
        Value::Nil => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Int(n) => Ok(Json::from(*n)),
        Value::Float(n) => Ok(serde_json::Number::from_f64(*n)
            .map(Json::Number)
            .unwrap_or(Json::Null)),
        Value::Str(s) => Ok(Json::String(s.to_string())),
        Value::Coll(coll) => coll_to_json(coll),
    }
}

fn coll_to_json(coll: &Coll) -> Result<Json> {
    if coll.size().is_infinite() {
        return Err(Error::unbounded("to_json"));
    }
    match coll.variant() {
        Variant::Keyed => {
            let mut fields = JsonMap::new();
            for (k, v) in coll.entries_iter(false) {
                fields.insert(json_key(&k)?, to_json(&v)?);
            }
            Ok(Json::Object(fields))
        }
        Variant::Indexed | Variant::Set => {
            let mut items = Vec::new();
            for (_k, v) in coll.entries_iter(false) {
                items.push(to_json(&v)?);
            }
            Ok(Json::Array(items))
        }
    }
}

/// Object keys: strings pass through, other scalars stringify, collection
/// keys have no JSON rendering.
fn json_key(key: &Value) -> Result<String> {
    match key {
        Value::Str(s) => Ok(s.to_string()),
        Value::Nil | Value::Bool(_) | Value::Int(_) | Value::Float(_) => {
            match key {
                Value::Float(n) if n.fract() == 0.0 && n.is_finite() => {
                    Ok(format!("{}", *n as i64))
                }
                other => Ok(other.to_string()),
            }
        }
        Value::Coll(c) => Err(Error::type_error_in(
            "to_json",
            "scalar key",
            c.type_name(),
        )),
    }
}
