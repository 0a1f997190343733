//! JSON bridge.
//!
//! Values serialize through `serde` (dictionaries become objects with
//! stringified keys, lists and axes become arrays, chars become one-character
//! strings). JSON documents load as dictionaries and lists.
//!
//! Distinct keys that stringify alike (`1` and `"1"`) cannot share one JSON
//! object, so serializing such a dictionary fails.

use std::collections::HashSet;

use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;
use crate::value::{Dict, Key, Value};

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Char(c) => serializer.serialize_char(*c),
            Value::Dict(d) => {
                let d = d.borrow();
                let mut map = serializer.serialize_map(Some(d.len()))?;
                let mut seen = HashSet::with_capacity(d.len());
                for (k, v) in d.iter() {
                    let name = key_string(k);
                    if !seen.insert(name.clone()) {
                        return Err(S::Error::custom(format!(
                            "keys collide as JSON object key \"{name}\""
                        )));
                    }
                    map.serialize_entry(&name, v)?;
                }
                map.end()
            }
            Value::List(l) => serialize_items(serializer, &l.borrow()),
            Value::Axis(a) => serialize_items(serializer, a),
        }
    }
}

fn serialize_items<S: Serializer>(
    serializer: S,
    items: &[Value],
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

/// JSON object keys must be strings; string keys are written bare.
fn key_string(key: &Key) -> String {
    match key {
        Key::Str(s) => s.clone(),
        Key::Char(c) => c.to_string(),
        other => other.to_string(),
    }
}

impl Value {
    /// Convert a parsed JSON document into a value tree.
    ///
    /// Integral numbers that fit `i64` become `Int`; all other numbers become
    /// `Float`.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::list(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::dict(
                map.iter()
                    .map(|(k, v)| (Key::Str(k.clone()), Value::from_json(v)))
                    .collect::<Dict>(),
            ),
        }
    }

    /// Parse JSON text into a value tree.
    pub fn parse_json(text: &str) -> Result<Value> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(Value::from_json(&json))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
