//! Builtin functions over values.
//!
//! Sequence builtins go through the index resolver so they share its
//! negative-index and range rules. Length-changing operations mutate lists in
//! place (every binding to the list sees the change) and refuse axes.
//! `reverse` and `sort` return new sequences of the same kind.

use std::cmp::Ordering;

use crate::error::{IndexErrorKind, LatticeError, Result};
use crate::index::{normalize_index, resolve, Mode};
use crate::value::{Key, ListRef, Value};

/// Dispatch a builtin by name.
pub fn call(name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "len" => {
            let [v] = arity::<1>(name, args)?;
            v.len()
                .map(|n| Value::Int(n as i64))
                .ok_or_else(|| {
                    LatticeError::type_mismatch("String or composite", v.type_name(), name)
                })
        }
        "is_empty" => {
            let [v] = arity::<1>(name, args)?;
            v.len()
                .map(|n| Value::Bool(n == 0))
                .ok_or_else(|| {
                    LatticeError::type_mismatch("String or composite", v.type_name(), name)
                })
        }
        "get" => {
            let [container, index] = arity::<2>(name, args)?;
            Ok(resolve(container, index, Mode::Read).and_then(|slot| slot.get())?)
        }
        "set" => {
            let [container, index, value] = arity::<3>(name, args)?;
            resolve(container, index, Mode::Write).and_then(|slot| slot.set(value.clone()))?;
            Ok(Value::Null)
        }
        "push" => {
            let [list, value] = arity::<2>(name, args)?;
            push(list, value.clone())
        }
        "pop" => {
            let [list] = arity::<1>(name, args)?;
            let list = growable(name, list)?;
            let popped = list.borrow_mut().pop();
            popped.ok_or_else(|| LatticeError::eval("pop from empty list"))
        }
        "insert" => {
            let [list, index, value] = arity::<3>(name, args)?;
            insert(list, index, value.clone())
        }
        "remove" => {
            let [container, index] = arity::<2>(name, args)?;
            remove(container, index)
        }
        "clear" => {
            let [container] = arity::<1>(name, args)?;
            match container {
                Value::Dict(d) => d.borrow_mut().clear(),
                other => growable(name, other)?.borrow_mut().clear(),
            }
            Ok(Value::Null)
        }
        "clone" => {
            let [v] = arity::<1>(name, args)?;
            Ok(v.deep_clone())
        }
        "slice" => {
            let [seq, start, end] = arity::<3>(name, args)?;
            slice(seq, start, end)
        }
        "concat" => {
            let [a, b] = arity::<2>(name, args)?;
            let mut items = elements(name, a)?;
            items.extend(elements(name, b)?);
            Ok(Value::list(items))
        }
        "reverse" => {
            let [seq] = arity::<1>(name, args)?;
            let mut items = elements(name, seq)?;
            items.reverse();
            Ok(same_kind(seq, items))
        }
        "sort" => {
            let [seq] = arity::<1>(name, args)?;
            sort(seq)
        }
        "find" => {
            let [seq, needle] = arity::<2>(name, args)?;
            let position = elements(name, seq)?.iter().position(|v| v == needle);
            Ok(position.map_or(Value::Null, |i| Value::Int(i as i64)))
        }
        "contains" => {
            let [seq, needle] = arity::<2>(name, args)?;
            Ok(Value::Bool(elements(name, seq)?.contains(needle)))
        }
        "keys" => {
            let [dict] = arity::<1>(name, args)?;
            let Value::Dict(d) = dict else {
                return Err(LatticeError::type_mismatch("Dict", dict.type_name(), name));
            };
            let keys = d.borrow().keys().cloned().map(Value::from).collect();
            Ok(Value::list(keys))
        }
        "values" => {
            let [dict] = arity::<1>(name, args)?;
            let Value::Dict(d) = dict else {
                return Err(LatticeError::type_mismatch("Dict", dict.type_name(), name));
            };
            let values = d.borrow().values().cloned().collect();
            Ok(Value::list(values))
        }
        "has_key" => {
            let [dict, key] = arity::<2>(name, args)?;
            let Value::Dict(d) = dict else {
                return Err(LatticeError::type_mismatch("Dict", dict.type_name(), name));
            };
            let key = Key::from_value(key)?;
            let present = d.borrow().contains_key(&key);
            Ok(Value::Bool(present))
        }
        "typeof" => {
            let [v] = arity::<1>(name, args)?;
            Ok(Value::str(v.type_name()))
        }
        "cast" => {
            let [v, target] = arity::<2>(name, args)?;
            let target = target
                .as_str()
                .ok_or_else(|| LatticeError::type_mismatch("String", target.type_name(), name))?;
            cast(v, target)
        }
        other => Err(LatticeError::UnknownFunction(other.to_string())),
    }
}

fn arity<'a, const N: usize>(name: &str, args: &'a [Value]) -> Result<&'a [Value; N]> {
    args.try_into().map_err(|_| LatticeError::Arity {
        name: name.to_string(),
        expected: N,
        found: args.len(),
    })
}

/// The list behind `value`, or why it cannot change length.
fn growable<'a>(name: &str, value: &'a Value) -> Result<&'a ListRef> {
    match value {
        Value::List(list) => Ok(list),
        Value::Axis(_) => Err(IndexErrorKind::FixedAxis.into()),
        other => Err(LatticeError::type_mismatch("List", other.type_name(), name)),
    }
}

fn elements(name: &str, value: &Value) -> Result<Vec<Value>> {
    value
        .elements()
        .ok_or_else(|| LatticeError::type_mismatch("List or Axis", value.type_name(), name))
}

fn same_kind(template: &Value, items: Vec<Value>) -> Value {
    match template {
        Value::Axis(_) => Value::axis(items),
        _ => Value::list(items),
    }
}

fn push(list: &Value, value: Value) -> Result<Value> {
    let handle = growable("push", list)?;
    if value.reaches(list) {
        return Err(IndexErrorKind::Cycle.into());
    }
    handle.borrow_mut().push(value);
    Ok(Value::Null)
}

/// Insert before `index`; `len` (or `-0`-style `len + i == len`) appends.
fn insert(list: &Value, index: &Value, value: Value) -> Result<Value> {
    let handle = growable("insert", list)?;
    let i = index
        .as_int()
        .ok_or_else(|| LatticeError::type_mismatch("Int", index.type_name(), "insert"))?;
    if value.reaches(list) {
        return Err(IndexErrorKind::Cycle.into());
    }
    let len = handle.borrow().len();
    let position = if i == len as i64 {
        len
    } else {
        normalize_index(i, len)?
    };
    handle.borrow_mut().insert(position, value);
    Ok(Value::Null)
}

fn remove(container: &Value, index: &Value) -> Result<Value> {
    if let Value::Dict(d) = container {
        let key = Key::from_value(index)?;
        let removed = d.borrow_mut().remove(&key);
        return removed.ok_or_else(|| {
            IndexErrorKind::KeyNotFound {
                key: key.to_string(),
            }
            .into()
        });
    }
    let handle = growable("remove", container)?;
    let i = index
        .as_int()
        .ok_or_else(|| LatticeError::type_mismatch("Int", index.type_name(), "remove"))?;
    let len = handle.borrow().len();
    let position = normalize_index(i, len)?;
    Ok(handle.borrow_mut().remove(position))
}

/// Half-open slice with negative bounds counted from the end and both
/// bounds clamped into `0..=len`.
fn slice(seq: &Value, start: &Value, end: &Value) -> Result<Value> {
    let items = elements("slice", seq)?;
    let len = items.len() as i64;
    let bound = |v: &Value| -> Result<i64> {
        let n = v
            .as_int()
            .ok_or_else(|| LatticeError::type_mismatch("Int", v.type_name(), "slice"))?;
        let n = if n < 0 { len.saturating_add(n) } else { n };
        Ok(n.clamp(0, len))
    };
    let start = bound(start)?;
    let end = bound(end)?.max(start);
    Ok(same_kind(seq, items[start as usize..end as usize].to_vec()))
}

fn sort(seq: &Value) -> Result<Value> {
    let mut items = elements("sort", seq)?;
    if items.iter().all(|v| matches!(v, Value::Int(_))) {
        items.sort_by_key(|v| v.as_int().unwrap_or_default());
    } else if items.iter().all(|v| matches!(v, Value::Float(_))) {
        items.sort_by(|a, b| {
            let (a, b) = (a.as_float().unwrap_or_default(), b.as_float().unwrap_or_default());
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        });
    } else if items.iter().all(|v| matches!(v, Value::Str(_))) {
        items.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
    } else {
        return Err(LatticeError::type_mismatch(
            "a sequence of only Int, only Float or only String",
            "mixed elements",
            "sort",
        ));
    }
    Ok(same_kind(seq, items))
}

/// Scalar conversion. Target names are case-insensitive.
pub fn cast(value: &Value, target: &str) -> Result<Value> {
    let fail = || {
        LatticeError::eval(format!(
            "cannot cast {} '{}' to {}",
            value.type_name(),
            value,
            target
        ))
    };
    match target.to_ascii_lowercase().as_str() {
        "int" | "integer" => match value {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Char(c) => Ok(Value::Int(i64::from(u32::from(*c)))),
            Value::Str(s) => s.trim().parse().map(Value::Int).map_err(|_| fail()),
            Value::Null => Ok(Value::Int(0)),
            _ => Err(fail()),
        },
        "float" => match value {
            Value::Int(n) => Ok(Value::Float(*n as f64)),
            Value::Float(x) => Ok(Value::Float(*x)),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Str(s) => s.trim().parse().map(Value::Float).map_err(|_| fail()),
            Value::Null => Ok(Value::Float(0.0)),
            _ => Err(fail()),
        },
        "bool" | "boolean" => match value {
            v if v.is_composite() => Err(fail()),
            Value::Char(c) => Ok(Value::Bool(*c != '\0')),
            v => Ok(Value::Bool(v.truthy())),
        },
        "string" | "str" => match value {
            v if v.is_composite() => Err(fail()),
            v => Ok(Value::Str(v.to_string())),
        },
        "char" => match value {
            Value::Char(c) => Ok(Value::Char(*c)),
            Value::Int(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .map(Value::Char)
                .ok_or_else(fail),
            Value::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(fail()),
                }
            }
            _ => Err(fail()),
        },
        "null" | "nil" => Ok(Value::Null),
        _ => Err(LatticeError::eval(format!("unknown cast target '{target}'"))),
    }
}
