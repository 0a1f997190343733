//! Index resolution: one container, one index, one addressable slot.
//!
//! [`resolve`] is the single-hop primitive the path evaluator and the
//! sequence builtins are built on. It validates the index against the
//! container kind and hands back a [`Slot`] that can be read or written.
//!
//! Rules:
//!
//! - **Dict**: the index is converted to a [`Key`]; lookup is by value
//!   equality. A read miss is `KeyNotFound`; a write miss inserts.
//! - **List / Axis**: the index must be an `Int`. Negative indices count from
//!   the end (`-1` is the last element). Anything outside `0..len` after
//!   normalization is `IndexOutOfRange`; sequences never grow on write.
//! - **Axis** slots cannot be written (`FixedAxis`).
//! - Every other value is `NotIndexable`.

use crate::error::IndexErrorKind;
use crate::value::{AxisRef, DictRef, Key, ListRef, Value};

/// Whether the caller intends to read or replace the addressed child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// An addressable reference into a composite.
///
/// Slots hold a handle to the container, not a borrow, so they stay valid
/// while other code reads the tree.
#[derive(Debug, Clone)]
pub enum Slot {
    /// A dictionary entry. The key may not exist yet when resolved for write.
    Entry { dict: DictRef, key: Key },
    /// A list element at a normalized position.
    Element { list: ListRef, position: usize },
    /// An axis element at a normalized position (read-only).
    AxisElement { axis: AxisRef, position: usize },
}

impl Slot {
    /// Current value in the slot.
    pub fn get(&self) -> Result<Value, IndexErrorKind> {
        match self {
            Slot::Entry { dict, key } => {
                dict.borrow()
                    .get(key)
                    .cloned()
                    .ok_or_else(|| IndexErrorKind::KeyNotFound {
                        key: key.to_string(),
                    })
            }
            Slot::Element { list, position } => {
                let list = list.borrow();
                list.get(*position)
                    .cloned()
                    .ok_or(IndexErrorKind::IndexOutOfRange {
                        index: *position as i64,
                        len: list.len(),
                    })
            }
            Slot::AxisElement { axis, position } => {
                axis.get(*position)
                    .cloned()
                    .ok_or(IndexErrorKind::IndexOutOfRange {
                        index: *position as i64,
                        len: axis.len(),
                    })
            }
        }
    }

    /// Replace the value in the slot, returning the previous one (`None` when
    /// a dictionary key was newly inserted).
    pub fn set(&self, value: Value) -> Result<Option<Value>, IndexErrorKind> {
        match self {
            Slot::Entry { dict, key } => {
                if value.reaches(&Value::Dict(dict.clone())) {
                    return Err(IndexErrorKind::Cycle);
                }
                let previous = dict.borrow_mut().insert(key.clone(), value);
                if previous.is_none() {
                    tracing::debug!(%key, "inserted new dictionary key");
                }
                Ok(previous)
            }
            Slot::Element { list, position } => {
                if value.reaches(&Value::List(list.clone())) {
                    return Err(IndexErrorKind::Cycle);
                }
                let mut list = list.borrow_mut();
                let len = list.len();
                let slot = list
                    .get_mut(*position)
                    .ok_or(IndexErrorKind::IndexOutOfRange {
                        index: *position as i64,
                        len,
                    })?;
                Ok(Some(std::mem::replace(slot, value)))
            }
            Slot::AxisElement { .. } => Err(IndexErrorKind::FixedAxis),
        }
    }
}

/// Resolve `index` against `container`.
///
/// In [`Mode::Read`] the addressed child is guaranteed to exist when this
/// returns `Ok`. In [`Mode::Write`] a dictionary slot may address a key that
/// [`Slot::set`] will insert.
pub fn resolve(container: &Value, index: &Value, mode: Mode) -> Result<Slot, IndexErrorKind> {
    match container {
        Value::Dict(dict) => {
            let key = Key::from_value(index)?;
            if mode == Mode::Read && !dict.borrow().contains_key(&key) {
                return Err(IndexErrorKind::KeyNotFound {
                    key: key.to_string(),
                });
            }
            Ok(Slot::Entry {
                dict: dict.clone(),
                key,
            })
        }
        Value::List(list) => {
            let position = normalize_index(sequence_index(index)?, list.borrow().len())?;
            Ok(Slot::Element {
                list: list.clone(),
                position,
            })
        }
        Value::Axis(axis) => {
            if mode == Mode::Write {
                return Err(IndexErrorKind::FixedAxis);
            }
            let position = normalize_index(sequence_index(index)?, axis.len())?;
            Ok(Slot::AxisElement {
                axis: axis.clone(),
                position,
            })
        }
        other => Err(IndexErrorKind::NotIndexable {
            found: other.type_name(),
        }),
    }
}

/// Map a possibly negative index onto `0..len`.
///
/// `-k` addresses `len - k`. Results outside `0..len` are rejected rather
/// than wrapped or clamped.
pub fn normalize_index(index: i64, len: usize) -> Result<usize, IndexErrorKind> {
    let out_of_range = IndexErrorKind::IndexOutOfRange { index, len };
    let len_i = i64::try_from(len).map_err(|_| out_of_range.clone())?;
    let resolved = if index < 0 { len_i + index } else { index };
    if (0..len_i).contains(&resolved) {
        Ok(resolved as usize)
    } else {
        Err(out_of_range)
    }
}

fn sequence_index(index: &Value) -> Result<i64, IndexErrorKind> {
    index.as_int().ok_or(IndexErrorKind::TypeMismatch {
        expected: "Int",
        found: index.type_name(),
    })
}
