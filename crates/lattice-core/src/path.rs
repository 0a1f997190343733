//! Path evaluation: walk a chain of index steps from a root value.
//!
//! Every step except the last is a read that navigates one level down. The
//! last step either reads the addressed value or writes a new one. The first
//! failing hop aborts the whole path; since navigation never mutates, a
//! failed write leaves the tree untouched.

use crate::error::{IndexErrorKind, LatticeError, Result};
use crate::index::{resolve, Mode};
use crate::value::Value;

/// What to do at the end of the path.
#[derive(Debug, Clone)]
pub enum Access {
    Read,
    Write(Value),
}

/// Evaluate `steps` against `root`.
///
/// Returns the addressed value for [`Access::Read`] and `Value::Null` for
/// [`Access::Write`]. An empty read path returns `root` itself; an empty
/// write path is [`LatticeError::EmptyPath`].
///
/// # Errors
///
/// [`LatticeError::Path`] naming the zero-based step that failed, its index
/// and the [`IndexErrorKind`].
#[tracing::instrument(level = "trace", skip_all, fields(depth = steps.len()))]
pub fn evaluate_path(root: &Value, steps: &[Value], access: Access) -> Result<Value> {
    let Some((last, navigation)) = steps.split_last() else {
        return match access {
            Access::Read => Ok(root.clone()),
            Access::Write(_) => Err(LatticeError::EmptyPath),
        };
    };

    let mut current = root.clone();
    for (step, index) in navigation.iter().enumerate() {
        current = resolve(&current, index, Mode::Read)
            .and_then(|slot| slot.get())
            .map_err(|kind| path_error(step, index, kind))?;
    }

    let step = navigation.len();
    match access {
        Access::Read => resolve(&current, last, Mode::Read)
            .and_then(|slot| slot.get())
            .map_err(|kind| path_error(step, last, kind)),
        Access::Write(value) => {
            resolve(&current, last, Mode::Write)
                .and_then(|slot| slot.set(value))
                .map_err(|kind| path_error(step, last, kind))?;
            Ok(Value::Null)
        }
    }
}

/// Read the value at `steps` below `root`.
pub fn read_path(root: &Value, steps: &[Value]) -> Result<Value> {
    evaluate_path(root, steps, Access::Read)
}

/// Store `value` at `steps` below `root`.
pub fn write_path(root: &Value, steps: &[Value], value: Value) -> Result<()> {
    evaluate_path(root, steps, Access::Write(value)).map(|_| ())
}

fn path_error(step: usize, index: &Value, kind: IndexErrorKind) -> LatticeError {
    tracing::debug!(step, %index, %kind, "path evaluation failed");
    LatticeError::Path {
        step,
        index: render_index(index),
        kind,
    }
}

/// Render an index the way it would be written in source.
fn render_index(index: &Value) -> String {
    match index {
        Value::Str(s) => format!("{s:?}"),
        Value::Char(c) => format!("{c:?}"),
        other => other.to_string(),
    }
}
