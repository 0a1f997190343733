//! Composite construction from literals.
//!
//! [`build`] turns a [`CompositeLiteral`] into a fully evaluated [`Value`].
//! Sub-expressions are handed to an [`Evaluate`] implementation strictly left
//! to right; for dictionaries each pair evaluates its key before its value,
//! so later keys may depend on names bound by earlier evaluation. Nested
//! literals reach `build` again through the evaluator, which means children
//! are always complete before their parent exists.
//!
//! Duplicate dictionary keys resolve as last-write-wins: the later value
//! replaces the earlier one and the key keeps its first position.

use crate::error::Result;
use crate::eval::Evaluate;
use crate::expr::{CompositeLiteral, Expr};
use crate::scope::Scope;
use crate::value::{Dict, Key, Value};

/// Build a composite value from its literal form.
///
/// # Errors
///
/// Propagates the first evaluation failure; a key that cannot be a
/// dictionary key is an index `TypeMismatch`. No partially built composite is
/// returned.
pub fn build(
    literal: &CompositeLiteral,
    evaluator: &mut dyn Evaluate,
    scope: &dyn Scope,
) -> Result<Value> {
    match literal {
        CompositeLiteral::Dict(pairs) => build_dict(pairs, evaluator, scope),
        CompositeLiteral::List(items) => Ok(Value::list(eval_all(items, evaluator, scope)?)),
        CompositeLiteral::Axis(items) => Ok(Value::axis(eval_all(items, evaluator, scope)?)),
    }
}

fn build_dict(
    pairs: &[(Expr, Expr)],
    evaluator: &mut dyn Evaluate,
    scope: &dyn Scope,
) -> Result<Value> {
    let mut dict = Dict::new();
    for (key_expr, value_expr) in pairs {
        let key = Key::from_value(&evaluator.eval(key_expr, scope)?)?;
        let value = evaluator.eval(value_expr, scope)?;
        if dict.insert(key.clone(), value).is_some() {
            tracing::debug!(%key, "duplicate key in dictionary literal, keeping last value");
        }
    }
    Ok(Value::dict(dict))
}

fn eval_all(
    items: &[Expr],
    evaluator: &mut dyn Evaluate,
    scope: &dyn Scope,
) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| evaluator.eval(item, scope))
        .collect()
}
