//! Variable scopes.
//!
//! The core only needs a [`Scope`]: something that can look a name up and
//! bind one. [`Environment`] is the nested-frame implementation the
//! interpreter uses.

use std::collections::HashMap;

use crate::error::{LatticeError, Result};
use crate::value::Value;

/// Name lookup and binding capability consumed by the evaluator.
pub trait Scope {
    fn lookup(&self, name: &str) -> Result<Value>;

    /// Rebind an existing name, or define it if it is unbound.
    fn bind(&mut self, name: &str, value: Value) -> Result<()>;
}

/// A flat map is a perfectly good scope for tests and embedders.
impl Scope for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Result<Value> {
        self.get(name)
            .cloned()
            .ok_or_else(|| LatticeError::UnboundName(name.to_string()))
    }

    fn bind(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    constant: bool,
}

/// Stack of frames; `frames[0]` is global, the last is current.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<HashMap<String, Binding>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pop the current frame. The global frame is never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Define `name` in the current frame, shadowing outer bindings.
    /// Redefining a constant of the same frame is rejected.
    pub fn define(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name, value, false)
    }

    pub fn define_const(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name, value, true)
    }

    fn insert(&mut self, name: &str, value: Value, constant: bool) -> Result<()> {
        let frame = self.current_frame();
        if frame.get(name).is_some_and(|b| b.constant) {
            return Err(LatticeError::ConstantReassignment(name.to_string()));
        }
        frame.insert(name.to_string(), Binding { value, constant });
        Ok(())
    }

    fn current_frame(&mut self) -> &mut HashMap<String, Binding> {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// All visible names, innermost shadowing outermost, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .frames
            .iter()
            .flat_map(|f| f.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Scope for Environment {
    fn lookup(&self, name: &str) -> Result<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.get(name))
            .map(|b| b.value.clone())
            .ok_or_else(|| LatticeError::UnboundName(name.to_string()))
    }

    fn bind(&mut self, name: &str, value: Value) -> Result<()> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(binding) = frame.get_mut(name) {
                if binding.constant {
                    return Err(LatticeError::ConstantReassignment(name.to_string()));
                }
                binding.value = value;
                return Ok(());
            }
        }
        self.define(name, value)
    }
}
