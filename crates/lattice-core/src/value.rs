//! Runtime values.
//!
//! [`Value`] is a closed sum type over scalars and three composite kinds:
//!
//! - **Dict** — ordered `Key → Value` mapping, shared and mutable
//! - **List** — resizable sequence, shared and mutable
//! - **Axis** — fixed-length sequence, shared and read-only after construction
//!
//! Composite handles are reference counted. Cloning a `Value` clones the
//! handle, never the tree, so two bindings to the same dictionary see each
//! other's writes. Use [`Value::deep_clone`] for an independent copy.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::IndexErrorKind;

/// Shared handle to a dictionary.
pub type DictRef = Rc<RefCell<Dict>>;
/// Shared handle to a list.
pub type ListRef = Rc<RefCell<Vec<Value>>>;
/// Shared handle to an axis. Axis slots are never reassigned, so no cell.
pub type AxisRef = Rc<[Value]>;

/// Runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
    Dict(DictRef),
    List(ListRef),
    Axis(AxisRef),
}

impl Value {
    pub fn dict(dict: Dict) -> Self {
        Value::Dict(Rc::new(RefCell::new(dict)))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn axis(items: Vec<Value>) -> Self {
        Value::Axis(items.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Type name for error messages and `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Char(_) => "Char",
            Value::Dict(_) => "Dict",
            Value::List(_) => "List",
            Value::Axis(_) => "Axis",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Char(_) => true,
            Value::Dict(d) => !d.borrow().is_empty(),
            Value::List(l) => !l.borrow().is_empty(),
            Value::Axis(a) => !a.is_empty(),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::List(_) | Value::Axis(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Number of children of a composite, or characters of a string.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Dict(d) => Some(d.borrow().len()),
            Value::List(l) => Some(l.borrow().len()),
            Value::Axis(a) => Some(a.len()),
            _ => None,
        }
    }

    /// Snapshot of a list's or axis's elements. `None` for other kinds.
    pub fn elements(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(l) => Some(l.borrow().clone()),
            Value::Axis(a) => Some(a.to_vec()),
            _ => None,
        }
    }

    /// True when both values are the same composite allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Axis(a), Value::Axis(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Recursively copy every composite so the result shares nothing with `self`.
    pub fn deep_clone(&self) -> Value {
        match self {
            Value::Dict(d) => Value::dict(
                d.borrow()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.deep_clone()))
                    .collect(),
            ),
            Value::List(l) => Value::list(l.borrow().iter().map(Value::deep_clone).collect()),
            Value::Axis(a) => Value::axis(a.iter().map(Value::deep_clone).collect()),
            other => other.clone(),
        }
    }

    /// Does `self`, or anything nested in it, share an allocation with `target`?
    pub(crate) fn reaches(&self, target: &Value) -> bool {
        if self.ptr_eq(target) {
            return true;
        }
        match self {
            Value::Dict(d) => d.borrow().values().any(|v| v.reaches(target)),
            Value::List(l) => l.borrow().iter().any(|v| v.reaches(target)),
            Value::Axis(a) => a.iter().any(|v| v.reaches(target)),
            _ => false,
        }
    }

    /// Render strings and chars quoted, as they appear inside a composite.
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Char(c) => write!(f, "{c:?}"),
            other => write!(f, "{other}"),
        }
    }
}

fn fmt_sequence(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        v.fmt_nested(f)?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            // Debug keeps the fraction: `1.0`, never `1`.
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Dict(d) => {
                write!(f, "{{")?;
                for (i, (k, v)) in d.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: ")?;
                    v.fmt_nested(f)?;
                }
                write!(f, "}}")
            }
            Value::List(l) => {
                write!(f, "[")?;
                fmt_sequence(f, &l.borrow())?;
                write!(f, "]")
            }
            Value::Axis(a) => {
                write!(f, "axis(")?;
                fmt_sequence(f, a)?;
                write!(f, ")")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => *a.borrow() == *b.borrow(),
            (Value::List(a), Value::List(b)) => *a.borrow() == *b.borrow(),
            (Value::Axis(a), Value::Axis(b)) => a[..] == b[..],
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(n) => Value::Int(n),
            Key::Float(x) => Value::Float(x),
            Key::Str(s) => Value::Str(s),
            Key::Char(c) => Value::Char(c),
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// The hashable subset of [`Value`] usable as a dictionary key.
///
/// Keys of different types never compare equal: `1`, `1.0`, `"1"` and `'1'`
/// are four distinct keys. Floats compare by bit pattern with `-0.0` folded
/// into `0.0` and all NaNs folded together, which keeps `Eq` and `Hash`
/// consistent.
#[derive(Debug, Clone)]
pub enum Key {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Char(char),
}

impl Key {
    /// Convert a value into a key. `Null` and composites are rejected.
    pub fn from_value(value: &Value) -> Result<Key, IndexErrorKind> {
        match value {
            Value::Bool(b) => Ok(Key::Bool(*b)),
            Value::Int(n) => Ok(Key::Int(*n)),
            Value::Float(x) => Ok(Key::Float(*x)),
            Value::Str(s) => Ok(Key::Str(s.clone())),
            Value::Char(c) => Ok(Key::Char(*c)),
            other => Err(IndexErrorKind::TypeMismatch {
                expected: "Bool, Int, Float, String or Char",
                found: other.type_name(),
            }),
        }
    }

    fn float_bits(x: f64) -> u64 {
        if x == 0.0 {
            0.0f64.to_bits()
        } else if x.is_nan() {
            f64::NAN.to_bits()
        } else {
            x.to_bits()
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::Int(a), Key::Int(b)) => a == b,
            (Key::Float(a), Key::Float(b)) => Key::float_bits(*a) == Key::float_bits(*b),
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Char(a), Key::Char(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Key::Bool(b) => b.hash(state),
            Key::Int(n) => n.hash(state),
            Key::Float(x) => Key::float_bits(*x).hash(state),
            Key::Str(s) => s.hash(state),
            Key::Char(c) => c.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(n) => write!(f, "{n}"),
            Key::Float(x) => write!(f, "{x:?}"),
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Char(c) => write!(f, "{c:?}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

// ---------------------------------------------------------------------------
// Dict
// ---------------------------------------------------------------------------

/// Insertion-ordered dictionary.
///
/// Iteration and printing follow insertion order; lookup is by hash.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<Key, Value>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    /// Remove a key, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }
}

/// Order-independent: equal when both hold the same keys with equal values.
impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl FromIterator<(Key, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (Key, Value)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}
