//! Error types for building, indexing and evaluating Lattice values.

use thiserror::Error;

/// Why a single index or key step could not be resolved.
///
/// Returned directly by [`crate::index::resolve`] and wrapped with the failing
/// hop position by the path evaluator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexErrorKind {
    /// The container is a scalar (or otherwise has no addressable children).
    #[error("cannot index into a value of type {found}")]
    NotIndexable { found: &'static str },

    /// A dictionary read found no entry for the key.
    #[error("key {key} not found")]
    KeyNotFound { key: String },

    /// A list or axis index fell outside `0..len` after normalization.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    /// The index value has the wrong type for this container.
    #[error("expected {expected} index, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Axis slots and axis length are fixed once constructed.
    #[error("axis is fixed after construction")]
    FixedAxis,

    /// The write would store a composite inside itself.
    #[error("a composite cannot be stored inside itself")]
    Cycle,
}

/// Errors produced by the Lattice runtime core.
#[derive(Error, Debug)]
pub enum LatticeError {
    /// A single resolver call failed.
    #[error(transparent)]
    Index(#[from] IndexErrorKind),

    /// A path failed at hop `step` (zero-based). `index` is the rendered
    /// index value used at that hop.
    #[error("path step {step} [{index}]: {kind}")]
    Path {
        step: usize,
        index: String,
        kind: IndexErrorKind,
    },

    /// A write was requested with no steps to address a slot.
    #[error("cannot assign through an empty path")]
    EmptyPath,

    #[error("unbound name '{0}'")]
    UnboundName(String),

    #[error("cannot reassign constant '{0}'")]
    ConstantReassignment(String),

    /// An operand or argument had the wrong type.
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        context: String,
    },

    #[error("{name} expects {expected} argument(s), found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Opaque failure from the expression evaluator (overflow, division by
    /// zero, invalid conversion, ...).
    #[error("evaluation error: {0}")]
    Eval(String),

    /// The reader rejected its input. Line and column are 1-based.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LatticeError {
    pub fn type_mismatch(
        expected: impl Into<String>,
        found: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        LatticeError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            context: context.into(),
        }
    }

    pub fn eval(message: impl Into<String>) -> Self {
        LatticeError::Eval(message.into())
    }

    /// The index failure carried by this error, if it is one.
    pub fn index_kind(&self) -> Option<&IndexErrorKind> {
        match self {
            LatticeError::Index(kind) | LatticeError::Path { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// The failing hop of a path error.
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            LatticeError::Path { step, .. } => Some(*step),
            _ => None,
        }
    }
}

/// Convenience alias used throughout lattice-core.
pub type Result<T> = std::result::Result<T, LatticeError>;
