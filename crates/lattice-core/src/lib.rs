//! # lattice-core
//!
//! Composite values and nested path access for the **Lattice** scripting
//! runtime.
//!
//! Lattice has three composite kinds: the ordered, mutable **Dict**; the
//! resizable **List**; and the fixed-length, read-only **Axis**. Composites
//! are shared handles, so every binding to the same dictionary observes the
//! same writes. Chains like `company["departments"][0]["employees"][-1]`
//! resolve hop by hop, with negative positions counting from the end and
//! precise errors naming the hop that failed.
//!
//! ## Quick start
//!
//! ```rust
//! use lattice_core::{parse_script, Environment, Interpreter, Scope, Value};
//!
//! let program = parse_script(
//!     r#"
//!     let team = {"name": "core", "members": ["ana", "bo", "cy"]}
//!     team["members"][-1] = "cyd"
//!     team.lead = team.members[0]
//!     "#,
//! )
//! .unwrap();
//!
//! let mut env = Environment::new();
//! Interpreter::with_writer(Vec::new()).run(&program, &mut env).unwrap();
//!
//! let team = env.lookup("team").unwrap();
//! assert_eq!(
//!     team.to_string(),
//!     r#"{"name": "core", "members": ["ana", "bo", "cyd"], "lead": "ana"}"#
//! );
//! ```
//!
//! Paths can also be driven directly, without the reader:
//!
//! ```rust
//! use lattice_core::{read_path, write_path, Value};
//!
//! let grid = Value::list(vec![Value::list(vec![Value::Int(1), Value::Int(2)])]);
//! write_path(&grid, &[Value::Int(-1), Value::Int(0)], Value::Int(10)).unwrap();
//! assert_eq!(read_path(&grid, &[Value::Int(0), Value::Int(0)]).unwrap(), Value::Int(10));
//! ```
//!
//! ## Modules
//!
//! - [`value`] — `Value`, `Key` and the insertion-ordered `Dict`
//! - [`index`] — single-hop resolution (`resolve`, `Slot`)
//! - [`path`] — multi-hop read/write (`evaluate_path`)
//! - [`builder`] — composite literals → values
//! - [`expr`] — expression and statement trees
//! - [`eval`] — the `Evaluate` seam and the reference `Interpreter`
//! - [`scope`] — `Scope` capability and nested `Environment`
//! - [`library`] — builtin functions (`len`, `push`, `slice`, ...)
//! - [`reader`] — script text → statements
//! - [`json`] — `serde` bridge for values
//! - [`error`] — error types

pub mod builder;
pub mod error;
pub mod eval;
pub mod expr;
pub mod index;
pub mod json;
pub mod library;
pub mod path;
pub mod reader;
pub mod scope;
pub mod value;

pub use builder::build;
pub use error::{IndexErrorKind, LatticeError, Result};
pub use eval::{Evaluate, Interpreter, MAX_RANGE_LEN};
pub use expr::{BinaryOp, CompositeKind, CompositeLiteral, Expr, Stmt, UnaryOp};
pub use index::{normalize_index, resolve, Mode, Slot};
pub use path::{evaluate_path, read_path, write_path, Access};
pub use reader::{parse_expr, parse_script};
pub use scope::{Environment, Scope};
pub use value::{Dict, Key, Value};
