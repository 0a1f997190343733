//! Expression and statement trees.
//!
//! Produced by [`crate::reader`] (or built by hand) and consumed by the
//! composite builder and the interpreter.

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Which composite a literal constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    Dict,
    List,
    Axis,
}

/// A composite literal whose keys and elements are still unevaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeLiteral {
    /// `(key, value)` pairs in source order.
    Dict(Vec<(Expr, Expr)>),
    List(Vec<Expr>),
    Axis(Vec<Expr>),
}

impl CompositeLiteral {
    pub fn kind(&self) -> CompositeKind {
        match self {
            CompositeLiteral::Dict(_) => CompositeKind::Dict,
            CompositeLiteral::List(_) => CompositeKind::List,
            CompositeLiteral::Axis(_) => CompositeKind::Axis,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A scalar constant.
    Literal(Value),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Composite(CompositeLiteral),
    /// `base[s0][s1]...`; field access `.name` is a string step.
    Index {
        base: Box<Expr>,
        steps: Vec<Expr>,
    },
    /// `start..end`, end exclusive.
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    /// Builtin call.
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Literal(Value::Int(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Value::Str(s.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Append index steps, flattening into an existing index chain.
    pub fn index(base: Expr, steps: impl IntoIterator<Item = Expr>) -> Self {
        match base {
            Expr::Index {
                base,
                steps: mut existing,
            } => {
                existing.extend(steps);
                Expr::Index {
                    base,
                    steps: existing,
                }
            }
            other => Expr::Index {
                base: Box::new(other),
                steps: steps.into_iter().collect(),
            },
        }
    }

    pub fn dict(pairs: Vec<(Expr, Expr)>) -> Self {
        Expr::Composite(CompositeLiteral::Dict(pairs))
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Expr::Composite(CompositeLiteral::List(items))
    }

    pub fn axis(items: Vec<Expr>) -> Self {
        Expr::Composite(CompositeLiteral::Axis(items))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = value` or `const name = value`.
    Let {
        name: String,
        value: Expr,
        constant: bool,
    },
    /// `name = value` or `name[s0]...[sn] = value`.
    Assign {
        name: String,
        steps: Vec<Expr>,
        value: Expr,
    },
    Print(Expr),
    Expr(Expr),
}
