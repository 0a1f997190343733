//! Expression evaluation and statement execution.
//!
//! [`Evaluate`] is the seam the composite builder calls through. The
//! [`Interpreter`] is the reference implementation: scalar arithmetic and
//! comparison, variable reads, composite literals, index chains, ranges and
//! builtin calls. Statements bind names and write through index paths.

use std::cmp::Ordering;
use std::io::{self, Write};

use crate::builder;
use crate::error::{LatticeError, Result};
use crate::expr::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::library;
use crate::path;
use crate::scope::{Environment, Scope};
use crate::value::Value;

/// Something that can turn an expression into a value.
pub trait Evaluate {
    fn eval(&mut self, expr: &Expr, scope: &dyn Scope) -> Result<Value>;
}

/// Reference evaluator. `print` output goes to `W`.
#[derive(Debug)]
pub struct Interpreter<W: Write = io::Stdout> {
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Execute statements in order, stopping at the first error.
    pub fn run(&mut self, program: &[Stmt], env: &mut Environment) -> Result<()> {
        for stmt in program {
            self.execute(stmt, env)?;
        }
        Ok(())
    }

    pub fn execute(&mut self, stmt: &Stmt, env: &mut Environment) -> Result<()> {
        match stmt {
            Stmt::Let {
                name,
                value,
                constant,
            } => {
                let value = self.eval(value, &*env)?;
                if *constant {
                    env.define_const(name, value)
                } else {
                    env.define(name, value)
                }
            }
            Stmt::Assign { name, steps, value } if steps.is_empty() => {
                let value = self.eval(value, &*env)?;
                env.bind(name, value)
            }
            Stmt::Assign { name, steps, value } => {
                let root = env.lookup(name)?;
                let steps = self.eval_steps(steps, &*env)?;
                let value = self.eval(value, &*env)?;
                path::write_path(&root, &steps, value)
            }
            Stmt::Print(expr) => {
                let value = self.eval(expr, &*env)?;
                self.print(&[value])
            }
            Stmt::Expr(expr) => self.eval(expr, &*env).map(|_| ()),
        }
    }

    fn eval_steps(&mut self, steps: &[Expr], scope: &dyn Scope) -> Result<Vec<Value>> {
        steps.iter().map(|s| self.eval(s, scope)).collect()
    }

    fn print(&mut self, values: &[Value]) -> Result<()> {
        let line = values
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.out, "{line}").map_err(|e| LatticeError::eval(format!("print failed: {e}")))
    }
}

impl<W: Write> Evaluate for Interpreter<W> {
    fn eval(&mut self, expr: &Expr, scope: &dyn Scope) -> Result<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Var(name) => scope.lookup(name),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand, scope)?;
                unary(*op, value)
            }
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let left = self.eval(left, scope)?;
                if left.truthy() {
                    self.eval(right, scope)
                } else {
                    Ok(left)
                }
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let left = self.eval(left, scope)?;
                if left.truthy() {
                    Ok(left)
                } else {
                    self.eval(right, scope)
                }
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left, scope)?;
                let right = self.eval(right, scope)?;
                binary(*op, &left, &right)
            }
            Expr::Composite(literal) => builder::build(literal, self, scope),
            Expr::Index { base, steps } => {
                let root = self.eval(base, scope)?;
                let steps = self.eval_steps(steps, scope)?;
                path::read_path(&root, &steps)
            }
            Expr::Range { start, end } => {
                let start = self.eval(start, scope)?;
                let end = self.eval(end, scope)?;
                range(&start, &end)
            }
            Expr::Call { name, args } => {
                let args = self.eval_steps(args, scope)?;
                if name == "print" {
                    self.print(&args)?;
                    return Ok(Value::Null);
                }
                library::call(name, &args)
            }
        }
    }
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| LatticeError::eval("integer overflow")),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, other) => Err(LatticeError::type_mismatch(
            "Int or Float",
            other.type_name(),
            "unary -",
        )),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => compare(op, left, right, Ordering::is_lt),
        BinaryOp::Le => compare(op, left, right, Ordering::is_le),
        BinaryOp::Gt => compare(op, left, right, Ordering::is_gt),
        BinaryOp::Ge => compare(op, left, right, Ordering::is_ge),
        BinaryOp::Add => add(left, right),
        _ => arithmetic(op, left, right),
    }
}

fn add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::Str(a), Value::Char(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::Char(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        _ => arithmetic(BinaryOp::Add, left, right),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_arithmetic(op, *a, *b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let (a, b) = (left.as_float().unwrap_or(0.0), right.as_float().unwrap_or(0.0));
            float_arithmetic(op, a, b)
        }
        _ => Err(LatticeError::type_mismatch(
            "numbers",
            format!("{} and {}", left.type_name(), right.type_name()),
            op.symbol(),
        )),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0 {
        return Err(LatticeError::eval("division by zero"));
    }
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Rem => a.checked_rem(b),
        _ => return Err(LatticeError::eval(format!("'{}' is not arithmetic", op.symbol()))),
    };
    result
        .map(Value::Int)
        .ok_or_else(|| LatticeError::eval("integer overflow"))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    if matches!(op, BinaryOp::Div | BinaryOp::Rem) && b == 0.0 {
        return Err(LatticeError::eval("division by zero"));
    }
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return Err(LatticeError::eval(format!("'{}' is not arithmetic", op.symbol()))),
    };
    Ok(Value::Float(result))
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    test: fn(Ordering) -> bool,
) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => left
            .as_float()
            .zip(right.as_float())
            .and_then(|(a, b)| a.partial_cmp(&b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        _ => {
            return Err(LatticeError::type_mismatch(
                "comparable operands",
                format!("{} and {}", left.type_name(), right.type_name()),
                op.symbol(),
            ))
        }
    };
    Ok(Value::Bool(ordering.is_some_and(test)))
}

/// Longest list a range expression may produce.
pub const MAX_RANGE_LEN: i64 = 1 << 20;

/// `start..end` as a list of consecutive integers; empty when `end <= start`.
///
/// Ranges longer than [`MAX_RANGE_LEN`] are rejected.
pub fn range(start: &Value, end: &Value) -> Result<Value> {
    match (start, end) {
        (Value::Int(a), Value::Int(b)) if b <= a => Ok(Value::list(Vec::new())),
        (Value::Int(a), Value::Int(b)) => match b.checked_sub(*a) {
            Some(len) if len <= MAX_RANGE_LEN => {
                Ok(Value::list((*a..*b).map(Value::Int).collect()))
            }
            _ => Err(LatticeError::eval(format!(
                "range {a}..{b} is longer than {MAX_RANGE_LEN} elements"
            ))),
        },
        _ => Err(LatticeError::type_mismatch(
            "Int bounds",
            format!("{} and {}", start.type_name(), end.type_name()),
            "range",
        )),
    }
}
