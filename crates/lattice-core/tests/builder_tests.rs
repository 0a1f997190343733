/// Composite builder tests.
///
/// A recording evaluator checks that keys and values are evaluated strictly
/// left to right (key before value within a pair) and that nested literals
/// complete before their parent.
use std::collections::HashMap;

use lattice_core::{
    build, CompositeLiteral, Evaluate, Expr, IndexErrorKind, Interpreter, LatticeError, Scope,
    Value,
};

// ============================================================================
// Helpers
// ============================================================================

/// Evaluates literals and variables, logging each scalar it produces.
#[derive(Default)]
struct Recorder {
    log: Vec<String>,
}

impl Evaluate for Recorder {
    fn eval(&mut self, expr: &Expr, scope: &dyn Scope) -> lattice_core::Result<Value> {
        let value = match expr {
            Expr::Literal(v) => v.clone(),
            Expr::Var(name) => scope.lookup(name)?,
            Expr::Composite(literal) => {
                let value = build(literal, self, scope)?;
                self.log.push(format!("built {}", value.type_name()));
                return Ok(value);
            }
            other => panic!("recorder cannot evaluate {other:?}"),
        };
        self.log.push(value.to_string());
        Ok(value)
    }
}

fn empty_scope() -> HashMap<String, Value> {
    HashMap::new()
}

fn interpret(
    literal: &CompositeLiteral,
    scope: &HashMap<String, Value>,
) -> lattice_core::Result<Value> {
    build(literal, &mut Interpreter::with_writer(Vec::new()), scope)
}

// ============================================================================
// 1. Evaluation order
// ============================================================================

#[test]
fn dict_pairs_evaluate_key_then_value_in_order() {
    let literal = CompositeLiteral::Dict(vec![
        (Expr::string("a"), Expr::int(1)),
        (Expr::string("b"), Expr::int(2)),
    ]);
    let mut recorder = Recorder::default();
    build(&literal, &mut recorder, &empty_scope()).unwrap();
    assert_eq!(recorder.log, ["a", "1", "b", "2"]);
}

#[test]
fn nested_literals_complete_before_parent() {
    let literal = CompositeLiteral::List(vec![
        Expr::int(1),
        Expr::axis(vec![Expr::int(2), Expr::int(3)]),
        Expr::int(4),
    ]);
    let mut recorder = Recorder::default();
    let value = build(&literal, &mut recorder, &empty_scope()).unwrap();
    assert_eq!(recorder.log, ["1", "2", "3", "built Axis", "4"]);
    assert_eq!(value.to_string(), "[1, axis(2, 3), 4]");
}

#[test]
fn first_failure_aborts_build() {
    let literal = CompositeLiteral::List(vec![
        Expr::int(1),
        Expr::var("missing"),
        Expr::int(3),
    ]);
    let mut recorder = Recorder::default();
    let err = build(&literal, &mut recorder, &empty_scope()).unwrap_err();
    assert!(matches!(err, LatticeError::UnboundName(ref n) if n == "missing"));
    assert_eq!(recorder.log, ["1"]);
}

// ============================================================================
// 2. Dictionaries
// ============================================================================

#[test]
fn keys_may_be_computed_expressions() {
    let mut scope = empty_scope();
    scope.insert("n".into(), Value::Int(2));
    let literal = CompositeLiteral::Dict(vec![
        (Expr::var("n"), Expr::string("two")),
        (
            Expr::binary(lattice_core::BinaryOp::Add, Expr::var("n"), Expr::int(1)),
            Expr::string("three"),
        ),
    ]);
    let d = interpret(&literal, &scope).unwrap();
    assert_eq!(d.to_string(), r#"{2: "two", 3: "three"}"#);
}

#[test]
fn duplicate_keys_keep_last_value_at_first_position() {
    let literal = CompositeLiteral::Dict(vec![
        (Expr::int(1), Expr::string("first")),
        (Expr::int(2), Expr::string("middle")),
        (Expr::int(1), Expr::string("last")),
    ]);
    let d = interpret(&literal, &empty_scope()).unwrap();
    assert_eq!(d.len(), Some(2));
    assert_eq!(d.to_string(), r#"{1: "last", 2: "middle"}"#);
}

#[test]
fn mixed_key_types_stay_distinct() {
    let literal = CompositeLiteral::Dict(vec![
        (Expr::int(1), Expr::string("int")),
        (Expr::Literal(Value::Float(1.0)), Expr::string("float")),
        (Expr::string("1"), Expr::string("string")),
        (Expr::Literal(Value::Char('1')), Expr::string("char")),
        (Expr::Literal(Value::Bool(true)), Expr::string("bool")),
    ]);
    let d = interpret(&literal, &empty_scope()).unwrap();
    assert_eq!(d.len(), Some(5));
}

#[test]
fn composite_key_is_rejected() {
    let literal = CompositeLiteral::Dict(vec![(Expr::list(vec![]), Expr::int(1))]);
    let err = interpret(&literal, &empty_scope()).unwrap_err();
    assert!(matches!(
        err,
        LatticeError::Index(IndexErrorKind::TypeMismatch { found: "List", .. })
    ));
}

#[test]
fn empty_literals_build_empty_composites() {
    for (literal, name) in [
        (CompositeLiteral::Dict(vec![]), "Dict"),
        (CompositeLiteral::List(vec![]), "List"),
        (CompositeLiteral::Axis(vec![]), "Axis"),
    ] {
        let value = interpret(&literal, &empty_scope()).unwrap();
        assert_eq!(value.type_name(), name);
        assert_eq!(value.len(), Some(0));
    }
}

// ============================================================================
// 3. Sharing
// ============================================================================

#[test]
fn variables_in_literals_share_their_composite() {
    let inner = Value::list(vec![Value::Int(1)]);
    let mut scope = empty_scope();
    scope.insert("inner".into(), inner.clone());
    let literal = CompositeLiteral::List(vec![Expr::var("inner"), Expr::var("inner")]);
    let outer = interpret(&literal, &scope).unwrap();

    lattice_core::write_path(&inner, &[Value::Int(0)], Value::Int(9)).unwrap();
    assert_eq!(outer.to_string(), "[[9], [9]]");
}

#[test]
fn each_evaluation_builds_a_fresh_composite() {
    let literal = CompositeLiteral::List(vec![Expr::int(1)]);
    let a = interpret(&literal, &empty_scope()).unwrap();
    let b = interpret(&literal, &empty_scope()).unwrap();
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
}
