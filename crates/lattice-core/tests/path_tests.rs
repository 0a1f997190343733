/// Path evaluation tests: multi-hop reads and writes through nested
/// composites, error pinpointing and aliasing of shared subtrees.
use lattice_core::{
    evaluate_path, read_path, write_path, Access, Dict, IndexErrorKind, Key, LatticeError, Value,
};

// ============================================================================
// Fixtures
// ============================================================================

fn dict(entries: Vec<(&str, Value)>) -> Value {
    Value::dict(
        entries
            .into_iter()
            .map(|(k, v)| (Key::from(k), v))
            .collect::<Dict>(),
    )
}

fn strs(items: &[&str]) -> Value {
    Value::list(items.iter().map(|s| Value::str(*s)).collect())
}

/// `{"departments": [{"employees": ["Alice", "Bob"]}]}`
fn company() -> Value {
    dict(vec![(
        "departments",
        Value::list(vec![dict(vec![("employees", strs(&["Alice", "Bob"]))])]),
    )])
}

fn steps(items: &[Value]) -> Vec<Value> {
    items.to_vec()
}

// ============================================================================
// 1. Reads
// ============================================================================

#[test]
fn reads_through_dict_list_dict_list() {
    let path = steps(&[
        Value::str("departments"),
        Value::Int(0),
        Value::str("employees"),
        Value::Int(1),
    ]);
    assert_eq!(read_path(&company(), &path).unwrap(), Value::str("Bob"));
}

#[test]
fn negative_indices_mix_with_keys() {
    let path = steps(&[
        Value::str("departments"),
        Value::Int(-1),
        Value::str("employees"),
        Value::Int(-2),
    ]);
    assert_eq!(read_path(&company(), &path).unwrap(), Value::str("Alice"));
}

#[test]
fn empty_read_path_returns_root() {
    let root = company();
    let result = read_path(&root, &[]).unwrap();
    assert!(result.ptr_eq(&root));
}

#[test]
fn reading_a_composite_returns_a_shared_handle() {
    let root = company();
    let employees = read_path(
        &root,
        &[Value::str("departments"), Value::Int(0), Value::str("employees")],
    )
    .unwrap();
    write_path(&employees, &[Value::Int(0)], Value::str("Ada")).unwrap();
    let first = read_path(
        &root,
        &[
            Value::str("departments"),
            Value::Int(0),
            Value::str("employees"),
            Value::Int(0),
        ],
    )
    .unwrap();
    assert_eq!(first, Value::str("Ada"));
}

#[test]
fn deep_paths_read_any_depth() {
    let mut value = Value::str("bottom");
    for level in (0..7).rev() {
        value = if level % 2 == 0 {
            dict(vec![("down", value)])
        } else {
            Value::list(vec![Value::Null, value])
        };
    }
    let path: Vec<Value> = (0..7)
        .map(|level| {
            if level % 2 == 0 {
                Value::str("down")
            } else {
                Value::Int(-1)
            }
        })
        .collect();
    assert_eq!(read_path(&value, &path).unwrap(), Value::str("bottom"));
}

#[test]
fn seven_mixed_steps_match_incremental_reads() {
    // dict -> list -> axis -> dict -> list -> axis -> dict
    let leaf = dict(vec![("v", Value::Int(7))]);
    let level6 = Value::axis(vec![Value::Null, leaf]);
    let level5 = Value::list(vec![level6, Value::Int(0)]);
    let level4 = dict(vec![("e", level5)]);
    let level3 = Value::axis(vec![level4]);
    let level2 = Value::list(vec![Value::Null, Value::Null, level3]);
    let root = dict(vec![("a", level2)]);

    let path = steps(&[
        Value::str("a"),
        Value::Int(-1),
        Value::Int(0),
        Value::str("e"),
        Value::Int(0),
        Value::Int(1),
        Value::str("v"),
    ]);
    let whole = read_path(&root, &path).unwrap();

    let mut current = root.clone();
    for step in &path {
        current = read_path(&current, std::slice::from_ref(step)).unwrap();
    }
    assert_eq!(whole, current);
    assert_eq!(whole, Value::Int(7));
}

#[test]
fn reads_through_an_axis() {
    let root = dict(vec![(
        "grid",
        Value::axis(vec![strs(&["a", "b"]), strs(&["c", "d"])]),
    )]);
    let path = steps(&[Value::str("grid"), Value::Int(-1), Value::Int(0)]);
    assert_eq!(read_path(&root, &path).unwrap(), Value::str("c"));
}

// ============================================================================
// 2. Writes
// ============================================================================

#[test]
fn write_extends_dictionary() {
    let d = dict(vec![]);
    write_path(&d, &[Value::str("country")], Value::str("India")).unwrap();
    assert_eq!(
        read_path(&d, &[Value::str("country")]).unwrap(),
        Value::str("India")
    );
}

#[test]
fn write_at_depth_replaces_leaf() {
    let root = company();
    let path = steps(&[
        Value::str("departments"),
        Value::Int(0),
        Value::str("employees"),
        Value::Int(-1),
    ]);
    write_path(&root, &path, Value::str("Bea")).unwrap();
    assert_eq!(read_path(&root, &path).unwrap(), Value::str("Bea"));
}

#[test]
fn write_adds_key_to_nested_dictionary() {
    let root = company();
    write_path(
        &root,
        &[Value::str("departments"), Value::Int(0), Value::str("name")],
        Value::str("R&D"),
    )
    .unwrap();
    assert_eq!(
        root.to_string(),
        r#"{"departments": [{"employees": ["Alice", "Bob"], "name": "R&D"}]}"#
    );
}

#[test]
fn write_into_composite_nested_in_axis() {
    let inner = dict(vec![("k", Value::Int(1))]);
    let a = Value::axis(vec![inner.clone()]);
    write_path(&a, &[Value::Int(0), Value::str("k")], Value::Int(2)).unwrap();
    assert_eq!(read_path(&inner, &[Value::str("k")]).unwrap(), Value::Int(2));
}

#[test]
fn evaluate_path_write_returns_null() {
    let l = strs(&["x"]);
    let result = evaluate_path(&l, &[Value::Int(0)], Access::Write(Value::Int(1))).unwrap();
    assert_eq!(result, Value::Null);
    assert_eq!(l, Value::list(vec![Value::Int(1)]));
}

#[test]
fn empty_write_path_is_rejected() {
    let err = write_path(&company(), &[], Value::Null).unwrap_err();
    assert!(matches!(err, LatticeError::EmptyPath));
}

// ============================================================================
// 3. Errors name the failing step
// ============================================================================

#[test]
fn out_of_range_read() {
    let l = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let err = read_path(&l, &[Value::Int(5)]).unwrap_err();
    assert_eq!(err.failed_step(), Some(0));
    assert_eq!(
        err.index_kind(),
        Some(&IndexErrorKind::IndexOutOfRange { index: 5, len: 3 })
    );
}

#[test]
fn missing_key_in_the_middle() {
    let path = steps(&[
        Value::str("departments"),
        Value::Int(0),
        Value::str("staff"),
        Value::Int(0),
    ]);
    let err = read_path(&company(), &path).unwrap_err();
    match err {
        LatticeError::Path { step, index, kind } => {
            assert_eq!(step, 2);
            assert_eq!(index, "\"staff\"");
            assert_eq!(
                kind,
                IndexErrorKind::KeyNotFound {
                    key: "\"staff\"".into()
                }
            );
        }
        other => panic!("expected path error, got {other:?}"),
    }
}

#[test]
fn indexing_past_a_scalar() {
    let path = steps(&[
        Value::str("departments"),
        Value::Int(0),
        Value::str("employees"),
        Value::Int(0),
        Value::Int(0),
    ]);
    let err = read_path(&company(), &path).unwrap_err();
    assert_eq!(err.failed_step(), Some(4));
    assert_eq!(
        err.index_kind(),
        Some(&IndexErrorKind::NotIndexable { found: "String" })
    );
}

#[test]
fn error_message_mentions_step_and_index() {
    let err = read_path(&company(), &[Value::str("departments"), Value::Int(9)]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "path step 1 [9]: index 9 out of range for length 1"
    );
}

#[test]
fn failed_write_leaves_tree_unchanged() {
    let root = company();
    let before = root.deep_clone();
    let path = steps(&[Value::str("departments"), Value::Int(3), Value::str("x")]);
    assert!(write_path(&root, &path, Value::Int(1)).is_err());
    assert_eq!(root, before);
}

#[test]
fn write_into_axis_slot_fails_at_last_step() {
    let root = dict(vec![("a", Value::axis(vec![Value::Int(1)]))]);
    let err = write_path(&root, &[Value::str("a"), Value::Int(0)], Value::Int(2)).unwrap_err();
    assert_eq!(err.failed_step(), Some(1));
    assert_eq!(err.index_kind(), Some(&IndexErrorKind::FixedAxis));
}

#[test]
fn write_creating_a_cycle_is_rejected() {
    let root = company();
    let err = write_path(&root, &[Value::str("self")], root.clone()).unwrap_err();
    assert_eq!(err.index_kind(), Some(&IndexErrorKind::Cycle));
    let nested = read_path(&root, &[Value::str("departments")]).unwrap();
    let err = write_path(&nested, &[Value::Int(0)], root.clone()).unwrap_err();
    assert_eq!(err.index_kind(), Some(&IndexErrorKind::Cycle));
}
