//! Benchmarks for path resolution and composite construction.
//!
//! Run with `cargo bench -p lattice-core`.

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lattice_core::{
    parse_expr, parse_script, read_path, write_path, Dict, Environment, Evaluate, Interpreter, Key,
    Value,
};

/// `depth` nested dictionaries, each holding the next under `"next"`.
fn nested(depth: usize) -> (Value, Vec<Value>) {
    let mut value = Value::Int(0);
    for _ in 0..depth {
        let mut d = Dict::new();
        d.insert(Key::from("next"), value);
        value = Value::dict(d);
    }
    (value, vec![Value::str("next"); depth])
}

fn bench_read_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_path");
    for depth in [1, 4, 16, 64] {
        let (root, steps) = nested(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &steps, |b, steps| {
            b.iter(|| black_box(read_path(&root, steps)))
        });
    }
    group.finish();
}

fn bench_write_negative_index(c: &mut Criterion) {
    let list = Value::list((0..1000).map(Value::Int).collect());
    let outer = Value::list(vec![list]);
    let steps = [Value::Int(-1), Value::Int(-500)];
    c.bench_function("write_path_negative", |b| {
        b.iter(|| black_box(write_path(&outer, &steps, Value::Int(7))))
    });
}

fn bench_build_literal(c: &mut Criterion) {
    let expr = parse_expr(r#"{"a": [1, 2, 3], "b": &a(1.5, 'x'), 3: {"c": [[], {}]}}"#)
        .expect("benchmark literal parses");
    let scope: HashMap<String, Value> = HashMap::new();
    c.bench_function("build_nested_literal", |b| {
        b.iter(|| {
            let mut interpreter = Interpreter::with_writer(Vec::new());
            black_box(interpreter.eval(&expr, &scope))
        })
    });
}

fn bench_run_script(c: &mut Criterion) {
    let program = parse_script(
        "let m = [[0, 0, 0], [0, 0, 0], [0, 0, 0]]\n\
         m[0][0] = 1; m[1][-2] = 2; m[-1][-1] = 3\n\
         let total = m[0][0] + m[1][1] + m[2][2]",
    )
    .expect("benchmark script parses");
    c.bench_function("run_matrix_script", |b| {
        b.iter(|| {
            let mut env = Environment::new();
            let mut interpreter = Interpreter::with_writer(Vec::new());
            black_box(interpreter.run(&program, &mut env))
        })
    });
}

criterion_group!(
    benches,
    bench_read_depth,
    bench_write_negative_index,
    bench_build_literal,
    bench_run_script
);
criterion_main!(benches);
