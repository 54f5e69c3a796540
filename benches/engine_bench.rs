#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use naivelog::{evaluate_naive, Atom, DatalogEngine, Database, Rule, Term};

fn var(name: &str) -> Term {
    Term::variable(name)
}

/// Chain graph `n0 -> n1 -> ... -> n{len}` plus transitive closure rules
fn chain_engine(len: usize) -> DatalogEngine {
    let mut engine = DatalogEngine::new();
    for i in 0..len {
        engine
            .assert_fact(Atom::new(
                "edge",
                vec![Term::symbol(format!("n{i}")), Term::symbol(format!("n{}", i + 1))],
            ))
            .unwrap();
    }

    engine
        .assert_rule(Rule::new(
            Atom::new("path", vec![var("X"), var("Y")]),
            vec![Atom::new("edge", vec![var("X"), var("Y")])],
        ))
        .unwrap();
    engine
        .assert_rule(Rule::new(
            Atom::new("path", vec![var("X"), var("Y")]),
            vec![
                Atom::new("edge", vec![var("X"), var("Z")]),
                Atom::new("path", vec![var("Z"), var("Y")]),
            ],
        ))
        .unwrap();
    engine
}

/// Benchmark for inserting ground atoms into a database
fn bench_database_add(c: &mut Criterion) {
    c.bench_function("database_add", |b| {
        b.iter(|| {
            let mut db = Database::new();
            for i in 0..1000 {
                db.add(black_box(Atom::new(
                    "edge",
                    vec![Term::symbol(format!("node_{i}")), Term::symbol(format!("node_{}", i + 1))],
                )));
            }
            black_box(db)
        });
    });
}

/// Naive fixpoint of transitive closure; cost grows with |constants|^3
fn bench_transitive_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");
    group.sample_size(10);

    for len in [4, 8, 12] {
        let engine = chain_engine(len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &engine, |b, engine| {
            b.iter(|| black_box(evaluate_naive(engine.rules())));
        });
    }

    group.finish();
}

/// A query recomputes the fixpoint before searching
fn bench_ask(c: &mut Criterion) {
    let engine = chain_engine(8);
    let query = Atom::new("path", vec![Term::symbol("n0"), var("Y")]);

    c.bench_function("ask_path_from_n0", |b| {
        b.iter(|| black_box(engine.ask(&query)));
    });
}

criterion_group!(
    benches,
    bench_database_add,
    bench_transitive_closure,
    bench_ask
);
criterion_main!(benches);
