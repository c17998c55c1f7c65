//! Benchmarks for qflow optimizer steps
//!
//! Run with: cargo bench -p qflow

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qflow::examples::{barren_plateau_example, maxcut_qaoa_example};
use qflow::optimizer::{AdamOptimizer, Optimizer, Qng2Optimizer, QngOptimizer};
use qflow::{Ansatz, Objective};

fn bench_steps(c: &mut Criterion) {
    let example = maxcut_qaoa_example(2, 6, 0).unwrap();
    let objective = example.objective().unwrap();
    let params = example.circuit.init(Some(0));

    let mut group = c.benchmark_group("maxcut_step");
    let optimizers: [(&str, Box<dyn Optimizer>); 4] = [
        ("qng2-cached", Box::new(Qng2Optimizer::default()) as Box<dyn Optimizer>),
        ("qng2-fresh", Box::new(Qng2Optimizer::default().with_reuse_metric(false))),
        ("qng", Box::new(QngOptimizer::default())),
        ("adam", Box::new(AdamOptimizer::default())),
    ];
    for (name, mut opt) in optimizers {
        // Warm the metric cache so cached QNG2 measures the steady state.
        opt.step(&objective, &params).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| opt.step(black_box(&objective), &params).unwrap());
        });
    }
    group.finish();
}

fn bench_objective(c: &mut Criterion) {
    let mut group = c.benchmark_group("barren_plateau");
    for n in [4_usize, 7] {
        let example = barren_plateau_example(5, n).unwrap();
        let objective = example.objective().unwrap();
        let params = example.circuit.init(Some(1));
        let x = params.to_vec();
        group.bench_with_input(BenchmarkId::new("cost", n), &n, |b, _| {
            b.iter(|| objective.cost(black_box(&x)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("gradient", n), &n, |b, _| {
            b.iter(|| objective.gradient(black_box(&x)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_steps, bench_objective);
criterion_main!(benches);
