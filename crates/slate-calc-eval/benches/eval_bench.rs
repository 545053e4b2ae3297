//! Evaluator micro-benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use slate_calc_core::Expr;
use slate_calc_eval::{evaluate, EvalContext, EvalValue, FunctionRegistry, ValueSource};

/// A synthetic grid: every cell holds `row + col` as a number
struct Grid;

impl ValueSource for Grid {
    fn sheet_index(&self, _name: &str) -> Option<usize> {
        Some(0)
    }

    fn value_at(&self, _sheet: usize, row: u32, col: u16) -> EvalValue {
        EvalValue::Number((row + col as u32) as f64)
    }

    fn name_expr(&self, _name: &str) -> Option<&Expr> {
        None
    }
}

fn bench_scalar_arithmetic(c: &mut Criterion) {
    let grid = Grid;
    let registry = FunctionRegistry::new();
    let ctx = EvalContext::new(&grid, &registry, 0, 0, 0);
    let expr = Expr::sub(
        Expr::mul(Expr::cell("B1").unwrap(), Expr::cell("A2").unwrap()),
        Expr::div(Expr::cell("C3").unwrap(), Expr::num(7.0)),
    );

    c.bench_function("scalar_arithmetic", |b| {
        b.iter(|| evaluate(black_box(&expr), &ctx).unwrap())
    });
}

fn bench_sum_over_range(c: &mut Criterion) {
    let grid = Grid;
    let registry = FunctionRegistry::new();
    let ctx = EvalContext::new(&grid, &registry, 0, 0, 0);
    let expr = Expr::call("SUM", vec![Expr::range("A1:J100").unwrap()]);

    c.bench_function("sum_1000_cells", |b| {
        b.iter(|| evaluate(black_box(&expr), &ctx).unwrap())
    });
}

fn bench_array_relational(c: &mut Criterion) {
    let grid = Grid;
    let registry = FunctionRegistry::new();
    let ctx = EvalContext::new(&grid, &registry, 0, 0, 0).with_array_context(true);
    let expr = Expr::ge(Expr::range("A1:J100").unwrap(), Expr::num(50.0));

    c.bench_function("relational_broadcast_1000_cells", |b| {
        b.iter(|| evaluate(black_box(&expr), &ctx).unwrap())
    });
}

criterion_group!(
    benches,
    bench_scalar_arithmetic,
    bench_sum_over_range,
    bench_array_relational
);
criterion_main!(benches);
