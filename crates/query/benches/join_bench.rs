//! Benchmarks for join composition.
//!
//! Setup (populating the participants) is excluded with `iter_batched`; the
//! measured part is adding the second participant, which composes the join.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rowset::schema::MetaDataBuilder;
use rowset::{CachedRowSet, DataType, ResultSet, RowSet, Value};
use rowset_query::JoinView;

/// Simple LCG for reproducible pseudo-random keys.
fn keys(count: usize, distinct: i64, seed: u64) -> Vec<i64> {
    let mut s = seed;
    (0..count)
        .map(|_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((s >> 33) as i64) % distinct
        })
        .collect()
}

fn create_row_set(table: &str, keys: &[i64]) -> CachedRowSet {
    let meta = MetaDataBuilder::new(table)
        .unwrap()
        .add_column("key", DataType::Int64)
        .unwrap()
        .add_column("payload", DataType::String)
        .unwrap()
        .build()
        .unwrap();
    let rows = keys
        .iter()
        .enumerate()
        .map(|(i, &k)| vec![Value::Int64(k), Value::String(format!("row_{}", i))])
        .collect();
    let mut rs = CachedRowSet::new();
    rs.populate(ResultSet::new(meta, rows).unwrap(), 1).unwrap();
    rs
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_compose");
    for size in [100usize, 1_000, 10_000] {
        let left = keys(size, size as i64, 12345);
        let right = keys(size, size as i64, 54321);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || {
                    let mut view = JoinView::new();
                    view.add_row_set(create_row_set("l", &left), 1).unwrap();
                    (view, create_row_set("r", &right))
                },
                |(mut view, right)| {
                    view.add_row_set(right, 1).unwrap();
                    black_box(view.size())
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut view = JoinView::new();
    view.add_row_set(create_row_set("l", &keys(5_000, 1_000, 1)), 1)
        .unwrap();
    view.add_row_set(create_row_set("r", &keys(5_000, 1_000, 2)), 1)
        .unwrap();

    c.bench_function("join_scan", |b| {
        b.iter(|| {
            view.before_first().unwrap();
            let mut n = 0usize;
            while view.next().unwrap() {
                n += 1;
            }
            black_box(n)
        })
    });
}

criterion_group!(benches, bench_compose, bench_scan);
criterion_main!(benches);
