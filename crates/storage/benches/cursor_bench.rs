//! Benchmarks for cursor navigation over buffers with hidden rows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rowset_core::schema::MetaDataBuilder;
use rowset_core::{DataType, Row, Value};
use rowset_storage::{Cursor, RowBuffer};

fn create_buffer(count: usize) -> RowBuffer {
    let meta = MetaDataBuilder::new("bench")
        .unwrap()
        .add_column("id", DataType::Int64)
        .unwrap()
        .add_column("name", DataType::String)
        .unwrap()
        .build()
        .unwrap();
    let mut buffer = RowBuffer::with_metadata(meta);
    for i in 0..count {
        let mut row = Row::new(vec![Value::Int64(i as i64), Value::String(format!("row{}", i))]);
        // Every tenth row is deleted and hidden from navigation.
        if i % 10 == 0 {
            row.mark_deleted();
        }
        buffer.push(row).unwrap();
    }
    buffer
}

/// Benchmark: full forward scan with next()
fn cursor_scan_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_scan");

    for count in [1_000usize, 10_000, 100_000].iter() {
        let buffer = create_buffer(*count);
        group.bench_with_input(BenchmarkId::new("next", count), &buffer, |b, buffer| {
            b.iter(|| {
                let mut cursor = Cursor::default();
                let mut visited = 0usize;
                while cursor.next(buffer).unwrap() {
                    visited += 1;
                }
                black_box(visited)
            });
        });
    }

    group.finish();
}

/// Benchmark: random access with absolute()
fn cursor_absolute_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cursor_absolute");

    for count in [1_000usize, 10_000].iter() {
        let buffer = create_buffer(*count);
        let visible = buffer.visible_count() as i64;
        group.bench_with_input(BenchmarkId::new("absolute", count), &buffer, |b, buffer| {
            b.iter(|| {
                let mut cursor = Cursor::default();
                for n in (1..visible).step_by(97) {
                    black_box(cursor.absolute(buffer, n).unwrap());
                    black_box(cursor.absolute(buffer, -n).unwrap());
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, cursor_scan_benchmark, cursor_absolute_benchmark);
criterion_main!(benches);
