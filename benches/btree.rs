use std::hint::black_box;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sqlyte::storage::table::Table;
use sqlyte::types::row::Row;
use tempfile::TempDir;

// Row counts stay well inside the 100-page file limit: sequential
// inserts settle at about seven rows per leaf.
const DATASET_SIZES: &[usize] = &[50, 150, 300];

fn sample_row(id: u32) -> Row {
    Row::new(id, &format!("user{id}"), &format!("person{id}@example.com")).unwrap()
}

fn populated_table(dir: &TempDir, rows: usize) -> Table {
    let path = dir.path().join("bench.db");
    let mut table = Table::open(&path).unwrap();
    for id in 1..=rows as u32 {
        table.insert(&sample_row(id)).unwrap();
    }
    table
}

fn benchmark_sequential_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_insert");
    for &size in DATASET_SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_custom(|iters| {
                let mut total = std::time::Duration::ZERO;
                for _ in 0..iters {
                    let dir = TempDir::new().unwrap();
                    let path = dir.path().join("bench.db");
                    let mut table = Table::open(&path).unwrap();
                    let start = Instant::now();
                    for id in 1..=size as u32 {
                        table.insert(black_box(&sample_row(id))).unwrap();
                    }
                    total += start.elapsed();
                }
                total
            });
        });
    }
    group.finish();
}

fn benchmark_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan");
    for &size in DATASET_SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let mut table = populated_table(&dir, size);
            b.iter(|| {
                let rows = black_box(table.select_all().unwrap());
                assert_eq!(rows.len(), size);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_sequential_insert, benchmark_full_scan);
criterion_main!(benches);
