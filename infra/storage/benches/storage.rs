use criterion::{Criterion, criterion_group, criterion_main};
use sbox_storage::{Storage, bound_length, sanitize_filename};
use std::hint::black_box;
use tempfile::TempDir;

// ============================================================================
// Benchmark: Filename Resolution
// ============================================================================

fn bench_filename_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("filename_resolution");

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async { Storage::builder().root(temp.path()).connect().await.unwrap() });

    group.bench_function("sanitize_hostile", |b| {
        b.iter(|| black_box(sanitize_filename(black_box("../../..\\evil\0/..  .photo.png"), "upload.jpg")));
    });

    let long = format!("{}.jpeg", "x".repeat(1024));
    group.bench_function("bound_long_name", |b| {
        b.iter(|| black_box(bound_length(black_box(&long), 255).len()));
    });

    group.bench_function("resolve_fresh", |b| {
        b.iter(|| black_box(storage.resolve_upload("holiday.png").unwrap()));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Read Authorization
// ============================================================================

fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize");

    let temp = TempDir::new().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let storage = rt.block_on(async { Storage::builder().root(temp.path()).connect().await.unwrap() });

    group.bench_function("contained", |b| {
        b.iter(|| black_box(storage.authorize(["album", "cat.png"]).is_ok()));
    });

    group.bench_function("traversal", |b| {
        b.iter(|| black_box(storage.authorize(["..", "..", "etc", "passwd"]).is_err()));
    });

    group.finish();
}

criterion_group!(benches, bench_filename_resolution, bench_authorize);
criterion_main!(benches);
