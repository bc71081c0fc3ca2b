//! Benchmarks for image signature detection and integrity checks
//!
//! Covers small and max-size payloads; the JPEG trailer scan is the only
//! check that looks past the first few bytes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inkpost::images::compute_hash;
use inkpost_common::ImageKind;
use inkpost_probe::{detect, inspect, validate};

const MAX_IMAGE: usize = 10 * 1024 * 1024;

fn jpeg(len: usize, trailer_offset: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(len, 0x42);
    let pos = len - 2 - trailer_offset;
    data[pos] = 0xFF;
    data[pos + 1] = 0xD9;
    data
}

fn png(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(len - 8, 0x00);
    data.extend_from_slice(&[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82]);
    data
}

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    let samples = [
        ("jpeg", jpeg(4096, 0)),
        ("png", png(4096)),
        ("unknown", vec![0x00; 4096]),
    ];
    for (name, data) in &samples {
        group.bench_with_input(BenchmarkId::new("signature", name), data, |b, data| {
            b.iter(|| detect(black_box(data)));
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    let trailing = jpeg(MAX_IMAGE, 0);
    let padded = jpeg(MAX_IMAGE, 40);
    let truncated = {
        let mut d = jpeg(MAX_IMAGE, 0);
        d.truncate(MAX_IMAGE - 2);
        d
    };

    group.bench_function("jpeg/eoi_at_end", |b| {
        b.iter(|| validate(black_box(&trailing), ImageKind::Jpeg));
    });
    group.bench_function("jpeg/eoi_in_window", |b| {
        b.iter(|| validate(black_box(&padded), ImageKind::Jpeg));
    });
    group.bench_function("jpeg/missing_eoi", |b| {
        b.iter(|| validate(black_box(&truncated), ImageKind::Jpeg));
    });

    let large_png = png(MAX_IMAGE);
    group.bench_function("png/iend", |b| {
        b.iter(|| validate(black_box(&large_png), ImageKind::Png));
    });

    group.finish();
}

fn bench_ingest_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_checks");

    for size in [64 * 1024, 1024 * 1024, MAX_IMAGE] {
        let data = jpeg(size, 0);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("inspect", size), &data, |b, data| {
            b.iter(|| inspect(black_box(data)));
        });
        group.bench_with_input(BenchmarkId::new("content_hash", size), &data, |b, data| {
            b.iter(|| compute_hash(black_box(data)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detect, bench_validate, bench_ingest_checks);
criterion_main!(benches);
