//! Performance benchmarks for yxdb-lzf.
//!
//! Evaluates compression/decompression throughput across a handful of data
//! patterns representative of YXDB miniblock payloads (columnar fixed-width
//! record data tends to be repetitive within a block).

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use yxdb_lzf::{compress, decompress};

mod test_data {
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    pub fn repetitive(size: usize) -> Vec<u8> {
        let pattern = b"TOBEORNOTTOBEORTOBEORNOT";
        let mut data = Vec::with_capacity(size);
        while data.len() < size {
            let remaining = size - data.len();
            let chunk_size = remaining.min(pattern.len());
            data.extend_from_slice(&pattern[..chunk_size]);
        }
        data
    }

    pub fn columnar_like(size: usize) -> Vec<u8> {
        // Simulate fixed-width Int32 columns: mostly small deltas.
        let mut data = Vec::with_capacity(size);
        let mut value: i32 = 0;
        while data.len() + 4 <= size {
            value = value.wrapping_add(1);
            data.extend_from_slice(&value.to_le_bytes());
        }
        data
    }
}

const MEDIUM: usize = 100 * 1024;

fn bench_compression(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzf_compression");

    let patterns: [(&str, fn(usize) -> Vec<u8>); 3] = [
        ("uniform", test_data::uniform),
        ("repetitive", test_data::repetitive),
        ("columnar", test_data::columnar_like),
    ];

    for (name, generator) in patterns {
        let data = generator(MEDIUM);
        group.throughput(Throughput::Bytes(MEDIUM as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| {
                let compressed = compress(black_box(data));
                black_box(compressed);
            });
        });
    }

    group.finish();
}

fn bench_decompression(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzf_decompression");

    let patterns: [(&str, fn(usize) -> Vec<u8>); 3] = [
        ("uniform", test_data::uniform),
        ("repetitive", test_data::repetitive),
        ("columnar", test_data::columnar_like),
    ];

    for (name, generator) in patterns {
        let data = generator(MEDIUM);
        let compressed = compress(&data);

        group.throughput(Throughput::Bytes(MEDIUM as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &compressed,
            |b, compressed| {
                b.iter(|| {
                    let decompressed = decompress(black_box(compressed), MEDIUM * 2).unwrap();
                    black_box(decompressed);
                });
            },
        );
    }

    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzf_roundtrip");

    let data = test_data::columnar_like(MEDIUM);
    group.throughput(Throughput::Bytes(MEDIUM as u64));
    group.bench_function("columnar", |b| {
        b.iter(|| {
            let compressed = compress(black_box(&data));
            let decompressed = decompress(&compressed, MEDIUM * 2).unwrap();
            black_box(decompressed);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_compression,
    bench_decompression,
    bench_roundtrip,
);
criterion_main!(benches);
