// In vecframe-core/benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use vecframe::{decode, encode, Codec, CodecConfig, DataFrame, Series, Vector};

// --- Mock Data Generation ---

fn random_i64s(rng: &mut StdRng, size: usize) -> Vec<i64> {
    (0..size).map(|_| rng.random_range(-1_000_000..1_000_000)).collect()
}

fn random_f64s(rng: &mut StdRng, size: usize) -> Vec<f64> {
    (0..size).map(|_| rng.random::<f64>() * 1000.0).collect()
}

/// A frame with one numeric, one nullable and one text column.
fn mixed_frame(rng: &mut StdRng, rows: usize) -> DataFrame {
    let ids: Vec<i64> = (0..rows as i64).collect();
    let scores: Vec<Option<f64>> = (0..rows)
        .map(|_| rng.random_bool(0.9).then(|| rng.random::<f64>()))
        .collect();
    let labels: Vec<String> = (0..rows).map(|i| format!("row-{}", i % 97)).collect();
    DataFrame::new(vec![
        Series::new(Vector::new(ids)).with_name("id"),
        Series::new(Vector::new(scores)).with_name("score"),
        Series::new(Vector::new(labels)).with_name("label"),
    ])
    .with_name("bench")
}

// --- Benchmark Suite ---

const BENCH_ROWS: usize = 100_000;

fn bench_vectors(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let ints = Vector::new(random_i64s(&mut rng, BENCH_ROWS));
    let floats = Vector::new(random_f64s(&mut rng, BENCH_ROWS));
    let ints_json = encode(&ints).unwrap();
    let floats_json = encode(&floats).unwrap();

    // Same payload without the length header, to exercise the pooled path.
    let unsized_json = ints_json.replacen(&format!(",\"length\":{}", BENCH_ROWS), "", 1);

    let mut group = c.benchmark_group("Vector Codec");
    group.throughput(Throughput::Elements(BENCH_ROWS as u64));

    group.bench_function("Encode i64", |b| b.iter(|| black_box(encode(black_box(&ints)))));
    group.bench_function("Encode f64", |b| b.iter(|| black_box(encode(black_box(&floats)))));
    group.bench_function("Decode i64 (length header)", |b| {
        b.iter(|| black_box(decode::<Vector>(black_box(&ints_json))))
    });
    group.bench_function("Decode i64 (pooled)", |b| {
        b.iter(|| black_box(decode::<Vector>(black_box(&unsized_json))))
    });
    group.bench_function("Decode f64", |b| {
        b.iter(|| black_box(decode::<Vector>(black_box(&floats_json))))
    });

    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let frame = mixed_frame(&mut rng, BENCH_ROWS);
    let codec = Codec::new(CodecConfig::default());
    let json = codec.encode(&frame).unwrap();

    let mut group = c.benchmark_group("Frame Codec");
    group.throughput(Throughput::Bytes(json.len() as u64));

    group.bench_function("Encode mixed frame", |b| b.iter(|| black_box(codec.encode(black_box(&frame)))));
    group.bench_function("Decode mixed frame", |b| {
        b.iter(|| black_box(codec.decode::<DataFrame>(black_box(&json))))
    });

    group.finish();
}

criterion_group!(benches, bench_vectors, bench_frames);
criterion_main!(benches);
