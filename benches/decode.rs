//! Temperature decoding and record parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use station_agg::generate::generate_bytes;
use station_agg::parser::parse_records;
use station_agg::temperature::decode;

fn benchmark_decode(c: &mut Criterion) {
    let samples: [&[u8]; 4] = [b"8.9", b"-4.2", b"38.8", b"-99.9"];

    c.bench_function("decode_temperature", |b| {
        b.iter(|| {
            for sample in samples {
                black_box(decode(black_box(sample)).ok());
            }
        })
    });
}

fn benchmark_parse_records(c: &mut Criterion) {
    // ~1.4 MB, 400 stations (matches the generator defaults)
    let data = generate_bytes(100_000, 400, 1);

    let mut group = c.benchmark_group("parse_records");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("single_chunk", |b| {
        b.iter(|| black_box(parse_records(black_box(&data), 0).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, benchmark_decode, benchmark_parse_records);
criterion_main!(benches);
