//! Whole-pipeline benchmark over generated in-memory input
//!
//! Varies worker count at a fixed block size so the scaling of the worker
//! pool shows up directly in the throughput numbers.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use station_agg::generate::generate_bytes;
use station_agg::{Pipeline, PipelineConfig};

const ROWS: u64 = 1_000_000;
const BLOCK_SIZE: usize = 1024 * 1024;

fn benchmark_pipeline(c: &mut Criterion) {
    let data = generate_bytes(ROWS, 400, 7);

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for workers in [1, 2, 4, num_cpus::get()] {
        let pipeline = Pipeline::new(
            PipelineConfig::new("in-memory")
                .with_block_size(BLOCK_SIZE)
                .with_workers(workers)
                .with_result_queue_capacity(workers),
        )
        .expect("valid config");

        group.bench_with_input(BenchmarkId::new("workers", workers), &data, |b, data| {
            b.iter(|| black_box(pipeline.run_reader(&data[..]).unwrap().table.len()))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
