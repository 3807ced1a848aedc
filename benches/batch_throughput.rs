// Criterion benchmarks for batch analysis and pairwise comparison.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use seqbatch::{compare, BatchProcessor, Logger, ScoringScheme, SequenceAnalyzer, SvgRenderer};

fn make_sequences(count: usize, len: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(0x5EED_BA7C);
    let bases = b"ACGTN";
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| bases[rng.gen_range(0..bases.len())] as char)
                .collect()
        })
        .collect()
}

fn bench_process_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_batch");
    let sequences = make_sequences(4096, 150);
    group.throughput(Throughput::Elements(sequences.len() as u64));

    for workers in [1usize, 4] {
        let processor = BatchProcessor::with_workers(
            workers,
            SequenceAnalyzer::default(),
            SvgRenderer::default(),
            Logger::default(),
        )
        .expect("worker pool");

        group.bench_with_input(BenchmarkId::from_parameter(workers), &sequences, |b, seqs| {
            b.iter(|| processor.process_batch(black_box(seqs)).expect("batch"))
        });
    }

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    let scheme = ScoringScheme::default();

    for len in [64usize, 256] {
        let pair = make_sequences(2, len);
        group.bench_with_input(BenchmarkId::from_parameter(len), &pair, |b, pair| {
            b.iter(|| compare(black_box(&pair[0]), black_box(&pair[1]), &scheme).expect("compare"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process_batch, bench_compare);
criterion_main!(benches);
