//! Ledger and datacenter benchmarks.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keyledger::{Datacenter, DatacenterConfig, RECORD_CAPACITY};
use keyledger_core::Nonce;
use keyledger_testkit::{deterministic_ledger, random_bytes, random_ledger};

fn bench_add_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/add_block");
    group.throughput(Throughput::Bytes(RECORD_CAPACITY as u64));

    let content = random_bytes(RECORD_CAPACITY);
    group.bench_function("full_record", |b| {
        let mut ledger = deterministic_ledger(0);
        b.iter(|| black_box(ledger.add_block(content.clone(), Nonce::ZERO)));
    });

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger/verify");

    for blocks in [10usize, 100, 1000] {
        let ledger = random_ledger(blocks, 128);
        group.throughput(Throughput::Elements(blocks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &ledger, |b, ledger| {
            b.iter(|| black_box(ledger.verify()));
        });
    }

    group.finish();
}

fn bench_vote(c: &mut Criterion) {
    let ledger = random_ledger(1000, 128);
    let peer = ledger.clone();
    c.bench_function("ledger/vote/1000", |b| {
        b.iter(|| black_box(ledger.vote(&peer)));
    });
}

fn bench_write_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("datacenter/write_bytes");

    for len in [64usize, RECORD_CAPACITY, 8 * RECORD_CAPACITY] {
        let payload = random_bytes(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &payload, |b, payload| {
            let mut datacenter = Datacenter::new(DatacenterConfig::default())
                .unwrap_or_else(|e| panic!("datacenter: {e}"));
            b.iter(|| black_box(datacenter.write_bytes(payload)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_add_block,
    bench_verify,
    bench_vote,
    bench_write_pipeline
);
criterion_main!(benches);
