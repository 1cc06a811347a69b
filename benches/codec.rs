//! 短码编解码基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tinylink::codec::{decode, encode};

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_encode");
    for id in [61u64, 1_000_000, u32::MAX as u64, u64::MAX] {
        group.bench_with_input(BenchmarkId::from_parameter(id), &id, |b, &id| {
            b.iter(|| encode(black_box(id)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec_decode");
    for id in [61u64, 1_000_000, u32::MAX as u64, u64::MAX] {
        let code = encode(id);
        group.bench_with_input(BenchmarkId::from_parameter(&code), &code, |b, code| {
            b.iter(|| decode(black_box(code)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
