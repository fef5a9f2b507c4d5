//! Build and lookup throughput over a synthetic lexicon.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dawgdic_core::dawg_builder::DawgBuilder;
use dawgdic_core::Dictionary;

fn synthetic_lexicon(size: usize) -> Vec<String> {
    let mut keys: Vec<String> = (0..size)
        .map(|i| format!("{:08}", (i as u64 * 2_654_435_761) % 100_000_000))
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for &size in &[1_000usize, 10_000, 100_000] {
        let keys = synthetic_lexicon(size);
        group.bench_with_input(BenchmarkId::new("dawg_and_dictionary", size), &keys, |b, keys| {
            b.iter(|| {
                let mut builder = DawgBuilder::new();
                for (i, key) in keys.iter().enumerate() {
                    builder.insert(key.as_bytes(), i as i32).unwrap();
                }
                let dawg = builder.finish();
                let dic = Dictionary::build(&dawg).unwrap();
                criterion::black_box(dic);
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for &size in &[1_000usize, 10_000, 100_000] {
        let keys = synthetic_lexicon(size);
        let mut builder = DawgBuilder::new();
        for (i, key) in keys.iter().enumerate() {
            builder.insert(key.as_bytes(), i as i32).unwrap();
        }
        let dic = Dictionary::build(&builder.finish()).unwrap();

        group.bench_with_input(BenchmarkId::new("find", size), &(dic, keys), |b, (dic, keys)| {
            b.iter(|| {
                for key in keys {
                    criterion::black_box(dic.find(key.as_bytes()));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
