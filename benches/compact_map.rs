//! Benchmarks comparing the compact maps to `std::collections::HashMap`.

use compact_hash::{CompactHashMap, CompactLinkedHashMap, DefaultHashBuilder, ImmutableMap};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

fn generate_keys(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user:{:08}", i)).collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        let keys = generate_keys(size);

        group.bench_with_input(BenchmarkId::new("HashMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map: HashMap<&str, u64, DefaultHashBuilder> = HashMap::default();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key.as_str(), i as u64);
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("CompactHashMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = CompactHashMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key.as_str(), i as u64);
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("CompactLinkedHashMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = CompactLinkedHashMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key.as_str(), i as u64);
                }
                black_box(map)
            });
        });

        group.bench_with_input(BenchmarkId::new("ImmutableMap", size), &keys, |b, keys| {
            b.iter(|| {
                let map = ImmutableMap::try_from_iter(
                    keys.iter().enumerate().map(|(i, key)| (key.as_str(), i as u64)),
                );
                black_box(map)
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [1_000, 10_000, 100_000] {
        let keys = generate_keys(size);
        let pairs = || keys.iter().enumerate().map(|(i, key)| (key.as_str(), i as u64));

        let std_map: HashMap<&str, u64, DefaultHashBuilder> = pairs().collect();
        let compact: CompactHashMap<&str, u64> = pairs().collect();
        let linked: CompactLinkedHashMap<&str, u64> = pairs().collect();
        let frozen = match ImmutableMap::try_from_iter(pairs()) {
            Ok(map) => map,
            Err(err) => panic!("generated keys are unique: {err}"),
        };

        group.bench_function(BenchmarkId::new("HashMap", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys.iter() {
                    if let Some(v) = std_map.get(key.as_str()) {
                        sum += v;
                    }
                }
                black_box(sum)
            });
        });

        group.bench_function(BenchmarkId::new("CompactHashMap", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys.iter() {
                    if let Some(v) = compact.get(key.as_str()) {
                        sum += v;
                    }
                }
                black_box(sum)
            });
        });

        group.bench_function(BenchmarkId::new("CompactLinkedHashMap", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys.iter() {
                    if let Some(v) = linked.peek(key.as_str()) {
                        sum += v;
                    }
                }
                black_box(sum)
            });
        });

        group.bench_function(BenchmarkId::new("ImmutableMap", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys.iter() {
                    if let Some(v) = frozen.get(key.as_str()) {
                        sum += v;
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for size in [1_000, 10_000] {
        let keys = generate_keys(size);
        let pairs = || keys.iter().enumerate().map(|(i, key)| (key.as_str(), i as u64));

        group.bench_with_input(BenchmarkId::new("HashMap", size), &keys, |b, keys| {
            b.iter_batched(
                || pairs().collect::<HashMap<&str, u64, DefaultHashBuilder>>(),
                |mut map| {
                    for key in keys.iter() {
                        map.remove(key.as_str());
                    }
                    black_box(map)
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("CompactHashMap", size), &keys, |b, keys| {
            b.iter_batched(
                || pairs().collect::<CompactHashMap<&str, u64>>(),
                |mut map| {
                    for key in keys.iter() {
                        map.remove(key.as_str());
                    }
                    black_box(map)
                },
                criterion::BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("CompactLinkedHashMap", size), &keys, |b, keys| {
            b.iter_batched(
                || pairs().collect::<CompactLinkedHashMap<&str, u64>>(),
                |mut map| {
                    for key in keys.iter() {
                        map.remove(key.as_str());
                    }
                    black_box(map)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove);
criterion_main!(benches);
