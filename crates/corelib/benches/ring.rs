use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use corelib::{HashRing, InMemoryStore, RingConfig};

fn populated(nodes: usize, replicas: u32, items: usize) -> HashRing<InMemoryStore<usize>> {
    let ring = HashRing::new(
        RingConfig::new(i32::MAX as u32, replicas),
        Arc::new(InMemoryStore::new()),
    )
    .unwrap();
    for n in 0..nodes {
        ring.add(format!("10.0.0.{}", n)).unwrap();
    }
    for i in 0..items {
        ring.put(&format!("key-{}", i), i).unwrap();
    }
    ring
}

fn bench_resolve(c: &mut Criterion) {
    let ring = populated(60, 100, 0);
    let keys: Vec<String> = (0..1024).map(|i| format!("key-{}", i)).collect();
    let mut i = 0;
    c.bench_function("resolve/60x100", |b| {
        b.iter(|| {
            i = (i + 1) % keys.len();
            black_box(ring.resolve(&keys[i]))
        })
    });
}

fn bench_join(c: &mut Criterion) {
    c.bench_function("add/10x100 with 10k items", |b| {
        b.iter_batched(
            || populated(10, 100, 10_000),
            |ring| black_box(ring.add("10.0.1.1").unwrap()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_resolve, bench_join);
criterion_main!(benches);
