//! Readers racing topology changes never miss an item.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use corelib::{HashRing, InMemoryStore, RingConfig};

const ITEMS: usize = 500;

#[test]
fn test_reads_during_joins_and_leaves() {
    let ring: HashRing<InMemoryStore<usize>> =
        HashRing::new(RingConfig::new(1_000_000, 32), Arc::new(InMemoryStore::new())).unwrap();
    ring.add("base").unwrap();
    for i in 0..ITEMS {
        ring.put(&format!("key-{}", i), i).unwrap();
    }

    let done = AtomicBool::new(false);
    let reads = AtomicUsize::new(0);

    crossbeam::scope(|s| {
        for reader in 0..4 {
            let (ring, done, reads) = (&ring, &done, &reads);
            s.spawn(move |_| {
                let mut i = reader;
                while !done.load(Ordering::Acquire) {
                    let key = format!("key-{}", i % ITEMS);
                    assert_eq!(ring.get(&key), Ok(i % ITEMS), "{} vanished", key);
                    reads.fetch_add(1, Ordering::Relaxed);
                    i += 7;
                }
            });
        }

        s.spawn(|_| {
            for round in 0..10 {
                for n in 0..3 {
                    ring.add(format!("10.0.{}.{}", round, n)).unwrap();
                }
                for n in 0..3 {
                    ring.remove(format!("10.0.{}.{}", round, n)).unwrap();
                }
            }
            done.store(true, Ordering::Release);
        });
    })
    .unwrap();

    assert!(reads.load(Ordering::Relaxed) > 0);
    assert_eq!(ring.store().len(), ITEMS);
    assert_eq!(ring.nodes().len(), 1);
}

#[test]
fn test_concurrent_writers_and_joins() {
    let ring: HashRing<InMemoryStore<usize>> =
        HashRing::new(RingConfig::new(1_000_000, 16), Arc::new(InMemoryStore::new())).unwrap();
    ring.add("a").unwrap();

    crossbeam::scope(|s| {
        for writer in 0..4 {
            let ring = &ring;
            s.spawn(move |_| {
                for i in 0..250 {
                    let n = writer * 250 + i;
                    ring.put(&format!("key-{}", n), n).unwrap();
                }
            });
        }
        s.spawn(|_| {
            for n in ["b", "c", "d"] {
                ring.add(n).unwrap();
            }
        });
    })
    .unwrap();

    assert_eq!(ring.store().len(), 1000);
    for n in 0..1000 {
        assert_eq!(ring.get(&format!("key-{}", n)), Ok(n));
    }
}
