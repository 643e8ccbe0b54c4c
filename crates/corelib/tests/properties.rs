//! Property tests: ownership is a pure function of topology, and stored items
//! follow their owner through any sequence of joins and leaves.

use std::sync::Arc;

use corelib::{HashRing, InMemoryStore, NodeId, NodeStore, RingConfig};
use proptest::prelude::*;

type Store = InMemoryStore<u32>;

fn ring(total_space: u32, replicas: u32) -> HashRing<Store> {
    HashRing::new(RingConfig::new(total_space, replicas), Arc::new(Store::new())).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u8..8).prop_map(Op::Add), (0u8..8).prop_map(Op::Remove)]
}

fn node_name(n: u8) -> String {
    format!("10.0.1.{}", n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: same topology, same owner, every time
    #[test]
    fn prop_resolve_is_deterministic(
        nodes in prop::collection::btree_set(0u8..32, 1..8),
        keys in prop::collection::vec("[a-z0-9]{1,12}", 1..50)
    ) {
        let a = ring(1_000_000, 16);
        let b = ring(1_000_000, 16);
        for n in &nodes {
            a.add(node_name(*n)).unwrap();
            b.add(node_name(*n)).unwrap();
        }

        for key in &keys {
            let owner = a.resolve(key);
            prop_assert!(owner.is_some());
            prop_assert_eq!(&owner, &a.resolve(key));
            prop_assert_eq!(&owner, &b.resolve(key));
        }
    }

    /// Property: N nodes with R replicas occupy exactly N×R distinct positions
    #[test]
    fn prop_placement_count(
        node_count in 1usize..12,
        replicas in 1u32..40
    ) {
        let ring = ring(1_000_000, replicas);
        for n in 0..node_count {
            ring.add(format!("node-{}", n)).unwrap();
        }

        let positions = ring.positions();
        prop_assert_eq!(positions.len(), node_count * replicas as usize);
        prop_assert!(positions.windows(2).all(|w| w[0].0 < w[1].0));
        for n in 0..node_count {
            let name = format!("node-{}", n);
            let owned = positions.iter().filter(|(_, owner)| *owner == name.as_str()).count();
            prop_assert_eq!(owned, replicas as usize);
        }
    }

    /// Property: after every join or leave, each item lives exactly on its owner
    #[test]
    fn prop_items_follow_owner(
        ops in prop::collection::vec(op(), 1..20),
        item_count in 1usize..300
    ) {
        let ring = ring(100_000, 8);
        ring.add(node_name(0)).unwrap();
        for i in 0..item_count {
            ring.put(&format!("item-{}", i), i as u32).unwrap();
        }

        for op in ops {
            match op {
                Op::Add(n) => {
                    let _ = ring.add(node_name(n));
                }
                // Keep one node around so nothing is orphaned.
                Op::Remove(n) if ring.node_count() > 1 => {
                    let _ = ring.remove(node_name(n));
                }
                Op::Remove(_) => {}
            }

            prop_assert_eq!(ring.store().len(), item_count);
            for i in 0..item_count {
                let key = format!("item-{}", i);
                let owner: NodeId = ring.resolve(&key).unwrap();
                prop_assert_eq!(ring.store().get(&owner, &key), Ok(i as u32));
            }
            for node in ring.nodes() {
                prop_assert!(ring.rebalance(&node).is_noop());
            }
        }
    }
}
