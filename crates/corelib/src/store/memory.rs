//! In-memory node store.

use std::collections::HashMap;

use dashmap::DashMap;
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::store::traits::NodeStore;

/// In-memory store backed by a `DashMap<NodeId, HashMap<String, V>>`.
///
/// Each node's items live in one map entry, so DashMap's shard lock is the
/// per-node critical section: a put or delete on one node never blocks on
/// another node's items unless both hash to the same shard.
#[derive(Debug)]
pub struct InMemoryStore<V> {
    nodes: DashMap<NodeId, HashMap<String, V>>,
}

/// Item distribution across nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StoreStats {
    /// Nodes that have ever held an item.
    pub nodes: usize,
    /// Total items across all nodes.
    pub items: usize,
    pub min_items: usize,
    pub max_items: usize,
    pub mean_items: f64,
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }
}

impl<V: Clone + Send + Sync> InMemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items stored on `node`.
    pub fn item_count(&self, node: &NodeId) -> usize {
        self.nodes.get(node.as_str()).map_or(0, |items| items.len())
    }

    /// Total number of items across all nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nodes that currently hold at least one item.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Min / max / mean items per node, over every node seen so far.
    ///
    /// Nodes that were emptied by a migration still count (with zero items),
    /// which is what makes a drained node visible in the report.
    pub fn stats(&self) -> StoreStats {
        let counts: Vec<usize> = self.nodes.iter().map(|entry| entry.value().len()).collect();
        let items: usize = counts.iter().sum();
        let mean_items = if counts.is_empty() {
            0.0
        } else {
            items as f64 / counts.len() as f64
        };
        StoreStats {
            nodes: counts.len(),
            items,
            min_items: counts.iter().copied().min().unwrap_or(0),
            max_items: counts.iter().copied().max().unwrap_or(0),
            mean_items,
        }
    }
}

impl<V: Clone + Send + Sync> NodeStore for InMemoryStore<V> {
    type Value = V;

    fn put(&self, node: &NodeId, key: &str, value: V) {
        trace!(%node, key, "put");
        self.nodes
            .entry(node.clone())
            .or_default()
            .insert(key.to_owned(), value);
    }

    fn get(&self, node: &NodeId, key: &str) -> Result<V> {
        self.nodes
            .get(node.as_str())
            .and_then(|items| items.get(key).cloned())
            .ok_or_else(|| Error::KeyNotFound {
                node: node.clone(),
                key: key.to_owned(),
            })
    }

    fn delete(&self, node: &NodeId, key: &str) -> bool {
        let removed = self
            .nodes
            .get_mut(node.as_str())
            .is_some_and(|mut items| items.remove(key).is_some());
        trace!(%node, key, removed, "delete");
        removed
    }

    fn list_items(&self, node: &NodeId) -> Vec<(String, V)> {
        self.nodes
            .get(node.as_str())
            .map(|items| {
                items
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> NodeId {
        NodeId::new(name)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = InMemoryStore::new();
        store.put(&node("a"), "k", 7u32);
        assert_eq!(store.get(&node("a"), "k"), Ok(7));
    }

    #[test]
    fn test_put_overwrites() {
        let store = InMemoryStore::new();
        store.put(&node("a"), "k", "old");
        store.put(&node("a"), "k", "new");
        assert_eq!(store.get(&node("a"), "k"), Ok("new"));
        assert_eq!(store.item_count(&node("a")), 1);
    }

    #[test]
    fn test_get_missing_is_key_not_found() {
        let store: InMemoryStore<u32> = InMemoryStore::new();
        let err = store.get(&node("nowhere"), "k").unwrap_err();
        assert_eq!(
            err,
            Error::KeyNotFound {
                node: node("nowhere"),
                key: "k".into()
            }
        );

        store.put(&node("a"), "other", 1);
        assert!(matches!(store.get(&node("a"), "k"), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn test_delete_is_tolerant() {
        let store = InMemoryStore::new();
        assert!(!store.delete(&node("ghost"), "k"));

        store.put(&node("a"), "k", 1u8);
        assert!(store.delete(&node("a"), "k"));
        assert!(!store.delete(&node("a"), "k"));
        assert!(store.get(&node("a"), "k").is_err());
    }

    #[test]
    fn test_list_items_unknown_node_is_empty() {
        let store: InMemoryStore<u8> = InMemoryStore::new();
        assert!(store.list_items(&node("ghost")).is_empty());
    }

    #[test]
    fn test_list_items_returns_all() {
        let store = InMemoryStore::new();
        store.put(&node("a"), "k1", 1);
        store.put(&node("a"), "k2", 2);
        store.put(&node("b"), "k3", 3);

        let mut items = store.list_items(&node("a"));
        items.sort();
        assert_eq!(items, vec![("k1".to_string(), 1), ("k2".to_string(), 2)]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_stats() {
        let store = InMemoryStore::new();
        assert_eq!(store.stats().nodes, 0);
        assert_eq!(store.stats().mean_items, 0.0);

        store.put(&node("a"), "k1", ());
        store.put(&node("a"), "k2", ());
        store.put(&node("a"), "k3", ());
        store.put(&node("b"), "k4", ());
        store.delete(&node("b"), "k4");

        let stats = store.stats();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.items, 3);
        assert_eq!(stats.min_items, 0);
        assert_eq!(stats.max_items, 3);
        assert_eq!(stats.mean_items, 1.5);
        assert_eq!(store.node_ids(), vec![node("a")]);
    }
}
