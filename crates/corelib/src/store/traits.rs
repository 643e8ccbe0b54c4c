//! Core trait for per-node item storage.

use crate::error::Result;
use crate::node::NodeId;

/// Key/value storage partitioned by node identity.
///
/// Implementations must be `Send + Sync`: the ring calls into the store while
/// holding its own lock, and readers may hit the store concurrently with a
/// migration. Each call must be atomic with respect to a single node's items,
/// so a reader racing a move sees the item at the old node, the new node, or
/// both.
pub trait NodeStore: Send + Sync {
    /// Opaque value type. The ring never inspects it.
    type Value: Clone + Send + Sync;

    /// Insert or overwrite `key` on `node`. Unseen nodes are created on demand.
    fn put(&self, node: &NodeId, key: &str, value: Self::Value);

    /// Fetch `key` from `node`, or [`crate::Error::KeyNotFound`].
    fn get(&self, node: &NodeId, key: &str) -> Result<Self::Value>;

    /// Remove `key` from `node`. Returns whether anything was removed.
    fn delete(&self, node: &NodeId, key: &str) -> bool;

    /// Snapshot of every item stored on `node`; empty for an unknown node.
    fn list_items(&self, node: &NodeId) -> Vec<(String, Self::Value)>;
}

impl<S: NodeStore + ?Sized> NodeStore for std::sync::Arc<S> {
    type Value = S::Value;

    fn put(&self, node: &NodeId, key: &str, value: Self::Value) {
        (**self).put(node, key, value)
    }

    fn get(&self, node: &NodeId, key: &str) -> Result<Self::Value> {
        (**self).get(node, key)
    }

    fn delete(&self, node: &NodeId, key: &str) -> bool {
        (**self).delete(node, key)
    }

    fn list_items(&self, node: &NodeId) -> Vec<(String, Self::Value)> {
        (**self).list_items(node)
    }
}
