//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each physical node having a single position on the ring, each
//! node is expanded into `replicas` virtual nodes scattered around the hash
//! space. This provides:
//!
//! 1. **Better Load Distribution**: more positions = smaller, more even arcs
//! 2. **Gradual Rebalancing**: a joining node takes small slices from many
//!    owners instead of half of one neighbour's range
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(r) per physical node where r = replicas
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Join/leave**: O(r · n log n) for the re-sorts plus the migration scans

use crate::node::NodeId;

/// One replica slot of a physical node on the hash ring.
///
/// # Invariants
///
/// - `vnode_key` is `"{node_id}:{replica}"` and is unique across the ring
/// - Every `VirtualNode` belongs to exactly one physical node
/// - The position is not stored here; it is recomputed from `vnode_key` by
///   probing (see [`crate::ring::HashRing`])
///
/// # Example
///
/// ```rust
/// use corelib::{NodeId, VirtualNode};
///
/// let vnode = VirtualNode::from_index(NodeId::new("10.0.0.1"), 0);
/// assert_eq!(vnode.vnode_key(), "10.0.0.1:0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualNode {
    /// The physical node that owns this virtual node.
    ///
    /// Multiple virtual nodes share the same `node_id`. A lookup lands on a
    /// vnode and routes to this id.
    pub node_id: NodeId,

    /// Deterministic per-replica identifier, hashed to place the vnode.
    pub vnode_key: String,
}

impl VirtualNode {
    /// Create the virtual node for replica `replica` of `node_id`.
    ///
    /// # Performance
    /// - **Time**: O(k) where k = length of the formatted key
    pub fn from_index(node_id: NodeId, replica: u32) -> Self {
        let vnode_key = format!("{}:{}", node_id, replica);
        Self { node_id, vnode_key }
    }

    /// Get the owning node ID.
    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Get the key hashed to place this vnode.
    #[inline]
    pub fn vnode_key(&self) -> &str {
        &self.vnode_key
    }

    /// True if both vnodes are replicas of the same physical node.
    #[inline]
    pub fn same_physical(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode({})", self.vnode_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vnode_from_index() {
        let vnode0 = VirtualNode::from_index(NodeId::new("node1"), 0);
        let vnode1 = VirtualNode::from_index(NodeId::new("node1"), 1);

        // Different keys
        assert_ne!(vnode0.vnode_key(), vnode1.vnode_key());
        assert_eq!(vnode1.vnode_key(), "node1:1");

        // But same node_id
        assert!(vnode0.same_physical(&vnode1));
        assert_eq!(vnode0.node_id(), &NodeId::new("node1"));
    }

    #[test]
    fn test_vnode_display() {
        let vnode = VirtualNode::from_index(NodeId::new("10.0.0.3"), 7);
        assert_eq!(vnode.to_string(), "VNode(10.0.0.3:7)");
    }

    #[test]
    fn test_vnode_different_physical() {
        let a = VirtualNode::from_index(NodeId::new("a"), 0);
        let b = VirtualNode::from_index(NodeId::new("b"), 0);
        assert!(!a.same_physical(&b));
    }
}
