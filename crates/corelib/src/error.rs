//! Error types for the core library.

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Every position of the hash space is taken (or unreachable by probing).
    #[error("max node capacity reached: {used} of {total_space} positions in use, {requested} requested")]
    CapacityExceeded {
        /// Positions already occupied.
        used: usize,
        /// Positions the add would need.
        requested: usize,
        /// Size of the hash space.
        total_space: u32,
    },
    /// The ring has no virtual nodes, so no key has an owner.
    #[error("ring is empty: no node available")]
    EmptyRing,
    /// The storage backend holds no item under this key for this node.
    #[error("key {key:?} not found on node {node}")]
    KeyNotFound { node: NodeId, key: String },
    /// The node is not a member of the ring.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    /// The node is already a member of the ring.
    #[error("node already in ring: {0}")]
    DuplicateNode(NodeId),
    /// Ring configuration rejected by validation.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
    /// Ring state no longer matches its own invariants.
    #[error("internal error: {0}")]
    Internal(String),
}
