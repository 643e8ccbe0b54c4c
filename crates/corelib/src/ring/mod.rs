//! Consistent hash ring implementation.
//!
//! The ring manages virtual node positions and provides lookup operations
//! for finding the node responsible for a key, migrating stored items
//! whenever the set of nodes changes.

pub mod position;
pub mod ring;
pub(crate) mod state;

pub use position::{PositionIndex, RingPosition};
pub use ring::{HashRing, RingBuilder};

/// Alias for the main ring type (used by lib.rs).
pub type Ring<S> = HashRing<S>;
