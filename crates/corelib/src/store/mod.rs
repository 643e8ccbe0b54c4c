//! Storage backends holding each node's items.
//!
//! The ring never stores values itself. It decides *which node* owns a key;
//! a [`NodeStore`] keeps the items, indexed by that node's id.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryStore, StoreStats};
pub use traits::NodeStore;
