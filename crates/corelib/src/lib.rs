//! Core library for consistent hashing with data migration.
//!
//! This crate provides:
//! - Partitioners turning keys into ring digests
//! - Ring positions, the sorted position index and quadratic-probe placement
//! - Node and virtual node abstractions
//! - The hash ring with join/leave, successor lookup and range-correct
//!   migration of stored items
//! - A storage backend trait and an in-memory implementation

pub mod config;
pub mod error;
pub mod migration;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod store;
pub mod topology;
pub mod vnode;

pub use config::RingConfig;
pub use error::{Error, Result};
pub use migration::MigrationReport;
pub use node::NodeId;
pub use partitioner::{Partitioner, PartitionerKind};
pub use ring::{HashRing, Ring, RingBuilder, RingPosition};
pub use store::{InMemoryStore, NodeStore, StoreStats};
pub use topology::{RingRange, Topology};
pub use vnode::VirtualNode;
