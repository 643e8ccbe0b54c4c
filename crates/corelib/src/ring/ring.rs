//! Hash ring with data migration.
//!
//! All topology and the position index sit behind one `parking_lot::RwLock`.
//! Lookups share the read side. `add`/`remove` hold the write side for the
//! topology edit *and* the migration it triggers, so no reader can observe a
//! key resolving to a node that has not received its data yet.

use std::sync::Arc;

use metrics::counter;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::migration::{MigrationReport, Migrator};
use crate::node::NodeId;
use crate::partitioner::PartitionerKind;
use crate::ring::position::RingPosition;
use crate::ring::state::RingState;
use crate::store::NodeStore;
use crate::topology::{RingRange, Topology};

/// Consistent hash ring that keeps a [`NodeStore`] in sync with its topology.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use corelib::{HashRing, InMemoryStore, RingConfig};
///
/// let store = Arc::new(InMemoryStore::new());
/// let ring = HashRing::new(RingConfig::new(1000, 2), store).unwrap();
/// ring.add("A").unwrap();
/// ring.add("B").unwrap();
///
/// let owner = ring.put("x", "payload".to_string()).unwrap();
/// assert_eq!(ring.resolve("x"), Some(owner));
/// ```
#[derive(Debug)]
pub struct HashRing<S: NodeStore> {
    state: RwLock<RingState>,
    store: Arc<S>,
}

impl<S: NodeStore> HashRing<S> {
    /// Create an empty ring over `store`.
    pub fn new(config: RingConfig, store: Arc<S>) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(RingState::new(config)?),
            store,
        })
    }

    /// The storage backend this ring migrates data in.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Topology changes
    // ------------------------------------------------------------------

    /// Join a physical node, placing `replicas` virtual nodes.
    ///
    /// Every virtual node pulls the items of its arc from the node that owned
    /// the arc before, so the returned report counts the items that moved.
    /// Items left behind when the ring last went empty are handed out too.
    ///
    /// # Errors
    /// - [`Error::CapacityExceeded`] if the hash space cannot fit the replicas;
    ///   the ring is left unchanged.
    /// - [`Error::DuplicateNode`] if the node is already a member.
    pub fn add(&self, node: impl Into<NodeId>) -> Result<MigrationReport> {
        self.add_node(node.into())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(node = %node))]
    fn add_node(&self, node: NodeId) -> Result<MigrationReport> {
        let mut state = self.state.write();
        if state.is_member(node.as_str()) {
            return Err(Error::DuplicateNode(node));
        }

        let used = state.vnode_count();
        let requested = state.config().replicas as usize;
        let total_space = state.total_space();
        if used + requested > total_space as usize {
            return Err(Error::CapacityExceeded {
                used,
                requested,
                total_space,
            });
        }

        // Placement can still fail on probe exhaustion; plan before mutating.
        let planned = state.plan_placement(&node)?;

        let mut report = MigrationReport::default();
        for (position, vnode) in planned {
            if let Some((_, successor)) = state.successor(position) {
                report.moved += Migrator::new(&state, &*self.store)
                    .on_node_inserted(position, &vnode, successor);
            }
            debug!(%position, vnode = %vnode, "placed virtual node");
            state.insert(position, vnode)?;
        }

        // Items stranded by an earlier emptying of the ring have an owner again.
        for holder in state.take_orphans() {
            let swept = Migrator::new(&state, &*self.store).sweep(&holder);
            debug!(%holder, moved = swept.moved, "reclaimed orphaned items");
            report += swept;
        }

        counter!("ring.nodes_added").increment(1);
        counter!("ring.items_migrated").increment(report.moved as u64);
        info!(
            %node,
            vnodes = requested,
            moved = report.moved,
            "node joined ring"
        );
        Ok(report)
    }

    /// Remove a physical node and hand its items to their new owners.
    ///
    /// # Errors
    /// - [`Error::UnknownNode`] if the node is not a member.
    pub fn remove(&self, node: impl AsRef<str>) -> Result<MigrationReport> {
        self.remove_node(node.as_ref())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn remove_node(&self, node: &str) -> Result<MigrationReport> {
        let mut state = self.state.write();
        let node = match state.members().get(node) {
            Some(member) => member.clone(),
            None => return Err(Error::UnknownNode(NodeId::new(node))),
        };

        // Locate every replica before touching anything.
        let positions = state.locate_all(&node)?;
        for position in positions {
            state.remove_position(position);
            debug!(%position, "released virtual node position");
        }
        state.forget_member(&node);

        let report = Migrator::new(&state, &*self.store).on_node_removed(&node);
        if report.orphaned > 0 {
            state.record_orphans(node.clone());
        }

        counter!("ring.nodes_removed").increment(1);
        counter!("ring.items_migrated").increment(report.moved as u64);
        info!(
            %node,
            moved = report.moved,
            orphaned = report.orphaned,
            "node left ring"
        );
        Ok(report)
    }

    /// Re-run the relocation sweep over one node's stored items.
    ///
    /// Moves items stored under `node` that some other node owns. On a ring
    /// whose invariant holds this is a no-op; it exists to repair data written
    /// behind the ring's back and to verify that state.
    pub fn rebalance(&self, node: impl AsRef<str>) -> MigrationReport {
        let mut state = self.state.write();
        let node = NodeId::new(node.as_ref());
        let report = Migrator::new(&state, &*self.store).sweep(&node);
        if report.orphaned > 0 {
            state.record_orphans(node);
        }
        counter!("ring.items_migrated").increment(report.moved as u64);
        report
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Owner of `key`: the node of the first virtual node clockwise from the
    /// key's position. `None` only when the ring is empty.
    pub fn resolve(&self, key: &str) -> Option<NodeId> {
        self.state.read().resolve(key).cloned()
    }

    /// Like [`HashRing::resolve`], with [`Error::EmptyRing`] instead of `None`.
    pub fn try_resolve(&self, key: &str) -> Result<NodeId> {
        self.resolve(key).ok_or(Error::EmptyRing)
    }

    /// Position of `key` on the ring.
    pub fn hash_position(&self, key: &str) -> RingPosition {
        self.state.read().hash(key)
    }

    // ------------------------------------------------------------------
    // Data access through the ring
    // ------------------------------------------------------------------

    /// Store `value` on the owner of `key`. Returns the owner.
    ///
    /// Holds the read lock across resolve and write, so the item cannot land
    /// on a node that a concurrent topology change is about to drain.
    pub fn put(&self, key: &str, value: S::Value) -> Result<NodeId> {
        let state = self.state.read();
        let owner = state.resolve(key).ok_or(Error::EmptyRing)?;
        self.store.put(owner, key, value);
        Ok(owner.clone())
    }

    /// Fetch `key` from its owner.
    pub fn get(&self, key: &str) -> Result<S::Value> {
        let state = self.state.read();
        let owner = state.resolve(key).ok_or(Error::EmptyRing)?;
        self.store.get(owner, key)
    }

    /// Delete `key` from its owner. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let state = self.state.read();
        let owner = state.resolve(key).ok_or(Error::EmptyRing)?;
        Ok(self.store.delete(owner, key))
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of physical nodes.
    pub fn node_count(&self) -> usize {
        self.state.read().members().len()
    }

    /// Number of virtual node positions.
    pub fn vnode_count(&self) -> usize {
        self.state.read().vnode_count()
    }

    pub fn is_empty(&self) -> bool {
        self.vnode_count() == 0
    }

    pub fn contains(&self, node: impl AsRef<str>) -> bool {
        self.state.read().is_member(node.as_ref())
    }

    /// Physical nodes in ascending id order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.state.read().members().iter().cloned().collect()
    }

    /// Sorted `(position, owner)` pairs.
    pub fn positions(&self) -> Vec<(RingPosition, NodeId)> {
        self.state.read().positions()
    }

    /// Snapshot of the current topology.
    pub fn topology(&self) -> Topology {
        self.state.read().topology()
    }

    /// Arcs owned by `node`, one per virtual node.
    pub fn ranges_for(&self, node: impl AsRef<str>) -> Vec<RingRange> {
        self.topology().ranges_for(&NodeId::new(node.as_ref()))
    }

    pub fn config(&self) -> RingConfig {
        self.state.read().config().clone()
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.state.read().partitioner_name()
    }
}

/// Builder for a [`HashRing`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use corelib::{InMemoryStore, RingBuilder};
///
/// let ring = RingBuilder::new()
///     .with_total_space(10_000)
///     .with_replicas(8)
///     .add_node("10.0.0.1")
///     .add_node("10.0.0.2")
///     .build(Arc::new(InMemoryStore::<String>::new()))
///     .unwrap();
/// assert_eq!(ring.vnode_count(), 16);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RingBuilder {
    config: RingConfig,
    nodes: Vec<NodeId>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_total_space(mut self, total_space: u32) -> Self {
        self.config.total_space = total_space;
        self
    }

    /// Virtual nodes per physical node.
    pub fn with_replicas(mut self, replicas: u32) -> Self {
        self.config.replicas = replicas;
        self
    }

    pub fn with_partitioner(mut self, partitioner: PartitionerKind) -> Self {
        self.config.partitioner = partitioner;
        self
    }

    /// Node to join once the ring is built (in call order).
    pub fn add_node(mut self, node: impl Into<NodeId>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn build<S: NodeStore>(self, store: Arc<S>) -> Result<HashRing<S>> {
        let ring = HashRing::new(self.config, store)?;
        for node in self.nodes {
            ring.add(node)?;
        }
        Ok(ring)
    }
}
