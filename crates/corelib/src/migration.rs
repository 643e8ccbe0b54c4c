//! Migration coordinator.
//!
//! Keeps every stored item on the node that `resolve(key)` names. It runs
//! inside the ring's write lock, right after (removal) or right before
//! (insertion) the position index changes, and it only ever decides a
//! destination through the same successor rule lookups use.
//!
//! # Costs
//!
//! - **Insertion**: one full scan of the successor's items per new vnode.
//!   Membership in the new arc depends only on the item's hash, so there is
//!   no smaller candidate set.
//! - **Removal**: one scan of the departed node's items.

use std::ops::AddAssign;

use serde::Serialize;
use tracing::{debug, warn};

use crate::node::NodeId;
use crate::ring::position::RingPosition;
use crate::ring::state::RingState;
use crate::store::NodeStore;
use crate::topology::RingRange;
use crate::vnode::VirtualNode;

/// Outcome of a topology change for the stored data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Items written to a new owner and deleted from the old one.
    pub moved: usize,
    /// Items left in place because the ring had no node to take them.
    pub orphaned: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.moved == 0 && self.orphaned == 0
    }
}

impl AddAssign for MigrationReport {
    fn add_assign(&mut self, other: Self) {
        self.moved += other.moved;
        self.orphaned += other.orphaned;
    }
}

pub(crate) struct Migrator<'a, S: NodeStore + ?Sized> {
    state: &'a RingState,
    store: &'a S,
}

impl<'a, S: NodeStore + ?Sized> Migrator<'a, S> {
    pub(crate) fn new(state: &'a RingState, store: &'a S) -> Self {
        Self { state, store }
    }

    /// Pulls into `new_node` every item of `successor` that falls in the new
    /// vnode's arc `(predecessor, new_position]`.
    ///
    /// Called before `new_position` enters the index; `successor` is the vnode
    /// that owned the whole arc until now.
    pub(crate) fn on_node_inserted(
        &self,
        new_position: RingPosition,
        new_node: &VirtualNode,
        successor: &VirtualNode,
    ) -> usize {
        // Another replica of the same node already owns this arc.
        if new_node.same_physical(successor) {
            return 0;
        }
        let Some((predecessor, _)) = self.state.predecessor(new_position) else {
            return 0;
        };

        let range = RingRange::new(predecessor, new_position, self.state.total_space());
        let mut moved = 0;
        for (key, value) in self.store.list_items(successor.node_id()) {
            if range.contains(self.state.hash(&key)) {
                self.relocate(&key, value, successor.node_id(), new_node.node_id());
                moved += 1;
            }
        }
        debug!(
            vnode = %new_node,
            from = %successor.node_id(),
            %range,
            moved,
            "pulled items into new virtual node"
        );
        moved
    }

    /// Hands every item of a departed node to its new owner.
    ///
    /// The node's positions are already gone, so `resolve` reflects the
    /// post-removal ring and every remaining node is a valid destination.
    pub(crate) fn on_node_removed(&self, node: &NodeId) -> MigrationReport {
        self.sweep(node)
    }

    /// Moves each item stored under `node` whose owner is some other node.
    ///
    /// On a ring that already satisfies the ownership invariant this moves
    /// nothing, which is what makes a repeated sweep a no-op.
    pub(crate) fn sweep(&self, node: &NodeId) -> MigrationReport {
        let mut report = MigrationReport::default();
        for (key, value) in self.store.list_items(node) {
            match self.state.resolve(&key) {
                Some(owner) if owner != node => {
                    self.relocate(&key, value, node, owner);
                    report.moved += 1;
                }
                Some(_) => {}
                None => report.orphaned += 1,
            }
        }
        if report.orphaned > 0 {
            warn!(
                %node,
                orphaned = report.orphaned,
                "ring is empty, items left in place"
            );
        }
        report
    }

    // Write first: a concurrent reader sees the item somewhere at all times.
    fn relocate(&self, key: &str, value: S::Value, from: &NodeId, to: &NodeId) {
        self.store.put(to, key, value);
        self.store.delete(from, key);
        debug!(key, %from, %to, "migrated item");
    }
}
