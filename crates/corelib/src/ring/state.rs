//! Unsynchronized ring state: positions, virtual nodes, membership.
//!
//! [`crate::ring::HashRing`] wraps this in a reader/writer lock; everything
//! here assumes the caller already holds the right side of it.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::RingConfig;
use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::position::{PositionIndex, RingPosition};
use crate::topology::Topology;
use crate::vnode::VirtualNode;

/// What a probe sequence is looking for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeMode {
    /// First position not occupied by any virtual node.
    Insert,
    /// The position occupied by exactly this virtual node key.
    LocateExact,
}

#[derive(Debug)]
pub(crate) struct RingState {
    config: RingConfig,
    partitioner: Box<dyn Partitioner>,
    index: PositionIndex,
    vnodes: HashMap<RingPosition, VirtualNode>,
    members: BTreeSet<NodeId>,
    /// Nodes still holding items that an empty ring could not place.
    orphans: BTreeSet<NodeId>,
}

impl RingState {
    pub(crate) fn new(config: RingConfig) -> Result<Self> {
        config.validate()?;
        let partitioner = config.partitioner.build();
        Ok(Self {
            config,
            partitioner,
            index: PositionIndex::new(),
            vnodes: HashMap::new(),
            members: BTreeSet::new(),
            orphans: BTreeSet::new(),
        })
    }

    #[inline]
    pub(crate) fn config(&self) -> &RingConfig {
        &self.config
    }

    #[inline]
    pub(crate) fn total_space(&self) -> u32 {
        self.config.total_space
    }

    pub(crate) fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    pub(crate) fn vnode_count(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn members(&self) -> &BTreeSet<NodeId> {
        &self.members
    }

    pub(crate) fn is_member(&self, node: &str) -> bool {
        self.members.contains(node)
    }

    /// Position of an arbitrary key on the ring.
    #[inline]
    pub(crate) fn hash(&self, key: &str) -> RingPosition {
        RingPosition::from_digest(self.partitioner.digest(key.as_bytes()), self.total_space())
    }

    /// Quadratic probing from the key's digest.
    ///
    /// Offsets `1², 2², 3², ...` accumulate on the raw digest (wrapping in
    /// `i32`) and each candidate is re-reduced onto the ring. `claimed` holds
    /// positions reserved by the current batch but not yet inserted.
    ///
    /// Gives up after `total_space` probes: the quadratic sequence need not
    /// visit every slot, so a nearly full ring can have unreachable holes.
    pub(crate) fn place_position(
        &self,
        vnode_key: &str,
        mode: ProbeMode,
        claimed: &HashSet<RingPosition>,
    ) -> Option<RingPosition> {
        let accept = |position: &RingPosition| match mode {
            ProbeMode::Insert => {
                !self.vnodes.contains_key(position) && !claimed.contains(position)
            }
            ProbeMode::LocateExact => self
                .vnodes
                .get(position)
                .is_some_and(|vnode| vnode.vnode_key == vnode_key),
        };

        let total_space = self.total_space();
        let mut digest = self.partitioner.digest(vnode_key.as_bytes());
        let mut position = RingPosition::from_digest(digest, total_space);
        let mut step: i32 = 1;
        for _ in 0..=u64::from(total_space) {
            if accept(&position) {
                return Some(position);
            }
            digest = digest.wrapping_add(step.wrapping_mul(step));
            position = RingPosition::from_digest(digest, total_space);
            step = step.wrapping_add(1);
        }
        None
    }

    /// Positions for every replica of a joining node, in replica order.
    ///
    /// Nothing is mutated, so a failure leaves the ring untouched.
    pub(crate) fn plan_placement(&self, node: &NodeId) -> Result<Vec<(RingPosition, VirtualNode)>> {
        let replicas = self.config.replicas as usize;
        let mut claimed = HashSet::with_capacity(replicas);
        let mut planned = Vec::with_capacity(replicas);
        for replica in 0..self.config.replicas {
            let vnode = VirtualNode::from_index(node.clone(), replica);
            let position = self
                .place_position(&vnode.vnode_key, ProbeMode::Insert, &claimed)
                .ok_or(Error::CapacityExceeded {
                    used: self.index.len() + planned.len(),
                    requested: replicas,
                    total_space: self.total_space(),
                })?;
            claimed.insert(position);
            planned.push((position, vnode));
        }
        Ok(planned)
    }

    /// Current positions of every replica of `node`, recovered by probing.
    pub(crate) fn locate_all(&self, node: &NodeId) -> Result<Vec<RingPosition>> {
        let none = HashSet::new();
        (0..self.config.replicas)
            .map(|replica| {
                let vnode = VirtualNode::from_index(node.clone(), replica);
                self.place_position(&vnode.vnode_key, ProbeMode::LocateExact, &none)
                    .ok_or_else(|| {
                        Error::Internal(format!("virtual node {} has no position", vnode))
                    })
            })
            .collect()
    }

    pub(crate) fn insert(&mut self, position: RingPosition, vnode: VirtualNode) -> Result<()> {
        if !self.index.insert(position) {
            return Err(Error::Internal(format!(
                "position {} already taken, cannot place {}",
                position, vnode
            )));
        }
        self.members.insert(vnode.node_id.clone());
        self.vnodes.insert(position, vnode);
        Ok(())
    }

    pub(crate) fn remove_position(&mut self, position: RingPosition) -> Option<VirtualNode> {
        self.index.remove(position);
        self.vnodes.remove(&position)
    }

    pub(crate) fn forget_member(&mut self, node: &NodeId) {
        self.members.remove(node);
    }

    pub(crate) fn record_orphans(&mut self, holder: NodeId) {
        self.orphans.insert(holder);
    }

    /// Drains the set of orphan holders.
    pub(crate) fn take_orphans(&mut self) -> BTreeSet<NodeId> {
        std::mem::take(&mut self.orphans)
    }

    /// The vnode owning `position`: first occupied position clockwise.
    pub(crate) fn successor(&self, position: RingPosition) -> Option<(RingPosition, &VirtualNode)> {
        let found = self.index.successor(position)?;
        self.vnodes.get(&found).map(|vnode| (found, vnode))
    }

    /// The vnode immediately counter-clockwise of `position`.
    pub(crate) fn predecessor(&self, position: RingPosition) -> Option<(RingPosition, &VirtualNode)> {
        let found = self.index.predecessor(position)?;
        self.vnodes.get(&found).map(|vnode| (found, vnode))
    }

    /// Physical owner of `key`, or `None` on an empty ring.
    pub(crate) fn resolve(&self, key: &str) -> Option<&NodeId> {
        self.successor(self.hash(key)).map(|(_, vnode)| vnode.node_id())
    }

    pub(crate) fn positions(&self) -> Vec<(RingPosition, NodeId)> {
        self.index
            .as_slice()
            .iter()
            .filter_map(|p| self.vnodes.get(p).map(|v| (*p, v.node_id.clone())))
            .collect()
    }

    pub(crate) fn topology(&self) -> Topology {
        Topology::new(self.positions(), self.total_space())
    }
}
