//! Ring topology views: ownership ranges and snapshots.
//!
//! A virtual node at position `p` with predecessor `q` owns the half-open arc
//! `(q, p]`. When `q > p` the arc crosses the origin and is the union
//! `(q, total_space) ∪ [0, p]`.

use std::collections::BTreeMap;
use std::fmt;

use crate::node::NodeId;
use crate::ring::position::RingPosition;

/// The arc `(start, end]` of a ring with `total_space` slots.
///
/// `start == end` denotes the whole ring (a single vnode owns everything).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingRange {
    /// Exclusive lower bound (the predecessor's position).
    pub start: RingPosition,
    /// Inclusive upper bound (the owning vnode's position).
    pub end: RingPosition,
    total_space: u32,
}

impl RingRange {
    pub fn new(start: RingPosition, end: RingPosition, total_space: u32) -> Self {
        Self {
            start,
            end,
            total_space,
        }
    }

    /// True if the arc crosses position zero.
    #[inline]
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Wraparound-aware membership test.
    #[inline]
    pub fn contains(&self, position: RingPosition) -> bool {
        if self.start == self.end {
            return true;
        }
        if self.wraps() {
            position > self.start || position <= self.end
        } else {
            position > self.start && position <= self.end
        }
    }

    /// Number of slots in the arc.
    pub fn span(&self) -> u64 {
        let (start, end, total) = (
            u64::from(self.start.0),
            u64::from(self.end.0),
            u64::from(self.total_space),
        );
        if start < end {
            end - start
        } else {
            total - start + end
        }
    }
}

impl fmt::Display for RingRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}]", self.start, self.end)
    }
}

/// Immutable copy of the ring's position → node mapping.
///
/// Taken under the ring's read lock, then usable without holding it.
#[derive(Clone, Debug)]
pub struct Topology {
    positions: Vec<(RingPosition, NodeId)>,
    total_space: u32,
}

impl Topology {
    /// `positions` must be sorted by position and duplicate free.
    pub(crate) fn new(positions: Vec<(RingPosition, NodeId)>, total_space: u32) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0].0 < w[1].0));
        Self {
            positions,
            total_space,
        }
    }

    pub fn total_space(&self) -> u32 {
        self.total_space
    }

    /// Sorted `(position, owner)` pairs.
    pub fn positions(&self) -> &[(RingPosition, NodeId)] {
        &self.positions
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every arc owned by `node`, one per virtual node, in position order.
    pub fn ranges_for(&self, node: &NodeId) -> Vec<RingRange> {
        let count = self.positions.len();
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, (_, owner))| owner == node)
            .map(|(i, (end, _))| {
                let (start, _) = &self.positions[(i + count - 1) % count];
                RingRange::new(*start, *end, self.total_space)
            })
            .collect()
    }

    /// Fraction of the hash space owned by each physical node.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let mut slots: BTreeMap<NodeId, u64> = BTreeMap::new();
        let count = self.positions.len();
        for (i, (end, owner)) in self.positions.iter().enumerate() {
            let (start, _) = &self.positions[(i + count - 1) % count];
            *slots.entry(owner.clone()).or_default() +=
                RingRange::new(*start, *end, self.total_space).span();
        }
        let total = f64::from(self.total_space);
        slots
            .into_iter()
            .map(|(node, owned)| (node, owned as f64 / total))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> RingRange {
        RingRange::new(RingPosition(start), RingPosition(end), 1000)
    }

    #[test]
    fn test_plain_range() {
        let r = range(100, 200);
        assert!(!r.wraps());
        assert!(!r.contains(RingPosition(100)));
        assert!(r.contains(RingPosition(101)));
        assert!(r.contains(RingPosition(200)));
        assert!(!r.contains(RingPosition(201)));
        assert_eq!(r.span(), 100);
    }

    #[test]
    fn test_wrapping_range() {
        let r = range(900, 50);
        assert!(r.wraps());
        assert!(!r.contains(RingPosition(900)));
        assert!(r.contains(RingPosition(901)));
        assert!(r.contains(RingPosition(999)));
        assert!(r.contains(RingPosition(0)));
        assert!(r.contains(RingPosition(50)));
        assert!(!r.contains(RingPosition(51)));
        assert!(!r.contains(RingPosition(500)));
        assert_eq!(r.span(), 150);
    }

    #[test]
    fn test_full_ring_range() {
        let r = range(300, 300);
        assert!(r.contains(RingPosition(0)));
        assert!(r.contains(RingPosition(300)));
        assert_eq!(r.span(), 1000);
        assert_eq!(r.to_string(), "(300, 300]");
    }

    #[test]
    fn test_topology_ranges_and_ownership() {
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        let topology = Topology::new(
            vec![
                (RingPosition(100), a.clone()),
                (RingPosition(400), b.clone()),
                (RingPosition(600), a.clone()),
            ],
            1000,
        );

        assert_eq!(topology.ranges_for(&a), vec![range(600, 100), range(400, 600)]);
        assert_eq!(topology.ranges_for(&b), vec![range(100, 400)]);
        assert!(topology.ranges_for(&NodeId::new("c")).is_empty());

        let ownership = topology.ownership();
        assert!((ownership[&a] - 0.7).abs() < 1e-9);
        assert!((ownership[&b] - 0.3).abs() < 1e-9);
    }
}
