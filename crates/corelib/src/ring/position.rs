//! Ring positions and the sorted position index.

use std::fmt;

/// A position on the ring, always in `[0, total_space)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RingPosition(pub u32);

impl RingPosition {
    /// Reduces a signed digest onto a hash space of `total_space` slots.
    ///
    /// Truncating remainder first, absolute value second: a negative digest
    /// lands on the same slot as its magnitude would. `total_space` must be in
    /// `1..=i32::MAX` (enforced by [`crate::RingConfig::validate`]).
    #[inline]
    pub fn from_digest(digest: i32, total_space: u32) -> Self {
        debug_assert!(total_space >= 1 && total_space <= i32::MAX as u32);
        RingPosition((digest % total_space as i32).unsigned_abs())
    }

    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RingPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ascending, duplicate-free sequence of occupied positions.
///
/// Insertions re-sort the whole vector. Topology changes are rare next to
/// lookups, so O(v log v) per added vnode is accepted to keep lookups a plain
/// binary search over contiguous memory.
#[derive(Clone, Debug, Default)]
pub struct PositionIndex {
    sorted: Vec<RingPosition>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[RingPosition] {
        &self.sorted
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<RingPosition> {
        self.sorted.get(index).copied()
    }

    pub fn contains(&self, position: RingPosition) -> bool {
        self.sorted.binary_search(&position).is_ok()
    }

    /// Adds a position and restores sorted order.
    ///
    /// Returns `false` (and changes nothing) if the position is already taken.
    pub fn insert(&mut self, position: RingPosition) -> bool {
        if self.contains(position) {
            return false;
        }
        self.sorted.push(position);
        self.sorted.sort_unstable();
        true
    }

    /// Removes a position. Returns `false` if it was not present.
    pub fn remove(&mut self, position: RingPosition) -> bool {
        match self.sorted.binary_search(&position) {
            Ok(index) => {
                self.sorted.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Binary search with ring wraparound.
    ///
    /// - successor (`want_predecessor == false`): index of the smallest
    ///   position `>= value`, or `0` when `value` is past the maximum.
    /// - predecessor (`want_predecessor == true`): index of the greatest
    ///   position `< value`, or the last index when `value` is at or below the
    ///   minimum.
    ///
    /// Returns `None` only for an empty index.
    pub fn binary_search(&self, value: RingPosition, want_predecessor: bool) -> Option<usize> {
        if self.sorted.is_empty() {
            return None;
        }
        let insertion_point = self.sorted.partition_point(|p| *p < value);
        let index = if want_predecessor {
            insertion_point
                .checked_sub(1)
                .unwrap_or(self.sorted.len() - 1)
        } else if insertion_point == self.sorted.len() {
            0
        } else {
            insertion_point
        };
        Some(index)
    }

    /// Clockwise successor: the first occupied position at or after `value`.
    pub fn successor(&self, value: RingPosition) -> Option<RingPosition> {
        self.binary_search(value, false).map(|i| self.sorted[i])
    }

    /// Counter-clockwise predecessor: the last occupied position before `value`.
    pub fn predecessor(&self, value: RingPosition) -> Option<RingPosition> {
        self.binary_search(value, true).map(|i| self.sorted[i])
    }
}
