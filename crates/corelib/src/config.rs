//! Ring configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::partitioner::PartitionerKind;

/// Default number of positions on the ring.
pub const DEFAULT_TOTAL_SPACE: u32 = i32::MAX as u32;

/// Default number of virtual nodes per physical node.
pub const DEFAULT_REPLICAS: u32 = 100;

/// Static parameters of a [`crate::HashRing`].
///
/// Fixed for the lifetime of the ring: changing `total_space`, `replicas` or
/// the partitioner would move every virtual node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Size of the hash space; positions are in `[0, total_space)`.
    pub total_space: u32,
    /// Virtual nodes created for every physical node.
    pub replicas: u32,
    /// Hash used for node keys and item keys.
    pub partitioner: PartitionerKind,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            total_space: DEFAULT_TOTAL_SPACE,
            replicas: DEFAULT_REPLICAS,
            partitioner: PartitionerKind::default(),
        }
    }
}

impl RingConfig {
    pub fn new(total_space: u32, replicas: u32) -> Self {
        Self {
            total_space,
            replicas,
            ..Self::default()
        }
    }

    pub fn with_partitioner(mut self, partitioner: PartitionerKind) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Rejects parameters the position arithmetic cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.total_space == 0 || self.total_space > DEFAULT_TOTAL_SPACE {
            return Err(Error::InvalidConfig(format!(
                "total_space must be in 1..={}, got {}",
                DEFAULT_TOTAL_SPACE, self.total_space
            )));
        }
        if self.replicas == 0 {
            return Err(Error::InvalidConfig("replicas must be at least 1".into()));
        }
        if self.replicas > self.total_space {
            return Err(Error::InvalidConfig(format!(
                "replicas ({}) cannot exceed total_space ({})",
                self.replicas, self.total_space
            )));
        }
        Ok(())
    }
}
