//! Partitioner abstraction for consistent hashing.
//!
//! Partitioners are responsible for converting keys into digests that the
//! ring reduces onto its hash space. Node keys and item keys always go
//! through the same partitioner.

pub mod blake;
pub mod sha256;
pub mod sip;
pub mod traits;
pub mod xxh3;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use blake::Blake3Partitioner;
pub use sha256::Sha256Partitioner;
pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;

/// Selects a partitioner by name (configuration files, command line).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Sha256,
    Blake3,
    Xxh3,
    Sip,
}

impl PartitionerKind {
    pub const ALL: [PartitionerKind; 4] = [
        PartitionerKind::Sha256,
        PartitionerKind::Blake3,
        PartitionerKind::Xxh3,
        PartitionerKind::Sip,
    ];

    /// Instantiate the selected partitioner.
    pub fn build(self) -> Box<dyn Partitioner> {
        match self {
            PartitionerKind::Sha256 => Box::new(Sha256Partitioner),
            PartitionerKind::Blake3 => Box::new(Blake3Partitioner),
            PartitionerKind::Xxh3 => Box::new(Xxh3Partitioner),
            PartitionerKind::Sip => Box::new(SipPartitioner),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PartitionerKind::Sha256 => "sha256",
            PartitionerKind::Blake3 => "blake3",
            PartitionerKind::Xxh3 => "xxh3",
            PartitionerKind::Sip => "sip",
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown partitioner {:?} (expected one of sha256, blake3, xxh3, sip)",
                    s
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in PartitionerKind::ALL {
            assert_eq!(kind.as_str().parse::<PartitionerKind>(), Ok(kind));
        }
        assert_eq!("SHA256".parse::<PartitionerKind>(), Ok(PartitionerKind::Sha256));
        assert!("md5".parse::<PartitionerKind>().is_err());
    }

    #[test]
    fn test_partitioners_differ() {
        let digests: Vec<i32> = PartitionerKind::ALL
            .iter()
            .map(|kind| kind.build().digest(b"10.0.0.1:0"))
            .collect();
        for (i, a) in digests.iter().enumerate() {
            for b in &digests[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_default_is_sha256() {
        assert_eq!(PartitionerKind::default().build().name(), "Sha256Partitioner");
    }
}
