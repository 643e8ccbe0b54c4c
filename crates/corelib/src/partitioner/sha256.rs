//! SHA-256 partitioner, the default.

use sha2::{Digest, Sha256};

use crate::partitioner::traits::{leading_i32, Partitioner};

/// SHA-256 digest truncated to its first four bytes.
///
/// Cryptographic strength is what keeps vnode arcs even for adversarial or
/// highly regular keys such as `"10.0.0.1:0"`, `"10.0.0.1:1"`, ...
#[derive(Clone, Debug, Default)]
pub struct Sha256Partitioner;

impl Partitioner for Sha256Partitioner {
    fn digest(&self, key: &[u8]) -> i32 {
        leading_i32(&Sha256::digest(key))
    }

    fn name(&self) -> &'static str {
        "Sha256Partitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_digest_is_leading_le_bytes() {
        // sha256("") = e3b0c442...
        let digest = Sha256Partitioner.digest(b"");
        assert_eq!(digest, i32::from_le_bytes([0xe3, 0xb0, 0xc4, 0x42]));
    }

    #[test]
    fn test_sha256_deterministic() {
        let p = Sha256Partitioner;
        assert_eq!(p.digest(b"key-1"), p.digest(b"key-1"));
        assert_ne!(p.digest(b"key-1"), p.digest(b"key-2"));
    }
}
