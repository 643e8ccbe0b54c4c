//! Core partitioner trait definitions.

use std::fmt::Debug;

/// A partitioner turns keys into raw signed 32-bit digests.
///
/// The ring reduces the digest into its own hash space and probes from it on
/// collisions, so a partitioner only has to spread arbitrary byte strings
/// uniformly over `i32`. Partitioners are stateless and thread-safe.
pub trait Partitioner: Send + Sync + Debug + 'static {
    /// Hashes a key into a signed 32-bit digest.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to hash (node keys and item keys alike)
    fn digest(&self, key: &[u8]) -> i32;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}

/// Reads the first four bytes of a digest as a little-endian `i32`.
#[inline]
pub(crate) fn leading_i32(bytes: &[u8]) -> i32 {
    let mut head = [0u8; 4];
    head.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(head)
}
