//! BLAKE3 partitioner.

use crate::partitioner::traits::{leading_i32, Partitioner};

/// BLAKE3 digest truncated to its first four bytes.
#[derive(Clone, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn digest(&self, key: &[u8]) -> i32 {
        leading_i32(blake3::hash(key).as_bytes())
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
