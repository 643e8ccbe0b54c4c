//! XXH3 partitioner.

use xxhash_rust::xxh3::xxh3_64;

use crate::partitioner::traits::Partitioner;

/// Low 32 bits of XXH3-64. Fast, not collision resistant.
#[derive(Clone, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    fn digest(&self, key: &[u8]) -> i32 {
        xxh3_64(key) as u32 as i32
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
