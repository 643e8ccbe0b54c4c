//! SipHash-1-3 partitioner.

use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::partitioner::traits::Partitioner;

/// Low 32 bits of SipHash-1-3 with the zero key, over the raw key bytes.
#[derive(Clone, Debug, Default)]
pub struct SipPartitioner;

impl Partitioner for SipPartitioner {
    fn digest(&self, key: &[u8]) -> i32 {
        let mut hasher = SipHasher13::new();
        hasher.write(key);
        hasher.finish() as u32 as i32
    }

    fn name(&self) -> &'static str {
        "SipPartitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hash;

    #[test]
    fn test_sip_digest_has_no_length_prefix() {
        let key = b"10.0.0.1:0";
        let mut raw = SipHasher13::new();
        raw.write(key);
        assert_eq!(SipPartitioner.digest(key), raw.finish() as u32 as i32);

        // `<[u8] as Hash>` prefixes a usize length, whose width varies by target.
        let mut prefixed = SipHasher13::new();
        key[..].hash(&mut prefixed);
        assert_ne!(SipPartitioner.digest(key), prefixed.finish() as u32 as i32);
    }
}
