//! Node identity for the consistent hash ring.
//!
//! Physical nodes are identified by an address-like string (`"10.0.0.7"`,
//! `"cache-a:11211"`, ...). The ring never connects to that address; it only
//! hashes it to derive virtual node positions and uses it as the key under
//! which the storage backend keeps the node's items.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// Identifier of a physical node.
///
/// Newtype over `Arc<str>`: every virtual node and every ring lookup hands out
/// a copy, so cloning must stay a reference-count bump.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(Arc<str>);

impl NodeId {
    /// Construct a node id from its address.
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(Arc::from(address.as_ref()))
    }

    /// The address this id was built from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for NodeId {
    fn from(address: String) -> Self {
        Self(Arc::from(address))
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// `Hash` on the newtype delegates to `str`, so map lookups by `&str` agree.
impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
