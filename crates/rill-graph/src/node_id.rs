//! Stable node identifiers for the asset graph.
//!
//! Ids are either caller-supplied (dependencies, assets) or content-derived
//! (entry files, asset groups) so that re-resolving identical logical content
//! lands on the same node instead of duplicating it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a node in the asset graph.
///
/// Ids are plain strings so that external layers (the request tracker, the
/// transform pipeline) can mint stable keys without going through this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap a caller-supplied stable identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the singleton root node.
    pub fn root() -> Self {
        Self("@@root".into())
    }

    /// Id of the entry specifier node for a raw specifier string.
    pub fn entry_specifier(specifier: &str) -> Self {
        Self(format!("entry_specifier:{specifier}"))
    }

    /// View the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Rolling hasher used to derive content-addressed node ids.
///
/// Field values are fed in declaration order with length/option framing so
/// that adjacent fields cannot collide (`("ab", "c")` vs `("a", "bc")`).
pub(crate) struct ContentHasher(blake3::Hasher);

impl ContentHasher {
    /// Start a hash namespaced by node kind.
    pub(crate) fn new(tag: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag.as_bytes());
        hasher.update(&[0xff]);
        Self(hasher)
    }

    pub(crate) fn write_str(&mut self, value: &str) -> &mut Self {
        self.0.update(&(value.len() as u64).to_le_bytes());
        self.0.update(value.as_bytes());
        self
    }

    pub(crate) fn write_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => {
                self.0.update(&[1]);
                self.write_str(value)
            }
            None => {
                self.0.update(&[0]);
                self
            }
        }
    }

    pub(crate) fn write_opt_bool(&mut self, value: Option<bool>) -> &mut Self {
        self.0.update(&[match value {
            None => 0,
            Some(false) => 1,
            Some(true) => 2,
        }]);
        self
    }

    /// Finish the digest, truncated to 16 hex characters.
    pub(crate) fn finish(self) -> NodeId {
        let hex = self.0.finalize().to_hex();
        NodeId(hex[..16].to_owned())
    }
}
