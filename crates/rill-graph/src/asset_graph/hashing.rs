//! Memoized whole-graph content fingerprint for build caching.
//!
//! The digest folds every asset's output hash and every target-bearing
//! dependency's serialized target, visiting descendants in current edge
//! order. Two construction histories over identical content may therefore
//! digest differently; that is accepted. Any node insertion or removal
//! clears the memo.

use super::AssetGraph;
use crate::graph::VisitControl;
use crate::node::AssetGraphNode;
use crate::{Error, Result};

impl AssetGraph {
    /// The memoized content digest, recomputing it if a structural edit
    /// invalidated the cache.
    pub fn hash(&mut self) -> Result<String> {
        if let Some(hash) = &self.hash {
            return Ok(hash.clone());
        }

        let root = self.root_id();
        let mut hasher = blake3::Hasher::new();
        let mut serialize_error: Option<serde_json::Error> = None;
        self.graph().traverse(&root, (), |_, node, _| {
            match node {
                AssetGraphNode::Asset(asset) => {
                    hasher.update(asset.asset.output_hash.as_bytes());
                }
                AssetGraphNode::Dependency(dep) => {
                    if let Some(target) = &dep.dependency.target {
                        match serde_json::to_vec(target) {
                            Ok(bytes) => {
                                hasher.update(&bytes);
                            }
                            Err(err) => {
                                serialize_error = Some(err);
                                return VisitControl::Stop;
                            }
                        }
                    }
                }
                _ => {}
            }
            VisitControl::Continue(())
        });
        if let Some(err) = serialize_error {
            return Err(Error::Serialization(err.to_string()));
        }

        let digest = hasher.finalize().to_hex().to_string();
        self.hash = Some(digest.clone());
        Ok(digest)
    }

    /// Whether a digest is currently memoized. Lets tests and the cache
    /// layer observe invalidation.
    pub fn has_cached_hash(&self) -> bool {
        self.hash.is_some()
    }
}
