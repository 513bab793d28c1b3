//! Entry points and build targets.

use serde::{Deserialize, Serialize};

use crate::node_id::{ContentHasher, NodeId};

/// A resolved entry: the file an entry specifier points at, plus the package
/// it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Resolved file path of the entry.
    pub file_path: String,
    /// Path of the owning package root.
    pub package_path: String,
    /// Restrict this entry to a named target, if any.
    pub target: Option<String>,
}

impl Entry {
    pub fn new(file_path: impl Into<String>, package_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            package_path: package_path.into(),
            target: None,
        }
    }

    /// Content-derived node id for this entry.
    pub fn content_key(&self) -> NodeId {
        let mut hasher = ContentHasher::new("entry_file");
        hasher
            .write_str(&self.file_path)
            .write_str(&self.package_path)
            .write_opt_str(self.target.as_deref());
        hasher.finish()
    }
}

/// Execution environment of a build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Runtime context, e.g. `"browser"` or `"node"`.
    pub context: String,
    /// Library builds treat every entry export as consumed.
    pub is_library: bool,
    /// Whether the bundler may hoist module scopes.
    pub should_scope_hoist: bool,
}

impl Environment {
    pub fn browser() -> Self {
        Self {
            context: "browser".into(),
            is_library: false,
            should_scope_hoist: true,
        }
    }

    pub fn library(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            is_library: true,
            should_scope_hoist: true,
        }
    }
}

/// One output target an entry is built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub env: Environment,
    pub dist_dir: String,
    pub public_url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, env: Environment) -> Self {
        Self {
            name: name.into(),
            env,
            dist_dir: "dist".into(),
            public_url: "/".into(),
        }
    }
}
