//! The asset graph's node type: a closed tagged union with one id-keyed
//! record per variant.
//!
//! Mutable derived state (`used_symbols`, `deferred`, `has_deferred`,
//! `corresponding_request`) lives on the node records and survives
//! re-resolution of the same logical content, because the mutation primitive
//! leaves existing nodes untouched when their ids match.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::asset::{AssetGroup, AssetRecord};
use crate::dependency::{DependencyDescriptor, WILDCARD};
use crate::entry::Entry;

/// An entry specifier as given to the bundler, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpecifierNode {
    pub specifier: String,
    pub corresponding_request: Option<String>,
}

/// A resolved entry file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFileNode {
    pub entry: Entry,
    pub corresponding_request: Option<String>,
}

/// An import declaration node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    pub dependency: DependencyDescriptor,
    /// Export names demanded through this edge. Only ever grows within a
    /// build; demand may arrive from several incremental passes.
    pub used_symbols: FxHashSet<String>,
    pub corresponding_request: Option<String>,
    /// Target asset was wired directly within the same transform batch.
    pub complete: bool,
    /// Some descendant subtree of this edge is currently deferred.
    pub has_deferred: bool,
}

impl DependencyNode {
    pub fn new(dependency: DependencyDescriptor) -> Self {
        Self {
            dependency,
            used_symbols: FxHashSet::default(),
            corresponding_request: None,
            complete: false,
            has_deferred: false,
        }
    }

    /// Entry dependencies of library targets treat every export as consumed.
    pub fn preflight_library_usage(&mut self) {
        let is_library = self
            .dependency
            .target
            .as_ref()
            .is_some_and(|t| t.env.is_library);
        if is_library {
            self.used_symbols.insert(WILDCARD.to_string());
        }
    }
}

/// A transform-pipeline unit node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGroupNode {
    pub group: AssetGroup,
    pub corresponding_request: Option<String>,
    /// `None` until the deferral decision first runs for this group.
    pub deferred: Option<bool>,
    pub has_deferred: bool,
}

impl AssetGroupNode {
    pub fn new(group: AssetGroup) -> Self {
        Self {
            group,
            corresponding_request: None,
            deferred: None,
            has_deferred: false,
        }
    }
}

/// A compiled module node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetNode {
    pub asset: AssetRecord,
    /// Export names some consumer transitively requires. Replaced wholesale
    /// on each propagation pass, never accumulated.
    pub used_symbols: FxHashSet<String>,
    pub has_deferred: bool,
}

impl AssetNode {
    pub fn new(asset: AssetRecord) -> Self {
        Self {
            asset,
            used_symbols: FxHashSet::default(),
            has_deferred: false,
        }
    }
}

/// A node in the asset graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetGraphNode {
    Root,
    EntrySpecifier(EntrySpecifierNode),
    EntryFile(EntryFileNode),
    Dependency(DependencyNode),
    AssetGroup(AssetGroupNode),
    Asset(AssetNode),
}

impl AssetGraphNode {
    pub fn entry_specifier(specifier: impl Into<String>) -> Self {
        Self::EntrySpecifier(EntrySpecifierNode {
            specifier: specifier.into(),
            corresponding_request: None,
        })
    }

    pub fn entry_file(entry: Entry) -> Self {
        Self::EntryFile(EntryFileNode {
            entry,
            corresponding_request: None,
        })
    }

    pub fn dependency(dependency: DependencyDescriptor) -> Self {
        Self::Dependency(DependencyNode::new(dependency))
    }

    pub fn asset_group(group: AssetGroup) -> Self {
        Self::AssetGroup(AssetGroupNode::new(group))
    }

    pub fn asset(asset: AssetRecord) -> Self {
        Self::Asset(AssetNode::new(asset))
    }

    /// Node kind name, used in logs and DOT output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::EntrySpecifier(_) => "entry_specifier",
            Self::EntryFile(_) => "entry_file",
            Self::Dependency(_) => "dependency",
            Self::AssetGroup(_) => "asset_group",
            Self::Asset(_) => "asset",
        }
    }

    /// The ancestor-propagated deferral flag, where the variant carries one.
    pub fn has_deferred(&self) -> bool {
        match self {
            Self::Dependency(node) => node.has_deferred,
            Self::AssetGroup(node) => node.has_deferred,
            Self::Asset(node) => node.has_deferred,
            _ => false,
        }
    }

    /// Opaque id of the external request that last produced this node.
    pub fn corresponding_request(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::EntrySpecifier(node) => node.corresponding_request.as_deref(),
            Self::EntryFile(node) => node.corresponding_request.as_deref(),
            Self::Dependency(node) => node.corresponding_request.as_deref(),
            Self::AssetGroup(node) => node.corresponding_request.as_deref(),
            Self::Asset(_) => None,
        }
    }

    pub fn set_corresponding_request(&mut self, request: Option<String>) {
        match self {
            Self::EntrySpecifier(node) => node.corresponding_request = request,
            Self::EntryFile(node) => node.corresponding_request = request,
            Self::Dependency(node) => node.corresponding_request = request,
            Self::AssetGroup(node) => node.corresponding_request = request,
            Self::Root | Self::Asset(_) => {}
        }
    }
}
