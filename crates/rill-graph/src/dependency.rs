//! Import declarations and their per-edge symbol tables.

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, Target};
use crate::node_id::{ContentHasher, NodeId};

/// The wildcard symbol, meaning "all exports" or "unknown usage".
pub const WILDCARD: &str = "*";

/// How the specifier string should be interpreted by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpecifierType {
    /// An ES module import path.
    #[default]
    Esm,
    /// A CommonJS `require` path.
    CommonJs,
    /// A URL reference, e.g. from `new Worker(...)` or CSS.
    Url,
}

/// When the importing module needs its target loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Static import, needed before the importer runs.
    #[default]
    Sync,
    /// Loaded alongside the importer (e.g. a worker).
    Parallel,
    /// Dynamic import, loaded on demand.
    Lazy,
}

/// One binding in a dependency's symbol table: the name demanded from the
/// resolved module, and the local name it is bound to in the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSymbol {
    /// Export name demanded from the target module.
    pub exported: String,
    /// Local binding name in the importing module.
    pub local: String,
    /// Weak bindings may be dropped when the optimizer proves them unused.
    pub is_weak: bool,
}

impl ImportSymbol {
    pub fn new(exported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            exported: exported.into(),
            local: local.into(),
            is_weak: false,
        }
    }

    pub fn weak(exported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            exported: exported.into(),
            local: local.into(),
            is_weak: true,
        }
    }
}

/// An import declaration inside an asset, or a synthetic entry-to-target
/// edge. Ids are caller-supplied and stable across re-resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    pub id: NodeId,
    /// Module specifier as written in source.
    pub specifier: String,
    pub specifier_type: SpecifierType,
    pub priority: Priority,
    /// Set on synthetic entry dependencies; folded into the graph hash.
    pub target: Option<Target>,
    /// Named transform pipeline to run the resolved file through.
    pub pipeline: Option<String>,
    /// Symbol table of this import declaration. `None` means the importer's
    /// usage could not be analyzed and everything must be assumed used.
    pub symbols: Option<Vec<ImportSymbol>>,
    /// Asset this declaration appears in, if any.
    pub source_asset_id: Option<NodeId>,
}

impl DependencyDescriptor {
    pub fn new(id: NodeId, specifier: impl Into<String>) -> Self {
        Self {
            id,
            specifier: specifier.into(),
            specifier_type: SpecifierType::default(),
            priority: Priority::default(),
            target: None,
            pipeline: None,
            symbols: None,
            source_asset_id: None,
        }
    }

    /// Synthetic dependency wiring an entry file to one of its targets.
    pub fn entry(entry: &Entry, target: Target) -> Self {
        let mut hasher = ContentHasher::new("entry_dependency");
        hasher
            .write_str(&entry.file_path)
            .write_str(&target.name)
            .write_str(&target.env.context);
        let id = hasher.finish();

        let mut dep = Self::new(id, entry.file_path.clone());
        dep.target = Some(target);
        dep
    }

    pub fn with_symbols(mut self, symbols: Vec<ImportSymbol>) -> Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn with_specifier_type(mut self, specifier_type: SpecifierType) -> Self {
        self.specifier_type = specifier_type;
        self
    }

    pub fn with_pipeline(mut self, pipeline: impl Into<String>) -> Self {
        self.pipeline = Some(pipeline.into());
        self
    }

    pub fn with_source_asset(mut self, source: NodeId) -> Self {
        self.source_asset_id = Some(source);
        self
    }

    /// True if the symbol table re-exports an entire namespace (`* as *`),
    /// which makes name-by-name demand resolution impossible.
    pub fn has_wildcard_binding(&self) -> bool {
        self.symbols
            .as_ref()
            .is_some_and(|symbols| {
                symbols
                    .iter()
                    .any(|s| s.exported == WILDCARD && s.local == WILDCARD)
            })
    }
}
