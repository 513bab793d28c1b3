//! Compiled modules and the transform-pipeline unit that produces them.

use serde::{Deserialize, Serialize};

use crate::dependency::DependencyDescriptor;
use crate::node_id::{ContentHasher, NodeId};

/// One exported binding of a compiled module: the public export name and the
/// local binding it resolves to inside the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSymbol {
    pub exported: String,
    pub local: String,
}

impl ExportSymbol {
    pub fn new(exported: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            exported: exported.into(),
            local: local.into(),
        }
    }
}

/// The unit handed to the transform pipeline: one input file (or inline code)
/// that compiles into one or more related assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetGroup {
    pub file_path: String,
    /// `Some(false)` marks the file provably side-effect free, which makes it
    /// eligible for deferral when nothing demands its exports.
    pub side_effects: Option<bool>,
    pub pipeline: Option<String>,
    /// Inline source code, for synthetic groups not backed by a file.
    pub code: Option<String>,
}

impl AssetGroup {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            side_effects: None,
            pipeline: None,
            code: None,
        }
    }

    pub fn without_side_effects(mut self) -> Self {
        self.side_effects = Some(false);
        self
    }

    /// Content-derived node id for this group.
    pub fn content_key(&self) -> NodeId {
        let mut hasher = ContentHasher::new("asset_group");
        hasher
            .write_str(&self.file_path)
            .write_opt_bool(self.side_effects)
            .write_opt_str(self.pipeline.as_deref())
            .write_opt_str(self.code.as_deref());
        hasher.finish()
    }
}

/// A single compiled module, as produced by the transform pipeline.
///
/// Ids are caller-supplied and stable; `unique_key` is the identity key
/// nested assets within one transform batch are matched against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: NodeId,
    pub file_path: String,
    /// File type of the compiled output, e.g. `"js"` or `"css"`.
    pub asset_type: String,
    /// Identity key other batch members' import specifiers may point at.
    pub unique_key: Option<String>,
    /// Exported-symbol table. `None` means exports could not be analyzed.
    pub symbols: Option<Vec<ExportSymbol>>,
    /// Import declarations found while compiling this asset.
    pub dependencies: Vec<DependencyDescriptor>,
    /// Content hash of the compiled output, folded into the graph hash.
    pub output_hash: String,
    pub side_effects: bool,
}

impl AssetRecord {
    pub fn new(id: NodeId, file_path: impl Into<String>) -> Self {
        Self {
            id,
            file_path: file_path.into(),
            asset_type: "js".into(),
            unique_key: None,
            symbols: None,
            dependencies: Vec::new(),
            output_hash: String::new(),
            side_effects: true,
        }
    }

    pub fn with_symbols(mut self, symbols: Vec<ExportSymbol>) -> Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<DependencyDescriptor>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_output_hash(mut self, output_hash: impl Into<String>) -> Self {
        self.output_hash = output_hash.into();
        self
    }

    pub fn with_unique_key(mut self, unique_key: impl Into<String>) -> Self {
        self.unique_key = Some(unique_key.into());
        self
    }
}
