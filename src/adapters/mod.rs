//! Per-language adapters from concrete parse trees to the unified node
//! model.
//!
//! Each adapter knows which raw node kinds are tracked and how to pull the
//! kind-specific attributes out of them. Untracked nodes are transparent:
//! the conversion walk recurses into their children under the same unified
//! parent.

pub mod python;
pub mod typescript;

use std::path::Path;

use tree_sitter::{Node, Tree};

use crate::core::errors::Result;
use crate::core::unified::{NodeId, UnifiedAst};
use crate::core::SourceLocation;
use crate::parsers::Language;

pub trait NodeAdapter: Send + Sync {
    /// Convert a parse tree into one `Module` root plus its descendants.
    fn to_unified_nodes(&self, tree: &Tree, source: &str, path: &Path) -> Result<UnifiedAst>;

    /// Convert a single raw node, appending it under `parent` when tracked.
    /// Returns `None` for untracked kinds; the walk then recurses into the
    /// node's children with the same parent.
    fn convert_node(
        &self,
        node: Node,
        source: &str,
        ast: &mut UnifiedAst,
        parent: NodeId,
    ) -> Option<NodeId>;

    /// Syntactic error ratio over the whole tree.
    fn error_ratio(&self, tree: &Tree) -> f64 {
        crate::parsers::error_ratio(tree)
    }
}

pub fn adapter_for(language: Language) -> &'static dyn NodeAdapter {
    match language {
        Language::TypeScript | Language::JavaScript => &typescript::TypeScriptAdapter,
        Language::Python => &python::PythonAdapter,
    }
}

/// Fallback for grammars without a dedicated adapter: an empty unified view
/// and a zero error ratio.
pub struct DefaultAdapter;

impl NodeAdapter for DefaultAdapter {
    fn to_unified_nodes(&self, _tree: &Tree, _source: &str, path: &Path) -> Result<UnifiedAst> {
        Ok(UnifiedAst::with_module(
            module_name(path),
            SourceLocation::default(),
        ))
    }

    fn convert_node(
        &self,
        _node: Node,
        _source: &str,
        _ast: &mut UnifiedAst,
        _parent: NodeId,
    ) -> Option<NodeId> {
        None
    }

    fn error_ratio(&self, _tree: &Tree) -> f64 {
        0.0
    }
}

/// Shared conversion walk: try to convert each node; tracked nodes become
/// the parent for their subtree, untracked ones are skipped over.
pub(crate) fn walk_convert(
    adapter: &dyn NodeAdapter,
    node: Node,
    source: &str,
    ast: &mut UnifiedAst,
    parent: NodeId,
) {
    let next_parent = adapter.convert_node(node, source, ast, parent).unwrap_or(parent);
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_convert(adapter, child, source, ast, next_parent);
    }
}

pub(crate) fn module_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string()
}

pub(crate) fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Strip matching string quotes from a literal's text.
pub(crate) fn strip_quotes(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string()
}
