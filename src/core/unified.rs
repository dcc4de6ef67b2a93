//! Language-neutral node model.
//!
//! Adapters convert language-specific parse trees into this representation:
//! one `Module` root per file, with tracked declarations and expressions as
//! descendants. Nodes live in an arena and reference each other by index,
//! which makes the parent/child relation a tree by construction.

use serde::{Deserialize, Serialize};

use super::SourceLocation;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Kind-specific payload of a unified node.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum NodeData {
    Module,
    Function {
        parameters: Vec<String>,
        return_type: Option<String>,
        is_async: bool,
    },
    Method {
        parameters: Vec<String>,
        return_type: Option<String>,
        is_async: bool,
    },
    Class {
        super_class: Option<String>,
        interfaces: Vec<String>,
        decorators: Vec<String>,
    },
    Import {
        source: String,
        symbols: Vec<String>,
        is_default: bool,
        is_namespace: bool,
    },
    Call {
        callee: String,
        arguments: Vec<String>,
    },
    Interface,
    TypeAlias,
    Enum,
    Variable {
        type_annotation: Option<String>,
        initializer: Option<String>,
    },
}

impl NodeData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::Module => "module",
            NodeData::Function { .. } => "function",
            NodeData::Method { .. } => "method",
            NodeData::Class { .. } => "class",
            NodeData::Import { .. } => "import",
            NodeData::Call { .. } => "call",
            NodeData::Interface => "interface",
            NodeData::TypeAlias => "type_alias",
            NodeData::Enum => "enum",
            NodeData::Variable { .. } => "variable",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnifiedNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub name: String,
    pub location: SourceLocation,
    pub data: NodeData,
}

/// Arena holding one module root and its descendants.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnifiedAst {
    nodes: Vec<UnifiedNode>,
    root: NodeId,
}

impl UnifiedAst {
    /// Create an arena seeded with a `Module` root.
    pub fn with_module(name: impl Into<String>, location: SourceLocation) -> Self {
        let root = UnifiedNode {
            id: NodeId(0),
            parent: None,
            children: Vec::new(),
            name: name.into(),
            location,
            data: NodeData::Module,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Append a node under `parent`, wiring both directions of the relation.
    pub fn push(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        location: SourceLocation,
        data: NodeData,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(UnifiedNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            name: name.into(),
            location,
            data,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &UnifiedNode {
        &self.nodes[self.root.0]
    }

    pub fn get(&self, id: NodeId) -> &UnifiedNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order (DFS pre-order of the conversion walk).
    pub fn iter(&self) -> impl Iterator<Item = &UnifiedNode> {
        self.nodes.iter()
    }

    pub fn imports(&self) -> impl Iterator<Item = &UnifiedNode> {
        self.iter()
            .filter(|n| matches!(n.data, NodeData::Import { .. }))
    }

    pub fn functions(&self) -> impl Iterator<Item = &UnifiedNode> {
        self.iter().filter(|n| {
            matches!(
                n.data,
                NodeData::Function { .. } | NodeData::Method { .. }
            )
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &UnifiedNode> {
        self.iter()
            .filter(|n| matches!(n.data, NodeData::Class { .. }))
    }
}
