//! Python adapter.
//!
//! Mirrors the TypeScript adapter over the Python grammar:
//! function_definition -> Function (or Method inside a class body),
//! class_definition -> Class, import statements -> Import, call -> Call,
//! assignment -> Variable. Decorators hang off the wrapping
//! `decorated_definition` node and are harvested when converting the
//! decorated declaration itself.

use std::path::Path;

use tree_sitter::{Node, Tree};

use super::{module_name, node_text, walk_convert, NodeAdapter};
use crate::core::errors::Result;
use crate::core::unified::{NodeData, NodeId, UnifiedAst};
use crate::core::SourceLocation;

pub struct PythonAdapter;

impl NodeAdapter for PythonAdapter {
    fn to_unified_nodes(&self, tree: &Tree, source: &str, path: &Path) -> Result<UnifiedAst> {
        let root = tree.root_node();
        let mut ast = UnifiedAst::with_module(module_name(path), SourceLocation::from_node(&root));
        let module = ast.root_id();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            walk_convert(self, child, source, &mut ast, module);
        }
        Ok(ast)
    }

    fn convert_node(
        &self,
        node: Node,
        source: &str,
        ast: &mut UnifiedAst,
        parent: NodeId,
    ) -> Option<NodeId> {
        let location = SourceLocation::from_node(&node);

        match node.kind() {
            "function_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let parameters = parameter_names(node, source);
                let return_type = node
                    .child_by_field_name("return_type")
                    .map(|n| node_text(n, source).to_string());
                let is_async = has_token(node, "async");

                let data = if in_class_body(node) {
                    NodeData::Method {
                        parameters,
                        return_type,
                        is_async,
                    }
                } else {
                    NodeData::Function {
                        parameters,
                        return_type,
                        is_async,
                    }
                };
                Some(ast.push(parent, name, location, data))
            }
            "class_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let bases = base_classes(node, source);
                let data = NodeData::Class {
                    super_class: bases.first().cloned(),
                    interfaces: bases.into_iter().skip(1).collect(),
                    decorators: decorators(node, source),
                };
                Some(ast.push(parent, name, location, data))
            }
            "import_statement" => {
                // `import pkg.mod` / `import pkg.mod as alias`
                let target = node.named_child(0)?;
                let (source_module, bound) = match target.kind() {
                    "aliased_import" => {
                        let module = target
                            .child_by_field_name("name")
                            .map(|n| node_text(n, source).to_string())?;
                        let alias = target
                            .child_by_field_name("alias")
                            .map(|n| node_text(n, source).to_string());
                        (module, alias)
                    }
                    _ => (node_text(target, source).to_string(), None),
                };
                let data = NodeData::Import {
                    source: source_module.clone(),
                    symbols: bound.into_iter().collect(),
                    is_default: false,
                    is_namespace: true,
                };
                Some(ast.push(parent, source_module, location, data))
            }
            "import_from_statement" => {
                let source_module = node
                    .child_by_field_name("module_name")
                    .map(|n| node_text(n, source).to_string())?;
                let symbols = imported_symbols(node, source);
                let data = NodeData::Import {
                    source: source_module.clone(),
                    symbols,
                    is_default: false,
                    is_namespace: false,
                };
                Some(ast.push(parent, source_module, location, data))
            }
            "call" => {
                let callee = node
                    .child_by_field_name("function")
                    .map(|n| node_text(n, source).to_string())?;
                let arguments = node
                    .child_by_field_name("arguments")
                    .map(|args| {
                        let mut cursor = args.walk();
                        args.named_children(&mut cursor)
                            .map(|a| node_text(a, source).to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                let data = NodeData::Call {
                    callee: callee.clone(),
                    arguments,
                };
                Some(ast.push(parent, callee, location, data))
            }
            "assignment" => {
                let name = node
                    .child_by_field_name("left")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| node_text(n, source).to_string())?;
                let type_annotation = node
                    .child_by_field_name("type")
                    .map(|n| node_text(n, source).to_string());
                let initializer = node
                    .child_by_field_name("right")
                    .map(|n| node_text(n, source).to_string())
                    .filter(|text| text != &name);
                let data = NodeData::Variable {
                    type_annotation,
                    initializer,
                };
                Some(ast.push(parent, name, location, data))
            }
            _ => None,
        }
    }
}

fn parameter_names(node: Node, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut names = Vec::new();
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(node_text(child, source).to_string()),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                let bound = child
                    .child_by_field_name("name")
                    .or_else(|| child.named_child(0))
                    .map(|n| node_text(n, source).to_string());
                if let Some(bound) = bound {
                    names.push(bound);
                }
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                names.push(node_text(child, source).trim_start_matches('*').to_string());
            }
            _ => {}
        }
    }
    names
}

fn base_classes(node: Node, source: &str) -> Vec<String> {
    let Some(supers) = node.child_by_field_name("superclasses") else {
        return Vec::new();
    };
    let mut cursor = supers.walk();
    supers
        .named_children(&mut cursor)
        .map(|n| node_text(n, source).to_string())
        .collect()
}

/// Decorators live on the `decorated_definition` wrapping this node.
fn decorators(node: Node, source: &str) -> Vec<String> {
    let Some(parent) = node.parent() else {
        return Vec::new();
    };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut cursor = parent.walk();
    for child in parent.children(&mut cursor) {
        if child.kind() == "decorator" {
            found.push(node_text(child, source).trim_start_matches('@').to_string());
        }
    }
    found
}

fn imported_symbols(node: Node, source: &str) -> Vec<String> {
    let mut symbols = Vec::new();
    let mut cursor = node.walk();
    let module = node.child_by_field_name("module_name");
    for child in node.named_children(&mut cursor) {
        if let Some(module) = module {
            if child.id() == module.id() {
                continue;
            }
        }
        match child.kind() {
            "dotted_name" | "identifier" => {
                symbols.push(node_text(child, source).to_string());
            }
            "aliased_import" => {
                if let Some(alias) = child.child_by_field_name("alias") {
                    symbols.push(node_text(alias, source).to_string());
                }
            }
            "wildcard_import" => symbols.push("*".to_string()),
            _ => {}
        }
    }
    symbols
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

fn in_class_body(node: Node) -> bool {
    node.parent()
        .and_then(|block| {
            if block.kind() != "block" {
                return None;
            }
            block.parent()
        })
        .map(|grand| grand.kind() == "class_definition")
        .unwrap_or(false)
}
