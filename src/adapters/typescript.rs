//! TypeScript / JavaScript adapter.
//!
//! Tracked kinds and their unified counterparts:
//! function / generator / arrow / function-expression -> Function,
//! method_definition -> Method, class_declaration -> Class,
//! import_statement -> Import, call_expression -> Call,
//! interface / type-alias / enum declarations -> their variants,
//! variable_declarator -> Variable. Everything else is transparent.

use std::path::Path;

use tree_sitter::{Node, Tree};

use super::{module_name, node_text, strip_quotes, walk_convert, NodeAdapter};
use crate::core::errors::Result;
use crate::core::unified::{NodeData, NodeId, UnifiedAst};
use crate::core::SourceLocation;

pub struct TypeScriptAdapter;

impl NodeAdapter for TypeScriptAdapter {
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
            "function_declaration" | "generator_function_declaration" | "function_expression"
            | "function" | "arrow_function" => {
                let name = function_name(node, source);
                let data = NodeData::Function {
                    parameters: parameter_names(node, source),
                    return_type: return_type(node, source),
                    is_async: has_token(node, "async"),
                };
                Some(ast.push(parent, name, location, data))
            }
            "method_definition" => {
                let name = function_name(node, source);
                let data = NodeData::Method {
                    parameters: parameter_names(node, source),
                    return_type: return_type(node, source),
                    is_async: has_token(node, "async"),
                };
                Some(ast.push(parent, name, location, data))
            }
            "class_declaration" | "class" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                let (super_class, interfaces) = class_heritage(node, source);
                let data = NodeData::Class {
                    super_class,
                    interfaces,
                    decorators: decorators(node, source),
                };
                Some(ast.push(parent, name, location, data))
            }
            "import_statement" => {
                let source_specifier = node
                    .child_by_field_name("source")
                    .map(|n| strip_quotes(node_text(n, source)))?;
                let (symbols, is_default, is_namespace) = import_clause(node, source);
                let data = NodeData::Import {
                    source: source_specifier.clone(),
                    symbols,
                    is_default,
                    is_namespace,
                };
                Some(ast.push(parent, source_specifier, location, data))
            }
            "call_expression" => {
                let callee = node
                    .child_by_field_name("function")
                    .or_else(|| node.named_child(0))
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
            "interface_declaration" => {
                let name = declaration_name(node, source);
                Some(ast.push(parent, name, location, NodeData::Interface))
            }
            "type_alias_declaration" => {
                let name = declaration_name(node, source);
                Some(ast.push(parent, name, location, NodeData::TypeAlias))
            }
            "enum_declaration" => {
                let name = declaration_name(node, source);
                Some(ast.push(parent, name, location, NodeData::Enum))
            }
            "variable_declarator" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())?;
                let type_annotation = node
                    .child_by_field_name("type")
                    .map(|n| strip_type_prefix(node_text(n, source)));
                let initializer = node
                    .child_by_field_name("value")
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

/// Function name: first identifier child, or the enclosing variable
/// declarator for anonymous function forms, or `"anonymous"`.
fn function_name(node: Node, source: &str) -> String {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "identifier" | "property_identifier") {
            return node_text(child, source).to_string();
        }
    }

    if matches!(node.kind(), "arrow_function" | "function_expression" | "function") {
        if let Some(parent) = node.parent() {
            if parent.kind() == "variable_declarator" {
                if let Some(name) = parent.child_by_field_name("name") {
                    return node_text(name, source).to_string();
                }
            }
            // `{ handler: () => ... }` and `class { handler = () => ... }`
            if matches!(parent.kind(), "pair" | "public_field_definition" | "field_definition") {
                if let Some(key) = parent
                    .child_by_field_name("key")
                    .or_else(|| parent.child_by_field_name("property"))
                {
                    return node_text(key, source).to_string();
                }
            }
        }
    }

    "anonymous".to_string()
}

fn declaration_name(node: Node, source: &str) -> String {
    node.child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Bound parameter names from the `formal_parameters` child.
fn parameter_names(node: Node, source: &str) -> Vec<String> {
    let Some(params) = node.child_by_field_name("parameters") else {
        // Arrow functions may have a single bare identifier parameter.
        if let Some(param) = node.child_by_field_name("parameter") {
            return vec![node_text(param, source).to_string()];
        }
        return Vec::new();
    };

    let mut names = Vec::new();
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => names.push(node_text(child, source).to_string()),
            "required_parameter" | "optional_parameter" => {
                let bound = child
                    .child_by_field_name("pattern")
                    .map(|p| node_text(p, source).to_string())
                    .unwrap_or_else(|| node_text(child, source).to_string());
                names.push(bound);
            }
            "rest_parameter" | "rest_pattern" => {
                names.push(node_text(child, source).trim_start_matches("...").to_string());
            }
            "object_pattern" | "array_pattern" | "assignment_pattern" => {
                names.push(node_text(child, source).to_string());
            }
            _ => {}
        }
    }
    names
}

fn return_type(node: Node, source: &str) -> Option<String> {
    node.child_by_field_name("return_type")
        .map(|n| strip_type_prefix(node_text(n, source)))
}

fn strip_type_prefix(text: &str) -> String {
    text.trim_start_matches(':').trim().to_string()
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

/// Extends target and implements list from the `class_heritage` subtree.
///
/// The TypeScript grammar nests `extends_clause` / `implements_clause`
/// inside `class_heritage`; the JavaScript grammar puts the extended
/// expression directly under it.
fn class_heritage(node: Node, source: &str) -> (Option<String>, Vec<String>) {
    let mut super_class = None;
    let mut interfaces = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let mut heritage_cursor = child.walk();
        let clauses: Vec<Node> = child.named_children(&mut heritage_cursor).collect();
        if clauses.is_empty() {
            continue;
        }
        let mut saw_clause = false;
        for clause in &clauses {
            match clause.kind() {
                "extends_clause" => {
                    saw_clause = true;
                    super_class = clause
                        .named_child(0)
                        .map(|n| node_text(n, source).to_string());
                }
                "implements_clause" => {
                    saw_clause = true;
                    let mut c = clause.walk();
                    interfaces.extend(
                        clause
                            .named_children(&mut c)
                            .map(|n| node_text(n, source).to_string()),
                    );
                }
                _ => {}
            }
        }
        if !saw_clause {
            super_class = Some(node_text(clauses[0], source).to_string());
        }
    }

    (super_class, interfaces)
}

fn decorators(node: Node, source: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            found.push(node_text(child, source).trim_start_matches('@').to_string());
        }
    }
    found
}

/// Decompose the import clause: default identifier, `* as X` namespace,
/// `{named, a as b}` specifiers (the bound-name side is kept).
fn import_clause(node: Node, source: &str) -> (Vec<String>, bool, bool) {
    let mut symbols = Vec::new();
    let mut is_default = false;
    let mut is_namespace = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for part in child.named_children(&mut clause_cursor) {
            match part.kind() {
                "identifier" => {
                    is_default = true;
                    symbols.push(node_text(part, source).to_string());
                }
                "namespace_import" => {
                    is_namespace = true;
                    let mut ns_cursor = part.walk();
                    for inner in part.named_children(&mut ns_cursor) {
                        if inner.kind() == "identifier" {
                            symbols.push(node_text(inner, source).to_string());
                        }
                    }
                }
                "named_imports" => {
                    let mut named_cursor = part.walk();
                    for spec in part.named_children(&mut named_cursor) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let bound = spec
                            .child_by_field_name("alias")
                            .or_else(|| spec.child_by_field_name("name"))
                            .map(|n| node_text(n, source).to_string());
                        if let Some(bound) = bound {
                            symbols.push(bound);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    (symbols, is_default, is_namespace)
}
