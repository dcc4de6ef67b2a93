//! Structural extraction from raw parse trees: per-file function list,
//! class list with methods, and the verbatim import specifier list.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::complexity::{calculate_cognitive, calculate_cyclomatic};
use crate::core::SourceLocation;
use crate::parsers::Language;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub location: SourceLocation,
    pub cyclomatic_complexity: u32,
    pub cognitive_complexity: u32,
    pub parameter_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub location: SourceLocation,
    pub is_static: bool,
    pub is_private: bool,
    pub is_async: bool,
    pub parameter_count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub location: SourceLocation,
    pub methods: Vec<MethodInfo>,
    pub property_count: usize,
    pub static_member_count: usize,
    pub super_class: Option<String>,
}

/// Collect every function-like node with its complexity scores.
///
/// Entries are keyed by `(name, location)`: anonymous constructs all carry
/// the name `"anonymous"` and stay distinct through their locations.
pub fn analyze_functions(root: Node, source: &str, language: Language) -> Vec<FunctionInfo> {
    let mut functions = Vec::new();
    visit_functions(root, source, language, &mut functions);
    functions
}

fn visit_functions(node: Node, source: &str, language: Language, out: &mut Vec<FunctionInfo>) {
    if is_function_kind(node.kind(), language) {
        out.push(FunctionInfo {
            name: function_name(node, source, language),
            location: SourceLocation::from_node(&node),
            cyclomatic_complexity: calculate_cyclomatic(node, source, language),
            cognitive_complexity: calculate_cognitive(node, language),
            parameter_count: count_parameters(node, language),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_functions(child, source, language, out);
    }
}

fn is_function_kind(kind: &str, language: Language) -> bool {
    match language {
        Language::TypeScript | Language::JavaScript => matches!(
            kind,
            "function_declaration"
                | "generator_function_declaration"
                | "function_expression"
                | "function"
                | "arrow_function"
                | "method_definition"
        ),
        Language::Python => kind == "function_definition",
    }
}

fn function_name(node: Node, source: &str, language: Language) -> String {
    if language == Language::Python {
        return node
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(source.as_bytes()).ok())
            .unwrap_or("anonymous")
            .to_string();
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if matches!(child.kind(), "identifier" | "property_identifier") {
            if let Ok(name) = child.utf8_text(source.as_bytes()) {
                return name.to_string();
            }
        }
    }

    // Anonymous forms pick up the name of the variable they are bound to.
    if let Some(parent) = node.parent() {
        if parent.kind() == "variable_declarator" {
            if let Some(name) = parent.child_by_field_name("name") {
                if let Ok(name) = name.utf8_text(source.as_bytes()) {
                    return name.to_string();
                }
            }
        }
    }

    "anonymous".to_string()
}

/// One parameter per `identifier | required_parameter | optional_parameter
/// | rest_parameter` child (destructuring patterns count as one each).
fn count_parameters(node: Node, language: Language) -> usize {
    let Some(params) = node.child_by_field_name("parameters") else {
        return if node.child_by_field_name("parameter").is_some() {
            1
        } else {
            0
        };
    };

    let countable: &[&str] = match language {
        Language::TypeScript | Language::JavaScript => &[
            "identifier",
            "required_parameter",
            "optional_parameter",
            "rest_parameter",
            "rest_pattern",
            "object_pattern",
            "array_pattern",
            "assignment_pattern",
        ],
        Language::Python => &[
            "identifier",
            "typed_parameter",
            "default_parameter",
            "typed_default_parameter",
            "list_splat_pattern",
            "dictionary_splat_pattern",
        ],
    };

    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|c| countable.contains(&c.kind()))
        .count()
}

/// Collect classes with their method roster and member counts.
pub fn analyze_classes(root: Node, source: &str, language: Language) -> Vec<ClassInfo> {
    let mut classes = Vec::new();
    visit_classes(root, source, language, &mut classes);
    classes
}

fn visit_classes(node: Node, source: &str, language: Language, out: &mut Vec<ClassInfo>) {
    let is_class = match language {
        Language::TypeScript | Language::JavaScript => {
            matches!(node.kind(), "class_declaration" | "class")
        }
        Language::Python => node.kind() == "class_definition",
    };

    if is_class {
        out.push(match language {
            Language::Python => python_class_info(node, source),
            _ => js_class_info(node, source, language),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_classes(child, source, language, out);
    }
}

fn js_class_info(node: Node, source: &str, language: Language) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .unwrap_or("anonymous")
        .to_string();

    let super_class = node
        .child_by_field_name("superclass")
        .or_else(|| js_heritage_superclass(node))
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string());

    let mut methods = Vec::new();
    let mut property_count = 0;
    let mut static_member_count = 0;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_definition" => {
                    let is_static = has_child_token(member, "static");
                    if is_static {
                        static_member_count += 1;
                    }
                    methods.push(MethodInfo {
                        name: method_name(member, source),
                        location: SourceLocation::from_node(&member),
                        is_static,
                        is_private: is_private_member(member, source),
                        is_async: has_child_token(member, "async"),
                        parameter_count: count_parameters(member, language),
                    });
                }
                "field_definition" | "public_field_definition" => {
                    property_count += 1;
                    if has_child_token(member, "static") {
                        static_member_count += 1;
                    }
                }
                _ => {}
            }
        }
    }

    ClassInfo {
        name,
        location: SourceLocation::from_node(&node),
        methods,
        property_count,
        static_member_count,
        super_class,
    }
}

/// The TypeScript grammar wraps `extends` in a heritage subtree rather than
/// a `superclass` field; the JavaScript grammar puts the expression directly
/// under `class_heritage`.
fn js_heritage_superclass(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    let heritage = node
        .children(&mut cursor)
        .find(|c| c.kind() == "class_heritage")?;

    let mut heritage_cursor = heritage.walk();
    let clauses: Vec<Node> = heritage.named_children(&mut heritage_cursor).collect();
    if let Some(extends) = clauses.iter().find(|c| c.kind() == "extends_clause") {
        return extends.named_child(0);
    }
    if clauses
        .iter()
        .any(|c| c.kind() == "implements_clause")
    {
        return None;
    }
    clauses.first().copied()
}

fn python_class_info(node: Node, source: &str) -> ClassInfo {
    let name = node
        .child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .unwrap_or("anonymous")
        .to_string();

    let super_class = node
        .child_by_field_name("superclasses")
        .and_then(|s| s.named_child(0))
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string());

    let mut methods = Vec::new();
    let mut property_count = 0;
    let mut static_member_count = 0;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            let (definition, decorators) = match member.kind() {
                "decorated_definition" => {
                    let inner = member.child_by_field_name("definition");
                    (inner, decorator_names(member, source))
                }
                _ => (Some(member), Vec::new()),
            };
            let Some(definition) = definition else { continue };

            match definition.kind() {
                "function_definition" => {
                    let name = definition
                        .child_by_field_name("name")
                        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
                        .unwrap_or("anonymous")
                        .to_string();
                    let is_static = decorators.iter().any(|d| d == "staticmethod");
                    if is_static {
                        static_member_count += 1;
                    }
                    methods.push(MethodInfo {
                        is_private: name.starts_with('_'),
                        is_async: has_child_token(definition, "async"),
                        parameter_count: count_parameters(definition, Language::Python),
                        location: SourceLocation::from_node(&definition),
                        name,
                        is_static,
                    });
                }
                "expression_statement" => {
                    let mut inner = definition.walk();
                    if definition
                        .named_children(&mut inner)
                        .any(|c| c.kind() == "assignment")
                    {
                        property_count += 1;
                    }
                }
                _ => {}
            }
        }
    }

    ClassInfo {
        name,
        location: SourceLocation::from_node(&node),
        methods,
        property_count,
        static_member_count,
        super_class,
    }
}

fn decorator_names(node: Node, source: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "decorator" {
            if let Ok(text) = child.utf8_text(source.as_bytes()) {
                found.push(text.trim_start_matches('@').to_string());
            }
        }
    }
    found
}

fn method_name(node: Node, source: &str) -> String {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .unwrap_or("anonymous")
        .to_string()
}

fn is_private_member(node: Node, source: &str) -> bool {
    node.child_by_field_name("name")
        .map(|n| {
            n.kind() == "private_property_identifier"
                || n.utf8_text(source.as_bytes())
                    .map(|t| t.starts_with('#') || t.starts_with('_'))
                    .unwrap_or(false)
        })
        .unwrap_or(false)
}

fn has_child_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

/// Collect raw import specifiers: ES imports, `require(...)` calls whose
/// callee identifier is literally `require`, and dynamic `import(...)`
/// expressions. Values are returned verbatim, not resolved.
pub fn analyze_module_dependencies(root: Node, source: &str, language: Language) -> Vec<String> {
    let mut dependencies = Vec::new();
    visit_dependencies(root, source, language, &mut dependencies);
    dependencies
}

fn visit_dependencies(node: Node, source: &str, language: Language, out: &mut Vec<String>) {
    match language {
        Language::TypeScript | Language::JavaScript => match node.kind() {
            "import_statement" | "import_declaration" => {
                if let Some(spec) = node.child_by_field_name("source") {
                    push_string_literal(spec, source, out);
                }
            }
            "call_expression" => {
                if let Some(callee) = node.child_by_field_name("function") {
                    let callee_text = callee.utf8_text(source.as_bytes()).unwrap_or("");
                    if callee_text == "require" || callee.kind() == "import" {
                        if let Some(args) = node.child_by_field_name("arguments") {
                            let mut cursor = args.walk();
                            for arg in args.named_children(&mut cursor) {
                                if arg.kind() == "string" {
                                    push_string_literal(arg, source, out);
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        },
        Language::Python => match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    match child.kind() {
                        "dotted_name" => {
                            if let Ok(text) = child.utf8_text(source.as_bytes()) {
                                out.push(text.to_string());
                            }
                        }
                        "aliased_import" => {
                            if let Some(name) = child.child_by_field_name("name") {
                                if let Ok(text) = name.utf8_text(source.as_bytes()) {
                                    out.push(text.to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            "import_from_statement" => {
                if let Some(module) = node.child_by_field_name("module_name") {
                    if let Ok(text) = module.utf8_text(source.as_bytes()) {
                        out.push(text.to_string());
                    }
                }
            }
            _ => {}
        },
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_dependencies(child, source, language, out);
    }
}

fn push_string_literal(node: Node, source: &str, out: &mut Vec<String>) {
    if let Ok(text) = node.utf8_text(source.as_bytes()) {
        out.push(
            text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
                .to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserRegistry;
    use std::path::Path;

    fn parse(source: &str, language: Language) -> tree_sitter::Tree {
        ParserRegistry::new()
            .parse(source, language, Path::new("test"))
            .unwrap()
            .tree
    }

    #[test]
    fn functions_report_name_params_and_complexity() {
        let source = r#"
function check(a, b, ...rest) {
    if (a && b) { return true; }
    return false;
}
const sum = (x, y) => x + y;
"#;
        let tree = parse(source, Language::JavaScript);
        let functions = analyze_functions(tree.root_node(), source, Language::JavaScript);

        assert_eq!(functions.len(), 2);
        let check = &functions[0];
        assert_eq!(check.name, "check");
        assert_eq!(check.parameter_count, 3);
        assert_eq!(check.cyclomatic_complexity, 3);

        let sum = &functions[1];
        assert_eq!(sum.name, "sum");
        assert_eq!(sum.parameter_count, 2);
        assert_eq!(sum.cyclomatic_complexity, 1);
    }

    #[test]
    fn anonymous_entries_stay_distinct_by_location() {
        let source = "run(function () {}); run(function () {});";
        let tree = parse(source, Language::JavaScript);
        let functions = analyze_functions(tree.root_node(), source, Language::JavaScript);

        assert_eq!(functions.len(), 2);
        assert_eq!(functions[0].name, "anonymous");
        assert_eq!(functions[1].name, "anonymous");
        assert_ne!(functions[0].location, functions[1].location);
    }

    #[test]
    fn class_roster_with_flags() {
        let source = r#"
class Store extends Base {
    static registry = new Map();
    cache = null;

    static create() { return new Store(); }
    async load(key) { return this.cache; }
    #evict() {}
}
"#;
        let tree = parse(source, Language::JavaScript);
        let classes = analyze_classes(tree.root_node(), source, Language::JavaScript);

        assert_eq!(classes.len(), 1);
        let store = &classes[0];
        assert_eq!(store.name, "Store");
        assert_eq!(store.super_class.as_deref(), Some("Base"));
        assert_eq!(store.methods.len(), 3);
        assert_eq!(store.property_count, 2);
        // static field + static method
        assert_eq!(store.static_member_count, 2);

        let create = store.methods.iter().find(|m| m.name == "create").unwrap();
        assert!(create.is_static);
        let load = store.methods.iter().find(|m| m.name == "load").unwrap();
        assert!(load.is_async);
        assert_eq!(load.parameter_count, 1);
        assert!(store.methods.iter().any(|m| m.is_private));
    }

    #[test]
    fn python_class_members() {
        let source = r#"
class Repo(Base):
    table = "repos"

    def save(self, row):
        pass

    @staticmethod
    def connect():
        pass

    def _hidden(self):
        pass
"#;
        let tree = parse(source, Language::Python);
        let classes = analyze_classes(tree.root_node(), source, Language::Python);

        assert_eq!(classes.len(), 1);
        let repo = &classes[0];
        assert_eq!(repo.super_class.as_deref(), Some("Base"));
        assert_eq!(repo.methods.len(), 3);
        assert_eq!(repo.property_count, 1);
        assert_eq!(repo.static_member_count, 1);
        assert!(repo.methods.iter().any(|m| m.name == "_hidden" && m.is_private));
    }

    #[test]
    fn import_specifiers_are_verbatim() {
        let source = r#"
import { helper } from './util';
import config from '../config';
const fs = require('fs');
const lazy = await import('./lazy');
"#;
        let tree = parse(source, Language::TypeScript);
        let deps = analyze_module_dependencies(tree.root_node(), source, Language::TypeScript);

        assert_eq!(deps, vec!["./util", "../config", "fs", "./lazy"]);
    }

    #[test]
    fn aliased_require_is_not_an_import() {
        let source = "const load = require; const x = load('./hidden');";
        let tree = parse(source, Language::JavaScript);
        let deps = analyze_module_dependencies(tree.root_node(), source, Language::JavaScript);
        assert!(deps.is_empty());
    }

    #[test]
    fn python_imports_collected() {
        let source = "import os.path\nfrom app.models import User\n";
        let tree = parse(source, Language::Python);
        let deps = analyze_module_dependencies(tree.root_node(), source, Language::Python);
        assert_eq!(deps, vec!["os.path", "app.models"]);
    }
}
