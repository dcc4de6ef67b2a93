//! Cognitive complexity, after the SonarSource model.
//!
//! Each increment structure costs 1, plus the nesting level at entry when
//! it sits inside another nesting structure. Flow-breaking statements
//! (`return`, `throw`, `break`, `continue`) cost 1 each. Function bodies
//! (including arrows) raise the nesting level for everything inside them.
//! Traversal is DFS pre-order, so the bonus always uses the level at entry.

use tree_sitter::Node;

use crate::parsers::Language;

/// Score the subtree rooted at `node`. The root itself does not count and
/// does not raise nesting: callers pass a function body or a module root
/// and get the complexity *within* it.
pub fn calculate_cognitive(node: Node, language: Language) -> u32 {
    let mut score = 0;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        score += visit(child, language, 0);
    }
    score
}

fn visit(node: Node, language: Language, nesting: u32) -> u32 {
    let kind = node.kind();
    let mut score = 0;

    if is_increment(kind, language) {
        score += 1 + nesting;
    } else if is_flow_break(kind, language) {
        score += 1;
    }

    let child_nesting = if is_nesting(kind, language) {
        nesting + 1
    } else {
        nesting
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        score += visit(child, language, child_nesting);
    }
    score
}

fn is_increment(kind: &str, language: Language) -> bool {
    match language {
        Language::TypeScript | Language::JavaScript => matches!(
            kind,
            "if_statement"
                | "ternary_expression"
                | "switch_statement"
                | "for_statement"
                | "for_in_statement"
                | "while_statement"
                | "do_statement"
                | "catch_clause"
        ),
        Language::Python => matches!(
            kind,
            "if_statement"
                | "conditional_expression"
                | "match_statement"
                | "for_statement"
                | "while_statement"
                | "except_clause"
        ),
    }
}

fn is_nesting(kind: &str, language: Language) -> bool {
    if is_increment(kind, language) {
        return true;
    }
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
        Language::Python => matches!(kind, "function_definition" | "lambda"),
    }
}

fn is_flow_break(kind: &str, language: Language) -> bool {
    match language {
        Language::TypeScript | Language::JavaScript => matches!(
            kind,
            "return_statement" | "throw_statement" | "break_statement" | "continue_statement"
        ),
        Language::Python => matches!(
            kind,
            "return_statement" | "raise_statement" | "break_statement" | "continue_statement"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserRegistry;
    use std::path::Path;

    fn cognitive_of_first_function(source: &str, language: Language) -> u32 {
        let registry = ParserRegistry::new();
        let parsed = registry.parse(source, language, Path::new("test")).unwrap();
        let root = parsed.tree.root_node();
        let function = find_function(root, language).expect("function in fixture");
        calculate_cognitive(function, language)
    }

    fn find_function<'t>(node: Node<'t>, language: Language) -> Option<Node<'t>> {
        let target = match language {
            Language::Python => "function_definition",
            _ => "function_declaration",
        };
        if node.kind() == target {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|c| find_function(c, language))
    }

    #[test]
    fn flat_sequence_costs_flow_breaks_only() {
        let source = "function f() { const a = 1; return a; }";
        // One return.
        assert_eq!(cognitive_of_first_function(source, Language::JavaScript), 1);
    }

    #[test]
    fn nested_if_pays_the_nesting_bonus() {
        let source = r#"
function f(a, b) {
    if (a) {
        if (b) {
            return 1;
        }
    }
    return 0;
}
"#;
        // outer if: 1; inner if: 1 + 1 nesting; two returns: 2.
        assert_eq!(cognitive_of_first_function(source, Language::JavaScript), 5);
    }

    #[test]
    fn loop_in_if_in_function_accumulates() {
        let source = r#"
function f(xs) {
    if (xs) {
        for (const x of xs) {
            while (x) { break; }
        }
    }
}
"#;
        // if: 1; for: 1+1; while: 1+2; break: 1.
        assert_eq!(cognitive_of_first_function(source, Language::JavaScript), 7);
    }

    #[test]
    fn callback_body_is_nested() {
        let source = r#"
function f(xs) {
    xs.forEach(x => {
        if (x) { return; }
    });
}
"#;
        // if inside the arrow: 1 + 1 nesting; return: 1.
        assert_eq!(cognitive_of_first_function(source, Language::JavaScript), 3);
    }

    #[test]
    fn python_nesting_matches_javascript_shape() {
        let source = r#"
def f(a, b):
    if a:
        if b:
            return 1
    return 0
"#;
        assert_eq!(cognitive_of_first_function(source, Language::Python), 5);
    }
}
