//! Cyclomatic complexity over tree-sitter nodes.
//!
//! Base 1 plus one per decision point: `if`, each `case`, loops, `catch`,
//! ternaries, and each short-circuit `&&`/`||` operator.

use tree_sitter::Node;

use crate::parsers::Language;

pub fn calculate_cyclomatic(node: Node, source: &str, language: Language) -> u32 {
    let mut complexity = 1;
    visit(node, source, language, &mut complexity);
    complexity
}

fn visit(node: Node, source: &str, language: Language, complexity: &mut u32) {
    if is_decision_point(node, source, language) {
        *complexity += 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, language, complexity);
    }
}

fn is_decision_point(node: Node, source: &str, language: Language) -> bool {
    match language {
        Language::TypeScript | Language::JavaScript => match node.kind() {
            "if_statement" | "ternary_expression" | "switch_case" | "for_statement"
            | "for_in_statement" | "while_statement" | "do_statement" | "catch_clause" => true,
            "binary_expression" => is_short_circuit(node, source),
            _ => false,
        },
        Language::Python => matches!(
            node.kind(),
            "if_statement"
                | "elif_clause"
                | "conditional_expression"
                | "for_statement"
                | "while_statement"
                | "except_clause"
                | "boolean_operator"
                | "case_clause"
        ),
    }
}

fn is_short_circuit(node: Node, source: &str) -> bool {
    node.child_by_field_name("operator")
        .map(|op| {
            let text = op.utf8_text(source.as_bytes()).unwrap_or("");
            text == "&&" || text == "||"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParserRegistry;
    use std::path::Path;

    fn cyclomatic_of(source: &str, language: Language) -> u32 {
        let registry = ParserRegistry::new();
        let parsed = registry.parse(source, language, Path::new("test")).unwrap();
        calculate_cyclomatic(parsed.tree.root_node(), source, language)
    }

    #[test]
    fn straight_line_code_is_one() {
        assert_eq!(cyclomatic_of("const x = 1;", Language::JavaScript), 1);
    }

    #[test]
    fn if_plus_short_circuit_is_three() {
        let source = "function f(a, b) { if (a && b) { return 1; } return 0; }";
        assert_eq!(cyclomatic_of(source, Language::JavaScript), 3);
    }

    #[test]
    fn each_switch_case_counts() {
        let source = r#"
function pick(x) {
    switch (x) {
        case 1: return "one";
        case 2: return "two";
        default: return "many";
    }
}
"#;
        // Two cases; the default clause is not a decision point.
        assert_eq!(cyclomatic_of(source, Language::JavaScript), 3);
    }

    #[test]
    fn loops_and_catch_count() {
        let source = r#"
function churn(xs) {
    try {
        for (const x of xs) {
            while (x > 0) { x--; }
        }
    } catch (e) {
        return null;
    }
}
"#;
        assert_eq!(cyclomatic_of(source, Language::JavaScript), 4);
    }

    #[test]
    fn ternary_counts() {
        let source = "const y = a > 0 ? a : -a;";
        assert_eq!(cyclomatic_of(source, Language::JavaScript), 2);
    }

    #[test]
    fn python_branches_count() {
        let source = r#"
def grade(score):
    if score > 90:
        return "A"
    elif score > 80:
        return "B"
    for _ in range(3):
        pass
    return "C" if score else "F"
"#;
        // if + elif + for + conditional expression.
        assert_eq!(cyclomatic_of(source, Language::Python), 5);
    }

    #[test]
    fn python_boolean_operator_counts() {
        let source = "ok = a and b\n";
        assert_eq!(cyclomatic_of(source, Language::Python), 2);
    }
}
