//! Grammar registry and parse entry points.
//!
//! Maps file paths to languages, parses source text into tree-sitter trees,
//! and derives the unified view through the per-language adapters. Supports
//! incremental re-parse against a previous tree, falling back to a full
//! parse on any failure.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tree_sitter::{InputEdit, Parser, Point, Tree};

use crate::adapters;
use crate::core::errors::{Error, Result};
use crate::core::unified::UnifiedAst;

/// Languages the registry carries a grammar for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
}

impl Language {
    /// Extension table: `.ts`/`.tsx` are TypeScript, `.js`/`.jsx` are
    /// JavaScript, `.py` is Python; anything else is treated as JavaScript.
    pub fn from_path(path: &Path) -> Self {
        static EXTENSION_MAP: &[(&[&str], Language)] = &[
            (&["ts", "tsx", "mts", "cts"], Language::TypeScript),
            (&["js", "jsx", "mjs", "cjs"], Language::JavaScript),
            (&["py"], Language::Python),
        ];

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext))
            .map(|(_, lang)| *lang)
            .unwrap_or(Language::JavaScript)
    }

    /// Extensions the project walker admits for this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Python => &["py"],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one parse: the raw tree, the unified view (absent when the
/// adapter failed), and the syntactic error ratio over the whole tree.
#[derive(Debug)]
pub struct ParseResult {
    pub tree: Tree,
    pub unified: Option<UnifiedAst>,
    pub has_errors: bool,
    pub error_ratio: f64,
}

/// Stateless grammar registry. Each parse owns its `Parser` instance, so a
/// registry can be shared freely across concurrent analyses.
#[derive(Debug, Default, Clone)]
pub struct ParserRegistry;

impl ParserRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript, Language::Python]
    }

    pub fn detect_language(&self, path: &Path) -> Language {
        Language::from_path(path)
    }

    /// Parse `content` with the grammar for `language`.
    ///
    /// The unified view is produced through the language's adapter; if the
    /// adapter fails the raw tree is still returned and the failure is only
    /// logged.
    pub fn parse(&self, content: &str, language: Language, path: &Path) -> Result<ParseResult> {
        let tree = self.parse_tree(content, language, path, None)?;
        Ok(self.finish(tree, content, language, path))
    }

    /// Re-parse `content` reusing `prev_tree` where possible.
    ///
    /// `prev_source` is the text `prev_tree` was parsed from; it is needed
    /// to compute the byte-level edit between the two versions. Any failure
    /// in the incremental path falls back to a full parse silently.
    pub fn parse_incremental(
        &self,
        prev_tree: &Tree,
        prev_source: &str,
        content: &str,
        language: Language,
        path: &Path,
    ) -> Result<ParseResult> {
        let mut edited = prev_tree.clone();
        edited.edit(&compute_edit(prev_source, content));

        match self.parse_tree(content, language, path, Some(&edited)) {
            Ok(tree) => Ok(self.finish(tree, content, language, path)),
            Err(_) => self.parse(content, language, path),
        }
    }

    fn parse_tree(
        &self,
        content: &str,
        language: Language,
        path: &Path,
        prev: Option<&Tree>,
    ) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar_for(language, path))
            .map_err(|_| Error::UnsupportedLanguage(language.to_string()))?;

        parser
            .parse(content, prev)
            .ok_or_else(|| Error::parse(path, format!("parser returned no tree for {language}")))
    }

    fn finish(&self, tree: Tree, content: &str, language: Language, path: &Path) -> ParseResult {
        let adapter = adapters::adapter_for(language);
        let error_ratio = adapter.error_ratio(&tree);

        let unified = match adapter.to_unified_nodes(&tree, content, path) {
            Ok(ast) => Some(ast),
            Err(err) => {
                log::warn!(
                    "[Adapter][{language}] unified view failed for {}: {err}",
                    path.display()
                );
                None
            }
        };

        ParseResult {
            tree,
            unified,
            has_errors: error_ratio > 0.0,
            error_ratio,
        }
    }
}

fn grammar_for(language: Language, path: &Path) -> tree_sitter::Language {
    match language {
        Language::TypeScript => {
            // .tsx needs the JSX-aware grammar variant.
            if path.extension().and_then(|e| e.to_str()) == Some("tsx") {
                tree_sitter_typescript::LANGUAGE_TSX.into()
            } else {
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
            }
        }
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::Python => tree_sitter_python::LANGUAGE.into(),
    }
}

/// Count error and total nodes over the whole tree.
///
/// A node counts as an error when the grammar tagged it `ERROR` or marked it
/// missing.
pub fn error_ratio(tree: &Tree) -> f64 {
    let mut total = 0usize;
    let mut errors = 0usize;
    visit_counting(tree.root_node(), &mut total, &mut errors);
    if total == 0 {
        0.0
    } else {
        errors as f64 / total as f64
    }
}

fn visit_counting(node: tree_sitter::Node, total: &mut usize, errors: &mut usize) {
    *total += 1;
    if node.is_error() || node.is_missing() {
        *errors += 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_counting(child, total, errors);
    }
}

/// Location of the first `ERROR` or missing node in document order.
pub fn first_error_location(tree: &Tree) -> Option<crate::core::SourceLocation> {
    fn find(node: tree_sitter::Node) -> Option<crate::core::SourceLocation> {
        if node.is_error() || node.is_missing() {
            return Some(crate::core::SourceLocation::from_node(&node));
        }
        let mut cursor = node.walk();
        let children: Vec<tree_sitter::Node> = node.children(&mut cursor).collect();
        children.into_iter().find_map(find)
    }
    find(tree.root_node())
}

/// Minimal byte edit between two versions of a source text: the common
/// prefix and suffix are kept, everything between is the replaced span.
fn compute_edit(old_source: &str, new_source: &str) -> InputEdit {
    let old_bytes = old_source.as_bytes();
    let new_bytes = new_source.as_bytes();

    let start_byte = old_bytes
        .iter()
        .zip(new_bytes.iter())
        .position(|(a, b)| a != b)
        .unwrap_or(old_bytes.len().min(new_bytes.len()));

    let suffix_len = old_bytes[start_byte..]
        .iter()
        .rev()
        .zip(new_bytes[start_byte..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let old_end_byte = old_bytes.len() - suffix_len;
    let new_end_byte = new_bytes.len() - suffix_len;

    InputEdit {
        start_byte,
        old_end_byte,
        new_end_byte,
        start_position: byte_to_point(old_source, start_byte),
        old_end_position: byte_to_point(old_source, old_end_byte),
        new_end_position: byte_to_point(new_source, new_end_byte),
    }
}

fn byte_to_point(source: &str, byte_offset: usize) -> Point {
    let mut row = 0;
    let mut column = 0;
    let mut current = 0;

    for ch in source.chars() {
        if current >= byte_offset {
            break;
        }
        if ch == '\n' {
            row += 1;
            column = 0;
        } else {
            column += 1;
        }
        current += ch.len_utf8();
    }

    Point { row, column }
}
