//! Halstead volume and the maintainability index.
//!
//! The token partition is lexical: after stripping comments and normalizing
//! string literals to the token `"string"`, every character from a fixed
//! operator set counts as an operator occurrence and every identifier-like
//! word as an operand occurrence.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Comment syntax used when stripping source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//` line comments and `/* ... */` block comments.
    CStyle,
    /// `#` line comments.
    Hash,
}

impl CommentStyle {
    pub fn for_language(language: crate::parsers::Language) -> Self {
        match language {
            crate::parsers::Language::Python => CommentStyle::Hash,
            _ => CommentStyle::CStyle,
        }
    }
}

static OPERATOR_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    "()[]{}.,;+-*/%&|^!=<>?:~".chars().collect()
});

/// `HV = (N1 + N2) * log2(n1 + n2)`, floored at 1.
pub fn halstead_volume(source: &str, style: CommentStyle) -> f64 {
    let cleaned = strip_comments_and_strings(source, style);

    let mut operators = 0usize;
    let mut operands = 0usize;
    let mut distinct_operators: HashSet<char> = HashSet::new();
    let mut distinct_operands: HashSet<String> = HashSet::new();

    let mut word = String::new();
    for ch in cleaned.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' {
            word.push(ch);
            continue;
        }
        if !word.is_empty() {
            operands += 1;
            distinct_operands.insert(std::mem::take(&mut word));
        }
        if OPERATOR_CHARS.contains(&ch) {
            operators += 1;
            distinct_operators.insert(ch);
        }
    }
    if !word.is_empty() {
        operands += 1;
        distinct_operands.insert(word);
    }

    let length = (operators + operands) as f64;
    let vocabulary = (distinct_operators.len() + distinct_operands.len()) as f64;
    if vocabulary <= 0.0 {
        return 1.0;
    }
    (length * vocabulary.log2()).max(1.0)
}

/// `MI = 171 - 5.2*ln(HV) - 0.23*CC - 16.2*ln(LOC)`, clamped to `[0, 100]`
/// and rounded to an integer value.
pub fn maintainability_index(volume: f64, cyclomatic: f64, loc: f64) -> f64 {
    let volume = volume.max(1.0);
    let loc = loc.max(1.0);
    let raw = 171.0 - 5.2 * volume.ln() - 0.23 * cyclomatic - 16.2 * loc.ln();
    raw.clamp(0.0, 100.0).round()
}

/// Replace comments with whitespace and string literals with `"string"`.
fn strip_comments_and_strings(source: &str, style: CommentStyle) -> String {
    let mut out = String::with_capacity(source.len());
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        match style {
            CommentStyle::CStyle if ch == '/' && next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            CommentStyle::CStyle if ch == '/' && next == Some('*') => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            CommentStyle::Hash if ch == '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            _ if ch == '"' || ch == '\'' || ch == '`' => {
                let quote = ch;
                i += 1;
                while i < chars.len() && chars[i] != quote {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i = (i + 1).min(chars.len());
                out.push_str("\"string\"");
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_floors_at_one() {
        assert_eq!(halstead_volume("", CommentStyle::CStyle), 1.0);
    }

    #[test]
    fn volume_grows_with_vocabulary() {
        let small = halstead_volume("a = b;", CommentStyle::CStyle);
        let large = halstead_volume("a = b + c * d - e / f;", CommentStyle::CStyle);
        assert!(large > small);
    }

    #[test]
    fn comments_do_not_contribute() {
        let bare = halstead_volume("x = y + z;", CommentStyle::CStyle);
        let commented = halstead_volume(
            "x = y + z; // plus some = fake + operators\n/* and = more */",
            CommentStyle::CStyle,
        );
        assert_eq!(bare, commented);
    }

    #[test]
    fn hash_comments_stripped_for_python() {
        let bare = halstead_volume("x = y + z", CommentStyle::Hash);
        let commented = halstead_volume("x = y + z # plus = fake", CommentStyle::Hash);
        assert_eq!(bare, commented);
    }

    #[test]
    fn strings_normalize_to_one_operand() {
        let a = halstead_volume("greet('hello world, friend');", CommentStyle::CStyle);
        let b = halstead_volume("greet('bye');", CommentStyle::CStyle);
        assert_eq!(a, b);
    }

    #[test]
    fn maintainability_clamps_and_rounds() {
        assert_eq!(maintainability_index(1.0, 1.0, 1.0), 100.0);
        let low = maintainability_index(50_000.0, 80.0, 5_000.0);
        assert_eq!(low, 0.0);
        let mid = maintainability_index(500.0, 10.0, 120.0);
        assert_eq!(mid, mid.round());
        assert!(mid > 0.0 && mid < 100.0);
    }
}
