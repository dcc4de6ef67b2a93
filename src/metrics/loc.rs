//! Line counting: non-blank, non-pure-comment lines, floored at 1.

use super::CommentStyle;

pub fn count_loc(source: &str, style: CommentStyle) -> usize {
    let mut code_lines = 0usize;
    let mut in_block_comment = false;

    for line in source.lines() {
        let trimmed = line.trim();

        if in_block_comment {
            if let Some(end) = trimmed.find("*/") {
                in_block_comment = false;
                let rest = trimmed[end + 2..].trim();
                if !rest.is_empty() && !is_comment_line(rest, style, &mut in_block_comment) {
                    code_lines += 1;
                }
            }
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        if is_comment_line(trimmed, style, &mut in_block_comment) {
            continue;
        }

        code_lines += 1;

        // A trailing `/* ...` opens a block spanning the next lines.
        if style == CommentStyle::CStyle {
            if let Some(open) = trimmed.rfind("/*") {
                if !trimmed[open..].contains("*/") {
                    in_block_comment = true;
                }
            }
        }
    }

    code_lines.max(1)
}

fn is_comment_line(trimmed: &str, style: CommentStyle, in_block_comment: &mut bool) -> bool {
    match style {
        CommentStyle::Hash => trimmed.starts_with('#'),
        CommentStyle::CStyle => {
            if trimmed.starts_with("//") {
                return true;
            }
            if trimmed.starts_with("/*") {
                if !trimmed.contains("*/") {
                    *in_block_comment = true;
                    return true;
                }
                // `/* ... */ code` counts as code.
                let after = trimmed.split("*/").last().unwrap_or("").trim();
                return after.is_empty();
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_floors_at_one() {
        assert_eq!(count_loc("", CommentStyle::CStyle), 1);
        assert_eq!(count_loc("\n\n\n", CommentStyle::CStyle), 1);
    }

    #[test]
    fn blanks_and_line_comments_excluded() {
        let source = r#"
// header comment
const a = 1;

// another
const b = 2;
"#;
        assert_eq!(count_loc(source, CommentStyle::CStyle), 2);
    }

    #[test]
    fn block_comments_span_lines() {
        let source = r#"
/*
 * long explanation
 * continues here
 */
function f() {}
"#;
        assert_eq!(count_loc(source, CommentStyle::CStyle), 1);
    }

    #[test]
    fn code_after_block_end_counts() {
        let source = "/* note */ let x = 1;\nlet y = 2;\n";
        assert_eq!(count_loc(source, CommentStyle::CStyle), 2);
    }

    #[test]
    fn hash_comments_for_python() {
        let source = "# module doc\nx = 1\n\n# trailer\ny = 2\n";
        assert_eq!(count_loc(source, CommentStyle::Hash), 2);
    }

    #[test]
    fn trailing_open_block_swallows_following_lines() {
        let source = "let a = 1; /* starts here\nstill comment\nends */ let b = 2;\n";
        assert_eq!(count_loc(source, CommentStyle::CStyle), 2);
    }
}
