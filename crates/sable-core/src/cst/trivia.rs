//! Trivia navigation
//!
//! Trivia (whitespace, line breaks, comments, directives and disabled text)
//! are sibling tokens between significant tokens. These helpers walk the
//! token stream across node boundaries.

use super::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Next non-trivia token after `token`
pub fn next_significant(token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let mut next = token.next_token();
    while let Some(t) = next {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        next = t.next_token();
    }
    None
}

/// Previous non-trivia token before `token`
pub fn prev_significant(token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let mut prev = token.prev_token();
    while let Some(t) = prev {
        if !t.kind().is_trivia() {
            return Some(t);
        }
        prev = t.prev_token();
    }
    None
}

/// Trivia between the previous significant token and `token`, in source order
pub fn leading_trivia(token: &CsSyntaxToken) -> Vec<CsSyntaxToken> {
    let mut trivia = Vec::new();
    let mut prev = token.prev_token();
    while let Some(t) = prev {
        if !t.kind().is_trivia() {
            break;
        }
        prev = t.prev_token();
        trivia.push(t);
    }
    trivia.reverse();
    trivia
}

/// Trivia between `token` and the next significant token
pub fn trailing_trivia(token: &CsSyntaxToken) -> Vec<CsSyntaxToken> {
    let mut trivia = Vec::new();
    let mut next = token.next_token();
    while let Some(t) = next {
        if !t.kind().is_trivia() {
            break;
        }
        next = t.next_token();
        trivia.push(t);
    }
    trivia
}

/// Number of line breaks in a run of trivia. Disabled text counts its own
/// internal lines.
pub fn line_breaks(trivia: &[CsSyntaxToken]) -> usize {
    trivia
        .iter()
        .map(|t| match t.kind() {
            CsSyntaxKind::Newline => 1,
            CsSyntaxKind::MultiLineComment | CsSyntaxKind::DisabledText => count_breaks(t.text()),
            _ => 0,
        })
        .sum()
}

fn count_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                count += 1;
                i += 2;
                continue;
            }
            b'\r' | b'\n' => count += 1,
            _ => {}
        }
        i += 1;
    }
    count
}

/// Whether a line break separates `token` from the previous significant token
pub fn preceded_by_line_break(token: &CsSyntaxToken) -> bool {
    line_breaks(&leading_trivia(token)) > 0 || token.prev_token().is_none()
}

/// Whether a line break (or the end of the file) follows `token`
pub fn followed_by_line_break(token: &CsSyntaxToken) -> bool {
    let trivia = trailing_trivia(token);
    line_breaks(&trivia) > 0 || next_significant(token).is_none()
}

/// Whether `token` is the first thing on its line, ignoring whitespace
pub fn is_first_on_line(token: &CsSyntaxToken) -> bool {
    let mut prev = token.prev_token();
    while let Some(t) = prev {
        match t.kind() {
            CsSyntaxKind::Whitespace => prev = t.prev_token(),
            CsSyntaxKind::Newline => return true,
            CsSyntaxKind::DisabledText | CsSyntaxKind::PreprocessorDirective => return true,
            _ => return false,
        }
    }
    true
}

/// Whether only whitespace and comments follow `token` on its line
pub fn is_last_on_line(token: &CsSyntaxToken) -> bool {
    let mut next = token.next_token();
    while let Some(t) = next {
        match t.kind() {
            CsSyntaxKind::Whitespace | CsSyntaxKind::SingleLineComment | CsSyntaxKind::DocComment => {
                next = t.next_token()
            }
            CsSyntaxKind::MultiLineComment if count_breaks(t.text()) == 0 => next = t.next_token(),
            CsSyntaxKind::Newline => return true,
            _ => return false,
        }
    }
    true
}

/// Leading whitespace of the line that contains `token`
pub fn line_indent(token: &CsSyntaxToken) -> String {
    let mut first = token.clone();
    let mut prev = token.prev_token();
    while let Some(t) = prev {
        match t.kind() {
            CsSyntaxKind::Newline | CsSyntaxKind::DisabledText | CsSyntaxKind::PreprocessorDirective => {
                break;
            }
            _ => {
                prev = t.prev_token();
                first = t;
            }
        }
    }
    if first.kind() == CsSyntaxKind::Whitespace {
        first.text().to_string()
    } else {
        String::new()
    }
}

/// Whether any preprocessor directive or disabled region lies inside `node`
pub fn contains_directive(node: &CsSyntaxNode) -> bool {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .any(|t| {
            matches!(
                t.kind(),
                CsSyntaxKind::PreprocessorDirective | CsSyntaxKind::DisabledText
            )
        })
}

/// Whether any comment lies strictly between two tokens
pub fn comment_between(first: &CsSyntaxToken, last: &CsSyntaxToken) -> bool {
    let mut next = first.next_token();
    while let Some(t) = next {
        if &t == last {
            return false;
        }
        if t.kind().is_comment() {
            return true;
        }
        next = t.next_token();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{ParseOptions, SyntaxTree};

    fn tokens(source: &str) -> Vec<CsSyntaxToken> {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        tree.root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .collect()
    }

    fn find(tokens: &[CsSyntaxToken], text: &str) -> CsSyntaxToken {
        tokens
            .iter()
            .find(|t| t.text() == text)
            .cloned()
            .expect("token present")
    }

    #[test]
    fn test_significant_neighbours_skip_comments() {
        let all = tokens("class A /* c */ { }");
        let class = find(&all, "class");
        let name = next_significant(&class).expect("name");
        assert_eq!(name.text(), "A");
        let brace = find(&all, "{");
        assert_eq!(prev_significant(&brace).map(|t| t.text().to_string()), Some("A".into()));
        assert_eq!(leading_trivia(&brace).len(), 3);
    }

    #[test]
    fn test_line_position_helpers() {
        let all = tokens("class A\n{\n    int x; // note\n}\n");
        let open = find(&all, "{");
        assert!(is_first_on_line(&open));
        assert!(is_last_on_line(&open));
        let semi = find(&all, ";");
        assert!(is_last_on_line(&semi));
        assert!(followed_by_line_break(&semi));
        let int = find(&all, "int");
        assert_eq!(line_indent(&int), "    ");
        assert!(preceded_by_line_break(&int));
    }

    #[test]
    fn test_directives_are_detected() {
        let tree = SyntaxTree::parse(
            "class A\n{\n#if DEBUG\n    int x;\n#endif\n}\n",
            &ParseOptions::default(),
        );
        assert!(contains_directive(&tree.root()));
        assert_eq!(count_breaks("a\r\nb\rc\n"), 3);
    }
}
