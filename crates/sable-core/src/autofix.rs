//! Text edits and fix plumbing
//!
//! A fix is a set of non-overlapping [`TextEdit`]s against one source text.
//! Edits are applied right-to-left so earlier offsets stay valid, and a batch
//! of fixes is first reduced to a conflict-free subset.

use rowan::{TextRange, TextSize};
use std::path::Path;

use crate::console::{Color, Console};
use crate::diagnostics::Applicability;
use crate::{Result, SableError};

/// Replace `range` with `replacement`; an empty range is an insertion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: TextSize, text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, String::new())
    }

    /// Two edits conflict if they overlap or start at the same point
    pub fn conflicts_with(&self, other: &TextEdit) -> bool {
        if self.range.start() == other.range.start() {
            return true;
        }
        self.range.start() < other.range.end() && other.range.start() < self.range.end()
    }
}

/// A computed fix for one diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    /// Rule that produced this fix
    pub rule_id: String,
    pub description: String,
    pub edits: Vec<TextEdit>,
    /// Always = safe, MaybeIncorrect = deserves review
    pub applicability: Applicability,
}

impl Fix {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        edits: Vec<TextEdit>,
        applicability: Applicability,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            edits,
            applicability,
        }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self.applicability, Applicability::Always)
    }

    /// Check if any edit of this fix conflicts with an edit of `other`
    pub fn conflicts_with(&self, other: &Fix) -> bool {
        self.edits
            .iter()
            .any(|a| other.edits.iter().any(|b| a.conflicts_with(b)))
    }

    /// Earliest offset touched by this fix
    pub fn start(&self) -> Option<TextSize> {
        self.edits.iter().map(|edit| edit.range.start()).min()
    }
}

/// Apply a set of edits to `source`
///
/// Fails if an edit is out of bounds, splits a character, or conflicts with
/// another edit of the set.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String> {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start(), edit.range.end()));

    for edit in &sorted {
        let end = usize::from(edit.range.end());
        let start = usize::from(edit.range.start());
        if end > source.len() {
            return Err(SableError::autofix_error(format!(
                "edit {start}..{end} is out of bounds for a source of {} bytes",
                source.len()
            )));
        }
        if !source.is_char_boundary(start) || !source.is_char_boundary(end) {
            return Err(SableError::autofix_error(format!(
                "edit {start}..{end} does not fall on character boundaries"
            )));
        }
    }

    for pair in sorted.windows(2) {
        if pair[0].conflicts_with(pair[1]) {
            return Err(SableError::autofix_error(format!(
                "overlapping edits at {:?} and {:?}",
                pair[0].range, pair[1].range
            )));
        }
    }

    let mut result = source.to_string();
    for edit in sorted.iter().rev() {
        result.replace_range(
            usize::from(edit.range.start())..usize::from(edit.range.end()),
            &edit.replacement,
        );
    }
    Ok(result)
}

/// Pick fixes greedily in source order, skipping any fix that conflicts with
/// one already chosen or whose own edits conflict with each other
pub fn select_non_conflicting(fixes: Vec<Fix>) -> Vec<Fix> {
    let mut ordered = fixes;
    ordered.sort_by_key(|fix| fix.start());

    let mut selected: Vec<Fix> = Vec::new();
    for fix in ordered {
        if fix.edits.is_empty() || has_internal_conflict(&fix) {
            tracing::debug!("Dropping malformed fix for {}", fix.rule_id);
            continue;
        }
        if selected.iter().any(|chosen| chosen.conflicts_with(&fix)) {
            tracing::debug!(
                "Deferring {} fix at {:?}: conflicts with an earlier fix",
                fix.rule_id,
                fix.start()
            );
            continue;
        }
        selected.push(fix);
    }
    selected
}

fn has_internal_conflict(fix: &Fix) -> bool {
    fix.edits.iter().enumerate().any(|(i, a)| {
        fix.edits[i + 1..].iter().any(|b| a.conflicts_with(b))
    })
}

/// Unified diff between two versions of a file
pub fn unified_diff(path: &Path, original: &str, modified: &str, console: &Console) -> String {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(original, modified);
    let mut output = String::new();

    output.push_str(&console.colorize(&format!("--- {}", path.display()), Color::Bold));
    output.push('\n');
    output.push_str(&console.colorize(&format!("+++ {}", path.display()), Color::Bold));
    output.push('\n');

    for group in diff.grouped_ops(3) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;
        let old_len = last.old_range().end - old_start;
        let new_len = last.new_range().end - new_start;

        output.push_str(&console.colorize(
            &format!(
                "@@ -{},{} +{},{} @@",
                old_start + 1,
                old_len,
                new_start + 1,
                new_len
            ),
            Color::Cyan,
        ));
        output.push('\n');

        for op in &group {
            for change in diff.iter_changes(op) {
                let line = change.value().trim_end_matches(['\n', '\r']);
                let rendered = match change.tag() {
                    ChangeTag::Delete => console.colorize(&format!("-{line}"), Color::Red),
                    ChangeTag::Insert => console.colorize(&format!("+{line}"), Color::Green),
                    ChangeTag::Equal => format!(" {line}"),
                };
                output.push_str(&rendered);
                output.push('\n');
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    fn fix(edits: Vec<TextEdit>) -> Fix {
        Fix::new("SA1500", "Move brace", edits, Applicability::Always)
    }

    #[test]
    fn test_apply_edits_right_to_left() {
        let source = "void Bar() { }";
        let edits = vec![
            TextEdit::replace(range(10, 11), "\n"),
            TextEdit::insert(13.into(), "return; "),
        ];
        assert_eq!(
            apply_edits(source, &edits).unwrap(),
            "void Bar()\n{ return; }"
        );
    }

    #[test]
    fn test_apply_edits_rejects_overlap() {
        let edits = vec![
            TextEdit::replace(range(0, 4), "a"),
            TextEdit::replace(range(2, 6), "b"),
        ];
        assert!(apply_edits("abcdefgh", &edits).is_err());

        let same_point = vec![TextEdit::insert(3.into(), "x"), TextEdit::insert(3.into(), "y")];
        assert!(apply_edits("abcdefgh", &same_point).is_err());
    }

    #[test]
    fn test_apply_edits_rejects_out_of_bounds() {
        let err = apply_edits("abc", &[TextEdit::delete(range(1, 9))]).unwrap_err();
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_apply_edits_rejects_split_character() {
        assert!(apply_edits("é", &[TextEdit::delete(range(0, 1))]).is_err());
    }

    #[test]
    fn test_adjacent_edits_do_not_conflict() {
        let a = TextEdit::replace(range(0, 2), "x");
        let b = TextEdit::replace(range(2, 4), "y");
        assert!(!a.conflicts_with(&b));
        assert_eq!(apply_edits("abcd", &[a, b]).unwrap(), "xy");
    }

    #[test]
    fn test_select_non_conflicting() {
        let fixes = vec![
            fix(vec![TextEdit::replace(range(10, 12), "c")]),
            fix(vec![TextEdit::replace(range(0, 3), "a")]),
            fix(vec![TextEdit::replace(range(2, 5), "b")]),
            fix(vec![]),
        ];
        let selected = select_non_conflicting(fixes);
        let starts: Vec<_> = selected.iter().map(|f| f.start()).collect();
        assert_eq!(starts, vec![Some(0.into()), Some(10.into())]);
    }

    #[test]
    fn test_unified_diff_plain() {
        let diff = unified_diff(
            Path::new("Foo.cs"),
            "class A {\n}\n",
            "class A\n{\n}\n",
            &Console::no_colors(),
        );
        assert!(diff.starts_with("--- Foo.cs\n+++ Foo.cs\n@@ -1,2 +1,3 @@\n"));
        assert!(diff.contains("-class A {\n"));
        assert!(diff.contains("+class A\n+{\n"));
        assert!(diff.contains(" }\n"));
    }
}
