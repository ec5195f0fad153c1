//! Per-walk view over one syntax tree
//!
//! A [`RuleContext`] is built inside each rule task. It borrows the shared
//! tree and settings and owns a red root of its own, so contexts are never
//! sent between threads.

use rowan::{TextRange, TextSize};
use sable_core::{StyleSettings, TextEdit};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken, SyntaxTree};

/// A run of blank lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankLines {
    /// From the start of the first blank line to the end of the line break of the last
    pub range: TextRange,
    pub count: usize,
}

pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub root: CsSyntaxNode,
    pub settings: &'a StyleSettings,
    /// Directive and inactive-code tokens, sorted and disjoint
    directives: Vec<TextRange>,
}

impl<'a> RuleContext<'a> {
    pub fn new(tree: &'a SyntaxTree, settings: &'a StyleSettings) -> Self {
        let root = tree.root();
        let directives = root
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| {
                matches!(
                    token.kind(),
                    CsSyntaxKind::PreprocessorDirective | CsSyntaxKind::DisabledText
                )
            })
            .map(|token| token.text_range())
            .collect();
        Self {
            tree,
            root,
            settings,
            directives,
        }
    }

    /// Whether `edit` would change a preprocessor directive or inactive code
    ///
    /// An insertion touches a directive only strictly inside it; inserting
    /// at either end leaves the directive intact.
    pub fn touches_directive(&self, edit: &TextEdit) -> bool {
        let start = edit.range.start();
        let idx = self.directives.partition_point(|range| range.end() <= start);
        let Some(range) = self.directives.get(idx) else {
            return false;
        };
        if edit.range.is_empty() {
            range.start() < start
        } else {
            range.start() < edit.range.end()
        }
    }

    pub fn source(&self) -> &str {
        self.tree.source()
    }

    /// Every token of the file, trivia included, in source order
    pub fn tokens(&self) -> impl Iterator<Item = CsSyntaxToken> {
        self.root
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
    }

    pub fn significant_tokens(&self) -> impl Iterator<Item = CsSyntaxToken> {
        self.tokens().filter(|token| !token.kind().is_trivia())
    }

    pub fn nodes(&self) -> impl Iterator<Item = CsSyntaxNode> {
        self.root.descendants()
    }

    pub fn nodes_of_kind(&self, kind: CsSyntaxKind) -> impl Iterator<Item = CsSyntaxNode> {
        self.nodes().filter(move |node| node.kind() == kind)
    }

    /// 0-based line of a byte offset
    pub fn line(&self, offset: TextSize) -> usize {
        self.tree.line_of(offset)
    }

    /// Whether `first` ends on the line where `second` starts
    pub fn same_line(&self, first: &CsSyntaxToken, second: &CsSyntaxToken) -> bool {
        self.line(first.text_range().end()) == self.line(second.text_range().start())
    }

    /// Offset of the start of the line containing `offset`
    pub fn line_start(&self, offset: TextSize) -> TextSize {
        let line = self.line(offset);
        TextSize::from(self.tree.source_map().line_start(line) as u32)
    }

    /// Leading whitespace of the line containing `offset`
    pub fn line_indent_at(&self, offset: TextSize) -> String {
        let start = usize::from(self.line_start(offset));
        self.source()[start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    pub fn indent_unit(&self) -> String {
        self.settings.indent_unit()
    }

    /// Line break style used by the file, taken from its first line break
    pub fn newline(&self) -> &'static str {
        let source = self.source();
        match source.find(['\n', '\r']) {
            Some(idx) if source[idx..].starts_with("\r\n") => "\r\n",
            Some(idx) if source[idx..].starts_with('\r') => "\r",
            _ => "\n",
        }
    }

    /// Blank lines directly after the line that `token` is on
    ///
    /// Whitespace and comments may follow `token` on its own line.
    pub fn blank_lines_after(&self, token: &CsSyntaxToken) -> Option<BlankLines> {
        let mut next = token.next_token();
        while let Some(t) = next.as_ref() {
            match t.kind() {
                CsSyntaxKind::Whitespace
                | CsSyntaxKind::SingleLineComment
                | CsSyntaxKind::DocComment => next = t.next_token(),
                CsSyntaxKind::MultiLineComment if !t.text().contains(['\n', '\r']) => {
                    next = t.next_token()
                }
                CsSyntaxKind::Newline => break,
                _ => return None,
            }
        }
        let line_end = next?;
        blank_lines_from(&line_end)
    }

    /// Blank lines directly after the line break `line_end`
    pub fn blank_lines_after_break(&self, line_end: &CsSyntaxToken) -> Option<BlankLines> {
        blank_lines_from(line_end)
    }

    /// Blank lines directly before the line that `token` starts
    ///
    /// `token` must be the first token on its line. Blank lines at the very
    /// start of the file are not counted.
    pub fn blank_lines_before(&self, token: &CsSyntaxToken) -> Option<BlankLines> {
        let mut prev = token.prev_token();
        if let Some(t) = prev.as_ref()
            && t.kind() == CsSyntaxKind::Whitespace
        {
            prev = t.prev_token();
        }
        let line_break = prev.filter(|t| t.kind() == CsSyntaxKind::Newline)?;
        let end = line_break.text_range().end();

        let mut count = 0;
        let mut start = end;
        let mut current = line_break;
        loop {
            let mut before = current.prev_token();
            if let Some(t) = before.as_ref()
                && t.kind() == CsSyntaxKind::Whitespace
            {
                before = t.prev_token();
            }
            match before {
                Some(t) if t.kind() == CsSyntaxKind::Newline => {
                    count += 1;
                    start = t.text_range().end();
                    current = t;
                }
                _ => break,
            }
        }

        (count > 0).then(|| BlankLines {
            range: TextRange::new(start, end),
            count,
        })
    }
}

/// Blank lines following the line break `line_end`
fn blank_lines_from(line_end: &CsSyntaxToken) -> Option<BlankLines> {
    let start = line_end.text_range().end();
    let mut end = start;
    let mut count = 0;
    let mut next = line_end.next_token();
    loop {
        if let Some(t) = next.as_ref()
            && t.kind() == CsSyntaxKind::Whitespace
        {
            next = t.next_token();
        }
        match next {
            Some(t) if t.kind() == CsSyntaxKind::Newline => {
                count += 1;
                end = t.text_range().end();
                next = t.next_token();
            }
            _ => break,
        }
    }
    (count > 0).then(|| BlankLines {
        range: TextRange::new(start, end),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_core::ParseOptions;

    fn with_context<R>(source: &str, f: impl FnOnce(&RuleContext) -> R) -> R {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let settings = StyleSettings::default();
        let ctx = RuleContext::new(&tree, &settings);
        f(&ctx)
    }

    fn token(ctx: &RuleContext, text: &str) -> CsSyntaxToken {
        ctx.significant_tokens()
            .find(|t| t.text() == text)
            .expect("token present")
    }

    #[test]
    fn test_touches_directive() {
        let source = "class A\n{\n#if DEBUG\n    int x;\n#endif\n}\n";
        with_context(source, |ctx| {
            let directive = ctx
                .tokens()
                .find(|t| t.kind() == CsSyntaxKind::PreprocessorDirective)
                .expect("directive token")
                .text_range();
            let inside = directive.start() + TextSize::from(1);

            assert!(ctx.touches_directive(&TextEdit::insert(inside, " ")));
            assert!(!ctx.touches_directive(&TextEdit::insert(directive.start(), " ")));
            assert!(ctx.touches_directive(&TextEdit::replace(
                TextRange::new(directive.start() - TextSize::from(1), inside),
                ""
            )));
            let class = token(ctx, "class").text_range();
            assert!(!ctx.touches_directive(&TextEdit::replace(class, "struct")));
        });
    }

    #[test]
    fn test_blank_lines_after() {
        let source = "class A\n{ // c\n\n  \n    int x;\n}\n";
        with_context(source, |ctx| {
            let open = token(ctx, "{");
            let blank = ctx.blank_lines_after(&open).expect("blank lines");
            assert_eq!(blank.count, 2);
            assert_eq!(&source[blank.range], "\n  \n");
            assert!(ctx.blank_lines_after(&token(ctx, ";")).is_none());
        });
    }

    #[test]
    fn test_blank_lines_before() {
        let source = "class A\n{\n    int x;\n\n\n}\n";
        with_context(source, |ctx| {
            let close = token(ctx, "}");
            let blank = ctx.blank_lines_before(&close).expect("blank lines");
            assert_eq!(blank.count, 2);
            assert_eq!(&source[blank.range], "\n\n");
            assert!(ctx.blank_lines_before(&token(ctx, "int")).is_none());
        });
    }

    #[test]
    fn test_line_helpers() {
        let source = "class A\r\n{\r\n\tint x;\r\n}";
        with_context(source, |ctx| {
            assert_eq!(ctx.newline(), "\r\n");
            let int = token(ctx, "int");
            assert_eq!(ctx.line(int.text_range().start()), 2);
            assert_eq!(ctx.line_indent_at(int.text_range().start()), "\t");
            assert!(ctx.same_line(&int, &token(ctx, ";")));
            assert!(!ctx.same_line(&token(ctx, "{"), &int));
        });
    }
}
