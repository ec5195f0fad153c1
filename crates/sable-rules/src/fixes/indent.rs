//! Indentation arithmetic and line-break edits

use rowan::TextRange;
use sable_core::TextEdit;
use sable_core::cst::trivia::{line_indent, prev_significant};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};
use sable_core::StyleSettings;
use sable_core::config::IndentationSettings;

use crate::context::RuleContext;

/// Visual width of an indentation string, expanding tabs to tab stops
pub fn indent_width(indent: &str, tab_size: usize) -> usize {
    let tab_size = tab_size.max(1);
    indent.chars().fold(0, |width, c| match c {
        '\t' => width + tab_size - width % tab_size,
        _ => width + 1,
    })
}

/// Indentation string of `width` columns in the configured style
pub fn make_indent(width: usize, indentation: &IndentationSettings) -> String {
    if indentation.use_tabs {
        let tab_size = indentation.tab_size.max(1);
        format!("{}{}", "\t".repeat(width / tab_size), " ".repeat(width % tab_size))
    } else {
        " ".repeat(width)
    }
}

/// `indent` moved one level deeper
pub fn indent_in(indent: &str, settings: &StyleSettings) -> String {
    format!("{indent}{}", settings.indent_unit())
}

/// Indentation of the construct owning `brace`
///
/// A brace that opens its own node (a block, an initializer, an accessor
/// list) belongs to the parent of that node; braces that are direct children
/// of a declaration or a switch belong to that declaration.
pub fn owner_indent(ctx: &RuleContext, brace: &CsSyntaxToken) -> String {
    let Some(node) = brace.parent() else {
        return line_indent(brace);
    };
    let starts_with_brace = node
        .first_token()
        .is_some_and(|first| first.text_range() == brace.text_range());
    let owner = match node.parent() {
        Some(parent) if starts_with_brace => parent,
        _ => node,
    };
    // Attributes and leading trivia are part of the owner; start at its first significant token
    if first_significant(&owner).is_none() {
        return line_indent(brace);
    }
    construct_indent(ctx, &owner)
}

/// Indentation `node` has once it starts a line of its own
///
/// A declaration or statement sharing its line with earlier code is placed
/// from the structure around it, not from the current line, so fixes
/// computed against the same text agree on the final layout.
pub fn construct_indent(ctx: &RuleContext, node: &CsSyntaxNode) -> String {
    use CsSyntaxKind::*;

    let Some(first) = first_significant(node) else {
        return String::new();
    };
    if starts_line(ctx, &first) {
        return line_indent(&first);
    }
    let Some(parent) = node.parent() else {
        return line_indent(&first);
    };

    match (parent.kind(), node.kind()) {
        (IfStmt, ElseClause) | (ElseClause, IfStmt) | (UsingStmt, UsingStmt) | (FixedStmt, FixedStmt) => {
            return construct_indent(ctx, &parent);
        }
        (
            IfStmt | ElseClause | ForStmt | ForeachStmt | WhileStmt | DoStmt | UsingStmt | LockStmt
            | FixedStmt,
            kind,
        ) if kind.is_statement() && kind != Block => {
            return indent_in(&construct_indent(ctx, &parent), ctx.settings);
        }
        _ => {}
    }

    let kind = node.kind();
    if (kind.is_statement() || kind.is_member_decl() || kind.is_type_decl() || kind == NamespaceDecl)
        && let Some(open) = enclosing_open_brace(&first)
    {
        return indent_in(&owner_indent(ctx, &open), ctx.settings);
    }
    line_indent(&first)
}

fn first_significant(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

/// Innermost `{` whose block contains `token`
fn enclosing_open_brace(token: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let start = token.text_range().start();
    token.parent_ancestors().find_map(|ancestor| {
        let mut open = None;
        for child in ancestor.children_with_tokens().filter_map(|element| element.into_token()) {
            if child.text_range().start() >= start {
                break;
            }
            match child.kind() {
                CsSyntaxKind::LBrace => open = Some(child),
                CsSyntaxKind::RBrace => open = None,
                _ => {}
            }
        }
        open
    })
}

/// Start a new line at `token`, indented by `indent`
///
/// Inline whitespace before `token` is replaced; comments before it stay on
/// the previous line.
pub fn break_before(ctx: &RuleContext, token: &CsSyntaxToken, indent: &str) -> TextEdit {
    let text = format!("{}{indent}", ctx.newline());
    match token.prev_token() {
        Some(prev) if prev.kind() == CsSyntaxKind::Whitespace => {
            TextEdit::replace(prev.text_range(), text)
        }
        _ => TextEdit::insert(token.text_range().start(), text),
    }
}

/// Range of the inline whitespace directly before `token`, if any
pub fn whitespace_before(token: &CsSyntaxToken) -> Option<TextRange> {
    token
        .prev_token()
        .filter(|prev| prev.kind() == CsSyntaxKind::Whitespace)
        .map(|prev| prev.text_range())
}

/// Whether a line break already separates `token` from the previous significant token
pub fn starts_line(ctx: &RuleContext, token: &CsSyntaxToken) -> bool {
    match prev_significant(token) {
        Some(prev) => !ctx.same_line(&prev, token),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_core::ParseOptions;
    use sable_core::cst::SyntaxTree;

    #[test]
    fn test_indent_width_expands_tabs() {
        assert_eq!(indent_width("    ", 4), 4);
        assert_eq!(indent_width("\t", 4), 4);
        assert_eq!(indent_width("  \t", 4), 4);
        assert_eq!(indent_width("\t  ", 8), 10);
    }

    #[test]
    fn test_make_indent() {
        let mut indentation = IndentationSettings::default();
        assert_eq!(make_indent(6, &indentation), "      ");
        indentation.use_tabs = true;
        assert_eq!(make_indent(6, &indentation), "\t  ");
    }

    #[test]
    fn test_owner_indent() {
        let source = "namespace N\n{\n    class A\n    {\n        void M() {\n            if (x) {\n            }\n        }\n    }\n}\n";
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let braces: Vec<CsSyntaxToken> = tree
            .root()
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == CsSyntaxKind::LBrace)
            .collect();
        let settings = StyleSettings::default();
        let ctx = RuleContext::new(&tree, &settings);
        let indents: Vec<String> = braces.iter().map(|brace| owner_indent(&ctx, brace)).collect();
        assert_eq!(indents, vec!["", "    ", "        ", "            "]);
    }

    #[test]
    fn test_owner_indent_follows_structure_on_shared_lines() {
        let source = "class A { void M() { if (x) if (y) { a(); } } }\n";
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let settings = StyleSettings::default();
        let ctx = RuleContext::new(&tree, &settings);
        let braces: Vec<CsSyntaxToken> = ctx
            .significant_tokens()
            .filter(|t| t.kind() == CsSyntaxKind::LBrace)
            .collect();
        let indents: Vec<String> = braces.iter().map(|brace| owner_indent(&ctx, brace)).collect();
        assert_eq!(indents, vec!["", "    ", "            "]);
    }

    #[test]
    fn test_break_before_replaces_inline_whitespace() {
        let source = "void M() /* c */ {";
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let settings = StyleSettings::default();
        let ctx = RuleContext::new(&tree, &settings);
        let brace = ctx
            .significant_tokens()
            .find(|t| t.kind() == CsSyntaxKind::LBrace)
            .unwrap();
        let edit = break_before(&ctx, &brace, "    ");
        let fixed = sable_core::apply_edits(source, &[edit]).unwrap();
        assert_eq!(fixed, "void M() /* c */\n    {");
    }
}
