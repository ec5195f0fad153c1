//! Layout rules (SA15xx)
//!
//! Brace placement, blank lines and the end of the file. Brace rules work
//! on [`BracePair`]s so that every brace-delimited construct (blocks, type
//! bodies, accessor lists, initializers, switch sections and expressions)
//! is treated the same way.

use rowan::{TextRange, TextSize};
use sable_core::cst::trivia::{
    contains_directive, is_first_on_line, is_last_on_line, line_indent, next_significant,
    prev_significant,
};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};
use sable_core::{Applicability, NewlineAtEndOfFile, TextEdit};

use super::{
    BracePair, brace_pairs, directive_between, first_token, last_token, line_end_after,
    matching_close, matching_open, next_on_line, prev_on_line, token_at,
};
use crate::context::RuleContext;
use crate::fixes::indent::whitespace_before;
use crate::fixes::{break_before, construct_indent, indent_in, owner_indent};
use crate::registry::{RuleCategory, RuleDescriptor, Violation};

/// Braces of a multi-line construct must be on their own line
pub const BRACES_ON_OWN_LINE: &str = "SA1500";
/// Statement blocks must not be written on a single line
pub const BLOCK_ON_SINGLE_LINE: &str = "SA1501";
/// Type and member bodies must not be written on a single line
pub const ELEMENT_ON_SINGLE_LINE: &str = "SA1502";
/// Embedded statements must be wrapped in braces
pub const BRACES_OMITTED: &str = "SA1503";
pub const BLANK_AFTER_OPEN_BRACE: &str = "SA1505";
pub const MULTIPLE_BLANK_LINES: &str = "SA1507";
pub const BLANK_BEFORE_CLOSE_BRACE: &str = "SA1508";
pub const BLANK_AFTER_COMMENT: &str = "SA1512";
/// A closing brace must be followed by a blank line
pub const MISSING_BLANK_AFTER_CLOSE_BRACE: &str = "SA1513";
pub const MISSING_BLANK_BEFORE_COMMENT: &str = "SA1515";
/// Adjacent elements must be separated by a blank line
pub const MISSING_BLANK_BETWEEN_ELEMENTS: &str = "SA1516";
pub const LEADING_BLANK_LINES: &str = "SA1517";
pub const TRAILING_NEWLINE: &str = "SA1518";

pub fn rules() -> Vec<RuleDescriptor> {
    use RuleCategory::Layout;
    vec![
        RuleDescriptor::new(
            BRACES_ON_OWN_LINE,
            "braces-for-multi-line-statements-must-not-share-line",
            Layout,
            "Braces for multi-line statements should not share line",
            check_brace_placement,
        )
        .describe("The opening or closing brace of a multi-line construct shares its line with other code.")
        .with_fix(fix_brace_placement, Applicability::Always),
        RuleDescriptor::new(
            BLOCK_ON_SINGLE_LINE,
            "statement-must-not-be-on-single-line",
            Layout,
            "Statement should not be on a single line",
            check_single_line_blocks,
        )
        .describe("A statement block is written on a single line.")
        .with_fix(fix_expand_braces, Applicability::Always),
        RuleDescriptor::new(
            ELEMENT_ON_SINGLE_LINE,
            "element-must-not-be-on-single-line",
            Layout,
            "Element should not be on a single line",
            check_single_line_elements,
        )
        .describe("A type, namespace, method or property body is written on a single line.")
        .with_fix(fix_expand_braces, Applicability::Always),
        RuleDescriptor::new(
            BRACES_OMITTED,
            "braces-must-not-be-omitted",
            Layout,
            "Braces should not be omitted",
            check_omitted_braces,
        )
        .describe("The body of an if, else, for, foreach, while, do, using, lock or fixed statement is not wrapped in braces.")
        .with_fix(fix_omitted_braces, Applicability::Always),
        RuleDescriptor::new(
            BLANK_AFTER_OPEN_BRACE,
            "opening-braces-must-not-be-followed-by-blank-line",
            Layout,
            "An opening brace should not be followed by a blank line",
            check_blank_after_open_brace,
        )
        .with_fix(fix_blank_after_open_brace, Applicability::Always),
        RuleDescriptor::new(
            MULTIPLE_BLANK_LINES,
            "code-must-not-contain-multiple-blank-lines-in-a-row",
            Layout,
            "Code should not contain multiple blank lines in a row",
            check_multiple_blank_lines,
        )
        .with_fix(fix_multiple_blank_lines, Applicability::Always),
        RuleDescriptor::new(
            BLANK_BEFORE_CLOSE_BRACE,
            "closing-braces-must-not-be-preceded-by-blank-line",
            Layout,
            "A closing brace should not be preceded by a blank line",
            check_blank_before_close_brace,
        )
        .with_fix(fix_blank_before_close_brace, Applicability::Always),
        RuleDescriptor::new(
            BLANK_AFTER_COMMENT,
            "single-line-comments-must-not-be-followed-by-blank-line",
            Layout,
            "Single-line comments should not be followed by blank line",
            check_blank_after_comment,
        )
        .with_fix(fix_blank_after_comment, Applicability::Always),
        RuleDescriptor::new(
            MISSING_BLANK_AFTER_CLOSE_BRACE,
            "closing-brace-must-be-followed-by-blank-line",
            Layout,
            "Closing brace should be followed by blank line",
            check_missing_blank_after_close_brace,
        )
        .with_fix(fix_missing_blank_after_close_brace, Applicability::Always),
        RuleDescriptor::new(
            MISSING_BLANK_BEFORE_COMMENT,
            "single-line-comment-must-be-preceded-by-blank-line",
            Layout,
            "Single-line comment should be preceded by blank line",
            check_missing_blank_before_comment,
        )
        .with_fix(fix_missing_blank_before_comment, Applicability::Always),
        RuleDescriptor::new(
            MISSING_BLANK_BETWEEN_ELEMENTS,
            "elements-must-be-separated-by-blank-line",
            Layout,
            "Elements should be separated by blank line",
            check_elements_separated,
        )
        .describe("Adjacent namespace, type and member declarations are not separated by a blank line. Consecutive fields, events, using directives and extern aliases are exempt.")
        .with_fix(fix_elements_separated, Applicability::Always),
        RuleDescriptor::new(
            LEADING_BLANK_LINES,
            "code-must-not-contain-blank-lines-at-start-of-file",
            Layout,
            "Code should not contain blank lines at start of file",
            check_leading_blank_lines,
        )
        .with_fix(fix_delete_range, Applicability::Always),
        RuleDescriptor::new(
            TRAILING_NEWLINE,
            "code-must-not-contain-blank-lines-at-end-of-file",
            Layout,
            "{0}",
            check_trailing_newline,
        )
        .describe("The file does not end as configured by layoutRules.newlineAtEndOfFile.")
        .with_fix(fix_trailing_newline, Applicability::Always),
    ]
}

fn fix_delete_range(_ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    Some(vec![TextEdit::delete(violation.range)])
}

// ---- SA1500 --------------------------------------------------------------

fn check_brace_placement(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for pair in brace_pairs(ctx) {
        if ctx.same_line(&pair.open, &pair.close) {
            continue;
        }
        if open_brace_shares_line(ctx, &pair.open) {
            violations.push(Violation::new(pair.open.text_range()));
        }
        if close_brace_shares_line(ctx, &pair.close) {
            violations.push(Violation::new(pair.close.text_range()));
        }
    }
    violations
}

fn open_brace_shares_line(ctx: &RuleContext, open: &CsSyntaxToken) -> bool {
    prev_on_line(ctx, open).is_some() || next_on_line(ctx, open).is_some()
}

fn close_brace_shares_line(ctx: &RuleContext, close: &CsSyntaxToken) -> bool {
    prev_on_line(ctx, close).is_some()
        || next_on_line(ctx, close).is_some_and(|next| !may_follow_close_brace(ctx, &next))
}

/// Tokens allowed on the line of a multi-line construct's closing brace
fn may_follow_close_brace(ctx: &RuleContext, next: &CsSyntaxToken) -> bool {
    match next.kind() {
        CsSyntaxKind::RParen | CsSyntaxKind::Comma | CsSyntaxKind::Semicolon => true,
        CsSyntaxKind::WhileKw => {
            ctx.settings.layout_rules.allow_do_while_on_closing_brace
                && next.parent().is_some_and(|p| p.kind() == CsSyntaxKind::DoStmt)
        }
        _ => false,
    }
}

fn fix_brace_placement(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let brace = token_at(ctx, violation.range)?;
    let mut edits = Vec::new();
    match brace.kind() {
        CsSyntaxKind::LBrace => {
            let indent = owner_indent(ctx, &brace);
            if prev_on_line(ctx, &brace).is_some() {
                edits.push(break_before(ctx, &brace, &indent));
            }
            if let Some(next) = next_on_line(ctx, &brace) {
                edits.push(break_before(ctx, &next, &indent_in(&indent, ctx.settings)));
            }
        }
        CsSyntaxKind::RBrace => {
            let indent = owner_indent(ctx, &matching_open(&brace)?);
            if prev_on_line(ctx, &brace).is_some() {
                edits.push(break_before(ctx, &brace, &indent));
            }
            if let Some(next) = next_on_line(ctx, &brace)
                && !may_follow_close_brace(ctx, &next)
            {
                // A following closing brace lines up with its own owner
                let next_indent = match next.kind() {
                    CsSyntaxKind::RBrace => owner_indent(ctx, &matching_open(&next)?),
                    _ => indent,
                };
                edits.push(break_before(ctx, &next, &next_indent));
            }
        }
        _ => return None,
    }
    (!edits.is_empty()).then_some(edits)
}

// ---- SA1501 / SA1502 -----------------------------------------------------

/// Statements whose block bodies SA1501 looks at
const BLOCK_OWNERS: &[CsSyntaxKind] = &[
    CsSyntaxKind::IfStmt,
    CsSyntaxKind::ElseClause,
    CsSyntaxKind::WhileStmt,
    CsSyntaxKind::DoStmt,
    CsSyntaxKind::ForStmt,
    CsSyntaxKind::ForeachStmt,
    CsSyntaxKind::UsingStmt,
    CsSyntaxKind::LockStmt,
    CsSyntaxKind::FixedStmt,
    CsSyntaxKind::TryStmt,
    CsSyntaxKind::CatchClause,
    CsSyntaxKind::FinallyClause,
    CsSyntaxKind::CheckedStmt,
    CsSyntaxKind::UnsafeStmt,
    CsSyntaxKind::Block,
    CsSyntaxKind::SwitchSection,
    CsSyntaxKind::LabeledStmt,
];

const METHOD_BODY_OWNERS: &[CsSyntaxKind] = &[
    CsSyntaxKind::MethodDecl,
    CsSyntaxKind::ConstructorDecl,
    CsSyntaxKind::DestructorDecl,
    CsSyntaxKind::OperatorDecl,
    CsSyntaxKind::ConversionOperatorDecl,
    CsSyntaxKind::LocalFunctionStmt,
];

fn single_line_pairs(ctx: &RuleContext) -> impl Iterator<Item = (BracePair, CsSyntaxNode)> {
    brace_pairs(ctx).into_iter().filter_map(|pair| {
        if !ctx.same_line(&pair.open, &pair.close) {
            return None;
        }
        let node = pair.open.parent()?;
        (!contains_directive(&node)).then_some((pair, node))
    })
}

fn check_single_line_blocks(ctx: &RuleContext) -> Vec<Violation> {
    single_line_pairs(ctx)
        .filter(|(_, node)| {
            node.kind() == CsSyntaxKind::Block
                && node.parent().is_some_and(|owner| BLOCK_OWNERS.contains(&owner.kind()))
        })
        .map(|(pair, _)| Violation::new(pair.open.text_range()))
        .collect()
}

fn check_single_line_elements(ctx: &RuleContext) -> Vec<Violation> {
    single_line_pairs(ctx)
        .filter(|(_, node)| is_element_body(node))
        .map(|(pair, _)| Violation::new(pair.open.text_range()))
        .collect()
}

fn is_element_body(node: &CsSyntaxNode) -> bool {
    match node.kind() {
        kind if kind.is_type_decl() => true,
        CsSyntaxKind::NamespaceDecl => true,
        CsSyntaxKind::Block => node
            .parent()
            .is_some_and(|owner| METHOD_BODY_OWNERS.contains(&owner.kind())),
        // Auto-properties (`{ get; set; }`) stay on one line
        CsSyntaxKind::AccessorList => {
            let mut accessors = node
                .children()
                .filter(|child| child.kind() == CsSyntaxKind::Accessor)
                .peekable();
            accessors.peek().is_some()
                && accessors.all(|accessor| {
                    accessor.children().any(|child| child.kind() == CsSyntaxKind::Block)
                })
        }
        _ => false,
    }
}

/// Spread `{ body }` over separate lines
fn fix_expand_braces(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let open = token_at(ctx, violation.range)?;
    let close = matching_close(&open)?;
    let indent = owner_indent(ctx, &open);

    let mut edits = Vec::new();
    if prev_on_line(ctx, &open).is_some() {
        edits.push(break_before(ctx, &open, &indent));
    }
    let first = next_significant(&open)?;
    if first != close {
        edits.push(break_before(ctx, &first, &indent_in(&indent, ctx.settings)));
    }
    edits.push(break_before(ctx, &close, &indent));
    Some(edits)
}

// ---- SA1503 --------------------------------------------------------------

const EMBEDDING_STATEMENTS: &[CsSyntaxKind] = &[
    CsSyntaxKind::IfStmt,
    CsSyntaxKind::ElseClause,
    CsSyntaxKind::ForStmt,
    CsSyntaxKind::ForeachStmt,
    CsSyntaxKind::WhileStmt,
    CsSyntaxKind::DoStmt,
    CsSyntaxKind::UsingStmt,
    CsSyntaxKind::LockStmt,
    CsSyntaxKind::FixedStmt,
];

/// The statement embedded in an `if`, loop, `using`, `lock` or `fixed`
fn embedded_statement(owner: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    owner.children().find(|child| child.kind().is_statement())
}

fn needs_braces(owner: &CsSyntaxNode, child: &CsSyntaxNode) -> bool {
    use CsSyntaxKind::*;
    !matches!(
        (owner.kind(), child.kind()),
        (_, Block) | (ElseClause, IfStmt) | (UsingStmt, UsingStmt) | (FixedStmt, FixedStmt)
    )
}

fn check_omitted_braces(ctx: &RuleContext) -> Vec<Violation> {
    ctx.nodes()
        .filter(|node| EMBEDDING_STATEMENTS.contains(&node.kind()))
        .filter_map(|owner| {
            let child = embedded_statement(&owner)?;
            needs_braces(&owner, &child).then(|| Violation::new(child.text_range()))
        })
        .collect()
}

fn fix_omitted_braces(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let child = ctx
        .root
        .covering_element(violation.range)
        .ancestors()
        .find(|node| node.text_range() == violation.range && node.kind().is_statement())?;
    let owner = child.parent()?;
    let indent = construct_indent(ctx, &owner);
    let inner = indent_in(&indent, ctx.settings);
    let nl = ctx.newline();

    let child_first = first_token(&child)?;
    let child_last = last_token(&child)?;
    let header_last = prev_significant(&child_first)?;

    let mut edits = Vec::with_capacity(2);
    if ctx.same_line(&header_last, &child_first) {
        let text = format!("{nl}{indent}{{{nl}{inner}");
        edits.push(match whitespace_before(&child_first) {
            Some(range) => TextEdit::replace(range, text),
            None => TextEdit::insert(child_first.text_range().start(), text),
        });
    } else {
        let line_end = line_end_after(&header_last)?;
        edits.push(TextEdit::insert(
            line_end.text_range().start(),
            format!("{nl}{indent}{{"),
        ));
    }

    let closing = format!("{nl}{indent}}}");
    let at = match (next_on_line(ctx, &child_last), line_end_after(&child_last)) {
        (None, Some(line_end)) => line_end.text_range().start(),
        _ => child_last.text_range().end(),
    };
    edits.push(TextEdit::insert(at, closing));
    Some(edits)
}

// ---- SA1505 / SA1508 / SA1512 --------------------------------------------

fn check_blank_after_open_brace(ctx: &RuleContext) -> Vec<Violation> {
    brace_pairs(ctx)
        .into_iter()
        .filter(|pair| ctx.blank_lines_after(&pair.open).is_some())
        .map(|pair| Violation::new(pair.open.text_range()))
        .collect()
}

fn fix_blank_after_open_brace(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let open = token_at(ctx, violation.range)?;
    let blank = ctx.blank_lines_after(&open)?;
    Some(vec![TextEdit::delete(blank.range)])
}

fn check_blank_before_close_brace(ctx: &RuleContext) -> Vec<Violation> {
    brace_pairs(ctx)
        .into_iter()
        .filter(|pair| is_first_on_line(&pair.close) && ctx.blank_lines_before(&pair.close).is_some())
        .map(|pair| Violation::new(pair.close.text_range()))
        .collect()
}

fn fix_blank_before_close_brace(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let close = token_at(ctx, violation.range)?;
    let blank = ctx.blank_lines_before(&close)?;
    Some(vec![TextEdit::delete(blank.range)])
}

/// A `//` comment on a line of its own that is not part of the file header
fn is_standalone_comment(token: &CsSyntaxToken) -> bool {
    token.kind() == CsSyntaxKind::SingleLineComment
        && !token.text().starts_with("////")
        && is_first_on_line(token)
        && prev_significant(token).is_some()
}

fn check_blank_after_comment(ctx: &RuleContext) -> Vec<Violation> {
    ctx.tokens()
        .filter(is_standalone_comment)
        .filter(|comment| ctx.blank_lines_after(comment).is_some())
        .map(|comment| Violation::new(comment.text_range()))
        .collect()
}

fn fix_blank_after_comment(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let comment = token_at(ctx, violation.range)?;
    let blank = ctx.blank_lines_after(&comment)?;
    Some(vec![TextEdit::delete(blank.range)])
}

// ---- SA1507 --------------------------------------------------------------

/// Whether the line ended by `line_break` has any content
fn ends_content_line(line_break: &CsSyntaxToken) -> bool {
    let mut prev = line_break.prev_token();
    while let Some(token) = prev {
        match token.kind() {
            CsSyntaxKind::Whitespace => prev = token.prev_token(),
            CsSyntaxKind::Newline => return false,
            _ => return true,
        }
    }
    false
}

/// First non-whitespace token starting at or after `offset`
fn token_from(ctx: &RuleContext, offset: TextSize) -> Option<CsSyntaxToken> {
    let token = ctx.root.token_at_offset(offset).right_biased()?;
    if token.text_range().start() < offset {
        return token.next_token();
    }
    match token.kind() {
        CsSyntaxKind::Whitespace => token.next_token(),
        _ => Some(token),
    }
}

fn check_multiple_blank_lines(ctx: &RuleContext) -> Vec<Violation> {
    ctx.tokens()
        .filter(|token| token.kind() == CsSyntaxKind::Newline && ends_content_line(token))
        .filter_map(|line_break| {
            let blank = ctx.blank_lines_after_break(&line_break)?;
            if blank.count < 2 {
                return None;
            }
            // Trailing blank lines are reported by SA1518
            token_from(ctx, blank.range.end())?;
            let first_blank = token_from(ctx, blank.range.start())?;
            Some(Violation::new(TextRange::new(
                blank.range.start(),
                first_blank.text_range().end(),
            )))
        })
        .collect()
}

fn fix_multiple_blank_lines(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let line_break = ctx
        .root
        .token_at_offset(violation.range.start())
        .left_biased()
        .filter(|token| token.kind() == CsSyntaxKind::Newline)?;
    let blank = ctx.blank_lines_after_break(&line_break)?;
    Some(vec![TextEdit::delete(TextRange::new(
        violation.range.end(),
        blank.range.end(),
    ))])
}

// ---- SA1513 --------------------------------------------------------------

fn check_missing_blank_after_close_brace(ctx: &RuleContext) -> Vec<Violation> {
    brace_pairs(ctx)
        .into_iter()
        .filter(|pair| !ctx.same_line(&pair.open, &pair.close) && is_last_on_line(&pair.close))
        .filter(|pair| {
            let Some(next) = next_significant(&pair.close) else {
                return false;
            };
            !may_directly_follow_block(&next)
                && !directive_between(&pair.close, &next)
                && ctx.blank_lines_after(&pair.close).is_none()
        })
        .map(|pair| Violation::new(pair.close.text_range()))
        .collect()
}

/// Tokens that may start the line right after a closing brace
fn may_directly_follow_block(next: &CsSyntaxToken) -> bool {
    use CsSyntaxKind::*;
    let parent_kind = next.parent().map(|p| p.kind());
    match next.kind() {
        RBrace | ElseKw | CatchKw | FinallyKw | RParen | RBracket | Comma | Semicolon => true,
        WhileKw => parent_kind == Some(DoStmt),
        CaseKw | DefaultKw => matches!(parent_kind, Some(CaseLabel | DefaultLabel)),
        Ident => {
            matches!(next.text(), "get" | "set" | "init" | "add" | "remove")
                && parent_kind == Some(Accessor)
        }
        _ => false,
    }
}

fn fix_missing_blank_after_close_brace(
    ctx: &RuleContext,
    violation: &Violation,
) -> Option<Vec<TextEdit>> {
    let close = token_at(ctx, violation.range)?;
    let line_end = line_end_after(&close)?;
    Some(vec![TextEdit::insert(line_end.text_range().end(), ctx.newline())])
}

// ---- SA1515 --------------------------------------------------------------

enum PreviousLine {
    Blank,
    Comment,
    Directive,
    Code,
}

fn previous_line(comment: &CsSyntaxToken) -> Option<PreviousLine> {
    let mut prev = comment.prev_token();
    if let Some(token) = prev.as_ref()
        && token.kind() == CsSyntaxKind::Whitespace
    {
        prev = token.prev_token();
    }
    let line_break = prev.filter(|token| token.kind() == CsSyntaxKind::Newline)?;

    let mut before = line_break.prev_token();
    if let Some(token) = before.as_ref()
        && token.kind() == CsSyntaxKind::Whitespace
    {
        before = token.prev_token();
    }
    let line = match before {
        None => PreviousLine::Blank,
        Some(token) => match token.kind() {
            CsSyntaxKind::Newline => PreviousLine::Blank,
            CsSyntaxKind::PreprocessorDirective | CsSyntaxKind::DisabledText => {
                PreviousLine::Directive
            }
            kind if kind.is_comment() && is_first_on_line(&token) => PreviousLine::Comment,
            _ => PreviousLine::Code,
        },
    };
    Some(line)
}

fn check_missing_blank_before_comment(ctx: &RuleContext) -> Vec<Violation> {
    ctx.tokens()
        .filter(is_standalone_comment)
        .filter(|comment| matches!(previous_line(comment), Some(PreviousLine::Code)))
        .filter(|comment| {
            prev_significant(comment).is_some_and(|prev| match prev.kind() {
                CsSyntaxKind::LBrace
                | CsSyntaxKind::LParen
                | CsSyntaxKind::LBracket
                | CsSyntaxKind::Comma => false,
                CsSyntaxKind::Colon => !prev.parent().is_some_and(|p| {
                    matches!(p.kind(), CsSyntaxKind::CaseLabel | CsSyntaxKind::DefaultLabel)
                }),
                _ => true,
            })
        })
        .map(|comment| Violation::new(comment.text_range()))
        .collect()
}

fn fix_missing_blank_before_comment(
    ctx: &RuleContext,
    violation: &Violation,
) -> Option<Vec<TextEdit>> {
    let start = ctx.line_start(violation.range.start());
    Some(vec![TextEdit::insert(start, ctx.newline())])
}

// ---- SA1516 --------------------------------------------------------------

fn is_element_container(kind: CsSyntaxKind) -> bool {
    matches!(
        kind,
        CsSyntaxKind::CompilationUnit
            | CsSyntaxKind::NamespaceDecl
            | CsSyntaxKind::FileScopedNamespaceDecl
            | CsSyntaxKind::ClassDecl
            | CsSyntaxKind::StructDecl
            | CsSyntaxKind::InterfaceDecl
            | CsSyntaxKind::RecordDecl
    )
}

fn is_element(kind: CsSyntaxKind) -> bool {
    kind.is_member_decl()
        || matches!(
            kind,
            CsSyntaxKind::UsingDirective
                | CsSyntaxKind::ExternAlias
                | CsSyntaxKind::NamespaceDecl
                | CsSyntaxKind::FileScopedNamespaceDecl
        )
}

/// Consecutive declarations of these kinds may be written without a blank line
fn may_be_grouped(kind: CsSyntaxKind) -> bool {
    matches!(
        kind,
        CsSyntaxKind::FieldDecl
            | CsSyntaxKind::EventFieldDecl
            | CsSyntaxKind::UsingDirective
            | CsSyntaxKind::ExternAlias
    )
}

fn blank_line_between(first: &CsSyntaxToken, last: &CsSyntaxToken) -> bool {
    let mut after_break = false;
    let mut next = first.next_token();
    while let Some(token) = next {
        if &token == last {
            return false;
        }
        match token.kind() {
            CsSyntaxKind::Newline if after_break => return true,
            CsSyntaxKind::Newline => after_break = true,
            CsSyntaxKind::Whitespace => {}
            _ => after_break = false,
        }
        next = token.next_token();
    }
    false
}

fn check_elements_separated(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for container in ctx.nodes().filter(|node| is_element_container(node.kind())) {
        let elements: Vec<CsSyntaxNode> = container
            .children()
            .filter(|child| is_element(child.kind()))
            .collect();
        for pair in elements.windows(2) {
            let (previous, element) = (&pair[0], &pair[1]);
            if previous.kind() == element.kind() && may_be_grouped(previous.kind()) {
                continue;
            }
            let (Some(previous_last), Some(element_first)) = (last_token(previous), first_token(element))
            else {
                continue;
            };
            if directive_between(&previous_last, &element_first)
                || blank_line_between(&previous_last, &element_first)
            {
                continue;
            }
            violations.push(Violation::new(element_first.text_range()));
        }
    }
    violations
}

fn fix_elements_separated(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let element_first = token_at(ctx, violation.range)?;
    let previous_last = prev_significant(&element_first)?;
    let nl = ctx.newline();
    if ctx.same_line(&previous_last, &element_first) {
        let text = format!("{nl}{nl}{}", line_indent(&element_first));
        let edit = match whitespace_before(&element_first) {
            Some(range) => TextEdit::replace(range, text),
            None => TextEdit::insert(element_first.text_range().start(), text),
        };
        return Some(vec![edit]);
    }
    let line_end = line_end_after(&previous_last)?;
    Some(vec![TextEdit::insert(line_end.text_range().end(), nl)])
}

// ---- SA1517 / SA1518 -----------------------------------------------------

fn check_leading_blank_lines(ctx: &RuleContext) -> Vec<Violation> {
    let mut end = None;
    let mut next = ctx.root.first_token();
    let mut has_content = false;
    while let Some(token) = next {
        match token.kind() {
            CsSyntaxKind::Whitespace => {}
            CsSyntaxKind::Newline => end = Some(token.text_range().end()),
            _ => {
                has_content = true;
                break;
            }
        }
        next = token.next_token();
    }
    match end {
        Some(end) if has_content => {
            vec![Violation::new(TextRange::new(TextSize::from(0), end))]
        }
        _ => Vec::new(),
    }
}

fn count_line_breaks(text: &str) -> usize {
    text.replace("\r\n", "\n").matches(['\n', '\r']).count()
}

fn check_trailing_newline(ctx: &RuleContext) -> Vec<Violation> {
    let source = ctx.source();
    let content_end = source.trim_end().len();
    if content_end == 0 {
        return Vec::new();
    }
    let breaks = count_line_breaks(&source[content_end..]);
    let message = match ctx.settings.layout_rules.newline_at_end_of_file {
        NewlineAtEndOfFile::Allow if breaks >= 2 => "File may not have blank lines at the end",
        NewlineAtEndOfFile::Require if breaks != 1 => {
            "File is required to end with a single newline character"
        }
        NewlineAtEndOfFile::Omit if breaks >= 1 => "File may not end with a newline character",
        _ => return Vec::new(),
    };
    let range = TextRange::new(
        TextSize::from(content_end as u32),
        TextSize::from(source.len() as u32),
    );
    vec![Violation::new(range).with_args([message])]
}

fn fix_trailing_newline(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let replacement = match ctx.settings.layout_rules.newline_at_end_of_file {
        NewlineAtEndOfFile::Omit => "",
        NewlineAtEndOfFile::Allow | NewlineAtEndOfFile::Require => ctx.newline(),
    };
    Some(vec![TextEdit::replace(violation.range, replacement)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{check, check_with, fix_first, fix_first_with, fix_until_clean, positions, rule};
    use sable_core::StyleSettings;

    fn layout(id: &str) -> RuleDescriptor {
        rule(rules(), id)
    }

    #[test]
    fn test_brace_sharing_line_with_signature() {
        let rule = layout(BRACES_ON_OWN_LINE);
        let source = "public class Foo\n{\n    public void Method1() {\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(3, 27)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "public class Foo\n{\n    public void Method1()\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_single_line_body_is_not_a_placement_violation() {
        let rule = layout(BRACES_ON_OWN_LINE);
        assert!(check(&rule, "class A\n{\n    void Bar() { }\n}\n").is_empty());
    }

    #[test]
    fn test_if_else_braces_converge() {
        let rule = layout(BRACES_ON_OWN_LINE);
        let source = "class A\n{\n    void M()\n    {\n        if (x) {\n            a();\n        } else {\n            b();\n        }\n    }\n}\n";
        let expected = "class A\n{\n    void M()\n    {\n        if (x)\n        {\n            a();\n        }\n        else\n        {\n            b();\n        }\n    }\n}\n";
        assert_eq!(fix_until_clean(&rule, source), expected);
        assert!(check(&rule, expected).is_empty());
    }

    #[test]
    fn test_do_while_on_closing_brace_setting() {
        let rule = layout(BRACES_ON_OWN_LINE);
        let source = "class A\n{\n    void M()\n    {\n        do\n        {\n            a();\n        } while (x);\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(8, 9)]);

        let mut settings = StyleSettings::default();
        settings.layout_rules.allow_do_while_on_closing_brace = true;
        assert!(check_with(&rule, source, &settings).is_empty());
    }

    #[test]
    fn test_single_line_statement_block_is_expanded() {
        let rule = layout(BLOCK_ON_SINGLE_LINE);
        let source = "class A\n{\n    void M()\n    {\n        if (x) { return; }\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(5, 16)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    void M()\n    {\n        if (x)\n        {\n            return;\n        }\n    }\n}\n"
        );
        // Lambda bodies are not statement blocks
        assert!(check(&rule, "class A\n{\n    void M()\n    {\n        F(() => { return; });\n    }\n}\n").is_empty());
    }

    #[test]
    fn test_single_line_element_keeps_comments_in_place() {
        let rule = layout(ELEMENT_ON_SINGLE_LINE);
        let source = "public class Foo\n{\n    public int Bar() /* TR1 */ { /* TR2 */ return 0; /* TR3 */ } /* TR4 */\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "public class Foo\n{\n    public int Bar() /* TR1 */\n    { /* TR2 */\n        return 0; /* TR3 */\n    } /* TR4 */\n}\n"
        );
        assert!(check(&rule, "class A\n{\n    int P { get; set; }\n}\n").is_empty());
    }

    #[test]
    fn test_omitted_braces_on_same_line() {
        let rule = layout(BRACES_OMITTED);
        let source = "class A\n{\n    void M()\n    {\n        if (x) return;\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(5, 16)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    void M()\n    {\n        if (x)\n        {\n            return;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_omitted_braces_on_next_line() {
        let rule = layout(BRACES_OMITTED);
        let source = "class A\n{\n    void M()\n    {\n        while (x)\n            Step();\n    }\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    void M()\n    {\n        while (x)\n        {\n            Step();\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_else_if_and_stacked_usings_need_no_braces() {
        let rule = layout(BRACES_OMITTED);
        let source = "class A\n{\n    void M()\n    {\n        if (a) { } else if (b) { }\n        using (x)\n        using (y)\n        {\n        }\n    }\n}\n";
        assert!(check(&rule, source).is_empty());
    }

    #[test]
    fn test_blank_lines_inside_braces() {
        let after_open = layout(BLANK_AFTER_OPEN_BRACE);
        let source = "class A\n{\n\n    int x;\n}\n";
        assert_eq!(positions(&after_open, source), vec![(2, 1)]);
        assert_eq!(fix_first(&after_open, source).unwrap(), "class A\n{\n    int x;\n}\n");

        let before_close = layout(BLANK_BEFORE_CLOSE_BRACE);
        let source = "class A\n{\n    int x;\n\n}\n";
        assert_eq!(positions(&before_close, source), vec![(5, 1)]);
        assert_eq!(fix_first(&before_close, source).unwrap(), "class A\n{\n    int x;\n}\n");
    }

    #[test]
    fn test_multiple_blank_lines_collapse_to_one() {
        let rule = layout(MULTIPLE_BLANK_LINES);
        let source = "class A\n{\n    int x;\n\n\n    int y;\n}\n";
        assert_eq!(positions(&rule, source), vec![(4, 1)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    int x;\n\n    int y;\n}\n"
        );
        assert!(check(&rule, "class A\n{\n}\n\n\n").is_empty());
    }

    #[test]
    fn test_comment_followed_by_blank_line() {
        let rule = layout(BLANK_AFTER_COMMENT);
        let source = "class A\n{\n    // note\n\n    int x;\n}\n";
        assert_eq!(positions(&rule, source), vec![(3, 5)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    // note\n    int x;\n}\n"
        );
        // File header comments are exempt
        assert!(check(&rule, "// header\n\nclass A\n{\n}\n").is_empty());
    }

    #[test]
    fn test_closing_brace_followed_by_code() {
        let rule = layout(MISSING_BLANK_AFTER_CLOSE_BRACE);
        let source = "class A\n{\n    void M()\n    {\n    }\n    void N()\n    {\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(5, 5)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    void M()\n    {\n    }\n\n    void N()\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_closing_brace_exemptions() {
        let rule = layout(MISSING_BLANK_AFTER_CLOSE_BRACE);
        let source = "class A\n{\n    int P\n    {\n        get\n        {\n            return 1;\n        }\n        set\n        {\n        }\n    }\n\n    void M()\n    {\n        if (x)\n        {\n        }\n        else\n        {\n        }\n\n        try\n        {\n        }\n        finally\n        {\n        }\n    }\n}\n";
        assert!(check(&rule, source).is_empty());
    }

    #[test]
    fn test_comment_needs_blank_line_before() {
        let rule = layout(MISSING_BLANK_BEFORE_COMMENT);
        let source = "class A\n{\n    // first\n    int x;\n    // second\n    int y;\n}\n";
        assert_eq!(positions(&rule, source), vec![(5, 5)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    // first\n    int x;\n\n    // second\n    int y;\n}\n"
        );
    }

    #[test]
    fn test_elements_separated_by_blank_line() {
        let rule = layout(MISSING_BLANK_BETWEEN_ELEMENTS);
        let source = "using System;\nclass A\n{\n    int x;\n    int y;\n    void M()\n    {\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(2, 1), (6, 5)]);
        assert_eq!(
            fix_until_clean(&rule, source),
            "using System;\n\nclass A\n{\n    int x;\n    int y;\n\n    void M()\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_elements_on_one_line_are_split() {
        let rule = layout(MISSING_BLANK_BETWEEN_ELEMENTS);
        let source = "class A\n{\n    void M() { } void N() { }\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class A\n{\n    void M() { }\n\n    void N() { }\n}\n"
        );
    }

    #[test]
    fn test_leading_blank_lines() {
        let rule = layout(LEADING_BLANK_LINES);
        let source = "\n  \nclass A\n{\n}\n";
        assert_eq!(positions(&rule, source), vec![(1, 1)]);
        assert_eq!(fix_first(&rule, source).unwrap(), "class A\n{\n}\n");
        assert!(check(&rule, "\n\n").is_empty());
    }

    #[test]
    fn test_trailing_newline_policies() {
        let rule = layout(TRAILING_NEWLINE);
        assert!(check(&rule, "class A\n{\n}\n").is_empty());
        assert_eq!(fix_first(&rule, "class A\n{\n}\n\n\n").unwrap(), "class A\n{\n}\n");

        let mut settings = StyleSettings::default();
        settings.layout_rules.newline_at_end_of_file = NewlineAtEndOfFile::Require;
        let violations = check_with(&rule, "class A\n{\n}", &settings);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            rule.format_message(&violations[0].args),
            "File is required to end with a single newline character"
        );
        assert_eq!(
            fix_first_with(&rule, "class A\n{\n}", &settings).unwrap(),
            "class A\n{\n}\n"
        );

        settings.layout_rules.newline_at_end_of_file = NewlineAtEndOfFile::Omit;
        assert_eq!(
            fix_first_with(&rule, "class A\n{\n}\r\n", &settings).unwrap(),
            "class A\n{\n}"
        );
    }
}
