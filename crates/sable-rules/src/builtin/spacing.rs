//! Spacing rules (SA10xx)
//!
//! Token spacing rules report with two message arguments: `{0}` is either
//! empty or `" not"`, and `{1}` names the side (`"preceded"` or
//! `"followed"`). [`fix_spacing`] reads them back to insert or remove the
//! space.

use rowan::{TextRange, TextSize};
use sable_core::cst::trivia::{next_significant, prev_significant};
use sable_core::cst::{CsSyntaxKind, CsSyntaxToken};
use sable_core::{Applicability, TextEdit};

use super::token_at;
use crate::context::RuleContext;
use crate::fixes::indent::whitespace_before;
use crate::fixes::indent_width;
use crate::registry::{RuleCategory, RuleDescriptor, Violation};

pub const KEYWORD_SPACING: &str = "SA1000";
pub const COMMA_SPACING: &str = "SA1001";
pub const OPENING_PARENTHESIS_SPACING: &str = "SA1008";
pub const CLOSING_PARENTHESIS_SPACING: &str = "SA1009";
pub const OPENING_BRACE_SPACING: &str = "SA1012";
pub const CLOSING_BRACE_SPACING: &str = "SA1013";
pub const MULTIPLE_SPACES: &str = "SA1025";
pub const TABS: &str = "SA1027";
pub const TRAILING_WHITESPACE: &str = "SA1028";

const NOT: &str = " not";
const PRECEDED: &str = "preceded";
const FOLLOWED: &str = "followed";

pub fn rules() -> Vec<RuleDescriptor> {
    use RuleCategory::Spacing;
    vec![
        RuleDescriptor::new(
            KEYWORD_SPACING,
            "keywords-must-be-spaced-correctly",
            Spacing,
            "The keyword '{2}' should{0} be {1} by a space",
            check_keywords,
        )
        .describe("Statement keywords are followed by a space; `typeof`, `sizeof`, `default`, `checked`, `unchecked`, `nameof`, `this` and `base` are followed directly by `(`.")
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            COMMA_SPACING,
            "commas-must-be-spaced-correctly",
            Spacing,
            "Commas should{0} be {1} by whitespace",
            check_commas,
        )
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            OPENING_PARENTHESIS_SPACING,
            "opening-parenthesis-must-be-spaced-correctly",
            Spacing,
            "Opening parenthesis should{0} be {1} by a space",
            check_opening_parentheses,
        )
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            CLOSING_PARENTHESIS_SPACING,
            "closing-parenthesis-must-be-spaced-correctly",
            Spacing,
            "Closing parenthesis should{0} be {1} by a space",
            check_closing_parentheses,
        )
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            OPENING_BRACE_SPACING,
            "opening-braces-must-be-spaced-correctly",
            Spacing,
            "Opening brace should{0} be {1} by a space",
            check_opening_braces,
        )
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            CLOSING_BRACE_SPACING,
            "closing-braces-must-be-spaced-correctly",
            Spacing,
            "Closing brace should{0} be {1} by a space",
            check_closing_braces,
        )
        .with_fix(fix_spacing, Applicability::Always),
        RuleDescriptor::new(
            MULTIPLE_SPACES,
            "code-must-not-contain-multiple-whitespace-in-a-row",
            Spacing,
            "Code should not contain multiple whitespace characters in a row",
            check_multiple_spaces,
        )
        .describe("Two or more spaces separate tokens on a line. Indentation and spaces that align a trailing comment are accepted.")
        .with_fix(fix_single_space, Applicability::Always),
        RuleDescriptor::new(
            TABS,
            "tabs-must-not-be-used",
            Spacing,
            "Tabs and spaces should be used correctly",
            check_tabs,
        )
        .describe("A tab character is used while indentation.useTabs is false.")
        .with_fix(fix_tabs, Applicability::Always),
        RuleDescriptor::new(
            TRAILING_WHITESPACE,
            "code-must-not-contain-trailing-whitespace",
            Spacing,
            "Code should not contain trailing whitespace",
            check_trailing_whitespace,
        )
        .with_fix(fix_delete, Applicability::Always),
    ]
}

/// What separates a token from its neighbour on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gap {
    /// Directly adjacent to a significant token
    Tight,
    /// Whitespace between two significant tokens on the same line
    Space,
    /// A line break, a comment, or the edge of the file
    Other,
}

fn gap_before(token: &CsSyntaxToken) -> Gap {
    match token.prev_token() {
        Some(prev) if !prev.kind().is_trivia() => Gap::Tight,
        Some(prev) if prev.kind() == CsSyntaxKind::Whitespace => match prev.prev_token() {
            Some(t) if !t.kind().is_trivia() => Gap::Space,
            _ => Gap::Other,
        },
        _ => Gap::Other,
    }
}

fn gap_after(token: &CsSyntaxToken) -> Gap {
    match token.next_token() {
        Some(next) if !next.kind().is_trivia() => Gap::Tight,
        Some(next) if next.kind() == CsSyntaxKind::Whitespace => match next.next_token() {
            Some(t) if !t.kind().is_trivia() => Gap::Space,
            _ => Gap::Other,
        },
        _ => Gap::Other,
    }
}

fn whitespace_after(token: &CsSyntaxToken) -> Option<TextRange> {
    token
        .next_token()
        .filter(|next| next.kind() == CsSyntaxKind::Whitespace)
        .map(|next| next.text_range())
}

/// Report `token` for a missing space (`negated == false`) or an extra one
fn spacing(token: &CsSyntaxToken, negated: bool, side: &'static str) -> Violation {
    Violation::new(token.text_range()).with_args([if negated { NOT } else { "" }, side])
}

/// Expectation for one side of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Space,
    NoSpace,
    Either,
}

fn check_side(
    violations: &mut Vec<Violation>,
    token: &CsSyntaxToken,
    side: &'static str,
    expect: Expect,
) {
    let gap = if side == PRECEDED {
        gap_before(token)
    } else {
        gap_after(token)
    };
    match (expect, gap) {
        (Expect::Space, Gap::Tight) => violations.push(spacing(token, false, side)),
        (Expect::NoSpace, Gap::Space) => violations.push(spacing(token, true, side)),
        _ => {}
    }
}

/// Insert or remove the space a spacing violation names
pub(crate) fn fix_spacing(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let token = token_at(ctx, violation.range)?;
    let negated = violation.args.first().is_some_and(|arg| arg == NOT);
    let preceded = violation.args.get(1).is_some_and(|arg| arg == PRECEDED);
    let edit = match (negated, preceded) {
        (true, true) => TextEdit::delete(whitespace_before(&token)?),
        (true, false) => TextEdit::delete(whitespace_after(&token)?),
        (false, true) => TextEdit::insert(token.text_range().start(), " "),
        (false, false) => TextEdit::insert(token.text_range().end(), " "),
    };
    Some(vec![edit])
}

fn parent_kind(token: &CsSyntaxToken) -> Option<CsSyntaxKind> {
    token.parent().map(|parent| parent.kind())
}

/// Whether `token` is a binary, assignment, conditional or lambda operator
fn is_infix_operator(token: &CsSyntaxToken) -> bool {
    use CsSyntaxKind::*;
    matches!(
        parent_kind(token),
        Some(BinaryExpr | AssignmentExpr | ConditionalExpr | EqualsValue | ArrowExprClause | LambdaExpr | SwitchExprArm)
    ) && matches!(
        token.kind(),
        Eq | PlusEq
            | MinusEq
            | StarEq
            | SlashEq
            | PercentEq
            | AmpEq
            | PipeEq
            | CaretEq
            | LtLtEq
            | QuestionQuestionEq
            | EqEq
            | BangEq
            | Lt
            | Gt
            | LtEq
            | GtEq
            | LtLt
            | AmpAmp
            | PipePipe
            | Plus
            | Minus
            | Star
            | Slash
            | Percent
            | Amp
            | Pipe
            | Caret
            | QuestionQuestion
            | Question
            | Colon
            | FatArrow
    )
}

// ---- SA1000 --------------------------------------------------------------

/// Keywords that are followed by a space when anything follows them on the line
fn takes_space_after(kind: CsSyntaxKind) -> bool {
    use CsSyntaxKind::*;
    matches!(
        kind,
        IfKw | ForKw
            | ForeachKw
            | WhileKw
            | SwitchKw
            | UsingKw
            | LockKw
            | CatchKw
            | FixedKw
            | ReturnKw
            | ThrowKw
            | NewKw
            | StackallocKw
            | InKw
            | OutKw
            | RefKw
            | IsKw
            | AsKw
            | CaseKw
            | GotoKw
    )
}

/// Keywords written directly against their opening parenthesis
fn is_call_like_keyword(token: &CsSyntaxToken) -> bool {
    use CsSyntaxKind::*;
    match token.kind() {
        DefaultKw | CheckedKw | UncheckedKw | SizeofKw | TypeofKw | BaseKw | ThisKw => true,
        Ident => {
            token.text() == "nameof"
                && token
                    .parent()
                    .and_then(|name| name.parent())
                    .is_some_and(|call| call.kind() == InvocationExpr)
        }
        _ => false,
    }
}

fn check_keywords(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for token in ctx.significant_tokens() {
        let Some(next) = next_significant(&token) else {
            continue;
        };
        let gap = gap_after(&token);
        let negated = if is_call_like_keyword(&token) {
            (next.kind() == CsSyntaxKind::LParen && gap == Gap::Space).then_some(true)
        } else if takes_space_after(token.kind()) {
            match (token.kind(), next.kind()) {
                (_, CsSyntaxKind::Semicolon) => None,
                // `new()`, `new[] { }`, `stackalloc[] { }`
                (CsSyntaxKind::NewKw, CsSyntaxKind::LParen | CsSyntaxKind::LBracket)
                | (CsSyntaxKind::StackallocKw, CsSyntaxKind::LBracket) => {
                    (gap == Gap::Space).then_some(true)
                }
                _ => (gap == Gap::Tight).then_some(false),
            }
        } else {
            None
        };
        if let Some(negated) = negated {
            violations.push(Violation::new(token.text_range()).with_args([
                if negated { NOT } else { "" },
                FOLLOWED,
                token.text(),
            ]));
        }
    }
    violations
}

// ---- SA1001 --------------------------------------------------------------

fn check_commas(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for comma in ctx
        .significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::Comma)
    {
        check_side(&mut violations, &comma, PRECEDED, Expect::NoSpace);
        // `int[,]`, `Dictionary<,>` and `a,,b` stay tight
        let after = match next_significant(&comma).map(|next| next.kind()) {
            Some(CsSyntaxKind::Comma | CsSyntaxKind::RBracket | CsSyntaxKind::Gt) => Expect::Either,
            _ => Expect::Space,
        };
        check_side(&mut violations, &comma, FOLLOWED, after);
    }
    violations
}

// ---- SA1008 / SA1009 -----------------------------------------------------

fn check_opening_parentheses(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for paren in ctx
        .significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::LParen)
    {
        check_side(&mut violations, &paren, PRECEDED, before_opening_parenthesis(&paren));
        check_side(&mut violations, &paren, FOLLOWED, Expect::NoSpace);
    }
    violations
}

fn before_opening_parenthesis(paren: &CsSyntaxToken) -> Expect {
    use CsSyntaxKind::*;
    let Some(prev) = prev_significant(paren) else {
        return Expect::Either;
    };
    match prev.kind() {
        LParen | LBracket => return Expect::NoSpace,
        Lt if matches!(parent_kind(&prev), Some(TypeArgList | TypeParameterList)) => {
            return Expect::NoSpace;
        }
        // Reported as keyword spacing
        DelegateKw => return Expect::Either,
        _ if takes_space_after(prev.kind()) || is_call_like_keyword(&prev) => {
            return Expect::Either;
        }
        _ => {}
    }
    if is_infix_operator(&prev) {
        return Expect::Space;
    }
    let list_owner = paren.parent().and_then(|list| {
        matches!(list.kind(), ArgList | ParameterList | BracketedParameterList)
            .then(|| list.parent())
            .flatten()
    });
    match (parent_kind(paren), list_owner.map(|owner| owner.kind())) {
        (Some(ArgList), _) => Expect::NoSpace,
        (Some(ParameterList), Some(owner)) if owner != LambdaExpr && owner != AnonymousMethodExpr => {
            Expect::NoSpace
        }
        _ => Expect::Either,
    }
}

fn check_closing_parentheses(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for paren in ctx
        .significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::RParen)
    {
        // `( )` is reported once, on the opening parenthesis
        if prev_significant(&paren).is_none_or(|prev| prev.kind() != CsSyntaxKind::LParen) {
            check_side(&mut violations, &paren, PRECEDED, Expect::NoSpace);
        }
        check_side(&mut violations, &paren, FOLLOWED, after_closing_parenthesis(&paren));
    }
    violations
}

fn after_closing_parenthesis(paren: &CsSyntaxToken) -> Expect {
    use CsSyntaxKind::*;
    if parent_kind(paren) == Some(CastExpr) {
        return Expect::NoSpace;
    }
    let Some(next) = next_significant(paren) else {
        return Expect::Either;
    };
    match next.kind() {
        Semicolon | Comma | RParen | RBracket | Dot | QuestionDot | LBracket | LParen | PlusPlus
        | MinusMinus => Expect::NoSpace,
        Bang if parent_kind(&next) == Some(PostfixExpr) => Expect::NoSpace,
        Gt if parent_kind(&next) == Some(TypeArgList) => Expect::NoSpace,
        Question | Star if parent_kind(&next) == Some(Type) => Expect::NoSpace,
        // Brace spacing is its own rule
        LBrace | Colon => Expect::Either,
        kind if kind.is_keyword() => Expect::Space,
        Ident | NumericLiteral | CharLiteral | StringLiteral | InterpolatedString => Expect::Space,
        _ if is_infix_operator(&next) => Expect::Space,
        _ => Expect::Either,
    }
}

// ---- SA1012 / SA1013 -----------------------------------------------------

fn check_opening_braces(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for brace in ctx
        .significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::LBrace)
    {
        let before = match prev_significant(&brace).map(|prev| prev.kind()) {
            Some(CsSyntaxKind::LParen | CsSyntaxKind::LBracket) => Expect::Either,
            _ => Expect::Space,
        };
        check_side(&mut violations, &brace, PRECEDED, before);
        let after = match next_significant(&brace).map(|next| next.kind()) {
            Some(CsSyntaxKind::RBrace) => Expect::Either,
            _ => Expect::Space,
        };
        check_side(&mut violations, &brace, FOLLOWED, after);
    }
    violations
}

fn check_closing_braces(ctx: &RuleContext) -> Vec<Violation> {
    use CsSyntaxKind::*;
    let mut violations = Vec::new();
    for brace in ctx.significant_tokens().filter(|token| token.kind() == RBrace) {
        let before = match prev_significant(&brace).map(|prev| prev.kind()) {
            Some(LBrace) => Expect::Either,
            _ => Expect::Space,
        };
        check_side(&mut violations, &brace, PRECEDED, before);
        let after = match next_significant(&brace).map(|next| next.kind()) {
            Some(RParen | Comma | Semicolon | RBracket | Dot | QuestionDot) => Expect::Either,
            _ => Expect::Space,
        };
        check_side(&mut violations, &brace, FOLLOWED, after);
    }
    violations
}

// ---- SA1025 / SA1027 / SA1028 --------------------------------------------

fn check_multiple_spaces(ctx: &RuleContext) -> Vec<Violation> {
    ctx.tokens()
        .filter(|token| {
            token.kind() == CsSyntaxKind::Whitespace
                && token.text().len() > 1
                && !token.text().contains('\t')
        })
        .filter(|space| {
            let after_code = space
                .prev_token()
                .is_some_and(|prev| !matches!(prev.kind(), CsSyntaxKind::Newline | CsSyntaxKind::DisabledText | CsSyntaxKind::PreprocessorDirective));
            let before_code = space.next_token().is_some_and(|next| {
                !next.kind().is_trivia() || next.kind() == CsSyntaxKind::MultiLineComment
            });
            after_code && before_code
        })
        .map(|space| Violation::new(space.text_range()))
        .collect()
}

fn fix_single_space(_ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    Some(vec![TextEdit::replace(violation.range, " ")])
}

fn check_tabs(ctx: &RuleContext) -> Vec<Violation> {
    if ctx.settings.indentation.use_tabs {
        return Vec::new();
    }
    ctx.tokens()
        .filter(|token| token.kind() == CsSyntaxKind::Whitespace && token.text().contains('\t'))
        .map(|space| Violation::new(space.text_range()))
        .collect()
}

/// Replace tabs by spaces up to the next tab stop
fn fix_tabs(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let tab_size = ctx.settings.indentation.tab_size.max(1);
    let line_start = usize::from(ctx.line_start(violation.range.start()));
    let start = usize::from(violation.range.start());
    let source = ctx.source();
    let mut column = indent_width(source.get(line_start..start)?, tab_size);

    let mut spaces = String::new();
    for c in source.get(start..usize::from(violation.range.end()))?.chars() {
        if c == '\t' {
            let width = tab_size - column % tab_size;
            spaces.push_str(&" ".repeat(width));
            column += width;
        } else {
            spaces.push(c);
            column += 1;
        }
    }
    Some(vec![TextEdit::replace(violation.range, spaces)])
}

fn ends_line(token: &CsSyntaxToken) -> bool {
    token
        .next_token()
        .is_none_or(|next| next.kind() == CsSyntaxKind::Newline)
}

fn check_trailing_whitespace(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for token in ctx.tokens() {
        match token.kind() {
            CsSyntaxKind::Whitespace if ends_line(&token) => {
                violations.push(Violation::new(token.text_range()));
            }
            CsSyntaxKind::SingleLineComment | CsSyntaxKind::DocComment => {
                let text = token.text();
                let trimmed = text.trim_end_matches([' ', '\t']).len();
                if trimmed < text.len() {
                    let start = token.text_range().start() + TextSize::from(trimmed as u32);
                    violations.push(Violation::new(TextRange::new(start, token.text_range().end())));
                }
            }
            _ => {}
        }
    }
    violations
}

fn fix_delete(_ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    Some(vec![TextEdit::delete(violation.range)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{check, check_with, fix_first, fix_until_clean, positions, rule};
    use sable_core::StyleSettings;

    fn spacing_rule(id: &str) -> RuleDescriptor {
        rule(rules(), id)
    }

    fn in_method(body: &str) -> String {
        format!("class A\n{{\n    void M()\n    {{\n{body}    }}\n}}\n")
    }

    #[test]
    fn test_keyword_spacing() {
        let rule = spacing_rule(KEYWORD_SPACING);
        let source = in_method(
            "        if(x) { }\n        var t = typeof (int);\n        var l = new();\n        return;\n",
        );
        let violations = check(&rule, &source);
        assert_eq!(positions(&rule, &source), vec![(5, 9), (6, 17)]);
        assert_eq!(
            rule.format_message(&violations[0].args),
            "The keyword 'if' should be followed by a space"
        );
        assert_eq!(
            rule.format_message(&violations[1].args),
            "The keyword 'typeof' should not be followed by a space"
        );
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method("        if (x) { }\n        var t = typeof(int);\n        var l = new();\n        return;\n")
        );
    }

    #[test]
    fn test_comma_spacing() {
        let rule = spacing_rule(COMMA_SPACING);
        let source = in_method("        F(a ,b);\n        int[,] g;\n");
        assert_eq!(positions(&rule, &source), vec![(5, 13), (5, 13)]);
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method("        F(a, b);\n        int[,] g;\n")
        );
    }

    #[test]
    fn test_tuple_cast_is_spaced_correctly() {
        let source = in_method(
            "        var p = ((int, int))(3, 3);\n        var q = new List<(int, string)>();\n",
        );
        for id in [OPENING_PARENTHESIS_SPACING, CLOSING_PARENTHESIS_SPACING, COMMA_SPACING] {
            assert!(check(&spacing_rule(id), &source).is_empty(), "{id}");
        }
    }

    #[test]
    fn test_opening_parenthesis_spacing() {
        let rule = spacing_rule(OPENING_PARENTHESIS_SPACING);
        let source = in_method("        Call( 1);\n        Call (2);\n        x = y *(z);\n");
        assert_eq!(positions(&rule, &source), vec![(5, 13), (6, 14), (7, 16)]);
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method("        Call(1);\n        Call(2);\n        x = y * (z);\n")
        );
    }

    #[test]
    fn test_closing_parenthesis_spacing() {
        let rule = spacing_rule(CLOSING_PARENTHESIS_SPACING);
        let source = in_method("        Call(1 );\n        if (x)return;\n        var n = (int) x;\n");
        assert_eq!(positions(&rule, &source), vec![(5, 16), (6, 14), (7, 21)]);
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method("        Call(1);\n        if (x) return;\n        var n = (int)x;\n")
        );
    }

    #[test]
    fn test_brace_spacing() {
        let source = "class A\n{\n    int P {get; set;}\n\n    void M()\n    {\n        var a = new[] {1, 2 };\n        var e = new int[] {};\n    }\n}\n";
        let opening = spacing_rule(OPENING_BRACE_SPACING);
        assert_eq!(positions(&opening, source), vec![(3, 11), (7, 23)]);
        let closing = spacing_rule(CLOSING_BRACE_SPACING);
        assert_eq!(positions(&closing, source), vec![(3, 21)]);
        assert_eq!(
            fix_first(&closing, source).unwrap(),
            source.replace("set;}", "set; }")
        );
    }

    #[test]
    fn test_multiple_spaces() {
        let rule = spacing_rule(MULTIPLE_SPACES);
        let source = in_method("        int x  = 1;\n        int y = 2;   // aligned\n");
        assert_eq!(positions(&rule, &source), vec![(5, 14)]);
        assert_eq!(
            fix_first(&rule, &source).unwrap(),
            in_method("        int x = 1;\n        int y = 2;   // aligned\n")
        );
    }

    #[test]
    fn test_tabs_expand_to_tab_stops() {
        let rule = spacing_rule(TABS);
        let source = "class A\n{\n\tint x;\n    int\ty;\n}\n";
        assert_eq!(positions(&rule, source), vec![(3, 1), (4, 8)]);
        assert_eq!(
            fix_until_clean(&rule, source),
            "class A\n{\n    int x;\n    int y;\n}\n"
        );

        let mut settings = StyleSettings::default();
        settings.indentation.use_tabs = true;
        assert!(check_with(&rule, source, &settings).is_empty());
    }

    #[test]
    fn test_trailing_whitespace() {
        let rule = spacing_rule(TRAILING_WHITESPACE);
        let source = "class A  \n{\n    // note \n}\n";
        assert_eq!(positions(&rule, source), vec![(1, 8), (3, 12)]);
        assert_eq!(fix_until_clean(&rule, source), "class A\n{\n    // note\n}\n");
    }
}
