//! Readability rules (SA11xx)

use std::collections::HashSet;

use rowan::TextRange;
use sable_core::cst::ast::{has_modifier, name_token};
use sable_core::cst::trivia::{
    is_first_on_line, is_last_on_line, line_indent, next_significant, prev_significant,
};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};
use sable_core::{Applicability, TextEdit};

use super::{first_token, last_token, line_end_after, token_at};
use crate::context::RuleContext;
use crate::fixes::indent::whitespace_before;
use crate::fixes::{break_before, indent_in, owner_indent};
use crate::registry::{RuleCategory, RuleDescriptor, Violation};

pub const EMPTY_STATEMENT: &str = "SA1106";
pub const MULTIPLE_STATEMENTS_ON_LINE: &str = "SA1107";
pub const BUILT_IN_TYPE_ALIAS: &str = "SA1121";
pub const STRING_EMPTY: &str = "SA1122";

/// Framework type names and their C# keywords
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("Boolean", "bool"),
    ("Byte", "byte"),
    ("Char", "char"),
    ("Decimal", "decimal"),
    ("Double", "double"),
    ("Int16", "short"),
    ("Int32", "int"),
    ("Int64", "long"),
    ("Object", "object"),
    ("SByte", "sbyte"),
    ("Single", "float"),
    ("String", "string"),
    ("UInt16", "ushort"),
    ("UInt32", "uint"),
    ("UInt64", "ulong"),
];

pub fn rules() -> Vec<RuleDescriptor> {
    use RuleCategory::Readability;
    vec![
        RuleDescriptor::new(
            EMPTY_STATEMENT,
            "code-must-not-contain-empty-statements",
            Readability,
            "Code should not contain empty statements",
            check_empty_statements,
        )
        .with_fix(fix_empty_statement, Applicability::Always),
        RuleDescriptor::new(
            MULTIPLE_STATEMENTS_ON_LINE,
            "code-must-not-contain-multiple-statements-on-one-line",
            Readability,
            "Code should not contain multiple statements on one line",
            check_multiple_statements,
        )
        .describe("Only the first extra statement on a line is reported.")
        .once_per_line()
        .with_fix(fix_multiple_statements, Applicability::Always),
        RuleDescriptor::new(
            BUILT_IN_TYPE_ALIAS,
            "use-built-in-type-alias",
            Readability,
            "Use built-in type alias '{0}'",
            check_type_aliases,
        )
        .describe("A framework type such as `Int32` or `System.String` is named instead of its C# keyword. Without a semantic model the name may refer to another type, so the fix is not applied automatically.")
        .with_fix(fix_type_alias, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            STRING_EMPTY,
            "use-string-empty-for-empty-strings",
            Readability,
            "Use string.Empty for empty strings",
            check_empty_strings,
        )
        .with_fix(fix_empty_string, Applicability::Always),
    ]
}

// ---- SA1106 --------------------------------------------------------------

/// Statements whose body cannot simply be dropped
fn embeds_statement(kind: CsSyntaxKind) -> bool {
    use CsSyntaxKind::*;
    matches!(
        kind,
        IfStmt
            | ElseClause
            | WhileStmt
            | DoStmt
            | ForStmt
            | ForeachStmt
            | UsingStmt
            | LockStmt
            | FixedStmt
            | LabeledStmt
    )
}

/// `;` after the closing brace of a type or namespace
fn stray_semicolons(ctx: &RuleContext) -> impl Iterator<Item = CsSyntaxToken> {
    ctx.significant_tokens().filter(|token| {
        token.kind() == CsSyntaxKind::Semicolon
            && token
                .parent()
                .is_some_and(|p| p.kind().is_type_decl() || p.kind() == CsSyntaxKind::NamespaceDecl)
            && prev_significant(token).is_some_and(|prev| {
                prev.kind() == CsSyntaxKind::RBrace && prev.parent() == token.parent()
            })
    })
}

fn check_empty_statements(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations: Vec<Violation> = ctx
        .nodes_of_kind(CsSyntaxKind::EmptyStmt)
        .map(|stmt| Violation::new(stmt.text_range()))
        .collect();
    violations.extend(stray_semicolons(ctx).map(|token| Violation::new(token.text_range())));
    violations
}

fn fix_empty_statement(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let semicolon = token_at(ctx, violation.range)?;
    let parent = semicolon.parent()?;
    if parent.kind() == CsSyntaxKind::EmptyStmt {
        let owner = parent.parent()?;
        if embeds_statement(owner.kind()) {
            return Some(vec![TextEdit::replace(violation.range, "{ }")]);
        }
        // A switch section needs at least one statement
        if owner.kind() == CsSyntaxKind::SwitchSection
            && !owner
                .children()
                .any(|child| child.kind().is_statement() && child != parent)
        {
            return None;
        }
    }
    Some(vec![remove_token(ctx, &semicolon)])
}

/// Delete `token` with the whitespace that would be left dangling
fn remove_token(ctx: &RuleContext, token: &CsSyntaxToken) -> TextEdit {
    let range = token.text_range();
    match (is_first_on_line(token), is_last_on_line(token)) {
        (true, true) => {
            let start = ctx.line_start(range.start());
            let end = line_end_after(token).map_or(range.end(), |line_end| line_end.text_range().end());
            TextEdit::delete(TextRange::new(start, end))
        }
        (true, false) => {
            let end = token
                .next_token()
                .filter(|next| next.kind() == CsSyntaxKind::Whitespace)
                .map_or(range.end(), |space| space.text_range().end());
            TextEdit::delete(TextRange::new(range.start(), end))
        }
        _ => {
            let start = whitespace_before(token).map_or(range.start(), |space| space.start());
            TextEdit::delete(TextRange::new(start, range.end()))
        }
    }
}

// ---- SA1107 --------------------------------------------------------------

fn check_multiple_statements(ctx: &RuleContext) -> Vec<Violation> {
    let mut violations = Vec::new();
    for list in ctx
        .nodes()
        .filter(|node| matches!(node.kind(), CsSyntaxKind::Block | CsSyntaxKind::SwitchSection))
    {
        let statements: Vec<CsSyntaxNode> = list
            .children()
            .filter(|child| child.kind().is_statement())
            .collect();
        for pair in statements.windows(2) {
            if pair[1].kind() == CsSyntaxKind::EmptyStmt {
                continue;
            }
            let (Some(previous_last), Some(first)) = (last_token(&pair[0]), first_token(&pair[1]))
            else {
                continue;
            };
            if ctx.same_line(&previous_last, &first) {
                violations.push(Violation::new(first.text_range()));
            }
        }
    }
    violations
}

fn fix_multiple_statements(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let first = token_at(ctx, violation.range)?;
    let statement = first.parent_ancestors().find(|node| {
        node.kind().is_statement()
            && first_token(node).as_ref() == Some(&first)
            && node.parent().is_some_and(|list| {
                matches!(list.kind(), CsSyntaxKind::Block | CsSyntaxKind::SwitchSection)
            })
    })?;
    let list = statement.parent()?;
    let indent = match list.kind() {
        CsSyntaxKind::Block => {
            let open = first_token(&list)?;
            indent_in(&owner_indent(ctx, &open), ctx.settings)
        }
        _ => indent_in(&line_indent(&first_token(&list)?), ctx.settings),
    };
    Some(vec![break_before(ctx, &first, &indent)])
}

// ---- SA1121 --------------------------------------------------------------

fn alias_for(name: &str) -> Option<&'static str> {
    TYPE_ALIASES
        .iter()
        .find(|(framework, _)| *framework == name)
        .map(|(_, alias)| *alias)
}

/// Start of the `System.` or `global::System.` qualifier in front of `name`
///
/// `None` when the name is qualified by anything else.
fn qualified_start(name: &CsSyntaxToken) -> Option<CsSyntaxToken> {
    let Some(separator) = prev_significant(name).filter(|prev| {
        matches!(prev.kind(), CsSyntaxKind::Dot | CsSyntaxKind::ColonColon)
    }) else {
        return Some(name.clone());
    };
    let qualifier = prev_significant(&separator)?;
    match (separator.kind(), qualifier.text()) {
        (CsSyntaxKind::ColonColon, "global") => Some(qualifier),
        (CsSyntaxKind::Dot, "System") => {
            match prev_significant(&qualifier) {
                Some(prev) if prev.kind() == CsSyntaxKind::Dot => None,
                Some(prev) if prev.kind() == CsSyntaxKind::ColonColon => {
                    prev_significant(&prev).filter(|global| global.text() == "global")
                }
                _ => Some(qualifier),
            }
        }
        _ => None,
    }
}

fn declared_type_names(ctx: &RuleContext) -> HashSet<String> {
    ctx.nodes()
        .filter(|node| node.kind().is_type_decl() || node.kind() == CsSyntaxKind::DelegateDecl)
        .filter_map(|node| name_token(&node))
        .map(|name| name.text().to_string())
        .collect()
}

fn check_type_aliases(ctx: &RuleContext) -> Vec<Violation> {
    let declared = declared_type_names(ctx);
    ctx.significant_tokens()
        .filter(|token| token.kind() == CsSyntaxKind::Ident)
        .filter_map(|name| {
            let alias = alias_for(name.text())?;
            if declared.contains(name.text()) {
                return None;
            }
            let parent = name.parent()?;
            if !matches!(parent.kind(), CsSyntaxKind::Type | CsSyntaxKind::NameExpr) {
                return None;
            }
            // Generic types and method calls named like a framework type
            if let Some(next) = next_significant(&name)
                && matches!(next.kind(), CsSyntaxKind::Lt | CsSyntaxKind::LParen)
            {
                return None;
            }
            let start = qualified_start(&name)?;
            let range = TextRange::new(start.text_range().start(), name.text_range().end());
            Some(Violation::new(range).with_args([alias]))
        })
        .collect()
}

fn fix_type_alias(_ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let alias = violation.args.first()?;
    Some(vec![TextEdit::replace(violation.range, alias.clone())])
}

// ---- SA1122 --------------------------------------------------------------

/// Places that require a compile-time constant
fn requires_constant(literal: &CsSyntaxToken) -> bool {
    use CsSyntaxKind::*;
    literal.parent_ancestors().any(|node| match node.kind() {
        AttributeList | Parameter | CaseLabel | ConstantPattern | SwitchExprArm => true,
        FieldDecl | LocalDeclStmt => has_modifier(&node, "const"),
        _ => false,
    })
}

fn check_empty_strings(ctx: &RuleContext) -> Vec<Violation> {
    ctx.significant_tokens()
        .filter(|token| {
            token.kind() == CsSyntaxKind::StringLiteral && matches!(token.text(), "\"\"" | "@\"\"")
        })
        .filter(|literal| !requires_constant(literal))
        .map(|literal| Violation::new(literal.text_range()))
        .collect()
}

fn fix_empty_string(_ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    Some(vec![TextEdit::replace(violation.range, "string.Empty")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{check, fix_first, fix_until_clean, positions, rule};

    fn readability(id: &str) -> RuleDescriptor {
        rule(rules(), id)
    }

    fn in_method(body: &str) -> String {
        format!("class A\n{{\n    void M()\n    {{\n{body}    }}\n}}\n")
    }

    #[test]
    fn test_empty_statements() {
        let rule = readability(EMPTY_STATEMENT);
        let source = in_method("        a();\n        ;\n        b(); ;\n");
        assert_eq!(positions(&rule, &source), vec![(6, 9), (7, 14)]);
        assert_eq!(fix_until_clean(&rule, &source), in_method("        a();\n        b();\n"));
    }

    #[test]
    fn test_empty_loop_body_becomes_block() {
        let rule = readability(EMPTY_STATEMENT);
        let source = in_method("        while (Next()) ;\n");
        assert_eq!(
            fix_first(&rule, &source).unwrap(),
            in_method("        while (Next()) { }\n")
        );
    }

    #[test]
    fn test_semicolon_after_type_body() {
        let rule = readability(EMPTY_STATEMENT);
        let source = "class A\n{\n};\n";
        assert_eq!(positions(&rule, source), vec![(3, 2)]);
        assert_eq!(fix_first(&rule, source).unwrap(), "class A\n{\n}\n");
        assert!(check(&rule, "record R(int X);\n").is_empty());
    }

    #[test]
    fn test_multiple_statements_on_one_line() {
        let rule = readability(MULTIPLE_STATEMENTS_ON_LINE);
        let source = in_method("        a(); b(); c();\n        d();\n");
        assert_eq!(positions(&rule, &source), vec![(5, 14), (5, 19)]);
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method("        a();\n        b();\n        c();\n        d();\n")
        );
    }

    #[test]
    fn test_switch_section_statements() {
        let rule = readability(MULTIPLE_STATEMENTS_ON_LINE);
        let source = in_method("        switch (x)\n        {\n            case 1: a(); break;\n        }\n");
        assert_eq!(positions(&rule, &source), vec![(7, 26)]);
        assert_eq!(
            fix_first(&rule, &source).unwrap(),
            in_method("        switch (x)\n        {\n            case 1: a();\n                break;\n        }\n")
        );
    }

    #[test]
    fn test_built_in_type_aliases() {
        let rule = readability(BUILT_IN_TYPE_ALIAS);
        let source = in_method(
            "        Int32 a = 0;\n        System.String b = String.Empty;\n        Other.Int32 c;\n        List<Int64> d;\n",
        );
        let violations = check(&rule, &source);
        assert_eq!(positions(&rule, &source), vec![(5, 9), (6, 9), (6, 27), (8, 14)]);
        assert_eq!(rule.format_message(&violations[1].args), "Use built-in type alias 'string'");
        assert_eq!(
            fix_until_clean(&rule, &source),
            in_method(
                "        int a = 0;\n        string b = string.Empty;\n        Other.Int32 c;\n        List<long> d;\n"
            )
        );
    }

    #[test]
    fn test_user_type_shadows_framework_name() {
        let rule = readability(BUILT_IN_TYPE_ALIAS);
        assert!(check(&rule, "class String\n{\n    String Copy;\n}\n").is_empty());
    }

    #[test]
    fn test_empty_string_literals() {
        let rule = readability(STRING_EMPTY);
        let source = "class A\n{\n    const string C = \"\";\n\n    void M(string p = \"\")\n    {\n        var s = \"\";\n        if (p == \"\") { }\n    }\n}\n";
        assert_eq!(positions(&rule, source), vec![(7, 17), (8, 18)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            source.replacen("var s = \"\"", "var s = string.Empty", 1)
        );
    }
}
