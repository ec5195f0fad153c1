//! Naming rules (SA13xx)
//!
//! Every rule here is suppressed inside types whose name ends with
//! `NativeMethods`, where names mirror the native API. Override members and
//! explicit interface implementations are skipped as well, since their names
//! are dictated by the base declaration.
//!
//! Fixes rename the declaration and every reference through
//! [`rename_edits`]. Without a semantic model a reference may be missed or
//! over-matched, so renames are never applied automatically.

use std::sync::LazyLock;

use regex::Regex;
use sable_core::cst::ast::{
    self, AstNode, FieldDecl, MemberDecl, Parameter, TypeDecl, designations, has_modifier,
    in_native_methods, name_token, namespace_name,
};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};
use sable_core::{Applicability, TextEdit};

use super::{direct_tokens, token_at};
use crate::context::RuleContext;
use crate::fixes::rename_edits;
use crate::registry::{RuleCategory, RuleDescriptor, Violation};

pub const ELEMENT_UPPER_CASE: &str = "SA1300";
pub const INTERFACE_PREFIX: &str = "SA1302";
pub const CONST_FIELD_UPPER_CASE: &str = "SA1303";
pub const HUNGARIAN_NOTATION: &str = "SA1305";
pub const FIELD_LOWER_CASE: &str = "SA1306";
pub const FIELD_PREFIX: &str = "SA1308";
pub const FIELD_LEADING_UNDERSCORE: &str = "SA1309";
pub const FIELD_UNDERSCORE: &str = "SA1310";
pub const LOCAL_LOWER_CASE: &str = "SA1312";
pub const PARAMETER_LOWER_CASE: &str = "SA1313";

const VARIABLE_PREFIXES: &[&str] = &["m_", "s_", "t_"];

pub fn rules() -> Vec<RuleDescriptor> {
    use RuleCategory::Naming;
    vec![
        RuleDescriptor::new(
            ELEMENT_UPPER_CASE,
            "element-must-begin-with-upper-case-letter",
            Naming,
            "Element '{0}' should begin with an uppercase letter",
            check_element_names,
        )
        .describe("Namespaces are reported but never renamed.")
        .with_fix(fix_upper_case, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            INTERFACE_PREFIX,
            "interface-names-must-begin-with-i",
            Naming,
            "Interface names should begin with I",
            check_interface_names,
        )
        .with_fix(fix_interface_prefix, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            CONST_FIELD_UPPER_CASE,
            "const-field-names-must-begin-with-upper-case-letter",
            Naming,
            "Const field names should begin with upper-case letter",
            check_const_fields,
        )
        .with_fix(fix_upper_case, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            HUNGARIAN_NOTATION,
            "field-names-must-not-use-hungarian-notation",
            Naming,
            "The variable name '{0}' begins with a prefix that looks like Hungarian notation. Remove the prefix or add it to the list of allowed prefixes",
            check_hungarian,
        )
        .describe("A prefix of one or two lower-case letters followed by an upper-case letter. Prefixes in `allowedHungarianPrefixes`, and the common English words when `allowCommonHungarianPrefixes` is set, are accepted."),
        RuleDescriptor::new(
            FIELD_LOWER_CASE,
            "field-names-must-begin-with-lower-case-letter",
            Naming,
            "Field '{0}' should begin with lower-case letter",
            check_field_lower_case,
        )
        .describe("Applies to fields that are neither public, internal, const nor static readonly.")
        .with_fix(fix_lower_case, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            FIELD_PREFIX,
            "variable-names-must-not-be-prefixed",
            Naming,
            "Field '{0}' should not begin with the prefix '{1}'",
            check_variable_prefixes,
        )
        .with_fix(fix_variable_prefix, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            FIELD_LEADING_UNDERSCORE,
            "field-names-must-not-begin-with-underscore",
            Naming,
            "Field '{0}' should not begin with an underscore",
            check_leading_underscores,
        )
        .with_fix(fix_leading_underscore, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            FIELD_UNDERSCORE,
            "field-names-must-not-contain-underscore",
            Naming,
            "Field '{0}' should not contain an underscore",
            check_inner_underscores,
        )
        .with_fix(fix_inner_underscore, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            LOCAL_LOWER_CASE,
            "variable-names-must-begin-with-lower-case-letter",
            Naming,
            "Variable '{0}' should begin with lower-case letter",
            check_local_names,
        )
        .with_fix(fix_lower_case, Applicability::MaybeIncorrect),
        RuleDescriptor::new(
            PARAMETER_LOWER_CASE,
            "parameter-names-must-begin-with-lower-case-letter",
            Naming,
            "Parameter '{0}' should begin with lower-case letter",
            check_parameter_names,
        )
        .describe("Positional record parameters and discards are exempt.")
        .with_fix(fix_lower_case, Applicability::MaybeIncorrect),
    ]
}

/// Identifier text without the verbatim `@`
fn bare(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

fn starts_lower(name: &str) -> bool {
    bare(name).chars().next().is_some_and(char::is_lowercase)
}

fn starts_upper(name: &str) -> bool {
    bare(name).chars().next().is_some_and(char::is_uppercase)
}

fn is_discard(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c == '_')
}

fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn named(token: &CsSyntaxToken) -> Violation {
    Violation::new(token.text_range()).with_args([token.text()])
}

fn is_dictated(member: &MemberDecl) -> bool {
    member.is_override() || member.is_explicit_implementation()
}

/// Types, members, enum members, events, local functions and namespace parts
fn element_names(ctx: &RuleContext) -> Vec<CsSyntaxToken> {
    use CsSyntaxKind::*;
    let mut names = Vec::new();
    for node in ctx.nodes() {
        match node.kind() {
            NamespaceDecl | FileScopedNamespaceDecl => names.extend(namespace_name(&node)),
            EnumMember | LocalFunctionStmt => names.extend(name_token(&node)),
            EventFieldDecl => names.extend(declarator_names(&node)),
            ConstructorDecl | DestructorDecl => {}
            kind if kind.is_type_decl() => names.extend(name_token(&node)),
            _ => {
                if let Some(member) = MemberDecl::cast(node)
                    && !is_dictated(&member)
                {
                    names.extend(member.name());
                }
            }
        }
    }
    names.retain(|name| name.parent().is_none_or(|owner| !in_native_methods(&owner)));
    names
}

fn declarator_names(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    FieldDecl::cast(node.clone())
        .map(|field| field.declarators().filter_map(|d| d.name()).collect())
        .unwrap_or_default()
}

/// Declarators of plain (non-event) fields outside `NativeMethods`
fn fields(ctx: &RuleContext) -> Vec<(FieldDecl, CsSyntaxToken)> {
    ctx.nodes_of_kind(CsSyntaxKind::FieldDecl)
        .filter(|node| !in_native_methods(node))
        .filter_map(FieldDecl::cast)
        .flat_map(|field| {
            let names: Vec<CsSyntaxToken> = field.declarators().filter_map(|d| d.name()).collect();
            names.into_iter().map(move |name| (field.clone(), name))
        })
        .collect()
}

/// Locals declared by statements, loops, catch clauses and patterns
fn local_names(ctx: &RuleContext) -> Vec<CsSyntaxToken> {
    use CsSyntaxKind::*;
    let mut names = Vec::new();
    for node in ctx.nodes() {
        match node.kind() {
            VariableDeclarator => {
                let Some(declarator) = ast::VariableDeclarator::cast(node) else {
                    continue;
                };
                let is_local = declarator.declaration().is_some_and(|decl| match decl.kind() {
                    LocalDeclStmt => !has_modifier(&decl, "const"),
                    ForStmt | UsingStmt | FixedStmt => true,
                    _ => false,
                });
                if is_local {
                    names.extend(declarator.name());
                }
            }
            ForeachStmt | CatchDecl => names.extend(name_token(&node)),
            DeclarationExpr | DeclarationPattern | VarPattern | RecursivePattern => {
                names.extend(designations(&node))
            }
            _ => {}
        }
    }
    names.retain(|name| {
        !is_discard(name.text()) && name.parent().is_none_or(|owner| !in_native_methods(&owner))
    });
    names
}

fn parameter_names(ctx: &RuleContext) -> Vec<CsSyntaxToken> {
    ctx.nodes_of_kind(CsSyntaxKind::Parameter)
        .filter_map(Parameter::cast)
        .filter(|parameter| !parameter.is_record_parameter())
        .filter(|parameter| !in_native_methods(parameter.syntax()))
        .filter(|parameter| {
            !parameter
                .owner()
                .and_then(MemberDecl::cast)
                .is_some_and(|member| is_dictated(&member))
        })
        .filter_map(|parameter| parameter.name())
        .filter(|name| !is_discard(name.text()))
        .collect()
}

fn check_element_names(ctx: &RuleContext) -> Vec<Violation> {
    element_names(ctx)
        .iter()
        .filter(|name| starts_lower(name.text()))
        .map(named)
        .collect()
}

fn check_interface_names(ctx: &RuleContext) -> Vec<Violation> {
    ctx.nodes_of_kind(CsSyntaxKind::InterfaceDecl)
        .filter(|node| !in_native_methods(node))
        .filter_map(TypeDecl::cast)
        .filter_map(|decl| decl.name())
        .filter(|name| !bare(name.text()).starts_with('I'))
        .map(|name| named(&name))
        .collect()
}

fn check_const_fields(ctx: &RuleContext) -> Vec<Violation> {
    fields(ctx)
        .iter()
        .filter(|(field, name)| field.is_const() && starts_lower(name.text()))
        .map(|(_, name)| named(name))
        .collect()
}

/// One or two lower-case letters, then an upper-case letter
static HUNGARIAN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]{1,2})\p{Lu}").expect("valid prefix pattern"));

/// The lower-case prefix of a Hungarian-looking name
fn hungarian_prefix(name: &str) -> Option<&str> {
    HUNGARIAN_PREFIX
        .captures(bare(name))
        .and_then(|captures| captures.get(1))
        .map(|prefix| prefix.as_str())
}

fn check_hungarian(ctx: &RuleContext) -> Vec<Violation> {
    let mut names: Vec<CsSyntaxToken> = fields(ctx).into_iter().map(|(_, name)| name).collect();
    names.extend(local_names(ctx));
    names.extend(parameter_names(ctx));
    names.sort_by_key(|name| name.text_range().start());
    names
        .iter()
        .filter(|name| {
            hungarian_prefix(name.text())
                .is_some_and(|prefix| !ctx.settings.is_hungarian_prefix_allowed(prefix))
        })
        .map(named)
        .collect()
}

fn check_field_lower_case(ctx: &RuleContext) -> Vec<Violation> {
    fields(ctx)
        .iter()
        .filter(|(field, _)| {
            !field.is_const()
                && !field.is_public_or_internal()
                && !(field.is_static() && field.is_readonly())
        })
        .filter(|(_, name)| starts_upper(name.text()))
        .map(|(_, name)| named(name))
        .collect()
}

fn variable_prefix(name: &str) -> Option<&'static str> {
    VARIABLE_PREFIXES
        .iter()
        .copied()
        .find(|prefix| bare(name).starts_with(prefix))
}

fn check_variable_prefixes(ctx: &RuleContext) -> Vec<Violation> {
    let mut names: Vec<CsSyntaxToken> = fields(ctx).into_iter().map(|(_, name)| name).collect();
    names.extend(local_names(ctx));
    names.sort_by_key(|name| name.text_range().start());
    names
        .iter()
        .filter_map(|name| {
            let prefix = variable_prefix(name.text())?;
            Some(Violation::new(name.text_range()).with_args([name.text(), prefix]))
        })
        .collect()
}

fn check_leading_underscores(ctx: &RuleContext) -> Vec<Violation> {
    fields(ctx)
        .iter()
        .filter(|(_, name)| bare(name.text()).starts_with('_'))
        .map(|(_, name)| named(name))
        .collect()
}

/// Field name after leading underscores and an `m_`-style prefix
fn field_body(name: &str) -> &str {
    let name = bare(name).trim_start_matches('_');
    variable_prefix(name)
        .and_then(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

fn check_inner_underscores(ctx: &RuleContext) -> Vec<Violation> {
    fields(ctx)
        .iter()
        .filter(|(_, name)| field_body(name.text()).contains('_'))
        .map(|(_, name)| named(name))
        .collect()
}

fn check_local_names(ctx: &RuleContext) -> Vec<Violation> {
    local_names(ctx)
        .iter()
        .filter(|name| starts_upper(name.text()))
        .map(named)
        .collect()
}

fn check_parameter_names(ctx: &RuleContext) -> Vec<Violation> {
    parameter_names(ctx)
        .iter()
        .filter(|name| starts_upper(name.text()))
        .map(named)
        .collect()
}

/// Rename the identifier under `violation` to `rename(current)`
fn rename_with(
    ctx: &RuleContext,
    violation: &Violation,
    rename: impl FnOnce(&str) -> Option<String>,
) -> Option<Vec<TextEdit>> {
    let token = token_at(ctx, violation.range)?;
    let new_name = rename(bare(token.text()))?;
    rename_edits(ctx, &token, &new_name)
}

fn is_namespace_part(token: &CsSyntaxToken) -> bool {
    token
        .parent()
        .and_then(|ty| ty.parent())
        .is_some_and(|owner| {
            matches!(
                owner.kind(),
                CsSyntaxKind::NamespaceDecl | CsSyntaxKind::FileScopedNamespaceDecl
            )
        })
}

fn fix_upper_case(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    let token = token_at(ctx, violation.range)?;
    if is_namespace_part(&token) {
        return None;
    }
    rename_with(ctx, violation, |name| Some(upper_first(name)))
}

fn fix_lower_case(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    rename_with(ctx, violation, |name| Some(lower_first(name)))
}

fn fix_interface_prefix(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    rename_with(ctx, violation, |name| Some(format!("I{name}")))
}

fn fix_variable_prefix(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    rename_with(ctx, violation, |name| {
        let rest = name.get(2..)?;
        (!rest.is_empty()).then(|| rest.to_string())
    })
}

fn fix_leading_underscore(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    rename_with(ctx, violation, |name| {
        let rest = name.trim_start_matches('_');
        (!rest.is_empty()).then(|| rest.to_string())
    })
}

/// `first_second` to `firstSecond`, keeping any leading prefix
fn fix_inner_underscore(ctx: &RuleContext, violation: &Violation) -> Option<Vec<TextEdit>> {
    rename_with(ctx, violation, |name| {
        let body = field_body(name);
        let prefix = &name[..name.len() - body.len()];
        let mut renamed = prefix.to_string();
        let mut capitalize = false;
        for c in body.chars() {
            if c == '_' {
                capitalize = renamed.len() > prefix.len();
            } else if capitalize {
                renamed.extend(c.to_uppercase());
                capitalize = false;
            } else {
                renamed.push(c);
            }
        }
        Some(renamed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::test_support::{check, check_with, fix_first, positions, rule};
    use sable_core::StyleSettings;

    fn naming(id: &str) -> RuleDescriptor {
        rule(rules(), id)
    }

    #[test]
    fn test_hungarian_prefix() {
        assert_eq!(hungarian_prefix("iCount"), Some("i"));
        assert_eq!(hungarian_prefix("strName"), None);
        assert_eq!(hungarian_prefix("isValid"), Some("is"));
        assert_eq!(hungarian_prefix("count"), None);
        assert_eq!(hungarian_prefix("@xPos"), Some("x"));
    }

    #[test]
    fn test_elements_begin_with_upper_case() {
        let rule = naming(ELEMENT_UPPER_CASE);
        let source = "namespace company.Product
{
    class widget
    {
        void run() { }
        int count { get; set; }
        event EventHandler changed;
        public override string toString() => \"\";
    }

    enum Color { red, Green }
}
";
        assert_eq!(
            positions(&rule, source),
            vec![(1, 11), (3, 11), (5, 14), (6, 13), (7, 28), (11, 18)]
        );
    }

    #[test]
    fn test_namespaces_are_not_renamed() {
        let rule = naming(ELEMENT_UPPER_CASE);
        assert_eq!(check(&rule, "namespace company { }").len(), 1);
        assert!(fix_first(&rule, "namespace company { }").is_none());
    }

    #[test]
    fn test_rename_appends_smallest_free_suffix() {
        let rule = naming(ELEMENT_UPPER_CASE);
        let source = "class C\n{\n    int Test;\n\n    void test()\n    {\n        test();\n    }\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C\n{\n    int Test;\n\n    void Test1()\n    {\n        Test1();\n    }\n}\n"
        );

        let source = "class C\n{\n    int Test;\n    int Test1;\n\n    void test() { }\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C\n{\n    int Test;\n    int Test1;\n\n    void Test2() { }\n}\n"
        );

        let source = "enum E\n{\n    Member,\n    Member1,\n    member,\n}\n";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "enum E\n{\n    Member,\n    Member1,\n    Member2,\n}\n"
        );
    }

    #[test]
    fn test_interface_prefix() {
        let rule = naming(INTERFACE_PREFIX);
        let source = "interface Widget { }\nclass W : Widget { }\ninterface IShape { }\n";
        assert_eq!(positions(&rule, source), vec![(1, 11)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "interface IWidget { }\nclass W : IWidget { }\ninterface IShape { }\n"
        );
    }

    #[test]
    fn test_const_fields() {
        let rule = naming(CONST_FIELD_UPPER_CASE);
        let source = "class C { const int max = 1; const int Min = 0; int Use() => max; }";
        assert_eq!(check(&rule, source).len(), 1);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C { const int Max = 1; const int Min = 0; int Use() => Max; }"
        );
    }

    #[test]
    fn test_hungarian_notation() {
        let rule = naming(HUNGARIAN_NOTATION);
        let source = "class C
{
    private int iCount;
    void M(string strName, int inValue, int xPos)
    {
        var isValid = true;
        int myCount = 0;
    }
}
";
        assert_eq!(positions(&rule, source), vec![(3, 17), (4, 45), (7, 13)]);
        assert!(rule.fix.is_none());

        let mut settings = StyleSettings::default();
        settings.naming_rules.allow_common_hungarian_prefixes = false;
        settings.naming_rules.allowed_hungarian_prefixes = vec!["x".into(), "i".into(), "my".into()];
        let flagged: Vec<String> = check_with(&rule, source, &settings)
            .into_iter()
            .flat_map(|v| v.args)
            .collect();
        assert_eq!(flagged, vec!["inValue", "isValid"]);
    }

    #[test]
    fn test_private_fields_begin_with_lower_case() {
        let rule = naming(FIELD_LOWER_CASE);
        let source = "class C
{
    private int Count;
    public int Visible;
    private static readonly int Shared = 1;
    private const int Max = 2;
    int Other;
}
";
        assert_eq!(positions(&rule, source), vec![(3, 17), (7, 9)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            source.replace("private int Count;", "private int count;")
        );
    }

    #[test]
    fn test_variable_prefixes() {
        let rule = naming(FIELD_PREFIX);
        let source = "class C { private int m_count; void M() { m_count = 1; } }";
        let violations = check(&rule, source);
        assert_eq!(violations[0].args, vec!["m_count", "m_"]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C { private int count; void M() { count = 1; } }"
        );
        assert_eq!(check(&rule, "class C { int s_; }").len(), 1);
        assert!(fix_first(&rule, "class C { int s_; }").is_none());
    }

    #[test]
    fn test_leading_underscores() {
        let rule = naming(FIELD_LEADING_UNDERSCORE);
        let source = "class C { int _value; int Get() => _value; }";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C { int value; int Get() => value; }"
        );
        assert!(fix_first(&rule, "class C { int __; }").is_none());
    }

    #[test]
    fn test_inner_underscores() {
        let rule = naming(FIELD_UNDERSCORE);
        let source = "class C { int first_second_third; int _ok; int m_fine; }";
        assert_eq!(check(&rule, source).len(), 1);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C { int firstSecondThird; int _ok; int m_fine; }"
        );
    }

    #[test]
    fn test_local_variables() {
        let rule = naming(LOCAL_LOWER_CASE);
        let source = "class A
{
    void M()
    {
        int Count = 0;
        foreach (var Item in Items) { }
        const int Limit = 1;
        if (o is string Text) { }
        int _ = Count;
    }
}
";
        assert_eq!(positions(&rule, source), vec![(5, 13), (6, 22), (8, 25)]);
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            source.replace("int Count = 0;", "int count = 0;").replace("= Count;", "= count;")
        );
    }

    #[test]
    fn test_parameters() {
        let rule = naming(PARAMETER_LOWER_CASE);
        let source = "record R(int X);
class C
{
    void M(int Value, int _)
    {
        Func<int, int> f = Item => Item;
    }

    public override void N(int Bad) { }
}
";
        assert_eq!(positions(&rule, source), vec![(4, 16), (6, 28)]);
        let source = "class C { void M(int Value) { Use(Value); } }";
        assert_eq!(
            fix_first(&rule, source).unwrap(),
            "class C { void M(int value) { Use(value); } }"
        );
    }

    #[test]
    fn test_native_methods_are_exempt() {
        let source = "internal static class NativeMethods
{
    const int max = 1;
    private static int Count;
    private int m_handle;
    internal static extern int run(int Value, int dwFlags);
    interface callback { }
}
";
        for rule in rules() {
            assert!(check(&rule, source).is_empty(), "{} reported in NativeMethods", rule.id);
        }
    }
}
