//! Symbol renames without a semantic model
//!
//! A rename replaces the declaring identifier and every identifier that
//! resolves to it. Resolution is syntactic: an identifier with the same text
//! is skipped when it declares something else, or when a local of an
//! enclosing block or a member of a nearer type has the same name. Locals are
//! scoped to their block, loop or catch clause, parameters to their
//! function-like body. Member-access names (`x.name`) only count for members
//! reached through `this` or the containing type, and for types written in
//! type position.
//!
//! When the new name is already taken, in the declaring scope or at any
//! site the rename touches, the smallest free numeric suffix is appended:
//! `Name`, `Name1`, `Name2`, ...

use std::collections::HashSet;

use sable_core::TextEdit;
use sable_core::cst::ast::{
    self, AstNode, designations, enclosing_function, enclosing_type, has_modifier, name_token,
};
use sable_core::cst::trivia::{next_significant, prev_significant};
use sable_core::cst::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

use crate::context::RuleContext;

/// What kind of symbol a declaring identifier introduces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolScope {
    /// Parameter, local, or pattern designation
    Local,
    /// Field, method, property, event or enum member
    Member,
    /// Type or delegate
    Type,
}

/// The symbol being renamed
struct Target {
    declaration: CsSyntaxToken,
    owner: CsSyntaxNode,
    scope: SymbolScope,
    /// Function for locals, the whole file otherwise
    scope_node: CsSyntaxNode,
    /// Type declaring a member
    container: Option<CsSyntaxNode>,
}

/// First of `candidate`, `candidate1`, `candidate2`, ... not in `taken`
pub fn unique_name(candidate: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(candidate) {
        return candidate.to_string();
    }
    (1..)
        .map(|n| format!("{candidate}{n}"))
        .find(|name| !taken.contains(name))
        .unwrap_or_else(|| candidate.to_string())
}

/// Whether `name` can be written as a plain C# identifier
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && CsSyntaxKind::from_keyword(name).is_none()
}

/// Edits renaming the symbol declared by `declaration` to `new_name`
///
/// The name is made unique within the symbol's scope and at every reference
/// first. Returns `None` when `new_name` is not a usable identifier or would
/// not change anything.
pub fn rename_edits(
    ctx: &RuleContext,
    declaration: &CsSyntaxToken,
    new_name: &str,
) -> Option<Vec<TextEdit>> {
    let old_name = declaration.text();
    if !is_valid_identifier(new_name) || new_name == old_name {
        return None;
    }
    let owner = declaration.parent()?;
    let scope = symbol_scope(&owner);
    let scope_node = match scope {
        SymbolScope::Local => local_scope(&owner)?,
        SymbolScope::Member | SymbolScope::Type => ctx.root.clone(),
    };
    let container = match scope {
        SymbolScope::Member => enclosing_type(&owner),
        _ => None,
    };
    let target = Target {
        declaration: declaration.clone(),
        owner,
        scope,
        scope_node,
        container,
    };

    let references: Vec<CsSyntaxToken> = target
        .scope_node
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind() == CsSyntaxKind::Ident && token.text() == old_name)
        .filter(|token| refers_to(token, &target))
        .collect();

    let mut taken = scope_names(ctx, &target);
    for reference in &references {
        visible_names(reference, &mut taken);
    }
    taken.remove(old_name);
    let new_name = unique_name(new_name, &taken);

    let edits: Vec<TextEdit> = references
        .iter()
        .map(|token| TextEdit::replace(token.text_range(), new_name.clone()))
        .collect();
    (!edits.is_empty()).then_some(edits)
}

fn symbol_scope(owner: &CsSyntaxNode) -> SymbolScope {
    use CsSyntaxKind::*;
    match owner.kind() {
        kind if kind.is_type_decl() => SymbolScope::Type,
        DelegateDecl | TypeParameter => SymbolScope::Type,
        VariableDeclarator => {
            let declaration = owner.parent().and_then(|decl| decl.parent());
            if declaration.is_some_and(|d| ast::FieldDecl::can_cast(d.kind())) {
                SymbolScope::Member
            } else {
                SymbolScope::Local
            }
        }
        Parameter | ForeachStmt | CatchDecl | DeclarationExpr | DeclarationPattern
        | VarPattern | LocalFunctionStmt | RecursivePattern => SymbolScope::Local,
        _ => SymbolScope::Member,
    }
}

/// The function-like node that scopes a local or parameter
fn local_scope(owner: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    match owner.kind() {
        CsSyntaxKind::Parameter => {
            ast::Parameter::cast(owner.clone()).and_then(|parameter| parameter.owner())
        }
        // A local function is visible in the body that declares it
        CsSyntaxKind::LocalFunctionStmt => owner.parent().and_then(|p| enclosing_function(&p)),
        _ => enclosing_function(owner),
    }
}

fn is_function_like(node: &CsSyntaxNode) -> bool {
    enclosing_function(node).as_ref() == Some(node)
}

/// The declaration `token` names, when it is a declaring identifier
///
/// Constructor and destructor names refer to their type and are not
/// declarations of their own.
fn declaration_of(token: &CsSyntaxToken) -> Option<CsSyntaxNode> {
    use CsSyntaxKind::*;
    let parent = token.parent()?;
    let declares = match parent.kind() {
        DeclarationExpr | DeclarationPattern | VarPattern | RecursivePattern => {
            designations(&parent).contains(token)
        }
        kind if kind.is_type_decl() => name_token(&parent).as_ref() == Some(token),
        DelegateDecl | MethodDecl | PropertyDecl | EventDecl | VariableDeclarator
        | TypeParameter | EnumMember | Parameter | ForeachStmt | CatchDecl
        | LocalFunctionStmt => name_token(&parent).as_ref() == Some(token),
        _ => false,
    };
    declares.then_some(parent)
}

/// Whether a second declaration with the same name is part of the same symbol
///
/// Method overloads share their call sites and partial types share a name.
fn same_symbol(target: &Target, other: &CsSyntaxNode) -> bool {
    match target.scope {
        SymbolScope::Member => {
            target.owner.kind() == CsSyntaxKind::MethodDecl
                && other.kind() == CsSyntaxKind::MethodDecl
                && enclosing_type(other) == target.container
        }
        SymbolScope::Type => {
            other.kind() == target.owner.kind()
                && has_modifier(other, "partial")
                && has_modifier(&target.owner, "partial")
        }
        SymbolScope::Local => false,
    }
}

/// Whether the identifier `token`, spelled like the target, resolves to it
fn refers_to(token: &CsSyntaxToken, target: &Target) -> bool {
    if token == &target.declaration {
        return true;
    }
    if let Some(other) = declaration_of(token) {
        return same_symbol(target, &other);
    }
    if let Some(qualified) = qualified_reference(token, target) {
        return qualified;
    }
    if is_argument_label(token) {
        return false;
    }
    if let Some(initialized) = initializer_member(token) {
        return target.scope == SymbolScope::Member
            && creation_type_name(&initialized).is_some_and(|name| {
                target
                    .container
                    .as_ref()
                    .and_then(name_token)
                    .is_some_and(|container| container.text() == name)
            });
    }
    if target.scope == SymbolScope::Member
        && let Some(container) = &target.container
        && !container.text_range().contains_range(token.text_range())
    {
        return false;
    }
    !is_shadowed(token, target)
}

/// `Some(resolves)` for a name written after `.`, `?.`, `->` or `::`
fn qualified_reference(token: &CsSyntaxToken, target: &Target) -> Option<bool> {
    let separator = prev_significant(token)?;
    if !matches!(
        separator.kind(),
        CsSyntaxKind::Dot | CsSyntaxKind::QuestionDot | CsSyntaxKind::Arrow | CsSyntaxKind::ColonColon
    ) {
        return None;
    }
    let resolves = match target.scope {
        SymbolScope::Local => false,
        SymbolScope::Member => prev_significant(&separator).is_some_and(|receiver| {
            receiver.kind() == CsSyntaxKind::ThisKw
                || (receiver.kind() == CsSyntaxKind::Ident
                    && target
                        .container
                        .as_ref()
                        .and_then(name_token)
                        .is_some_and(|name| name.text() == receiver.text()))
        }),
        SymbolScope::Type => token
            .parent_ancestors()
            .any(|node| node.kind() == CsSyntaxKind::Type),
    };
    Some(resolves)
}

/// `name: value` argument labels
fn is_argument_label(token: &CsSyntaxToken) -> bool {
    token.parent().is_some_and(|parent| parent.kind() == CsSyntaxKind::Argument)
        && next_significant(token).is_some_and(|next| next.kind() == CsSyntaxKind::Colon)
}

/// The creation expression when `token` is `Name` in `new Foo { Name = value }`
fn initializer_member(token: &CsSyntaxToken) -> Option<CsSyntaxNode> {
    let name = token.parent()?;
    if name.kind() != CsSyntaxKind::NameExpr {
        return None;
    }
    let assignment = name.parent()?;
    if assignment.kind() != CsSyntaxKind::AssignmentExpr || assignment.first_child()? != name {
        return None;
    }
    let initializer = assignment.parent()?;
    match initializer.kind() {
        CsSyntaxKind::AnonymousObjectCreationExpr => Some(initializer),
        CsSyntaxKind::InitializerExpr => initializer.parent(),
        _ => None,
    }
}

/// Last identifier of the type in `new Foo.Bar { ... }`
fn creation_type_name(creation: &CsSyntaxNode) -> Option<String> {
    if creation.kind() != CsSyntaxKind::ObjectCreationExpr {
        return None;
    }
    let ty = creation.children().find(|n| n.kind() == CsSyntaxKind::Type)?;
    ty.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|t| t.kind() == CsSyntaxKind::Ident)
        .last()
        .map(|t| t.text().to_string())
}

/// Whether another symbol with the same name is nearer to `token`
///
/// For a local target, the innermost local whose region contains `token`
/// must be the target itself.
fn is_shadowed(token: &CsSyntaxToken, target: &Target) -> bool {
    let name = token.text();
    let locals = locals_in_scope(token, name);
    if target.scope == SymbolScope::Local {
        return locals
            .first()
            .is_none_or(|(local, _)| local != &target.declaration);
    }
    if !locals.is_empty() {
        return true;
    }
    for ancestor in token.parent_ancestors() {
        if Some(&ancestor) == target.container.as_ref() {
            return false;
        }
        if ancestor.kind().is_type_decl()
            && declared_names(&ancestor)
                .any(|member| member.text() == name && member != target.declaration)
        {
            return true;
        }
    }
    false
}

/// The node within which a local declared by `owner` can be referenced
fn local_region(owner: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    use CsSyntaxKind::*;
    match owner.kind() {
        Parameter | LocalFunctionStmt => local_scope(owner),
        ForeachStmt => Some(owner.clone()),
        CatchDecl => owner.parent(),
        _ => owner.ancestors().skip(1).find(|node| {
            matches!(
                node.kind(),
                Block | ForStmt | UsingStmt | FixedStmt | SwitchSection
            ) || is_function_like(node)
        }),
    }
}

/// Locals named `name` in scope at `token`, innermost region first
fn locals_in_scope(token: &CsSyntaxToken, name: &str) -> Vec<(CsSyntaxToken, CsSyntaxNode)> {
    let Some(outermost) = token.parent_ancestors().filter(is_function_like).last() else {
        return Vec::new();
    };
    let at = token.text_range();
    let mut locals: Vec<(CsSyntaxToken, CsSyntaxNode)> = outermost
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|candidate| candidate.kind() == CsSyntaxKind::Ident && candidate.text() == name)
        .filter_map(|candidate| {
            let owner = declaration_of(&candidate)?;
            if symbol_scope(&owner) != SymbolScope::Local {
                return None;
            }
            let region = local_region(&owner)?;
            region
                .text_range()
                .contains_range(at)
                .then_some((candidate, region))
        })
        .collect();
    locals.sort_by_key(|(_, region)| region.text_range().len());
    locals
}

/// Parameters and locals that `function` itself declares
fn function_locals(function: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    function
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind() == CsSyntaxKind::Ident)
        .filter(|token| {
            declaration_of(token).is_some_and(|owner| {
                symbol_scope(&owner) == SymbolScope::Local
                    && local_scope(&owner).as_ref() == Some(function)
            })
        })
        .collect()
}

/// Names declared directly inside a type: members, fields, enum members, nested types
fn declared_names(container: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> {
    container
        .children()
        .filter(|member| {
            !matches!(
                member.kind(),
                CsSyntaxKind::ConstructorDecl | CsSyntaxKind::DestructorDecl
            )
        })
        .flat_map(|member| {
            let tokens: Vec<CsSyntaxToken> = match ast::FieldDecl::cast(member.clone()) {
                Some(field) => field.declarators().filter_map(|d| d.name()).collect(),
                None => name_token(&member).into_iter().collect(),
            };
            tokens
        })
}

/// Names already in use where the symbol is declared
fn scope_names(ctx: &RuleContext, target: &Target) -> HashSet<String> {
    match target.scope {
        SymbolScope::Local => target
            .scope_node
            .descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .filter(|token| token.kind() == CsSyntaxKind::Ident)
            .map(|token| token.text().to_string())
            .collect(),
        SymbolScope::Member => {
            let container = target.container.clone().unwrap_or_else(|| ctx.root.clone());
            let mut names: HashSet<String> =
                declared_names(&container).map(|t| t.text().to_string()).collect();
            names.extend(name_token(&container).map(|t| t.text().to_string()));
            names
        }
        SymbolScope::Type => ctx
            .nodes()
            .filter(|node| node.kind().is_type_decl() || node.kind() == CsSyntaxKind::DelegateDecl)
            .filter_map(|node| name_token(&node))
            .map(|token| token.text().to_string())
            .collect(),
    }
}

/// Adds every local, parameter, member and type name visible at `token`
fn visible_names(token: &CsSyntaxToken, taken: &mut HashSet<String>) {
    for ancestor in token.parent_ancestors() {
        if is_function_like(&ancestor) {
            taken.extend(function_locals(&ancestor).iter().map(|t| t.text().to_string()));
        }
        if ancestor.kind().is_type_decl() {
            taken.extend(declared_names(&ancestor).map(|t| t.text().to_string()));
            taken.extend(name_token(&ancestor).map(|t| t.text().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_core::cst::SyntaxTree;
    use sable_core::{ParseOptions, StyleSettings, apply_edits};

    fn rename(source: &str, old: &str, nth: usize, new_name: &str) -> Option<String> {
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        let settings = StyleSettings::default();
        let ctx = RuleContext::new(&tree, &settings);
        let token = ctx
            .significant_tokens()
            .filter(|t| t.text() == old)
            .nth(nth)?;
        let edits = rename_edits(&ctx, &token, new_name)?;
        apply_edits(source, &edits).ok()
    }

    #[test]
    fn test_unique_name() {
        let taken: HashSet<String> = ["Test", "Test1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name("Test", &taken), "Test2");
        assert_eq!(unique_name("Other", &taken), "Other");
    }

    #[test]
    fn test_member_rename_cascades_and_avoids_collisions() {
        let source = "class C { int Test; void test() { test(); this.test(); } }";
        let fixed = rename(source, "test", 0, "Test").unwrap();
        assert_eq!(fixed, "class C { int Test; void Test1() { Test1(); this.Test1(); } }");
    }

    #[test]
    fn test_local_rename_skips_member_access() {
        let source = "class C { void M() { int Value = 1; var x = o.Value + Value; } int Value; }";
        let fixed = rename(source, "Value", 0, "value").unwrap();
        assert_eq!(
            fixed,
            "class C { void M() { int value = 1; var x = o.Value + value; } int Value; }"
        );
    }

    #[test]
    fn test_parameter_rename_is_scoped_to_owner() {
        let source = "class C { void A(int Count) { F(Count: Count); } void B(int Count) { } }";
        let fixed = rename(source, "Count", 0, "count").unwrap();
        assert_eq!(
            fixed,
            "class C { void A(int count) { F(Count: count); } void B(int Count) { } }"
        );
    }

    #[test]
    fn test_member_rename_leaves_unrelated_locals() {
        let source = "class C { void test() { } void N() { int test = 0; int Test = 1; Use(test, Test); } }";
        let fixed = rename(source, "test", 0, "Test").unwrap();
        assert_eq!(
            fixed,
            "class C { void Test() { } void N() { int test = 0; int Test = 1; Use(test, Test); } }"
        );
    }

    #[test]
    fn test_type_rename_leaves_same_named_members() {
        let source = "class widget { }\nclass B { private int widget; private int Widget; int Get() => widget; }\n";
        let fixed = rename(source, "widget", 0, "Widget").unwrap();
        assert_eq!(
            fixed,
            "class Widget { }\nclass B { private int widget; private int Widget; int Get() => widget; }\n"
        );
    }

    #[test]
    fn test_type_rename_follows_type_positions() {
        let source = "class widget { widget() { } }\nclass B { widget w = new widget(); Ns.widget q; }\n";
        let fixed = rename(source, "widget", 0, "Widget").unwrap();
        assert_eq!(
            fixed,
            "class Widget { Widget() { } }\nclass B { Widget w = new Widget(); Ns.Widget q; }\n"
        );
    }

    #[test]
    fn test_new_name_avoids_names_visible_at_references() {
        let source = "class C { void test() { } void N() { int Test = 1; test(); } }";
        let fixed = rename(source, "test", 0, "Test").unwrap();
        assert_eq!(
            fixed,
            "class C { void Test1() { } void N() { int Test = 1; Test1(); } }"
        );
    }

    #[test]
    fn test_overloads_are_renamed_together() {
        let source = "class C { void run() { } void run(int x) { run(); other.run(); } }";
        let fixed = rename(source, "run", 0, "Run").unwrap();
        assert_eq!(
            fixed,
            "class C { void Run() { } void Run(int x) { Run(); other.run(); } }"
        );
    }

    #[test]
    fn test_sibling_loops_keep_their_own_counters() {
        let source = "class C { void M() { for (int I = 0; I < 1; I++) { } for (int I = 0; I < 2; I++) { } } }";
        let fixed = rename(source, "I", 0, "i").unwrap();
        assert_eq!(
            fixed,
            "class C { void M() { for (int i = 0; i < 1; i++) { } for (int I = 0; I < 2; I++) { } } }"
        );
    }

    #[test]
    fn test_local_function_parameter_shadows_outer_local() {
        let source = "class C { void M() { int Value = 1; int F(int Value) => Value; Use(Value); } }";
        let fixed = rename(source, "Value", 0, "value").unwrap();
        assert_eq!(
            fixed,
            "class C { void M() { int value = 1; int F(int Value) => Value; Use(value); } }"
        );
    }

    #[test]
    fn test_member_reference_under_unrelated_block_local() {
        let source = "class C { void test() { } void N() { { int test = 0; Use(test); } test(); } }";
        let fixed = rename(source, "test", 0, "Run").unwrap();
        assert_eq!(
            fixed,
            "class C { void Run() { } void N() { { int test = 0; Use(test); } Run(); } }"
        );
    }

    #[test]
    fn test_rejects_keywords_and_empty_names() {
        let source = "class C { int m_; }";
        assert!(rename(source, "m_", 0, "").is_none());
        assert!(rename(source, "m_", 0, "int").is_none());
        assert!(!is_valid_identifier("1x"));
    }
}
