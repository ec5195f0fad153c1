//! Typed views over declaration nodes
//!
//! Naming and layout rules need a handful of facts about declarations:
//! the identifier that names them, their modifiers and the type that
//! contains them. The wrappers here answer those questions without a
//! semantic model.

use super::{CsSyntaxKind, CsSyntaxNode, CsSyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: CsSyntaxKind) -> bool;
    fn cast(node: CsSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &CsSyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            syntax: CsSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: CsSyntaxKind) -> bool {
                matches!(kind, $(CsSyntaxKind::$kind)|+)
            }

            fn cast(node: CsSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &CsSyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(
    /// Class, struct, interface, record or enum
    TypeDecl,
    ClassDecl | StructDecl | InterfaceDecl | RecordDecl | EnumDecl
);
ast_node!(
    /// Any member that carries its own name token
    MemberDecl,
    MethodDecl | PropertyDecl | EventDecl | DelegateDecl | ConstructorDecl | DestructorDecl
);
ast_node!(FieldDecl, FieldDecl | EventFieldDecl);
ast_node!(Parameter, Parameter);
ast_node!(VariableDeclarator, VariableDeclarator);
ast_node!(EnumMember, EnumMember);

impl TypeDecl {
    pub fn name(&self) -> Option<CsSyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn is_interface(&self) -> bool {
        self.syntax.kind() == CsSyntaxKind::InterfaceDecl
    }

    pub fn members(&self) -> impl Iterator<Item = CsSyntaxNode> {
        self.syntax
            .children()
            .filter(|n| n.kind().is_member_decl() || n.kind().is_type_decl())
    }
}

impl MemberDecl {
    pub fn name(&self) -> Option<CsSyntaxToken> {
        name_token(&self.syntax)
    }

    pub fn is_override(&self) -> bool {
        has_modifier(&self.syntax, "override")
    }

    /// `void IFoo.Bar()`
    pub fn is_explicit_implementation(&self) -> bool {
        child_of_kind(&self.syntax, CsSyntaxKind::ExplicitInterfaceSpecifier).is_some()
    }
}

impl FieldDecl {
    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        self.syntax
            .children()
            .filter(|n| n.kind() == CsSyntaxKind::VariableDecl)
            .flat_map(|decl| decl.children().filter_map(VariableDeclarator::cast))
    }

    pub fn is_const(&self) -> bool {
        has_modifier(&self.syntax, "const")
    }

    /// `public` or `internal` (including `protected internal`)
    pub fn is_public_or_internal(&self) -> bool {
        has_modifier(&self.syntax, "public") || has_modifier(&self.syntax, "internal")
    }

    pub fn is_readonly(&self) -> bool {
        has_modifier(&self.syntax, "readonly")
    }

    pub fn is_static(&self) -> bool {
        has_modifier(&self.syntax, "static")
    }
}

impl Parameter {
    pub fn name(&self) -> Option<CsSyntaxToken> {
        name_token(&self.syntax)
    }

    /// Parameters of a record's positional parameter list
    pub fn is_record_parameter(&self) -> bool {
        self.syntax
            .parent()
            .and_then(|list| list.parent())
            .is_some_and(|owner| owner.kind() == CsSyntaxKind::RecordDecl)
    }

    /// Parameters of a lambda or anonymous method
    pub fn is_lambda_parameter(&self) -> bool {
        let owner = match self.syntax.parent() {
            Some(p) if p.kind() == CsSyntaxKind::ParameterList => p.parent(),
            other => other,
        };
        owner.is_some_and(|o| {
            matches!(
                o.kind(),
                CsSyntaxKind::LambdaExpr | CsSyntaxKind::AnonymousMethodExpr
            )
        })
    }

    /// The method, constructor, lambda or other construct declaring this parameter
    pub fn owner(&self) -> Option<CsSyntaxNode> {
        self.syntax.ancestors().skip(1).find(|n| {
            !matches!(
                n.kind(),
                CsSyntaxKind::ParameterList | CsSyntaxKind::BracketedParameterList
            )
        })
    }
}

impl VariableDeclarator {
    pub fn name(&self) -> Option<CsSyntaxToken> {
        name_token(&self.syntax)
    }

    /// `FieldDecl`, `EventFieldDecl`, `LocalDeclStmt` or another declaration owner
    pub fn declaration(&self) -> Option<CsSyntaxNode> {
        self.syntax.parent().and_then(|decl| decl.parent())
    }
}

impl EnumMember {
    pub fn name(&self) -> Option<CsSyntaxToken> {
        name_token(&self.syntax)
    }
}

fn child_of_kind(parent: &CsSyntaxNode, kind: CsSyntaxKind) -> Option<CsSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

/// Direct child tokens of `node`, trivia excluded
fn direct_tokens(node: &CsSyntaxNode) -> impl Iterator<Item = CsSyntaxToken> {
    node.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// The identifier that names a declaration
pub fn name_token(node: &CsSyntaxNode) -> Option<CsSyntaxToken> {
    use CsSyntaxKind::*;
    match node.kind() {
        ClassDecl | StructDecl | InterfaceDecl | RecordDecl | EnumDecl => {
            let mut seen_keyword = false;
            for token in direct_tokens(node) {
                if seen_keyword && token.kind() == Ident {
                    return Some(token);
                }
                let is_record = token.kind() == Ident && token.text() == "record";
                if matches!(token.kind(), ClassKw | StructKw | InterfaceKw | EnumKw) || is_record {
                    seen_keyword = true;
                }
            }
            None
        }
        ConstructorDecl => node
            .children_with_tokens()
            .take_while(|e| e.kind() != ParameterList)
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == Ident)
            .last(),
        DestructorDecl => direct_tokens(node)
            .skip_while(|t| t.kind() != Tilde)
            .find(|t| t.kind() == Ident),
        NamespaceDecl | FileScopedNamespaceDecl => None,
        VariableDeclarator | TypeParameter | EnumMember | LabeledStmt => {
            direct_tokens(node).find(|t| t.kind() == Ident)
        }
        _ => {
            let has_type = node.children().any(|n| n.kind() == Type);
            let mut after_type = !has_type;
            for element in node.children_with_tokens() {
                match element {
                    rowan::NodeOrToken::Node(n) if n.kind() == Type => after_type = true,
                    rowan::NodeOrToken::Token(t) if after_type && t.kind() == Ident => {
                        return Some(t);
                    }
                    _ => {}
                }
            }
            None
        }
    }
}

/// Identifiers introduced by a designation: `int x`, `var (a, b)`, `{ } x`
pub fn designations(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    let type_end = node
        .children()
        .find(|n| n.kind() == CsSyntaxKind::Type)
        .map(|ty| ty.text_range().end());
    let mut names: Vec<CsSyntaxToken> = direct_tokens(node)
        .filter(|token| token.kind() == CsSyntaxKind::Ident)
        .filter(|token| type_end.is_none_or(|end| token.text_range().start() >= end))
        .collect();
    // `var` is itself an identifier token
    if node.kind() == CsSyntaxKind::VarPattern && !names.is_empty() {
        names.remove(0);
    }
    names
}

/// Dotted name of a namespace declaration
pub fn namespace_name(node: &CsSyntaxNode) -> Vec<CsSyntaxToken> {
    child_of_kind(node, CsSyntaxKind::Type)
        .map(|ty| {
            ty.children_with_tokens()
                .filter_map(|e| e.into_token())
                .filter(|t| t.kind() == CsSyntaxKind::Ident)
                .collect()
        })
        .unwrap_or_default()
}

/// Whether a declaration carries `modifier` (keyword or contextual)
pub fn has_modifier(node: &CsSyntaxNode, modifier: &str) -> bool {
    direct_tokens(node)
        .take_while(|t| t.kind().is_modifier() || t.kind() == CsSyntaxKind::Ident)
        .any(|t| t.text() == modifier)
}

/// Innermost type declaration strictly containing `node`
pub fn enclosing_type(node: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    node.ancestors().skip(1).find(|n| n.kind().is_type_decl())
}

/// Whether `node` lies inside a type whose name ends with `NativeMethods`
pub fn in_native_methods(node: &CsSyntaxNode) -> bool {
    node.ancestors()
        .filter(|n| n.kind().is_type_decl())
        .filter_map(|n| name_token(&n))
        .any(|name| name.text().ends_with("NativeMethods"))
}

/// Innermost method-like body that scopes locals and parameters
pub fn enclosing_function(node: &CsSyntaxNode) -> Option<CsSyntaxNode> {
    use CsSyntaxKind::*;
    node.ancestors().find(|n| {
        matches!(
            n.kind(),
            MethodDecl
                | ConstructorDecl
                | DestructorDecl
                | OperatorDecl
                | ConversionOperatorDecl
                | Accessor
                | LocalFunctionStmt
                | LambdaExpr
                | AnonymousMethodExpr
                | PropertyDecl
                | IndexerDecl
        ) || (n.kind() == CompilationUnit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{ParseOptions, SyntaxTree};

    fn parse(source: &str) -> CsSyntaxNode {
        SyntaxTree::parse(source, &ParseOptions::default()).root()
    }

    #[test]
    fn test_type_names_skip_contextual_modifiers() {
        let root = parse("public partial class Foo { } record struct Bar(int X);");
        let names: Vec<String> = root
            .descendants()
            .filter_map(TypeDecl::cast)
            .filter_map(|t| t.name())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(names, vec!["Foo", "Bar"]);
    }

    #[test]
    fn test_member_names_follow_the_type() {
        let root = parse(
            "class C { async Task<int> Run() => 1; int IFoo.Value { get; } C() { } ~C() { } }",
        );
        let members: Vec<MemberDecl> = root.descendants().filter_map(MemberDecl::cast).collect();
        let names: Vec<String> = members
            .iter()
            .filter_map(|m| m.name())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(names, vec!["Run", "Value", "C", "C"]);
        assert!(members[1].is_explicit_implementation());
        assert!(!members[0].is_override());
    }

    #[test]
    fn test_field_modifiers_and_declarators() {
        let root = parse("class C { private const int a = 1, b = 2; internal static int c; }");
        let fields: Vec<FieldDecl> = root.descendants().filter_map(FieldDecl::cast).collect();
        assert!(fields[0].is_const());
        assert!(!fields[0].is_public_or_internal());
        let names: Vec<String> = fields[0]
            .declarators()
            .filter_map(|d| d.name())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(fields[1].is_static());
        assert!(fields[1].is_public_or_internal());
    }

    #[test]
    fn test_native_methods_container() {
        let root = parse("class SafeNativeMethods { class Inner { int x; } } class Other { int y; }");
        let declarators: Vec<VariableDeclarator> =
            root.descendants().filter_map(VariableDeclarator::cast).collect();
        assert!(in_native_methods(declarators[0].syntax()));
        assert!(!in_native_methods(declarators[1].syntax()));
    }

    #[test]
    fn test_parameter_owners() {
        let root = parse("record R(int X); class C { void M(int a) { Func<int, int> f = b => b; } }");
        let params: Vec<Parameter> = root.descendants().filter_map(Parameter::cast).collect();
        assert!(params[0].is_record_parameter());
        assert!(!params[1].is_record_parameter());
        assert_eq!(params[1].owner().map(|o| o.kind()), Some(CsSyntaxKind::MethodDecl));
        assert!(params[2].is_lambda_parameter());
        assert_eq!(params[2].name().map(|t| t.text().to_string()), Some("b".into()));
    }
}
