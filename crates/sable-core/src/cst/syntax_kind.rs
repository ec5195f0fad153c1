//! Syntax kind enumeration for the C# CST
//!
//! This module defines all possible node and token types in the syntax tree.
//! Kinds are laid out in groups: trivia, tokens and punctuation, reserved
//! keywords, and finally composite nodes.

use std::fmt;

macro_rules! syntax_kinds {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        /// Syntax kind for C# language elements
        ///
        /// Contextual keywords (`var`, `get`, `record`, `when`, ...) are lexed as
        /// [`CsSyntaxKind::Ident`]; the parser recognises them by text.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum CsSyntaxKind {
            $($(#[$meta])* $name),*
        }

        impl CsSyntaxKind {
            /// Every kind, indexed by its raw value
            pub const ALL: &'static [CsSyntaxKind] = &[$(CsSyntaxKind::$name),*];
        }
    };
}

syntax_kinds! {
    // ==================
    // Trivia
    // ==================
    /// Spaces and tabs
    Whitespace,
    /// `\n`, `\r\n` or a bare `\r`
    Newline,
    /// `// ...`
    SingleLineComment,
    /// `/// ...`
    DocComment,
    /// `/* ... */`
    MultiLineComment,
    /// A whole `#...` directive line, without its line break
    PreprocessorDirective,
    /// Source skipped by an inactive `#if` branch
    DisabledText,

    // ==================
    // Tokens
    // ==================
    Ident,
    NumericLiteral,
    CharLiteral,
    StringLiteral,
    InterpolatedString,
    /// Any character the lexer could not classify
    Unknown,
    Eof,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    QuestionDot,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,
    Eq,
    Lt,
    /// Always a single `>`; shifts are recognised from adjacent tokens
    Gt,
    LtEq,
    GtEq,
    EqEq,
    BangEq,
    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLt,
    LtLtEq,
    /// `=>`
    FatArrow,
    /// `->`
    Arrow,

    // ==================
    // Reserved keywords
    // ==================
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FalseKw,
    FinallyKw,
    FixedKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    NullKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StackallocKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TrueKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // ==================
    // Nodes: declarations
    // ==================
    CompilationUnit,
    ExternAlias,
    UsingDirective,
    NamespaceDecl,
    FileScopedNamespaceDecl,
    ClassDecl,
    StructDecl,
    InterfaceDecl,
    RecordDecl,
    EnumDecl,
    EnumMember,
    DelegateDecl,
    AttributeList,
    Attribute,
    TypeParameterList,
    TypeParameter,
    ConstraintClause,
    BaseList,
    ParameterList,
    BracketedParameterList,
    Parameter,
    FieldDecl,
    EventFieldDecl,
    VariableDecl,
    VariableDeclarator,
    EqualsValue,
    MethodDecl,
    ConstructorDecl,
    ConstructorInitializer,
    DestructorDecl,
    OperatorDecl,
    ConversionOperatorDecl,
    PropertyDecl,
    IndexerDecl,
    EventDecl,
    AccessorList,
    Accessor,
    ArrowExprClause,
    ExplicitInterfaceSpecifier,

    // ==================
    // Nodes: types and names
    // ==================
    Type,
    TypeArgList,
    TupleType,
    TupleElement,
    ArrayRank,

    // ==================
    // Nodes: statements
    // ==================
    Block,
    LocalDeclStmt,
    LocalFunctionStmt,
    ExprStmt,
    EmptyStmt,
    IfStmt,
    ElseClause,
    WhileStmt,
    DoStmt,
    ForStmt,
    ForeachStmt,
    SwitchStmt,
    SwitchSection,
    CaseLabel,
    DefaultLabel,
    BreakStmt,
    ContinueStmt,
    ReturnStmt,
    ThrowStmt,
    YieldStmt,
    GotoStmt,
    TryStmt,
    CatchClause,
    CatchDecl,
    CatchFilter,
    FinallyClause,
    UsingStmt,
    LockStmt,
    FixedStmt,
    CheckedStmt,
    UnsafeStmt,
    LabeledStmt,

    // ==================
    // Nodes: expressions
    // ==================
    LiteralExpr,
    NameExpr,
    MemberAccessExpr,
    ConditionalAccessExpr,
    InvocationExpr,
    ArgList,
    BracketedArgList,
    Argument,
    ElementAccessExpr,
    BinaryExpr,
    PrefixExpr,
    PostfixExpr,
    AssignmentExpr,
    ConditionalExpr,
    CastExpr,
    ParenExpr,
    TupleExpr,
    LambdaExpr,
    AnonymousMethodExpr,
    ObjectCreationExpr,
    ImplicitObjectCreationExpr,
    ArrayCreationExpr,
    ImplicitArrayCreationExpr,
    StackAllocExpr,
    ImplicitStackAllocExpr,
    AnonymousObjectCreationExpr,
    InitializerExpr,
    /// `typeof(..)`, `sizeof(..)`, `default(..)`, `checked(..)`
    KeywordCallExpr,
    IsPatternExpr,
    AsExpr,
    SwitchExpr,
    SwitchExprArm,
    WithExpr,
    RangeExpr,
    ThisExpr,
    BaseExpr,
    DeclarationExpr,
    ThrowExpr,
    RefExpr,
    QueryExpr,
    /// `[a, b, ..c]`
    CollectionExpr,

    // ==================
    // Nodes: patterns
    // ==================
    ConstantPattern,
    DeclarationPattern,
    VarPattern,
    DiscardPattern,
    RelationalPattern,
    TypePattern,
    RecursivePattern,
    PropertyPatternClause,
    PositionalPatternClause,
    Subpattern,
    BinaryPattern,
    UnaryPattern,
    ParenPattern,
    ListPattern,
    WhenClause,

    /// Tokens the parser could not place
    Error,
}

impl CsSyntaxKind {
    /// Convert a raw rowan kind back into a syntax kind
    pub fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Whitespace, comments, directives and disabled text
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Newline
                | Self::SingleLineComment
                | Self::DocComment
                | Self::MultiLineComment
                | Self::PreprocessorDirective
                | Self::DisabledText
        )
    }

    /// Comments of every flavour
    pub fn is_comment(self) -> bool {
        matches!(
            self,
            Self::SingleLineComment | Self::DocComment | Self::MultiLineComment
        )
    }

    pub fn is_keyword(self) -> bool {
        self >= Self::AbstractKw && self <= Self::WhileKw
    }

    /// Predefined type keywords (`int`, `string`, `object`, ...)
    pub fn is_predefined_type(self) -> bool {
        matches!(
            self,
            Self::BoolKw
                | Self::ByteKw
                | Self::CharKw
                | Self::DecimalKw
                | Self::DoubleKw
                | Self::FloatKw
                | Self::IntKw
                | Self::LongKw
                | Self::ObjectKw
                | Self::SbyteKw
                | Self::ShortKw
                | Self::StringKw
                | Self::UintKw
                | Self::UlongKw
                | Self::UshortKw
                | Self::VoidKw
        )
    }

    /// Declaration modifiers that are reserved keywords
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::PublicKw
                | Self::PrivateKw
                | Self::ProtectedKw
                | Self::InternalKw
                | Self::StaticKw
                | Self::ReadonlyKw
                | Self::ConstKw
                | Self::AbstractKw
                | Self::SealedKw
                | Self::VirtualKw
                | Self::OverrideKw
                | Self::ExternKw
                | Self::UnsafeKw
                | Self::VolatileKw
                | Self::NewKw
                | Self::FixedKw
                | Self::RefKw
        )
    }

    /// Type and namespace declarations that own a brace-delimited body
    pub fn is_type_decl(self) -> bool {
        matches!(
            self,
            Self::ClassDecl
                | Self::StructDecl
                | Self::InterfaceDecl
                | Self::RecordDecl
                | Self::EnumDecl
        )
    }

    /// Members of a type body
    pub fn is_member_decl(self) -> bool {
        matches!(
            self,
            Self::FieldDecl
                | Self::EventFieldDecl
                | Self::MethodDecl
                | Self::ConstructorDecl
                | Self::DestructorDecl
                | Self::OperatorDecl
                | Self::ConversionOperatorDecl
                | Self::PropertyDecl
                | Self::IndexerDecl
                | Self::EventDecl
                | Self::DelegateDecl
        ) || self.is_type_decl()
    }

    /// Statement nodes
    pub fn is_statement(self) -> bool {
        self >= Self::Block && self <= Self::LabeledStmt
            && !matches!(
                self,
                Self::ElseClause
                    | Self::SwitchSection
                    | Self::CaseLabel
                    | Self::DefaultLabel
                    | Self::CatchClause
                    | Self::CatchDecl
                    | Self::CatchFilter
                    | Self::FinallyClause
            )
    }

    /// Map reserved keyword text to its kind
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "abstract" => Self::AbstractKw,
            "as" => Self::AsKw,
            "base" => Self::BaseKw,
            "bool" => Self::BoolKw,
            "break" => Self::BreakKw,
            "byte" => Self::ByteKw,
            "case" => Self::CaseKw,
            "catch" => Self::CatchKw,
            "char" => Self::CharKw,
            "checked" => Self::CheckedKw,
            "class" => Self::ClassKw,
            "const" => Self::ConstKw,
            "continue" => Self::ContinueKw,
            "decimal" => Self::DecimalKw,
            "default" => Self::DefaultKw,
            "delegate" => Self::DelegateKw,
            "do" => Self::DoKw,
            "double" => Self::DoubleKw,
            "else" => Self::ElseKw,
            "enum" => Self::EnumKw,
            "event" => Self::EventKw,
            "explicit" => Self::ExplicitKw,
            "extern" => Self::ExternKw,
            "false" => Self::FalseKw,
            "finally" => Self::FinallyKw,
            "fixed" => Self::FixedKw,
            "float" => Self::FloatKw,
            "for" => Self::ForKw,
            "foreach" => Self::ForeachKw,
            "goto" => Self::GotoKw,
            "if" => Self::IfKw,
            "implicit" => Self::ImplicitKw,
            "in" => Self::InKw,
            "int" => Self::IntKw,
            "interface" => Self::InterfaceKw,
            "internal" => Self::InternalKw,
            "is" => Self::IsKw,
            "lock" => Self::LockKw,
            "long" => Self::LongKw,
            "namespace" => Self::NamespaceKw,
            "new" => Self::NewKw,
            "null" => Self::NullKw,
            "object" => Self::ObjectKw,
            "operator" => Self::OperatorKw,
            "out" => Self::OutKw,
            "override" => Self::OverrideKw,
            "params" => Self::ParamsKw,
            "private" => Self::PrivateKw,
            "protected" => Self::ProtectedKw,
            "public" => Self::PublicKw,
            "readonly" => Self::ReadonlyKw,
            "ref" => Self::RefKw,
            "return" => Self::ReturnKw,
            "sbyte" => Self::SbyteKw,
            "sealed" => Self::SealedKw,
            "short" => Self::ShortKw,
            "sizeof" => Self::SizeofKw,
            "stackalloc" => Self::StackallocKw,
            "static" => Self::StaticKw,
            "string" => Self::StringKw,
            "struct" => Self::StructKw,
            "switch" => Self::SwitchKw,
            "this" => Self::ThisKw,
            "throw" => Self::ThrowKw,
            "true" => Self::TrueKw,
            "try" => Self::TryKw,
            "typeof" => Self::TypeofKw,
            "uint" => Self::UintKw,
            "ulong" => Self::UlongKw,
            "unchecked" => Self::UncheckedKw,
            "unsafe" => Self::UnsafeKw,
            "ushort" => Self::UshortKw,
            "using" => Self::UsingKw,
            "virtual" => Self::VirtualKw,
            "void" => Self::VoidKw,
            "volatile" => Self::VolatileKw,
            "while" => Self::WhileKw,
            _ => return None,
        };
        Some(kind)
    }
}

impl From<CsSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: CsSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl fmt::Display for CsSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        for kind in CsSyntaxKind::ALL {
            assert_eq!(CsSyntaxKind::from_raw(*kind as u16), Some(*kind));
        }
        assert_eq!(CsSyntaxKind::from_raw(u16::MAX), None);
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(CsSyntaxKind::from_keyword("while"), Some(CsSyntaxKind::WhileKw));
        assert_eq!(CsSyntaxKind::from_keyword("var"), None);
        assert!(CsSyntaxKind::StackallocKw.is_keyword());
        assert!(!CsSyntaxKind::Ident.is_keyword());
    }

    #[test]
    fn test_groups() {
        assert!(CsSyntaxKind::DisabledText.is_trivia());
        assert!(CsSyntaxKind::IntKw.is_predefined_type());
        assert!(CsSyntaxKind::IfStmt.is_statement());
        assert!(!CsSyntaxKind::ElseClause.is_statement());
        assert!(CsSyntaxKind::PropertyDecl.is_member_decl());
    }
}
