//! Compilation units, namespaces, type and member declarations

use rowan::Checkpoint;

use super::Parser;
use crate::cst::CsSyntaxKind::{self, *};
use crate::cst::LanguageVersion;

impl Parser<'_> {
    pub(super) fn compilation_unit(&mut self) {
        // Leading trivia of the file belongs to the root
        self.builder.start_node(CompilationUnit);
        self.namespace_body(true);
        self.flush_all();
        self.builder.finish_node();
    }

    fn namespace_body(&mut self, top_level: bool) {
        loop {
            if self.at_eof() || (!top_level && self.at(RBrace)) {
                break;
            }
            let before = self.pos;
            match self.current() {
                ExternKw if self.nth_contextual(1, "alias") => self.extern_alias(),
                LBracket if self.global_attributes_follow() => self.attributes(),
                UsingKw if self.using_directive_follows(1) => self.using_directive(),
                Ident if self.at_contextual("global") && self.nth(1) == UsingKw => {
                    self.using_directive()
                }
                NamespaceKw => self.namespace_decl(),
                _ if top_level && !self.type_decl_follows() => self.statement(),
                _ => self.member_declaration(),
            }
            if self.pos == before {
                self.error_and_bump("Type or namespace definition, or end-of-file expected");
            }
        }
    }

    /// `[assembly: ..]` and `[module: ..]`
    fn global_attributes_follow(&self) -> bool {
        (self.nth_contextual(1, "assembly") || self.nth_contextual(1, "module"))
            && self.nth(2) == Colon
    }

    fn using_directive_follows(&self, n: usize) -> bool {
        self.nth(n) != LParen && !self.local_decl_follows(n)
    }

    fn extern_alias(&mut self) {
        self.start_node(ExternAlias);
        self.bump_n(2);
        self.expect(Ident);
        self.expect(Semicolon);
        self.finish_node();
    }

    fn using_directive(&mut self) {
        self.start_node(UsingDirective);
        if self.at_contextual("global") {
            self.require_version("global using directive", LanguageVersion::CSharp10);
            self.bump();
        }
        self.bump();
        if self.at(StaticKw) {
            self.bump();
        } else if self.at(Ident) && self.nth(1) == Eq {
            self.bump_n(2);
        }
        self.parse_type();
        self.expect(Semicolon);
        self.finish_node();
    }

    fn namespace_decl(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        self.start_node(Type);
        self.qualified_name();
        self.finish_node();
        if self.at(Semicolon) {
            self.require_version("file-scoped namespace", LanguageVersion::CSharp10);
            self.start_node_at(cp, FileScopedNamespaceDecl);
            self.bump();
            self.namespace_body(false);
            self.finish_node();
            return;
        }
        self.start_node_at(cp, NamespaceDecl);
        if self.expect(LBrace) {
            self.namespace_body(false);
            self.expect(RBrace);
            if self.at(Semicolon) {
                self.bump();
            }
        }
        self.finish_node();
    }

    fn qualified_name(&mut self) {
        loop {
            self.expect(Ident);
            if self.at(Dot) && self.nth(1) == Ident {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Whether a type declaration (not a top-level statement) starts here
    fn type_decl_follows(&self) -> bool {
        if self.at(LBracket) {
            return true;
        }
        let mut i = 0;
        while self.nth(i).is_modifier()
            || ((self.nth_contextual(i, "partial") || self.nth_contextual(i, "file"))
                && self.nth(i + 1) != Eq)
        {
            i += 1;
        }
        match self.nth(i) {
            ClassKw | StructKw | InterfaceKw | EnumKw | NamespaceKw => true,
            DelegateKw => self.nth(i + 1) != LParen && self.nth(i + 1) != LBrace,
            Ident => self.nth_contextual(i, "record") && self.record_follows(i + 1),
            _ => false,
        }
    }

    fn record_follows(&self, n: usize) -> bool {
        matches!(self.nth(n), ClassKw | StructKw)
            || (self.nth(n) == Ident && matches!(self.nth(n + 1), LParen | LBrace | Lt | Colon | Semicolon))
    }

    fn member_declaration(&mut self) {
        let cp = self.checkpoint();
        let start = self.pos;
        self.attributes();
        self.modifiers();
        match self.current() {
            ClassKw => self.type_decl(cp, ClassDecl),
            StructKw => self.type_decl(cp, StructDecl),
            InterfaceKw => self.type_decl(cp, InterfaceDecl),
            EnumKw => self.type_decl(cp, EnumDecl),
            Ident if self.at_contextual("record") && self.record_follows(1) => {
                self.type_decl(cp, RecordDecl)
            }
            NamespaceKw => self.namespace_decl(),
            DelegateKw => self.delegate_decl(cp),
            EventKw => self.event_decl(cp),
            Tilde => {
                self.start_node_at(cp, DestructorDecl);
                self.bump();
                self.expect(Ident);
                self.parameter_list_or_error();
                self.member_body();
                self.finish_node();
            }
            ImplicitKw | ExplicitKw => {
                self.start_node_at(cp, ConversionOperatorDecl);
                self.bump();
                self.expect(OperatorKw);
                if self.at(CheckedKw) {
                    self.bump();
                }
                self.parse_type();
                self.parameter_list_or_error();
                self.member_body();
                self.finish_node();
            }
            Ident if self.nth(1) == LParen => {
                self.start_node_at(cp, ConstructorDecl);
                self.bump();
                self.parameter_list();
                if self.at(Colon) {
                    self.start_node(ConstructorInitializer);
                    self.bump();
                    if matches!(self.current(), BaseKw | ThisKw) {
                        self.bump();
                    } else {
                        self.error("base or this expected");
                    }
                    if self.at(LParen) {
                        self.arg_list();
                    } else {
                        self.error("( expected");
                    }
                    self.finish_node();
                }
                self.member_body();
                self.finish_node();
            }
            _ if self.scan_type(0).is_some() => self.typed_member(cp),
            _ if self.pos > start => {
                self.error("Member declaration expected");
                self.wrap(cp, Error);
            }
            _ => {
                let message = format!("Invalid token '{}' in class, record, struct, or interface member declaration", self.nth_text(0));
                self.error_and_bump(message);
            }
        }
    }

    fn modifiers(&mut self) {
        loop {
            let next = self.nth(1);
            let contextual = ["partial", "async", "required", "file"]
                .iter()
                .any(|text| self.at_contextual(text));
            if self.current().is_modifier()
                || (contextual && (next == Ident || next.is_keyword()))
            {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn type_decl(&mut self, cp: Checkpoint, kind: CsSyntaxKind) {
        self.start_node_at(cp, kind);
        if kind == RecordDecl {
            self.require_version("records", LanguageVersion::CSharp9);
            self.bump();
            if matches!(self.current(), ClassKw | StructKw) {
                self.bump();
            }
        } else {
            self.bump();
        }
        self.expect(Ident);
        if self.at(Lt) {
            self.type_parameter_list();
        }
        if self.at(LParen) {
            if kind != RecordDecl {
                self.require_version("primary constructors", LanguageVersion::CSharp12);
            }
            self.parameter_list();
        }
        if self.at(Colon) {
            self.base_list();
        }
        self.constraint_clauses();
        match self.current() {
            LBrace if kind == EnumDecl => self.enum_body(),
            LBrace => {
                self.bump();
                while !self.at(RBrace) && !self.at_eof() {
                    let before = self.pos;
                    self.member_declaration();
                    if self.pos == before {
                        self.error_and_bump("Invalid token in member declaration");
                    }
                }
                self.expect(RBrace);
            }
            Semicolon if kind == RecordDecl => {}
            _ => self.error("{ expected"),
        }
        if self.at(Semicolon) {
            self.bump();
        }
        self.finish_node();
    }

    fn base_list(&mut self) {
        self.start_node(BaseList);
        self.bump();
        loop {
            self.parse_type();
            if self.at(LParen) {
                self.arg_list();
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.finish_node();
    }

    pub(super) fn constraint_clauses(&mut self) {
        while self.at_contextual("where") && self.nth(1) == Ident && self.nth(2) == Colon {
            self.start_node(ConstraintClause);
            self.bump_n(3);
            loop {
                match self.current() {
                    ClassKw | StructKw => {
                        self.bump();
                        if self.at(Question) {
                            self.bump();
                        }
                    }
                    NewKw => {
                        self.bump();
                        self.expect(LParen);
                        self.expect(RParen);
                    }
                    DefaultKw => self.bump(),
                    _ => {
                        self.parse_type();
                    }
                }
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
            self.finish_node();
        }
    }

    fn enum_body(&mut self) {
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.start_node(EnumMember);
            self.attributes();
            self.expect(Ident);
            if self.at(Eq) {
                self.start_node(EqualsValue);
                self.bump();
                self.expr();
                self.finish_node();
            }
            self.finish_node();
            if self.pos == before {
                self.error_and_bump("Identifier expected");
                continue;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBrace);
    }

    fn delegate_decl(&mut self, cp: Checkpoint) {
        self.start_node_at(cp, DelegateDecl);
        self.bump();
        self.parse_type();
        self.expect(Ident);
        if self.at(Lt) {
            self.type_parameter_list();
        }
        self.parameter_list_or_error();
        self.constraint_clauses();
        self.expect(Semicolon);
        self.finish_node();
    }

    fn event_decl(&mut self, cp: Checkpoint) {
        self.bump();
        let type_cp = self.checkpoint();
        self.parse_type();
        let explicit = self.explicit_interface_len();
        if explicit.is_some() || (self.at(Ident) && self.nth(1) == LBrace) {
            self.start_node_at(cp, EventDecl);
            if let Some(len) = explicit {
                self.explicit_interface_specifier(len);
            }
            self.expect(Ident);
            if self.at(LBrace) {
                self.accessor_list();
            } else {
                self.expect(Semicolon);
            }
            self.finish_node();
        } else {
            self.start_node_at(cp, EventFieldDecl);
            self.start_node_at(type_cp, VariableDecl);
            self.declarators();
            self.finish_node();
            self.expect(Semicolon);
            self.finish_node();
        }
    }

    /// Members that start with a type: fields, methods, properties, indexers, operators
    fn typed_member(&mut self, cp: Checkpoint) {
        let type_cp = self.checkpoint();
        self.parse_type();
        let explicit = self.explicit_interface_len();
        if explicit.is_none() && self.at(Ident) && !matches!(self.nth(1), LParen | Lt | LBrace | FatArrow) {
            self.start_node_at(cp, FieldDecl);
            self.start_node_at(type_cp, VariableDecl);
            self.declarators();
            self.finish_node();
            self.expect(Semicolon);
            self.finish_node();
            return;
        }
        let kind = match (explicit, self.current()) {
            (Some(len), _) => match self.nth(len) {
                ThisKw => IndexerDecl,
                OperatorKw => OperatorDecl,
                _ if matches!(self.nth(len + 1), LBrace | FatArrow) => PropertyDecl,
                _ => MethodDecl,
            },
            (None, ThisKw) => IndexerDecl,
            (None, OperatorKw) => OperatorDecl,
            (None, Ident) if matches!(self.nth(1), LBrace | FatArrow) => PropertyDecl,
            (None, Ident) => MethodDecl,
            (None, _) => {
                self.error("Identifier expected");
                self.start_node_at(cp, FieldDecl);
                self.expect(Semicolon);
                self.finish_node();
                return;
            }
        };
        self.start_node_at(cp, kind);
        if let Some(len) = explicit {
            self.explicit_interface_specifier(len);
        }
        match kind {
            IndexerDecl => {
                self.bump();
                self.bracketed_parameter_list();
                self.property_body();
            }
            OperatorDecl => {
                self.bump();
                if self.at(CheckedKw) {
                    self.bump();
                }
                self.operator_token();
                self.parameter_list_or_error();
                self.member_body();
            }
            PropertyDecl => {
                self.bump();
                self.property_body();
            }
            _ => {
                self.bump();
                if self.at(Lt) {
                    self.type_parameter_list();
                }
                self.parameter_list_or_error();
                self.constraint_clauses();
                self.member_body();
            }
        }
        self.finish_node();
    }

    /// Overloadable operator tokens, with `>>` and `>>>` split by the lexer
    fn operator_token(&mut self) {
        match self.current() {
            Gt => {
                let mut n = 1;
                while n < 3 && self.nth(n) == Gt && self.adjacent(n) {
                    n += 1;
                }
                self.bump_n(n);
            }
            Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus | Star | Slash | Percent
            | Amp | Pipe | Caret | LtLt | EqEq | BangEq | Lt | LtEq | GtEq | TrueKw
            | FalseKw => self.bump(),
            _ => self.error("Overloadable operator expected"),
        }
    }

    /// Token count of an `IFoo.` or `IFoo<T>.` prefix before a member name
    fn explicit_interface_len(&self) -> Option<usize> {
        let mut i = 0;
        let mut last_dot = None;
        loop {
            if self.nth(i) != Ident {
                break;
            }
            i += 1;
            if self.nth(i) == Lt
                && let Some(end) = self.scan_type_args(i)
            {
                i = end;
            }
            if self.nth(i) != Dot {
                break;
            }
            last_dot = Some(i);
            i += 1;
            if matches!(self.nth(i), ThisKw | OperatorKw) {
                break;
            }
        }
        last_dot.map(|dot| dot + 1)
    }

    fn explicit_interface_specifier(&mut self, len: usize) {
        let end = self.pos + len;
        self.start_node(ExplicitInterfaceSpecifier);
        self.start_node(Type);
        while self.pos < end - 1 && !self.at_eof() {
            if self.at(Lt) {
                self.type_arg_list();
            } else {
                self.bump();
            }
        }
        self.finish_node();
        self.expect(Dot);
        self.finish_node();
    }

    fn property_body(&mut self) {
        match self.current() {
            LBrace => {
                self.accessor_list();
                if self.at(Eq) {
                    self.start_node(EqualsValue);
                    self.bump();
                    self.expr();
                    self.finish_node();
                    self.expect(Semicolon);
                }
            }
            FatArrow => {
                self.arrow_clause();
                self.expect(Semicolon);
            }
            _ => self.error("{ expected"),
        }
    }

    fn accessor_list(&mut self) {
        self.start_node(AccessorList);
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.start_node(Accessor);
            self.attributes();
            while matches!(self.current(), PrivateKw | ProtectedKw | InternalKw | ReadonlyKw) {
                self.bump();
            }
            if self.at(Ident) {
                self.bump();
                match self.current() {
                    LBrace => self.block(),
                    FatArrow => {
                        self.arrow_clause();
                        self.expect(Semicolon);
                    }
                    Semicolon => self.bump(),
                    RBrace | Eof => self.error("{ or ; expected"),
                    Ident if matches!(self.nth_text(0), "get" | "set" | "init" | "add" | "remove") => {
                        self.error("{ or ; expected")
                    }
                    _ => self.block_missing_open(),
                }
            } else {
                self.error("get, set or init expected");
            }
            self.finish_node();
            if self.pos == before {
                self.error_and_bump("Invalid token in accessor list");
            }
        }
        self.expect(RBrace);
        self.finish_node();
    }

    fn arrow_clause(&mut self) {
        self.start_node(ArrowExprClause);
        self.bump();
        self.expr();
        self.finish_node();
    }

    /// Block, `=> expr;` or `;`
    pub(super) fn member_body(&mut self) {
        match self.current() {
            LBrace => self.block(),
            FatArrow => {
                self.arrow_clause();
                self.expect(Semicolon);
            }
            Semicolon => self.bump(),
            _ => self.error("{ or ; expected"),
        }
    }

    pub(super) fn type_parameter_list(&mut self) {
        self.start_node(TypeParameterList);
        self.bump();
        loop {
            self.start_node(TypeParameter);
            self.attributes();
            if matches!(self.current(), InKw | OutKw) {
                self.bump();
            }
            self.expect(Ident);
            self.finish_node();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(Gt);
        self.finish_node();
    }

    fn parameter_list_or_error(&mut self) {
        if self.at(LParen) {
            self.parameter_list();
        } else {
            self.error("( expected");
        }
    }

    pub(super) fn parameter_list(&mut self) {
        self.start_node(ParameterList);
        self.bump();
        self.parameters(RParen);
        self.expect(RParen);
        self.finish_node();
    }

    fn bracketed_parameter_list(&mut self) {
        self.start_node(BracketedParameterList);
        self.expect(LBracket);
        self.parameters(RBracket);
        self.expect(RBracket);
        self.finish_node();
    }

    fn parameters(&mut self, close: CsSyntaxKind) {
        while !self.at(close) && !self.at_eof() {
            let before = self.pos;
            self.parameter();
            if self.pos == before {
                self.error_and_bump("Invalid token in parameter list");
                continue;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn parameter(&mut self) {
        self.start_node(Parameter);
        self.attributes();
        while matches!(self.current(), ThisKw | RefKw | OutKw | InKw | ParamsKw | ReadonlyKw)
            || (self.at_contextual("scoped") && self.nth(1) != Comma && self.nth(1) != RParen)
        {
            self.bump();
        }
        if self.scan_type(0).is_some() {
            self.parse_type();
            self.expect(Ident);
            if self.at(Eq) {
                self.start_node(EqualsValue);
                self.bump();
                self.expr();
                self.finish_node();
            }
        } else {
            self.error("Type expected");
        }
        self.finish_node();
    }

    pub(super) fn attributes(&mut self) {
        while self.at(LBracket) {
            self.start_node(AttributeList);
            self.bump();
            if self.nth(1) == Colon && (self.at(Ident) || self.current().is_keyword()) {
                self.bump_n(2);
            }
            loop {
                self.start_node(Attribute);
                self.parse_type();
                if self.at(LParen) {
                    self.arg_list();
                }
                self.finish_node();
                if self.at(Comma) && self.nth(1) != RBracket {
                    self.bump();
                } else {
                    break;
                }
            }
            if self.at(Comma) {
                self.bump();
            }
            self.expect(RBracket);
            self.finish_node();
        }
    }
}
