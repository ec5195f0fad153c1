//! Statements, blocks and local declarations

use super::{Parser, can_start_expr};
use crate::cst::CsSyntaxKind::*;

impl Parser<'_> {
    pub(super) fn block(&mut self) {
        self.start_node(Block);
        self.bump();
        self.statements_until_close();
        self.expect(RBrace);
        self.finish_node();
    }

    /// A body whose opening brace is missing: `get return x; }`
    pub(super) fn block_missing_open(&mut self) {
        self.error("{ expected");
        self.start_node(Block);
        self.statements_until_close();
        self.expect(RBrace);
        self.finish_node();
    }

    fn statements_until_close(&mut self) {
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_and_bump("Invalid token in statement");
            }
        }
    }

    fn block_or_error(&mut self) {
        if self.at(LBrace) {
            self.block();
        } else {
            self.error("{ expected");
        }
    }

    pub(super) fn statement(&mut self) {
        if !self.enter() {
            return;
        }
        match self.current() {
            LBrace => self.block(),
            RBrace | Eof => self.error("Statement expected"),
            Semicolon => self.keyword_statement(EmptyStmt),
            IfKw => self.if_statement(),
            WhileKw => {
                self.start_node(WhileStmt);
                self.bump();
                self.paren_condition();
                self.statement();
                self.finish_node();
            }
            DoKw => {
                self.start_node(DoStmt);
                self.bump();
                self.statement();
                self.expect(WhileKw);
                self.paren_condition();
                self.expect(Semicolon);
                self.finish_node();
            }
            ForKw => self.for_statement(),
            ForeachKw => self.foreach_statement(),
            Ident if self.at_contextual("await") && self.nth(1) == ForeachKw => {
                self.foreach_statement()
            }
            Ident if self.at_contextual("await") && self.nth(1) == UsingKw => {
                self.using_statement()
            }
            SwitchKw if self.nth(1) == LParen => self.switch_statement(),
            BreakKw | ContinueKw => {
                let kind = if self.at(BreakKw) { BreakStmt } else { ContinueStmt };
                self.start_node(kind);
                self.bump();
                self.expect(Semicolon);
                self.finish_node();
            }
            ReturnKw | ThrowKw => {
                let kind = if self.at(ReturnKw) { ReturnStmt } else { ThrowStmt };
                self.start_node(kind);
                self.bump();
                if !self.at(Semicolon) {
                    self.expr();
                }
                self.expect(Semicolon);
                self.finish_node();
            }
            GotoKw => {
                self.start_node(GotoStmt);
                self.bump();
                match self.current() {
                    CaseKw => {
                        self.bump();
                        self.expr();
                    }
                    DefaultKw => self.bump(),
                    _ => {
                        self.expect(Ident);
                    }
                }
                self.expect(Semicolon);
                self.finish_node();
            }
            Ident if self.at_contextual("yield") && matches!(self.nth(1), ReturnKw | BreakKw) => {
                self.start_node(YieldStmt);
                self.bump();
                if self.at(ReturnKw) {
                    self.bump();
                    self.expr();
                } else {
                    self.bump();
                }
                self.expect(Semicolon);
                self.finish_node();
            }
            TryKw => self.try_statement(),
            CheckedKw | UncheckedKw if self.nth(1) == LBrace => {
                self.start_node(CheckedStmt);
                self.bump();
                self.block();
                self.finish_node();
            }
            UnsafeKw if self.nth(1) == LBrace => {
                self.start_node(UnsafeStmt);
                self.bump();
                self.block();
                self.finish_node();
            }
            FixedKw => {
                self.start_node(FixedStmt);
                self.bump();
                self.expect(LParen);
                self.variable_decl();
                self.expect(RParen);
                self.statement();
                self.finish_node();
            }
            LockKw => {
                self.start_node(LockStmt);
                self.bump();
                self.paren_condition();
                self.statement();
                self.finish_node();
            }
            UsingKw => self.using_statement(),
            ConstKw => {
                self.start_node(LocalDeclStmt);
                self.bump();
                self.variable_decl();
                self.expect(Semicolon);
                self.finish_node();
            }
            Ident if self.nth(1) == Colon => {
                self.start_node(LabeledStmt);
                self.bump_n(2);
                self.statement();
                self.finish_node();
            }
            _ if self.local_function_follows() => self.local_function(),
            _ if self.local_decl_follows(0) => {
                self.start_node(LocalDeclStmt);
                while matches!(self.current(), StaticKw | RefKw | ReadonlyKw)
                    || self.at_contextual("scoped")
                {
                    self.bump();
                }
                self.variable_decl();
                self.expect(Semicolon);
                self.finish_node();
            }
            kind if !can_start_expr(kind) => {
                let message = format!("Invalid token '{}' in statement", self.nth_text(0));
                self.error_and_bump(message);
            }
            _ => {
                self.start_node(ExprStmt);
                self.expr();
                self.expect(Semicolon);
                self.finish_node();
            }
        }
        self.leave();
    }

    fn keyword_statement(&mut self, kind: crate::cst::CsSyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    fn paren_condition(&mut self) {
        self.expect(LParen);
        self.expr();
        self.expect(RParen);
    }

    fn if_statement(&mut self) {
        self.start_node(IfStmt);
        self.bump();
        self.paren_condition();
        self.statement();
        if self.at(ElseKw) {
            self.start_node(ElseClause);
            self.bump();
            self.statement();
            self.finish_node();
        }
        self.finish_node();
    }

    fn for_statement(&mut self) {
        self.start_node(ForStmt);
        self.bump();
        self.expect(LParen);
        if !self.at(Semicolon) {
            if self.local_decl_follows(0) {
                self.variable_decl();
            } else {
                self.expression_list();
            }
        }
        self.expect(Semicolon);
        if !self.at(Semicolon) {
            self.expr();
        }
        self.expect(Semicolon);
        if !self.at(RParen) {
            self.expression_list();
        }
        self.expect(RParen);
        self.statement();
        self.finish_node();
    }

    fn expression_list(&mut self) {
        loop {
            self.expr();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn foreach_statement(&mut self) {
        self.start_node(ForeachStmt);
        if self.at_contextual("await") {
            self.bump();
        }
        self.bump();
        self.expect(LParen);
        if self.type_then_ident(0).is_some() {
            self.parse_type();
            self.bump();
        } else {
            self.expr();
        }
        self.expect(InKw);
        self.expr();
        self.expect(RParen);
        self.statement();
        self.finish_node();
    }

    fn switch_statement(&mut self) {
        self.start_node(SwitchStmt);
        self.bump();
        self.paren_condition();
        if !self.at(LBrace) {
            self.error("{ expected");
            self.finish_node();
            return;
        }
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            if self.at_switch_label() {
                self.switch_section();
            } else {
                self.error_and_bump("case or default expected");
            }
        }
        self.expect(RBrace);
        self.finish_node();
    }

    fn at_switch_label(&self) -> bool {
        self.at(CaseKw) || (self.at(DefaultKw) && self.nth(1) == Colon)
    }

    fn switch_section(&mut self) {
        self.start_node(SwitchSection);
        while self.at_switch_label() {
            if self.at(CaseKw) {
                self.start_node(CaseLabel);
                self.bump();
                self.pattern();
                if self.at_contextual("when") {
                    self.start_node(WhenClause);
                    self.bump();
                    self.expr();
                    self.finish_node();
                }
                self.expect(Colon);
                self.finish_node();
            } else {
                self.start_node(DefaultLabel);
                self.bump_n(2);
                self.finish_node();
            }
        }
        while !self.at_switch_label() && !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.statement();
            if self.pos == before {
                self.error_and_bump("Invalid token in switch section");
            }
        }
        self.finish_node();
    }

    fn try_statement(&mut self) {
        self.start_node(TryStmt);
        self.bump();
        self.block_or_error();
        while self.at(CatchKw) {
            self.start_node(CatchClause);
            self.bump();
            if self.at(LParen) {
                self.start_node(CatchDecl);
                self.bump();
                self.parse_type();
                if self.at(Ident) {
                    self.bump();
                }
                self.expect(RParen);
                self.finish_node();
            }
            if self.at_contextual("when") {
                self.start_node(CatchFilter);
                self.bump();
                self.paren_condition();
                self.finish_node();
            }
            self.block_or_error();
            self.finish_node();
        }
        if self.at(FinallyKw) {
            self.start_node(FinallyClause);
            self.bump();
            self.block_or_error();
            self.finish_node();
        }
        self.finish_node();
    }

    /// `using (..) stmt` or the declaration form `using var x = ..;`
    fn using_statement(&mut self) {
        let cp = self.checkpoint();
        if self.at_contextual("await") {
            self.bump();
        }
        self.bump();
        if self.at(LParen) {
            self.bump();
            if self.local_decl_follows(0) {
                self.variable_decl();
            } else {
                self.expr();
            }
            self.expect(RParen);
            self.statement();
            self.wrap(cp, UsingStmt);
        } else {
            self.require_version("using declarations", crate::cst::LanguageVersion::CSharp8);
            self.variable_decl();
            self.expect(Semicolon);
            self.wrap(cp, LocalDeclStmt);
        }
    }

    /// `T name =`, `T name;`, `T a, b` at offset `n`, after local modifiers
    pub(super) fn local_decl_follows(&self, n: usize) -> bool {
        let mut i = n;
        while matches!(self.nth(i), StaticKw | RefKw | ReadonlyKw)
            || (self.nth_contextual(i, "scoped") && self.nth(i + 1) == Ident)
        {
            i += 1;
        }
        if self.nth_contextual(i, "await") || self.nth_contextual(i, "yield") {
            return false;
        }
        match self.type_then_ident(i) {
            Some(end) => matches!(self.nth(end + 1), Eq | Semicolon | Comma),
            None => false,
        }
    }

    fn local_function_follows(&self) -> bool {
        let mut i = 0;
        while matches!(self.nth(i), StaticKw | UnsafeKw | ExternKw)
            || (self.nth_contextual(i, "async") && self.nth(i + 1) != FatArrow)
        {
            i += 1;
        }
        if self.nth_contextual(i, "await") || self.nth_contextual(i, "yield") {
            return false;
        }
        match self.type_then_ident(i) {
            Some(end) => matches!(self.nth(end + 1), LParen | Lt),
            None => false,
        }
    }

    fn local_function(&mut self) {
        self.start_node(LocalFunctionStmt);
        while matches!(self.current(), StaticKw | UnsafeKw | ExternKw) || self.at_contextual("async") {
            self.bump();
        }
        self.parse_type();
        self.expect(Ident);
        if self.at(Lt) {
            self.type_parameter_list();
        }
        if self.at(LParen) {
            self.parameter_list();
        } else {
            self.error("( expected");
        }
        self.constraint_clauses();
        self.member_body();
        self.finish_node();
    }

    pub(super) fn variable_decl(&mut self) {
        self.start_node(VariableDecl);
        self.parse_type();
        self.declarators();
        self.finish_node();
    }

    pub(super) fn declarators(&mut self) {
        loop {
            self.declarator();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn declarator(&mut self) {
        self.start_node(VariableDeclarator);
        self.expect(Ident);
        if self.at(LBracket) {
            self.bracketed_arg_list();
        }
        if self.at(Eq) {
            self.start_node(EqualsValue);
            self.bump();
            if self.at(LBrace) {
                self.initializer_expr();
            } else {
                self.expr();
            }
            self.finish_node();
        }
        self.finish_node();
    }
}
