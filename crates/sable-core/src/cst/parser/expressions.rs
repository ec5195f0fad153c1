//! Expressions: precedence climbing over unary, postfix and primary forms

use rowan::Checkpoint;

use super::types::TypeMode;
use super::{Parser, can_start_expr};
use crate::cst::CsSyntaxKind::*;
use crate::cst::LanguageVersion;

/// `??` is right-associative
const COALESCE: u8 = 3;
pub(super) const RELATIONAL: u8 = 10;
pub(super) const SHIFT: u8 = 11;

impl Parser<'_> {
    /// Full expression, assignments and lambdas included
    pub(super) fn expr(&mut self) {
        if !self.enter() {
            return;
        }
        let cp = self.checkpoint();
        self.conditional_expr();
        if let Some(n) = self.assignment_op() {
            if self.at(QuestionQuestionEq) {
                self.require_version("null-coalescing assignment", LanguageVersion::CSharp8);
            }
            self.bump_n(n);
            self.expr();
            self.wrap(cp, AssignmentExpr);
        }
        self.leave();
    }

    fn assignment_op(&self) -> Option<usize> {
        match self.current() {
            Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq
            | LtLtEq | QuestionQuestionEq => Some(1),
            Gt if self.nth(1) == GtEq && self.adjacent(1) => Some(2),
            Gt if self.nth(1) == Gt
                && self.adjacent(1)
                && self.nth(2) == GtEq
                && self.adjacent(2) =>
            {
                Some(3)
            }
            _ => None,
        }
    }

    fn conditional_expr(&mut self) {
        let cp = self.checkpoint();
        self.binary_expr(0);
        if self.at(Question) {
            self.bump();
            self.expr();
            self.expect(Colon);
            self.expr();
            self.wrap(cp, ConditionalExpr);
        }
    }

    /// Binary operators with precedence at least `min`
    pub(super) fn binary_expr(&mut self, min: u8) {
        let cp = self.checkpoint();
        self.range_expr();
        loop {
            match self.current() {
                IsKw if RELATIONAL >= min => {
                    self.bump();
                    self.pattern();
                    self.wrap(cp, IsPatternExpr);
                    continue;
                }
                AsKw if RELATIONAL >= min => {
                    self.bump();
                    self.parse_type_mode(TypeMode::Expr);
                    self.wrap(cp, AsExpr);
                    continue;
                }
                _ => {}
            }
            let Some((prec, n)) = self.binary_op() else {
                break;
            };
            if prec < min {
                break;
            }
            self.bump_n(n);
            let next = if prec == COALESCE { prec } else { prec + 1 };
            self.binary_expr(next);
            self.wrap(cp, BinaryExpr);
        }
    }

    /// Precedence and token count of the binary operator at the cursor
    fn binary_op(&self) -> Option<(u8, usize)> {
        let op = match self.current() {
            QuestionQuestion => (COALESCE, 1),
            PipePipe => (4, 1),
            AmpAmp => (5, 1),
            Pipe => (6, 1),
            Caret => (7, 1),
            Amp => (8, 1),
            EqEq | BangEq => (9, 1),
            Lt | LtEq | GtEq => (RELATIONAL, 1),
            Gt if self.nth(1) == GtEq && self.adjacent(1) => return None,
            Gt if self.nth(1) == Gt && self.adjacent(1) => {
                if self.adjacent(2) && self.nth(2) == GtEq {
                    return None;
                }
                if self.adjacent(2) && self.nth(2) == Gt {
                    (SHIFT, 3)
                } else {
                    (SHIFT, 2)
                }
            }
            Gt => (RELATIONAL, 1),
            LtLt => (SHIFT, 1),
            Plus | Minus => (12, 1),
            Star | Slash | Percent => (13, 1),
            _ => return None,
        };
        Some(op)
    }

    fn range_expr(&mut self) {
        let cp = self.checkpoint();
        if self.at(DotDot) {
            self.require_version("ranges", LanguageVersion::CSharp8);
            self.bump();
            if can_start_expr(self.current()) {
                self.switch_level();
            }
            self.wrap(cp, RangeExpr);
            return;
        }
        self.switch_level();
        if self.at(DotDot) {
            self.bump();
            if can_start_expr(self.current()) {
                self.switch_level();
            }
            self.wrap(cp, RangeExpr);
        }
    }

    fn switch_level(&mut self) {
        let cp = self.checkpoint();
        self.unary_expr();
        loop {
            if self.at(SwitchKw) && self.nth(1) == LBrace {
                self.switch_expr_tail(cp);
            } else if self.at_contextual("with") && self.nth(1) == LBrace {
                self.require_version("with expressions", LanguageVersion::CSharp9);
                self.bump();
                self.initializer_expr();
                self.wrap(cp, WithExpr);
            } else {
                break;
            }
        }
    }

    fn switch_expr_tail(&mut self, cp: Checkpoint) {
        self.require_version("switch expressions", LanguageVersion::CSharp8);
        self.bump();
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.start_node(SwitchExprArm);
            self.pattern();
            if self.at_contextual("when") {
                self.start_node(WhenClause);
                self.bump();
                self.expr();
                self.finish_node();
            }
            self.expect(FatArrow);
            self.expr();
            self.finish_node();
            if self.pos == before {
                self.error_and_bump("Unexpected token in switch expression");
                continue;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBrace);
        self.wrap(cp, SwitchExpr);
    }

    fn unary_expr(&mut self) {
        if !self.enter() {
            return;
        }
        match self.current() {
            Plus | Minus | Bang | Tilde | PlusPlus | MinusMinus | Amp | Star | Caret => {
                let cp = self.checkpoint();
                self.bump();
                self.unary_expr();
                self.wrap(cp, PrefixExpr);
            }
            Ident if self.at_contextual("await") && self.await_operand_follows() => {
                let cp = self.checkpoint();
                self.bump();
                self.unary_expr();
                self.wrap(cp, PrefixExpr);
            }
            LParen if self.is_cast() => {
                let cp = self.checkpoint();
                self.bump();
                self.parse_type_mode(TypeMode::Expr);
                self.expect(RParen);
                self.unary_expr();
                self.wrap(cp, CastExpr);
            }
            _ => self.primary_expr(),
        }
        self.leave();
    }

    fn await_operand_follows(&self) -> bool {
        can_start_expr(self.nth(1))
            && !matches!(
                self.nth(1),
                Plus | Minus | Star | Amp | Caret | DotDot | LBracket | PlusPlus | MinusMinus
            )
    }

    /// `(T)x` versus a parenthesized expression
    fn is_cast(&self) -> bool {
        let Some(end) = self.scan_type_mode(1, TypeMode::Expr) else {
            return false;
        };
        if self.nth(end) != RParen || self.paren_is_lambda(0) {
            return false;
        }
        let first = self.nth(1);
        let after = self.nth(end + 1);
        let definite = first.is_predefined_type()
            || first == LParen
            || matches!(self.nth(end - 1), Question | RBracket | Star);
        if definite {
            return can_start_expr(after);
        }
        after.is_predefined_type()
            || matches!(
                after,
                Ident
                    | NumericLiteral
                    | CharLiteral
                    | StringLiteral
                    | InterpolatedString
                    | LParen
                    | Bang
                    | Tilde
                    | NewKw
                    | ThisKw
                    | BaseKw
                    | TrueKw
                    | FalseKw
                    | NullKw
                    | DefaultKw
                    | TypeofKw
                    | SizeofKw
                    | CheckedKw
                    | UncheckedKw
                    | DelegateKw
                    | StackallocKw
            )
    }

    /// Whether the parenthesis at offset `n` opens a lambda parameter list
    pub(super) fn paren_is_lambda(&self, n: usize) -> bool {
        if self.nth(n) != LParen {
            return false;
        }
        let mut depth = 0usize;
        let mut i = n;
        loop {
            match self.nth(i) {
                LParen => depth += 1,
                RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.nth(i + 1) == FatArrow;
                    }
                }
                Eof | Semicolon | LBrace | RBrace => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn primary_expr(&mut self) {
        let cp = self.checkpoint();
        match self.current() {
            StringLiteral => {
                if self.nth_text(0).starts_with("\"\"\"") {
                    self.require_version("raw string literals", LanguageVersion::CSharp11);
                }
                self.literal();
            }
            NumericLiteral | CharLiteral | InterpolatedString | TrueKw | FalseKw | NullKw => {
                self.literal()
            }
            DefaultKw if self.nth(1) == LParen => self.keyword_call(true),
            DefaultKw => self.literal(),
            TypeofKw | SizeofKw => self.keyword_call(true),
            CheckedKw | UncheckedKw => self.keyword_call(false),
            ThisKw => self.single_token_node(ThisExpr),
            BaseKw => self.single_token_node(BaseExpr),
            k if k.is_predefined_type() => self.single_token_node(NameExpr),
            Ident => {
                if self.ident_primary() {
                    return;
                }
            }
            StaticKw if self.lambda_after_modifiers(1) => {
                self.lambda_expr();
                return;
            }
            LParen => {
                if self.paren_is_lambda(0) {
                    self.lambda_expr();
                    return;
                }
                self.paren_or_tuple();
            }
            NewKw => self.new_expr(),
            StackallocKw => self.stackalloc_expr(),
            DelegateKw => self.anonymous_method(),
            ThrowKw => {
                self.start_node(ThrowExpr);
                self.bump();
                self.expr();
                self.finish_node();
                return;
            }
            RefKw => {
                self.start_node(RefExpr);
                self.bump();
                self.unary_expr();
                self.finish_node();
                return;
            }
            LBrace => {
                self.initializer_expr();
                return;
            }
            LBracket => self.collection_expr(),
            Eof => {
                self.error("Expression expected");
                return;
            }
            RBrace | RParen | RBracket | Semicolon | Comma | Colon => {
                let message = format!("Invalid expression term '{}'", self.nth_text(0));
                self.error(message);
                return;
            }
            _ => {
                let message = format!("Invalid expression term '{}'", self.nth_text(0));
                self.error_and_bump(message);
                return;
            }
        }
        self.postfix(cp);
    }

    fn literal(&mut self) {
        self.single_token_node(LiteralExpr);
    }

    fn single_token_node(&mut self, kind: crate::cst::CsSyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.finish_node();
    }

    /// Identifier-led primaries; returns true when no postfix may follow
    fn ident_primary(&mut self) -> bool {
        if self.nth(1) == FatArrow {
            self.lambda_expr();
            return true;
        }
        if self.at_contextual("async") {
            if self.nth(1) == DelegateKw {
                self.anonymous_method();
                return true;
            }
            if self.lambda_after_modifiers(1) {
                self.lambda_expr();
                return true;
            }
        }
        if self.at_contextual("from") && self.query_follows() {
            self.query_expr();
            return true;
        }
        if self.at_contextual("var") && self.designation_follows(1) {
            self.start_node(DeclarationExpr);
            self.single_token_node(Type);
            self.designation_parens();
            self.finish_node();
            return true;
        }
        self.start_node(NameExpr);
        self.bump();
        if self.at(ColonColon) && self.nth(1) == Ident {
            self.bump_n(2);
        }
        if self.at(Lt) && self.generic_args_follow(0) {
            self.type_arg_list();
        }
        self.finish_node();
        false
    }

    /// `async`/`static` modifiers at offsets before `n` lead into a lambda
    fn lambda_after_modifiers(&self, mut n: usize) -> bool {
        while self.nth(n) == StaticKw || self.nth_contextual(n, "async") {
            n += 1;
        }
        (self.nth(n) == Ident && self.nth(n + 1) == FatArrow) || self.paren_is_lambda(n)
    }

    pub(super) fn lambda_expr(&mut self) {
        self.start_node(LambdaExpr);
        while (self.at_contextual("async") || self.at(StaticKw)) && self.nth(1) != FatArrow {
            self.bump();
        }
        if self.at(LParen) {
            self.lambda_parameter_list();
        } else {
            self.start_node(Parameter);
            self.expect(Ident);
            self.finish_node();
        }
        self.expect(FatArrow);
        if self.at(LBrace) {
            self.block();
        } else {
            self.expr();
        }
        self.finish_node();
    }

    fn lambda_parameter_list(&mut self) {
        self.start_node(ParameterList);
        self.bump();
        while !self.at(RParen) && !self.at_eof() {
            let before = self.pos;
            self.start_node(Parameter);
            self.attributes();
            while matches!(self.current(), RefKw | OutKw | InKw | ParamsKw | ReadonlyKw)
                || (self.at_contextual("scoped") && self.nth(1) != Comma && self.nth(1) != RParen)
            {
                self.bump();
            }
            if self.type_then_ident(0).is_some() {
                self.parse_type();
            }
            self.expect(Ident);
            if self.at(Eq) {
                self.start_node(EqualsValue);
                self.bump();
                self.expr();
                self.finish_node();
            }
            self.finish_node();
            if self.pos == before {
                self.error_and_bump("Unexpected token in parameter list");
                continue;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen);
        self.finish_node();
    }

    fn anonymous_method(&mut self) {
        self.start_node(AnonymousMethodExpr);
        if self.at_contextual("async") {
            self.bump();
        }
        self.bump();
        if self.at(LParen) {
            self.parameter_list();
        }
        if self.at(LBrace) {
            self.block();
        } else {
            self.error("{ expected");
        }
        self.finish_node();
    }

    /// `(a, b)` designation after `var`, possibly nested, followed by `=` or `in`
    fn designation_follows(&self, n: usize) -> bool {
        if self.nth(n) != LParen {
            return false;
        }
        let mut depth = 0usize;
        let mut i = n;
        loop {
            match self.nth(i) {
                LParen => depth += 1,
                RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(self.nth(i + 1), Eq | InKw);
                    }
                }
                Ident | Comma => {}
                _ => return false,
            }
            i += 1;
        }
    }

    pub(super) fn designation_parens(&mut self) {
        self.bump();
        loop {
            if self.at(LParen) {
                self.designation_parens();
            } else {
                self.expect(Ident);
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen);
    }

    fn paren_or_tuple(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        let element = self.checkpoint();
        let named = self.tuple_element();
        if named || self.at(Comma) {
            self.wrap(element, Argument);
            while self.at(Comma) {
                self.bump();
                self.start_node(Argument);
                self.tuple_element();
                self.finish_node();
            }
            self.expect(RParen);
            self.wrap(cp, TupleExpr);
        } else {
            self.expect(RParen);
            self.wrap(cp, ParenExpr);
        }
    }

    /// One tuple element; returns whether it carried a `name:` label
    fn tuple_element(&mut self) -> bool {
        let mut named = false;
        if self.at(Ident) && self.nth(1) == Colon {
            self.bump_n(2);
            named = true;
        }
        if self.declaration_follows() {
            self.declaration_expr();
        } else {
            self.expr();
        }
        named
    }

    /// `T name` inside a tuple or after `out`
    fn declaration_follows(&self) -> bool {
        if self.at_contextual("await") {
            return false;
        }
        match self.type_then_ident(0) {
            Some(end) => matches!(self.nth(end + 1), Comma | RParen),
            None => self.at_contextual("var") && self.nth(1) == LParen,
        }
    }

    fn declaration_expr(&mut self) {
        self.start_node(DeclarationExpr);
        self.parse_type();
        if self.at(LParen) {
            self.designation_parens();
        } else {
            self.expect(Ident);
        }
        self.finish_node();
    }

    pub(super) fn arg_list(&mut self) {
        self.start_node(ArgList);
        self.bump();
        self.arguments(RParen);
        self.expect(RParen);
        self.finish_node();
    }

    pub(super) fn bracketed_arg_list(&mut self) {
        self.start_node(BracketedArgList);
        self.bump();
        self.arguments(RBracket);
        self.expect(RBracket);
        self.finish_node();
    }

    fn arguments(&mut self, close: crate::cst::CsSyntaxKind) {
        if self.at(close) {
            return;
        }
        loop {
            let before = self.pos;
            self.argument();
            if self.pos == before {
                break;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn argument(&mut self) {
        self.start_node(Argument);
        if self.at(Ident) && self.nth(1) == Colon {
            self.bump_n(2);
        }
        let out = self.at(OutKw);
        if matches!(self.current(), RefKw | OutKw | InKw) {
            self.bump();
        }
        if out && self.declaration_follows() {
            self.declaration_expr();
        } else {
            self.expr();
        }
        self.finish_node();
    }

    fn postfix(&mut self, cp: Checkpoint) {
        loop {
            match self.current() {
                Dot | Arrow | ColonColon => {
                    self.bump();
                    self.member_name();
                    self.wrap(cp, MemberAccessExpr);
                }
                QuestionDot => {
                    self.bump();
                    if self.at(LBracket) {
                        self.bracketed_arg_list();
                    } else {
                        self.member_name();
                    }
                    self.wrap(cp, ConditionalAccessExpr);
                }
                Question if self.nth(1) == LBracket && self.adjacent(1) => {
                    self.bump();
                    self.bracketed_arg_list();
                    self.wrap(cp, ConditionalAccessExpr);
                }
                LParen => {
                    self.arg_list();
                    self.wrap(cp, InvocationExpr);
                }
                LBracket => {
                    self.bracketed_arg_list();
                    self.wrap(cp, ElementAccessExpr);
                }
                PlusPlus | MinusMinus | Bang => {
                    self.bump();
                    self.wrap(cp, PostfixExpr);
                }
                _ => break,
            }
        }
    }

    fn member_name(&mut self) {
        self.start_node(NameExpr);
        self.expect(Ident);
        if self.at(Lt) && self.generic_args_follow(0) {
            self.type_arg_list();
        }
        self.finish_node();
    }

    fn keyword_call(&mut self, type_operand: bool) {
        self.start_node(KeywordCallExpr);
        self.bump();
        self.expect(LParen);
        if type_operand {
            self.parse_type();
        } else {
            self.expr();
        }
        self.expect(RParen);
        self.finish_node();
    }

    fn new_expr(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        match self.current() {
            LBrace => {
                self.bump();
                while !self.at(RBrace) && !self.at_eof() {
                    let before = self.pos;
                    self.expr();
                    if self.pos == before {
                        break;
                    }
                    if self.at(Comma) {
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.expect(RBrace);
                self.wrap(cp, AnonymousObjectCreationExpr);
            }
            LBracket => {
                self.bump();
                while self.at(Comma) {
                    self.bump();
                }
                self.expect(RBracket);
                if self.at(LBrace) {
                    self.initializer_expr();
                } else {
                    self.error("{ expected");
                }
                self.wrap(cp, ImplicitArrayCreationExpr);
            }
            LParen => {
                self.require_version("target-typed object creation", LanguageVersion::CSharp9);
                self.arg_list();
                if self.at(LBrace) {
                    self.initializer_expr();
                }
                self.wrap(cp, ImplicitObjectCreationExpr);
            }
            _ => {
                self.parse_type_mode(TypeMode::NoArray);
                if self.at(LBracket) {
                    while self.at(LBracket) {
                        self.array_rank_with_sizes();
                    }
                    if self.at(LBrace) {
                        self.initializer_expr();
                    }
                    self.wrap(cp, ArrayCreationExpr);
                } else {
                    let mut complete = false;
                    if self.at(LParen) {
                        self.arg_list();
                        complete = true;
                    }
                    if self.at(LBrace) {
                        self.initializer_expr();
                        complete = true;
                    }
                    if !complete {
                        self.error("( or [ or { expected");
                    }
                    self.wrap(cp, ObjectCreationExpr);
                }
            }
        }
    }

    fn array_rank_with_sizes(&mut self) {
        self.start_node(ArrayRank);
        self.bump();
        while !self.at(RBracket) && !self.at_eof() {
            if !self.at(Comma) {
                let before = self.pos;
                self.expr();
                if self.pos == before {
                    break;
                }
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBracket);
        self.finish_node();
    }

    fn stackalloc_expr(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        if self.at(LBracket) {
            self.bump();
            self.expect(RBracket);
            if self.at(LBrace) {
                self.initializer_expr();
            } else {
                self.error("{ expected");
            }
            self.wrap(cp, ImplicitStackAllocExpr);
        } else {
            self.parse_type_mode(TypeMode::NoArray);
            if self.at(LBracket) {
                self.array_rank_with_sizes();
            }
            if self.at(LBrace) {
                self.initializer_expr();
            }
            self.wrap(cp, StackAllocExpr);
        }
    }

    /// `{ a, b }`, `{ X = 1 }`, `{ [0] = a }`, `{ { 1, 2 }, { 3, 4 } }`
    pub(super) fn initializer_expr(&mut self) {
        self.start_node(InitializerExpr);
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            if self.at(LBracket) && self.indexer_initializer_follows() {
                let cp = self.checkpoint();
                self.bracketed_arg_list();
                self.expect(Eq);
                self.expr();
                self.wrap(cp, AssignmentExpr);
            } else {
                self.expr();
            }
            if self.pos == before {
                self.error_and_bump("Unexpected token in initializer");
                continue;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBrace);
        self.finish_node();
    }

    fn indexer_initializer_follows(&self) -> bool {
        let mut depth = 0usize;
        let mut i = 0;
        loop {
            match self.nth(i) {
                LBracket => depth += 1,
                RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return self.nth(i + 1) == Eq;
                    }
                }
                Eof | Semicolon | RBrace => return false,
                _ => {}
            }
            i += 1;
        }
    }

    fn collection_expr(&mut self) {
        self.require_version("collection expressions", LanguageVersion::CSharp12);
        self.start_node(CollectionExpr);
        self.bump();
        while !self.at(RBracket) && !self.at_eof() {
            let before = self.pos;
            self.expr();
            if self.pos == before {
                break;
            }
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RBracket);
        self.finish_node();
    }

    fn query_follows(&self) -> bool {
        (self.nth(1) == Ident && self.nth(2) == InKw)
            || self
                .type_then_ident(1)
                .is_some_and(|end| self.nth(end + 1) == InKw)
    }

    fn query_expr(&mut self) {
        self.start_node(QueryExpr);
        loop {
            let before = self.pos;
            let keyword = if self.at(Ident) { self.nth_text(0) } else { "" };
            match keyword {
                "from" | "join" => {
                    self.bump();
                    if self
                        .type_then_ident(0)
                        .is_some_and(|end| self.nth(end + 1) == InKw)
                    {
                        self.parse_type();
                    }
                    self.expect(Ident);
                    self.expect(InKw);
                    self.expr();
                    if keyword == "join" {
                        self.contextual_keyword("on");
                        self.expr();
                        self.contextual_keyword("equals");
                        self.expr();
                        if self.at_contextual("into") {
                            self.bump();
                            self.expect(Ident);
                        }
                    }
                }
                "let" => {
                    self.bump();
                    self.expect(Ident);
                    self.expect(Eq);
                    self.expr();
                }
                "where" | "select" => {
                    self.bump();
                    self.expr();
                }
                "orderby" => {
                    self.bump();
                    loop {
                        self.expr();
                        if self.at_contextual("ascending") || self.at_contextual("descending") {
                            self.bump();
                        }
                        if self.at(Comma) {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                "group" => {
                    self.bump();
                    self.expr();
                    self.contextual_keyword("by");
                    self.expr();
                }
                "into" => {
                    self.bump();
                    self.expect(Ident);
                }
                _ => break,
            }
            if self.pos == before {
                break;
            }
        }
        self.finish_node();
    }

    fn contextual_keyword(&mut self, text: &str) {
        if self.at_contextual(text) {
            self.bump();
        } else {
            self.error(format!("'{text}' expected"));
        }
    }
}
