//! Patterns after `is`, in `case` labels and in switch expression arms

use super::expressions::SHIFT;
use super::types::TypeMode;
use super::{Parser, can_start_expr};
use crate::cst::CsSyntaxKind::{self, *};
use crate::cst::LanguageVersion;

impl Parser<'_> {
    pub(super) fn pattern(&mut self) {
        if !self.enter() {
            return;
        }
        self.or_pattern();
        self.leave();
    }

    fn or_pattern(&mut self) {
        let cp = self.checkpoint();
        self.and_pattern();
        while self.at_contextual("or") && can_start_pattern(self.nth(1)) {
            self.require_version("pattern combinators", LanguageVersion::CSharp9);
            self.bump();
            self.and_pattern();
            self.wrap(cp, BinaryPattern);
        }
    }

    fn and_pattern(&mut self) {
        let cp = self.checkpoint();
        self.not_pattern();
        while self.at_contextual("and") && can_start_pattern(self.nth(1)) {
            self.require_version("pattern combinators", LanguageVersion::CSharp9);
            self.bump();
            self.not_pattern();
            self.wrap(cp, BinaryPattern);
        }
    }

    fn not_pattern(&mut self) {
        if self.at_contextual("not") && can_start_pattern(self.nth(1)) {
            self.require_version("pattern combinators", LanguageVersion::CSharp9);
            self.start_node(UnaryPattern);
            self.bump();
            self.not_pattern();
            self.finish_node();
        } else {
            self.primary_pattern();
        }
    }

    fn primary_pattern(&mut self) {
        match self.current() {
            Lt | LtEq | Gt | GtEq | EqEq | BangEq => {
                self.require_version("relational patterns", LanguageVersion::CSharp9);
                self.start_node(RelationalPattern);
                self.bump();
                self.binary_expr(SHIFT);
                self.finish_node();
            }
            LParen => self.paren_pattern(),
            LBrace => {
                let cp = self.checkpoint();
                self.property_pattern_clause();
                self.designation();
                self.wrap(cp, RecursivePattern);
            }
            LBracket => self.list_pattern(),
            Ident if self.at_contextual("var") && matches!(self.nth(1), Ident | LParen) => {
                self.start_node(VarPattern);
                self.bump();
                if self.at(LParen) {
                    self.designation_parens();
                } else {
                    self.bump();
                }
                self.finish_node();
            }
            Ident
                if self.at_contextual("_")
                    && !matches!(self.nth(1), Dot | LParen | Lt | ColonColon) =>
            {
                self.start_node(DiscardPattern);
                self.bump();
                self.finish_node();
            }
            _ => self.type_or_constant_pattern(),
        }
    }

    fn type_or_constant_pattern(&mut self) {
        if let Some(end) = self.scan_type_mode(0, TypeMode::Expr) {
            let next = self.nth(end);
            let first = self.current();
            if next == Ident && !matches!(self.nth_text(end), "and" | "or" | "when") {
                self.start_node(DeclarationPattern);
                self.parse_type_mode(TypeMode::Expr);
                self.bump();
                self.finish_node();
                return;
            }
            if matches!(next, LParen | LBrace) && first != LParen {
                let cp = self.checkpoint();
                self.parse_type_mode(TypeMode::Expr);
                if self.at(LParen) {
                    self.positional_clause();
                }
                if self.at(LBrace) {
                    self.property_pattern_clause();
                }
                self.designation();
                self.wrap(cp, RecursivePattern);
                return;
            }
            let decorated = matches!(self.nth(end - 1), Question | RBracket);
            if decorated || (first.is_predefined_type() && next != Dot) {
                self.start_node(TypePattern);
                self.parse_type_mode(TypeMode::Expr);
                self.finish_node();
                return;
            }
        }
        self.start_node(ConstantPattern);
        self.binary_expr(SHIFT);
        self.finish_node();
    }

    fn paren_pattern(&mut self) {
        let cp = self.checkpoint();
        self.bump();
        if self.at(RParen) {
            self.bump();
            self.wrap(cp, PositionalPatternClause);
            self.recursive_tail(cp);
            return;
        }
        let element = self.checkpoint();
        let named = self.subpattern_name();
        self.pattern();
        if named || self.at(Comma) {
            self.wrap(element, Subpattern);
            while self.at(Comma) {
                self.bump();
                self.subpattern();
            }
            self.expect(RParen);
            self.wrap(cp, PositionalPatternClause);
            self.recursive_tail(cp);
        } else {
            self.expect(RParen);
            self.wrap(cp, ParenPattern);
        }
    }

    fn recursive_tail(&mut self, cp: rowan::Checkpoint) {
        if self.at(LBrace) {
            self.property_pattern_clause();
        }
        self.designation();
        self.wrap(cp, RecursivePattern);
    }

    fn positional_clause(&mut self) {
        self.start_node(PositionalPatternClause);
        self.bump();
        while !self.at(RParen) && !self.at_eof() {
            let before = self.pos;
            self.subpattern();
            if self.pos == before {
                break;
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

    pub(super) fn property_pattern_clause(&mut self) {
        self.require_version("property patterns", LanguageVersion::CSharp8);
        self.start_node(PropertyPatternClause);
        self.bump();
        while !self.at(RBrace) && !self.at_eof() {
            let before = self.pos;
            self.subpattern();
            if self.pos == before {
                self.error_and_bump("Unexpected token in property pattern");
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

    fn subpattern(&mut self) {
        self.start_node(Subpattern);
        self.subpattern_name();
        self.pattern();
        self.finish_node();
    }

    /// `Name:` or the extended `A.B.C:` form
    fn subpattern_name(&mut self) -> bool {
        let mut i = 0;
        loop {
            if self.nth(i) != Ident {
                return false;
            }
            i += 1;
            match self.nth(i) {
                Colon => {
                    self.bump_n(i + 1);
                    return true;
                }
                Dot => i += 1,
                _ => return false,
            }
        }
    }

    fn list_pattern(&mut self) {
        self.require_version("list patterns", LanguageVersion::CSharp11);
        self.start_node(ListPattern);
        self.bump();
        while !self.at(RBracket) && !self.at_eof() {
            let before = self.pos;
            if self.at(DotDot) {
                self.bump();
                if !matches!(self.current(), Comma | RBracket) {
                    self.pattern();
                }
            } else {
                self.pattern();
            }
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
        self.designation();
        self.finish_node();
    }

    fn designation(&mut self) {
        if self.at(Ident) && !matches!(self.nth_text(0), "and" | "or" | "when") {
            self.bump();
        }
    }
}

pub(super) fn can_start_pattern(kind: CsSyntaxKind) -> bool {
    can_start_expr(kind) || matches!(kind, Lt | LtEq | Gt | GtEq | EqEq | BangEq | LBrace)
}
