//! Types, names, and generic argument lists

use super::{Parser, can_start_expr};
use crate::cst::CsSyntaxKind::*;

/// How a trailing `?` after a type is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TypeMode {
    /// Declarations: `?` always makes the type nullable
    Decl,
    /// After `is`/`as` and in casts: `?` is nullable only when no expression follows it
    Expr,
    /// `new T[..]`, `stackalloc T[..]`: ranks are parsed by the caller
    NoArray,
}

impl Parser<'_> {
    // ---- lookahead scanning ----------------------------------------------

    /// Offset just past a type starting at offset `n`, if one is there
    pub(super) fn scan_type(&self, n: usize) -> Option<usize> {
        self.scan_type_mode(n, TypeMode::Decl)
    }

    pub(super) fn scan_type_mode(&self, n: usize, mode: TypeMode) -> Option<usize> {
        let mut i = match self.nth(n) {
            k if k.is_predefined_type() => n + 1,
            LParen => self.scan_tuple_type(n)?,
            Ident => self.scan_name(n)?,
            _ => return None,
        };
        loop {
            match self.nth(i) {
                Question if mode != TypeMode::Expr || !can_start_expr(self.nth(i + 1)) => i += 1,
                Star => i += 1,
                LBracket if mode != TypeMode::NoArray => {
                    let mut j = i + 1;
                    while self.nth(j) == Comma {
                        j += 1;
                    }
                    if self.nth(j) != RBracket {
                        break;
                    }
                    i = j + 1;
                }
                _ => break,
            }
        }
        Some(i)
    }

    fn scan_name(&self, n: usize) -> Option<usize> {
        let mut i = n;
        loop {
            if self.nth(i) != Ident {
                return None;
            }
            i += 1;
            if self.nth(i) == Lt
                && let Some(end) = self.scan_type_args(i)
            {
                i = end;
            }
            match self.nth(i) {
                Dot | ColonColon if self.nth(i + 1) == Ident => i += 1,
                _ => return Some(i),
            }
        }
    }

    /// Offset past a `<...>` argument list starting at offset `n`
    pub(super) fn scan_type_args(&self, n: usize) -> Option<usize> {
        let mut i = n + 1;
        if matches!(self.nth(i), Comma | Gt) {
            while self.nth(i) == Comma {
                i += 1;
            }
            return (self.nth(i) == Gt).then_some(i + 1);
        }
        loop {
            i = self.scan_type(i)?;
            match self.nth(i) {
                Comma => i += 1,
                Gt => return Some(i + 1),
                _ => return None,
            }
        }
    }

    fn scan_tuple_type(&self, n: usize) -> Option<usize> {
        let mut i = n + 1;
        let mut count = 0;
        loop {
            i = self.scan_type(i)?;
            if self.nth(i) == Ident {
                i += 1;
            }
            count += 1;
            match self.nth(i) {
                Comma => i += 1,
                RParen if count >= 2 => return Some(i + 1),
                _ => return None,
            }
        }
    }

    /// Whether `<` at offset `n` opens a generic argument list in an expression
    pub(super) fn generic_args_follow(&self, n: usize) -> bool {
        let Some(end) = self.scan_type_args(n) else {
            return false;
        };
        matches!(
            self.nth(end),
            LParen
                | RParen
                | RBracket
                | RBrace
                | Colon
                | Semicolon
                | Comma
                | Dot
                | Question
                | QuestionDot
                | EqEq
                | BangEq
                | Pipe
                | Caret
                | AmpAmp
                | PipePipe
                | Amp
                | LBracket
                | FatArrow
                | IsKw
                | AsKw
                | Ident
                | Eof
        )
    }

    // ---- building ---------------------------------------------------------

    pub(super) fn parse_type(&mut self) -> bool {
        self.parse_type_mode(TypeMode::Decl)
    }

    pub(super) fn parse_type_mode(&mut self, mode: TypeMode) -> bool {
        if !self.enter() {
            return false;
        }
        self.start_node(Type);
        let ok = match self.current() {
            k if k.is_predefined_type() => {
                self.bump();
                true
            }
            LParen if self.scan_tuple_type(0).is_some() => {
                self.tuple_type();
                true
            }
            Ident => {
                self.type_name();
                true
            }
            _ => {
                self.error("Type expected");
                false
            }
        };
        if ok {
            self.type_suffixes(mode);
        }
        self.finish_node();
        self.leave();
        ok
    }

    /// `A.B<C>.D`, `global::A`
    fn type_name(&mut self) {
        loop {
            self.bump();
            if self.at(Lt) && self.scan_type_args(0).is_some() {
                self.type_arg_list();
            }
            if matches!(self.current(), Dot | ColonColon) && self.nth(1) == Ident {
                self.bump();
                continue;
            }
            break;
        }
    }

    fn type_suffixes(&mut self, mode: TypeMode) {
        loop {
            match self.current() {
                Question if mode != TypeMode::Expr || !can_start_expr(self.nth(1)) => self.bump(),
                Star => self.bump(),
                LBracket if mode != TypeMode::NoArray && self.rank_is_empty() => {
                    self.start_node(ArrayRank);
                    self.bump();
                    while self.at(Comma) {
                        self.bump();
                    }
                    self.expect(RBracket);
                    self.finish_node();
                }
                _ => break,
            }
        }
    }

    fn rank_is_empty(&self) -> bool {
        let mut j = 1;
        while self.nth(j) == Comma {
            j += 1;
        }
        self.nth(j) == RBracket
    }

    pub(super) fn type_arg_list(&mut self) {
        self.start_node(TypeArgList);
        self.bump();
        if matches!(self.current(), Comma | Gt) {
            while self.at(Comma) {
                self.bump();
            }
        } else {
            loop {
                self.parse_type();
                if self.at(Comma) {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(Gt);
        self.finish_node();
    }

    fn tuple_type(&mut self) {
        self.start_node(TupleType);
        self.bump();
        loop {
            self.start_node(TupleElement);
            self.parse_type();
            if self.at(Ident) {
                self.bump();
            }
            self.finish_node();
            if self.at(Comma) {
                self.bump();
            } else {
                break;
            }
        }
        self.expect(RParen);
        self.finish_node();
    }

    /// Whether offset `n` starts a type followed by an identifier (a declaration)
    pub(super) fn type_then_ident(&self, n: usize) -> Option<usize> {
        let end = self.scan_type(n)?;
        (self.nth(end) == Ident).then_some(end)
    }
}
