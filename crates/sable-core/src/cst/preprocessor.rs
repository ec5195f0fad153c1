//! Conditional compilation for the lexer
//!
//! `#if`, `#elif`, `#else` and `#endif` are evaluated while lexing so that the
//! text of inactive branches becomes [`DisabledText`](super::CsSyntaxKind::DisabledText)
//! trivia. Rules never see tokens from an inactive branch.

use std::collections::BTreeSet;

/// The set of defined conditional compilation symbols
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessorSymbols {
    defined: BTreeSet<String>,
}

impl PreprocessorSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, symbol: impl Into<String>) {
        self.defined.insert(symbol.into());
    }

    pub fn undefine(&mut self, symbol: &str) {
        self.defined.remove(symbol);
    }

    pub fn is_defined(&self, symbol: &str) -> bool {
        self.defined.contains(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.defined.iter().map(String::as_str)
    }

    /// Evaluate a `#if` condition
    pub fn evaluate(&self, expr: &str) -> Result<bool, String> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err("expected a preprocessor expression".to_string());
        }
        let mut eval = Evaluator {
            tokens: &tokens,
            pos: 0,
            symbols: self,
        };
        let value = eval.or()?;
        if eval.pos != tokens.len() {
            return Err(format!("unexpected '{}' in preprocessor expression", tokens[eval.pos]));
        }
        Ok(value)
    }
}

impl<S: Into<String>> FromIterator<S> for PreprocessorSymbols {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            defined: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '/' if chars.get(i + 1) == Some(&'/') => break,
            '(' | ')' => {
                tokens.push(c.to_string());
                i += 1;
            }
            '!' | '=' if chars.get(i + 1) == Some(&'=') => {
                tokens.push(format!("{c}="));
                i += 2;
            }
            '!' => {
                tokens.push("!".to_string());
                i += 1;
            }
            '&' | '|' if chars.get(i + 1) == Some(&c) => {
                tokens.push(format!("{c}{c}"));
                i += 2;
            }
            c if c.is_alphanumeric() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(chars[start..i].iter().collect());
            }
            other => return Err(format!("unexpected character '{other}' in preprocessor expression")),
        }
    }
    Ok(tokens)
}

struct Evaluator<'a> {
    tokens: &'a [String],
    pos: usize,
    symbols: &'a PreprocessorSymbols,
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.peek() == Some("||") {
            self.pos += 1;
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.equality()?;
        while self.peek() == Some("&&") {
            self.pos += 1;
            let rhs = self.equality()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn equality(&mut self) -> Result<bool, String> {
        let mut value = self.unary()?;
        while let Some(op @ ("==" | "!=")) = self.peek() {
            let equal = op == "==";
            self.pos += 1;
            let rhs = self.unary()?;
            value = (value == rhs) == equal;
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<bool, String> {
        if self.peek() == Some("!") {
            self.pos += 1;
            return Ok(!self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<bool, String> {
        let Some(token) = self.peek() else {
            return Err("unexpected end of preprocessor expression".to_string());
        };
        self.pos += 1;
        match token {
            "(" => {
                let value = self.or()?;
                if self.peek() != Some(")") {
                    return Err("expected ')' in preprocessor expression".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            "true" => Ok(true),
            "false" => Ok(false),
            symbol if symbol.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                Ok(self.symbols.is_defined(symbol))
            }
            other => Err(format!("unexpected '{other}' in preprocessor expression")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    /// Whether the enclosing region is active
    parent_active: bool,
    /// Whether some branch of this `#if` chain has already been taken
    taken: bool,
    active: bool,
    seen_else: bool,
}

/// What the lexer should do after a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `#if`, `#elif`, `#else`, `#endif`
    Conditional,
    /// `#define` and `#undef`
    Definition,
    /// `#region`, `#pragma`, `#nullable`, ...
    Other,
}

/// Tracks nested conditional regions while lexing
#[derive(Debug, Clone)]
pub struct ConditionalState {
    symbols: PreprocessorSymbols,
    stack: Vec<Branch>,
}

impl ConditionalState {
    pub fn new(symbols: PreprocessorSymbols) -> Self {
        Self {
            symbols,
            stack: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stack.last().is_none_or(|branch| branch.active)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Classify a directive line (`#` included) without evaluating it
    pub fn classify(line: &str) -> DirectiveKind {
        match directive_name(line).0 {
            "if" | "elif" | "else" | "endif" => DirectiveKind::Conditional,
            "define" | "undef" => DirectiveKind::Definition,
            _ => DirectiveKind::Other,
        }
    }

    /// Process one directive line, updating the active state
    pub fn process(&mut self, line: &str) -> Result<DirectiveKind, String> {
        let (name, rest) = directive_name(line);
        let rest = strip_comment(rest).trim();
        match name {
            "if" => {
                let parent_active = self.is_active();
                let condition = parent_active && self.symbols.evaluate(rest)?;
                self.stack.push(Branch {
                    parent_active,
                    taken: condition,
                    active: condition,
                    seen_else: false,
                });
                Ok(DirectiveKind::Conditional)
            }
            "elif" => {
                let symbols = &self.symbols;
                let branch = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| "#elif without matching #if".to_string())?;
                if branch.seen_else {
                    return Err("#elif after #else".to_string());
                }
                let condition =
                    branch.parent_active && !branch.taken && symbols.evaluate(rest)?;
                branch.active = condition;
                branch.taken |= condition;
                Ok(DirectiveKind::Conditional)
            }
            "else" => {
                let branch = self
                    .stack
                    .last_mut()
                    .ok_or_else(|| "#else without matching #if".to_string())?;
                if branch.seen_else {
                    return Err("duplicate #else".to_string());
                }
                branch.seen_else = true;
                branch.active = branch.parent_active && !branch.taken;
                branch.taken = true;
                Ok(DirectiveKind::Conditional)
            }
            "endif" => {
                self.stack
                    .pop()
                    .ok_or_else(|| "#endif without matching #if".to_string())?;
                Ok(DirectiveKind::Conditional)
            }
            "define" | "undef" if self.is_active() => {
                let symbol = rest.split_whitespace().next().unwrap_or_default();
                if symbol.is_empty() {
                    return Err(format!("#{name} requires a symbol"));
                }
                if name == "define" {
                    self.symbols.define(symbol);
                } else {
                    self.symbols.undefine(symbol);
                }
                Ok(DirectiveKind::Definition)
            }
            "define" | "undef" => Ok(DirectiveKind::Definition),
            _ => Ok(DirectiveKind::Other),
        }
    }
}

fn directive_name(line: &str) -> (&str, &str) {
    let body = line.trim_start().trim_start_matches('#').trim_start();
    let end = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    (&body[..end], &body[end..])
}

fn strip_comment(text: &str) -> &str {
    match text.find("//") {
        Some(idx) => &text[..idx],
        None => text,
    }
}
