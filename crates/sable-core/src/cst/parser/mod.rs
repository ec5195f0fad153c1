//! Hierarchical recursive-descent parser for C#
//!
//! Builds a lossless green tree from the lexer's token stream. Trivia tokens
//! are emitted as siblings between significant tokens and are flushed into
//! the enclosing node before a new node starts, so every node spans exactly
//! from its first to its last significant token.
//!
//! The parser never fails: unexpected tokens are wrapped in
//! [`CsSyntaxKind::Error`] nodes and reported as [`ParseError`]s.

mod expressions;
mod items;
mod patterns;
mod statements;
mod types;

use rowan::{Checkpoint, GreenNode, TextRange, TextSize};

use super::{CstBuilder, CstToken, CsSyntaxKind, LanguageVersion, ParseOptions};

/// Deepest nesting of statements and expressions before the parser bails out
const MAX_DEPTH: usize = 200;

/// A syntax error reported by the lexer or parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub range: TextRange,
}

impl ParseError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse a token stream into a green tree rooted at a `CompilationUnit`
pub fn parse_tokens(tokens: &[CstToken], options: &ParseOptions) -> (GreenNode, Vec<ParseError>) {
    let mut parser = Parser::new(tokens, options.language_version);
    parser.compilation_unit();
    parser.finish()
}

/// Token stream parser
pub(super) struct Parser<'a> {
    tokens: &'a [CstToken],
    /// Indices of significant (non-trivia) tokens
    sig: Vec<usize>,
    /// Current position in `sig`
    pos: usize,
    /// Next token in `tokens` not yet handed to the builder
    emitted: usize,
    builder: CstBuilder,
    errors: Vec<ParseError>,
    version: LanguageVersion,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [CstToken], version: LanguageVersion) -> Self {
        let sig = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.kind.is_trivia())
            .map(|(idx, _)| idx)
            .collect();
        Self {
            tokens,
            sig,
            pos: 0,
            emitted: 0,
            builder: CstBuilder::new(),
            errors: Vec::new(),
            version,
            depth: 0,
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // ---- lookahead -------------------------------------------------------

    fn token(&self, n: usize) -> Option<&'a CstToken> {
        let tokens = self.tokens;
        self.sig.get(self.pos + n).map(|&idx| &tokens[idx])
    }

    /// Kind of the n-th significant token ahead (`Eof` past the end)
    pub(super) fn nth(&self, n: usize) -> CsSyntaxKind {
        self.token(n).map_or(CsSyntaxKind::Eof, |t| t.kind)
    }

    pub(super) fn current(&self) -> CsSyntaxKind {
        self.nth(0)
    }

    pub(super) fn nth_text(&self, n: usize) -> &'a str {
        self.token(n).map_or("", |t| t.text.as_str())
    }

    pub(super) fn at(&self, kind: CsSyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn at_eof(&self) -> bool {
        self.pos >= self.sig.len()
    }

    /// Whether the n-th token is the identifier `text`
    pub(super) fn nth_contextual(&self, n: usize, text: &str) -> bool {
        self.nth(n) == CsSyntaxKind::Ident && self.nth_text(n) == text
    }

    pub(super) fn at_contextual(&self, text: &str) -> bool {
        self.nth_contextual(0, text)
    }

    /// Whether the n-th token directly follows the (n-1)-th with no trivia between
    pub(super) fn adjacent(&self, n: usize) -> bool {
        match (self.sig.get(self.pos + n - 1), self.sig.get(self.pos + n)) {
            (Some(&a), Some(&b)) => b == a + 1,
            _ => false,
        }
    }

    // ---- tree building ---------------------------------------------------

    /// Emit pending trivia into the currently open node
    fn flush_trivia(&mut self) {
        let target = self.sig.get(self.pos).copied().unwrap_or(self.tokens.len());
        while self.emitted < target {
            let token = &self.tokens[self.emitted];
            self.builder.token(token.kind, &token.text);
            self.emitted += 1;
        }
    }

    /// Emit every remaining token, trivia included
    fn flush_all(&mut self) {
        while self.emitted < self.tokens.len() {
            let token = &self.tokens[self.emitted];
            self.builder.token(token.kind, &token.text);
            self.emitted += 1;
        }
    }

    pub(super) fn bump(&mut self) {
        if self.at_eof() {
            return;
        }
        self.flush_trivia();
        let idx = self.sig[self.pos];
        let token = &self.tokens[idx];
        self.builder.token(token.kind, &token.text);
        self.emitted = idx + 1;
        self.pos += 1;
    }

    pub(super) fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    pub(super) fn start_node(&mut self, kind: CsSyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind);
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
    }

    /// Wrap everything emitted since `checkpoint` into a finished node
    pub(super) fn wrap(&mut self, checkpoint: Checkpoint, kind: CsSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind);
        self.builder.finish_node();
    }

    // ---- errors ----------------------------------------------------------

    fn current_range(&self) -> TextRange {
        match self.token(0) {
            Some(t) => span_range(&t.span),
            None => {
                let end = TextSize::from(self.tokens.last().map_or(0, |t| t.span.end) as u32);
                TextRange::empty(end)
            }
        }
    }

    /// End of the previous significant token, where "x expected" is reported
    fn prev_end(&self) -> TextRange {
        let prev = self
            .pos
            .checked_sub(1)
            .and_then(|p| self.sig.get(p))
            .map_or(0, |&idx| self.tokens[idx].span.end);
        TextRange::empty(TextSize::from(prev as u32))
    }

    pub(super) fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.push_error(message.into(), range);
    }

    fn push_error(&mut self, message: String, range: TextRange) {
        // One error per position keeps cascades readable
        if self.errors.last().is_some_and(|e| e.range.start() == range.start()) {
            return;
        }
        self.errors.push(ParseError::new(message, range));
    }

    /// Consume `kind` or report it as missing
    pub(super) fn expect(&mut self, kind: CsSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            let range = self.prev_end();
            self.push_error(format!("{} expected", describe(kind)), range);
            false
        }
    }

    /// Wrap the current token in an `Error` node
    pub(super) fn error_and_bump(&mut self, message: impl Into<String>) {
        if self.at_eof() {
            self.error(message);
            return;
        }
        self.error(message);
        self.start_node(CsSyntaxKind::Error);
        self.bump();
        self.finish_node();
    }

    /// Report syntax newer than the configured language version
    pub(super) fn require_version(&mut self, feature: &str, required: LanguageVersion) {
        if self.version < required {
            let message = format!(
                "Feature '{feature}' is not available in C# {}. Please use language version {required} or greater.",
                self.version
            );
            self.error(message);
        }
    }

    /// Guard recursion; returns false (after consuming a token) when too deep
    pub(super) fn enter(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error_and_bump("Expression or statement is nested too deeply");
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

fn span_range(span: &std::ops::Range<usize>) -> TextRange {
    TextRange::new(
        TextSize::from(span.start as u32),
        TextSize::from(span.end as u32),
    )
}

/// Human-readable token text for "x expected" messages
fn describe(kind: CsSyntaxKind) -> &'static str {
    use CsSyntaxKind::*;
    match kind {
        Ident => "Identifier",
        LBrace => "{",
        RBrace => "}",
        LParen => "(",
        RParen => ")",
        LBracket => "[",
        RBracket => "]",
        Semicolon => ";",
        Comma => ",",
        Colon => ":",
        Eq => "=",
        Gt => ">",
        Lt => "<",
        Dot => ".",
        FatArrow => "=>",
        InKw => "in",
        WhileKw => "while",
        OperatorKw => "operator",
        _ => "Token",
    }
}

/// Tokens that may begin an expression
pub(super) fn can_start_expr(kind: CsSyntaxKind) -> bool {
    use CsSyntaxKind::*;
    kind.is_predefined_type()
        || matches!(
            kind,
            Ident
                | NumericLiteral
                | CharLiteral
                | StringLiteral
                | InterpolatedString
                | LParen
                | LBracket
                | Bang
                | Tilde
                | Minus
                | Plus
                | PlusPlus
                | MinusMinus
                | Amp
                | Star
                | Caret
                | DotDot
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
                | ThrowKw
                | StackallocKw
                | RefKw
        )
}
