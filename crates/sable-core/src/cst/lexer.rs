//! CST-aware lexer that preserves all trivia
//!
//! Every byte of the source ends up in exactly one token, so concatenating
//! the token texts reproduces the input. Conditional directives are
//! evaluated here; inactive branches are emitted as a single
//! [`CsSyntaxKind::DisabledText`] token per region.

use std::ops::Range;

use super::preprocessor::{ConditionalState, DirectiveKind};
use super::{CsSyntaxKind, ParseOptions};

/// Simple span representing a byte range in the source
pub type CstSpan = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    pub message: String,
    pub span: CstSpan,
}

impl LexerError {
    pub fn new(message: impl Into<String>, span: CstSpan) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: CsSyntaxKind,
    pub text: String,
    pub span: CstSpan,
}

impl CstToken {
    pub fn new(kind: CsSyntaxKind, text: impl Into<String>, span: CstSpan) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the CST lexer
pub type CstLexResult = (Vec<CstToken>, Vec<LexerError>);

/// Lex C# source preserving all trivia
pub fn lex_with_trivia(source: &str, options: &ParseOptions) -> CstLexResult {
    let mut lexer = Lexer::new(source, options);
    lexer.run();
    (lexer.tokens, lexer.errors)
}

const PUNCTUATION: &[(&str, CsSyntaxKind)] = &[
    ("??=", CsSyntaxKind::QuestionQuestionEq),
    ("<<=", CsSyntaxKind::LtLtEq),
    ("::", CsSyntaxKind::ColonColon),
    ("??", CsSyntaxKind::QuestionQuestion),
    ("..", CsSyntaxKind::DotDot),
    ("++", CsSyntaxKind::PlusPlus),
    ("--", CsSyntaxKind::MinusMinus),
    ("+=", CsSyntaxKind::PlusEq),
    ("-=", CsSyntaxKind::MinusEq),
    ("*=", CsSyntaxKind::StarEq),
    ("/=", CsSyntaxKind::SlashEq),
    ("%=", CsSyntaxKind::PercentEq),
    ("&=", CsSyntaxKind::AmpEq),
    ("|=", CsSyntaxKind::PipeEq),
    ("^=", CsSyntaxKind::CaretEq),
    ("<<", CsSyntaxKind::LtLt),
    ("<=", CsSyntaxKind::LtEq),
    (">=", CsSyntaxKind::GtEq),
    ("==", CsSyntaxKind::EqEq),
    ("!=", CsSyntaxKind::BangEq),
    ("&&", CsSyntaxKind::AmpAmp),
    ("||", CsSyntaxKind::PipePipe),
    ("=>", CsSyntaxKind::FatArrow),
    ("->", CsSyntaxKind::Arrow),
    ("{", CsSyntaxKind::LBrace),
    ("}", CsSyntaxKind::RBrace),
    ("(", CsSyntaxKind::LParen),
    (")", CsSyntaxKind::RParen),
    ("[", CsSyntaxKind::LBracket),
    ("]", CsSyntaxKind::RBracket),
    (";", CsSyntaxKind::Semicolon),
    (",", CsSyntaxKind::Comma),
    (".", CsSyntaxKind::Dot),
    (":", CsSyntaxKind::Colon),
    ("?", CsSyntaxKind::Question),
    ("+", CsSyntaxKind::Plus),
    ("-", CsSyntaxKind::Minus),
    ("*", CsSyntaxKind::Star),
    ("/", CsSyntaxKind::Slash),
    ("%", CsSyntaxKind::Percent),
    ("&", CsSyntaxKind::Amp),
    ("|", CsSyntaxKind::Pipe),
    ("^", CsSyntaxKind::Caret),
    ("!", CsSyntaxKind::Bang),
    ("~", CsSyntaxKind::Tilde),
    ("=", CsSyntaxKind::Eq),
    ("<", CsSyntaxKind::Lt),
    (">", CsSyntaxKind::Gt),
];

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<CstToken>,
    errors: Vec<LexerError>,
    conditions: ConditionalState,
    /// Only whitespace seen since the last line break
    line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str, options: &ParseOptions) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            conditions: ConditionalState::new(options.preprocessor_symbols.clone()),
            line_start: true,
        }
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.src.get(offset..).and_then(|rest| rest.chars().next())
    }

    fn push(&mut self, kind: CsSyntaxKind, start: usize, end: usize) {
        self.tokens
            .push(CstToken::new(kind, &self.src[start..end], start..end));
    }

    fn error(&mut self, message: impl Into<String>, span: CstSpan) {
        self.errors.push(LexerError::new(message, span));
    }

    fn run(&mut self) {
        while let Some(c) = self.char_at(self.pos) {
            let start = self.pos;
            match c {
                '\n' => {
                    self.pos += 1;
                    self.push(CsSyntaxKind::Newline, start, self.pos);
                    self.line_start = true;
                }
                '\r' => {
                    self.pos += 1;
                    if self.char_at(self.pos) == Some('\n') {
                        self.pos += 1;
                    }
                    self.push(CsSyntaxKind::Newline, start, self.pos);
                    self.line_start = true;
                }
                c if is_whitespace(c) => {
                    self.pos = self.scan_while(start, is_whitespace);
                    self.push(CsSyntaxKind::Whitespace, start, self.pos);
                }
                '#' if self.line_start => self.directive(),
                _ => {
                    self.line_start = false;
                    self.significant(start, c);
                }
            }
        }
        if self.conditions.depth() > 0 {
            let len = self.src.len();
            self.error("#endif directive expected", len..len);
        }
    }

    fn scan_while(&self, start: usize, pred: impl Fn(char) -> bool) -> usize {
        let rest = &self.src[start..];
        rest.char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.src.len(), |(idx, _)| start + idx)
    }

    fn line_end(&self, start: usize) -> usize {
        self.scan_while(start, |c| c != '\n' && c != '\r')
    }

    fn directive(&mut self) {
        let start = self.pos;
        let end = self.line_end(start);
        self.pos = end;
        self.push(CsSyntaxKind::PreprocessorDirective, start, end);
        self.line_start = false;

        let text = &self.src[start..end];
        if let Err(message) = self.conditions.process(text) {
            self.error(message, start..end);
        }
        if !self.conditions.is_active() {
            self.disabled_region();
        }
    }

    /// Consume whole lines up to the next conditional directive
    fn disabled_region(&mut self) {
        // The directive's own line break stays a Newline token
        let nl_start = self.pos;
        if self.char_at(self.pos) == Some('\r') {
            self.pos += 1;
        }
        if self.char_at(self.pos) == Some('\n') {
            self.pos += 1;
        }
        if self.pos > nl_start {
            self.push(CsSyntaxKind::Newline, nl_start, self.pos);
        }

        let start = self.pos;
        let mut last_break = start;
        loop {
            if self.pos >= self.src.len() {
                break;
            }
            let end = self.line_end(self.pos);
            let line = &self.src[self.pos..end];
            if line.trim_start().starts_with('#')
                && ConditionalState::classify(line) == DirectiveKind::Conditional
            {
                break;
            }
            last_break = end;
            self.pos = end;
            if self.char_at(self.pos) == Some('\r') {
                self.pos += 1;
            }
            if self.char_at(self.pos) == Some('\n') {
                self.pos += 1;
            }
        }

        if last_break > start {
            self.push(CsSyntaxKind::DisabledText, start, last_break);
        }
        if self.pos > last_break && last_break >= start {
            self.push(CsSyntaxKind::Newline, last_break, self.pos);
        }
        self.line_start = true;
    }

    fn significant(&mut self, start: usize, c: char) {
        let next = self.char_at(start + c.len_utf8());
        match c {
            '/' if next == Some('/') => {
                let end = self.line_end(start);
                let text = &self.src[start..end];
                let kind = if text.starts_with("///") && !text.starts_with("////") {
                    CsSyntaxKind::DocComment
                } else {
                    CsSyntaxKind::SingleLineComment
                };
                self.pos = end;
                self.push(kind, start, end);
            }
            '/' if next == Some('*') => {
                let end = match self.src[start + 2..].find("*/") {
                    Some(idx) => start + 2 + idx + 2,
                    None => {
                        let len = self.src.len();
                        self.error("Unterminated block comment", start..len);
                        len
                    }
                };
                self.pos = end;
                self.push(CsSyntaxKind::MultiLineComment, start, end);
            }
            '"' | '$' | '@' if self.string_start(start) => {
                let (kind, end) = self.scan_string(start);
                self.pos = end;
                self.push(kind, start, end);
            }
            '\'' => {
                let end = self.scan_char_literal(start);
                self.pos = end;
                self.push(CsSyntaxKind::CharLiteral, start, end);
            }
            c if c.is_ascii_digit() => {
                self.pos = self.scan_number(start);
                self.push(CsSyntaxKind::NumericLiteral, start, self.pos);
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => {
                self.pos = self.scan_number(start);
                self.push(CsSyntaxKind::NumericLiteral, start, self.pos);
            }
            '@' if next.is_some_and(is_ident_start) => {
                self.pos = self.scan_while(start + 1, is_ident_continue);
                self.push(CsSyntaxKind::Ident, start, self.pos);
            }
            c if is_ident_start(c) => {
                self.pos = self.scan_while(start, is_ident_continue);
                let text = &self.src[start..self.pos];
                let kind = CsSyntaxKind::from_keyword(text).unwrap_or(CsSyntaxKind::Ident);
                self.push(kind, start, self.pos);
            }
            _ => {
                let rest = &self.src[start..];
                let matched = PUNCTUATION
                    .iter()
                    .find(|(text, _)| rest.starts_with(text))
                    .map(|&(text, kind)| (text.len(), kind));
                match matched {
                    Some((_, CsSyntaxKind::Question))
                        if rest[1..].starts_with('.')
                            && !rest[2..].starts_with(|ch: char| ch.is_ascii_digit()) =>
                    {
                        self.pos = start + 2;
                        self.push(CsSyntaxKind::QuestionDot, start, self.pos);
                    }
                    Some((len, kind)) => {
                        self.pos = start + len;
                        self.push(kind, start, self.pos);
                    }
                    None => {
                        self.pos = start + c.len_utf8();
                        self.error(format!("Unexpected character '{c}'"), start..self.pos);
                        self.push(CsSyntaxKind::Unknown, start, self.pos);
                    }
                }
            }
        }
    }

    /// Whether a string literal (of any flavour) begins at `start`
    fn string_start(&self, start: usize) -> bool {
        let rest = self.src[start..].trim_start_matches('$');
        let rest = rest.strip_prefix('@').unwrap_or(rest);
        let rest = if self.src[start..].starts_with('@') {
            rest.trim_start_matches('$')
        } else {
            rest
        };
        rest.starts_with('"')
    }

    /// Scan any string literal starting at `start`, returning its kind and end
    fn scan_string(&mut self, start: usize) -> (CsSyntaxKind, usize) {
        let src = self.src;
        let bytes = src.as_bytes();
        let mut i = start;
        let mut dollars = 0;
        let mut verbatim = false;
        while i < bytes.len() && (bytes[i] == b'$' || bytes[i] == b'@') {
            if bytes[i] == b'$' {
                dollars += 1;
            } else {
                verbatim = true;
            }
            i += 1;
        }
        let quotes = bytes[i..].iter().take_while(|&&b| b == b'"').count();
        let kind = if dollars > 0 {
            CsSyntaxKind::InterpolatedString
        } else {
            CsSyntaxKind::StringLiteral
        };

        if quotes >= 3 && !verbatim {
            return (kind, self.scan_raw_string(start, i, quotes));
        }
        if quotes == 2 && dollars == 0 && !verbatim {
            return (kind, i + 2);
        }

        let end = if dollars > 0 {
            self.scan_interpolated(start, i + 1, verbatim)
        } else if verbatim {
            self.scan_verbatim(start, i + 1)
        } else {
            self.scan_regular(start, i + 1, b'"')
        };
        (kind, end)
    }

    fn scan_raw_string(&mut self, start: usize, open: usize, quotes: usize) -> usize {
        let delimiter = "\"".repeat(quotes);
        let body = open + quotes;
        match self.src[body..].find(&delimiter) {
            Some(idx) => {
                let mut end = body + idx + quotes;
                // Extra quotes belong to the closing delimiter run
                while self.src.as_bytes().get(end) == Some(&b'"') {
                    end += 1;
                }
                end
            }
            None => {
                let len = self.src.len();
                self.error("Unterminated raw string literal", start..len);
                len
            }
        }
    }

    fn scan_regular(&mut self, start: usize, mut i: usize, close: u8) -> usize {
        let src = self.src;
        let bytes = src.as_bytes();
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'\n' | b'\r' => break,
                b if b == close => return i + 1,
                _ => i += 1,
            }
        }
        let end = i.min(bytes.len());
        self.error("Unterminated literal", start..end);
        end
    }

    fn scan_verbatim(&mut self, start: usize, mut i: usize) -> usize {
        let src = self.src;
        let bytes = src.as_bytes();
        while i < bytes.len() {
            if bytes[i] == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 2;
                    continue;
                }
                return i + 1;
            }
            i += 1;
        }
        self.error("Unterminated verbatim string", start..bytes.len());
        bytes.len()
    }

    fn scan_interpolated(&mut self, start: usize, mut i: usize, verbatim: bool) -> usize {
        let src = self.src;
        let bytes = src.as_bytes();
        while i < bytes.len() {
            match bytes[i] {
                b'"' if verbatim && bytes.get(i + 1) == Some(&b'"') => i += 2,
                b'"' => return i + 1,
                b'\\' if !verbatim => i += 2,
                b'\n' | b'\r' if !verbatim => break,
                b'{' if bytes.get(i + 1) == Some(&b'{') => i += 2,
                b'}' if bytes.get(i + 1) == Some(&b'}') => i += 2,
                b'{' => i = self.scan_hole(i + 1),
                _ => i += 1,
            }
        }
        let end = i.min(bytes.len());
        self.error("Unterminated interpolated string", start..end);
        end
    }

    /// Skip an interpolation hole, returning the offset after its `}`
    fn scan_hole(&mut self, mut i: usize) -> usize {
        let src = self.src;
        let bytes = src.as_bytes();
        let mut depth = 1usize;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        return i;
                    }
                }
                b'"' | b'$' | b'@' if self.string_start(i) => {
                    i = self.scan_string(i).1;
                }
                b'\'' => i = self.scan_char_literal(i),
                _ => i += 1,
            }
        }
        i
    }

    fn scan_char_literal(&mut self, start: usize) -> usize {
        self.scan_regular(start, start + 1, b'\'')
    }

    fn scan_number(&self, start: usize) -> usize {
        let src = self.src;
        let bytes = src.as_bytes();
        let mut i = start;
        let is_digit = |b: u8| b.is_ascii_digit() || b == b'_';
        if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(b'x' | b'X' | b'b' | b'B')) {
            i += 2;
            while i < bytes.len() && (bytes[i].is_ascii_hexdigit() || bytes[i] == b'_') {
                i += 1;
            }
        } else {
            while i < bytes.len() && is_digit(bytes[i]) {
                i += 1;
            }
            if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
            {
                i += 1;
                while i < bytes.len() && is_digit(bytes[i]) {
                    i += 1;
                }
            }
            if matches!(bytes.get(i), Some(b'e' | b'E')) {
                let mut j = i + 1;
                if matches!(bytes.get(j), Some(b'+' | b'-')) {
                    j += 1;
                }
                if bytes.get(j).is_some_and(|b| b.is_ascii_digit()) {
                    i = j;
                    while i < bytes.len() && is_digit(bytes[i]) {
                        i += 1;
                    }
                }
            }
        }
        while i < bytes.len() && matches!(bytes[i], b'u' | b'U' | b'l' | b'L' | b'f' | b'F' | b'd' | b'D' | b'm' | b'M')
        {
            i += 1;
        }
        i
    }
}

fn is_whitespace(c: char) -> bool {
    c != '\n' && c != '\r' && c.is_whitespace()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
