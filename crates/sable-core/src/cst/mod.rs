//! Concrete Syntax Tree (CST) for C#
//!
//! This module implements a lossless syntax tree using the Rowan library.
//! The CST preserves all source information including whitespace, comments,
//! preprocessor directives and the text of inactive `#if` branches, enabling:
//! - Precise diagnostics measured against the unmodified source
//! - Minimal autofixes that leave unrelated trivia untouched
//! - Error recovery: malformed input still round-trips byte for byte
//!
//! ## Architecture
//!
//! - **Lexer**: produces every token including trivia. Conditional
//!   directives are evaluated here; inactive branches become a single
//!   `DisabledText` trivia token, so walkers never see their contents.
//! - **Parser**: recursive descent over significant tokens. Trivia are
//!   attached as sibling tokens between significant tokens, so every node
//!   spans exactly from its first to its last significant token.
//! - **Green tree**: immutable and `Send + Sync`; shared across rule walkers.
//! - **Red tree**: built on demand per thread via [`SyntaxTree::root`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use sable_core::cst::{ParseOptions, SyntaxTree};
//!
//! let tree = SyntaxTree::parse("class A { }", &ParseOptions::default());
//! assert_eq!(tree.root().text().to_string(), "class A { }");
//! assert!(tree.errors().is_empty());
//! ```

mod builder;
mod language;
mod lexer;
mod nodes;
mod options;
mod parser;
mod preprocessor;
mod syntax_kind;
mod tree;

pub mod ast;
pub mod trivia;

pub use builder::CstBuilder;
pub use language::CsLanguage;
pub use lexer::{CstLexResult, CstSpan, CstToken, LexerError, lex_with_trivia};
pub use nodes::*;
pub use options::{LanguageVersion, ParseOptions};
pub use parser::{ParseError, parse_tokens};
pub use preprocessor::{ConditionalState, DirectiveKind, PreprocessorSymbols};
pub use syntax_kind::CsSyntaxKind;
pub use tree::SyntaxTree;
