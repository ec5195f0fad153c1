//! Parsed compilation units
//!
//! [`SyntaxTree`] owns the source text, the immutable green tree and every
//! syntax error found while lexing and parsing. It is `Send + Sync`, so one
//! tree can be shared by parallel rule walkers; each walker builds its own
//! red root with [`SyntaxTree::root`].

use std::sync::Arc;

use rowan::{GreenNode, TextRange, TextSize};

use super::parser::{ParseError, parse_tokens};
use super::{CsSyntaxNode, ParseOptions, lex_with_trivia};
use crate::diagnostics::{Location, SourceMap};

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: Arc<str>,
    green: GreenNode,
    errors: Vec<ParseError>,
    source_map: Arc<SourceMap>,
    options: ParseOptions,
}

impl SyntaxTree {
    /// Lex and parse `source`. Never fails; syntax errors are collected.
    pub fn parse(source: &str, options: &ParseOptions) -> Self {
        let (tokens, lex_errors) = lex_with_trivia(source, options);
        let (green, mut errors) = parse_tokens(&tokens, options);
        errors.extend(lex_errors.into_iter().map(|e| {
            let range = TextRange::new(
                TextSize::from(e.span.start as u32),
                TextSize::from(e.span.end as u32),
            );
            ParseError::new(e.message, range)
        }));
        errors.sort_by_key(|e| e.range.start());

        tracing::trace!(
            tokens = tokens.len(),
            errors = errors.len(),
            "parsed compilation unit"
        );

        Self {
            source: Arc::from(source),
            green,
            errors,
            source_map: Arc::new(SourceMap::new(source)),
            options: options.clone(),
        }
    }

    /// Parse new text with the options this tree was parsed with
    pub fn reparse(&self, source: &str) -> Self {
        Self::parse(source, &self.options)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// A fresh red root for traversal
    pub fn root(&self) -> CsSyntaxNode {
        CsSyntaxNode::new_root(self.green.clone())
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Diagnostic location of a byte range in this tree's source
    pub fn location(&self, range: TextRange) -> Location {
        self.source_map.range_to_location(range, &self.source)
    }

    /// 0-based line of a byte offset
    pub fn line_of(&self, offset: TextSize) -> usize {
        self.source_map.line_index(usize::from(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::{CsSyntaxKind, LanguageVersion};

    #[test]
    fn test_round_trip_is_lossless() {
        let source = "// header\r\nnamespace A\n{\n    class B { }\n}\n";
        let tree = SyntaxTree::parse(source, &ParseOptions::default());
        assert_eq!(tree.root().text().to_string(), source);
        assert!(!tree.has_errors());
        assert_eq!(tree.root().kind(), CsSyntaxKind::CompilationUnit);
    }

    #[test]
    fn test_lexer_errors_are_merged() {
        let tree = SyntaxTree::parse("class A { string s = \"abc", &ParseOptions::default());
        assert!(tree.has_errors());
        assert_eq!(tree.root().text().to_string(), "class A { string s = \"abc");
    }

    #[test]
    fn test_reparse_keeps_options() {
        let options = ParseOptions::new(LanguageVersion::CSharp7_3);
        let tree = SyntaxTree::parse("class A { }", &options);
        let next = tree.reparse("record R(int X);");
        assert_eq!(next.options().language_version, LanguageVersion::CSharp7_3);
        assert!(next.has_errors());
    }

    #[test]
    fn test_tree_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyntaxTree>();
    }

    #[test]
    fn test_location_uses_source_map() {
        let tree = SyntaxTree::parse("class A\n{\n}\n", &ParseOptions::default());
        let location = tree.location(TextRange::new(8.into(), 9.into()));
        assert_eq!((location.line, location.column), (2, 1));
        assert_eq!(tree.line_of(8.into()), 1);
    }
}
