//! Diagnostic types and utilities
//!
//! Provides diagnostics with:
//! - Precise positions (1-based line, column counted in UTF-16 code units)
//! - Positional message arguments
//! - Applicability levels for fixes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use rowan::TextRange;

/// Represents a diagnostic message from analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable short code of the rule that generated this diagnostic
    pub rule_id: String,
    /// Severity level of the diagnostic
    pub severity: Severity,
    /// Human-readable message with arguments substituted
    pub message: String,
    /// Primary location in the source file
    pub location: Location,
    /// Further locations reported for the same violation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_locations: Vec<Location>,
    /// Arguments used to format the message template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Whether the rule offers an automatic fix
    pub fixable: bool,
    /// Category of the rule ("layout", "spacing", ...)
    pub category: String,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Hints for improvements
    Hint,
    /// Informational messages
    Info,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

/// Location information for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// File path (empty when analysing a bare string)
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, UTF-16 code units)
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    /// Byte offset in the source
    pub offset: usize,
    /// Length of the span in bytes
    pub length: usize,
}

/// Indicates how a tool should manage a fix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Applicability {
    /// The fix is definitely correct and can be applied automatically.
    /// Used for: whitespace, brace placement, blank lines.
    Always,

    /// The fix may be correct but is uncertain and deserves review.
    /// Used for: renames computed without a semantic model.
    MaybeIncorrect,
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applicability::Always => write!(f, "safe"),
            Applicability::MaybeIncorrect => write!(f, "unsafe"),
        }
    }
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            additional_locations: Vec::new(),
            args: Vec::new(),
            fixable: false,
            category: String::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_additional_location(mut self, location: Location) -> Self {
        self.additional_locations.push(location);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_fixable(mut self, fixable: bool) -> Self {
        self.fixable = fixable;
        self
    }

    /// Attach a file path to the primary and additional locations
    pub fn with_file(mut self, file: &Path) -> Self {
        self.location.file = file.to_path_buf();
        for location in &mut self.additional_locations {
            location.file = file.to_path_buf();
        }
        self
    }

    /// Byte range of the primary location
    pub fn range(&self) -> TextRange {
        let start = self.location.offset as u32;
        TextRange::new(start.into(), (start + self.location.length as u32).into())
    }

    /// (line, column) of the primary location
    pub fn position(&self) -> (usize, usize) {
        (self.location.line, self.location.column)
    }
}

impl Location {
    /// Create a new location without end information
    pub fn new(file: PathBuf, line: usize, column: usize, offset: usize, length: usize) -> Self {
        Self {
            file,
            line,
            column,
            end_line: line,
            end_column: column,
            offset,
            length,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Hint => write!(f, "hint"),
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.as_os_str().is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
        }
    }
}

/// Source map for byte offset to line/column conversion
///
/// Line breaks are `\n`, `\r\n` and a bare `\r`. Columns count UTF-16 code
/// units from the start of the physical line.
#[derive(Debug, Clone)]
pub struct SourceMap {
    /// Byte offsets of each line start (line 0, line 1, ...)
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let bytes = source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 2;
                }
                b'\r' | b'\n' => {
                    line_starts.push(i + 1);
                    i += 1;
                }
                _ => i += 1,
            }
        }
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 0-based line index containing `offset`
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Byte offset where the 0-based line starts
    pub fn line_start(&self, line_index: usize) -> usize {
        self.line_starts
            .get(line_index)
            .copied()
            .unwrap_or_else(|| self.line_starts.last().copied().unwrap_or(0))
    }

    /// Convert byte offset to a 1-based (line, column) position
    pub fn offset_to_position(&self, offset: usize, source: &str) -> (usize, usize) {
        let line_idx = self.line_index(offset);
        let line_start = self.line_starts[line_idx];
        let end = floor_char_boundary(source, offset.min(source.len()));
        let column: usize = source[line_start.min(end)..end]
            .chars()
            .map(char::len_utf16)
            .sum();
        (line_idx + 1, column + 1)
    }

    /// Build a diagnostic location for a byte range
    pub fn range_to_location(&self, range: TextRange, source: &str) -> Location {
        let start = usize::from(range.start());
        let end = usize::from(range.end());
        let (line, column) = self.offset_to_position(start, source);
        let (end_line, end_column) = self.offset_to_position(end, source);
        Location {
            file: PathBuf::new(),
            line,
            column,
            end_line,
            end_column,
            offset: start,
            length: end - start,
        }
    }
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod source_map_tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let source = "Hello, World!";
        let map = SourceMap::new(source);
        assert_eq!(map.offset_to_position(0, source), (1, 1));
        assert_eq!(map.offset_to_position(7, source), (1, 8));
    }

    #[test]
    fn test_line_break_flavours() {
        let source = "a\r\nb\rc\nd";
        let map = SourceMap::new(source);
        assert_eq!(map.line_count(), 4);
        assert_eq!(map.offset_to_position(3, source), (2, 1));
        assert_eq!(map.offset_to_position(5, source), (3, 1));
        assert_eq!(map.offset_to_position(7, source), (4, 1));
    }

    #[test]
    fn test_utf16_columns() {
        // U+1F600 is two UTF-16 code units and four UTF-8 bytes
        let source = "\u{1F600}x é y";
        let map = SourceMap::new(source);
        assert_eq!(map.offset_to_position(4, source), (1, 3));
        let y = source.find('y').unwrap();
        assert_eq!(map.offset_to_position(y, source), (1, 7));
    }

    #[test]
    fn test_range_to_location() {
        let source = "class A\n{\n}";
        let map = SourceMap::new(source);
        let range = TextRange::new(8.into(), 9.into());
        let location = map.range_to_location(range, source);
        assert_eq!((location.line, location.column), (2, 1));
        assert_eq!((location.end_line, location.end_column), (2, 2));
        assert_eq!(location.length, 1);
    }
}
