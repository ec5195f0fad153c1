//! Diagnostic renderer with rich terminal output

use super::{Diagnostic, Location, Severity, SourceMap};
use crate::console::{Color, Console};
use std::fs;
use unicode_width::UnicodeWidthChar;

/// Columns a tab occupies in a code frame
const TAB_WIDTH: usize = 4;

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with colors and formatting
    Text,
    /// JSON format for programmatic consumption
    Json,
    /// JSON with pretty-printing
    JsonPretty,
}

/// Diagnostic renderer with rich formatting
#[derive(Debug, Clone)]
pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    /// Create a new diagnostic renderer with automatic terminal detection (text output)
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    /// Create a renderer with colors disabled
    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn with_console(console: Console) -> Self {
        Self {
            console,
            output_format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn format(&self) -> OutputFormat {
        self.output_format
    }

    /// Render one diagnostic. `source` is the analysed text; when absent the
    /// file named by the location is read for the code frame.
    pub fn render(&self, diagnostic: &Diagnostic, source: Option<&str>) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_text(diagnostic, source),
            OutputFormat::Json => self.render_json(std::slice::from_ref(diagnostic), false),
            OutputFormat::JsonPretty => self.render_json(std::slice::from_ref(diagnostic), true),
        }
    }

    fn render_text(&self, diagnostic: &Diagnostic, source: Option<&str>) -> String {
        let mut output = String::new();

        // Header: severity[rule_id]: message
        output.push_str(&self.render_header(diagnostic));
        output.push('\n');

        let owned;
        let source = match source {
            Some(text) => Some(text),
            None => {
                owned = fs::read_to_string(&diagnostic.location.file).ok();
                owned.as_deref()
            }
        };

        match source.and_then(|text| self.render_code_frame(diagnostic, text)) {
            Some(frame) => output.push_str(&frame),
            None => {
                output.push('\n');
                output.push_str(&self.render_location_line(&diagnostic.location));
                output.push('\n');
            }
        }

        if diagnostic.fixable {
            output.push_str(&format!(
                "  {} run {} to apply the automatic fix\n",
                self.console.colorize("= help:", Color::Blue),
                self.console.colorize("`sable fix`", Color::Bold)
            ));
        }

        output
    }

    fn render_json(&self, diagnostics: &[Diagnostic], pretty: bool) -> String {
        if pretty {
            serde_json::to_string_pretty(diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
        } else {
            serde_json::to_string(diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}"))
        }
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::Blue,
            Severity::Hint => Color::Dim,
        }
    }

    fn render_header(&self, diagnostic: &Diagnostic) -> String {
        let severity_text = self.console.colorize(
            &diagnostic.severity.to_string(),
            Self::severity_color(diagnostic.severity),
        );
        let rule_id = self
            .console
            .colorize(&format!("[{}]", diagnostic.rule_id), Color::Dim);

        format!(
            "{}{}: {}",
            severity_text,
            rule_id,
            self.console.colorize(&diagnostic.message, Color::Bold)
        )
    }

    /// Code frame with two lines of context around the primary location
    fn render_code_frame(&self, diagnostic: &Diagnostic, source: &str) -> Option<String> {
        let map = SourceMap::new(source);
        let total_lines = map.line_count();
        let location = &diagnostic.location;
        let error_line = location.line;
        if error_line == 0 || error_line > total_lines {
            return None;
        }

        let start_line = error_line.saturating_sub(2).max(1);
        let end_line = (error_line + 2).min(total_lines);
        let gutter_width = end_line.to_string().len();
        let highlight_color = Self::severity_color(diagnostic.severity);

        let mut frame = String::new();
        frame.push('\n');
        frame.push_str(&format!(
            "  {}─[{}]\n",
            self.console.colorize("┌", Color::Blue),
            display_location(location)
        ));
        frame.push_str(&format!("  {}\n", self.console.colorize("│", Color::Blue)));

        for line_num in start_line..=end_line {
            let line = line_text(&map, source, line_num - 1);
            let is_error_line = line_num == error_line;

            if is_error_line {
                frame.push_str(&self.console.colorize(">", highlight_color));
                frame.push(' ');
            } else {
                frame.push_str("  ");
            }
            frame.push_str(
                &self
                    .console
                    .colorize(&format!("{line_num:>gutter_width$}"), Color::Dim),
            );
            frame.push_str(&self.console.colorize(" │ ", Color::Dim));

            if !is_error_line {
                frame.push_str(&expand_tabs(line));
                frame.push('\n');
                continue;
            }

            let start = utf16_column_to_byte(line, location.column);
            let end = if location.end_line == location.line {
                utf16_column_to_byte(line, location.end_column).max(start)
            } else {
                line.len()
            };
            frame.push_str(&expand_tabs(&line[..start]));
            frame.push_str(
                &self
                    .console
                    .colorize(&expand_tabs(&line[start..end]), highlight_color),
            );
            frame.push_str(&expand_tabs(&line[end..]));
            frame.push('\n');

            frame.push_str("  ");
            frame.push_str(&" ".repeat(gutter_width));
            frame.push_str(&self.console.colorize(" │ ", Color::Dim));
            frame.push_str(&" ".repeat(display_width(&line[..start])));
            let carets = "^".repeat(display_width(&line[start..end]).max(1));
            frame.push_str(&self.console.colorize(&carets, highlight_color));
            frame.push('\n');
        }

        Some(frame)
    }

    fn render_location_line(&self, location: &Location) -> String {
        format!(
            "  {} {}",
            self.console.colorize("→", Color::Blue),
            self.console.colorize(&display_location(location), Color::Dim)
        )
    }

    /// Render the diagnostics of one file
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic], source: Option<&str>) -> String {
        match self.output_format {
            OutputFormat::Text => self.render_diagnostics_text(diagnostics, source),
            OutputFormat::Json => self.render_json(diagnostics, false),
            OutputFormat::JsonPretty => self.render_json(diagnostics, true),
        }
    }

    fn render_diagnostics_text(&self, diagnostics: &[Diagnostic], source: Option<&str>) -> String {
        let mut output = String::new();

        for (i, diagnostic) in diagnostics.iter().enumerate() {
            if i > 0 {
                output.push('\n');
                output.push_str(
                    &self
                        .console
                        .colorize(&"─".repeat(self.console.max_width().min(80)), Color::Dim),
                );
                output.push_str("\n\n");
            }
            output.push_str(&self.render_text(diagnostic, source));
        }

        output
    }

    /// One-line summary printed after a `check` run
    pub fn render_summary(&self, diagnostics: &[Diagnostic], files_checked: usize) -> String {
        let count = |severity: Severity| {
            diagnostics
                .iter()
                .filter(|d| d.severity == severity)
                .count()
        };
        let files = plural(files_checked, "file");

        if diagnostics.is_empty() {
            return format!(
                "Checked {files}: {}",
                self.console.colorize("no issues found", Color::Green)
            );
        }

        let mut parts = Vec::new();
        for (severity, noun) in [
            (Severity::Error, "error"),
            (Severity::Warning, "warning"),
            (Severity::Info, "info"),
            (Severity::Hint, "hint"),
        ] {
            let n = count(severity);
            if n > 0 {
                parts.push(
                    self.console
                        .colorize(&plural(n, noun), Self::severity_color(severity)),
                );
            }
        }

        let mut summary = format!("Checked {files}: {}", parts.join(", "));
        let fixable = diagnostics.iter().filter(|d| d.fixable).count();
        if fixable > 0 {
            summary.push_str(&format!(
                " ({fixable} fixable with {})",
                self.console.colorize("`sable fix`", Color::Bold)
            ));
        }
        summary
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn plural(n: usize, noun: &str) -> String {
    match (n, noun) {
        (1, _) | (_, "info") => format!("{n} {noun}"),
        _ => format!("{n} {noun}s"),
    }
}

fn display_location(location: &Location) -> String {
    if location.file.as_os_str().is_empty() {
        format!("<input>:{}:{}", location.line, location.column)
    } else {
        location.to_string()
    }
}

/// Text of a 0-based line without its terminator
fn line_text<'a>(map: &SourceMap, source: &'a str, index: usize) -> &'a str {
    let start = map.line_start(index);
    let end = if index + 1 < map.line_count() {
        map.line_start(index + 1)
    } else {
        source.len()
    };
    source[start..end].trim_end_matches(['\r', '\n'])
}

/// Byte index within `line` of a 1-based UTF-16 column
fn utf16_column_to_byte(line: &str, column: usize) -> usize {
    let target = column.saturating_sub(1);
    let mut units = 0;
    for (idx, ch) in line.char_indices() {
        if units >= target {
            return idx;
        }
        units += ch.len_utf16();
    }
    line.len()
}

fn display_width(text: &str) -> usize {
    text.chars()
        .map(|ch| match ch {
            '\t' => TAB_WIDTH,
            _ => ch.width().unwrap_or(0),
        })
        .sum()
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SOURCE: &str = "public class Foo\n{\n    public void Method1() {\n    }\n}\n";

    fn brace_diagnostic() -> Diagnostic {
        let mut location = Location::new(PathBuf::from("Foo.cs"), 3, 27, 45, 1);
        location.end_column = 28;
        Diagnostic::new(
            "SA1500",
            Severity::Warning,
            "Braces for multi-line statements should not share line",
            location,
        )
        .with_fixable(true)
        .with_category("layout")
    }

    #[test]
    fn test_render_header() {
        let renderer = DiagnosticRenderer::no_colors();
        assert_eq!(
            renderer.render_header(&brace_diagnostic()),
            "warning[SA1500]: Braces for multi-line statements should not share line"
        );
    }

    #[test]
    fn test_render_full_diagnostic() {
        let renderer = DiagnosticRenderer::no_colors();
        let output = renderer.render(&brace_diagnostic(), Some(SOURCE));
        insta::assert_snapshot!(output, @r"
warning[SA1500]: Braces for multi-line statements should not share line

  ┌─[Foo.cs:3:27]
  │
  1 │ public class Foo
  2 │ {
> 3 │     public void Method1() {
    │                           ^
  4 │     }
  5 │ }
  = help: run `sable fix` to apply the automatic fix
");
    }

    #[test]
    fn test_caret_counts_utf16_columns() {
        // U+1F600 occupies two UTF-16 units and two terminal cells
        let source = "var s = \"\u{1F600}\"; int  x;";
        let column = source.find("  x").map(|i| source[..i].encode_utf16().count() + 1);
        let column = column.unwrap();
        let mut location = Location::new(PathBuf::new(), 1, column, 0, 2);
        location.end_column = column + 2;
        let diagnostic = Diagnostic::new("SA1025", Severity::Warning, "spaces", location);

        let output = DiagnosticRenderer::no_colors().render(&diagnostic, Some(source));
        let caret_line = output.lines().find(|l| l.contains('^')).unwrap();
        let code_line = output.lines().find(|l| l.starts_with('>')).unwrap();
        let caret_at = caret_line.chars().position(|c| c == '^').unwrap();
        let code_cells: usize = code_line
            .split("  x")
            .next()
            .unwrap()
            .chars()
            .map(|c| c.width().unwrap_or(0))
            .sum();
        assert_eq!(caret_at, code_cells);
        assert!(caret_line.ends_with("^^"));
        assert!(output.contains("<input>:1:"));
    }

    #[test]
    fn test_missing_source_falls_back_to_location_line() {
        let mut diagnostic = brace_diagnostic();
        diagnostic.location.file = PathBuf::from("does/not/exist.cs");
        let output = DiagnosticRenderer::no_colors().render(&diagnostic, None);
        assert!(output.contains("→ does/not/exist.cs:3:27"));
    }

    #[test]
    fn test_json_output() {
        let renderer = DiagnosticRenderer::no_colors().with_format(OutputFormat::Json);
        let output = renderer.render_diagnostics(&[brace_diagnostic()], Some(SOURCE));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["rule_id"], "SA1500");
        assert_eq!(value[0]["severity"], "warning");
        assert_eq!(value[0]["location"]["line"], 3);
        assert_eq!(value[0]["location"]["column"], 27);
        assert_eq!(value[0]["fixable"], true);
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_json_pretty_output() {
        let renderer = DiagnosticRenderer::no_colors().with_format(OutputFormat::JsonPretty);
        let output = renderer.render(&brace_diagnostic(), None);
        assert!(output.contains("\n  {"));
        assert!(output.contains("\"category\": \"layout\""));
    }

    #[test]
    fn test_summary() {
        let renderer = DiagnosticRenderer::no_colors();
        assert_eq!(
            renderer.render_summary(&[], 3),
            "Checked 3 files: no issues found"
        );

        let mut error = brace_diagnostic().with_fixable(false);
        error.severity = Severity::Error;
        let summary = renderer.render_summary(&[brace_diagnostic(), error], 1);
        assert_eq!(
            summary,
            "Checked 1 file: 1 error, 1 warning (1 fixable with `sable fix`)"
        );
    }

    #[test]
    fn test_separator_between_diagnostics() {
        let renderer = DiagnosticRenderer::no_colors().with_format(OutputFormat::Text);
        let output = renderer.render_diagnostics(&[brace_diagnostic(), brace_diagnostic()], Some(SOURCE));
        assert_eq!(output.matches("warning[SA1500]").count(), 2);
        assert!(output.contains("───"));
    }
}
