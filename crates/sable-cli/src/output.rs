//! Output formatting and progress reporting

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use sable_core::{Diagnostic, DiagnosticRenderer, OutputFormat as CoreOutputFormat, Severity};
use sable_rules::RuleRegistry;
use serde::Serialize;

use crate::OutputFormat;

/// Diagnostics of one analysed file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// The text the diagnostics refer to
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Output formatter for different formats
pub struct OutputFormatter {
    format: OutputFormat,
    renderer: DiagnosticRenderer,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, no_color: bool) -> Self {
        let renderer = if no_color {
            DiagnosticRenderer::no_colors()
        } else {
            DiagnosticRenderer::new()
        };
        let renderer = match format {
            OutputFormat::Human => renderer,
            OutputFormat::Json => renderer.with_format(CoreOutputFormat::Json),
            OutputFormat::JsonPretty => renderer.with_format(CoreOutputFormat::JsonPretty),
        };
        Self { format, renderer }
    }

    /// Print every diagnostic followed by a summary line
    ///
    /// JSON formats print a single array covering all files.
    pub fn print_reports(&self, reports: &[FileReport]) {
        let all: Vec<Diagnostic> = reports
            .iter()
            .flat_map(|report| report.diagnostics.iter().cloned())
            .collect();

        match self.format {
            OutputFormat::Human => {
                for report in reports.iter().filter(|r| !r.diagnostics.is_empty()) {
                    println!(
                        "{}",
                        self.renderer
                            .render_diagnostics(&report.diagnostics, Some(&report.source))
                    );
                }
                println!("{}", self.renderer.render_summary(&all, reports.len()));
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                println!("{}", self.renderer.render_diagnostics(&all, None));
            }
        }
    }
}

/// One catalog entry as printed by `sable rules`
#[derive(Debug, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub message: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
    /// `safe`, `unsafe`, or absent when the rule has no fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

pub fn rule_infos(registry: &RuleRegistry) -> Vec<RuleInfo> {
    registry
        .iter()
        .map(|rule| RuleInfo {
            id: rule.id,
            name: rule.name,
            category: rule.category.as_str(),
            severity: rule.severity,
            message: rule.message,
            description: rule.description,
            fix: rule
                .is_fixable()
                .then(|| rule.fix_applicability.to_string()),
        })
        .collect()
}

pub fn print_rules(format: OutputFormat, registry: &RuleRegistry) -> serde_json::Result<()> {
    let infos = rule_infos(registry);
    match format {
        OutputFormat::Human => {
            println!("Available rules:");
            for info in &infos {
                println!(
                    "  {:<8} {:<12} {:<8} {:<7} {}",
                    info.id,
                    info.category,
                    info.severity.to_string(),
                    info.fix.as_deref().unwrap_or("-"),
                    info.name
                );
            }
            println!("\nTotal: {} rules", infos.len());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&infos)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&infos)?),
    }
    Ok(())
}

/// Progress bar on stderr, shown only for multi-file runs on a terminal
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(total: usize, action: &'static str) -> Self {
        let enabled = total > 1 && io::stderr().is_terminal();
        let bar = enabled.then(|| {
            let bar = ProgressBar::new(total as u64);
            let style = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style.progress_chars("=> "));
            bar.set_message(action);
            bar
        });
        Self { bar }
    }

    pub fn inc(&self) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Utility functions for output formatting
pub mod utils {
    /// Format duration in human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_infos_mark_fix_safety() {
        let infos = rule_infos(&RuleRegistry::builtin());
        let brace = infos.iter().find(|i| i.id == "SA1500").unwrap();
        assert_eq!(brace.fix.as_deref(), Some("safe"));
        let naming = infos.iter().find(|i| i.id == "SA1300").unwrap();
        assert_eq!(naming.fix.as_deref(), Some("unsafe"));
        let hungarian = infos.iter().find(|i| i.id == "SA1305").unwrap();
        assert!(hungarian.fix.is_none());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(utils::format_duration(std::time::Duration::from_millis(250)), "250ms");
        assert_eq!(utils::format_duration(std::time::Duration::from_millis(1500)), "1.5s");
    }
}
