//! Diagnostics: positions, severities, and rendering
//!
//! Positions are 1-based. Columns count UTF-16 code units so they line up
//! with what editors and the .NET tooling report for the same file.

mod renderer;
mod types;

pub use renderer::{DiagnosticRenderer, OutputFormat};
pub use types::{Applicability, Diagnostic, Location, Severity, SourceMap};
