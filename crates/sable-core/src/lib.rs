//! Sable Core
//!
//! Core engine for the Sable C# style analyzer: a lossless C# syntax tree,
//! diagnostics and their rendering, configuration, text edits, file
//! discovery, and cancellation.

pub mod autofix;
pub mod cancel;
pub mod config;
pub mod console; // Terminal console utilities for rich output
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod result;

pub use autofix::{Fix, TextEdit, apply_edits, select_non_conflicting, unified_diff};
pub use cancel::CancellationToken;
pub use config::{
    ConfigLoader, ConfigWarning, LoadedConfig, NewlineAtEndOfFile, RuleSeverity, StyleSettings,
};
pub use console::{Color, Console};
pub use cst::{LanguageVersion, ParseOptions, SyntaxTree};
pub use diagnostics::{
    Applicability, Diagnostic, DiagnosticRenderer, Location, OutputFormat, Severity, SourceMap,
};
pub use discovery::discover_files;
pub use error::{ErrorKind, SableError};
pub use result::{Result, ResultExt};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A second initialisation (e.g. from tests) is not an error worth surfacing
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();
}

/// Default log filter directive
pub const DEFAULT_LOG_DIRECTIVE: &str = "sable=info";

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
