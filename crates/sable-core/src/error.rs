//! Error types and handling for Sable operations

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Sable operations
///
/// Style analysis itself never fails: malformed C# input is reported through
/// syntax diagnostics. These errors cover the I/O and plumbing around it.
#[derive(Debug, Error)]
pub enum SableError {
    /// Parse errors that have to abort an operation (not ordinary syntax errors)
    #[error("Parse error: {message} at {location}")]
    ParseError {
        message: String,
        location: Box<crate::diagnostics::Location>,
    },

    /// Configuration loading or validation errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Rule lookup or execution errors
    #[error("Rule error in '{rule_id}': {message}")]
    RuleError { rule_id: String, message: String },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Autofix errors (overlapping or out-of-bounds edits)
    #[error("Autofix error: {message}")]
    AutofixError { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    Config,
    Rule,
    Io,
    Autofix,
    Internal,
}

impl SableError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SableError::ParseError { .. } => ErrorKind::Parse,
            SableError::ConfigError { .. } => ErrorKind::Config,
            SableError::RuleError { .. } => ErrorKind::Rule,
            SableError::IoError { .. } => ErrorKind::Io,
            SableError::AutofixError { .. } => ErrorKind::Autofix,
            SableError::InternalError { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other files)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Parse | ErrorKind::Rule | ErrorKind::Autofix
        )
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>, location: crate::diagnostics::Location) -> Self {
        Self::ParseError {
            message: message.into(),
            location: Box::new(location),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleError {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }

    /// Create an autofix error
    pub fn autofix_error(message: impl Into<String>) -> Self {
        Self::AutofixError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for SableError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            path: PathBuf::new(),
            source: err,
        }
    }
}
