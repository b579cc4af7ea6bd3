//! Error handling for ondeck extraction
//!
//! This module provides the unified error type and result type for all
//! extraction operations, plus the combinator that turns recoverable
//! per-field failures into absent values.

use thiserror::Error;

/// Extraction error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// A requested command, environment or label does not occur
    #[error("{what} not found")]
    NotFound { what: String },
    /// Fewer balanced-brace arguments than the command needs
    #[error("\\{command}: expected {expected} argument(s), found {found}")]
    Incomplete {
        command: String,
        expected: usize,
        found: usize,
    },
    /// An argument group opened but never closed
    #[error("\\{command}: unbalanced braces in argument")]
    Malformed { command: String },
    /// No `\begin{document}` ... `\end{document}` pair
    #[error("document has no body (missing \\begin{{document}} or \\end{{document}})")]
    MissingBody,
    /// IO error (for file operations)
    #[error("IO error: {message}")]
    Io { message: String },
    /// Invalid configuration file
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

// Convenience constructors for errors
impl ExtractError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ExtractError::NotFound { what: what.into() }
    }

    pub fn incomplete(command: impl Into<String>, expected: usize, found: usize) -> Self {
        ExtractError::Incomplete {
            command: command.into(),
            expected,
            found,
        }
    }

    pub fn malformed(command: impl Into<String>) -> Self {
        ExtractError::Malformed {
            command: command.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        ExtractError::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ExtractError::Config {
            message: message.into(),
        }
    }

    /// Errors that a field boundary may turn into an absent value.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExtractError::NotFound { .. }
                | ExtractError::Incomplete { .. }
                | ExtractError::Malformed { .. }
        )
    }
}

/// Maps recoverable failures to `None` and keeps the rest as errors.
pub trait Recover<T> {
    fn recover(self) -> ExtractResult<Option<T>>;
}

impl<T> Recover<T> for ExtractResult<T> {
    fn recover(self) -> ExtractResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
