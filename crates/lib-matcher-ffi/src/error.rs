//! Error types for matcher boundary operations.

use lib_types::{StatusCode, UnknownCode};
use thiserror::Error;

/// Errors that can occur while marshalling a call into the matcher engine.
#[derive(Debug, Error)]
pub enum MatcherError {
    /// Failed to load the engine shared library.
    #[error("Failed to load library '{path}': {source}")]
    LoadError {
        path: String,
        #[source]
        source: libloading::Error,
    },

    /// Engine entry point was not resolved at registry initialization.
    #[error("Symbol '{symbol}' not found in library")]
    SymbolNotFound { symbol: &'static str },

    /// The boundary registry has not been initialized.
    #[error("Matcher registry is not initialized")]
    NotInitialized,

    /// Native buffer allocation failed.
    #[error("Memory allocation failed: {0}")]
    AllocationFailed(String),

    /// A record field could not be read or written.
    #[error("Cannot access field '{field}': {reason}")]
    FieldAccess { field: &'static str, reason: String },

    /// A native record carried a code with no caller-side enumeration value.
    #[error(transparent)]
    InvalidCode(#[from] UnknownCode),

    /// A path could not be handed to the engine as a C string.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The engine returned a non-OK status.
    #[error("Engine returned {}", describe_code(*.code))]
    Native { code: i32 },

    /// An interchange container held no usable record.
    #[error("No {kind} record in interchange data")]
    ExtractionFailed { kind: &'static str },

    /// The call completed without producing what it promised.
    #[error("Operation '{operation}' failed: {reason}")]
    CommandFailed {
        operation: &'static str,
        reason: String,
    },
}

fn describe_code(code: i32) -> String {
    match StatusCode::from_code(code) {
        Some(status) => status.to_string(),
        None => format!("unknown status {code}"),
    }
}

impl MatcherError {
    /// Create a load error.
    pub fn load_error(path: impl Into<String>, source: libloading::Error) -> Self {
        Self::LoadError {
            path: path.into(),
            source,
        }
    }

    /// Create a field access error.
    pub fn field_access(field: &'static str, reason: impl Into<String>) -> Self {
        Self::FieldAccess {
            field,
            reason: reason.into(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn command_failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            operation,
            reason: reason.into(),
        }
    }

    /// The single status code written to the error channel for this failure.
    ///
    /// Failures to read, build or marshal a record have no finer signal than
    /// an allocation failure. Engine codes pass through unchanged.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::AllocationFailed(_) | Self::FieldAccess { .. } | Self::InvalidPath { .. } => {
                StatusCode::MemAlloc.to_code()
            }
            Self::LoadError { .. } | Self::SymbolNotFound { .. } | Self::NotInitialized => {
                StatusCode::MissingResource.to_code()
            }
            Self::InvalidCode(_) | Self::CommandFailed { .. } => {
                StatusCode::CommandFailed.to_code()
            }
            Self::ExtractionFailed { .. } => StatusCode::ExtractionFailed.to_code(),
            Self::Native { code } => *code,
        }
    }

    /// Named status for this failure, when the engine table defines one.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_code(self.status_code())
    }
}

/// Result type for matcher operations.
pub type MatcherResult<T> = Result<T, MatcherError>;
