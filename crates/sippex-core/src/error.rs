//! Shared error type across sippex crates.

use thiserror::Error;

/// Stable error codes (used in log fields and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid or inconsistent configuration.
    Config,
    /// Unsupported config schema version.
    UnsupportedVersion,
    /// Source file could not be opened or read.
    Io,
    /// Data row could not be mapped onto the header list.
    MalformedRow,
    /// Field value matches no known format.
    UnrecognizedValue,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Io => "IO",
            ErrorCode::MalformedRow => "MALFORMED_ROW",
            ErrorCode::UnrecognizedValue => "UNRECOGNIZED_VALUE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, SippexError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum SippexError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed row: {0}")]
    MalformedRow(String),
    #[error("unrecognized value for {name}: {raw:?}")]
    UnrecognizedValue { name: String, raw: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl SippexError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        SippexError::Io { path: path.into(), source }
    }

    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SippexError::Config(_) => ErrorCode::Config,
            SippexError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            SippexError::Io { .. } => ErrorCode::Io,
            SippexError::MalformedRow(_) => ErrorCode::MalformedRow,
            SippexError::UnrecognizedValue { .. } => ErrorCode::UnrecognizedValue,
            SippexError::Internal(_) => ErrorCode::Internal,
        }
    }
}
