//! Error types for pm-core
//!
//! Provides a unified error type that can be converted to appropriate exit codes.

use thiserror::Error;

/// Result type alias for pm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// S3 error code reported when the session credentials have expired
pub const EXPIRED_TOKEN_CODE: &str = "ExpiredToken";

/// Error types for pm-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid arguments or environment
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed row in the input file
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Row parsed but does not carry the expected fields
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Error returned by the storage service
    #[error("Storage error{}: {message}", code_suffix(.code))]
    Storage {
        /// Machine-readable error code, when the service returned one
        code: Option<String>,
        message: String,
    },

    /// Storage credentials expired mid-run
    #[error("Credentials expired: {0}")]
    ExpiredToken(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl Error {
    /// Build a storage error, promoting an `ExpiredToken` code to [`Error::ExpiredToken`]
    pub fn storage(code: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Some(EXPIRED_TOKEN_CODE) => Error::ExpiredToken(message),
            _ => Error::Storage {
                code: code.map(str::to_string),
                message,
            },
        }
    }

    /// Whether this error must stop the whole run rather than just the current record
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Io(_) | Error::ExpiredToken(_))
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 2,       // UsageError
            Error::ExpiredToken(_) => 4, // AuthError
            _ => 1,                      // GeneralError
        }
    }
}
