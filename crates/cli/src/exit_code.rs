//! Exit code definitions for print-migrate
//!
//! Scripts driving a migration rely on these values to tell a bad invocation
//! apart from expired credentials. Do not renumber existing codes.

/// Exit codes for the print-migrate application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Input exhausted; individual records may still have failed
    Success = 0,

    /// General/unspecified error, e.g. the input file could not be read
    GeneralError = 1,

    /// User input error: wrong argument count, missing bucket name
    UsageError = 2,

    /// Storage credentials expired mid-run
    AuthError = 4,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            4 => Some(Self::AuthError),
            _ => None,
        }
    }

    /// Exit code for a run-stopping error
    pub fn from_error(error: &pm_core::Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Migration completed",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments or configuration",
            Self::AuthError => "Storage credentials expired",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}
