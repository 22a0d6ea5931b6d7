//! Structured error handling and exit codes.

use serde::Serialize;

use crate::diff::DiffError;
use crate::manifest::{BuildError, ParseError};

/// Exit codes for md5ls.
///
/// - 0: Success
/// - 1: General error (I/O and other unexpected failures)
/// - 2: Invalid input (bad root directory, malformed manifest line,
///   unencodable path, usage errors)
/// - 70: Internal error (diff reconciliation left residual entries)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The input could not be used.
    InvalidInput = 2,
    /// An internal consistency check failed.
    InternalError = 70,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "ML000",
            Self::GeneralError => "ML001",
            Self::InvalidInput => "ML002",
            Self::InternalError => "ML070",
        }
    }

    /// Classify an application error by the library error in its chain.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if cause.downcast_ref::<DiffError>().is_some() {
                return Self::InternalError;
            }
            if cause.downcast_ref::<ParseError>().is_some() {
                return Self::InvalidInput;
            }
            if let Some(build) = cause.downcast_ref::<BuildError>() {
                return match build {
                    BuildError::PathNotDirectory(_)
                    | BuildError::UnencodableOutputPath(_)
                    | BuildError::Path(_) => Self::InvalidInput,
                };
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "ML002")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
