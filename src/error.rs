//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for canonmatch.
///
/// - 0: At least one query file duplicates a canonical file
/// - 1: General error (invalid options, unexpected failure)
/// - 2: Comparison completed, every query file is unique
/// - 3: Completed, but some files could not be scanned or classified
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates found.
    Success = 0,
    /// An error stopped the run.
    GeneralError = 1,
    /// No duplicates found.
    NoDuplicates = 2,
    /// Completed with scan or source errors.
    PartialSuccess = 3,
    /// Interrupted by Ctrl+C.
    Interrupted = 130,
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
            Self::Success => "CM000",
            Self::GeneralError => "CM001",
            Self::NoDuplicates => "CM002",
            Self::PartialSuccess => "CM003",
            Self::Interrupted => "CM130",
        }
    }
}

/// Returned by `run_app` when Ctrl+C stops a scan before anything was compared.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Interrupted before comparison")]
pub struct Interrupted;

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CM001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// The exit code for an error returned by `run_app`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<Interrupted>().is_some() {
        ExitCode::Interrupted
    } else {
        ExitCode::GeneralError
    }
}
