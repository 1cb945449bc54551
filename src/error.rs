//! Structured error handling and exit codes.

use std::path::PathBuf;

use thiserror::Error;

/// Exit codes for the baktidy application.
///
/// - 0: Success (completed normally, including dry-run and "nothing to do")
/// - 1: General error (unexpected failure)
/// - 2: Configuration error (bad flags, unreadable report, empty priority list)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: Run completed normally.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Configuration error: The run could not start; nothing was mutated.
    ConfigError = 2,
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
            Self::Success => "BT000",
            Self::GeneralError => "BT001",
            Self::ConfigError => "BT002",
        }
    }
}

/// Fatal configuration errors.
///
/// These abort the run before any filesystem mutation. Per-group and
/// per-file conditions (skipped groups, missing files, failed deletions)
/// are never represented here; they are accumulated in run statistics
/// instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The duplicate report file is missing or unreadable.
    #[error("cannot read report file {path}: {source}")]
    ReportUnreadable {
        /// Path to the report file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Auto-detection found no folder candidates and no explicit list was given.
    #[error("no priority candidates detected in report; supply --priority with an ordered folder list")]
    NoPriorityCandidates,

    /// A path argument that must be a directory is not one.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An exclusion/junk glob pattern failed to compile.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser message from globset
        message: String,
    },

    /// The archive destination lies inside the tree being archived.
    #[error("archive destination {0} is inside the source tree")]
    ArchiveInsideSource(PathBuf),
}
