//! Error types for process execution.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures to start, talk to, or stop a child process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("executable not found: {program}")]
    NotFound { program: String },

    #[error("failed to start {command}: {message}")]
    SpawnFailed { command: String, message: String },

    #[error("working directory does not exist: {}", path.display())]
    InvalidWorkingDirectory { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} stream was not captured")]
    StreamUnavailable(&'static str),

    #[error("command timed out after {timeout:?}: {command}")]
    TimedOut { command: String, timeout: Duration },

    #[error("command was stopped: {command}")]
    Terminated { command: String },
}

impl ProcessError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "executable_not_found",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::InvalidWorkingDirectory { .. } => "invalid_working_directory",
            Self::Io(_) => "io_error",
            Self::StreamUnavailable(_) => "stream_unavailable",
            Self::TimedOut { .. } => "timed_out",
            Self::Terminated { .. } => "terminated",
        }
    }

    /// Start and timeout failures may succeed on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SpawnFailed { .. } | Self::TimedOut { .. })
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;
