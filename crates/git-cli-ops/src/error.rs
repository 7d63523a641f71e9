//! Error types for git operations.

use git_error_classifier::GitCommandError;
use git_object_model::ObjectParseError;
use git_process_runner::ProcessError;
use git_reference_model::ReferenceParseError;
use thiserror::Error;

/// Everything a git operation can fail with.
#[derive(Debug, Error)]
pub enum GitCliError {
    /// Rejected locally before git was started.
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Git ran and failed; the kind says why.
    #[error(transparent)]
    Command(#[from] GitCommandError),

    #[error(transparent)]
    ObjectParse(#[from] ObjectParseError),

    #[error(transparent)]
    ReferenceParse(#[from] ReferenceParseError),

    #[error("Object not found: {revision}")]
    ObjectNotFound { revision: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GitCliError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidOptions { .. } => "invalid_options",
            Self::Process(err) => err.code(),
            Self::Command(err) => err.code(),
            Self::ObjectParse(err) => err.code(),
            Self::ReferenceParse(err) => err.code(),
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// The classified git failure, if this is one.
    pub fn as_command_error(&self) -> Option<&GitCommandError> {
        match self {
            Self::Command(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for git operations.
pub type GitCliResult<T> = Result<T, GitCliError>;
