//! The error value returned for a failed git command.

use crate::kind::GitErrorKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A git command exited unsuccessfully.
///
/// `stderr` is kept verbatim so nothing git said is lost to classification.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {}", summary_line(.stderr))]
pub struct GitCommandError {
    pub kind: GitErrorKind,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl GitCommandError {
    pub fn new(kind: GitErrorKind, exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self {
            kind,
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// First non-empty diagnostic line.
    pub fn summary(&self) -> &str {
        summary_line(&self.stderr)
    }
}

fn summary_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no diagnostic output")
}
