#![allow(dead_code)]

use git_error_classifier::{classify, GitErrorKind};

/// Classify `stderr` as if git exited with status 1.
pub fn kind_of(stderr: &str) -> GitErrorKind {
    classify(Some(1), stderr).kind
}
