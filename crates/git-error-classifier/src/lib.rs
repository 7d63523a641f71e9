//! # Git Error Classifier
//!
//! Turns the free-form text a failed git command printed into a
//! [`GitCommandError`] whose [`GitErrorKind`] callers can match on.
//!
//! ## Rule order
//!
//! | # | Rule | Examples |
//! |---|------|----------|
//! | 1 | detached HEAD | `You are not currently on a branch` |
//! | 2 | working directory | unstaged, uncommitted, overwritten files |
//! | 3 | in progress | unfinished merge or rebase |
//! | 4 | submodule | uninitialized, fetch/checkout/merge/rebase failed |
//! | 5 | push | `! [rejected]`, `! [remote rejected]` |
//! | 6 | cherry-pick | missing `-m`, conflicts, empty pick |
//! | 7 | stash | nothing to save, missing entry, apply conflicts |
//! | 8 | merge | conflicts, unrelated histories, fast-forward only |
//! | 9 | authentication | bad credentials, disabled prompts |
//! | 10 | remote | host resolution, connection failures |
//! | 11 | repository | not a repository, lock files, identity, nothing to commit |
//! | 12 | reference | ambiguous, invalid, missing, existing, lock, read |
//!
//! Anything else is [`GitErrorKind::Unclassified`]. The original text is
//! always kept in [`GitCommandError::stderr`].
//!
//! Git must run with `LC_ALL=C` for the English patterns to apply.

mod classifier;
mod error;
mod kind;

pub use classifier::{
    classify, classify_kind, diagnostic_text, extract_file_list, matching_rule,
};
pub use error::GitCommandError;
pub use kind::{
    CherryPickReason, GitErrorKind, MergeFailureReason, PushRejectionReason, ReferenceErrorReason,
    RejectedRef, StashReason, SubmoduleUpdateReason, WorkingDirectoryReason,
};
