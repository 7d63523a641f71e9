//! Typed failure causes.

use git_reference_model::ReferenceType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the working tree blocked the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingDirectoryReason {
    Unstaged,
    Uncommitted,
    LocalChangesOverwritten,
    UntrackedOverwritten,
    Unmerged,
    LocalChanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushRejectionReason {
    NonFastForward,
    /// `--force-with-lease` expectation did not match the remote.
    StaleInfo,
    NeedsForce,
    AlreadyExists,
    FetchFirst,
    /// The remote (usually a hook) declined the update.
    RemoteRejected,
    Other,
}

/// One `! [rejected] src -> dst (reason)` line of push output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RejectedRef {
    pub source: String,
    pub destination: String,
    /// Reason text inside the parentheses, empty if git gave none.
    pub reason: String,
    pub remote_rejected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceErrorReason {
    Ambiguous,
    Invalid,
    NotFound,
    AlreadyExists,
    TypeMismatch,
    ReadFailed,
    LockFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmoduleUpdateReason {
    Uninitialized,
    Unmerged,
    FetchFailed,
    CheckoutFailed,
    MergeFailed,
    RebaseFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CherryPickReason {
    /// Picking a merge commit without `-m`.
    AmbiguousMergeParent,
    /// `-m` given for a non-merge commit, or a parent that does not exist.
    InvalidMainline,
    Conflict,
    EmptyCommit,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StashReason {
    NoLocalChanges,
    NotFound,
    IndexConflict,
    ApplyConflict,
    SaveFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeFailureReason {
    Conflicts,
    UnrelatedHistories,
    FastForwardNotPossible,
    NoMergeToAbort,
}

/// Semantic cause of a failed git command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GitErrorKind {
    DetachedHead,
    MergeInProgress,
    RebaseInProgress,
    WorkingDirectory {
        reason: WorkingDirectoryReason,
        files: Vec<String>,
    },
    PushRejected {
        reason: PushRejectionReason,
        rejected_refs: Vec<RejectedRef>,
    },
    Reference {
        reason: ReferenceErrorReason,
        name: Option<String>,
        reference_type: Option<ReferenceType>,
    },
    SubmoduleUpdate {
        reason: SubmoduleUpdateReason,
        path: Option<String>,
    },
    CherryPick {
        reason: CherryPickReason,
    },
    Stash {
        reason: StashReason,
    },
    MergeFailed {
        reason: MergeFailureReason,
        files: Vec<String>,
    },
    NotARepository,
    RepositoryLocked,
    AuthenticationFailed,
    RemoteUnreachable,
    NothingToCommit,
    UnknownIdentity,
    Unclassified,
}

impl GitErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DetachedHead => "detached_head",
            Self::MergeInProgress => "merge_in_progress",
            Self::RebaseInProgress => "rebase_in_progress",
            Self::WorkingDirectory { .. } => "working_directory",
            Self::PushRejected { .. } => "push_rejected",
            Self::Reference { .. } => "reference",
            Self::SubmoduleUpdate { .. } => "submodule_update",
            Self::CherryPick { .. } => "cherry_pick",
            Self::Stash { .. } => "stash",
            Self::MergeFailed { .. } => "merge_failed",
            Self::NotARepository => "not_a_repository",
            Self::RepositoryLocked => "repository_locked",
            Self::AuthenticationFailed => "authentication_failed",
            Self::RemoteUnreachable => "remote_unreachable",
            Self::NothingToCommit => "nothing_to_commit",
            Self::UnknownIdentity => "unknown_identity",
            Self::Unclassified => "unclassified",
        }
    }

    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Unclassified)
    }

    /// Whether the user must resolve conflicts before retrying.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::MergeFailed {
                reason: MergeFailureReason::Conflicts,
                ..
            } | Self::CherryPick {
                reason: CherryPickReason::Conflict
            } | Self::Stash {
                reason: StashReason::ApplyConflict | StashReason::IndexConflict
            } | Self::WorkingDirectory {
                reason: WorkingDirectoryReason::Unmerged,
                ..
            }
        )
    }
}

impl fmt::Display for GitErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetachedHead => f.write_str("HEAD is detached"),
            Self::MergeInProgress => f.write_str("a merge is in progress"),
            Self::RebaseInProgress => f.write_str("a rebase is in progress"),
            Self::WorkingDirectory { reason, files } => {
                write!(f, "working directory blocks the operation ({reason:?})")?;
                if !files.is_empty() {
                    write!(f, " [{}]", files.join(", "))?;
                }
                Ok(())
            }
            Self::PushRejected { reason, .. } => write!(f, "push rejected ({reason:?})"),
            Self::Reference { reason, name, .. } => match name {
                Some(name) => write!(f, "reference error ({reason:?}) for '{name}'"),
                None => write!(f, "reference error ({reason:?})"),
            },
            Self::SubmoduleUpdate { reason, path } => match path {
                Some(path) => write!(f, "submodule update failed ({reason:?}) at '{path}'"),
                None => write!(f, "submodule update failed ({reason:?})"),
            },
            Self::CherryPick { reason } => write!(f, "cherry-pick failed ({reason:?})"),
            Self::Stash { reason } => write!(f, "stash failed ({reason:?})"),
            Self::MergeFailed { reason, .. } => write!(f, "merge failed ({reason:?})"),
            Self::NotARepository => f.write_str("not a git repository"),
            Self::RepositoryLocked => f.write_str("repository is locked by another git process"),
            Self::AuthenticationFailed => f.write_str("authentication failed"),
            Self::RemoteUnreachable => f.write_str("remote is unreachable"),
            Self::NothingToCommit => f.write_str("nothing to commit"),
            Self::UnknownIdentity => f.write_str("committer identity is not configured"),
            Self::Unclassified => f.write_str("git command failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let kind = GitErrorKind::WorkingDirectory {
            reason: WorkingDirectoryReason::Unstaged,
            files: vec!["a.txt".into()],
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "working_directory");
        assert_eq!(json["reason"], "unstaged");
        assert_eq!(json["files"][0], "a.txt");

        let back: GitErrorKind = serde_json::from_value(json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn display_messages() {
        let cases = vec![
            (GitErrorKind::DetachedHead, "HEAD is detached"),
            (
                GitErrorKind::Reference {
                    reason: ReferenceErrorReason::NotFound,
                    name: Some("nope".into()),
                    reference_type: None,
                },
                "reference error (NotFound) for 'nope'",
            ),
            (
                GitErrorKind::SubmoduleUpdate {
                    reason: SubmoduleUpdateReason::Uninitialized,
                    path: Some("vendor/lib".into()),
                },
                "submodule update failed (Uninitialized) at 'vendor/lib'",
            ),
            (GitErrorKind::Unclassified, "git command failed"),
        ];
        for (kind, expected) in cases {
            assert_eq!(kind.to_string(), expected);
        }
    }

    #[test]
    fn conflict_kinds() {
        assert!(GitErrorKind::CherryPick {
            reason: CherryPickReason::Conflict
        }
        .is_conflict());
        assert!(!GitErrorKind::RepositoryLocked.is_conflict());
        assert_eq!(GitErrorKind::RepositoryLocked.code(), "repository_locked");
    }
}
