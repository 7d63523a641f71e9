//! Maps git's diagnostic text to a [`GitErrorKind`].
//!
//! Rules run in order, most specific first; the first rule that recognises
//! the text decides the kind. Classification is a pure function of the exit
//! code and text, so the same input always yields an equal error.

use crate::error::GitCommandError;
use crate::kind::{
    CherryPickReason, GitErrorKind, MergeFailureReason, PushRejectionReason, ReferenceErrorReason,
    RejectedRef, StashReason, SubmoduleUpdateReason, WorkingDirectoryReason,
};
use git_reference_model::{decompose_canonical_name, ReferenceType};
use regex::Regex;
use std::sync::LazyLock;

static REJECTED_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*!\s+\[(rejected|remote rejected)\]\s+(\S+)\s+->\s+(\S+)(?:\s+\((.*)\))?\s*$")
        .expect("rejected ref pattern is valid")
});

static SUBMODULE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)submodule path '([^']+)'").expect("submodule path pattern is valid")
});

static UNMERGED_SUBMODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)skipping unmerged submodule (\S+)")
        .expect("unmerged submodule pattern is valid")
});

static CONFLICT_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CONFLICT \([^)]+\): (?:Merge conflict in (.+)|(\S+) (?:deleted|added) in )")
        .expect("conflict pattern is valid")
});

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']+)'").expect("quoted name pattern is valid"));

/// Line prefixes git puts in front of diagnostics.
const PREFIXES: [&str; 4] = ["fatal: ", "error: ", "warning: ", "remote: "];

/// The text under inspection, pre-lowered once for case-insensitive matching.
struct Diagnostic<'a> {
    text: &'a str,
    lower: String,
}

impl<'a> Diagnostic<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            lower: text.to_lowercase(),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.lower.contains(needle))
    }

    /// Lines with any `fatal:`/`error:` style prefix removed.
    fn messages(&self) -> impl Iterator<Item = &'a str> {
        self.text.lines().map(strip_prefix)
    }

    /// First message line containing `needle` (case-insensitive).
    fn message_with(&self, needle: &str) -> Option<&'a str> {
        self.messages()
            .find(|line| line.to_lowercase().contains(needle))
    }
}

fn strip_prefix(line: &str) -> &str {
    let trimmed = line.trim_start();
    PREFIXES
        .iter()
        .find_map(|prefix| {
            trimmed
                .get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &trimmed[prefix.len()..])
        })
        .unwrap_or(trimmed)
}

type Rule = fn(&Diagnostic<'_>) -> Option<GitErrorKind>;

/// Classification rules in priority order.
const RULES: &[(&str, Rule)] = &[
    ("detached_head", detached_head),
    ("working_directory", working_directory),
    ("in_progress", in_progress),
    ("submodule", submodule),
    ("push", push),
    ("cherry_pick", cherry_pick),
    ("stash", stash),
    ("merge", merge),
    ("authentication", authentication),
    ("remote", remote),
    ("repository", repository),
    ("reference", reference),
];

/// Classify a failed command from its exit code and diagnostic text.
pub fn classify(exit_code: Option<i32>, stderr: &str) -> GitCommandError {
    GitCommandError::new(classify_kind(stderr), exit_code, stderr)
}

/// Classify diagnostic text into a kind. Falls back to `Unclassified`.
pub fn classify_kind(text: &str) -> GitErrorKind {
    let diagnostic = Diagnostic::new(text);
    RULES
        .iter()
        .find_map(|(_, rule)| rule(&diagnostic))
        .unwrap_or(GitErrorKind::Unclassified)
}

/// Name of the rule that recognises `text`, for diagnostics and tests.
pub fn matching_rule(text: &str) -> Option<&'static str> {
    let diagnostic = Diagnostic::new(text);
    RULES
        .iter()
        .find(|(_, rule)| rule(&diagnostic).is_some())
        .map(|(name, _)| *name)
}

/// Pick the text to classify: stderr, or stdout when stderr is blank.
///
/// Some commands (merge, commit) report failures on stdout only.
pub fn diagnostic_text<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    if stderr.trim().is_empty() {
        stdout
    } else {
        stderr
    }
}

/// Tab-indented lines directly after the first line, tab removed.
///
/// Git lists affected files this way under messages such as
/// "Your local changes to the following files would be overwritten".
pub fn extract_file_list(text: &str) -> Vec<String> {
    text.lines()
        .skip(1)
        .take_while(|line| line.starts_with('\t'))
        .map(|line| line[1..].to_string())
        .collect()
}

fn detached_head(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    d.messages()
        .any(|line| {
            line.starts_with("You are not currently on a branch")
                || line.starts_with("ref HEAD is not a symbolic ref")
        })
        .then_some(GitErrorKind::DetachedHead)
}

fn working_directory(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let reason = if d.contains("you have unstaged changes") {
        WorkingDirectoryReason::Unstaged
    } else if d.contains("contains uncommitted changes") {
        WorkingDirectoryReason::Uncommitted
    } else if d.contains("untracked working tree files would be") {
        WorkingDirectoryReason::UntrackedOverwritten
    } else if d.contains_any(&[
        "your local changes to the following files would be overwritten",
        "your local changes would be overwritten",
    ]) {
        WorkingDirectoryReason::LocalChangesOverwritten
    } else if d.contains_any(&[
        "because you have unmerged files",
        "resolve your current index first",
        "exiting because of an unresolved conflict",
        ": needs merge",
    ]) {
        WorkingDirectoryReason::Unmerged
    } else if d.contains_any(&[
        "please commit your changes or stash them",
        "please commit or stash them",
    ]) {
        WorkingDirectoryReason::LocalChanges
    } else {
        return None;
    };

    Some(GitErrorKind::WorkingDirectory {
        reason,
        files: extract_file_list(d.text),
    })
}

fn in_progress(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    if d.contains_any(&[
        "you have not concluded your merge",
        "merge_head exists",
        "merging is not possible because you have",
    ]) {
        return Some(GitErrorKind::MergeInProgress);
    }
    if d.contains_any(&[
        "already a rebase-merge directory",
        "already a rebase-apply directory",
        "in the middle of another rebase",
        "rebase in progress",
    ]) {
        return Some(GitErrorKind::RebaseInProgress);
    }
    None
}

fn submodule(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let quoted_path = || {
        SUBMODULE_PATH
            .captures(d.text)
            .map(|caps| caps[1].to_string())
    };

    let (reason, path) = if d.contains("not initialized") && d.contains("submodule") {
        (SubmoduleUpdateReason::Uninitialized, quoted_path())
    } else if d.contains("skipping unmerged submodule") {
        let path = UNMERGED_SUBMODULE
            .captures(d.text)
            .map(|caps| caps[1].to_string());
        (SubmoduleUpdateReason::Unmerged, path)
    } else if d.contains("submodule path") || d.contains("in submodule") {
        let reason = if d.contains("unable to checkout") {
            SubmoduleUpdateReason::CheckoutFailed
        } else if d.contains("unable to merge") {
            SubmoduleUpdateReason::MergeFailed
        } else if d.contains("unable to rebase") {
            SubmoduleUpdateReason::RebaseFailed
        } else if d.contains_any(&[
            "unable to fetch",
            "direct fetching of that commit failed",
            "clone of",
        ]) {
            SubmoduleUpdateReason::FetchFailed
        } else {
            return None;
        };
        (reason, quoted_path())
    } else {
        return None;
    };

    Some(GitErrorKind::SubmoduleUpdate { reason, path })
}

fn push(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let rejected_refs: Vec<RejectedRef> = d
        .text
        .lines()
        .filter_map(|line| {
            let caps = REJECTED_REF.captures(line)?;
            Some(RejectedRef {
                source: caps[2].to_string(),
                destination: caps[3].to_string(),
                reason: caps
                    .get(4)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                remote_rejected: &caps[1] == "remote rejected",
            })
        })
        .collect();

    let pushed = !rejected_refs.is_empty()
        || d.contains_any(&["failed to push some refs", "updates were rejected because"]);
    if !pushed {
        return None;
    }

    let reason = match rejected_refs.first() {
        Some(rejected) if rejected.remote_rejected => PushRejectionReason::RemoteRejected,
        Some(rejected) => push_reason_from_text(&rejected.reason.to_lowercase()),
        None if d.contains("tip of your current branch is behind") => {
            PushRejectionReason::NonFastForward
        }
        None if d.contains("remote contains work that you do") => PushRejectionReason::FetchFirst,
        None if d.contains("stale info") => PushRejectionReason::StaleInfo,
        None if d.contains("already exists in the remote") => PushRejectionReason::AlreadyExists,
        None => PushRejectionReason::Other,
    };

    Some(GitErrorKind::PushRejected {
        reason,
        rejected_refs,
    })
}

fn push_reason_from_text(reason: &str) -> PushRejectionReason {
    if reason.contains("non-fast-forward") {
        PushRejectionReason::NonFastForward
    } else if reason.contains("fetch first") {
        PushRejectionReason::FetchFirst
    } else if reason.contains("stale info") {
        PushRejectionReason::StaleInfo
    } else if reason.contains("needs force") {
        PushRejectionReason::NeedsForce
    } else if reason.contains("already exists") {
        PushRejectionReason::AlreadyExists
    } else {
        PushRejectionReason::Other
    }
}

fn cherry_pick(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let reason = if d.contains("is a merge but no -m option was given") {
        CherryPickReason::AmbiguousMergeParent
    } else if d.contains("mainline was specified but commit")
        || (d.contains("does not have parent") && d.contains("commit"))
    {
        CherryPickReason::InvalidMainline
    } else if d.contains_any(&[
        "cherry-pick is already in progress",
        "a cherry-pick or revert is already in progress",
    ]) {
        CherryPickReason::InProgress
    } else if d.contains("previous cherry-pick is now empty") {
        CherryPickReason::EmptyCommit
    } else if d.contains("could not apply") && d.contains("cherry-pick") {
        CherryPickReason::Conflict
    } else {
        return None;
    };
    Some(GitErrorKind::CherryPick { reason })
}

fn stash(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let reason = if d.contains("no local changes to save") {
        StashReason::NoLocalChanges
    } else if d.contains_any(&["no stash entries found", "is not a stash-like commit"])
        || d.contains("log for 'stash' only has")
        || (d.contains("stash@{") && d.contains("is not a valid reference"))
    {
        StashReason::NotFound
    } else if d.contains("conflicts in index") {
        StashReason::IndexConflict
    } else if d.contains_any(&[
        "the stash entry is kept in case you need it again",
        "could not restore untracked files from stash",
        "cannot apply a stash in the middle of a merge",
    ]) {
        StashReason::ApplyConflict
    } else if d.contains_any(&[
        "cannot save the current index state",
        "cannot save the current worktree state",
        "cannot save the untracked files",
        "cannot record working tree state",
    ]) {
        StashReason::SaveFailed
    } else {
        return None;
    };
    Some(GitErrorKind::Stash { reason })
}

fn merge(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    let reason = if d.contains("refusing to merge unrelated histories") {
        MergeFailureReason::UnrelatedHistories
    } else if d.contains_any(&[
        "not possible to fast-forward",
        "diverging branches can't be fast-forwarded",
    ]) {
        MergeFailureReason::FastForwardNotPossible
    } else if d.contains("there is no merge to abort") {
        MergeFailureReason::NoMergeToAbort
    } else if d.contains_any(&[
        "automatic merge failed",
        "merge conflict in",
        "resolve all conflicts manually",
    ])
        || d.text.lines().any(|line| line.starts_with("CONFLICT ("))
    {
        MergeFailureReason::Conflicts
    } else {
        return None;
    };

    let files = d
        .text
        .lines()
        .filter_map(|line| {
            let caps = CONFLICT_FILE.captures(line)?;
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().trim().to_string())
        })
        .collect();

    Some(GitErrorKind::MergeFailed { reason, files })
}

fn authentication(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    d.contains_any(&[
        "authentication failed",
        "permission denied (publickey",
        "could not read username",
        "could not read password",
        "terminal prompts disabled",
        "invalid username or password",
        "http basic: access denied",
    ])
    .then_some(GitErrorKind::AuthenticationFailed)
}

fn remote(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    d.contains_any(&[
        "could not resolve host",
        "connection refused",
        "connection timed out",
        "operation timed out",
        "could not read from remote repository",
        "failed to connect to",
        "does not appear to be a git repository",
        "the remote end hung up unexpectedly",
        "network is unreachable",
        "repository not found",
    ])
    .then_some(GitErrorKind::RemoteUnreachable)
}

fn repository(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    if d.contains("not a git repository") {
        return Some(GitErrorKind::NotARepository);
    }
    if d.contains("index.lock")
        || (d.contains("another git process seems to be running") && !d.contains("cannot lock ref"))
    {
        return Some(GitErrorKind::RepositoryLocked);
    }
    if d.contains_any(&[
        "please tell me who you are",
        "unable to auto-detect email address",
        "empty ident name",
    ]) {
        return Some(GitErrorKind::UnknownIdentity);
    }
    if d.contains_any(&[
        "nothing to commit",
        "nothing added to commit",
        "no changes added to commit",
    ]) {
        return Some(GitErrorKind::NothingToCommit);
    }
    None
}

fn reference(d: &Diagnostic<'_>) -> Option<GitErrorKind> {
    const REFERENCE_RULES: &[(ReferenceErrorReason, &[&str])] = &[
        (ReferenceErrorReason::LockFailed, &["cannot lock ref", "unable to lock"]),
        (ReferenceErrorReason::Ambiguous, &["is ambiguous", "matched multiple"]),
        (
            ReferenceErrorReason::NotFound,
            &[
                "unknown revision",
                "not a valid object name",
                "invalid reference:",
                "did not match any file(s) known to git",
                "couldn't find remote ref",
                "needed a single revision",
                "bad revision",
                "not found",
            ],
        ),
        (
            ReferenceErrorReason::Invalid,
            &[
                "is not a valid branch name",
                "is not a valid tag name",
                "is not a valid ref name",
                "is not a valid reference",
                "invalid refspec",
                "bad ref",
            ],
        ),
        (ReferenceErrorReason::AlreadyExists, &["already exists"]),
        (
            ReferenceErrorReason::TypeMismatch,
            &[", not a commit", ", not a tree", ", not a blob", "but the object dereferences to"],
        ),
        (
            ReferenceErrorReason::ReadFailed,
            &["unable to read", "could not read object", "bad object", "cannot read"],
        ),
    ];

    let (reason, needle) = REFERENCE_RULES.iter().find_map(|(reason, needles)| {
        needles
            .iter()
            .find(|needle| d.contains(needle))
            .map(|needle| (*reason, *needle))
    })?;

    let line = d.message_with(needle).unwrap_or(d.text);
    let name = QUOTED
        .captures(line)
        .map(|caps| caps[1].to_string())
        .or_else(|| trailing_name(line, needle))
        .or_else(|| leading_name(line, needle));

    Some(GitErrorKind::Reference {
        reason,
        reference_type: reference_type_hint(line, name.as_deref()),
        name,
    })
}

/// Name after a `label: name` style message, e.g. `invalid reference: topic`.
fn trailing_name(line: &str, needle: &str) -> Option<String> {
    if !needle.ends_with(':') {
        return None;
    }
    let idx = line.to_lowercase().find(needle)? + needle.len();
    let name = line.get(idx..)?.trim().trim_end_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}

/// Word directly before the needle, e.g. `short object ID 1234 is ambiguous`.
fn leading_name(line: &str, needle: &str) -> Option<String> {
    if needle != "is ambiguous" {
        return None;
    }
    let idx = line.to_lowercase().find(needle)?;
    line.get(..idx)?
        .split_whitespace()
        .last()
        .map(str::to_string)
}

fn reference_type_hint(line: &str, name: Option<&str>) -> Option<ReferenceType> {
    if let Some(name) = name {
        let (_, kind) = decompose_canonical_name(name);
        if kind != ReferenceType::Unknown {
            return Some(kind);
        }
    }
    let lower = line.to_lowercase();
    if lower.contains("remote ref") {
        Some(ReferenceType::Remotes)
    } else if lower.contains("branch") {
        Some(ReferenceType::Heads)
    } else if lower.contains("tag") {
        Some(ReferenceType::Tags)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_prefixes() {
        assert_eq!(strip_prefix("fatal: boom"), "boom");
        assert_eq!(strip_prefix("  error: boom"), "boom");
        assert_eq!(strip_prefix("plain"), "plain");
    }

    #[test]
    fn detached_head_requires_line_start() {
        assert_eq!(
            classify_kind("fatal: You are not currently on a branch.\nTo push the history..."),
            GitErrorKind::DetachedHead
        );
        assert_ne!(
            classify_kind("hint: You are not currently on a branch"),
            GitErrorKind::DetachedHead
        );
    }

    #[test]
    fn file_list_skips_first_line_and_stops_at_untabbed() {
        let text = "error: header\n\ta.txt\n\tdir/b.txt\nPlease commit\n\tnot-included";
        assert_eq!(extract_file_list(text), vec!["a.txt", "dir/b.txt"]);
        assert!(extract_file_list("\tfirst-line-tab-is-skipped").is_empty());
    }

    #[test]
    fn diagnostic_text_prefers_stderr() {
        assert_eq!(diagnostic_text("err", "out"), "err");
        assert_eq!(diagnostic_text("  \n", "out"), "out");
    }

    #[test]
    fn rule_order_is_reported() {
        assert_eq!(
            matching_rule("fatal: not a git repository"),
            Some("repository")
        );
        assert_eq!(matching_rule("something odd"), None);
    }

    #[test]
    fn trailing_reference_name() {
        let kind = classify_kind("fatal: invalid reference: topic/missing");
        assert_eq!(
            kind,
            GitErrorKind::Reference {
                reason: ReferenceErrorReason::NotFound,
                name: Some("topic/missing".into()),
                reference_type: None,
            }
        );
    }
}
