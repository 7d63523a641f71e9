//! # Git CLI Ops
//!
//! Typed git operations that drive the `git` executable.
//!
//! A [`GitClient`] turns a [`GitInvocation`] into a process, runs it with a
//! non-interactive English-language environment, and turns a non-zero exit
//! into a classified [`GitCommandError`]. The free functions below build on
//! it and return parsed objects.
//!
//! ## Key Operations
//!
//! | Operation | Git command | Returns |
//! |-----------|-------------|---------|
//! | [`rev_parse`] | `rev-parse --verify` | [`ObjectId`] |
//! | [`object_headers`] | `cat-file --batch-check` | [`ObjectHeader`]s |
//! | [`read_tree`] / [`read_commit`] / [`read_blob`] | `cat-file` | parsed object |
//! | [`list_references`] | `for-each-ref` | sorted [`Reference`]s |
//! | [`status`] | `status --porcelain=v2 -z` | [`StatusReport`] |
//! | [`clone`], [`fetch`], [`pull`], [`push`] | network | progress events |
//! | [`checkout`], [`merge`], [`rebase`], [`cherry_pick`] | history | progress events |
//! | [`stash_push`], [`stash_pop`], [`submodule_update`] | worktree | progress events |
//!
//! ## Example
//!
//! ```ignore
//! let client = GitClient::new(GitCliConfig::load(None)?)?;
//! let refs = list_references(&client, repo, &["refs/heads"]).await?;
//! fetch(&client, repo, FetchInput::default(), Some(&mut |event| println!("{event:?}"))).await?;
//! ```

mod client;
mod config;
mod error;
mod invocation;
mod operations;
mod progress;
mod types;

pub use client::GitClient;
pub use config::{
    ConfigOverride, GitCliConfig, DEFAULT_LOG_LEVEL, GIT_PATH_ENV, LOG_LEVEL_ENV, TIMEOUT_ENV,
};
pub use error::{GitCliError, GitCliResult};
pub use invocation::{assemble_args, GitInvocation};
pub use operations::{
    checkout, cherry_pick, clone, commit, fetch, init, list_references, merge, object_headers,
    pull, push, read_blob, read_commit, read_object, read_tree, rebase, rev_parse, stash_pop,
    stash_push, status, submodule_update,
};
pub use progress::{ProgressEvent, ProgressSink, SubmoduleEvent};
pub use types::*;

pub use git_error_classifier::{GitCommandError, GitErrorKind};
pub use git_object_model::{
    Blob, Commit, GitObject, NameFilter, ObjectHeader, ObjectId, ObjectType, StatusReport, Tree,
    TreeEntry,
};
pub use git_process_runner::{OutputLine, ProcessOutput, RunningProcess, StopHandle};
pub use git_reference_model::{Reference, ReferenceType};
