use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_branch: Option<String>,
    #[serde(default)]
    pub bare: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusInput {
    /// Report ignored files as well.
    #[serde(default)]
    pub include_ignored: bool,
    /// List every untracked file instead of collapsing directories.
    #[serde(default)]
    pub all_untracked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitInput {
    pub message: String,
    /// Stage modified tracked files first (`-a`).
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub allow_empty: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloneInput {
    pub url: String,
    pub destination: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default)]
    pub bare: bool,
    #[serde(default)]
    pub recurse_submodules: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Requires `remote`.
    #[serde(default)]
    pub refspecs: Vec<String>,
    #[serde(default)]
    pub prune: bool,
    #[serde(default)]
    pub tags: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Requires `remote`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default)]
    pub rebase: bool,
    #[serde(default)]
    pub ff_only: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Requires `remote`.
    #[serde(default)]
    pub refspecs: Vec<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub force_with_lease: bool,
    #[serde(default)]
    pub set_upstream: bool,
    #[serde(default)]
    pub tags: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutInput {
    /// Branch, tag or commit to check out; the start point with `create_branch`.
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_branch: Option<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub detach: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeInput {
    pub revision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub ff_only: bool,
    #[serde(default)]
    pub no_ff: bool,
    #[serde(default)]
    pub allow_unrelated_histories: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebaseInput {
    pub upstream: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onto: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CherryPickInput {
    pub commit: String,
    /// Parent number to diff against when picking a merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mainline: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StashPushInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub include_untracked: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StashPopInput {
    /// `stash@{index}`; the latest entry when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    /// Restore the index as well as the working tree.
    #[serde(default)]
    pub restore_index: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmoduleUpdateStrategy {
    #[default]
    Checkout,
    Merge,
    Rebase,
}

impl SubmoduleUpdateStrategy {
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Checkout => "--checkout",
            Self::Merge => "--merge",
            Self::Rebase => "--rebase",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmoduleUpdateInput {
    #[serde(default)]
    pub init: bool,
    #[serde(default)]
    pub recursive: bool,
    /// Track the remote branch instead of the recorded commit.
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub strategy: SubmoduleUpdateStrategy,
    /// Limit the update to these paths.
    #[serde(default)]
    pub paths: Vec<String>,
}
