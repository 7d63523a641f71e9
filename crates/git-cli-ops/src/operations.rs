use crate::client::GitClient;
use crate::error::{GitCliError, GitCliResult};
use crate::invocation::GitInvocation;
use crate::progress::ProgressSink;
use crate::types::{
    CheckoutInput, CherryPickInput, CloneInput, CommitInput, FetchInput, InitInput, MergeInput,
    PullInput, PushInput, RebaseInput, StashPopInput, StashPushInput, StatusInput,
    SubmoduleUpdateInput,
};
use git_error_classifier::{classify, GitCommandError};
use git_object_model::{
    parse_batch_check, parse_commit, parse_status, parse_tree, Blob, Commit, GitObject,
    NameFilter, ObjectHeader, ObjectId, ObjectType, StatusReport, Tree, TreeParseOptions,
};
use git_process_runner::ProcessOutput;
use git_reference_model::{parse_for_each_ref, Reference, FOR_EACH_REF_FORMAT};
use std::path::Path;
use tracing::debug;

const NO_LOCAL_CHANGES: &str = "No local changes to save";

// ============================================================================
// Reads
// ============================================================================

pub async fn init(client: &GitClient, path: &Path, input: InitInput) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["init", "--quiet"]);
    if let Some(branch) = input.initial_branch.as_deref() {
        require("initial_branch", branch)?;
        invocation = invocation.with_arg(format!("--initial-branch={branch}"));
    }
    if input.bare {
        invocation = invocation.with_arg("--bare");
    }
    invocation = invocation.with_arg("--").with_arg(path_arg(path)?);

    client.run_checked(&invocation).await?;
    Ok(())
}

/// Resolve a revision to the object it names.
pub async fn rev_parse(client: &GitClient, repo: &Path, revision: &str) -> GitCliResult<ObjectId> {
    check_revision(revision)?;
    let output = client
        .run_checked(&GitInvocation::new(["rev-parse", "--verify", revision]).in_dir(repo))
        .await?;
    Ok(ObjectId::from_hex(output.stdout_text().trim())?)
}

/// Type and size of each revision, `None` for those that do not exist.
/// Results are in input order.
pub async fn object_headers(
    client: &GitClient,
    repo: &Path,
    revisions: &[&str],
) -> GitCliResult<Vec<Option<ObjectHeader>>> {
    if revisions.is_empty() {
        return Ok(Vec::new());
    }
    let mut stdin = String::new();
    for revision in revisions {
        if revision.trim().is_empty() || revision.contains('\n') {
            return Err(GitCliError::invalid(format!(
                "revision must be a single non-empty line: {revision:?}"
            )));
        }
        stdin.push_str(revision);
        stdin.push('\n');
    }

    let invocation = GitInvocation::new(["cat-file", "--batch-check"])
        .in_dir(repo)
        .with_stdin(stdin.into_bytes());
    let output = client.run_checked(&invocation).await?;
    Ok(parse_batch_check(&output.stdout_text())?)
}

/// Read the tree `revision` resolves to. Entries rejected by `filter` are
/// skipped.
pub async fn read_tree(
    client: &GitClient,
    repo: &Path,
    revision: &str,
    filter: Option<NameFilter<'_>>,
) -> GitCliResult<Tree> {
    let id = rev_parse(client, repo, &format!("{revision}^{{tree}}")).await?;
    let data = cat_file(client, repo, ObjectType::Tree, id).await?;

    let mut options = TreeParseOptions::new().with_interner(client.interner());
    if let Some(filter) = filter {
        options = options.with_filter(filter);
    }
    Ok(parse_tree(id, &data, options)?)
}

pub async fn read_commit(client: &GitClient, repo: &Path, revision: &str) -> GitCliResult<Commit> {
    let id = rev_parse(client, repo, &format!("{revision}^{{commit}}")).await?;
    let data = cat_file(client, repo, ObjectType::Commit, id).await?;
    Ok(parse_commit(id, &data)?)
}

pub async fn read_blob(client: &GitClient, repo: &Path, revision: &str) -> GitCliResult<Blob> {
    let id = rev_parse(client, repo, &format!("{revision}^{{blob}}")).await?;
    let data = cat_file(client, repo, ObjectType::Blob, id).await?;
    Ok(Blob { id, data })
}

/// Read whatever `revision` names.
pub async fn read_object(
    client: &GitClient,
    repo: &Path,
    revision: &str,
) -> GitCliResult<GitObject> {
    check_revision(revision)?;
    let header = object_headers(client, repo, &[revision])
        .await?
        .into_iter()
        .next()
        .flatten()
        .ok_or_else(|| GitCliError::ObjectNotFound {
            revision: revision.to_string(),
        })?;
    let data = cat_file(client, repo, header.object_type, header.id).await?;
    let options = TreeParseOptions::new().with_interner(client.interner());
    Ok(GitObject::parse(header, data, options)?)
}

async fn cat_file(
    client: &GitClient,
    repo: &Path,
    object_type: ObjectType,
    id: ObjectId,
) -> GitCliResult<Vec<u8>> {
    let id_text = id.revision_text();
    let invocation =
        GitInvocation::new(["cat-file", object_type.as_str(), id_text.as_str()]).in_dir(repo);
    let (_, stdout, _) = client.run_checked(&invocation).await?.into_parts();
    Ok(stdout)
}

/// References matching `patterns` (all when empty), sorted by canonical
/// name with tag tips peeled.
pub async fn list_references(
    client: &GitClient,
    repo: &Path,
    patterns: &[&str],
) -> GitCliResult<Vec<Reference>> {
    for pattern in patterns {
        check_revision(pattern)?;
    }
    let invocation = GitInvocation::new(["for-each-ref", FOR_EACH_REF_FORMAT])
        .with_args(patterns.iter().copied())
        .in_dir(repo);
    let output = client.run_checked(&invocation).await?;
    let listing = parse_for_each_ref(&output.stdout_text(), Some(client.interner()))?;
    Ok(listing.into_references())
}

pub async fn status(
    client: &GitClient,
    repo: &Path,
    input: StatusInput,
) -> GitCliResult<StatusReport> {
    let untracked = if input.all_untracked {
        "--untracked-files=all"
    } else {
        "--untracked-files=normal"
    };
    let mut invocation =
        GitInvocation::new(["status", "--porcelain=v2", "-z", "--branch", untracked]).in_dir(repo);
    if input.include_ignored {
        invocation = invocation.with_arg("--ignored");
    }
    let output = client.run_checked(&invocation).await?;
    Ok(parse_status(&output.stdout)?)
}

/// Commit and return the new HEAD.
pub async fn commit(client: &GitClient, repo: &Path, input: CommitInput) -> GitCliResult<ObjectId> {
    require("message", &input.message)?;
    let mut invocation = GitInvocation::new(["commit"]).in_dir(repo);
    if input.all {
        invocation = invocation.with_arg("--all");
    }
    if input.allow_empty {
        invocation = invocation.with_arg("--allow-empty");
    }
    invocation = invocation.with_args(["-m", input.message.as_str()]);

    client.run_checked(&invocation).await?;
    rev_parse(client, repo, "HEAD").await
}

// ============================================================================
// Progress-reporting operations
// ============================================================================

pub async fn clone(
    client: &GitClient,
    input: CloneInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    require("url", &input.url)?;
    let mut invocation = GitInvocation::new(["clone", "--progress"]);
    if let Some(branch) = input.branch.as_deref() {
        require("branch", branch)?;
        invocation = invocation.with_args(["--branch", branch]);
    }
    if let Some(depth) = input.depth {
        invocation = invocation.with_arg(format!("--depth={}", positive("depth", depth)?));
    }
    if input.bare {
        invocation = invocation.with_arg("--bare");
    }
    if input.recurse_submodules {
        invocation = invocation.with_arg("--recurse-submodules");
    }
    invocation = invocation
        .with_args(["--", input.url.as_str()])
        .with_arg(path_arg(&input.destination)?);

    run_operation(client, &invocation, progress, input.recurse_submodules).await?;
    Ok(())
}

pub async fn fetch(
    client: &GitClient,
    repo: &Path,
    input: FetchInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["fetch", "--progress"]).in_dir(repo);
    if input.prune {
        invocation = invocation.with_arg("--prune");
    }
    if input.tags {
        invocation = invocation.with_arg("--tags");
    }
    if let Some(depth) = input.depth {
        invocation = invocation.with_arg(format!("--depth={}", positive("depth", depth)?));
    }
    invocation = with_remote_targets(invocation, input.remote.as_deref(), &input.refspecs)?;

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn pull(
    client: &GitClient,
    repo: &Path,
    input: PullInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["pull", "--progress"]).in_dir(repo);
    invocation = invocation.with_arg(if input.rebase { "--rebase" } else { "--no-rebase" });
    if input.ff_only {
        invocation = invocation.with_arg("--ff-only");
    }
    let branches: Vec<String> = input.branch.into_iter().collect();
    invocation = with_remote_targets(invocation, input.remote.as_deref(), &branches)?;

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn push(
    client: &GitClient,
    repo: &Path,
    input: PushInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    if input.force && input.force_with_lease {
        return Err(GitCliError::invalid(
            "force and force_with_lease are mutually exclusive",
        ));
    }
    let mut invocation = GitInvocation::new(["push", "--progress"]).in_dir(repo);
    if input.force {
        invocation = invocation.with_arg("--force");
    }
    if input.force_with_lease {
        invocation = invocation.with_arg("--force-with-lease");
    }
    if input.set_upstream {
        invocation = invocation.with_arg("--set-upstream");
    }
    if input.tags {
        invocation = invocation.with_arg("--tags");
    }
    invocation = with_remote_targets(invocation, input.remote.as_deref(), &input.refspecs)?;

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn checkout(
    client: &GitClient,
    repo: &Path,
    input: CheckoutInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    check_revision(&input.target)?;
    let mut invocation = GitInvocation::new(["checkout", "--progress"]).in_dir(repo);
    if input.force {
        invocation = invocation.with_arg("--force");
    }
    match (input.create_branch.as_deref(), input.detach) {
        (Some(_), true) => {
            return Err(GitCliError::invalid(
                "create_branch and detach are mutually exclusive",
            ))
        }
        (Some(branch), false) => {
            check_revision(branch)?;
            invocation = invocation.with_args(["-b", branch]);
        }
        (None, true) => invocation = invocation.with_arg("--detach"),
        (None, false) => {}
    }
    invocation = invocation.with_args([input.target.as_str(), "--"]);

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn merge(
    client: &GitClient,
    repo: &Path,
    input: MergeInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    check_revision(&input.revision)?;
    if input.ff_only && input.no_ff {
        return Err(GitCliError::invalid("ff_only and no_ff are mutually exclusive"));
    }
    let mut invocation = GitInvocation::new(["merge", "--progress", "--no-edit"]).in_dir(repo);
    if input.ff_only {
        invocation = invocation.with_arg("--ff-only");
    }
    if input.no_ff {
        invocation = invocation.with_arg("--no-ff");
    }
    if input.allow_unrelated_histories {
        invocation = invocation.with_arg("--allow-unrelated-histories");
    }
    if let Some(message) = input.message.as_deref() {
        invocation = invocation.with_args(["-m", message]);
    }
    invocation = invocation.with_arg(input.revision);

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn rebase(
    client: &GitClient,
    repo: &Path,
    input: RebaseInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    check_revision(&input.upstream)?;
    let mut invocation = GitInvocation::new(["rebase"]).in_dir(repo);
    if let Some(onto) = input.onto.as_deref() {
        check_revision(onto)?;
        invocation = invocation.with_args(["--onto", onto]);
    }
    invocation = invocation.with_arg(input.upstream);

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn cherry_pick(
    client: &GitClient,
    repo: &Path,
    input: CherryPickInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    check_revision(&input.commit)?;
    let mut invocation = GitInvocation::new(["cherry-pick"]).in_dir(repo);
    if let Some(parent) = input.mainline {
        let parent = positive("mainline", parent)?;
        invocation = invocation.with_args(["-m".to_string(), parent.to_string()]);
    }
    invocation = invocation.with_arg(input.commit);

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

/// Stash local changes. A clean tree is reported as a stash error even
/// though git exits successfully.
pub async fn stash_push(
    client: &GitClient,
    repo: &Path,
    input: StashPushInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["stash", "push"]).in_dir(repo);
    if input.include_untracked {
        invocation = invocation.with_arg("--include-untracked");
    }
    if let Some(message) = input.message.as_deref() {
        invocation = invocation.with_args(["-m", message]);
    }

    let output = run_operation(client, &invocation, progress, false).await?;
    let stdout = output.stdout_text();
    if stdout.contains(NO_LOCAL_CHANGES) {
        return Err(unchanged(&output, &stdout).into());
    }
    Ok(())
}

pub async fn stash_pop(
    client: &GitClient,
    repo: &Path,
    input: StashPopInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["stash", "pop"]).in_dir(repo);
    if input.restore_index {
        invocation = invocation.with_arg("--index");
    }
    if let Some(index) = input.index {
        invocation = invocation.with_arg(format!("stash@{{{index}}}"));
    }

    run_operation(client, &invocation, progress, false).await?;
    Ok(())
}

pub async fn submodule_update(
    client: &GitClient,
    repo: &Path,
    input: SubmoduleUpdateInput,
    progress: Option<&mut dyn ProgressSink>,
) -> GitCliResult<()> {
    let mut invocation = GitInvocation::new(["submodule", "update", "--progress"]).in_dir(repo);
    if input.init {
        invocation = invocation.with_arg("--init");
    }
    if input.recursive {
        invocation = invocation.with_arg("--recursive");
    }
    if input.remote {
        invocation = invocation.with_arg("--remote");
    }
    invocation = invocation.with_arg(input.strategy.flag());
    if !input.paths.is_empty() {
        for path in &input.paths {
            require("path", path)?;
        }
        invocation = invocation.with_arg("--").with_args(input.paths);
    }

    run_operation(client, &invocation, progress, true).await?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

async fn run_operation(
    client: &GitClient,
    invocation: &GitInvocation,
    progress: Option<&mut dyn ProgressSink>,
    submodules: bool,
) -> GitCliResult<ProcessOutput> {
    match progress {
        Some(sink) => client.run_decoded(invocation, sink, submodules).await,
        None => client.run_checked(invocation).await,
    }
}

fn unchanged(output: &ProcessOutput, stdout: &str) -> GitCommandError {
    let error = classify(output.exit_code, stdout);
    debug!(code = error.code(), "Successful exit reported no change");
    error
}

fn with_remote_targets(
    invocation: GitInvocation,
    remote: Option<&str>,
    targets: &[String],
) -> GitCliResult<GitInvocation> {
    match remote {
        Some(remote) => {
            check_revision(remote)?;
            for target in targets {
                require("refspec", target)?;
            }
            Ok(invocation.with_arg(remote).with_args(targets.iter().cloned()))
        }
        None if targets.is_empty() => Ok(invocation),
        None => Err(GitCliError::invalid("refspecs require a remote")),
    }
}

fn require(field: &str, value: &str) -> GitCliResult<()> {
    if value.trim().is_empty() {
        return Err(GitCliError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

fn positive(field: &str, value: u32) -> GitCliResult<u32> {
    if value == 0 {
        return Err(GitCliError::invalid(format!("{field} must be greater than zero")));
    }
    Ok(value)
}

/// Revisions and names must not be mistaken for options.
fn check_revision(revision: &str) -> GitCliResult<()> {
    require("revision", revision)?;
    if revision.starts_with('-') {
        return Err(GitCliError::invalid(format!(
            "revision must not start with '-': {revision}"
        )));
    }
    if revision.contains('\n') {
        return Err(GitCliError::invalid("revision must be a single line"));
    }
    Ok(())
}

fn path_arg(path: &Path) -> GitCliResult<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| GitCliError::invalid(format!("path is not valid UTF-8: {}", path.display())))
}
