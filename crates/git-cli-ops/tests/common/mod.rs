#![allow(dead_code)]

use git_cli_ops::{commit, init, CommitInput, GitCliConfig, GitClient, InitInput, ObjectId};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A client isolated from the user's git configuration.
pub fn test_client() -> GitClient {
    let config = GitCliConfig::default()
        .with_override("user.name", "Test Author")
        .with_override("user.email", "author@example.com")
        .with_override("commit.gpgsign", "false")
        .with_override("core.autocrlf", "false")
        .with_override("advice.detachedHead", "false")
        .with_override("protocol.file.allow", "always")
        .with_env("GIT_CONFIG_NOSYSTEM", "1")
        .with_env("GIT_CONFIG_GLOBAL", "/dev/null");
    GitClient::new(config).unwrap()
}

pub struct TestRepo {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Fresh repository on branch `main`.
pub async fn init_repo(client: &GitClient) -> TestRepo {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("repo");
    init(
        client,
        &path,
        InitInput {
            initial_branch: Some("main".into()),
            bare: false,
        },
    )
    .await
    .unwrap();
    TestRepo { dir, path }
}

/// Bare repository on branch `main`, in its own temp dir.
pub async fn init_bare(client: &GitClient) -> TestRepo {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("origin.git");
    init(
        client,
        &path,
        InitInput {
            initial_branch: Some("main".into()),
            bare: true,
        },
    )
    .await
    .unwrap();
    TestRepo { dir, path }
}

pub fn write_file(repo: &Path, name: &str, contents: &str) {
    let path = repo.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub async fn git(client: &GitClient, repo: &Path, args: &[&str]) -> String {
    let invocation = git_cli_ops::GitInvocation::new(args.iter().copied()).in_dir(repo);
    client.run_checked(&invocation).await.unwrap().stdout_text()
}

/// Stage everything and commit.
pub async fn commit_all(client: &GitClient, repo: &Path, message: &str) -> ObjectId {
    git(client, repo, &["add", "--all"]).await;
    commit(
        client,
        repo,
        CommitInput {
            message: message.into(),
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
