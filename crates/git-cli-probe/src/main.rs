//! git-cli-probe: run typed git operations and print the results as JSON.
//!
//! Usage: git-cli-probe [--repo <path>] <command>

mod logging;

use anyhow::Context;
use clap::{Parser, Subcommand};
use git_cli_ops::{
    fetch, list_references, object_headers, read_commit, read_tree, status, FetchInput,
    GitCliConfig, GitClient, GitInvocation, NameFilter, ProgressEvent, StatusInput,
};
use serde_json::json;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Inspect a git repository through the git executable.
#[derive(Parser, Debug)]
#[command(name = "git-cli-probe")]
#[command(about = "Run typed git operations and print JSON results")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Repository to operate on.
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, env = "GIT_CLI_OPS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List references, optionally limited to patterns like `refs/heads`
    Refs { patterns: Vec<String> },

    /// Show the tree a revision points to
    Tree {
        revision: String,
        /// Keep only entries with this name (repeatable)
        #[arg(long)]
        name: Vec<String>,
    },

    /// Show a parsed commit
    Commit { revision: String },

    /// Show type and size of objects
    Headers {
        #[arg(required = true)]
        revisions: Vec<String>,
    },

    /// Show working tree status
    Status {
        /// Include ignored files
        #[arg(long)]
        ignored: bool,
    },

    /// Fetch, printing progress events as they arrive
    Fetch { remote: Option<String> },

    /// Run raw git arguments, printing progress events
    Run {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_event(event: ProgressEvent) {
    match serde_json::to_string(&event) {
        Ok(line) => println!("{line}"),
        Err(e) => debug!(error = %e, "Failed to serialize progress event"),
    }
}

async fn run(client: &GitClient, cli: &Cli) -> anyhow::Result<()> {
    let repo = cli.repo.as_path();

    match &cli.command {
        Command::Refs { patterns } => {
            let patterns: Vec<&str> = patterns.iter().map(String::as_str).collect();
            let refs = list_references(client, repo, &patterns).await?;
            print_json(&refs)?;
        }
        Command::Tree { revision, name } => {
            let names: HashSet<&str> = name.iter().map(String::as_str).collect();
            let keep = |entry: &str| names.contains(entry);
            let filter: Option<NameFilter<'_>> = if names.is_empty() { None } else { Some(&keep) };
            let tree = read_tree(client, repo, revision, filter).await?;
            print_json(&tree)?;
        }
        Command::Commit { revision } => {
            let commit = read_commit(client, repo, revision).await?;
            print_json(&commit)?;
        }
        Command::Headers { revisions } => {
            let revisions: Vec<&str> = revisions.iter().map(String::as_str).collect();
            let headers = object_headers(client, repo, &revisions).await?;
            let rows: Vec<_> = revisions
                .iter()
                .zip(headers)
                .map(|(revision, header)| json!({ "revision": revision, "header": header }))
                .collect();
            print_json(&rows)?;
        }
        Command::Status { ignored } => {
            let input = StatusInput {
                include_ignored: *ignored,
                ..Default::default()
            };
            let report = status(client, repo, input).await?;
            print_json(&report)?;
        }
        Command::Fetch { remote } => {
            let input = FetchInput {
                remote: remote.clone(),
                ..Default::default()
            };
            fetch(client, repo, input, Some(&mut print_event)).await?;
        }
        Command::Run { args } => {
            let invocation = GitInvocation::new(args.iter().cloned()).in_dir(repo);
            let output = client
                .run_with_progress(&invocation, &mut print_event)
                .await
                .with_context(|| format!("git {}", args.join(" ")))?;
            print_json(&json!({ "exit_code": output.exit_code }))?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = GitCliConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    logging::init_logging(&level, cli.json_logs);

    let client = GitClient::new(config)?;
    info!(
        executable = client.executable(),
        repo = %cli.repo.display(),
        "Probe starting"
    );

    tokio::select! {
        result = run(&client, &cli) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt, stopping");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "git-cli-probe",
            "tree",
            "HEAD",
            "--name",
            "src",
            "--name",
            "Cargo.toml",
            "--repo",
            "/tmp/repo",
            "--json-logs",
        ])
        .unwrap();
        assert_eq!(cli.repo, PathBuf::from("/tmp/repo"));
        assert!(cli.json_logs);
        match cli.command {
            Command::Tree { revision, name } => {
                assert_eq!(revision, "HEAD");
                assert_eq!(name, vec!["src", "Cargo.toml"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_keeps_hyphenated_arguments() {
        let cli = Cli::try_parse_from(["git-cli-probe", "run", "--", "log", "--oneline", "-n", "3"])
            .unwrap();
        match cli.command {
            Command::Run { args } => assert_eq!(args, vec!["log", "--oneline", "-n", "3"]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn headers_require_a_revision() {
        assert!(Cli::try_parse_from(["git-cli-probe", "headers"]).is_err());
    }
}
