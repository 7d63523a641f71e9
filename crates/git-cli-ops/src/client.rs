//! The git client: builds command lines, runs them and classifies failures.

use crate::config::GitCliConfig;
use crate::error::GitCliResult;
use crate::invocation::{assemble_args, validate_env, validate_override, GitInvocation};
use crate::progress::{ProgressDecoder, ProgressSink};
use git_error_classifier::{classify, diagnostic_text, GitCommandError};
use git_object_model::StringInterner;
use git_process_runner::{
    ProcessCommand, ProcessOutput, ProcessRunner, RunningProcess, TextEncoding,
};
use std::sync::Arc;
use tracing::debug;

/// Environment every git child gets. Diagnostics must be in English for
/// classification, and nothing may wait on a terminal.
const NON_INTERACTIVE_ENV: [(&str, &str); 5] = [
    ("GIT_TERMINAL_PROMPT", "0"),
    ("GIT_PAGER", "cat"),
    ("PAGER", "cat"),
    ("LC_ALL", "C"),
    ("LANGUAGE", "C"),
];

fn apply_non_interactive_env(mut command: ProcessCommand) -> ProcessCommand {
    for (key, value) in NON_INTERACTIVE_ENV {
        command = command.with_env(key, value);
    }
    command
}

/// Runs git commands for any number of repositories.
///
/// Cloning is cheap and clones share the string interner, so one client can
/// serve concurrent tasks.
#[derive(Debug, Clone)]
pub struct GitClient {
    runner: ProcessRunner,
    config: GitCliConfig,
    executable: String,
    encoding: TextEncoding,
    interner: Arc<StringInterner>,
}

impl GitClient {
    /// Build a client, rejecting malformed global overrides or environment.
    pub fn new(config: GitCliConfig) -> GitCliResult<Self> {
        for over in &config.config_overrides {
            validate_override(over)?;
        }
        for (key, value) in &config.env {
            validate_env(key, value)?;
        }
        let encoding = config.text_encoding()?;
        let executable = config.resolve_git_executable();
        let runner = ProcessRunner::new().with_termination_timeout(config.termination_timeout());

        debug!(executable = %executable, "Git client created");

        Ok(Self {
            runner,
            config,
            executable,
            encoding,
            interner: Arc::new(StringInterner::new()),
        })
    }

    /// Replace the process runner, e.g. to install a termination strategy.
    pub fn with_runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn config(&self) -> &GitCliConfig {
        &self.config
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    /// Interner shared by reference and tree parsing.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// The process command `invocation` would launch.
    pub fn command(&self, invocation: &GitInvocation) -> GitCliResult<ProcessCommand> {
        invocation.validate()?;

        let mut command = ProcessCommand::new(&self.executable)
            .with_args(assemble_args(&self.config.config_overrides, invocation))
            .with_encoding(self.encoding);
        for (key, value) in &self.config.env {
            command = command.with_env(key, value);
        }
        for (key, value) in &invocation.env {
            command = command.with_env(key, value);
        }
        command = apply_non_interactive_env(command);

        if let Some(dir) = &invocation.working_dir {
            command = command.with_working_dir(dir.clone());
        }
        if let Some(stdin) = &invocation.stdin {
            command = command.with_stdin(stdin.clone());
        }
        if let Some(timeout) = invocation.timeout.or_else(|| self.config.timeout()) {
            command = command.with_timeout(timeout);
        }
        Ok(command)
    }

    /// Start git without waiting, for callers that need the stop handle.
    pub fn start(&self, invocation: &GitInvocation) -> GitCliResult<RunningProcess> {
        let command = self.command(invocation)?;
        Ok(self.runner.start(&command)?)
    }

    /// Run git and return whatever it produced, whatever the exit code.
    pub async fn run(&self, invocation: &GitInvocation) -> GitCliResult<ProcessOutput> {
        let command = self.command(invocation)?;
        Ok(self.runner.execute(&command).await?)
    }

    /// Run git; a non-zero exit becomes a classified [`GitCommandError`].
    pub async fn run_checked(&self, invocation: &GitInvocation) -> GitCliResult<ProcessOutput> {
        let output = self.run(invocation).await?;
        self.check(output)
    }

    /// Run git, decoding each output line into a progress event for `sink`.
    pub async fn run_with_progress(
        &self,
        invocation: &GitInvocation,
        sink: &mut dyn ProgressSink,
    ) -> GitCliResult<ProcessOutput> {
        self.run_decoded(invocation, sink, false).await
    }

    pub(crate) async fn run_decoded(
        &self,
        invocation: &GitInvocation,
        sink: &mut dyn ProgressSink,
        submodules: bool,
    ) -> GitCliResult<ProcessOutput> {
        let command = self.command(invocation)?;
        let mut decoder = ProgressDecoder::new(sink, submodules);
        let output = self
            .runner
            .execute_with_progress(&command, &mut decoder)
            .await?;
        self.check(output)
    }

    /// Classify a failed run. Stdout stands in when stderr is empty.
    pub fn classify(&self, output: &ProcessOutput) -> GitCommandError {
        let stderr = output.stderr_text();
        let stdout = output.stdout_text();
        let error = classify(output.exit_code, diagnostic_text(&stderr, &stdout));
        debug!(
            code = error.code(),
            exit_code = ?output.exit_code,
            "Classified git failure"
        );
        error
    }

    fn check(&self, output: ProcessOutput) -> GitCliResult<ProcessOutput> {
        if output.success() {
            Ok(output)
        } else {
            Err(self.classify(&output).into())
        }
    }
}
