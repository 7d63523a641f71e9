//! One git command line, validated before it is launched.

use crate::config::ConfigOverride;
use crate::error::{GitCliError, GitCliResult};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

/// `section[.subsection].name`; the subsection may hold anything but `=`,
/// newline or NUL.
static CONFIG_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9-]+(\.[^\n\x00=]*)?\.[A-Za-z][A-Za-z0-9-]*$")
        .expect("config key pattern")
});

/// Arguments and per-call settings for a single git run.
#[derive(Debug, Clone, Default)]
pub struct GitInvocation {
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Applied after the client-wide environment.
    pub env: Vec<(String, String)>,
    /// Applied after the client-wide overrides.
    pub config_overrides: Vec<ConfigOverride>,
    pub stdin: Option<Vec<u8>>,
    /// Replaces the client default when set.
    pub timeout: Option<Duration>,
}

impl GitInvocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_overrides.push(ConfigOverride::new(key, value));
        self
    }

    pub fn with_stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject structurally invalid input without starting git.
    pub fn validate(&self) -> GitCliResult<()> {
        if self.args.is_empty() {
            return Err(GitCliError::invalid("argument list is empty"));
        }
        if let Some(arg) = self.args.iter().find(|arg| arg.contains('\0')) {
            return Err(GitCliError::invalid(format!(
                "argument contains a NUL byte: {arg:?}"
            )));
        }
        for over in &self.config_overrides {
            validate_override(over)?;
        }
        for (key, value) in &self.env {
            validate_env(key, value)?;
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(GitCliError::invalid("timeout must be greater than zero"));
        }
        Ok(())
    }
}

pub(crate) fn validate_override(over: &ConfigOverride) -> GitCliResult<()> {
    if !CONFIG_KEY.is_match(&over.key) {
        return Err(GitCliError::invalid(format!(
            "malformed config key: {:?}",
            over.key
        )));
    }
    if over.value.contains('\0') {
        return Err(GitCliError::invalid(format!(
            "config value for {} contains a NUL byte",
            over.key
        )));
    }
    Ok(())
}

pub(crate) fn validate_env(key: &str, value: &str) -> GitCliResult<()> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(GitCliError::invalid(format!(
            "malformed environment variable name: {key:?}"
        )));
    }
    if value.contains('\0') {
        return Err(GitCliError::invalid(format!(
            "environment variable {key} contains a NUL byte"
        )));
    }
    Ok(())
}

/// Full git argv: every override as `-c key=value` in order, then the
/// invocation's own arguments.
pub fn assemble_args(global: &[ConfigOverride], invocation: &GitInvocation) -> Vec<String> {
    let overrides = global.iter().chain(&invocation.config_overrides);
    let mut args = Vec::with_capacity(invocation.args.len() + 2 * overrides.clone().count());
    for over in overrides {
        args.push("-c".to_string());
        args.push(format!("{}={}", over.key, over.value));
    }
    args.extend(invocation.args.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(result: GitCliResult<()>) -> &'static str {
        result.unwrap_err().code()
    }

    #[test]
    fn overrides_precede_arguments_in_order() {
        let global = vec![
            ConfigOverride::new("core.quotepath", "off"),
            ConfigOverride::new("color.ui", "never"),
        ];
        let invocation =
            GitInvocation::new(["log", "--oneline"]).with_config("log.showSignature", "false");

        assert_eq!(
            assemble_args(&global, &invocation),
            vec![
                "-c",
                "core.quotepath=off",
                "-c",
                "color.ui=never",
                "-c",
                "log.showSignature=false",
                "log",
                "--oneline",
            ]
        );
    }

    #[test]
    fn no_overrides_passes_args_through() {
        let invocation = GitInvocation::new(["status"]);
        assert_eq!(assemble_args(&[], &invocation), vec!["status"]);
    }

    #[test]
    fn valid_invocations() {
        let invocation = GitInvocation::new(["fetch"])
            .with_config("remote.origin.url", "file:///tmp/x")
            .with_config("url.https://example.com/.insteadOf", "gh:")
            .with_env("GIT_TRACE", "0")
            .with_timeout(Duration::from_secs(1));
        assert!(invocation.validate().is_ok());
    }

    #[test]
    fn empty_args_rejected() {
        assert_eq!(code(GitInvocation::default().validate()), "invalid_options");
    }

    #[test]
    fn nul_in_argument_rejected() {
        let err = GitInvocation::new(["show", "HEAD\0"]).validate().unwrap_err();
        assert!(err.to_string().contains("NUL"));
    }

    #[test]
    fn malformed_config_keys_rejected() {
        for key in ["", "core", ".name", "core.", "core.1abc", "a b.c", "core.x=y"] {
            let invocation = GitInvocation::new(["status"]).with_config(key, "v");
            assert_eq!(code(invocation.validate()), "invalid_options", "key {key:?}");
        }
    }

    #[test]
    fn malformed_env_rejected() {
        for key in ["", "A=B", "A\0"] {
            let invocation = GitInvocation::new(["status"]).with_env(key, "v");
            assert_eq!(code(invocation.validate()), "invalid_options", "key {key:?}");
        }
        let invocation = GitInvocation::new(["status"]).with_env("GIT_DIR", "a\0b");
        assert_eq!(code(invocation.validate()), "invalid_options");
    }

    #[test]
    fn zero_timeout_rejected() {
        let invocation = GitInvocation::new(["status"]).with_timeout(Duration::ZERO);
        assert_eq!(code(invocation.validate()), "invalid_options");
    }
}
