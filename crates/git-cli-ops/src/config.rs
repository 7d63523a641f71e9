//! Client configuration.
//!
//! Values come from defaults, then an optional JSON file, then environment
//! variables, in that order.

use crate::error::{GitCliError, GitCliResult};
use git_process_runner::TextEncoding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the git executable path.
pub const GIT_PATH_ENV: &str = "GIT_CLI_OPS_GIT_PATH";
/// Overrides the default command timeout, in seconds. `0` disables it.
pub const TIMEOUT_ENV: &str = "GIT_CLI_OPS_TIMEOUT_SECS";
/// Overrides the log level.
pub const LOG_LEVEL_ENV: &str = "GIT_CLI_OPS_LOG_LEVEL";

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_TERMINATION_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ENCODING: &str = "utf-8";

const GIT_CANDIDATES: [&str; 3] = ["/usr/bin/git", "/usr/local/bin/git", "/opt/homebrew/bin/git"];

/// One `-c key=value` pair passed ahead of every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverride {
    pub key: String,
    pub value: String,
}

impl ConfigOverride {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Settings shared by every command a client runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCliConfig {
    /// Explicit git executable. Resolved from the environment when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_path: Option<String>,
    /// Default per-command timeout. `0` means no timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Grace period for a stopped process to exit.
    #[serde(default = "default_termination_timeout_secs")]
    pub termination_timeout_secs: u64,
    /// Text encoding of git output (`utf-8` or `latin-1`).
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Applied in order before invocation-level overrides.
    #[serde(default)]
    pub config_overrides: Vec<ConfigOverride>,
    /// Extra environment variables for every git child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_termination_timeout_secs() -> u64 {
    DEFAULT_TERMINATION_TIMEOUT_SECS
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for GitCliConfig {
    fn default() -> Self {
        Self {
            git_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            termination_timeout_secs: DEFAULT_TERMINATION_TIMEOUT_SECS,
            encoding: default_encoding(),
            config_overrides: Vec::new(),
            env: BTreeMap::new(),
            log_level: default_log_level(),
        }
    }
}

impl GitCliConfig {
    /// Defaults with environment overrides applied.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// `<config dir>/git-cli-ops/config.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-cli-ops").join("config.json"))
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when the file does not exist.
    pub fn load(path: Option<&Path>) -> GitCliResult<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match config_path {
            Some(ref path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::default(),
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> GitCliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GitCliConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> GitCliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config_overrides.push(ConfigOverride::new(key, value));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    fn load_from_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level;
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = secs;
        }
    }

    /// Default timeout, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn termination_timeout(&self) -> Duration {
        Duration::from_secs(self.termination_timeout_secs)
    }

    pub fn text_encoding(&self) -> GitCliResult<TextEncoding> {
        TextEncoding::parse(&self.encoding)
            .ok_or_else(|| GitCliError::Config(format!("unknown encoding '{}'", self.encoding)))
    }

    /// The git executable to launch.
    pub fn resolve_git_executable(&self) -> String {
        resolve_git_executable(self.git_path.as_deref(), |name| std::env::var(name).ok())
    }
}

fn resolve_git_executable(
    configured: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    if let Some(path) = configured.map(str::trim).filter(|p| !p.is_empty()) {
        return path.to_string();
    }

    if let Some(path) = lookup(GIT_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    for candidate in GIT_CANDIDATES {
        if Path::new(candidate).exists() {
            return candidate.to_string();
        }
    }

    "git".to_string()
}
