//! Typed progress events decoded from git's output lines.

use git_process_runner::{OutputLine, OutputSink};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PERCENT_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(remote: )?([A-Za-z][A-Za-z ]*?):\s+(\d{1,3})%\s+\((\d+)/(\d+)\)(.*)$")
        .expect("percent progress pattern")
});

static COUNT_PROGRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(remote: )?([A-Za-z][A-Za-z ]*?):\s+(\d+)(, done)?\.?$")
        .expect("count progress pattern")
});

static SUBMODULE_REGISTERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Submodule '([^']+)' \((.+)\) registered for path '([^']+)'$")
        .expect("submodule registered pattern")
});

static SUBMODULE_UPDATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Submodule path '([^']+)': (checked out|merged in|rebased into) '([^']+)'$")
        .expect("submodule updated pattern")
});

static SUBMODULE_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Failed to clone '([^']+)'").expect("submodule failed pattern")
});

static CLONING_INTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Cloning into '(.+)'\.\.\.$").expect("cloning pattern"));

static PATHS_UPDATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Updated (\d+) paths? from ").expect("paths updated pattern")
});

const MERGE_PREFIXES: [&str; 6] = [
    "Auto-merging ",
    "CONFLICT (",
    "Merge made by ",
    "Fast-forward",
    "Already up to date",
    "Automatic merge failed",
];

/// What happened to a submodule during `submodule update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SubmoduleEvent {
    Registered { name: String, url: String, path: String },
    Cloning { path: String },
    CheckedOut { path: String, commit: String },
    Merged { path: String, commit: String },
    Rebased { path: String, commit: String },
    Failed { path: Option<String>, message: String },
}

/// One decoded line of git output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Anything not recognised below.
    Message { text: String },

    /// A counter such as `Receiving objects: 45% (9/20)`.
    Progress {
        phase: String,
        /// Absent for count-only phases like `Enumerating objects: 5`.
        percent: Option<u8>,
        completed: u64,
        total: Option<u64>,
        done: bool,
        /// Reported by the remote side.
        remote: bool,
    },

    Hint { text: String },
    Warning { text: String },
    /// An `error:` or `fatal:` line.
    Error { text: String },
    /// Free-form `remote:` text.
    Remote { text: String },
    Merge { text: String },
    PatchApply { subject: String },
    WorkingDirectoryUpdated { paths: u64 },
    Submodule { event: SubmoduleEvent },
}

impl ProgressEvent {
    /// Decode a line. `submodules` reads `Cloning into` as a submodule clone.
    pub fn decode(text: &str, submodules: bool) -> Self {
        if let Some(rest) = text.strip_prefix("hint: ").or_else(|| text.strip_prefix("hint:")) {
            return Self::Hint { text: rest.to_string() };
        }
        if let Some(rest) = text.strip_prefix("warning: ") {
            return Self::Warning { text: rest.to_string() };
        }
        if let Some(rest) = text
            .strip_prefix("error: ")
            .or_else(|| text.strip_prefix("fatal: "))
        {
            return Self::Error { text: rest.to_string() };
        }
        if let Some(event) = decode_submodule(text, submodules) {
            return Self::Submodule { event };
        }
        if let Some(progress) = decode_progress(text) {
            return progress;
        }
        if let Some(rest) = text.strip_prefix("remote: ") {
            return Self::Remote { text: rest.trim_end().to_string() };
        }
        if let Some(subject) = text.strip_prefix("Applying: ") {
            return Self::PatchApply { subject: subject.to_string() };
        }
        if let Some(paths) = PATHS_UPDATED
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
        {
            return Self::WorkingDirectoryUpdated { paths };
        }
        if MERGE_PREFIXES.iter().any(|prefix| text.starts_with(prefix)) {
            return Self::Merge { text: text.to_string() };
        }
        Self::Message { text: text.to_string() }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::Error { .. }
                | Self::Submodule {
                    event: SubmoduleEvent::Failed { .. }
                }
        )
    }
}

fn decode_progress(text: &str) -> Option<ProgressEvent> {
    if let Some(caps) = PERCENT_PROGRESS.captures(text) {
        return Some(ProgressEvent::Progress {
            phase: caps[2].to_string(),
            percent: caps[3].parse().ok(),
            completed: caps[4].parse().ok()?,
            total: caps[5].parse().ok(),
            done: caps[6].contains("done"),
            remote: caps.get(1).is_some(),
        });
    }
    let caps = COUNT_PROGRESS.captures(text)?;
    Some(ProgressEvent::Progress {
        phase: caps[2].to_string(),
        percent: None,
        completed: caps[3].parse().ok()?,
        total: None,
        done: caps.get(4).is_some(),
        remote: caps.get(1).is_some(),
    })
}

fn decode_submodule(text: &str, submodules: bool) -> Option<SubmoduleEvent> {
    if let Some(caps) = SUBMODULE_REGISTERED.captures(text) {
        return Some(SubmoduleEvent::Registered {
            name: caps[1].to_string(),
            url: caps[2].to_string(),
            path: caps[3].to_string(),
        });
    }
    if let Some(caps) = SUBMODULE_UPDATED.captures(text) {
        let path = caps[1].to_string();
        let commit = caps[3].to_string();
        return Some(match &caps[2] {
            "checked out" => SubmoduleEvent::CheckedOut { path, commit },
            "merged in" => SubmoduleEvent::Merged { path, commit },
            _ => SubmoduleEvent::Rebased { path, commit },
        });
    }
    if let Some(caps) = SUBMODULE_FAILED.captures(text) {
        return Some(SubmoduleEvent::Failed {
            path: Some(caps[1].to_string()),
            message: text.to_string(),
        });
    }
    if submodules {
        if let Some(caps) = CLONING_INTO.captures(text) {
            return Some(SubmoduleEvent::Cloning {
                path: caps[1].to_string(),
            });
        }
    }
    None
}

/// Receives progress events while a command runs.
pub trait ProgressSink: Send {
    fn on_event(&mut self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressEvent) + Send,
{
    fn on_event(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// Adapts a [`ProgressSink`] to the runner's line sink.
pub(crate) struct ProgressDecoder<'a> {
    sink: &'a mut dyn ProgressSink,
    submodules: bool,
}

impl<'a> ProgressDecoder<'a> {
    pub(crate) fn new(sink: &'a mut dyn ProgressSink, submodules: bool) -> Self {
        Self { sink, submodules }
    }
}

impl OutputSink for ProgressDecoder<'_> {
    fn on_line(&mut self, line: OutputLine) {
        self.sink
            .on_event(ProgressEvent::decode(&line.text, self.submodules));
    }
}
