#![allow(dead_code)]

use git_process_runner::ProcessCommand;
use std::path::Path;

/// Run `script` through `sh -c`.
pub fn sh(script: &str) -> ProcessCommand {
    ProcessCommand::new("sh").with_args(["-c", script])
}

/// Run `script` through `sh -c` inside `dir`.
pub fn sh_in(dir: &Path, script: &str) -> ProcessCommand {
    sh(script).with_working_dir(dir)
}
