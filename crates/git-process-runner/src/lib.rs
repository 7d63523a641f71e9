//! # Git Process Runner
//!
//! Starts a child process, captures stdout and stderr concurrently, enforces
//! timeouts and cooperative stop requests, and hands back a
//! [`ProcessOutput`] once the child has exited.
//!
//! ```text
//! ProcessCommand ──► ProcessRunner::start() ──► RunningProcess
//!                                                   │
//!                         stdout/stderr reader tasks│ OutputLine
//!                                                   ▼
//!                               collect() ──► OutputSink (optional)
//!                                   │
//!                                   ▼
//!                             ProcessOutput
//! ```
//!
//! The runner knows nothing about git. Each invocation owns its own child
//! handle and buffers, so any number of invocations may run concurrently.

mod command;
mod error;
mod output;
mod runner;

pub use command::{ProcessCommand, TextEncoding};
pub use error::{ProcessError, ProcessResult};
pub use output::{LineSplitter, OutputLine, OutputSink, OutputSource, ProcessOutput};
pub use runner::{
    KillTermination, ProcessRunner, RunningProcess, StopHandle, TerminationStrategy,
    DEFAULT_TERMINATION_TIMEOUT,
};
