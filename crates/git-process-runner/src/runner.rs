//! Child process lifecycle management.

use crate::command::{ProcessCommand, TextEncoding};
use crate::error::{ProcessError, ProcessResult};
use crate::output::{LineSplitter, OutputLine, OutputSink, OutputSource, ProcessOutput};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Default time allowed for a killed process to exit.
pub const DEFAULT_TERMINATION_TIMEOUT: Duration = Duration::from_secs(5);

const READ_CHUNK: usize = 8192;

/// How to stop a running child.
///
/// Returns whether the child exited within `timeout`.
#[async_trait]
pub trait TerminationStrategy: Send + Sync {
    async fn terminate(&self, child: &mut Child, timeout: Duration) -> bool;
}

/// Kill the child and wait for it to be reaped.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillTermination;

#[async_trait]
impl TerminationStrategy for KillTermination {
    async fn terminate(&self, child: &mut Child, timeout: Duration) -> bool {
        if let Ok(Some(_)) = child.try_wait() {
            return true;
        }
        if let Err(e) = child.start_kill() {
            debug!(error = %e, "Kill failed, process may have already exited");
        }
        matches!(tokio::time::timeout(timeout, child.wait()).await, Ok(Ok(_)))
    }
}

/// Requests cooperative cancellation of a running process.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop_tx: broadcast::Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

/// A spawned child that has not been collected yet.
pub struct RunningProcess {
    child: Child,
    pid: Option<u32>,
    command: String,
    timeout: Option<Duration>,
    encoding: TextEncoding,
    stop_tx: broadcast::Sender<()>,
    stop_rx: broadcast::Receiver<()>,
    stdin_writer: Option<JoinHandle<()>>,
    terminated: bool,
}

impl RunningProcess {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Command line this process was started with.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// A handle other tasks can use to stop this process.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop_tx: self.stop_tx.clone(),
        }
    }

    pub fn stop(&self) {
        info!(pid = ?self.pid, "Sending stop signal to process");
        let _ = self.stop_tx.send(());
    }
}

impl std::fmt::Debug for RunningProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningProcess")
            .field("pid", &self.pid)
            .field("command", &self.command)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Starts child processes and collects their output.
///
/// The runner holds no per-process state and can be shared across tasks.
#[derive(Clone)]
pub struct ProcessRunner {
    termination: Option<Arc<dyn TerminationStrategy>>,
    termination_timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            termination: None,
            termination_timeout: DEFAULT_TERMINATION_TIMEOUT,
        }
    }

    /// Use `strategy` instead of the default kill-and-wait.
    pub fn with_termination_strategy(mut self, strategy: Arc<dyn TerminationStrategy>) -> Self {
        self.termination = Some(strategy);
        self
    }

    pub fn with_termination_timeout(mut self, timeout: Duration) -> Self {
        self.termination_timeout = timeout;
        self
    }

    /// Spawn `command` with piped stdout and stderr.
    pub fn start(&self, command: &ProcessCommand) -> ProcessResult<RunningProcess> {
        let repr = command.display();

        if let Some(dir) = &command.working_dir {
            if !dir.is_dir() {
                return Err(ProcessError::InvalidWorkingDirectory { path: dir.clone() });
            }
        }

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if !command.inherit_env {
            cmd.env_clear();
        }
        for key in &command.env_remove {
            cmd.env_remove(key);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(if command.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ProcessError::NotFound {
                    program: command.program.clone(),
                }
            } else {
                ProcessError::SpawnFailed {
                    command: repr.clone(),
                    message: err.to_string(),
                }
            }
        })?;

        let pid = child.id();
        info!(pid = ?pid, command = %repr, "Process spawned");

        let stdin_writer = match (&command.stdin, child.stdin.take()) {
            (Some(bytes), Some(mut stdin)) => {
                let bytes = bytes.clone();
                Some(tokio::spawn(async move {
                    if let Err(e) = stdin.write_all(&bytes).await {
                        debug!(error = %e, "Process closed stdin early");
                    }
                    // Dropping stdin closes the pipe.
                }))
            }
            _ => None,
        };

        let (stop_tx, stop_rx) = broadcast::channel::<()>(1);

        Ok(RunningProcess {
            child,
            pid,
            command: repr,
            timeout: command.timeout,
            encoding: command.encoding,
            stop_tx,
            stop_rx,
            stdin_writer,
            terminated: false,
        })
    }

    /// Run `command` to completion and return its output.
    pub async fn execute(&self, command: &ProcessCommand) -> ProcessResult<ProcessOutput> {
        let process = self.start(command)?;
        self.collect(process, None).await
    }

    /// Run `command`, forwarding decoded lines to `sink` as they arrive.
    pub async fn execute_with_progress(
        &self,
        command: &ProcessCommand,
        sink: &mut dyn OutputSink,
    ) -> ProcessResult<ProcessOutput> {
        let process = self.start(command)?;
        self.collect(process, Some(sink)).await
    }

    /// Wait for a started process, honouring its timeout and stop handle.
    pub async fn collect(
        &self,
        mut process: RunningProcess,
        mut sink: Option<&mut dyn OutputSink>,
    ) -> ProcessResult<ProcessOutput> {
        if process.terminated {
            if let Some(writer) = process.stdin_writer.take() {
                writer.abort();
            }
            return Err(ProcessError::Terminated {
                command: process.command,
            });
        }

        let stdout = process
            .child
            .stdout
            .take()
            .ok_or(ProcessError::StreamUnavailable("stdout"))?;
        let stderr = process
            .child
            .stderr
            .take()
            .ok_or(ProcessError::StreamUnavailable("stderr"))?;

        let streaming = sink.is_some();
        let encoding = process.encoding;
        let (line_tx, mut line_rx) = mpsc::unbounded_channel::<OutputLine>();
        let stdout_reader = spawn_reader(
            stdout,
            OutputSource::Stdout,
            streaming,
            encoding,
            line_tx.clone(),
        );
        let stderr_reader =
            spawn_reader(stderr, OutputSource::Stderr, streaming, encoding, line_tx);

        let deadline = process.timeout.map(|t| Instant::now() + t);
        let timer = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(timer);

        let mut exit_status = None;
        let mut lines_closed = false;

        let interrupted = loop {
            tokio::select! {
                _ = process.stop_rx.recv() => break Some(false),
                _ = &mut timer => break Some(true),
                line = line_rx.recv(), if !lines_closed => match line {
                    Some(line) => {
                        if let Some(sink) = sink.as_mut() {
                            sink.on_line(line);
                        }
                    }
                    None => {
                        lines_closed = true;
                        if exit_status.is_some() {
                            break None;
                        }
                    }
                },
                status = process.child.wait(), if exit_status.is_none() => {
                    exit_status = Some(status?);
                    if lines_closed {
                        break None;
                    }
                }
            }
        };

        if let Some(timed_out) = interrupted {
            let exited = self
                .terminate_child(&mut process.child, self.termination_timeout)
                .await;
            if !exited {
                warn!(pid = ?process.pid, "Process did not exit within termination timeout");
            }
            stdout_reader.abort();
            stderr_reader.abort();
            if let Some(writer) = process.stdin_writer.take() {
                writer.abort();
            }
            return Err(match (timed_out, process.timeout) {
                (true, Some(timeout)) => {
                    warn!(
                        pid = ?process.pid,
                        command = %process.command,
                        ?timeout,
                        "Process timed out"
                    );
                    ProcessError::TimedOut {
                        command: process.command,
                        timeout,
                    }
                }
                _ => {
                    info!(pid = ?process.pid, "Process stopped");
                    ProcessError::Terminated {
                        command: process.command,
                    }
                }
            });
        }

        let stdout = join_reader(stdout_reader).await?;
        let stderr = join_reader(stderr_reader).await?;
        if let Some(writer) = process.stdin_writer.take() {
            let _ = writer.await;
        }

        let exit_code = exit_status.and_then(|status| status.code());
        debug!(
            pid = ?process.pid,
            exit_code = ?exit_code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "Process finished"
        );

        Ok(ProcessOutput {
            exit_code,
            stdout,
            stderr,
            encoding,
        })
    }

    /// Stop `process` and report whether it exited within `timeout`.
    ///
    /// A terminated process collects as [`ProcessError::Terminated`].
    pub async fn terminate(&self, process: &mut RunningProcess, timeout: Duration) -> bool {
        info!(pid = ?process.pid, "Terminating process");
        process.terminated = true;
        self.terminate_child(&mut process.child, timeout).await
    }

    async fn terminate_child(&self, child: &mut Child, timeout: Duration) -> bool {
        match &self.termination {
            Some(strategy) => strategy.terminate(child, timeout).await,
            None => KillTermination.terminate(child, timeout).await,
        }
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("custom_termination", &self.termination.is_some())
            .field("termination_timeout", &self.termination_timeout)
            .finish()
    }
}

fn spawn_reader<R>(
    mut reader: R,
    source: OutputSource,
    streaming: bool,
    encoding: TextEncoding,
    lines: mpsc::UnboundedSender<OutputLine>,
) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut captured = Vec::new();
        let mut splitter = LineSplitter::new();
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            let read = reader.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            captured.extend_from_slice(&chunk[..read]);
            if streaming {
                for line in splitter.push(&chunk[..read]) {
                    let _ = lines.send(OutputLine {
                        source,
                        text: encoding.decode(&line),
                    });
                }
            }
        }

        if streaming {
            if let Some(line) = splitter.finish() {
                let _ = lines.send(OutputLine {
                    source,
                    text: encoding.decode(&line),
                });
            }
        }

        Ok(captured)
    })
}

async fn join_reader(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> ProcessResult<Vec<u8>> {
    handle
        .await
        .map_err(|e| ProcessError::Io(std::io::Error::other(e)))?
        .map_err(ProcessError::from)
}
