//! Captured output and incremental line delivery.

use crate::command::TextEncoding;

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSource {
    Stdout,
    Stderr,
}

impl OutputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// One decoded line, delivered while the process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub source: OutputSource,
    pub text: String,
}

/// Receives lines as they arrive. Order is preserved per source only.
pub trait OutputSink: Send {
    fn on_line(&mut self, line: OutputLine);
}

impl<F> OutputSink for F
where
    F: FnMut(OutputLine) + Send,
{
    fn on_line(&mut self, line: OutputLine) {
        self(line)
    }
}

/// Exit code plus everything the process wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub encoding: TextEncoding,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        self.encoding.decode(&self.stdout)
    }

    pub fn stderr_text(&self) -> String {
        self.encoding.decode(&self.stderr)
    }

    /// Split into `(exit_code, stdout, stderr)`.
    pub fn into_parts(self) -> (Option<i32>, Vec<u8>, Vec<u8>) {
        (self.exit_code, self.stdout, self.stderr)
    }
}

/// Splits a byte stream into lines.
///
/// `\n` and `\r` both end a line and `\r\n` counts once, so carriage-return
/// progress redraws come out as separate lines. Empty lines are dropped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    after_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the lines it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        for &byte in chunk {
            match byte {
                b'\n' if self.after_cr => self.after_cr = false,
                b'\n' => self.flush_into(&mut lines),
                b'\r' => {
                    self.flush_into(&mut lines);
                    self.after_cr = true;
                }
                _ => {
                    self.after_cr = false;
                    self.pending.push(byte);
                }
            }
        }
        lines
    }

    /// Return the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.after_cr = false;
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }

    fn flush_into(&mut self, lines: &mut Vec<Vec<u8>>) {
        if !self.pending.is_empty() {
            lines.push(std::mem::take(&mut self.pending));
        }
    }
}
