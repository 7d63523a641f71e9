//! Process command description.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Text encoding used for stdin and for decoding captured output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 without BOM. A leading BOM is stripped on decode and invalid
    /// sequences become U+FFFD.
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per char.
    Latin1,
}

const UTF8_BOM: &[u8] = &[0xef, 0xbb, 0xbf];

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                String::from_utf8_lossy(bytes).into_owned()
            }
            Self::Latin1 => bytes.iter().map(|b| char::from(*b)).collect(),
        }
    }

    /// Encode text; chars outside Latin-1 become `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }

    /// Parse a config value (`utf-8`, `utf8`, `latin1`, `iso-8859-1`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "latin1" | "latin-1" | "iso-8859-1" => Some(Self::Latin1),
            _ => None,
        }
    }
}

/// Everything needed to launch one child process.
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Overrides applied in order after inheritance.
    pub env: Vec<(String, String)>,
    pub env_remove: Vec<String>,
    /// When false the child starts from an empty environment.
    pub inherit_env: bool,
    pub working_dir: Option<PathBuf>,
    /// Bytes written to stdin before it is closed. `None` attaches /dev/null.
    pub stdin: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
    pub encoding: TextEncoding,
}

impl ProcessCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            env_remove: Vec::new(),
            inherit_env: true,
            working_dir: None,
            stdin: None,
            timeout: None,
            encoding: TextEncoding::default(),
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

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn without_env(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    pub fn with_inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    /// Encode `text` with the command's encoding and send it on stdin.
    pub fn with_stdin_text(mut self, text: &str) -> Self {
        self.stdin = Some(self.encoding.encode(text));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Human-readable command line for logs and errors.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl fmt::Display for ProcessCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
