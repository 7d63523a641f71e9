//! Object kinds, tree entry modes and batch-check headers.

use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use crate::object_id::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four git object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Parse the type name git prints (`blob`, `tree`, `commit`, `tag`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File mode of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    Tree,
    File,
    GroupWritableFile,
    Executable,
    Symlink,
    Submodule,
}

impl EntryMode {
    /// Map the mode as git prints it (`100644` read as a decimal number).
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            40000 => Some(Self::Tree),
            100644 => Some(Self::File),
            100664 => Some(Self::GroupWritableFile),
            100755 => Some(Self::Executable),
            120000 => Some(Self::Symlink),
            160000 => Some(Self::Submodule),
            _ => None,
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            Self::Tree => 40000,
            Self::File => 100644,
            Self::GroupWritableFile => 100664,
            Self::Executable => 100755,
            Self::Symlink => 120000,
            Self::Submodule => 160000,
        }
    }

    /// Type of the object the entry points at. Gitlinks point at commits.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Tree => ObjectType::Tree,
            Self::Submodule => ObjectType::Commit,
            Self::File | Self::GroupWritableFile | Self::Executable | Self::Symlink => {
                ObjectType::Blob
            }
        }
    }

    pub fn is_blob(&self) -> bool {
        self.object_type() == ObjectType::Blob
    }
}

impl fmt::Display for EntryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Size value used when the object size was not reported.
pub const UNKNOWN_SIZE: i64 = -1;

/// Id, type and size of an object, as `git cat-file --batch-check` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHeader {
    pub id: ObjectId,
    pub object_type: ObjectType,
    /// Size in bytes, or [`UNKNOWN_SIZE`].
    pub size: i64,
}

impl ObjectHeader {
    pub fn new(id: ObjectId, object_type: ObjectType, size: i64) -> Self {
        Self {
            id,
            object_type,
            size,
        }
    }

    pub fn with_unknown_size(id: ObjectId, object_type: ObjectType) -> Self {
        Self::new(id, object_type, UNKNOWN_SIZE)
    }

    pub fn is_size_known(&self) -> bool {
        self.size >= 0
    }
}

/// Parse one batch-check line (`<id> <type> <size>`).
///
/// `<name> missing` and `<name> ambiguous` lines yield `Ok(None)`.
pub fn parse_batch_check_line(line: &str) -> ObjectResult<Option<ObjectHeader>> {
    parse_batch_check_line_at(line, 0)
}

fn parse_batch_check_line_at(line: &str, offset: usize) -> ObjectResult<Option<ObjectHeader>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.ends_with(" missing") || line.ends_with(" ambiguous") {
        return Ok(None);
    }

    let mut fields = line.split(' ');
    let (Some(id), Some(kind), Some(size), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ObjectParseError::new(ParseTag::ObjectHeader, offset));
    };

    let id = ObjectId::from_hex(id).map_err(|e| ObjectParseError::new(e.tag, offset))?;
    let object_type = ObjectType::parse(kind)
        .ok_or_else(|| ObjectParseError::new(ParseTag::ObjectType, offset + id_field_len(line)))?;
    let size = size
        .parse::<i64>()
        .map_err(|_| ObjectParseError::new(ParseTag::ObjectHeader, offset))?;

    Ok(Some(ObjectHeader::new(id, object_type, size)))
}

fn id_field_len(line: &str) -> usize {
    line.find(' ').map(|idx| idx + 1).unwrap_or(0)
}

/// Parse every line of batch-check output, one result per requested object.
pub fn parse_batch_check(output: &str) -> ObjectResult<Vec<Option<ObjectHeader>>> {
    let mut headers = Vec::new();
    let mut offset = 0;
    for line in output.split_inclusive('\n') {
        if !line.trim().is_empty() {
            headers.push(parse_batch_check_line_at(line, offset)?);
        }
        offset += line.len();
    }
    Ok(headers)
}
