//! Error types for plumbing output parsing.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Identifies which parse step rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum ParseTag {
    /// Tree entry mode is not a decimal integer.
    TreeMode,
    /// Tree entry mode is an integer git does not define.
    TreeUnknownMode,
    /// Tree entry name is not NUL-terminated.
    TreeEol,
    /// Tree entry id is shorter than 20 bytes.
    TreeId,
    ObjectId,
    ObjectHeader,
    ObjectType,
    CommitHeader,
    CommitTree,
    CommitSignature,
    StatusRecord,
}

impl ParseTag {
    /// Stable tag string carried by every parse error.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TreeMode => "treeMode",
            Self::TreeUnknownMode => "treeUnknownMode",
            Self::TreeEol => "treeEol",
            Self::TreeId => "treeId",
            Self::ObjectId => "objectId",
            Self::ObjectHeader => "objectHeader",
            Self::ObjectType => "objectType",
            Self::CommitHeader => "commitHeader",
            Self::CommitTree => "commitTree",
            Self::CommitSignature => "commitSignature",
            Self::StatusRecord => "statusRecord",
        }
    }
}

impl From<ParseTag> for &'static str {
    fn from(tag: ParseTag) -> Self {
        tag.as_str()
    }
}

impl fmt::Display for ParseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed plumbing output, located by tag and byte offset.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("malformed git output ({tag}) at byte offset {offset}")]
pub struct ObjectParseError {
    pub tag: ParseTag,
    pub offset: usize,
}

impl ObjectParseError {
    pub fn new(tag: ParseTag, offset: usize) -> Self {
        Self { tag, offset }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        self.tag.as_str()
    }
}

/// Result type for parse operations.
pub type ObjectResult<T> = Result<T, ObjectParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_tag_and_offset() {
        let err = ObjectParseError::new(ParseTag::TreeEol, 17);
        assert_eq!(
            err.to_string(),
            "malformed git output (treeEol) at byte offset 17"
        );
        assert_eq!(err.code(), "treeEol");
    }

    #[test]
    fn tags_serialize_as_strings() {
        let json = serde_json::to_string(&ObjectParseError::new(ParseTag::TreeUnknownMode, 0))
            .unwrap();
        assert_eq!(json, r#"{"tag":"treeUnknownMode","offset":0}"#);
    }
}
