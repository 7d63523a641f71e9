//! Parsed git objects and the identity capability they share.

use crate::commit::{parse_commit, Commit};
use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use crate::object_id::ObjectId;
use crate::object_type::{ObjectHeader, ObjectType};
use crate::tree::{parse_tree, Tree, TreeEntry, TreeParseOptions};
use serde::Serialize;

/// Anything that names a git object.
pub trait Identifiable {
    fn id(&self) -> ObjectId;

    fn object_type(&self) -> ObjectType;

    /// Whether both values refer to the same object.
    fn is_same_object(&self, other: &dyn Identifiable) -> bool {
        self.id() == other.id()
    }
}

/// Raw file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blob {
    pub id: ObjectId,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Blob {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Content decoded as UTF-8 if it is valid text.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// A parsed object together with its header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GitObject {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl GitObject {
    /// Parse the payload `git cat-file <type> <id>` printed for `header`.
    pub fn parse(
        header: ObjectHeader,
        data: Vec<u8>,
        options: TreeParseOptions<'_>,
    ) -> ObjectResult<Self> {
        match header.object_type {
            ObjectType::Blob => Ok(Self::Blob(Blob {
                id: header.id,
                data,
            })),
            ObjectType::Tree => parse_tree(header.id, &data, options).map(Self::Tree),
            ObjectType::Commit => parse_commit(header.id, &data).map(Self::Commit),
            ObjectType::Tag => Err(ObjectParseError::new(ParseTag::ObjectType, 0)),
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Self::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Self::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Self::Blob(blob) => Some(blob),
            _ => None,
        }
    }
}

impl Identifiable for Blob {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}

impl Identifiable for Tree {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

impl Identifiable for Commit {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}

impl Identifiable for TreeEntry {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        self.mode.object_type()
    }
}

impl Identifiable for ObjectHeader {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

impl Identifiable for GitObject {
    fn id(&self) -> ObjectId {
        match self {
            Self::Blob(blob) => blob.id,
            Self::Tree(tree) => tree.id,
            Self::Commit(commit) => commit.id,
        }
    }

    fn object_type(&self) -> ObjectType {
        match self {
            Self::Blob(_) => ObjectType::Blob,
            Self::Tree(_) => ObjectType::Tree,
            Self::Commit(_) => ObjectType::Commit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blob_payload() {
        let header = ObjectHeader::new(ObjectId::new([1; 20]), ObjectType::Blob, 5);
        let object = GitObject::parse(header, b"hello".to_vec(), TreeParseOptions::new()).unwrap();
        let blob = object.as_blob().unwrap();
        assert_eq!(blob.text(), Some("hello"));
        assert_eq!(blob.size(), 5);
        assert_eq!(object.object_type(), ObjectType::Blob);
    }

    #[test]
    fn tags_are_not_materialized() {
        let header = ObjectHeader::with_unknown_size(ObjectId::ZERO, ObjectType::Tag);
        let err = GitObject::parse(header, Vec::new(), TreeParseOptions::new()).unwrap_err();
        assert_eq!(err.tag, ParseTag::ObjectType);
    }

    #[test]
    fn identity_compares_ids_across_kinds() {
        let id = ObjectId::new([3; 20]);
        let header = ObjectHeader::with_unknown_size(id, ObjectType::Tree);
        let tree = Tree::empty(id);
        assert!(header.is_same_object(&tree));
        assert!(!Tree::empty(ObjectId::ZERO).is_same_object(&header));
    }
}
