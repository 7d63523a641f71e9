//! Binary tree object parsing.
//!
//! `git cat-file tree <id>` prints a sequence of `<mode> <name>\0<20-byte id>`
//! records. Records may be separated by NUL padding.

use crate::cursor::{decode_lossy, parse_decimal, ByteCursor};
use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use crate::interner::{share, StringInterner};
use crate::object_id::ObjectId;
use crate::object_type::{EntryMode, ObjectType};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// One entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TreeEntry {
    pub name: Arc<str>,
    pub id: ObjectId,
    pub mode: EntryMode,
    /// Id of the tree this entry was read from. Informational only.
    pub parent_tree: ObjectId,
}

impl TreeEntry {
    pub fn object_type(&self) -> ObjectType {
        self.mode.object_type()
    }
}

/// A parsed tree, entries split by kind in the order git listed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub id: ObjectId,
    pub blobs: Vec<TreeEntry>,
    pub trees: Vec<TreeEntry>,
    /// Submodule commits. Recorded as plain entries, never resolved.
    pub gitlinks: Vec<TreeEntry>,
}

impl Tree {
    pub fn empty(id: ObjectId) -> Self {
        Self {
            id,
            blobs: Vec::new(),
            trees: Vec::new(),
            gitlinks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len() + self.trees.len() + self.gitlinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries: blobs, then trees, then gitlinks.
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.blobs
            .iter()
            .chain(self.trees.iter())
            .chain(self.gitlinks.iter())
    }

    pub fn find(&self, name: &str) -> Option<&TreeEntry> {
        self.entries().find(|entry| &*entry.name == name)
    }
}

/// Predicate deciding which entry names are kept.
pub type NameFilter<'a> = &'a (dyn Fn(&str) -> bool + Send + Sync);

/// Optional knobs for [`parse_tree`].
#[derive(Default, Clone, Copy)]
pub struct TreeParseOptions<'a> {
    filter: Option<NameFilter<'a>>,
    interner: Option<&'a StringInterner>,
}

impl<'a> TreeParseOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only entries whose name satisfies `filter`.
    pub fn with_filter(mut self, filter: NameFilter<'a>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Share entry names through `interner`.
    pub fn with_interner(mut self, interner: &'a StringInterner) -> Self {
        self.interner = Some(interner);
        self
    }
}

impl std::fmt::Debug for TreeParseOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeParseOptions")
            .field("has_filter", &self.filter.is_some())
            .field("has_interner", &self.interner.is_some())
            .finish()
    }
}

/// Parse raw tree bytes belonging to tree `id`.
pub fn parse_tree(id: ObjectId, data: &[u8], options: TreeParseOptions<'_>) -> ObjectResult<Tree> {
    let mut tree = Tree::empty(id);
    let mut cursor = ByteCursor::new(data);
    let mut skipped = 0usize;

    loop {
        cursor.skip_run(0);
        if cursor.is_at_end() {
            break;
        }

        let record_start = cursor.position();
        let mode_span = cursor
            .take_until(b' ')
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeMode, record_start))?;
        let code = parse_decimal(mode_span)
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeMode, record_start))?;
        let mode = EntryMode::from_code(code)
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeUnknownMode, record_start))?;

        let name_start = cursor.position();
        let name = cursor
            .take_until(0)
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeEol, name_start))?;

        let id_start = cursor.position();
        let raw_id = cursor
            .take(ObjectId::LEN)
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeId, id_start))?;
        let entry_id = ObjectId::from_bytes(raw_id)
            .ok_or_else(|| ObjectParseError::new(ParseTag::TreeId, id_start))?;

        let name = decode_lossy(name);
        if let Some(filter) = options.filter {
            if !filter(&name) {
                skipped += 1;
                continue;
            }
        }

        let entry = TreeEntry {
            name: share(options.interner, &name),
            id: entry_id,
            mode,
            parent_tree: id,
        };
        match mode {
            EntryMode::Tree => tree.trees.push(entry),
            EntryMode::Submodule => tree.gitlinks.push(entry),
            _ => tree.blobs.push(entry),
        }
    }

    debug!(
        tree = %id.short(12),
        blobs = tree.blobs.len(),
        trees = tree.trees.len(),
        gitlinks = tree.gitlinks.len(),
        skipped,
        "Parsed tree"
    );

    Ok(tree)
}
