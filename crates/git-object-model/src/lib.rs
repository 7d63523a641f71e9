//! # Git Object Model
//!
//! Typed values for the plumbing output git prints, and the parsers that
//! produce them. Nothing in this crate runs git; callers hand it the bytes
//! a finished process wrote to stdout.
//!
//! ## Key Operations
//!
//! | Operation | Input | Output |
//! |-----------|-------|--------|
//! | [`parse_tree`] | `git cat-file tree <id>` | [`Tree`] |
//! | [`parse_commit`] | `git cat-file commit <id>` | [`Commit`] |
//! | [`parse_batch_check`] | `git cat-file --batch-check` | [`ObjectHeader`]s |
//! | [`parse_status`] | `git status --porcelain=v2 -z --branch` | [`StatusReport`] |
//!
//! Every parse failure is an [`ObjectParseError`] carrying a stable tag and
//! the byte offset of the record that was rejected.
//!
//! Entry names can be shared across many parsed trees by passing a
//! [`StringInterner`] through [`TreeParseOptions::with_interner`].

mod commit;
mod cursor;
mod error;
mod interner;
mod object;
mod object_id;
mod object_type;
mod status;
mod tree;

pub use commit::{parse_commit, parse_signature, Commit, Signature};
pub use cursor::{decode_lossy, parse_decimal, parse_signed_decimal, ByteCursor};
pub use error::{ObjectParseError, ObjectResult, ParseTag};
pub use interner::StringInterner;
pub use object::{Blob, GitObject, Identifiable};
pub use object_id::ObjectId;
pub use object_type::{
    parse_batch_check, parse_batch_check_line, EntryMode, ObjectHeader, ObjectType, UNKNOWN_SIZE,
};
pub use status::{
    parse_status, BranchStatus, ChangeKind, ConflictStages, StatusEntry, StatusRecordKind,
    StatusReport, StatusSide, SubmoduleState,
};
pub use tree::{parse_tree, NameFilter, Tree, TreeEntry, TreeParseOptions};
