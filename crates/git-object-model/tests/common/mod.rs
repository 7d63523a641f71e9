#![allow(dead_code)]

use git_object_model::ObjectId;

/// Deterministic id filled with a single byte.
pub fn sample_id(fill: u8) -> ObjectId {
    ObjectId::new([fill; ObjectId::LEN])
}

/// Encode one tree record exactly as `git cat-file tree` prints it.
pub fn tree_record(mode: &str, name: &str, id: ObjectId) -> Vec<u8> {
    let mut bytes = format!("{mode} {name}\0").into_bytes();
    bytes.extend_from_slice(id.as_bytes());
    bytes
}

/// Concatenate records into one tree payload.
pub fn tree_payload(records: &[Vec<u8>]) -> Vec<u8> {
    records.concat()
}
