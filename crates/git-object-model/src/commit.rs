//! Commit object parsing.

use crate::cursor::{decode_lossy, parse_decimal, ByteCursor};
use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use crate::object_id::ObjectId;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Author or committer line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

/// A parsed commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub id: ObjectId,
    pub tree: ObjectId,
    pub parents: Vec<ObjectId>,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Parse raw commit bytes (`git cat-file commit <id>`).
///
/// Unrecognised headers (`encoding`, `gpgsig`, `mergetag` and their
/// continuation lines) are skipped.
pub fn parse_commit(id: ObjectId, data: &[u8]) -> ObjectResult<Commit> {
    let mut cursor = ByteCursor::new(data);
    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;

    loop {
        let line_start = cursor.position();
        let line = match cursor.take_until(b'\n') {
            Some(line) => line,
            None => return Err(ObjectParseError::new(ParseTag::CommitHeader, line_start)),
        };
        if line.is_empty() {
            break;
        }
        if line.starts_with(b" ") {
            continue;
        }

        let Some(split) = line.iter().position(|b| *b == b' ') else {
            return Err(ObjectParseError::new(ParseTag::CommitHeader, line_start));
        };
        let (key, value) = (&line[..split], &line[split + 1..]);
        let value_start = line_start + split + 1;

        match key {
            b"tree" => tree = Some(parse_header_id(value, ParseTag::CommitTree, value_start)?),
            b"parent" => parents.push(parse_header_id(value, ParseTag::CommitHeader, value_start)?),
            b"author" => author = Some(parse_signature(value, value_start)?),
            b"committer" => committer = Some(parse_signature(value, value_start)?),
            _ => {}
        }
    }

    let tree = tree.ok_or_else(|| ObjectParseError::new(ParseTag::CommitTree, 0))?;
    let author = author.ok_or_else(|| ObjectParseError::new(ParseTag::CommitSignature, 0))?;
    let committer =
        committer.ok_or_else(|| ObjectParseError::new(ParseTag::CommitSignature, 0))?;

    Ok(Commit {
        id,
        tree,
        parents,
        author,
        committer,
        message: decode_lossy(cursor.take_rest()).into_owned(),
    })
}

fn parse_header_id(value: &[u8], tag: ParseTag, offset: usize) -> ObjectResult<ObjectId> {
    std::str::from_utf8(value)
        .ok()
        .and_then(|text| ObjectId::from_hex(text).ok())
        .ok_or_else(|| ObjectParseError::new(tag, offset))
}

/// Parse `Name <email> <seconds> <+hhmm>`.
pub fn parse_signature(value: &[u8], offset: usize) -> ObjectResult<Signature> {
    let err = || ObjectParseError::new(ParseTag::CommitSignature, offset);

    let open = value.iter().position(|b| *b == b'<').ok_or_else(err)?;
    let close = value[open..]
        .iter()
        .position(|b| *b == b'>')
        .map(|idx| open + idx)
        .ok_or_else(err)?;

    let name = decode_lossy(&value[..open]).trim_end().to_string();
    let email = decode_lossy(&value[open + 1..close]).into_owned();

    let mut rest = value[close + 1..]
        .split(|b| *b == b' ')
        .filter(|part| !part.is_empty());
    let seconds = rest
        .next()
        .and_then(parse_decimal)
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(err)?;
    let offset_zone = rest.next().and_then(parse_zone).ok_or_else(err)?;
    let when = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(err)?
        .with_timezone(&offset_zone);

    Ok(Signature { name, email, when })
}

/// Parse a `[+-]HHMM` zone offset.
fn parse_zone(span: &[u8]) -> Option<FixedOffset> {
    let (sign, digits) = match span {
        [b'+', digits @ ..] => (1, digits),
        [b'-', digits @ ..] => (-1, digits),
        _ => return None,
    };
    if digits.len() != 4 {
        return None;
    }
    let hours = i32::try_from(parse_decimal(&digits[..2])?).ok()?;
    let minutes = i32::try_from(parse_decimal(&digits[2..])?).ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";
    const PARENT: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

    fn sample(extra_headers: &str) -> Vec<u8> {
        format!(
            "tree {TREE}\nparent {PARENT}\nauthor Ada Lovelace <ada@example.com> 1700000000 +0130\n\
             committer Grace Hopper <grace@example.com> 1700000100 -0500\n{extra_headers}\n\
             Add analytical engine\n\nLonger body.\n"
        )
        .into_bytes()
    }

    #[test]
    fn parses_headers_and_message() {
        let commit = parse_commit(ObjectId::ZERO, &sample("")).unwrap();
        assert_eq!(commit.tree.revision_text(), TREE);
        assert_eq!(commit.parents.len(), 1);
        assert_eq!(commit.author.name, "Ada Lovelace");
        assert_eq!(commit.author.email, "ada@example.com");
        assert_eq!(commit.author.when.offset().local_minus_utc(), 5400);
        assert_eq!(commit.committer.when.offset().local_minus_utc(), -18000);
        assert_eq!(commit.committer.when.timestamp(), 1_700_000_100);
        assert_eq!(commit.summary(), "Add analytical engine");
        assert!(!commit.is_merge());
    }

    #[test]
    fn skips_signature_blocks() {
        let gpgsig = "gpgsig -----BEGIN PGP SIGNATURE-----\n \n abc\n -----END PGP SIGNATURE-----\n";
        let commit = parse_commit(ObjectId::ZERO, &sample(gpgsig)).unwrap();
        assert_eq!(commit.summary(), "Add analytical engine");
    }

    #[test]
    fn missing_tree_is_rejected() {
        let data = b"author A <a@b> 1 +0000\ncommitter A <a@b> 1 +0000\n\nmsg\n";
        let err = parse_commit(ObjectId::ZERO, data).unwrap_err();
        assert_eq!(err.tag, ParseTag::CommitTree);
    }

    #[test]
    fn bad_signature_is_rejected() {
        let data = format!("tree {TREE}\nauthor nobody\ncommitter A <a@b> 1 +0000\n\nmsg\n");
        let err = parse_commit(ObjectId::ZERO, data.as_bytes()).unwrap_err();
        assert_eq!(err.tag, ParseTag::CommitSignature);
        assert_eq!(err.offset, TREE.len() + 6 + 7);
    }

    #[test]
    fn malformed_zones_are_rejected() {
        for zone in ["+999999999999999999", "-99999", "0130", "+01x0", "+0175"] {
            let data = format!(
                "tree {TREE}\nauthor A <a@b> 1700000000 {zone}\ncommitter A <a@b> 1 +0000\n\nmsg\n"
            );
            let err = parse_commit(ObjectId::ZERO, data.as_bytes()).unwrap_err();
            assert_eq!(err.tag, ParseTag::CommitSignature, "zone {zone}");
        }
    }

    #[test]
    fn unterminated_headers_are_rejected() {
        let err = parse_commit(ObjectId::ZERO, format!("tree {TREE}").as_bytes()).unwrap_err();
        assert_eq!(err.tag, ParseTag::CommitHeader);
    }
}
