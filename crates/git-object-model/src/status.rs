//! `git status --porcelain=v2 -z --branch` parsing.

use crate::cursor::{decode_lossy, parse_decimal, ByteCursor};
use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use crate::object_id::ObjectId;
use crate::object_type::EntryMode;
use serde::Serialize;

/// Change classification of one side (index or worktree) of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Unmodified,
    Modified,
    TypeChanged,
    Added,
    Deleted,
    Renamed,
    Copied,
    UpdatedButUnmerged,
    Untracked,
    Ignored,
}

impl ChangeKind {
    /// Map one character of the `XY` field.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            b'.' => Some(Self::Unmodified),
            b'M' => Some(Self::Modified),
            b'T' => Some(Self::TypeChanged),
            b'A' => Some(Self::Added),
            b'D' => Some(Self::Deleted),
            b'R' => Some(Self::Renamed),
            b'C' => Some(Self::Copied),
            b'U' => Some(Self::UpdatedButUnmerged),
            _ => None,
        }
    }
}

/// Record kind, from the leading character of each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusRecordKind {
    Ordinary,
    RenamedOrCopied,
    Unmerged,
    Untracked,
    Ignored,
}

/// Mode and id of an entry at one point (HEAD, index, a conflict stage).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StatusSide {
    /// `None` when the path does not exist on this side.
    pub mode: Option<EntryMode>,
    pub id: Option<ObjectId>,
}

/// Submodule state field (`N...` or `S<c><m><u>`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmoduleState {
    #[default]
    NotSubmodule,
    Submodule {
        commit_changed: bool,
        tracked_changes: bool,
        untracked_changes: bool,
    },
}

/// Stages 1 to 3 of an unmerged path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ConflictStages {
    pub base: StatusSide,
    pub ours: StatusSide,
    pub theirs: StatusSide,
}

/// One path reported by status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub kind: StatusRecordKind,
    pub path: String,
    /// Source path of a rename or copy.
    pub original_path: Option<String>,
    /// Rename or copy similarity percentage.
    pub similarity: Option<u8>,
    pub staged: ChangeKind,
    pub unstaged: ChangeKind,
    pub submodule: SubmoduleState,
    pub head: StatusSide,
    pub index: StatusSide,
    pub worktree_mode: Option<EntryMode>,
    pub conflict: Option<ConflictStages>,
}

impl StatusEntry {
    fn untracked(kind: StatusRecordKind, path: String) -> Self {
        let change = if kind == StatusRecordKind::Ignored {
            ChangeKind::Ignored
        } else {
            ChangeKind::Untracked
        };
        Self {
            kind,
            path,
            original_path: None,
            similarity: None,
            staged: ChangeKind::Unmodified,
            unstaged: change,
            submodule: SubmoduleState::NotSubmodule,
            head: StatusSide::default(),
            index: StatusSide::default(),
            worktree_mode: None,
            conflict: None,
        }
    }

    pub fn is_staged(&self) -> bool {
        self.staged != ChangeKind::Unmodified
    }

    pub fn is_conflicted(&self) -> bool {
        self.kind == StatusRecordKind::Unmerged
    }
}

/// Branch header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchStatus {
    /// `None` before the first commit.
    pub oid: Option<ObjectId>,
    /// `None` when HEAD is detached.
    pub head: Option<String>,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
}

/// Parsed status output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub branch: BranchStatus,
    pub entries: Vec<StatusEntry>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.kind == StatusRecordKind::Ignored)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &StatusEntry> {
        self.entries.iter().filter(|entry| entry.is_conflicted())
    }
}

/// Parse NUL-separated porcelain v2 output.
pub fn parse_status(data: &[u8]) -> ObjectResult<StatusReport> {
    let mut report = StatusReport::default();
    let mut cursor = ByteCursor::new(data);

    while !cursor.is_at_end() {
        let start = cursor.position();
        let record = cursor.take_until(0).unwrap_or_else(|| cursor.take_rest());
        if record.is_empty() {
            continue;
        }
        let record = decode_lossy(record);
        let err = || ObjectParseError::new(ParseTag::StatusRecord, start);

        match record.as_bytes()[0] {
            b'#' => parse_branch_header(&record, &mut report.branch).ok_or_else(err)?,
            b'1' => report.entries.push(parse_ordinary(&record).ok_or_else(err)?),
            b'2' => {
                let mut entry = parse_renamed(&record).ok_or_else(err)?;
                let original = cursor.take_until(0).ok_or_else(err)?;
                entry.original_path = Some(decode_lossy(original).into_owned());
                report.entries.push(entry);
            }
            b'u' => report.entries.push(parse_unmerged(&record).ok_or_else(err)?),
            b'?' => report.entries.push(StatusEntry::untracked(
                StatusRecordKind::Untracked,
                record.get(2..).ok_or_else(err)?.to_string(),
            )),
            b'!' => report.entries.push(StatusEntry::untracked(
                StatusRecordKind::Ignored,
                record.get(2..).ok_or_else(err)?.to_string(),
            )),
            _ => return Err(err()),
        }
    }

    Ok(report)
}

fn parse_branch_header(record: &str, branch: &mut BranchStatus) -> Option<()> {
    let rest = record.strip_prefix("# ")?;
    let (key, value) = rest.split_once(' ')?;
    match key {
        "branch.oid" => {
            branch.oid = if value == "(initial)" {
                None
            } else {
                Some(ObjectId::from_hex(value).ok()?)
            };
        }
        "branch.head" => {
            branch.head = (value != "(detached)").then(|| value.to_string());
        }
        "branch.upstream" => branch.upstream = Some(value.to_string()),
        "branch.ab" => {
            let (ahead, behind) = value.split_once(' ')?;
            branch.ahead = ahead.strip_prefix('+')?.parse().ok()?;
            branch.behind = behind.strip_prefix('-')?.parse().ok()?;
        }
        // Other headers (stash counts etc.) are informational.
        _ => {}
    }
    Some(())
}

fn parse_xy(field: &str) -> Option<(ChangeKind, ChangeKind)> {
    let bytes = field.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    Some((ChangeKind::from_code(bytes[0])?, ChangeKind::from_code(bytes[1])?))
}

fn parse_submodule(field: &str) -> Option<SubmoduleState> {
    let bytes = field.as_bytes();
    if bytes.len() != 4 {
        return None;
    }
    match bytes[0] {
        b'N' => Some(SubmoduleState::NotSubmodule),
        b'S' => Some(SubmoduleState::Submodule {
            commit_changed: bytes[1] == b'C',
            tracked_changes: bytes[2] == b'M',
            untracked_changes: bytes[3] == b'U',
        }),
        _ => None,
    }
}

fn parse_mode(field: &str) -> Option<Option<EntryMode>> {
    let code = parse_decimal(field.as_bytes())?;
    if code == 0 {
        return Some(None);
    }
    EntryMode::from_code(code).map(Some)
}

fn parse_id(field: &str) -> Option<Option<ObjectId>> {
    let id = ObjectId::from_hex(field).ok()?;
    Some((!id.is_zero()).then_some(id))
}

fn side(mode: &str, id: &str) -> Option<StatusSide> {
    Some(StatusSide {
        mode: parse_mode(mode)?,
        id: parse_id(id)?,
    })
}

// 1 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <path>
fn parse_ordinary(record: &str) -> Option<StatusEntry> {
    let fields: Vec<&str> = record.splitn(9, ' ').collect();
    if fields.len() != 9 {
        return None;
    }
    let (staged, unstaged) = parse_xy(fields[1])?;
    Some(StatusEntry {
        kind: StatusRecordKind::Ordinary,
        path: fields[8].to_string(),
        original_path: None,
        similarity: None,
        staged,
        unstaged,
        submodule: parse_submodule(fields[2])?,
        head: side(fields[3], fields[6])?,
        index: side(fields[4], fields[7])?,
        worktree_mode: parse_mode(fields[5])?,
        conflict: None,
    })
}

// 2 <XY> <sub> <mH> <mI> <mW> <hH> <hI> <X><score> <path>
fn parse_renamed(record: &str) -> Option<StatusEntry> {
    let fields: Vec<&str> = record.splitn(10, ' ').collect();
    if fields.len() != 10 {
        return None;
    }
    let (staged, unstaged) = parse_xy(fields[1])?;
    let score = fields[8];
    if !score.starts_with(['R', 'C']) {
        return None;
    }
    Some(StatusEntry {
        kind: StatusRecordKind::RenamedOrCopied,
        path: fields[9].to_string(),
        original_path: None,
        similarity: Some(score[1..].parse().ok()?),
        staged,
        unstaged,
        submodule: parse_submodule(fields[2])?,
        head: side(fields[3], fields[6])?,
        index: side(fields[4], fields[7])?,
        worktree_mode: parse_mode(fields[5])?,
        conflict: None,
    })
}

// u <XY> <sub> <m1> <m2> <m3> <mW> <h1> <h2> <h3> <path>
fn parse_unmerged(record: &str) -> Option<StatusEntry> {
    let fields: Vec<&str> = record.splitn(11, ' ').collect();
    if fields.len() != 11 {
        return None;
    }
    let (staged, unstaged) = parse_xy(fields[1])?;
    Some(StatusEntry {
        kind: StatusRecordKind::Unmerged,
        path: fields[10].to_string(),
        original_path: None,
        similarity: None,
        staged,
        unstaged,
        submodule: parse_submodule(fields[2])?,
        head: StatusSide::default(),
        index: StatusSide::default(),
        worktree_mode: parse_mode(fields[6])?,
        conflict: Some(ConflictStages {
            base: side(fields[3], fields[7])?,
            ours: side(fields[4], fields[8])?,
            theirs: side(fields[5], fields[9])?,
        }),
    })
}
