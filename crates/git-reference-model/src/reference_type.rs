//! Reference kinds and canonical name decomposition.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical name of the symbolic HEAD reference.
pub const HEAD: &str = "HEAD";
/// Canonical name of the stash reference.
pub const STASH_REF: &str = "refs/stash";
/// Friendly name of the stash reference.
pub const STASH_FRIENDLY: &str = "stash";

/// Namespace a reference lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Head,
    Heads,
    Remotes,
    Tags,
    Notes,
    Stash,
    Unknown,
}

/// Prefixed namespaces, checked in this order.
const PREFIXES: [(&str, ReferenceType); 4] = [
    ("refs/heads/", ReferenceType::Heads),
    ("refs/remotes/", ReferenceType::Remotes),
    ("refs/tags/", ReferenceType::Tags),
    ("refs/notes/", ReferenceType::Notes),
];

impl ReferenceType {
    pub const ALL: [ReferenceType; 7] = [
        Self::Head,
        Self::Heads,
        Self::Remotes,
        Self::Tags,
        Self::Notes,
        Self::Stash,
        Self::Unknown,
    ];

    /// Prefix of prefixed namespaces.
    pub fn prefix(&self) -> Option<&'static str> {
        PREFIXES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(prefix, _)| *prefix)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Heads => "heads",
            Self::Remotes => "remotes",
            Self::Tags => "tags",
            Self::Notes => "notes",
            Self::Stash => "stash",
            Self::Unknown => "unknown",
        }
    }

    /// Whether `friendly` composes to a canonical name that decomposes back
    /// to `(friendly, self)`.
    pub fn accepts_friendly_name(&self, friendly: &str) -> bool {
        match self {
            Self::Head => friendly == HEAD,
            Self::Stash => friendly == STASH_FRIENDLY,
            Self::Heads | Self::Remotes | Self::Tags | Self::Notes => !friendly.is_empty(),
            Self::Unknown => decompose_canonical_name(friendly).1 == Self::Unknown,
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a canonical name into its friendly name and namespace.
///
/// Names outside every known namespace come back unchanged as `Unknown`.
pub fn decompose_canonical_name(canonical: &str) -> (&str, ReferenceType) {
    if canonical == HEAD {
        return (HEAD, ReferenceType::Head);
    }
    for (prefix, kind) in PREFIXES {
        if let Some(friendly) = canonical.strip_prefix(prefix) {
            if !friendly.is_empty() {
                return (friendly, kind);
            }
        }
    }
    if canonical == STASH_REF {
        return (STASH_FRIENDLY, ReferenceType::Stash);
    }
    (canonical, ReferenceType::Unknown)
}

/// Inverse of [`decompose_canonical_name`].
///
/// `Head` and `Stash` ignore `friendly`; `Unknown` returns it as-is.
pub fn compose_canonical_name(friendly: &str, kind: ReferenceType) -> String {
    match kind {
        ReferenceType::Head => HEAD.to_string(),
        ReferenceType::Stash => STASH_REF.to_string(),
        ReferenceType::Unknown => friendly.to_string(),
        ReferenceType::Heads
        | ReferenceType::Remotes
        | ReferenceType::Tags
        | ReferenceType::Notes => {
            let prefix = kind.prefix().unwrap_or_default();
            format!("{prefix}{friendly}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_each_namespace() {
        let cases = vec![
            ("HEAD", "HEAD", ReferenceType::Head),
            ("refs/heads/main", "main", ReferenceType::Heads),
            ("refs/heads/feature/x", "feature/x", ReferenceType::Heads),
            ("refs/remotes/origin/main", "origin/main", ReferenceType::Remotes),
            ("refs/tags/v1.0", "v1.0", ReferenceType::Tags),
            ("refs/notes/commits", "commits", ReferenceType::Notes),
            ("refs/stash", "stash", ReferenceType::Stash),
            ("refs/pull/1/head", "refs/pull/1/head", ReferenceType::Unknown),
            ("refs/heads/", "refs/heads/", ReferenceType::Unknown),
            ("ORIG_HEAD", "ORIG_HEAD", ReferenceType::Unknown),
        ];
        for (canonical, friendly, kind) in cases {
            assert_eq!(
                decompose_canonical_name(canonical),
                (friendly, kind),
                "{canonical}"
            );
        }
    }

    #[test]
    fn composes_fixed_names() {
        assert_eq!(compose_canonical_name("anything", ReferenceType::Head), "HEAD");
        assert_eq!(compose_canonical_name("ignored", ReferenceType::Stash), "refs/stash");
        assert_eq!(
            compose_canonical_name("origin/dev", ReferenceType::Remotes),
            "refs/remotes/origin/dev"
        );
        assert_eq!(
            compose_canonical_name("refs/custom/x", ReferenceType::Unknown),
            "refs/custom/x"
        );
    }

    #[test]
    fn legality_of_unknown_names() {
        assert!(ReferenceType::Unknown.accepts_friendly_name("refs/pull/7/head"));
        assert!(!ReferenceType::Unknown.accepts_friendly_name("refs/heads/main"));
        assert!(!ReferenceType::Unknown.accepts_friendly_name("HEAD"));
        assert!(!ReferenceType::Heads.accepts_friendly_name(""));
    }
}
