//! Reference values and `git for-each-ref` parsing.

use crate::error::{ReferenceParseError, ReferenceResult};
use crate::reference_type::{decompose_canonical_name, ReferenceType};
use git_object_model::{Identifiable, ObjectId, ObjectType, StringInterner};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// `--format` argument matching [`parse_for_each_ref`].
pub const FOR_EACH_REF_FORMAT: &str =
    "--format=%(objectname)%00%(objecttype)%00%(*objectname)%00%(refname)";

const FIELD_COUNT: usize = 4;

/// A named pointer to an object.
///
/// Equality and ordering use the canonical name only.
#[derive(Debug, Clone, Serialize)]
pub struct Reference {
    canonical_name: Arc<str>,
    friendly_name: Arc<str>,
    reference_type: ReferenceType,
    object_id: ObjectId,
    object_type: ObjectType,
    #[serde(skip_serializing_if = "Option::is_none")]
    tip: Option<ObjectId>,
}

impl Reference {
    pub fn new(canonical_name: &str, object_id: ObjectId, object_type: ObjectType) -> Self {
        Self::new_in(canonical_name, object_id, object_type, None)
    }

    /// Like [`Reference::new`], sharing names through `interner`.
    pub fn new_in(
        canonical_name: &str,
        object_id: ObjectId,
        object_type: ObjectType,
        interner: Option<&StringInterner>,
    ) -> Self {
        let (friendly, reference_type) = decompose_canonical_name(canonical_name);
        let share = |value: &str| match interner {
            Some(interner) => interner.intern(value),
            None => Arc::from(value),
        };
        Self {
            canonical_name: share(canonical_name),
            friendly_name: share(friendly),
            reference_type,
            object_id,
            object_type,
            tip: None,
        }
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    pub fn reference_type(&self) -> ReferenceType {
        self.reference_type
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    /// Commit this reference ultimately points at, once tips are populated.
    pub fn tip(&self) -> Option<ObjectId> {
        self.tip
    }

    /// Whether `revision` is the hex id of the referenced object.
    pub fn matches_revision(&self, revision: &str) -> bool {
        ObjectId::from_hex(revision)
            .map(|id| id == self.object_id)
            .unwrap_or(false)
    }

    pub fn is_branch(&self) -> bool {
        matches!(
            self.reference_type,
            ReferenceType::Heads | ReferenceType::Remotes
        )
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name == other.canonical_name
    }
}

impl Eq for Reference {}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_name.as_bytes().cmp(other.canonical_name.as_bytes())
    }
}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical_name.hash(state);
    }
}

impl PartialEq<ObjectId> for Reference {
    fn eq(&self, other: &ObjectId) -> bool {
        self.object_id == *other
    }
}

impl Identifiable for Reference {
    fn id(&self) -> ObjectId {
        self.object_id
    }

    fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

/// Fill in tips from `tips` (keyed by canonical name).
///
/// Commits with no entry in `tips` are their own tip. References that
/// already carry a tip keep it.
pub fn populate_tips(
    references: Vec<Reference>,
    tips: &HashMap<String, ObjectId>,
) -> Vec<Reference> {
    references
        .into_iter()
        .map(|mut reference| {
            if reference.tip.is_none() {
                reference.tip = tips
                    .get(reference.canonical_name())
                    .copied()
                    .or_else(|| {
                        (reference.object_type == ObjectType::Commit)
                            .then_some(reference.object_id)
                    });
            }
            reference
        })
        .collect()
}

/// Output of [`parse_for_each_ref`]: references plus peeled tag targets.
#[derive(Debug, Clone, Default)]
pub struct RefListing {
    pub references: Vec<Reference>,
    /// Canonical name to peeled object id, for annotated tags.
    pub peeled: HashMap<String, ObjectId>,
}

impl RefListing {
    /// References sorted by canonical name with tips populated.
    pub fn into_references(self) -> Vec<Reference> {
        let mut references = populate_tips(self.references, &self.peeled);
        references.sort();
        references
    }
}

/// Parse output produced with [`FOR_EACH_REF_FORMAT`].
pub fn parse_for_each_ref(
    output: &str,
    interner: Option<&StringInterner>,
) -> ReferenceResult<RefListing> {
    let mut listing = RefListing::default();

    for (line, record) in output.lines().filter(|l| !l.is_empty()).enumerate() {
        let fields: Vec<&str> = record.split('\0').collect();
        if fields.len() != FIELD_COUNT {
            return Err(ReferenceParseError::FieldCount {
                line,
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let object_id = ObjectId::from_hex(fields[0])
            .map_err(|source| ReferenceParseError::ObjectId { line, source })?;
        let object_type =
            ObjectType::parse(fields[1]).ok_or_else(|| ReferenceParseError::ObjectType {
                line,
                value: fields[1].to_string(),
            })?;
        let name = fields[3];
        if name.is_empty() {
            return Err(ReferenceParseError::EmptyName { line });
        }
        if !fields[2].is_empty() {
            let peeled = ObjectId::from_hex(fields[2])
                .map_err(|source| ReferenceParseError::ObjectId { line, source })?;
            listing.peeled.insert(name.to_string(), peeled);
        }

        listing
            .references
            .push(Reference::new_in(name, object_id, object_type, interner));
    }

    debug!(
        references = listing.references.len(),
        peeled = listing.peeled.len(),
        "Parsed for-each-ref output"
    );

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";
    const B: &str = "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391";
    const T: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    fn id(hex: &str) -> ObjectId {
        ObjectId::from_hex(hex).unwrap()
    }

    #[test]
    fn equality_ignores_everything_but_the_name() {
        let a = Reference::new("refs/heads/main", id(A), ObjectType::Commit);
        let b = Reference::new("refs/heads/main", id(B), ObjectType::Commit);
        assert_eq!(a, b);
        assert_eq!(a, id(A));
        assert!(a.matches_revision(&A.to_uppercase()));
        assert!(!a.matches_revision("main"));
    }

    #[test]
    fn ordering_is_ordinal() {
        let mut refs = vec![
            Reference::new("refs/tags/v1", id(A), ObjectType::Commit),
            Reference::new("refs/heads/Zeta", id(A), ObjectType::Commit),
            Reference::new("HEAD", id(A), ObjectType::Commit),
            Reference::new("refs/heads/alpha", id(A), ObjectType::Commit),
        ];
        refs.sort();
        let names: Vec<_> = refs.iter().map(|r| r.canonical_name()).collect();
        assert_eq!(
            names,
            vec!["HEAD", "refs/heads/Zeta", "refs/heads/alpha", "refs/tags/v1"]
        );
    }

    #[test]
    fn parses_records_and_peels_tags() {
        let output = format!(
            "{A}\0commit\0\0refs/heads/main\n{T}\0tag\0{B}\0refs/tags/v1.0\n{A}\0commit\0\0refs/stash\n"
        );
        let listing = parse_for_each_ref(&output, None).unwrap();
        assert_eq!(listing.references.len(), 3);
        assert_eq!(listing.peeled.get("refs/tags/v1.0"), Some(&id(B)));

        let refs = listing.into_references();
        let tag = refs.iter().find(|r| r.friendly_name() == "v1.0").unwrap();
        assert_eq!(tag.reference_type(), ReferenceType::Tags);
        assert_eq!(tag.object_type(), ObjectType::Tag);
        assert_eq!(tag.tip(), Some(id(B)));

        let main = refs.iter().find(|r| r.friendly_name() == "main").unwrap();
        assert_eq!(main.tip(), Some(id(A)));
        assert!(main.is_branch());

        let stash = refs.iter().find(|r| r.reference_type() == ReferenceType::Stash).unwrap();
        assert_eq!(stash.friendly_name(), "stash");
    }

    #[test]
    fn populate_tips_keeps_existing_tip() {
        let tips = HashMap::from([("refs/tags/v1".to_string(), id(B))]);
        let first = populate_tips(
            vec![Reference::new("refs/tags/v1", id(T), ObjectType::Tag)],
            &tips,
        );
        let changed = HashMap::from([("refs/tags/v1".to_string(), id(A))]);
        let second = populate_tips(first, &changed);
        assert_eq!(second[0].tip(), Some(id(B)));
    }

    #[test]
    fn non_commit_without_peel_has_no_tip() {
        let refs = populate_tips(
            vec![Reference::new("refs/tags/tree-tag", id(T), ObjectType::Tree)],
            &HashMap::new(),
        );
        assert_eq!(refs[0].tip(), None);
    }

    #[test]
    fn malformed_records_are_rejected() {
        let err = parse_for_each_ref("abc\0commit\n", None).unwrap_err();
        assert!(matches!(err, ReferenceParseError::FieldCount { found: 2, .. }));

        let err = parse_for_each_ref(&format!("{A}\0widget\0\0refs/heads/x\n"), None).unwrap_err();
        assert_eq!(err.code(), "reference_object_type");

        let err = parse_for_each_ref("zz\0commit\0\0refs/heads/x\n", None).unwrap_err();
        assert!(matches!(err, ReferenceParseError::ObjectId { line: 0, .. }));
    }

    #[test]
    fn interner_shares_canonical_names() {
        let interner = StringInterner::new();
        let output = format!("{A}\0commit\0\0refs/heads/main\n");
        let first = parse_for_each_ref(&output, Some(&interner)).unwrap();
        let second = parse_for_each_ref(&output, Some(&interner)).unwrap();
        assert!(Arc::ptr_eq(
            &first.references[0].canonical_name,
            &second.references[0].canonical_name
        ));
    }

    #[test]
    fn serializes_names_and_tip() {
        let refs = populate_tips(
            vec![Reference::new("refs/heads/main", id(A), ObjectType::Commit)],
            &HashMap::new(),
        );
        let json = serde_json::to_value(&refs[0]).unwrap();
        assert_eq!(json["friendly_name"], "main");
        assert_eq!(json["reference_type"], "heads");
        assert_eq!(json["tip"], A);
    }
}
