#![allow(dead_code)]

use git_reference_model::ReferenceType;
use proptest::prelude::*;

/// Path-like reference names: one or more slash-separated segments.
pub fn friendly_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9._-]{1,12}", 1..4).prop_map(|parts| parts.join("/"))
}

pub fn reference_type() -> impl Strategy<Value = ReferenceType> {
    prop::sample::select(ReferenceType::ALL.to_vec())
}

/// A (friendly name, type) pair the composition law applies to.
pub fn legal_pair() -> impl Strategy<Value = (String, ReferenceType)> {
    (friendly_name(), reference_type()).prop_map(|(name, kind)| match kind {
        ReferenceType::Head => ("HEAD".to_string(), kind),
        ReferenceType::Stash => ("stash".to_string(), kind),
        _ => (name, kind),
    })
}
