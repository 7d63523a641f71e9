mod common;

use common::{friendly_name, legal_pair};
use git_reference_model::{compose_canonical_name, decompose_canonical_name, ReferenceType};
use proptest::prelude::*;

proptest! {
    #[test]
    fn compose_then_decompose_is_identity((name, kind) in legal_pair()) {
        prop_assume!(kind.accepts_friendly_name(&name));
        let canonical = compose_canonical_name(&name, kind);
        let (friendly, decomposed) = decompose_canonical_name(&canonical);
        prop_assert_eq!(friendly, name.as_str());
        prop_assert_eq!(decomposed, kind);
    }

    #[test]
    fn decompose_then_compose_is_identity(name in friendly_name(), prefix in prop::sample::select(vec![
        "refs/heads/", "refs/remotes/", "refs/tags/", "refs/notes/", "refs/", "",
    ])) {
        let canonical = format!("{prefix}{name}");
        let (friendly, kind) = decompose_canonical_name(&canonical);
        prop_assert_eq!(compose_canonical_name(friendly, kind), canonical);
    }

    #[test]
    fn unknown_names_pass_through(name in "refs/pull/[0-9]{1,4}/head") {
        prop_assert_eq!(decompose_canonical_name(&name), (name.as_str(), ReferenceType::Unknown));
    }
}

#[test]
fn fixed_names_round_trip() {
    for canonical in ["HEAD", "refs/stash"] {
        let (friendly, kind) = decompose_canonical_name(canonical);
        assert_eq!(compose_canonical_name(friendly, kind), canonical);
    }
}
