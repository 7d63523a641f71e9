//! # Git Reference Model
//!
//! Canonical reference names (`refs/heads/main`) decomposed into a friendly
//! name (`main`) and a [`ReferenceType`], plus the [`Reference`] value built
//! from `git for-each-ref` output.
//!
//! ```text
//! canonical ──decompose──► (friendly, type) ──compose──► canonical
//! ```
//!
//! For every legal pair the round trip is the identity.
//!
//! ## Tips
//!
//! A reference's tip is the commit it ultimately points at. It is absent
//! after parsing and filled exactly once by [`populate_tips`] (or
//! [`RefListing::into_references`]); there is no setter.

mod error;
mod reference;
mod reference_type;

pub use error::{ReferenceParseError, ReferenceResult};
pub use reference::{
    parse_for_each_ref, populate_tips, RefListing, Reference, FOR_EACH_REF_FORMAT,
};
pub use reference_type::{
    compose_canonical_name, decompose_canonical_name, ReferenceType, HEAD, STASH_FRIENDLY,
    STASH_REF,
};
