//! SHA-1 object identifiers.

use crate::error::{ObjectParseError, ObjectResult, ParseTag};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte git object id. Ordering is byte-wise.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    /// Raw length in bytes.
    pub const LEN: usize = 20;
    /// Length of the hex form.
    pub const HEX_LEN: usize = 40;
    /// The all-zero id git uses for "no object".
    pub const ZERO: ObjectId = ObjectId([0; Self::LEN]);

    pub fn new(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Build from a raw 20-byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; Self::LEN] = bytes.try_into().ok()?;
        Some(Self(raw))
    }

    /// Parse a 40-character hex id (either case).
    pub fn from_hex(text: &str) -> ObjectResult<Self> {
        let text = text.trim();
        if text.len() != Self::HEX_LEN {
            return Err(ObjectParseError::new(ParseTag::ObjectId, 0));
        }
        let mut raw = [0u8; Self::LEN];
        hex::decode_to_slice(text, &mut raw)
            .map_err(|_| ObjectParseError::new(ParseTag::ObjectId, 0))?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex form, usable anywhere git accepts a revision.
    pub fn revision_text(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form, clamped to the full length.
    pub fn short(&self, len: usize) -> String {
        let mut text = self.revision_text();
        text.truncate(len.min(Self::HEX_LEN));
        text
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; Self::LEN]
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.revision_text())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.revision_text())
    }
}

impl FromStr for ObjectId {
    type Err = ObjectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.revision_text())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "3b18e512dba79e4c8300dd08aeb37f8e728b8dad";

    #[test]
    fn hex_round_trip_is_lowercase() {
        let id = ObjectId::from_hex(&HEX.to_uppercase()).unwrap();
        assert_eq!(id.revision_text(), HEX);
        assert_eq!(id.to_string(), HEX);
        assert_eq!(id.short(7), "3b18e51");
        assert_eq!(id.short(99).len(), ObjectId::HEX_LEN);
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(ObjectId::from_hex("abc").is_err());
        assert!(ObjectId::from_hex(&"zz".repeat(20)).is_err());
        let err = "nope".parse::<ObjectId>().unwrap_err();
        assert_eq!(err.tag, ParseTag::ObjectId);
    }

    #[test]
    fn ordering_is_bytewise() {
        let low = ObjectId::new([0x01; 20]);
        let mut high_bytes = [0x01; 20];
        high_bytes[0] = 0xff;
        let high = ObjectId::new(high_bytes);
        assert!(low < high);
        assert!(ObjectId::ZERO < low);
        assert!(ObjectId::ZERO.is_zero());
    }

    #[test]
    fn from_bytes_requires_exact_length() {
        assert!(ObjectId::from_bytes(&[0u8; 19]).is_none());
        assert!(ObjectId::from_bytes(&[7u8; 20]).is_some());
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = ObjectId::from_hex(HEX).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{HEX}\""));
        let back: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
