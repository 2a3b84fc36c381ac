use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Content hash identifying an object in the store.
///
/// Thin newtype over `git2::Oid`: total lexicographic order over the raw
/// bytes, usable as a map/set key, serialized as the 40-char hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub git2::Oid);

impl CommitId {
    pub fn raw(&self) -> git2::Oid {
        self.0
    }

    /// Abbreviated hex form for display, like `git log --oneline`.
    pub fn short(&self) -> String {
        let hex = self.to_string();
        hex[..7].to_string()
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        CommitId(oid)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CommitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        git2::Oid::from_str(s)
            .map(CommitId)
            .map_err(|_| Error::InvalidRevision(s.to_string()))
    }
}

impl Serialize for CommitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CommitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(&s), &"a 40-char hex object id")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_roundtrip() {
        let hex = "0123456789abcdef0123456789abcdef01234567";
        let id: CommitId = hex.parse().unwrap();
        assert_eq!(id.to_string(), hex);
        assert_eq!(id.short(), "0123456");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", hex));
        let back: CommitId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("not-a-sha".parse::<CommitId>().is_err());
        let bad: Result<CommitId, _> = serde_json::from_str("\"xyz\"");
        assert!(bad.is_err());
    }

    #[test]
    fn ordering_is_lexicographic_over_bytes() {
        let a: CommitId = "0000000000000000000000000000000000000001".parse().unwrap();
        let b: CommitId = "0000000000000000000000000000000000000002".parse().unwrap();
        assert!(a < b);
        assert_eq!(a, a);
    }
}
