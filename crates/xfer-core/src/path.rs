//! # Field Paths
//!
//! Dot-separated paths that locate a field inside a nested payload,
//! e.g. `cdtr.addressInfo.addressPostCode`.
//!
//! Paths are built bottom-up: a sub-schema reports violations relative to
//! its own root, and the parent re-bases them by prefixing the field name
//! under which the sub-schema was reached.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A dotted path to a payload field.
///
/// The empty path denotes the root of the record being validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The root path (no segments).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A single-segment path.
    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Parse a dotted path. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns this path re-based under `prefix`.
    pub fn rebase(&self, prefix: &FieldPath) -> Self {
        let mut segments = Vec::with_capacity(prefix.0.len() + self.0.len());
        segments.extend(prefix.0.iter().cloned());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.join("."))
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
