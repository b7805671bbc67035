//! # Violation Vocabulary
//!
//! A `Violation` is one failed constraint against one field. Violations
//! are values, not errors: the validation engine accumulates them and
//! returns the complete list instead of stopping at the first failure.
//!
//! `NestedInvalid` is the one structural kind. It is produced when a
//! nested record fails and carries the child violations instead of a
//! message of its own. Reports handed to callers are flattened, so only
//! leaf kinds appear in them.

use serde::{Deserialize, Serialize};

use crate::path::FieldPath;

/// Kind of constraint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is absent, null, or blank.
    MissingRequired,
    /// Text is longer than the declared maximum (in Unicode scalars).
    LengthExceeded,
    /// Text does not fully match the declared pattern or date shape.
    PatternMismatch,
    /// A numeric value is zero or negative.
    NotPositive,
    /// A numeric value has too many integral or fractional digits.
    DigitsExceeded,
    /// The value could not be coerced to its canonical type.
    InvalidValue,
    /// A nested record failed validation.
    NestedInvalid,
}

impl ViolationKind {
    /// Stable identifier used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequired => "missing_required",
            Self::LengthExceeded => "length_exceeded",
            Self::PatternMismatch => "pattern_mismatch",
            Self::NotPositive => "not_positive",
            Self::DigitsExceeded => "digits_exceeded",
            Self::InvalidValue => "invalid_value",
            Self::NestedInvalid => "nested_invalid",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported failure of a single constraint against a single field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the violating field.
    pub path: FieldPath,
    /// Which constraint failed.
    pub kind: ViolationKind,
    /// Rendered, human-readable message. Empty for `NestedInvalid`.
    pub message: String,
    /// Child violations, only populated for `NestedInvalid`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Violation>,
}

impl Violation {
    /// Create a leaf violation.
    pub fn new(path: FieldPath, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
            children: Vec::new(),
        }
    }

    /// Wrap the violations of a failed nested record reached at `path`.
    ///
    /// Child paths are expected to be relative to the nested record and are
    /// re-based under `path` here.
    pub fn nested(path: FieldPath, children: Vec<Violation>) -> Self {
        let children = children.into_iter().map(|c| c.rebased(&path)).collect();
        Self {
            path,
            kind: ViolationKind::NestedInvalid,
            message: String::new(),
            children,
        }
    }

    /// Returns this violation (and its children) re-based under `prefix`.
    pub fn rebased(self, prefix: &FieldPath) -> Self {
        Self {
            path: self.path.rebase(prefix),
            kind: self.kind,
            message: self.message,
            children: self
                .children
                .into_iter()
                .map(|c| c.rebased(prefix))
                .collect(),
        }
    }

    /// Returns true if this violation is a leaf (not `NestedInvalid`).
    pub fn is_leaf(&self) -> bool {
        self.kind != ViolationKind::NestedInvalid
    }

    /// Flatten into leaf violations, depth-first, preserving order.
    pub fn flatten(self) -> Vec<Violation> {
        if self.is_leaf() {
            return vec![self];
        }
        self.children.into_iter().flat_map(Violation::flatten).collect()
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_leaf() {
            write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
        } else {
            write!(
                f,
                "{} [{}]: {} nested violation(s)",
                self.path,
                self.kind,
                self.children.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_rebases_children() {
        let child = Violation::new(
            FieldPath::field("addressPostCode"),
            ViolationKind::LengthExceeded,
            "length must not exceed 16 characters",
        );
        let inner = Violation::nested(FieldPath::field("addressInfo"), vec![child]);
        let outer = Violation::nested(FieldPath::field("cdtr"), vec![inner]);

        let leaves = outer.flatten();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].path.to_string(), "cdtr.addressInfo.addressPostCode");
        assert_eq!(leaves[0].kind, ViolationKind::LengthExceeded);
    }

    #[test]
    fn flatten_preserves_order() {
        let a = Violation::new(FieldPath::field("account"), ViolationKind::MissingRequired, "a");
        let b = Violation::new(FieldPath::field("nameEn"), ViolationKind::MissingRequired, "b");
        let leaves = Violation::nested(FieldPath::field("dbtr"), vec![a, b]).flatten();
        let paths: Vec<String> = leaves.iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["dbtr.account", "dbtr.nameEn"]);
    }

    #[test]
    fn display_includes_path_kind_and_message() {
        let v = Violation::new(
            FieldPath::field("amount"),
            ViolationKind::NotPositive,
            "must be greater than 0",
        );
        assert_eq!(v.to_string(), "amount [not_positive]: must be greater than 0");
    }

    #[test]
    fn leaf_serialization_omits_children() {
        let v = Violation::new(FieldPath::field("date"), ViolationKind::InvalidValue, "bad");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["path"], "date");
        assert_eq!(json["kind"], "invalid_value");
        assert!(json.get("children").is_none());
    }
}
