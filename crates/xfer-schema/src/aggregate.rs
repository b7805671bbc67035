//! # Violation Aggregation
//!
//! Collects per-field violation lists into the flat, ordered list a
//! caller sees. Order is field declaration order, then constraint order
//! within a field; nested records contribute their violations at the
//! position of the referencing field. `NestedInvalid` carriers are
//! dissolved here, so a report only ever holds leaf violations with fully
//! qualified paths.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use xfer_core::{Violation, ViolationKind};

/// Flatten per-field violation lists, preserving order.
pub fn collect<I>(per_field: I) -> Vec<Violation>
where
    I: IntoIterator<Item = Vec<Violation>>,
{
    per_field
        .into_iter()
        .flatten()
        .flat_map(Violation::flatten)
        .collect()
}

/// The violations of a rejected payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    violations: Vec<Violation>,
    /// Number of violations dropped by a `max_violations` policy.
    #[serde(skip_serializing_if = "is_zero")]
    truncated: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ValidationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            truncated: 0,
        }
    }

    /// Returns the number of (retained) violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// How many violations were dropped by truncation.
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Keep at most `max` violations. Returns the number dropped by this call.
    pub fn truncate(&mut self, max: usize) -> usize {
        let dropped = self.violations.len().saturating_sub(max);
        self.violations.truncate(max);
        self.truncated += dropped;
        dropped
    }

    /// Violation counts per kind.
    pub fn count_by_kind(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        if self.truncated > 0 {
            write!(f, "\n  ... {} more violation(s) not shown", self.truncated)?;
        }
        Ok(())
    }
}
