//! # Validation Engine
//!
//! Entry point that runs a payload through the root schema of a
//! [`SchemaRegistry`] and returns either the canonical record or the full
//! ordered list of violations.
//!
//! ## Engine Policy
//!
//! [`EnginePolicy`] tunes an engine without touching schemas:
//!
//! - `max_violations` caps the reported list (the prefix is kept, the
//!   dropped count is recorded on the report);
//! - `disabled` switches off constraint kinds globally. `Required` and
//!   `Nested` cannot be disabled.
//!
//! A policy is validated when it is constructed. After that, running the
//! engine cannot fail.
//!
//! ## Concurrency
//!
//! `ValidationEngine` holds the registry behind an `Arc` and carries no
//! mutable state, so one engine (or clones of it) can serve any number of
//! threads.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{Map, Value};
use xfer_core::{CanonicalRecord, FieldPath, Violation, ViolationKind};

use crate::aggregate::ValidationReport;
use crate::constraint::ConstraintKind;
use crate::error::PolicyError;
use crate::registry::SchemaRegistry;
use crate::schema::{NodeOutcome, SchemaId};

/// Engine tuning: report cap and globally disabled constraint kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnginePolicy {
    max_violations: Option<usize>,
    disabled: BTreeSet<ConstraintKind>,
}

impl EnginePolicy {
    /// Build a policy.
    ///
    /// # Errors
    ///
    /// - `PolicyError::ZeroMaxViolations` for `Some(0)`.
    /// - `PolicyError::NotDisableable` if `Required` or `Nested` is listed.
    pub fn new(
        max_violations: Option<usize>,
        disabled: impl IntoIterator<Item = ConstraintKind>,
    ) -> Result<Self, PolicyError> {
        if max_violations == Some(0) {
            return Err(PolicyError::ZeroMaxViolations);
        }
        let disabled: BTreeSet<ConstraintKind> = disabled.into_iter().collect();
        if let Some(kind) = disabled.iter().find(|k| !k.is_disableable()) {
            return Err(PolicyError::NotDisableable(*kind));
        }
        Ok(Self {
            max_violations,
            disabled,
        })
    }

    /// Parse a comma-separated list of constraint kind names, as accepted
    /// by `XFER_DISABLED_CONSTRAINTS`. Blank entries are ignored.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::UnknownKind` for an unrecognized name.
    pub fn parse_kinds(list: &str) -> Result<Vec<ConstraintKind>, PolicyError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Returns false if policy switched `kind` off.
    pub fn is_enabled(&self, kind: ConstraintKind) -> bool {
        !self.disabled.contains(&kind)
    }

    pub fn max_violations(&self) -> Option<usize> {
        self.max_violations
    }

    pub fn disabled(&self) -> impl Iterator<Item = ConstraintKind> + '_ {
        self.disabled.iter().copied()
    }
}

/// Shared, read-only state threaded through one validation run.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    registry: &'a SchemaRegistry,
    policy: &'a EnginePolicy,
}

impl<'a> EvalContext<'a> {
    pub fn new(registry: &'a SchemaRegistry, policy: &'a EnginePolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &'a SchemaRegistry {
        self.registry
    }

    pub fn policy(&self) -> &'a EnginePolicy {
        self.policy
    }

    /// Validate a nested object against the schema `id`.
    ///
    /// A built registry resolves every reference; an id missing from the
    /// registry is reported as an `InvalidValue` on the nested record
    /// rather than aborting the run.
    pub fn validate_nested(&self, id: &SchemaId, payload: &Map<String, Value>) -> NodeOutcome {
        match self.registry.get(id) {
            Some(schema) => {
                tracing::trace!(schema = %id, "descending into nested record");
                schema.validate(payload, self)
            }
            None => {
                tracing::warn!(schema = %id, "nested schema not found in registry");
                NodeOutcome::Rejected(vec![Violation::new(
                    FieldPath::root(),
                    ViolationKind::InvalidValue,
                    format!("schema '{id}' is not registered"),
                )])
            }
        }
    }
}

/// Outcome of validating one payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// The payload satisfied every constraint.
    Valid(CanonicalRecord),
    /// At least one violation; never empty.
    Invalid(ValidationReport),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The canonical record, if valid.
    pub fn record(&self) -> Option<&CanonicalRecord> {
        match self {
            Self::Valid(r) => Some(r),
            Self::Invalid(_) => None,
        }
    }

    /// The violation report, if invalid.
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(r) => Some(r),
        }
    }

    /// Convert into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<CanonicalRecord, ValidationReport> {
        match self {
            Self::Valid(r) => Ok(r),
            Self::Invalid(r) => Err(r),
        }
    }
}

/// A registry plus a policy, ready to validate payloads.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    registry: Arc<SchemaRegistry>,
    policy: EnginePolicy,
}

impl ValidationEngine {
    /// Engine with the default policy (no cap, nothing disabled).
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            policy: EnginePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: EnginePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Validate a decoded payload against the root schema.
    pub fn run(&self, payload: &Value) -> ValidationResult {
        run_with_policy(&self.registry, &self.policy, payload)
    }
}

/// Validate `payload` against the registry's root schema with the
/// default policy.
pub fn run(registry: &SchemaRegistry, payload: &Value) -> ValidationResult {
    run_with_policy(registry, &EnginePolicy::default(), payload)
}

/// Validate `payload` against the registry's root schema under `policy`.
pub fn run_with_policy(
    registry: &SchemaRegistry,
    policy: &EnginePolicy,
    payload: &Value,
) -> ValidationResult {
    let root = registry.root();
    let ctx = EvalContext::new(registry, policy);
    match root.validate_value(payload, &ctx) {
        NodeOutcome::Accepted(record) => {
            tracing::debug!(schema = %root.id(), fields = record.len(), "payload accepted");
            ValidationResult::Valid(record)
        }
        NodeOutcome::Rejected(violations) => {
            let mut report = ValidationReport::new(violations);
            if let Some(max) = policy.max_violations() {
                let dropped = report.truncate(max);
                if dropped > 0 {
                    tracing::warn!(schema = %root.id(), kept = max, dropped, "violation report truncated");
                }
            }
            tracing::debug!(schema = %root.id(), violations = report.len(), "payload rejected");
            ValidationResult::Invalid(report)
        }
    }
}
