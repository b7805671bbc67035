//! # Node Schemas
//!
//! A `NodeSchema` is the declarative description of one record: an
//! identifier plus its field descriptors in declaration order. Schemas
//! refer to each other by [`SchemaId`] and live in a
//! [`SchemaRegistry`](crate::registry::SchemaRegistry) arena, so a tree of
//! nested records never needs owned back-references.
//!
//! Validation of a node evaluates every declared field, in order, against
//! the payload object. Unknown payload keys are ignored. The outcome is
//! either an accepted [`CanonicalRecord`] or a non-empty list of
//! violations, never both.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use xfer_core::{CanonicalRecord, Violation};

use crate::aggregate;
use crate::descriptor::FieldDescriptor;
use crate::engine::EvalContext;

/// Identifier of a node schema within a registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SchemaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SchemaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Result of validating one record.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeOutcome {
    /// Every field passed; the canonical record holds all present fields.
    Accepted(CanonicalRecord),
    /// At least one violation, with paths relative to this record.
    Rejected(Vec<Violation>),
}

impl NodeOutcome {
    /// Build an outcome from collected parts. The record is kept only
    /// when no violation was reported.
    pub fn from_parts(violations: Vec<Violation>, record: CanonicalRecord) -> Self {
        if violations.is_empty() {
            Self::Accepted(record)
        } else {
            Self::Rejected(violations)
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Violations reported for this record (empty when accepted).
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Accepted(_) => &[],
            Self::Rejected(v) => v,
        }
    }
}

/// Declarative description of one record type.
#[derive(Debug, Clone)]
pub struct NodeSchema {
    id: SchemaId,
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
}

impl NodeSchema {
    pub fn new(id: impl Into<SchemaId>) -> Self {
        Self {
            id: id.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    /// Append a field. Declaration order is evaluation and report order.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by wire name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Validate a decoded payload value. A value that is not an object
    /// is validated as an empty object: every field is absent.
    pub fn validate_value(&self, payload: &Value, ctx: &EvalContext<'_>) -> NodeOutcome {
        match payload {
            Value::Object(map) => self.validate(map, ctx),
            _ => self.validate(&Map::new(), ctx),
        }
    }

    /// Validate a payload object against every declared field.
    pub fn validate(&self, payload: &Map<String, Value>, ctx: &EvalContext<'_>) -> NodeOutcome {
        let mut record = CanonicalRecord::new(self.id.as_str());
        let mut per_field = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let outcome = field.evaluate(payload.get(field.name()), ctx);
            if let Some(value) = outcome.value {
                record.insert(field.name(), value);
            }
            per_field.push(outcome.violations);
        }

        NodeOutcome::from_parts(aggregate::collect(per_field), record)
    }
}
