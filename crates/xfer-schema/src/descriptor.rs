//! # Field Descriptors
//!
//! A `FieldDescriptor` binds a wire key to its ordered constraints and to
//! the canonical type its value is coerced into. Evaluation never stops
//! at the first failing constraint: every applicable violation on the
//! field is reported, and coercion only runs once all constraints pass.
//!
//! ## Absent values
//!
//! An absent value (missing key, `null`, a list, or an object where a
//! scalar is expected and vice versa) short-circuits: a required field
//! yields exactly one `MissingRequired`, an optional field yields nothing
//! and is omitted from the canonical record. The same holds for blank
//! text on a required field.
//!
//! ## Coercion
//!
//! | Target    | Canonical value               | On failure                        |
//! |-----------|-------------------------------|-----------------------------------|
//! | `Text`    | text as received              | n/a                               |
//! | `Decimal` | exact `rust_decimal::Decimal` | `InvalidValue`, numeric checks skipped |
//! | `Date`    | `chrono::NaiveDate`           | `InvalidValue` (e.g. `2024-02-30`) |
//! | `Record`  | nested `CanonicalRecord`      | child violations, re-based        |

use serde_json::Value;
use xfer_core::{CanonicalValue, FieldPath, Violation, ViolationKind};

use crate::constraint::{parse_decimal, Check, Constraint, DateFormat, Pattern, Observed, RawValue};
use crate::engine::EvalContext;
use crate::error::SchemaDefinitionError;
use crate::schema::{NodeOutcome, SchemaId};

/// Canonical type a field coerces into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Decimal,
    Date(DateFormat),
    /// Nested record described by another node schema.
    Record(SchemaId),
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Decimal => f.write_str("decimal"),
            Self::Date(d) => write!(f, "date({})", d.label()),
            Self::Record(id) => write!(f, "record({id})"),
        }
    }
}

/// The result of evaluating one field.
#[derive(Debug, Default)]
pub struct FieldOutcome {
    /// Violations, with paths relative to the enclosing record.
    pub violations: Vec<Violation>,
    /// The coerced value; `None` when rejected or absent-and-optional.
    pub value: Option<CanonicalValue>,
}

impl FieldOutcome {
    fn rejected(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            value: None,
        }
    }

    fn accepted(value: CanonicalValue) -> Self {
        Self {
            violations: Vec::new(),
            value: Some(value),
        }
    }
}

/// Declarative description of one field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    constraints: Vec<Constraint>,
    target: FieldType,
    optional: bool,
    description: Option<String>,
}

impl FieldDescriptor {
    fn with_target(name: impl Into<String>, target: FieldType) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
            target,
            optional: true,
            description: None,
        }
    }

    /// An optional text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_target(name, FieldType::Text)
    }

    /// An optional decimal field.
    pub fn decimal(name: impl Into<String>) -> Self {
        Self::with_target(name, FieldType::Decimal)
    }

    /// An optional date field; carries the matching `DateFormat` constraint.
    pub fn date(name: impl Into<String>, format: DateFormat) -> Self {
        let mut d = Self::with_target(name, FieldType::Date(format));
        d.constraints.push(Constraint::DateFormat(format));
        d
    }

    /// An optional nested record; carries the matching `Nested` constraint.
    pub fn record(name: impl Into<String>, schema: impl Into<SchemaId>) -> Self {
        let schema = schema.into();
        let mut d = Self::with_target(name, FieldType::Record(schema.clone()));
        d.constraints.push(Constraint::Nested(schema));
        d
    }

    /// Mark the field required. Keeps the optionality flag and the
    /// `Required` constraint in agreement.
    pub fn required(mut self) -> Self {
        if self.optional {
            self.optional = false;
            self.constraints.insert(0, Constraint::Required);
        }
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.constraints.push(Constraint::MaxLength(max));
        self
    }

    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.constraints.push(Constraint::Pattern(pattern));
        self
    }

    pub fn positive(mut self) -> Self {
        self.constraints.push(Constraint::Positive);
        self
    }

    pub fn digits(mut self, integer: u32, fraction: u32) -> Self {
        self.constraints.push(Constraint::Digits { integer, fraction });
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Wire key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Canonical target type.
    pub fn target(&self) -> &FieldType {
        &self.target
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Nested schema this field references, if any.
    pub fn nested_schema(&self) -> Option<&SchemaId> {
        match &self.target {
            FieldType::Record(id) => Some(id),
            _ => None,
        }
    }

    /// Verify the structural rules a descriptor must satisfy.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError::InvalidDescriptor` naming the rule.
    pub fn check_invariants(&self, schema: &SchemaId) -> Result<(), SchemaDefinitionError> {
        let invalid = |reason: &str| SchemaDefinitionError::InvalidDescriptor {
            schema: schema.to_string(),
            field: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("field name must not be empty"));
        }

        let required = self
            .constraints
            .iter()
            .filter(|c| matches!(c, Constraint::Required))
            .count();
        if required > 1 {
            return Err(invalid("declares Required more than once"));
        }
        if self.optional == (required == 1) {
            return Err(invalid(
                "optionality flag and Required constraint disagree",
            ));
        }

        let nested: Vec<&SchemaId> = self
            .constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::Nested(id) => Some(id),
                _ => None,
            })
            .collect();

        for c in &self.constraints {
            let fits = match (c, &self.target) {
                (Constraint::Required, _) => true,
                (Constraint::MaxLength(_) | Constraint::Pattern(_), FieldType::Record(_)) => false,
                (Constraint::MaxLength(_) | Constraint::Pattern(_), _) => true,
                (Constraint::Positive | Constraint::Digits { .. }, FieldType::Decimal) => true,
                (Constraint::Positive | Constraint::Digits { .. }, _) => false,
                (Constraint::DateFormat(f), FieldType::Date(target)) => f == target,
                (Constraint::DateFormat(_), _) => false,
                (Constraint::Nested(id), FieldType::Record(target)) => id == target,
                (Constraint::Nested(_), _) => false,
            };
            if !fits {
                return Err(invalid(&format!(
                    "constraint {c} does not apply to a {} field",
                    self.target
                )));
            }
        }

        if matches!(self.target, FieldType::Record(_)) && nested.len() != 1 {
            return Err(invalid("record fields carry exactly one Nested constraint"));
        }

        Ok(())
    }

    /// Evaluate the field's raw value.
    ///
    /// Violation paths are relative to the enclosing record (the first
    /// segment is this field's name).
    pub fn evaluate(&self, raw: Option<&Value>, ctx: &EvalContext<'_>) -> FieldOutcome {
        let path = FieldPath::field(&self.name);
        let raw = self.narrow(RawValue::from_json(raw));

        // Required is evaluated first and alone; nothing else is meaningful
        // against an absent or blank value.
        if let Some(required) = self.constraints.iter().find(|c| matches!(c, Constraint::Required)) {
            let observed = Observed {
                raw: raw.clone(),
                number: None,
            };
            if let Check::Fail { kind, message } = required.check(&observed, ctx) {
                return FieldOutcome::rejected(vec![Violation::new(path, kind, message)]);
            }
        }
        if raw.is_absent() {
            return FieldOutcome::default();
        }

        let number = match self.target {
            FieldType::Decimal => raw.text().and_then(parse_decimal),
            _ => None,
        };
        let observed = Observed { raw, number };

        let mut violations = Vec::new();
        let mut nested_record = None;
        for constraint in &self.constraints {
            if matches!(constraint, Constraint::Required) || !ctx.policy().is_enabled(constraint.kind()) {
                continue;
            }
            match constraint.check(&observed, ctx) {
                Check::Pass => {}
                Check::Fail { kind, message } => {
                    violations.push(Violation::new(path.clone(), kind, message));
                }
                Check::Nested(NodeOutcome::Accepted(record)) => nested_record = Some(record),
                Check::Nested(NodeOutcome::Rejected(children)) => {
                    violations.push(Violation::nested(path.clone(), children));
                }
            }
        }
        if !violations.is_empty() {
            return FieldOutcome::rejected(violations);
        }

        match self.coerce(&observed, nested_record) {
            Ok(value) => FieldOutcome::accepted(value),
            Err(message) => FieldOutcome::rejected(vec![Violation::new(
                path,
                ViolationKind::InvalidValue,
                message,
            )]),
        }
    }

    /// Values of the wrong shape for the target count as absent.
    fn narrow<'a>(&self, raw: RawValue<'a>) -> RawValue<'a> {
        match (&self.target, raw) {
            (FieldType::Record(_), RawValue::Text(_)) => RawValue::Absent,
            (FieldType::Record(_), raw) => raw,
            (_, RawValue::Object(_)) => RawValue::Absent,
            (_, raw) => raw,
        }
    }

    fn coerce(
        &self,
        observed: &Observed<'_>,
        nested_record: Option<xfer_core::CanonicalRecord>,
    ) -> Result<CanonicalValue, String> {
        let text = observed.raw.text().unwrap_or_default();
        match &self.target {
            FieldType::Text => Ok(CanonicalValue::Text(text.to_string())),
            FieldType::Decimal => observed
                .number
                .map(CanonicalValue::Decimal)
                .ok_or_else(|| "must be a decimal number".to_string()),
            FieldType::Date(format) => format
                .parse(text.trim())
                .map(CanonicalValue::Date)
                .ok_or_else(|| "must be a valid calendar date".to_string()),
            FieldType::Record(id) => nested_record
                .map(CanonicalValue::Record)
                .ok_or_else(|| format!("nested record '{id}' could not be materialized")),
        }
    }
}
