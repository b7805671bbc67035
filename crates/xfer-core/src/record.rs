//! # Canonical Records
//!
//! The typed output of a successful validation run. A `CanonicalRecord`
//! mirrors the shape of the schema tree that produced it: leaf values are
//! already coerced (decimal amounts, calendar dates, text) and nested
//! records are fully materialized. Optional fields that were absent from
//! the payload are simply not present.
//!
//! ## Serialization
//!
//! Decimals serialize as strings that keep their scale (`"10.00"`), never
//! as JSON floats. Dates serialize as `YYYY-MM-DD`. Fields serialize in
//! schema declaration order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Wire format of canonical dates.
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// A coerced leaf or nested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    /// Plain text, as received.
    Text(String),
    /// Exact fixed-point decimal.
    Decimal(Decimal),
    /// Calendar date.
    Date(NaiveDate),
    /// Materialized nested record.
    Record(CanonicalRecord),
}

impl CanonicalValue {
    /// Short type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Decimal(_) => "decimal",
            Self::Date(_) => "date",
            Self::Record(_) => "record",
        }
    }
}

impl Serialize for CanonicalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Decimal(d) => serializer.serialize_str(&d.to_string()),
            Self::Date(d) => {
                serializer.serialize_str(&d.format(CANONICAL_DATE_FORMAT).to_string())
            }
            Self::Record(r) => r.serialize(serializer),
        }
    }
}

/// An accepted, type-coerced record.
///
/// Created only by a validation run that produced zero violations. The
/// engine keeps no reference to it once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRecord {
    schema: String,
    fields: Vec<(String, CanonicalValue)>,
}

impl CanonicalRecord {
    /// Create an empty record for the named schema.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            fields: Vec::new(),
        }
    }

    /// Identifier of the schema this record was produced by.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Append a field. Callers insert in schema declaration order.
    pub fn insert(&mut self, name: impl Into<String>, value: CanonicalValue) {
        self.fields.push((name.into(), value));
    }

    /// Look up a field by wire name.
    pub fn get(&self, name: &str) -> Option<&CanonicalValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Look up a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(CanonicalValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Look up a decimal field.
    pub fn decimal(&self, name: &str) -> Option<Decimal> {
        match self.get(name) {
            Some(CanonicalValue::Decimal(d)) => Some(*d),
            _ => None,
        }
    }

    /// Look up a date field.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name) {
            Some(CanonicalValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    /// Look up a nested record.
    pub fn record(&self, name: &str) -> Option<&CanonicalRecord> {
        match self.get(name) {
            Some(CanonicalValue::Record(r)) => Some(r),
            _ => None,
        }
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as a JSON value (decimals as strings, dates as `YYYY-MM-DD`).
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing into a Value only fails for non-string map keys.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> CanonicalRecord {
        let mut cdtr = CanonicalRecord::new("Creditor");
        cdtr.insert("account", CanonicalValue::Text("123".into()));

        let mut root = CanonicalRecord::new("IsoRequest");
        root.insert(
            "amount",
            CanonicalValue::Decimal(Decimal::from_str("10.00").unwrap()),
        );
        root.insert(
            "date",
            CanonicalValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        );
        root.insert("cdtr", CanonicalValue::Record(cdtr));
        root
    }

    #[test]
    fn typed_accessors() {
        let r = sample();
        assert_eq!(r.decimal("amount"), Some(Decimal::new(1000, 2)));
        assert_eq!(r.date("date"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(r.record("cdtr").and_then(|c| c.text("account")), Some("123"));
        assert_eq!(r.text("amount"), None);
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn decimals_serialize_as_strings_with_scale() {
        let json = sample().to_json();
        assert_eq!(json["amount"], "10.00");
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["cdtr"]["account"], "123");
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let record = sample();
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["amount", "date", "cdtr"]);
    }
}
