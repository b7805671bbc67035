//! # Declarative Schema Definitions
//!
//! Loads a schema tree from a YAML or JSON document instead of the
//! built-in catalog. The field `type` column uses the same notation as
//! interface field tables:
//!
//! | Notation        | Field                                        |
//! |-----------------|----------------------------------------------|
//! | `String (n)`    | text, `MaxLength(n)`                          |
//! | `String`        | text                                         |
//! | `Decimal (p,s)` | decimal, `Digits { integer: p - s, fraction: s }` |
//! | `Decimal`       | decimal                                      |
//! | `Date`          | date (`format`, default `yyyy-MM-dd`)        |
//! | `Object`        | nested record, `schema` names the node       |
//!
//! `mandatory` is `M` or `O`. An unknown type name, or an attribute that
//! does not fit the type, is a definition error; nothing falls back
//! silently.
//!
//! ```yaml
//! root: IsoRequest
//! schemas:
//!   IsoRequest:
//!     fields:
//!       - { name: amount, type: "Decimal (15,2)", mandatory: M, positive: true }
//!       - { name: cdtr, type: Object, schema: IsoRequestCdtr, mandatory: M }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constraint::{DateFormat, Pattern};
use crate::descriptor::FieldDescriptor;
use crate::error::SchemaDefinitionError;
use crate::registry::SchemaRegistry;
use crate::schema::{NodeSchema, SchemaId};

/// Top-level definition document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionDocument {
    /// Id of the root schema.
    pub root: String,
    /// Node schemas by id.
    pub schemas: BTreeMap<String, SchemaDocument>,
}

/// One node schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDocument>,
}

/// `M` or `O` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mandatory {
    #[serde(rename = "M")]
    Mandatory,
    #[serde(rename = "O")]
    Optional,
}

/// One field row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_spec: String,
    pub mandatory: Mandatory,
    /// Full-match regex applied to trimmed text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Message reported on pattern mismatch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub positive: bool,
    /// Nested schema id, `Object` fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Date format label, `Date` fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Parsed `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Text { max_length: Option<usize> },
    Decimal { precision: Option<(u32, u32)> },
    Date,
    Object,
}

impl TypeSpec {
    /// Parse the field-table notation (`String (36)`, `Decimal (15,2)`, ...).
    ///
    /// # Errors
    ///
    /// `SchemaDefinitionError::UnsupportedType` for anything else.
    pub fn parse(field: &str, spec: &str) -> Result<Self, SchemaDefinitionError> {
        let unsupported = || SchemaDefinitionError::UnsupportedType {
            field: field.to_string(),
            type_spec: spec.to_string(),
        };

        let spec_trim = spec.trim();
        let (name, args) = match spec_trim.find('(') {
            Some(open) => {
                let inner = spec_trim[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(unsupported)?;
                let args: Vec<&str> = inner.split(',').map(str::trim).collect();
                (spec_trim[..open].trim(), Some(args))
            }
            None => (spec_trim, None),
        };

        let number = |s: &str| s.parse::<u32>().map_err(|_| unsupported());

        match (name.to_ascii_lowercase().as_str(), args.as_deref()) {
            ("string", None) => Ok(Self::Text { max_length: None }),
            ("string", Some([n])) => {
                let n = number(*n)?;
                if n == 0 {
                    return Err(unsupported());
                }
                Ok(Self::Text {
                    max_length: Some(n as usize),
                })
            }
            ("decimal", None) => Ok(Self::Decimal { precision: None }),
            ("decimal", Some([p, s])) => {
                let (p, s) = (number(*p)?, number(*s)?);
                if p == 0 || s > p {
                    return Err(unsupported());
                }
                Ok(Self::Decimal {
                    precision: Some((p, s)),
                })
            }
            ("date", None) => Ok(Self::Date),
            ("object", None) => Ok(Self::Object),
            _ => Err(unsupported()),
        }
    }
}

impl DefinitionDocument {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// `SchemaDefinitionError::DocumentLoad` if the YAML does not match
    /// the document shape.
    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaDefinitionError> {
        serde_yaml::from_str(content).map_err(|e| load_error("<inline>", format!("invalid YAML: {e}")))
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// `SchemaDefinitionError::DocumentLoad` if the JSON does not match
    /// the document shape.
    pub fn from_json_str(content: &str) -> Result<Self, SchemaDefinitionError> {
        serde_json::from_str(content).map_err(|e| load_error("<inline>", format!("invalid JSON: {e}")))
    }

    /// Read a document from disk. `.json` files are parsed as JSON,
    /// everything else as YAML.
    ///
    /// # Errors
    ///
    /// `SchemaDefinitionError::DocumentLoad` naming the path.
    pub fn load(path: &Path) -> Result<Self, SchemaDefinitionError> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| load_error(&shown, format!("cannot read file: {e}")))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let parsed: Result<Self, SchemaDefinitionError> = match ext {
            "json" => serde_json::from_str(&content)
                .map_err(|e| load_error(&shown, format!("invalid JSON: {e}"))),
            _ => serde_yaml::from_str(&content)
                .map_err(|e| load_error(&shown, format!("invalid YAML: {e}"))),
        };
        if parsed.is_ok() {
            tracing::debug!(path = %shown, "schema definition loaded");
        }
        parsed
    }

    /// Compile into a verified registry.
    ///
    /// # Errors
    ///
    /// Any `SchemaDefinitionError` from type parsing, pattern compilation,
    /// descriptor invariants, or registry checks.
    pub fn into_registry(self) -> Result<SchemaRegistry, SchemaDefinitionError> {
        let mut builder = SchemaRegistry::builder(self.root.as_str());
        for (id, doc) in self.schemas {
            let mut node = NodeSchema::new(id.as_str());
            if let Some(desc) = doc.description {
                node = node.describe(desc);
            }
            for field in doc.fields {
                node = node.field(field.into_descriptor(&id)?);
            }
            builder = builder.node(node);
        }
        builder.build()
    }
}

impl FieldDocument {
    fn into_descriptor(self, schema: &str) -> Result<FieldDescriptor, SchemaDefinitionError> {
        let invalid = |reason: &str| SchemaDefinitionError::InvalidDescriptor {
            schema: schema.to_string(),
            field: self.name.clone(),
            reason: reason.to_string(),
        };

        let type_spec = TypeSpec::parse(&self.name, &self.type_spec)?;

        if self.schema.is_some() && type_spec != TypeSpec::Object {
            return Err(invalid("'schema' only applies to Object fields"));
        }
        if self.format.is_some() && type_spec != TypeSpec::Date {
            return Err(invalid("'format' only applies to Date fields"));
        }
        if self.message.is_some() && self.pattern.is_none() {
            return Err(invalid("'message' requires 'pattern'"));
        }

        let mut d = match type_spec {
            TypeSpec::Text { .. } => FieldDescriptor::text(self.name.as_str()),
            TypeSpec::Decimal { .. } => FieldDescriptor::decimal(self.name.as_str()),
            TypeSpec::Date => {
                let format = match self.format.as_deref() {
                    None => DateFormat::IsoDate,
                    Some(label) => DateFormat::from_label(label)
                        .ok_or_else(|| invalid(&format!("unknown date format {label:?}")))?,
                };
                FieldDescriptor::date(self.name.as_str(), format)
            }
            TypeSpec::Object => {
                let target = self
                    .schema
                    .as_deref()
                    .ok_or_else(|| invalid("Object fields must name a 'schema'"))?;
                FieldDescriptor::record(self.name.as_str(), SchemaId::from(target))
            }
        };

        if self.mandatory == Mandatory::Mandatory {
            d = d.required();
        }
        if let TypeSpec::Text {
            max_length: Some(n),
        } = type_spec
        {
            d = d.max_length(n);
        }
        if let Some(src) = self.pattern {
            let message = self
                .message
                .unwrap_or_else(|| format!("must match pattern {src}"));
            d = d.pattern(Pattern::new(src, message)?);
        }
        if self.positive {
            d = d.positive();
        }
        if let TypeSpec::Decimal {
            precision: Some((p, s)),
        } = type_spec
        {
            d = d.digits(p - s, s);
        }
        if let Some(desc) = self.description {
            d = d.describe(desc);
        }
        Ok(d)
    }
}

fn load_error(path: &str, reason: String) -> SchemaDefinitionError {
    SchemaDefinitionError::DocumentLoad {
        path: path.to_string(),
        reason,
    }
}

/// Load a definition file and compile it into a registry.
///
/// # Errors
///
/// See [`DefinitionDocument::load`] and [`DefinitionDocument::into_registry`].
pub fn load_registry(path: &Path) -> Result<SchemaRegistry, SchemaDefinitionError> {
    DefinitionDocument::load(path)?.into_registry()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::run;
    use serde_json::json;

    #[test]
    fn parses_type_notation() {
        assert_eq!(
            TypeSpec::parse("f", "String (36)").unwrap(),
            TypeSpec::Text { max_length: Some(36) }
        );
        assert_eq!(
            TypeSpec::parse("f", "String").unwrap(),
            TypeSpec::Text { max_length: None }
        );
        assert_eq!(
            TypeSpec::parse("f", "Decimal (15,2)").unwrap(),
            TypeSpec::Decimal { precision: Some((15, 2)) }
        );
        assert_eq!(
            TypeSpec::parse("f", " decimal(15, 2) ").unwrap(),
            TypeSpec::Decimal { precision: Some((15, 2)) }
        );
        assert_eq!(TypeSpec::parse("f", "Date").unwrap(), TypeSpec::Date);
        assert_eq!(TypeSpec::parse("f", "Object").unwrap(), TypeSpec::Object);
    }

    #[test]
    fn rejects_unknown_types() {
        for bad in ["Integer", "String (x)", "String (0)", "Decimal (2,3)", "Date (8)", "String (36"] {
            let err = TypeSpec::parse("f", bad).unwrap_err();
            assert!(
                matches!(err, SchemaDefinitionError::UnsupportedType { .. }),
                "{bad} should be unsupported"
            );
        }
    }

    const SMALL: &str = r#"
root: Req
schemas:
  Req:
    fields:
      - { name: amount, type: "Decimal (5,2)", mandatory: M, positive: true }
      - { name: code, type: "String (3)", mandatory: M, pattern: "[A-Z]+", message: "must be upper-case letters" }
      - { name: when, type: Date, mandatory: O, format: yyyyMMdd }
      - { name: party, type: Object, schema: Party, mandatory: M }
  Party:
    fields:
      - { name: name, type: "String (5)", mandatory: M }
"#;

    #[test]
    fn yaml_definition_compiles_and_validates() {
        let reg = DefinitionDocument::from_yaml_str(SMALL)
            .unwrap()
            .into_registry()
            .unwrap();
        let valid = run(
            &reg,
            &json!({"amount": "123.45", "code": "ABC", "when": "20240115", "party": {"name": "Ann"}}),
        );
        assert!(valid.is_valid());

        let report = run(
            &reg,
            &json!({"amount": "1234.5", "code": "abcd", "party": {"name": "Annabel"}}),
        )
        .into_result()
        .unwrap_err();
        let got: Vec<(String, String)> = report
            .violations()
            .iter()
            .map(|v| (v.path.to_string(), v.kind.to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("amount".into(), "digits_exceeded".into()),
                ("code".into(), "length_exceeded".into()),
                ("code".into(), "pattern_mismatch".into()),
                ("party.name".into(), "length_exceeded".into()),
            ]
        );
        assert_eq!(report.violations()[2].message, "must be upper-case letters");
    }

    #[test]
    fn json_definition_is_accepted() {
        let doc = DefinitionDocument::from_json_str(
            r#"{"root":"R","schemas":{"R":{"fields":[{"name":"a","type":"String","mandatory":"O"}]}}}"#,
        )
        .unwrap();
        assert!(doc.into_registry().is_ok());
    }

    #[test]
    fn misplaced_attributes_are_errors() {
        let doc = DefinitionDocument::from_yaml_str(
            "root: R\nschemas:\n  R:\n    fields:\n      - { name: a, type: String, mandatory: O, schema: X }\n",
        )
        .unwrap();
        assert!(matches!(
            doc.into_registry().unwrap_err(),
            SchemaDefinitionError::InvalidDescriptor { .. }
        ));

        let doc = DefinitionDocument::from_yaml_str(
            "root: R\nschemas:\n  R:\n    fields:\n      - { name: a, type: String, mandatory: O, positive: true }\n",
        )
        .unwrap();
        assert!(doc.into_registry().is_err());
    }

    #[test]
    fn unknown_keys_and_mandatory_values_are_rejected() {
        assert!(DefinitionDocument::from_yaml_str(
            "root: R\nschemas:\n  R:\n    fields:\n      - { name: a, type: String, mandatory: Y }\n"
        )
        .is_err());
        assert!(DefinitionDocument::from_yaml_str("root: R\nschemas: {}\nextra: 1\n").is_err());
    }

    #[test]
    fn load_reads_files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.yaml");
        std::fs::write(&path, SMALL).unwrap();
        let reg = load_registry(&path).unwrap();
        assert_eq!(reg.root().id().as_str(), "Req");

        let missing = load_registry(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, SchemaDefinitionError::DocumentLoad { .. }));
    }
}
