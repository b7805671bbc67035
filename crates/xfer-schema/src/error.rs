//! # Schema Errors
//!
//! Errors raised while *building* schemas or engine policy. These are
//! startup failures: once a registry and policy exist, validating a
//! payload cannot fail, it can only produce violations.

use thiserror::Error;

use crate::constraint::ConstraintKind;

/// A schema tree could not be constructed.
#[derive(Error, Debug)]
pub enum SchemaDefinitionError {
    /// A pattern constraint did not compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern source as declared.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A field descriptor breaks a structural rule (e.g. optional but
    /// carrying a Required constraint).
    #[error("schema '{schema}' field '{field}': {reason}")]
    InvalidDescriptor {
        /// Schema the field belongs to.
        schema: String,
        /// Wire name of the field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A schema declares the same field name twice.
    #[error("schema '{schema}' declares field '{field}' more than once")]
    DuplicateField {
        /// Schema id.
        schema: String,
        /// Duplicated field name.
        field: String,
    },

    /// Two node schemas share an id.
    #[error("schema '{0}' is defined more than once")]
    DuplicateSchema(String),

    /// A nested reference (or the root) names a schema that does not exist.
    #[error("schema '{from}' references unknown schema '{target}'")]
    UnknownSchema {
        /// Referencing schema, or `(root)`.
        from: String,
        /// The unresolved id.
        target: String,
    },

    /// The nested-reference graph contains a cycle.
    #[error("schema reference cycle: {0}")]
    Cycle(String),

    /// A field type in a definition document could not be parsed.
    #[error("field '{field}': unsupported type {type_spec:?}")]
    UnsupportedType {
        /// Field the type belongs to.
        field: String,
        /// The type notation as written.
        type_spec: String,
    },

    /// A definition document could not be read or parsed.
    #[error("definition load error for '{path}': {reason}")]
    DocumentLoad {
        /// Source path or `<inline>`.
        path: String,
        /// Reason.
        reason: String,
    },
}

/// Engine policy could not be constructed.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PolicyError {
    /// A constraint kind that is structural to validation was disabled.
    #[error("constraint kind '{0}' cannot be disabled")]
    NotDisableable(ConstraintKind),

    /// A constraint kind name was not recognized.
    #[error("unknown constraint kind {0:?}")]
    UnknownKind(String),

    /// `max_violations` must be at least 1.
    #[error("max violations must be at least 1")]
    ZeroMaxViolations,
}
