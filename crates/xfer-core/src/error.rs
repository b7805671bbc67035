//! # Error Types
//!
//! Errors raised by the foundational types. All use `thiserror`.
//!
//! Constraint failures in an inbound payload are never errors: they are
//! [`Violation`](crate::Violation) values. The types here cover misuse of
//! the canonical model and serialization failures.

use thiserror::Error;

/// Top-level error type for the core crate.
#[derive(Error, Debug)]
pub enum XferError {
    /// Canonical serialization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A canonical record did not have the shape of the typed model.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// A canonical record could not be mapped onto the typed transfer model.
///
/// Only reachable when a record comes from a schema other than the
/// fund-transfer catalog (e.g. a hand-edited definition document).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A field the typed model requires is absent.
    #[error("record '{schema}' is missing field '{field}'")]
    MissingField {
        /// Schema id of the record.
        schema: String,
        /// Wire name of the missing field.
        field: String,
    },

    /// A field is present with the wrong canonical type.
    #[error("record '{schema}' field '{field}': expected {expected}, found {found}")]
    WrongType {
        /// Schema id of the record.
        schema: String,
        /// Wire name of the field.
        field: String,
        /// Expected canonical type name.
        expected: &'static str,
        /// Actual canonical type name.
        found: &'static str,
    },
}
