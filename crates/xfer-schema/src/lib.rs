//! # xfer-schema — Schema-Driven Validation & Canonicalization
//!
//! Interprets declarative schemas over decoded fund-transfer payloads.
//! A payload either validates completely and becomes a
//! [`CanonicalRecord`](xfer_core::CanonicalRecord), or yields every
//! violation found across the whole tree, in declaration order.
//!
//! ## Layers
//!
//! - [`constraint`] — atomic checks (`Required`, `MaxLength`, `Pattern`,
//!   `Positive`, `Digits`, `DateFormat`, `Nested`) over a raw value.
//! - [`descriptor`] — one field: ordered constraints plus coercion into
//!   its canonical type.
//! - [`schema`] and [`registry`] — node schemas and the verified arena
//!   they live in.
//! - [`aggregate`] — flattening of nested violations into one report.
//! - [`engine`] — the entry point, with [`EnginePolicy`] for report caps
//!   and globally disabled constraint kinds.
//! - [`catalog`] — the built-in `IsoRequest` tree.
//! - [`definition`] — the same trees loaded from YAML/JSON documents.
//!
//! ## Crate Policy
//!
//! - Depends only on `xfer-core` internally.
//! - Schema construction is the only fallible step. Once a registry and a
//!   policy exist, validation returns values, never errors.
//! - Regexes are compiled once, when a schema is built.

pub mod aggregate;
pub mod catalog;
pub mod constraint;
pub mod definition;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod registry;
pub mod schema;

pub use aggregate::ValidationReport;
pub use catalog::fund_transfer_registry;
pub use constraint::{Constraint, ConstraintKind, DateFormat, Pattern};
pub use definition::{load_registry, DefinitionDocument};
pub use descriptor::{FieldDescriptor, FieldType};
pub use engine::{run, run_with_policy, EnginePolicy, EvalContext, ValidationEngine, ValidationResult};
pub use error::{PolicyError, SchemaDefinitionError};
pub use registry::{RegistryBuilder, SchemaRegistry};
pub use schema::{NodeOutcome, NodeSchema, SchemaId};
