//! # xfer-core — Foundational Types for Fund-Transfer Validation
//!
//! Leaf crate of the workspace. Defines the vocabulary every other crate
//! speaks: where a field lives ([`FieldPath`]), what went wrong with it
//! ([`Violation`], [`ViolationKind`]), and what an accepted payload becomes
//! ([`CanonicalRecord`], [`FundTransferRequest`]).
//!
//! ## Key Design Principles
//!
//! 1. **Violations are values.** A rejected payload is a normal outcome,
//!    reported as an ordered list of violations, never as an `Err`.
//!
//! 2. **No floats for money.** Amounts are `rust_decimal::Decimal` in the
//!    canonical model and serialize as strings that keep their scale.
//!
//! 3. **One digest path.** Digests are computed only from
//!    [`CanonicalBytes`], the RFC 8785 form of an accepted record.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `xfer-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod path;
pub mod record;
pub mod transfer;
pub mod violation;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{record_digest, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, ModelError, XferError};
pub use path::FieldPath;
pub use record::{CanonicalRecord, CanonicalValue, CANONICAL_DATE_FORMAT};
pub use transfer::{AcceptedTransfer, AddressInfo, Creditor, Debtor, FundTransferRequest};
pub use violation::{Violation, ViolationKind};
