//! # xfer-cli — Fund-Transfer Payload Validation
//!
//! Provides the `xfer` command-line interface over `xfer-schema`.
//!
//! ## Subcommands
//!
//! - `xfer validate` — Validate a JSON/YAML payload, print the canonical
//!   record and its digest, or the violation report.
//! - `xfer describe` — Print the schema tree of the built-in catalog or a
//!   definition document.
//!
//! ```bash
//! xfer validate payload.json
//! xfer validate payload.yaml --format json --max-violations 10
//! xfer describe --definition schemas/fund-transfer.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers return `anyhow::Result<u8>`; the binary maps `Ok(code)` to
//!   the process exit status and `Err` to [`EXIT_ERROR`].
//! - Rejected payloads are an ordinary outcome ([`EXIT_INVALID`]), not an
//!   error.

pub mod config;
pub mod describe;
pub mod payload;
pub mod validate;

/// The payload validated.
pub const EXIT_VALID: u8 = 0;
/// The payload was rejected with at least one violation.
pub const EXIT_INVALID: u8 = 1;
/// The run could not complete: bad configuration, schema, or input file.
pub const EXIT_ERROR: u8 = 2;
