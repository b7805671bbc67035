//! # Validate Subcommand
//!
//! Validates one payload file and prints either the canonical record with
//! its content digest, or the violation report.
//!
//! ```bash
//! xfer validate payload.json
//! xfer validate payload.yaml --format json
//! xfer validate payload.json --definition schemas/fund-transfer.yaml --max-violations 5
//! XFER_DISABLED_CONSTRAINTS=pattern xfer validate payload.json
//! ```
//!
//! Exit status: 0 valid, 1 invalid, 2 load or configuration error.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::json;
use xfer_core::{record_digest, AcceptedTransfer, CanonicalRecord, ContentDigest, XferError};
use xfer_schema::{ConstraintKind, ValidationEngine, ValidationReport, ValidationResult};

use crate::config::{load_registry, resolve_policy, EnvOverrides};
use crate::payload::load_payload;
use crate::{EXIT_INVALID, EXIT_VALID};

/// Output rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Payload file: JSON, or YAML for `.yaml`/`.yml`. `-` reads JSON from stdin.
    pub file: PathBuf,

    /// Schema definition document to use instead of the built-in catalog.
    #[arg(long)]
    pub definition: Option<PathBuf>,

    /// Report at most N violations (overrides XFER_MAX_VIOLATIONS).
    #[arg(long, value_name = "N")]
    pub max_violations: Option<usize>,

    /// Disable a constraint kind; repeatable (overrides XFER_DISABLED_CONSTRAINTS).
    #[arg(long = "disable", value_name = "KIND")]
    pub disable: Vec<ConstraintKind>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Exit status and rendered output of one validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub code: u8,
    pub output: String,
}

/// Execute the validate subcommand against the process environment.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let outcome = validate_payload(args, &EnvOverrides::from_env())?;
    println!("{}", outcome.output);
    Ok(outcome.code)
}

/// Validate `args.file` under the policy resolved from `args` and `env`.
///
/// # Errors
///
/// Configuration, schema, or payload loading failures. A payload that
/// fails validation is not an error: it yields exit code 1.
pub fn validate_payload(args: &ValidateArgs, env: &EnvOverrides) -> Result<Outcome> {
    let policy = resolve_policy(args.max_violations, &args.disable, env)?;
    let registry = load_registry(args.definition.as_deref())?;
    let payload = load_payload(&args.file)?;

    let engine = ValidationEngine::new(Arc::new(registry)).with_policy(policy);
    let result = engine.run(&payload);
    tracing::info!(
        file = %args.file.display(),
        schema = %engine.registry().root().id(),
        valid = result.is_valid(),
        violations = result.report().map_or(0, ValidationReport::len),
        "validation finished"
    );

    match result {
        ValidationResult::Valid(record) => Ok(Outcome {
            code: EXIT_VALID,
            output: render_valid(&record, args.format)?,
        }),
        ValidationResult::Invalid(report) => Ok(Outcome {
            code: EXIT_INVALID,
            output: render_invalid(&report, args.format)?,
        }),
    }
}

fn render_valid(record: &CanonicalRecord, format: OutputFormat) -> Result<String> {
    let (digest, summary) = digest_and_summary(record)?;
    match format {
        OutputFormat::Json => {
            let mut out = json!({
                "valid": true,
                "schema": record.schema(),
                "digest": digest.to_string(),
                "record": record.to_json(),
            });
            if let Some(summary) = summary {
                out["summary"] = json!(summary);
            }
            Ok(serde_json::to_string_pretty(&out)?)
        }
        OutputFormat::Text => {
            let mut out = format!("VALID ({})\ndigest: {digest}\n", record.schema());
            if let Some(summary) = summary {
                out.push_str(&format!("transfer: {summary}\n"));
            }
            out.push_str(&serde_json::to_string_pretty(&record.to_json())?);
            Ok(out)
        }
    }
}

/// Digest of the record, plus a one-line summary when the record has the
/// fund-transfer shape.
fn digest_and_summary(record: &CanonicalRecord) -> Result<(ContentDigest, Option<String>)> {
    match AcceptedTransfer::from_record(record) {
        Ok(accepted) => {
            let r = &accepted.request;
            let summary = format!(
                "{} {} ref {} from {} to {} on {}",
                r.message_type, r.amount, r.reference_no, r.dbtr.account, r.cdtr.account, r.date
            );
            Ok((accepted.digest, Some(summary)))
        }
        Err(XferError::Model(e)) => {
            tracing::debug!(error = %e, "record is not a fund-transfer request; skipping summary");
            Ok((record_digest(record)?, None))
        }
        Err(e) => Err(e.into()),
    }
}

fn render_invalid(report: &ValidationReport, format: OutputFormat) -> Result<String> {
    let counts = report.count_by_kind();
    match format {
        OutputFormat::Json => {
            let out = json!({
                "valid": false,
                "violations": report.violations(),
                "counts": counts,
                "truncated": report.truncated(),
            });
            Ok(serde_json::to_string_pretty(&out)?)
        }
        OutputFormat::Text => {
            let kinds: Vec<String> = counts.iter().map(|(kind, n)| format!("{kind}: {n}")).collect();
            Ok(format!(
                "INVALID: {} violation(s) ({})\n{report}",
                report.len() + report.truncated(),
                kinds.join(", ")
            ))
        }
    }
}
