//! # Runtime Configuration
//!
//! Engine policy and schema source for a CLI run. Policy comes from
//! command-line flags, falling back to environment variables:
//!
//! | Variable                    | Meaning                                        |
//! |-----------------------------|------------------------------------------------|
//! | `XFER_MAX_VIOLATIONS`       | positive integer, caps the violation report    |
//! | `XFER_DISABLED_CONSTRAINTS` | comma-separated kinds, e.g. `pattern,max_length` |
//!
//! A flag always wins over its variable. Malformed values are startup
//! errors, never silently ignored.

use std::path::Path;

use anyhow::{Context, Result};
use xfer_schema::{fund_transfer_registry, ConstraintKind, EnginePolicy, SchemaRegistry};

pub const ENV_MAX_VIOLATIONS: &str = "XFER_MAX_VIOLATIONS";
pub const ENV_DISABLED_CONSTRAINTS: &str = "XFER_DISABLED_CONSTRAINTS";

/// Raw values of the policy environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub max_violations: Option<String>,
    pub disabled_constraints: Option<String>,
}

impl EnvOverrides {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self {
            max_violations: std::env::var(ENV_MAX_VIOLATIONS).ok(),
            disabled_constraints: std::env::var(ENV_DISABLED_CONSTRAINTS).ok(),
        }
    }
}

/// Merge flags over environment into a validated policy.
///
/// # Errors
///
/// Fails on an unparsable or zero `XFER_MAX_VIOLATIONS`, an unknown kind
/// in `XFER_DISABLED_CONSTRAINTS`, or an attempt to disable `required` or
/// `nested`.
pub fn resolve_policy(
    flag_max: Option<usize>,
    flag_disable: &[ConstraintKind],
    env: &EnvOverrides,
) -> Result<EnginePolicy> {
    let max_violations = match (flag_max, env.max_violations.as_deref()) {
        (Some(n), _) => Some(n),
        (None, Some(raw)) if !raw.trim().is_empty() => Some(
            raw.trim()
                .parse::<usize>()
                .with_context(|| format!("{ENV_MAX_VIOLATIONS} must be a positive integer, got {raw:?}"))?,
        ),
        (None, _) => None,
    };

    let disabled = if flag_disable.is_empty() {
        match env.disabled_constraints.as_deref() {
            Some(raw) => EnginePolicy::parse_kinds(raw)
                .with_context(|| format!("invalid {ENV_DISABLED_CONSTRAINTS}"))?,
            None => Vec::new(),
        }
    } else {
        flag_disable.to_vec()
    };

    let policy = EnginePolicy::new(max_violations, disabled).context("invalid engine policy")?;
    tracing::debug!(
        max_violations = ?policy.max_violations(),
        disabled = ?policy.disabled().collect::<Vec<_>>(),
        "engine policy resolved"
    );
    Ok(policy)
}

/// The built-in catalog, or the registry compiled from a definition file.
///
/// # Errors
///
/// Fails if the definition cannot be read, parsed, or compiled.
pub fn load_registry(definition: Option<&Path>) -> Result<SchemaRegistry> {
    match definition {
        Some(path) => xfer_schema::load_registry(path)
            .with_context(|| format!("cannot load schema definition {}", path.display())),
        None => fund_transfer_registry().context("built-in fund-transfer catalog is malformed"),
    }
}
