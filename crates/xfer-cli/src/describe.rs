//! # Describe Subcommand
//!
//! Prints the schema tree that `validate` would apply.
//!
//! ```bash
//! xfer describe
//! xfer describe --definition schemas/fund-transfer.yaml
//! xfer describe --descriptions
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::load_registry;
use crate::EXIT_VALID;

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Schema definition document to describe instead of the built-in catalog.
    #[arg(long)]
    pub definition: Option<PathBuf>,

    /// Append each schema's and field's description.
    #[arg(long)]
    pub descriptions: bool,
}

/// Execute the describe subcommand.
pub fn run_describe(args: &DescribeArgs) -> Result<u8> {
    print!("{}", describe(args)?);
    Ok(EXIT_VALID)
}

/// Render the selected registry as an indented tree.
pub fn describe(args: &DescribeArgs) -> Result<String> {
    let registry = load_registry(args.definition.as_deref())?;
    tracing::debug!(schemas = registry.len(), "describing registry");
    Ok(if args.descriptions {
        registry.render_annotated_tree()
    } else {
        registry.render_tree()
    })
}
