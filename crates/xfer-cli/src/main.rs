//! # xfer CLI entry point
//!
//! Parses command-line arguments, initializes logging, and dispatches to
//! subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xfer_cli::describe::{run_describe, DescribeArgs};
use xfer_cli::validate::{run_validate, ValidateArgs};
use xfer_cli::EXIT_ERROR;

/// Fund-transfer payload validator.
///
/// Validates payloads against the `IsoRequest` schema tree and prints the
/// canonical record or every violation found.
#[derive(Parser, Debug)]
#[command(name = "xfer", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a payload and print its canonical record or violations.
    Validate(ValidateArgs),

    /// Print the schema tree used for validation.
    Describe(DescribeArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "xfer starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Describe(args) => run_describe(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// `RUST_LOG` wins when set; otherwise verbosity picks the level.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
