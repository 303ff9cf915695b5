//! Command-line interface for expconf
//!
//! Provides `resolve`, `get` and `trial` subcommands over layered config files
//! plus `dotted.path=value` overrides.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod get;
mod resolve;
mod trial;
mod utils;

/// Resolve layered experiment configurations
#[derive(Parser)]
#[command(name = "expconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the fully resolved configuration
    Resolve(resolve::ResolveArgs),

    /// Print a single resolved value
    Get(get::GetArgs),

    /// Print the trial directory a run would write to
    Trial(trial::TrialArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Resolve(args) => resolve::run(args),
        Commands::Get(args) => get::run(args),
        Commands::Trial(args) => trial::run(args),
    }
}
