//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::{load_config, ResolverOptions};
use crate::domain::ResolvedConfig;

/// Config files and overrides accepted by every subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Config file (repeatable; later files override earlier ones)
    #[arg(short = 'c', long = "config", value_name = "FILE", required = true)]
    pub configs: Vec<PathBuf>,

    /// Store override values as written instead of converting them to the existing type
    #[arg(long)]
    pub no_coerce: bool,

    /// Overrides in dotted.path=value form, applied in order
    #[arg(value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl ConfigArgs {
    pub fn options(&self) -> ResolverOptions {
        ResolverOptions { coerce_overrides: !self.no_coerce }
    }

    pub fn resolve(&self) -> Result<ResolvedConfig> {
        load_config(&self.configs[..], &self.overrides[..], &self.options())
            .with_context(|| format!("Failed resolving {}", describe_files(&self.configs)))
    }
}

fn describe_files(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
