//! Resolve command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use super::utils::ConfigArgs;
use crate::render::{render_node, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ResolveArgs) -> Result<()> {
    let resolved = args.config.resolve()?;
    let rendered = render_node(resolved.root(), args.format)?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, rendered)
                .with_context(|| format!("Failed writing {}", path.display()))?;
            tracing::info!("Wrote resolved config to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
