//! Get command implementation

use anyhow::Result;
use clap::Args;

use super::utils::ConfigArgs;
use crate::render::{render_value, OutputFormat};

#[derive(Args)]
pub struct GetArgs {
    /// Dotted path of the value to print
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

pub fn run(args: GetArgs) -> Result<()> {
    let resolved = args.config.resolve()?;
    let value = resolved.require(&args.path)?;
    print!("{}", render_value(value, args.format)?);
    Ok(())
}
