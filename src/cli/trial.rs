//! Trial command implementation

use anyhow::Result;
use clap::Args;

use super::utils::ConfigArgs;
use crate::experiment::ExperimentConfig;
use crate::render::dump_config;

#[derive(Args)]
pub struct TrialArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Save the parsed config under <trial_dir>/configs
    #[arg(long)]
    pub save: bool,
}

pub fn run(args: TrialArgs) -> Result<()> {
    let resolved = args.config.resolve()?;
    let experiment = ExperimentConfig::from_resolved(&resolved)?;

    println!("{}", experiment.trial_dir.display());
    if args.save {
        let saved = dump_config(&experiment.configs_dir(), &resolved)?;
        println!("Saved parsed config to {}", saved.display());
    }
    Ok(())
}
