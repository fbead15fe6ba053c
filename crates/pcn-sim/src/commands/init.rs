//! `pcn-sim init` — write a default experiment configuration.

use clap::Args;
use pcn_core::PcnConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the config file.
    #[arg(short, long, default_value = "pcn.toml")]
    pub config: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    if args.config.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            args.config.display()
        );
    }

    PcnConfig::default().save(&args.config)?;
    println!("Wrote default configuration to {}", args.config.display());
    println!("Run 'pcn-sim run --config {}' to start the experiment.", args.config.display());
    Ok(())
}
