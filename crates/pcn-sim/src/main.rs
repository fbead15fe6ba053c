//! PCN Sim — command-line driver for payment channel network experiments.
//!
//! Subcommands: init, run.

mod commands;
mod logging;

use clap::{Parser, Subcommand};

/// Simulate routing and HTLC settlement over random payment channel networks.
#[derive(Parser, Debug)]
#[command(name = "pcn-sim", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default experiment configuration.
    Init(commands::init::InitArgs),
    /// Run the configured experiment.
    Run(commands::run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Run(args) => commands::run::run(args),
    }
}
