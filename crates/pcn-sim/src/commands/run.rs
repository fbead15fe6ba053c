//! `pcn-sim run` — replay random payments over seeded random networks.

use clap::Args;
use pcn_core::PcnConfig;
use pcn_sim::{RatioSummary, Simulation};
use std::path::PathBuf;

use crate::logging;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the config file. Defaults are used when it does not exist.
    #[arg(short, long, default_value = "pcn.toml")]
    pub config: PathBuf,

    /// Override the base RNG seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of trials per malicious ratio.
    #[arg(long)]
    pub trials: Option<u32>,

    /// Override the number of payments per trial.
    #[arg(long)]
    pub payments: Option<u32>,

    /// Print the summaries as JSON.
    #[arg(long)]
    pub json: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn run(args: &RunArgs) -> anyhow::Result<()> {
    let mut config = PcnConfig::load(&args.config)?;

    if let Some(trials) = args.trials {
        config.experiment.trials = trials;
    }
    if let Some(payments) = args.payments {
        config.experiment.payments_per_trial = payments;
    }
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    let seed = args
        .seed
        .or(config.experiment.seed)
        .unwrap_or_else(rand::random);
    config.experiment.seed = Some(seed);

    logging::init(&config.logging.level, &config.logging.format);
    tracing::info!(
        config = %args.config.display(),
        seed,
        nodes = config.network.node_count,
        channels = config.network.channel_count,
        trials = config.experiment.trials,
        payments = config.experiment.payments_per_trial,
        "starting experiment"
    );

    let simulation = Simulation::new(config)?;
    let summaries = simulation.run(seed)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print_summaries(seed, &summaries);
    }
    Ok(())
}

fn print_summaries(seed: u64, summaries: &[RatioSummary]) {
    println!("Seed: {}", seed);
    for summary in summaries {
        let total = &summary.total;
        println!();
        println!("------ Malicious: {:.3} ------", summary.malicious_ratio);
        println!("  Trials:               {}", summary.trials.len());
        println!("  Payments:             {}", total.payments);
        println!("  Successful:           {}", total.settled);
        println!("  Rolled back:          {}", total.rolled_back);
        println!("  Unroutable:           {}", total.unroutable);
        println!("  Capacity failures:    {}", total.capacity_failures);
        println!("  Reputation blocks:    {}", total.reputation_blocks);
        println!("  Success rate:         {:.1}%", total.success_rate() * 100.0);
        println!("  HTLC success rate:    {:.1}%", total.htlc_success_rate() * 100.0);
        println!("  Mean path attempts:   {:.2}", total.mean_attempts());
        println!(
            "  Propagation:          {} updates in {} rounds",
            total.propagation_updates, total.propagation_rounds
        );
        println!("  Time taken:           {:.3}s", total.elapsed_secs);
    }
}
