/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, info};

use rover_sched::bench::{run_benchmark, BenchmarkConfig, BenchmarkReport};
use rover_sched::config::RoverConfig;
use rover_sched::io::write_json_report;
use rover_sched::policy::Policy;

/// Monte Carlo comparison of scheduling policies under scarce energy.
///
/// Example:
///   rover-bench --trials 1000 --seed 42 --policies wspt,weighted_cost
#[derive(Debug, Parser)]
#[command(name = "rover-bench", long_about = None)]
struct Cli {
    /// Number of random trials.
    #[arg(short = 'n', long, default_value_t = 1000)]
    trials: usize,

    /// Seed for scenario generation and the random policy.
    #[arg(short = 's', long, default_value_t = 42)]
    seed: u64,

    /// YAML rover configuration; overrides --profile.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Built-in rover profile (baseline, perseverance).
    #[arg(long, default_value = "baseline")]
    profile: String,

    /// Comma-separated policies to compare; FIFO is always the baseline.
    #[arg(short = 'p', long, value_delimiter = ',')]
    policies: Vec<Policy>,

    /// Write the report as JSON to this path.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if cli.trials == 0 {
        bail!("--trials must be at least 1");
    }

    let config = match &cli.config {
        Some(path) => RoverConfig::load_from_file(path)?,
        None => RoverConfig::from_profile(&cli.profile)?,
    };
    let policies = if cli.policies.is_empty() {
        Policy::all()
    } else {
        cli.policies.clone()
    };
    let bench = BenchmarkConfig::new(cli.trials, policies);

    info!(
        rover = %config.name,
        trials = bench.trials,
        seed = cli.seed,
        policies = %bench.policies().iter().map(Policy::name).collect::<Vec<_>>().join(","),
        "Benchmark configuration"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut report = run_benchmark(&config, &bench, &mut rng);
    report.seed = Some(cli.seed);

    if report.valid_trials == 0 {
        bail!(
            "no valid trials out of {} attempted; check the rover configuration",
            report.attempted_trials
        );
    }

    print_report(&report);

    if let Some(path) = &cli.output {
        write_json_report(path, &report)?;
    }
    Ok(())
}

fn print_report(report: &BenchmarkReport) {
    println!("\n=== POLICY COMPARISON ({}) ===", report.rover);
    println!(
        "Valid trials: {}/{}\n",
        report.valid_trials, report.attempted_trials
    );

    println!(
        "{:<14} {:>18} {:>18} {:>18} {:>16}",
        "Policy", "Completion %", "Efficiency", "Reward", "Energy kWh"
    );
    println!("{}", "-".repeat(88));
    for p in &report.policies {
        println!(
            "{:<14} {:>9.1} ± {:<6.1} {:>9.1} ± {:<6.1} {:>9.1} ± {:<6.1} {:>7.3} ± {:<6.3}",
            p.policy,
            p.completion_rate.mean,
            p.completion_rate.std,
            p.efficiency.mean,
            p.efficiency.std,
            p.total_reward.mean,
            p.total_reward.std,
            p.energy_used_kwh.mean,
            p.energy_used_kwh.std,
        );
    }

    if report.improvements_vs_fifo.is_empty() {
        return;
    }

    println!("\nImprovement over FIFO:");
    for i in &report.improvements_vs_fifo {
        println!(
            "  {:<14} completion {:+6.1} pp | efficiency {:+7.1} | reward {:+7.1}",
            i.policy, i.completion_rate, i.efficiency, i.total_reward
        );
    }

    println!("\nEffect size vs FIFO (Cohen's d):");
    for e in &report.effect_sizes_vs_fifo {
        println!(
            "  {:<14} completion {:+5.2} ({}) | efficiency {:+5.2} ({}) | reward {:+5.2} ({})",
            e.policy,
            e.completion_rate.d,
            e.completion_rate.magnitude,
            e.efficiency.d,
            e.efficiency.magnitude,
            e.total_reward.d,
            e.total_reward.magnitude,
        );
    }
}
