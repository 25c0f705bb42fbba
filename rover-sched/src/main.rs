/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{error, info, warn};

use rover_sched::config::{RoverConfig, TaskType};
use rover_sched::energy::{EnergyModel, SegmentEnergy, TerrainSegment};
use rover_sched::io::{load_tasks_json, load_terrain_csv, write_json_report};
use rover_sched::mission::{MissionResult, MissionSimulator, RtgFeasibility};
use rover_sched::policy::Policy;
use rover_sched::task::{sample_tasks, Task};

// ── CLI argument definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run the sample mission.
    Basic,
    /// Energy of a 100 m drive over reference terrains.
    Terrain,
    /// One-hour energy of every task type.
    Tasks,
    /// Run a mission from task and terrain files.
    Custom,
}

/// Energy-aware rover mission simulator.
///
/// Example:
///   rover-sched --mode custom --tasks data/custom_tasks.json \
///               --terrain data/terrain_profiles.csv --policy wspt
#[derive(Debug, Parser)]
#[command(
    name = "rover-sched",
    about = "Rover energy model and greedy task scheduler",
    long_about = None,
)]
struct Cli {
    #[arg(short = 'm', long, value_enum, default_value_t = Mode::Basic)]
    mode: Mode,

    /// YAML rover configuration; overrides --profile.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Built-in rover profile (baseline, perseverance).
    #[arg(long, default_value = "baseline")]
    profile: String,

    /// Ordering policy (fifo, energy_greedy, urgency_first, random, wspt, weighted_cost).
    #[arg(short = 'p', long, default_value = "weighted_cost")]
    policy: Policy,

    /// Battery level at mission start, as a fraction of capacity.
    #[arg(long, default_value_t = 1.0)]
    initial_battery: f64,

    /// Traversal velocity in m/s (default: the profile's nominal velocity).
    #[arg(long)]
    velocity: Option<f64>,

    /// JSON task list (custom mode).
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Terrain profile CSV.
    #[arg(long)]
    terrain: Option<PathBuf>,

    /// Seed for the random policy.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write the result as JSON to this path.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        mode = ?cli.mode,
        profile = %cli.profile,
        config = ?cli.config,
        policy = %cli.policy,
        initial_battery = cli.initial_battery,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => RoverConfig::load_from_file(path)?,
        None => RoverConfig::from_profile(&cli.profile)?,
    };
    print_rover(&config);

    match cli.mode {
        Mode::Terrain => {
            let rows = terrain_analysis(&config, cli.velocity)?;
            maybe_write(cli.output.as_deref(), &rows)
        }
        Mode::Tasks => {
            let rows = task_analysis(&config)?;
            maybe_write(cli.output.as_deref(), &rows)
        }
        Mode::Basic | Mode::Custom => {
            let tasks = match (&cli.tasks, cli.mode) {
                (Some(path), Mode::Custom) => load_tasks_json(path)?,
                (Some(_), _) => {
                    warn!("--tasks is only used in custom mode; running sample tasks");
                    sample_tasks()
                }
                (None, _) => sample_tasks(),
            };
            let terrain = cli
                .terrain
                .as_deref()
                .map(load_terrain_csv)
                .transpose()?;
            if terrain.is_none() {
                info!("No terrain profile provided; skipping traversal");
            }

            let result = run_mission(cli, &config, &tasks, terrain.as_deref())?;
            print_mission(&config, &result);
            maybe_write(cli.output.as_deref(), &result)
        }
    }
}

fn run_mission(
    cli: &Cli,
    config: &RoverConfig,
    tasks: &[Task],
    terrain: Option<&[TerrainSegment]>,
) -> Result<MissionResult> {
    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut sim =
        MissionSimulator::new(config, cli.policy).with_initial_battery(cli.initial_battery);
    sim.run_mission_simulation(tasks, terrain, cli.velocity, &mut rng)
        .map_err(|e| {
            let kind = e.kind();
            anyhow::Error::new(e).context(format!("Mission simulation failed ({kind:?})"))
        })
}

fn maybe_write<T: Serialize>(path: Option<&Path>, report: &T) -> Result<()> {
    match path {
        Some(path) => write_json_report(path, report),
        None => Ok(()),
    }
}

// ── Analyses ──────────────────────────────────────────────────────────────────

const ANALYSIS_DISTANCE_M: f64 = 100.0;

/// `(name, slope_deg, roughness)` of the reference terrains.
const REFERENCE_TERRAINS: [(&str, f64, f64); 5] = [
    ("Flat terrain", 0.0, 0.02),
    ("Gentle slope", 5.0, 0.1),
    ("Moderate slope", 15.0, 0.3),
    ("Steep slope", 25.0, 0.5),
    ("Very rough", 10.0, 0.8),
];

#[derive(Debug, Serialize)]
struct TerrainRow {
    name: &'static str,
    #[serde(flatten)]
    energy: SegmentEnergy,
}

#[derive(Debug, Serialize)]
struct TaskRow {
    task_type: TaskType,
    power_w: f64,
    energy_kwh: f64,
    battery_percent: f64,
}

fn terrain_analysis(config: &RoverConfig, velocity: Option<f64>) -> Result<Vec<TerrainRow>> {
    let model = EnergyModel::new(config);
    let velocity = velocity.unwrap_or(config.nominal_velocity_mps);

    println!("\n=== TERRAIN ENERGY ANALYSIS ===\n");
    println!(
        "Energy consumption for {:.0} m traversal at {:.3} m/s:\n",
        ANALYSIS_DISTANCE_M, velocity
    );

    let mut rows = Vec::with_capacity(REFERENCE_TERRAINS.len());
    for (name, slope_deg, roughness) in REFERENCE_TERRAINS {
        let energy = model
            .energy_consumption(ANALYSIS_DISTANCE_M, slope_deg, velocity, roughness, config.mass_kg)
            .with_context(|| format!("Cannot analyse terrain '{name}'"))?;
        println!(
            "{:<15} | Slope: {:>3.0}° | Roughness: {:4.2} | Power: {:6.1} W | Energy: {:7.4} kWh | Time: {:5.0} s",
            name,
            slope_deg,
            roughness,
            energy.power_w,
            energy.energy_kwh,
            energy.time_hours * 3600.0
        );
        rows.push(TerrainRow { name, energy });
    }
    Ok(rows)
}

fn task_analysis(config: &RoverConfig) -> Result<Vec<TaskRow>> {
    let model = EnergyModel::new(config);
    let duration_hours = 1.0;

    println!("\n=== TASK ENERGY ANALYSIS ===\n");
    println!("Energy consumption for {duration_hours:.1}-hour task execution:\n");

    let mut rows = Vec::with_capacity(config.task_power_w.len());
    for (&task_type, &power_w) in &config.task_power_w {
        let energy_kwh = model.task_energy(task_type, duration_hours)?;
        let battery_percent = energy_kwh / config.battery_capacity_kwh * 100.0;
        println!(
            "{:<18} | Power: {:5.1} W | Energy: {:7.4} kWh | Battery: {:5.2}%",
            task_type, power_w, energy_kwh, battery_percent
        );
        rows.push(TaskRow {
            task_type,
            power_w,
            energy_kwh,
            battery_percent,
        });
    }
    Ok(rows)
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_rover(config: &RoverConfig) {
    println!("Rover: {}", config.name);
    println!("  Mass: {} kg", config.mass_kg);
    println!("  Battery Capacity: {:.3} kWh", config.battery_capacity_kwh);
    println!("  Nominal Velocity: {} m/s", config.nominal_velocity_mps);
    println!("  Energy Reserve: {:.0}%", config.reserve_ratio * 100.0);
}

fn print_mission(config: &RoverConfig, result: &MissionResult) {
    let s = &result.mission_summary;

    println!("\n=== SIMULATION RESULTS ({}) ===", s.policy);
    println!(
        "Tasks Completed: {}/{} ({:.1}%)",
        s.completed_tasks,
        s.total_tasks,
        s.completion_rate * 100.0
    );
    println!("Final Battery Level: {:.1}%", s.final_battery_level * 100.0);
    println!("Total Energy Consumed: {:.3} kWh", s.total_energy_consumed_kwh);
    println!("Energy Used This Run: {:.3} kWh", s.energy_used_this_run_kwh);
    println!("Task Energy: {:.3} kWh", s.task_energy_kwh);
    if s.halted_on_critical_energy {
        println!("Mission halted at critical energy level");
    }

    if let Some(t) = &result.traversal_summary {
        println!("Traversal Distance: {:.0} m", t.total_distance_m);
        println!("Traversal Energy: {:.3} kWh", t.total_energy_kwh);
    }

    println!("\nCompleted Tasks:");
    for t in &result.completed_tasks {
        println!("  + {}: {} ({:.3} kWh)", t.task_id, t.task_type, t.energy_kwh);
    }
    if !result.deferred_tasks.is_empty() {
        println!("\nDeferred Tasks:");
        for o in result.outcomes.iter().filter(|o| o.deferral.is_some()) {
            let reason = o.deferral.as_ref().map(ToString::to_string).unwrap_or_default();
            println!("  - {}: {} ({:.3} kWh) {}", o.task_id, o.task_type, o.energy_kwh, reason);
        }
    }

    if !result.rtg_advisories.is_empty() {
        println!("\nRTG Advisories:");
        for a in &result.rtg_advisories {
            println!("  ! {}: {}", a.task_id, a.rejection);
        }
    }

    if let Some(rtg) = RtgFeasibility::new(config) {
        let r = rtg.simulate_overnight_recharge(s.final_battery_level);
        println!(
            "\nOvernight recharge: {:.1}% -> {:.1}% (+{:.3} kWh over {:.1} h)",
            r.initial_soc * 100.0,
            r.final_soc * 100.0,
            r.energy_added_kwh,
            r.recharge_hours
        );
    }
}
