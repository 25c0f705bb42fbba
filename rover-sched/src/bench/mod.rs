/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Monte Carlo comparison of ordering policies.
//!
//! Each trial draws a deliberately energy-starved scenario, then runs every
//! policy against that identical scenario with the greedy rule
//! `complete if energy ≤ remaining usable energy`.  A trial that fails for any
//! policy is dropped whole, so every policy's statistics cover the same
//! trials.
//!
//! # Scenario generation
//!
//! | Quantity | Distribution |
//! |---|---|
//! | Battery level | U[0.05, 0.20) |
//! | Task count | U{12..=25} |
//! | Task type | uniform over the configuration's non-idle types |
//! | Duration | U[1, 7) h |
//! | Urgency | U[1, 10) |
//! | Reward | U[10, 100) |
//!
//! Usable energy is `max(0, (capacity · level − 0.061) · (1 − reserve))`, the
//! fixed 0.061 kWh standing in for a short approach drive.  If the tasks need
//! no more than twice the usable energy, every task's energy and duration are
//! scaled by `3 · usable / max(total, 0.1)`.

pub mod stats;

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RoverConfig;
use crate::energy::{EnergyError, EnergyModel};
use crate::policy::Policy;
use crate::task::{CostedTask, Task};

use stats::{cohens_d, mean, EffectSize, MetricStats};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Energy charged before any task, in kWh.
pub const TERRAIN_OVERHEAD_KWH: f64 = 0.061;

pub const ENERGY_LEVEL_RANGE: Range<f64> = 0.05..0.20;
pub const MIN_TASKS: usize = 12;
pub const MAX_TASKS: usize = 25;
pub const DURATION_RANGE_HOURS: Range<f64> = 1.0..7.0;
pub const URGENCY_RANGE: Range<f64> = 1.0..10.0;
pub const REWARD_RANGE: Range<f64> = 10.0..100.0;

/// Rescale unless tasks need more than this multiple of usable energy.
pub const MIN_OVERSUBSCRIPTION: f64 = 2.0;

/// Oversubscription a rescaled scenario is brought to.
pub const RESCALE_TARGET: f64 = 3.0;

/// Floor for the energy denominator of the efficiency metric.
pub const EFFICIENCY_ENERGY_FLOOR_KWH: f64 = 0.001;

/// Trials between progress log lines.
const PROGRESS_INTERVAL: usize = 200;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a trial could not be used.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("configuration has no schedulable task types")]
    NoTaskTypes,

    #[error(transparent)]
    Energy(#[from] EnergyError),

    #[error("scenario task '{task_id}' has invalid energy {energy_kwh} kWh")]
    InvalidTaskEnergy { task_id: String, energy_kwh: f64 },

    #[error("scenario demand {demand_kwh} kWh does not exceed usable {usable_kwh} kWh")]
    Undersubscribed { demand_kwh: f64, usable_kwh: f64 },

    #[error("policy {policy} produced non-finite {metric}")]
    NonFiniteMetric {
        policy: &'static str,
        metric: &'static str,
    },
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    pub trials: usize,
    /// Always starts with FIFO, the comparison baseline.
    policies: Vec<Policy>,
}

impl BenchmarkConfig {
    /// FIFO is inserted at the front if `policies` does not contain it, and
    /// repeated policies are dropped.
    pub fn new(trials: usize, policies: Vec<Policy>) -> Self {
        let mut ordered = vec![Policy::Fifo];
        for policy in policies {
            if !ordered.iter().any(|p| p.name() == policy.name()) {
                ordered.push(policy);
            }
        }
        Self {
            trials,
            policies: ordered,
        }
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::new(1000, Policy::all())
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// One randomly drawn mission, shared by every policy in a trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub energy_level: f64,
    pub usable_energy_kwh: f64,
    pub tasks: Vec<CostedTask>,
    /// Factor applied to every task, if the scenario was tightened.
    pub rescale_factor: Option<f64>,
}

impl Scenario {
    pub fn total_task_energy(&self) -> f64 {
        self.tasks.iter().map(CostedTask::energy_kwh).sum()
    }
}

/// Energy a scenario may spend on tasks at `energy_level`.
pub fn scenario_usable_energy(config: &RoverConfig, energy_level: f64) -> f64 {
    let after_overhead = config.battery_capacity_kwh * energy_level - TERRAIN_OVERHEAD_KWH;
    (after_overhead * (1.0 - config.reserve_ratio)).max(0.0)
}

/// Draw one scenario from `rng`.
pub fn generate_scenario<R: Rng + ?Sized>(
    config: &RoverConfig,
    rng: &mut R,
) -> Result<Scenario, BenchError> {
    let task_types = config.schedulable_task_types();
    let model = EnergyModel::new(config);

    let energy_level = rng.gen_range(ENERGY_LEVEL_RANGE);
    let task_count = rng.gen_range(MIN_TASKS..=MAX_TASKS);
    let usable_energy_kwh = scenario_usable_energy(config, energy_level);

    let mut tasks = Vec::with_capacity(task_count);
    for i in 0..task_count {
        let task_type = *task_types.choose(rng).ok_or(BenchError::NoTaskTypes)?;
        let task = Task::new(
            format!("T{:03}", i + 1),
            task_type,
            rng.gen_range(DURATION_RANGE_HOURS),
            rng.gen_range(URGENCY_RANGE),
            rng.gen_range(REWARD_RANGE),
        );
        let costed = model.cost_task(&task)?;
        if !(costed.energy_kwh() >= 0.0) || !costed.energy_kwh().is_finite() {
            return Err(BenchError::InvalidTaskEnergy {
                task_id: task.task_id,
                energy_kwh: costed.energy_kwh(),
            });
        }
        tasks.push(costed);
    }

    let mut scenario = Scenario {
        energy_level,
        usable_energy_kwh,
        tasks,
        rescale_factor: None,
    };

    let total = scenario.total_task_energy();
    if total <= usable_energy_kwh * MIN_OVERSUBSCRIPTION {
        if !(total > 0.0) {
            return Err(BenchError::Undersubscribed {
                demand_kwh: total,
                usable_kwh: usable_energy_kwh,
            });
        }
        let factor = usable_energy_kwh * RESCALE_TARGET / total;
        scenario.tasks = scenario.tasks.iter().map(|t| t.scaled(factor)).collect();
        scenario.rescale_factor = Some(factor);
    }

    let demand = scenario.total_task_energy();
    if !(demand > usable_energy_kwh) {
        return Err(BenchError::Undersubscribed {
            demand_kwh: demand,
            usable_kwh: usable_energy_kwh,
        });
    }

    debug!(
        energy_level = %format!("{:.3}", energy_level),
        usable_kwh = %format!("{:.3}", usable_energy_kwh),
        tasks = scenario.tasks.len(),
        demand_kwh = %format!("{:.3}", scenario.total_task_energy()),
        rescaled = scenario.rescale_factor.is_some(),
        "scenario generated"
    );

    Ok(scenario)
}

// ── Policy runs ───────────────────────────────────────────────────────────────

/// Metrics of one policy on one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyRun {
    pub policy: &'static str,
    pub completed: usize,
    /// Percent of the scenario's tasks completed.
    pub completion_rate: f64,
    pub total_reward: f64,
    /// Overhead plus completed task energy.
    pub energy_used_kwh: f64,
    /// Reward per kWh used.
    pub efficiency: f64,
}

/// Run `policy` on `scenario` with the greedy budget rule.
pub fn run_policy<R: Rng + ?Sized>(
    policy: &Policy,
    scenario: &Scenario,
    rng: &mut R,
) -> Result<PolicyRun, BenchError> {
    let ordered = policy.order(&scenario.tasks, rng);

    let mut remaining = scenario.usable_energy_kwh;
    let mut completed = 0;
    let mut total_reward = 0.0;
    let mut energy_used_kwh = TERRAIN_OVERHEAD_KWH;

    for task in ordered {
        if task.energy_kwh() <= remaining {
            remaining -= task.energy_kwh();
            energy_used_kwh += task.energy_kwh();
            total_reward += task.reward();
            completed += 1;
        }
    }

    let completion_rate = if scenario.tasks.is_empty() {
        0.0
    } else {
        completed as f64 / scenario.tasks.len() as f64 * 100.0
    };
    let efficiency = total_reward / energy_used_kwh.max(EFFICIENCY_ENERGY_FLOOR_KWH);

    let run = PolicyRun {
        policy: policy.name(),
        completed,
        completion_rate,
        total_reward,
        energy_used_kwh,
        efficiency,
    };
    for (metric, value) in [
        ("completion_rate", run.completion_rate),
        ("total_reward", run.total_reward),
        ("energy_used", run.energy_used_kwh),
        ("efficiency", run.efficiency),
    ] {
        if !value.is_finite() {
            return Err(BenchError::NonFiniteMetric {
                policy: run.policy,
                metric,
            });
        }
    }
    Ok(run)
}

/// Draw a scenario and run every policy on it.
///
/// Fails if the scenario cannot be generated or any policy fails on it.
pub fn run_trial<R: Rng + ?Sized>(
    config: &RoverConfig,
    policies: &[Policy],
    rng: &mut R,
) -> Result<Vec<PolicyRun>, BenchError> {
    let scenario = generate_scenario(config, rng)?;
    policies
        .iter()
        .map(|policy| run_policy(policy, &scenario, rng))
        .collect()
}

// ── Aggregation ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct Samples {
    completion: Vec<f64>,
    efficiency: Vec<f64>,
    reward: Vec<f64>,
    energy: Vec<f64>,
}

/// Collects trial results, keeping only trials valid for every policy.
#[derive(Debug, Clone)]
pub struct BenchmarkAccumulator {
    policies: Vec<Policy>,
    samples: Vec<Samples>,
    attempted: usize,
    valid: usize,
}

impl BenchmarkAccumulator {
    pub fn new(policies: &[Policy]) -> Self {
        Self {
            policies: policies.to_vec(),
            samples: vec![Samples::default(); policies.len()],
            attempted: 0,
            valid: 0,
        }
    }

    /// Record one trial.  A failed trial only bumps the attempted count.
    pub fn record(&mut self, trial: Result<Vec<PolicyRun>, BenchError>) {
        self.attempted += 1;
        let runs = match trial {
            Ok(runs) if runs.len() == self.policies.len() => runs,
            Ok(runs) => {
                warn!(
                    trial = self.attempted,
                    expected = self.policies.len(),
                    got = runs.len(),
                    "Trial discarded: incomplete policy results"
                );
                return;
            }
            Err(e) => {
                warn!(trial = self.attempted, error = %e, "Trial discarded");
                return;
            }
        };

        for (samples, run) in self.samples.iter_mut().zip(runs) {
            samples.completion.push(run.completion_rate);
            samples.efficiency.push(run.efficiency);
            samples.reward.push(run.total_reward);
            samples.energy.push(run.energy_used_kwh);
        }
        self.valid += 1;
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn valid(&self) -> usize {
        self.valid
    }

    /// Build the report.  The first policy is the baseline.
    pub fn finish(&self, rover: &str) -> BenchmarkReport {
        let policies = self
            .policies
            .iter()
            .zip(&self.samples)
            .map(|(policy, s)| PolicyStats {
                policy: policy.name().to_string(),
                completion_rate: MetricStats::from_values(&s.completion),
                efficiency: MetricStats::from_values(&s.efficiency),
                total_reward: MetricStats::from_values(&s.reward),
                energy_used_kwh: MetricStats::from_values(&s.energy),
            })
            .collect();

        let mut improvements_vs_fifo = Vec::new();
        let mut effect_sizes_vs_fifo = Vec::new();
        if let Some(base) = self.samples.first() {
            for (policy, s) in self.policies.iter().zip(&self.samples).skip(1) {
                improvements_vs_fifo.push(Improvement {
                    policy: policy.name().to_string(),
                    completion_rate: mean(&s.completion) - mean(&base.completion),
                    efficiency: mean(&s.efficiency) - mean(&base.efficiency),
                    total_reward: mean(&s.reward) - mean(&base.reward),
                });
                effect_sizes_vs_fifo.push(EffectSizes {
                    policy: policy.name().to_string(),
                    completion_rate: Effect::between(&s.completion, &base.completion),
                    efficiency: Effect::between(&s.efficiency, &base.efficiency),
                    total_reward: Effect::between(&s.reward, &base.reward),
                });
            }
        }

        BenchmarkReport {
            rover: rover.to_string(),
            seed: None,
            attempted_trials: self.attempted,
            valid_trials: self.valid,
            policies,
            improvements_vs_fifo,
            effect_sizes_vs_fifo,
        }
    }
}

/// Run `bench.trials` trials and summarise them.
pub fn run_benchmark<R: Rng + ?Sized>(
    config: &RoverConfig,
    bench: &BenchmarkConfig,
    rng: &mut R,
) -> BenchmarkReport {
    info!(
        rover = %config.name,
        trials = bench.trials,
        policies = bench.policies().len(),
        "=== Monte Carlo benchmark ==="
    );

    let mut acc = BenchmarkAccumulator::new(bench.policies());
    for trial in 1..=bench.trials {
        acc.record(run_trial(config, bench.policies(), rng));
        if trial % PROGRESS_INTERVAL == 0 {
            info!("Completed {}/{} trials ({} valid)", trial, bench.trials, acc.valid());
        }
    }

    if acc.valid() < acc.attempted() {
        warn!(
            valid = acc.valid(),
            attempted = acc.attempted(),
            "Some trials were discarded"
        );
    }
    info!(valid = acc.valid(), "Monte Carlo simulation complete");

    acc.finish(&config.name)
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyStats {
    pub policy: String,
    pub completion_rate: MetricStats,
    pub efficiency: MetricStats,
    pub total_reward: MetricStats,
    pub energy_used_kwh: MetricStats,
}

/// Difference of means against FIFO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub policy: String,
    pub completion_rate: f64,
    pub efficiency: f64,
    pub total_reward: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effect {
    pub d: f64,
    pub magnitude: EffectSize,
}

impl Effect {
    fn between(a: &[f64], b: &[f64]) -> Self {
        let d = cohens_d(a, b);
        Self {
            d,
            magnitude: EffectSize::from_d(d),
        }
    }
}

/// Cohen's d against FIFO.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSizes {
    pub policy: String,
    pub completion_rate: Effect,
    pub efficiency: Effect,
    pub total_reward: Effect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub rover: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub attempted_trials: usize,
    pub valid_trials: usize,
    pub policies: Vec<PolicyStats>,
    pub improvements_vs_fifo: Vec<Improvement>,
    pub effect_sizes_vs_fifo: Vec<EffectSizes>,
}

impl BenchmarkReport {
    pub fn policy(&self, name: &str) -> Option<&PolicyStats> {
        self.policies.iter().find(|p| p.policy == name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
