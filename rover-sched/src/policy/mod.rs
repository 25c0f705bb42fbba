/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Task ordering policies.
//!
//! Every policy is a total order over a set of [`CostedTask`]s.  Policies are
//! pure: they never look at the battery, feasibility is decided afterwards by
//! the executor.  All sorts are stable, so ties keep their input order.
//!
//! | Policy | Order |
//! |---|---|
//! | `FIFO` | input order |
//! | `EnergyGreedy` | energy ascending |
//! | `UrgencyFirst` | urgency descending |
//! | `Random` | uniform shuffle from the caller's RNG |
//! | `WSPT` | reward / duration descending |
//! | `WeightedCost` | composite cost ascending (see [`weighted`]) |
//!
//! # Example
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rover_sched::config::TaskType;
//! use rover_sched::policy::Policy;
//! use rover_sched::task::{CostedTask, Task};
//!
//! let tasks = vec![
//!     CostedTask::new(Task::new("A", TaskType::Drilling, 3.0, 9.0, 50.0), 3.0),
//!     CostedTask::new(Task::new("B", TaskType::Imaging, 3.0, 2.0, 5.0), 6.0),
//! ];
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let order = "energy_greedy".parse::<Policy>().unwrap().order(&tasks, &mut rng);
//! assert_eq!(order[0].task_id(), "A");
//! ```

pub mod weighted;

pub use weighted::{weighted_cost, CostWeights};

use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::task::CostedTask;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Floor applied to durations before dividing by them.
pub const DURATION_FLOOR_HOURS: f64 = 0.001;

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The policy name is not recognised.
    #[error(
        "unknown scheduling policy: '{0}' (valid: fifo, energy_greedy, urgency_first, random, wspt, weighted_cost)"
    )]
    UnknownPolicy(String),
}

// ── Policy ────────────────────────────────────────────────────────────────────

/// One of the ordering policies compared by the benchmark harness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    Fifo,
    EnergyGreedy,
    UrgencyFirst,
    Random,
    Wspt,
    WeightedCost(CostWeights),
}

impl Policy {
    /// All six policies, FIFO first, with default cost weights.
    pub fn all() -> Vec<Policy> {
        vec![
            Policy::Fifo,
            Policy::EnergyGreedy,
            Policy::UrgencyFirst,
            Policy::Random,
            Policy::Wspt,
            Policy::WeightedCost(CostWeights::default()),
        ]
    }

    /// Display name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::EnergyGreedy => "EnergyGreedy",
            Policy::UrgencyFirst => "UrgencyFirst",
            Policy::Random => "Random",
            Policy::Wspt => "WSPT",
            Policy::WeightedCost(_) => "WeightedCost",
        }
    }

    /// Order `tasks` under this policy.
    ///
    /// `rng` is consumed only by [`Policy::Random`].
    pub fn order<'t, R: Rng + ?Sized>(
        &self,
        tasks: &'t [CostedTask],
        rng: &mut R,
    ) -> Vec<&'t CostedTask> {
        let mut ordered: Vec<&CostedTask> = tasks.iter().collect();

        match self {
            Policy::Fifo => {}
            Policy::EnergyGreedy => {
                ordered.sort_by(|a, b| a.energy_kwh().total_cmp(&b.energy_kwh()));
            }
            Policy::UrgencyFirst => {
                ordered.sort_by(|a, b| b.urgency().total_cmp(&a.urgency()));
            }
            Policy::Random => ordered.shuffle(rng),
            Policy::Wspt => {
                ordered.sort_by(|a, b| wspt_ratio(b).total_cmp(&wspt_ratio(a)));
            }
            Policy::WeightedCost(weights) => {
                // Compute each cost once; the sort compares cached keys.
                let mut keyed: Vec<(f64, &CostedTask)> = ordered
                    .into_iter()
                    .map(|t| (weighted_cost(t, weights), t))
                    .collect();
                keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
                ordered = keyed.into_iter().map(|(_, t)| t).collect();
            }
        }

        ordered
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = PolicyError;

    /// Accepts display names and snake/kebab-case forms, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "fifo" => Ok(Policy::Fifo),
            "energygreedy" => Ok(Policy::EnergyGreedy),
            "urgencyfirst" => Ok(Policy::UrgencyFirst),
            "random" => Ok(Policy::Random),
            "wspt" => Ok(Policy::Wspt),
            "weightedcost" => Ok(Policy::WeightedCost(CostWeights::default())),
            _ => Err(PolicyError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Reward per hour with the duration floored at [`DURATION_FLOOR_HOURS`].
pub fn wspt_ratio(task: &CostedTask) -> f64 {
    task.reward() / task.duration_hours().max(DURATION_FLOOR_HOURS)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
