/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Composite cost used by the `WeightedCost` policy.
//!
//! ```text
//! cost = energy_weight     · E
//!      + urgency_weight    · 1 / max(U, 0.1)
//!      + reward_weight     · R
//!      + efficiency_weight · R / max(E, 0.001)
//!      + time_sensitivity(U)
//! ```
//!
//! Lower cost runs first.  Reward and efficiency weights are negative so that
//! valuable, energy-cheap work floats to the front.

use serde::{Deserialize, Serialize};

use crate::task::CostedTask;

/// Floor applied to urgency before inverting it.
pub const URGENCY_FLOOR: f64 = 0.1;

/// Floor applied to energy before dividing reward by it.
pub const ENERGY_FLOOR_KWH: f64 = 0.001;

/// Urgency strictly above this earns [`CostWeights::high_urgency_bonus`].
pub const HIGH_URGENCY: f64 = 8.0;

/// Urgency strictly below this pays [`CostWeights::low_urgency_penalty`].
pub const LOW_URGENCY: f64 = 3.0;

/// Tunable weights for [`weighted_cost`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostWeights {
    pub energy_weight: f64,
    pub urgency_weight: f64,
    pub reward_weight: f64,
    pub efficiency_weight: f64,
    pub high_urgency_bonus: f64,
    pub low_urgency_penalty: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            energy_weight: 1.0,
            urgency_weight: 0.5,
            reward_weight: -2.0,
            efficiency_weight: -0.5,
            high_urgency_bonus: -1.0,
            low_urgency_penalty: 0.5,
        }
    }
}

impl CostWeights {
    /// Step term added on top of the linear components.
    pub fn time_sensitivity(&self, urgency: f64) -> f64 {
        if urgency > HIGH_URGENCY {
            self.high_urgency_bonus
        } else if urgency < LOW_URGENCY {
            self.low_urgency_penalty
        } else {
            0.0
        }
    }
}

/// Composite cost of `task`; lower means higher priority.
pub fn weighted_cost(task: &CostedTask, w: &CostWeights) -> f64 {
    let energy = task.energy_kwh();
    let urgency = task.urgency();
    let reward = task.reward();

    w.energy_weight * energy
        + w.urgency_weight / urgency.max(URGENCY_FLOOR)
        + w.reward_weight * reward
        + w.efficiency_weight * (reward / energy.max(ENERGY_FLOOR_KWH))
        + w.time_sensitivity(urgency)
}
