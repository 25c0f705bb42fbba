/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! RTG-aware energy feasibility for rovers with a radioisotope power source.
//!
//! # Status: advisory
//!
//! The mission executor decides completion with the battery-only rule
//! (`energy ≤ battery · capacity − capacity · reserve`).  This module is
//! **evaluated and logged** after every run on configurations that carry a
//! [`PowerSystem`]; a task the RTG model would have refused produces an
//! advisory warning but keeps its completed status.
//!
//! # Model
//! The RTG delivers a fixed daily energy that decays with mission age:
//!
//! ```text
//! budget(sol) = rtg_daily · (1 − degradation)^(sol / 687)
//! ```
//!
//! A task is allowed when all of the following hold:
//!
//! | Check | Condition |
//! |---|---|
//! | Peak power | `current_draw + task_power ≤ 0.9 · peak_power` |
//! | Daily budget | `task_energy ≤ rtg_daily + battery_available − idle_consumption` |
//! | Minimum SoC | `soc − max(0, task_energy − rtg_daily / 24) / capacity ≥ min_soc` |
//!
//! The minimum-SoC check credits one hour of RTG output against the task.

use serde::Serialize;

use crate::config::{PowerSystem, RoverConfig, TaskType, MARS_YEAR_SOLS};
use crate::task::CostedTask;

/// Fraction of peak power that concurrent loads may draw.
pub const CONCURRENT_POWER_MARGIN: f64 = 0.9;

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Energy available for tasks over one sol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBudget {
    pub rtg_daily_kwh: f64,
    pub battery_total_kwh: f64,
    pub battery_available_kwh: f64,
    pub idle_consumption_kwh: f64,
    /// Floored at zero.
    pub total_available_kwh: f64,
    pub current_soc: f64,
}

/// A task the RTG model accepts, with the state of charge it would leave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskClearance {
    pub energy_required_kwh: f64,
    pub power_required_w: f64,
    pub projected_soc: f64,
}

/// Why the RTG model refuses a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RtgRejection {
    UnknownTaskType { task_type: TaskType },

    PeakPowerExceeded { total_power_w: f64, limit_w: f64 },

    InsufficientEnergyBudget {
        required_kwh: f64,
        available_kwh: f64,
    },

    MinSocViolation { projected_soc: f64, min_soc: f64 },
}

impl std::fmt::Display for RtgRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RtgRejection::UnknownTaskType { task_type } => {
                write!(f, "task type '{}' has no configured power draw", task_type)
            }
            RtgRejection::PeakPowerExceeded {
                total_power_w,
                limit_w,
            } => write!(
                f,
                "concurrent power {:.0} W exceeds limit {:.0} W",
                total_power_w, limit_w
            ),
            RtgRejection::InsufficientEnergyBudget {
                required_kwh,
                available_kwh,
            } => write!(
                f,
                "requires {:.3} kWh but daily budget has {:.3} kWh",
                required_kwh, available_kwh
            ),
            RtgRejection::MinSocViolation {
                projected_soc,
                min_soc,
            } => write!(
                f,
                "projected SoC {:.1}% below minimum {:.1}%",
                projected_soc * 100.0,
                min_soc * 100.0
            ),
        }
    }
}

/// Result of an overnight RTG recharge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RechargeResult {
    pub initial_soc: f64,
    pub final_soc: f64,
    pub energy_added_kwh: f64,
    pub charging_power_w: f64,
    pub recharge_hours: f64,
}

// ── RtgFeasibility ────────────────────────────────────────────────────────────

/// RTG feasibility calculator bound to one configuration.
#[derive(Debug, Clone, Copy)]
pub struct RtgFeasibility<'a> {
    config: &'a RoverConfig,
    power: &'a PowerSystem,
    sol: u32,
}

impl<'a> RtgFeasibility<'a> {
    /// `None` when `config` has no power system.
    pub fn new(config: &'a RoverConfig) -> Option<Self> {
        config.power_system.as_ref().map(|power| Self {
            config,
            power,
            sol: 0,
        })
    }

    /// Evaluate budgets as of mission sol `sol` (default 0).
    pub fn at_sol(mut self, sol: u32) -> Self {
        self.sol = sol;
        self
    }

    pub fn daily_energy_budget(&self, sol: u32) -> f64 {
        let years_elapsed = f64::from(sol) / MARS_YEAR_SOLS;
        let retained = (1.0 - self.power.rtg_annual_degradation).powf(years_elapsed);
        self.power.rtg_daily_energy_kwh * retained
    }

    pub fn max_concurrent_power_w(&self) -> f64 {
        self.config.peak_power_w * CONCURRENT_POWER_MARGIN
    }

    pub fn available_energy(&self, soc: f64) -> EnergyBudget {
        let capacity = self.config.battery_capacity_kwh;
        let rtg_daily_kwh = self.daily_energy_budget(self.sol);
        let battery_total_kwh = capacity * soc;
        let battery_available_kwh = (battery_total_kwh - self.config.reserve_energy_kwh()).max(0.0);
        let idle_consumption_kwh =
            self.power.idle_power_w * self.power.active_operations_hours / 1000.0;

        EnergyBudget {
            rtg_daily_kwh,
            battery_total_kwh,
            battery_available_kwh,
            idle_consumption_kwh,
            total_available_kwh: (rtg_daily_kwh + battery_available_kwh - idle_consumption_kwh)
                .max(0.0),
            current_soc: soc,
        }
    }

    /// Decide whether `task` may start at `soc` while `current_power_draw_w`
    /// is already being drawn.
    pub fn check_task(
        &self,
        task: &CostedTask,
        soc: f64,
        current_power_draw_w: f64,
    ) -> Result<TaskClearance, RtgRejection> {
        let task_type = task.task().task_type;
        let power_required_w = self
            .config
            .task_power(task_type)
            .ok_or(RtgRejection::UnknownTaskType { task_type })?;

        let total_power_w = current_power_draw_w + power_required_w;
        let limit_w = self.max_concurrent_power_w();
        if total_power_w > limit_w {
            return Err(RtgRejection::PeakPowerExceeded {
                total_power_w,
                limit_w,
            });
        }

        let budget = self.available_energy(soc);
        let energy_required_kwh = task.energy_kwh();
        if energy_required_kwh > budget.total_available_kwh {
            return Err(RtgRejection::InsufficientEnergyBudget {
                required_kwh: energy_required_kwh,
                available_kwh: budget.total_available_kwh,
            });
        }

        let hourly_rtg_kwh = budget.rtg_daily_kwh / 24.0;
        let battery_energy_needed = (energy_required_kwh - hourly_rtg_kwh).max(0.0);
        let projected_soc = soc - battery_energy_needed / self.config.battery_capacity_kwh;
        if projected_soc < self.power.battery_min_soc {
            return Err(RtgRejection::MinSocViolation {
                projected_soc,
                min_soc: self.power.battery_min_soc,
            });
        }

        Ok(TaskClearance {
            energy_required_kwh,
            power_required_w,
            projected_soc,
        })
    }

    /// Charge the battery from RTG surplus over the overnight window.
    pub fn simulate_overnight_recharge(&self, soc: f64) -> RechargeResult {
        let capacity = self.config.battery_capacity_kwh;
        let charging_power_w = self.power.rtg_continuous_power_w - self.power.idle_power_w;
        let max_charge_kwh = charging_power_w * self.power.overnight_recharge_hours / 1000.0;
        let headroom_kwh = capacity - soc * capacity;
        let energy_added_kwh = max_charge_kwh.min(headroom_kwh);

        RechargeResult {
            initial_soc: soc,
            final_soc: (soc + energy_added_kwh / capacity).min(1.0),
            energy_added_kwh,
            charging_power_w,
            recharge_hours: self.power.overnight_recharge_hours,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    const EPS: f64 = 1e-9;

    fn perseverance() -> RoverConfig {
        RoverConfig::perseverance()
    }

    fn costed(task_type: TaskType, hours: f64) -> CostedTask {
        let cfg = perseverance();
        let power = cfg.task_power(task_type).unwrap();
        CostedTask::new(
            Task::new("T", task_type, hours, 5.0, 10.0),
            power * hours / 1000.0,
        )
    }

    // ── Construction ──────────────────────────────────────────────────────────

    #[test]
    fn baseline_profile_has_no_rtg_model() {
        assert!(RtgFeasibility::new(&RoverConfig::baseline()).is_none());
        assert!(RtgFeasibility::new(&perseverance()).is_some());
    }

    // ── Budget ────────────────────────────────────────────────────────────────

    #[test]
    fn daily_budget_degrades_per_mars_year() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        assert!((rtg.daily_energy_budget(0) - 2.5).abs() < EPS);
        assert!((rtg.daily_energy_budget(687) - 2.5 * 0.985).abs() < EPS);
        assert!(rtg.daily_energy_budget(2000) < rtg.daily_energy_budget(1000));
    }

    #[test]
    fn available_energy_breakdown() {
        let cfg = perseverance();
        let b = RtgFeasibility::new(&cfg).unwrap().available_energy(0.95);
        assert!((b.battery_total_kwh - 1.272 * 0.95).abs() < EPS);
        assert!((b.battery_available_kwh - (1.272 * 0.95 - 1.272 * 0.15)).abs() < EPS);
        assert!((b.idle_consumption_kwh - 0.56).abs() < EPS);
        let expected = 2.5 + b.battery_available_kwh - 0.56;
        assert!((b.total_available_kwh - expected).abs() < EPS);
    }

    #[test]
    fn battery_below_reserve_contributes_nothing() {
        let cfg = perseverance();
        let b = RtgFeasibility::new(&cfg).unwrap().available_energy(0.10);
        assert_eq!(b.battery_available_kwh, 0.0);
        assert!((b.total_available_kwh - (2.5 - 0.56)).abs() < EPS);
    }

    // ── check_task ────────────────────────────────────────────────────────────

    #[test]
    fn one_hour_drill_is_allowed_from_high_soc() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        let clearance = rtg.check_task(&costed(TaskType::Drilling, 1.0), 0.95, 0.0).unwrap();
        let expected_soc = 0.95 - (0.6 - 2.5 / 24.0) / 1.272;
        assert!((clearance.projected_soc - expected_soc).abs() < EPS);
        assert_eq!(clearance.power_required_w, 600.0);
    }

    #[test]
    fn concurrent_draw_over_ninety_percent_of_peak_is_rejected() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        let err = rtg
            .check_task(&costed(TaskType::Drilling, 1.0), 0.95, 300.0)
            .unwrap_err();
        assert_eq!(
            err,
            RtgRejection::PeakPowerExceeded {
                total_power_w: 900.0,
                limit_w: 810.0
            }
        );
    }

    #[test]
    fn task_beyond_daily_budget_is_rejected() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        // 150 W × 13.5 h = 2.025 kWh > 1.94 kWh
        let err = rtg
            .check_task(&costed(TaskType::Navigation, 13.5), 0.15, 0.0)
            .unwrap_err();
        assert!(matches!(err, RtgRejection::InsufficientEnergyBudget { .. }), "{err}");
    }

    #[test]
    fn long_drill_violates_minimum_soc() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        let err = rtg.check_task(&costed(TaskType::Drilling, 2.0), 0.95, 0.0).unwrap_err();
        match err {
            RtgRejection::MinSocViolation {
                projected_soc,
                min_soc,
            } => {
                assert!(projected_soc < min_soc);
                assert_eq!(min_soc, 0.47);
            }
            other => panic!("expected MinSocViolation, got {other:?}"),
        }
    }

    #[test]
    fn small_task_is_covered_by_hourly_rtg_output() {
        let cfg = perseverance();
        let rtg = RtgFeasibility::new(&cfg).unwrap();
        // 20 W × 1 h = 0.02 kWh < 2.5/24 kWh, so the battery is untouched
        let clearance = rtg.check_task(&costed(TaskType::Imaging, 1.0), 0.8, 0.0).unwrap();
        assert!((clearance.projected_soc - 0.8).abs() < EPS);
    }

    // ── Overnight recharge ────────────────────────────────────────────────────

    #[test]
    fn recharge_is_limited_by_rtg_surplus() {
        let cfg = perseverance();
        let r = RtgFeasibility::new(&cfg).unwrap().simulate_overnight_recharge(0.2);
        assert_eq!(r.charging_power_w, 70.0);
        assert!((r.energy_added_kwh - 0.742).abs() < EPS);
        assert!((r.final_soc - (0.2 + 0.742 / 1.272)).abs() < EPS);
    }

    #[test]
    fn recharge_is_capped_at_full() {
        let cfg = perseverance();
        let r = RtgFeasibility::new(&cfg).unwrap().simulate_overnight_recharge(0.8);
        assert!((r.final_soc - 1.0).abs() < EPS);
        assert!((r.energy_added_kwh - 0.2 * 1.272).abs() < EPS);
    }
}
