/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Steady-state power and energy model for traversal and task execution.
//!
//! Every operation is a closed-form function of its inputs and the
//! [`RoverConfig`]; nothing here holds state.
//!
//! | Quantity | Formula | Unit |
//! |---|---|---|
//! | slope force | `m·g·sin θ` | N |
//! | rolling resistance | `μ·m·g·cos θ` | N |
//! | roughness penalty | `roughness · v · 50` | W |
//! | electrical power | `((abs(F_slope) + F_roll)·v + penalty) / (η_motor·η_drive)` | W |
//! | traversal time | `d / (v · 3600)` | h |
//! | energy | `P · t / 1000` | kWh |
//! | task energy | `P(type) · duration / 1000` | kWh |
//!
//! The slope term uses the magnitude of the slope force: descending is charged like ascending
//! (braking), there is no regenerative credit.

use serde::{Deserialize, Serialize};

use crate::config::{RoverConfig, TaskType};
use crate::task::{CostedTask, Task};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Empirical roughness penalty, W per unit of `roughness · velocity`.
///
/// A linear surrogate fitted to traverse logs, not a physical law.
pub const ROUGHNESS_POWER_COEFF: f64 = 50.0;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while computing energy figures.
#[derive(Debug, Clone, PartialEq)]
pub enum EnergyError {
    /// Traversal velocity was zero, negative or not a number.
    NonPositiveVelocity { velocity_mps: f64 },

    /// A task duration was zero, negative or not a number.
    NonPositiveDuration { task_id: String, duration_hours: f64 },

    /// The task type has no entry in the configuration's power table.
    UnknownTaskType { task_type: TaskType },
}

impl std::fmt::Display for EnergyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnergyError::NonPositiveVelocity { velocity_mps } => {
                write!(f, "velocity must be positive, got {velocity_mps} m/s")
            }
            EnergyError::NonPositiveDuration {
                task_id,
                duration_hours,
            } => write!(
                f,
                "task '{task_id}' has non-positive duration {duration_hours} h"
            ),
            EnergyError::UnknownTaskType { task_type } => {
                write!(f, "unknown task type: '{task_type}' has no configured power draw")
            }
        }
    }
}

impl std::error::Error for EnergyError {}

// ── Inputs / outputs ──────────────────────────────────────────────────────────

/// One stretch of terrain to traverse.
///
/// `slope_deg` and `roughness` default to flat, smooth ground when absent;
/// `velocity` falls back to the caller's traversal velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainSegment {
    /// Length in metres.
    pub distance: f64,
    /// Slope in degrees; positive is uphill.
    #[serde(default)]
    pub slope_deg: f64,
    /// Dimensionless roughness, conventionally in `[0, 1]`.
    #[serde(default)]
    pub roughness: f64,
    /// Per-segment velocity override in m/s.
    #[serde(default)]
    pub velocity: Option<f64>,
}

impl TerrainSegment {
    pub fn new(distance: f64, slope_deg: f64, roughness: f64) -> Self {
        Self {
            distance,
            slope_deg,
            roughness,
            velocity: None,
        }
    }
}

/// Breakdown of one traversal energy calculation, inputs included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentEnergy {
    pub distance_m: f64,
    pub time_hours: f64,
    pub power_w: f64,
    pub energy_kwh: f64,
    pub slope_deg: f64,
    pub velocity_mps: f64,
    pub roughness: f64,
}

/// Order-independent energy estimate for a whole mission.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MissionEnergyEstimate {
    pub movement_energy_kwh: f64,
    pub task_energy_kwh: f64,
    pub total_energy_kwh: f64,
    pub total_time_hours: f64,
    /// `total_energy / capacity · 100`.
    pub battery_usage_percent: f64,
}

// ── EnergyModel ───────────────────────────────────────────────────────────────

/// Energy calculator bound to one rover configuration.
#[derive(Debug, Clone, Copy)]
pub struct EnergyModel<'a> {
    config: &'a RoverConfig,
}

impl<'a> EnergyModel<'a> {
    pub fn new(config: &'a RoverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a RoverConfig {
        self.config
    }

    /// Gravitational force component along the slope, in N.
    ///
    /// Odd in `slope_deg`: negative slopes give a negative force.
    pub fn slope_force(&self, slope_deg: f64, mass_kg: f64) -> f64 {
        mass_kg * self.config.gravity_mps2 * slope_deg.to_radians().sin()
    }

    /// Rolling resistance on the slope's normal force, in N.
    pub fn rolling_resistance(&self, mass_kg: f64, slope_deg: f64) -> f64 {
        let normal_force = mass_kg * self.config.gravity_mps2 * slope_deg.to_radians().cos();
        self.config.rolling_resistance_coeff * normal_force
    }

    /// Extra power drawn on rough ground, in W.
    pub fn roughness_penalty(roughness: f64, velocity_mps: f64) -> f64 {
        roughness * velocity_mps * ROUGHNESS_POWER_COEFF
    }

    /// Electrical power needed to drive at `velocity_mps`, in W.
    pub fn power_consumption(
        &self,
        slope_deg: f64,
        velocity_mps: f64,
        roughness: f64,
        mass_kg: f64,
    ) -> f64 {
        let total_force = self.slope_force(slope_deg, mass_kg).abs()
            + self.rolling_resistance(mass_kg, slope_deg);
        let mechanical_power = total_force * velocity_mps;
        let penalty = Self::roughness_penalty(roughness, velocity_mps);

        (mechanical_power + penalty)
            / (self.config.motor_efficiency * self.config.drivetrain_efficiency)
    }

    /// Energy to cover `distance_m` at constant velocity.
    ///
    /// # Errors
    /// [`EnergyError::NonPositiveVelocity`] when `velocity_mps <= 0` (or NaN).
    pub fn energy_consumption(
        &self,
        distance_m: f64,
        slope_deg: f64,
        velocity_mps: f64,
        roughness: f64,
        mass_kg: f64,
    ) -> Result<SegmentEnergy, EnergyError> {
        if !(velocity_mps > 0.0) {
            return Err(EnergyError::NonPositiveVelocity { velocity_mps });
        }

        let time_hours = distance_m / (velocity_mps * 3600.0);
        let power_w = self.power_consumption(slope_deg, velocity_mps, roughness, mass_kg);
        let energy_kwh = power_w * time_hours / 1000.0;

        Ok(SegmentEnergy {
            distance_m,
            time_hours,
            power_w,
            energy_kwh,
            slope_deg,
            velocity_mps,
            roughness,
        })
    }

    /// Energy for one terrain segment at the configured rover mass.
    ///
    /// Uses the segment's own velocity if set, otherwise `default_velocity_mps`.
    pub fn segment_energy(
        &self,
        segment: &TerrainSegment,
        default_velocity_mps: f64,
    ) -> Result<SegmentEnergy, EnergyError> {
        self.energy_consumption(
            segment.distance,
            segment.slope_deg,
            segment.velocity.unwrap_or(default_velocity_mps),
            segment.roughness,
            self.config.mass_kg,
        )
    }

    /// Energy drawn by running `task_type` for `duration_hours`, in kWh.
    ///
    /// # Errors
    /// [`EnergyError::UnknownTaskType`] when the type is not in the power table.
    pub fn task_energy(
        &self,
        task_type: TaskType,
        duration_hours: f64,
    ) -> Result<f64, EnergyError> {
        let power_w = self
            .config
            .task_power(task_type)
            .ok_or(EnergyError::UnknownTaskType { task_type })?;
        Ok(power_w * duration_hours / 1000.0)
    }

    /// Attach the energy cost to `task`.
    ///
    /// Rejects non-positive durations before looking up the power table.
    pub fn cost_task(&self, task: &Task) -> Result<CostedTask, EnergyError> {
        if !(task.duration_hours > 0.0) {
            return Err(EnergyError::NonPositiveDuration {
                task_id: task.task_id.clone(),
                duration_hours: task.duration_hours,
            });
        }
        let energy_kwh = self.task_energy(task.task_type, task.duration_hours)?;
        Ok(CostedTask::new(task.clone(), energy_kwh))
    }

    /// Static energy estimate for traversing `segments` and running `tasks`.
    ///
    /// Independent of execution order.  Segments without a velocity use the
    /// configured nominal velocity.  Empty inputs give an all-zero estimate.
    pub fn estimate_mission_energy(
        &self,
        segments: &[TerrainSegment],
        tasks: &[Task],
    ) -> Result<MissionEnergyEstimate, EnergyError> {
        let mut movement_energy_kwh = 0.0;
        let mut task_energy_kwh = 0.0;
        let mut total_time_hours = 0.0;

        for segment in segments {
            let result = self.segment_energy(segment, self.config.nominal_velocity_mps)?;
            movement_energy_kwh += result.energy_kwh;
            total_time_hours += result.time_hours;
        }

        for task in tasks {
            task_energy_kwh += self.task_energy(task.task_type, task.duration_hours)?;
            total_time_hours += task.duration_hours;
        }

        let total_energy_kwh = movement_energy_kwh + task_energy_kwh;

        Ok(MissionEnergyEstimate {
            movement_energy_kwh,
            task_energy_kwh,
            total_energy_kwh,
            total_time_hours,
            battery_usage_percent: total_energy_kwh / self.config.battery_capacity_kwh * 100.0,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
