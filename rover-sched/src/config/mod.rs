/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Rover configuration loading and validation.
//!
//! A [`RoverConfig`] is built once (from a built-in profile or a YAML file),
//! validated, and then passed by reference into the energy model, the mission
//! simulator and the benchmark harness.  Nothing mutates it afterwards.
//!
//! The expected YAML structure is (every key is optional and falls back to the
//! baseline profile):
//! ```yaml
//! name: "baseline"
//! mass_kg: 899.0
//! gravity_mps2: 3.71
//! rolling_resistance_coeff: 0.15
//! motor_efficiency: 0.85
//! drivetrain_efficiency: 0.90
//! battery_capacity_kwh: 42.24
//! reserve_ratio: 0.20
//! critical_energy_threshold: 0.10
//! nominal_velocity_mps: 0.042
//! task_power_w:
//!   navigation: 50.0
//!   drilling: 120.0
//! ```
//!
//! A `task_power_w` table in the file **replaces** the default table; it is
//! not merged key by key.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Mars surface gravity in m/s².
pub const GRAVITY_MARS: f64 = 3.71;

/// Length of a Martian year in sols, used for RTG degradation.
pub const MARS_YEAR_SOLS: f64 = 687.0;

/// Earth hours per sol.
pub const SOL_DURATION_HOURS: f64 = 24.6;

// ── Task types ────────────────────────────────────────────────────────────────

/// Closed set of instrument / mobility task types the rover can execute.
///
/// Serialised in `snake_case` (`"sample_collection"`), which is also the form
/// accepted by [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Navigation,
    SampleCollection,
    Drilling,
    Imaging,
    Spectrometry,
    Communication,
    Idle,
}

impl TaskType {
    /// Every task type, in declaration order.
    pub const ALL: [TaskType; 7] = [
        TaskType::Navigation,
        TaskType::SampleCollection,
        TaskType::Drilling,
        TaskType::Imaging,
        TaskType::Spectrometry,
        TaskType::Communication,
        TaskType::Idle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Navigation => "navigation",
            TaskType::SampleCollection => "sample_collection",
            TaskType::Drilling => "drilling",
            TaskType::Imaging => "imaging",
            TaskType::Spectrometry => "spectrometry",
            TaskType::Communication => "communication",
            TaskType::Idle => "idle",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`TaskType::from_str`] for a name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTaskTypeError(pub String);

impl fmt::Display for ParseTaskTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown task type '{}'", self.0)
    }
}

impl std::error::Error for ParseTaskTypeError {}

impl FromStr for TaskType {
    type Err = ParseTaskTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseTaskTypeError(s.to_string()))
    }
}

// ── RTG power system ──────────────────────────────────────────────────────────

/// Radioisotope power source and battery management limits used by the
/// RTG-aware advisory check (see [`crate::mission::feasibility`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PowerSystem {
    /// Continuous RTG electrical output in W.
    pub rtg_continuous_power_w: f64,
    /// RTG energy delivered per sol in kWh.
    pub rtg_daily_energy_kwh: f64,
    /// Fractional output loss per Mars year.
    pub rtg_annual_degradation: f64,
    /// Baseline draw of avionics, heaters and CPU in W.
    pub idle_power_w: f64,
    /// Length of the active task window in hours.
    pub active_operations_hours: f64,
    /// Length of the overnight low-power recharge window in hours.
    pub overnight_recharge_hours: f64,
    /// State of charge the battery must never fall below.
    pub battery_min_soc: f64,
}

impl Default for PowerSystem {
    fn default() -> Self {
        Self {
            rtg_continuous_power_w: 110.0,
            rtg_daily_energy_kwh: 2.5,
            rtg_annual_degradation: 0.015,
            idle_power_w: 40.0,
            active_operations_hours: 14.0,
            overnight_recharge_hours: 10.6,
            battery_min_soc: 0.47,
        }
    }
}

// ── RoverConfig ───────────────────────────────────────────────────────────────

/// Physical constants, efficiencies, battery limits and the task power table
/// for one rover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoverConfig {
    /// Human-readable profile name.
    pub name: String,

    // ── Physical ──────────────────────────────────────────────────────────────
    pub mass_kg: f64,
    pub gravity_mps2: f64,
    pub rolling_resistance_coeff: f64,
    pub motor_efficiency: f64,
    pub drivetrain_efficiency: f64,

    // ── Battery ───────────────────────────────────────────────────────────────
    /// Usable battery capacity in kWh.  Battery levels are fractions of this.
    pub battery_capacity_kwh: f64,
    /// Fraction of capacity withheld from the available-energy calculation.
    pub reserve_ratio: f64,
    /// Battery level at or below which the mission halts.
    pub critical_energy_threshold: f64,

    // ── Mobility ──────────────────────────────────────────────────────────────
    pub nominal_velocity_mps: f64,
    pub max_velocity_mps: f64,
    pub min_velocity_mps: f64,

    // ── Power limits ──────────────────────────────────────────────────────────
    /// Sustained power draw limit in W.
    pub nominal_power_w: f64,
    /// Short-term (surge) power limit in W.
    pub peak_power_w: f64,

    /// Nominal electrical draw per task type, in W.
    pub task_power_w: BTreeMap<TaskType, f64>,

    /// Present only for profiles with an RTG; enables the advisory check.
    pub power_system: Option<PowerSystem>,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl RoverConfig {
    /// The reference rover used throughout the energy model tests.
    pub fn baseline() -> Self {
        Self {
            name: String::from("baseline"),
            mass_kg: 899.0,
            gravity_mps2: GRAVITY_MARS,
            rolling_resistance_coeff: 0.15,
            motor_efficiency: 0.85,
            drivetrain_efficiency: 0.90,
            battery_capacity_kwh: 42.24,
            reserve_ratio: 0.20,
            critical_energy_threshold: 0.10,
            nominal_velocity_mps: 0.042,
            max_velocity_mps: 0.045,
            min_velocity_mps: 0.01,
            nominal_power_w: 125.0,
            peak_power_w: 125.0,
            task_power_w: BTreeMap::from([
                (TaskType::Navigation, 50.0),
                (TaskType::SampleCollection, 80.0),
                (TaskType::Drilling, 120.0),
                (TaskType::Imaging, 30.0),
                (TaskType::Spectrometry, 45.0),
                (TaskType::Communication, 25.0),
                (TaskType::Idle, 10.0),
            ]),
            power_system: None,
        }
    }

    /// Perseverance-class rover: small usable battery backed by an RTG.
    ///
    /// Usable capacity is 2.4 kWh at 53 % depth of discharge.
    pub fn perseverance() -> Self {
        Self {
            name: String::from("perseverance"),
            mass_kg: 1025.0,
            gravity_mps2: GRAVITY_MARS,
            rolling_resistance_coeff: 0.15,
            motor_efficiency: 0.85,
            drivetrain_efficiency: 0.90,
            battery_capacity_kwh: 2.4 * 0.53,
            reserve_ratio: 0.15,
            critical_energy_threshold: 0.30,
            nominal_velocity_mps: 0.016,
            max_velocity_mps: 0.042,
            min_velocity_mps: 0.01,
            nominal_power_w: 110.0,
            peak_power_w: 900.0,
            task_power_w: BTreeMap::from([
                (TaskType::Navigation, 150.0),
                (TaskType::SampleCollection, 80.0),
                (TaskType::Drilling, 600.0),
                (TaskType::Imaging, 20.0),
                (TaskType::Spectrometry, 65.0),
                (TaskType::Communication, 15.0),
                (TaskType::Idle, 40.0),
            ]),
            power_system: Some(PowerSystem::default()),
        }
    }

    /// Look up a built-in profile by name.
    pub fn from_profile(name: &str) -> Result<Self> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "perseverance" => Ok(Self::perseverance()),
            other => bail!("unknown rover profile '{other}' (valid: baseline, perseverance)"),
        }
    }

    /// Parses `path` as YAML, fills absent keys from the baseline profile and
    /// validates the result.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is structurally
    /// invalid (including unknown task-type names), or validation fails.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading rover configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config: RoverConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid rover configuration in {}", path.display()))?;

        info!(
            name = %config.name,
            mass_kg = config.mass_kg,
            battery_kwh = config.battery_capacity_kwh,
            reserve = config.reserve_ratio,
            critical = config.critical_energy_threshold,
            task_types = config.task_power_w.len(),
            rtg = config.power_system.is_some(),
            "Rover configuration loaded"
        );
        for (task_type, watts) in &config.task_power_w {
            debug!("  {task_type:<18} {watts:>7.1} W");
        }

        Ok(config)
    }

    /// Checks every invariant of the configuration.
    ///
    /// Physical quantities, capacities, velocities and powers must be finite
    /// and strictly positive; efficiencies lie in `(0, 1]`; the reserve ratio
    /// and critical threshold lie in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("mass_kg", self.mass_kg),
            ("gravity_mps2", self.gravity_mps2),
            ("rolling_resistance_coeff", self.rolling_resistance_coeff),
            ("battery_capacity_kwh", self.battery_capacity_kwh),
            ("nominal_velocity_mps", self.nominal_velocity_mps),
            ("max_velocity_mps", self.max_velocity_mps),
            ("min_velocity_mps", self.min_velocity_mps),
            ("nominal_power_w", self.nominal_power_w),
            ("peak_power_w", self.peak_power_w),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                bail!("{field} must be positive, got {value}");
            }
        }

        for (field, value) in [
            ("motor_efficiency", self.motor_efficiency),
            ("drivetrain_efficiency", self.drivetrain_efficiency),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                bail!("{field} must be in (0, 1], got {value}");
            }
        }

        for (field, value) in [
            ("reserve_ratio", self.reserve_ratio),
            ("critical_energy_threshold", self.critical_energy_threshold),
        ] {
            if !(0.0..1.0).contains(&value) {
                bail!("{field} must be in [0, 1), got {value}");
            }
        }

        if self.min_velocity_mps > self.max_velocity_mps {
            bail!(
                "min_velocity_mps ({}) exceeds max_velocity_mps ({})",
                self.min_velocity_mps,
                self.max_velocity_mps
            );
        }

        if self.task_power_w.is_empty() {
            bail!("task_power_w must define at least one task type");
        }
        for (task_type, watts) in &self.task_power_w {
            if !(watts.is_finite() && *watts > 0.0) {
                bail!("task_power_w.{task_type} must be positive, got {watts}");
            }
        }

        if let Some(ps) = &self.power_system {
            for (field, value) in [
                ("rtg_continuous_power_w", ps.rtg_continuous_power_w),
                ("rtg_daily_energy_kwh", ps.rtg_daily_energy_kwh),
                ("idle_power_w", ps.idle_power_w),
                ("active_operations_hours", ps.active_operations_hours),
                ("overnight_recharge_hours", ps.overnight_recharge_hours),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    bail!("power_system.{field} must be positive, got {value}");
                }
            }
            for (field, value) in [
                ("rtg_annual_degradation", ps.rtg_annual_degradation),
                ("battery_min_soc", ps.battery_min_soc),
            ] {
                if !(0.0..1.0).contains(&value) {
                    bail!("power_system.{field} must be in [0, 1), got {value}");
                }
            }
        }

        Ok(())
    }

    /// Nominal power draw of `task_type`, or `None` when this profile does not
    /// define it.
    pub fn task_power(&self, task_type: TaskType) -> Option<f64> {
        self.task_power_w.get(&task_type).copied()
    }

    /// Task types with a configured power draw, excluding [`TaskType::Idle`].
    pub fn schedulable_task_types(&self) -> Vec<TaskType> {
        self.task_power_w
            .keys()
            .copied()
            .filter(|t| *t != TaskType::Idle)
            .collect()
    }

    /// Energy withheld as the safety reserve, in kWh.
    pub fn reserve_energy_kwh(&self) -> f64 {
        self.battery_capacity_kwh * self.reserve_ratio
    }

    /// Energy available for tasks at `battery_level`, in kWh.
    ///
    /// `battery_level · capacity − capacity · reserve_ratio`, floored at zero.
    pub fn available_energy(&self, battery_level: f64) -> f64 {
        let total = self.battery_capacity_kwh * battery_level;
        (total - self.reserve_energy_kwh()).max(0.0)
    }

    /// `true` when `battery_level` is at or below the critical threshold.
    pub fn is_critical_energy(&self, battery_level: f64) -> bool {
        battery_level <= self.critical_energy_threshold
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
