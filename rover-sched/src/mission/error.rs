/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for mission runs.
//!
//! Two types model the two outcomes that are not "task completed":
//!
//! * [`DeferralReason`]: why one task was skipped.  A modeled outcome, not
//!   an error; it is recorded on the task's outcome and never returned as
//!   `Err`.
//! * [`MissionError`]: the run itself could not proceed.  No partial result
//!   is produced.
//!
//! [`MissionError::kind`] maps every variant onto the two-way taxonomy the
//! CLI reports: bad input versus a reference to something that does not
//! exist.

use serde::Serialize;
use thiserror::Error;

use crate::energy::EnergyError;

// ── Deferral ──────────────────────────────────────────────────────────────────

/// Why a task was deferred during a mission run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeferralReason {
    /// The task needs more energy than is available above the reserve.
    InsufficientEnergy {
        required_kwh: f64,
        available_kwh: f64,
    },

    /// The mission halted because the battery hit the critical threshold
    /// before this task was reached.
    CriticalEnergy { battery_level: f64, threshold: f64 },
}

impl std::fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeferralReason::InsufficientEnergy {
                required_kwh,
                available_kwh,
            } => write!(
                f,
                "requires {:.3} kWh but only {:.3} kWh available above reserve",
                required_kwh, available_kwh
            ),

            DeferralReason::CriticalEnergy {
                battery_level,
                threshold,
            } => write!(
                f,
                "mission halted at battery {:.1}% (critical threshold {:.1}%)",
                battery_level * 100.0,
                threshold * 100.0
            ),
        }
    }
}

// ── Taxonomy ──────────────────────────────────────────────────────────────────

/// Coarse classification of a [`MissionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A value is out of range or a data source is malformed.
    InvalidInput,
    /// A task type that is not known to the rover configuration.
    UnknownEntity,
}

// ── Top-level mission errors ──────────────────────────────────────────────────

/// Failure of a whole mission run or of loading its inputs.
#[derive(Debug, Error)]
pub enum MissionError {
    /// Costing a task or a terrain segment failed.
    #[error(transparent)]
    Energy(#[from] EnergyError),

    /// A task record named a type outside the closed task-type set.
    #[error("unknown task type: '{task_type}'")]
    UnknownTaskType { task_type: String },

    /// Initial battery level outside `[0, 1]`.
    #[error("initial battery level must be within [0, 1], got {level}")]
    InvalidInitialBattery { level: f64 },

    /// Two task records share an identifier.
    #[error("duplicate task_id '{task_id}'; task identifiers must be unique within a mission")]
    DuplicateTaskId { task_id: String },

    /// The terrain table lacks a required column.
    #[error("terrain data '{path}' is missing required column '{column}' (required: distance, slope_deg, roughness)")]
    MissingTerrainColumn { path: String, column: &'static str },

    /// A terrain row could not be parsed.
    #[error("terrain data '{path}' row {row}: {reason}")]
    InvalidTerrain {
        path: String,
        row: usize,
        reason: String,
    },

    /// The task file is not a valid array of task records.
    #[error("task data '{path}': {reason}")]
    InvalidTaskFile { path: String, reason: String },

    /// A data source could not be read.
    #[error("failed to read '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MissionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MissionError::Energy(EnergyError::UnknownTaskType { .. })
            | MissionError::UnknownTaskType { .. } => ErrorKind::UnknownEntity,
            _ => ErrorKind::InvalidInput,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskType;

    #[test]
    fn unknown_task_types_are_unknown_entity() {
        let from_energy = MissionError::from(EnergyError::UnknownTaskType {
            task_type: TaskType::Idle,
        });
        assert_eq!(from_energy.kind(), ErrorKind::UnknownEntity);

        let from_parse = MissionError::UnknownTaskType {
            task_type: "teleport".into(),
        };
        assert_eq!(from_parse.kind(), ErrorKind::UnknownEntity);
    }

    #[test]
    fn range_and_schema_errors_are_invalid_input() {
        let cases = [
            MissionError::from(EnergyError::NonPositiveVelocity { velocity_mps: 0.0 }),
            MissionError::from(EnergyError::NonPositiveDuration {
                task_id: "T1".into(),
                duration_hours: -1.0,
            }),
            MissionError::InvalidInitialBattery { level: 1.5 },
            MissionError::MissingTerrainColumn {
                path: "t.csv".into(),
                column: "roughness",
            },
            MissionError::DuplicateTaskId {
                task_id: "T1".into(),
            },
        ];
        for err in cases {
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{err}");
        }
    }

    #[test]
    fn messages_carry_the_offending_values() {
        let err = MissionError::MissingTerrainColumn {
            path: "hills.csv".into(),
            column: "slope_deg",
        };
        let msg = err.to_string();
        assert!(msg.contains("hills.csv") && msg.contains("slope_deg"), "{msg}");

        let reason = DeferralReason::InsufficientEnergy {
            required_kwh: 6.0,
            available_kwh: 5.0,
        };
        assert_eq!(
            reason.to_string(),
            "requires 6.000 kWh but only 5.000 kWh available above reserve"
        );
    }

    #[test]
    fn deferral_reason_serialises_with_tag() {
        let reason = DeferralReason::CriticalEnergy {
            battery_level: 0.25,
            threshold: 0.25,
        };
        let json = serde_json::to_value(&reason).unwrap();
        assert_eq!(json["reason"], "critical_energy");
        assert_eq!(json["threshold"], 0.25);
    }
}
