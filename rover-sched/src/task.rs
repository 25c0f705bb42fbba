/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures.
//!
//! Two types model the two sides of the scheduling pipeline:
//!
//! ```text
//! caller ──► Task ──(EnergyModel::cost_task)──► CostedTask ──(policy)──► ordered ──(executor)──► outcomes
//!            ↑ immutable input                  ↑ energy cached once per run
//! ```
//!
//! # Ownership model
//! A `Task` never carries completion or deferral flags.  Status lives in the
//! per-run outcome records produced by the mission simulator, so the same task
//! list can be fed to any number of policies or trials without resetting it.

use serde::Serialize;

use crate::config::TaskType;
use crate::mission::DeferralReason;

// ── Task (input) ──────────────────────────────────────────────────────────────

/// One unit of rover work as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Unique identifier within a mission.
    pub task_id: String,

    pub task_type: TaskType,

    /// Execution time in hours.  Must be positive to be costed.
    pub duration_hours: f64,

    /// Urgency, conventionally 1 (can wait) to 10 (time-critical).
    pub urgency: f64,

    /// Mission value of completing the task.
    pub reward: f64,

    /// Free-form site label.
    pub location: String,
}

impl Task {
    /// Create a task at an `"unknown"` location.
    pub fn new(
        task_id: impl Into<String>,
        task_type: TaskType,
        duration_hours: f64,
        urgency: f64,
        reward: f64,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_type,
            duration_hours,
            urgency,
            reward,
            location: String::from("unknown"),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

// ── CostedTask (working copy) ─────────────────────────────────────────────────

/// A [`Task`] with its energy cost attached.
///
/// The cost is computed once (see [`crate::energy::EnergyModel::cost_task`])
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostedTask {
    #[serde(flatten)]
    task: Task,
    energy_kwh: f64,
}

impl CostedTask {
    pub fn new(task: Task, energy_kwh: f64) -> Self {
        Self { task, energy_kwh }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_id(&self) -> &str {
        &self.task.task_id
    }

    /// Cached energy cost in kWh.
    pub fn energy_kwh(&self) -> f64 {
        self.energy_kwh
    }

    pub fn urgency(&self) -> f64 {
        self.task.urgency
    }

    pub fn reward(&self) -> f64 {
        self.task.reward
    }

    pub fn duration_hours(&self) -> f64 {
        self.task.duration_hours
    }

    /// Copy with energy and duration both multiplied by `factor`.
    ///
    /// Used by scenario generation to tighten a whole scenario uniformly.
    pub(crate) fn scaled(&self, factor: f64) -> Self {
        let mut task = self.task.clone();
        task.duration_hours *= factor;
        Self {
            task,
            energy_kwh: self.energy_kwh * factor,
        }
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            task_id: self.task.task_id.clone(),
            task_type: self.task.task_type,
            energy_kwh: self.energy_kwh,
        }
    }
}

// ── Status / summaries ────────────────────────────────────────────────────────

/// Terminal state of a task within one mission run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Deferred,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Completed => f.write_str("completed"),
            TaskStatus::Deferred => f.write_str("deferred"),
        }
    }
}

/// Per-run record of what happened to one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleOutcome {
    pub task_id: String,
    pub task_type: TaskType,
    pub energy_kwh: f64,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferral: Option<DeferralReason>,
}

impl ScheduleOutcome {
    pub fn completed(task: &CostedTask) -> Self {
        Self {
            task_id: task.task_id().to_string(),
            task_type: task.task().task_type,
            energy_kwh: task.energy_kwh(),
            status: TaskStatus::Completed,
            deferral: None,
        }
    }

    pub fn deferred(task: &CostedTask, reason: DeferralReason) -> Self {
        Self {
            task_id: task.task_id().to_string(),
            task_type: task.task().task_type,
            energy_kwh: task.energy_kwh(),
            status: TaskStatus::Deferred,
            deferral: Some(reason),
        }
    }
}

/// `(id, type, energy)` triple used in the completed / deferred report lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub task_id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub energy_kwh: f64,
}

// ── Sample data ───────────────────────────────────────────────────────────────

/// Eight-task demonstration mission.
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("T001", TaskType::SampleCollection, 2.0, 8.0, 10.0).with_location("Crater A"),
        Task::new("T002", TaskType::Imaging, 0.5, 6.0, 5.0).with_location("Rock Formation B"),
        Task::new("T003", TaskType::Drilling, 3.0, 9.0, 15.0).with_location("Mineral Deposit C"),
        Task::new("T004", TaskType::Spectrometry, 1.0, 7.0, 8.0).with_location("Soil Sample D"),
        Task::new("T005", TaskType::Navigation, 0.25, 5.0, 3.0).with_location("Waypoint E"),
        Task::new("T006", TaskType::Communication, 0.5, 4.0, 2.0).with_location("Earth Contact"),
        Task::new("T007", TaskType::SampleCollection, 1.5, 8.5, 12.0)
            .with_location("Unusual Rock F"),
        Task::new("T008", TaskType::Imaging, 0.75, 6.5, 6.0).with_location("Panoramic View G"),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
