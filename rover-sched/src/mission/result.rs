/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Report types produced by a mission run.

use serde::Serialize;

use crate::config::TaskType;
use crate::mission::feasibility::RtgRejection;
use crate::task::{ScheduleOutcome, TaskStatus, TaskSummary};

/// Energy and time spent driving before any task ran.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraversalSummary {
    pub segment_count: usize,
    pub total_distance_m: f64,
    pub total_time_hours: f64,
    pub total_energy_kwh: f64,
    pub battery_level_after: f64,
}

/// One line of the execution log.  Only completed tasks are logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub task_id: String,
    pub task_type: TaskType,
    pub duration_hours: f64,
    pub energy_consumed_kwh: f64,
    pub battery_level_after: f64,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSummary {
    pub policy: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub deferred_tasks: usize,
    /// `completed / total`, 0 for an empty mission.
    pub completion_rate: f64,
    pub initial_battery_level: f64,
    pub final_battery_level: f64,
    /// `(1 − final) · capacity`, measured from a full battery.
    pub total_energy_consumed_kwh: f64,
    /// `(initial − final) · capacity`; traversal and tasks of this run only.
    pub energy_used_this_run_kwh: f64,
    pub movement_energy_kwh: f64,
    /// Sum of completed tasks' energy.
    pub task_energy_kwh: f64,
    /// `true` if the critical threshold stopped the run early.
    pub halted_on_critical_energy: bool,
}

/// A completed task the RTG model would have refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RtgAdvisory {
    pub task_id: String,
    pub battery_level_before: f64,
    pub rejection: RtgRejection,
}

/// Everything a mission run produced.  Built once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionResult {
    pub mission_summary: MissionSummary,
    pub completed_tasks: Vec<TaskSummary>,
    pub deferred_tasks: Vec<TaskSummary>,
    pub traversal_summary: Option<TraversalSummary>,
    pub mission_log: Vec<LogEntry>,
    /// Every task, in the order the executor processed it.
    pub outcomes: Vec<ScheduleOutcome>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rtg_advisories: Vec<RtgAdvisory>,
}

impl MissionResult {
    pub fn completed_ids(&self) -> Vec<&str> {
        self.completed_tasks.iter().map(|t| t.task_id.as_str()).collect()
    }

    pub fn deferred_ids(&self) -> Vec<&str> {
        self.deferred_tasks.iter().map(|t| t.task_id.as_str()).collect()
    }
}
