/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Mission event stream.
//!
//! The executor reports progress through an [`EventSink`] it is handed by the
//! caller rather than through process-wide logging state.  [`TracingSink`]
//! forwards events to `tracing`; a `Vec<MissionEvent>` collects them for
//! inspection.

use tracing::{info, warn};

use crate::mission::error::DeferralReason;
use crate::mission::feasibility::RtgRejection;
use crate::mission::result::TraversalSummary;

#[derive(Debug, Clone, PartialEq)]
pub enum MissionEvent {
    Started {
        policy: &'static str,
        task_count: usize,
        initial_battery: f64,
    },
    Traversed(TraversalSummary),
    Prioritized {
        order: Vec<String>,
    },
    TaskCompleted {
        task_id: String,
        energy_kwh: f64,
        battery_level: f64,
    },
    TaskDeferred {
        task_id: String,
        reason: DeferralReason,
    },
    CriticalHalt {
        battery_level: f64,
        remaining: usize,
    },
    Finished {
        completed: usize,
        total: usize,
        completion_rate: f64,
        final_battery: f64,
    },
    RtgAdvisory {
        task_id: String,
        rejection: RtgRejection,
    },
}

/// Receiver for [`MissionEvent`]s.
pub trait EventSink {
    fn record(&mut self, event: MissionEvent);
}

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, event: MissionEvent) {
        match event {
            MissionEvent::Started {
                policy,
                task_count,
                initial_battery,
            } => info!(
                policy,
                task_count,
                initial_battery = %format!("{:.1}%", initial_battery * 100.0),
                "Starting mission simulation"
            ),
            MissionEvent::Traversed(t) => info!(
                segments = t.segment_count,
                distance_m = t.total_distance_m,
                energy_kwh = %format!("{:.3}", t.total_energy_kwh),
                battery = %format!("{:.1}%", t.battery_level_after * 100.0),
                "Terrain traversal completed"
            ),
            MissionEvent::Prioritized { order } => {
                info!(order = ?order, "Tasks prioritized")
            }
            MissionEvent::TaskCompleted {
                task_id,
                energy_kwh,
                battery_level,
            } => info!(
                task = %task_id,
                energy_kwh = %format!("{:.3}", energy_kwh),
                battery = %format!("{:.1}%", battery_level * 100.0),
                "Task completed"
            ),
            MissionEvent::TaskDeferred { task_id, reason } => {
                warn!(task = %task_id, reason = %reason, "Task deferred due to energy constraints")
            }
            MissionEvent::CriticalHalt {
                battery_level,
                remaining,
            } => warn!(
                battery = %format!("{:.1}%", battery_level * 100.0),
                remaining, "Critical energy level reached; deferring remaining tasks"
            ),
            MissionEvent::Finished {
                completed,
                total,
                completion_rate,
                final_battery,
            } => info!(
                completed,
                total,
                completion_rate = %format!("{:.1}%", completion_rate * 100.0),
                final_battery = %format!("{:.1}%", final_battery * 100.0),
                "Mission completed"
            ),
            MissionEvent::RtgAdvisory { task_id, rejection } => warn!(
                task = %task_id,
                reason = %rejection,
                "RTG power model would not have allowed this task"
            ),
        }
    }
}

impl EventSink for Vec<MissionEvent> {
    fn record(&mut self, event: MissionEvent) {
        self.push(event);
    }
}
