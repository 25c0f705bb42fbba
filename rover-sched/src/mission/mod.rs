/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Greedy mission executor.
//!
//! [`MissionSimulator`] takes a task list, costs every task, optionally drives
//! a terrain profile, orders the tasks with its [`Policy`] and then walks the
//! order once, completing each task that fits the remaining battery.
//!
//! # Run sequence
//! 1. Validate the initial battery level and reset [`MissionState`].
//! 2. Cost every task.  Any failure aborts the run before the battery moves.
//! 3. Deduct the terrain traversal energy, if a profile was supplied.
//! 4. Order the costed tasks.
//! 5. For each task: halt on critical battery (bulk-deferring the rest),
//!    otherwise complete it if `energy ≤ level · capacity − capacity · reserve`
//!    and defer it if not.
//! 6. Compute summary statistics and, for RTG-equipped rovers, replay the
//!    completed tasks through [`RtgFeasibility`] as an advisory.
//!
//! Deducting a task lowers the battery by `energy / capacity`.  A deferred task
//! never halts the mission; only the critical threshold does.
//!
//! # Example
//! ```rust
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use rover_sched::config::RoverConfig;
//! use rover_sched::mission::MissionSimulator;
//! use rover_sched::policy::Policy;
//! use rover_sched::task::sample_tasks;
//!
//! let config = RoverConfig::baseline();
//! let mut sim = MissionSimulator::new(&config, Policy::Fifo);
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let result = sim.run_mission_simulation(&sample_tasks(), None, None, &mut rng).unwrap();
//! assert_eq!(result.mission_summary.total_tasks, 8);
//! ```

pub mod error;
pub mod events;
pub mod feasibility;
pub mod result;

pub use error::{DeferralReason, ErrorKind, MissionError};
pub use events::{EventSink, MissionEvent, TracingSink};
pub use feasibility::{RtgFeasibility, RtgRejection};
pub use result::{LogEntry, MissionResult, MissionSummary, RtgAdvisory, TraversalSummary};

use rand::Rng;

use crate::config::RoverConfig;
use crate::energy::{EnergyModel, TerrainSegment};
use crate::policy::Policy;
use crate::task::{CostedTask, ScheduleOutcome, Task, TaskStatus};

// ── MissionState ──────────────────────────────────────────────────────────────

/// Mutable state of one mission run.
///
/// Owned by the [`MissionSimulator`] and reset at the start of every run.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionState {
    /// Fraction of battery capacity remaining.  May go below zero if a
    /// traversal alone exhausts the battery.
    pub battery_level: f64,
    pub completed: Vec<CostedTask>,
    pub deferred: Vec<CostedTask>,
    pub mission_log: Vec<LogEntry>,
    /// Every processed task in processing order.
    pub outcomes: Vec<ScheduleOutcome>,
}

impl MissionState {
    pub fn new(initial_battery: f64) -> Self {
        Self {
            battery_level: initial_battery,
            completed: Vec::new(),
            deferred: Vec::new(),
            mission_log: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    fn complete(&mut self, task: &CostedTask, capacity_kwh: f64) {
        self.battery_level -= task.energy_kwh() / capacity_kwh;
        self.mission_log.push(LogEntry {
            task_id: task.task_id().to_string(),
            task_type: task.task().task_type,
            duration_hours: task.duration_hours(),
            energy_consumed_kwh: task.energy_kwh(),
            battery_level_after: self.battery_level,
            status: TaskStatus::Completed,
        });
        self.outcomes.push(ScheduleOutcome::completed(task));
        self.completed.push(task.clone());
    }

    fn defer(&mut self, task: &CostedTask, reason: DeferralReason) {
        self.outcomes.push(ScheduleOutcome::deferred(task, reason));
        self.deferred.push(task.clone());
    }
}

// ── MissionSimulator ──────────────────────────────────────────────────────────

/// Runs missions for one rover configuration under one ordering policy.
pub struct MissionSimulator<'a> {
    config: &'a RoverConfig,
    model: EnergyModel<'a>,
    policy: Policy,
    initial_battery: f64,
    state: MissionState,
}

impl<'a> MissionSimulator<'a> {
    /// Simulator starting every run from a full battery.
    pub fn new(config: &'a RoverConfig, policy: Policy) -> Self {
        Self {
            config,
            model: EnergyModel::new(config),
            policy,
            initial_battery: 1.0,
            state: MissionState::new(1.0),
        }
    }

    /// Start every run from `level` (fraction of capacity, checked at run time).
    pub fn with_initial_battery(mut self, level: f64) -> Self {
        self.initial_battery = level;
        self
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// State left behind by the most recent run.
    pub fn state(&self) -> &MissionState {
        &self.state
    }

    /// Run a mission, logging events through `tracing`.
    ///
    /// `velocity_mps` applies to terrain segments without their own velocity
    /// and defaults to the configured nominal velocity.
    pub fn run_mission_simulation<R: Rng + ?Sized>(
        &mut self,
        tasks: &[Task],
        terrain: Option<&[TerrainSegment]>,
        velocity_mps: Option<f64>,
        rng: &mut R,
    ) -> Result<MissionResult, MissionError> {
        self.run_mission_with_sink(tasks, terrain, velocity_mps, rng, &mut TracingSink)
    }

    /// Run a mission, reporting events to `sink`.
    ///
    /// # Errors
    /// * [`MissionError::InvalidInitialBattery`] for a level outside `[0, 1]`.
    /// * [`MissionError::Energy`] when a task cannot be costed (unknown type,
    ///   non-positive duration) or a terrain segment has a non-positive
    ///   velocity.  Nothing is executed in either case.
    pub fn run_mission_with_sink<R: Rng + ?Sized>(
        &mut self,
        tasks: &[Task],
        terrain: Option<&[TerrainSegment]>,
        velocity_mps: Option<f64>,
        rng: &mut R,
        sink: &mut dyn EventSink,
    ) -> Result<MissionResult, MissionError> {
        let initial_battery = self.initial_battery;
        if !(0.0..=1.0).contains(&initial_battery) {
            return Err(MissionError::InvalidInitialBattery {
                level: initial_battery,
            });
        }

        self.state = MissionState::new(initial_battery);
        sink.record(MissionEvent::Started {
            policy: self.policy.name(),
            task_count: tasks.len(),
            initial_battery,
        });

        // ── Cost every task up front ──────────────────────────────────────────
        let costed = tasks
            .iter()
            .map(|t| self.model.cost_task(t))
            .collect::<Result<Vec<_>, _>>()?;

        // ── Terrain traversal ─────────────────────────────────────────────────
        let traversal = match terrain {
            Some(segments) => {
                let summary = self.traverse(segments, velocity_mps)?;
                sink.record(MissionEvent::Traversed(summary));
                Some(summary)
            }
            None => None,
        };

        // ── Order ─────────────────────────────────────────────────────────────
        let ordered = self.policy.order(&costed, rng);
        sink.record(MissionEvent::Prioritized {
            order: ordered.iter().map(|t| t.task_id().to_string()).collect(),
        });

        // ── Execute ───────────────────────────────────────────────────────────
        let mut executed: Vec<(&CostedTask, f64)> = Vec::new();
        let mut halted = false;

        for (idx, task) in ordered.iter().enumerate() {
            let level = self.state.battery_level;
            if self.config.is_critical_energy(level) {
                let remaining = &ordered[idx..];
                sink.record(MissionEvent::CriticalHalt {
                    battery_level: level,
                    remaining: remaining.len(),
                });
                let reason = DeferralReason::CriticalEnergy {
                    battery_level: level,
                    threshold: self.config.critical_energy_threshold,
                };
                for rest in remaining {
                    self.state.defer(rest, reason.clone());
                }
                halted = true;
                break;
            }

            match self.can_execute(task) {
                Ok(()) => {
                    self.state.complete(task, self.config.battery_capacity_kwh);
                    executed.push((*task, level));
                    sink.record(MissionEvent::TaskCompleted {
                        task_id: task.task_id().to_string(),
                        energy_kwh: task.energy_kwh(),
                        battery_level: self.state.battery_level,
                    });
                }
                Err(reason) => {
                    sink.record(MissionEvent::TaskDeferred {
                        task_id: task.task_id().to_string(),
                        reason: reason.clone(),
                    });
                    self.state.defer(task, reason);
                }
            }
        }

        let rtg_advisories = self.rtg_advisories(&executed, sink);

        // ── Statistics ────────────────────────────────────────────────────────
        let total_tasks = tasks.len();
        let completed_tasks = self.state.completed.len();
        let completion_rate = if total_tasks == 0 {
            0.0
        } else {
            completed_tasks as f64 / total_tasks as f64
        };
        let final_battery_level = self.state.battery_level;
        let capacity_kwh = self.config.battery_capacity_kwh;

        let mission_summary = MissionSummary {
            policy: self.policy.name().to_string(),
            total_tasks,
            completed_tasks,
            deferred_tasks: self.state.deferred.len(),
            completion_rate,
            initial_battery_level: initial_battery,
            final_battery_level,
            total_energy_consumed_kwh: (1.0 - final_battery_level) * capacity_kwh,
            energy_used_this_run_kwh: (initial_battery - final_battery_level) * capacity_kwh,
            movement_energy_kwh: traversal.map_or(0.0, |t| t.total_energy_kwh),
            task_energy_kwh: self.state.completed.iter().map(CostedTask::energy_kwh).sum(),
            halted_on_critical_energy: halted,
        };

        sink.record(MissionEvent::Finished {
            completed: completed_tasks,
            total: total_tasks,
            completion_rate,
            final_battery: final_battery_level,
        });

        Ok(MissionResult {
            mission_summary,
            completed_tasks: self.state.completed.iter().map(CostedTask::summary).collect(),
            deferred_tasks: self.state.deferred.iter().map(CostedTask::summary).collect(),
            traversal_summary: traversal,
            mission_log: self.state.mission_log.clone(),
            outcomes: self.state.outcomes.clone(),
            rtg_advisories,
        })
    }

    /// Baseline feasibility of `task` at the current battery level.
    pub fn can_execute(&self, task: &CostedTask) -> Result<(), DeferralReason> {
        let level = self.state.battery_level;
        if self.config.is_critical_energy(level) {
            return Err(DeferralReason::CriticalEnergy {
                battery_level: level,
                threshold: self.config.critical_energy_threshold,
            });
        }

        let available_kwh = self.config.available_energy(level);
        if task.energy_kwh() <= available_kwh {
            Ok(())
        } else {
            Err(DeferralReason::InsufficientEnergy {
                required_kwh: task.energy_kwh(),
                available_kwh,
            })
        }
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    /// Drive every segment and deduct the total from the battery.
    ///
    /// All segments are costed before the battery is touched.
    fn traverse(
        &mut self,
        segments: &[TerrainSegment],
        velocity_mps: Option<f64>,
    ) -> Result<TraversalSummary, MissionError> {
        let velocity = velocity_mps.unwrap_or(self.config.nominal_velocity_mps);

        let mut total_distance_m = 0.0;
        let mut total_time_hours = 0.0;
        let mut total_energy_kwh = 0.0;
        for segment in segments {
            let result = self.model.segment_energy(segment, velocity)?;
            total_distance_m += result.distance_m;
            total_time_hours += result.time_hours;
            total_energy_kwh += result.energy_kwh;
        }

        self.state.battery_level -= total_energy_kwh / self.config.battery_capacity_kwh;

        Ok(TraversalSummary {
            segment_count: segments.len(),
            total_distance_m,
            total_time_hours,
            total_energy_kwh,
            battery_level_after: self.state.battery_level,
        })
    }

    /// Re-check completed tasks against the RTG model, if the rover has one.
    fn rtg_advisories(
        &self,
        executed: &[(&CostedTask, f64)],
        sink: &mut dyn EventSink,
    ) -> Vec<RtgAdvisory> {
        let Some(rtg) = RtgFeasibility::new(self.config) else {
            return Vec::new();
        };

        let mut advisories = Vec::new();
        for (task, level_before) in executed {
            if let Err(rejection) = rtg.check_task(task, *level_before, 0.0) {
                sink.record(MissionEvent::RtgAdvisory {
                    task_id: task.task_id().to_string(),
                    rejection: rejection.clone(),
                });
                advisories.push(RtgAdvisory {
                    task_id: task.task_id().to_string(),
                    battery_level_before: *level_before,
                    rejection,
                });
            }
        }
        advisories
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskType;
    use crate::energy::EnergyError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeMap;

    const EPS: f64 = 1e-9;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    /// 10 kWh rover, 20 % reserve; drilling 1 kW, sample collection 2 kW.
    fn ten_kwh_config() -> RoverConfig {
        RoverConfig {
            battery_capacity_kwh: 10.0,
            reserve_ratio: 0.2,
            critical_energy_threshold: 0.1,
            task_power_w: BTreeMap::from([
                (TaskType::Drilling, 1000.0),
                (TaskType::SampleCollection, 2000.0),
            ]),
            ..RoverConfig::baseline()
        }
    }

    /// 8 kWh rover, no reserve, halts at 25 %; every type draws 1 kW.
    fn critical_config() -> RoverConfig {
        RoverConfig {
            battery_capacity_kwh: 8.0,
            reserve_ratio: 0.0,
            critical_energy_threshold: 0.25,
            task_power_w: TaskType::ALL.iter().map(|t| (*t, 1000.0)).collect(),
            ..RoverConfig::baseline()
        }
    }

    fn run(
        config: &RoverConfig,
        policy: Policy,
        tasks: &[Task],
    ) -> (MissionResult, Vec<MissionEvent>) {
        let mut events = Vec::new();
        let result = MissionSimulator::new(config, policy)
            .run_mission_with_sink(tasks, None, None, &mut rng(), &mut events)
            .unwrap();
        (result, events)
    }

    // ── Greedy execution ──────────────────────────────────────────────────────

    #[test]
    fn energy_greedy_two_task_trace() {
        let config = ten_kwh_config();
        let tasks = vec![
            Task::new("B", TaskType::SampleCollection, 3.0, 2.0, 5.0),
            Task::new("A", TaskType::Drilling, 3.0, 9.0, 50.0),
        ];
        let (result, _) = run(&config, Policy::EnergyGreedy, &tasks);

        assert_eq!(result.completed_ids(), ["A"]);
        assert_eq!(result.deferred_ids(), ["B"]);

        let log = &result.mission_log;
        assert_eq!(log.len(), 1);
        assert!((log[0].energy_consumed_kwh - 3.0).abs() < EPS);
        assert!((log[0].battery_level_after - 0.7).abs() < EPS);

        // B is checked against 7 kWh stored − 2 kWh reserve
        match &result.outcomes[1].deferral {
            Some(DeferralReason::InsufficientEnergy {
                required_kwh,
                available_kwh,
            }) => {
                assert!((required_kwh - 6.0).abs() < EPS);
                assert!((available_kwh - 5.0).abs() < EPS);
            }
            other => panic!("expected InsufficientEnergy, got {other:?}"),
        }

        let s = &result.mission_summary;
        assert!((s.final_battery_level - 0.7).abs() < EPS);
        assert!((s.completion_rate - 0.5).abs() < EPS);
        assert!((s.total_energy_consumed_kwh - 3.0).abs() < EPS);
        assert!((s.energy_used_this_run_kwh - 3.0).abs() < EPS);
        assert!((s.task_energy_kwh - 3.0).abs() < EPS);
        assert!(!s.halted_on_critical_energy);
    }

    #[test]
    fn deferral_does_not_stop_later_tasks() {
        let config = ten_kwh_config();
        let tasks = vec![
            Task::new("big", TaskType::SampleCollection, 4.5, 5.0, 1.0), // 9 kWh > 8
            Task::new("small", TaskType::Drilling, 1.0, 5.0, 1.0),      // 1 kWh
        ];
        let (result, events) = run(&config, Policy::Fifo, &tasks);

        assert_eq!(result.deferred_ids(), ["big"]);
        assert_eq!(result.completed_ids(), ["small"]);
        assert!(events
            .iter()
            .any(|e| matches!(e, MissionEvent::TaskDeferred { task_id, .. } if task_id == "big")));
    }

    #[test]
    fn critical_battery_bulk_defers_remaining_tasks() {
        let config = critical_config();
        let tasks = vec![
            Task::new("T1", TaskType::Imaging, 4.0, 5.0, 1.0),
            Task::new("T2", TaskType::Imaging, 2.0, 5.0, 1.0),
            Task::new("T3", TaskType::Imaging, 1.0, 5.0, 1.0),
            Task::new("T4", TaskType::Imaging, 1.0, 5.0, 1.0),
        ];
        let (result, events) = run(&config, Policy::Fifo, &tasks);

        assert_eq!(result.completed_ids(), ["T1", "T2"]);
        assert_eq!(result.deferred_ids(), ["T3", "T4"]);
        assert!(result.mission_summary.halted_on_critical_energy);
        assert_eq!(result.mission_summary.final_battery_level, 0.25);

        for outcome in &result.outcomes[2..] {
            assert!(matches!(
                outcome.deferral,
                Some(DeferralReason::CriticalEnergy { threshold, .. }) if threshold == 0.25
            ));
        }

        let halt_at = events
            .iter()
            .position(|e| matches!(e, MissionEvent::CriticalHalt { remaining: 2, .. }))
            .expect("halt event");
        assert!(
            !events[halt_at..]
                .iter()
                .any(|e| matches!(e, MissionEvent::TaskCompleted { .. })),
            "nothing completes after the halt"
        );
    }

    #[test]
    fn starting_at_critical_level_defers_everything() {
        let config = critical_config();
        let tasks = vec![Task::new("T1", TaskType::Imaging, 0.1, 5.0, 1.0)];
        let mut sim = MissionSimulator::new(&config, Policy::Fifo).with_initial_battery(0.2);
        let result = sim
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
            .unwrap();
        assert!(result.completed_tasks.is_empty());
        assert_eq!(result.mission_summary.completion_rate, 0.0);
    }

    #[test]
    fn outcomes_cover_every_task_in_processing_order() {
        let config = RoverConfig::baseline();
        let tasks = crate::task::sample_tasks();
        let (result, events) = run(&config, Policy::UrgencyFirst, &tasks);

        let processed: Vec<&str> = result.outcomes.iter().map(|o| o.task_id.as_str()).collect();
        let prioritized = events
            .iter()
            .find_map(|e| match e {
                MissionEvent::Prioritized { order } => Some(order.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(processed, prioritized);
        assert_eq!(
            result.completed_tasks.len() + result.deferred_tasks.len(),
            tasks.len()
        );
    }

    #[test]
    fn empty_mission_has_zero_completion_rate() {
        let config = RoverConfig::baseline();
        let (result, _) = run(&config, Policy::Fifo, &[]);
        assert_eq!(result.mission_summary.total_tasks, 0);
        assert_eq!(result.mission_summary.completion_rate, 0.0);
        assert_eq!(result.mission_summary.final_battery_level, 1.0);
    }

    #[test]
    fn total_energy_consumed_is_measured_from_a_full_battery() {
        let config = RoverConfig::baseline();
        let mut sim = MissionSimulator::new(&config, Policy::Fifo).with_initial_battery(0.5);
        let result = sim
            .run_mission_with_sink(&[], None, None, &mut rng(), &mut Vec::new())
            .unwrap();

        let s = &result.mission_summary;
        let capacity = config.battery_capacity_kwh;
        assert!((s.total_energy_consumed_kwh - 0.5 * capacity).abs() < EPS);
        assert_eq!(s.energy_used_this_run_kwh, 0.0);
    }

    #[test]
    fn run_energy_counts_only_this_run_when_starting_below_full() {
        let config = ten_kwh_config();
        let tasks = vec![Task::new("A", TaskType::Drilling, 3.0, 9.0, 50.0)];
        let mut sim = MissionSimulator::new(&config, Policy::Fifo).with_initial_battery(0.9);
        let result = sim
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
            .unwrap();

        // 9 kWh stored, 3 kWh drilled, 6 kWh left of 10
        let s = &result.mission_summary;
        assert!((s.final_battery_level - 0.6).abs() < EPS);
        assert!((s.total_energy_consumed_kwh - 4.0).abs() < EPS);
        assert!((s.energy_used_this_run_kwh - 3.0).abs() < EPS);
    }

    #[test]
    fn completed_count_is_monotonic_in_initial_battery_for_energy_greedy() {
        let config = RoverConfig::baseline();
        let tasks: Vec<Task> = (0..12)
            .map(|i| {
                let task_type = TaskType::ALL[i % 6];
                Task::new(format!("T{i}"), task_type, 10.0 + 7.0 * i as f64, 5.0, 1.0)
            })
            .collect();

        let mut previous = 0;
        for step in 2..=10 {
            let level = step as f64 / 10.0;
            let mut sim =
                MissionSimulator::new(&config, Policy::EnergyGreedy).with_initial_battery(level);
            let result = sim
                .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
                .unwrap();
            let completed = result.mission_summary.completed_tasks;
            assert!(completed >= previous, "level {level}: {completed} < {previous}");
            previous = completed;
        }
        assert!(previous > 0);
    }

    #[test]
    fn state_is_reset_between_runs() {
        let config = RoverConfig::baseline();
        let tasks = crate::task::sample_tasks();
        let mut sim = MissionSimulator::new(&config, Policy::Fifo);

        let first = sim
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
            .unwrap();
        let second = sim
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(sim.state().outcomes.len(), tasks.len());
    }

    #[test]
    fn random_policy_is_reproducible_for_a_seed() {
        let config = RoverConfig::baseline();
        let tasks = crate::task::sample_tasks();
        let (a, _) = run(&config, Policy::Random, &tasks);
        let (b, _) = run(&config, Policy::Random, &tasks);
        assert_eq!(a.outcomes, b.outcomes);
    }

    // ── Failure modes ─────────────────────────────────────────────────────────

    #[test]
    fn unknown_task_type_aborts_before_execution() {
        let config = ten_kwh_config();
        let tasks = vec![
            Task::new("A", TaskType::Drilling, 1.0, 5.0, 1.0),
            Task::new("X", TaskType::Imaging, 1.0, 5.0, 1.0),
        ];
        let mut events = Vec::new();
        let err = MissionSimulator::new(&config, Policy::Fifo)
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut events)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
        assert!(!events
            .iter()
            .any(|e| matches!(e, MissionEvent::TaskCompleted { .. })));
    }

    #[test]
    fn non_positive_duration_is_invalid_input() {
        let config = RoverConfig::baseline();
        let tasks = vec![Task::new("Z", TaskType::Imaging, 0.0, 5.0, 1.0)];
        let err = MissionSimulator::new(&config, Policy::Fifo)
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            MissionError::Energy(EnergyError::NonPositiveDuration { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn initial_battery_outside_unit_range_is_rejected() {
        let config = RoverConfig::baseline();
        for level in [-0.1, 1.5, f64::NAN] {
            let err = MissionSimulator::new(&config, Policy::Fifo)
                .with_initial_battery(level)
                .run_mission_with_sink(&[], None, None, &mut rng(), &mut Vec::new())
                .unwrap_err();
            assert!(matches!(err, MissionError::InvalidInitialBattery { .. }));
        }
    }

    // ── Terrain ───────────────────────────────────────────────────────────────

    #[test]
    fn traversal_is_deducted_before_tasks() {
        let config = RoverConfig::baseline();
        let terrain = vec![
            TerrainSegment::new(100.0, 0.0, 0.1),
            TerrainSegment::new(50.0, 5.0, 0.3),
        ];
        let model = EnergyModel::new(&config);
        let expected: f64 = terrain
            .iter()
            .map(|s| model.segment_energy(s, config.nominal_velocity_mps).unwrap().energy_kwh)
            .sum();

        let mut events = Vec::new();
        let result = MissionSimulator::new(&config, Policy::Fifo)
            .run_mission_with_sink(&[], Some(&terrain), None, &mut rng(), &mut events)
            .unwrap();

        let t = result.traversal_summary.unwrap();
        assert_eq!(t.segment_count, 2);
        assert_eq!(t.total_distance_m, 150.0);
        assert!((t.total_energy_kwh - expected).abs() < EPS);
        let level_after = 1.0 - expected / config.battery_capacity_kwh;
        assert!((t.battery_level_after - level_after).abs() < EPS);
        assert!((result.mission_summary.movement_energy_kwh - expected).abs() < EPS);
        assert!(matches!(events[1], MissionEvent::Traversed(_)));
    }

    #[test]
    fn zero_traversal_velocity_fails_the_run() {
        let config = RoverConfig::baseline();
        let terrain = vec![TerrainSegment::new(100.0, 0.0, 0.0)];
        let err = MissionSimulator::new(&config, Policy::Fifo)
            .run_mission_with_sink(&[], Some(&terrain), Some(0.0), &mut rng(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            MissionError::Energy(EnergyError::NonPositiveVelocity { .. })
        ));
    }

    // ── RTG advisory ──────────────────────────────────────────────────────────

    #[test]
    fn rtg_advisory_flags_completed_task_without_changing_status() {
        let config = RoverConfig::perseverance();
        // 600 W × 1.5 h = 0.9 kWh fits the battery rule but not the minimum SoC
        let tasks = vec![Task::new("D1", TaskType::Drilling, 1.5, 9.0, 40.0)];
        let mut events = Vec::new();
        let result = MissionSimulator::new(&config, Policy::Fifo)
            .run_mission_with_sink(&tasks, None, None, &mut rng(), &mut events)
            .unwrap();

        assert_eq!(result.completed_ids(), ["D1"]);
        assert_eq!(result.rtg_advisories.len(), 1);
        assert!(matches!(
            result.rtg_advisories[0].rejection,
            RtgRejection::MinSocViolation { .. }
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, MissionEvent::RtgAdvisory { task_id, .. } if task_id == "D1")));
    }

    #[test]
    fn baseline_rover_produces_no_rtg_advisories() {
        let config = RoverConfig::baseline();
        let (result, _) = run(&config, Policy::Fifo, &crate::task::sample_tasks());
        assert!(result.rtg_advisories.is_empty());
    }
}
