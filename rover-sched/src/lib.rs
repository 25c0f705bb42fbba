/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Rover-Sched – energy-aware task scheduling for planetary rovers
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/         – rover profiles, task types, YAML loading
//! ├── energy/         – terrain and task power / energy model
//! ├── task.rs         – task, costed task, per-run outcome
//! ├── policy/         – six ordering policies incl. weighted cost
//! ├── mission/        – greedy executor, events, RTG advisory check
//! ├── bench/          – Monte Carlo policy comparison + statistics
//! └── io.rs           – terrain CSV, task JSON, JSON reports
//! ```

pub mod bench;
pub mod config;
pub mod energy;
pub mod io;
pub mod mission;
pub mod policy;
pub mod task;
