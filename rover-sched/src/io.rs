/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! File input and output for mission data.
//!
//! * Terrain profiles are CSV with the header columns `distance`, `slope_deg`
//!   and `roughness` (an optional `velocity` column overrides the traversal
//!   velocity per segment).  Any missing column or bad row rejects the whole
//!   file.
//! * Task lists are a JSON array of task records.
//! * Reports are written as pretty-printed JSON.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TaskType;
use crate::energy::TerrainSegment;
use crate::mission::MissionError;
use crate::task::Task;

/// Columns every terrain file must carry.
pub const TERRAIN_COLUMNS: [&str; 3] = ["distance", "slope_deg", "roughness"];

// ── Terrain ───────────────────────────────────────────────────────────────────

/// Load a terrain profile from a CSV file.
pub fn load_terrain_csv(path: &Path) -> Result<Vec<TerrainSegment>, MissionError> {
    let source = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| MissionError::Io {
        path: source.clone(),
        source: e,
    })?;

    let segments = parse_terrain_csv(file, &source)?;
    info!(path = %source, segments = segments.len(), "Terrain profile loaded");
    Ok(segments)
}

/// Parse terrain CSV from any reader.  `source` names it in error messages.
pub fn parse_terrain_csv<R: Read>(
    reader: R,
    source: &str,
) -> Result<Vec<TerrainSegment>, MissionError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| MissionError::InvalidTerrain {
            path: source.to_string(),
            row: 0,
            reason: e.to_string(),
        })?
        .clone();
    for column in TERRAIN_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(MissionError::MissingTerrainColumn {
                path: source.to_string(),
                column,
            });
        }
    }

    let mut segments = Vec::new();
    for (idx, record) in rdr.deserialize::<TerrainSegment>().enumerate() {
        let row = idx + 1;
        let invalid = |reason: String| MissionError::InvalidTerrain {
            path: source.to_string(),
            row,
            reason,
        };

        let segment = record.map_err(|e| invalid(e.to_string()))?;
        if !(segment.distance >= 0.0) || !segment.distance.is_finite() {
            return Err(invalid(format!(
                "distance must be a non-negative number, got {}",
                segment.distance
            )));
        }
        if !segment.slope_deg.is_finite() || !segment.roughness.is_finite() {
            return Err(invalid("slope_deg and roughness must be finite".into()));
        }
        debug!(
            row,
            distance = segment.distance,
            slope_deg = segment.slope_deg,
            roughness = segment.roughness,
            "terrain segment"
        );
        segments.push(segment);
    }

    Ok(segments)
}

// ── Tasks ─────────────────────────────────────────────────────────────────────

/// Task as it appears in a task file; the type is still a string.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    task_id: String,
    task_type: String,
    duration_hours: f64,
    urgency: f64,
    reward: f64,
    #[serde(default)]
    location: Option<String>,
}

/// Load a task list from a JSON file.
pub fn load_tasks_json(path: &Path) -> Result<Vec<Task>, MissionError> {
    let source = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| MissionError::Io {
        path: source.clone(),
        source: e,
    })?;

    let tasks = parse_tasks_json(&content, &source)?;
    info!(path = %source, tasks = tasks.len(), "Task list loaded");
    Ok(tasks)
}

/// Parse a JSON task array.
///
/// # Errors
/// * [`MissionError::InvalidTaskFile`] for malformed JSON or missing fields.
/// * [`MissionError::UnknownTaskType`] for a type outside the closed set.
/// * [`MissionError::DuplicateTaskId`] when an identifier repeats.
pub fn parse_tasks_json(content: &str, source: &str) -> Result<Vec<Task>, MissionError> {
    let records: Vec<TaskRecord> =
        serde_json::from_str(content).map_err(|e| MissionError::InvalidTaskFile {
            path: source.to_string(),
            reason: e.to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.task_id.clone()) {
            return Err(MissionError::DuplicateTaskId {
                task_id: record.task_id,
            });
        }

        let task_type: TaskType =
            record
                .task_type
                .parse()
                .map_err(|_| MissionError::UnknownTaskType {
                    task_type: record.task_type.clone(),
                })?;

        let mut task = Task::new(
            record.task_id,
            task_type,
            record.duration_hours,
            record.urgency,
            record.reward,
        );
        if let Some(location) = record.location {
            task = task.with_location(location);
        }
        tasks.push(task);
    }

    Ok(tasks)
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Write `report` to `path` as pretty JSON.
pub fn write_json_report<T: Serialize>(path: &Path, report: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Cannot write report to {}", path.display()))?;
    info!("Report written to: {}", path.display());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn tempfile_with(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    // ── Terrain ───────────────────────────────────────────────────────────────

    #[test]
    fn terrain_csv_loads_segments() {
        let f = tempfile_with(
            "distance,slope_deg,roughness\n\
             100, 0, 0.1\n\
             50, -5.5, 0.4\n",
        );
        let segments = load_terrain_csv(f.path()).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], TerrainSegment::new(50.0, -5.5, 0.4));
    }

    #[test]
    fn terrain_csv_accepts_extra_and_velocity_columns() {
        let csv = "name,distance,slope_deg,roughness,velocity\n\
                   ridge,20,12,0.6,0.02\n\
                   flat,30,0,0.0,\n";
        let segments = parse_terrain_csv(csv.as_bytes(), "inline").unwrap();
        assert_eq!(segments[0].velocity, Some(0.02));
        assert_eq!(segments[1].velocity, None);
    }

    #[test]
    fn terrain_csv_missing_column_is_invalid_input() {
        let csv = "distance,slope_deg\n100,0\n";
        let err = parse_terrain_csv(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(
            err,
            MissionError::MissingTerrainColumn {
                column: "roughness",
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn terrain_csv_bad_row_rejects_whole_file() {
        let csv = "distance,slope_deg,roughness\n100,0,0.1\nfar,0,0.1\n";
        let err = parse_terrain_csv(csv.as_bytes(), "inline").unwrap_err();
        assert!(matches!(err, MissionError::InvalidTerrain { row: 2, .. }), "{err}");
    }

    #[test]
    fn terrain_csv_negative_distance_is_rejected() {
        let csv = "distance,slope_deg,roughness\n-1,0,0.1\n";
        assert!(parse_terrain_csv(csv.as_bytes(), "inline").is_err());
    }

    #[test]
    fn terrain_missing_file_is_io_error() {
        let err = load_terrain_csv(Path::new("/nonexistent/terrain.csv")).unwrap_err();
        assert!(matches!(err, MissionError::Io { .. }));
    }

    // ── Tasks ─────────────────────────────────────────────────────────────────

    #[test]
    fn tasks_json_loads_records() {
        let f = tempfile_with(
            r#"[
                {"task_id": "C1", "task_type": "drilling", "duration_hours": 2.0,
                 "urgency": 9, "reward": 20, "location": "Ridge"},
                {"task_id": "C2", "task_type": "imaging", "duration_hours": 0.5,
                 "urgency": 3, "reward": 4}
            ]"#,
        );
        let tasks = load_tasks_json(f.path()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].task_type, TaskType::Drilling);
        assert_eq!(tasks[0].location, "Ridge");
        assert_eq!(tasks[1].location, "unknown");
    }

    #[test]
    fn tasks_json_unknown_type_is_unknown_entity() {
        let json = r#"[{"task_id": "X", "task_type": "teleport", "duration_hours": 1,
                        "urgency": 1, "reward": 1}]"#;
        let err = parse_tasks_json(json, "inline").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn tasks_json_duplicate_id_is_rejected() {
        let json = r#"[
            {"task_id": "D", "task_type": "imaging", "duration_hours": 1, "urgency": 1, "reward": 1},
            {"task_id": "D", "task_type": "drilling", "duration_hours": 1, "urgency": 1, "reward": 1}
        ]"#;
        let err = parse_tasks_json(json, "inline").unwrap_err();
        assert!(matches!(err, MissionError::DuplicateTaskId { ref task_id } if task_id == "D"));
    }

    #[test]
    fn tasks_json_missing_field_is_invalid_file() {
        let json = r#"[{"task_id": "M", "task_type": "imaging"}]"#;
        let err = parse_tasks_json(json, "inline").unwrap_err();
        assert!(matches!(err, MissionError::InvalidTaskFile { .. }));
    }

    // ── Reports ───────────────────────────────────────────────────────────────

    #[test]
    fn json_report_round_trips_through_file() {
        let f = NamedTempFile::new().unwrap();
        let tasks = crate::task::sample_tasks();
        write_json_report(f.path(), &tasks).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(f.path()).unwrap()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 8);
        assert_eq!(value[0]["task_type"], "sample_collection");
    }
}
