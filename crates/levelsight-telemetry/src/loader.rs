//! Tolerant JSON/JSONL log ingestion
//!
//! Telemetry exports arrive in several shapes: line-delimited JSON, whole
//! JSON arrays, or single-object documents. For each discovered file the
//! loader first attempts line-delimited parsing; if any line fails, the
//! whole file is retried as one document. Files that fail both attempts are
//! skipped with a stderr warning and never contribute rows.
//!
//! Field-level problems (numbers encoded as strings, unparsable
//! timestamps, negative durations) are coerced to missing values rather
//! than treated as errors; only a run that produces zero rows overall is
//! fatal.

use std::{fs, io, path::Path};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::event::{Event, EventKind};

/// Ingestion failure.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    /// No rows could be loaded from any input file.
    #[display("no telemetry rows loaded from '{path}'; provide .json/.jsonl files")]
    NoRows { path: String },
    /// The input path itself could not be read.
    #[display("failed to read input path '{path}': {source}")]
    Io { path: String, source: io::Error },
}

/// Loads all events found under `input` (a file or a directory searched
/// recursively for `.json`/`.jsonl` files).
///
/// # Errors
///
/// Returns [`LoadError::NoRows`] if no file yields any row, and
/// [`LoadError::Io`] if the input path itself is unreadable. Individual
/// unparsable files only produce stderr warnings.
pub fn load_events(input: &Path) -> Result<Vec<Event>, LoadError> {
    let files = discover_files(input).map_err(|source| LoadError::Io {
        path: input.display().to_string(),
        source,
    })?;

    let mut events = Vec::new();
    for file in &files {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(err) => {
                eprintln!("warning: could not read {}: {err}", file.display());
                continue;
            }
        };
        match parse_document(&content) {
            Some(rows) => events.extend(rows.into_iter().map(event_from_row)),
            None => eprintln!("warning: could not parse {} as JSON", file.display()),
        }
    }

    if events.is_empty() {
        return Err(LoadError::NoRows {
            path: input.display().to_string(),
        });
    }
    Ok(events)
}

/// Collects candidate log files in deterministic (sorted path) order.
fn discover_files(input: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    if !input.is_dir() {
        // Existence check; a missing file should fail loudly here rather
        // than as a misleading "no rows" error.
        fs::metadata(input)?;
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    let mut pending = vec![input.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("json" | "jsonl")
            ) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Parses one file's content into JSON object rows.
///
/// Line-delimited parsing is attempted first; on any line failure the whole
/// document is retried as an array (each element one row) or a single
/// object (one row). Returns `None` if both attempts fail.
fn parse_document(content: &str) -> Option<Vec<Map<String, Value>>> {
    let mut rows = Vec::new();
    let mut line_parse_ok = true;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(map)) => rows.push(map),
            _ => {
                line_parse_ok = false;
                break;
            }
        }
    }
    if line_parse_ok && !rows.is_empty() {
        return Some(rows);
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
        ),
        Ok(Value::Object(map)) => Some(vec![map]),
        _ => None,
    }
}

/// Builds a canonical event from one raw JSON row.
///
/// Keys are normalized (trimmed, lower-cased) before field lookup, so
/// exports with inconsistent capitalization all map onto the same columns.
fn event_from_row(row: Map<String, Value>) -> Event {
    let row: Map<String, Value> = row
        .into_iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value))
        .collect();

    Event {
        timestamp: row.get("timestamp").and_then(coerce_timestamp),
        session_id: row.get("session_id").and_then(coerce_id).unwrap_or_default(),
        player_id: row.get("player_id").and_then(coerce_id).unwrap_or_default(),
        level_id: row.get("level_id").and_then(coerce_id).unwrap_or_default(),
        event_type: row
            .get("event_type")
            .and_then(Value::as_str)
            .map_or(EventKind::Other, EventKind::parse),
        decision_time_ms: row.get("decision_time_ms").and_then(coerce_duration_ms),
        was_backtracked: row.get("was_backtracked").is_some_and(coerce_truthy),
        success_flag: row.get("success_flag").and_then(coerce_flag),
        completion_time_ms: row.get("completion_time_ms").and_then(coerce_duration_ms),
    }
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(f64::from(u8::from(*b))),
        _ => None,
    }
}

/// Durations are non-negative by contract; anything else became garbage
/// upstream and is treated as missing.
fn coerce_duration_ms(value: &Value) -> Option<f64> {
    coerce_f64(value).filter(|v| v.is_finite() && *v >= 0.0)
}

fn coerce_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "t" | "yes"
        ),
        _ => false,
    }
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        _ => coerce_f64(value).map(|v| v != 0.0),
    }
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Naive ISO timestamps (no offset) are assumed UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
