//! Canonical telemetry event record
//!
//! One [`Event`] per raw telemetry row. Field values are already coerced at
//! load time, so downstream stages never deal with malformed data: anything
//! that failed coercion is simply missing here.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kind of gameplay event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Player started (or restarted) the level.
    LevelStart,
    /// One in-level action (move, interaction, ...).
    Action,
    /// Player finished or abandoned the level; carries the outcome.
    LevelEnd,
    /// Unrecognized event type; kept but ignored by aggregation counters.
    Other,
}

impl EventKind {
    /// Parses an event-type string; unknown values map to [`Self::Other`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "level_start" => Self::LevelStart,
            "action" => Self::Action,
            "level_end" => Self::LevelEnd,
            _ => Self::Other,
        }
    }
}

/// One atomic telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Wall-clock instant of the event, when the log carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Session identifier (opaque).
    pub session_id: String,
    /// Player identifier (opaque).
    pub player_id: String,
    /// Level identifier (opaque).
    pub level_id: String,
    /// What happened.
    pub event_type: EventKind,
    /// Time the player took to decide on this action, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_time_ms: Option<f64>,
    /// Whether the action undid previous progress.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub was_backtracked: bool,
    /// Outcome of the session; set only on `level_end` events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_flag: Option<bool>,
    /// Total completion time reported by the client, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time_ms: Option<f64>,
}

impl Event {
    /// A bare event with the given identifiers and kind; all optional
    /// fields unset.
    #[must_use]
    pub fn new(session_id: &str, player_id: &str, level_id: &str, kind: EventKind) -> Self {
        Self {
            timestamp: None,
            session_id: session_id.to_owned(),
            player_id: player_id.to_owned(),
            level_id: level_id.to_owned(),
            event_type: kind,
            decision_time_ms: None,
            was_backtracked: false,
            success_flag: None,
            completion_time_ms: None,
        }
    }
}
