//! Session records and the behavioral feature vocabulary

use serde::Serialize;

/// One playthrough attempt by one player on one level, summarized into
/// behavioral features.
///
/// The (session_id, player_id, level_id) triple is the primary key and is
/// unique after aggregation. Later pipeline stages fill in the enrichment
/// fields (`player_elo`/`level_elo`, `pred_success`, `archetype`,
/// `archetype_name`); columns are only ever added, never removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    /// Session identifier (part of the primary key).
    pub session_id: String,
    /// Player identifier (part of the primary key).
    pub player_id: String,
    /// Level identifier (part of the primary key).
    pub level_id: String,
    /// Wall-clock span of the session in seconds (max − min timestamp);
    /// missing when no event carried a timestamp.
    pub session_time: Option<f64>,
    /// Number of `level_start` events (restarts included).
    pub attempt_count: u64,
    /// Number of `action` events.
    pub action_count: u64,
    /// Mean of the non-missing decision times among action events, in ms.
    pub mean_decision_time: Option<f64>,
    /// Fraction of action events flagged as backtracking, in [0, 1];
    /// missing when the session has no action events.
    pub backtrack_ratio: Option<f64>,
    /// Session outcome: best observed success flag, missing if the session
    /// never reported one.
    pub success_flag: Option<bool>,
    /// Completion time in ms: the largest reported value, backfilled from
    /// `session_time` when the client never reported one.
    pub completion_time_ms: Option<f64>,
    /// Player Elo rating (1500.0 until the rating stage runs).
    pub player_elo: f64,
    /// Level Elo rating (1500.0 until the rating stage runs).
    pub level_elo: f64,
    /// Predicted success probability in [0, 1]; set by the report stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pred_success: Option<f64>,
    /// Archetype cluster id; set by the clustering stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<usize>,
    /// Archetype label; joined in by the report stage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype_name: Option<String>,
}

/// Initial rating for players and levels that have not been rated yet.
pub const DEFAULT_ELO: f64 = 1500.0;

impl SessionRecord {
    /// A fresh record for the given key with all derived fields unset and
    /// ratings at their default.
    #[must_use]
    pub fn new(session_id: String, player_id: String, level_id: String) -> Self {
        Self {
            session_id,
            player_id,
            level_id,
            session_time: None,
            attempt_count: 0,
            action_count: 0,
            mean_decision_time: None,
            backtrack_ratio: None,
            success_flag: None,
            completion_time_ms: None,
            player_elo: DEFAULT_ELO,
            level_elo: DEFAULT_ELO,
            pred_success: None,
            archetype: None,
            archetype_name: None,
        }
    }
}

/// Behavioral and rating columns that downstream stages select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    SessionTime,
    AttemptCount,
    ActionCount,
    MeanDecisionTime,
    BacktrackRatio,
    CompletionTimeMs,
    PlayerElo,
    LevelElo,
}

impl Feature {
    /// Candidate columns for the success model, in fixed selection order.
    pub const MODEL_CANDIDATES: [Self; 8] = [
        Self::SessionTime,
        Self::AttemptCount,
        Self::ActionCount,
        Self::MeanDecisionTime,
        Self::BacktrackRatio,
        Self::CompletionTimeMs,
        Self::PlayerElo,
        Self::LevelElo,
    ];

    /// Behavioral columns used for archetype clustering, in fixed order.
    pub const BEHAVIORAL: [Self; 5] = [
        Self::MeanDecisionTime,
        Self::BacktrackRatio,
        Self::ActionCount,
        Self::AttemptCount,
        Self::SessionTime,
    ];

    /// Column name as it appears in reports and the CSV dump.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::SessionTime => "session_time",
            Self::AttemptCount => "attempt_count",
            Self::ActionCount => "action_count",
            Self::MeanDecisionTime => "mean_decision_time",
            Self::BacktrackRatio => "backtrack_ratio",
            Self::CompletionTimeMs => "completion_time_ms",
            Self::PlayerElo => "player_elo",
            Self::LevelElo => "level_elo",
        }
    }

    /// Reads this column from a record; `None` where the value is missing.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn value(self, record: &SessionRecord) -> Option<f64> {
        match self {
            Self::SessionTime => record.session_time,
            Self::AttemptCount => Some(record.attempt_count as f64),
            Self::ActionCount => Some(record.action_count as f64),
            Self::MeanDecisionTime => record.mean_decision_time,
            Self::BacktrackRatio => record.backtrack_ratio,
            Self::CompletionTimeMs => record.completion_time_ms,
            Self::PlayerElo => Some(record.player_elo),
            Self::LevelElo => Some(record.level_elo),
        }
    }
}
