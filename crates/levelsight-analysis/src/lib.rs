//! Session-level behavioral analysis
//!
//! This crate turns raw telemetry events into the session table every later
//! pipeline stage enriches:
//!
//! - [`session`]: the [`SessionRecord`](session::SessionRecord) row type and
//!   the behavioral [`Feature`](session::Feature) vocabulary
//! - [`aggregate`]: grouping events into one record per
//!   (session, player, level) triple with derived behavioral features
//! - [`archetype`]: standardized k-means clustering of sessions into named
//!   play-style archetypes
//!
//! Session records are created once by aggregation and then progressively
//! enriched (ratings, predictions, archetypes); earlier stages never see a
//! later stage's columns.

pub mod aggregate;
pub mod archetype;
pub mod session;

/// Structurally invalid pipeline input.
///
/// All variants are fatal: the pipeline reports the violated constraint and
/// aborts without producing artifacts.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ValidationError {
    /// Session aggregation was handed an empty event table.
    #[display("cannot aggregate sessions from an empty event table")]
    EmptyEvents,
    /// Archetype clustering was handed an empty session table.
    #[display("cannot cluster archetypes over an empty session table")]
    EmptySessions,
    /// Requested cluster count is zero or exceeds the session count.
    #[display("cannot create {requested} clusters from {available} sessions")]
    BadClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of sessions available for clustering.
        available: usize,
    },
    /// Too few outcome-labeled sessions to train the success model.
    #[display(
        "insufficient labeled sessions for training: {available} available, need at least {required}"
    )]
    TooFewLabeled {
        /// Number of sessions with a known outcome.
        available: usize,
        /// Minimum number required.
        required: usize,
    },
}
