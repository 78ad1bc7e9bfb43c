//! Diagnostic report assembly
//!
//! The final pipeline stage: recombines predictions, ratings, archetypes
//! and feature attributions into one process-wide summary plus one report
//! per level.
//!
//! - [`assemble`]: prediction recompute (with the STORED training medians,
//!   never refit), archetype-name join, the global top-feature ranking,
//!   and the summary / per-level report structures
//! - [`sessions_csv`]: the flat per-session CSV dump
//! - [`chart`]: best-effort attribution-chart capability with a null
//!   backend (no chart is produced, and that is not an error)

pub mod assemble;
pub mod chart;
pub mod sessions_csv;
