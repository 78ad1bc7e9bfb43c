//! Raw gameplay telemetry: event model, log ingestion, synthetic generation
//!
//! This crate owns the front of the analytics pipeline:
//!
//! - [`event`]: the canonical [`Event`](event::Event) record every
//!   downstream stage consumes
//! - [`loader`]: tolerant JSON/JSONL log ingestion that normalizes
//!   heterogeneous telemetry exports into canonical events
//! - [`synth`]: a deterministic event-stream simulator driven by latent
//!   player-skill and level-difficulty variables, used for demos and
//!   regression tests
//!
//! Events are immutable once loaded; aggregation into session records
//! happens downstream in `levelsight-analysis`.

pub mod event;
pub mod loader;
pub mod synth;

pub use event::{Event, EventKind};
