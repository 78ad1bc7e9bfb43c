//! Deterministic synthetic telemetry generation
//!
//! Simulates an event stream from latent per-player skill and per-level
//! difficulty variables. Session behavior is driven by the mismatch
//! `difficulty − skill`: overmatched players act more, backtrack more,
//! deliberate longer, and fail more often. The generator is a pure
//! function of its configuration; identical inputs produce byte-identical
//! event streams, which regression tests rely on.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution, Normal, Poisson};
use rand_pcg::Pcg64;

use crate::event::{Event, EventKind};

/// Sizing and seeding for synthetic generation. All counts must be at
/// least 1; the CLI validates this before calling in.
#[derive(Debug, Clone, Copy)]
pub struct SynthConfig {
    /// Number of distinct simulated players.
    pub players: u64,
    /// Number of distinct simulated levels.
    pub levels: u64,
    /// Number of simulated sessions.
    pub sessions: u64,
    /// RNG seed; the entire stream is a pure function of this.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            players: 40,
            levels: 10,
            sessions: 1500,
            seed: 7,
        }
    }
}

/// Generates the full synthetic event stream for `config`.
#[must_use]
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn generate_events(config: &SynthConfig) -> Vec<Event> {
    let mut rng = Pcg64::seed_from_u64(config.seed);
    let standard_normal = Normal::new(0.0, 1.0).unwrap();

    let player_skill: Vec<f64> = (0..config.players)
        .map(|_| standard_normal.sample(&mut rng))
        .collect();
    let level_difficulty: Vec<f64> = (0..config.levels)
        .map(|_| standard_normal.sample(&mut rng))
        .collect();

    let origin = session_origin();
    let mut events = Vec::new();
    for session in 0..config.sessions {
        let player = rng.random_range(0..config.players) as usize;
        let level = rng.random_range(0..config.levels) as usize;
        let session_id = format!("S{session}");
        let player_id = format!("P{player}");
        let level_id = format!("L{level}");

        let base_decision_ms = Normal::<f64>::new(300.0, 80.0)
            .unwrap()
            .sample(&mut rng)
            .trunc()
            .max(50.0);
        let mismatch = level_difficulty[level] - player_skill[player];
        let overmatch = mismatch.max(0.0);

        let actions = Poisson::new(20.0 + 6.0 * overmatch)
            .unwrap()
            .sample(&mut rng)
            .trunc()
            .max(1.0) as u64;
        let backtrack_prob = (0.05 + 0.25 * logistic(mismatch)).min(0.8);
        let backtracks = Binomial::new(actions, backtrack_prob).unwrap().sample(&mut rng);
        let mean_decision_ms = base_decision_ms * (1.0 + 0.25 * overmatch);
        let success = rng.random::<f64>() < logistic(player_skill[player] - level_difficulty[level]);
        let completion_ms =
            (actions as f64 * mean_decision_ms * (1.0 + 0.5 * f64::from(u8::from(!success)))).trunc();

        let start = origin + Duration::seconds(3 * session as i64);
        events.push(Event {
            timestamp: Some(start),
            ..Event::new(&session_id, &player_id, &level_id, EventKind::LevelStart)
        });
        for action in 0..actions {
            let decision_ms = Normal::new(mean_decision_ms, 30.0)
                .unwrap()
                .sample(&mut rng)
                .trunc()
                .max(0.0);
            events.push(Event {
                timestamp: Some(
                    start + Duration::milliseconds(((action + 1) as f64 * mean_decision_ms) as i64),
                ),
                decision_time_ms: Some(decision_ms),
                was_backtracked: action < backtracks,
                ..Event::new(&session_id, &player_id, &level_id, EventKind::Action)
            });
        }
        events.push(Event {
            timestamp: Some(start + Duration::milliseconds(completion_ms as i64)),
            success_flag: Some(success),
            completion_time_ms: Some(completion_ms),
            ..Event::new(&session_id, &player_id, &level_id, EventKind::LevelEnd)
        });
    }
    events
}

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn session_origin() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
