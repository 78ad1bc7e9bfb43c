//! Elo-style rating engine for players and levels
//!
//! Treats every outcome-labeled session as a match between the player and
//! the level: the level is the player's "opponent". Ratings for both pools
//! start at 1500 and move by the classic Elo update, with the level delta
//! being the exact negation of the player delta for the same session. This
//! zero-sum coupling between the two pools is deliberate, preserved
//! behavior; ratings are difficulty estimates relative to the player
//! population, not independent scales.
//!
//! Sessions are processed in a seeded pseudo-random shuffle order so that
//! repeated runs over the same table produce identical ratings. Rating
//! state is an explicit value owned by the engine call; nothing here is
//! process-global.

use std::collections::BTreeMap;

use levelsight_analysis::session::{DEFAULT_ELO, SessionRecord};
use rand::{SeedableRng, seq::SliceRandom};
use rand_pcg::Pcg64;

/// Ratings per player id and per level id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingState {
    /// Player id → rating.
    pub players: BTreeMap<String, f64>,
    /// Level id → rating.
    pub levels: BTreeMap<String, f64>,
}

impl RatingState {
    /// Player rating, defaulting to 1500 for ids never rated.
    #[must_use]
    pub fn player(&self, id: &str) -> f64 {
        self.players.get(id).copied().unwrap_or(DEFAULT_ELO)
    }

    /// Level rating, defaulting to 1500 for ids never rated.
    #[must_use]
    pub fn level(&self, id: &str) -> f64 {
        self.levels.get(id).copied().unwrap_or(DEFAULT_ELO)
    }

    /// Writes `player_elo` / `level_elo` into each record by id lookup.
    pub fn apply(&self, sessions: &mut [SessionRecord]) {
        for record in sessions {
            record.player_elo = self.player(&record.player_id);
            record.level_elo = self.level(&record.level_id);
        }
    }
}

/// Iterative Elo computation over a session table.
#[derive(Debug, Clone, Copy)]
pub struct RatingEngine {
    /// Update step size.
    pub k: f64,
    /// Number of passes over the shuffled table.
    pub passes: usize,
    /// Seed for the shuffle order.
    pub seed: u64,
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self {
            k: 16.0,
            passes: 1,
            seed: 0,
        }
    }
}

impl RatingEngine {
    /// Computes ratings from the outcome-labeled sessions in `sessions`.
    ///
    /// Every id appearing in the table gets an entry (starting at 1500);
    /// sessions without a known outcome contribute no updates.
    #[must_use]
    pub fn rate(&self, sessions: &[SessionRecord]) -> RatingState {
        let mut state = RatingState::default();
        for record in sessions {
            state
                .players
                .entry(record.player_id.clone())
                .or_insert(DEFAULT_ELO);
            state
                .levels
                .entry(record.level_id.clone())
                .or_insert(DEFAULT_ELO);
        }

        let mut rng = Pcg64::seed_from_u64(self.seed);
        let mut order: Vec<usize> = (0..sessions.len()).collect();
        for _ in 0..self.passes {
            order.shuffle(&mut rng);
            for &index in &order {
                let record = &sessions[index];
                let Some(success) = record.success_flag else {
                    continue;
                };
                let outcome = f64::from(u8::from(success));

                let player_rating = state.player(&record.player_id);
                let level_rating = state.level(&record.level_id);
                let expected = expected_score(player_rating, level_rating);

                let player_delta = self.k * (outcome - expected);
                let level_delta = self.k * ((1.0 - outcome) - (1.0 - expected));
                state
                    .players
                    .insert(record.player_id.clone(), player_rating + player_delta);
                state
                    .levels
                    .insert(record.level_id.clone(), level_rating + level_delta);
            }
        }
        state
    }
}

/// Expected score of side `a` against side `b` under the Elo model.
#[must_use]
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((rating_b - rating_a) / 400.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled_session(session: &str, player: &str, level: &str, success: bool) -> SessionRecord {
        let mut record =
            SessionRecord::new(session.into(), player.into(), level.into());
        record.success_flag = Some(success);
        record
    }

    #[test]
    fn test_expected_score_symmetry() {
        assert!((expected_score(1500.0, 1500.0) - 0.5).abs() < 1e-12);
        let favored = expected_score(1700.0, 1500.0);
        let underdog = expected_score(1500.0, 1700.0);
        assert!((favored + underdog - 1.0).abs() < 1e-12);
        assert!(favored > 0.75);
    }

    #[test]
    fn test_level_delta_is_exact_negation_of_player_delta() {
        for &(k, player_rating, level_rating, success) in &[
            (16.0, 1500.0, 1500.0, true),
            (16.0, 1200.0, 1800.0, false),
            (32.0, 1777.5, 1402.25, true),
            (4.0, 1500.0, 1499.0, false),
        ] {
            let outcome = f64::from(u8::from(success));
            let expected = expected_score(player_rating, level_rating);
            let player_delta = k * (outcome - expected);
            let level_delta = k * ((1.0 - outcome) - (1.0 - expected));
            assert_eq!(level_delta, -player_delta);
        }
    }

    #[test]
    fn test_rating_sum_is_conserved() {
        let sessions = vec![
            labeled_session("S0", "P0", "L0", true),
            labeled_session("S1", "P1", "L0", false),
            labeled_session("S2", "P0", "L1", true),
            labeled_session("S3", "P1", "L1", true),
        ];
        let state = RatingEngine::default().rate(&sessions);
        let total: f64 = state
            .players
            .values()
            .chain(state.levels.values())
            .sum();
        // 2 players + 2 levels all started at 1500; zero-sum updates keep
        // the grand total fixed.
        assert!((total - 6000.0).abs() < 1e-9);
    }

    #[test]
    fn test_winning_raises_player_and_lowers_level() {
        let sessions = vec![
            labeled_session("S0", "P0", "L0", true),
            labeled_session("S1", "P0", "L0", true),
        ];
        let state = RatingEngine::default().rate(&sessions);
        assert!(state.player("P0") > DEFAULT_ELO);
        assert!(state.level("L0") < DEFAULT_ELO);
    }

    #[test]
    fn test_unlabeled_sessions_are_skipped() {
        let sessions = vec![SessionRecord::new("S0".into(), "P0".into(), "L0".into())];
        let state = RatingEngine::default().rate(&sessions);
        assert_eq!(state.player("P0"), DEFAULT_ELO);
        assert_eq!(state.level("L0"), DEFAULT_ELO);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let sessions: Vec<_> = (0..30)
            .map(|i| {
                labeled_session(
                    &format!("S{i}"),
                    &format!("P{}", i % 5),
                    &format!("L{}", i % 3),
                    i % 2 == 0,
                )
            })
            .collect();
        let engine = RatingEngine::default();
        assert_eq!(engine.rate(&sessions), engine.rate(&sessions));
    }

    #[test]
    fn test_apply_defaults_unseen_ids() {
        let state = RatingState::default();
        let mut sessions = vec![SessionRecord::new("S0".into(), "P9".into(), "L9".into())];
        state.apply(&mut sessions);
        assert_eq!(sessions[0].player_elo, DEFAULT_ELO);
        assert_eq!(sessions[0].level_elo, DEFAULT_ELO);
    }
}
