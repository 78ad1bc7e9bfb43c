//! Event-to-session aggregation
//!
//! Groups raw events by the (session_id, player_id, level_id) triple and
//! derives one behavioral [`SessionRecord`] per group. Output order is
//! sorted by key, so aggregation is deterministic regardless of event
//! order in the input files.

use std::collections::BTreeMap;

use levelsight_stats::descriptive::mean;
use levelsight_telemetry::{Event, EventKind};

use crate::{ValidationError, session::SessionRecord};

/// Aggregates `events` into unique session records.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyEvents`] when `events` is empty.
pub fn aggregate_sessions(events: &[Event]) -> Result<Vec<SessionRecord>, ValidationError> {
    if events.is_empty() {
        return Err(ValidationError::EmptyEvents);
    }

    let mut groups: BTreeMap<(&str, &str, &str), Vec<&Event>> = BTreeMap::new();
    for event in events {
        groups
            .entry((&event.session_id, &event.player_id, &event.level_id))
            .or_default()
            .push(event);
    }

    Ok(groups
        .into_iter()
        .map(|((session_id, player_id, level_id), group)| {
            summarize_group(
                SessionRecord::new(session_id.into(), player_id.into(), level_id.into()),
                &group,
            )
        })
        .collect())
}

fn summarize_group(mut record: SessionRecord, group: &[&Event]) -> SessionRecord {
    let timestamps = group.iter().filter_map(|e| e.timestamp);
    if let (Some(first), Some(last)) = (timestamps.clone().min(), timestamps.max()) {
        #[expect(clippy::cast_precision_loss)]
        let seconds = (last - first).num_milliseconds() as f64 / 1000.0;
        record.session_time = Some(seconds);
    }

    record.attempt_count = count_kind(group, EventKind::LevelStart);
    record.action_count = count_kind(group, EventKind::Action);

    let actions = group
        .iter()
        .filter(|e| e.event_type == EventKind::Action)
        .collect::<Vec<_>>();
    record.mean_decision_time = mean(actions.iter().map(|e| e.decision_time_ms));
    record.backtrack_ratio = mean(
        actions
            .iter()
            .map(|e| Some(f64::from(u8::from(e.was_backtracked)))),
    );

    // "Max" of the observed flags: any success wins over failure.
    record.success_flag = group
        .iter()
        .filter_map(|e| e.success_flag)
        .max_by_key(|&flag| u8::from(flag));

    record.completion_time_ms = group
        .iter()
        .filter_map(|e| e.completion_time_ms)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .or_else(|| record.session_time.map(|s| s * 1000.0));

    record
}

fn count_kind(group: &[&Event], kind: EventKind) -> u64 {
    group.iter().filter(|e| e.event_type == kind).count() as u64
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use levelsight_telemetry::synth::{SynthConfig, generate_events};

    use super::*;

    fn at_seconds(offset: i64) -> Option<chrono::DateTime<chrono::Utc>> {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1)?
            .and_hms_opt(12, 0, 0)?
            .and_utc();
        Some(base + TimeDelta::seconds(offset))
    }

    fn action(decision: Option<f64>, backtracked: bool) -> Event {
        Event {
            decision_time_ms: decision,
            was_backtracked: backtracked,
            ..Event::new("S0", "P0", "L0", EventKind::Action)
        }
    }

    #[test]
    fn test_empty_events_rejected() {
        assert!(matches!(
            aggregate_sessions(&[]),
            Err(ValidationError::EmptyEvents)
        ));
    }

    #[test]
    fn test_derived_fields() {
        let events = vec![
            Event {
                timestamp: at_seconds(0),
                ..Event::new("S0", "P0", "L0", EventKind::LevelStart)
            },
            Event {
                timestamp: at_seconds(1),
                ..action(Some(100.0), true)
            },
            Event {
                timestamp: at_seconds(2),
                ..action(None, false)
            },
            Event {
                timestamp: at_seconds(3),
                ..action(Some(300.0), false)
            },
            Event {
                timestamp: at_seconds(10),
                success_flag: Some(true),
                completion_time_ms: Some(9500.0),
                ..Event::new("S0", "P0", "L0", EventKind::LevelEnd)
            },
        ];

        let sessions = aggregate_sessions(&events).unwrap();
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.session_time, Some(10.0));
        assert_eq!(s.attempt_count, 1);
        assert_eq!(s.action_count, 3);
        assert_eq!(s.mean_decision_time, Some(200.0));
        assert!((s.backtrack_ratio.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.success_flag, Some(true));
        assert_eq!(s.completion_time_ms, Some(9500.0));
    }

    #[test]
    fn test_completion_backfilled_from_session_time() {
        let events = vec![
            Event {
                timestamp: at_seconds(0),
                ..Event::new("S0", "P0", "L0", EventKind::LevelStart)
            },
            Event {
                timestamp: at_seconds(4),
                success_flag: Some(false),
                ..Event::new("S0", "P0", "L0", EventKind::LevelEnd)
            },
        ];
        let sessions = aggregate_sessions(&events).unwrap();
        assert_eq!(sessions[0].completion_time_ms, Some(4000.0));
    }

    #[test]
    fn test_success_flag_max_semantics() {
        let events = vec![
            Event {
                success_flag: Some(false),
                ..Event::new("S0", "P0", "L0", EventKind::LevelEnd)
            },
            Event {
                success_flag: Some(true),
                ..Event::new("S0", "P0", "L0", EventKind::LevelEnd)
            },
        ];
        let sessions = aggregate_sessions(&events).unwrap();
        assert_eq!(sessions[0].success_flag, Some(true));

        let unlabeled = vec![Event::new("S1", "P0", "L0", EventKind::LevelStart)];
        let sessions = aggregate_sessions(&unlabeled).unwrap();
        assert_eq!(sessions[0].success_flag, None);
    }

    #[test]
    fn test_keys_are_unique_for_synthetic_stream() {
        let events = generate_events(&SynthConfig {
            players: 5,
            levels: 3,
            sessions: 60,
            seed: 11,
        });
        let sessions = aggregate_sessions(&events).unwrap();
        assert_eq!(sessions.len(), 60);

        let mut keys: Vec<_> = sessions
            .iter()
            .map(|s| (&s.session_id, &s.player_id, &s.level_id))
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), sessions.len());
    }

    #[test]
    fn test_backtrack_ratio_bounds_on_synthetic_stream() {
        let events = generate_events(&SynthConfig {
            players: 4,
            levels: 2,
            sessions: 40,
            seed: 5,
        });
        for session in aggregate_sessions(&events).unwrap() {
            let ratio = session.backtrack_ratio.unwrap();
            assert!((0.0..=1.0).contains(&ratio));
        }
    }
}
