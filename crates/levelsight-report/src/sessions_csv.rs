//! Flat per-session CSV dump
//!
//! One row per session with every derived and enriched column, written in
//! a fixed column order so repeated runs over identical inputs produce
//! byte-identical files.

use std::io;

use levelsight_analysis::session::SessionRecord;

/// Column order of the CSV dump.
const COLUMNS: [&str; 15] = [
    "session_id",
    "player_id",
    "level_id",
    "session_time",
    "attempt_count",
    "action_count",
    "mean_decision_time",
    "backtrack_ratio",
    "success_flag",
    "completion_time_ms",
    "player_elo",
    "level_elo",
    "archetype",
    "archetype_name",
    "pred_success",
];

/// Writes all sessions to `writer` as CSV. Missing values become empty
/// fields; boolean outcomes are written as `1`/`0`.
pub fn write_sessions_csv<W: io::Write>(
    writer: W,
    sessions: &[SessionRecord],
) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in sessions {
        csv_writer.write_record([
            record.session_id.clone(),
            record.player_id.clone(),
            record.level_id.clone(),
            optional_float(record.session_time),
            record.attempt_count.to_string(),
            record.action_count.to_string(),
            optional_float(record.mean_decision_time),
            optional_float(record.backtrack_ratio),
            record
                .success_flag
                .map(|flag| u8::from(flag).to_string())
                .unwrap_or_default(),
            optional_float(record.completion_time_ms),
            record.player_elo.to_string(),
            record.level_elo.to_string(),
            record
                .archetype
                .map(|id| id.to_string())
                .unwrap_or_default(),
            record.archetype_name.clone().unwrap_or_default(),
            optional_float(record.pred_success),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn optional_float(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SessionRecord {
        let mut record = SessionRecord::new("S0".into(), "P0".into(), "L0".into());
        record.session_time = Some(12.5);
        record.attempt_count = 1;
        record.action_count = 20;
        record.mean_decision_time = Some(250.0);
        record.backtrack_ratio = Some(0.15);
        record.success_flag = Some(true);
        record.completion_time_ms = Some(12_500.0);
        record.archetype = Some(1);
        record.archetype_name = Some("explorer".into());
        record.pred_success = Some(0.75);
        record
    }

    #[test]
    fn test_header_and_row() {
        let mut buffer = Vec::new();
        write_sessions_csv(&mut buffer, &[sample_record()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
        let row = lines.next().unwrap();
        assert_eq!(
            row,
            "S0,P0,L0,12.5,1,20,250,0.15,1,12500,1500,1500,1,explorer,0.75"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let record = SessionRecord::new("S1".into(), "P1".into(), "L1".into());
        let mut buffer = Vec::new();
        write_sessions_csv(&mut buffer, &[record]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "S1,P1,L1,,0,0,,,,,1500,1500,,,");
    }

    #[test]
    fn test_output_is_reproducible() {
        let sessions = vec![sample_record(), SessionRecord::new("S1".into(), "P1".into(), "L1".into())];
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_sessions_csv(&mut first, &sessions).unwrap();
        write_sessions_csv(&mut second, &sessions).unwrap();
        assert_eq!(first, second);
    }
}
