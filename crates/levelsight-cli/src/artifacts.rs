//! Staged, atomic artifact publication
//!
//! Every output file is written into a `<output>.staging` sibling
//! directory first; only after all writes succeed is the staging directory
//! renamed into place. A crashed or failed run therefore never leaves a
//! partially written output directory behind.

use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use levelsight_analysis::session::SessionRecord;
use levelsight_report::{
    assemble::{LevelReport, Summary},
    chart::{ChartRenderer, NullChartRenderer},
    sessions_csv::write_sessions_csv,
};
use levelsight_telemetry::Event;

/// Everything one pipeline run persists.
#[derive(Debug)]
pub struct Artifacts<'a> {
    pub summary: &'a Summary,
    pub level_reports: &'a [LevelReport],
    pub sessions: &'a [SessionRecord],
    pub ranking: &'a [(String, f64)],
    /// The generated event stream, present only for synthetic runs; it is
    /// persisted alongside the reports so a run can be replayed from its
    /// own logs.
    pub synthetic_events: Option<&'a [Event]>,
}

/// Writes all artifacts to a staging directory and atomically renames it
/// to `output`. A pre-existing `output` directory is replaced.
pub fn publish(output: &Path, artifacts: &Artifacts<'_>) -> anyhow::Result<()> {
    let staging = staging_dir(output);
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("failed to clear stale staging dir {}", staging.display()))?;
    }
    let levels_dir = staging.join("levels");
    fs::create_dir_all(&levels_dir)
        .with_context(|| format!("failed to create staging dir {}", staging.display()))?;

    write_json(&staging.join("summary.json"), artifacts.summary)?;
    for report in artifacts.level_reports {
        write_json(&levels_dir.join(format!("level_{}.json", report.level_id)), report)?;
    }

    let csv_path = staging.join("sessions_with_preds.csv");
    let csv_file = File::create(&csv_path)
        .with_context(|| format!("failed to create {}", csv_path.display()))?;
    write_sessions_csv(BufWriter::new(csv_file), artifacts.sessions)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    if let Some(events) = artifacts.synthetic_events {
        write_jsonl(&staging.join("synthetic_logs.jsonl"), events)?;
    }

    let chart_path = staging.join("shap_summary.png");
    let rendered = NullChartRenderer
        .render_attribution(artifacts.ranking, &chart_path)
        .with_context(|| format!("failed to render {}", chart_path.display()))?;
    if !rendered {
        eprintln!("note: no chart backend available; skipping shap_summary.png");
    }

    if output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("failed to replace {}", output.display()))?;
    }
    fs::rename(&staging, output).with_context(|| {
        format!(
            "failed to publish {} as {}",
            staging.display(),
            output.display()
        )
    })?;
    Ok(())
}

fn staging_dir(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map_or_else(|| "output".to_owned(), |n| n.to_string_lossy().into_owned());
    output.with_file_name(format!("{name}.staging"))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to write JSON to {}", path.display()))?;
    writeln!(&mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

fn write_jsonl(path: &Path, events: &[Event]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)
            .with_context(|| format!("failed to write event to {}", path.display()))?;
        writeln!(&mut writer)
            .with_context(|| format!("failed to write event to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}
