//! Command-line surface and pipeline orchestration
//!
//! The pipeline is single-threaded and strictly sequential: each stage
//! consumes the previous stage's enriched session table and returns an
//! enriched copy. Artifacts are only published after every stage has
//! succeeded (see [`crate::artifacts`]).

use std::path::{Path, PathBuf};

use clap::Parser;
use levelsight_analysis::{aggregate::aggregate_sessions, archetype::ArchetypeClusterer};
use levelsight_model::trainer::train_success_model;
use levelsight_rating::RatingEngine;
use levelsight_report::assemble::{
    apply_predictions, build_level_reports, build_summary, global_top_features,
    join_archetype_names,
};
use levelsight_telemetry::{
    Event,
    loader::load_events,
    synth::{SynthConfig, generate_events},
};

use crate::artifacts::{Artifacts, publish};

/// Input value that selects synthetic generation together with
/// `--make-synth`.
const SYNTH_INPUT: &str = "SYNTH";

#[derive(Debug, Clone, Parser)]
#[command(name = "levelsight", version, about = "Gameplay telemetry balance analytics")]
pub struct CommandArgs {
    /// Path to JSONL/JSON logs (file or directory), or 'SYNTH' together
    /// with --make-synth
    #[arg(long)]
    input: String,
    /// Output directory; created if absent
    #[arg(long)]
    output: PathBuf,
    /// Number of archetype clusters
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u64).range(1..))]
    clusters: u64,
    /// Generate synthetic telemetry when --input is SYNTH
    #[arg(long)]
    make_synth: bool,
    /// Number of players for synthetic data
    #[arg(long, default_value_t = 40, value_parser = clap::value_parser!(u64).range(1..))]
    players: u64,
    /// Number of levels for synthetic data
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    levels: u64,
    /// Number of sessions for synthetic data
    #[arg(long, default_value_t = 1500, value_parser = clap::value_parser!(u64).range(1..))]
    sessions: u64,
    /// Seed for synthetic generation
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    execute(&args)
}

fn execute(args: &CommandArgs) -> anyhow::Result<()> {
    let synthesized = args.make_synth && args.input.eq_ignore_ascii_case(SYNTH_INPUT);
    let events: Vec<Event> = if synthesized {
        eprintln!(
            "Generating synthetic telemetry: {} players, {} levels, {} sessions (seed {})",
            args.players, args.levels, args.sessions, args.seed
        );
        generate_events(&SynthConfig {
            players: args.players,
            levels: args.levels,
            sessions: args.sessions,
            seed: args.seed,
        })
    } else {
        eprintln!("Loading telemetry from {}", args.input);
        load_events(Path::new(&args.input))?
    };
    eprintln!("Loaded {} events", events.len());

    let mut sessions = aggregate_sessions(&events)?;
    eprintln!("Aggregated {} sessions", sessions.len());

    let ratings = RatingEngine::default().rate(&sessions);
    ratings.apply(&mut sessions);
    eprintln!(
        "Computed Elo ratings for {} players and {} levels",
        ratings.players.len(),
        ratings.levels.len()
    );

    let trained = train_success_model(&sessions)?;
    if trained.val_auc.is_nan() {
        eprintln!("Trained success model; validation AUC unavailable");
    } else {
        eprintln!("Trained success model; validation AUC {:.3}", trained.val_auc);
    }

    #[expect(clippy::cast_possible_truncation)]
    let clusterer = ArchetypeClusterer::new(args.clusters as usize);
    let archetype_names = clusterer.assign(&mut sessions)?;
    eprintln!("Clustered sessions into {} archetypes", archetype_names.len());

    apply_predictions(&mut sessions, &trained);
    join_archetype_names(&mut sessions, &archetype_names);
    let ranking = global_top_features(&trained.model, &trained, &sessions);

    let summary = build_summary(events.len(), &sessions, &trained, &archetype_names);
    let level_reports = build_level_reports(&sessions, &ranking);

    publish(
        &args.output,
        &Artifacts {
            summary: &summary,
            level_reports: &level_reports,
            sessions: &sessions,
            ranking: &ranking,
            synthetic_events: synthesized.then_some(events.as_slice()),
        },
    )?;

    println!("Done. Outputs in: {}", args.output.display());
    Ok(())
}
