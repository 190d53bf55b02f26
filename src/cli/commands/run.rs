//! `run` command
//!
//! Loads a scenario, runs it headlessly and prints a summary.

use chrono::Utc;

use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::ConfigLoader;
use crate::error::SilkError;
use crate::observability::{Event, EventEmitter, init_metrics};
use crate::sim::{RunOptions, RunSummary, run_scenario};

/// Run a scenario file.
///
/// # Errors
///
/// Returns an error if the scenario fails to load, the events file cannot
/// be opened, or the run itself fails.
pub fn run(args: &RunArgs) -> Result<(), SilkError> {
    let loaded = ConfigLoader::with_defaults().load(&args.scenario)?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    let config = loaded.config;

    let metrics = if args.metrics { init_metrics()? } else { None };

    let emitter = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let options = RunOptions {
        ticks: args.ticks,
        seed: args.seed,
        fixed_dt: args.fixed_dt,
        frame_dt: args.frame_dt,
    };

    emitter.emit(Event::RunStarted {
        timestamp: Utc::now(),
        scenario: args.scenario.display().to_string(),
        seed: options.seed.unwrap_or(config.simulation.seed),
        steps: options.ticks.unwrap_or(config.simulation.ticks),
        actors: config.actors.len(),
    });

    let summary = run_scenario(&config, &options, |step, notification| {
        emitter.emit(Event::notification(step, notification));
    })?;

    emitter.emit(Event::RunFinished {
        timestamp: Utc::now(),
        summary: summary.clone(),
    });
    emitter.flush();
    tracing::debug!(
        run_id = emitter.run_id(),
        events = emitter.event_count(),
        "event stream closed"
    );

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&summary)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    if let Some(handle) = metrics {
        eprint!("{}", handle.render());
    }
    Ok(())
}

fn render_human(summary: &RunSummary) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "seed {} / {} steps", summary.seed, summary.steps);
    let _ = writeln!(
        out,
        "damage: {} hits, {} total / deaths: {} / rejected: {}",
        summary.damage_events,
        summary.total_damage,
        summary.deaths,
        summary.rejected()
    );
    for (reason, count) in &summary.rejected_contacts {
        let _ = writeln!(out, "  {reason}: {count}");
    }
    for actor in &summary.actors {
        let hp = actor
            .hp
            .map_or_else(|| "-".to_string(), |hp| hp.to_string());
        let _ = writeln!(
            out,
            "{:<16} {:<12} hp {:>4}  soul {:>3}  marks {}  hits {}",
            actor.name,
            actor.state.as_deref().unwrap_or("-"),
            hp,
            actor.soul,
            actor.mark_layers,
            actor.hits_taken
        );
    }
    if !summary.chain.is_empty() {
        let links: Vec<String> = summary
            .chain
            .iter()
            .map(|(from, to)| format!("{from} -> {to}"))
            .collect();
        let _ = writeln!(out, "chain: {}", links.join(", "));
    }
    out
}
