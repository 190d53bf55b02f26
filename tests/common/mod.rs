//! Shared integration-test helpers: fixture lookup, in-process scenario
//! runs and a thin wrapper around the `silkcore` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;

use silkcore::config::{ConfigLoader, SimulationConfig};
use silkcore::sim::{Notification, RunOptions, RunSummary, run_scenario};

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Loads a fixture through the full loader pipeline.
#[allow(clippy::missing_panics_doc)]
pub fn load_fixture(name: &str) -> Arc<SimulationConfig> {
    ConfigLoader::with_defaults()
        .load(&fixture_path(name))
        .unwrap_or_else(|e| panic!("fixture {name} failed to load: {e}"))
        .config
}

/// Runs a fixture with default options, collecting every notification.
#[allow(clippy::missing_panics_doc)]
pub fn run_fixture(name: &str) -> (RunSummary, Vec<(u64, Notification)>) {
    let config = load_fixture(name);
    let mut seen = Vec::new();
    let summary = run_scenario(&config, &RunOptions::default(), |step, n| {
        seen.push((step, n.clone()));
    })
    .unwrap_or_else(|e| panic!("fixture {name} failed to run: {e}"));
    (summary, seen)
}

/// Runs the `silkcore` binary to completion with the given arguments.
#[allow(clippy::missing_panics_doc)]
pub fn silkcore(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_silkcore"))
        .args(args)
        .env_remove("SILKCORE_LOG_LEVEL")
        .env_remove("SILKCORE_SEED")
        .env_remove("SILKCORE_EVENTS_FILE")
        .output()
        .expect("failed to spawn silkcore")
}

/// Fixture path rendered for use as a CLI argument.
pub fn fixture_arg(name: &str) -> String {
    fixture_path(name).display().to_string()
}
