//! CLI argument definitions
//!
//! All Clap derive structs for `silkcore` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::DurationSpec;

// ============================================================================
// Root CLI
// ============================================================================

/// Actor state machines and contact damage, simulated headlessly.
#[derive(Parser, Debug)]
#[command(name = "silkcore", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "SILKCORE_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(long, default_value = "human", global = true, env = "SILKCORE_LOG_FORMAT")]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate actor and scenario files.
    Validate(ValidateArgs),

    /// Run a scenario headlessly and print a summary.
    Run(RunArgs),

    /// Display version and build information.
    Version(VersionArgs),
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file.
    #[arg(env = "SILKCORE_SCENARIO")]
    pub scenario: PathBuf,

    /// Number of steps, overriding `simulation.ticks`.
    #[arg(long)]
    pub ticks: Option<u64>,

    /// Random seed, overriding `simulation.seed`.
    #[arg(long, env = "SILKCORE_SEED")]
    pub seed: Option<u64>,

    /// Fixed timestep (`0.02` or `20ms`).
    #[arg(long, value_parser = parse_seconds)]
    pub fixed_dt: Option<f32>,

    /// Frame timestep (`0.016` or `16ms`).
    #[arg(long, value_parser = parse_seconds)]
    pub frame_dt: Option<f32>,

    /// Append the JSONL notification stream to this file.
    #[arg(long, env = "SILKCORE_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after the run.
    #[arg(long)]
    pub metrics: bool,

    /// Summary output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Parses a timestep given as seconds or as a humantime string.
fn parse_seconds(raw: &str) -> Result<f32, String> {
    let spec = raw
        .parse::<f64>()
        .map_or_else(|_| DurationSpec::Text(raw.to_string()), DurationSpec::Seconds);
    let secs = spec.seconds()?;
    if secs <= 0.0 {
        return Err("timestep must be greater than zero".to_string());
    }
    Ok(secs)
}
