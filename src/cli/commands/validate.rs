//! `validate` command
//!
//! Loads every given file through the full pipeline and reports the
//! outcome without running anything.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{ConfigLoader, LoadResult, LoadWarning};
use crate::error::{ConfigError, Severity, SilkError, ValidationIssue};

/// Per-file report for `--format json`.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    actors: usize,
    states: usize,
    contacts: usize,
    warnings: Vec<String>,
}

/// Validate configuration files.
///
/// # Errors
///
/// Returns the first file's load or validation error, or a
/// [`ConfigError::ValidationError`] listing the warnings when `--strict`
/// is set and any file produced one.
pub fn run(args: &ValidateArgs) -> Result<(), SilkError> {
    let loader = ConfigLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        let result = loader.load(path)?;

        for warning in &result.warnings {
            tracing::warn!(
                location = warning.location.as_deref().unwrap_or("<unknown>"),
                "{}",
                warning.message
            );
        }
        if args.strict && !result.warnings.is_empty() {
            return Err(strict_failure(path, &result.warnings).into());
        }

        tracing::info!(file = %path.display(), "configuration valid");
        reports.push(report(path, &result));
    }

    match args.format {
        OutputFormat::Human => {
            for r in &reports {
                println!(
                    "{}: ok ({} actors, {} states, {} contacts, {} warnings)",
                    r.file,
                    r.actors,
                    r.states,
                    r.contacts,
                    r.warnings.len()
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(())
}

fn report(path: &Path, result: &LoadResult) -> FileReport {
    let config = &result.config;
    FileReport {
        file: path.display().to_string(),
        actors: config.actors.len(),
        states: config.actors.iter().map(|a| a.states.len()).sum(),
        contacts: config.contacts.len(),
        warnings: result.warnings.iter().map(ToString::to_string).collect(),
    }
}

fn strict_failure(path: &Path, warnings: &[LoadWarning]) -> ConfigError {
    ConfigError::ValidationError {
        path: path.display().to_string(),
        errors: warnings
            .iter()
            .map(|w| ValidationIssue {
                path: w.location.clone().unwrap_or_default(),
                message: w.message.clone(),
                severity: Severity::Warning,
            })
            .collect(),
    }
}
