//! Error types for `silkcore`
//!
//! Configuration problems are surfaced to whoever loads an actor setup;
//! everything that happens at runtime between actors (rejected contacts,
//! duplicate buff removal) is a no-op and never reaches this hierarchy.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `silkcore` CLI operations.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// State machine construction or transition error
    pub const FSM_ERROR: i32 = 5;

    /// Simulation API misuse (unknown actor, missing component)
    pub const SIM_ERROR: i32 = 6;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `silkcore` operations.
#[derive(Debug, Error)]
pub enum SilkError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// State machine error
    #[error(transparent)]
    Fsm(#[from] FsmError),

    /// Simulation error
    #[error(transparent)]
    Sim(#[from] SimError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SilkError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Fsm(_) => ExitCode::FSM_ERROR,
            Self::Sim(_) => ExitCode::SIM_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in configuration is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the configuration where it was referenced
        location: String,
    },

    /// A validated configuration could not be turned into a runtime actor
    #[error("actor '{actor}' could not be built: {source}")]
    ActorSetup {
        /// Name of the actor being built
        actor: String,
        /// Underlying state machine error
        #[source]
        source: FsmError,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    match issues {
        [] => "no issues recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "actors[0].states[2].triggers[1].to")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// State Machine Errors
// ============================================================================

/// Errors raised while assembling or driving a [`crate::fsm::StateMachine`].
///
/// All of these are programmer or authoring mistakes; none of them are
/// produced by normal gameplay.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError {
    /// A transition, the initial state, or a runtime request named a state
    /// that was never registered
    #[error("unknown state '{state}' referenced by {location}")]
    UnknownState {
        /// The state key as rendered by `Display`
        state: String,
        /// Where the reference came from
        location: String,
    },

    /// The same state key was registered twice
    #[error("state '{0}' registered more than once")]
    DuplicateState(String),

    /// A random transition was built with no candidate targets
    #[error("random transition out of {location} has no candidate states")]
    NoCandidates {
        /// Where the transition was declared
        location: String,
    },

    /// The machine has no states at all
    #[error("state machine has no states")]
    Empty,
}

// ============================================================================
// Simulation Errors
// ============================================================================

/// Errors raised by the host-facing [`crate::sim::World`] API.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// The actor handle does not refer to a live actor
    #[error("unknown actor {0}")]
    UnknownActor(String),

    /// The actor lacks a component the operation requires
    #[error("actor {actor} has no {component} component")]
    MissingComponent {
        /// Actor handle rendered for display
        actor: String,
        /// Missing component name
        component: &'static str,
    },

    /// An FSM error surfaced through the simulation API
    #[error(transparent)]
    Fsm(#[from] FsmError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_variant() {
        let config = SilkError::Config(ConfigError::MissingFile {
            path: PathBuf::from("actors.yaml"),
        });
        assert_eq!(config.exit_code(), ExitCode::CONFIG_ERROR);

        let fsm = SilkError::Fsm(FsmError::Empty);
        assert_eq!(fsm.exit_code(), ExitCode::FSM_ERROR);

        let sim = SilkError::Sim(SimError::UnknownActor("#9".into()));
        assert_eq!(sim.exit_code(), ExitCode::SIM_ERROR);

        let io = SilkError::Io(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "actors[0].initial_state".into(),
            message: "Unknown state 'idel'".into(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: Unknown state 'idel' at actors[0].initial_state"
        );
    }

    #[test]
    fn test_validation_error_summarizes_first_issue() {
        let issue = |m: &str| ValidationIssue {
            path: "actors".into(),
            message: m.into(),
            severity: Severity::Error,
        };
        let err = ConfigError::ValidationError {
            path: "boss.yaml".into(),
            errors: vec![issue("first"), issue("second"), issue("third")],
        };
        let text = err.to_string();
        assert!(text.contains("first"));
        assert!(text.contains("2 more"));
    }

    #[test]
    fn test_unknown_state_message() {
        let err = FsmError::UnknownState {
            state: "jump".into(),
            location: "transition out of 'idle'".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown state 'jump' referenced by transition out of 'idle'"
        );
    }
}
