//! Configuration loader.
//!
//! This module implements the configuration loading pipeline:
//! 1. Size check against [`ConfigLimits::max_config_size`]
//! 2. Environment variable expansion (pre-parse, on raw text)
//! 3. YAML parsing
//! 4. Deserialization to typed config
//! 5. Validation
//! 6. Freeze with `Arc`

use crate::config::schema::SimulationConfig;
use crate::config::validation::Validator;
use crate::error::ConfigError;

use serde_yaml::Value;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits for configuration size.
    pub config_limits: ConfigLimits,
}

/// Limits for configuration size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of actors.
    pub max_actors: usize,

    /// Maximum number of states per actor.
    pub max_states_per_actor: usize,

    /// Maximum nesting depth of trigger conditions.
    pub max_trigger_depth: usize,

    /// Maximum number of scripted contacts.
    pub max_contacts: usize,

    /// Maximum number of simulation steps.
    pub max_ticks: u64,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_actors: env_or("SILKCORE_MAX_ACTORS", 256),
            max_states_per_actor: env_or("SILKCORE_MAX_STATES", 64),
            max_trigger_depth: env_or("SILKCORE_MAX_TRIGGER_DEPTH", 8),
            max_contacts: env_or("SILKCORE_MAX_CONTACTS", 10_000),
            max_ticks: env_or("SILKCORE_MAX_TICKS", 1_000_000),
            max_config_size: env_or("SILKCORE_MAX_CONFIG_SIZE", 4 * 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<SimulationConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({location})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Configuration loader.
///
/// Handles the full loading pipeline from YAML file to frozen
/// [`SimulationConfig`].
#[derive(Debug)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - A required environment variable is unset
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size =
            usize::try_from(metadata.len()).unwrap_or(self.options.config_limits.max_config_size);
        self.check_size(file_size)?;

        let raw_content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_content(&raw_content, path)
    }

    /// Loads a configuration from an in-memory YAML string.
    ///
    /// Warnings and errors are reported against the pseudo-path `<string>`.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus file access.
    pub fn load_from_str(&self, yaml: &str) -> Result<LoadResult, ConfigError> {
        self.check_size(yaml.len())?;
        self.load_content(yaml, Path::new("<string>"))
    }

    fn check_size(&self, size: usize) -> Result<(), ConfigError> {
        let max = self.options.config_limits.max_config_size;
        if size > max {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{size} bytes"),
                expected: format!("at most {max} bytes"),
            });
        }
        Ok(())
    }

    fn load_content(&self, raw_content: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // Handle UTF-8 BOM
        let raw_content = raw_content.strip_prefix('\u{feff}').unwrap_or(raw_content);

        // Stage 1: Environment variable substitution (before YAML parsing)
        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw_content, path)?;
        warnings.extend(env_sub.warnings);

        // Stage 2: YAML parsing
        let root: Value =
            serde_yaml::from_str(&substituted).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if root.is_null() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "Configuration file is empty".to_string(),
            });
        }

        // Stage 3: Deserialize to typed config
        let config: SimulationConfig =
            serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: format!("Failed to deserialize configuration: {e}"),
            })?;

        // Stage 4: Validation
        let mut validator = Validator::new();
        let validation_result = validator.validate(&config, &self.options.config_limits);

        if validation_result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: validation_result.errors,
            });
        }

        for issue in validation_result.warnings {
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        // Stage 5: Freeze
        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw YAML text BEFORE parsing to preserve type inference, so
/// `max_hp: ${BOSS_HP:-40}` still deserializes as a number.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw YAML text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw_yaml: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw_yaml.len());
        let mut chars = raw_yaml.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                result.push(c);
                continue;
            }
            match chars.peek() {
                Some('$') => {
                    chars.next();
                    result.push('$');
                }
                Some('{') => {
                    chars.next();
                    let spec = Self::parse_var_spec(&mut chars, source_path)?;
                    match std::env::var(&spec.name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => match spec.fallback {
                            Fallback::Default(value) => result.push_str(&value),
                            Fallback::Required(message) => {
                                return Err(ConfigError::EnvVarNotSet {
                                    var: spec.name,
                                    location: message,
                                });
                            }
                            Fallback::Empty => self.warnings.push(LoadWarning {
                                message: format!(
                                    "Environment variable '{}' is not set, using empty string",
                                    spec.name
                                ),
                                location: Some(source_path.display().to_string()),
                            }),
                        },
                    }
                }
                _ => result.push(c),
            }
        }

        Ok(result)
    }

    /// Parses the inside of `${...}`, consuming the closing brace.
    fn parse_var_spec(
        chars: &mut std::iter::Peekable<std::str::Chars>,
        source_path: &Path,
    ) -> Result<VarSpec, ConfigError> {
        let mut name = String::new();

        while let Some(c) = chars.next() {
            match c {
                '}' => {
                    return Ok(VarSpec {
                        name,
                        fallback: Fallback::Empty,
                    });
                }
                ':' => match chars.peek() {
                    Some('-') => {
                        chars.next();
                        let value = Self::read_until_close(chars, source_path)?;
                        return Ok(VarSpec {
                            name,
                            fallback: Fallback::Default(value),
                        });
                    }
                    Some('?') => {
                        chars.next();
                        let message = Self::read_until_close(chars, source_path)?;
                        return Ok(VarSpec {
                            name,
                            fallback: Fallback::Required(message),
                        });
                    }
                    _ => name.push(':'),
                },
                _ => name.push(c),
            }
        }

        Err(ConfigError::ParseError {
            path: source_path.to_path_buf(),
            line: None,
            message: format!("Unclosed environment variable reference: ${{{name}"),
        })
    }

    /// Reads content until the matching `}`, handling nested braces.
    fn read_until_close(
        chars: &mut std::iter::Peekable<std::str::Chars>,
        source_path: &Path,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1;

        for c in chars.by_ref() {
            match c {
                '{' => {
                    depth += 1;
                    value.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                    value.push(c);
                }
                _ => value.push(c),
            }
        }

        Err(ConfigError::ParseError {
            path: source_path.to_path_buf(),
            line: None,
            message: "Unclosed environment variable reference".to_string(),
        })
    }
}

struct VarSpec {
    name: String,
    fallback: Fallback,
}

enum Fallback {
    Empty,
    Default(String),
    Required(String),
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
