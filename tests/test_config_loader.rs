mod common;

use std::io::Write;

use silkcore::config::{ConfigLimits, ConfigLoader, LoaderOptions, TriggerConfig};
use silkcore::error::ConfigError;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(content.as_bytes()).unwrap();
    file
}

const MINIMAL: &str = r"
simulation:
  ticks: ${SILKCORE_TEST_NEVER_SET_TICKS:-12}
actors:
  - name: knight
    faction: player
    initial_state: idle
    damageable:
      max_hp: 5
    states:
      - name: idle
";

#[test]
fn env_default_applies_when_unset() {
    let file = write_temp(MINIMAL);
    let loaded = ConfigLoader::with_defaults().load(file.path()).unwrap();
    assert_eq!(loaded.config.simulation.ticks, 12);
    assert!(loaded.warnings.is_empty());
}

#[test]
fn required_env_var_reports_message() {
    let yaml = MINIMAL.replace(
        "${SILKCORE_TEST_NEVER_SET_TICKS:-12}",
        "${SILKCORE_TEST_NEVER_SET_TICKS:?set the run length}",
    );
    let file = write_temp(&yaml);
    match ConfigLoader::with_defaults().load(file.path()) {
        Err(ConfigError::EnvVarNotSet { var, location }) => {
            assert_eq!(var, "SILKCORE_TEST_NEVER_SET_TICKS");
            assert_eq!(location, "set the run length");
        }
        other => panic!("expected EnvVarNotSet, got {other:?}"),
    }
}

#[test]
fn limits_are_enforced_with_hint() {
    let options = LoaderOptions {
        config_limits: ConfigLimits {
            max_ticks: 5,
            ..ConfigLimits::default()
        },
    };
    let file = write_temp(MINIMAL);
    match ConfigLoader::new(options).load(file.path()) {
        Err(ConfigError::ValidationError { errors, .. }) => {
            assert!(
                errors.iter().any(|e| e.message.contains("SILKCORE_MAX_TICKS")),
                "{errors:?}"
            );
        }
        other => panic!("expected ValidationError, got {other:?}"),
    }
}

#[test]
fn loaded_fixture_keeps_declaration_order() {
    let config = common::load_fixture("boss.yaml");
    let names: Vec<&str> = config.actors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["boss", "knight"]);

    let boss = config.actor("boss").unwrap();
    let idle = boss.state("idle").unwrap();
    assert!(matches!(
        idle.transitions[0].when,
        TriggerConfig::HpBelow { fraction } if (fraction - 0.5).abs() < f32::EPSILON
    ));
    assert_eq!(idle.transitions[0].to.as_deref(), Some("enraged"));
}

#[test]
fn contact_errors_name_the_actor() {
    let yaml = format!("{MINIMAL}contacts:\n  - {{ tick: 0, damager: knigth, target: knight }}\n");
    match ConfigLoader::with_defaults().load_from_str(&yaml) {
        Err(ConfigError::ValidationError { errors, .. }) => {
            assert!(
                errors.iter().any(|e| e.message.contains("did you mean 'knight'")),
                "{errors:?}"
            );
        }
        other => panic!("expected ValidationError, got {other:?}"),
    }
}
