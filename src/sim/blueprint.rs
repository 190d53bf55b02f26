//! Builds runtime actors from configuration.
//!
//! Loading validates references and ranges up front, so the conversions
//! here only fail on configurations that skipped the [`crate::config::Validator`].

use crate::combat::{Damageable, Damager};
use crate::config::{
    ActionConfig, ActorConfig, DamageableConfig, DamagerConfig, DurationSpec, StateConfig,
    TransitionConfig, TriggerConfig,
};
use crate::error::ConfigError;
use crate::fsm::trigger::{
    AllOf, Always, AnyOf, ExitTime, FlagIs, HpBelow, IsDead, MarkLayersAtLeast, Never, Not, OnHit,
};
use crate::fsm::{
    ActorStatus, ScriptedState, StateAction, StateMachine, StateName, Target, Transition, Trigger,
};

use super::ActorSetup;

/// Builds the spawnable setup for one configured actor.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for malformed durations or
/// transition targets and [`ConfigError::ActorSetup`] when the state
/// machine cannot be assembled.
pub fn build_actor(config: &ActorConfig) -> Result<ActorSetup, ConfigError> {
    let machine = build_machine(config)?;
    let mut setup = ActorSetup::new(config.name.clone(), machine).with_status(build_status(config));

    if let Some(damageable) = &config.damageable {
        setup = setup.with_damageable(build_damageable(config, damageable)?);
    }
    if let Some(damager) = &config.damager {
        setup = setup.with_damager(build_damager(config, damager));
    }
    Ok(setup)
}

fn build_machine(config: &ActorConfig) -> Result<StateMachine<StateName>, ConfigError> {
    let mut builder = StateMachine::builder(StateName::new(&config.initial_state));

    for state in &config.states {
        let key = StateName::new(&state.name);
        builder = builder.state(key.clone(), build_state(state)?);
        for transition in &state.transitions {
            builder = builder.transition(key.clone(), build_transition(transition)?);
        }
    }
    for transition in &config.any_state {
        builder = builder.any_transition(build_transition(transition)?);
    }

    builder.build().map_err(|source| ConfigError::ActorSetup {
        actor: config.name.clone(),
        source,
    })
}

fn build_state(state: &StateConfig) -> Result<ScriptedState, ConfigError> {
    Ok(ScriptedState {
        enter: state
            .on_enter
            .iter()
            .map(build_action)
            .collect::<Result<_, _>>()?,
        exit: state
            .on_exit
            .iter()
            .map(build_action)
            .collect::<Result<_, _>>()?,
        velocity: state.velocity,
    })
}

fn build_status(config: &ActorConfig) -> ActorStatus {
    let mut status = ActorStatus::new(config.soul.max);
    status.gain_soul(config.soul.initial);
    status.facing = config.facing;
    for (name, value) in &config.flags {
        status.set_flag(name.clone(), *value);
    }
    for (property, amount) in &config.modifiers {
        status.modifiers.add(*property, *amount);
    }
    status
}

fn build_damageable(
    actor: &ActorConfig,
    config: &DamageableConfig,
) -> Result<Damageable, ConfigError> {
    let mut damageable = Damageable::new(config.max_hp, actor.faction);
    if let Some(hp) = config.current_hp {
        damageable = damageable.with_current_hp(hp);
    }
    if let Some(spec) = &config.hurt_invulnerability {
        let secs = seconds(spec, "damageable.hurt_invulnerability")?;
        damageable = damageable.with_hurt_invulnerability(secs);
    }
    Ok(damageable)
}

fn build_damager(actor: &ActorConfig, config: &DamagerConfig) -> Damager {
    let mut damager = Damager::new(config.damage, actor.faction)
        .with_model(config.model)
        .with_mode(config.mode)
        .ignoring_invincibility(config.ignore_invincibility);
    damager.can_damage = config.enabled;
    damager.disable_after_hit = config.disable_after_hit;
    damager.soul_per_hit = config.soul_per_hit;
    damager.marks_on_hit = config.marks_on_hit;
    damager
}

fn build_transition(config: &TransitionConfig) -> Result<Transition<StateName>, ConfigError> {
    let target = match (&config.to, &config.to_any) {
        (Some(to), None) => Target::Fixed(StateName::new(to)),
        (None, Some(candidates)) => {
            Target::Random(candidates.iter().map(StateName::new).collect())
        }
        (to, to_any) => {
            return Err(ConfigError::InvalidValue {
                field: "transition target".to_string(),
                value: format!("to: {to:?}, to_any: {to_any:?}"),
                expected: "exactly one of 'to' and 'to_any'".to_string(),
            });
        }
    };
    Ok(Transition::new(target, build_trigger(&config.when)?).on(config.cadence))
}

/// Builds a runtime trigger from its configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for an unparseable `exit_time`.
pub fn build_trigger(config: &TriggerConfig) -> Result<Box<dyn Trigger>, ConfigError> {
    let trigger: Box<dyn Trigger> = match config {
        TriggerConfig::Always => Box::new(Always),
        TriggerConfig::Never => Box::new(Never),
        TriggerConfig::ExitTime { after } => Box::new(ExitTime {
            after: seconds(after, "exit_time.after")?,
        }),
        TriggerConfig::OnHit => Box::new(OnHit::default()),
        TriggerConfig::HpBelow { fraction } => Box::new(HpBelow {
            fraction: *fraction,
        }),
        TriggerConfig::IsDead => Box::new(IsDead),
        TriggerConfig::Flag { name, value } => Box::new(FlagIs {
            name: name.clone(),
            value: *value,
        }),
        TriggerConfig::MarkLayers { layers } => Box::new(MarkLayersAtLeast { layers: *layers }),
        TriggerConfig::All { of } => Box::new(AllOf(build_triggers(of)?)),
        TriggerConfig::Any { of } => Box::new(AnyOf(build_triggers(of)?)),
        TriggerConfig::Not { of } => Box::new(Not(build_trigger(of)?)),
    };
    Ok(trigger)
}

fn build_triggers(configs: &[TriggerConfig]) -> Result<Vec<Box<dyn Trigger>>, ConfigError> {
    configs.iter().map(build_trigger).collect()
}

fn build_action(config: &ActionConfig) -> Result<StateAction, ConfigError> {
    Ok(match config {
        ActionConfig::Face { facing } => StateAction::Face(*facing),
        ActionConfig::TurnAround => StateAction::TurnAround,
        ActionConfig::SetFlag { name, value } => StateAction::SetFlag {
            name: name.clone(),
            value: *value,
        },
        ActionConfig::EnableDamage => StateAction::EnableDamage,
        ActionConfig::DisableDamage => StateAction::DisableDamage,
        ActionConfig::Invulnerable { duration } => StateAction::Invulnerable {
            seconds: seconds(duration, "invulnerable.duration")?,
        },
        ActionConfig::SpeedUp {
            multiplier,
            duration,
        } => StateAction::SpeedUp {
            multiplier: *multiplier,
            seconds: seconds(duration, "speed_up.duration")?,
        },
        ActionConfig::SoulStatus {
            soul_bonus,
            duration,
        } => StateAction::SoulStatus {
            soul_bonus: *soul_bonus,
            seconds: seconds(duration, "soul_status.duration")?,
        },
        ActionConfig::AddMark { layers } => StateAction::AddMark { layers: *layers },
        ActionConfig::ClearBuff { buff } => StateAction::ClearBuff(*buff),
        ActionConfig::Heal { amount } => StateAction::Heal(*amount),
        ActionConfig::SpendSoul { amount } => StateAction::SpendSoul(*amount),
    })
}

pub(crate) fn seconds(spec: &DurationSpec, field: &str) -> Result<f32, ConfigError> {
    spec.seconds().map_err(|expected| ConfigError::InvalidValue {
        field: field.to_string(),
        value: spec.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{ContactMode, DamageModel, Faction};
    use crate::config::SimulationConfig;

    fn actor(yaml: &str) -> ActorConfig {
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        config.actors.into_iter().next().unwrap()
    }

    const HORNET: &str = r"
actors:
  - name: hornet
    faction: enemy
    initial_state: idle
    soul: { max: 9, initial: 20 }
    modifiers: { attack: 2 }
    flags: { grounded: true }
    damageable:
      max_hp: 30
      current_hp: 12
      hurt_invulnerability: 300ms
    damager:
      damage: 4
      mode: continuous
      model: { type: percent_of_max, fraction: 0.1 }
      soul_per_hit: 3
    states:
      - name: idle
        transitions:
          - when: { type: exit_time, after: 1s }
            to_any: [dash, throw]
      - name: dash
        velocity: [8.0, 0.0]
        on_enter:
          - { action: speed_up, multiplier: 1.5, duration: 2 }
      - name: throw
    any_state:
      - when: { type: is_dead }
        to: idle
";

    #[test]
    fn test_build_actor_components() {
        let setup = build_actor(&actor(HORNET)).unwrap();
        assert_eq!(setup.name, "hornet");
        assert_eq!(setup.status.soul, 9);
        assert!(setup.status.flag("grounded"));
        assert_eq!(setup.status.modifiers.whole(crate::buff::StatProperty::Attack), 2);

        let damageable = setup.damageable.as_ref().unwrap();
        assert_eq!(damageable.current_hp(), 12);
        assert_eq!(damageable.faction(), Faction::Enemy);
        assert!(damageable.hurt_invulnerability().is_some());

        let damager = setup.damager.as_ref().unwrap();
        assert_eq!(damager.mode, ContactMode::Continuous);
        assert_eq!(damager.model, DamageModel::PercentOfMax { fraction: 0.1 });
        assert_eq!(damager.soul_per_hit, 3);
        assert!(damager.can_damage);
    }

    #[test]
    fn test_build_machine_states() {
        let setup = build_actor(&actor(HORNET)).unwrap();
        let states: Vec<&str> = setup.machine.states().map(StateName::as_str).collect();
        assert_eq!(states, vec!["idle", "dash", "throw"]);
        assert_eq!(setup.machine.initial().as_str(), "idle");
    }

    #[test]
    fn test_build_rejects_unknown_target() {
        let yaml = HORNET.replace("to: idle", "to: nowhere");
        match build_actor(&actor(&yaml)) {
            Err(ConfigError::ActorSetup { actor, .. }) => assert_eq!(actor, "hornet"),
            other => panic!("Expected ActorSetup error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_trigger_rejects_bad_duration() {
        let trigger = TriggerConfig::ExitTime {
            after: DurationSpec::Text("later".into()),
        };
        assert!(matches!(
            build_trigger(&trigger),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
