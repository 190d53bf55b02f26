//! Configuration validation.
//!
//! Runs on the fully deserialized [`SimulationConfig`] and checks what serde
//! cannot: references between actors and states, value ranges, durations,
//! and limits.
//!
//! Validation collects ALL errors (doesn't stop at first) to provide
//! comprehensive feedback to users.

use crate::config::loader::ConfigLimits;
use crate::config::schema::{
    ActionConfig, ActorConfig, DamagerConfig, DurationSpec, ScriptedContact, SimulationConfig,
    StateConfig, TransitionConfig, TriggerConfig,
};
use crate::combat::DamageModel;
use crate::error::{Severity, ValidationIssue};

use std::collections::HashSet;

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns the result.
    ///
    /// This method collects all errors and warnings rather than stopping
    /// at the first issue.
    pub fn validate(
        &mut self,
        config: &SimulationConfig,
        limits: &ConfigLimits,
    ) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_settings(config);

        if config.actors.is_empty() {
            self.add_error("actors", "At least one actor is required");
        }

        let mut names = HashSet::new();
        for (i, actor) in config.actors.iter().enumerate() {
            let path = format!("actors[{i}]");
            if !actor.name.is_empty() && !names.insert(actor.name.as_str()) {
                self.add_error(
                    &format!("{path}.name"),
                    &format!("Duplicate actor name '{}'", actor.name),
                );
            }
            self.validate_actor(actor, &path, limits);
        }

        for (i, contact) in config.contacts.iter().enumerate() {
            self.validate_contact(config, contact, &format!("contacts[{i}]"));
        }

        self.validate_limits(config, limits);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    fn validate_settings(&mut self, config: &SimulationConfig) {
        let settings = &config.simulation;
        for (field, spec) in [
            ("simulation.fixed_dt", &settings.fixed_dt),
            ("simulation.frame_dt", &settings.frame_dt),
        ] {
            if let Some(secs) = self.validate_duration(spec, field) {
                if secs <= 0.0 {
                    self.add_error(field, "Timestep must be greater than zero");
                }
            }
        }

        if settings.ticks == 0 {
            self.add_warning("simulation.ticks", "Run length is zero; nothing will happen");
        }
    }

    // ========================================================================
    // Actors
    // ========================================================================

    fn validate_actor(&mut self, actor: &ActorConfig, path: &str, limits: &ConfigLimits) {
        if actor.name.is_empty() {
            self.add_error(&format!("{path}.name"), "Actor name is required and cannot be empty");
        }

        if actor.states.is_empty() {
            self.add_error(&format!("{path}.states"), "Actor must define at least one state");
        }
        if actor.states.len() > limits.max_states_per_actor {
            self.add_error(
                &format!("{path}.states"),
                &format!(
                    "Too many states: {} (maximum: {}). \
                     Set SILKCORE_MAX_STATES to increase the limit.",
                    actor.states.len(),
                    limits.max_states_per_actor
                ),
            );
        }

        let mut state_names = HashSet::new();
        for (i, state) in actor.states.iter().enumerate() {
            if state.name.is_empty() {
                self.add_error(
                    &format!("{path}.states[{i}].name"),
                    "State name is required and cannot be empty",
                );
            } else if !state_names.insert(state.name.as_str()) {
                self.add_error(
                    &format!("{path}.states[{i}].name"),
                    &format!("Duplicate state name '{}'", state.name),
                );
            }
        }

        self.check_state_ref(actor, &actor.initial_state, &format!("{path}.initial_state"));

        if let Some(damageable) = &actor.damageable {
            let dpath = format!("{path}.damageable");
            if damageable.max_hp == 0 {
                self.add_error(&format!("{dpath}.max_hp"), "max_hp must be greater than zero");
            }
            if damageable.current_hp.is_some_and(|hp| hp > damageable.max_hp) {
                self.add_error(
                    &format!("{dpath}.current_hp"),
                    &format!("current_hp cannot exceed max_hp ({})", damageable.max_hp),
                );
            }
            if let Some(spec) = &damageable.hurt_invulnerability {
                self.validate_duration(spec, &format!("{dpath}.hurt_invulnerability"));
            }
        }

        if let Some(damager) = &actor.damager {
            self.validate_damager(damager, &format!("{path}.damager"));
        }

        if actor.soul.initial > actor.soul.max {
            self.add_warning(
                &format!("{path}.soul.initial"),
                &format!("Initial soul is clamped to max ({})", actor.soul.max),
            );
        }

        for (property, amount) in &actor.modifiers {
            if !amount.is_finite() || *amount < 0.0 {
                self.add_error(
                    &format!("{path}.modifiers.{property}"),
                    "Modifier must be a finite, non-negative number",
                );
            }
        }

        for (i, state) in actor.states.iter().enumerate() {
            self.validate_state(actor, state, &format!("{path}.states[{i}]"), limits);
        }
        for (i, transition) in actor.any_state.iter().enumerate() {
            self.validate_transition(actor, transition, &format!("{path}.any_state[{i}]"), limits);
        }

        self.warn_unreachable(actor, path);
    }

    fn validate_damager(&mut self, damager: &DamagerConfig, path: &str) {
        match damager.model {
            DamageModel::Flat => {}
            DamageModel::PercentOfMax { fraction } => {
                if !(fraction > 0.0 && fraction <= 1.0) {
                    self.add_error(
                        &format!("{path}.model.fraction"),
                        &format!("Fraction must be in (0, 1], got {fraction}"),
                    );
                }
            }
            DamageModel::Ramping { max, .. } => {
                if max < damager.damage {
                    self.add_error(
                        &format!("{path}.model.max"),
                        &format!("Ramping max ({max}) is below base damage ({})", damager.damage),
                    );
                }
            }
        }
        if damager.damage == 0 && damager.marks_on_hit == 0 {
            self.add_warning(
                &format!("{path}.damage"),
                "Damager deals no damage and applies no marks",
            );
        }
    }

    fn validate_state(
        &mut self,
        actor: &ActorConfig,
        state: &StateConfig,
        path: &str,
        limits: &ConfigLimits,
    ) {
        for (hook, actions) in [("on_enter", &state.on_enter), ("on_exit", &state.on_exit)] {
            for (i, action) in actions.iter().enumerate() {
                self.validate_action(actor, action, &format!("{path}.{hook}[{i}]"));
            }
        }

        if let Some(velocity) = state.velocity {
            if velocity.iter().any(|v| !v.is_finite()) {
                self.add_error(&format!("{path}.velocity"), "Velocity must be finite");
            }
        }

        for (i, transition) in state.transitions.iter().enumerate() {
            self.validate_transition(actor, transition, &format!("{path}.transitions[{i}]"), limits);
        }
    }

    fn validate_action(&mut self, actor: &ActorConfig, action: &ActionConfig, path: &str) {
        match action {
            ActionConfig::Invulnerable { duration } | ActionConfig::SoulStatus { duration, .. } => {
                self.validate_duration(duration, &format!("{path}.duration"));
            }
            ActionConfig::SpeedUp {
                multiplier,
                duration,
            } => {
                if !multiplier.is_finite() || *multiplier <= 0.0 {
                    self.add_error(
                        &format!("{path}.multiplier"),
                        &format!("Multiplier must be greater than zero, got {multiplier}"),
                    );
                }
                self.validate_duration(duration, &format!("{path}.duration"));
            }
            ActionConfig::SetFlag { name, .. } if name.is_empty() => {
                self.add_error(&format!("{path}.name"), "Flag name cannot be empty");
            }
            ActionConfig::AddMark { layers: 0 } => {
                self.add_warning(&format!("{path}.layers"), "Adding zero layers has no effect");
            }
            _ => {}
        }

        let needs_damageable = matches!(
            action,
            ActionConfig::Invulnerable { .. }
                | ActionConfig::SpeedUp { .. }
                | ActionConfig::SoulStatus { .. }
                | ActionConfig::AddMark { .. }
                | ActionConfig::ClearBuff { .. }
                | ActionConfig::Heal { .. }
        );
        if needs_damageable && actor.damageable.is_none() {
            self.add_warning(
                path,
                &format!(
                    "Action '{}' has no effect on an actor without a damageable",
                    action.name()
                ),
            );
        }
        let needs_damager = matches!(
            action,
            ActionConfig::EnableDamage | ActionConfig::DisableDamage
        );
        if needs_damager && actor.damager.is_none() {
            self.add_warning(
                path,
                &format!(
                    "Action '{}' has no effect on an actor without a damager",
                    action.name()
                ),
            );
        }
    }

    fn validate_transition(
        &mut self,
        actor: &ActorConfig,
        transition: &TransitionConfig,
        path: &str,
        limits: &ConfigLimits,
    ) {
        match (&transition.to, &transition.to_any) {
            (Some(to), None) => self.check_state_ref(actor, to, &format!("{path}.to")),
            (None, Some(candidates)) => {
                if candidates.is_empty() {
                    self.add_error(
                        &format!("{path}.to_any"),
                        "Random target needs at least one candidate",
                    );
                }
                for (i, candidate) in candidates.iter().enumerate() {
                    self.check_state_ref(actor, candidate, &format!("{path}.to_any[{i}]"));
                }
            }
            (Some(_), Some(_)) => {
                self.add_error(path, "Transition cannot set both 'to' and 'to_any'");
            }
            (None, None) => {
                self.add_error(path, "Transition requires 'to' or 'to_any'");
            }
        }

        let depth = transition.when.depth();
        if depth > limits.max_trigger_depth {
            self.add_error(
                &format!("{path}.when"),
                &format!(
                    "Trigger nesting too deep: {depth} (maximum: {}). \
                     Set SILKCORE_MAX_TRIGGER_DEPTH to increase the limit.",
                    limits.max_trigger_depth
                ),
            );
        }
        self.validate_trigger(&transition.when, &format!("{path}.when"));

        if transition.when.needs_damageable() && actor.damageable.is_none() {
            self.add_warning(
                &format!("{path}.when"),
                "Condition reads the damageable but the actor has none; it never fires",
            );
        }
    }

    fn validate_trigger(&mut self, trigger: &TriggerConfig, path: &str) {
        match trigger {
            TriggerConfig::ExitTime { after } => {
                self.validate_duration(after, &format!("{path}.after"));
            }
            TriggerConfig::HpBelow { fraction } => {
                if !(*fraction > 0.0 && *fraction <= 1.0) {
                    self.add_error(
                        &format!("{path}.fraction"),
                        &format!("Fraction must be in (0, 1], got {fraction}"),
                    );
                }
            }
            TriggerConfig::Flag { name, .. } => {
                if name.is_empty() {
                    self.add_error(&format!("{path}.name"), "Flag name cannot be empty");
                }
            }
            TriggerConfig::MarkLayers { layers } => {
                if *layers == 0 {
                    self.add_warning(
                        &format!("{path}.layers"),
                        "A zero-layer threshold always holds; use 'always' instead",
                    );
                }
            }
            TriggerConfig::All { of } | TriggerConfig::Any { of } => {
                if of.is_empty() {
                    self.add_error(&format!("{path}.of"), "Composite condition cannot be empty");
                }
                for (i, inner) in of.iter().enumerate() {
                    self.validate_trigger(inner, &format!("{path}.of[{i}]"));
                }
            }
            TriggerConfig::Not { of } => self.validate_trigger(of, &format!("{path}.of")),
            TriggerConfig::Always
            | TriggerConfig::Never
            | TriggerConfig::OnHit
            | TriggerConfig::IsDead => {}
        }
    }

    fn warn_unreachable(&mut self, actor: &ActorConfig, path: &str) {
        let mut targeted: HashSet<&str> = HashSet::new();
        targeted.insert(actor.initial_state.as_str());
        let transitions = actor
            .states
            .iter()
            .flat_map(|s| s.transitions.iter())
            .chain(actor.any_state.iter());
        for transition in transitions {
            targeted.extend(transition.to.iter().map(String::as_str));
            targeted.extend(transition.to_any.iter().flatten().map(String::as_str));
        }
        for (i, state) in actor.states.iter().enumerate() {
            if !state.name.is_empty() && !targeted.contains(state.name.as_str()) {
                self.add_warning(
                    &format!("{path}.states[{i}]"),
                    &format!("State '{}' is never entered", state.name),
                );
            }
        }
    }

    // ========================================================================
    // Contacts
    // ========================================================================

    fn validate_contact(
        &mut self,
        config: &SimulationConfig,
        contact: &ScriptedContact,
        path: &str,
    ) {
        let names: Vec<&str> = config.actors.iter().map(|a| a.name.as_str()).collect();

        match config.actor(&contact.damager) {
            Some(actor) if actor.damager.is_none() => {
                self.add_error(
                    &format!("{path}.damager"),
                    &format!("Actor '{}' has no damager", contact.damager),
                );
            }
            Some(_) => {}
            None => self.add_unknown(
                &format!("{path}.damager"),
                "actor",
                &contact.damager,
                &names,
            ),
        }

        match config.actor(&contact.target) {
            Some(actor) if actor.damageable.is_none() => {
                self.add_warning(
                    &format!("{path}.target"),
                    &format!(
                        "Actor '{}' has no damageable; this contact is always rejected",
                        contact.target
                    ),
                );
            }
            Some(_) => {}
            None => self.add_unknown(&format!("{path}.target"), "actor", &contact.target, &names),
        }

        if contact.damager == contact.target {
            self.add_error(path, "An actor cannot contact itself");
        }
        if contact.until.is_some_and(|until| until < contact.tick) {
            self.add_error(
                &format!("{path}.until"),
                &format!("'until' must not be before 'tick' ({})", contact.tick),
            );
        }
        if contact.tick >= config.simulation.ticks {
            self.add_warning(
                &format!("{path}.tick"),
                &format!(
                    "Contact at step {} is past the end of the run ({} steps)",
                    contact.tick, config.simulation.ticks
                ),
            );
        }
    }

    // ========================================================================
    // Shared checks
    // ========================================================================

    fn check_state_ref(&mut self, actor: &ActorConfig, name: &str, path: &str) {
        if actor.state(name).is_some() {
            return;
        }
        let names: Vec<&str> = actor.states.iter().map(|s| s.name.as_str()).collect();
        self.add_unknown(path, "state", name, &names);
    }

    fn add_unknown(&mut self, path: &str, kind: &str, name: &str, candidates: &[&str]) {
        let message = suggest(name, candidates).map_or_else(
            || format!("Unknown {kind} '{name}'"),
            |hint| format!("Unknown {kind} '{name}' (did you mean '{hint}'?)"),
        );
        self.add_error(path, &message);
    }

    /// Validates a duration, returning its value in seconds when valid.
    fn validate_duration(&mut self, spec: &DurationSpec, path: &str) -> Option<f32> {
        match spec.seconds() {
            Ok(secs) => Some(secs),
            Err(message) => {
                self.add_error(path, &message);
                None
            }
        }
    }

    /// Validates configuration limits.
    fn validate_limits(&mut self, config: &SimulationConfig, limits: &ConfigLimits) {
        if config.actors.len() > limits.max_actors {
            self.add_error(
                "actors",
                &format!(
                    "Too many actors: {} (maximum: {}). \
                     Set SILKCORE_MAX_ACTORS to increase the limit.",
                    config.actors.len(),
                    limits.max_actors
                ),
            );
        }

        if config.contacts.len() > limits.max_contacts {
            self.add_error(
                "contacts",
                &format!(
                    "Too many contacts: {} (maximum: {}). \
                     Set SILKCORE_MAX_CONTACTS to increase the limit.",
                    config.contacts.len(),
                    limits.max_contacts
                ),
            );
        }

        if config.simulation.ticks > limits.max_ticks {
            self.add_error(
                "simulation.ticks",
                &format!(
                    "Run too long: {} steps (maximum: {}). \
                     Set SILKCORE_MAX_TICKS to increase the limit.",
                    config.simulation.ticks, limits.max_ticks
                ),
            );
        }
    }

    /// Adds an error to the collection.
    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    /// Adds a warning to the collection.
    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Closest candidate within edit distance 3, if any.
#[must_use]
pub fn suggest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, strsim::damerau_levenshtein(input, c)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_limits() -> ConfigLimits {
        ConfigLimits::default()
    }

    fn parse(yaml: &str) -> SimulationConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn validate(yaml: &str) -> ValidationResult {
        Validator::new().validate(&parse(yaml), &default_limits())
    }

    const KNIGHT: &str = r"
actors:
  - name: knight
    faction: player
    initial_state: idle
    damageable:
      max_hp: 5
    states:
      - name: idle
        transitions:
          - when: { type: on_hit }
            to: hurt
      - name: hurt
        transitions:
          - when: { type: exit_time, after: 0.4 }
            to: idle
";

    #[test]
    fn test_validate_minimal_config() {
        let result = validate(KNIGHT);
        assert!(result.is_valid(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_validate_no_actors() {
        let result = validate("actors: []");
        assert!(result.has_errors());
        assert_eq!(result.errors[0].path, "actors");
    }

    #[test]
    fn test_validate_unknown_state_suggests() {
        let yaml = KNIGHT.replace("to: hurt", "to: hrut");
        let result = validate(&yaml);
        assert_eq!(result.errors.len(), 1);
        let issue = &result.errors[0];
        assert_eq!(issue.path, "actors[0].states[0].transitions[0].to");
        assert!(issue.message.contains("did you mean 'hurt'"), "{}", issue.message);
    }

    #[test]
    fn test_validate_unknown_initial_state() {
        let yaml = KNIGHT.replace("initial_state: idle", "initial_state: sleeping");
        let result = validate(&yaml);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.path == "actors[0].initial_state")
        );
    }

    #[test]
    fn test_validate_duplicate_state_names() {
        let yaml = KNIGHT.replace("- name: hurt", "- name: idle");
        let result = validate(&yaml);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("Duplicate state name 'idle'"))
        );
    }

    #[test]
    fn test_validate_transition_target_forms() {
        let yaml = r"
actors:
  - name: bug
    faction: enemy
    initial_state: a
    states:
      - name: a
        transitions:
          - when: { type: always }
          - when: { type: always }
            to: a
            to_any: [a]
          - when: { type: always }
            to_any: []
";
        let result = validate(yaml);
        assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    }

    #[test]
    fn test_validate_invalid_duration() {
        let yaml = KNIGHT.replace("after: 0.4", "after: soonish");
        let result = validate(&yaml);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.path.ends_with(".when.after"))
        );
    }

    #[test]
    fn test_validate_hp_without_damageable_warns() {
        let yaml = r"
actors:
  - name: turret
    faction: enemy
    initial_state: on
    states:
      - name: on
        transitions:
          - when: { type: hp_below, fraction: 0.5 }
            to: on
";
        let result = validate(yaml);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_validate_nested_on_hit_without_damageable_warns() {
        let yaml = r"
actors:
  - name: turret
    faction: enemy
    initial_state: on
    states:
      - name: on
        transitions:
          - when:
              type: any
              of:
                - type: not
                  of: { type: on_hit }
                - { type: flag, name: armed }
            to: on
";
        let result = validate(yaml);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 1, "{:?}", result.warnings);
        assert_eq!(result.warnings[0].path, "actors[0].states[0].transitions[0].when");
    }

    #[test]
    fn test_validate_unreachable_state_warns() {
        let yaml = KNIGHT.replace("to: hurt", "to: idle");
        let result = validate(&yaml);
        assert!(result.is_valid());
        assert!(
            result
                .warnings
                .iter()
                .any(|w| w.message.contains("'hurt' is never entered"))
        );
    }

    #[test]
    fn test_validate_contacts() {
        let yaml = format!(
            "{KNIGHT}
  - name: spikes
    faction: neutral
    initial_state: armed
    damager:
      damage: 1
    states:
      - name: armed
contacts:
  - tick: 2
    damager: spikes
    target: knihgt
  - tick: 4
    damager: knight
    target: spikes
  - tick: 9
    until: 3
    damager: spikes
    target: knight
"
        );
        let result = validate(&yaml);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"contacts[0].target"), "{paths:?}");
        assert!(paths.contains(&"contacts[1].damager"), "{paths:?}");
        assert!(paths.contains(&"contacts[2].until"), "{paths:?}");
        assert!(
            result.errors[0].message.contains("did you mean 'knight'"),
            "{}",
            result.errors[0].message
        );
    }

    #[test]
    fn test_validate_damager_model_ranges() {
        let yaml = r"
actors:
  - name: saw
    faction: neutral
    initial_state: spin
    damager:
      damage: 5
      model: { type: ramping, step: 1, max: 2 }
    states:
      - name: spin
";
        let result = validate(yaml);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.path == "actors[0].damager.model.max")
        );
    }

    #[test]
    fn test_validate_trigger_depth_limit() {
        let yaml = KNIGHT.replace(
            "{ type: on_hit }",
            "{ type: not, of: { type: not, of: { type: on_hit } } }",
        );
        let limits = ConfigLimits {
            max_trigger_depth: 2,
            ..ConfigLimits::default()
        };
        let result = Validator::new().validate(&parse(&yaml), &limits);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.message.contains("SILKCORE_MAX_TRIGGER_DEPTH"))
        );
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let yaml = r"
actors:
  - name: ''
    faction: enemy
    initial_state: missing
    damageable:
      max_hp: 0
    states: []
";
        let result = validate(yaml);
        assert!(result.errors.len() >= 4, "{:?}", result.errors);
    }

    #[test]
    fn test_suggest_close_and_far() {
        let names = ["idle", "dash_attack", "hurt"];
        assert_eq!(suggest("dash_atack", &names), Some("dash_attack"));
        assert_eq!(suggest("xyzabc123", &names), None);
    }
}
