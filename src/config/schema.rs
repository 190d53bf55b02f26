//! Configuration schema types.
//!
//! These types are deserialized from YAML actor and scenario files. They
//! describe actors declaratively; [`crate::sim::blueprint`] turns them into
//! runtime state machines and components.

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::buff::{BuffKind, StatProperty};
use crate::combat::{ContactMode, DamageModel, Faction};
use crate::fsm::{Cadence, Facing};

// ============================================================================
// Top-Level Configuration
// ============================================================================

/// Root configuration: simulation settings, actors and scripted contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationConfig {
    /// Run settings
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Actor definitions, spawned in order
    pub actors: Vec<ActorConfig>,

    /// Contacts the scenario runner reports to the world
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ScriptedContact>,
}

impl SimulationConfig {
    /// Finds an actor definition by name.
    #[must_use]
    pub fn actor(&self, name: &str) -> Option<&ActorConfig> {
        self.actors.iter().find(|a| a.name == name)
    }
}

/// Run settings for headless simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Seed for the simulation's random source
    #[serde(default)]
    pub seed: u64,

    /// Number of steps to run; each step is one fixed tick then one frame tick
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Fixed timestep
    #[serde(default = "default_fixed_dt")]
    pub fixed_dt: DurationSpec,

    /// Frame timestep
    #[serde(default = "default_frame_dt")]
    pub frame_dt: DurationSpec,

    /// Cadence on which invulnerability and buff timers count down
    #[serde(default = "default_timer_cadence")]
    pub timer_cadence: Cadence,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            ticks: default_ticks(),
            fixed_dt: default_fixed_dt(),
            frame_dt: default_frame_dt(),
            timer_cadence: default_timer_cadence(),
        }
    }
}

const fn default_ticks() -> u64 {
    300
}

const fn default_fixed_dt() -> DurationSpec {
    DurationSpec::Seconds(0.02)
}

const fn default_frame_dt() -> DurationSpec {
    DurationSpec::Seconds(1.0 / 60.0)
}

const fn default_timer_cadence() -> Cadence {
    Cadence::Fixed
}

const fn default_true() -> bool {
    true
}

const fn default_one() -> u32 {
    1
}

// ============================================================================
// Durations
// ============================================================================

/// A duration written either as seconds (`0.5`) or as a humantime string
/// (`"500ms"`, `"2s"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    /// Plain seconds
    Seconds(f64),
    /// Humantime text
    Text(String),
}

impl DurationSpec {
    /// Resolves to seconds.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem when the value is negative,
    /// not finite, or not a valid humantime string.
    #[allow(clippy::cast_possible_truncation)]
    pub fn seconds(&self) -> Result<f32, String> {
        let secs = match self {
            Self::Seconds(s) => *s,
            Self::Text(text) => humantime::parse_duration(text.trim())
                .map(|d: Duration| d.as_secs_f64())
                .map_err(|e| format!("invalid duration '{text}': {e}"))?,
        };
        if !secs.is_finite() {
            return Err(format!("duration must be finite, got {secs}"));
        }
        if secs < 0.0 {
            return Err(format!("duration must not be negative, got {secs}"));
        }
        Ok(secs as f32)
    }
}

impl std::fmt::Display for DurationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{s}s"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

// ============================================================================
// Actors
// ============================================================================

/// One actor: capabilities, shared state and its state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Unique name within the file
    pub name: String,

    /// Faction shared by the actor's damager and damageable
    pub faction: Faction,

    /// State entered on spawn
    pub initial_state: String,

    /// Damage-receiving capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damageable: Option<DamageableConfig>,

    /// Damage-dealing capability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damager: Option<DamagerConfig>,

    /// Soul meter
    #[serde(default)]
    pub soul: SoulConfig,

    /// Initial named flags
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub flags: IndexMap<String, bool>,

    /// Additive stat modifiers
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub modifiers: IndexMap<StatProperty, f32>,

    /// Initial facing
    #[serde(default)]
    pub facing: Facing,

    /// States, in authoring order
    pub states: Vec<StateConfig>,

    /// Transitions checked from every state after the state's own list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_state: Vec<TransitionConfig>,
}

impl ActorConfig {
    /// Finds a state definition by name.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&StateConfig> {
        self.states.iter().find(|s| s.name == name)
    }
}

/// Health and hurt handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageableConfig {
    /// Maximum HP
    pub max_hp: u32,

    /// Starting HP, defaults to `max_hp`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<u32>,

    /// Invulnerability opened automatically after each landed hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hurt_invulnerability: Option<DurationSpec>,
}

/// Damage source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamagerConfig {
    /// Base damage
    pub damage: u32,

    /// Magnitude model (`flat`, `percent_of_max`, `ramping`)
    #[serde(default)]
    pub model: DamageModel,

    /// One-shot or continuous
    #[serde(default)]
    pub mode: ContactMode,

    /// Land hits through invulnerability windows
    #[serde(default)]
    pub ignore_invincibility: bool,

    /// Whether the damage gate starts open
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Close the gate after the first landed hit
    #[serde(default)]
    pub disable_after_hit: bool,

    /// Soul gained by the owner per landed hit
    #[serde(default)]
    pub soul_per_hit: u32,

    /// ElectricMark layers applied to the target per landed hit
    #[serde(default)]
    pub marks_on_hit: u32,
}

/// Soul meter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SoulConfig {
    /// Capacity
    #[serde(default)]
    pub max: u32,

    /// Starting amount, clamped to `max`
    #[serde(default)]
    pub initial: u32,
}

// ============================================================================
// States and transitions
// ============================================================================

/// One state of an actor's machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State name, unique within the actor
    pub name: String,

    /// Actions run on entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_enter: Vec<ActionConfig>,

    /// Actions run on exit
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_exit: Vec<ActionConfig>,

    /// Movement intent `[x, y]` while active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity: Option<[f32; 2]>,

    /// Outgoing transitions, checked in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<TransitionConfig>,
}

/// A guarded transition.
///
/// Exactly one of `to` and `to_any` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Condition
    pub when: TriggerConfig,

    /// Fixed target state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    /// Candidates for a uniform random pick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_any: Option<Vec<String>>,

    /// Cadence this transition is checked on
    #[serde(default)]
    pub cadence: Cadence,
}

/// Trigger conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerConfig {
    /// Always fires
    Always,
    /// Never fires
    Never,
    /// Time in state reaches `after`
    ExitTime {
        /// Threshold
        after: DurationSpec,
    },
    /// A hit was taken since entering the state
    OnHit,
    /// HP fraction strictly below `fraction`
    HpBelow {
        /// Threshold in `(0, 1]`
        fraction: f32,
    },
    /// HP is zero
    IsDead,
    /// Named flag equals `value`
    Flag {
        /// Flag name
        name: String,
        /// Expected value
        #[serde(default = "default_true")]
        value: bool,
    },
    /// At least `layers` ElectricMark layers held
    MarkLayers {
        /// Threshold
        layers: u32,
    },
    /// Every inner condition holds
    All {
        /// Inner conditions
        of: Vec<TriggerConfig>,
    },
    /// Any inner condition holds
    Any {
        /// Inner conditions
        of: Vec<TriggerConfig>,
    },
    /// The inner condition does not hold
    Not {
        /// Inner condition
        of: Box<TriggerConfig>,
    },
}

impl TriggerConfig {
    /// Nesting depth; leaf conditions have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All { of } | Self::Any { of } => {
                1 + of.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not { of } => 1 + of.depth(),
            _ => 1,
        }
    }

    /// Whether this condition (or any inner one) reads the damageable.
    ///
    /// `on_hit` counts: only a damageable can take the hits it waits for.
    #[must_use]
    pub fn needs_damageable(&self) -> bool {
        match self {
            Self::HpBelow { .. } | Self::IsDead | Self::MarkLayers { .. } | Self::OnHit => true,
            Self::All { of } | Self::Any { of } => of.iter().any(Self::needs_damageable),
            Self::Not { of } => of.needs_damageable(),
            Self::Always | Self::Never | Self::ExitTime { .. } | Self::Flag { .. } => false,
        }
    }
}

/// State hook actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionConfig {
    /// Face a direction
    Face {
        /// Direction
        facing: Facing,
    },
    /// Flip facing
    TurnAround,
    /// Set a named flag
    SetFlag {
        /// Flag name
        name: String,
        /// New value
        #[serde(default = "default_true")]
        value: bool,
    },
    /// Open (and re-arm) the damager gate
    EnableDamage,
    /// Close the damager gate
    DisableDamage,
    /// Open an invulnerability window
    Invulnerable {
        /// Window length
        duration: DurationSpec,
    },
    /// Apply or refresh SpeedUp
    SpeedUp {
        /// Movement multiplier
        multiplier: f32,
        /// Duration
        duration: DurationSpec,
    },
    /// Apply or refresh SoulStatus
    SoulStatus {
        /// Extra soul per landed hit
        soul_bonus: u32,
        /// Duration
        duration: DurationSpec,
    },
    /// Add ElectricMark layers to self
    AddMark {
        /// Layers
        #[serde(default = "default_one")]
        layers: u32,
    },
    /// Remove a buff
    ClearBuff {
        /// Which buff
        buff: BuffKind,
    },
    /// Restore HP
    Heal {
        /// Amount
        amount: u32,
    },
    /// Spend soul
    SpendSoul {
        /// Amount
        amount: u32,
    },
}

impl ActionConfig {
    /// Action name as written in YAML.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Face { .. } => "face",
            Self::TurnAround => "turn_around",
            Self::SetFlag { .. } => "set_flag",
            Self::EnableDamage => "enable_damage",
            Self::DisableDamage => "disable_damage",
            Self::Invulnerable { .. } => "invulnerable",
            Self::SpeedUp { .. } => "speed_up",
            Self::SoulStatus { .. } => "soul_status",
            Self::AddMark { .. } => "add_mark",
            Self::ClearBuff { .. } => "clear_buff",
            Self::Heal { .. } => "heal",
            Self::SpendSoul { .. } => "spend_soul",
        }
    }
}

// ============================================================================
// Scripted contacts
// ============================================================================

/// A contact the scenario runner reports.
///
/// `damager` begins touching `target` at step `tick` and, when `until` is
/// set, keeps touching it through step `until` (reported as contact-stay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedContact {
    /// Step of the contact-begin
    pub tick: u64,

    /// Last step of sustained contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<u64>,

    /// Name of the damager-bearing actor
    pub damager: String,

    /// Name of the touched actor
    pub target: String,
}

impl ScriptedContact {
    /// Whether a contact-stay is reported at `step`.
    #[must_use]
    pub fn stays_at(&self, step: u64) -> bool {
        self.until.is_some_and(|until| step > self.tick && step <= until)
    }
}
