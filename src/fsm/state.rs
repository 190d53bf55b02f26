//! State identity and lifecycle hooks.

use crate::buff::BuffKind;

use super::context::{ActorContext, Cadence, Facing};

/// Newtype wrapper for state names loaded from configuration.
///
/// Wraps names like `"idle"` or `"dash_attack"` so state keys cannot be
/// confused with other strings (actor names, flag names).
#[derive(Debug, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct StateName(pub String);

impl StateName {
    /// Creates a new `StateName`.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle hooks of one state.
///
/// All hooks default to doing nothing, so a behavior only overrides what
/// it needs.
pub trait StateBehavior: std::fmt::Debug {
    /// Called once each time the state becomes active.
    fn on_enter(&mut self, _ctx: &mut ActorContext<'_>) {}

    /// Called every tick while the state is active, before triggers run.
    fn on_tick(&mut self, _cadence: Cadence, _dt: f32, _ctx: &mut ActorContext<'_>) {}

    /// Called once each time the state stops being active.
    fn on_exit(&mut self, _ctx: &mut ActorContext<'_>) {}
}

/// A state that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passive;

impl StateBehavior for Passive {}

/// A single authored side effect run from a [`ScriptedState`] hook.
#[derive(Debug, Clone, PartialEq)]
pub enum StateAction {
    /// Turn to face a direction
    Face(Facing),
    /// Flip facing
    TurnAround,
    /// Set a named flag
    SetFlag {
        /// Flag name
        name: String,
        /// New value
        value: bool,
    },
    /// Open the actor's damager gate (re-arming it)
    EnableDamage,
    /// Close the actor's damager gate
    DisableDamage,
    /// Open an invulnerability window
    Invulnerable {
        /// Window length in seconds
        seconds: f32,
    },
    /// Apply or refresh a SpeedUp
    SpeedUp {
        /// Movement multiplier
        multiplier: f32,
        /// Duration in seconds
        seconds: f32,
    },
    /// Apply or refresh a SoulStatus
    SoulStatus {
        /// Extra soul per landed hit
        soul_bonus: u32,
        /// Duration in seconds
        seconds: f32,
    },
    /// Add ElectricMark layers to the actor itself
    AddMark {
        /// Layers to add
        layers: u32,
    },
    /// Remove a buff if present
    ClearBuff(BuffKind),
    /// Restore HP
    Heal(u32),
    /// Spend soul if available
    SpendSoul(u32),
}

impl StateAction {
    /// Runs this action against the actor.
    pub fn apply(&self, ctx: &mut ActorContext<'_>) {
        match self {
            Self::Face(facing) => ctx.status.facing = *facing,
            Self::TurnAround => ctx.status.facing = ctx.status.facing.flipped(),
            Self::SetFlag { name, value } => ctx.status.set_flag(name.clone(), *value),
            Self::EnableDamage => {
                if let Some(damager) = ctx.damager.as_deref_mut() {
                    damager.rearm();
                }
            }
            Self::DisableDamage => {
                if let Some(damager) = ctx.damager.as_deref_mut() {
                    damager.can_damage = false;
                }
            }
            Self::Invulnerable { seconds } => {
                ctx.enable_invulnerability(*seconds);
            }
            Self::SpeedUp {
                multiplier,
                seconds,
            } => {
                ctx.apply_speed_up(*multiplier, *seconds);
            }
            Self::SoulStatus {
                soul_bonus,
                seconds,
            } => {
                ctx.apply_soul_status(*soul_bonus, *seconds);
            }
            Self::AddMark { layers } => {
                for _ in 0..*layers {
                    ctx.add_electric_mark();
                }
            }
            Self::ClearBuff(kind) => {
                ctx.remove_buff(*kind);
            }
            Self::Heal(amount) => {
                if let Some(damageable) = ctx.damageable.as_deref_mut() {
                    damageable.heal(*amount);
                }
            }
            Self::SpendSoul(amount) => {
                ctx.status.spend_soul(*amount);
            }
        }
    }
}

/// A data-driven state built from configuration.
///
/// Runs `enter` actions on entry and `exit` actions on exit. While active
/// it publishes `velocity` (scaled by the actor's speed multiplier) as the
/// actor's movement intent every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedState {
    /// Actions run on entry, in order
    pub enter: Vec<StateAction>,
    /// Actions run on exit, in order
    pub exit: Vec<StateAction>,
    /// Movement intent while active
    pub velocity: Option<[f32; 2]>,
}

impl ScriptedState {
    fn publish_velocity(&self, ctx: &mut ActorContext<'_>) {
        if let Some([x, y]) = self.velocity {
            let scale = ctx.speed_multiplier();
            ctx.status.velocity_intent = [x * scale, y * scale];
        }
    }
}

impl StateBehavior for ScriptedState {
    fn on_enter(&mut self, ctx: &mut ActorContext<'_>) {
        for action in &self.enter {
            action.apply(ctx);
        }
        self.publish_velocity(ctx);
    }

    fn on_tick(&mut self, _cadence: Cadence, _dt: f32, ctx: &mut ActorContext<'_>) {
        self.publish_velocity(ctx);
    }

    fn on_exit(&mut self, ctx: &mut ActorContext<'_>) {
        for action in &self.exit {
            action.apply(ctx);
        }
        if self.velocity.is_some() {
            ctx.status.velocity_intent = [0.0, 0.0];
        }
    }
}
