//! Per-actor context handed to states and triggers.
//!
//! The machine never owns the actor's combat components; the simulation
//! lends them for the duration of one hook call through [`ActorContext`].

use indexmap::IndexMap;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::buff::{BuffChange, BuffKind, MarkRegistry, StatModifiers, StatProperty};
use crate::combat::{Damageable, Damager};
use crate::sim::{ActorId, Notification};

/// Which host tick stream drives an update.
///
/// Physics-synchronized logic runs on [`Cadence::Fixed`], render-synchronized
/// logic on [`Cadence::Frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Fixed-timestep (physics) tick
    Fixed,
    /// Variable-timestep (render) tick
    #[default]
    Frame,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Frame => write!(f, "frame"),
        }
    }
}

/// Horizontal facing of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Facing toward negative x
    Left,
    /// Facing toward positive x
    #[default]
    Right,
}

impl Facing {
    /// Returns the opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Time spent in the active state, tracked separately per cadence.
///
/// Both counters reset to zero on every state entry. `cadence` records
/// which stream is currently being evaluated so time-based triggers read
/// the matching counter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateClock {
    fixed: f32,
    frame: f32,
    cadence: Cadence,
}

impl StateClock {
    /// Builds a clock that has already spent `elapsed` seconds on `cadence`.
    #[must_use]
    pub fn at(cadence: Cadence, elapsed: f32) -> Self {
        let mut clock = Self::default();
        clock.advance(cadence, elapsed);
        clock
    }

    /// Adds `dt` seconds to the counter for `cadence` and makes it current.
    ///
    /// Negative deltas are ignored.
    pub fn advance(&mut self, cadence: Cadence, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        match cadence {
            Cadence::Fixed => self.fixed += dt,
            Cadence::Frame => self.frame += dt,
        }
        self.cadence = cadence;
    }

    /// Zeroes both counters.
    pub const fn reset(&mut self) {
        self.fixed = 0.0;
        self.frame = 0.0;
    }

    /// Seconds in state on the cadence currently being evaluated.
    #[must_use]
    pub const fn elapsed(&self) -> f32 {
        self.elapsed_in(self.cadence)
    }

    /// Seconds in state on the given cadence.
    #[must_use]
    pub const fn elapsed_in(&self, cadence: Cadence) -> f32 {
        match cadence {
            Cadence::Fixed => self.fixed,
            Cadence::Frame => self.frame,
        }
    }

    /// The cadence most recently advanced.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }
}

/// Shared, engine-agnostic actor state read and written by state logic.
#[derive(Debug, Clone, Default)]
pub struct ActorStatus {
    /// Current facing
    pub facing: Facing,
    /// Movement the actor wants this tick; the host applies it
    pub velocity_intent: [f32; 2],
    /// Soul meter
    pub soul: u32,
    /// Upper bound for `soul`
    pub max_soul: u32,
    /// Named boolean flags for authored logic
    pub flags: IndexMap<String, bool>,
    /// Additive stat modifiers from equipped charms and the like
    pub modifiers: StatModifiers,
    hits_taken: u64,
    hits_consumed: u64,
}

impl ActorStatus {
    /// Creates a status with an empty soul meter of the given capacity.
    #[must_use]
    pub fn new(max_soul: u32) -> Self {
        Self {
            max_soul,
            ..Self::default()
        }
    }

    /// Reads a named flag; unset flags are `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    /// Sets a named flag.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    /// Total hits this actor has taken since spawn.
    #[must_use]
    pub const fn hits_taken(&self) -> u64 {
        self.hits_taken
    }

    /// Records one accepted hit.
    pub const fn record_hit(&mut self) {
        self.hits_taken = self.hits_taken.saturating_add(1);
    }

    /// Hits already consumed by an `on_hit` trigger.
    #[must_use]
    pub const fn hits_consumed(&self) -> u64 {
        self.hits_consumed
    }

    /// Marks every hit up to `count` as consumed. The cursor never moves
    /// back and never passes [`ActorStatus::hits_taken`].
    pub fn consume_hits_through(&mut self, count: u64) {
        self.hits_consumed = self.hits_consumed.max(count.min(self.hits_taken));
    }

    /// Adds soul, saturating at `max_soul`. Returns the amount actually gained.
    ///
    /// Soul already above `max_soul` is left as it is.
    pub fn gain_soul(&mut self, amount: u32) -> u32 {
        let before = self.soul;
        if before >= self.max_soul {
            return 0;
        }
        self.soul = before.saturating_add(amount).min(self.max_soul);
        self.soul - before
    }

    /// Spends soul if enough is available.
    pub const fn spend_soul(&mut self, amount: u32) -> bool {
        if self.soul < amount {
            return false;
        }
        self.soul -= amount;
        true
    }
}

/// Everything a state hook or trigger may touch for one actor.
pub struct ActorContext<'a> {
    /// Handle of the actor being updated
    pub id: ActorId,
    /// Shared actor state
    pub status: &'a mut ActorStatus,
    /// Damage-receiving component, when the actor has one
    pub damageable: Option<&'a mut Damageable>,
    /// Damage-dealing component, when the actor has one
    pub damager: Option<&'a mut Damager>,
    /// Registry of ElectricMark-ed actors
    pub marks: &'a mut MarkRegistry,
    /// Simulation random source
    pub rng: &'a mut StdRng,
    /// Outbound notifications raised during the call
    pub outbox: &'a mut Vec<Notification>,
}

impl ActorContext<'_> {
    /// Current HP as a fraction of max HP, or `None` without a damageable.
    #[must_use]
    pub fn hp_fraction(&self) -> Option<f32> {
        self.damageable.as_deref().map(Damageable::hp_fraction)
    }

    /// Whether the actor has a damageable whose HP reached zero.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.damageable.as_deref().is_some_and(Damageable::is_dead)
    }

    /// ElectricMark layers currently on this actor.
    #[must_use]
    pub fn mark_layers(&self) -> u32 {
        self.damageable
            .as_deref()
            .map_or(0, |d| d.buffs().mark_layers())
    }

    /// Movement multiplier from active SpeedUp buffs and move-speed modifiers.
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        let buffed = self
            .damageable
            .as_deref()
            .map_or(1.0, |d| d.buffs().speed_multiplier());
        buffed * (1.0 + self.status.modifiers.get(StatProperty::MoveSpeed))
    }

    /// Queues an outbound notification.
    pub fn notify(&mut self, notification: Notification) {
        self.outbox.push(notification);
    }

    /// Adds one ElectricMark layer and registers the actor for chain linking.
    ///
    /// Returns the new layer count, or `None` without a damageable.
    pub fn add_electric_mark(&mut self) -> Option<u32> {
        let damageable = self.damageable.as_deref_mut()?;
        let layers = damageable.buffs_mut().add_mark_layer();
        self.marks.register(self.id);
        self.buff_changed(BuffKind::ElectricMark, BuffChange::Layers { layers });
        Some(layers)
    }

    /// Takes every ElectricMark layer and removes the actor from the registry.
    pub fn consume_electric_mark(&mut self) -> u32 {
        let layers = self
            .damageable
            .as_deref_mut()
            .map_or(0, |d| d.buffs_mut().consume_marks());
        self.marks.unregister(self.id);
        if layers > 0 {
            self.buff_changed(BuffKind::ElectricMark, BuffChange::Removed);
        }
        layers
    }

    /// Applies or refreshes a SpeedUp. Returns `false` if nothing was applied,
    /// in which case a held SpeedUp is left untouched.
    pub fn apply_speed_up(&mut self, multiplier: f32, seconds: f32) -> bool {
        let Some(damageable) = self.damageable.as_deref_mut() else {
            return false;
        };
        if !damageable.buffs_mut().apply_speed_up(multiplier, seconds) {
            return false;
        }
        self.buff_changed(BuffKind::SpeedUp, BuffChange::Remaining { seconds });
        true
    }

    /// Applies or refreshes a SoulStatus. Returns `false` if nothing was applied.
    pub fn apply_soul_status(&mut self, soul_bonus: u32, seconds: f32) -> bool {
        let Some(damageable) = self.damageable.as_deref_mut() else {
            return false;
        };
        if !damageable.buffs_mut().apply_soul_status(soul_bonus, seconds) {
            return false;
        }
        self.buff_changed(BuffKind::SoulStatus, BuffChange::Remaining { seconds });
        true
    }

    /// Removes a buff. Removing an absent buff is a no-op returning `false`.
    pub fn remove_buff(&mut self, kind: BuffKind) -> bool {
        let removed = self
            .damageable
            .as_deref_mut()
            .and_then(|d| d.buffs_mut().remove(kind))
            .is_some();
        if kind == BuffKind::ElectricMark {
            self.marks.unregister(self.id);
        }
        if removed {
            self.buff_changed(kind, BuffChange::Removed);
        }
        removed
    }

    /// Opens the invulnerability window. Returns `false` without a damageable.
    pub fn enable_invulnerability(&mut self, seconds: f32) -> bool {
        let Some(damageable) = self.damageable.as_deref_mut() else {
            return false;
        };
        damageable.enable_invulnerability(seconds);
        true
    }

    fn buff_changed(&mut self, buff: BuffKind, change: BuffChange) {
        self.notify(Notification::BuffChanged {
            target: self.id,
            buff,
            change,
        });
    }
}

impl std::fmt::Debug for ActorContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorContext")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("has_damageable", &self.damageable.is_some())
            .field("has_damager", &self.damager.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_tracks_cadences_separately() {
        let mut clock = StateClock::default();
        clock.advance(Cadence::Fixed, 0.02);
        clock.advance(Cadence::Fixed, 0.02);
        clock.advance(Cadence::Frame, 0.5);

        assert!((clock.elapsed_in(Cadence::Fixed) - 0.04).abs() < 1e-6);
        assert!((clock.elapsed_in(Cadence::Frame) - 0.5).abs() < 1e-6);
        assert_eq!(clock.cadence(), Cadence::Frame);
        assert!((clock.elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clock_ignores_negative_and_nan() {
        let mut clock = StateClock::default();
        clock.advance(Cadence::Frame, -1.0);
        clock.advance(Cadence::Frame, f32::NAN);
        assert!(clock.elapsed_in(Cadence::Frame).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clock_reset() {
        let mut clock = StateClock::at(Cadence::Fixed, 3.0);
        clock.reset();
        assert!(clock.elapsed_in(Cadence::Fixed).abs() < f32::EPSILON);
    }

    #[test]
    fn test_soul_saturates_at_max() {
        let mut status = ActorStatus::new(10);
        assert_eq!(status.gain_soul(7), 7);
        assert_eq!(status.gain_soul(7), 3);
        assert_eq!(status.soul, 10);
        assert!(status.spend_soul(4));
        assert!(!status.spend_soul(40));
        assert_eq!(status.soul, 6);
    }

    #[test]
    fn test_soul_above_max_gains_nothing() {
        let mut status = ActorStatus::new(5);
        status.soul = 8;
        assert_eq!(status.gain_soul(1), 0);
        assert_eq!(status.soul, 8);
    }

    #[test]
    fn test_consumed_hits_never_pass_taken() {
        let mut status = ActorStatus::default();
        status.record_hit();
        status.consume_hits_through(3);
        assert_eq!(status.hits_consumed(), 1);
        status.consume_hits_through(0);
        assert_eq!(status.hits_consumed(), 1);
    }

    #[test]
    fn test_flags_default_false() {
        let mut status = ActorStatus::default();
        assert!(!status.flag("grounded"));
        status.set_flag("grounded", true);
        assert!(status.flag("grounded"));
    }

    #[test]
    fn test_facing_flip() {
        assert_eq!(Facing::Left.flipped(), Facing::Right);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
    }
}
