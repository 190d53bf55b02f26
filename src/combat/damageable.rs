//! Damage-receiving component.

use crate::buff::BuffStack;

use super::Faction;

/// Result of one accepted hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageReport {
    /// Damage computed for the hit, before clamping
    pub amount: u32,
    /// HP before the hit
    pub hp_before: u32,
    /// HP after the hit
    pub hp_after: u32,
    /// HP actually removed; less than `amount` on overkill
    pub dealt: u32,
    /// Whether this hit took HP from above zero to zero
    pub killed: bool,
}

/// HP pool with an invulnerability window and held buffs.
///
/// `current_hp` is always within `0..=max_hp`; every mutation clamps
/// before committing.
#[derive(Debug, Clone, PartialEq)]
pub struct Damageable {
    current_hp: u32,
    max_hp: u32,
    faction: Faction,
    invulnerable_remaining: f32,
    hurt_invulnerability: Option<f32>,
    buffs: BuffStack,
}

impl Damageable {
    /// Creates a damageable at full health.
    #[must_use]
    pub fn new(max_hp: u32, faction: Faction) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            faction,
            invulnerable_remaining: 0.0,
            hurt_invulnerability: None,
            buffs: BuffStack::new(),
        }
    }

    /// Sets the starting HP, clamped to `max_hp`.
    #[must_use]
    pub fn with_current_hp(mut self, hp: u32) -> Self {
        self.set_health(hp);
        self
    }

    /// Grants an invulnerability window of `seconds` after every accepted hit.
    #[must_use]
    pub const fn with_hurt_invulnerability(mut self, seconds: f32) -> Self {
        self.hurt_invulnerability = Some(seconds);
        self
    }

    /// Current HP.
    #[must_use]
    pub const fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Maximum HP.
    #[must_use]
    pub const fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Faction tag.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Current HP over max HP; `0.0` when `max_hp` is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hp_fraction(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }

    /// Whether HP has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current_hp == 0
    }

    /// Whether the invulnerability window is open.
    #[must_use]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_remaining > 0.0
    }

    /// Seconds left in the invulnerability window.
    #[must_use]
    pub const fn invulnerability_remaining(&self) -> f32 {
        self.invulnerable_remaining
    }

    /// Window opened automatically after each accepted hit, if any.
    #[must_use]
    pub const fn hurt_invulnerability(&self) -> Option<f32> {
        self.hurt_invulnerability
    }

    /// Opens the invulnerability window for `seconds`.
    ///
    /// The remaining time is overwritten, never extended.
    pub fn enable_invulnerability(&mut self, seconds: f32) {
        self.invulnerable_remaining = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
    }

    /// Closes the invulnerability window immediately.
    pub const fn disable_invulnerability(&mut self) {
        self.invulnerable_remaining = 0.0;
    }

    /// Subtracts `amount` from HP, saturating at zero.
    pub const fn apply_damage(&mut self, amount: u32) -> DamageReport {
        let hp_before = self.current_hp;
        self.current_hp = self.current_hp.saturating_sub(amount);
        DamageReport {
            amount,
            hp_before,
            hp_after: self.current_hp,
            dealt: hp_before - self.current_hp,
            killed: hp_before > 0 && self.current_hp == 0,
        }
    }

    /// Restores up to `amount` HP, capped at `max_hp`. Returns HP restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Sets HP directly, clamped to `0..=max_hp`.
    pub fn set_health(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }

    /// Held buffs.
    #[must_use]
    pub const fn buffs(&self) -> &BuffStack {
        &self.buffs
    }

    /// Held buffs, mutably.
    pub const fn buffs_mut(&mut self) -> &mut BuffStack {
        &mut self.buffs
    }

    /// Counts the invulnerability window down by `dt`.
    ///
    /// Returns `true` when the window closed during this call.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_invulnerable() {
            return false;
        }
        self.invulnerable_remaining = (self.invulnerable_remaining - dt.max(0.0)).max(0.0);
        !self.is_invulnerable()
    }
}
