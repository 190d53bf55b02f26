//! Damage-dealing component.

use serde::{Deserialize, Serialize};

use super::{Damageable, Faction};

/// How a damager computes the magnitude of a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DamageModel {
    /// Always the base damage
    #[default]
    Flat,
    /// A fraction of the target's max HP, never less than the base damage
    PercentOfMax {
        /// Fraction of max HP in `0.0..=1.0`
        fraction: f32,
    },
    /// Base damage plus `step` for every hit already landed, capped at `max`
    Ramping {
        /// Extra damage per landed hit
        step: u32,
        /// Upper bound on the computed damage
        max: u32,
    },
}

/// Whether sustained overlap keeps dealing damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMode {
    /// Only contact-begin deals damage
    #[default]
    OneShot,
    /// Contact-begin and every contact-stay deal damage
    Continuous,
}

/// Damage source attached to an actor (body, weapon, projectile, hazard).
#[derive(Debug, Clone, PartialEq)]
pub struct Damager {
    /// Damage before model and modifiers
    pub base_damage: u32,
    /// Magnitude model
    pub model: DamageModel,
    /// Faction the damage belongs to
    pub faction: Faction,
    /// Hits land through invulnerability windows
    pub ignore_invincibility: bool,
    /// Gate checked before anything else
    pub can_damage: bool,
    /// One-shot or continuous
    pub mode: ContactMode,
    /// Close the gate after the first landed hit
    pub disable_after_hit: bool,
    /// Soul the owner gains per landed hit
    pub soul_per_hit: u32,
    /// ElectricMark layers applied to the target per landed hit
    pub marks_on_hit: u32,
    hits_landed: u32,
}

impl Damager {
    /// Creates an enabled, one-shot, flat damager.
    #[must_use]
    pub const fn new(base_damage: u32, faction: Faction) -> Self {
        Self {
            base_damage,
            model: DamageModel::Flat,
            faction,
            ignore_invincibility: false,
            can_damage: true,
            mode: ContactMode::OneShot,
            disable_after_hit: false,
            soul_per_hit: 0,
            marks_on_hit: 0,
            hits_landed: 0,
        }
    }

    /// Sets the damage model.
    #[must_use]
    pub const fn with_model(mut self, model: DamageModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the contact mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ContactMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets whether hits land through invulnerability.
    #[must_use]
    pub const fn ignoring_invincibility(mut self, ignore: bool) -> Self {
        self.ignore_invincibility = ignore;
        self
    }

    /// Number of hits this damager has landed.
    #[must_use]
    pub const fn hits_landed(&self) -> u32 {
        self.hits_landed
    }

    /// Computes the damage this damager would deal to `target`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn damage_for(&self, target: &Damageable) -> u32 {
        match self.model {
            DamageModel::Flat => self.base_damage,
            DamageModel::PercentOfMax { fraction } => {
                let share = (target.max_hp() as f32 * fraction.clamp(0.0, 1.0)).round() as u32;
                share.max(self.base_damage)
            }
            DamageModel::Ramping { step, max } => self
                .base_damage
                .saturating_add(step.saturating_mul(self.hits_landed))
                .min(max.max(self.base_damage)),
        }
    }

    /// Records a landed hit, closing the gate when configured to.
    pub const fn record_hit(&mut self) {
        self.hits_landed = self.hits_landed.saturating_add(1);
        if self.disable_after_hit {
            self.can_damage = false;
        }
    }

    /// Re-opens the gate and clears the landed-hit count.
    pub const fn rearm(&mut self) {
        self.can_damage = true;
        self.hits_landed = 0;
    }
}
