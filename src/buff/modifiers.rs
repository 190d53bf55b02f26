//! Additive stat modifiers (charm-style bonuses).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Property a modifier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatProperty {
    /// Flat bonus added to outgoing damage
    Attack,
    /// Extra soul gained when landing a hit
    AttackSoul,
    /// Soul gained when taking a hit
    HurtSoul,
    /// Fractional bonus to movement speed (`0.2` = +20%)
    MoveSpeed,
}

impl std::fmt::Display for StatProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Attack => "attack",
            Self::AttackSoul => "attack_soul",
            Self::HurtSoul => "hurt_soul",
            Self::MoveSpeed => "move_speed",
        })
    }
}

/// Modifier totals keyed by property, kept in first-touched order.
///
/// Totals never drop below zero: decreasing past zero clamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatModifiers {
    values: IndexMap<StatProperty, f32>,
}

impl StatModifiers {
    /// Creates an empty modifier set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to `property`. Returns the new total.
    pub fn add(&mut self, property: StatProperty, amount: f32) -> f32 {
        let entry = self.values.entry(property).or_insert(0.0);
        *entry = clamp_total(*entry + amount);
        *entry
    }

    /// Subtracts `amount` from `property`, clamping at zero. Returns the new total.
    pub fn decrease(&mut self, property: StatProperty, amount: f32) -> f32 {
        self.add(property, -amount)
    }

    /// Current total for `property`.
    #[must_use]
    pub fn get(&self, property: StatProperty) -> f32 {
        self.values.get(&property).copied().unwrap_or(0.0)
    }

    /// Current total rounded down to a whole number.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn whole(&self, property: StatProperty) -> u32 {
        self.get(property).floor() as u32
    }

    /// Iterates totals in first-touched order.
    pub fn iter(&self) -> impl Iterator<Item = (StatProperty, f32)> + '_ {
        self.values.iter().map(|(&p, &v)| (p, v))
    }
}

fn clamp_total(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
