//! Contact resolution.
//!
//! A contact pairs a damager-bearing actor with another actor. Checks run
//! in a fixed order and the first failing check rejects the contact:
//!
//! 1. the damager gate (`can_damage`)
//! 2. contact-stay on a one-shot damager
//! 3. the other actor has no damageable
//! 4. same faction
//! 5. target already dead
//! 6. target invulnerable and the damager does not ignore invincibility
//!
//! Rejections are not errors. They produce no notification.

use serde::{Deserialize, Serialize};

use super::{ContactMode, DamageReport, Damageable, Damager};

/// Which contact notification is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPhase {
    /// First frame of overlap
    Begin,
    /// Sustained overlap
    Stay,
}

/// Why a contact dealt no damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The damager gate is closed
    DamageDisabled,
    /// Contact-stay on a one-shot damager
    StayIgnored,
    /// The source actor has no damager
    NotDamager,
    /// The other actor has no damageable
    NotDamageable,
    /// Both sides share a faction
    SameFaction,
    /// The target's HP is already zero
    TargetDead,
    /// The target is inside its invulnerability window
    Invulnerable,
    /// An actor contacted itself
    SelfContact,
    /// One side was despawned before the contact was drained
    Despawned,
}

impl RejectReason {
    /// Stable label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DamageDisabled => "damage_disabled",
            Self::StayIgnored => "stay_ignored",
            Self::NotDamager => "not_damager",
            Self::NotDamageable => "not_damageable",
            Self::SameFaction => "same_faction",
            Self::TargetDead => "target_dead",
            Self::Invulnerable => "invulnerable",
            Self::SelfContact => "self_contact",
            Self::Despawned => "despawned",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Damage was applied
    Applied(DamageReport),
    /// The contact was absorbed
    Rejected(RejectReason),
}

impl ContactOutcome {
    /// Whether damage was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Resolves a single contact between `damager` and an optional `target`.
///
/// `attack_bonus` is the attacker's flat attack modifier and is added to
/// the damager's computed damage. On success the damager records the hit
/// and the target's hurt-invulnerability window (if any) is opened.
pub fn resolve(
    phase: ContactPhase,
    damager: &mut Damager,
    attack_bonus: u32,
    target: Option<&mut Damageable>,
) -> ContactOutcome {
    if !damager.can_damage {
        return ContactOutcome::Rejected(RejectReason::DamageDisabled);
    }
    if phase == ContactPhase::Stay && damager.mode == ContactMode::OneShot {
        return ContactOutcome::Rejected(RejectReason::StayIgnored);
    }
    let Some(target) = target else {
        return ContactOutcome::Rejected(RejectReason::NotDamageable);
    };
    if !damager.faction.hostile_to(target.faction()) {
        return ContactOutcome::Rejected(RejectReason::SameFaction);
    }
    if target.is_dead() {
        return ContactOutcome::Rejected(RejectReason::TargetDead);
    }
    if target.is_invulnerable() && !damager.ignore_invincibility {
        return ContactOutcome::Rejected(RejectReason::Invulnerable);
    }

    let amount = damager.damage_for(target).saturating_add(attack_bonus);
    let report = target.apply_damage(amount);
    damager.record_hit();
    if let Some(window) = target.hurt_invulnerability() {
        target.enable_invulnerability(window);
    }
    ContactOutcome::Applied(report)
}
