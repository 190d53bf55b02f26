//! Outbound notifications.

use serde::Serialize;

use crate::buff::{BuffChange, BuffKind};

use super::ActorId;

/// Something external systems (VFX, audio, UI, analytics) may react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// A contact dealt damage
    DamageApplied {
        /// Actor owning the damager
        damager: ActorId,
        /// Actor owning the damageable
        damageable: ActorId,
        /// Damage computed for the hit, before clamping to the target's HP
        amount: u32,
        /// HP actually removed
        dealt: u32,
        /// HP before the hit
        hp_before: u32,
        /// HP after the hit
        hp_after: u32,
    },
    /// An actor's state machine changed state
    StateChanged {
        /// Actor whose machine changed
        actor: ActorId,
        /// State left, `None` on first entry
        from: Option<String>,
        /// State entered
        to: String,
        /// Why the transition happened
        reason: String,
    },
    /// A buff was applied, refreshed, stacked, expired or removed
    BuffChanged {
        /// Actor holding the buff
        target: ActorId,
        /// Which buff
        buff: BuffKind,
        /// What changed
        #[serde(flatten)]
        change: BuffChange,
    },
    /// An actor's HP reached zero
    ActorDied {
        /// Actor that died
        actor: ActorId,
        /// Actor whose damager dealt the killing hit
        killer: Option<ActorId>,
    },
}

impl Notification {
    /// Short name of the notification kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DamageApplied { .. } => "damage_applied",
            Self::StateChanged { .. } => "state_changed",
            Self::BuffChanged { .. } => "buff_changed",
            Self::ActorDied { .. } => "actor_died",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buff_change_is_flattened() {
        let n = Notification::BuffChanged {
            target: ActorId(2),
            buff: BuffKind::SpeedUp,
            change: BuffChange::Remaining { seconds: 1.5 },
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "buff_changed");
        assert_eq!(json["target"], 2);
        assert_eq!(json["buff"], "speed_up");
        assert_eq!(json["change"], "remaining");
        assert_eq!(json["seconds"], 1.5);
    }

    #[test]
    fn test_damage_applied_shape() {
        let n = Notification::DamageApplied {
            damager: ActorId(0),
            damageable: ActorId(1),
            amount: 10,
            dealt: 10,
            hp_before: 30,
            hp_after: 20,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "damage_applied");
        assert_eq!(json["amount"], 10);
        assert_eq!(n.kind(), "damage_applied");
    }
}
