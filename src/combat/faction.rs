//! Faction tags.

use serde::{Deserialize, Serialize};

/// Tag deciding which actor pairs may damage each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// The player and player-owned hazards
    Player,
    /// Enemies and enemy projectiles
    Enemy,
    /// Environmental hazards; hurt every faction
    Neutral,
}

impl Faction {
    /// Whether a damager of this faction may hurt a target of `target`.
    ///
    /// Same-faction pairs are never hostile, except that neutral damagers
    /// hurt everything.
    #[must_use]
    pub fn hostile_to(self, target: Self) -> bool {
        self == Self::Neutral || self != target
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostility_table() {
        assert!(Faction::Player.hostile_to(Faction::Enemy));
        assert!(Faction::Enemy.hostile_to(Faction::Player));
        assert!(!Faction::Enemy.hostile_to(Faction::Enemy));
        assert!(!Faction::Player.hostile_to(Faction::Player));
        assert!(Faction::Neutral.hostile_to(Faction::Neutral));
        assert!(Faction::Neutral.hostile_to(Faction::Player));
        assert!(Faction::Player.hostile_to(Faction::Neutral));
    }
}
