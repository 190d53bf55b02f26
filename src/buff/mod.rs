//! Status effects attached to damageable actors.
//!
//! # Architecture
//!
//! - [`BuffStack`]: per-target accumulation (ElectricMark layers, timed SpeedUp / SoulStatus)
//! - [`MarkRegistry`]: insertion-ordered set of ElectricMark-ed actors used for chain linking
//! - [`StatModifiers`]: property-keyed additive modifiers that never go below zero

pub mod electric_mark;
pub mod modifiers;
pub mod stack;

use serde::{Deserialize, Serialize};

pub use electric_mark::{ChainLink, MarkRegistry};
pub use modifiers::{StatModifiers, StatProperty};
pub use stack::BuffStack;

/// Discriminant of a [`Buff`], used for removal and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Stacking lightning mark
    ElectricMark,
    /// Timed movement speed multiplier
    SpeedUp,
    /// Timed bonus to soul gained on hit
    SoulStatus,
}

impl std::fmt::Display for BuffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElectricMark => write!(f, "electric_mark"),
            Self::SpeedUp => write!(f, "speed_up"),
            Self::SoulStatus => write!(f, "soul_status"),
        }
    }
}

/// A status effect as currently held by a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Buff {
    /// Stacking mark; layers only grow until consumed or cleared
    ElectricMark {
        /// Accumulated layers
        layers: u32,
    },
    /// Movement speed multiplier with a countdown
    SpeedUp {
        /// Multiplier applied to movement intent
        multiplier: f32,
        /// Seconds until expiry
        remaining: f32,
    },
    /// Soul-on-hit bonus with a countdown
    SoulStatus {
        /// Extra soul granted per landed hit
        soul_bonus: u32,
        /// Seconds until expiry
        remaining: f32,
    },
}

impl Buff {
    /// Returns the kind of this buff.
    #[must_use]
    pub const fn kind(&self) -> BuffKind {
        match self {
            Self::ElectricMark { .. } => BuffKind::ElectricMark,
            Self::SpeedUp { .. } => BuffKind::SpeedUp,
            Self::SoulStatus { .. } => BuffKind::SoulStatus,
        }
    }
}

/// Payload of a buff-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum BuffChange {
    /// ElectricMark layer count after the change
    Layers {
        /// New layer count
        layers: u32,
    },
    /// A timed buff was applied or refreshed
    Remaining {
        /// Seconds until expiry
        seconds: f32,
    },
    /// The buff is no longer present
    Removed,
}
