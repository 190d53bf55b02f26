//! Contact damage pipeline.
//!
//! # Architecture
//!
//! - [`Faction`]: who may hurt whom
//! - [`Damageable`]: HP, invulnerability window, buffs
//! - [`Damager`]: damage source with a pluggable [`DamageModel`]
//! - [`resolver`]: ordered eligibility checks and damage application

pub mod damageable;
pub mod damager;
pub mod faction;
pub mod resolver;

pub use damageable::{DamageReport, Damageable};
pub use damager::{ContactMode, DamageModel, Damager};
pub use faction::Faction;
pub use resolver::{ContactOutcome, ContactPhase, RejectReason};
