//! Simulation layer.
//!
//! A [`World`] owns a set of actors, each made of a state machine, shared
//! status and optional damager / damageable components, together with the
//! [`SimulationContext`] they share. The host feeds it ticks and contact
//! reports and drains the resulting [`Notification`]s.

pub mod actor;
pub mod blueprint;
pub mod context;
pub mod notification;
pub mod scenario;
pub mod world;

pub use actor::{Actor, ActorId, ActorSetup};
pub use blueprint::build_actor;
pub use context::{SimClock, SimulationContext};
pub use notification::Notification;
pub use scenario::{ActorSummary, RunOptions, RunSummary, run_scenario};
pub use world::{Contact, World};
