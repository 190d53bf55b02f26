//! `silkcore` - Actor state machines and contact damage for 2D action platformers
//!
//! This library provides the gameplay core of a side-scrolling action game:
//! per-actor finite state machines, contact damage resolution between
//! damagers and damageables, timed buffs, and a headless world that drives
//! them on fixed and frame cadences.
//!
//! # Modules
//!
//! - [`fsm`]: state machines, triggers and state lifecycle hooks
//! - [`combat`]: factions, damagers, damageables and contact resolution
//! - [`buff`]: timed buffs, ElectricMark layers and stat modifiers
//! - [`sim`]: the actor world, notifications and the scenario runner
//! - [`config`]: YAML actor and scenario files, loading and validation
//! - [`observability`]: logging, metrics and the JSONL event stream
//! - [`cli`]: the `silkcore` command line

pub mod buff;
pub mod cli;
pub mod combat;
pub mod config;
pub mod error;
pub mod fsm;
pub mod observability;
pub mod sim;
