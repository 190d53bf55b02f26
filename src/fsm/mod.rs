//! Actor state machines.
//!
//! Each actor owns one [`StateMachine`]. States expose lifecycle hooks
//! through [`StateBehavior`]; transitions pair a [`Trigger`] with a
//! target and are scanned strictly in priority order.
//!
//! # Architecture
//!
//! - [`context`]: the per-call [`ActorContext`], [`ActorStatus`] and time-in-state [`StateClock`]
//! - [`state`]: [`StateBehavior`], [`StateName`] and the data-driven [`ScriptedState`]
//! - [`trigger`]: the [`Trigger`] trait, built-in triggers and ordered evaluation
//! - [`machine`]: [`StateMachine`] and its validating builder

pub mod context;
pub mod machine;
pub mod state;
pub mod trigger;

pub use context::{ActorContext, ActorStatus, Cadence, Facing, StateClock};
pub use machine::{StateChange, StateKey, StateMachine, StateMachineBuilder};
pub use state::{Passive, ScriptedState, StateAction, StateBehavior, StateName};
pub use trigger::{Target, Transition, Trigger, TriggerResult};
