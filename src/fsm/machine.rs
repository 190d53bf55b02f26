//! The state machine.
//!
//! A [`StateMachine`] owns its states, their ordered transition lists and an
//! optional any-state list evaluated after the active state's own list.
//! Every state key referenced anywhere is resolved to a slot index when the
//! machine is built, so an unknown key is an authoring error reported by
//! [`StateMachineBuilder::build`] rather than a runtime surprise.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::error::FsmError;

use super::context::{ActorContext, Cadence, StateClock};
use super::state::StateBehavior;
use super::trigger::{self, Fired, Transition};

/// Bounds required of a state key.
pub trait StateKey: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

impl<T> StateKey for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display {}

/// Record of a completed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange<S> {
    /// State left, or `None` for the first entry
    pub from: Option<S>,
    /// State entered
    pub to: S,
    /// Human-readable reason
    pub reason: String,
}

#[derive(Debug)]
struct StateSlot<S> {
    key: S,
    behavior: Box<dyn StateBehavior>,
    transitions: Vec<Transition<S>>,
}

/// Builder for a [`StateMachine`].
#[derive(Debug)]
pub struct StateMachineBuilder<S> {
    initial: S,
    states: Vec<StateSlot<S>>,
    pending: Vec<(S, Transition<S>)>,
    any_state: Vec<Transition<S>>,
}

impl<S: StateKey> StateMachineBuilder<S> {
    /// Registers a state. Registration order has no runtime meaning.
    #[must_use]
    pub fn state(self, key: S, behavior: impl StateBehavior + 'static) -> Self {
        self.boxed_state(key, Box::new(behavior))
    }

    /// Registers a state with an already boxed behavior.
    #[must_use]
    pub fn boxed_state(mut self, key: S, behavior: Box<dyn StateBehavior>) -> Self {
        self.states.push(StateSlot {
            key,
            behavior,
            transitions: Vec::new(),
        });
        self
    }

    /// Appends a transition to `from`'s list. Order of calls is priority order.
    #[must_use]
    pub fn transition(mut self, from: S, transition: Transition<S>) -> Self {
        self.pending.push((from, transition));
        self
    }

    /// Appends a transition checked from every state.
    #[must_use]
    pub fn any_transition(mut self, transition: Transition<S>) -> Self {
        self.any_state.push(transition);
        self
    }

    /// Validates every reference and freezes the machine.
    ///
    /// # Errors
    ///
    /// - [`FsmError::Empty`] when no state was registered
    /// - [`FsmError::DuplicateState`] when a key was registered twice
    /// - [`FsmError::UnknownState`] when the initial state, a transition
    ///   source, or a transition target is not registered
    /// - [`FsmError::NoCandidates`] for a random transition with no candidates
    pub fn build(self) -> Result<StateMachine<S>, FsmError> {
        let Self {
            initial,
            mut states,
            pending,
            mut any_state,
        } = self;

        if states.is_empty() {
            return Err(FsmError::Empty);
        }

        let mut index = HashMap::with_capacity(states.len());
        for (slot, state) in states.iter().enumerate() {
            if index.insert(state.key.clone(), slot).is_some() {
                return Err(FsmError::DuplicateState(state.key.to_string()));
            }
        }

        let initial_slot = lookup(&index, &initial, || "initial state".to_string())?;

        for (from, mut transition) in pending {
            let from_slot = lookup(&index, &from, || "transition source".to_string())?;
            let location = format!("transition out of '{from}'");
            transition.resolved = resolve_targets(&index, &transition, &location)?;
            states[from_slot].transitions.push(transition);
        }

        for transition in &mut any_state {
            transition.resolved = resolve_targets(&index, transition, "any-state transition")?;
        }

        Ok(StateMachine {
            states,
            index,
            any_state,
            initial: initial_slot,
            current: None,
            clock: StateClock::default(),
            transitions_taken: 0,
        })
    }
}

fn lookup<S: StateKey>(
    index: &HashMap<S, usize>,
    key: &S,
    location: impl FnOnce() -> String,
) -> Result<usize, FsmError> {
    index.get(key).copied().ok_or_else(|| FsmError::UnknownState {
        state: key.to_string(),
        location: location(),
    })
}

fn resolve_targets<S: StateKey>(
    index: &HashMap<S, usize>,
    transition: &Transition<S>,
    location: &str,
) -> Result<Vec<usize>, FsmError> {
    let candidates = transition.target().candidates();
    if candidates.is_empty() {
        return Err(FsmError::NoCandidates {
            location: location.to_string(),
        });
    }
    candidates
        .iter()
        .map(|key| lookup(index, key, || location.to_string()))
        .collect()
}

/// A state + trigger machine for one actor.
///
/// At most one state is active at a time. Before [`StateMachine::enter`]
/// no state is active and ticks are ignored.
#[derive(Debug)]
pub struct StateMachine<S> {
    states: Vec<StateSlot<S>>,
    index: HashMap<S, usize>,
    any_state: Vec<Transition<S>>,
    initial: usize,
    current: Option<usize>,
    clock: StateClock,
    transitions_taken: u64,
}

impl<S: StateKey> StateMachine<S> {
    /// Starts a builder whose machine will begin in `initial`.
    #[must_use]
    pub const fn builder(initial: S) -> StateMachineBuilder<S> {
        StateMachineBuilder {
            initial,
            states: Vec::new(),
            pending: Vec::new(),
            any_state: Vec::new(),
        }
    }

    /// The active state, if the machine has been entered.
    #[must_use]
    pub fn current(&self) -> Option<&S> {
        self.current.map(|slot| &self.states[slot].key)
    }

    /// The configured initial state.
    #[must_use]
    pub fn initial(&self) -> &S {
        &self.states[self.initial].key
    }

    /// Whether `key` is a registered state.
    #[must_use]
    pub fn contains(&self, key: &S) -> bool {
        self.index.contains_key(key)
    }

    /// Registered states in registration order.
    pub fn states(&self) -> impl Iterator<Item = &S> + '_ {
        self.states.iter().map(|slot| &slot.key)
    }

    /// Time-in-state counters for the active state.
    #[must_use]
    pub const fn clock(&self) -> &StateClock {
        &self.clock
    }

    /// Number of transitions performed, including the initial entry.
    #[must_use]
    pub const fn transitions_taken(&self) -> u64 {
        self.transitions_taken
    }

    /// Enters the initial state.
    ///
    /// Calling this on a running machine exits the active state first and
    /// restarts from the initial state.
    pub fn enter(&mut self, ctx: &mut ActorContext<'_>) -> StateChange<S> {
        for transition in &mut self.any_state {
            transition.reset(ctx);
        }
        self.switch(self.initial, "initial state".to_string(), ctx)
    }

    /// Advances the machine by one tick of `cadence`.
    ///
    /// Time-in-state grows by `dt`, the active state's `on_tick` runs, then
    /// the active state's transitions followed by the any-state transitions
    /// are scanned in order. At most one transition is taken per tick.
    pub fn tick(
        &mut self,
        cadence: Cadence,
        dt: f32,
        ctx: &mut ActorContext<'_>,
    ) -> Option<StateChange<S>> {
        let Some(slot) = self.current else {
            warn!(actor = %ctx.id, "tick on a state machine that was never entered");
            return None;
        };

        self.clock.advance(cadence, dt);
        self.states[slot].behavior.on_tick(cadence, dt, ctx);

        let clock = self.clock;
        let fired = trigger::evaluate(&mut self.states[slot].transitions, cadence, ctx, &clock)
            .or_else(|| trigger::evaluate(&mut self.any_state, cadence, ctx, &clock));

        let Fired { target, reason, .. } = fired?;
        Some(self.switch(target, reason, ctx))
    }

    /// Forces a transition to `key`.
    ///
    /// Transitioning to the active state restarts it.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError::UnknownState`] when `key` is not registered; the
    /// machine is left unchanged.
    pub fn transition_to(
        &mut self,
        key: &S,
        reason: impl Into<String>,
        ctx: &mut ActorContext<'_>,
    ) -> Result<StateChange<S>, FsmError> {
        let slot = lookup(&self.index, key, || "transition request".to_string())?;
        Ok(self.switch(slot, reason.into(), ctx))
    }

    fn switch(&mut self, to: usize, reason: String, ctx: &mut ActorContext<'_>) -> StateChange<S> {
        let from = self.current.map(|slot| {
            let state = &mut self.states[slot];
            state.behavior.on_exit(ctx);
            state.key.clone()
        });

        self.current = Some(to);
        self.clock.reset();
        self.transitions_taken = self.transitions_taken.saturating_add(1);

        let state = &mut self.states[to];
        for transition in &mut state.transitions {
            transition.reset(ctx);
        }
        state.behavior.on_enter(ctx);

        debug!(
            actor = %ctx.id,
            from = from.as_ref().map(ToString::to_string).as_deref(),
            to = %state.key,
            reason = %reason,
            "state transition"
        );

        StateChange {
            from,
            to: state.key.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::fsm::testing::Harness;
    use crate::fsm::state::Passive;
    use crate::fsm::trigger::{Always, ExitTime, Never, OnHit};

    /// Records every hook call into a shared log.
    #[derive(Debug)]
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                log: Rc::clone(log),
            }
        }
    }

    impl StateBehavior for Recorder {
        fn on_enter(&mut self, _ctx: &mut ActorContext<'_>) {
            self.log.borrow_mut().push(format!("enter {}", self.name));
        }

        fn on_exit(&mut self, _ctx: &mut ActorContext<'_>) {
            self.log.borrow_mut().push(format!("exit {}", self.name));
        }
    }

    #[test]
    fn test_build_rejects_unknown_target() {
        let err = StateMachine::builder("idle")
            .state("idle", Passive)
            .transition("idle", Transition::to("jump", Always))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            FsmError::UnknownState {
                state: "jump".into(),
                location: "transition out of 'idle'".into(),
            }
        );
    }

    #[test]
    fn test_build_rejects_unknown_initial() {
        let err = StateMachine::builder("nope")
            .state("idle", Passive)
            .build()
            .unwrap_err();
        assert!(matches!(err, FsmError::UnknownState { .. }));
    }

    #[test]
    fn test_build_rejects_duplicates_and_empty() {
        let err = StateMachine::builder("idle")
            .state("idle", Passive)
            .state("idle", Passive)
            .build()
            .unwrap_err();
        assert_eq!(err, FsmError::DuplicateState("idle".into()));

        let err = StateMachine::<&str>::builder("idle").build().unwrap_err();
        assert_eq!(err, FsmError::Empty);
    }

    #[test]
    fn test_build_rejects_empty_random() {
        let err = StateMachine::builder("idle")
            .state("idle", Passive)
            .any_transition(Transition::random(Vec::new(), Always))
            .build()
            .unwrap_err();
        assert!(matches!(err, FsmError::NoCandidates { .. }));
    }

    #[test]
    fn test_enter_and_priority_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut machine = StateMachine::builder("s")
            .state("s", Recorder::new("s", &log))
            .state("a", Recorder::new("a", &log))
            .state("b", Recorder::new("b", &log))
            .transition("s", Transition::to("s", Never))
            .transition("s", Transition::to("a", Always))
            .transition("s", Transition::to("b", Always))
            .build()
            .unwrap();
        let mut harness = Harness::new();

        let first = machine.enter(&mut harness.ctx());
        assert_eq!(first.from, None);
        assert_eq!(first.to, "s");

        let change = machine
            .tick(Cadence::Frame, 0.016, &mut harness.ctx())
            .expect("transition");
        assert_eq!(change.from, Some("s"));
        assert_eq!(change.to, "a");
        assert_eq!(machine.current(), Some(&"a"));
        assert_eq!(*log.borrow(), vec!["enter s", "exit s", "enter a"]);
    }

    #[test]
    fn test_tick_before_enter_is_ignored() {
        let mut machine = StateMachine::builder("s")
            .state("s", Passive)
            .transition("s", Transition::to("s", Always))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        assert!(machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).is_none());
        assert!(machine.current().is_none());
    }

    #[test]
    fn test_self_transition_restarts() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut machine = StateMachine::builder("loop")
            .state("loop", Recorder::new("loop", &log))
            .transition("loop", Transition::to("loop", ExitTime { after: 1.0 }))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        machine.enter(&mut harness.ctx());

        assert!(machine.tick(Cadence::Frame, 0.6, &mut harness.ctx()).is_none());
        let change = machine
            .tick(Cadence::Frame, 0.6, &mut harness.ctx())
            .expect("exit time");
        assert_eq!(change.from, Some("loop"));
        assert_eq!(change.to, "loop");
        assert!(machine.clock().elapsed_in(Cadence::Frame).abs() < f32::EPSILON);
        assert_eq!(*log.borrow(), vec!["enter loop", "exit loop", "enter loop"]);
    }

    #[test]
    fn test_elapsed_resets_for_both_cadences() {
        let mut machine = StateMachine::builder("a")
            .state("a", Passive)
            .state("b", Passive)
            .transition("a", Transition::to("b", ExitTime { after: 0.5 }).on(Cadence::Fixed))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        machine.enter(&mut harness.ctx());

        machine.tick(Cadence::Frame, 3.0, &mut harness.ctx());
        assert_eq!(machine.current(), Some(&"a"));
        let change = machine.tick(Cadence::Fixed, 0.5, &mut harness.ctx());
        assert!(change.is_some());
        assert!(machine.clock().elapsed_in(Cadence::Frame).abs() < f32::EPSILON);
        assert!(machine.clock().elapsed_in(Cadence::Fixed).abs() < f32::EPSILON);
    }

    #[test]
    fn test_any_state_after_own_list() {
        let mut machine = StateMachine::builder("idle")
            .state("idle", Passive)
            .state("walk", Passive)
            .state("hurt", Passive)
            .transition("idle", Transition::to("walk", Always))
            .any_transition(Transition::to("hurt", OnHit::default()))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        machine.enter(&mut harness.ctx());

        harness.status.record_hit();
        let change = machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).unwrap();
        assert_eq!(change.to, "walk");

        let change = machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).unwrap();
        assert_eq!(change.to, "hurt");
    }

    #[test]
    fn test_transition_to_unknown_leaves_machine() {
        let mut machine = StateMachine::builder("idle")
            .state("idle", Passive)
            .build()
            .unwrap();
        let mut harness = Harness::new();
        machine.enter(&mut harness.ctx());
        let err = machine
            .transition_to(&"ghost", "forced", &mut harness.ctx())
            .unwrap_err();
        assert!(matches!(err, FsmError::UnknownState { .. }));
        assert_eq!(machine.current(), Some(&"idle"));
        assert_eq!(machine.transitions_taken(), 1);
    }

    #[test]
    fn test_one_hit_fires_one_on_hit() {
        let mut machine = StateMachine::builder("idle")
            .state("idle", Passive)
            .state("hurt", Passive)
            .state("stagger", Passive)
            .transition("idle", Transition::to("hurt", OnHit::default()))
            .any_transition(Transition::to("stagger", OnHit::default()))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        machine.enter(&mut harness.ctx());

        harness.status.record_hit();
        let changes: Vec<_> = (0..3)
            .filter_map(|_| machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()))
            .map(|change| change.to)
            .collect();
        assert_eq!(changes, vec!["hurt"]);
        assert_eq!(machine.current(), Some(&"hurt"));

        harness.status.record_hit();
        let change = machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).unwrap();
        assert_eq!(change.to, "stagger");
    }

    #[test]
    fn test_on_hit_resets_on_enter() {
        let mut machine = StateMachine::builder("idle")
            .state("idle", Passive)
            .state("hurt", Passive)
            .transition("idle", Transition::to("hurt", OnHit::default()))
            .build()
            .unwrap();
        let mut harness = Harness::new();
        harness.status.record_hit();
        machine.enter(&mut harness.ctx());
        assert!(machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).is_none());
        harness.status.record_hit();
        assert!(machine.tick(Cadence::Frame, 0.1, &mut harness.ctx()).is_some());
    }
}
