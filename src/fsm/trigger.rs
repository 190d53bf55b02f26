//! Transition triggers and ordered evaluation.
//!
//! A [`Transition`] pairs a [`Trigger`] with a target (one state, or a
//! uniform random pick among candidates) and the cadence it is checked
//! on. [`evaluate`] scans a transition list strictly in order and the
//! first trigger that fires wins; later entries are not consulted.

use rand::Rng;

use super::context::{ActorContext, Cadence, StateClock};

/// Result of evaluating a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerResult {
    /// Trigger fired with a human-readable reason
    Fired(String),
    /// Trigger conditions not met
    NotMet,
}

impl TriggerResult {
    /// Whether the trigger fired.
    #[must_use]
    pub const fn fired(&self) -> bool {
        matches!(self, Self::Fired(_))
    }
}

/// A predicate guarding a transition.
///
/// Triggers may keep their own state (see [`OnHit`]). [`Trigger::reset`]
/// runs every time the owning state is entered.
pub trait Trigger: std::fmt::Debug {
    /// Evaluates the predicate against the actor and time-in-state.
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult;

    /// Clears per-visit state when the owning state is entered.
    fn reset(&mut self, _ctx: &ActorContext<'_>) {}
}

// ============================================================================
// Built-in triggers
// ============================================================================

/// Always fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl Trigger for Always {
    fn evaluate(&mut self, _ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        TriggerResult::Fired("always".to_string())
    }
}

/// Never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl Trigger for Never {
    fn evaluate(&mut self, _ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        TriggerResult::NotMet
    }
}

/// Fires once time-in-state on the evaluated cadence reaches `after` seconds.
#[derive(Debug, Clone, Copy)]
pub struct ExitTime {
    /// Threshold in seconds
    pub after: f32,
}

impl Trigger for ExitTime {
    fn evaluate(&mut self, _ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult {
        if clock.elapsed() >= self.after {
            TriggerResult::Fired(format!("exit time {}s reached", self.after))
        } else {
            TriggerResult::NotMet
        }
    }
}

/// Fires once per hit taken since the owning state was entered.
///
/// Hits landed before entry are ignored. Firing consumes one hit for the
/// whole actor, so another `OnHit` on the same actor never fires for it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnHit {
    seen: u64,
}

impl Trigger for OnHit {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        let cursor = self.seen.max(ctx.status.hits_consumed());
        if ctx.status.hits_taken() > cursor {
            self.seen = cursor + 1;
            ctx.status.consume_hits_through(self.seen);
            TriggerResult::Fired("hit taken".to_string())
        } else {
            TriggerResult::NotMet
        }
    }

    fn reset(&mut self, ctx: &ActorContext<'_>) {
        self.seen = ctx.status.hits_taken();
    }
}

/// Fires while HP is strictly below `fraction` of max HP.
#[derive(Debug, Clone, Copy)]
pub struct HpBelow {
    /// Threshold fraction in `0.0..=1.0`
    pub fraction: f32,
}

impl Trigger for HpBelow {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        match ctx.hp_fraction() {
            Some(hp) if hp < self.fraction => {
                TriggerResult::Fired(format!("hp below {:.0}%", self.fraction * 100.0))
            }
            _ => TriggerResult::NotMet,
        }
    }
}

/// Fires while the actor's HP is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsDead;

impl Trigger for IsDead {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        if ctx.is_dead() {
            TriggerResult::Fired("actor died".to_string())
        } else {
            TriggerResult::NotMet
        }
    }
}

/// Fires while a named flag equals `value`.
#[derive(Debug, Clone)]
pub struct FlagIs {
    /// Flag name
    pub name: String,
    /// Expected value
    pub value: bool,
}

impl Trigger for FlagIs {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        if ctx.status.flag(&self.name) == self.value {
            TriggerResult::Fired(format!("flag '{}' is {}", self.name, self.value))
        } else {
            TriggerResult::NotMet
        }
    }
}

/// Fires while the actor carries at least `layers` ElectricMark layers.
#[derive(Debug, Clone, Copy)]
pub struct MarkLayersAtLeast {
    /// Layer threshold
    pub layers: u32,
}

impl Trigger for MarkLayersAtLeast {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, _clock: &StateClock) -> TriggerResult {
        let held = ctx.mark_layers();
        if held >= self.layers {
            TriggerResult::Fired(format!("{held} electric mark layers"))
        } else {
            TriggerResult::NotMet
        }
    }
}

/// Fires when every inner trigger fires, evaluated left to right.
///
/// Evaluation short-circuits on the first inner trigger that is not met.
#[derive(Debug)]
pub struct AllOf(pub Vec<Box<dyn Trigger>>);

impl Trigger for AllOf {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult {
        let mut reasons = Vec::with_capacity(self.0.len());
        for inner in &mut self.0 {
            match inner.evaluate(ctx, clock) {
                TriggerResult::Fired(reason) => reasons.push(reason),
                TriggerResult::NotMet => return TriggerResult::NotMet,
            }
        }
        TriggerResult::Fired(reasons.join(" and "))
    }

    fn reset(&mut self, ctx: &ActorContext<'_>) {
        for inner in &mut self.0 {
            inner.reset(ctx);
        }
    }
}

/// Fires when any inner trigger fires; the first one to fire supplies the reason.
#[derive(Debug)]
pub struct AnyOf(pub Vec<Box<dyn Trigger>>);

impl Trigger for AnyOf {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult {
        for inner in &mut self.0 {
            if let fired @ TriggerResult::Fired(_) = inner.evaluate(ctx, clock) {
                return fired;
            }
        }
        TriggerResult::NotMet
    }

    fn reset(&mut self, ctx: &ActorContext<'_>) {
        for inner in &mut self.0 {
            inner.reset(ctx);
        }
    }
}

/// Inverts an inner trigger.
#[derive(Debug)]
pub struct Not(pub Box<dyn Trigger>);

impl Trigger for Not {
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult {
        match self.0.evaluate(ctx, clock) {
            TriggerResult::Fired(_) => TriggerResult::NotMet,
            TriggerResult::NotMet => TriggerResult::Fired("negated condition".to_string()),
        }
    }

    fn reset(&mut self, ctx: &ActorContext<'_>) {
        self.0.reset(ctx);
    }
}

/// Adapts a closure into a trigger.
pub struct Predicate<F> {
    label: String,
    check: F,
}

impl<F> Predicate<F>
where
    F: FnMut(&ActorContext<'_>, &StateClock) -> bool,
{
    /// Wraps `check`; `label` becomes the fired reason.
    pub fn new(label: impl Into<String>, check: F) -> Self {
        Self {
            label: label.into(),
            check,
        }
    }
}

impl<F> std::fmt::Debug for Predicate<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<F> Trigger for Predicate<F>
where
    F: FnMut(&ActorContext<'_>, &StateClock) -> bool,
{
    fn evaluate(&mut self, ctx: &mut ActorContext<'_>, clock: &StateClock) -> TriggerResult {
        if (self.check)(ctx, clock) {
            TriggerResult::Fired(self.label.clone())
        } else {
            TriggerResult::NotMet
        }
    }
}

// ============================================================================
// Transitions
// ============================================================================

/// Where a fired transition leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target<S> {
    /// A single state
    Fixed(S),
    /// A uniform random pick among candidates
    Random(Vec<S>),
}

impl<S> Target<S> {
    /// All states this target may lead to.
    #[must_use]
    pub fn candidates(&self) -> &[S] {
        match self {
            Self::Fixed(state) => std::slice::from_ref(state),
            Self::Random(states) => states,
        }
    }
}

/// A trigger with its target and cadence.
#[derive(Debug)]
pub struct Transition<S> {
    trigger: Box<dyn Trigger>,
    target: Target<S>,
    cadence: Cadence,
    pub(crate) resolved: Vec<usize>,
}

impl<S> Transition<S> {
    /// A transition to a single state, checked on the frame cadence.
    pub fn to(target: S, trigger: impl Trigger + 'static) -> Self {
        Self::new(Target::Fixed(target), Box::new(trigger))
    }

    /// A transition to a random candidate, checked on the frame cadence.
    pub fn random(candidates: Vec<S>, trigger: impl Trigger + 'static) -> Self {
        Self::new(Target::Random(candidates), Box::new(trigger))
    }

    /// A transition from an already boxed trigger.
    #[must_use]
    pub const fn new(target: Target<S>, trigger: Box<dyn Trigger>) -> Self {
        Self {
            trigger,
            target,
            cadence: Cadence::Frame,
            resolved: Vec::new(),
        }
    }

    /// Checks this transition on `cadence` instead.
    #[must_use]
    pub const fn on(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// The target.
    #[must_use]
    pub const fn target(&self) -> &Target<S> {
        &self.target
    }

    /// The cadence this transition is checked on.
    #[must_use]
    pub const fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub(crate) fn reset(&mut self, ctx: &ActorContext<'_>) {
        self.trigger.reset(ctx);
    }
}

/// A transition selected by [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    /// Position of the winning transition in the scanned list
    pub transition: usize,
    /// Resolved state slot to enter
    pub target: usize,
    /// Reason reported by the trigger
    pub reason: String,
}

/// Scans `transitions` in order and returns the first that fires on `cadence`.
///
/// Transitions declared for the other cadence are skipped without being
/// evaluated. Random targets are drawn from the context's RNG.
pub fn evaluate<S>(
    transitions: &mut [Transition<S>],
    cadence: Cadence,
    ctx: &mut ActorContext<'_>,
    clock: &StateClock,
) -> Option<Fired> {
    for (index, transition) in transitions.iter_mut().enumerate() {
        if transition.cadence != cadence {
            continue;
        }
        if let TriggerResult::Fired(reason) = transition.trigger.evaluate(ctx, clock) {
            let target = match transition.resolved.as_slice() {
                [] => continue,
                [only] => *only,
                many => many[ctx.rng.random_range(0..many.len())],
            };
            return Some(Fired {
                transition: index,
                target,
                reason,
            });
        }
    }
    None
}
