//! The host-facing simulation world.
//!
//! The host drives a [`World`] through four entry points:
//! [`World::on_fixed_tick`], [`World::on_frame_tick`],
//! [`World::on_contact_begin`] and [`World::on_contact_stay`]. Contacts are
//! only queued when reported; every tick of either cadence first drains the
//! queue in arrival order, then counts down timers, then ticks each actor's
//! state machine. A hit reported before a tick is therefore visible to
//! that same tick's triggers.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::buff::{BuffChange, BuffKind, ChainLink, StatProperty};
use crate::combat::resolver;
use crate::combat::{ContactOutcome, ContactPhase, RejectReason};
use crate::error::SimError;
use crate::fsm::{ActorContext, Cadence, StateChange, StateMachine, StateName};
use crate::observability::metrics;

use super::actor::{Actor, ActorId, ActorSetup};
use super::context::SimulationContext;
use super::notification::Notification;

/// A queued contact report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Begin or stay
    pub phase: ContactPhase,
    /// Actor whose damager is touching
    pub source: ActorId,
    /// Actor being touched
    pub other: ActorId,
}

/// All actors of one simulation plus their shared context.
#[derive(Debug)]
pub struct World {
    actors: Vec<Option<Actor>>,
    context: SimulationContext,
    contacts: VecDeque<Contact>,
    resolved: Vec<(Contact, ContactOutcome)>,
    outbox: Vec<Notification>,
    timer_cadence: Cadence,
}

impl World {
    /// Creates an empty world with a seeded random source.
    ///
    /// Invulnerability windows and buff countdowns advance on fixed ticks.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            actors: Vec::new(),
            context: SimulationContext::seeded(seed),
            contacts: VecDeque::new(),
            resolved: Vec::new(),
            outbox: Vec::new(),
            timer_cadence: Cadence::Fixed,
        }
    }

    /// Counts timers down on `cadence` instead of the fixed cadence.
    #[must_use]
    pub const fn with_timer_cadence(mut self, cadence: Cadence) -> Self {
        self.timer_cadence = cadence;
        self
    }

    /// The shared context.
    #[must_use]
    pub const fn context(&self) -> &SimulationContext {
        &self.context
    }

    // ------------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------------

    /// Spawns an actor and enters its initial state.
    pub fn spawn(&mut self, setup: ActorSetup) -> ActorId {
        let id = ActorId(self.actors.len());
        let mut actor = Actor::from_setup(id, setup);

        let (machine, mut ctx) = actor.split(
            &mut self.context.marks,
            &mut self.context.rng,
            &mut self.outbox,
        );
        let change = machine.enter(&mut ctx);
        publish_state_change(&mut self.outbox, id, change);

        info!(actor = %id, name = actor.name(), "actor spawned");
        self.actors.push(Some(actor));
        id
    }

    /// Removes an actor, dropping it from the ElectricMark registry.
    ///
    /// Contacts already queued for it are rejected when drained.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownActor`] if `id` is not live.
    pub fn despawn(&mut self, id: ActorId) -> Result<Actor, SimError> {
        let actor = self
            .actors
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| unknown(id))?;
        self.context.marks.unregister(id);
        info!(actor = %id, name = actor.name(), "actor despawned");
        Ok(actor)
    }

    /// Looks up a live actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0).and_then(Option::as_ref)
    }

    /// Looks up a live actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Finds the first live actor with `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<ActorId> {
        self.actors().find(|a| a.name() == name).map(Actor::id)
    }

    /// Live actors in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> + '_ {
        self.actors.iter().flatten()
    }

    /// Number of live actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors().count()
    }

    /// Whether no actor is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forces `id` into `state`, restarting it if already active.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownActor`] for a dead handle and
    /// [`SimError::Fsm`] when `state` is not one of the actor's states.
    pub fn transition_actor(&mut self, id: ActorId, state: &str) -> Result<(), SimError> {
        let key = StateName::new(state);
        let change = self.with_actor(id, |machine, ctx| {
            machine.transition_to(&key, "forced transition", ctx)
        })??;
        publish_state_change(&mut self.outbox, id, change);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Host entry points
    // ------------------------------------------------------------------------

    /// Queues a contact-begin between `source`'s damager and `other`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownActor`] if either handle is not live.
    pub fn on_contact_begin(&mut self, source: ActorId, other: ActorId) -> Result<(), SimError> {
        self.queue_contact(ContactPhase::Begin, source, other)
    }

    /// Queues a contact-stay between `source`'s damager and `other`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownActor`] if either handle is not live.
    pub fn on_contact_stay(&mut self, source: ActorId, other: ActorId) -> Result<(), SimError> {
        self.queue_contact(ContactPhase::Stay, source, other)
    }

    /// Runs one fixed-timestep tick.
    pub fn on_fixed_tick(&mut self, dt: f32) {
        self.tick(Cadence::Fixed, dt);
    }

    /// Runs one variable-timestep tick.
    pub fn on_frame_tick(&mut self, dt: f32) {
        self.tick(Cadence::Frame, dt);
    }

    /// Takes every notification raised since the last drain.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    /// Contacts resolved by the most recent tick, with their outcomes.
    #[must_use]
    pub fn last_contacts(&self) -> &[(Contact, ContactOutcome)] {
        &self.resolved
    }

    /// Number of contacts waiting for the next tick.
    #[must_use]
    pub fn pending_contacts(&self) -> usize {
        self.contacts.len()
    }

    // ------------------------------------------------------------------------
    // Buffs
    // ------------------------------------------------------------------------

    /// Adds one ElectricMark layer to `target`. Returns the new layer count.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] or [`SimError::MissingComponent`] when the
    /// target has no damageable.
    pub fn add_electric_mark(&mut self, target: ActorId) -> Result<u32, SimError> {
        self.require_damageable(target)?;
        self.with_actor(target, |_, ctx| ctx.add_electric_mark().unwrap_or(0))
    }

    /// Takes all ElectricMark layers from `target` and deregisters it.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] if `target` is not live.
    pub fn consume_electric_mark(&mut self, target: ActorId) -> Result<u32, SimError> {
        self.with_actor(target, |_, ctx| ctx.consume_electric_mark())
    }

    /// Lightning chain across every marked actor, in marking order.
    #[must_use]
    pub fn link_marked_targets(&self) -> Vec<ChainLink> {
        self.context.marks.link_targets()
    }

    /// Applies or refreshes a SpeedUp on `target`.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] or [`SimError::MissingComponent`].
    pub fn apply_speed_up(
        &mut self,
        target: ActorId,
        multiplier: f32,
        seconds: f32,
    ) -> Result<bool, SimError> {
        self.require_damageable(target)?;
        self.with_actor(target, |_, ctx| ctx.apply_speed_up(multiplier, seconds))
    }

    /// Applies or refreshes a SoulStatus on `target`.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] or [`SimError::MissingComponent`].
    pub fn apply_soul_status(
        &mut self,
        target: ActorId,
        soul_bonus: u32,
        seconds: f32,
    ) -> Result<bool, SimError> {
        self.require_damageable(target)?;
        self.with_actor(target, |_, ctx| ctx.apply_soul_status(soul_bonus, seconds))
    }

    /// Removes a buff from `target`. Removing an absent buff returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] if `target` is not live.
    pub fn remove_buff(&mut self, target: ActorId, kind: BuffKind) -> Result<bool, SimError> {
        self.with_actor(target, |_, ctx| ctx.remove_buff(kind))
    }

    /// Opens (or resets) `target`'s invulnerability window.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActor`] or [`SimError::MissingComponent`].
    pub fn enable_invulnerability(&mut self, target: ActorId, seconds: f32) -> Result<(), SimError> {
        self.require_damageable(target)?;
        self.with_actor(target, |_, ctx| {
            ctx.enable_invulnerability(seconds);
        })
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn with_actor<R>(
        &mut self,
        id: ActorId,
        f: impl FnOnce(&mut StateMachine<StateName>, &mut ActorContext<'_>) -> R,
    ) -> Result<R, SimError> {
        let actor = self
            .actors
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| unknown(id))?;
        let (machine, mut ctx) = actor.split(
            &mut self.context.marks,
            &mut self.context.rng,
            &mut self.outbox,
        );
        Ok(f(machine, &mut ctx))
    }

    fn require_damageable(&self, id: ActorId) -> Result<(), SimError> {
        let actor = self.actor(id).ok_or_else(|| unknown(id))?;
        if actor.damageable().is_none() {
            return Err(SimError::MissingComponent {
                actor: id.to_string(),
                component: "damageable",
            });
        }
        Ok(())
    }

    fn queue_contact(
        &mut self,
        phase: ContactPhase,
        source: ActorId,
        other: ActorId,
    ) -> Result<(), SimError> {
        for id in [source, other] {
            if self.actor(id).is_none() {
                return Err(unknown(id));
            }
        }
        self.contacts.push_back(Contact {
            phase,
            source,
            other,
        });
        Ok(())
    }

    fn tick(&mut self, cadence: Cadence, dt: f32) {
        self.context.advance(cadence, dt);
        self.drain_contacts();
        if cadence == self.timer_cadence {
            self.tick_timers(dt);
        }
        self.tick_machines(cadence, dt);
    }

    fn drain_contacts(&mut self) {
        self.resolved.clear();
        while let Some(contact) = self.contacts.pop_front() {
            let outcome = self.apply_contact(contact);
            if let ContactOutcome::Rejected(reason) = outcome {
                debug!(
                    source = %contact.source,
                    other = %contact.other,
                    reason = %reason,
                    "contact rejected"
                );
                metrics::record_contact_rejected(reason);
            }
            self.resolved.push((contact, outcome));
        }
    }

    fn apply_contact(&mut self, contact: Contact) -> ContactOutcome {
        let Contact {
            phase,
            source,
            other,
        } = contact;
        if source == other {
            return ContactOutcome::Rejected(RejectReason::SelfContact);
        }
        let Ok([Some(attacker), Some(target)]) = self.actors.get_disjoint_mut([source.0, other.0])
        else {
            return ContactOutcome::Rejected(RejectReason::Despawned);
        };
        let Some(damager) = attacker.damager.as_mut() else {
            return ContactOutcome::Rejected(RejectReason::NotDamager);
        };

        let attack_bonus = attacker.status.modifiers.whole(StatProperty::Attack);
        let outcome = resolver::resolve(phase, damager, attack_bonus, target.damageable.as_mut());
        let ContactOutcome::Applied(report) = outcome else {
            return outcome;
        };
        let soul_per_hit = damager.soul_per_hit;
        let marks_on_hit = damager.marks_on_hit;

        self.outbox.push(Notification::DamageApplied {
            damager: source,
            damageable: other,
            amount: report.amount,
            dealt: report.dealt,
            hp_before: report.hp_before,
            hp_after: report.hp_after,
        });
        metrics::record_damage_applied(report.dealt);
        debug!(
            damager = %source,
            damageable = %other,
            amount = report.amount,
            hp_after = report.hp_after,
            "damage applied"
        );

        // victim side
        target.status.record_hit();
        let hurt_soul = target.status.modifiers.whole(StatProperty::HurtSoul);
        target.status.gain_soul(hurt_soul);
        if marks_on_hit > 0 {
            let (_, mut ctx) = target.split(
                &mut self.context.marks,
                &mut self.context.rng,
                &mut self.outbox,
            );
            for _ in 0..marks_on_hit {
                ctx.add_electric_mark();
            }
        }

        // attacker side
        let soul_bonus = attacker
            .damageable
            .as_ref()
            .map_or(0, |d| d.buffs().soul_bonus());
        let gain = soul_per_hit
            .saturating_add(attacker.status.modifiers.whole(StatProperty::AttackSoul))
            .saturating_add(soul_bonus);
        attacker.status.gain_soul(gain);

        if report.killed {
            info!(actor = %other, killer = %source, "actor died");
            metrics::record_actor_death();
            self.outbox.push(Notification::ActorDied {
                actor: other,
                killer: Some(source),
            });
        }
        outcome
    }

    fn tick_timers(&mut self, dt: f32) {
        for actor in self.actors.iter_mut().flatten() {
            let id = actor.id();
            let Some(damageable) = actor.damageable.as_mut() else {
                continue;
            };
            if damageable.tick(dt) {
                debug!(actor = %id, "invulnerability ended");
            }
            for buff in damageable.buffs_mut().tick(dt) {
                debug!(actor = %id, buff = %buff, "buff expired");
                self.outbox.push(Notification::BuffChanged {
                    target: id,
                    buff,
                    change: BuffChange::Removed,
                });
            }
        }
    }

    fn tick_machines(&mut self, cadence: Cadence, dt: f32) {
        let SimulationContext { rng, marks, .. } = &mut self.context;
        for actor in self.actors.iter_mut().flatten() {
            let id = actor.id();
            let (machine, mut ctx) = actor.split(marks, rng, &mut self.outbox);
            if let Some(change) = machine.tick(cadence, dt, &mut ctx) {
                publish_state_change(&mut self.outbox, id, change);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(0)
    }
}

fn unknown(id: ActorId) -> SimError {
    SimError::UnknownActor(id.to_string())
}

fn publish_state_change(
    outbox: &mut Vec<Notification>,
    actor: ActorId,
    change: StateChange<StateName>,
) {
    metrics::record_state_transition();
    info!(
        actor = %actor,
        from = change.from.as_ref().map(StateName::as_str),
        to = %change.to,
        "state changed"
    );
    outbox.push(Notification::StateChanged {
        actor,
        from: change.from.map(|s| s.0),
        to: change.to.0,
        reason: change.reason,
    });
}
