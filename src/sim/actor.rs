//! Actors and their handles.

use rand::rngs::StdRng;
use serde::Serialize;

use crate::buff::MarkRegistry;
use crate::combat::{Damageable, Damager};
use crate::fsm::{ActorContext, ActorStatus, StateMachine, StateName};

use super::Notification;

/// Handle of an actor inside one [`super::World`].
///
/// Handles are never reused within a world, so a stale handle refers to a
/// despawned actor rather than a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActorId(pub usize);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to spawn an actor.
///
/// Capabilities are resolved here, once: an actor either has a damager /
/// damageable from spawn or never has one.
#[derive(Debug)]
pub struct ActorSetup {
    /// Display name, unique within a world by convention
    pub name: String,
    /// The actor's state machine, not yet entered
    pub machine: StateMachine<StateName>,
    /// Initial shared state
    pub status: ActorStatus,
    /// Damage-dealing capability
    pub damager: Option<Damager>,
    /// Damage-receiving capability
    pub damageable: Option<Damageable>,
}

impl ActorSetup {
    /// Creates a setup with no combat capabilities.
    pub fn new(name: impl Into<String>, machine: StateMachine<StateName>) -> Self {
        Self {
            name: name.into(),
            machine,
            status: ActorStatus::default(),
            damager: None,
            damageable: None,
        }
    }

    /// Attaches a damager.
    #[must_use]
    pub fn with_damager(mut self, damager: Damager) -> Self {
        self.damager = Some(damager);
        self
    }

    /// Attaches a damageable.
    #[must_use]
    pub fn with_damageable(mut self, damageable: Damageable) -> Self {
        self.damageable = Some(damageable);
        self
    }

    /// Replaces the initial status.
    #[must_use]
    pub fn with_status(mut self, status: ActorStatus) -> Self {
        self.status = status;
        self
    }
}

/// A live actor owned by a [`super::World`].
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    name: String,
    pub(crate) machine: StateMachine<StateName>,
    pub(crate) status: ActorStatus,
    pub(crate) damager: Option<Damager>,
    pub(crate) damageable: Option<Damageable>,
}

impl Actor {
    pub(crate) fn from_setup(id: ActorId, setup: ActorSetup) -> Self {
        Self {
            id,
            name: setup.name,
            machine: setup.machine,
            status: setup.status,
            damager: setup.damager,
            damageable: setup.damageable,
        }
    }

    /// Handle of this actor.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active state, if the machine has been entered.
    #[must_use]
    pub fn current_state(&self) -> Option<&StateName> {
        self.machine.current()
    }

    /// The state machine.
    #[must_use]
    pub const fn machine(&self) -> &StateMachine<StateName> {
        &self.machine
    }

    /// Shared state.
    #[must_use]
    pub const fn status(&self) -> &ActorStatus {
        &self.status
    }

    /// Shared state, mutably (flags, modifiers, facing).
    pub const fn status_mut(&mut self) -> &mut ActorStatus {
        &mut self.status
    }

    /// Damager, if any.
    #[must_use]
    pub const fn damager(&self) -> Option<&Damager> {
        self.damager.as_ref()
    }

    /// Damager, mutably.
    pub const fn damager_mut(&mut self) -> Option<&mut Damager> {
        self.damager.as_mut()
    }

    /// Damageable, if any.
    #[must_use]
    pub const fn damageable(&self) -> Option<&Damageable> {
        self.damageable.as_ref()
    }

    /// Damageable, mutably.
    pub const fn damageable_mut(&mut self) -> Option<&mut Damageable> {
        self.damageable.as_mut()
    }

    /// Splits the actor into its machine and a context over everything else.
    pub(crate) fn split<'a>(
        &'a mut self,
        marks: &'a mut MarkRegistry,
        rng: &'a mut StdRng,
        outbox: &'a mut Vec<Notification>,
    ) -> (&'a mut StateMachine<StateName>, ActorContext<'a>) {
        let Self {
            id,
            machine,
            status,
            damager,
            damageable,
            ..
        } = self;
        (
            machine,
            ActorContext {
                id: *id,
                status,
                damageable: damageable.as_mut(),
                damager: damager.as_mut(),
                marks,
                rng,
                outbox,
            },
        )
    }
}
