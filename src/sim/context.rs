//! Explicit simulation context.
//!
//! Holds what would otherwise be process-wide singletons: the ElectricMark
//! registry, the random source and the simulation clock. Each [`super::World`]
//! owns exactly one, so independent simulations never share state.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::buff::MarkRegistry;
use crate::fsm::Cadence;

/// Tick counts and accumulated time per cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimClock {
    /// Fixed ticks processed
    pub fixed_ticks: u64,
    /// Frame ticks processed
    pub frame_ticks: u64,
    /// Seconds accumulated on the fixed cadence
    pub fixed_time: f64,
    /// Seconds accumulated on the frame cadence
    pub frame_time: f64,
}

/// Registries and random source shared by every actor of one world.
#[derive(Debug)]
pub struct SimulationContext {
    seed: u64,
    pub(crate) rng: StdRng,
    pub(crate) marks: MarkRegistry,
    clock: SimClock,
}

impl SimulationContext {
    /// Creates a context whose random source is seeded with `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            marks: MarkRegistry::new(),
            clock: SimClock::default(),
        }
    }

    /// The seed this context was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Actors currently carrying ElectricMark layers.
    #[must_use]
    pub const fn marks(&self) -> &MarkRegistry {
        &self.marks
    }

    /// The simulation clock.
    #[must_use]
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub(crate) fn advance(&mut self, cadence: Cadence, dt: f32) {
        let dt = f64::from(dt.max(0.0));
        match cadence {
            Cadence::Fixed => {
                self.clock.fixed_ticks += 1;
                self.clock.fixed_time += dt;
            }
            Cadence::Frame => {
                self.clock.frame_ticks += 1;
                self.clock.frame_time += dt;
            }
        }
    }
}

impl Default for SimulationContext {
    fn default() -> Self {
        Self::seeded(0)
    }
}
