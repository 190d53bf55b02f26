//! Headless scenario runner.
//!
//! Spawns every configured actor into a fresh [`World`], then runs the
//! configured number of steps. Each step reports that step's scripted
//! contacts, runs one fixed tick and one frame tick, and hands every
//! notification raised during the step to an observer.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::combat::ContactOutcome;
use crate::config::{ScriptedContact, SimulationConfig};
use crate::error::{ConfigError, SilkError};

use super::blueprint::{build_actor, seconds};
use super::{ActorId, Notification, World};

/// Overrides applied on top of a file's `simulation` settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Number of steps
    pub ticks: Option<u64>,
    /// Random seed
    pub seed: Option<u64>,
    /// Fixed timestep in seconds
    pub fixed_dt: Option<f32>,
    /// Frame timestep in seconds
    pub frame_dt: Option<f32>,
}

/// End-of-run state of one actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSummary {
    /// Actor name
    pub name: String,
    /// Active state
    pub state: Option<String>,
    /// Current HP, for damageable actors
    pub hp: Option<u32>,
    /// Soul meter
    pub soul: u32,
    /// ElectricMark layers held
    pub mark_layers: u32,
    /// Hits taken over the run
    pub hits_taken: u64,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Seed used
    pub seed: u64,
    /// Steps run
    pub steps: u64,
    /// Contacts that dealt damage
    pub damage_events: u64,
    /// HP removed across all hits
    pub total_damage: u64,
    /// Actors whose HP reached zero
    pub deaths: u64,
    /// State changes, including initial entries
    pub state_changes: u64,
    /// Buff applications, refreshes and removals
    pub buff_changes: u64,
    /// Rejected contacts by reason
    pub rejected_contacts: IndexMap<String, u64>,
    /// Actors in spawn order
    pub actors: Vec<ActorSummary>,
    /// Lightning chain across marked actors at the end of the run
    pub chain: Vec<(String, String)>,
}

impl RunSummary {
    fn record(&mut self, notification: &Notification) {
        match notification {
            Notification::DamageApplied { dealt, .. } => {
                self.damage_events += 1;
                self.total_damage += u64::from(*dealt);
            }
            Notification::StateChanged { .. } => self.state_changes += 1,
            Notification::BuffChanged { .. } => self.buff_changes += 1,
            Notification::ActorDied { .. } => self.deaths += 1,
        }
    }

    /// Total rejected contacts.
    #[must_use]
    pub fn rejected(&self) -> u64 {
        self.rejected_contacts.values().sum()
    }
}

struct ResolvedContact<'a> {
    script: &'a ScriptedContact,
    source: ActorId,
    other: ActorId,
}

/// Runs a scenario to completion.
///
/// `observe` receives every notification together with the step that
/// raised it; spawn-time notifications are reported at step 0.
///
/// # Errors
///
/// Returns [`SilkError::Config`] when an actor cannot be built or a contact
/// names an unknown actor, and [`SilkError::Sim`] if the world rejects a
/// contact report.
pub fn run_scenario(
    config: &SimulationConfig,
    options: &RunOptions,
    mut observe: impl FnMut(u64, &Notification),
) -> Result<RunSummary, SilkError> {
    let settings = &config.simulation;
    let seed = options.seed.unwrap_or(settings.seed);
    let steps = options.ticks.unwrap_or(settings.ticks);
    let fixed_dt = match options.fixed_dt {
        Some(dt) => dt,
        None => seconds(&settings.fixed_dt, "simulation.fixed_dt")?,
    };
    let frame_dt = match options.frame_dt {
        Some(dt) => dt,
        None => seconds(&settings.frame_dt, "simulation.frame_dt")?,
    };

    let mut world = World::new(seed).with_timer_cadence(settings.timer_cadence);
    let mut ids = IndexMap::with_capacity(config.actors.len());
    for actor in &config.actors {
        let id = world.spawn(build_actor(actor)?);
        ids.insert(actor.name.as_str(), id);
    }

    let lookup = |name: &str| {
        ids.get(name).copied().ok_or_else(|| ConfigError::InvalidValue {
            field: "contacts".to_string(),
            value: name.to_string(),
            expected: "the name of a configured actor".to_string(),
        })
    };
    let contacts = config
        .contacts
        .iter()
        .map(|c| {
            Ok(ResolvedContact {
                script: c,
                source: lookup(&c.damager)?,
                other: lookup(&c.target)?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    info!(seed, steps, actors = ids.len(), "scenario started");

    let mut summary = RunSummary {
        seed,
        steps,
        ..RunSummary::default()
    };
    for notification in world.drain_notifications() {
        summary.record(&notification);
        observe(0, &notification);
    }

    for step in 0..steps {
        for contact in &contacts {
            if contact.script.tick == step {
                world.on_contact_begin(contact.source, contact.other)?;
            } else if contact.script.stays_at(step) {
                world.on_contact_stay(contact.source, contact.other)?;
            }
        }

        world.on_fixed_tick(fixed_dt);
        for (_, outcome) in world.last_contacts() {
            if let ContactOutcome::Rejected(reason) = outcome {
                *summary
                    .rejected_contacts
                    .entry(reason.as_str().to_string())
                    .or_default() += 1;
            }
        }
        world.on_frame_tick(frame_dt);

        for notification in world.drain_notifications() {
            summary.record(&notification);
            observe(step, &notification);
        }
    }

    summary.actors = world
        .actors()
        .map(|actor| ActorSummary {
            name: actor.name().to_string(),
            state: actor.current_state().map(ToString::to_string),
            hp: actor.damageable().map(crate::combat::Damageable::current_hp),
            soul: actor.status().soul,
            mark_layers: actor
                .damageable()
                .map_or(0, |d| d.buffs().mark_layers()),
            hits_taken: actor.status().hits_taken(),
        })
        .collect();
    summary.chain = world
        .link_marked_targets()
        .into_iter()
        .filter_map(|link| {
            let from = world.actor(link.from)?.name().to_string();
            let to = world.actor(link.to)?.name().to_string();
            Some((from, to))
        })
        .collect();

    debug!(?summary, "scenario summary");
    info!(
        damage_events = summary.damage_events,
        deaths = summary.deaths,
        rejected = summary.rejected(),
        "scenario finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> SimulationConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    const DUEL: &str = r"
simulation:
  ticks: 10
  fixed_dt: 0.1
actors:
  - name: knight
    faction: player
    initial_state: idle
    damageable:
      max_hp: 5
    states:
      - name: idle
        transitions:
          - when: { type: on_hit }
            to: hurt
      - name: hurt
  - name: crawler
    faction: enemy
    initial_state: walk
    damager:
      damage: 2
    states:
      - name: walk
contacts:
  - tick: 2
    damager: crawler
    target: knight
";

    #[test]
    fn test_run_applies_scripted_contact() {
        let mut seen = Vec::new();
        let summary = run_scenario(&config(DUEL), &RunOptions::default(), |step, n| {
            seen.push((step, n.kind()));
        })
        .unwrap();

        assert_eq!(summary.steps, 10);
        assert_eq!(summary.damage_events, 1);
        assert_eq!(summary.total_damage, 2);
        assert_eq!(summary.actors[0].hp, Some(3));
        assert_eq!(summary.actors[0].state.as_deref(), Some("hurt"));
        assert!(seen.contains(&(2, "damage_applied")));
        assert_eq!(seen.iter().filter(|(s, k)| *s == 0 && *k == "state_changed").count(), 2);
    }

    #[test]
    fn test_run_counts_rejections() {
        let yaml = DUEL.replace("faction: player", "faction: enemy");
        let summary = run_scenario(&config(&yaml), &RunOptions::default(), |_, _| {}).unwrap();
        assert_eq!(summary.damage_events, 0);
        assert_eq!(summary.rejected_contacts.get("same_faction"), Some(&1));
    }

    #[test]
    fn test_run_options_override() {
        let options = RunOptions {
            ticks: Some(1),
            seed: Some(99),
            ..RunOptions::default()
        };
        let summary = run_scenario(&config(DUEL), &options, |_, _| {}).unwrap();
        assert_eq!(summary.steps, 1);
        assert_eq!(summary.seed, 99);
        assert_eq!(summary.damage_events, 0);
    }

    #[test]
    fn test_run_unknown_contact_actor() {
        let yaml = DUEL.replace("target: knight", "target: ghost");
        let result = run_scenario(&config(&yaml), &RunOptions::default(), |_, _| {});
        assert!(matches!(
            result,
            Err(SilkError::Config(ConfigError::InvalidValue { .. }))
        ));
    }
}
