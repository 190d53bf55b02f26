#![no_main]

use libfuzzer_sys::fuzz_target;
use silkcore::combat::{ContactMode, Damageable, Damager, Faction};
use silkcore::fsm::{Passive, StateMachine, StateName};
use silkcore::sim::{ActorId, ActorSetup, World};

const FACTIONS: [Faction; 3] = [Faction::Player, Faction::Enemy, Faction::Neutral];

fn idle() -> StateMachine<StateName> {
    StateMachine::builder(StateName::new("idle"))
        .state(StateName::new("idle"), Passive)
        .build()
        .unwrap()
}

// Every byte is one host call against a four-actor world.
fuzz_target!(|data: &[u8]| {
    let mut world = World::new(0);
    let ids: Vec<ActorId> = (0..4u8)
        .map(|i| {
            let faction = FACTIONS[usize::from(i) % 3];
            let mode = if i % 2 == 0 { ContactMode::OneShot } else { ContactMode::Continuous };
            world.spawn(
                ActorSetup::new(format!("a{i}"), idle())
                    .with_damager(Damager::new(u32::from(i) + 1, faction).with_mode(mode))
                    .with_damageable(
                        Damageable::new(20, FACTIONS[usize::from(i + 1) % 3])
                            .with_hurt_invulnerability(0.05),
                    ),
            )
        })
        .collect();

    for byte in data {
        let source = ids[usize::from(byte & 0b11)];
        let other = ids[usize::from((byte >> 2) & 0b11)];
        let _ = match byte >> 4 {
            0..=5 => world.on_contact_begin(source, other),
            6..=9 => world.on_contact_stay(source, other),
            10..=11 => world.add_electric_mark(other).map(|_| ()),
            12 => world.consume_electric_mark(other).map(|_| ()),
            13 => {
                world.on_frame_tick(0.016);
                Ok(())
            }
            _ => {
                world.on_fixed_tick(0.02);
                Ok(())
            }
        };
        for actor in world.actors() {
            if let Some(d) = actor.damageable() {
                assert!(d.current_hp() <= d.max_hp());
            }
        }
        let _ = world.drain_notifications();
    }
});
