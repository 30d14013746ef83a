//! Run lifecycle through the [`Arena`] facade: experience, level-ups, upgrade
//! choices, pause/resume, reset, and reproducibility.

use bevy::prelude::*;
use survivor_arena::actor::Archetype;
use survivor_arena::arena::{Arena, TickInput};
use survivor_arena::body::{ArenaEntity, Position};
use survivor_arena::combat::CombatEvent;
use survivor_arena::config::{ArenaConfig, WaveEntry};
use survivor_arena::error::ArenaError;
use survivor_arena::player::{Player, StatMultipliers};
use survivor_arena::progression::{offer_pool, Progression, RewardPickup, UpgradeOffer};
use survivor_arena::state::RunPhase;
use survivor_arena::weapons::{Arsenal, WeaponRegistry};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn quiet_arena() -> Arena {
    let mut config = ArenaConfig::default();
    config.waves = vec![WaveEntry::new(0, 1000, &[Archetype::Basic], 0)];
    let mut arena =
        Arena::new(config, WeaponRegistry::builtin(), Some(21)).expect("quiet arena builds");
    arena.world_mut().resource_mut::<Arsenal>().clear();
    arena
}

/// Drop a pickup on the player so it is collected on the next tick.
fn drop_reward(arena: &mut Arena, value: f32) {
    arena.world_mut().spawn((
        ArenaEntity,
        RewardPickup { value },
        Position(Vec2::splat(1500.0)),
    ));
}

fn step(arena: &mut Arena) {
    arena.step(TickInput::default());
}

fn progression(arena: &Arena) -> Progression {
    arena.world().resource::<Progression>().clone()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn unauthenticated_players_earn_half_experience() {
    let mut arena = quiet_arena();
    drop_reward(&mut arena, 4.0);
    step(&mut arena);
    assert_eq!(progression(&arena).xp, 2.0);

    arena.set_authenticated(true);
    drop_reward(&mut arena, 4.0);
    step(&mut arena);
    assert_eq!(progression(&arena).xp, 6.0);
    assert!(arena.snapshot().pickups.is_empty());
}

#[test]
fn level_up_pauses_until_an_offer_is_chosen() {
    let mut arena = quiet_arena();
    drop_reward(&mut arena, 24.0);
    step(&mut arena);

    let p = progression(&arena);
    assert_eq!(p.xp, 2.0);
    assert_eq!(p.threshold, 15.0);
    assert_eq!(p.offers.len(), 3);
    assert_eq!(arena.phase(), RunPhase::Upgrade);
    assert!(arena
        .drain_events()
        .contains(&CombatEvent::LevelUp { level: 2 }));

    for _ in 0..5 {
        step(&mut arena);
    }
    assert_eq!(arena.snapshot().frame, 1, "simulation frozen while choosing");
    assert!(!arena.pause(), "cannot pause during a level-up");

    let chosen = arena.choose_upgrade(0).expect("offer 0 exists");
    assert!(matches!(chosen, UpgradeOffer::Weapon { next_level: 1, .. }));
    let p = progression(&arena);
    assert_eq!(p.level, 2);
    assert!(p.offers.is_empty());
    assert_eq!(arena.phase(), RunPhase::Playing);
    assert_eq!(arena.world().resource::<Arsenal>().weapons.len(), 1);

    step(&mut arena);
    assert_eq!(arena.snapshot().frame, 2);
}

#[test]
fn surplus_experience_levels_again_after_the_choice() {
    let mut arena = quiet_arena();
    arena.set_authenticated(true);
    drop_reward(&mut arena, 60.0);
    step(&mut arena);
    assert_eq!(progression(&arena).xp, 50.0);
    assert_eq!(arena.phase(), RunPhase::Upgrade);

    arena.choose_upgrade(1).expect("offer 1 exists");
    step(&mut arena);
    let p = progression(&arena);
    assert_eq!(p.xp, 35.0);
    assert_eq!(p.threshold, 23.0);
    assert_eq!(arena.phase(), RunPhase::Upgrade);
}

#[test]
fn exhausted_offer_pool_levels_without_pausing() {
    let registry = WeaponRegistry::builtin();
    let mut content = registry
        .get(registry.find("content").expect("content"))
        .expect("content def")
        .clone();
    content.max_level = Some(1);
    let mut config = ArenaConfig::default();
    config.waves = vec![WaveEntry::new(0, 1000, &[Archetype::Basic], 0)];
    let mut arena = Arena::new(config, WeaponRegistry::new(vec![content]), Some(21))
        .expect("single-weapon arena builds");

    drop_reward(&mut arena, 24.0);
    step(&mut arena);
    let p = progression(&arena);
    assert_eq!(p.level, 2);
    assert_eq!(p.xp, 2.0);
    assert_eq!(p.threshold, 15.0);
    assert!(p.offers.is_empty());
    assert_eq!(arena.phase(), RunPhase::Playing);
    assert!(arena
        .drain_events()
        .contains(&CombatEvent::LevelUp { level: 2 }));
    assert_eq!(arena.choose_upgrade(0), Err(ArenaError::NotAwaitingUpgrade));

    for _ in 0..10 {
        step(&mut arena);
    }
    assert_eq!(arena.snapshot().frame, 11, "the run keeps advancing");
}

#[test]
fn upgrade_errors_leave_the_run_untouched() {
    let mut arena = quiet_arena();
    assert_eq!(arena.choose_upgrade(0), Err(ArenaError::NotAwaitingUpgrade));

    drop_reward(&mut arena, 20.0);
    step(&mut arena);
    assert_eq!(
        arena.choose_upgrade(7),
        Err(ArenaError::UpgradeIndexOutOfRange {
            index: 7,
            offered: 3
        })
    );
    assert_eq!(progression(&arena).level, 1);
    assert_eq!(arena.phase(), RunPhase::Upgrade);
}

#[test]
fn synergy_choice_is_idempotent() {
    let mut arena = quiet_arena();
    let registry = WeaponRegistry::builtin();
    {
        let mut arsenal = arena.world_mut().resource_mut::<Arsenal>();
        arsenal.grant(registry.find("content").expect("content"));
        arsenal.grant(registry.find("viral").expect("viral"));
    }
    let synergy = {
        let arsenal = arena.world().resource::<Arsenal>().clone();
        offer_pool(&registry, &arsenal)
            .into_iter()
            .find(|o| matches!(o, UpgradeOffer::Synergy { .. }))
            .expect("one locked pair")
    };

    for round in 0..2 {
        arena.world_mut().resource_mut::<Progression>().offers = vec![synergy.clone()];
        arena
            .world_mut()
            .resource_mut::<NextState<RunPhase>>()
            .set(RunPhase::Upgrade);
        step(&mut arena);
        arena.drain_events();

        arena.choose_upgrade(0).expect("synergy applies");
        let unlocked = arena
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::SynergyUnlocked { .. }))
            .count();
        assert_eq!(unlocked, if round == 0 { 1 } else { 0 });
        assert_eq!(arena.world().resource::<Arsenal>().synergies.len(), 1);
    }
    assert_eq!(
        arena.snapshot().synergies,
        vec![("content".to_string(), "viral".to_string())]
    );
}

#[test]
fn pause_and_resume_gate_the_tick() {
    let mut arena = quiet_arena();
    step(&mut arena);
    assert!(arena.pause());
    assert_eq!(arena.phase(), RunPhase::Paused);
    for _ in 0..4 {
        step(&mut arena);
    }
    assert_eq!(arena.snapshot().frame, 1);
    assert!(!arena.pause());
    assert!(arena.resume());
    step(&mut arena);
    assert_eq!(arena.snapshot().frame, 2);
}

#[test]
fn reset_restores_a_fresh_run() {
    let mut arena = Arena::new(ArenaConfig::default(), WeaponRegistry::builtin(), Some(5))
        .expect("default arena builds");
    for _ in 0..200 {
        arena.step(TickInput {
            movement: Vec2::new(1.0, 0.3),
            facing: 0.0,
        });
        if arena.phase() == RunPhase::Upgrade {
            arena.choose_upgrade(0).expect("offer 0 exists");
        }
    }
    {
        let world = arena.world_mut();
        world.resource_mut::<StatMultipliers>().damage = 3.0;
        world.resource_mut::<Progression>().xp = 9.0;
    }

    arena.reset().expect("reset succeeds");
    let snapshot = arena.snapshot();
    assert_eq!(snapshot.phase, RunPhase::Playing);
    assert_eq!(snapshot.frame, 0);
    assert_eq!(snapshot.seconds, 0);
    assert!(snapshot.actors.is_empty());
    assert!(snapshot.projectiles.is_empty());
    assert!(snapshot.pickups.is_empty());
    assert!(snapshot.hostile_bolts.is_empty());
    assert!(snapshot.synergies.is_empty());
    assert_eq!(snapshot.multipliers, StatMultipliers::default());
    assert_eq!(snapshot.progression.level, 1);
    assert_eq!(snapshot.progression.xp, 0.0);
    assert_eq!(snapshot.progression.threshold, 10.0);
    assert_eq!(snapshot.weapons.len(), 1);
    assert_eq!(snapshot.weapons[0].key, "content");
    assert_eq!(snapshot.weapons[0].level, 1);

    let mut q = arena.world_mut().query::<&Player>();
    let players: Vec<Player> = q.iter(arena.world()).cloned().collect();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].position, Vec2::splat(1500.0));
    assert_eq!(players[0].hp, 100.0);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut arena = Arena::new(ArenaConfig::default(), WeaponRegistry::builtin(), Some(99))
            .expect("default arena builds");
        for tick in 0..400u32 {
            let heading = tick as f32 * 0.02;
            arena.step(TickInput {
                movement: Vec2::new(heading.cos(), heading.sin()),
                facing: heading,
            });
            if arena.phase() == RunPhase::Upgrade {
                arena.choose_upgrade(0).expect("offer 0 exists");
            }
        }
        arena.snapshot()
    };
    assert_eq!(run(), run());
}
