//! Combat integration test
//!
//! Полный headless App (SimulationPlugin + ScriptedPresentationPlugin):
//! - удары игрока проходят через presentation сигналы и hit-check
//! - инварианты HP / высоты держатся на длинном бою
//! - побеждённый враг проходит Falling → Grounded → Dying и исчезает
//! - knife thrower попадает снарядом

use bevy::prelude::*;
use brawl_simulation::combat::Projectile;
use brawl_simulation::presentation::ScriptedPresentationPlugin;
use brawl_simulation::*;

/// Helper: полный combat App со всеми plugins
fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, ScriptedPresentationPlugin));
    // Нулевой delta — fixed tick ещё не идёт
    app.update();
    app
}

fn spawn_default_player(app: &mut App, position: Vec2) -> Entity {
    let player = spawn_player(
        &mut app.world_mut().commands(),
        position,
        &CharacterProfile::player(),
        &PlayerConfig::default(),
    );
    app.world_mut().flush();
    player
}

fn spawn_street_grunt(app: &mut App, position: Vec2, profile: &CharacterProfile, config: &GruntConfig) -> Entity {
    let grunt = spawn_grunt(&mut app.world_mut().commands(), position, profile, config, None);
    app.world_mut().flush();
    grunt
}

fn health_of(app: &App, entity: Entity) -> Option<u32> {
    app.world().get::<Health>(entity).map(|h| h.current)
}

/// Test: jab игрока попадает по гранту через AttackFrameReached
#[test]
fn test_player_jab_lands_through_presentation_signals() {
    let mut app = create_combat_app(42);
    spawn_default_player(&mut app, Vec2::new(100.0, 20.0));
    let grunt = spawn_street_grunt(
        &mut app,
        Vec2::new(124.0, 20.0),
        &CharacterProfile::default(),
        &GruntConfig::default(),
    );

    app.world_mut().resource_mut::<PlayerInput>().attack_pressed = true;
    for _ in 0..30 {
        app.update();
    }

    let max = CharacterProfile::default().max_hp;
    let hp = health_of(&app, grunt).expect("grunt alive");
    assert!(hp < max, "jab должен был попасть (HP {})", hp);
    assert_eq!(hp, max - PlayerConfig::default().combo[0].damage);
}

/// Test: инварианты на длинном бою со стоящим игроком
#[test]
fn test_invariants_hold_over_long_fight() {
    let mut app = create_combat_app(7);
    let player = spawn_default_player(&mut app, Vec2::new(100.0, 30.0));
    spawn_street_grunt(&mut app, Vec2::new(220.0, 20.0), &CharacterProfile::default(), &GruntConfig::default());
    spawn_street_grunt(&mut app, Vec2::new(20.0, 40.0), &CharacterProfile::default(), &GruntConfig::default());

    let mut player_died = false;
    for tick in 0..1200 {
        app.update();

        let world = app.world_mut();
        let mut query = world.query::<(Entity, &Character, &Health)>();
        for (entity, character, health) in query.iter(world) {
            assert!(
                health.current <= health.max,
                "Tick {}: {:?} HP {} > max {}",
                tick,
                entity,
                health.current,
                health.max
            );
            if character.height > 0.0 {
                assert!(
                    character.state.is_airborne(),
                    "Tick {}: {:?} height {} in {:?}",
                    tick,
                    entity,
                    character.height,
                    character.state
                );
            }
            if entity == player {
                if player_died {
                    assert_eq!(character.state, CharacterState::Dead, "Dead terminal");
                }
                player_died |= character.state == CharacterState::Dead;
            }
        }
    }

    let max = CharacterProfile::player().max_hp;
    assert!(health_of(&app, player).is_some_and(|hp| hp < max), "гранты должны были попасть");

    log("✓ Combat integration test: 1200 ticks completed, invariants held");
}

/// Test: смертельный удар → враг удалён из мира и roster
#[test]
fn test_defeated_grunt_is_removed() {
    let mut app = create_combat_app(42);
    spawn_default_player(&mut app, Vec2::new(100.0, 20.0));
    let fragile = CharacterProfile {
        max_hp: 2,
        ..default()
    };
    let grunt = spawn_street_grunt(&mut app, Vec2::new(124.0, 20.0), &fragile, &GruntConfig::default());

    app.world_mut().resource_mut::<PlayerInput>().attack_pressed = true;

    let mut states = Vec::new();
    for _ in 0..400 {
        app.update();
        let Some(character) = app.world().get::<Character>(grunt) else {
            break;
        };
        if states.last() != Some(&character.state) {
            states.push(character.state);
        }
    }

    assert!(app.world().get_entity(grunt).is_err(), "Dead враг despawned");
    assert!(app.world().resource::<CombatRoster>().enemies.is_empty());

    // Dead живёт меньше тика: despawn в Cleanup того же тика
    let expected = [
        CharacterState::Falling,
        CharacterState::Grounded,
        CharacterState::Dying,
    ];
    let tail: Vec<_> = states
        .iter()
        .copied()
        .skip_while(|s| *s != CharacterState::Falling)
        .collect();
    assert_eq!(tail, expected, "путь смерти: {:?}", states);
}

/// Test: knife thrower бросает нож, снаряд попадает по игроку
#[test]
fn test_knife_thrower_hits_with_projectile() {
    let mut app = create_combat_app(3);
    let player = spawn_default_player(&mut app, Vec2::new(100.0, 20.0));
    let knife = KnifeConfig::default();
    let edge = ScreenBounds::default().right - knife.edge_margin;
    spawn_street_grunt(
        &mut app,
        Vec2::new(edge, 20.0),
        &CharacterProfile::default(),
        &GruntConfig::knife_thrower(knife),
    );

    let mut saw_projectile = false;
    for _ in 0..240 {
        app.update();
        let world = app.world_mut();
        saw_projectile |= world.query::<&Projectile>().iter(world).next().is_some();
    }

    assert!(saw_projectile, "нож должен был полететь");
    let max = CharacterProfile::player().max_hp;
    assert!(health_of(&app, player).is_some_and(|hp| hp <= max - knife.damage));
}
