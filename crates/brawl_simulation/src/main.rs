//! Headless демо боя
//!
//! Игрок на автопилоте против двух грантов checkpoint, затем против босса.
//! Анимации заменены `ScriptedPresentationPlugin`.

use bevy::prelude::*;
use brawl_simulation::level::{
    spawn_checkpoint, ActivateBoss, ActivateFromCheckpoint, InitializeFromCheckpoint,
};
use brawl_simulation::presentation::ScriptedPresentationPlugin;
use brawl_simulation::*;

/// Простой автопилот: подойти к ближайшему врагу и бить
fn autopilot(
    mut tick: Local<u32>,
    mut input: ResMut<PlayerInput>,
    players: Query<&Character, With<PlayerController>>,
    enemies: Query<&Character, Without<PlayerController>>,
) {
    *tick += 1;
    let Ok(player) = players.single() else {
        return;
    };

    let nearest = enemies
        .iter()
        .filter(|enemy| enemy.is_active() && enemy.state != CharacterState::WaitingForPlayer)
        .min_by(|a, b| {
            let da = a.precise_position.distance_squared(player.precise_position);
            let db = b.precise_position.distance_squared(player.precise_position);
            da.total_cmp(&db)
        });

    let Some(enemy) = nearest else {
        *input = PlayerInput::default();
        return;
    };

    let side = if enemy.precise_position.x < player.precise_position.x { 20.0 } else { -20.0 };
    let goal = Vec2::new(enemy.precise_position.x + side, enemy.precise_position.y);
    let delta = goal - player.precise_position;

    input.movement = Vec2::new(
        if delta.x.abs() > 2.0 { delta.x.signum() } else { 0.0 },
        if delta.y.abs() > 2.0 { delta.y.signum() } else { 0.0 },
    );
    input.attack_pressed = delta.x.abs() < 10.0 && delta.y.abs() < 4.0 && *tick % 12 == 0;
}

/// События ядра → лог (как это делал бы UI)
fn report_events(
    mut scores: EventReader<ScoreAwarded>,
    mut deaths: EventReader<CharacterDied>,
    mut hits: EventReader<HitLanded>,
) {
    for score in scores.read() {
        log(&format!("⭐ +{} points", score.points));
    }
    for hit in hits.read() {
        if hit.lethal {
            log_info(&format!("💥 Lethal hit on {:?}", hit.target));
        }
    }
    for death in deaths.read() {
        log_info(&format!("☠️ {:?} {:?} died", death.category, death.entity));
    }
}

fn main() {
    let seed = 42;
    println!("Starting brawl headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, ScriptedPresentationPlugin))
        .add_systems(FixedUpdate, autopilot.before(SimulationSet::Prepare))
        .add_systems(FixedUpdate, report_events.after(SimulationSet::Cleanup));

    let settings = app.world().resource::<SimulationSettings>().clone();
    let checkpoint = spawn_checkpoint(
        &mut app.world_mut().commands(),
        CheckpointLayout {
            camera_left: 40.0,
            ..default()
        },
    );
    let player = spawn_player(
        &mut app.world_mut().commands(),
        Vec2::new(80.0, 30.0),
        &settings.player_profile,
        &settings.player,
    );
    let grunts = [Vec2::new(200.0, 20.0), Vec2::new(20.0, 40.0)].map(|position| {
        spawn_grunt(
            &mut app.world_mut().commands(),
            position,
            &settings.enemy_profile,
            &settings.grunt,
            Some(checkpoint),
        )
    });
    let boss = spawn_boss(
        &mut app.world_mut().commands(),
        Vec2::new(260.0, 30.0),
        &settings.bruiser,
    );
    app.world_mut().flush();

    app.world_mut()
        .resource_mut::<Events<InitializeFromCheckpoint>>()
        .send(InitializeFromCheckpoint { checkpoint });

    let mut boss_engaged = false;
    for tick in 0..3600 {
        app.update();

        if tick == 30 {
            app.world_mut()
                .resource_mut::<Events<ActivateFromCheckpoint>>()
                .send(ActivateFromCheckpoint { checkpoint });
        }

        let grunts_left = grunts
            .iter()
            .filter(|grunt| app.world().get_entity(**grunt).is_ok())
            .count();
        if grunts_left == 0 && !boss_engaged {
            boss_engaged = true;
            app.world_mut()
                .resource_mut::<Events<ActivateBoss>>()
                .send(ActivateBoss { boss });
        }

        if tick % 300 == 0 {
            let hp = |entity| app.world().get::<Health>(entity).map(|h| h.current);
            println!(
                "Tick {}: player HP {:?}, grunts left {}, boss HP {:?}",
                tick,
                hp(player),
                grunts_left,
                hp(boss)
            );
        }

        let player_dead = app
            .world()
            .get::<Character>(player)
            .is_none_or(|c| c.state == CharacterState::Dead);
        if player_dead || app.world().get_entity(boss).is_err() {
            break;
        }
    }

    let winner = if app.world().get_entity(boss).is_err() { "player" } else { "enemies" };
    println!("Simulation complete! Winner: {}", winner);
}
