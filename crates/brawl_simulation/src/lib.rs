//! Brawl Simulation Core
//!
//! ECS-симуляция на Bevy 0.16 для side-scrolling brawler:
//! конечный автомат персонажа, боевые правила, AI грантов и боссов.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = simulation layer (состояния, таймеры, урон, решения AI)
//! - Presentation = движок (анимации, звук, UI) — общается только через
//!   события/компоненты из `presentation`, `level` и `combat::events`

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod behavior;
pub mod combat;
pub mod components;
pub mod config;
pub mod level;
pub mod logger;
pub mod player;
pub mod presentation;
pub mod spatial;
pub mod state;

// Re-export базовых типов для удобства
pub use ai::{
    AIPlugin, BossBrain, BossConfig, BossKind, GruntBrain, GruntConfig, KnifeConfig, StagingPosture,
};
pub use behavior::{CombatBehavior, SimulationSet};
pub use combat::{
    AttackKind, AttackPlan, CharacterDied, CombatEvent, CombatPlugin, DyingStarted, EnemyDefeated,
    HealthChanged, HitKind, HitLanded, HitOutcome, ScoreAwarded,
};
pub use components::*;
pub use config::{ConfigError, SimulationSettings};
pub use level::{spawn_boss, spawn_grunt, spawn_player, CheckpointLayout, LevelPlugin};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use player::{PlayerConfig, PlayerController, PlayerInput, PlayerPlugin};
pub use presentation::{AnimationEnded, AttackFrameReached, PresentationPlugin, PresentedAnimation};
pub use spatial::{ColliderSnapshot, MovementProbe};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<SimulationSettings>()
            .cloned()
            .unwrap_or_default();

        logger::set_log_level(settings.log_level);

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(settings.tick_hz))
            .insert_resource(settings)
            .init_resource::<CombatRoster>()
            .init_resource::<ScreenBounds>()
            .init_resource::<ColliderSnapshot>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Prepare,
                    SimulationSet::Staging,
                    SimulationSet::StateMachine,
                    SimulationSet::Decide,
                    SimulationSet::Resolve,
                    SimulationSet::React,
                    SimulationSet::Reconcile,
                    SimulationSet::Publish,
                    SimulationSet::Cleanup,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            )
            .add_plugins((
                PresentationPlugin,
                LevelPlugin,
                CombatPlugin,
                PlayerPlugin,
                AIPlugin,
            ));

        if !app.world().contains_resource::<DeterministicRng>() {
            let seed = app.world().resource::<SimulationSettings>().seed;
            app.insert_resource(DeterministicRng::new(seed));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Равномерная выборка из `[min, max)`; вырожденный диапазон → `min`
pub fn sample_range(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    if max <= min {
        min
    } else {
        rng.gen_range(min..max)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время продвигается вручную: каждый `app.update()` (после первого) — ровно
/// один fixed tick, поэтому тесты и демо не зависят от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let settings = SimulationSettings {
        seed,
        ..default()
    };
    let step = Duration::from_secs_f64(1.0 / settings.tick_hz);

    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .insert_resource(Time::<Fixed>::from_hz(settings.tick_hz))
        .insert_resource(settings);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
