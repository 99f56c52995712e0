//! Level boundary: checkpoint staging, spawn helpers, respawn
//!
//! Level/checkpoint sequencing живёт вне ядра. Ядро принимает события
//! (`InitializeFromCheckpoint`, `ActivateFromCheckpoint`, `GarageDoorOpened`,
//! `ActivateBoss`, `RespawnPlayer`) и отвечает `EnemyDefeated`.

use bevy::prelude::*;

use crate::ai::{BossBrain, BossConfig, GruntBrain, GruntConfig};
use crate::behavior::SimulationSet;
use crate::combat::HealthChanged;
use crate::components::{
    ActorCategory, Character, CharacterProfile, CharacterState, CheckpointMember, CombatRoster,
    Health, Obstacle, Pickup, PickupKind,
};
use crate::player::{PlayerConfig, PlayerController};
use crate::presentation::{clear_presentation_triggers, PresentedAnimation};
use crate::spatial::refresh_collider_snapshot;
use crate::state::advance_character_states;


// ============================================================================
// Checkpoint layout
// ============================================================================

/// Разметка checkpoint для выбора staging грантов
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CheckpointLayout {
    /// Левый край камеры на момент spawn (за ним — BehindCamera)
    pub camera_left: f32,
    pub garage_markers: Vec<Vec2>,
    pub roof_markers: Vec<Vec2>,
    pub marker_radius: f32,
    /// Высота, с которой спрыгивают Roof гранты
    pub roof_height: f32,
    /// BehindCamera: насколько левее камеры прячется грант
    pub offscreen_margin: f32,
}

impl Default for CheckpointLayout {
    fn default() -> Self {
        Self {
            camera_left: 0.0,
            garage_markers: Vec::new(),
            roof_markers: Vec::new(),
            marker_radius: 16.0,
            roof_height: 48.0,
            offscreen_margin: 32.0,
        }
    }
}

// ============================================================================
// Level → core events
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeFromCheckpoint {
    pub checkpoint: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateFromCheckpoint {
    pub checkpoint: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarageDoorOpened {
    pub checkpoint: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateBoss {
    pub boss: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RespawnPlayer {
    pub position: Vec2,
}

// ============================================================================
// Spawn helpers
// ============================================================================

pub fn spawn_player(
    commands: &mut Commands,
    position: Vec2,
    profile: &CharacterProfile,
    config: &PlayerConfig,
) -> Entity {
    commands
        .spawn((
            Character::new(ActorCategory::Player, position),
            Health::new(profile.max_hp),
            profile.clone(),
            PlayerController::new(config.clone()),
            PresentedAnimation::default(),
        ))
        .id()
}

/// Грант; с `checkpoint` ждёт `InitializeFromCheckpoint` этого checkpoint
pub fn spawn_grunt(
    commands: &mut Commands,
    position: Vec2,
    profile: &CharacterProfile,
    config: &GruntConfig,
    checkpoint: Option<Entity>,
) -> Entity {
    let mut entity = commands.spawn((
        Character::new(ActorCategory::Enemy, position).with_facing_left(true),
        Health::new(profile.max_hp),
        profile.clone(),
        GruntBrain::new(*config, position),
        PresentedAnimation::default(),
    ));
    if let Some(checkpoint) = checkpoint {
        entity.insert(CheckpointMember(checkpoint));
    }
    entity.id()
}

/// Босс ждёт (WaitingForPlayer) до `ActivateBoss`
pub fn spawn_boss(commands: &mut Commands, position: Vec2, config: &BossConfig) -> Entity {
    let profile = CharacterProfile::boss(config.max_hp, config.armor);
    commands
        .spawn((
            Character::new(ActorCategory::Enemy, position)
                .with_state(CharacterState::WaitingForPlayer)
                .with_facing_left(true),
            Health::new(profile.max_hp),
            profile,
            BossBrain::new(config.clone()),
            PresentedAnimation::default(),
        ))
        .id()
}

pub fn spawn_obstacle(commands: &mut Commands, obstacle: Obstacle) -> Entity {
    commands.spawn(obstacle).id()
}

pub fn spawn_pickup(commands: &mut Commands, kind: PickupKind, position: Vec2) -> Entity {
    commands.spawn(Pickup { kind, position }).id()
}

pub fn spawn_checkpoint(commands: &mut Commands, layout: CheckpointLayout) -> Entity {
    commands.spawn(layout).id()
}

// ============================================================================
// Staging systems
// ============================================================================

/// InitializeFromCheckpoint → staging posture каждого гранта checkpoint
pub fn initialize_checkpoints(
    time: Res<Time<Fixed>>,
    mut events: EventReader<InitializeFromCheckpoint>,
    layouts: Query<&CheckpointLayout>,
    mut grunts: Query<(Entity, &mut Character, &mut GruntBrain, &CheckpointMember)>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        let Ok(layout) = layouts.get(event.checkpoint) else {
            crate::log_warning(&format!("⚠️ Unknown checkpoint {:?}", event.checkpoint));
            continue;
        };

        for (entity, mut character, mut brain, member) in grunts.iter_mut() {
            if member.0 != event.checkpoint {
                continue;
            }
            let posture = brain.stage(&mut character, layout, now);
            crate::log(&format!("🎬 {:?} staged as {:?}", entity, posture));
        }
    }
}

/// ActivateFromCheckpoint → ждущие гранты вступают в бой
pub fn activate_checkpoints(
    time: Res<Time<Fixed>>,
    mut events: EventReader<ActivateFromCheckpoint>,
    layouts: Query<&CheckpointLayout>,
    mut grunts: Query<(Entity, &mut Character, &mut GruntBrain, &CheckpointMember)>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        let Ok(layout) = layouts.get(event.checkpoint) else {
            continue;
        };

        for (entity, mut character, mut brain, member) in grunts.iter_mut() {
            if member.0 == event.checkpoint && brain.activate(&mut character, layout, now) {
                crate::log(&format!("🚶 {:?} activated ({:?})", entity, character.state));
            }
        }
    }
}

pub fn open_garage_doors(
    time: Res<Time<Fixed>>,
    mut events: EventReader<GarageDoorOpened>,
    mut grunts: Query<(&mut Character, &mut GruntBrain, &CheckpointMember)>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        for (mut character, mut brain, member) in grunts.iter_mut() {
            if member.0 == event.checkpoint {
                brain.open_door(&mut character, now);
            }
        }
    }
}

pub fn activate_bosses(
    time: Res<Time<Fixed>>,
    mut events: EventReader<ActivateBoss>,
    mut bosses: Query<(&mut Character, &mut BossBrain)>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        let Ok((mut character, mut brain)) = bosses.get_mut(event.boss) else {
            continue;
        };
        brain.engage();
        character.release(now);
        crate::log_info(&format!("👹 Boss {:?} ({:?}) engaged", event.boss, brain.kind()));
    }
}

/// RespawnPlayer: единственный выход игрока из Dead
pub fn respawn_players(
    time: Res<Time<Fixed>>,
    roster: Res<CombatRoster>,
    mut events: EventReader<RespawnPlayer>,
    mut players: Query<(&mut Character, &mut Health, &CharacterProfile)>,
    mut health_events: EventWriter<HealthChanged>,
) {
    let now = time.elapsed_secs();

    for event in events.read() {
        let Some(player) = roster.player else {
            continue;
        };
        let Ok((mut character, mut health, profile)) = players.get_mut(player) else {
            continue;
        };
        if character.state != CharacterState::Dead {
            crate::log_warning(&format!("⚠️ Respawn ignored: player is {:?}", character.state));
            continue;
        }

        character.respawn(event.position, &mut health, profile, now);
        health_events.write(HealthChanged {
            entity: player,
            current: health.current,
            max: health.max,
        });
        crate::log_info(&format!("🔄 Player respawned at {:?}", event.position));
    }
}

/// Level Plugin
///
/// Prepare: collider snapshot (после очистки triggers)
/// Staging: checkpoint → boss → respawn
/// StateMachine: общий tick всех персонажей
pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<InitializeFromCheckpoint>()
            .add_event::<ActivateFromCheckpoint>()
            .add_event::<GarageDoorOpened>()
            .add_event::<ActivateBoss>()
            .add_event::<RespawnPlayer>();

        app.add_systems(
            FixedUpdate,
            refresh_collider_snapshot
                .after(clear_presentation_triggers)
                .in_set(SimulationSet::Prepare),
        )
        .add_systems(
            FixedUpdate,
            (
                initialize_checkpoints,
                activate_checkpoints,
                open_garage_doors,
                activate_bosses,
                respawn_players,
            )
                .chain()
                .in_set(SimulationSet::Staging),
        )
        .add_systems(
            FixedUpdate,
            advance_character_states.in_set(SimulationSet::StateMachine),
        );
    }
}
