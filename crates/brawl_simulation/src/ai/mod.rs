//! AI module — non-player variant-ы поверх общего state machine
//!
//! Архитектура:
//! - GruntBrain: pursuit → prepare → strike, knife thrower, spawn staging
//! - BossBrain: attack-type selector (Strike / HeavyStrike / Charge), block phase, charge sweep
//! - оба реализуют `CombatBehavior`, решения исполняет `drive_behavior::<B>`
//!
//! AI никогда не трогает состояние игрока напрямую: только `TargetView`
//! и `receive_hit` (charge sweep).

use bevy::prelude::*;

pub mod boss;
pub mod grunt;
pub mod staging;
pub mod systems;

#[cfg(test)]
mod boss_tests;

// Re-export основных типов
pub use boss::{AttackWeight, BlockConfig, BossAttack, BossBrain, BossConfig, BossKind, ChargeRun};
pub use grunt::{GruntBrain, GruntConfig, KnifeConfig};
pub use staging::{choose_posture, StagingPosture};

use crate::behavior::{
    drive_behavior, react_to_attack_resolution, react_to_hits, MovementDecision, SimulationSet,
};
use crate::combat::systems::resolve_attack_frames;
use crate::player::PlayerController;

/// Шаг к точке с допуском; скорость не перескакивает цель за один tick
pub fn step_toward(
    position: Vec2,
    destination: Vec2,
    speed: Vec2,
    tolerance: Vec2,
    dt: f32,
) -> MovementDecision {
    let delta = destination - position;
    let axis = |d: f32, tol: f32, max: f32| {
        if d.abs() <= tol || dt <= 0.0 {
            0.0
        } else {
            (d / dt).clamp(-max, max)
        }
    };

    let velocity = Vec2::new(
        axis(delta.x, tolerance.x, speed.x),
        axis(delta.y, tolerance.y, speed.y),
    );
    if velocity == Vec2::ZERO {
        MovementDecision::Hold
    } else {
        MovementDecision::Step(velocity)
    }
}

/// Повернуться к точке (без изменения при совпадении x)
pub fn face_toward(facing_left: &mut bool, from: Vec2, to: Vec2) {
    if to.x < from.x {
        *facing_left = true;
    } else if to.x > from.x {
        *facing_left = false;
    }
}

/// AI Plugin
///
/// Decide: grunt → boss (после игрока, фиксированный порядок для RNG)
/// Resolve: charge sweep до hit-check
/// Reconcile: consistency check анимации боссов
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (drive_behavior::<GruntBrain>, drive_behavior::<BossBrain>)
                .chain()
                .after(drive_behavior::<PlayerController>)
                .in_set(SimulationSet::Decide),
        )
        .add_systems(
            FixedUpdate,
            systems::advance_boss_charges
                .before(resolve_attack_frames)
                .in_set(SimulationSet::Resolve),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::consume_thrown_knives,
                react_to_hits::<GruntBrain>,
                react_to_attack_resolution::<GruntBrain>,
                react_to_hits::<BossBrain>,
                react_to_attack_resolution::<BossBrain>,
            )
                .chain()
                .in_set(SimulationSet::React),
        )
        .add_systems(
            FixedUpdate,
            systems::reconcile_boss_animation.in_set(SimulationSet::Reconcile),
        );
    }
}
