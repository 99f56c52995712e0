//! Combat Resolution — общие правила обмена ударами
//!
//! ECS ответственность:
//! - Rules: уязвимость (через `Character::is_vulnerable`), броня, knockback, reach window
//! - Hit-check по сигналу "attack frame reached" от presentation слоя
//! - Снаряды (нож, пуля) как отдельные entity
//! - Events: HitLanded, HealthChanged, AttackResolved, ProjectileLaunched, DyingStarted, CharacterDied
//!
//! Presentation ответственность:
//! - тайминг кадра удара (AttackFrameReached) и конца анимации (AnimationEnded)

use bevy::prelude::*;

pub mod attack;
pub mod damage;
pub mod events;
pub mod systems;

#[cfg(test)]
mod damage_tests;

// Re-export основных типов
pub use attack::{AttackAction, AttackKind, AttackPlan};
pub use damage::{
    knockback_direction, mitigate, oscillate, score_for, CombatEvent, HitKind, HitOutcome,
    HitReport, ReachWindow,
};
pub use events::{
    AttackResolved, CharacterDied, DyingStarted, EnemyDefeated, FacingChanged, HealthChanged,
    HitLanded, PickupRequested, ProjectileLaunched, ScoreAwarded,
};
pub use systems::{deliver_hit, Projectile};

use crate::behavior::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (внутри общей цепочки SimulationSet):
/// 1. Prepare: register_combatants — новые бойцы → CombatRoster
/// 2. Resolve: resolve_attack_frames → advance_projectiles
/// 3. Cleanup: remove_dead_enemies — despawn Dead врагов
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<HealthChanged>()
            .add_event::<DyingStarted>()
            .add_event::<CharacterDied>()
            .add_event::<EnemyDefeated>()
            .add_event::<HitLanded>()
            .add_event::<AttackResolved>()
            .add_event::<ProjectileLaunched>()
            .add_event::<ScoreAwarded>()
            .add_event::<FacingChanged>()
            .add_event::<PickupRequested>();

        app.add_systems(
            FixedUpdate,
            systems::register_combatants.in_set(SimulationSet::Prepare),
        )
        .add_systems(
            FixedUpdate,
            (
                systems::resolve_attack_frames,
                systems::advance_projectiles,
            )
                .chain()
                .in_set(SimulationSet::Resolve),
        )
        .add_systems(
            FixedUpdate,
            systems::remove_dead_enemies.in_set(SimulationSet::Cleanup),
        );
    }
}
