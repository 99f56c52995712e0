//! Lifecycle: регистрация бойцов в roster и удаление мёртвых врагов

use bevy::prelude::*;

use crate::components::{ActorCategory, Character, CharacterState, CombatRoster};

/// Новые Character → CombatRoster
pub fn register_combatants(
    mut roster: ResMut<CombatRoster>,
    added: Query<(Entity, &Character), Added<Character>>,
) {
    for (entity, character) in added.iter() {
        roster.register(entity, character.category);
    }
}

/// Non-player Dead → despawn + unregister
///
/// Игрок в Dead остаётся (ждёт RespawnPlayer).
pub fn remove_dead_enemies(
    mut commands: Commands,
    mut roster: ResMut<CombatRoster>,
    characters: Query<(Entity, &Character)>,
) {
    for (entity, character) in characters.iter() {
        if character.state != CharacterState::Dead || character.category != ActorCategory::Enemy {
            continue;
        }

        roster.unregister(entity);
        commands.entity(entity).despawn();
        crate::log(&format!("🗑️ {:?} removed from simulation", entity));
    }
}
