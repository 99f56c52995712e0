//! Shared state tick (timers + per-state physics) для всех персонажей

use bevy::prelude::*;

use super::StateSignal;
use crate::combat::{CharacterDied, DyingStarted, EnemyDefeated};
use crate::components::{
    ActorCategory, Character, CharacterProfile, CheckpointMember, Health, IntentTrigger,
    PresentationIntents,
};
use crate::spatial::{ActorProbe, ColliderSnapshot};

/// Продвигает state machine каждого персонажа на один fixed tick
///
/// Публикует DyingStarted / CharacterDied / EnemyDefeated и presentation triggers.
pub fn advance_character_states(
    time: Res<Time<Fixed>>,
    snapshot: Res<ColliderSnapshot>,
    mut characters: Query<(
        Entity,
        &mut Character,
        &Health,
        &CharacterProfile,
        &mut PresentationIntents,
        Option<&CheckpointMember>,
    )>,
    mut dying_events: EventWriter<DyingStarted>,
    mut died_events: EventWriter<CharacterDied>,
    mut defeated_events: EventWriter<EnemyDefeated>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, mut character, health, profile, mut intents, member) in characters.iter_mut() {
        let probe = ActorProbe::new(&snapshot, entity, character.category);
        let signal = character.tick(health, profile, &probe, now, dt);

        match signal {
            StateSignal::None | StateSignal::Recovered => {}
            StateSignal::AttackCommitted(kind) => {
                intents.trigger(IntentTrigger::Attack(kind));
            }
            StateSignal::Landed => {
                intents.trigger(IntentTrigger::Landed);
            }
            StateSignal::GotUp => {
                intents.trigger(IntentTrigger::GetUp);
            }
            StateSignal::DyingStarted => {
                crate::log(&format!("💀 {:?} Grounded → Dying", entity));
                dying_events.write(DyingStarted { entity });
            }
            StateSignal::Died => {
                crate::log(&format!("☠️ {:?} Dying → Dead", entity));
                died_events.write(CharacterDied {
                    entity,
                    category: character.category,
                });
                if character.category == ActorCategory::Enemy {
                    defeated_events.write(EnemyDefeated {
                        entity,
                        checkpoint: member.map(|m| m.0),
                    });
                }
            }
        }
    }
}
