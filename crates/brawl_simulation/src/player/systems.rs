//! Player-only systems: input consumption, подбор и выпадение предметов, screen clamp

use bevy::prelude::*;

use crate::combat::{HealthChanged, PickupRequested};
use crate::components::{
    Character, Health, IntentTrigger, Pickup, PickupKind, PresentationIntents, ScreenBounds,
};

use super::{PlayerController, PlayerInput};

/// One-shot кнопки живут один tick
pub fn consume_player_input(input: Option<ResMut<PlayerInput>>) {
    let Some(mut input) = input else {
        return;
    };
    if input.jump_pressed || input.attack_pressed {
        input.jump_pressed = false;
        input.attack_pressed = false;
    }
}

/// PickupRequested → оружие в руки / heal от еды, предмет исчезает
pub fn collect_pickups(
    mut commands: Commands,
    mut requests: EventReader<PickupRequested>,
    items: Query<&Pickup>,
    mut players: Query<(&mut PlayerController, &mut Health, &mut PresentationIntents)>,
    mut health_events: EventWriter<HealthChanged>,
) {
    // despawn отложен до конца тика
    let mut taken: Vec<Entity> = Vec::new();

    for request in requests.read() {
        if items.get(request.item).is_err() || taken.contains(&request.item) {
            continue;
        }
        let Ok((mut controller, mut health, mut intents)) = players.get_mut(request.collector)
        else {
            continue;
        };

        match request.kind {
            PickupKind::Food { heal } => {
                let restored = health.heal(heal);
                health_events.write(HealthChanged {
                    entity: request.collector,
                    current: health.current,
                    max: health.max,
                });
                crate::log(&format!("🍗 Player healed +{} → {}/{}", restored, health.current, health.max));
            }
            weapon => {
                controller.equip(weapon);
                crate::log(&format!("🔪 Player picked up {:?}", weapon));
            }
        }

        intents.trigger(IntentTrigger::Pickup);
        commands.entity(request.item).despawn();
        taken.push(request.item);
    }
}

/// Выбитое оружие ложится на землю у ног игрока
pub fn drop_knocked_weapons(
    mut commands: Commands,
    mut players: Query<(&Character, &mut PlayerController)>,
) {
    for (character, mut controller) in players.iter_mut() {
        let Some(weapon) = controller.dropped_weapon.take() else {
            continue;
        };
        commands.spawn(Pickup {
            kind: weapon.as_pickup(),
            position: character.precise_position,
        });
        crate::log(&format!(
            "🔪 {:?} lies at ({:.0}, {:.0})",
            weapon, character.precise_position.x, character.precise_position.y
        ));
    }
}

/// Игрок не выходит за края камеры (после всех перемещений тика)
pub fn clamp_to_screen(
    screen: Res<ScreenBounds>,
    mut players: Query<(&mut Character, &PlayerController)>,
) {
    for (mut character, controller) in players.iter_mut() {
        let clamped = screen.clamp(character.precise_position, controller.config.screen_margin);
        if clamped == character.precise_position {
            continue;
        }
        if clamped.x != character.precise_position.x {
            character.velocity.x = 0.0;
        }
        if clamped.y != character.precise_position.y {
            character.velocity.y = 0.0;
        }
        character.precise_position = clamped;
    }
}
