//! Player Combat Controller
//!
//! ECS ответственность:
//! - PlayerInput (resource) → решения через `CombatBehavior`
//! - combo bookkeeping и очки по AttackResolved
//! - подбор предметов, выпадение оружия при knockdown, screen clamp
//!
//! Input слой (клавиатура/геймпад) вне ядра: пишет `PlayerInput` перед tick.

use bevy::prelude::*;

pub mod config;
pub mod controller;
pub mod systems;


pub use config::{ComboStep, PlayerConfig};
pub use controller::{CarriedWeapon, ComboTracker, PlayerController, PlayerInput};

use crate::behavior::{drive_behavior, react_to_attack_resolution, react_to_hits, SimulationSet};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .add_systems(
                FixedUpdate,
                (
                    drive_behavior::<PlayerController>,
                    systems::consume_player_input,
                    systems::collect_pickups,
                )
                    .chain()
                    .in_set(SimulationSet::Decide),
            )
            .add_systems(
                FixedUpdate,
                (
                    react_to_hits::<PlayerController>,
                    systems::drop_knocked_weapons,
                    react_to_attack_resolution::<PlayerController>,
                )
                    .chain()
                    .in_set(SimulationSet::React),
            )
            .add_systems(
                FixedUpdate,
                systems::clamp_to_screen.in_set(SimulationSet::Reconcile),
            );
    }
}
