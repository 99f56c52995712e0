//! Spawn staging грантов: как враг появляется на checkpoint
//!
//! Street: ждёт на месте. BehindCamera: за левым краем камеры, на активации
//! возвращается на место спавна. Roof: спрыгивает с крыши. Garage: ждёт двери.

use bevy::prelude::*;

use crate::components::{Character, CharacterState};
use crate::level::CheckpointLayout;

use super::grunt::GruntBrain;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum StagingPosture {
    Street,
    BehindCamera,
    Roof,
    Garage,
}

/// Posture по позиции спавна относительно разметки checkpoint
///
/// Приоритет: garage → roof → behind camera → street.
pub fn choose_posture(spawn: Vec2, layout: &CheckpointLayout) -> StagingPosture {
    let near = |markers: &[Vec2]| {
        markers
            .iter()
            .any(|marker| marker.distance(spawn) <= layout.marker_radius)
    };

    if near(&layout.garage_markers) {
        StagingPosture::Garage
    } else if near(&layout.roof_markers) {
        StagingPosture::Roof
    } else if spawn.x < layout.camera_left {
        StagingPosture::BehindCamera
    } else {
        StagingPosture::Street
    }
}

impl GruntBrain {
    /// InitializeFromCheckpoint: выбрать posture и встать в ожидание
    pub fn stage(&mut self, me: &mut Character, layout: &CheckpointLayout, now: f32) -> StagingPosture {
        let posture = choose_posture(me.precise_position, layout);
        self.posture = Some(posture);
        self.home = me.precise_position;

        me.velocity = Vec2::ZERO;
        match posture {
            StagingPosture::Street | StagingPosture::Roof => {
                me.enter_state(CharacterState::WaitingForPlayer, now);
            }
            StagingPosture::BehindCamera => {
                me.precise_position.x = layout.camera_left - layout.offscreen_margin;
                me.enter_state(CharacterState::WaitingForPlayer, now);
            }
            StagingPosture::Garage => {
                me.enter_state(CharacterState::WaitingForDoor, now);
            }
        }

        posture
    }

    /// ActivateFromCheckpoint: выпустить ждущего гранта (garage ждёт дверь)
    pub fn activate(&mut self, me: &mut Character, layout: &CheckpointLayout, now: f32) -> bool {
        if me.state != CharacterState::WaitingForPlayer {
            return false;
        }

        match self.posture.unwrap_or(StagingPosture::Street) {
            StagingPosture::Street => me.release(now),
            StagingPosture::BehindCamera => {
                me.precise_position = self.home;
                me.release(now)
            }
            StagingPosture::Roof => {
                me.begin_drop(layout.roof_height, now);
                me.state == CharacterState::Dropping
            }
            StagingPosture::Garage => false,
        }
    }

    /// GarageDoorOpened
    pub fn open_door(&mut self, me: &mut Character, now: f32) -> bool {
        if self.posture != Some(StagingPosture::Garage) {
            return false;
        }
        me.release(now)
    }
}
