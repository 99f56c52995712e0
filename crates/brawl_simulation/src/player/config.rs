//! Player tuning (serde, Default пресет)

use serde::{Deserialize, Serialize};

use crate::combat::AttackKind;
use crate::config::{require_positive, ConfigError};

/// Шаг combo-серии
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboStep {
    pub kind: AttackKind,
    pub damage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Скорость по горизонтали (px/s)
    pub walk_speed: f32,
    /// Скорость по глубине (px/s)
    pub depth_speed: f32,
    pub jump_lift: f32,
    /// Горизонтальная скорость прыжка (фиксируется на взлёте)
    pub jump_speed: f32,
    /// Серия ударов; последний шаг — power attack (PowerEject)
    pub combo: Vec<ComboStep>,
    /// Сколько ждём следующего попадания до сброса серии
    pub combo_window: f32,
    pub jump_kick_damage: u32,
    pub reach_forward: f32,
    pub reach_depth: f32,
    pub reach_height: f32,
    /// Feet probe для подбора предметов
    pub pickup_reach_x: f32,
    pub pickup_reach_depth: f32,
    pub knife_damage: u32,
    pub knife_speed: f32,
    pub throw_cooldown: f32,
    pub bullet_damage: u32,
    pub bullet_speed: f32,
    pub fire_cooldown: f32,
    /// Отступ от края экрана
    pub screen_margin: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 90.0,
            depth_speed: 50.0,
            jump_lift: 260.0,
            jump_speed: 80.0,
            combo: vec![
                ComboStep {
                    kind: AttackKind::Jab,
                    damage: 2,
                },
                ComboStep {
                    kind: AttackKind::Jab,
                    damage: 2,
                },
                ComboStep {
                    kind: AttackKind::Hook,
                    damage: 3,
                },
                ComboStep {
                    kind: AttackKind::Kick,
                    damage: 3,
                },
                ComboStep {
                    kind: AttackKind::Uppercut,
                    damage: 5,
                },
            ],
            combo_window: 0.8,
            jump_kick_damage: 4,
            reach_forward: 28.0,
            reach_depth: 8.0,
            reach_height: 16.0,
            pickup_reach_x: 10.0,
            pickup_reach_depth: 6.0,
            knife_damage: 6,
            knife_speed: 240.0,
            throw_cooldown: 0.4,
            bullet_damage: 8,
            bullet_speed: 400.0,
            fire_cooldown: 0.3,
            screen_margin: 12.0,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.combo.is_empty() {
            return Err(ConfigError::EmptySelector {
                field: "player.combo",
            });
        }
        require_positive("player.walk_speed", self.walk_speed)?;
        require_positive("player.jump_lift", self.jump_lift)?;
        require_positive("player.combo_window", self.combo_window)?;
        require_positive("player.reach_forward", self.reach_forward)?;
        require_positive("player.knife_speed", self.knife_speed)?;
        require_positive("player.bullet_speed", self.bullet_speed)?;
        Ok(())
    }
}
