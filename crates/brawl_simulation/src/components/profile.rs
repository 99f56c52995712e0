//! CharacterProfile — tuning общего конечного автомата
//!
//! Единицы: пиксели и секунды (pixel-art brawler, 60Hz fixed tick).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{require_positive, ConfigError};

#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct CharacterProfile {
    pub max_hp: u32,
    /// Гравитация для height оси (px/s²)
    pub gravity: f32,
    /// Сколько лежим на земле перед подъёмом
    pub duration_grounded: f32,
    /// Длительность flicker/fade перед Dead
    pub duration_dying: f32,
    pub duration_summersault: f32,
    /// Неуязвимость после подъёма
    pub getup_invincibility: f32,
    /// Core-owned fallback: максимум Hurt без сигнала AnimationEnded
    pub hurt_timeout: f32,
    /// Core-owned fallback: максимум Attacking без сигнала AnimationEnded
    pub attack_timeout: f32,
    /// Лёгкий knockback (px/s) и торможение (px/s²)
    pub hurt_push: f32,
    pub hurt_friction: f32,
    /// Knockdown: горизонтальный толчок и подброс
    pub knockdown_push: f32,
    pub knockdown_lift: f32,
    /// PowerEject: горизонтальный толчок и подброс
    pub eject_push: f32,
    pub eject_lift: f32,
    /// Плоская броня (вычитается из входящего урона)
    pub armor: u32,
    /// Flying → Summersaulting вместо Grounded (кувырок игрока)
    pub summersault_recovery: bool,
}

impl Default for CharacterProfile {
    fn default() -> Self {
        Self {
            max_hp: 20,
            gravity: 900.0,
            duration_grounded: 1.0,
            duration_dying: 1.0,
            duration_summersault: 0.4,
            getup_invincibility: 1.0,
            hurt_timeout: 0.6,
            attack_timeout: 1.2,
            hurt_push: 40.0,
            hurt_friction: 200.0,
            knockdown_push: 80.0,
            knockdown_lift: 220.0,
            eject_push: 220.0,
            eject_lift: 260.0,
            armor: 0,
            summersault_recovery: false,
        }
    }
}

impl CharacterProfile {
    /// Пресет игрока: больше HP, кувырок после PowerEject
    pub fn player() -> Self {
        Self {
            max_hp: 50,
            summersault_recovery: true,
            ..default()
        }
    }

    /// Пресет босса: много HP, броня, короче лежит
    pub fn boss(max_hp: u32, armor: u32) -> Self {
        Self {
            max_hp,
            armor,
            duration_grounded: 0.7,
            duration_dying: 1.5,
            ..default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("profile.max_hp", self.max_hp as f32)?;
        require_positive("profile.gravity", self.gravity)?;
        require_positive("profile.duration_grounded", self.duration_grounded)?;
        require_positive("profile.duration_dying", self.duration_dying)?;
        require_positive("profile.hurt_timeout", self.hurt_timeout)?;
        require_positive("profile.attack_timeout", self.attack_timeout)?;
        Ok(())
    }
}
