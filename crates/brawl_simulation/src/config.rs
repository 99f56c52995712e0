//! Simulation settings и валидация tuning пресетов
//!
//! Все tuning структуры (`CharacterProfile`, `PlayerConfig`, `GruntConfig`,
//! `BossConfig`) — serde-сериализуемые, с `Default` пресетами.
//! `SimulationSettings` собирает их в один документ, который level loader
//! может передать как JSON.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{BossConfig, GruntConfig};
use crate::components::CharacterProfile;
use crate::logger::LogLevel;
use crate::player::PlayerConfig;

/// Ошибка валидации конфигурации
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field}: range min ({min}) is greater than max ({max})")]
    InvertedRange { field: &'static str, min: f32, max: f32 },

    #[error("{field}: expected a positive value, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field}: selector needs at least one attack with positive weight")]
    EmptySelector { field: &'static str },

    #[error("malformed settings document: {0}")]
    Malformed(String),
}

/// Проверка `value > 0`
pub fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Проверка `min <= max` (для sampled таймеров)
pub fn require_range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

/// Глобальные настройки симуляции (resource)
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Частота fixed tick (Hz)
    pub tick_hz: f64,
    /// Seed для DeterministicRng
    pub seed: u64,
    pub log_level: LogLevel,
    pub player_profile: CharacterProfile,
    pub enemy_profile: CharacterProfile,
    pub player: PlayerConfig,
    pub grunt: GruntConfig,
    pub bruiser: BossConfig,
    pub enforcer: BossConfig,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            log_level: LogLevel::Info,
            player_profile: CharacterProfile::player(),
            enemy_profile: CharacterProfile::default(),
            player: PlayerConfig::default(),
            grunt: GruntConfig::default(),
            bruiser: BossConfig::bruiser(),
            enforcer: BossConfig::enforcer(),
        }
    }
}

impl SimulationSettings {
    /// Загрузить настройки из JSON (отсутствующие поля берутся из Default)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tick_hz", self.tick_hz as f32)?;
        self.player_profile.validate()?;
        self.enemy_profile.validate()?;
        self.player.validate()?;
        self.grunt.validate()?;
        self.bruiser.validate()?;
        self.enforcer.validate()?;
        Ok(())
    }
}
