//! ECS Components для персонажей и мира
//!
//! Организация по доменам:
//! - character: общий конечный автомат (Character, CharacterState, Health)
//! - profile: tuning общего ядра (CharacterProfile)
//! - intents: семантические intents для presentation слоя
//! - world: world context (CombatRoster, ScreenBounds, Footprint, Obstacle, Pickup)

pub mod character;
pub mod intents;
pub mod profile;
pub mod world;

// Re-exports для удобного импорта
pub use character::*;
pub use intents::*;
pub use profile::*;
pub use world::*;
