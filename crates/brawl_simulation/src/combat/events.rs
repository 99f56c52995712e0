//! Outbound события ядра (UI, checkpoint, score)
//!
//! Все события пишутся внутри FixedUpdate и читаются потребителями
//! в том же или следующем кадре (стандартная double-buffer очередь Bevy).

use bevy::prelude::*;

use crate::combat::{AttackKind, HitKind, HitOutcome};
use crate::components::{ActorCategory, PickupKind};

/// Любая мутация HP (урон, heal, respawn)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

/// Персонаж вошёл в Dying
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DyingStarted {
    pub entity: Entity,
}

/// Персонаж вошёл в Dead (terminal)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterDied {
    pub entity: Entity,
    pub category: ActorCategory,
}

/// Для checkpoint: враг выбыл (подсчёт оставшихся)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDefeated {
    pub entity: Entity,
    pub checkpoint: Option<Entity>,
}

/// Результат одного `receive_hit` (в т.ч. Blocked)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitLanded {
    /// None — источник не персонаж (снаряд без владельца)
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub kind: HitKind,
    pub outcome: HitOutcome,
    pub lethal: bool,
}

/// Hit-check атаки завершён (для combo bookkeeping атакующего)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResolved {
    pub attacker: Entity,
    pub kind: AttackKind,
    /// Хотя бы одно попадание с уроном
    pub landed: bool,
    pub damage: u32,
}

/// Ranged атака прошла кадр броска: снаряд в мире
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileLaunched {
    pub owner: Entity,
    pub kind: AttackKind,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreAwarded {
    pub player: Entity,
    pub points: u64,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacingChanged {
    pub entity: Entity,
    pub facing_left: bool,
}

/// Запрос на подбор предмета (player decision → pickup resolution)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupRequested {
    pub collector: Entity,
    pub item: Entity,
    pub kind: PickupKind,
}
