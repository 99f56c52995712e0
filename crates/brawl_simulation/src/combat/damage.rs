//! Combat rules: hit kinds, mitigation, knockback, reach window, score

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Тяжесть knockback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum HitKind {
    /// Лёгкий stagger → Hurt
    Normal,
    /// Принудительное падение → Falling
    Knockdown,
    /// Высокоскоростной бросок → Flying
    PowerEject,
}

/// Ephemeral combat event (не ставится в очередь)
///
/// Создаётся hit-check атакующего и сразу потребляется `Character::receive_hit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatEvent {
    /// Точка происхождения удара (позиция атакующего / снаряда)
    pub origin: Vec2,
    pub amount: u32,
    pub kind: HitKind,
    /// false → игнорирует directional block
    pub can_block: bool,
}

impl CombatEvent {
    pub fn new(origin: Vec2, amount: u32, kind: HitKind) -> Self {
        Self {
            origin,
            amount,
            kind,
            can_block: true,
        }
    }

    pub fn unblockable(mut self) -> Self {
        self.can_block = false;
        self
    }
}

/// Результат `receive_hit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Цель не уязвима — ничего не изменилось
    Ignored,
    /// Удар поглощён блоком (урона нет)
    Blocked,
    Hurt,
    KnockedDown,
    Ejected,
}

impl HitOutcome {
    /// Удар прошёл (урон применён)
    pub fn landed(&self) -> bool {
        matches!(
            self,
            HitOutcome::Hurt | HitOutcome::KnockedDown | HitOutcome::Ejected
        )
    }
}

/// Полный отчёт об ударе для публикации событий
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub outcome: HitOutcome,
    /// Фактически снятое HP (после брони)
    pub damage: u32,
    /// HP дошло до 0 этим ударом
    pub lethal: bool,
}

impl HitReport {
    pub fn ignored() -> Self {
        Self {
            outcome: HitOutcome::Ignored,
            damage: 0,
            lethal: false,
        }
    }

    pub fn blocked() -> Self {
        Self {
            outcome: HitOutcome::Blocked,
            damage: 0,
            lethal: false,
        }
    }
}

/// Знак knockback по X: прочь от origin
///
/// Ничья (origin ровно на позиции) → против направления взгляда.
pub fn knockback_direction(position_x: f32, origin_x: f32, facing_left: bool) -> f32 {
    if origin_x < position_x {
        1.0
    } else if origin_x > position_x {
        -1.0
    } else if facing_left {
        1.0
    } else {
        -1.0
    }
}

/// Плоская броня; ненулевой удар всегда снимает хотя бы 1 HP
pub fn mitigate(amount: u32, armor: u32) -> u32 {
    if amount == 0 {
        return 0;
    }
    amount.saturating_sub(armor).max(1)
}

/// Прямоугольное окно досягаемости перед атакующим
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct ReachWindow {
    /// Вперёд по направлению взгляда
    pub forward: f32,
    /// Допуск по глубине (|dy|)
    pub depth: f32,
    /// Допуск по высоте (|dh|)
    pub height: f32,
}

impl ReachWindow {
    /// Цель впереди по взгляду и внутри окна
    pub fn contains(
        &self,
        attacker: Vec2,
        attacker_height: f32,
        facing_left: bool,
        target: Vec2,
        target_height: f32,
    ) -> bool {
        let forward = if facing_left {
            attacker.x - target.x
        } else {
            target.x - attacker.x
        };

        (0.0..=self.forward).contains(&forward)
            && (target.y - attacker.y).abs() <= self.depth
            && (target_height - attacker_height).abs() <= self.height
    }
}

/// Dying flicker: видим на чётных десятых прогресса
pub fn oscillate(progress: f32) -> bool {
    let tenth = (progress.clamp(0.0, 1.0) * 10.0).floor() as u32;
    tenth % 2 == 0
}

/// Очки = урон × длина серии × 10
pub fn score_for(damage: u32, streak: u32) -> u64 {
    damage as u64 * streak.max(1) as u64 * 10
}
