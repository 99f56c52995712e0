//! Базовые компоненты персонажа: Character, CharacterState, Health
//!
//! Pseudo-3D модель позиции:
//! - `precise_position` — точка на плоскости земли (x = горизонталь, y = глубина)
//! - `height` — независимая вертикальная ось (прыжок, падение, бросок)
//!
//! Логика переходов (`receive_hit`, `tick`, `attempt_move_to`) живёт в `crate::state`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::AttackAction;
use crate::components::{CharacterProfile, Footprint, PresentationIntents};

/// Категория актора (выбирает collision mask и список противников)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum ActorCategory {
    Player,
    Enemy,
}

/// Закрытый набор состояний персонажа
///
/// Набор общий для всех вариантов; конкретный вариант использует подмножество
/// (Summersaulting — только игрок, WaitingForDoor — только гранты).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CharacterState {
    Idle,
    Walking,
    PreparingAttack,
    Attacking,
    Blocking,
    Hurt,
    Flying,
    Falling,
    Grounded,
    Dropping,
    WaitingForDoor,
    Dying,
    Dead,
    WaitingForPlayer,
    Jumping,
    Summersaulting,
}

impl CharacterState {
    /// Состояния, в которых `height` может быть > 0
    pub fn is_airborne(&self) -> bool {
        matches!(
            self,
            CharacterState::Flying
                | CharacterState::Falling
                | CharacterState::Dropping
                | CharacterState::Jumping
        )
    }

    /// Нейтральные состояния (персонаж принимает решения)
    pub fn is_neutral(&self) -> bool {
        matches!(self, CharacterState::Idle | CharacterState::Walking)
    }
}

/// Персонаж (игрок, грант, босс) — общее ядро конечного автомата
///
/// Инварианты:
/// - активно ровно одно состояние; вход в состояние сбрасывает таймеры и action
/// - `height > 0` только в airborne состояниях
/// - Dying/Dead не уязвимы и не выдают intents
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Health, CharacterProfile, Footprint, PresentationIntents)]
pub struct Character {
    pub category: ActorCategory,
    /// Authoritative позиция на плоскости земли (не округлённая)
    pub precise_position: Vec2,
    /// Высота над землёй
    pub height: f32,
    /// Скорость по плоскости земли (knockback, прыжок, charge)
    pub velocity: Vec2,
    /// Вертикальная скорость
    pub d_height: f32,
    pub facing_left: bool,
    pub state: CharacterState,
    /// Время входа в текущее состояние (секунды fixed clock)
    pub time_entered_state: f32,
    /// Core-owned дедлайн текущего состояния (fallback для animation-driven переходов)
    pub state_deadline: Option<f32>,
    /// Атака в процессе (PreparingAttack / Attacking / air attack в Jumping)
    pub action: Option<AttackAction>,
    /// Post-getup неуязвимость до этого момента
    pub invincible_until: f32,
    /// Blocking без учёта направления (block phase босса)
    pub full_guard: bool,
}

impl Character {
    pub fn new(category: ActorCategory, position: Vec2) -> Self {
        Self {
            category,
            precise_position: position,
            height: 0.0,
            velocity: Vec2::ZERO,
            d_height: 0.0,
            facing_left: false,
            state: CharacterState::Idle,
            time_entered_state: 0.0,
            state_deadline: None,
            action: None,
            invincible_until: 0.0,
            full_guard: false,
        }
    }

    /// Стартовать в конкретном состоянии (spawn staging)
    pub fn with_state(mut self, state: CharacterState) -> Self {
        self.state = state;
        self
    }

    pub fn with_facing_left(mut self, facing_left: bool) -> Self {
        self.facing_left = facing_left;
        self
    }

    pub fn is_player(&self) -> bool {
        self.category == ActorCategory::Player
    }
}

/// Здоровье персонажа
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Явный heal; 0 HP необратимо (возвращает фактически добавленное)
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    /// Полное восстановление (respawn игрока)
    pub fn restore(&mut self) {
        self.current = self.max;
    }
}
