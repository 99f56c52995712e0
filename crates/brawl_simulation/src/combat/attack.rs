//! Attack plans — что атакующий собирается сделать
//!
//! Variant (player/grunt/boss) собирает `AttackPlan`, ядро хранит его как
//! `AttackAction` в `Character::action` до "attack frame reached".

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::damage::{HitKind, ReachWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum AttackKind {
    // Player combo
    Jab,
    Hook,
    Kick,
    Uppercut,
    JumpKick,
    // Weapons
    KnifeThrow,
    GunShot,
    // Enemy melee
    Strike,
    HeavyStrike,
    Charge,
}

impl AttackKind {
    /// Атака создаёт projectile вместо melee hit-check
    pub fn is_ranged(&self) -> bool {
        matches!(self, AttackKind::KnifeThrow | AttackKind::GunShot)
    }

    /// Charge завершается ядром, не presentation сигналом
    pub fn is_core_driven(&self) -> bool {
        matches!(self, AttackKind::Charge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackPlan {
    pub kind: AttackKind,
    pub damage: u32,
    pub hit: HitKind,
    pub reach: ReachWindow,
    /// Время подготовки (PreparingAttack); 0 → сразу Attacking
    pub aim: f32,
    /// Неуязвимость во время Attacking
    pub immune: bool,
    pub can_block: bool,
    /// Скорость снаряда (только ranged)
    pub projectile_speed: f32,
    /// Core-owned лимит длительности Attacking (иначе profile.attack_timeout)
    pub duration_cap: Option<f32>,
}

impl AttackPlan {
    pub fn melee(kind: AttackKind, damage: u32, hit: HitKind, reach: ReachWindow) -> Self {
        Self {
            kind,
            damage,
            hit,
            reach,
            aim: 0.0,
            immune: false,
            can_block: true,
            projectile_speed: 0.0,
            duration_cap: None,
        }
    }

    /// Снаряд: `reach` задаёт допуск попадания по глубине и высоте
    pub fn ranged(kind: AttackKind, damage: u32, speed: f32) -> Self {
        Self {
            kind,
            damage,
            hit: HitKind::Normal,
            reach: ReachWindow {
                forward: 0.0,
                depth: 6.0,
                height: 24.0,
            },
            aim: 0.0,
            immune: false,
            can_block: true,
            projectile_speed: speed,
            duration_cap: None,
        }
    }

    pub fn with_aim(mut self, aim: f32) -> Self {
        self.aim = aim.max(0.0);
        self
    }

    pub fn immune(mut self) -> Self {
        self.immune = true;
        self
    }

    pub fn unblockable(mut self) -> Self {
        self.can_block = false;
        self
    }

    pub fn with_duration_cap(mut self, cap: f32) -> Self {
        self.duration_cap = Some(cap);
        self
    }
}

/// Атака в процессе
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AttackAction {
    pub plan: AttackPlan,
    /// Момент перехода PreparingAttack → Attacking
    pub ready_at: f32,
    /// Hit-check уже выполнен (один hit-check на атаку)
    pub frame_reached: bool,
}

impl AttackAction {
    pub fn new(plan: AttackPlan, now: f32) -> Self {
        Self {
            plan,
            ready_at: now + plan.aim,
            frame_reached: false,
        }
    }
}
