//! PlayerController — input-driven variant поверх общего state machine
//!
//! - input → движение / прыжок (direction lock) / атака
//! - 5-step combo: индекс растёт на каждой атаке с попаданием,
//!   сбрасывается при промахе, при полученном ударе и по окну `combo_window`
//! - оружие (нож, пистолет) со своими cooldown, подбор через feet probe

use bevy::math::bounding::{Aabb2d, BoundingVolume};
use bevy::prelude::*;

use crate::behavior::{ActionDecision, BehaviorContext, CombatBehavior, MovementDecision, PickupView};
use crate::combat::{
    score_for, AttackKind, AttackPlan, AttackResolved, HitKind, HitLanded, HitOutcome, ReachWindow,
};
use crate::components::{Character, CharacterState, PickupKind};

use super::{ComboStep, PlayerConfig};

/// Input игрока за tick (пишет input слой, one-shot флаги сбрасывает ядро)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Направление (-1..1 по каждой оси)
    pub movement: Vec2,
    pub jump_pressed: bool,
    pub attack_pressed: bool,
}

/// Оружие в руках
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum CarriedWeapon {
    Knife,
    Gun { ammo: u32 },
}

impl CarriedWeapon {
    /// Тот же предмет, лежащий на земле
    pub fn as_pickup(&self) -> PickupKind {
        match *self {
            CarriedWeapon::Knife => PickupKind::Knife,
            CarriedWeapon::Gun { ammo } => PickupKind::Gun { ammo },
        }
    }
}

/// Позиция в combo-серии
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct ComboTracker {
    pub index: usize,
    /// Длина текущей серии попаданий (множитель очков)
    pub streak: u32,
    pub last_hit_at: Option<f32>,
}

impl ComboTracker {
    /// Шаг для следующей атаки (серия истекает по окну)
    pub fn next_step(&mut self, now: f32, window: f32) -> usize {
        if self.last_hit_at.is_some_and(|t| now - t > window) {
            self.reset();
        }
        self.index
    }

    pub fn register_hit(&mut self, now: f32, len: usize) {
        self.index = (self.index + 1) % len.max(1);
        self.streak += 1;
        self.last_hit_at = Some(now);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PlayerController {
    #[reflect(ignore)]
    pub config: PlayerConfig,
    pub combo: ComboTracker,
    pub weapon: Option<CarriedWeapon>,
    /// Выбито при knockdown, ждёт spawn как Pickup
    pub dropped_weapon: Option<CarriedWeapon>,
    pub weapon_ready_at: f32,
    /// Jump kick уже использован в этом прыжке
    pub air_attack_used: bool,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl PlayerController {
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            combo: ComboTracker::default(),
            weapon: None,
            dropped_weapon: None,
            weapon_ready_at: 0.0,
            air_attack_used: false,
        }
    }

    fn reach(&self) -> ReachWindow {
        ReachWindow {
            forward: self.config.reach_forward,
            depth: self.config.reach_depth,
            height: self.config.reach_height,
        }
    }

    /// Plan для текущего шага серии; последний шаг — power attack
    pub fn combo_plan(&mut self, now: f32) -> AttackPlan {
        let len = self.config.combo.len();
        let index = self.combo.next_step(now, self.config.combo_window).min(len.saturating_sub(1));
        let step = self.config.combo.get(index).copied().unwrap_or(ComboStep {
            kind: AttackKind::Jab,
            damage: 1,
        });

        let hit = if index + 1 == len {
            HitKind::PowerEject
        } else {
            HitKind::Normal
        };
        AttackPlan::melee(step.kind, step.damage, hit, self.reach())
    }

    fn jump_kick_plan(&self) -> AttackPlan {
        AttackPlan::melee(
            AttackKind::JumpKick,
            self.config.jump_kick_damage,
            HitKind::Knockdown,
            self.reach(),
        )
    }

    /// Выстрел/бросок; None — cooldown ещё идёт
    fn weapon_plan(&mut self, weapon: CarriedWeapon, now: f32) -> Option<AttackPlan> {
        if now < self.weapon_ready_at {
            return None;
        }

        match weapon {
            CarriedWeapon::Knife => {
                self.weapon = None;
                self.weapon_ready_at = now + self.config.throw_cooldown;
                Some(AttackPlan::ranged(
                    AttackKind::KnifeThrow,
                    self.config.knife_damage,
                    self.config.knife_speed,
                ))
            }
            CarriedWeapon::Gun { ammo } => {
                let left = ammo.saturating_sub(1);
                self.weapon = if left > 0 {
                    Some(CarriedWeapon::Gun { ammo: left })
                } else {
                    crate::log("🔫 Gun out of ammo, dropped");
                    None
                };
                self.weapon_ready_at = now + self.config.fire_cooldown;
                Some(AttackPlan::ranged(
                    AttackKind::GunShot,
                    self.config.bullet_damage,
                    self.config.bullet_speed,
                ))
            }
        }
    }

    /// Feet probe: ближайший предмет под ногами
    pub fn pickup_under_feet(&self, feet: Vec2, pickups: &[PickupView]) -> Option<PickupView> {
        let probe = Aabb2d::new(
            feet,
            Vec2::new(self.config.pickup_reach_x, self.config.pickup_reach_depth),
        );

        pickups
            .iter()
            .filter(|item| probe.contains(&Aabb2d::new(item.position, Vec2::ZERO)))
            .filter(|item| match item.kind {
                PickupKind::Food { .. } => true,
                PickupKind::Knife | PickupKind::Gun { .. } => self.weapon.is_none(),
            })
            .min_by(|a, b| {
                a.position
                    .distance_squared(feet)
                    .total_cmp(&b.position.distance_squared(feet))
            })
            .copied()
    }

    /// Подобрать оружие (food обрабатывает pickup система через Health)
    pub fn equip(&mut self, kind: PickupKind) {
        match kind {
            PickupKind::Knife => self.weapon = Some(CarriedWeapon::Knife),
            PickupKind::Gun { ammo } => self.weapon = Some(CarriedWeapon::Gun { ammo }),
            PickupKind::Food { .. } => {}
        }
    }
}

fn is_combo_kind(kind: AttackKind) -> bool {
    matches!(
        kind,
        AttackKind::Jab | AttackKind::Hook | AttackKind::Kick | AttackKind::Uppercut
    )
}

impl CombatBehavior for PlayerController {
    fn update(&mut self, me: &mut Character, _ctx: &mut BehaviorContext) {
        if me.state != CharacterState::Jumping {
            self.air_attack_used = false;
        }
    }

    fn decide_attack(
        &mut self,
        me: &Character,
        ctx: &mut BehaviorContext,
    ) -> Option<ActionDecision> {
        let input = ctx.input?;
        if !input.attack_pressed {
            return None;
        }

        if me.state == CharacterState::Jumping {
            if self.air_attack_used || me.action.is_some() {
                return None;
            }
            self.air_attack_used = true;
            return Some(ActionDecision::Attack(self.jump_kick_plan()));
        }

        if !me.can_attack() {
            return None;
        }

        if let Some(item) = self.pickup_under_feet(me.precise_position, ctx.pickups) {
            return Some(ActionDecision::Pickup {
                item: item.entity,
                kind: item.kind,
            });
        }

        if let Some(weapon) = self.weapon {
            return self.weapon_plan(weapon, ctx.now).map(ActionDecision::Attack);
        }

        Some(ActionDecision::Attack(self.combo_plan(ctx.now)))
    }

    fn decide_movement(&mut self, me: &Character, ctx: &mut BehaviorContext) -> MovementDecision {
        let Some(input) = ctx.input else {
            return MovementDecision::Hold;
        };
        let direction = input.movement.clamp_length_max(1.0);

        if input.jump_pressed && me.can_jump() {
            let horizontal = if direction.x.abs() > f32::EPSILON {
                direction.x.signum() * self.config.jump_speed
            } else {
                0.0
            };
            return MovementDecision::Jump {
                horizontal,
                lift: self.config.jump_lift,
            };
        }

        if direction == Vec2::ZERO {
            MovementDecision::Hold
        } else {
            MovementDecision::Step(Vec2::new(
                direction.x * self.config.walk_speed,
                direction.y * self.config.depth_speed,
            ))
        }
    }

    fn on_hit(&mut self, _me: &mut Character, hit: &HitLanded, _now: f32) {
        if !hit.outcome.landed() {
            return;
        }
        self.combo.reset();

        if matches!(hit.outcome, HitOutcome::KnockedDown | HitOutcome::Ejected) && self.weapon.is_some()
        {
            crate::log(&format!("🔪 Player knocked down, dropped {:?}", self.weapon));
            self.dropped_weapon = self.weapon.take();
        }
    }

    fn on_attack_resolved(&mut self, resolved: &AttackResolved, now: f32) -> Option<u64> {
        if is_combo_kind(resolved.kind) {
            if !resolved.landed {
                // Промах: серия с начала (после hit-check этого тика)
                self.combo.reset();
                return None;
            }
            self.combo.register_hit(now, self.config.combo.len());
            return Some(score_for(resolved.damage, self.combo.streak));
        }

        resolved
            .landed
            .then(|| score_for(resolved.damage, self.combo.streak))
    }
}
