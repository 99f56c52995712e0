//! Boss AI: attack-type selector, block phase, screen-spanning charge
//!
//! Bruiser и Enforcer — один `BossBrain` с разными пресетами `BossConfig`.
//! Движение charge и его урон — `systems::advance_boss_charges` (core-owned).

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::{ActionDecision, BehaviorContext, CombatBehavior, MovementDecision, TargetView};
use crate::combat::{AttackKind, AttackPlan, AttackResolved, HitKind, HitLanded, HitOutcome, ReachWindow};
use crate::components::{Character, CharacterState};
use crate::config::{require_positive, require_range, ConfigError};
use crate::sample_range;

use super::{face_toward, step_toward};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum BossKind {
    Bruiser,
    Enforcer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum BossAttack {
    Strike,
    HeavyStrike,
    Charge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackWeight {
    pub attack: BossAttack,
    pub weight: u32,
}

impl AttackWeight {
    pub fn new(attack: BossAttack, weight: u32) -> Self {
        Self { attack, weight }
    }
}

/// Block phase: после `trigger_hits` пропущенных подряд
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    pub trigger_hits: u32,
    pub duration: f32,
    /// Блок снимается после стольких поглощённых ударов
    pub max_blocked_hits: u32,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            trigger_hits: 3,
            duration: 1.5,
            max_blocked_hits: 4,
        }
    }
}

/// Melee удар босса
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossStrike {
    pub damage: u32,
    pub hit: HitKind,
    pub forward: f32,
    pub depth: f32,
    pub height: f32,
}

impl BossStrike {
    pub fn reach(&self) -> ReachWindow {
        ReachWindow {
            forward: self.forward,
            depth: self.depth,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub damage: u32,
    pub speed: f32,
    /// Core-owned timeout рывка
    pub duration_cap: f32,
    /// Половина глубины swept прямоугольника
    pub sweep_half_depth: f32,
    /// Старт и финиш: столько от края экрана
    pub edge_margin: f32,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            damage: 6,
            speed: 260.0,
            duration_cap: 2.5,
            sweep_half_depth: 8.0,
            edge_margin: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub kind: BossKind,
    pub max_hp: u32,
    /// Плоская броня (вычитается из каждого удара, минимум 1)
    pub armor: u32,
    pub walk_speed: f32,
    pub depth_speed: f32,
    pub reach_offset: f32,
    pub approach_tolerance: f32,
    pub strike: BossStrike,
    pub heavy: BossStrike,
    pub charge: ChargeConfig,
    pub prepare_min: f32,
    pub prepare_max: f32,
    pub attacks: Vec<AttackWeight>,
    pub block: BlockConfig,
    /// Enforcer: charge вне очереди после стольких лёгких ударов
    pub forced_charge_hits: Option<u32>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self::bruiser()
    }
}

impl BossConfig {
    pub fn bruiser() -> Self {
        Self {
            kind: BossKind::Bruiser,
            max_hp: 80,
            armor: 1,
            walk_speed: 50.0,
            depth_speed: 30.0,
            reach_offset: 28.0,
            approach_tolerance: 3.0,
            strike: BossStrike {
                damage: 4,
                hit: HitKind::Normal,
                forward: 36.0,
                depth: 8.0,
                height: 16.0,
            },
            heavy: BossStrike {
                damage: 7,
                hit: HitKind::Knockdown,
                forward: 40.0,
                depth: 8.0,
                height: 16.0,
            },
            charge: ChargeConfig::default(),
            prepare_min: 0.4,
            prepare_max: 1.0,
            attacks: vec![
                AttackWeight::new(BossAttack::Strike, 3),
                AttackWeight::new(BossAttack::Charge, 2),
            ],
            block: BlockConfig::default(),
            forced_charge_hits: None,
        }
    }

    pub fn enforcer() -> Self {
        Self {
            kind: BossKind::Enforcer,
            max_hp: 100,
            armor: 2,
            attacks: vec![
                AttackWeight::new(BossAttack::Strike, 3),
                AttackWeight::new(BossAttack::HeavyStrike, 2),
                AttackWeight::new(BossAttack::Charge, 1),
            ],
            block: BlockConfig {
                trigger_hits: 2,
                duration: 1.2,
                max_blocked_hits: 3,
            },
            forced_charge_hits: Some(4),
            ..Self::bruiser()
        }
    }

    pub fn for_kind(kind: BossKind) -> Self {
        match kind {
            BossKind::Bruiser => Self::bruiser(),
            BossKind::Enforcer => Self::enforcer(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.attacks.iter().any(|a| a.weight > 0) {
            return Err(ConfigError::EmptySelector {
                field: "boss.attacks",
            });
        }
        require_range("boss.prepare", self.prepare_min, self.prepare_max)?;
        require_positive("boss.walk_speed", self.walk_speed)?;
        require_positive("boss.charge.speed", self.charge.speed)?;
        require_positive("boss.charge.duration_cap", self.charge.duration_cap)?;
        require_positive("boss.block.duration", self.block.duration)?;
        Ok(())
    }

    /// Weighted выбор; пустой селектор → Strike
    pub fn pick_attack(&self, rng: &mut impl Rng) -> BossAttack {
        let total: u32 = self.attacks.iter().map(|a| a.weight).sum();
        if total == 0 {
            return BossAttack::Strike;
        }

        let mut roll = rng.gen_range(0..total);
        for entry in &self.attacks {
            if roll < entry.weight {
                return entry.attack;
            }
            roll -= entry.weight;
        }
        BossAttack::Strike
    }
}

/// Активный рывок (инициализируется при входе в Attacking)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeRun {
    /// +1 вправо, -1 влево
    pub direction: f32,
    pub end_x: f32,
    /// PowerEject уже доставлен (один раз за рывок)
    pub hit_player: bool,
    /// `ready_at` атаки, которой принадлежит рывок
    pub started_at: f32,
}

#[derive(Component, Debug, Clone)]
pub struct BossBrain {
    pub config: BossConfig,
    /// ActivateBoss получен
    pub engaged: bool,
    pub selected: Option<BossAttack>,
    pub consecutive_hits: u32,
    pub light_hits: u32,
    pub blocked_hits: u32,
    pub forced_charge: bool,
    pub block_pending: bool,
    pub charge: Option<ChargeRun>,
}

impl BossBrain {
    pub fn new(config: BossConfig) -> Self {
        Self {
            config,
            engaged: false,
            selected: None,
            consecutive_hits: 0,
            light_hits: 0,
            blocked_hits: 0,
            forced_charge: false,
            block_pending: false,
            charge: None,
        }
    }

    pub fn kind(&self) -> BossKind {
        self.config.kind
    }

    pub fn engage(&mut self) {
        self.engaged = true;
    }

    /// Босс сейчас в рывке
    pub fn is_charging(me: &Character) -> bool {
        me.state == CharacterState::Attacking
            && me.action.is_some_and(|a| a.plan.kind == AttackKind::Charge)
    }

    fn select(&mut self, rng: &mut impl Rng) -> BossAttack {
        let attack = if self.forced_charge {
            self.forced_charge = false;
            BossAttack::Charge
        } else {
            self.config.pick_attack(rng)
        };
        crate::log(&format!("🎲 {:?} selected {:?}", self.config.kind, attack));
        attack
    }

    /// Точка старта выбранной атаки
    pub fn destination(&self, attack: BossAttack, me: &Character, target: &TargetView, ctx: &BehaviorContext) -> Vec2 {
        let on_left = me.precise_position.x < target.position.x;
        let x = match attack {
            BossAttack::Charge => {
                if on_left {
                    ctx.screen.left + self.config.charge.edge_margin
                } else {
                    ctx.screen.right - self.config.charge.edge_margin
                }
            }
            BossAttack::Strike | BossAttack::HeavyStrike => {
                if on_left {
                    target.position.x - self.config.reach_offset
                } else {
                    target.position.x + self.config.reach_offset
                }
            }
        };
        Vec2::new(x, target.position.y)
    }

    fn in_position(&self, attack: BossAttack, me: &Character, target: &TargetView, ctx: &BehaviorContext) -> bool {
        match attack {
            BossAttack::Strike => self.config.strike.reach().contains(
                me.precise_position,
                me.height,
                me.facing_left,
                target.position,
                target.height,
            ),
            BossAttack::HeavyStrike => self.config.heavy.reach().contains(
                me.precise_position,
                me.height,
                me.facing_left,
                target.position,
                target.height,
            ),
            BossAttack::Charge => {
                let goal = self.destination(attack, me, target, ctx);
                (me.precise_position - goal).abs().max_element() <= self.config.approach_tolerance
            }
        }
    }

    pub fn plan_for(&self, attack: BossAttack, aim: f32) -> AttackPlan {
        let plan = match attack {
            BossAttack::Strike => {
                let strike = self.config.strike;
                AttackPlan::melee(AttackKind::Strike, strike.damage, strike.hit, strike.reach())
            }
            BossAttack::HeavyStrike => {
                let heavy = self.config.heavy;
                AttackPlan::melee(AttackKind::HeavyStrike, heavy.damage, heavy.hit, heavy.reach())
            }
            BossAttack::Charge => {
                let charge = self.config.charge;
                let sweep = ReachWindow {
                    forward: 0.0,
                    depth: charge.sweep_half_depth,
                    height: self.config.strike.height,
                };
                AttackPlan::melee(AttackKind::Charge, charge.damage, HitKind::PowerEject, sweep)
                    .immune()
                    .unblockable()
                    .with_duration_cap(charge.duration_cap)
            }
        };
        plan.with_aim(aim)
    }
}

impl CombatBehavior for BossBrain {
    fn update(&mut self, me: &mut Character, ctx: &mut BehaviorContext) {
        if me.state != CharacterState::Blocking {
            self.blocked_hits = 0;
        }
        if !self.engaged {
            return;
        }

        if me.can_move() {
            if self.selected.is_none() {
                self.selected = Some(self.select(&mut *ctx.rng));
            }
            if let Some(target) = ctx.target {
                face_toward(&mut me.facing_left, me.precise_position, target.position);
            }
        }
    }

    fn decide_attack(&mut self, me: &Character, ctx: &mut BehaviorContext) -> Option<ActionDecision> {
        if !self.engaged {
            return None;
        }

        if self.block_pending && me.can_block() {
            self.block_pending = false;
            crate::log(&format!("🛡️ {:?} block phase", self.config.kind));
            return Some(ActionDecision::Block {
                duration: self.config.block.duration,
                full_guard: true,
            });
        }

        let target = ctx.target.filter(TargetView::is_engageable)?;
        if !me.can_attack() {
            return None;
        }
        let attack = self.selected?;
        if !self.in_position(attack, me, &target, ctx) {
            return None;
        }

        let aim = sample_range(ctx.rng, self.config.prepare_min, self.config.prepare_max);
        self.selected = None;
        Some(ActionDecision::Attack(self.plan_for(attack, aim)))
    }

    fn decide_movement(&mut self, me: &Character, ctx: &mut BehaviorContext) -> MovementDecision {
        if !self.engaged {
            return MovementDecision::Hold;
        }
        let Some(target) = ctx.target.filter(TargetView::is_engageable) else {
            return MovementDecision::Hold;
        };
        let Some(attack) = self.selected else {
            return MovementDecision::Hold;
        };

        let goal = self.destination(attack, me, &target, ctx);
        step_toward(
            me.precise_position,
            goal,
            Vec2::new(self.config.walk_speed, self.config.depth_speed),
            Vec2::splat(self.config.approach_tolerance),
            ctx.dt,
        )
    }

    fn on_hit(&mut self, me: &mut Character, hit: &HitLanded, now: f32) {
        match hit.outcome {
            HitOutcome::Ignored => {}
            HitOutcome::Blocked => {
                self.blocked_hits += 1;
                if self.blocked_hits >= self.config.block.max_blocked_hits {
                    crate::log(&format!("🛡️ {:?} guard broken", self.config.kind));
                    me.enter_state(CharacterState::Idle, now);
                    self.blocked_hits = 0;
                }
            }
            HitOutcome::Hurt | HitOutcome::KnockedDown | HitOutcome::Ejected => {
                self.selected = None;
                self.consecutive_hits += 1;
                if hit.outcome == HitOutcome::Hurt {
                    self.light_hits += 1;
                }

                if let Some(threshold) = self.config.forced_charge_hits {
                    if self.light_hits >= threshold {
                        self.forced_charge = true;
                        self.light_hits = 0;
                    }
                }

                if hit.outcome == HitOutcome::Hurt
                    && self.consecutive_hits >= self.config.block.trigger_hits
                {
                    self.block_pending = true;
                    self.consecutive_hits = 0;
                } else if hit.outcome != HitOutcome::Hurt {
                    // Сбит с ног: серия прервана
                    self.block_pending = false;
                    self.consecutive_hits = 0;
                }
            }
        }
    }

    fn on_attack_resolved(&mut self, resolved: &AttackResolved, _now: f32) -> Option<u64> {
        if resolved.landed {
            self.consecutive_hits = 0;
        }
        None
    }
}
