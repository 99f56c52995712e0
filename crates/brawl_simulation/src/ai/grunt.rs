//! Grunt AI: pursuit → prepare → strike, опционально knife thrower

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::behavior::{ActionDecision, BehaviorContext, CombatBehavior, MovementDecision, TargetView};
use crate::combat::{AttackKind, AttackPlan, HitKind, HitLanded, ReachWindow};
use crate::components::Character;
use crate::config::{require_positive, require_range, ConfigError};
use crate::sample_range;

use super::staging::StagingPosture;
use super::{face_toward, step_toward};

/// Knife thrower tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnifeConfig {
    /// Новый нож появляется после `respawn_delay`
    pub multi_knife: bool,
    pub throw_cooldown: f32,
    pub respawn_delay: f32,
    pub damage: u32,
    pub speed: f32,
    /// Точка броска: столько от края экрана
    pub edge_margin: f32,
    /// Допуск совпадения глубины с игроком
    pub aim_tolerance: f32,
}

impl Default for KnifeConfig {
    fn default() -> Self {
        Self {
            multi_knife: false,
            throw_cooldown: 2.0,
            respawn_delay: 3.0,
            damage: 4,
            speed: 180.0,
            edge_margin: 24.0,
            aim_tolerance: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GruntConfig {
    pub walk_speed: f32,
    pub depth_speed: f32,
    /// Смещение от игрока на своей стороне (melee позиция)
    pub reach_offset: f32,
    pub approach_tolerance: f32,
    pub strike_forward: f32,
    pub strike_depth: f32,
    pub strike_height: f32,
    /// PreparingAttack длится sampled [prepare_min, prepare_max)
    pub prepare_min: f32,
    pub prepare_max: f32,
    pub damage: u32,
    pub knife: Option<KnifeConfig>,
}

impl Default for GruntConfig {
    fn default() -> Self {
        Self {
            walk_speed: 60.0,
            depth_speed: 35.0,
            reach_offset: 24.0,
            approach_tolerance: 3.0,
            strike_forward: 32.0,
            strike_depth: 6.0,
            strike_height: 12.0,
            prepare_min: 0.3,
            prepare_max: 0.8,
            damage: 3,
            knife: None,
        }
    }
}

impl GruntConfig {
    pub fn knife_thrower(knife: KnifeConfig) -> Self {
        Self {
            knife: Some(knife),
            ..default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_range("grunt.prepare", self.prepare_min, self.prepare_max)?;
        require_positive("grunt.walk_speed", self.walk_speed)?;
        require_positive("grunt.strike_forward", self.strike_forward)?;
        if let Some(knife) = &self.knife {
            require_positive("grunt.knife.throw_cooldown", knife.throw_cooldown)?;
            require_positive("grunt.knife.speed", knife.speed)?;
        }
        Ok(())
    }

    fn reach(&self) -> ReachWindow {
        ReachWindow {
            forward: self.strike_forward,
            depth: self.strike_depth,
            height: self.strike_height,
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct GruntBrain {
    pub config: GruntConfig,
    /// Staging, выбранный при InitializeFromCheckpoint
    pub posture: Option<StagingPosture>,
    /// Исходная позиция спавна (BehindCamera восстанавливается сюда)
    pub home: Vec2,
    pub has_knife: bool,
    pub knife_ready_at: f32,
    pub knife_respawn_at: Option<f32>,
}

impl GruntBrain {
    pub fn new(config: GruntConfig, home: Vec2) -> Self {
        Self {
            has_knife: config.knife.is_some(),
            config,
            posture: None,
            home,
            knife_ready_at: 0.0,
            knife_respawn_at: None,
        }
    }

    /// Точка, куда идём: melee позиция или позиция броска у края экрана
    pub fn destination(&self, me: &Character, target: &TargetView, ctx: &BehaviorContext) -> Vec2 {
        let on_left = me.precise_position.x < target.position.x;

        match (self.has_knife, self.config.knife) {
            (true, Some(knife)) => {
                let x = if on_left {
                    ctx.screen.left + knife.edge_margin
                } else {
                    ctx.screen.right - knife.edge_margin
                };
                Vec2::new(x, target.position.y)
            }
            _ => {
                let offset = if on_left {
                    -self.config.reach_offset
                } else {
                    self.config.reach_offset
                };
                Vec2::new(target.position.x + offset, target.position.y)
            }
        }
    }

    fn knife_plan(&mut self, me: &Character, target: &TargetView, ctx: &mut BehaviorContext) -> Option<AttackPlan> {
        let knife = self.config.knife?;
        if !self.has_knife || ctx.now < self.knife_ready_at {
            return None;
        }
        if (me.precise_position.y - target.position.y).abs() > knife.aim_tolerance {
            return None;
        }
        let goal = self.destination(me, target, ctx);
        if (me.precise_position.x - goal.x).abs() > self.config.approach_tolerance {
            return None;
        }

        // Нож остаётся в руке до запуска снаряда: прерванный бросок его не тратит
        self.knife_ready_at = ctx.now + knife.throw_cooldown;

        let aim = sample_range(ctx.rng, self.config.prepare_min, self.config.prepare_max);
        Some(AttackPlan::ranged(AttackKind::KnifeThrow, knife.damage, knife.speed).with_aim(aim))
    }

    /// Снаряд ножа реально вылетел
    pub fn knife_launched(&mut self, now: f32) {
        let Some(knife) = self.config.knife else {
            return;
        };
        self.has_knife = false;
        if knife.multi_knife {
            self.knife_respawn_at = Some(now + knife.respawn_delay);
        }
    }

    fn strike_plan(&self, me: &Character, target: &TargetView, ctx: &mut BehaviorContext) -> Option<AttackPlan> {
        let reach = self.config.reach();
        if !reach.contains(
            me.precise_position,
            me.height,
            me.facing_left,
            target.position,
            target.height,
        ) {
            return None;
        }

        let aim = sample_range(ctx.rng, self.config.prepare_min, self.config.prepare_max);
        Some(
            AttackPlan::melee(AttackKind::Strike, self.config.damage, HitKind::Normal, reach)
                .with_aim(aim),
        )
    }
}

impl CombatBehavior for GruntBrain {
    fn update(&mut self, me: &mut Character, ctx: &mut BehaviorContext) {
        if let Some(respawn_at) = self.knife_respawn_at {
            if ctx.now >= respawn_at {
                self.has_knife = true;
                self.knife_respawn_at = None;
            }
        }

        if let Some(target) = ctx.target {
            if me.can_move() {
                face_toward(&mut me.facing_left, me.precise_position, target.position);
            }
        }
    }

    fn decide_attack(&mut self, me: &Character, ctx: &mut BehaviorContext) -> Option<ActionDecision> {
        let target = ctx.target.filter(TargetView::is_engageable)?;
        if !me.can_attack() {
            return None;
        }

        if self.has_knife {
            return self
                .knife_plan(me, &target, ctx)
                .map(ActionDecision::Attack);
        }
        self.strike_plan(me, &target, ctx).map(ActionDecision::Attack)
    }

    fn decide_movement(&mut self, me: &Character, ctx: &mut BehaviorContext) -> MovementDecision {
        let Some(target) = ctx.target.filter(TargetView::is_engageable) else {
            return MovementDecision::Hold;
        };

        let goal = self.destination(me, &target, ctx);
        let depth_tolerance = match (self.has_knife, self.config.knife) {
            (true, Some(knife)) => knife.aim_tolerance.min(self.config.approach_tolerance),
            _ => self.config.approach_tolerance,
        };

        step_toward(
            me.precise_position,
            goal,
            Vec2::new(self.config.walk_speed, self.config.depth_speed),
            Vec2::new(self.config.approach_tolerance, depth_tolerance),
            ctx.dt,
        )
    }

    fn on_hit(&mut self, _me: &mut Character, hit: &HitLanded, _now: f32) {
        if hit.lethal {
            self.knife_respawn_at = None;
        }
    }
}
