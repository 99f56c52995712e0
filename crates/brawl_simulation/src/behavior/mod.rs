//! Behavior strategy seam — variant-ы поверх общего state machine
//!
//! Архитектура:
//! - `Character` одинаковый для всех бойцов
//! - поведение = один компонент (`PlayerController`, `GruntBrain`, `BossBrain`),
//!   реализующий `CombatBehavior`
//! - одна generic система на фазу (`drive_behavior::<B>`, `react_to_hits::<B>`, ...)
//!
//! Variant-ы не видят приватное состояние друг друга: только `TargetView`
//! (copy-out публичных полей) и контракт `receive_hit` в combat.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::combat::{AttackPlan, AttackResolved, HitLanded, PickupRequested, ScoreAwarded};
use crate::components::{
    Character, CharacterProfile, CharacterState, CombatRoster, IntentTrigger, Pickup, PickupKind,
    PresentationIntents, ScreenBounds,
};
use crate::player::PlayerInput;
use crate::spatial::{ActorProbe, ColliderSnapshot, MovementProbe};
use crate::DeterministicRng;

#[cfg(test)]
mod behavior_tests;

/// Фазы fixed tick (выполняются строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Очистка triggers, collider snapshot, регистрация новых бойцов
    Prepare,
    /// Level → core события (checkpoint staging, activate, respawn)
    Staging,
    /// Общий tick таймеров и физики
    StateMachine,
    /// Решения variant-ов (движение, атака, блок, подбор)
    Decide,
    /// Charge sweep, hit-check, снаряды
    Resolve,
    /// Реакции на удары, combo bookkeeping, animation-end сигналы
    React,
    /// Consistency check, screen clamp
    Reconcile,
    /// Публикация intents
    Publish,
    /// Удаление мёртвых
    Cleanup,
}

// ============================================================================
// Context
// ============================================================================

/// Публичный snapshot цели (игрока) для AI
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub entity: Entity,
    pub position: Vec2,
    pub height: f32,
    pub state: CharacterState,
}

impl TargetView {
    pub fn from_character(entity: Entity, character: &Character) -> Self {
        Self {
            entity,
            position: character.precise_position,
            height: character.height,
            state: character.state,
        }
    }

    /// Стоит ли вообще идти к цели
    pub fn is_engageable(&self) -> bool {
        !matches!(self.state, CharacterState::Dying | CharacterState::Dead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupView {
    pub entity: Entity,
    pub kind: PickupKind,
    pub position: Vec2,
}

pub struct BehaviorContext<'a> {
    pub entity: Entity,
    pub now: f32,
    pub dt: f32,
    pub target: Option<TargetView>,
    pub screen: ScreenBounds,
    pub profile: &'a CharacterProfile,
    pub rng: &'a mut ChaCha8Rng,
    pub input: Option<PlayerInput>,
    pub pickups: &'a [PickupView],
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementDecision {
    /// Стоять (Walking → Idle)
    Hold,
    /// Идти с желаемой скоростью (px/s)
    Step(Vec2),
    /// Прыжок: горизонталь фиксируется на взлёте
    Jump { horizontal: f32, lift: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionDecision {
    Attack(AttackPlan),
    Block { duration: f32, full_guard: bool },
    Pickup { item: Entity, kind: PickupKind },
}

/// Strategy interface variant-а бойца
pub trait CombatBehavior: Send + Sync + 'static {
    /// Внутренние таймеры, staging, explicit facing (до решений)
    fn update(&mut self, me: &mut Character, ctx: &mut BehaviorContext);

    /// Атака / блок / подбор; None → решаем движение
    fn decide_attack(&mut self, me: &Character, ctx: &mut BehaviorContext)
        -> Option<ActionDecision>;

    fn decide_movement(&mut self, me: &Character, ctx: &mut BehaviorContext) -> MovementDecision;

    /// Реакция на удар, уже применённый через `receive_hit`
    fn on_hit(&mut self, me: &mut Character, hit: &HitLanded, now: f32);

    /// Результат hit-check собственной атаки; Some(points) → ScoreAwarded
    fn on_attack_resolved(&mut self, resolved: &AttackResolved, now: f32) -> Option<u64> {
        let _ = (resolved, now);
        None
    }
}

// ============================================================================
// Generic systems
// ============================================================================

/// Применить решение о движении к персонажу
pub fn apply_movement(
    me: &mut Character,
    intents: &mut PresentationIntents,
    decision: MovementDecision,
    probe: &dyn MovementProbe,
    now: f32,
    dt: f32,
) {
    match decision {
        MovementDecision::Hold => {
            me.velocity = Vec2::ZERO;
            if me.state == CharacterState::Walking {
                me.enter_state(CharacterState::Idle, now);
            }
        }
        MovementDecision::Step(velocity) => {
            if velocity.x != 0.0 {
                me.facing_left = velocity.x < 0.0;
            }
            me.velocity = velocity;
            let destination = me.precise_position + velocity * dt;
            me.attempt_move_to(destination, probe);

            let walking = me.velocity != Vec2::ZERO;
            match (me.state, walking) {
                (CharacterState::Idle, true) => {
                    me.enter_state(CharacterState::Walking, now);
                }
                (CharacterState::Walking, false) => {
                    me.enter_state(CharacterState::Idle, now);
                }
                _ => {}
            }
        }
        MovementDecision::Jump { horizontal, lift } => {
            if horizontal != 0.0 {
                me.facing_left = horizontal < 0.0;
            }
            if me.begin_jump(horizontal, lift, now) {
                intents.trigger(IntentTrigger::Jump);
            }
        }
    }
}

/// Decide фаза: update → attack/block/pickup → movement
#[allow(clippy::too_many_arguments)]
pub fn drive_behavior<B>(
    time: Res<Time<Fixed>>,
    roster: Res<CombatRoster>,
    screen: Res<ScreenBounds>,
    snapshot: Res<ColliderSnapshot>,
    input: Option<Res<PlayerInput>>,
    mut rng: ResMut<DeterministicRng>,
    mut actors: Query<(
        Entity,
        &mut Character,
        &mut B,
        &CharacterProfile,
        &mut PresentationIntents,
    )>,
    others: Query<(Entity, &Character), Without<B>>,
    pickups: Query<(Entity, &Pickup)>,
    mut pickup_events: EventWriter<PickupRequested>,
) where
    B: CombatBehavior + Component<Mutability = Mutable>,
{
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    let target = roster
        .player
        .and_then(|player| others.get(player).ok())
        .map(|(entity, character)| TargetView::from_character(entity, character));

    let pickup_views: Vec<PickupView> = pickups
        .iter()
        .map(|(entity, pickup)| PickupView {
            entity,
            kind: pickup.kind,
            position: pickup.position,
        })
        .collect();

    let player_input = input.map(|input| *input);

    for (entity, mut me, mut behavior, profile, mut intents) in actors.iter_mut() {
        let mut ctx = BehaviorContext {
            entity,
            now,
            dt,
            target,
            screen: *screen,
            profile,
            rng: &mut rng.rng,
            input: player_input,
            pickups: &pickup_views,
        };

        behavior.update(&mut me, &mut ctx);
        if !me.is_active() {
            continue;
        }

        if let Some(action) = behavior.decide_attack(&me, &mut ctx) {
            match action {
                ActionDecision::Attack(plan) => {
                    let started = if me.state == CharacterState::Jumping {
                        me.begin_air_attack(plan, now)
                    } else {
                        me.begin_attack(plan, profile, now)
                    };
                    if started && me.state != CharacterState::PreparingAttack {
                        intents.trigger(IntentTrigger::Attack(plan.kind));
                    }
                }
                ActionDecision::Block {
                    duration,
                    full_guard,
                } => {
                    if me.begin_block(duration, full_guard, now) {
                        intents.trigger(IntentTrigger::Block);
                    }
                }
                ActionDecision::Pickup { item, kind } => {
                    pickup_events.write(PickupRequested {
                        collector: entity,
                        item,
                        kind,
                    });
                }
            }
            continue;
        }

        if !me.can_move() {
            continue;
        }

        let decision = behavior.decide_movement(&me, &mut ctx);
        let probe = ActorProbe::new(&snapshot, entity, me.category);
        apply_movement(&mut me, &mut intents, decision, &probe, now, dt);
    }
}

/// React фаза: HitLanded → on_hit цели
pub fn react_to_hits<B>(
    time: Res<Time<Fixed>>,
    mut hits: EventReader<HitLanded>,
    mut actors: Query<(&mut Character, &mut B)>,
) where
    B: CombatBehavior + Component<Mutability = Mutable>,
{
    let now = time.elapsed_secs();

    for hit in hits.read() {
        let Ok((mut me, mut behavior)) = actors.get_mut(hit.target) else {
            continue;
        };
        behavior.on_hit(&mut me, hit, now);
    }
}

/// React фаза: AttackResolved → combo/score bookkeeping атакующего
pub fn react_to_attack_resolution<B>(
    time: Res<Time<Fixed>>,
    mut resolved: EventReader<AttackResolved>,
    mut actors: Query<&mut B>,
    mut score_events: EventWriter<ScoreAwarded>,
) where
    B: CombatBehavior + Component<Mutability = Mutable>,
{
    let now = time.elapsed_secs();

    for event in resolved.read() {
        let Ok(mut behavior) = actors.get_mut(event.attacker) else {
            continue;
        };
        if let Some(points) = behavior.on_attack_resolved(event, now) {
            score_events.write(ScoreAwarded {
                player: event.attacker,
                points,
            });
        }
    }
}
