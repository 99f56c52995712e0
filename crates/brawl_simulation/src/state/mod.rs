//! Character State Machine — общее ядро всех бойцов
//!
//! Контракт для variant-ов и боевых правил:
//! - `is_vulnerable` / `receive_hit` — единственная точка взаимодействия между бойцами
//! - `tick` — таймеры и физика текущего состояния (gravity, slide, dwell)
//! - `attempt_move_to` — движение по осям раздельно (Y, затем X)
//! - guards (`can_move`, `can_attack`, `can_jump`, `can_block`) — чистые предикаты
//!
//! Animation-driven переходы (Attacking/Hurt → Idle) завершаются сигналом
//! presentation слоя ИЛИ core-owned дедлайном (`state_deadline`), что раньше.

use bevy::prelude::*;

use crate::combat::{
    knockback_direction, mitigate, AttackAction, AttackKind, AttackPlan, CombatEvent, HitKind,
    HitOutcome, HitReport,
};
use crate::components::{Character, CharacterProfile, CharacterState, Health};
use crate::spatial::MovementProbe;

pub mod systems;


pub use systems::advance_character_states;

/// Что произошло за tick (для событий и presentation triggers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSignal {
    None,
    /// PreparingAttack → Attacking
    AttackCommitted(AttackKind),
    /// height дошла до 0
    Landed,
    /// Attacking / Hurt / Blocking → Idle по дедлайну
    Recovered,
    /// Grounded / Summersaulting → Idle
    GotUp,
    DyingStarted,
    Died,
}

impl Character {
    // ========================================================================
    // Transitions
    // ========================================================================

    /// Вход в состояние: сбрасывает таймеры, дедлайн и pending action
    ///
    /// Dead terminal, из Dying — только в Dead. Нелегальный переход игнорируется.
    pub fn enter_state(&mut self, state: CharacterState, now: f32) -> bool {
        match self.state {
            CharacterState::Dead => return false,
            CharacterState::Dying if state != CharacterState::Dead => return false,
            _ => {}
        }

        self.state = state;
        self.time_entered_state = now;
        self.state_deadline = None;
        self.action = None;
        self.full_guard = false;
        true
    }

    pub fn elapsed_in_state(&self, now: f32) -> f32 {
        now - self.time_entered_state
    }

    fn deadline_passed(&self, now: f32) -> bool {
        self.state_deadline.is_some_and(|deadline| now >= deadline)
    }

    // ========================================================================
    // Guards
    // ========================================================================

    pub fn can_move(&self) -> bool {
        self.state.is_neutral()
    }

    pub fn can_attack(&self) -> bool {
        self.state.is_neutral()
    }

    pub fn can_jump(&self) -> bool {
        self.state.is_neutral()
    }

    pub fn can_block(&self) -> bool {
        matches!(
            self.state,
            CharacterState::Idle | CharacterState::Walking | CharacterState::Hurt
        )
    }

    /// Жив и участвует в симуляции
    pub fn is_active(&self) -> bool {
        !matches!(self.state, CharacterState::Dying | CharacterState::Dead)
    }

    /// Блок держит удар из `origin`
    fn guards_against(&self, origin: Vec2, can_block: bool) -> bool {
        if self.full_guard {
            return true;
        }
        if !can_block {
            return false;
        }
        if self.facing_left {
            origin.x <= self.precise_position.x
        } else {
            origin.x >= self.precise_position.x
        }
    }

    /// Может ли персонаж сейчас получить урон из `origin`
    pub fn is_vulnerable(&self, origin: Vec2, can_block: bool, now: f32) -> bool {
        if now < self.invincible_until {
            return false;
        }

        match self.state {
            CharacterState::Hurt
            | CharacterState::Falling
            | CharacterState::Flying
            | CharacterState::Grounded
            | CharacterState::Summersaulting
            | CharacterState::Dropping
            | CharacterState::WaitingForDoor
            | CharacterState::WaitingForPlayer
            | CharacterState::Dying
            | CharacterState::Dead => false,
            CharacterState::Blocking => !self.guards_against(origin, can_block),
            CharacterState::Attacking => !self.action.is_some_and(|a| a.plan.immune),
            CharacterState::Idle
            | CharacterState::Walking
            | CharacterState::PreparingAttack
            | CharacterState::Jumping => true,
        }
    }

    // ========================================================================
    // Hit contract
    // ========================================================================

    /// Применить удар (урон только при `is_vulnerable`)
    ///
    /// Не уязвим → ничего не меняется (Ignored / Blocked).
    pub fn receive_hit(
        &mut self,
        health: &mut Health,
        profile: &CharacterProfile,
        event: &CombatEvent,
        now: f32,
    ) -> HitReport {
        if !self.is_vulnerable(event.origin, event.can_block, now) {
            if self.state == CharacterState::Blocking && now >= self.invincible_until {
                return HitReport::blocked();
            }
            return HitReport::ignored();
        }

        let damage = mitigate(event.amount, profile.armor).min(health.current);
        health.take_damage(damage);
        let lethal = !health.is_alive();

        let direction =
            knockback_direction(self.precise_position.x, event.origin.x, self.facing_left);
        if event.origin.x != self.precise_position.x {
            // Разворот к атакующему
            self.facing_left = direction > 0.0;
        }

        let airborne = self.height > 0.0;
        let outcome = match event.kind {
            HitKind::PowerEject => {
                self.enter_state(CharacterState::Flying, now);
                self.velocity = Vec2::new(direction * profile.eject_push, 0.0);
                self.d_height = profile.eject_lift;
                HitOutcome::Ejected
            }
            HitKind::Knockdown => self.knock_down(direction, profile, now),
            HitKind::Normal if lethal || airborne => self.knock_down(direction, profile, now),
            HitKind::Normal => {
                self.enter_state(CharacterState::Hurt, now);
                self.velocity = Vec2::new(direction * profile.hurt_push, 0.0);
                self.d_height = 0.0;
                self.state_deadline = Some(now + profile.hurt_timeout);
                HitOutcome::Hurt
            }
        };

        HitReport {
            outcome,
            damage,
            lethal,
        }
    }

    fn knock_down(&mut self, direction: f32, profile: &CharacterProfile, now: f32) -> HitOutcome {
        self.enter_state(CharacterState::Falling, now);
        self.velocity = Vec2::new(direction * profile.knockdown_push, 0.0);
        self.d_height = profile.knockdown_lift;
        HitOutcome::KnockedDown
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Движение по осям раздельно: сначала Y-only, затем X-only
    ///
    /// Заблокированная ось обнуляет свою компоненту velocity.
    /// Возвращает true если сдвинулись хотя бы по одной оси.
    pub fn attempt_move_to(&mut self, destination: Vec2, probe: &dyn MovementProbe) -> bool {
        let mut moved = false;

        let from = self.precise_position;
        if destination.y != from.y {
            let y_only = Vec2::new(from.x, destination.y);
            if probe.can_move_to(from, y_only) {
                self.precise_position.y = destination.y;
                moved = true;
            } else {
                self.velocity.y = 0.0;
            }
        }

        let from = self.precise_position;
        if destination.x != from.x {
            let x_only = Vec2::new(destination.x, from.y);
            if probe.can_move_to(from, x_only) {
                self.precise_position.x = destination.x;
                moved = true;
            } else {
                self.velocity.x = 0.0;
            }
        }

        moved
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Начать атаку с земли (aim > 0 → PreparingAttack, иначе сразу Attacking)
    pub fn begin_attack(&mut self, plan: AttackPlan, profile: &CharacterProfile, now: f32) -> bool {
        if !self.can_attack() {
            return false;
        }

        self.velocity = Vec2::ZERO;
        if plan.aim > 0.0 {
            self.enter_state(CharacterState::PreparingAttack, now);
            let action = AttackAction::new(plan, now);
            self.state_deadline = Some(action.ready_at);
            self.action = Some(action);
        } else {
            self.commit_attack(AttackAction::new(plan, now), profile, now);
        }
        true
    }

    fn commit_attack(&mut self, action: AttackAction, profile: &CharacterProfile, now: f32) {
        self.enter_state(CharacterState::Attacking, now);
        self.state_deadline = Some(now + action.plan.duration_cap.unwrap_or(profile.attack_timeout));
        self.action = Some(action);
    }

    /// Атака в прыжке (одна на прыжок, состояние остаётся Jumping)
    pub fn begin_air_attack(&mut self, plan: AttackPlan, now: f32) -> bool {
        if self.state != CharacterState::Jumping || self.action.is_some() {
            return false;
        }
        self.action = Some(AttackAction::new(plan.with_aim(0.0), now));
        true
    }

    /// Прыжок: горизонтальная скорость фиксируется на взлёте
    pub fn begin_jump(&mut self, horizontal: f32, lift: f32, now: f32) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.enter_state(CharacterState::Jumping, now);
        self.velocity = Vec2::new(horizontal, 0.0);
        self.d_height = lift;
        true
    }

    /// Блок на `duration`; `full_guard` — со всех сторон и от любых ударов
    pub fn begin_block(&mut self, duration: f32, full_guard: bool, now: f32) -> bool {
        if !self.can_block() {
            return false;
        }
        self.enter_state(CharacterState::Blocking, now);
        self.velocity = Vec2::ZERO;
        self.state_deadline = Some(now + duration);
        self.full_guard = full_guard;
        true
    }

    /// Сигнал "attack frame reached" → plan для hit-check (один раз на атаку)
    ///
    /// Charge игнорирует сигнал: его урон считает sweep систем босса.
    pub fn confirm_attack_frame(&mut self) -> Option<AttackPlan> {
        if !matches!(
            self.state,
            CharacterState::Attacking | CharacterState::Jumping
        ) {
            return None;
        }
        let action = self.action.as_mut()?;
        if action.frame_reached || action.plan.kind.is_core_driven() {
            return None;
        }
        action.frame_reached = true;
        Some(action.plan)
    }

    /// Сигнал "animation ended" → Idle (только Attacking non-charge и Hurt)
    pub fn finish_animation(&mut self, now: f32) -> bool {
        let finishes = match self.state {
            CharacterState::Hurt => true,
            CharacterState::Attacking => !self
                .action
                .is_some_and(|a| a.plan.kind.is_core_driven()),
            _ => false,
        };

        if finishes {
            self.velocity = Vec2::ZERO;
            self.enter_state(CharacterState::Idle, now);
        }
        finishes
    }

    /// Снять со staging ожидания (WaitingForPlayer / WaitingForDoor → Idle)
    pub fn release(&mut self, now: f32) -> bool {
        if matches!(
            self.state,
            CharacterState::WaitingForPlayer | CharacterState::WaitingForDoor
        ) {
            self.enter_state(CharacterState::Idle, now)
        } else {
            false
        }
    }

    /// Спрыгнуть с высоты (roof staging)
    pub fn begin_drop(&mut self, height: f32, now: f32) {
        if self.enter_state(CharacterState::Dropping, now) {
            self.height = height.max(0.0);
            self.d_height = 0.0;
            self.velocity = Vec2::ZERO;
        }
    }

    /// Respawn игрока: единственный выход из Dead
    pub fn respawn(
        &mut self,
        position: Vec2,
        health: &mut Health,
        profile: &CharacterProfile,
        now: f32,
    ) {
        self.state = CharacterState::Idle;
        self.time_entered_state = now;
        self.state_deadline = None;
        self.action = None;
        self.full_guard = false;
        self.precise_position = position;
        self.height = 0.0;
        self.velocity = Vec2::ZERO;
        self.d_height = 0.0;
        self.invincible_until = now + profile.getup_invincibility;
        health.restore();
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Таймеры и физика текущего состояния
    pub fn tick(
        &mut self,
        health: &Health,
        profile: &CharacterProfile,
        probe: &dyn MovementProbe,
        now: f32,
        dt: f32,
    ) -> StateSignal {
        match self.state {
            CharacterState::Idle
            | CharacterState::Walking
            | CharacterState::WaitingForDoor
            | CharacterState::WaitingForPlayer
            | CharacterState::Dead => StateSignal::None,

            CharacterState::PreparingAttack => {
                let Some(action) = self.action else {
                    self.enter_state(CharacterState::Idle, now);
                    return StateSignal::Recovered;
                };
                if now < action.ready_at {
                    return StateSignal::None;
                }
                self.commit_attack(action, profile, now);
                StateSignal::AttackCommitted(action.plan.kind)
            }

            CharacterState::Attacking | CharacterState::Blocking => {
                if self.deadline_passed(now) {
                    self.velocity = Vec2::ZERO;
                    self.enter_state(CharacterState::Idle, now);
                    StateSignal::Recovered
                } else {
                    StateSignal::None
                }
            }

            CharacterState::Hurt => {
                self.slide(profile, probe, dt);
                if self.deadline_passed(now) {
                    self.velocity = Vec2::ZERO;
                    self.enter_state(CharacterState::Idle, now);
                    StateSignal::Recovered
                } else {
                    StateSignal::None
                }
            }

            CharacterState::Jumping
            | CharacterState::Falling
            | CharacterState::Flying
            | CharacterState::Dropping => self.integrate_airborne(health, profile, probe, now, dt),

            CharacterState::Grounded => {
                if self.elapsed_in_state(now) < profile.duration_grounded {
                    return StateSignal::None;
                }
                if health.is_alive() {
                    self.get_up(profile, now);
                    StateSignal::GotUp
                } else {
                    self.enter_state(CharacterState::Dying, now);
                    StateSignal::DyingStarted
                }
            }

            CharacterState::Summersaulting => {
                if self.elapsed_in_state(now) < profile.duration_summersault {
                    return StateSignal::None;
                }
                self.get_up(profile, now);
                StateSignal::GotUp
            }

            CharacterState::Dying => {
                if self.elapsed_in_state(now) < profile.duration_dying {
                    return StateSignal::None;
                }
                self.enter_state(CharacterState::Dead, now);
                StateSignal::Died
            }
        }
    }

    /// Прогресс Dying в [0, 1] (для flicker)
    pub fn dying_progress(&self, profile: &CharacterProfile, now: f32) -> f32 {
        if self.state != CharacterState::Dying {
            return 0.0;
        }
        (self.elapsed_in_state(now) / profile.duration_dying).clamp(0.0, 1.0)
    }

    fn get_up(&mut self, profile: &CharacterProfile, now: f32) {
        self.enter_state(CharacterState::Idle, now);
        self.invincible_until = now + profile.getup_invincibility;
    }

    fn slide(&mut self, profile: &CharacterProfile, probe: &dyn MovementProbe, dt: f32) {
        let speed = self.velocity.x.abs();
        if speed <= f32::EPSILON {
            return;
        }
        let slowed = (speed - profile.hurt_friction * dt).max(0.0);
        self.velocity.x = slowed.copysign(self.velocity.x);

        let destination = self.precise_position + Vec2::new(self.velocity.x * dt, 0.0);
        self.attempt_move_to(destination, probe);
    }

    fn integrate_airborne(
        &mut self,
        health: &Health,
        profile: &CharacterProfile,
        probe: &dyn MovementProbe,
        now: f32,
        dt: f32,
    ) -> StateSignal {
        if self.velocity != Vec2::ZERO {
            let destination = self.precise_position + self.velocity * dt;
            self.attempt_move_to(destination, probe);
        }

        self.d_height -= profile.gravity * dt;
        self.height += self.d_height * dt;

        if self.height > 0.0 {
            return StateSignal::None;
        }

        self.height = 0.0;
        self.d_height = 0.0;
        self.velocity = Vec2::ZERO;

        let next = match self.state {
            CharacterState::Falling => CharacterState::Grounded,
            CharacterState::Flying if health.is_alive() && profile.summersault_recovery => {
                CharacterState::Summersaulting
            }
            CharacterState::Flying => CharacterState::Grounded,
            _ => CharacterState::Idle,
        };
        self.enter_state(next, now);
        StateSignal::Landed
    }
}
