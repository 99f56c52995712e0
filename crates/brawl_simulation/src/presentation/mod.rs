//! Presentation boundary (core ↔ движок анимаций)
//!
//! Presentation → core:
//! - `AttackFrameReached` — кадр удара (запускает hit-check)
//! - `AnimationEnded` — конец анимации атаки/hurt
//! - `PresentedAnimation` — какой клип сейчас реально играет (для consistency check)
//!
//! Core → presentation:
//! - `PresentationIntents` — семантические флаги + одноразовые триггеры
//! - `FacingChanged`
//!
//! `ScriptedPresentationPlugin` — headless заменитель движка (демо и тесты):
//! шлёт сигналы по фиксированным таймингам, как это делала бы анимация.

use bevy::prelude::*;

use crate::behavior::SimulationSet;
use crate::combat::{oscillate, AttackKind, FacingChanged};
use crate::components::{Character, CharacterProfile, CharacterState, PresentationIntents};


// ============================================================================
// Boundary types
// ============================================================================

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackFrameReached {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationEnded {
    pub entity: Entity,
}

/// Семантический клип (ядро не знает имён анимаций движка)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AnimationClip {
    Idle,
    Walk,
    Prepare,
    Attack(AttackKind),
    Block,
    Hurt,
    Airborne,
    Grounded,
    Roll,
    Dying,
    Hidden,
}

impl AnimationClip {
    /// Клип, который соответствует логическому состоянию
    pub fn expected_for(character: &Character) -> Self {
        match character.state {
            CharacterState::Idle
            | CharacterState::WaitingForPlayer
            | CharacterState::WaitingForDoor => AnimationClip::Idle,
            CharacterState::Walking => AnimationClip::Walk,
            CharacterState::PreparingAttack => AnimationClip::Prepare,
            CharacterState::Attacking => character
                .action
                .map(|a| AnimationClip::Attack(a.plan.kind))
                .unwrap_or(AnimationClip::Idle),
            CharacterState::Blocking => AnimationClip::Block,
            CharacterState::Hurt => AnimationClip::Hurt,
            CharacterState::Jumping => match character.action {
                Some(action) => AnimationClip::Attack(action.plan.kind),
                None => AnimationClip::Airborne,
            },
            CharacterState::Flying | CharacterState::Falling | CharacterState::Dropping => {
                AnimationClip::Airborne
            }
            CharacterState::Grounded => AnimationClip::Grounded,
            CharacterState::Summersaulting => AnimationClip::Roll,
            CharacterState::Dying => AnimationClip::Dying,
            CharacterState::Dead => AnimationClip::Hidden,
        }
    }
}

/// Клип, который presentation слой реально проигрывает
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PresentedAnimation {
    pub clip: Option<AnimationClip>,
}

// ============================================================================
// Systems
// ============================================================================

/// Триггеры живут один tick
pub fn clear_presentation_triggers(mut intents: Query<&mut PresentationIntents>) {
    for mut intent in intents.iter_mut() {
        intent.triggers.clear();
    }
}

/// AnimationEnded → Attacking/Hurt → Idle
pub fn apply_animation_end_signals(
    time: Res<Time<Fixed>>,
    mut signals: EventReader<AnimationEnded>,
    mut characters: Query<&mut Character>,
) {
    let now = time.elapsed_secs();

    for signal in signals.read() {
        let Ok(mut character) = characters.get_mut(signal.entity) else {
            continue;
        };
        character.finish_animation(now);
    }
}

/// Флаги intents из логического состояния + FacingChanged
pub fn publish_presentation_intents(
    time: Res<Time<Fixed>>,
    mut characters: Query<(Entity, &Character, &CharacterProfile, &mut PresentationIntents)>,
    mut facing_events: EventWriter<FacingChanged>,
) {
    let now = time.elapsed_secs();

    for (entity, character, profile, mut intents) in characters.iter_mut() {
        let state = character.state;

        if intents.facing_left != character.facing_left {
            intents.facing_left = character.facing_left;
            facing_events.write(FacingChanged {
                entity,
                facing_left: character.facing_left,
            });
        }

        // Dying/Dead не выдают intents (кроме flicker)
        let active = character.is_active();
        intents.walking = active && state == CharacterState::Walking;
        intents.preparing = active && state == CharacterState::PreparingAttack;
        intents.attacking = active && character.action.is_some();
        intents.airborne = active && state.is_airborne();
        intents.falling =
            active && matches!(state, CharacterState::Falling | CharacterState::Flying);
        intents.grounded = active && state == CharacterState::Grounded;
        intents.blocking = active && state == CharacterState::Blocking;
        intents.hurt = active && state == CharacterState::Hurt;
        intents.dying = state == CharacterState::Dying;
        intents.visible = match state {
            CharacterState::Dying => oscillate(character.dying_progress(profile, now)),
            CharacterState::Dead => false,
            _ => true,
        };
    }
}

/// Presentation plugin (boundary events + публикация intents)
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackFrameReached>()
            .add_event::<AnimationEnded>()
            .add_systems(
                FixedUpdate,
                clear_presentation_triggers.in_set(SimulationSet::Prepare),
            )
            .add_systems(
                FixedUpdate,
                apply_animation_end_signals.in_set(SimulationSet::React),
            )
            .add_systems(
                FixedUpdate,
                publish_presentation_intents.in_set(SimulationSet::Publish),
            );
    }
}

// ============================================================================
// Headless presentation driver
// ============================================================================

/// Тайминги headless "анимаций" (секунды от входа в состояние)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ScriptedAnimationTimings {
    pub attack_frame: f32,
    pub attack_end: f32,
    pub hurt_end: f32,
}

impl Default for ScriptedAnimationTimings {
    fn default() -> Self {
        Self {
            attack_frame: 0.15,
            attack_end: 0.35,
            hurt_end: 0.3,
        }
    }
}

/// Шлёт AttackFrameReached / AnimationEnded как движок анимаций
/// и отражает текущий клип в `PresentedAnimation`
pub fn drive_scripted_animations(
    time: Res<Time<Fixed>>,
    timings: Res<ScriptedAnimationTimings>,
    mut characters: Query<(Entity, &Character, Option<&mut PresentedAnimation>)>,
    mut frames: EventWriter<AttackFrameReached>,
    mut endings: EventWriter<AnimationEnded>,
) {
    let now = time.elapsed_secs();

    for (entity, character, presented) in characters.iter_mut() {
        if let Some(mut presented) = presented {
            let clip = Some(AnimationClip::expected_for(character));
            if presented.clip != clip {
                presented.clip = clip;
            }
        }

        match character.state {
            CharacterState::Attacking | CharacterState::Jumping => {
                let Some(action) = character.action else {
                    continue;
                };
                if action.plan.kind.is_core_driven() {
                    continue;
                }
                let elapsed = now - action.ready_at;
                if !action.frame_reached {
                    if elapsed >= timings.attack_frame {
                        frames.write(AttackFrameReached { entity });
                    }
                } else if character.state == CharacterState::Attacking
                    && elapsed >= timings.attack_end
                {
                    endings.write(AnimationEnded { entity });
                }
            }
            CharacterState::Hurt => {
                if character.elapsed_in_state(now) >= timings.hurt_end {
                    endings.write(AnimationEnded { entity });
                }
            }
            _ => {}
        }
    }
}

/// Headless заменитель движка анимаций (демо, интеграционные тесты)
pub struct ScriptedPresentationPlugin;

impl Plugin for ScriptedPresentationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScriptedAnimationTimings>().add_systems(
            FixedUpdate,
            drive_scripted_animations
                .in_set(SimulationSet::Publish)
                .after(publish_presentation_intents),
        );
    }
}
