use super::*;
use crate::components::ActorCategory;
use crate::spatial::{FnProbe, Unobstructed};

const DT: f32 = 1.0 / 60.0;

fn walker() -> (Character, PresentationIntents) {
    (
        Character::new(ActorCategory::Enemy, Vec2::new(100.0, 20.0)),
        PresentationIntents::default(),
    )
}

#[test]
fn test_step_walks_and_faces_direction() {
    let (mut me, mut intents) = walker();

    apply_movement(&mut me, &mut intents, MovementDecision::Step(Vec2::new(-60.0, 0.0)), &Unobstructed, 0.0, DT);

    assert_eq!(me.state, CharacterState::Walking);
    assert!(me.facing_left);
    assert!(me.precise_position.x < 100.0);
}

#[test]
fn test_hold_returns_to_idle() {
    let (mut me, mut intents) = walker();
    apply_movement(&mut me, &mut intents, MovementDecision::Step(Vec2::new(60.0, 0.0)), &Unobstructed, 0.0, DT);
    apply_movement(&mut me, &mut intents, MovementDecision::Hold, &Unobstructed, DT, DT);

    assert_eq!(me.state, CharacterState::Idle);
    assert_eq!(me.velocity, Vec2::ZERO);
    assert!(!me.facing_left);
}

#[test]
fn test_fully_blocked_step_stays_idle() {
    let (mut me, mut intents) = walker();
    let wall = FnProbe(|_: Vec2, _: Vec2| false);

    apply_movement(&mut me, &mut intents, MovementDecision::Step(Vec2::new(60.0, 30.0)), &wall, 0.0, DT);

    assert_eq!(me.state, CharacterState::Idle);
    assert_eq!(me.precise_position, Vec2::new(100.0, 20.0));
}

#[test]
fn test_jump_decision_triggers_intent() {
    let (mut me, mut intents) = walker();

    apply_movement(
        &mut me,
        &mut intents,
        MovementDecision::Jump { horizontal: -40.0, lift: 250.0 },
        &Unobstructed,
        0.0,
        DT,
    );

    assert_eq!(me.state, CharacterState::Jumping);
    assert!(me.facing_left);
    assert!(intents.has_trigger(IntentTrigger::Jump));
}

#[test]
fn test_target_view_engageable() {
    let mut player = Character::new(ActorCategory::Player, Vec2::ZERO);
    let view = TargetView::from_character(Entity::from_raw(1), &player);
    assert!(view.is_engageable());

    player.state = CharacterState::Dying;
    assert!(!TargetView::from_character(Entity::from_raw(1), &player).is_engageable());
}
