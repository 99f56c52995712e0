use super::*;
use bevy::prelude::*;

#[test]
fn test_knockback_away_from_origin() {
    assert_eq!(knockback_direction(100.0, 80.0, false), 1.0);
    assert_eq!(knockback_direction(100.0, 120.0, false), -1.0);
}

#[test]
fn test_knockback_tie_opposite_to_facing() {
    assert_eq!(knockback_direction(50.0, 50.0, true), 1.0);
    assert_eq!(knockback_direction(50.0, 50.0, false), -1.0);
}

#[test]
fn test_mitigate_armor() {
    assert_eq!(mitigate(10, 3), 7);
    assert_eq!(mitigate(2, 5), 1, "ненулевой удар снимает минимум 1");
    assert_eq!(mitigate(0, 5), 0);
    assert_eq!(mitigate(4, 0), 4);
}

#[test]
fn test_reach_window_front_only() {
    let reach = ReachWindow {
        forward: 30.0,
        depth: 6.0,
        height: 10.0,
    };
    let attacker = Vec2::new(100.0, 20.0);

    assert!(reach.contains(attacker, 0.0, false, Vec2::new(120.0, 22.0), 0.0));
    assert!(!reach.contains(attacker, 0.0, false, Vec2::new(80.0, 20.0), 0.0), "за спиной");
    assert!(reach.contains(attacker, 0.0, true, Vec2::new(80.0, 20.0), 0.0));
    assert!(!reach.contains(attacker, 0.0, false, Vec2::new(140.0, 20.0), 0.0), "слишком далеко");
    assert!(!reach.contains(attacker, 0.0, false, Vec2::new(110.0, 30.0), 0.0), "другая глубина");
    assert!(!reach.contains(attacker, 0.0, false, Vec2::new(110.0, 20.0), 40.0), "в воздухе");
}

#[test]
fn test_oscillate_even_tenths_visible() {
    assert!(oscillate(0.0));
    assert!(oscillate(0.05));
    assert!(!oscillate(0.15));
    assert!(oscillate(0.25));
    assert!(!oscillate(0.95));
    assert!(oscillate(1.0));
}

#[test]
fn test_score_uses_streak_multiplier() {
    assert_eq!(score_for(3, 1), 30);
    assert_eq!(score_for(3, 4), 120);
    assert_eq!(score_for(5, 0), 50, "серия 0 считается как 1");
}

#[test]
fn test_outcome_landed() {
    assert!(HitOutcome::Hurt.landed());
    assert!(HitOutcome::Ejected.landed());
    assert!(!HitOutcome::Blocked.landed());
    assert!(!HitOutcome::Ignored.landed());
}

#[test]
fn test_ranged_kinds() {
    assert!(AttackKind::KnifeThrow.is_ranged());
    assert!(AttackKind::GunShot.is_ranged());
    assert!(!AttackKind::Charge.is_ranged());
    assert!(AttackKind::Charge.is_core_driven());
}
