use super::*;

fn snapshot_with(obstacles: &[(u32, Obstacle)]) -> ColliderSnapshot {
    let mut snapshot = ColliderSnapshot::default();
    for (index, obstacle) in obstacles {
        snapshot.insert(
            Entity::from_raw(*index),
            obstacle.bounds(),
            obstacle_groups(obstacle).memberships,
        );
    }
    snapshot
}

#[test]
fn test_zero_length_probe_is_unobstructed() {
    let snapshot = snapshot_with(&[(1, Obstacle::wall(Vec2::new(10.0, 0.0), Vec2::splat(5.0)))]);
    let filters = groups_for(ActorCategory::Player).filters;

    assert!(snapshot.can_move_to(None, filters, Vec2::new(3.0, 0.0), Vec2::new(3.0, 0.0)));
}

#[test]
fn test_wall_blocks_both_categories() {
    let snapshot = snapshot_with(&[(1, Obstacle::wall(Vec2::new(20.0, 0.0), Vec2::splat(5.0)))]);
    let from = Vec2::new(0.0, 0.0);
    let to = Vec2::new(12.0, 0.0); // 12 + skin 6 → достаёт до стены на 15

    for category in [ActorCategory::Player, ActorCategory::Enemy] {
        let filters = groups_for(category).filters;
        assert!(!snapshot.can_move_to(None, filters, from, to), "{:?}", category);
    }
}

#[test]
fn test_probe_skin_limits_range() {
    let snapshot = snapshot_with(&[(1, Obstacle::wall(Vec2::new(40.0, 0.0), Vec2::splat(5.0)))]);
    let filters = groups_for(ActorCategory::Enemy).filters;

    // 10 + 6 = 16 < 35
    assert!(snapshot.can_move_to(None, filters, Vec2::ZERO, Vec2::new(10.0, 0.0)));
}

#[test]
fn test_breakable_blocks_only_player() {
    let snapshot =
        snapshot_with(&[(1, Obstacle::breakable(Vec2::new(15.0, 0.0), Vec2::splat(4.0)))]);
    let from = Vec2::ZERO;
    let to = Vec2::new(8.0, 0.0);

    let enemy = groups_for(ActorCategory::Enemy).filters;
    let player = groups_for(ActorCategory::Player).filters;

    assert!(snapshot.can_move_to(None, enemy, from, to));
    assert!(!snapshot.can_move_to(None, player, from, to));
}

#[test]
fn test_self_collider_ignored() {
    let actor = Entity::from_raw(7);
    let mut snapshot = ColliderSnapshot::default();
    snapshot.insert(
        actor,
        Aabb2d::new(Vec2::new(5.0, 0.0), Vec2::splat(3.0)),
        groups_for(ActorCategory::Enemy).memberships,
    );
    let filters = groups_for(ActorCategory::Enemy).filters;

    assert!(snapshot.can_move_to(Some(actor), filters, Vec2::ZERO, Vec2::new(4.0, 0.0)));
    assert!(!snapshot.can_move_to(None, filters, Vec2::ZERO, Vec2::new(4.0, 0.0)));
}

#[test]
fn test_enemies_block_each_other_but_not_player_layer() {
    let grunt = Entity::from_raw(3);
    let mut snapshot = ColliderSnapshot::default();
    snapshot.insert(
        grunt,
        Aabb2d::new(Vec2::new(12.0, 0.0), Vec2::new(8.0, 4.0)),
        groups_for(ActorCategory::Enemy).memberships,
    );
    snapshot.insert(
        Entity::from_raw(4),
        Aabb2d::new(Vec2::new(0.0, 30.0), Vec2::new(8.0, 4.0)),
        groups_for(ActorCategory::Player).memberships,
    );
    let enemy = groups_for(ActorCategory::Enemy).filters;

    assert!(!snapshot.can_move_to(None, enemy, Vec2::ZERO, Vec2::new(2.0, 0.0)));
    // Игрок не в фильтре врагов
    assert!(snapshot.can_move_to(None, enemy, Vec2::new(0.0, 20.0), Vec2::new(0.0, 22.0)));
}

#[test]
fn test_overlapping_start_does_not_lock_actor() {
    let snapshot = snapshot_with(&[(1, Obstacle::wall(Vec2::ZERO, Vec2::splat(5.0)))]);
    let filters = groups_for(ActorCategory::Player).filters;

    assert!(snapshot.can_move_to(None, filters, Vec2::new(1.0, 1.0), Vec2::new(3.0, 1.0)));
}

#[test]
fn test_actor_probe_uses_category_filters() {
    let snapshot =
        snapshot_with(&[(1, Obstacle::breakable(Vec2::new(10.0, 0.0), Vec2::splat(3.0)))]);
    let grunt = ActorProbe::new(&snapshot, Entity::from_raw(9), ActorCategory::Enemy);
    let player = ActorProbe::new(&snapshot, Entity::from_raw(8), ActorCategory::Player);

    assert!(grunt.can_move_to(Vec2::ZERO, Vec2::new(4.0, 0.0)));
    assert!(!player.can_move_to(Vec2::ZERO, Vec2::new(4.0, 0.0)));
}

// ============================================================================
// attempt_move_to поверх реального snapshot
// ============================================================================

fn side_wall() -> ColliderSnapshot {
    // x ∈ [0, 16], y ∈ [-10, 30]
    snapshot_with(&[(1, Obstacle::wall(Vec2::new(8.0, 10.0), Vec2::new(8.0, 20.0)))])
}

#[test]
fn test_depth_walk_along_side_wall_is_free() {
    let snapshot = side_wall();
    let actor = Entity::from_raw(20);
    let probe = ActorProbe::new(&snapshot, actor, ActorCategory::Player);
    let mut me = Character::new(ActorCategory::Player, Vec2::new(20.5, 10.0));

    assert!(me.attempt_move_to(Vec2::new(20.5, 10.83), &probe));
    assert_eq!(me.precise_position, Vec2::new(20.5, 10.83));

    // Дробные шаги по глубине тик за тиком
    for _ in 0..12 {
        let next = me.precise_position + Vec2::new(0.0, 0.83);
        assert!(me.attempt_move_to(next, &probe), "застрял на {:?}", me.precise_position);
    }
    assert!(me.precise_position.y > 19.0);
    assert_eq!(me.precise_position.x, 20.5);
}

#[test]
fn test_horizontal_walk_along_floor_wall_is_free() {
    // y ∈ [0, 8]
    let snapshot =
        snapshot_with(&[(1, Obstacle::wall(Vec2::new(40.0, 4.0), Vec2::new(40.0, 4.0)))]);
    let probe = ActorProbe::new(&snapshot, Entity::from_raw(21), ActorCategory::Enemy);
    let mut me = Character::new(ActorCategory::Enemy, Vec2::new(20.0, 10.5));

    assert!(me.attempt_move_to(Vec2::new(21.5, 10.5), &probe));
    assert_eq!(me.precise_position, Vec2::new(21.5, 10.5));
}

#[test]
fn test_diagonal_into_wall_slides_on_free_axis() {
    let snapshot = side_wall();
    let probe = ActorProbe::new(&snapshot, Entity::from_raw(22), ActorCategory::Player);
    let mut me = Character::new(ActorCategory::Player, Vec2::new(22.4, 10.2));
    me.velocity = Vec2::new(-66.0, 54.0);

    assert!(me.attempt_move_to(Vec2::new(21.3, 11.1), &probe));

    // Y прошёл, X упёрся в стену (6px + skin достаёт до x=16)
    assert_eq!(me.precise_position, Vec2::new(22.4, 11.1));
    assert_eq!(me.velocity, Vec2::new(0.0, 54.0));
}
