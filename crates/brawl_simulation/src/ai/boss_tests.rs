use super::*;
use crate::behavior::{ActionDecision, BehaviorContext, CombatBehavior, MovementDecision, TargetView};
use crate::combat::{
    AttackKind, AttackResolved, CombatEvent, HealthChanged, HitKind, HitLanded, HitOutcome,
};
use crate::components::{
    ActorCategory, Character, CharacterProfile, CharacterState, Health, IntentTrigger,
    PresentationIntents, ScreenBounds,
};
use crate::presentation::{AnimationClip, PresentedAnimation};
use crate::spatial::{world_layer, ColliderSnapshot, Unobstructed};
use bevy::ecs::system::RunSystemOnce;
use bevy::math::bounding::Aabb2d;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;
const BOSS: Entity = Entity::PLACEHOLDER;

fn target_at(position: Vec2) -> TargetView {
    TargetView {
        entity: Entity::from_raw(1),
        position,
        height: 0.0,
        state: CharacterState::Idle,
    }
}

fn think(
    brain: &mut BossBrain,
    me: &mut Character,
    target: Option<TargetView>,
    now: f32,
) -> (Option<ActionDecision>, MovementDecision) {
    let profile = CharacterProfile::boss(brain.config.max_hp, brain.config.armor);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut ctx = BehaviorContext {
        entity: BOSS,
        now,
        dt: DT,
        target,
        screen: ScreenBounds::default(),
        profile: &profile,
        rng: &mut rng,
        input: None,
        pickups: &[],
    };
    brain.update(me, &mut ctx);
    let action = brain.decide_attack(me, &mut ctx);
    let movement = brain.decide_movement(me, &mut ctx);
    (action, movement)
}

fn landed(outcome: HitOutcome, kind: HitKind) -> HitLanded {
    HitLanded {
        attacker: Some(Entity::from_raw(1)),
        target: BOSS,
        damage: 2,
        kind,
        outcome,
        lethal: false,
    }
}

fn boss_at(position: Vec2) -> Character {
    Character::new(ActorCategory::Enemy, position).with_facing_left(true)
}

// ============================================================================
// Block phase
// ============================================================================

#[test]
fn test_block_phase_ignores_every_hit_kind() {
    let config = BossConfig::bruiser();
    let profile = CharacterProfile::boss(config.max_hp, config.armor);
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let mut health = Health::new(config.max_hp);

    assert!(me.begin_block(config.block.duration, true, 0.0));

    let events = [
        CombatEvent::new(Vec2::new(130.0, 20.0), 5, HitKind::Normal),
        CombatEvent::new(Vec2::new(170.0, 20.0), 50, HitKind::Knockdown),
        CombatEvent::new(Vec2::new(170.0, 20.0), 99, HitKind::PowerEject).unblockable(),
    ];
    for event in &events {
        let report = me.receive_hit(&mut health, &profile, event, 0.2);
        assert_eq!(report.outcome, HitOutcome::Blocked);
        assert_eq!(report.damage, 0);
    }

    assert_eq!(health.current, config.max_hp);
    assert_eq!(me.state, CharacterState::Blocking);
}

#[test]
fn test_block_phase_ends_on_timer() {
    let config = BossConfig::bruiser();
    let profile = CharacterProfile::boss(config.max_hp, config.armor);
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let mut health = Health::new(config.max_hp);
    me.begin_block(config.block.duration, true, 0.0);

    let mut now = 0.0;
    while now < config.block.duration + 0.1 {
        now += DT;
        me.tick(&health, &profile, &Unobstructed, now, DT);
    }
    assert_eq!(me.state, CharacterState::Idle);

    let event = CombatEvent::new(Vec2::new(130.0, 20.0), 5, HitKind::Normal);
    let report = me.receive_hit(&mut health, &profile, &event, now);
    assert_eq!(report.outcome, HitOutcome::Hurt);
    assert_eq!(health.current, config.max_hp - (5 - config.armor));
}

#[test]
fn test_block_phase_ends_after_blocked_hit_budget() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    me.begin_block(10.0, true, 0.0);

    let budget = brain.config.block.max_blocked_hits;
    for i in 0..budget - 1 {
        brain.on_hit(&mut me, &landed(HitOutcome::Blocked, HitKind::Normal), 0.1 * i as f32);
        assert_eq!(me.state, CharacterState::Blocking);
    }
    brain.on_hit(&mut me, &landed(HitOutcome::Blocked, HitKind::Normal), 1.0);

    assert_eq!(me.state, CharacterState::Idle);
    assert!(me.is_vulnerable(Vec2::new(130.0, 20.0), true, 1.0));
}

#[test]
fn test_consecutive_hits_trigger_block() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    brain.engage();
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let trigger = brain.config.block.trigger_hits;

    for _ in 0..trigger {
        brain.on_hit(&mut me, &landed(HitOutcome::Hurt, HitKind::Normal), 0.0);
    }
    assert!(brain.block_pending);

    // Даже из Hurt босс уходит в блок
    me.enter_state(CharacterState::Hurt, 0.0);
    let (action, _) = think(&mut brain, &mut me, Some(target_at(Vec2::new(130.0, 20.0))), 0.1);
    assert_eq!(
        action,
        Some(ActionDecision::Block {
            duration: brain.config.block.duration,
            full_guard: true,
        })
    );
    assert!(!brain.block_pending);
}

#[test]
fn test_knockdown_interrupts_block_trigger() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    let mut me = boss_at(Vec2::new(150.0, 20.0));

    brain.on_hit(&mut me, &landed(HitOutcome::Hurt, HitKind::Normal), 0.0);
    brain.on_hit(&mut me, &landed(HitOutcome::Hurt, HitKind::Normal), 0.1);
    brain.on_hit(&mut me, &landed(HitOutcome::KnockedDown, HitKind::Knockdown), 0.2);

    assert!(!brain.block_pending);
    assert_eq!(brain.consecutive_hits, 0);
}

#[test]
fn test_enforcer_blocks_sooner_than_bruiser() {
    assert!(BossConfig::enforcer().block.trigger_hits < BossConfig::bruiser().block.trigger_hits);
}

// ============================================================================
// Armor / selector / forced charge
// ============================================================================

#[test]
fn test_armor_reduces_but_never_nullifies() {
    let config = BossConfig::enforcer();
    let profile = CharacterProfile::boss(config.max_hp, config.armor);
    let mut health = Health::new(config.max_hp);

    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let heavy = CombatEvent::new(Vec2::new(130.0, 20.0), 5, HitKind::Normal);
    assert_eq!(me.receive_hit(&mut health, &profile, &heavy, 0.0).damage, 5 - config.armor);

    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let jab = CombatEvent::new(Vec2::new(130.0, 20.0), 1, HitKind::Normal);
    assert_eq!(me.receive_hit(&mut health, &profile, &jab, 0.0).damage, 1);
}

#[test]
fn test_selector_only_picks_configured_attacks() {
    let bruiser = BossConfig::bruiser();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let picks: Vec<BossAttack> = (0..200).map(|_| bruiser.pick_attack(&mut rng)).collect();

    assert!(picks.contains(&BossAttack::Strike));
    assert!(picks.contains(&BossAttack::Charge));
    assert!(!picks.contains(&BossAttack::HeavyStrike));
}

#[test]
fn test_selector_is_deterministic_per_seed() {
    let enforcer = BossConfig::enforcer();
    let run = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..32).map(|_| enforcer.pick_attack(&mut rng)).collect::<Vec<_>>()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn test_enforcer_forced_charge_after_light_hits() {
    let mut brain = BossBrain::new(BossConfig::enforcer());
    brain.engage();
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    let threshold = brain.config.forced_charge_hits.unwrap_or(0);

    for _ in 0..threshold {
        brain.on_hit(&mut me, &landed(HitOutcome::Hurt, HitKind::Normal), 0.0);
    }
    assert!(brain.forced_charge);

    // Блок-фаза не должна перехватить выбор в этом тесте
    brain.block_pending = false;
    think(&mut brain, &mut me, Some(target_at(Vec2::new(100.0, 20.0))), 0.5);
    assert_eq!(brain.selected, Some(BossAttack::Charge));
    assert!(!brain.forced_charge);
}

#[test]
fn test_bruiser_has_no_forced_charge() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    let mut me = boss_at(Vec2::new(150.0, 20.0));
    for _ in 0..10 {
        brain.on_hit(&mut me, &landed(HitOutcome::Hurt, HitKind::Normal), 0.0);
    }
    assert!(!brain.forced_charge);
}

#[test]
fn test_waiting_boss_does_nothing_until_engaged() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    let mut me = boss_at(Vec2::new(150.0, 20.0)).with_state(CharacterState::WaitingForPlayer);

    let (action, movement) = think(&mut brain, &mut me, Some(target_at(Vec2::new(120.0, 20.0))), 0.0);
    assert!(action.is_none());
    assert_eq!(movement, MovementDecision::Hold);
    assert_eq!(brain.selected, None);
}

#[test]
fn test_charge_plan_from_screen_edge() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    brain.engage();
    brain.selected = Some(BossAttack::Charge);
    let edge = ScreenBounds::default().left + brain.config.charge.edge_margin;
    let mut me = boss_at(Vec2::new(edge, 20.0));

    let (action, _) = think(&mut brain, &mut me, Some(target_at(Vec2::new(200.0, 20.0))), 0.0);

    let Some(ActionDecision::Attack(plan)) = action else {
        panic!("ожидали charge, получили {:?}", action);
    };
    assert!(!me.facing_left, "разворот к игроку");
    assert_eq!(plan.kind, AttackKind::Charge);
    assert_eq!(plan.hit, HitKind::PowerEject);
    assert!(plan.immune);
    assert!(!plan.can_block);
    assert_eq!(plan.duration_cap, Some(brain.config.charge.duration_cap));
    assert_eq!(brain.selected, None);
}

#[test]
fn test_strike_selected_walks_to_adjacent_spot() {
    let mut brain = BossBrain::new(BossConfig::bruiser());
    brain.engage();
    brain.selected = Some(BossAttack::Strike);
    let mut me = boss_at(Vec2::new(250.0, 20.0));

    let (action, movement) = think(&mut brain, &mut me, Some(target_at(Vec2::new(100.0, 20.0))), 0.0);

    assert!(action.is_none());
    assert!(matches!(movement, MovementDecision::Step(v) if v.x < 0.0));
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = BossConfig::bruiser();
    config.attacks.clear();
    assert_eq!(
        config.validate(),
        Err(crate::config::ConfigError::EmptySelector { field: "boss.attacks" })
    );
    assert_eq!(BossConfig::enforcer().validate(), Ok(()));
}

// ============================================================================
// Charge sweep (ECS)
// ============================================================================

fn charge_world() -> World {
    let mut world = World::new();
    let mut time = Time::<Fixed>::default();
    time.advance_by(Duration::from_secs_f32(DT));
    world.insert_resource(time);
    world.insert_resource(ScreenBounds::default());
    world.insert_resource(ColliderSnapshot::default());
    world.init_resource::<Events<HitLanded>>();
    world.init_resource::<Events<HealthChanged>>();
    world.init_resource::<Events<AttackResolved>>();
    world
}

fn spawn_charging_boss(world: &mut World, position: Vec2) -> Entity {
    let brain = BossBrain::new(BossConfig::bruiser());
    let profile = CharacterProfile::boss(brain.config.max_hp, brain.config.armor);
    let plan = brain.plan_for(BossAttack::Charge, 0.0);
    let mut me = Character::new(ActorCategory::Enemy, position);
    assert!(me.begin_attack(plan, &profile, 0.0));
    world.spawn((me, profile, brain)).id()
}

fn run_charge(world: &mut World, boss: Entity) {
    for _ in 0..200 {
        world
            .run_system_once(systems::advance_boss_charges)
            .expect("charge system runs");
        if world.get::<Character>(boss).map(|c| c.state) != Some(CharacterState::Attacking) {
            break;
        }
    }
}

#[test]
fn test_charge_ejects_player_in_swept_path_once() {
    let mut world = charge_world();
    let boss = spawn_charging_boss(&mut world, Vec2::new(40.0, 20.0));
    let player = world
        .spawn((
            Character::new(ActorCategory::Player, Vec2::new(50.0, 20.0)),
            Health::new(50),
            CharacterProfile::player(),
        ))
        .id();

    run_charge(&mut world, boss);

    let boss_state = world.get::<Character>(boss).map(|c| (c.state, c.precise_position.x));
    let end_x = ScreenBounds::default().right - BossConfig::bruiser().charge.edge_margin;
    assert_eq!(boss_state, Some((CharacterState::Idle, end_x)));

    let victim = world.get::<Character>(player).map(|c| c.state);
    assert_eq!(victim, Some(CharacterState::Flying));
    assert_eq!(world.get::<Health>(player).map(|h| h.current), Some(50 - 6));

    let hits = world.resource::<Events<HitLanded>>();
    assert_eq!(hits.len(), 1, "один PowerEject за рывок");

    let resolved: Vec<_> = world
        .resource::<Events<AttackResolved>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].landed);
    assert_eq!(resolved[0].kind, AttackKind::Charge);
}

#[test]
fn test_charge_misses_player_outside_sweep() {
    let mut world = charge_world();
    let boss = spawn_charging_boss(&mut world, Vec2::new(40.0, 20.0));
    let player = world
        .spawn((
            Character::new(ActorCategory::Player, Vec2::new(150.0, 50.0)),
            Health::new(50),
            CharacterProfile::player(),
        ))
        .id();

    run_charge(&mut world, boss);

    assert_eq!(world.get::<Health>(player).map(|h| h.current), Some(50));
    assert_eq!(world.resource::<Events<HitLanded>>().len(), 0);
}

#[test]
fn test_charge_stops_at_wall() {
    let mut world = charge_world();
    world.resource_mut::<ColliderSnapshot>().insert(
        Entity::from_raw(99),
        Aabb2d::new(Vec2::new(60.0, 20.0), Vec2::new(4.0, 20.0)),
        world_layer(),
    );
    let boss = spawn_charging_boss(&mut world, Vec2::new(40.0, 20.0));

    run_charge(&mut world, boss);

    let boss_state = world.get::<Character>(boss).map(|c| (c.state, c.precise_position.x < 56.0));
    assert_eq!(boss_state, Some((CharacterState::Idle, true)));

    let resolved: Vec<_> = world
        .resource::<Events<AttackResolved>>()
        .iter_current_update_events()
        .copied()
        .collect();
    assert_eq!(resolved.len(), 1);
    assert!(!resolved[0].landed);
}

fn resolved_charges(world: &World) -> Vec<AttackResolved> {
    world
        .resource::<Events<AttackResolved>>()
        .iter_current_update_events()
        .copied()
        .collect()
}

#[test]
fn test_charge_cut_by_duration_cap_is_resolved() {
    let mut world = charge_world();
    let boss = spawn_charging_boss(&mut world, Vec2::new(40.0, 20.0));

    world
        .run_system_once(systems::advance_boss_charges)
        .expect("charge system runs");
    assert!(world.get::<BossBrain>(boss).is_some_and(|b| b.charge.is_some()));
    assert!(resolved_charges(&world).is_empty());

    // Дедлайн рывка (2.5 s) истёк раньше, чем босс добежал до края
    let profile = CharacterProfile::boss(80, 1);
    if let Some(mut me) = world.get_mut::<Character>(boss) {
        me.tick(&Health::new(80), &profile, &Unobstructed, 3.0, DT);
    }
    assert_eq!(world.get::<Character>(boss).map(|c| c.state), Some(CharacterState::Idle));

    world
        .run_system_once(systems::advance_boss_charges)
        .expect("charge system runs");

    let resolved = resolved_charges(&world);
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].kind, AttackKind::Charge);
    assert!(!resolved[0].landed);
    assert_eq!(resolved[0].damage, 0);
    assert!(world.get::<BossBrain>(boss).is_some_and(|b| b.charge.is_none()));

    // Повторный прогон не дублирует resolution
    world
        .run_system_once(systems::advance_boss_charges)
        .expect("charge system runs");
    assert_eq!(resolved_charges(&world).len(), 1);
}

#[test]
fn test_restarted_charge_resolves_previous_run() {
    let mut world = charge_world();
    let boss = spawn_charging_boss(&mut world, Vec2::new(40.0, 20.0));

    world
        .run_system_once(systems::advance_boss_charges)
        .expect("charge system runs");

    // Старый рывок снят, новый начат до следующего sweep
    let plan = BossBrain::new(BossConfig::bruiser()).plan_for(BossAttack::Charge, 0.0);
    let profile = CharacterProfile::boss(80, 1);
    if let Some(mut me) = world.get_mut::<Character>(boss) {
        me.enter_state(CharacterState::Idle, 1.0);
        assert!(me.begin_attack(plan, &profile, 1.0));
    }

    world
        .run_system_once(systems::advance_boss_charges)
        .expect("charge system runs");

    let resolved = resolved_charges(&world);
    assert_eq!(resolved.len(), 1, "старый рывок закрыт");
    let run = world.get::<BossBrain>(boss).and_then(|b| b.charge);
    assert_eq!(run.map(|r| r.started_at), Some(1.0));
}

// ============================================================================
// Consistency check
// ============================================================================

fn reconcile_world(elapsed: f32) -> World {
    let mut world = World::new();
    let mut time = Time::<Fixed>::default();
    time.advance_by(Duration::from_secs_f32(elapsed));
    world.insert_resource(time);
    world
}

fn reset_requested(world: &World, boss: Entity) -> bool {
    world
        .get::<PresentationIntents>(boss)
        .is_some_and(|i| i.has_trigger(IntentTrigger::ResetAnimation))
}

#[test]
fn test_stale_presented_clip_is_reset() {
    let mut world = reconcile_world(0.5);
    let boss = world
        .spawn((
            boss_at(Vec2::new(200.0, 20.0)),
            BossBrain::new(BossConfig::bruiser()),
            PresentedAnimation {
                clip: Some(AnimationClip::Attack(AttackKind::Charge)),
            },
        ))
        .id();

    world
        .run_system_once(systems::reconcile_boss_animation)
        .expect("reconcile runs");

    assert!(reset_requested(&world, boss));
}

#[test]
fn test_matching_clip_or_fresh_state_not_reset() {
    let mut world = reconcile_world(0.5);
    let matching = world
        .spawn((
            boss_at(Vec2::new(200.0, 20.0)),
            BossBrain::new(BossConfig::bruiser()),
            PresentedAnimation {
                clip: Some(AnimationClip::Idle),
            },
        ))
        .id();
    let mut fresh = boss_at(Vec2::new(240.0, 20.0));
    fresh.enter_state(CharacterState::Blocking, 0.45);
    let fresh = world
        .spawn((
            fresh,
            BossBrain::new(BossConfig::bruiser()),
            PresentedAnimation {
                clip: Some(AnimationClip::Idle),
            },
        ))
        .id();

    world
        .run_system_once(systems::reconcile_boss_animation)
        .expect("reconcile runs");

    assert!(!reset_requested(&world, matching));
    assert!(!reset_requested(&world, fresh), "grace period после входа в состояние");
}
