//! AI systems: charge sweep, animation consistency check, расход ножей

use bevy::prelude::*;

use crate::combat::{
    deliver_hit, AttackKind, AttackResolved, CombatEvent, HealthChanged, HitLanded,
    ProjectileLaunched,
};
use crate::components::{
    Character, CharacterProfile, CharacterState, Footprint, Health, IntentTrigger,
    PresentationIntents, ScreenBounds,
};
use crate::presentation::{AnimationClip, PresentedAnimation};
use crate::spatial::{ActorProbe, ColliderSnapshot};

use super::boss::{BossBrain, ChargeRun};
use super::grunt::GruntBrain;

/// Расхождение клипа и состояния дольше этого → принудительный reset
const ANIMATION_MISMATCH_GRACE: f32 = 0.1;

/// Рывок босса: движение, swept rectangle, завершение
///
/// Завершение core-owned: дальний край экрана, препятствие или дедлайн
/// `duration_cap` (его снимает `tick`).
#[allow(clippy::too_many_arguments)]
pub fn advance_boss_charges(
    time: Res<Time<Fixed>>,
    screen: Res<ScreenBounds>,
    snapshot: Res<ColliderSnapshot>,
    mut bosses: Query<(Entity, &mut Character, &mut BossBrain, &Footprint)>,
    mut players: Query<
        (
            Entity,
            &mut Character,
            &mut Health,
            &CharacterProfile,
            &mut PresentationIntents,
        ),
        Without<BossBrain>,
    >,
    mut hit_events: EventWriter<HitLanded>,
    mut health_events: EventWriter<HealthChanged>,
    mut resolved_events: EventWriter<AttackResolved>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, mut boss, mut brain, footprint) in bosses.iter_mut() {
        let action = boss
            .action
            .filter(|_| BossBrain::is_charging(&boss));

        // Рывок без прихода к финишу: снят дедлайном duration_cap в tick
        let stale = brain
            .charge
            .filter(|run| action.is_none_or(|a| a.ready_at != run.started_at));
        if let Some(run) = stale {
            brain.charge = None;
            resolved_events.write(charge_resolution(entity, &brain, &run));
            crate::log(&format!("🐂 {:?} charge ended (deadline)", entity));
        }

        let Some(action) = action else {
            continue;
        };

        let charge = brain.config.charge;
        let run = *brain.charge.get_or_insert_with(|| {
            let (direction, end_x) = if boss.facing_left {
                (-1.0, screen.left + charge.edge_margin)
            } else {
                (1.0, screen.right - charge.edge_margin)
            };
            crate::log(&format!("🐂 {:?} charge → x={:.0}", entity, end_x));
            ChargeRun {
                direction,
                end_x,
                hit_player: false,
                started_at: action.ready_at,
            }
        });

        // Движение к финишу без перелёта
        let start = boss.precise_position;
        let step = charge.speed * dt;
        let target_x = if run.direction > 0.0 {
            (start.x + step).min(run.end_x)
        } else {
            (start.x - step).max(run.end_x)
        };
        boss.velocity = Vec2::new(run.direction * charge.speed, 0.0);
        let probe = ActorProbe::new(&snapshot, entity, boss.category);
        let moved = boss.attempt_move_to(Vec2::new(target_x, start.y), &probe);
        let end = boss.precise_position;

        // Swept rectangle (старт → конец шага с шириной тела)
        let mut hit_player = run.hit_player;
        if !hit_player {
            let sweep = Rect::from_corners(
                Vec2::new(
                    start.x.min(end.x) - footprint.half_width,
                    start.y - charge.sweep_half_depth,
                ),
                Vec2::new(
                    start.x.max(end.x) + footprint.half_width,
                    start.y + charge.sweep_half_depth,
                ),
            );

            for (player_entity, mut player, mut health, profile, mut intents) in players.iter_mut() {
                if !player.is_player() || player.height > action.plan.reach.height {
                    continue;
                }
                if !sweep.contains(player.precise_position) {
                    continue;
                }

                let event =
                    CombatEvent::new(start, action.plan.damage, action.plan.hit).unblockable();
                let report = deliver_hit(
                    player_entity,
                    Some(entity),
                    &mut player,
                    &mut health,
                    profile,
                    &mut intents,
                    &event,
                    now,
                    &mut hit_events,
                    &mut health_events,
                );
                if report.outcome.landed() {
                    hit_player = true;
                }
            }
        }
        if let Some(active) = brain.charge.as_mut() {
            active.hit_player = hit_player;
        }

        let reached = (end.x - run.end_x).abs() <= f32::EPSILON;
        if reached || !moved {
            boss.velocity = Vec2::ZERO;
            boss.enter_state(CharacterState::Idle, now);
            if let Some(finished) = brain.charge.take() {
                resolved_events.write(charge_resolution(entity, &brain, &finished));
            }
            crate::log(&format!(
                "🐂 {:?} charge ended ({})",
                entity,
                if reached { "edge" } else { "blocked" }
            ));
        }
    }
}

fn charge_resolution(boss: Entity, brain: &BossBrain, run: &ChargeRun) -> AttackResolved {
    AttackResolved {
        attacker: boss,
        kind: AttackKind::Charge,
        landed: run.hit_player,
        damage: if run.hit_player {
            brain.config.charge.damage
        } else {
            0
        },
    }
}

/// Снаряд ножа вылетел → грант больше не держит нож
pub fn consume_thrown_knives(
    time: Res<Time<Fixed>>,
    mut launched: EventReader<ProjectileLaunched>,
    mut grunts: Query<&mut GruntBrain>,
) {
    let now = time.elapsed_secs();

    for event in launched.read() {
        if event.kind != AttackKind::KnifeThrow {
            continue;
        }
        let Ok(mut brain) = grunts.get_mut(event.owner) else {
            continue;
        };
        brain.knife_launched(now);
    }
}

/// Post-tick consistency check: клип presentation слоя vs логическое состояние
///
/// Состояние всегда побеждает: при расхождении шлём ResetAnimation.
pub fn reconcile_boss_animation(
    time: Res<Time<Fixed>>,
    mut bosses: Query<
        (
            Entity,
            &Character,
            &mut PresentationIntents,
            Option<&PresentedAnimation>,
        ),
        With<BossBrain>,
    >,
) {
    let now = time.elapsed_secs();

    for (entity, character, mut intents, presented) in bosses.iter_mut() {
        let Some(clip) = presented.and_then(|p| p.clip) else {
            continue;
        };
        let expected = AnimationClip::expected_for(character);
        if clip == expected || character.elapsed_in_state(now) < ANIMATION_MISMATCH_GRACE {
            continue;
        }

        intents.trigger(IntentTrigger::ResetAnimation);
        crate::log(&format!(
            "🔧 {:?} animation {:?} disagrees with {:?}, reset",
            entity, clip, character.state
        ));
    }
}
