//! Hit-check: "attack frame reached" → reach window → receive_hit

use bevy::prelude::*;

use crate::combat::{
    AttackResolved, CombatEvent, HealthChanged, HitKind, HitLanded, HitOutcome, HitReport,
    ProjectileLaunched,
};
use crate::components::{
    Character, CharacterProfile, CombatRoster, Health, IntentTrigger, PresentationIntents,
};
use crate::presentation::AttackFrameReached;

use super::projectile::Projectile;

/// Доставить удар цели и опубликовать HitLanded / HealthChanged
#[allow(clippy::too_many_arguments)]
pub fn deliver_hit(
    target: Entity,
    attacker: Option<Entity>,
    victim: &mut Character,
    health: &mut Health,
    profile: &CharacterProfile,
    intents: &mut PresentationIntents,
    event: &CombatEvent,
    now: f32,
    hit_events: &mut EventWriter<HitLanded>,
    health_events: &mut EventWriter<HealthChanged>,
) -> HitReport {
    let report = victim.receive_hit(health, profile, event, now);

    let applied_kind = match report.outcome {
        HitOutcome::Ignored => return report,
        HitOutcome::Blocked => {
            intents.trigger(IntentTrigger::Blocked);
            event.kind
        }
        HitOutcome::Hurt => HitKind::Normal,
        HitOutcome::KnockedDown => HitKind::Knockdown,
        HitOutcome::Ejected => HitKind::PowerEject,
    };

    if report.outcome.landed() {
        intents.trigger(IntentTrigger::Hit(applied_kind));
        health_events.write(HealthChanged {
            entity: target,
            current: health.current,
            max: health.max,
        });
        crate::log(&format!(
            "💥 {:?} → {:?}: {} dmg ({:?}), HP {}/{}",
            attacker, target, report.damage, report.outcome, health.current, health.max
        ));
    }

    hit_events.write(HitLanded {
        attacker,
        target,
        damage: report.damage,
        kind: applied_kind,
        outcome: report.outcome,
        lethal: report.lethal,
    });

    report
}

/// Обрабатывает AttackFrameReached от presentation слоя
///
/// Melee: все противники из roster впереди по взгляду и в reach window.
/// Ranged: spawn снаряда (попадание считает `advance_projectiles`).
/// Атака в воздухе всегда Knockdown (кроме PowerEject).
#[allow(clippy::too_many_arguments)]
pub fn resolve_attack_frames(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    roster: Res<CombatRoster>,
    mut frames: EventReader<AttackFrameReached>,
    mut characters: Query<(
        &mut Character,
        &mut Health,
        &CharacterProfile,
        &mut PresentationIntents,
    )>,
    mut hit_events: EventWriter<HitLanded>,
    mut health_events: EventWriter<HealthChanged>,
    mut resolved_events: EventWriter<AttackResolved>,
    mut launched_events: EventWriter<ProjectileLaunched>,
) {
    let now = time.elapsed_secs();

    for frame in frames.read() {
        let Ok((mut attacker, _, _, _)) = characters.get_mut(frame.entity) else {
            continue;
        };
        let Some(plan) = attacker.confirm_attack_frame() else {
            continue;
        };

        // Copy-out публичного состояния атакующего
        let origin = attacker.precise_position;
        let attacker_height = attacker.height;
        let facing_left = attacker.facing_left;
        let category = attacker.category;

        if plan.kind.is_ranged() {
            commands.spawn(Projectile::launch(
                frame.entity,
                category,
                &plan,
                origin,
                attacker_height,
                facing_left,
                now,
            ));
            launched_events.write(ProjectileLaunched {
                owner: frame.entity,
                kind: plan.kind,
            });
            crate::log(&format!("🔪 {:?} launched {:?}", frame.entity, plan.kind));
            continue;
        }

        let kind = if attacker_height > 0.0 && plan.hit == HitKind::Normal {
            HitKind::Knockdown
        } else {
            plan.hit
        };
        let event = CombatEvent {
            origin,
            amount: plan.damage,
            kind,
            can_block: plan.can_block,
        };

        let mut landed = false;
        let mut total_damage = 0;

        for target in roster.opponents_of(category) {
            if target == frame.entity {
                continue;
            }
            let Ok((mut victim, mut health, profile, mut intents)) = characters.get_mut(target)
            else {
                continue;
            };
            if !victim.is_active() {
                continue;
            }
            if !plan.reach.contains(
                origin,
                attacker_height,
                facing_left,
                victim.precise_position,
                victim.height,
            ) {
                continue;
            }

            let report = deliver_hit(
                target,
                Some(frame.entity),
                &mut victim,
                &mut health,
                profile,
                &mut intents,
                &event,
                now,
                &mut hit_events,
                &mut health_events,
            );
            if report.outcome.landed() {
                landed = true;
                total_damage += report.damage;
            }
        }

        resolved_events.write(AttackResolved {
            attacker: frame.entity,
            kind: plan.kind,
            landed,
            damage: total_damage,
        });
    }
}
