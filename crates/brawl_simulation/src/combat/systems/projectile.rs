//! Снаряды: брошенные ножи и пули
//!
//! Летят по горизонтали на фиксированной высоте; попадают в первого
//! противника на пути, который не проигнорировал удар.

use bevy::prelude::*;

use crate::combat::{
    AttackKind, AttackPlan, AttackResolved, CombatEvent, HealthChanged, HitKind, HitLanded,
};
use crate::components::{
    ActorCategory, Character, CharacterProfile, CombatRoster, Footprint, Health,
    PresentationIntents, ScreenBounds,
};
use crate::spatial::{world_layer, ColliderSnapshot};

use super::hit_check::deliver_hit;

/// За пределами экрана снаряд живёт ещё столько пикселей
const OFFSCREEN_MARGIN: f32 = 32.0;
const MAX_LIFETIME: f32 = 4.0;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub owner: Entity,
    pub owner_category: ActorCategory,
    pub kind: AttackKind,
    pub damage: u32,
    pub position: Vec2,
    pub height: f32,
    /// Скорость со знаком (x)
    pub speed: f32,
    pub depth_tolerance: f32,
    pub height_tolerance: f32,
    pub launched_at: f32,
}

impl Projectile {
    pub fn launch(
        owner: Entity,
        owner_category: ActorCategory,
        plan: &AttackPlan,
        origin: Vec2,
        height: f32,
        facing_left: bool,
        now: f32,
    ) -> Self {
        let direction = if facing_left { -1.0 } else { 1.0 };
        Self {
            owner,
            owner_category,
            kind: plan.kind,
            damage: plan.damage,
            position: origin,
            height,
            speed: direction * plan.projectile_speed,
            depth_tolerance: plan.reach.depth,
            height_tolerance: plan.reach.height,
            launched_at: now,
        }
    }

    /// Пролетает ли снаряд через тело цели за этот шаг
    fn crosses(&self, from_x: f32, target: Vec2, target_height: f32, footprint: &Footprint) -> bool {
        let (min_x, max_x) = if from_x <= self.position.x {
            (from_x, self.position.x)
        } else {
            (self.position.x, from_x)
        };

        target.x + footprint.half_width >= min_x
            && target.x - footprint.half_width <= max_x
            && (target.y - self.position.y).abs() <= self.depth_tolerance
            && (target_height - self.height).abs() <= self.height_tolerance
    }
}

#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    roster: Res<CombatRoster>,
    screen: Res<ScreenBounds>,
    snapshot: Res<ColliderSnapshot>,
    mut projectiles: Query<(Entity, &mut Projectile)>,
    mut characters: Query<(
        &mut Character,
        &mut Health,
        &CharacterProfile,
        &Footprint,
        &mut PresentationIntents,
    )>,
    mut hit_events: EventWriter<HitLanded>,
    mut health_events: EventWriter<HealthChanged>,
    mut resolved_events: EventWriter<AttackResolved>,
) {
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, mut projectile) in projectiles.iter_mut() {
        let from_x = projectile.position.x;
        projectile.position.x += projectile.speed * dt;

        let mut consumed = false;

        for target in roster.opponents_of(projectile.owner_category) {
            let Ok((mut victim, mut health, profile, footprint, mut intents)) =
                characters.get_mut(target)
            else {
                continue;
            };
            if !victim.is_active()
                || !projectile.crosses(from_x, victim.precise_position, victim.height, footprint)
            {
                continue;
            }

            // Origin позади цели по направлению полёта → knockback по ходу снаряда
            let origin = Vec2::new(
                victim.precise_position.x - projectile.speed.signum(),
                victim.precise_position.y,
            );
            let event = CombatEvent::new(origin, projectile.damage, HitKind::Normal);
            let report = deliver_hit(
                target,
                Some(projectile.owner),
                &mut victim,
                &mut health,
                profile,
                &mut intents,
                &event,
                now,
                &mut hit_events,
                &mut health_events,
            );

            if report.outcome == crate::combat::HitOutcome::Ignored {
                continue;
            }

            resolved_events.write(AttackResolved {
                attacker: projectile.owner,
                kind: projectile.kind,
                landed: report.outcome.landed(),
                damage: report.damage,
            });
            consumed = true;
            break;
        }

        let hit_wall = snapshot.occupied(None, world_layer(), projectile.position);
        let offscreen = !screen.contains_x(projectile.position.x, OFFSCREEN_MARGIN);
        let expired = now - projectile.launched_at > MAX_LIFETIME;

        if consumed || hit_wall || offscreen || expired {
            commands.entity(entity).despawn();
        }
    }
}
