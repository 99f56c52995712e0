//! Spatial Probe — collision gate для движения по одной оси
//!
//! Архитектура:
//! - `ColliderSnapshot` — resource с 2D footprint всех коллайдеров (обновляется каждый tick)
//! - Collision groups через `bevy_rapier3d::CollisionGroups` (membership + filter маски)
//! - Ray/box math через `bevy::math::bounding` (без физического движка)
//!
//! ## Слои:
//! - GROUP_1: World (стены, машины) — блокирует всех
//! - GROUP_2: Player
//! - GROUP_3: Enemy
//! - GROUP_4: Breakable (ящики, бочки) — блокирует только игрока

use bevy::math::bounding::{Aabb2d, RayCast2d};
use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};

use crate::components::{ActorCategory, Character, CharacterState, Footprint, Obstacle};

#[cfg(test)]
mod spatial_tests;

// ============================================================================
// Collision groups
// ============================================================================

pub fn world_layer() -> Group {
    Group::GROUP_1
}

pub fn player_layer() -> Group {
    Group::GROUP_2
}

pub fn enemy_layer() -> Group {
    Group::GROUP_3
}

pub fn breakable_layer() -> Group {
    Group::GROUP_4
}

/// Membership/filter для категории актора
///
/// Враги: World + Enemy. Игрок: World + Enemy + Breakable.
pub fn groups_for(category: ActorCategory) -> CollisionGroups {
    match category {
        ActorCategory::Player => CollisionGroups::new(
            player_layer(),
            world_layer() | enemy_layer() | breakable_layer(),
        ),
        ActorCategory::Enemy => CollisionGroups::new(enemy_layer(), world_layer() | enemy_layer()),
    }
}

/// Membership для статичного препятствия
pub fn obstacle_groups(obstacle: &Obstacle) -> CollisionGroups {
    let membership = if obstacle.breakable {
        breakable_layer()
    } else {
        world_layer()
    };
    CollisionGroups::new(membership, Group::ALL)
}

// ============================================================================
// Probe trait
// ============================================================================

/// Проверка "можно ли сдвинуться из `from` в `to`"
///
/// Реализации: `ActorProbe` (snapshot + маски актора), `Unobstructed`, `FnProbe` (тесты).
pub trait MovementProbe {
    fn can_move_to(&self, from: Vec2, to: Vec2) -> bool;
}

/// Пустой мир
#[derive(Debug, Clone, Copy, Default)]
pub struct Unobstructed;

impl MovementProbe for Unobstructed {
    fn can_move_to(&self, _from: Vec2, _to: Vec2) -> bool {
        true
    }
}

/// Probe из замыкания
pub struct FnProbe<F>(pub F);

impl<F> MovementProbe for FnProbe<F>
where
    F: Fn(Vec2, Vec2) -> bool,
{
    fn can_move_to(&self, from: Vec2, to: Vec2) -> bool {
        (self.0)(from, to)
    }
}

/// Probe конкретного актора поверх snapshot
pub struct ActorProbe<'a> {
    pub snapshot: &'a ColliderSnapshot,
    pub actor: Option<Entity>,
    pub filters: Group,
}

impl<'a> ActorProbe<'a> {
    pub fn new(snapshot: &'a ColliderSnapshot, actor: Entity, category: ActorCategory) -> Self {
        Self {
            snapshot,
            actor: Some(actor),
            filters: groups_for(category).filters,
        }
    }
}

impl MovementProbe for ActorProbe<'_> {
    fn can_move_to(&self, from: Vec2, to: Vec2) -> bool {
        self.snapshot.can_move_to(self.actor, self.filters, from, to)
    }
}

// ============================================================================
// Collider snapshot
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub bounds: Aabb2d,
    pub memberships: Group,
}

/// 2D footprint всех коллайдеров на текущий tick
#[derive(Resource, Debug, Clone)]
pub struct ColliderSnapshot {
    pub entries: Vec<ColliderEntry>,
    /// Длина probe сверх расстояния до цели
    pub probe_skin: f32,
}

impl Default for ColliderSnapshot {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            probe_skin: 6.0,
        }
    }
}

impl ColliderSnapshot {
    pub fn insert(&mut self, entity: Entity, bounds: Aabb2d, memberships: Group) {
        self.entries.push(ColliderEntry {
            entity,
            bounds,
            memberships,
        });
    }

    /// Ray от `floor(from)` к `floor(to)` длиной `distance + probe_skin`
    ///
    /// Оба конца округляются одинаково: single-axis probe остаётся на своей оси.
    /// true: ничего не мешает, единственное попадание — сам актор,
    /// или probe вырожденный (нулевая длина).
    pub fn can_move_to(&self, actor: Option<Entity>, filters: Group, from: Vec2, to: Vec2) -> bool {
        let origin = from.floor();
        let delta = to.floor() - origin;

        let Ok(direction) = Dir2::new(delta) else {
            return true;
        };

        let ray = RayCast2d::new(origin, direction, delta.length() + self.probe_skin);

        !self.entries.iter().any(|entry| {
            if Some(entry.entity) == actor || !entry.memberships.intersects(filters) {
                return false;
            }
            // Уже внутри (наложение после knockback) — не запираем актора
            if contains_point(&entry.bounds, from) {
                return false;
            }
            ray.aabb_intersection_at(&entry.bounds).is_some()
        })
    }

    /// Есть ли коллайдер (по маске) в точке
    pub fn occupied(&self, actor: Option<Entity>, filters: Group, point: Vec2) -> bool {
        self.entries.iter().any(|entry| {
            Some(entry.entity) != actor
                && entry.memberships.intersects(filters)
                && contains_point(&entry.bounds, point)
        })
    }
}

fn contains_point(bounds: &Aabb2d, point: Vec2) -> bool {
    point.cmpge(bounds.min).all() && point.cmple(bounds.max).all()
}

/// Пересобирает snapshot из препятствий и живых персонажей
pub fn refresh_collider_snapshot(
    mut snapshot: ResMut<ColliderSnapshot>,
    obstacles: Query<(Entity, &Obstacle)>,
    characters: Query<(Entity, &Character, &Footprint)>,
) {
    snapshot.entries.clear();

    for (entity, obstacle) in obstacles.iter() {
        snapshot.insert(entity, obstacle.bounds(), obstacle_groups(obstacle).memberships);
    }

    for (entity, character, footprint) in characters.iter() {
        if matches!(character.state, CharacterState::Dying | CharacterState::Dead) {
            continue;
        }
        snapshot.insert(
            entity,
            footprint.bounds_at(character.precise_position),
            groups_for(character.category).memberships,
        );
    }
}
