//! World-level components: экран, roster бойцов, препятствия, подбираемые предметы

use bevy::math::bounding::Aabb2d;
use bevy::prelude::*;

use crate::components::ActorCategory;

/// Видимая область камеры на плоскости земли
///
/// `left/right` — горизонталь, `near/far` — допустимая глубина (y).
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct ScreenBounds {
    pub left: f32,
    pub right: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            left: 0.0,
            right: 320.0,
            near: 0.0,
            far: 64.0,
        }
    }
}

impl ScreenBounds {
    pub fn contains_x(&self, x: f32, margin: f32) -> bool {
        x >= self.left - margin && x <= self.right + margin
    }

    /// Зажать точку внутрь экрана с отступом по горизонтали
    pub fn clamp(&self, point: Vec2, margin: f32) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.left + margin, (self.right - margin).max(self.left + margin)),
            point.y.clamp(self.near, self.far.max(self.near)),
        )
    }
}

/// Кто с кем дерётся: игрок и список живых врагов
///
/// Заполняется `register_combatants`, чистится при despawn мёртвых врагов.
#[derive(Resource, Debug, Default, Clone)]
pub struct CombatRoster {
    pub player: Option<Entity>,
    pub enemies: Vec<Entity>,
}

impl CombatRoster {
    pub fn register(&mut self, entity: Entity, category: ActorCategory) {
        match category {
            ActorCategory::Player => self.player = Some(entity),
            ActorCategory::Enemy => {
                if !self.enemies.contains(&entity) {
                    self.enemies.push(entity);
                }
            }
        }
    }

    pub fn unregister(&mut self, entity: Entity) {
        if self.player == Some(entity) {
            self.player = None;
        }
        self.enemies.retain(|e| *e != entity);
    }

    /// Противники для категории (игрок бьёт врагов, враги бьют игрока)
    pub fn opponents_of(&self, category: ActorCategory) -> Vec<Entity> {
        match category {
            ActorCategory::Player => self.enemies.clone(),
            ActorCategory::Enemy => self.player.into_iter().collect(),
        }
    }
}

/// Прямоугольник тела на плоскости земли (для probe и hit зон)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Footprint {
    pub half_width: f32,
    pub half_depth: f32,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            half_width: 8.0,
            half_depth: 4.0,
        }
    }
}

impl Footprint {
    pub fn bounds_at(&self, position: Vec2) -> Aabb2d {
        Aabb2d::new(position, Vec2::new(self.half_width, self.half_depth))
    }
}

/// Статичное препятствие (стена, машина, ящик)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub center: Vec2,
    pub half_size: Vec2,
    /// Breakable объекты блокируют только игрока
    pub breakable: bool,
}

impl Obstacle {
    pub fn wall(center: Vec2, half_size: Vec2) -> Self {
        Self {
            center,
            half_size,
            breakable: false,
        }
    }

    pub fn breakable(center: Vec2, half_size: Vec2) -> Self {
        Self {
            center,
            half_size,
            breakable: true,
        }
    }

    pub fn bounds(&self) -> Aabb2d {
        Aabb2d::new(self.center, self.half_size)
    }
}

/// Тип подбираемого предмета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PickupKind {
    Knife,
    Gun { ammo: u32 },
    Food { heal: u32 },
}

/// Предмет на земле
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Pickup {
    pub kind: PickupKind,
    pub position: Vec2,
}

/// Принадлежность врага чекпоинту (для EnemyDefeated и staging)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CheckpointMember(pub Entity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_opponents() {
        let mut roster = CombatRoster::default();
        let player = Entity::from_raw(1);
        let grunt = Entity::from_raw(2);

        roster.register(player, ActorCategory::Player);
        roster.register(grunt, ActorCategory::Enemy);
        roster.register(grunt, ActorCategory::Enemy); // Дубликат игнорируется

        assert_eq!(roster.opponents_of(ActorCategory::Player), vec![grunt]);
        assert_eq!(roster.opponents_of(ActorCategory::Enemy), vec![player]);

        roster.unregister(grunt);
        assert!(roster.opponents_of(ActorCategory::Player).is_empty());
    }

    #[test]
    fn test_screen_clamp() {
        let screen = ScreenBounds::default();
        let clamped = screen.clamp(Vec2::new(-50.0, 100.0), 10.0);

        assert_eq!(clamped, Vec2::new(10.0, 64.0));
    }
}
