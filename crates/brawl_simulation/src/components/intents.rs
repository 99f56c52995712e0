//! Presentation intents (core → presentation)
//!
//! Ядро не знает имён анимаций — только семантические флаги и триггеры.
//! Флаги пересчитываются в конце каждого тика, триггеры живут один тик.

use bevy::prelude::*;

use crate::combat::{AttackKind, HitKind};

/// Одноразовый триггер для presentation слоя
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum IntentTrigger {
    Attack(AttackKind),
    Jump,
    Hit(HitKind),
    Blocked,
    Block,
    Landed,
    GetUp,
    Pickup,
    /// Consistency check: presentation должен сбросить текущую анимацию
    ResetAnimation,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PresentationIntents {
    pub walking: bool,
    pub preparing: bool,
    pub attacking: bool,
    pub airborne: bool,
    pub falling: bool,
    pub grounded: bool,
    pub blocking: bool,
    pub hurt: bool,
    pub dying: bool,
    /// Flicker при Dying (oscillate), false после Dead
    pub visible: bool,
    pub facing_left: bool,
    pub triggers: Vec<IntentTrigger>,
}

impl Default for PresentationIntents {
    fn default() -> Self {
        Self {
            walking: false,
            preparing: false,
            attacking: false,
            airborne: false,
            falling: false,
            grounded: false,
            blocking: false,
            hurt: false,
            dying: false,
            visible: true,
            facing_left: false,
            triggers: Vec::new(),
        }
    }
}

impl PresentationIntents {
    pub fn trigger(&mut self, trigger: IntentTrigger) {
        self.triggers.push(trigger);
    }

    pub fn has_trigger(&self, trigger: IntentTrigger) -> bool {
        self.triggers.contains(&trigger)
    }
}
