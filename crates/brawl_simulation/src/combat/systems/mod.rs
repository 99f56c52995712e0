//! Combat systems (FixedUpdate)

pub mod death;
pub mod hit_check;
pub mod projectile;

pub use death::{register_combatants, remove_dead_enemies};
pub use hit_check::{deliver_hit, resolve_attack_frames};
pub use projectile::{advance_projectiles, Projectile};
