//! Frame-stepped arena simulation
//!
//! All gameplay logic lives here:
//! - One registry owns every entity, in fixed category order
//! - Entities reach shared services only through the registry they are handed
//! - Seeded RNG only; wall-clock delays go through the deferred queue
//! - No rendering or platform dependencies beyond the collaborator traits

pub mod bullet;
pub mod collision;
pub mod deferred;
pub mod effect;
pub mod enemy;
pub mod entity;
pub mod level;
pub mod player;
pub mod powerup;
pub mod rect;
pub mod registry;
pub mod structure;
pub mod tank;
pub mod tick;

pub use bullet::{Bullet, Shooter, Shot};
pub use deferred::{DeferredAction, DeferredQueue};
pub use effect::{Effect, EffectKind, Followup};
pub use enemy::{EnemyKind, EnemyTank};
pub use entity::{Body, Direction, Entity, EntityId, Handle, Kind};
pub use level::{Arena, LevelError, LevelGrid, WaveSlot, queue_wave, wave_for_stage, wave_slots};
pub use player::{ForceField, PlayerSlot, PlayerTank};
pub use powerup::{Powerup, PowerupKind};
pub use rect::Rect;
pub use registry::{Category, Registry, Slot};
pub use structure::{Material, Side, TerrainKind};
pub use tick::tick;
