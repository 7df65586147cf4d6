//! Rendering contracts
//!
//! The simulation never draws pixels. Each entity describes how it looks as a
//! `Visual`; a `SpriteLookup` turns that into a sprite handle and a `Canvas`
//! places the sprite over the entity's rectangle.

pub mod draw_list;

pub use draw_list::{DrawCommand, DrawList};

use crate::sim::enemy::EnemyKind;
use crate::sim::player::PlayerSlot;
use crate::sim::powerup::PowerupKind;
use crate::sim::rect::Rect;
use crate::sim::structure::TerrainKind;

/// Substate bit set while a powerup carrier is flashing
pub const CARRIER_FLASH: u8 = 0x10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Terrain(TerrainKind),
    Brick,
    Steel,
    /// The statue, standing or destroyed
    Flag,
    Bullet,
    PlayerTank(PlayerSlot),
    EnemyTank(EnemyKind),
    Powerup(PowerupKind),
    SpawnFlash,
    SmallExplosion,
    LargeExplosion,
    Invulnerable,
    Points,
}

/// Visual state of one entity for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visual {
    pub kind: SpriteKind,
    /// Kind-specific variant (brick look, enemy armor, player stars, ...)
    pub substate: u8,
    /// Animation frame
    pub frame: u8,
}

impl Visual {
    pub fn new(kind: SpriteKind, substate: u8, frame: u8) -> Self {
        Self {
            kind,
            substate,
            frame,
        }
    }
}

/// Opaque handle to a drawable sprite region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

/// Pure mapping from visual state to sprite
pub trait SpriteLookup {
    fn lookup(&self, visual: &Visual) -> Option<SpriteHandle>;
}

pub trait Canvas {
    fn draw(&mut self, sprite: SpriteHandle, dest: Rect);
}

/// Lookup that packs the visual state into the handle itself.
///
/// Layout: kind in bits 16-23, substate in 8-15, frame in 0-7. Handy for
/// headless runs and for backends that key their atlas on the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedSprites;

impl PackedSprites {
    fn kind_code(kind: SpriteKind) -> u32 {
        match kind {
            SpriteKind::Terrain(t) => t as u32,
            SpriteKind::Brick => 8,
            SpriteKind::Steel => 9,
            SpriteKind::Flag => 10,
            SpriteKind::Bullet => 11,
            SpriteKind::PlayerTank(slot) => 12 + slot.index() as u32,
            SpriteKind::EnemyTank(kind) => {
                16 + EnemyKind::ALL.iter().position(|k| *k == kind).unwrap_or(0) as u32
            }
            SpriteKind::Powerup(kind) => 20 + u32::from(kind.index()),
            SpriteKind::SpawnFlash => 26,
            SpriteKind::SmallExplosion => 27,
            SpriteKind::LargeExplosion => 28,
            SpriteKind::Invulnerable => 29,
            SpriteKind::Points => 30,
        }
    }
}

impl SpriteLookup for PackedSprites {
    fn lookup(&self, visual: &Visual) -> Option<SpriteHandle> {
        let code = Self::kind_code(visual.kind);
        Some(SpriteHandle(
            (code << 16) | (u32::from(visual.substate) << 8) | u32::from(visual.frame),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_handles_are_distinct() {
        let a = PackedSprites.lookup(&Visual::new(SpriteKind::EnemyTank(EnemyKind::Armor), 3, 5));
        let b = PackedSprites.lookup(&Visual::new(SpriteKind::EnemyTank(EnemyKind::Armor), 2, 5));
        let c = PackedSprites.lookup(&Visual::new(SpriteKind::EnemyTank(EnemyKind::Fast), 3, 5));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.map(|h| h.0 & 0xff), Some(5));
    }

    #[test]
    fn test_carrier_flash_keeps_armor_bits() {
        let substate = 3 | CARRIER_FLASH;
        assert_eq!(substate & !CARRIER_FLASH, 3);
    }
}
