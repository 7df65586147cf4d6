//! Static arena pieces: borders, terrain, brick/steel walls and the statue

use serde::{Deserialize, Serialize};

use super::bullet::Shot;
use super::effect::{EffectKind, Followup};
use super::entity::{Body, Direction, Entity};
use super::registry::Registry;
use crate::audio::Sound;
use crate::renderer::{SpriteKind, Visual};

/// Arena edge guarded by a border slab. Border indices follow this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    Water,
    Trees,
    Ice,
    Blank,
}

/// Ground tile; only water animates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    pub kind: TerrainKind,
    anim_counter: u32,
    frame: u8,
}

/// Water flips its frame every this many updates
const WATER_FRAME_UPDATES: u32 = 30;

impl Terrain {
    pub fn new(kind: TerrainKind) -> Self {
        Self {
            kind,
            anim_counter: 0,
            frame: 0,
        }
    }

    pub fn visual(&self) -> Visual {
        Visual::new(SpriteKind::Terrain(self.kind), 0, self.frame)
    }
}

pub fn update_terrain(entity: &mut Entity) -> bool {
    if let Body::Terrain(t) = &mut entity.body {
        if t.kind == TerrainKind::Water {
            t.anim_counter += 1;
            if t.anim_counter % WATER_FRAME_UPDATES == 0 {
                t.frame ^= 1;
            }
        }
    }
    entity.is_killed()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    Brick,
    Steel,
}

/// Which edges of a wall block are still standing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Default for Edges {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}

impl Edges {
    /// The edge a bullet travelling in `direction` strikes first
    fn facing_mut(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Up => &mut self.bottom,
            Direction::Down => &mut self.top,
            Direction::Left => &mut self.right,
            Direction::Right => &mut self.left,
        }
    }

    /// A whole axis eroded away leaves nothing standing
    pub fn is_gone(&self) -> bool {
        (!self.left && !self.right) || (!self.top && !self.bottom)
    }
}

/// Sprite variant for a partially eroded wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Look {
    Whole,
    LeftGone,
    TopGone,
    BottomGone,
    RightGone,
    AllGone,
}

impl Look {
    pub fn index(self) -> u8 {
        match self {
            Look::Whole => 0,
            Look::LeftGone => 1,
            Look::TopGone => 2,
            Look::BottomGone => 3,
            Look::RightGone => 4,
            Look::AllGone => 5,
        }
    }
}

/// Outcome of a bullet striking a wall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Erosion {
    /// Steel shrugged off a normal hit
    Rebound,
    /// One edge knocked out, block still standing
    Eroded,
    Destroyed,
}

/// Brick or steel wall block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    pub material: Material,
    pub edges: Edges,
}

impl Structure {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            edges: Edges::default(),
        }
    }

    pub fn is_steel(&self) -> bool {
        self.material == Material::Steel
    }

    pub fn transform_to_brick(&mut self) {
        self.material = Material::Brick;
    }

    /// Apply a hit from a bullet travelling in `direction`
    pub fn take_hit(&mut self, direction: Direction, strength: u8) -> Erosion {
        if strength >= 2 {
            return Erosion::Destroyed;
        }
        if self.is_steel() {
            return Erosion::Rebound;
        }

        let edge = self.edges.facing_mut(direction);
        if !*edge {
            return Erosion::Destroyed;
        }
        *edge = false;

        if self.edges.is_gone() {
            Erosion::Destroyed
        } else {
            Erosion::Eroded
        }
    }

    pub fn look(&self) -> Look {
        let e = self.edges;
        if e.is_gone() {
            Look::AllGone
        } else if e.left && !e.right {
            Look::RightGone
        } else if !e.left && e.right {
            Look::LeftGone
        } else if e.bottom && !e.top {
            Look::TopGone
        } else if !e.bottom && e.top {
            Look::BottomGone
        } else {
            Look::Whole
        }
    }

    pub fn visual(&self) -> Visual {
        let kind = match self.material {
            Material::Brick => SpriteKind::Brick,
            Material::Steel => SpriteKind::Steel,
        };
        Visual::new(kind, self.look().index(), 0)
    }
}

pub fn structure_hit(entity: &mut Entity, shot: &Shot, registry: &mut Registry) -> bool {
    if entity.is_killed() {
        return false;
    }
    let Body::Structure(structure) = &mut entity.body else {
        return false;
    };

    match structure.take_hit(shot.direction, shot.strength) {
        Erosion::Rebound => {
            if shot.is_player() {
                registry.request_sound(Sound::BulletSteelHit);
            }
        }
        Erosion::Eroded => {
            if shot.is_player() {
                registry.request_sound(Sound::BulletBrickHit);
            }
        }
        Erosion::Destroyed => {
            entity.kill();
            if shot.is_player() {
                registry.request_sound(Sound::BulletBrickHit);
            }
        }
    }
    true
}

pub fn border_hit(shot: &Shot, registry: &mut Registry) -> bool {
    if shot.is_player() {
        registry.request_sound(Sound::BulletSteelHit);
    }
    true
}

/// The statue falls to any bullet; later hits are still absorbed
pub fn statue_hit(entity: &mut Entity, registry: &mut Registry) -> bool {
    if entity.kill() {
        log::info!("Statue destroyed");
        registry.mark_flag_destroyed();
        registry.request_sound(Sound::DestroyPlayer);
        registry.generate_effect(EffectKind::LargeExplosion, entity.pos, None, Followup::Nothing);
    }
    true
}

pub fn statue_visual(destroyed: bool) -> Visual {
    Visual::new(SpriteKind::Flag, u8::from(destroyed), 0)
}
