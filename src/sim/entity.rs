//! Entity record and kind dispatch
//!
//! Every game object is one concrete `Entity`: shared identity/position/
//! liveness fields plus a `Body` payload tagged by kind. Behaviour is
//! dispatched by kind (`update`, `on_bullet_hit`, `visual`) into the
//! per-kind modules, which receive the registry as explicit context.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{self, Bullet, Shot};
use super::effect::{self, Effect};
use super::enemy::{self, EnemyTank};
use super::player::{self, PlayerTank};
use super::powerup::{self, Powerup};
use super::rect::Rect;
use super::registry::Registry;
use super::structure::{self, Side, Structure, Terrain, TerrainKind};
use crate::platform::InputSource;
use crate::renderer::Visual;

/// Stable entity identity (never reused within a registry)
pub type EntityId = u32;

/// Entity identity plus life token.
///
/// The token is bumped whenever the entity is resurrected, so work scheduled
/// against an earlier life can detect that its target has moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    pub id: EntityId,
    pub life: u32,
}

/// Cardinal facing / travel direction (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step in arena coordinates
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub fn index(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }
}

/// Closed set of entity kinds, used for collision classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Border,
    Water,
    Trees,
    Ice,
    Blank,
    Brick,
    Steel,
    Flag,
    Bullet,
    Powerup,
    PlayerTank,
    EnemyTank,
    Effect,
}

impl Kind {
    /// Kinds no tank may drive into
    pub fn is_uncrossable(self) -> bool {
        matches!(
            self,
            Kind::Brick | Kind::Steel | Kind::Flag | Kind::Water | Kind::Border
        )
    }

    pub fn is_tank(self) -> bool {
        matches!(self, Kind::PlayerTank | Kind::EnemyTank)
    }
}

/// Kind-specific payload
#[derive(Debug, Clone)]
pub enum Body {
    Border(Side),
    Terrain(Terrain),
    Structure(Structure),
    Statue,
    Bullet(Bullet),
    Powerup(Powerup),
    Player(PlayerTank),
    Enemy(EnemyTank),
    Effect(Effect),
}

/// A live game object
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Life token, bumped on resurrection
    pub life: u32,
    pub pos: Vec2,
    /// Collision half-extents
    pub half: Vec2,
    /// Excluded from spatial queries when false
    pub collisional: bool,
    alive: bool,
    pub body: Body,
}

impl Entity {
    pub fn new(id: EntityId, pos: Vec2, half: Vec2, body: Body) -> Self {
        let collisional = match &body {
            Body::Terrain(t) => t.kind == TerrainKind::Water,
            Body::Effect(_) => false,
            _ => true,
        };
        Self {
            id,
            life: 0,
            pos,
            half,
            collisional,
            alive: true,
            body,
        }
    }

    pub fn kind(&self) -> Kind {
        match &self.body {
            Body::Border(_) => Kind::Border,
            Body::Terrain(t) => match t.kind {
                TerrainKind::Water => Kind::Water,
                TerrainKind::Trees => Kind::Trees,
                TerrainKind::Ice => Kind::Ice,
                TerrainKind::Blank => Kind::Blank,
            },
            Body::Structure(s) => {
                if s.is_steel() {
                    Kind::Steel
                } else {
                    Kind::Brick
                }
            }
            Body::Statue => Kind::Flag,
            Body::Bullet(_) => Kind::Bullet,
            Body::Powerup(_) => Kind::Powerup,
            Body::Player(_) => Kind::PlayerTank,
            Body::Enemy(_) => Kind::EnemyTank,
            Body::Effect(_) => Kind::Effect,
        }
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        Handle {
            id: self.id,
            life: self.life,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::around(self.pos, self.half)
    }

    #[inline]
    pub fn is_killed(&self) -> bool {
        !self.alive
    }

    /// Mark dead. Idempotent; returns true only for the call that
    /// performed the transition, so callers can fire side effects once.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    /// Bring a killed entity back under a fresh life token
    pub fn resurrect(&mut self) {
        self.alive = true;
        self.collisional = true;
        self.life = self.life.wrapping_add(1);
    }

    /// Whether bullets react with this entity (absence means pass-through)
    pub fn takes_bullet_hits(&self) -> bool {
        matches!(
            self.body,
            Body::Border(_)
                | Body::Structure(_)
                | Body::Statue
                | Body::Bullet(_)
                | Body::Player(_)
                | Body::Enemy(_)
        )
    }

    /// Advance one frame. Returns true when the entity should be removed.
    pub fn update(&mut self, registry: &mut Registry, input: &dyn InputSource, units: f32) -> bool {
        match self.kind() {
            Kind::Border | Kind::Brick | Kind::Steel => self.is_killed(),
            Kind::Water | Kind::Trees | Kind::Ice | Kind::Blank => structure::update_terrain(self),
            Kind::Flag => false,
            Kind::Bullet => bullet::update(self, registry, units),
            Kind::Powerup => powerup::update(self),
            Kind::PlayerTank => player::update(self, registry, input, units),
            Kind::EnemyTank => enemy::update(self, registry, units),
            Kind::Effect => effect::update(self, registry, units),
        }
    }

    /// React to a bullet. Returns true if the bullet should be destroyed.
    pub fn on_bullet_hit(&mut self, shot: &Shot, registry: &mut Registry) -> bool {
        match self.kind() {
            Kind::Border => structure::border_hit(shot, registry),
            Kind::Brick | Kind::Steel => structure::structure_hit(self, shot, registry),
            Kind::Flag => structure::statue_hit(self, registry),
            Kind::Bullet => bullet::hit(self, shot, registry),
            Kind::PlayerTank => player::hit(self, shot, registry),
            Kind::EnemyTank => enemy::hit(self, shot, registry),
            _ => false,
        }
    }

    /// Drawable state for the sprite lookup; `None` draws nothing
    pub fn visual(&self) -> Option<Visual> {
        match &self.body {
            Body::Border(_) => None,
            Body::Terrain(t) => Some(t.visual()),
            Body::Structure(s) => Some(s.visual()),
            Body::Statue => Some(structure::statue_visual(self.is_killed())),
            Body::Bullet(b) => Some(b.visual()),
            Body::Powerup(p) => p.visual(),
            Body::Player(p) => {
                if self.is_killed() {
                    None
                } else {
                    Some(p.visual())
                }
            }
            Body::Enemy(e) => Some(e.visual()),
            Body::Effect(e) => Some(e.visual()),
        }
    }

    pub fn as_player(&self) -> Option<&PlayerTank> {
        match &self.body {
            Body::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerTank> {
        match &mut self.body {
            Body::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyTank> {
        match &self.body {
            Body::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyTank> {
        match &mut self.body {
            Body::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match &self.body {
            Body::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_structure_mut(&mut self) -> Option<&mut Structure> {
        match &mut self.body {
            Body::Structure(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_powerup(&self) -> Option<&Powerup> {
        match &self.body {
            Body::Powerup(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_effect(&self) -> Option<&Effect> {
        match &self.body {
            Body::Effect(e) => Some(e),
            _ => None,
        }
    }

    /// Whether a tank tolerates transient overlap with another tank
    pub fn may_move_while_colliding(&self) -> bool {
        match &self.body {
            Body::Player(p) => p.drive.can_move_while_colliding,
            Body::Enemy(e) => e.drive.can_move_while_colliding,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::structure::Material;

    fn brick() -> Entity {
        Entity::new(
            7,
            Vec2::new(10.0, 10.0),
            Vec2::splat(4.0),
            Body::Structure(Structure::new(Material::Brick)),
        )
    }

    #[test]
    fn test_kill_is_idempotent() {
        let mut e = brick();
        assert!(e.kill());
        assert!(!e.kill());
        assert!(e.is_killed());
    }

    #[test]
    fn test_resurrect_bumps_life_token() {
        let mut e = brick();
        let before = e.handle();
        e.kill();
        e.resurrect();
        assert!(!e.is_killed());
        assert_eq!(e.handle().id, before.id);
        assert_ne!(e.handle(), before);
    }

    #[test]
    fn test_rect_from_half_extents() {
        let e = brick();
        assert_eq!(e.rect(), Rect::new(6.0, 6.0, 14.0, 14.0));
    }

    #[test]
    fn test_trees_and_ice_are_not_collisional() {
        let trees = Entity::new(1, Vec2::ZERO, Vec2::ONE, Body::Terrain(Terrain::new(TerrainKind::Trees)));
        let ice = Entity::new(2, Vec2::ZERO, Vec2::ONE, Body::Terrain(Terrain::new(TerrainKind::Ice)));
        let water = Entity::new(3, Vec2::ZERO, Vec2::ONE, Body::Terrain(Terrain::new(TerrainKind::Water)));
        assert!(!trees.collisional);
        assert!(!ice.collisional);
        assert!(water.collisional);
        assert!(water.kind().is_uncrossable());
    }
}
