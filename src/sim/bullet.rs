//! Bullets
//!
//! A bullet resolves its hits before it moves: every collisional entity under
//! its footprint is offered the shot in category order and the first one that
//! consumes it ends the flight. The owner gets its bullet back a short
//! wall-clock delay after the bullet dies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::deferred::DeferredAction;
use super::effect::{EffectKind, Followup};
use super::enemy::EnemyKind;
use super::entity::{Body, Direction, Entity, EntityId, Handle};
use super::player::PlayerSlot;
use super::registry::Registry;
use super::structure;
use crate::consts::BULLET_RELOAD_MS;
use crate::renderer::{SpriteKind, Visual};

/// Who pulled the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shooter {
    Player(PlayerSlot),
    Enemy(EnemyKind),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    /// Tank that fired it
    pub owner: Handle,
    pub shooter: Shooter,
    pub direction: Direction,
    /// Arena units per frame-unit
    pub speed: f32,
    /// 1 = normal, 2 = destroys any wall it touches
    pub strength: u8,
}

impl Bullet {
    pub fn new(
        owner: Handle,
        shooter: Shooter,
        direction: Direction,
        speed: f32,
        strength: u8,
    ) -> Self {
        Self {
            owner,
            shooter,
            direction,
            speed,
            strength,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction.unit() * self.speed
    }

    pub fn visual(&self) -> Visual {
        Visual::new(SpriteKind::Bullet, self.direction.index(), 0)
    }
}

/// Snapshot of a bullet handed to hit handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub id: EntityId,
    pub owner: EntityId,
    pub shooter: Shooter,
    pub direction: Direction,
    pub strength: u8,
    pub pos: Vec2,
}

impl Shot {
    pub fn of(entity: &Entity) -> Option<Shot> {
        match &entity.body {
            Body::Bullet(b) => Some(Shot {
                id: entity.id,
                owner: b.owner.id,
                shooter: b.shooter,
                direction: b.direction,
                strength: b.strength,
                pos: entity.pos,
            }),
            _ => None,
        }
    }

    #[inline]
    pub fn is_player(&self) -> bool {
        matches!(self.shooter, Shooter::Player(_))
    }
}

/// Kill a bullet and hand it back to its owner after the reload delay
pub fn destroy(entity: &mut Entity, registry: &mut Registry) {
    if !entity.kill() {
        return;
    }
    if let Body::Bullet(b) = &entity.body {
        registry.schedule(BULLET_RELOAD_MS, DeferredAction::ReleaseBullet { owner: b.owner });
    }
}

pub fn update(entity: &mut Entity, registry: &mut Registry, units: f32) -> bool {
    if entity.is_killed() {
        return true;
    }
    let Some(shot) = Shot::of(entity) else {
        return true;
    };

    let rect = entity.rect();
    let mut consumed = false;
    for slot in registry.all_overlapping(rect, Some(entity.id)) {
        let reacted = registry
            .with_entity(slot, |target, registry| {
                target.takes_bullet_hits() && target.on_bullet_hit(&shot, registry)
            })
            .unwrap_or(false);
        if reacted {
            consumed = true;
            break;
        }
    }

    if !consumed && registry.arena().outside_edge(&rect).is_some() {
        consumed = structure::border_hit(&shot, registry);
    }

    if consumed {
        registry.generate_effect(EffectKind::SmallExplosion, entity.pos, None, Followup::Nothing);
        destroy(entity, registry);
        return true;
    }

    if let Body::Bullet(b) = &entity.body {
        entity.pos += b.velocity() * units;
    }
    false
}

/// Bullets cancel each other out
pub fn hit(entity: &mut Entity, shot: &Shot, registry: &mut Registry) -> bool {
    if entity.id == shot.id || entity.is_killed() {
        return false;
    }
    destroy(entity, registry);
    true
}
