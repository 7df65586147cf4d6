//! Movement and firing shared by player and enemy tanks

use glam::Vec2;

use super::bullet::Shooter;
use super::entity::{Body, Direction, Entity, Kind};
use super::rect::Rect;
use super::registry::{Category, Registry, Slot};
use crate::consts::{BULLET_HALF, ICE_SLIDE_UNITS, MUZZLE_GAP};
use crate::snap_to_grid;

/// Track animation toggles every this many moves
const TRACK_FRAME_MOVES: u32 = 3;

/// Drive state common to both tank kinds
#[derive(Debug, Clone)]
pub struct Drive {
    pub orientation: Direction,
    /// Arena units per frame-unit
    pub speed: f32,
    /// A move was attempted this frame
    pub moving: bool,
    /// Tolerates overlap with another tank until it separates
    pub can_move_while_colliding: bool,
    /// Frame-units of ice slide left
    pub slide: f32,
    pub bullets_alive: u8,
    track_counter: u32,
    pub track_frame: u8,
}

impl Drive {
    pub fn new(orientation: Direction, speed: f32) -> Self {
        Self {
            orientation,
            speed,
            moving: false,
            can_move_while_colliding: false,
            slide: 0.0,
            bullets_alive: 0,
            track_counter: 0,
            track_frame: 0,
        }
    }

    fn animate(&mut self) {
        self.track_counter += 1;
        if self.track_counter % TRACK_FRAME_MOVES == 0 {
            self.track_frame ^= 1;
        }
    }

    /// Start of frame: clear the move flag, returning last frame's value
    pub fn begin_frame(&mut self) -> bool {
        std::mem::replace(&mut self.moving, false)
    }
}

/// Result of trying to drive forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved; any powerups overlapping the new footprint are listed
    Moved { powerups: Vec<Slot> },
    /// Stopped behind another tank
    Held,
    /// Path blocked; the caller should pick another heading
    Turn,
}

fn split(entity: &mut Entity) -> Option<(&mut Vec2, &mut Drive)> {
    let Entity { pos, body, .. } = entity;
    match body {
        Body::Player(p) => Some((pos, &mut p.drive)),
        Body::Enemy(e) => Some((pos, &mut e.drive)),
        _ => None,
    }
}

pub fn drive(entity: &Entity) -> Option<&Drive> {
    match &entity.body {
        Body::Player(p) => Some(&p.drive),
        Body::Enemy(e) => Some(&e.drive),
        _ => None,
    }
}

pub fn drive_mut(entity: &mut Entity) -> Option<&mut Drive> {
    split(entity).map(|(_, drive)| drive)
}

/// Snap the axis perpendicular to travel onto the grid
pub fn grid_lock(entity: &mut Entity, step: f32) {
    let Some((pos, drive)) = split(entity) else {
        return;
    };
    if drive.orientation.is_vertical() {
        pos.x = snap_to_grid(pos.x, step);
    } else {
        pos.y = snap_to_grid(pos.y, step);
    }
}

/// Try to move `distance` along the current orientation.
///
/// Walls, water, the statue and the arena edge turn the tank. Another tank
/// holds it, except that two tanks already overlapping where they stand may
/// push apart as long as neither of them was held before.
pub fn advance(entity: &mut Entity, registry: &Registry, distance: f32) -> Advance {
    let id = entity.id;
    let here = entity.rect();
    let half = entity.half;
    let Some((pos, drive)) = split(entity) else {
        return Advance::Held;
    };
    let target = *pos + drive.orientation.unit() * distance;
    let footprint = Rect::around(target, half);
    drive.moving = true;

    let ahead: Vec<(Slot, Kind, bool)> = registry
        .all_overlapping(footprint, Some(id))
        .into_iter()
        .filter_map(|slot| {
            registry
                .get(slot)
                .map(|e| (slot, e.kind(), e.may_move_while_colliding()))
        })
        .collect();

    if registry.arena().outside_edge(&footprint).is_some()
        || ahead.iter().any(|(_, kind, _)| kind.is_uncrossable())
    {
        return Advance::Turn;
    }

    if ahead.iter().any(|(_, kind, _)| kind.is_tank()) {
        let stuck_together = registry
            .all_overlapping(here, Some(id))
            .into_iter()
            .any(|slot| registry.get(slot).is_some_and(|e| e.kind().is_tank()));
        if !stuck_together {
            return Advance::Turn;
        }
        let others_may_move = ahead
            .iter()
            .any(|(_, kind, may)| kind.is_tank() && *may);
        if others_may_move {
            drive.can_move_while_colliding = false;
            return Advance::Held;
        }
        drive.can_move_while_colliding = true;
        *pos = target;
        drive.animate();
        return Advance::Moved {
            powerups: Vec::new(),
        };
    }

    drive.can_move_while_colliding = false;
    *pos = target;
    drive.animate();
    Advance::Moved {
        powerups: ahead
            .into_iter()
            .filter(|(slot, _, _)| slot.category == Category::Powerups)
            .map(|(slot, _, _)| slot)
            .collect(),
    }
}

/// Keep a tank sliding for a while after it stops on ice
pub fn settle_slide(entity: &mut Entity, registry: &Registry, was_moving: bool, distance: f32, units: f32) {
    let id = entity.id;
    let half = entity.half;
    let on_ice = registry.is_on_ice(entity.pos);
    let Some((pos, drive)) = split(entity) else {
        return;
    };

    if was_moving && !drive.moving && on_ice {
        drive.slide = ICE_SLIDE_UNITS;
    }
    if !on_ice || drive.moving {
        drive.slide = 0.0;
    }
    if drive.slide <= 0.0 {
        return;
    }

    drive.slide = (drive.slide - units).max(0.0);
    let target = *pos + drive.orientation.unit() * distance;
    if registry
        .first_blocking(Rect::around(target, half), Some(id))
        .is_none()
    {
        *pos = target;
    }
}

/// Fire one bullet from the muzzle, counting it against the tank
pub fn fire(entity: &mut Entity, registry: &mut Registry, speed: f32, strength: u8, shooter: Shooter) {
    let owner = entity.handle();
    let center = entity.pos;
    let half = entity.half;
    let Some(drive) = drive_mut(entity) else {
        return;
    };
    let direction = drive.orientation;
    drive.bullets_alive = drive.bullets_alive.saturating_add(1);

    let reach = if direction.is_vertical() { half.y } else { half.x };
    let muzzle = center + direction.unit() * (reach + BULLET_HALF + MUZZLE_GAP);
    registry.generate_bullet(muzzle, direction, speed, strength, owner, shooter);
}

/// A fired bullet has expired; saturates at zero
pub fn release_bullet(entity: &mut Entity) {
    if let Some(drive) = drive_mut(entity) {
        drive.bullets_alive = drive.bullets_alive.saturating_sub(1);
    }
}
