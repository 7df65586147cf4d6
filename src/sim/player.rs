//! Player tanks
//!
//! Input-driven movement and fire, star upgrades, force fields, and the
//! death/respawn cycle. A player tank never leaves its category while it has
//! lives in reserve: it is killed (and made non-collisional) for the
//! explosion and spawn flash, then resurrected under a new life token.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bullet::{Shooter, Shot};
use super::deferred::DeferredAction;
use super::effect::{EffectKind, Followup};
use super::entity::{Direction, Entity, Handle};
use super::powerup::PowerupKind;
use super::registry::{Category, Registry, Slot};
use super::tank::{self, Advance, Drive};
use crate::audio::Sound;
use crate::consts::{FRIENDLY_FIRE_STUN_MS, PLAYER_BULLET_SPEED, PLAYER_MOVE_SPEED, PLAYER_START_LIVES};
use crate::platform::{Action, InputSource, LogicalKey};
use crate::renderer::{SpriteKind, Visual};
use crate::scores::{POWERUP_POINTS, Victim};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const ALL: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    /// 1-based number for display and logs
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceField {
    None,
    /// Granted on every spawn
    Brief,
    /// Helmet powerup
    Strong,
}

/// Highest star level; each level unlocks one upgrade
pub const MAX_STARS: u8 = 3;

#[derive(Debug, Clone)]
pub struct PlayerTank {
    pub slot: PlayerSlot,
    pub spawn: Vec2,
    pub drive: Drive,
    /// Lives in reserve; at zero the next death is final
    pub lives: u8,
    pub stars: u8,
    pub bullet_speed: f32,
    pub bullet_strength: u8,
    pub can_fire_twice: bool,
    pub field: ForceField,
    /// Bumped for every new force field so a stale expiry is ignored
    field_serial: u32,
    /// Friendly-fire stun: no movement, firing still allowed
    pub frozen: bool,
    pub eliminated: bool,
}

impl PlayerTank {
    pub fn new(slot: PlayerSlot, spawn: Vec2) -> Self {
        let mut drive = Drive::new(Direction::Up, PLAYER_MOVE_SPEED);
        // A fresh player may shove its way out of a tank sitting on its spawn
        drive.can_move_while_colliding = true;
        Self {
            slot,
            spawn,
            drive,
            lives: PLAYER_START_LIVES,
            stars: 0,
            bullet_speed: PLAYER_BULLET_SPEED,
            bullet_strength: 1,
            can_fire_twice: false,
            field: ForceField::None,
            field_serial: 0,
            frozen: false,
            eliminated: false,
        }
    }

    pub fn bullet_cap(&self) -> u8 {
        if self.can_fire_twice { 2 } else { 1 }
    }

    /// Next star: faster bullets, then a second bullet, then double damage
    pub fn add_star(&mut self) {
        if self.stars >= MAX_STARS {
            return;
        }
        self.stars += 1;
        match self.stars {
            1 => self.bullet_speed = PLAYER_BULLET_SPEED * 2.0,
            2 => self.can_fire_twice = true,
            _ => self.bullet_strength = 2,
        }
    }

    pub fn reset_upgrades(&mut self) {
        self.stars = 0;
        self.bullet_speed = PLAYER_BULLET_SPEED;
        self.bullet_strength = 1;
        self.can_fire_twice = false;
    }

    pub fn visual(&self) -> Visual {
        let frame = self.drive.orientation.index() * 2 + self.drive.track_frame;
        Visual::new(SpriteKind::PlayerTank(self.slot), self.stars, frame)
    }
}

/// Held direction with priority up, down, left, right
fn steering(input: &dyn InputSource, slot: PlayerSlot) -> Option<Direction> {
    [
        (Action::Up, Direction::Up),
        (Action::Down, Direction::Down),
        (Action::Left, Direction::Left),
        (Action::Right, Direction::Right),
    ]
    .into_iter()
    .find(|(action, _)| input.is_pressed(LogicalKey::Player(slot, *action)))
    .map(|(_, direction)| direction)
}

pub fn update(entity: &mut Entity, registry: &mut Registry, input: &dyn InputSource, units: f32) -> bool {
    if entity.is_killed() {
        // Waiting out the explosion and spawn flash, unless this was the last life
        return entity.as_player().is_none_or(|tank| tank.eliminated);
    }
    let step = registry.arena().step;
    let Some(tank) = entity.as_player_mut() else {
        return true;
    };
    let slot = tank.slot;
    let frozen = tank.frozen;
    let was_moving = tank.drive.begin_frame();
    let distance = tank.drive.speed * units;

    if let Some(direction) = steering(input, slot).filter(|_| !frozen) {
        tank.drive.orientation = direction;
        tank::grid_lock(entity, step);
        if let Advance::Moved { powerups } = tank::advance(entity, registry, distance) {
            for powerup in powerups {
                collect(entity, registry, powerup);
            }
        }
    }

    if input.is_pressed(LogicalKey::Player(slot, Action::Fire)) {
        try_fire(entity, registry);
    }

    tank::settle_slide(entity, registry, was_moving, distance, units);

    let moving = tank::drive(entity).is_some_and(|d| d.moving);
    registry.request_sound(if moving { Sound::TankMove } else { Sound::TankIdle });
    false
}

fn try_fire(entity: &mut Entity, registry: &mut Registry) {
    let Some(tank) = entity.as_player() else {
        return;
    };
    if tank.drive.bullets_alive >= tank.bullet_cap() {
        return;
    }
    let (speed, strength, slot) = (tank.bullet_speed, tank.bullet_strength, tank.slot);
    tank::fire(entity, registry, speed, strength, Shooter::Player(slot));
}

/// Take the powerup at `slot` if nobody got to it first this frame
fn collect(entity: &mut Entity, registry: &mut Registry, slot: Slot) {
    let picked = registry
        .with_entity(slot, |powerup, _| {
            if powerup.kill() {
                powerup.as_powerup().map(|p| (p.kind, powerup.pos))
            } else {
                None
            }
        })
        .flatten();
    if let Some((kind, at)) = picked {
        apply_powerup(entity, registry, kind, at);
    }
}

pub fn apply_powerup(entity: &mut Entity, registry: &mut Registry, kind: PowerupKind, at: Vec2) {
    let Some(slot) = entity.as_player().map(|tank| tank.slot) else {
        return;
    };
    registry.award(slot, Victim::Powerup);
    registry.request_sound(if kind == PowerupKind::Tank {
        Sound::ExtraLife
    } else {
        Sound::PowerupPickup
    });

    match kind {
        PowerupKind::Helmet => set_force_field(entity, registry, ForceField::Strong),
        PowerupKind::Timer => registry.freeze_enemies(),
        PowerupKind::Shovel => registry.build_steel_fortress(),
        PowerupKind::Star => {
            if let Some(tank) = entity.as_player_mut() {
                tank.add_star();
            }
        }
        PowerupKind::Grenade => registry.explode_enemies_in_play(),
        PowerupKind::Tank => {
            if let Some(tank) = entity.as_player_mut() {
                tank.lives = tank.lives.saturating_add(1);
            }
        }
    }

    registry.generate_points(at, POWERUP_POINTS);
    log::debug!("Player {} picked up {:?}", slot.number(), kind);
}

/// Raise a force field, replacing any current one
pub fn set_force_field(entity: &mut Entity, registry: &mut Registry, field: ForceField) {
    let (id, handle, pos) = (entity.id, entity.handle(), entity.pos);
    let Some(tank) = entity.as_player_mut() else {
        return;
    };
    tank.field = field;
    tank.field_serial = tank.field_serial.wrapping_add(1);
    let serial = tank.field_serial;
    registry.generate_effect(
        EffectKind::Invulnerable {
            strong: field == ForceField::Strong,
        },
        pos,
        Some(id),
        Followup::DropForceField { tank: handle, serial },
    );
}

pub fn hit(entity: &mut Entity, shot: &Shot, registry: &mut Registry) -> bool {
    if entity.is_killed() {
        return false;
    }
    let (handle, pos) = (entity.handle(), entity.pos);
    let Some(tank) = entity.as_player_mut() else {
        return false;
    };
    if tank.field != ForceField::None {
        return true;
    }

    if shot.is_player() && registry.friendly_fire() {
        tank.frozen = true;
        registry.schedule(FRIENDLY_FIRE_STUN_MS, DeferredAction::Unfreeze { tank: handle });
        return true;
    }

    let slot = tank.slot;
    let then = if tank.lives > 0 {
        tank.lives -= 1;
        Followup::Respawn {
            tank: handle,
            reset_upgrades: true,
        }
    } else {
        tank.eliminated = true;
        Followup::Nothing
    };
    let lives = tank.lives;

    entity.kill();
    entity.collisional = false;
    registry.request_sound(Sound::DestroyPlayer);
    registry.generate_effect(EffectKind::LargeExplosion, pos, None, then);
    log::info!("Player {} destroyed, {} lives left", slot.number(), lives);
    true
}

/// Put the tank back at its spawn behind a spawn flash. It stays dead and
/// non-collisional until the flash resurrects it.
pub fn begin_respawn(entity: &mut Entity, registry: &mut Registry, reset_upgrades: bool) {
    let Some(tank) = entity.as_player_mut() else {
        return;
    };
    if reset_upgrades {
        tank.reset_upgrades();
    }
    tank.field = ForceField::None;
    tank.frozen = false;
    tank.drive.orientation = Direction::Up;
    tank.drive.slide = 0.0;
    tank.drive.moving = false;
    // Releases for bullets from the old life are dropped
    tank.drive.bullets_alive = 0;
    let spawn = tank.spawn;

    entity.pos = spawn;
    entity.kill();
    entity.collisional = false;
    let handle = entity.handle();
    registry.generate_effect(EffectKind::SpawnFlash, spawn, None, Followup::Resurrect { tank: handle });
}

/// Run `f` on the player tank behind `handle` if it is still on that life
fn with_player(registry: &mut Registry, handle: Handle, f: impl FnOnce(&mut Entity, &mut Registry)) {
    let Some(slot) = registry.find(Category::PlayerTanks, handle.id) else {
        return;
    };
    registry.with_entity(slot, |entity, registry| {
        if entity.handle() == handle {
            f(entity, registry);
        }
    });
}

pub fn respawn(registry: &mut Registry, handle: Handle, reset_upgrades: bool) {
    with_player(registry, handle, |entity, registry| {
        begin_respawn(entity, registry, reset_upgrades);
    });
}

pub fn resurrect(registry: &mut Registry, handle: Handle) {
    with_player(registry, handle, |entity, registry| {
        if !entity.is_killed() {
            return;
        }
        entity.resurrect();
        set_force_field(entity, registry, ForceField::Brief);
    });
}

pub fn drop_force_field(registry: &mut Registry, handle: Handle, serial: u32) {
    with_player(registry, handle, |entity, _| {
        if let Some(tank) = entity.as_player_mut() {
            if tank.field_serial == serial {
                tank.field = ForceField::None;
            }
        }
    });
}

pub fn unfreeze(registry: &mut Registry, handle: Handle) {
    with_player(registry, handle, |entity, _| {
        if let Some(tank) = entity.as_player_mut() {
            tank.frozen = false;
        }
    });
}

/// New level: back to the spawn point, keeping upgrades
pub fn restart(entity: &mut Entity, registry: &mut Registry) {
    begin_respawn(entity, registry, false);
}
