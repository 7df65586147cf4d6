//! Powerup pickups. Collection itself happens in the player's move.

use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity};
use crate::renderer::{SpriteKind, Visual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Strong force field
    Helmet,
    /// Freeze every enemy
    Timer,
    /// Steel fortress for a while
    Shovel,
    /// Next weapon upgrade
    Star,
    /// Destroy every enemy in play
    Grenade,
    /// Extra life
    Tank,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 6] = [
        PowerupKind::Helmet,
        PowerupKind::Timer,
        PowerupKind::Shovel,
        PowerupKind::Star,
        PowerupKind::Grenade,
        PowerupKind::Tank,
    ];

    pub fn index(self) -> u8 {
        match self {
            PowerupKind::Helmet => 0,
            PowerupKind::Timer => 1,
            PowerupKind::Shovel => 2,
            PowerupKind::Star => 3,
            PowerupKind::Grenade => 4,
            PowerupKind::Tank => 5,
        }
    }
}

const BLINK_UPDATES: u32 = 7;

#[derive(Debug, Clone)]
pub struct Powerup {
    pub kind: PowerupKind,
    blink_counter: u32,
    visible: bool,
}

impl Powerup {
    pub fn new(kind: PowerupKind) -> Self {
        Self {
            kind,
            blink_counter: 0,
            visible: true,
        }
    }

    /// Nothing is drawn during the dark half of a blink
    pub fn visual(&self) -> Option<Visual> {
        self.visible
            .then(|| Visual::new(SpriteKind::Powerup(self.kind), self.kind.index(), 0))
    }
}

pub fn update(entity: &mut Entity) -> bool {
    if entity.is_killed() {
        return true;
    }
    if let Body::Powerup(p) = &mut entity.body {
        p.blink_counter += 1;
        if p.blink_counter % BLINK_UPDATES == 0 {
            p.visible = !p.visible;
        }
    }
    false
}
