//! Score table and per-player board
//!
//! Points are keyed by what was destroyed or picked up; the board keeps a
//! running total plus kill tallies per enemy kind for the end-of-level recap.

use serde::{Deserialize, Serialize};

use crate::sim::enemy::EnemyKind;
use crate::sim::player::PlayerSlot;

/// Points for collecting any powerup
pub const POWERUP_POINTS: u32 = 500;

/// What earned the points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victim {
    Enemy(EnemyKind),
    Powerup,
}

impl Victim {
    pub fn points(self) -> u32 {
        match self {
            Victim::Enemy(kind) => kind.points(),
            Victim::Powerup => POWERUP_POINTS,
        }
    }
}

/// One player's line on the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub total: u32,
    /// Kills per enemy kind, in `EnemyKind::ALL` order
    pub kills: [u32; 4],
    pub powerups: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    players: [PlayerScore; 2],
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn award(&mut self, player: PlayerSlot, victim: Victim) {
        let line = &mut self.players[player.index()];
        line.total += victim.points();
        match victim {
            Victim::Enemy(kind) => {
                let index = EnemyKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
                line.kills[index] += 1;
            }
            Victim::Powerup => line.powerups += 1,
        }
    }

    pub fn total(&self, player: PlayerSlot) -> u32 {
        self.players[player.index()].total
    }

    pub fn kills(&self, player: PlayerSlot, kind: EnemyKind) -> u32 {
        EnemyKind::ALL
            .iter()
            .position(|k| *k == kind)
            .map_or(0, |index| self.players[player.index()].kills[index])
    }

    pub fn line(&self, player: PlayerSlot) -> &PlayerScore {
        &self.players[player.index()]
    }

    /// Both players together
    pub fn combined(&self) -> u32 {
        self.players.iter().map(|p| p.total).sum()
    }

    /// Start a new level's tallies, keeping running totals
    pub fn clear_tallies(&mut self) {
        for line in &mut self.players {
            line.kills = [0; 4];
            line.powerups = 0;
        }
    }
}
