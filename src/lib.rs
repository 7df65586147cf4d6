//! Tank Arena - grid arena tank combat
//!
//! Core modules:
//! - `sim`: Frame-stepped entity simulation (registry, collisions, reactions)
//! - `game`: Level/wave driver feeding the registry, win/lose transitions
//! - `renderer`: Sprite lookup and canvas contracts consumed by `render()`
//! - `platform`: Input collaborator (logical keys)
//! - `audio`: Sound request queue
//! - `settings`: Game options and mode presets
//! - `scores`: Points per victim and the per-player board

pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod scores;
pub mod settings;
pub mod sim;

pub use game::{Game, GamePhase};
pub use scores::ScoreBoard;
pub use settings::{GameMode, GameOptions};

/// Game configuration constants
pub mod consts {
    /// Nominal frame interval in milliseconds (one simulation unit)
    pub const UPDATE_INTERVAL_MS: f32 = 16.666;
    /// Elapsed time above this is treated as exactly one nominal frame
    pub const MAX_FRAME_MS: f32 = 200.0;

    /// Playfield edge length
    pub const ARENA_SIZE: f32 = 600.0;
    /// Grid cells per arena edge
    pub const GRID_SIZE: u32 = 26;
    /// Edge length of one grid cell
    pub const GRID_STEP: f32 = ARENA_SIZE / GRID_SIZE as f32;
    /// Source sprites are 208px wide
    pub const SPRITE_SCALE: f32 = ARENA_SIZE / 208.0;

    /// Bullet collision half-extent
    pub const BULLET_HALF: f32 = (4.0 * SPRITE_SCALE) / 2.0;
    /// Gap between a tank's leading edge and a fresh bullet
    pub const MUZZLE_GAP: f32 = 1.0;
    /// Thickness of the synthetic border slabs outside the arena
    pub const BORDER_THICKNESS: f32 = 50.0;

    /// Concurrent enemy tanks in play
    pub const MAX_ENEMIES_IN_PLAY: usize = 4;
    /// Enemy slots per wave
    pub const WAVE_LENGTH: usize = 20;
    /// Wave slots whose tank drops a powerup when destroyed
    pub const POWERUP_CARRIER_SLOTS: [usize; 3] = [3, 10, 17];
    /// Number of stages in the built-in wave table
    pub const STAGE_COUNT: u32 = 35;

    /// Frame-units a tank keeps sliding after stopping on ice
    pub const ICE_SLIDE_UNITS: f32 = 30.0;
    /// Enemy fire cadence in frame-units
    pub const ENEMY_FIRE_CADENCE: f32 = 30.0;
    /// Enemy fire chance right after spawning (percent)
    pub const ENEMY_FIRE_CHANCE_MAX: u32 = 95;
    /// Enemy fire chance right after a shot (percent)
    pub const ENEMY_FIRE_CHANCE_AFTER_SHOT: u32 = 30;
    /// Fire chance regained per missed eligible tick (percent)
    pub const ENEMY_FIRE_CHANCE_STEP: u32 = 5;

    /// Wall-clock delays (milliseconds)
    pub const BULLET_RELOAD_MS: f32 = 150.0;
    pub const ENEMY_SPAWN_INTERVAL_MS: f32 = 3000.0;
    pub const ENEMY_FREEZE_MS: f32 = 15000.0;
    pub const STEEL_FORTRESS_MS: f32 = 20000.0;
    pub const FRIENDLY_FIRE_STUN_MS: f32 = 3000.0;
    pub const NEXT_LEVEL_DELAY_MS: f32 = 2000.0;
    pub const GAME_OVER_DELAY_MS: f32 = 1000.0;

    /// Reserve lives a player starts with
    pub const PLAYER_START_LIVES: u8 = 2;
    pub const PLAYER_MOVE_SPEED: f32 = 2.0;
    pub const PLAYER_BULLET_SPEED: f32 = 6.0;
}

use consts::{MAX_FRAME_MS, UPDATE_INTERVAL_MS};

/// Convert real elapsed milliseconds into simulation frame-units.
///
/// Returns `(units, effective_ms)`. A slow frame (over `MAX_FRAME_MS`) is
/// collapsed to exactly one nominal interval so nothing jumps far.
#[inline]
pub fn frame_units(elapsed_ms: f32) -> (f32, f32) {
    let ms = if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
        0.0
    } else if elapsed_ms > MAX_FRAME_MS {
        UPDATE_INTERVAL_MS
    } else {
        elapsed_ms
    };
    (ms / UPDATE_INTERVAL_MS, ms)
}

/// Milliseconds expressed in frame-units
#[inline]
pub fn ms_to_units(ms: f32) -> f32 {
    ms / UPDATE_INTERVAL_MS
}

/// Snap a coordinate to the nearest grid line (midpoint rounds up)
#[inline]
pub fn snap_to_grid(value: f32, step: f32) -> f32 {
    let rem = value.rem_euclid(step);
    value - rem + if rem >= step / 2.0 { step } else { 0.0 }
}
