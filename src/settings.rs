//! Game options and mode presets
//!
//! Stored as JSON next to the binary; the simulation only ever sees the
//! resolved `GameOptions`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::STAGE_COUNT;

/// How many players and who fights whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Single,
    /// Two players against the waves
    Tandem,
    /// Two players against each other, no enemies
    Versus,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Single => "Single",
            GameMode::Tandem => "Tandem",
            GameMode::Versus => "Versus",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "1p" => Some(GameMode::Single),
            "tandem" | "2p" | "coop" => Some(GameMode::Tandem),
            "versus" | "vs" => Some(GameMode::Versus),
            _ => None,
        }
    }

    /// Default options for this mode
    pub fn options(&self) -> GameOptions {
        let base = GameOptions::default();
        match self {
            GameMode::Single => base,
            GameMode::Tandem => GameOptions { players: 2, ..base },
            GameMode::Versus => GameOptions {
                players: 2,
                friendly_fire: true,
                enemies_enabled: false,
                ..base
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// 1 or 2
    pub players: u8,
    /// Player bullets stun teammates instead of killing them
    pub friendly_fire: bool,
    pub enemies_enabled: bool,
    /// 1-based starting stage
    pub level: u32,
    pub seed: u64,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            players: 1,
            friendly_fire: false,
            enemies_enabled: true,
            level: 1,
            seed: 0x7a4e_2b1c,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Errors from reading or writing the options file
#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    InvalidValue(String),
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::IoError(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::ParseError(e)
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsError::ParseError(e) => write!(f, "Parse error: {}", e),
            SettingsError::InvalidValue(e) => write!(f, "Invalid value: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::IoError(e) => Some(e),
            SettingsError::ParseError(e) => Some(e),
            SettingsError::InvalidValue(_) => None,
        }
    }
}

impl GameOptions {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=2).contains(&self.players) {
            return Err(SettingsError::InvalidValue(format!(
                "players must be 1 or 2, got {}",
                self.players
            )));
        }
        if !(1..=STAGE_COUNT).contains(&self.level) {
            return Err(SettingsError::InvalidValue(format!(
                "level must be in 1..={}, got {}",
                STAGE_COUNT, self.level
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut options: GameOptions = serde_json::from_str(json)?;
        options.validate()?;
        options.master_volume = options.master_volume.clamp(0.0, 1.0);
        options.sfx_volume = options.sfx_volume.clamp(0.0, 1.0);
        Ok(options)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load options from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let options = Self::from_json(&json)?;
                log::info!("Loaded options from {}", path.display());
                Ok(options)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default options");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Options saved to {}", path.display());
        Ok(())
    }
}
