//! Sound requests
//!
//! The simulation only asks for sounds; a platform sink plays them. Requests
//! are collected per frame and de-duplicated so ten bricks breaking in one
//! frame still produce a single hit sound.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Player bullet hits brick (or the statue)
    BulletBrickHit,
    /// Player bullet hits steel or the border
    BulletSteelHit,
    /// Armored enemy loses a layer
    ArmorHit,
    /// Enemy tank destroyed
    DestroyEnemy,
    /// Player tank or statue destroyed
    DestroyPlayer,
    /// Powerup appears
    PowerupSpawn,
    /// Powerup collected
    PowerupPickup,
    /// Extra life collected
    ExtraLife,
    /// Engine while moving
    TankMove,
    /// Engine while standing
    TankIdle,
}

impl Sound {
    pub const ALL: [Sound; 10] = [
        Sound::BulletBrickHit,
        Sound::BulletSteelHit,
        Sound::ArmorHit,
        Sound::DestroyEnemy,
        Sound::DestroyPlayer,
        Sound::PowerupSpawn,
        Sound::PowerupPickup,
        Sound::ExtraLife,
        Sound::TankMove,
        Sound::TankIdle,
    ];

    /// Asset name used by sinks that load sound files
    pub fn name(self) -> &'static str {
        match self {
            Sound::BulletBrickHit => "bullet_brick_hit",
            Sound::BulletSteelHit => "bullet_steel_hit",
            Sound::ArmorHit => "armor_hit",
            Sound::DestroyEnemy => "destroy_enemy",
            Sound::DestroyPlayer => "destroy_player",
            Sound::PowerupSpawn => "powerup_spawn",
            Sound::PowerupPickup => "powerup_pickup",
            Sound::ExtraLife => "extra_life",
            Sound::TankMove => "tank_move",
            Sound::TankIdle => "tank_idle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let found = Self::ALL.iter().copied().find(|s| s.name() == name);
        if found.is_none() {
            log::warn!("Unknown sound id {name:?}, ignoring");
        }
        found
    }

    /// Engine sounds loop rather than play once
    pub fn is_engine(self) -> bool {
        matches!(self, Sound::TankMove | Sound::TankIdle)
    }
}

/// Per-frame request buffer
#[derive(Debug, Default)]
pub struct SoundQueue {
    pending: Vec<Sound>,
}

impl SoundQueue {
    /// Fire-and-forget; repeated requests within a frame collapse into one
    pub fn request(&mut self, sound: Sound) {
        if !self.pending.contains(&sound) {
            self.pending.push(sound);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Requests in first-asked order
    pub fn drain(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.pending)
    }
}

/// Whatever actually makes noise
pub trait SoundSink {
    fn play(&mut self, sound: Sound, volume: f32);
}

/// Sink that drops everything (headless runs)
#[derive(Debug, Default)]
pub struct SilentSink;

impl SoundSink for SilentSink {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
}

/// Volume and mute in front of a sink
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Engine loop currently running, if any
    engine: Option<Sound>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            engine: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Forward one frame of requests to the sink.
    ///
    /// One-shot sounds always play. Engine sounds only play when the loop
    /// changes, and moving wins over idling when both were asked for.
    pub fn play_frame(&mut self, sounds: &[Sound], sink: &mut dyn SoundSink) {
        let vol = self.effective_volume();

        let engine = if sounds.contains(&Sound::TankMove) {
            Some(Sound::TankMove)
        } else if sounds.contains(&Sound::TankIdle) {
            Some(Sound::TankIdle)
        } else {
            None
        };
        if engine != self.engine {
            self.engine = engine;
            if let Some(sound) = engine
                && vol > 0.0
            {
                sink.play(sound, vol);
            }
        }

        if vol <= 0.0 {
            return;
        }
        for sound in sounds.iter().copied().filter(|s| !s.is_engine()) {
            sink.play(sound, vol);
        }
    }
}
