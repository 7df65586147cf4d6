//! Level and game driver
//!
//! Owns the registry and walks it through stages: set up the arena, run
//! frames, move on when the wave is gone, end the run when the flag falls or
//! nobody is left to fight.

use crate::audio::{AudioManager, SoundSink};
use crate::consts::{GAME_OVER_DELAY_MS, NEXT_LEVEL_DELAY_MS, STAGE_COUNT, UPDATE_INTERVAL_MS};
use crate::platform::{InputSource, LogicalKey};
use crate::renderer::{Canvas, SpriteLookup};
use crate::scores::ScoreBoard;
use crate::settings::GameOptions;
use crate::sim::entity::Entity;
use crate::sim::level::{Arena, LevelGrid, queue_wave, wave_for_stage, wave_slots};
use crate::sim::player::PlayerSlot;
use crate::sim::registry::{Category, Registry};
use crate::sim::tick;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Wave destroyed; the next stage starts after a short delay
    Breather,
    /// Simulation halted, `Step` advances a single frame
    Paused,
    /// Flag lost or players gone; the arena keeps running briefly
    Defeat,
    /// Run ended
    GameOver,
}

/// Stage after `stage`, wrapping back to the first
pub fn next_stage(stage: u32) -> u32 {
    stage % STAGE_COUNT + 1
}

pub struct Game {
    options: GameOptions,
    registry: Registry,
    phase: GamePhase,
    /// Phase to return to when unpausing
    resume_phase: GamePhase,
    stage: u32,
    /// Countdown for Breather and Defeat
    countdown_ms: f32,
    /// Level layout used for every stage instead of the built-in one
    custom_grid: Option<LevelGrid>,
    /// Fortress as first built, put back at every later stage
    fortress: Option<Vec<Entity>>,
    /// Score board as it stood when the last stage was cleared
    recap: Option<ScoreBoard>,
    audio: AudioManager,
    frames: u64,
}

impl Game {
    pub fn new(options: GameOptions) -> Self {
        Self::with_grid(options, None)
    }

    /// Start a run on a custom level layout. A grid that does not match the
    /// arena falls back to the built-in layout.
    pub fn with_grid(options: GameOptions, grid: Option<LevelGrid>) -> Self {
        let arena = Arena::default();
        let custom_grid = grid.filter(|g| {
            let fits = g.cells() == arena.cells;
            if !fits {
                log::warn!(
                    "Level grid is {} cells wide, arena needs {}; using built-in layout",
                    g.cells(),
                    arena.cells
                );
            }
            fits
        });

        let mut audio = AudioManager::new();
        audio.set_master_volume(options.master_volume);
        audio.set_sfx_volume(options.sfx_volume);
        audio.set_muted(options.muted);

        let mut game = Self {
            registry: Registry::new(arena, options.seed, options.friendly_fire),
            phase: GamePhase::Playing,
            resume_phase: GamePhase::Playing,
            stage: options.level.clamp(1, STAGE_COUNT),
            countdown_ms: 0.0,
            custom_grid,
            fortress: None,
            recap: None,
            audio,
            frames: 0,
            options,
        };

        game.setup_stage();
        let players = if game.options.players >= 2 { 2 } else { 1 };
        for slot in &PlayerSlot::ALL[..players] {
            game.registry.generate_player(*slot);
        }
        log::info!(
            "New game: {} player(s), stage {}, friendly fire {}, enemies {}",
            players,
            game.stage,
            game.options.friendly_fire,
            game.options.enemies_enabled
        );
        game
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn scores(&self) -> &ScoreBoard {
        self.registry.scores()
    }

    pub fn recap(&self) -> Option<&ScoreBoard> {
        self.recap.as_ref()
    }

    pub fn audio_mut(&mut self) -> &mut AudioManager {
        &mut self.audio
    }

    /// Simulation frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn is_versus(&self) -> bool {
        !self.options.enemies_enabled && self.options.players >= 2
    }

    // === Stage setup ===

    fn setup_stage(&mut self) {
        self.registry.clear_level();

        let arena = self.registry.arena();
        match &self.custom_grid {
            Some(grid) => grid.populate(&mut self.registry),
            None => LevelGrid::demo(&arena).populate(&mut self.registry),
        }

        if let Some(saved) = self.fortress.clone() {
            self.registry.restore_fortress(saved);
        } else {
            self.fortress = Some(self.registry.save_fortress());
        }

        if self.options.enemies_enabled {
            match wave_for_stage(self.stage).map(|codes| wave_slots(codes)) {
                Some(Ok(slots)) => queue_wave(&mut self.registry, &slots),
                Some(Err(e)) => log::warn!("Stage {} wave rejected: {}", self.stage, e),
                None => log::warn!("No wave for stage {}", self.stage),
            }
        }

        self.registry.generate_statue();
        self.registry.reset_spawn_timer();
        log::info!(
            "Stage {} ready: {} enemies queued",
            self.stage,
            self.registry.queued_enemies()
        );
    }

    fn advance_stage(&mut self) {
        self.stage = next_stage(self.stage);
        self.registry.scores_mut().clear_tallies();
        self.setup_stage();
        self.registry.restart_players();
        self.phase = GamePhase::Playing;
    }

    // === Frame ===

    /// One outer frame: pause keys, simulation step, sounds, phase changes.
    pub fn frame(&mut self, input: &mut dyn InputSource, elapsed_ms: f32, sink: &mut dyn SoundSink) -> GamePhase {
        if input.consume_key_press(LogicalKey::Pause) {
            self.toggle_pause();
        }

        match self.phase {
            GamePhase::GameOver => {}
            GamePhase::Paused => {
                // Transitions wait until play resumes
                if input.consume_key_press(LogicalKey::Step) {
                    self.step(&*input, UPDATE_INTERVAL_MS, sink);
                }
            }
            _ => {
                let ms = self.step(&*input, elapsed_ms, sink);
                self.update_phase(ms);
            }
        }
        self.phase
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Paused => {
                self.phase = self.resume_phase;
                log::info!("Resumed");
            }
            GamePhase::GameOver => {}
            phase => {
                self.resume_phase = phase;
                self.phase = GamePhase::Paused;
                log::info!("Paused at frame {}", self.frames);
            }
        }
    }

    /// Run the simulation once; returns the effective milliseconds
    fn step(&mut self, input: &dyn InputSource, elapsed_ms: f32, sink: &mut dyn SoundSink) -> f32 {
        let units = tick(&mut self.registry, input, elapsed_ms);
        self.frames += 1;
        let sounds = self.registry.drain_sounds();
        self.audio.play_frame(&sounds, sink);
        units * UPDATE_INTERVAL_MS
    }

    fn defeated(&self) -> bool {
        let needed = if self.is_versus() { 2 } else { 1 };
        self.registry.flag_destroyed() || self.registry.players_remaining() < needed
    }

    fn begin_defeat(&mut self) {
        log::info!(
            "Defeat at stage {} (flag {}, players left {})",
            self.stage,
            if self.registry.flag_destroyed() { "lost" } else { "standing" },
            self.registry.players_remaining()
        );
        self.phase = GamePhase::Defeat;
        self.countdown_ms = GAME_OVER_DELAY_MS;
    }

    fn update_phase(&mut self, ms: f32) {
        match self.phase {
            GamePhase::Playing => {
                if self.defeated() {
                    self.begin_defeat();
                } else if self.options.enemies_enabled && !self.registry.has_enemies() {
                    log::info!("Stage {} cleared", self.stage);
                    self.recap = Some(self.registry.scores().clone());
                    self.phase = GamePhase::Breather;
                    self.countdown_ms = NEXT_LEVEL_DELAY_MS;
                }
            }
            GamePhase::Breather => {
                if self.defeated() {
                    self.begin_defeat();
                    return;
                }
                self.countdown_ms -= ms;
                if self.countdown_ms <= 0.0 {
                    self.advance_stage();
                }
            }
            GamePhase::Defeat => {
                self.countdown_ms -= ms;
                if self.countdown_ms <= 0.0 {
                    self.phase = GamePhase::GameOver;
                    log::info!(
                        "Game over at stage {}: {} points",
                        self.stage,
                        self.registry.scores().combined()
                    );
                }
            }
            GamePhase::Paused | GamePhase::GameOver => {}
        }
    }

    pub fn render(&self, sprites: &dyn SpriteLookup, canvas: &mut dyn Canvas) {
        self.registry.render(sprites, canvas);
    }
}
