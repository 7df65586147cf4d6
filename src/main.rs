//! Tank Arena - headless native runner
//!
//! Plays a scripted match against the built-in stages and logs what happened.
//! Usage: `tank-arena [options.json] [frames]`

use std::path::PathBuf;

use tank_arena::audio::{Sound, SoundSink};
use tank_arena::consts::UPDATE_INTERVAL_MS;
use tank_arena::platform::{Action, KeyState, LogicalKey};
use tank_arena::renderer::{DrawList, PackedSprites};
use tank_arena::sim::{Category, PlayerSlot};
use tank_arena::{Game, GameOptions, GamePhase};

const DEFAULT_FRAMES: u32 = 60 * 60 * 3;
/// Frames between scripted direction changes
const TURN_EVERY: u32 = 90;
/// Frames between logged snapshots
const REPORT_EVERY: u32 = 600;

/// Counts what would have been played
#[derive(Default)]
struct SoundCounter {
    played: u32,
    last: Option<Sound>,
}

impl SoundSink for SoundCounter {
    fn play(&mut self, sound: Sound, _volume: f32) {
        self.played += 1;
        self.last = Some(sound);
    }
}

/// Hold fire and sweep through the directions
fn script(keys: &mut KeyState, frame: u32, players: u8) {
    const DIRECTIONS: [Action; 4] = [Action::Up, Action::Left, Action::Up, Action::Right];
    let count = if players >= 2 { 2 } else { 1 };

    for (n, slot) in PlayerSlot::ALL.iter().take(count).enumerate() {
        keys.press(LogicalKey::Player(*slot, Action::Fire));
        if frame % TURN_EVERY == 0 {
            let turn = (frame / TURN_EVERY) as usize + n;
            for action in DIRECTIONS {
                keys.release(LogicalKey::Player(*slot, action));
            }
            keys.press(LogicalKey::Player(*slot, DIRECTIONS[turn % DIRECTIONS.len()]));
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Tank Arena (headless) starting...");

    let mut args = std::env::args().skip(1);
    let options = match args.next().map(PathBuf::from) {
        Some(path) => match GameOptions::load(&path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Cannot use {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GameOptions::default(),
    };
    let frames = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Frame count {arg:?} is not a number, using {DEFAULT_FRAMES}");
            DEFAULT_FRAMES
        }),
        None => DEFAULT_FRAMES,
    };

    let players = options.players;
    let mut game = Game::new(options);
    let mut keys = KeyState::new();
    let mut sounds = SoundCounter::default();
    let mut canvas = DrawList::new();

    for frame in 0..frames {
        script(&mut keys, frame, players);
        let phase = game.frame(&mut keys, UPDATE_INTERVAL_MS, &mut sounds);

        if frame % REPORT_EVERY == 0 {
            canvas.clear();
            game.render(&PackedSprites, &mut canvas);
            log::info!(
                "frame {:>6} stage {:>2} {:?}: {} sprites, {} enemies in play, {} queued, {} bullets",
                frame,
                game.stage(),
                phase,
                canvas.len(),
                game.registry().enemies_in_play(),
                game.registry().queued_enemies(),
                game.registry().count(Category::Bullets)
            );
        }
        if phase == GamePhase::GameOver {
            break;
        }
    }

    let scores = game.scores();
    log::info!(
        "Finished after {} frames at stage {} ({:?})",
        game.frames(),
        game.stage(),
        game.phase()
    );
    for slot in PlayerSlot::ALL.iter().take(usize::from(players.max(1))) {
        log::info!("Player {}: {} points", slot.number(), scores.total(*slot));
    }
    log::info!("{} sounds played, last {:?}", sounds.played, sounds.last);
}
