//! Transient animations and their follow-up chain
//!
//! An effect plays a ping-pong frame sequence for a fixed number of cycles,
//! then dies and runs its `Followup`. Chaining one effect into another is
//! just a `Followup::Effect`, which is how a large explosion becomes a small
//! explosion followed by the large one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, Handle};
use super::player;
use super::registry::Registry;
use crate::renderer::{SpriteKind, Visual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    SpawnFlash,
    SmallExplosion,
    LargeExplosion,
    /// Force-field shimmer around a player tank
    Invulnerable { strong: bool },
    /// Score popup
    Points { value: u32 },
}

/// Animation budget of an effect kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub frames: u32,
    pub cycles: f32,
    /// Frame-units per animation step
    pub speed: f32,
}

impl Timing {
    /// Animation steps before the effect finishes
    pub fn total_steps(&self) -> u32 {
        let period = (2 * self.frames).saturating_sub(2);
        (period as f32 * self.cycles).floor() as u32 + 1
    }

    /// Lifetime in frame-units
    pub fn duration(&self) -> f32 {
        self.total_steps() as f32 * self.speed
    }

    /// Frame shown at `step`, bouncing 0..frames-1..0
    pub fn frame_at(&self, step: u32) -> u32 {
        let period = (2 * self.frames).saturating_sub(2);
        if period == 0 {
            return 0;
        }
        let p = step % period;
        if p < self.frames { p } else { period - p }
    }
}

impl EffectKind {
    pub fn timing(self) -> Timing {
        let (frames, cycles, speed) = match self {
            EffectKind::SpawnFlash => (4, 2.5, 3.0),
            EffectKind::SmallExplosion => (3, 0.5, 4.0),
            EffectKind::LargeExplosion => (2, 1.0, 4.0),
            EffectKind::Invulnerable { strong: false } => (2, 50.0, 2.0),
            EffectKind::Invulnerable { strong: true } => (2, 200.0, 2.0),
            EffectKind::Points { value: 500 } => (1, 1.0, 70.0),
            EffectKind::Points { .. } => (1, 1.0, 15.0),
        };
        Timing {
            frames,
            cycles,
            speed,
        }
    }
}

/// What happens once an effect finishes
#[derive(Debug, Clone, PartialEq)]
pub enum Followup {
    Nothing,
    /// Start another effect at the same spot, then continue with `then`
    Effect { kind: EffectKind, then: Box<Followup> },
    Points { value: u32 },
    /// Death explosion finished: send the tank back to its spawn
    Respawn { tank: Handle, reset_upgrades: bool },
    /// Spawn flash finished: bring the tank back to life
    Resurrect { tank: Handle },
    /// Force field ran out, unless a newer one replaced it
    DropForceField { tank: Handle, serial: u32 },
    /// Enemy spawn flash finished: move the next queued enemy into play
    PromoteEnemy,
}

#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: EffectKind,
    /// Tank whose position the effect tracks
    follow: Option<EntityId>,
    elapsed: f32,
    then: Followup,
    frame: u8,
}

impl Effect {
    pub fn new(kind: EffectKind, follow: Option<EntityId>, then: Followup) -> Self {
        Self {
            kind,
            follow,
            elapsed: 0.0,
            then,
            frame: 0,
        }
    }

    pub fn then(&self) -> &Followup {
        &self.then
    }

    pub fn follows(&self) -> Option<EntityId> {
        self.follow
    }

    /// Advance the clock; true once the budget is spent
    fn advance(&mut self, units: f32) -> bool {
        let timing = self.kind.timing();
        self.elapsed += units;
        let step = (self.elapsed / timing.speed).floor() as u32;
        if step >= timing.total_steps() {
            return true;
        }
        self.frame = timing.frame_at(step) as u8;
        false
    }

    pub fn visual(&self) -> Visual {
        let (kind, frame) = match self.kind {
            EffectKind::SpawnFlash => (SpriteKind::SpawnFlash, self.frame),
            EffectKind::SmallExplosion => (SpriteKind::SmallExplosion, self.frame),
            EffectKind::LargeExplosion => (SpriteKind::LargeExplosion, self.frame),
            EffectKind::Invulnerable { .. } => (SpriteKind::Invulnerable, self.frame),
            EffectKind::Points { value } => {
                let index = (value / 100).saturating_sub(1);
                (SpriteKind::Points, u8::try_from(index).unwrap_or(u8::MAX))
            }
        };
        Visual::new(kind, 0, frame)
    }
}

pub fn update(entity: &mut Entity, registry: &mut Registry, units: f32) -> bool {
    if entity.is_killed() {
        return true;
    }
    let Body::Effect(effect) = &mut entity.body else {
        return true;
    };

    if let Some(pos) = effect.follow.and_then(|target| registry.position_of(target)) {
        entity.pos = pos;
    }
    if !effect.advance(units) {
        return false;
    }

    let then = std::mem::replace(&mut effect.then, Followup::Nothing);
    entity.kill();
    run_followup(then, entity.pos, registry);
    true
}

fn run_followup(then: Followup, pos: Vec2, registry: &mut Registry) {
    match then {
        Followup::Nothing => {}
        Followup::Effect { kind, then } => {
            registry.spawn_effect(kind, pos, None, *then);
        }
        Followup::Points { value } => {
            registry.generate_points(pos, value);
        }
        Followup::Respawn {
            tank,
            reset_upgrades,
        } => player::respawn(registry, tank, reset_upgrades),
        Followup::Resurrect { tank } => player::resurrect(registry, tank),
        Followup::DropForceField { tank, serial } => {
            player::drop_force_field(registry, tank, serial)
        }
        Followup::PromoteEnemy => registry.promote_enemy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::enemy::EnemyKind;
    use crate::sim::level::Arena;
    use crate::sim::registry::Category;

    fn registry() -> Registry {
        Registry::new(Arena::default(), 5, false)
    }

    /// Update every effect and popup once, dropping the finished ones
    fn run_effects(reg: &mut Registry, units: f32) {
        for category in [Category::Effects, Category::Points] {
            let slots: Vec<_> = reg.slots(category).map(|(slot, _)| slot).collect();
            for slot in slots {
                reg.with_entity(slot, |e, reg| update(e, reg, units));
            }
        }
    }

    fn kinds(reg: &Registry, category: Category) -> Vec<EffectKind> {
        reg.entities(category)
            .filter(|e| !e.is_killed())
            .filter_map(Entity::as_effect)
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_step_budgets() {
        assert_eq!(EffectKind::SpawnFlash.timing().total_steps(), 16);
        assert_eq!(EffectKind::SmallExplosion.timing().total_steps(), 3);
        assert_eq!(EffectKind::LargeExplosion.timing().total_steps(), 3);
        assert_eq!(EffectKind::Points { value: 100 }.timing().total_steps(), 1);
        assert_eq!(EffectKind::Points { value: 500 }.timing().duration(), 70.0);
    }

    #[test]
    fn test_frames_bounce() {
        let timing = EffectKind::SpawnFlash.timing();
        let frames: Vec<u32> = (0..8).map(|s| timing.frame_at(s)).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 2, 1, 0, 1]);
        assert_eq!(EffectKind::Points { value: 200 }.timing().frame_at(5), 0);
    }

    #[test]
    fn test_small_explosion_finishes_after_its_budget() {
        let mut e = Effect::new(EffectKind::SmallExplosion, None, Followup::Nothing);
        assert!(!e.advance(11.0));
        assert_eq!(e.frame, 2);
        assert!(e.advance(1.0));
    }

    #[test]
    fn test_large_explosion_chain_ends_in_points() {
        let mut reg = registry();
        reg.generate_effect(
            EffectKind::LargeExplosion,
            Vec2::new(80.0, 80.0),
            None,
            Followup::Points { value: 300 },
        );
        assert_eq!(kinds(&reg, Category::Effects), vec![EffectKind::SmallExplosion]);

        run_effects(&mut reg, 12.0);
        assert_eq!(kinds(&reg, Category::Effects), vec![EffectKind::LargeExplosion]);
        assert!(kinds(&reg, Category::Points).is_empty());

        run_effects(&mut reg, 12.0);
        assert!(kinds(&reg, Category::Effects).is_empty());
        assert_eq!(kinds(&reg, Category::Points), vec![EffectKind::Points { value: 300 }]);
        let popup = reg.entities(Category::Points).find(|e| !e.is_killed());
        assert_eq!(popup.map(|p| p.pos), Some(Vec2::new(80.0, 80.0)));
    }

    #[test]
    fn test_spawn_flash_promotes_enemy() {
        let mut reg = registry();
        reg.queue_enemy(Vec2::new(30.0, 30.0), EnemyKind::Basic, false);
        reg.generate_effect(EffectKind::SpawnFlash, Vec2::new(30.0, 30.0), None, Followup::PromoteEnemy);
        run_effects(&mut reg, 47.0);
        assert_eq!(reg.enemies_in_play(), 0);
        run_effects(&mut reg, 1.0);
        assert_eq!(reg.enemies_in_play(), 1);
        assert_eq!(reg.queued_enemies(), 0);
    }

    #[test]
    fn test_effect_tracks_followed_tank() {
        let mut reg = registry();
        let tank = reg.add_live_enemy(Vec2::new(100.0, 100.0), EnemyKind::Fast);
        reg.generate_effect(
            EffectKind::Invulnerable { strong: false },
            Vec2::ZERO,
            Some(tank),
            Followup::Nothing,
        );
        if let Some(t) = reg.find_tank(tank).and_then(|s| reg.get_mut(s)) {
            t.pos = Vec2::new(140.0, 120.0);
        }
        run_effects(&mut reg, 1.0);
        let shimmer = reg.entities(Category::Effects).next();
        assert_eq!(shimmer.map(|e| e.pos), Some(Vec2::new(140.0, 120.0)));
    }

    #[test]
    fn test_points_visual_frame_from_value() {
        let e = Effect::new(EffectKind::Points { value: 400 }, None, Followup::Nothing);
        assert_eq!(e.visual(), Visual::new(SpriteKind::Points, 0, 3));
    }
}
