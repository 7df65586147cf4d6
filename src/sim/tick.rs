//! Per-frame simulation step
//!
//! One tick converts real elapsed time into frame-units, runs every deferred
//! action whose deadline has passed, then sweeps each category in order and
//! finally applies the enemy spawn policy.

use super::deferred::DeferredAction;
use super::player;
use super::registry::{Category, Registry};
use super::tank;
use crate::frame_units;
use crate::platform::InputSource;
use crate::renderer::{Canvas, SpriteLookup};

/// Advance the simulation by `elapsed_ms` of real time.
///
/// Returns the frame-units the sweep ran with. Deferred actions are drained
/// before the sweep, so anything they release is usable this same frame.
pub fn tick(registry: &mut Registry, input: &dyn InputSource, elapsed_ms: f32) -> f32 {
    let (units, ms) = frame_units(elapsed_ms);

    registry.deferred_mut().advance(ms);
    for action in registry.deferred_mut().take_due() {
        registry.run_deferred(action);
    }

    registry.update(input, units);
    units
}

impl Registry {
    /// Timers, one sweep over every category, then the spawn policy
    pub fn update(&mut self, input: &dyn InputSource, units: f32) {
        self.tick_timers(units);
        for category in Category::ALL {
            self.sweep(category, input, units);
        }
        self.apply_spawn_policy();
    }

    /// Apply one deferred action. Targets that are gone, or have moved on
    /// to a newer life, make it a no-op.
    pub fn run_deferred(&mut self, action: DeferredAction) {
        match action {
            DeferredAction::ReleaseBullet { owner } => {
                if let Some(tank) = self
                    .find_tank(owner.id)
                    .and_then(|slot| self.get_mut(slot))
                    .filter(|tank| tank.handle() == owner)
                {
                    tank::release_bullet(tank);
                }
            }
            DeferredAction::Unfreeze { tank } => player::unfreeze(self, tank),
            DeferredAction::RevertFortress => self.revert_fortress(),
        }
    }

    /// Draw every entity back to front. Purely a read of the registry.
    pub fn render(&self, sprites: &dyn SpriteLookup, canvas: &mut dyn Canvas) {
        for category in Category::ALL {
            for entity in self.entities(category) {
                if let Some(sprite) = entity.visual().and_then(|v| sprites.lookup(&v)) {
                    canvas.draw(sprite, entity.rect());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use glam::Vec2;

    use super::*;
    use crate::consts::UPDATE_INTERVAL_MS;
    use crate::platform::{Action, KeyState, LogicalKey};
    use crate::renderer::{DrawList, SpriteHandle, SpriteKind, Visual};
    use crate::sim::bullet::Shooter;
    use crate::sim::effect::{EffectKind, Followup};
    use crate::sim::enemy::EnemyKind;
    use crate::sim::entity::{Direction, Entity, EntityId, Handle};
    use crate::sim::level::Arena;
    use crate::sim::player::{ForceField, PlayerSlot};
    use crate::sim::structure::{Material, TerrainKind};

    const SLOW_FRAME_MS: f32 = 200.0;

    /// Owner that is not in the registry
    const STRAY: Handle = Handle { id: 900, life: 0 };

    fn registry() -> Registry {
        Registry::new(Arena::default(), 2024, false)
    }

    fn player_entity(reg: &Registry, id: EntityId) -> Option<&Entity> {
        reg.find(Category::PlayerTanks, id).and_then(|s| reg.get(s))
    }

    fn bullets_of(reg: &Registry, owner: EntityId) -> Vec<EntityId> {
        reg.entities(Category::Bullets)
            .filter(|b| {
                !b.is_killed()
                    && matches!(&b.body, crate::sim::entity::Body::Bullet(bullet) if bullet.owner.id == owner)
            })
            .map(|b| b.id)
            .collect()
    }

    #[test]
    fn test_deferred_actions_run_before_the_sweep() {
        let mut reg = registry();
        let id = reg.add_live_player(Vec2::new(300.0, 450.0), PlayerSlot::One);
        if let Some(d) = reg.find_tank(id).and_then(|s| reg.get_mut(s)).and_then(tank::drive_mut) {
            d.bullets_alive = 1;
        }
        let owner = player_entity(&reg, id).map(Entity::handle);
        let Some(owner) = owner else {
            panic!("player is in play");
        };
        reg.schedule(0.0, DeferredAction::ReleaseBullet { owner });

        let mut keys = KeyState::default();
        keys.press(LogicalKey::Player(PlayerSlot::One, Action::Fire));
        tick(&mut reg, &keys, UPDATE_INTERVAL_MS);

        // Released first, so the same frame could fire again
        assert_eq!(reg.count(Category::Bullets), 1);
        let alive = reg.find_tank(id).and_then(|s| reg.get(s)).and_then(tank::drive);
        assert_eq!(alive.map(|d| d.bullets_alive), Some(1));
    }

    #[test]
    fn test_release_for_missing_owner_is_a_no_op() {
        let mut reg = registry();
        reg.schedule(0.0, DeferredAction::ReleaseBullet { owner: Handle { id: 4242, life: 0 } });
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        assert!(reg.deferred().is_empty());
    }

    #[test]
    fn test_release_from_an_earlier_life_is_ignored() {
        let mut reg = registry();
        let id = reg.add_live_player(Vec2::new(300.0, 450.0), PlayerSlot::One);
        let Some(old) = player_entity(&reg, id).map(Entity::handle) else {
            panic!("player is in play");
        };
        if let Some(tank) = reg.find_tank(id).and_then(|s| reg.get_mut(s)) {
            tank.kill();
            tank.resurrect();
        }
        if let Some(d) = reg.find_tank(id).and_then(|s| reg.get_mut(s)).and_then(tank::drive_mut) {
            d.bullets_alive = 1;
        }
        reg.schedule(0.0, DeferredAction::ReleaseBullet { owner: old });
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);

        assert!(reg.deferred().is_empty());
        let drive = reg.find_tank(id).and_then(|s| reg.get(s)).and_then(tank::drive);
        assert_eq!(drive.map(|d| d.bullets_alive), Some(1));
    }

    #[test]
    fn test_one_queued_enemy_promoted_through_spawn_flash() {
        let mut reg = registry();
        let arena = reg.arena();
        for column in 0..5 {
            reg.queue_enemy(arena.enemy_spawn(column), EnemyKind::Basic, false);
        }
        reg.reset_spawn_timer();

        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        assert_eq!(reg.enemies_in_play(), 0);
        assert_eq!(reg.queued_enemies(), 5);
        assert_eq!(reg.pending_spawns(), 1);
        let flashes = reg
            .entities(Category::Effects)
            .filter_map(Entity::as_effect)
            .filter(|e| e.kind == EffectKind::SpawnFlash && *e.then() == Followup::PromoteEnemy)
            .count();
        assert_eq!(flashes, 1);

        // The flash runs for 48 units; the spawn interval is far longer
        for _ in 0..5 {
            tick(&mut reg, &KeyState::default(), SLOW_FRAME_MS);
        }
        assert_eq!(reg.enemies_in_play(), 1);
        assert_eq!(reg.queued_enemies(), 4);
        assert_eq!(reg.pending_spawns(), 0);
    }

    #[test]
    fn test_enemies_in_play_never_exceed_four() {
        let mut reg = registry();
        let arena = reg.arena();
        for index in 0..40 {
            reg.queue_enemy(arena.enemy_spawn(index), EnemyKind::ALL[index % 4], false);
        }
        let keys = KeyState::default();
        for _ in 0..400 {
            reg.reset_spawn_timer();
            tick(&mut reg, &keys, SLOW_FRAME_MS);
            assert!(reg.enemies_in_play() <= 4);
            assert!(reg.enemies_in_play() + reg.pending_spawns() <= 4);
        }
        assert_eq!(reg.enemies_in_play(), 4);
        assert_eq!(reg.queued_enemies(), 36);
    }

    #[test]
    fn test_force_field_holds_against_a_volley() {
        let mut reg = registry();
        let center = Vec2::new(300.0, 300.0);
        let id = reg.add_live_player(center, PlayerSlot::One);
        if let Some(slot) = reg.find_tank(id) {
            reg.with_entity(slot, |tank, reg| player::set_force_field(tank, reg, ForceField::Brief));
        }
        for dx in [-14.0, 0.0, 14.0] {
            reg.generate_bullet(
                center + Vec2::new(dx, 0.0),
                Direction::Down,
                6.0,
                2,
                STRAY,
                Shooter::Enemy(EnemyKind::Power),
            );
        }

        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        assert_eq!(reg.count(Category::Bullets), 0);
        let tank = player_entity(&reg, id);
        assert!(tank.is_some_and(|t| !t.is_killed()));
        assert_eq!(
            tank.and_then(Entity::as_player).map(|p| p.lives),
            Some(crate::consts::PLAYER_START_LIVES)
        );
    }

    #[test]
    fn test_brick_hit_twice_from_the_left() {
        let mut reg = registry();
        let arena = reg.arena();
        let center = arena.cell_center(12, 12);
        let brick = reg.generate_brick(center, Material::Brick);
        let from_left = || center - Vec2::new(arena.step / 2.0, 0.0);

        reg.generate_bullet(from_left(), Direction::Right, 6.0, 1, STRAY, Shooter::Player(PlayerSlot::One));
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        let wall = reg.find(Category::Bricks, brick).and_then(|s| reg.get(s));
        assert!(wall.is_some_and(|w| !w.is_killed()));
        assert!(wall
            .and_then(Entity::as_structure)
            .is_some_and(|s| !s.edges.left && s.edges.right));

        reg.generate_bullet(from_left(), Direction::Right, 6.0, 1, STRAY, Shooter::Player(PlayerSlot::One));
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        let wall = reg.find(Category::Bricks, brick).and_then(|s| reg.get(s));
        assert!(wall.is_some_and(Entity::is_killed));

        // Bricks sweep before bullets, so removal lands on the next frame
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        assert_eq!(reg.count(Category::Bricks), 0);
    }

    #[test]
    fn test_player_with_two_lives_dies_and_respawns() {
        let arena = Arena::new(5, 20.0);
        let mut reg = Registry::new(arena, 8, false);
        let spawn = arena.player_spawn(PlayerSlot::One);
        let id = reg.add_live_player(spawn, PlayerSlot::One);
        reg.generate_bullet(spawn, Direction::Down, 6.0, 1, STRAY, Shooter::Enemy(EnemyKind::Basic));

        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        let tank = player_entity(&reg, id);
        assert!(tank.is_some_and(|t| t.is_killed() && !t.collisional));
        assert_eq!(tank.and_then(Entity::as_player).map(|p| p.lives), Some(1));
        let respawn_chain = reg.entities(Category::Effects).filter_map(Entity::as_effect).any(|e| {
            matches!(
                e.then(),
                Followup::Effect { kind: EffectKind::LargeExplosion, then }
                    if matches!(**then, Followup::Respawn { tank, .. } if tank.id == id)
            )
        });
        assert!(respawn_chain);

        let keys = KeyState::default();
        let mut frames = 0;
        while player_entity(&reg, id).is_some_and(Entity::is_killed) {
            assert!(frames < 20, "player never came back");
            let query = crate::sim::rect::Rect::around(spawn, Vec2::splat(2.0));
            assert!(reg
                .all_overlapping(query, None)
                .iter()
                .all(|s| s.category != Category::PlayerTanks));
            tick(&mut reg, &keys, SLOW_FRAME_MS);
            frames += 1;
        }

        let tank = player_entity(&reg, id);
        assert!(tank.is_some_and(|t| t.collisional && t.pos == spawn));
        let p = tank.and_then(Entity::as_player);
        assert_eq!(p.map(|p| (p.lives, p.field)), Some((1, ForceField::Brief)));
    }

    #[test]
    fn test_second_bullet_on_a_dead_enemy_awards_nothing() {
        let mut reg = registry();
        reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Basic);
        for dx in [-10.0, 10.0] {
            reg.generate_bullet(
                Vec2::new(300.0 + dx, 300.0),
                Direction::Up,
                6.0,
                1,
                STRAY,
                Shooter::Player(PlayerSlot::Two),
            );
        }
        tick(&mut reg, &KeyState::default(), UPDATE_INTERVAL_MS);
        assert_eq!(reg.scores().total(PlayerSlot::Two), 100);
        assert_eq!(reg.enemies_in_play(), 0);
        // The second bullet found a wreck and flew on
        assert_eq!(reg.count(Category::Bullets), 1);
        assert!(reg.entities(Category::Bullets).all(|b| !b.is_killed()));
    }

    #[test]
    fn test_bullet_cap_holds_under_held_fire() {
        let mut reg = registry();
        let id = reg.add_live_player(Vec2::new(300.0, 500.0), PlayerSlot::One);
        let mut keys = KeyState::default();
        keys.press(LogicalKey::Player(PlayerSlot::One, Action::Fire));

        let mut fired = HashSet::new();
        for _ in 0..300 {
            tick(&mut reg, &keys, UPDATE_INTERVAL_MS);
            let live = bullets_of(&reg, id);
            assert!(live.len() <= 1);
            fired.extend(live);
        }
        // Released after each bullet died, so the tank kept shooting
        assert!(fired.len() >= 2);

        if let Some(p) = reg
            .find_tank(id)
            .and_then(|s| reg.get_mut(s))
            .and_then(Entity::as_player_mut)
        {
            p.add_star();
            p.add_star();
        }
        let mut peak = 0;
        for _ in 0..300 {
            tick(&mut reg, &keys, UPDATE_INTERVAL_MS);
            let live = bullets_of(&reg, id).len();
            assert!(live <= 2);
            peak = peak.max(live);
        }
        assert_eq!(peak, 2);
    }

    struct EverySprite;

    impl SpriteLookup for EverySprite {
        fn lookup(&self, visual: &Visual) -> Option<SpriteHandle> {
            Some(SpriteHandle(match visual.kind {
                SpriteKind::Terrain(_) => 1,
                SpriteKind::Brick => 2,
                _ => 3,
            }))
        }
    }

    #[test]
    fn test_render_draws_back_to_front() {
        let mut reg = registry();
        reg.generate_terrain(Vec2::new(100.0, 100.0), TerrainKind::Trees);
        reg.generate_brick(Vec2::new(200.0, 100.0), Material::Brick);
        reg.generate_terrain(Vec2::new(300.0, 100.0), TerrainKind::Water);

        let mut canvas = DrawList::default();
        reg.render(&EverySprite, &mut canvas);
        // Borders draw nothing; trees go on top of everything else
        let sprites: Vec<u32> = canvas.commands().iter().map(|c| c.sprite.0).collect();
        assert_eq!(sprites, vec![1, 2, 1]);
        assert_eq!(canvas.commands()[2].dest.center(), Vec2::new(100.0, 100.0));
    }
}
