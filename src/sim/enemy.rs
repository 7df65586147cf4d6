//! Enemy tanks: roaming AI, adaptive fire, armor

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::{Shooter, Shot};
use super::effect::{EffectKind, Followup};
use super::entity::{Direction, Entity};
use super::registry::Registry;
use super::tank::{self, Advance, Drive};
use crate::audio::Sound;
use crate::consts::{
    ENEMY_FIRE_CADENCE, ENEMY_FIRE_CHANCE_AFTER_SHOT, ENEMY_FIRE_CHANCE_MAX, ENEMY_FIRE_CHANCE_STEP,
};
use crate::renderer::{CARRIER_FLASH, SpriteKind, Visual};
use crate::scores::Victim;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Power,
    Armor,
}

/// Fixed per-kind numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub speed: f32,
    pub bullet_speed: f32,
    pub lives: u8,
    pub points: u32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Basic,
        EnemyKind::Fast,
        EnemyKind::Power,
        EnemyKind::Armor,
    ];

    /// Wave table code (0-3)
    pub fn from_code(code: u8) -> Option<EnemyKind> {
        match code {
            0 => Some(EnemyKind::Basic),
            1 => Some(EnemyKind::Fast),
            2 => Some(EnemyKind::Power),
            3 => Some(EnemyKind::Armor),
            _ => None,
        }
    }

    pub fn stats(self) -> EnemyStats {
        let (speed, bullet_speed, lives, points) = match self {
            EnemyKind::Basic => (1.0, 6.0, 1, 100),
            EnemyKind::Fast => (3.0, 9.0, 1, 200),
            EnemyKind::Power => (2.0, 12.0, 1, 300),
            EnemyKind::Armor => (2.0, 9.0, 4, 400),
        };
        EnemyStats {
            speed,
            bullet_speed,
            lives,
            points,
        }
    }

    pub fn points(self) -> u32 {
        self.stats().points
    }
}

/// Carrier highlight flips every this many track frames
const CARRIER_BLINK_MOVES: u32 = 6;

/// Relative odds of each new heading when an enemy has to turn
const TURN_WEIGHTS: [(Direction, u32); 4] = [
    (Direction::Down, 30),
    (Direction::Left, 25),
    (Direction::Right, 25),
    (Direction::Up, 20),
];

#[derive(Debug, Clone)]
pub struct EnemyTank {
    pub kind: EnemyKind,
    pub drive: Drive,
    /// Hits left; armor tanks start with several
    pub lives: u8,
    /// Drops a powerup when destroyed
    pub carrier: bool,
    fire_clock: f32,
    /// Percent chance to shoot on the next eligible tick
    fire_chance: u32,
    blink_counter: u32,
    highlight: bool,
}

impl EnemyTank {
    pub fn new(kind: EnemyKind, carrier: bool) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            drive: Drive::new(Direction::Down, stats.speed),
            lives: stats.lives,
            carrier,
            fire_clock: 0.0,
            fire_chance: ENEMY_FIRE_CHANCE_MAX,
            blink_counter: 0,
            highlight: false,
        }
    }

    pub fn visual(&self) -> Visual {
        let mut substate = self.lives.saturating_sub(1);
        if self.carrier && self.highlight {
            substate |= CARRIER_FLASH;
        }
        let frame = self.drive.orientation.index() * 2 + self.drive.track_frame;
        Visual::new(SpriteKind::EnemyTank(self.kind), substate, frame)
    }

    fn blink(&mut self) {
        self.blink_counter += 1;
        if self.blink_counter % CARRIER_BLINK_MOVES == 0 {
            self.highlight = !self.highlight;
        }
    }
}

/// Pick a new heading by weight, never the current one
pub fn next_direction(current: Direction, rng: &mut impl Rng) -> Direction {
    let options = || TURN_WEIGHTS.iter().filter(move |(d, _)| *d != current);
    let total: u32 = options().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for &(direction, weight) in options() {
        if roll < weight {
            return direction;
        }
        roll -= weight;
    }
    current
}

pub fn update(entity: &mut Entity, registry: &mut Registry, units: f32) -> bool {
    if entity.is_killed() {
        return true;
    }
    let Some(enemy) = entity.as_enemy_mut() else {
        return true;
    };
    let was_moving = enemy.drive.begin_frame();
    let distance = enemy.drive.speed * units;

    if !registry.enemies_frozen() {
        tank::grid_lock(entity, registry.arena().step);
        if tank::advance(entity, registry, distance) == Advance::Turn {
            if let Some(enemy) = entity.as_enemy_mut() {
                enemy.drive.orientation = next_direction(enemy.drive.orientation, registry.rng());
            }
        }
        if let Some(enemy) = entity.as_enemy_mut() {
            enemy.blink();
        }
        maybe_fire(entity, registry, units);
    }

    tank::settle_slide(entity, registry, was_moving, distance, units);
    false
}

/// Every cadence tick with no bullet in flight is a chance to shoot. A miss
/// raises the odds for next time; a shot drops them.
fn maybe_fire(entity: &mut Entity, registry: &mut Registry, units: f32) {
    let Some(enemy) = entity.as_enemy_mut() else {
        return;
    };
    enemy.fire_clock += units;
    let mut shoot = false;
    while enemy.fire_clock >= ENEMY_FIRE_CADENCE {
        enemy.fire_clock -= ENEMY_FIRE_CADENCE;
        if shoot || enemy.drive.bullets_alive > 0 {
            continue;
        }
        if registry.rng().random_range(0..100) < enemy.fire_chance {
            enemy.fire_chance = ENEMY_FIRE_CHANCE_AFTER_SHOT;
            shoot = true;
        } else {
            enemy.fire_chance = (enemy.fire_chance + ENEMY_FIRE_CHANCE_STEP).min(ENEMY_FIRE_CHANCE_MAX);
        }
    }

    if shoot {
        let kind = enemy.kind;
        tank::fire(entity, registry, kind.stats().bullet_speed, 1, Shooter::Enemy(kind));
    }
}

pub fn hit(entity: &mut Entity, shot: &Shot, registry: &mut Registry) -> bool {
    let Shooter::Player(player) = shot.shooter else {
        return false;
    };
    if entity.is_killed() {
        return false;
    }
    let Some(enemy) = entity.as_enemy_mut() else {
        return false;
    };

    if enemy.lives > 1 {
        enemy.lives -= 1;
        registry.request_sound(Sound::ArmorHit);
        return true;
    }

    let kind = enemy.kind;
    let carrier = enemy.carrier;
    enemy.lives = 0;
    registry.award(player, Victim::Enemy(kind));
    if carrier {
        registry.generate_powerup();
    }
    entity.kill();
    registry.request_sound(Sound::DestroyEnemy);
    registry.generate_effect(
        EffectKind::LargeExplosion,
        entity.pos,
        None,
        Followup::Points { value: kind.points() },
    );
    log::debug!("Enemy {} ({:?}) destroyed by player {}", entity.id, kind, player.number());
    true
}

/// Destroyed without a shooter (grenade): no score, no popup
pub fn explode(entity: &mut Entity, registry: &mut Registry) {
    if entity.kill() {
        registry.generate_effect(EffectKind::LargeExplosion, entity.pos, None, Followup::Nothing);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sim::entity::EntityId;
    use crate::sim::level::Arena;
    use crate::sim::player::PlayerSlot;
    use crate::sim::registry::Category;

    fn registry() -> Registry {
        Registry::new(Arena::default(), 21, false)
    }

    fn player_shot(pos: Vec2) -> Shot {
        Shot {
            id: 900,
            owner: 901,
            shooter: Shooter::Player(PlayerSlot::One),
            direction: Direction::Up,
            strength: 1,
            pos,
        }
    }

    fn shoot(reg: &mut Registry, id: EntityId, shot: &Shot) -> Option<bool> {
        let slot = reg.find_tank(id)?;
        reg.with_entity(slot, |tank, reg| hit(tank, shot, reg))
    }

    fn enemy(reg: &Registry, id: EntityId) -> Option<EnemyTank> {
        reg.find_tank(id)
            .and_then(|s| reg.get(s))
            .and_then(Entity::as_enemy)
            .cloned()
    }

    #[test]
    fn test_kind_codes_and_stats() {
        assert_eq!(EnemyKind::from_code(0), Some(EnemyKind::Basic));
        assert_eq!(EnemyKind::from_code(1), Some(EnemyKind::Fast));
        assert_eq!(EnemyKind::from_code(2), Some(EnemyKind::Power));
        assert_eq!(EnemyKind::from_code(3), Some(EnemyKind::Armor));
        assert_eq!(EnemyKind::from_code(4), None);
        assert_eq!(EnemyKind::Fast.stats().speed, 3.0);
        assert_eq!(EnemyKind::Armor.stats().lives, 4);
        assert_eq!(EnemyKind::Power.points(), 300);
    }

    #[test]
    fn test_next_direction_never_repeats_and_covers_others() {
        let mut rng = Pcg32::seed_from_u64(99);
        for current in Direction::ALL {
            let mut seen = [false; 4];
            for _ in 0..200 {
                let next = next_direction(current, &mut rng);
                assert_ne!(next, current);
                seen[next.index() as usize] = true;
            }
            assert_eq!(seen.iter().filter(|s| **s).count(), 3);
        }
    }

    #[test]
    fn test_down_is_the_favourite_turn() {
        let mut rng = Pcg32::seed_from_u64(5);
        let downs = (0..4000)
            .filter(|_| next_direction(Direction::Up, &mut rng) == Direction::Down)
            .count();
        // 30 of 80
        assert!((1300..1700).contains(&downs), "downs = {downs}");
    }

    #[test]
    fn test_armor_absorbs_three_hits_then_dies_once() {
        let mut reg = registry();
        let id = reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Armor);
        let shot = player_shot(Vec2::new(300.0, 300.0));

        for left in [3, 2, 1] {
            assert_eq!(shoot(&mut reg, id, &shot), Some(true));
            assert_eq!(enemy(&reg, id).map(|e| e.lives), Some(left));
            assert_eq!(reg.scores().total(PlayerSlot::One), 0);
        }
        assert!(reg.drain_sounds().contains(&Sound::ArmorHit));

        assert_eq!(shoot(&mut reg, id, &shot), Some(true));
        assert_eq!(reg.scores().total(PlayerSlot::One), 400);
        assert!(reg.find_tank(id).and_then(|s| reg.get(s)).is_some_and(Entity::is_killed));

        // A second kill attempt is refused and awards nothing
        assert_eq!(shoot(&mut reg, id, &shot), Some(false));
        assert_eq!(reg.scores().total(PlayerSlot::One), 400);
        assert_eq!(reg.count(Category::Effects), 1);
    }

    #[test]
    fn test_enemy_bullets_pass_through_enemies() {
        let mut reg = registry();
        let id = reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Basic);
        let mut shot = player_shot(Vec2::new(300.0, 300.0));
        shot.shooter = Shooter::Enemy(EnemyKind::Fast);
        assert_eq!(shoot(&mut reg, id, &shot), Some(false));
        assert!(enemy(&reg, id).is_some());
        assert!(!reg.find_tank(id).and_then(|s| reg.get(s)).is_some_and(Entity::is_killed));
    }

    #[test]
    fn test_carrier_drops_powerup() {
        let mut reg = registry();
        let id = reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Basic);
        if let Some(e) = reg.find_tank(id).and_then(|s| reg.get_mut(s)).and_then(Entity::as_enemy_mut) {
            e.carrier = true;
        }
        shoot(&mut reg, id, &player_shot(Vec2::new(300.0, 300.0)));
        assert_eq!(reg.count(Category::Powerups), 1);
    }

    #[test]
    fn test_explode_awards_nothing() {
        let mut reg = registry();
        reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Fast);
        reg.add_live_enemy(Vec2::new(100.0, 300.0), EnemyKind::Power);
        reg.explode_enemies_in_play();
        assert!(reg.entities(Category::EnemyTanks).all(Entity::is_killed));
        assert_eq!(reg.scores().total(PlayerSlot::One), 0);
        assert_eq!(reg.count(Category::Effects), 2);
        assert!(reg.drain_sounds().contains(&Sound::DestroyEnemy));
    }

    #[test]
    fn test_frozen_enemies_hold_still_and_hold_fire() {
        let mut reg = registry();
        let id = reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Fast);
        reg.freeze_enemies();
        if let Some(slot) = reg.find_tank(id) {
            for _ in 0..100 {
                reg.with_entity(slot, |tank, reg| update(tank, reg, 1.0));
            }
        }
        assert_eq!(reg.position_of(id), Some(Vec2::new(300.0, 300.0)));
        assert_eq!(reg.count(Category::Bullets), 0);
    }

    #[test]
    fn test_fires_on_cadence_one_bullet_at_a_time() {
        let mut reg = registry();
        let id = reg.add_live_enemy(Vec2::new(300.0, 300.0), EnemyKind::Basic);
        let Some(slot) = reg.find_tank(id) else {
            panic!("enemy exists");
        };
        reg.with_entity(slot, |tank, _| {
            if let Some(e) = tank.as_enemy_mut() {
                e.fire_chance = 100;
            }
        });

        for _ in 0..29 {
            reg.with_entity(slot, |tank, reg| maybe_fire(tank, reg, 1.0));
        }
        assert_eq!(reg.count(Category::Bullets), 0);
        reg.with_entity(slot, |tank, reg| maybe_fire(tank, reg, 1.0));
        assert_eq!(reg.count(Category::Bullets), 1);
        assert_eq!(enemy(&reg, id).map(|e| e.fire_chance), Some(ENEMY_FIRE_CHANCE_AFTER_SHOT));

        for _ in 0..90 {
            reg.with_entity(slot, |tank, reg| maybe_fire(tank, reg, 1.0));
        }
        assert_eq!(reg.count(Category::Bullets), 1);
    }

    #[test]
    fn test_blocked_enemy_turns() {
        let mut reg = registry();
        let half = reg.arena().tank_half();
        let id = reg.add_live_enemy(Vec2::new(300.0, reg.arena().size() - half), EnemyKind::Basic);
        if let Some(slot) = reg.find_tank(id) {
            reg.with_entity(slot, |tank, reg| update(tank, reg, 1.0));
        }
        let e = enemy(&reg, id);
        assert!(e.is_some_and(|e| e.drive.orientation != Direction::Down && e.drive.moving));
    }

    #[test]
    fn test_armor_visual_tier() {
        let tank = EnemyTank::new(EnemyKind::Armor, false);
        let v = tank.visual();
        assert_eq!(v.kind, SpriteKind::EnemyTank(EnemyKind::Armor));
        assert_eq!(v.substate, 3);
        assert_eq!(v.frame, Direction::Down.index() * 2);
    }
}
