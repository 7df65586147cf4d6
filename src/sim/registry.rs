//! Entity registry
//!
//! Owns one ordered list per category plus the queued-enemy pool, and the
//! shared services entities reach through explicit context: factories,
//! timers, RNG, deferred actions, scores and sound requests.
//!
//! Each list holds `Option<Entity>` so an entity can be lifted out of its
//! slot while it updates (or while it reacts to a hit) and put back
//! afterwards. Indices stay stable for the whole sweep of a category;
//! removed entities are compacted once that category's loop is done.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bullet::{Bullet, Shooter};
use super::deferred::{DeferredAction, DeferredQueue};
use super::effect::{Effect, EffectKind, Followup};
use super::enemy::{self, EnemyKind, EnemyTank};
use super::entity::{Body, Direction, Entity, EntityId, Handle};
use super::level::Arena;
use super::player::{self, PlayerSlot, PlayerTank};
use super::powerup::{Powerup, PowerupKind};
use super::structure::{Material, Side, Structure, Terrain, TerrainKind};
use crate::audio::{Sound, SoundQueue};
use crate::consts::{
    BORDER_THICKNESS, BULLET_HALF, ENEMY_FREEZE_MS, ENEMY_SPAWN_INTERVAL_MS, MAX_ENEMIES_IN_PLAY,
    STEEL_FORTRESS_MS,
};
use crate::ms_to_units;
use crate::scores::{ScoreBoard, Victim};

/// Entity categories in collision-precedence and render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Terrain,
    Bricks,
    Statue,
    Bullets,
    PlayerTanks,
    EnemyTanks,
    Effects,
    Trees,
    Powerups,
    Borders,
    Points,
}

impl Category {
    pub const COUNT: usize = 11;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Terrain,
        Category::Bricks,
        Category::Statue,
        Category::Bullets,
        Category::PlayerTanks,
        Category::EnemyTanks,
        Category::Effects,
        Category::Trees,
        Category::Powerups,
        Category::Borders,
        Category::Points,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Position of an entity inside its category list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub category: Category,
    pub index: usize,
}

/// The simulation context shared by every entity operation
pub struct Registry {
    arena: Arena,
    next_id: EntityId,
    categories: [Vec<Option<Entity>>; Category::COUNT],
    /// Enemies waiting to enter play, front first
    queued: VecDeque<Entity>,
    /// Spawn flashes in flight that will promote a queued enemy
    pending_spawns: usize,
    /// Frame-units until the next spawn may start
    spawn_timer: f32,
    /// Frame-units enemies stay frozen
    freeze_timer: f32,
    rng: Pcg32,
    deferred: DeferredQueue,
    scores: ScoreBoard,
    sounds: SoundQueue,
    friendly_fire: bool,
    flag_destroyed: bool,
    /// Ice cells, row-major
    ice: Vec<bool>,
}

impl Registry {
    /// Empty arena guarded by its four border slabs
    pub fn new(arena: Arena, seed: u64, friendly_fire: bool) -> Self {
        let cells = arena.cells as usize;
        let mut registry = Self {
            arena,
            next_id: 1,
            categories: std::array::from_fn(|_| Vec::new()),
            queued: VecDeque::new(),
            pending_spawns: 0,
            spawn_timer: 0.0,
            freeze_timer: 0.0,
            rng: Pcg32::seed_from_u64(seed),
            deferred: DeferredQueue::new(),
            scores: ScoreBoard::default(),
            sounds: SoundQueue::default(),
            friendly_fire,
            flag_destroyed: false,
            ice: vec![false; cells * cells],
        };
        for side in Side::ALL {
            registry.generate_border(side);
        }
        registry
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(super) fn push(&mut self, category: Category, entity: Entity) -> EntityId {
        let id = entity.id;
        self.categories[category.index()].push(Some(entity));
        id
    }

    // === Lookup ===

    pub fn get(&self, slot: Slot) -> Option<&Entity> {
        self.categories[slot.category.index()]
            .get(slot.index)
            .and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut Entity> {
        self.categories[slot.category.index()]
            .get_mut(slot.index)
            .and_then(Option::as_mut)
    }

    /// Lift the entity at `slot` out of its list, run `f` with both the
    /// entity and the registry, then put it back.
    ///
    /// Returns `None` when the slot is empty (the entity is itself mid-update
    /// or was never there). Nothing inside `f` may compact category lists.
    pub fn with_entity<R>(
        &mut self,
        slot: Slot,
        f: impl FnOnce(&mut Entity, &mut Registry) -> R,
    ) -> Option<R> {
        let mut entity = self.categories[slot.category.index()]
            .get_mut(slot.index)?
            .take()?;
        let result = f(&mut entity, self);
        if let Some(cell) = self.categories[slot.category.index()].get_mut(slot.index) {
            *cell = Some(entity);
        }
        Some(result)
    }

    /// Every live slot of a category in list order
    pub fn slots(&self, category: Category) -> impl Iterator<Item = (Slot, &Entity)> + '_ {
        self.categories[category.index()]
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| {
                cell.as_ref().map(|entity| (Slot { category, index }, entity))
            })
    }

    pub fn entities(&self, category: Category) -> impl Iterator<Item = &Entity> + '_ {
        self.categories[category.index()].iter().flatten()
    }

    pub fn count(&self, category: Category) -> usize {
        self.categories[category.index()].iter().flatten().count()
    }

    pub fn find(&self, category: Category, id: EntityId) -> Option<Slot> {
        self.slots(category)
            .find(|(_, entity)| entity.id == id)
            .map(|(slot, _)| slot)
    }

    /// Slot of a tank (player or enemy in play)
    pub fn find_tank(&self, id: EntityId) -> Option<Slot> {
        self.find(Category::PlayerTanks, id)
            .or_else(|| self.find(Category::EnemyTanks, id))
    }

    /// Current position of a tank, used by effects that follow one
    pub fn position_of(&self, id: EntityId) -> Option<Vec2> {
        self.find_tank(id).and_then(|slot| self.get(slot)).map(|e| e.pos)
    }

    pub fn border(&self, side: Side) -> Option<Slot> {
        self.get(Slot {
            category: Category::Borders,
            index: side.index(),
        })
        .map(|_| Slot {
            category: Category::Borders,
            index: side.index(),
        })
    }

    pub fn player(&self, slot: PlayerSlot) -> Option<&Entity> {
        self.entities(Category::PlayerTanks)
            .find(|e| e.as_player().is_some_and(|p| p.slot == slot))
    }

    pub fn players_remaining(&self) -> usize {
        self.count(Category::PlayerTanks)
    }

    pub fn enemies_in_play(&self) -> usize {
        self.count(Category::EnemyTanks)
    }

    pub fn queued_enemies(&self) -> usize {
        self.queued.len()
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending_spawns
    }

    /// Anything left to fight this level
    pub fn has_enemies(&self) -> bool {
        !self.queued.is_empty() || self.enemies_in_play() > 0
    }

    // === Shared services ===

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn friendly_fire(&self) -> bool {
        self.friendly_fire
    }

    pub fn flag_destroyed(&self) -> bool {
        self.flag_destroyed
    }

    pub(super) fn mark_flag_destroyed(&mut self) {
        self.flag_destroyed = true;
    }

    pub fn enemies_frozen(&self) -> bool {
        self.freeze_timer > 0.0
    }

    pub fn freeze_enemies(&mut self) {
        self.freeze_timer = ms_to_units(ENEMY_FREEZE_MS);
    }

    pub fn request_sound(&mut self, sound: Sound) {
        self.sounds.request(sound);
    }

    /// Take every sound requested since the last drain
    pub fn drain_sounds(&mut self) -> Vec<Sound> {
        self.sounds.drain()
    }

    pub fn award(&mut self, player: PlayerSlot, victim: Victim) {
        self.scores.award(player, victim);
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn scores_mut(&mut self) -> &mut ScoreBoard {
        &mut self.scores
    }

    pub fn schedule(&mut self, delay_ms: f32, action: DeferredAction) {
        self.deferred.schedule(delay_ms, action);
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.deferred
    }

    pub(super) fn deferred_mut(&mut self) -> &mut DeferredQueue {
        &mut self.deferred
    }

    pub fn mark_ice(&mut self, col: u32, row: u32) {
        let cells = self.arena.cells;
        if col < cells && row < cells {
            self.ice[(row * cells + col) as usize] = true;
        }
    }

    pub fn is_on_ice(&self, pos: Vec2) -> bool {
        self.arena
            .cell_at(pos)
            .is_some_and(|(col, row)| self.ice[(row * self.arena.cells + col) as usize])
    }

    // === Factories ===

    fn generate_border(&mut self, side: Side) {
        let size = self.arena.size();
        let (pos, half) = match side {
            Side::Top => (
                Vec2::new(size / 2.0, -BORDER_THICKNESS),
                Vec2::new(size / 2.0, BORDER_THICKNESS),
            ),
            Side::Bottom => (
                Vec2::new(size / 2.0, size + BORDER_THICKNESS),
                Vec2::new(size / 2.0, BORDER_THICKNESS),
            ),
            Side::Left => (
                Vec2::new(-BORDER_THICKNESS, size / 2.0),
                Vec2::new(BORDER_THICKNESS, size / 2.0),
            ),
            Side::Right => (
                Vec2::new(size + BORDER_THICKNESS, size / 2.0),
                Vec2::new(BORDER_THICKNESS, size / 2.0),
            ),
        };
        let id = self.allocate_id();
        self.push(Category::Borders, Entity::new(id, pos, half, Body::Border(side)));
    }

    pub fn generate_brick(&mut self, pos: Vec2, material: Material) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.step / 2.0);
        let body = Body::Structure(Structure::new(material));
        self.push(Category::Bricks, Entity::new(id, pos, half, body))
    }

    /// Trees go to their own category so they draw over tanks
    pub fn generate_terrain(&mut self, pos: Vec2, kind: TerrainKind) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.step / 2.0);
        let category = if kind == TerrainKind::Trees {
            Category::Trees
        } else {
            Category::Terrain
        };
        self.push(category, Entity::new(id, pos, half, Body::Terrain(Terrain::new(kind))))
    }

    pub fn generate_statue(&mut self) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.step);
        let pos = self.arena.statue_position();
        self.push(Category::Statue, Entity::new(id, pos, half, Body::Statue))
    }

    pub fn generate_bullet(
        &mut self,
        pos: Vec2,
        direction: Direction,
        speed: f32,
        strength: u8,
        owner: Handle,
        shooter: Shooter,
    ) -> EntityId {
        let id = self.allocate_id();
        let body = Body::Bullet(Bullet::new(owner, shooter, direction, speed, strength));
        self.push(
            Category::Bullets,
            Entity::new(id, pos, Vec2::splat(BULLET_HALF), body),
        )
    }

    /// Add a player tank; it enters through the spawn flash
    pub fn generate_player(&mut self, slot: PlayerSlot) -> EntityId {
        let id = self.allocate_id();
        let spawn = self.arena.player_spawn(slot);
        let half = Vec2::splat(self.arena.tank_half());
        let entity = Entity::new(id, spawn, half, Body::Player(PlayerTank::new(slot, spawn)));
        self.push(Category::PlayerTanks, entity);
        if let Some(at) = self.find(Category::PlayerTanks, id) {
            self.with_entity(at, |tank, reg| player::begin_respawn(tank, reg, false));
        }
        log::debug!("Player {} tank {} generated", slot.number(), id);
        id
    }

    /// Append an enemy to the waiting pool
    pub fn queue_enemy(&mut self, pos: Vec2, kind: EnemyKind, carrier: bool) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.tank_half());
        let entity = Entity::new(id, pos, half, Body::Enemy(EnemyTank::new(kind, carrier)));
        self.queued.push_back(entity);
        id
    }

    /// Drop a random powerup somewhere inside the arena margin
    pub fn generate_powerup(&mut self) -> EntityId {
        let step = self.arena.step;
        let size = self.arena.size();
        let kind = PowerupKind::ALL[self.rng.random_range(0..PowerupKind::ALL.len())];
        let x = self.random_coord(step * 2.0, size - step * 2.0);
        let y = self.random_coord(step * 2.0, size - step * 4.0);
        let id = self.allocate_id();
        let entity = Entity::new(
            id,
            Vec2::new(x, y),
            Vec2::splat(step),
            Body::Powerup(Powerup::new(kind)),
        );
        self.push(Category::Powerups, entity);
        self.request_sound(Sound::PowerupSpawn);
        log::debug!("Powerup {:?} spawned at ({:.0}, {:.0})", kind, x, y);
        id
    }

    fn random_coord(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.random_range(lo..hi).floor()
        } else {
            lo
        }
    }

    /// Spawn an effect at `pos`. A large explosion always plays as a small
    /// explosion chained into the large one; `then` runs after both.
    pub fn generate_effect(
        &mut self,
        kind: EffectKind,
        pos: Vec2,
        follow: Option<EntityId>,
        then: Followup,
    ) -> EntityId {
        match kind {
            EffectKind::LargeExplosion => self.spawn_effect(
                EffectKind::SmallExplosion,
                pos,
                follow,
                Followup::Effect {
                    kind: EffectKind::LargeExplosion,
                    then: Box::new(then),
                },
            ),
            _ => self.spawn_effect(kind, pos, follow, then),
        }
    }

    /// Spawn exactly the effect asked for, with no chaining
    pub(super) fn spawn_effect(
        &mut self,
        kind: EffectKind,
        pos: Vec2,
        follow: Option<EntityId>,
        then: Followup,
    ) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.step);
        let category = match kind {
            EffectKind::Points { .. } => Category::Points,
            _ => Category::Effects,
        };
        let entity = Entity::new(id, pos, half, Body::Effect(Effect::new(kind, follow, then)));
        self.push(category, entity)
    }

    pub fn generate_points(&mut self, pos: Vec2, value: u32) -> EntityId {
        self.spawn_effect(EffectKind::Points { value }, pos, None, Followup::Nothing)
    }

    // === Enemy flow ===

    /// Start a spawn flash for the next queued enemy when allowed
    pub(super) fn apply_spawn_policy(&mut self) {
        if self.spawn_timer < 0.0
            && self.enemies_in_play() + self.pending_spawns < MAX_ENEMIES_IN_PLAY
            && self.queued.len() > self.pending_spawns
        {
            if let Some(next) = self.queued.get(self.pending_spawns) {
                let pos = next.pos;
                self.pending_spawns += 1;
                self.generate_effect(EffectKind::SpawnFlash, pos, None, Followup::PromoteEnemy);
            }
            self.spawn_timer = ms_to_units(ENEMY_SPAWN_INTERVAL_MS);
        }
    }

    /// Move the front queued enemy into play (spawn flash finished)
    pub(super) fn promote_enemy(&mut self) {
        self.pending_spawns = self.pending_spawns.saturating_sub(1);
        if self.enemies_in_play() >= MAX_ENEMIES_IN_PLAY {
            return;
        }
        if let Some(tank) = self.queued.pop_front() {
            log::debug!("Enemy {} ({:?}) enters play", tank.id, tank.as_enemy().map(|e| e.kind));
            self.push(Category::EnemyTanks, tank);
        }
    }

    /// Make the next spawn check fire on the following update
    pub fn reset_spawn_timer(&mut self) {
        self.spawn_timer = 0.0;
    }

    pub(super) fn tick_timers(&mut self, units: f32) {
        self.spawn_timer -= units;
        self.freeze_timer = (self.freeze_timer - units).max(0.0);
    }

    /// Grenade: every enemy in play goes up at once, no per-kill score
    pub(super) fn explode_enemies_in_play(&mut self) {
        self.request_sound(Sound::DestroyEnemy);
        let slots: Vec<Slot> = self.slots(Category::EnemyTanks).map(|(slot, _)| slot).collect();
        for slot in slots {
            self.with_entity(slot, |tank, reg| enemy::explode(tank, reg));
        }
    }

    // === Fortress ===

    fn fortress_slots(&self) -> Vec<Slot> {
        let area = self.arena.fortress_rect();
        self.slots(Category::Bricks)
            .filter(|(_, brick)| area.contains(brick.pos))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Snapshot of the standing fortress bricks
    pub fn save_fortress(&self) -> Vec<Entity> {
        let area = self.arena.fortress_rect();
        self.entities(Category::Bricks)
            .filter(|brick| !brick.is_killed() && area.contains(brick.pos))
            .cloned()
            .collect()
    }

    /// Replace whatever stands in the fortress area with `saved`.
    /// Restored bricks get fresh ids; handles into the old ones stay stale.
    pub fn restore_fortress(&mut self, saved: Vec<Entity>) {
        let area = self.arena.fortress_rect();
        self.categories[Category::Bricks.index()]
            .retain(|cell| cell.as_ref().is_some_and(|brick| !area.contains(brick.pos)));
        log::debug!("Fortress restored ({} bricks)", saved.len());
        for mut brick in saved {
            brick.id = self.allocate_id();
            self.push(Category::Bricks, brick);
        }
    }

    pub fn remove_fortress(&mut self) {
        for slot in self.fortress_slots() {
            if let Some(brick) = self.get_mut(slot) {
                brick.kill();
            }
        }
    }

    /// Shovel: temporary steel walls around the statue
    pub(super) fn build_steel_fortress(&mut self) {
        self.remove_fortress();
        for (col, row) in self.arena.fortress_cells() {
            let pos = self.arena.cell_center(col, row);
            self.generate_brick(pos, Material::Steel);
        }
        self.schedule(STEEL_FORTRESS_MS, DeferredAction::RevertFortress);
        log::debug!("Steel fortress raised");
    }

    pub(super) fn revert_fortress(&mut self) {
        for slot in self.fortress_slots() {
            if let Some(structure) = self.get_mut(slot).and_then(Entity::as_structure_mut) {
                structure.transform_to_brick();
            }
        }
        log::debug!("Steel fortress reverted to brick");
    }

    // === Level lifecycle ===

    /// Drop everything level-specific; borders and player tanks stay
    pub fn clear_level(&mut self) {
        for category in Category::ALL {
            if !matches!(category, Category::Borders | Category::PlayerTanks) {
                self.categories[category.index()].clear();
            }
        }
        self.queued.clear();
        self.pending_spawns = 0;
        self.spawn_timer = 0.0;
        self.freeze_timer = 0.0;
        self.flag_destroyed = false;
        self.ice.fill(false);
    }

    /// Send every remaining player back to its spawn through a fresh flash
    pub fn restart_players(&mut self) {
        let slots: Vec<Slot> = self.slots(Category::PlayerTanks).map(|(slot, _)| slot).collect();
        for slot in slots {
            self.with_entity(slot, |tank, reg| player::restart(tank, reg));
        }
    }

    /// Run one update over `category`, then compact removed entities
    pub(super) fn sweep(
        &mut self,
        category: Category,
        input: &dyn crate::platform::InputSource,
        units: f32,
    ) {
        let list = category.index();
        let mut doomed: Vec<usize> = Vec::new();
        // Entities pushed during the loop wait for the next frame
        let len = self.categories[list].len();
        for index in 0..len {
            if let Some(mut entity) = self.categories[list][index].take() {
                let remove = entity.update(self, input, units);
                self.categories[list][index] = Some(entity);
                if remove {
                    doomed.push(index);
                }
            }
        }

        if !doomed.is_empty() {
            let mut position = 0;
            self.categories[list].retain(|_| {
                let keep = doomed.binary_search(&position).is_err();
                position += 1;
                keep
            });
        }
    }
}

#[cfg(test)]
impl Registry {
    /// Place a player tank straight into play, skipping the spawn flash
    pub(crate) fn add_live_player(&mut self, pos: Vec2, slot: PlayerSlot) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.tank_half());
        let body = Body::Player(PlayerTank::new(slot, pos));
        self.push(Category::PlayerTanks, Entity::new(id, pos, half, body))
    }

    /// Place an enemy tank straight into play, bypassing the queue
    pub(crate) fn add_live_enemy(&mut self, pos: Vec2, kind: EnemyKind) -> EntityId {
        let id = self.allocate_id();
        let half = Vec2::splat(self.arena.tank_half());
        let body = Body::Enemy(EnemyTank::new(kind, false));
        self.push(Category::EnemyTanks, Entity::new(id, pos, half, body))
    }
}
