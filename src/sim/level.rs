//! Arena geometry, static level grids and enemy waves

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use super::player::PlayerSlot;
use super::rect::Rect;
use super::registry::Registry;
use super::structure::{Material, Side, TerrainKind};
use crate::consts::{GRID_SIZE, GRID_STEP, POWERUP_CARRIER_SLOTS, STAGE_COUNT, WAVE_LENGTH};

/// Tank collision half-extent as a fraction of one grid step
const TANK_SCALE: f32 = 0.87;

/// Square playfield of `cells` x `cells` grid cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub cells: u32,
    pub step: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            cells: GRID_SIZE,
            step: GRID_STEP,
        }
    }
}

impl Arena {
    pub fn new(cells: u32, step: f32) -> Self {
        Self { cells, step }
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.cells as f32 * self.step
    }

    /// Centre of a grid cell
    #[inline]
    pub fn cell_center(&self, col: u32, row: u32) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * self.step,
            (row as f32 + 0.5) * self.step,
        )
    }

    /// Grid cell containing `pos`, if inside the arena
    pub fn cell_at(&self, pos: Vec2) -> Option<(u32, u32)> {
        if pos.x < 0.0 || pos.y < 0.0 {
            return None;
        }
        let col = (pos.x / self.step).floor() as u32;
        let row = (pos.y / self.step).floor() as u32;
        (col < self.cells && row < self.cells).then_some((col, row))
    }

    pub fn tank_half(&self) -> f32 {
        self.step * TANK_SCALE
    }

    /// Edge a rectangle crosses, checked left, right, top, bottom
    pub fn outside_edge(&self, rect: &Rect) -> Option<Side> {
        let size = self.size();
        if rect.left < 0.0 {
            Some(Side::Left)
        } else if rect.right > size {
            Some(Side::Right)
        } else if rect.top < 0.0 {
            Some(Side::Top)
        } else if rect.bottom > size {
            Some(Side::Bottom)
        } else {
            None
        }
    }

    /// Statue sits on the bottom row, straddling the centre line
    pub fn statue_position(&self) -> Vec2 {
        Vec2::new(
            (self.cells / 2) as f32 * self.step,
            self.cells.saturating_sub(1) as f32 * self.step,
        )
    }

    pub fn player_spawn(&self, slot: PlayerSlot) -> Vec2 {
        let center = (self.cells / 2) as f32;
        let col = match slot {
            PlayerSlot::One => center - 4.0,
            PlayerSlot::Two => center + 4.0,
        };
        let x = (col * self.step).clamp(self.step, self.size() - self.step);
        Vec2::new(x, self.cells.saturating_sub(1) as f32 * self.step)
    }

    /// Enemy entry points along the top edge: left, middle, right
    pub fn enemy_spawn(&self, column: usize) -> Vec2 {
        let x = match column % 3 {
            0 => self.step,
            1 => self.size() / 2.0,
            _ => self.size() - self.step,
        };
        Vec2::new(x, self.step)
    }

    /// Area whose brick centres belong to the fortress
    pub fn fortress_rect(&self) -> Rect {
        let center = self.cells / 2;
        let left = center.saturating_sub(2) as f32 * self.step;
        let right = (center + 2).min(self.cells) as f32 * self.step;
        let top = self.cells.saturating_sub(3) as f32 * self.step;
        Rect::new(left, top, right, self.size())
    }

    /// Wall cells around the statue: a full top row, then both sides
    pub fn fortress_cells(&self) -> Vec<(u32, u32)> {
        let center = self.cells / 2;
        let left = center.saturating_sub(2);
        let right = (center + 1).min(self.cells.saturating_sub(1));
        let top = self.cells.saturating_sub(3);

        let mut cells: Vec<(u32, u32)> = (left..=right).map(|col| (col, top)).collect();
        for row in top + 1..self.cells {
            cells.push((left, row));
            cells.push((right, row));
        }
        cells
    }
}

/// Errors from loading level or wave data
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::ParseError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::IoError(e) => Some(e),
            LevelError::ParseError(e) => Some(e),
            LevelError::ValidationError(_) => None,
        }
    }
}

/// What occupies one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Brick,
    Steel,
    Water,
    Trees,
    Ice,
    Empty,
}

impl Cell {
    /// Level code: 0 brick, 1 steel, 2 water, 3 trees, 4 ice, anything else empty
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Cell::Brick,
            1 => Cell::Steel,
            2 => Cell::Water,
            3 => Cell::Trees,
            4 => Cell::Ice,
            _ => Cell::Empty,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Cell::Brick => 0,
            Cell::Steel => 1,
            Cell::Water => 2,
            Cell::Trees => 3,
            Cell::Ice => 4,
            Cell::Empty => 5,
        }
    }
}

/// Square grid of level cells, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGrid {
    rows: Vec<Vec<u8>>,
}

impl LevelGrid {
    /// Grid of `cells` x `cells` empty cells
    pub fn empty(cells: u32) -> Self {
        let n = cells as usize;
        Self {
            rows: vec![vec![Cell::Empty.code(); n]; n],
        }
    }

    /// Build from raw codes, checking the grid is `cells` square
    pub fn from_codes(rows: Vec<Vec<u8>>, cells: u32) -> Result<Self, LevelError> {
        let n = cells as usize;
        if rows.len() != n {
            return Err(LevelError::ValidationError(format!(
                "expected {} rows, found {}",
                n,
                rows.len()
            )));
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != n)
            .map(|(i, r)| (i, r.len()))
        {
            return Err(LevelError::ValidationError(format!(
                "row {} has {} cells, expected {}",
                row, found, n
            )));
        }

        let unknown = rows.iter().flatten().filter(|&&code| code > 5).count();
        if unknown > 0 {
            log::warn!("{} cells with unknown codes treated as empty", unknown);
        }
        Ok(Self { rows })
    }

    /// Parse the text form: one line per row, one digit per cell, `.` for
    /// empty. Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str, cells: u32) -> Result<Self, LevelError> {
        let mut rows = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .chars()
                .enumerate()
                .map(|(col, ch)| match ch {
                    '.' => Ok(Cell::Empty.code()),
                    _ => ch.to_digit(10).map(|d| d as u8).ok_or_else(|| {
                        LevelError::ValidationError(format!(
                            "line {} column {}: unexpected {:?}",
                            line_no + 1,
                            col + 1,
                            ch
                        ))
                    }),
                })
                .collect::<Result<Vec<u8>, LevelError>>()?;
            rows.push(row);
        }
        Self::from_codes(rows, cells)
    }

    /// Load a level file: `.json` holds `{"rows": [[..], ..]}`, anything
    /// else uses the text form
    pub fn load(path: &Path, cells: u32) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        let grid = if path.extension().is_some_and(|ext| ext == "json") {
            let raw: LevelGrid = serde_json::from_str(&text)?;
            Self::from_codes(raw.rows, cells)?
        } else {
            Self::parse(&text, cells)?
        };
        log::info!("Loaded level {}", path.display());
        Ok(grid)
    }

    /// Built-in stage: brick pillars, a steel core, water and trees on the
    /// flanks, an ice strip and the brick fortress
    pub fn demo(arena: &Arena) -> Self {
        let cells = arena.cells;
        let mut grid = Self::empty(cells);
        let mid = cells / 2;
        let pillar_end = cells.saturating_sub(6);

        for row in 3..pillar_end {
            for col in 0..cells {
                let in_pillar = matches!(col % 4, 2 | 3) && row % 7 != 6;
                let core = (mid.saturating_sub(1)..=mid).contains(&col)
                    && (mid.saturating_sub(1)..=mid).contains(&row);
                if core {
                    grid.set(col, row, Cell::Steel);
                } else if in_pillar {
                    grid.set(col, row, Cell::Brick);
                }
            }
        }

        for row in mid.saturating_sub(1)..=mid {
            for col in [0, 1, cells.saturating_sub(2), cells.saturating_sub(1)] {
                grid.set(col, row, Cell::Water);
            }
        }
        for row in 3..6.min(cells) {
            for col in [0, 1, cells.saturating_sub(2), cells.saturating_sub(1)] {
                grid.set(col, row, Cell::Trees);
            }
        }
        if pillar_end < cells {
            for col in 2..cells.saturating_sub(2) {
                grid.set(col, pillar_end, Cell::Ice);
            }
        }

        for (col, row) in arena.fortress_cells() {
            grid.set(col, row, Cell::Brick);
        }
        grid
    }

    pub fn cells(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn cell(&self, col: u32, row: u32) -> Cell {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .map_or(Cell::Empty, |&code| Cell::from_code(code))
    }

    fn set(&mut self, col: u32, row: u32, cell: Cell) {
        if let Some(code) = self
            .rows
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            *code = cell.code();
        }
    }

    /// Generate terrain and walls for every cell
    pub fn populate(&self, registry: &mut Registry) {
        let arena = registry.arena();
        for row in 0..self.cells() {
            for col in 0..self.cells() {
                let pos = arena.cell_center(col, row);
                match self.cell(col, row) {
                    Cell::Brick => {
                        registry.generate_brick(pos, Material::Brick);
                    }
                    Cell::Steel => {
                        registry.generate_brick(pos, Material::Steel);
                    }
                    Cell::Water => {
                        registry.generate_terrain(pos, TerrainKind::Water);
                    }
                    Cell::Trees => {
                        registry.generate_terrain(pos, TerrainKind::Trees);
                    }
                    Cell::Ice => {
                        registry.generate_terrain(pos, TerrainKind::Ice);
                        registry.mark_ice(col, row);
                    }
                    Cell::Empty => {}
                }
            }
        }
    }
}

/// Enemy kind codes per stage: 0 basic, 1 fast, 2 power, 3 armor
pub const WAVES: [[u8; WAVE_LENGTH]; STAGE_COUNT as usize] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
    [3, 3, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 3, 3],
    [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 0, 0, 3, 3, 3],
    [2, 2, 2, 2, 2, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [2, 2, 2, 2, 2, 2, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 3],
    [0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 2, 2, 2, 2, 2, 3, 3, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 2, 2, 3, 3],
    [1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1, 1],
    [2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3],
    [2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3],
    [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3],
    [0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 3, 3],
    [3, 3, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 3, 3, 3, 0, 0, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 2, 2, 2, 2],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 2, 2, 3, 3, 3, 3, 3, 3, 3, 3],
    [2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 0, 0, 0, 0, 0, 0, 3, 3, 3, 3],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 2, 2, 3, 3, 3, 3],
    [3, 3, 3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [2, 2, 2, 2, 3, 3, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3],
    [1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 2, 2, 2, 2],
    [2, 2, 3, 3, 3, 3, 3, 3, 3, 3, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0],
    [1, 1, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 2],
    [2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3],
    [0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3],
    [2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 2, 2, 2],
    [3, 3, 3, 3, 3, 3, 3, 3, 0, 0, 0, 0, 0, 0, 2, 2, 1, 1, 1, 1],
    [1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 2, 2, 2, 2, 1, 1, 1, 1],
    [2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3],
    [2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3],
];

/// Wave codes for a 1-based stage
pub fn wave_for_stage(stage: u32) -> Option<&'static [u8; WAVE_LENGTH]> {
    stage
        .checked_sub(1)
        .and_then(|index| WAVES.get(index as usize))
}

/// One enemy of a wave, ready to queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveSlot {
    pub index: usize,
    pub kind: EnemyKind,
    pub carrier: bool,
    /// Spawn column: 0 left, 1 middle, 2 right
    pub column: usize,
}

/// Expand wave codes into slots. Columns cycle middle, right, left;
/// unknown codes skip their slot but still advance the column.
pub fn wave_slots(codes: &[u8]) -> Result<Vec<WaveSlot>, LevelError> {
    if codes.len() != WAVE_LENGTH {
        return Err(LevelError::ValidationError(format!(
            "wave has {} slots, expected {}",
            codes.len(),
            WAVE_LENGTH
        )));
    }

    let slots = codes
        .iter()
        .enumerate()
        .filter_map(|(index, &code)| {
            let kind = EnemyKind::from_code(code);
            if kind.is_none() {
                log::warn!("Wave slot {} has unknown enemy code {}", index, code);
            }
            kind.map(|kind| WaveSlot {
                index,
                kind,
                carrier: POWERUP_CARRIER_SLOTS.contains(&index),
                column: (index + 1) % 3,
            })
        })
        .collect();
    Ok(slots)
}

/// Queue a whole wave on the registry
pub fn queue_wave(registry: &mut Registry, slots: &[WaveSlot]) {
    let arena = registry.arena();
    for slot in slots {
        registry.queue_enemy(arena.enemy_spawn(slot.column), slot.kind, slot.carrier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        let grid = LevelGrid::parse("# tiny\n012\n34.\n\n999\n", 3);
        let grid = match grid {
            Ok(grid) => grid,
            Err(e) => panic!("parse failed: {}", e),
        };
        assert_eq!(grid.cell(0, 0), Cell::Brick);
        assert_eq!(grid.cell(1, 0), Cell::Steel);
        assert_eq!(grid.cell(2, 0), Cell::Water);
        assert_eq!(grid.cell(0, 1), Cell::Trees);
        assert_eq!(grid.cell(1, 1), Cell::Ice);
        assert_eq!(grid.cell(2, 1), Cell::Empty);
        assert_eq!(grid.cell(1, 2), Cell::Empty);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(matches!(
            LevelGrid::parse("012\n34\n999", 3),
            Err(LevelError::ValidationError(_))
        ));
        assert!(matches!(
            LevelGrid::parse("012\n345", 3),
            Err(LevelError::ValidationError(_))
        ));
        assert!(matches!(
            LevelGrid::parse("012\n3x5\n999", 3),
            Err(LevelError::ValidationError(_))
        ));
    }

    #[test]
    fn test_populate_places_entities_and_ice() {
        use crate::sim::registry::Category;

        let arena = Arena::new(3, 20.0);
        let Ok(grid) = LevelGrid::parse("014\n2..\n3..", 3) else {
            panic!("grid should parse");
        };
        let mut reg = Registry::new(arena, 0, false);
        grid.populate(&mut reg);
        assert_eq!(reg.count(Category::Bricks), 2);
        assert_eq!(reg.count(Category::Terrain), 2);
        assert_eq!(reg.count(Category::Trees), 1);
        assert!(reg.is_on_ice(arena.cell_center(2, 0)));
    }

    #[test]
    fn test_every_stage_has_a_full_wave() {
        for stage in 1..=STAGE_COUNT {
            let codes = wave_for_stage(stage).map(|w| w.to_vec()).unwrap_or_default();
            let slots = wave_slots(&codes).unwrap_or_default();
            assert_eq!(slots.len(), WAVE_LENGTH, "stage {}", stage);
        }
        assert!(wave_for_stage(0).is_none());
        assert!(wave_for_stage(STAGE_COUNT + 1).is_none());
    }

    #[test]
    fn test_wave_carriers_and_columns() {
        let Some(codes) = wave_for_stage(2) else {
            panic!("stage 2 exists");
        };
        let Ok(slots) = wave_slots(codes) else {
            panic!("stage 2 is well formed");
        };
        let carriers: Vec<usize> = slots.iter().filter(|s| s.carrier).map(|s| s.index).collect();
        assert_eq!(carriers, vec![3, 10, 17]);
        let columns: Vec<usize> = slots.iter().take(4).map(|s| s.column).collect();
        assert_eq!(columns, vec![1, 2, 0, 1]);
        assert_eq!(slots[0].kind, EnemyKind::Armor);
    }

    #[test]
    fn test_wave_codes_decode_to_kinds() {
        let Some(Ok(first)) = wave_for_stage(1).map(|codes| wave_slots(codes)) else {
            panic!("stage 1 is well formed");
        };
        let kinds: Vec<EnemyKind> = first.iter().map(|s| s.kind).collect();
        let mut expected = vec![EnemyKind::Basic; 18];
        expected.extend([EnemyKind::Fast; 2]);
        assert_eq!(kinds, expected);
        let carriers: Vec<usize> = first.iter().filter(|s| s.carrier).map(|s| s.index).collect();
        assert_eq!(carriers, vec![3, 10, 17]);

        let Some(Ok(fourth)) = wave_for_stage(4).map(|codes| wave_slots(codes)) else {
            panic!("stage 4 is well formed");
        };
        assert_eq!(fourth[0].kind, EnemyKind::Power);
        assert_eq!(fourth[10].kind, EnemyKind::Fast);
        assert_eq!(fourth[15].kind, EnemyKind::Basic);
        assert_eq!(fourth[19].kind, EnemyKind::Armor);

        // Every kind shows up somewhere in the table
        for kind in EnemyKind::ALL {
            let found = WAVES
                .iter()
                .flat_map(|codes| codes.iter())
                .any(|&code| EnemyKind::from_code(code) == Some(kind));
            assert!(found, "{:?} never appears", kind);
        }
    }

    #[test]
    fn test_wave_with_wrong_length_is_rejected() {
        assert!(wave_slots(&[0, 1, 2]).is_err());
    }

    #[test]
    fn test_fortress_geometry() {
        let arena = Arena::default();
        let cells = arena.fortress_cells();
        assert_eq!(cells.len(), 8);
        assert!(cells.contains(&(11, 23)));
        assert!(cells.contains(&(14, 25)));
        let area = arena.fortress_rect();
        assert!(cells.iter().all(|&(c, r)| area.contains(arena.cell_center(c, r))));
        assert!(area.contains(arena.statue_position()));
    }

    #[test]
    fn test_demo_keeps_spawns_clear() {
        let arena = Arena::default();
        let grid = LevelGrid::demo(&arena);
        for col in 0..arena.cells {
            assert_eq!(grid.cell(col, 0), Cell::Empty);
            assert_eq!(grid.cell(col, 1), Cell::Empty);
        }
        assert_eq!(grid.cell(12, 25), Cell::Empty);
        assert_eq!(grid.cell(11, 23), Cell::Brick);
    }

    #[test]
    fn test_outside_edge_order() {
        let arena = Arena::new(5, 10.0);
        assert_eq!(arena.outside_edge(&Rect::new(-1.0, -1.0, 3.0, 3.0)), Some(Side::Left));
        assert_eq!(arena.outside_edge(&Rect::new(48.0, -1.0, 51.0, 3.0)), Some(Side::Right));
        assert_eq!(arena.outside_edge(&Rect::new(5.0, -1.0, 8.0, 3.0)), Some(Side::Top));
        assert_eq!(arena.outside_edge(&Rect::new(5.0, 48.0, 8.0, 51.0)), Some(Side::Bottom));
        assert_eq!(arena.outside_edge(&Rect::new(0.0, 0.0, 50.0, 50.0)), None);
    }
}
