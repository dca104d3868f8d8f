//! Fixed-size cell matrix shared by the falling pieces and the ball
//!
//! Rows are indexed top to bottom (row 0 is the ceiling), columns left to
//! right. A cell is either empty or holds a [`Block`] with remaining health.

use rand::Rng;
use serde::Serialize;

use super::piece::ShapeKind;
use crate::consts::*;

/// A single breakable block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Packed 0xRRGGBB colour
    pub color: u32,
    /// Remaining hits, always in `1..=max_health` while the block exists
    pub health: u8,
    pub max_health: u8,
}

impl Block {
    pub fn new(color: u32, health: u8) -> Self {
        Self {
            color,
            health,
            max_health: health,
        }
    }
}

/// Result of damaging one block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDamage {
    pub destroyed: bool,
    /// Health the block started with (drives scoring)
    pub max_health: u8,
}

/// The shift would push blocks off the top of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftBlocked;

pub type Row = [Option<Block>; GRID_COLS];

const EMPTY_ROW: Row = [None; GRID_COLS];

/// The persistent playfield
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    rows: [Row; GRID_ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid {
    /// Create an empty grid
    pub fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; GRID_ROWS],
        }
    }

    #[inline]
    fn in_bounds(row: i32, col: i32) -> bool {
        row >= 0 && (row as usize) < GRID_ROWS && col >= 0 && (col as usize) < GRID_COLS
    }

    /// Block at (row, col); None if empty or out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<&Block> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        self.rows[row as usize][col as usize].as_ref()
    }

    /// Replace a cell. Returns false if out of bounds.
    pub fn set(&mut self, row: i32, col: i32, cell: Option<Block>) -> bool {
        if !Self::in_bounds(row, col) {
            return false;
        }
        self.rows[row as usize][col as usize] = cell;
        true
    }

    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.get(row, col).is_some()
    }

    pub fn row(&self, row: usize) -> &Row {
        &self.rows[row]
    }

    /// Overwrite a whole row
    pub fn set_row(&mut self, row: usize, cells: Row) {
        self.rows[row] = cells;
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        row < GRID_ROWS && self.rows[row].iter().all(Option::is_some)
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        row >= GRID_ROWS || self.rows[row].iter().all(Option::is_none)
    }

    pub fn is_empty(&self) -> bool {
        (0..GRID_ROWS).all(|r| self.is_row_empty(r))
    }

    /// Remove a row: everything above moves down one, row 0 becomes empty.
    ///
    /// The row that lands at `row` may itself be full; callers re-test the
    /// same index before advancing.
    pub fn clear_row(&mut self, row: usize) {
        if row >= GRID_ROWS {
            return;
        }
        self.rows.copy_within(0..row, 1);
        self.rows[0] = EMPTY_ROW;
    }

    /// Move every row up one. Fails without touching the grid when row 0
    /// already holds blocks.
    pub fn shift_up(&mut self) -> Result<(), ShiftBlocked> {
        if !self.is_row_empty(0) {
            return Err(ShiftBlocked);
        }
        self.scroll_up();
        Ok(())
    }

    /// Move every row up one, discarding row 0 unconditionally
    pub fn scroll_up(&mut self) {
        self.rows.copy_within(1.., 0);
        self.rows[GRID_ROWS - 1] = EMPTY_ROW;
    }

    /// Bottom-most row holding any block
    pub fn lowest_occupied_row(&self) -> Option<usize> {
        (0..GRID_ROWS).rev().find(|&r| !self.is_row_empty(r))
    }

    /// Top-most row holding any block
    pub fn highest_occupied_row(&self) -> Option<usize> {
        (0..GRID_ROWS).find(|&r| !self.is_row_empty(r))
    }

    /// Take one hit off the block at (row, col), removing it at zero health
    pub fn damage(&mut self, row: i32, col: i32) -> Option<BlockDamage> {
        if !Self::in_bounds(row, col) {
            return None;
        }
        let cell = &mut self.rows[row as usize][col as usize];
        let block = cell.as_mut()?;
        block.health = block.health.saturating_sub(1);
        let damage = BlockDamage {
            destroyed: block.health == 0,
            max_health: block.max_health,
        };
        if damage.destroyed {
            *cell = None;
        }
        Some(damage)
    }

    /// Occupied cells as (row, col, block), top to bottom
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize, &Block)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|b| (r, c, b)))
        })
    }

    /// Rebuild the Breakout band: clears everything from the formation's
    /// first row down, then lays 5 rows with two random gaps each. Health is
    /// tiered from the bottom: 1, 1, 2, 2, 3.
    pub fn place_formation<R: Rng>(&mut self, rng: &mut R) {
        for row in &mut self.rows[FORMATION_START_ROW..] {
            *row = EMPTY_ROW;
        }

        for i in 0..FORMATION_ROWS {
            let gaps = [
                rng.random_range(0..GRID_COLS),
                rng.random_range(0..GRID_COLS),
            ];
            let health = formation_health(i);
            let row = &mut self.rows[FORMATION_START_ROW + i];
            for (col, cell) in row.iter_mut().enumerate() {
                if gaps.contains(&col) {
                    continue;
                }
                let kind = ShapeKind::ALL[rng.random_range(0..ShapeKind::ALL.len())];
                *cell = Some(Block::new(kind.color(), health));
            }
        }
    }
}

/// Health of formation row `i` (0 = top of the band)
fn formation_health(i: usize) -> u8 {
    if i >= FORMATION_ROWS - 2 {
        1
    } else if i >= FORMATION_ROWS - 4 {
        2
    } else {
        3
    }
}
