//! Tetromino shapes and the falling piece
//!
//! Shapes are fixed 4x4 matrices with explicit bounds. A cell value of 0 is
//! empty; 1..=3 is a block carrying that much health.

use serde::{Deserialize, Serialize};

use super::grid::Grid;
use crate::consts::*;

/// Largest extent of any tetromino
pub const SHAPE_MAX: usize = 4;

/// The seven canonical tetrominoes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::T,
        ShapeKind::L,
        ShapeKind::J,
        ShapeKind::S,
        ShapeKind::Z,
    ];

    /// Spawn orientation, every filled cell at full piece health
    pub fn template(self) -> Shape {
        let rows: &[&[u8]] = match self {
            ShapeKind::I => &[&[1, 1, 1, 1]],
            ShapeKind::O => &[&[1, 1], &[1, 1]],
            ShapeKind::T => &[&[1, 1, 1], &[0, 1, 0]],
            ShapeKind::L => &[&[1, 1, 1], &[1, 0, 0]],
            ShapeKind::J => &[&[1, 1, 1], &[0, 0, 1]],
            ShapeKind::S => &[&[1, 1, 0], &[0, 1, 1]],
            ShapeKind::Z => &[&[0, 1, 1], &[1, 1, 0]],
        };
        Shape::from_rows(rows).with_health(PIECE_HEALTH)
    }

    /// Display colour (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            ShapeKind::I => 0x00f0f0,
            ShapeKind::O => 0xf0f000,
            ShapeKind::T => 0xa000f0,
            ShapeKind::L => 0xf0a000,
            ShapeKind::J => 0x0000f0,
            ShapeKind::S => 0x00f000,
            ShapeKind::Z => 0xf00000,
        }
    }
}

/// A shape matrix of `rows x cols` cells inside a fixed 4x4 buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    cells: [[u8; SHAPE_MAX]; SHAPE_MAX],
    rows: u8,
    cols: u8,
}

impl Shape {
    /// Build from row slices. Panics if the matrix exceeds 4x4 or is ragged.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        assert!(!rows.is_empty() && rows.len() <= SHAPE_MAX);
        let cols = rows[0].len();
        assert!(cols > 0 && cols <= SHAPE_MAX);

        let mut cells = [[0; SHAPE_MAX]; SHAPE_MAX];
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), cols, "ragged shape");
            cells[r][..cols].copy_from_slice(row);
        }
        Self {
            cells,
            rows: rows.len() as u8,
            cols: cols as u8,
        }
    }

    fn with_health(mut self, health: u8) -> Self {
        for row in &mut self.cells {
            for cell in row.iter_mut().filter(|c| **c > 0) {
                *cell = health;
            }
        }
        self
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        if row < self.rows() && col < self.cols() {
            self.cells[row][col]
        } else {
            0
        }
    }

    /// Quarter turn clockwise: `new[i][j] = old[rows - 1 - j][i]`
    pub fn rotated(&self) -> Shape {
        let (old_rows, old_cols) = (self.rows(), self.cols());
        let mut cells = [[0; SHAPE_MAX]; SHAPE_MAX];
        for (i, row) in cells.iter_mut().enumerate().take(old_cols) {
            for (j, cell) in row.iter_mut().enumerate().take(old_rows) {
                *cell = self.cells[old_rows - 1 - j][i];
            }
        }
        Shape {
            cells,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Filled cells as (row, col, health)
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        (0..self.rows()).flat_map(move |r| {
            (0..self.cols()).filter_map(move |c| {
                let health = self.cells[r][c];
                (health > 0).then_some((r, c, health))
            })
        })
    }

    /// True once every cell has been knocked out
    pub fn is_cleared(&self) -> bool {
        self.filled().next().is_none()
    }

    /// Take one hit off a cell. Returns the remaining health, or None if the
    /// cell was already empty.
    pub fn damage(&mut self, row: usize, col: usize) -> Option<u8> {
        if row >= self.rows() || col >= self.cols() || self.cells[row][col] == 0 {
            return None;
        }
        self.cells[row][col] -= 1;
        Some(self.cells[row][col])
    }
}

/// The live falling piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: ShapeKind,
    pub shape: Shape,
    /// Grid row of the shape's top-left cell; negative once pushed above the ceiling
    pub row: i32,
    pub col: i32,
    pub landed: bool,
}

impl Piece {
    /// A fresh piece at row 0, horizontally centred
    pub fn spawn(kind: ShapeKind) -> Self {
        let shape = kind.template();
        Self {
            kind,
            shape,
            row: 0,
            col: (GRID_COLS / 2) as i32 - (shape.cols() / 2) as i32,
            landed: false,
        }
    }

    pub fn color(&self) -> u32 {
        self.kind.color()
    }

    /// Copy of this piece displaced by (rows, cols)
    pub fn offset(&self, rows: i32, cols: i32) -> Piece {
        Piece {
            row: self.row + rows,
            col: self.col + cols,
            ..*self
        }
    }

    /// Copy of this piece turned a quarter clockwise in place
    pub fn rotated(&self) -> Piece {
        Piece {
            shape: self.shape.rotated(),
            ..*self
        }
    }

    /// Filled cells in grid coordinates as (row, col, health)
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        self.shape
            .filled()
            .map(|(r, c, h)| (self.row + r as i32, self.col + c as i32, h))
    }

    pub fn is_destroyed(&self) -> bool {
        self.shape.is_cleared()
    }

    /// Collision against walls, floor, occupied cells, and anything strictly
    /// below the lowest occupied grid row. Cells above the ceiling are free.
    pub fn collides(&self, grid: &Grid) -> bool {
        let lowest = grid.lowest_occupied_row().map(|r| r as i32);
        self.cells().any(|(row, col, _)| {
            col < 0
                || col >= GRID_COLS as i32
                || row >= GRID_ROWS as i32
                || (row >= 0 && grid.is_occupied(row, col))
                || lowest.is_some_and(|l| row > l)
        })
    }

    /// Deepest position reachable by repeated single-row drops
    pub fn ghost(&self, grid: &Grid) -> Piece {
        let mut ghost = *self;
        // An empty shape never collides
        if ghost.is_destroyed() {
            return ghost;
        }
        loop {
            let next = ghost.offset(1, 0);
            if next.collides(grid) {
                return ghost;
            }
            ghost = next;
        }
    }
}
