//! Brickfall - Breakout and Tetris sharing one playfield
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, falling piece, ball physics, session)
//! - `settings`: Data-driven gameplay configuration
//!
//! Rendering, audio and input devices live outside this crate. An adapter
//! reads [`sim::GameState`] between ticks and drives a [`sim::Session`].

pub mod settings;
pub mod sim;

pub use settings::{BallSpeedPreset, Settings};
pub use sim::Session;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 390.0;
    pub const CANVAS_HEIGHT: f32 = 900.0;
    /// Edge length of one grid cell
    pub const BLOCK_SIZE: f32 = 30.0;
    pub const GRID_COLS: usize = 13;
    pub const GRID_ROWS: usize = 30;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 80.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Distance from the bottom of the canvas to the paddle top
    pub const PADDLE_BOTTOM_OFFSET: f32 = 100.0;
    /// Paddle step for a single key press
    pub const PADDLE_KEY_STEP: f32 = 20.0;
    /// Paddle step per repeat while a direction is held
    pub const PADDLE_HOLD_STEP: f32 = 10.0;

    /// Ball defaults (units per tick)
    pub const BALL_SIZE: f32 = 10.0;
    pub const BALL_SPEED: f32 = 5.0;
    pub const MOBILE_BALL_SPEED: f32 = 3.75;

    /// Falling piece cadence
    pub const FALL_INTERVAL_MS: f32 = 1000.0;
    /// Health of every cell of a freshly spawned piece
    pub const PIECE_HEALTH: u8 = 3;

    /// Session defaults
    pub const STARTING_LIVES: u8 = 5;
    pub const COUNTDOWN_SECS: u8 = 3;

    /// Breakout formation: 5 rows ending at 70% of the grid height
    pub const FORMATION_ROWS: usize = 5;
    pub const FORMATION_START_ROW: usize = GRID_ROWS * 7 / 10 - FORMATION_ROWS;

    /// Scoring
    pub const LINE_CLEAR_POINTS: u64 = 100;
    pub const CEILING_POINTS: u64 = 50;
    pub const BLOCK_POINTS: u64 = 10;

    /// Highlight durations for the adapter
    pub const TRANSPLANT_HIGHLIGHT_MS: f32 = 1500.0;
    pub const SHIFT_HIGHLIGHT_MS: f32 = 500.0;
}

/// Top-left corner of a grid cell in canvas space
#[inline]
pub fn cell_origin(row: i32, col: i32) -> Vec2 {
    Vec2::new(
        col as f32 * consts::BLOCK_SIZE,
        row as f32 * consts::BLOCK_SIZE,
    )
}

/// Grid cell containing a canvas-space coordinate (row, col); may be out of range
#[inline]
pub fn cell_at(pos: Vec2) -> (i32, i32) {
    (
        (pos.y / consts::BLOCK_SIZE).floor() as i32,
        (pos.x / consts::BLOCK_SIZE).floor() as i32,
    )
}
