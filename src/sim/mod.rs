//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only advances through `tick(dt_ms)`
//! - Seeded RNG only
//! - Grid scanned in fixed row/column order
//! - No rendering or platform dependencies

pub mod collision;
pub mod falling;
pub mod grid;
pub mod lines;
pub mod physics;
pub mod piece;
pub mod session;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, WallSide, ball_block_collision, reflect_velocity};
pub use grid::{Block, Grid, ShiftBlocked};
pub use lines::LineClear;
pub use piece::{Piece, Shape, ShapeKind};
pub use session::Session;
pub use state::{Ball, GameEvent, GamePhase, GameState, Highlight, Outcome, Paddle};
pub use tick::{TickInput, tick};
