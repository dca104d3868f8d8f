//! Falling-piece state machine
//!
//! A piece falls, lands, locks into the grid and is replaced. Pieces knocked
//! to nothing by the ball are replaced without locking. Any spawn or lock
//! that cannot happen ends the session.

use rand::Rng;

use super::grid::Block;
use super::lines;
use super::piece::{Piece, ShapeKind};
use super::state::{GameEvent, GamePhase, GameState, Outcome};
use crate::consts::*;

/// Spawn a random piece at the top of the grid
pub fn spawn_piece(state: &mut GameState) {
    let kind = ShapeKind::ALL[state.rng.random_range(0..ShapeKind::ALL.len())];
    spawn_piece_of(state, kind);
}

/// Spawn a specific piece; ends the session if it collides on arrival
pub fn spawn_piece_of(state: &mut GameState, kind: ShapeKind) {
    if state.grid_before_last_piece.is_none() {
        state.grid_before_last_piece = Some(state.grid.clone());
    }

    let piece = Piece::spawn(kind);
    state.piece = Some(piece);
    state.emit(GameEvent::PieceSpawned { kind });

    if piece.collides(&state.grid) {
        log::debug!("{:?} spawned into occupied cells", kind);
        state.end_session(Outcome::BallWins);
    }
}

/// Drop the piece one row, landing and locking it if it cannot move.
/// Returns true if the piece moved.
pub fn move_down(state: &mut GameState) -> bool {
    let Some(mut piece) = state.piece else {
        return false;
    };
    // Any drop, automatic or manual, restarts the fall timer
    state.fall_elapsed_ms = 0.0;

    if piece.landed && piece.is_destroyed() {
        replace_destroyed(state);
        return false;
    }

    let next = piece.offset(1, 0);
    if !next.collides(&state.grid) {
        state.piece = Some(next);
        return true;
    }

    if piece.row < 0 {
        log::debug!("Piece stuck above the ceiling");
        state.end_session(Outcome::BallWins);
        return false;
    }

    piece.landed = true;
    state.piece = Some(piece);
    if piece.is_destroyed() {
        replace_destroyed(state);
        return false;
    }

    if !lock_piece(state) {
        log::debug!("Piece locked with no cells inside the grid");
        state.end_session(Outcome::BallWins);
        return false;
    }
    let cleared = lines::clear_lines(state);
    if cleared.count() > 0 {
        log::debug!(
            "Cleared rows {:?}, planted into {:?}",
            cleared.cleared_rows,
            cleared.transplanted_rows
        );
    }
    spawn_piece(state);
    false
}

/// Shift the piece one column; reverts silently on collision
pub fn move_sideways(state: &mut GameState, direction: i32) -> bool {
    try_replace(state, |p| p.offset(0, direction.signum()))
}

/// Quarter-turn the piece; no wall kicks, reverts silently on collision
pub fn rotate(state: &mut GameState) -> bool {
    try_replace(state, |p| p.rotated())
}

fn try_replace(state: &mut GameState, f: impl FnOnce(&Piece) -> Piece) -> bool {
    let Some(piece) = state.piece else {
        return false;
    };
    let candidate = f(&piece);
    if candidate.collides(&state.grid) {
        return false;
    }
    state.piece = Some(candidate);
    true
}

/// Merge the live piece into the grid, remembering the grid as it was.
/// Returns false if no cell landed inside the grid.
pub fn lock_piece(state: &mut GameState) -> bool {
    let Some(piece) = state.piece else {
        return false;
    };
    state.grid_before_last_piece = Some(state.grid.clone());

    let mut placed = 0;
    for (row, col, health) in piece.cells() {
        let block = Block {
            color: piece.color(),
            health,
            max_health: PIECE_HEALTH,
        };
        if state.grid.set(row, col, Some(block)) {
            placed += 1;
        }
    }

    if placed > 0 {
        log::debug!("Locked {:?} at ({}, {})", piece.kind, piece.row, piece.col);
        state.emit(GameEvent::PieceLocked {
            kind: piece.kind,
            row: piece.row,
            col: piece.col,
        });
    }
    placed > 0
}

/// Discard a piece the ball has fully destroyed and bring in the next one
pub fn replace_destroyed(state: &mut GameState) {
    if let Some(piece) = state.piece.take() {
        state.emit(GameEvent::PieceDestroyed { kind: piece.kind });
    }
    spawn_piece(state);
}

/// After the grid changes under the live piece, push the piece up until it
/// fits; respawn if even row 0 is blocked.
pub fn revalidate_piece(state: &mut GameState) {
    let Some(mut piece) = state.piece else {
        return;
    };
    while piece.collides(&state.grid) && piece.row > 0 {
        piece.row -= 1;
    }
    state.piece = Some(piece);

    if piece.collides(&state.grid) && state.phase != GamePhase::GameOver {
        spawn_piece(state);
    }
}

/// Advance the automatic fall timer
pub fn advance_fall_timer(state: &mut GameState, dt_ms: f32) {
    state.fall_elapsed_ms += dt_ms;
    if state.fall_elapsed_ms >= state.settings.fall_interval_ms {
        move_down(state);
    }
}
