//! Coupling between the Tetris and Breakout halves
//!
//! Full rows are compacted out of the grid and re-planted, as they looked
//! before the last lock, underneath the Breakout blocks. The ball reaching
//! the ceiling pushes the whole grid up one row.

use super::grid::Grid;
use super::state::{GameEvent, GameState, Outcome};
use crate::consts::*;

/// Result of a line-clear pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    /// Pre-compaction index of every cleared row, bottom first
    pub cleared_rows: Vec<usize>,
    /// Grid rows the cleared lines were re-planted into
    pub transplanted_rows: Vec<usize>,
}

impl LineClear {
    pub fn count(&self) -> usize {
        self.cleared_rows.len()
    }
}

/// Remove every full row, scanning bottom to top. A row that becomes full
/// after compaction is caught because the same index is re-tested.
pub fn compact_full_rows(grid: &mut Grid) -> Vec<usize> {
    let mut cleared = Vec::new();
    let mut row = GRID_ROWS;
    while row > 0 {
        let r = row - 1;
        if grid.is_row_full(r) {
            // Rows above r have each dropped once per earlier clear
            cleared.push(r - cleared.len());
            grid.clear_row(r);
        } else {
            row -= 1;
        }
    }
    cleared
}

/// Copy snapshot rows into the empty space below the lowest occupied row.
/// Returns the rows written (limited by the space available).
pub fn transplant_rows(grid: &mut Grid, snapshot: &Grid, source_rows: &[usize]) -> Vec<usize> {
    let insert_at = grid.lowest_occupied_row().map_or(0, |r| r + 1);
    let capacity = GRID_ROWS - insert_at;
    let count = source_rows.len().min(capacity);

    // Everything below the lowest occupied row is empty, nothing to move
    (0..count)
        .map(|i| {
            let target = insert_at + i;
            grid.set_row(target, *snapshot.row(source_rows[i]));
            target
        })
        .collect()
}

/// Clear full rows after a lock, score them, and plant them in the
/// Breakout field
pub fn clear_lines(state: &mut GameState) -> LineClear {
    let cleared_rows = compact_full_rows(&mut state.grid);
    if cleared_rows.is_empty() {
        return LineClear::default();
    }

    let transplanted_rows = match &state.grid_before_last_piece {
        Some(snapshot) => transplant_rows(&mut state.grid, snapshot, &cleared_rows),
        None => Vec::new(),
    };
    if !transplanted_rows.is_empty() {
        state
            .highlight
            .set(transplanted_rows.clone(), TRANSPLANT_HIGHLIGHT_MS);
    }

    let count = cleared_rows.len();
    state.tetris_score += count as u64 * LINE_CLEAR_POINTS;
    state.emit(GameEvent::LinesCleared {
        count,
        transplanted: transplanted_rows.len(),
    });

    LineClear {
        cleared_rows,
        transplanted_rows,
    }
}

/// Push the grid, the live piece and the pre-lock snapshot up one row.
/// Ends the session (ball side wins) if blocks already touch the ceiling or
/// the piece cannot follow.
pub fn ceiling_shift(state: &mut GameState) -> bool {
    if !state.grid.is_row_empty(0) {
        log::debug!("Ceiling shift blocked: top row occupied");
        state.end_session(Outcome::BallWins);
        return false;
    }

    if let Some(piece) = state.piece {
        let raised = piece.offset(-1, 0);
        if raised.collides(&state.grid) {
            log::debug!("Ceiling shift blocked: piece cannot rise");
            state.end_session(Outcome::BallWins);
            return false;
        }
        state.piece = Some(raised);
    }

    if state.grid.shift_up().is_err() {
        state.end_session(Outcome::BallWins);
        return false;
    }
    if let Some(snapshot) = state.grid_before_last_piece.as_mut() {
        snapshot.scroll_up();
    }

    state
        .highlight
        .set((0..GRID_ROWS).collect(), SHIFT_HIGHLIGHT_MS);
    log::debug!("Grid shifted up");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::falling;
    use crate::sim::grid::Block;
    use crate::sim::piece::{Piece, ShapeKind};
    use crate::sim::state::GamePhase;

    fn block(color: u32) -> Option<Block> {
        Some(Block::new(color, 1))
    }

    fn fill_row_except(grid: &mut Grid, row: i32, holes: &[i32]) {
        for col in 0..GRID_COLS as i32 {
            if !holes.contains(&col) {
                grid.set(row, col, block(0xaaaaaa));
            }
        }
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(9, Settings::default());
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_compact_single_row() {
        let mut grid = Grid::new();
        grid.set(27, 3, block(1));
        fill_row_except(&mut grid, 28, &[]);
        grid.set(29, 0, block(2));

        assert_eq!(compact_full_rows(&mut grid), vec![28]);
        assert!(grid.is_occupied(28, 3));
        assert!(grid.is_occupied(29, 0));
        assert!(grid.is_row_empty(27));
    }

    #[test]
    fn test_compact_adjacent_rows_reports_original_indices() {
        let mut grid = Grid::new();
        fill_row_except(&mut grid, 28, &[]);
        fill_row_except(&mut grid, 29, &[]);
        grid.set(27, 4, block(1));

        assert_eq!(compact_full_rows(&mut grid), vec![29, 28]);
        assert!(grid.is_occupied(29, 4));
        assert_eq!(grid.lowest_occupied_row(), Some(29));
    }

    #[test]
    fn test_compact_split_rows() {
        let mut grid = Grid::new();
        fill_row_except(&mut grid, 20, &[]);
        grid.set(21, 0, block(1));
        fill_row_except(&mut grid, 22, &[]);

        assert_eq!(compact_full_rows(&mut grid), vec![22, 20]);
        assert!(grid.is_occupied(22, 0));
        assert_eq!(grid.highest_occupied_row(), Some(22));
    }

    #[test]
    fn test_transplant_fills_space_below() {
        let mut grid = Grid::new();
        grid.set(10, 0, block(1));
        let mut snapshot = Grid::new();
        snapshot.set(5, 7, block(9));

        let rows = transplant_rows(&mut grid, &snapshot, &[5]);
        assert_eq!(rows, vec![11]);
        assert_eq!(grid.get(11, 7).map(|b| b.color), Some(9));
    }

    #[test]
    fn test_transplant_limited_by_capacity() {
        let mut grid = Grid::new();
        grid.set(GRID_ROWS as i32 - 2, 0, block(1));
        let snapshot = Grid::new();
        let rows = transplant_rows(&mut grid, &snapshot, &[3, 4, 5]);
        assert_eq!(rows, vec![GRID_ROWS - 1]);

        let mut full = Grid::new();
        full.set(GRID_ROWS as i32 - 1, 0, block(1));
        assert!(transplant_rows(&mut full, &snapshot, &[3]).is_empty());
    }

    fn drop_vertical_i(state: &mut GameState, row: i32, col: i32) {
        falling::spawn_piece_of(state, ShapeKind::I);
        let mut piece = Piece::spawn(ShapeKind::I).rotated();
        piece.row = row;
        piece.col = col;
        state.piece = Some(piece);
        assert!(!falling::move_down(state));
    }

    #[test]
    fn test_filling_last_hole_in_bottom_row_scores_once() {
        let mut state = playing_state();
        fill_row_except(&mut state.grid, 29, &[12]);
        drop_vertical_i(&mut state, 26, 12);

        assert_eq!(state.tetris_score, LINE_CLEAR_POINTS);
        let cleared: Vec<_> = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LinesCleared { .. }))
            .collect();
        assert_eq!(
            cleared,
            vec![&GameEvent::LinesCleared {
                count: 1,
                transplanted: 0
            }]
        );
        // The rest of the I dropped into rows 27-29; no room left to plant
        assert!(state.grid.is_occupied(29, 12));
        assert!(state.grid.is_occupied(27, 12));
        assert!(!state.grid.is_occupied(29, 0));
    }

    #[test]
    fn test_cleared_row_planted_below_in_pre_lock_form() {
        let mut state = playing_state();
        fill_row_except(&mut state.grid, 20, &[12]);
        drop_vertical_i(&mut state, 17, 12);

        assert_eq!(state.tetris_score, LINE_CLEAR_POINTS);
        // I remnants compacted into rows 18-20
        assert!(state.grid.is_occupied(18, 12));
        assert!(state.grid.is_occupied(20, 12));
        // Row 21 holds the cleared line as it was before the lock: hole intact
        assert!(state.grid.is_occupied(21, 0));
        assert!(!state.grid.is_occupied(21, 12));
        assert_eq!(state.highlight.rows, vec![21]);
        assert!(state.highlight.is_active());
    }

    #[test]
    fn test_two_cleared_rows_each_plant_their_own_snapshot_row() {
        let mut state = playing_state();
        for (row, color) in [(18, 0x180000), (19, 0x190000)] {
            for col in 0..GRID_COLS as i32 - 1 {
                state.grid.set(row, col, block(color));
            }
        }
        falling::spawn_piece_of(&mut state, ShapeKind::I);
        let mut piece = Piece::spawn(ShapeKind::I).rotated();
        piece.row = 16;
        piece.col = GRID_COLS as i32 - 1;
        state.piece = Some(piece);

        assert!(falling::lock_piece(&mut state));
        let result = clear_lines(&mut state);

        assert_eq!(
            result,
            LineClear {
                cleared_rows: vec![19, 18],
                transplanted_rows: vec![20, 21],
            }
        );
        assert_eq!(result.count(), 2);
        assert_eq!(state.tetris_score, 2 * LINE_CLEAR_POINTS);
        // I remnants sit at the bottom of the compacted stack
        assert!(state.grid.is_occupied(18, 12));
        assert!(state.grid.is_occupied(19, 12));
        // Bottom cleared row is planted first, both with their pre-lock hole
        assert_eq!(state.grid.get(20, 0).map(|b| b.color), Some(0x190000));
        assert_eq!(state.grid.get(21, 0).map(|b| b.color), Some(0x180000));
        assert!(!state.grid.is_occupied(20, 12));
        assert!(!state.grid.is_occupied(21, 12));
        assert_eq!(state.highlight.rows, vec![20, 21]);
        assert_eq!(state.highlight.remaining_ms, TRANSPLANT_HIGHLIGHT_MS);
    }

    #[test]
    fn test_ceiling_shift_moves_grid_piece_and_snapshot() {
        let mut state = playing_state();
        state.grid.set(10, 2, block(1));
        falling::spawn_piece_of(&mut state, ShapeKind::O);
        state.piece.as_mut().unwrap().row = 4;

        assert!(ceiling_shift(&mut state));
        assert!(state.grid.is_occupied(9, 2));
        assert_eq!(state.piece.unwrap().row, 3);
        assert!(state.grid_before_last_piece.as_ref().unwrap().is_occupied(9, 2));
        assert_eq!(state.highlight.rows.len(), GRID_ROWS);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_ceiling_shift_blocked_by_top_row() {
        let mut state = playing_state();
        state.grid.set(0, 0, block(1));
        state.grid.set(8, 8, block(1));
        let before = state.grid.clone();

        assert!(!ceiling_shift(&mut state));
        assert_eq!(state.grid, before);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.outcome, Some(Outcome::BallWins));
    }

    #[test]
    fn test_ceiling_shift_blocked_by_piece() {
        let mut state = playing_state();
        // Overhang directly above the piece
        state.grid.set(5, 5, block(1));
        state.grid.set(8, 0, block(1));
        state.piece = Some(Piece::spawn(ShapeKind::O).offset(6, 0));

        assert!(!ceiling_shift(&mut state));
        assert_eq!(state.phase, GamePhase::GameOver);
    }
}
