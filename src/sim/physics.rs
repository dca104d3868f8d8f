//! Ball physics
//!
//! One call to [`step_ball`] moves the ball a single tick and resolves, in
//! order: side walls, the ceiling teleport, the paddle, the floor, and finally
//! blocks in the live piece and the grid.

use glam::Vec2;

use super::collision::{
    Aabb, ball_block_collision, ball_ceiling_collision, ball_floor_collision,
    ball_side_wall_collision, paddle_bounce_velocity, paddle_offset, reflect_velocity,
};
use super::lines;
use super::state::{GameEvent, GamePhase, GameState, Outcome};
use crate::cell_at;
use crate::consts::*;

/// Advance the ball one tick
pub fn step_ball(state: &mut GameState) {
    integrate(state);
    resolve_wall_collision(state);
    resolve_ceiling_event(state);
    if state.phase != GamePhase::Playing {
        return;
    }
    resolve_paddle_collision(state);
    if resolve_ball_lost(state) {
        return;
    }
    resolve_block_collisions(state);
}

pub fn integrate(state: &mut GameState) {
    state.ball.pos += state.ball.vel;
}

/// Bounce off the left or right wall, clamping the ball back inside
pub fn resolve_wall_collision(state: &mut GameState) -> bool {
    let ball = &mut state.ball;
    let Some(side) = ball_side_wall_collision(ball.pos, ball.size) else {
        return false;
    };
    let half = ball.size / 2.0;
    ball.vel.x = -ball.vel.x;
    ball.pos.x = ball.pos.x.clamp(half, CANVAS_WIDTH - half);
    state.emit(GameEvent::WallHit { side });
    true
}

/// The ball touching the top edge reappears just under the lowest block row
/// (mid-canvas if the grid is empty) and the grid shifts up one row.
/// Velocity is kept.
pub fn resolve_ceiling_event(state: &mut GameState) -> bool {
    if !ball_ceiling_collision(state.ball.pos, state.ball.size) {
        return false;
    }

    let from = state.ball.pos;
    // Landing row is measured before the shift
    let new_y = match state.grid.lowest_occupied_row() {
        Some(row) => (row + 1) as f32 * BLOCK_SIZE + state.ball.size * 2.0,
        None => CANVAS_HEIGHT / 2.0,
    };
    state.ball.pos.y = new_y;

    lines::ceiling_shift(state);
    state.breakout_score += CEILING_POINTS;
    log::debug!("Ceiling teleport to y={}", new_y);
    state.emit(GameEvent::CeilingTeleport {
        from,
        to: state.ball.pos,
    });
    true
}

/// Redirect the ball by where it struck the paddle
pub fn resolve_paddle_collision(state: &mut GameState) -> bool {
    let paddle = &state.paddle;
    let paddle_box = Aabb::new(
        Vec2::new(paddle.x, paddle.y),
        Vec2::new(paddle.x + paddle.width, paddle.y + paddle.height),
    );
    let ball_box = Aabb::centered(state.ball.pos, state.ball.size);
    if !ball_box.overlaps(&paddle_box) {
        return false;
    }

    let offset = paddle_offset(state.ball.pos.x, paddle);
    state.ball.vel = paddle_bounce_velocity(state.ball.vel, offset);
    // Sit on top of the paddle so the next tick can't hit it again
    state.ball.pos.y = paddle.y - state.ball.size / 2.0;
    log::trace!("Paddle hit at offset {:.2}", offset);
    state.emit(GameEvent::PaddleHit { offset });
    true
}

/// Take a life when the ball leaves through the bottom. Returns true if the
/// ball was lost.
pub fn resolve_ball_lost(state: &mut GameState) -> bool {
    if !ball_floor_collision(state.ball.pos, state.ball.size) {
        return false;
    }

    state.lives = state.lives.saturating_sub(1);
    let lives_remaining = state.lives;
    log::debug!("Ball lost, {} left", lives_remaining);
    state.emit(GameEvent::BallLost { lives_remaining });

    if lives_remaining > 0 {
        state.begin_countdown();
    } else {
        state.end_session(Outcome::BlocksWin);
    }
    true
}

/// Damage every piece cell and grid block the ball overlaps, reflecting once
/// per hit. Returns the number of cells hit.
pub fn resolve_block_collisions(state: &mut GameState) -> usize {
    let ball_box = Aabb::centered(state.ball.pos, state.ball.size);
    let mut hits = 0;

    if let Some(mut piece) = state.piece {
        let cells: Vec<(i32, i32, u8)> = piece.cells().collect();
        for (row, col, _) in cells {
            let result = ball_block_collision(&ball_box, &Aabb::cell(row, col));
            if !result.hit {
                continue;
            }
            let local = ((row - piece.row) as usize, (col - piece.col) as usize);
            let Some(remaining) = piece.shape.damage(local.0, local.1) else {
                continue;
            };

            state.ball.vel = reflect_velocity(state.ball.vel, result.normal);
            // Piece cells score per hit; they have no max health until locked
            state.breakout_score += BLOCK_POINTS;
            hits += 1;
            log::trace!(
                "Piece cell ({}, {}) hit at depth {:.1}, {} left",
                row,
                col,
                result.penetration,
                remaining
            );
            state.emit(GameEvent::BlockHit {
                row,
                col,
                destroyed: remaining == 0,
                on_piece: true,
            });
        }
        state.piece = Some(piece);
    }

    // Only cells under the ball's footprint can overlap it
    let (top, left) = cell_at(ball_box.min);
    let (bottom, right) = cell_at(ball_box.max);
    let rows = top.max(0)..=bottom.min(GRID_ROWS as i32 - 1);
    for row in rows {
        for col in left.max(0)..=right.min(GRID_COLS as i32 - 1) {
            if !state.grid.is_occupied(row, col) {
                continue;
            }
            let result = ball_block_collision(&ball_box, &Aabb::cell(row, col));
            if !result.hit {
                continue;
            }
            let Some(damage) = state.grid.damage(row, col) else {
                continue;
            };

            state.ball.vel = reflect_velocity(state.ball.vel, result.normal);
            if damage.destroyed {
                state.breakout_score += BLOCK_POINTS * damage.max_health as u64;
            }
            hits += 1;
            log::trace!(
                "Block ({}, {}) hit at depth {:.1}, destroyed: {}",
                row,
                col,
                result.penetration,
                damage.destroyed
            );
            state.emit(GameEvent::BlockHit {
                row,
                col,
                destroyed: damage.destroyed,
                on_piece: false,
            });
        }
    }

    hits
}
