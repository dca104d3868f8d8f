//! Collision detection and response for axis-aligned boxes
//!
//! Every solid in the playfield is a rectangle: grid cells, piece cells, the
//! paddle and the ball's own bounding square. Overlap tests are inclusive on
//! all edges.

use glam::Vec2;

use super::state::Paddle;
use crate::consts::*;
use crate::cell_origin;

/// An axis-aligned rectangle in canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of edge `size` centred on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = Vec2::splat(size / 2.0);
        Self::new(center - half, center + half)
    }

    /// The rectangle covered by a grid cell
    pub fn cell(row: i32, col: i32) -> Self {
        let min = cell_origin(row, col);
        Self::new(min, min + Vec2::splat(BLOCK_SIZE))
    }

    /// Inclusive overlap test (touching edges count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x >= other.min.x
            && self.min.x <= other.max.x
            && self.max.y >= other.min.y
            && self.min.y <= other.max.y
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal to reflect against
    pub normal: Vec2,
    /// Smallest of the four edge distances
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check the ball against one block
///
/// The four edge distances (ball right to block left, ball left to block
/// right, ball bottom to block top, ball top to block bottom) are compared;
/// the smallest picks the reflection axis. Ties go to the horizontal axis,
/// left before right before top before bottom.
pub fn ball_block_collision(ball: &Aabb, block: &Aabb) -> CollisionResult {
    if !ball.overlaps(block) {
        return CollisionResult::miss();
    }

    let hit_left = (ball.max.x - block.min.x).abs();
    let hit_right = (ball.min.x - block.max.x).abs();
    let hit_top = (ball.max.y - block.min.y).abs();
    let hit_bottom = (ball.min.y - block.max.y).abs();
    let min_overlap = hit_left.min(hit_right).min(hit_top).min(hit_bottom);

    let normal = if min_overlap == hit_left {
        Vec2::NEG_X
    } else if min_overlap == hit_right {
        Vec2::X
    } else if min_overlap == hit_top {
        Vec2::NEG_Y
    } else {
        Vec2::Y
    };

    CollisionResult {
        hit: true,
        normal,
        penetration: min_overlap,
    }
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Which side wall the ball touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum WallSide {
    Left,
    Right,
}

/// Check the ball against the left and right canvas walls
pub fn ball_side_wall_collision(ball_pos: Vec2, ball_size: f32) -> Option<WallSide> {
    let half = ball_size / 2.0;
    if ball_pos.x - half <= 0.0 {
        Some(WallSide::Left)
    } else if ball_pos.x + half >= CANVAS_WIDTH {
        Some(WallSide::Right)
    } else {
        None
    }
}

/// Check whether the ball touched the top edge
#[inline]
pub fn ball_ceiling_collision(ball_pos: Vec2, ball_size: f32) -> bool {
    ball_pos.y - ball_size / 2.0 <= 0.0
}

/// Check whether the ball dropped out through the bottom edge
#[inline]
pub fn ball_floor_collision(ball_pos: Vec2, ball_size: f32) -> bool {
    ball_pos.y + ball_size / 2.0 >= CANVAS_HEIGHT
}

/// Horizontal hit position on the paddle, -1 (left end) to 1 (right end)
pub fn paddle_offset(ball_x: f32, paddle: &Paddle) -> f32 {
    ((ball_x - paddle.center_x()) / (paddle.width / 2.0)).clamp(-1.0, 1.0)
}

/// New velocity after a paddle bounce: the hit offset picks an angle of up
/// to 45° from vertical, speed is unchanged.
pub fn paddle_bounce_velocity(velocity: Vec2, offset: f32) -> Vec2 {
    let angle = offset * std::f32::consts::FRAC_PI_4;
    let speed = velocity.length();
    Vec2::new(angle.sin() * speed, -angle.cos() * speed)
}
