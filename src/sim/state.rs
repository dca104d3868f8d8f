//! Game state and core simulation types
//!
//! Everything a presentation layer needs to draw a frame lives here and is
//! serializable as a snapshot.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::WallSide;
use super::grid::Grid;
use super::piece::{Piece, ShapeKind};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created but not started; nothing ticks
    NotStarted,
    /// 3-2-1 countdown; ball rides the paddle, the piece is frozen
    Countdown,
    /// Active gameplay
    Playing,
    /// Session ended
    GameOver,
}

/// Which side won, for the end screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The blocks overflowed the top of the grid
    BallWins,
    /// The player ran out of balls
    BlocksWin,
}

/// Notifications for the presentation layer (sound, shake, particles)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Countdown moved to a new value (3, 2, 1)
    CountdownTick { value: u8 },
    BallLaunched { velocity: Vec2 },
    PieceSpawned { kind: ShapeKind },
    PieceLocked { kind: ShapeKind, row: i32, col: i32 },
    /// Every cell of the falling piece was knocked out
    PieceDestroyed { kind: ShapeKind },
    BlockHit {
        row: i32,
        col: i32,
        destroyed: bool,
        on_piece: bool,
    },
    PaddleHit { offset: f32 },
    WallHit { side: WallSide },
    CeilingTeleport { from: Vec2, to: Vec2 },
    LinesCleared { count: usize, transplanted: usize },
    BallLost { lives_remaining: u8 },
    SessionEnded { outcome: Outcome },
}

/// The ball; position is its centre, velocity is per tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - PADDLE_BOTTOM_OFFSET),
            vel: Vec2::ZERO,
            size: BALL_SIZE,
        }
    }
}

impl Ball {
    /// Park the ball on the paddle, motionless
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x(), paddle.y - self.size);
        self.vel = Vec2::ZERO;
    }

    /// Launch straight-ish up at `speed` per axis, horizontal sign chosen by caller
    pub fn launch(&mut self, speed: f32, rightward: bool) {
        let dx = if rightward { speed } else { -speed };
        self.vel = Vec2::new(dx, -speed);
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge (fixed)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: CANVAS_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
            y: CANVAS_HEIGHT - PADDLE_BOTTOM_OFFSET,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Move the left edge, clamped inside the canvas
    pub fn set_x(&mut self, x: f32) {
        self.x = x.clamp(0.0, CANVAS_WIDTH - self.width);
    }
}

/// Rows the adapter should flash, and for how much longer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Highlight {
    pub rows: Vec<usize>,
    pub remaining_ms: f32,
}

impl Highlight {
    pub fn set(&mut self, rows: Vec<usize>, duration_ms: f32) {
        self.rows = rows;
        self.remaining_ms = duration_ms;
    }

    pub fn advance(&mut self, dt_ms: f32) {
        if self.remaining_ms > 0.0 {
            self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
            if self.remaining_ms == 0.0 {
                self.rows.clear();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

/// Complete session state (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Tunables the session was created with
    pub settings: Settings,
    pub phase: GamePhase,
    /// Set once the session ends
    pub outcome: Option<Outcome>,
    pub tetris_score: u64,
    pub breakout_score: u64,
    pub lives: u8,
    /// Countdown value shown to the player (3, 2, 1; 0 when not counting)
    pub countdown: u8,
    /// Time spent in the current countdown
    pub countdown_elapsed_ms: f32,
    /// Time since the piece last fell
    pub fall_elapsed_ms: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub grid: Grid,
    /// The grid as it was just before the most recent lock
    pub grid_before_last_piece: Option<Grid>,
    pub piece: Option<Piece>,
    pub ball: Ball,
    pub paddle: Paddle,
    pub highlight: Highlight,
    /// Pending notifications, drained by the adapter
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip)]
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a fresh, not-yet-started session
    pub fn new(seed: u64, settings: Settings) -> Self {
        let paddle = Paddle::default();
        let mut ball = Ball::default();
        ball.rest_on(&paddle);

        Self {
            seed,
            lives: settings.starting_lives,
            settings,
            phase: GamePhase::NotStarted,
            outcome: None,
            tetris_score: 0,
            breakout_score: 0,
            countdown: 0,
            countdown_elapsed_ms: 0.0,
            fall_elapsed_ms: 0.0,
            time_ticks: 0,
            grid: Grid::new(),
            grid_before_last_piece: None,
            piece: None,
            ball,
            paddle,
            highlight: Highlight::default(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn total_score(&self) -> u64 {
        self.tetris_score + self.breakout_score
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Where the live piece would land
    pub fn ghost(&self) -> Option<Piece> {
        self.piece.map(|p| p.ghost(&self.grid))
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Begin (or restart) the 3-2-1 countdown with the ball parked on the paddle
    pub(crate) fn begin_countdown(&mut self) {
        self.phase = GamePhase::Countdown;
        self.countdown = self.settings.countdown_secs;
        self.countdown_elapsed_ms = 0.0;
        self.ball.rest_on(&self.paddle);
        let value = self.countdown;
        self.emit(GameEvent::CountdownTick { value });
    }

    /// Terminal transition. Later calls keep the first outcome.
    pub(crate) fn end_session(&mut self, outcome: Outcome) {
        if self.phase == GamePhase::GameOver {
            return;
        }
        log::info!(
            "Game over ({:?}): tetris {} / breakout {}",
            outcome,
            self.tetris_score,
            self.breakout_score
        );
        self.lives = 0;
        self.phase = GamePhase::GameOver;
        self.outcome = Some(outcome);
        self.emit(GameEvent::SessionEnded { outcome });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_for_start() {
        let state = GameState::new(1, Settings::default());
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.lives, STARTING_LIVES);
        assert!(state.piece.is_none());
        assert!(state.grid.is_empty());
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.ball.pos.x, state.paddle.center_x());
    }

    #[test]
    fn test_paddle_clamped_to_canvas() {
        let mut paddle = Paddle::default();
        paddle.set_x(-40.0);
        assert_eq!(paddle.x, 0.0);
        paddle.set_x(1000.0);
        assert_eq!(paddle.x, CANVAS_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn test_highlight_expires() {
        let mut hl = Highlight::default();
        hl.set(vec![3, 4], 500.0);
        hl.advance(300.0);
        assert!(hl.is_active());
        assert_eq!(hl.rows, vec![3, 4]);
        hl.advance(300.0);
        assert!(!hl.is_active());
        assert!(hl.rows.is_empty());
    }

    #[test]
    fn test_end_session_keeps_first_outcome() {
        let mut state = GameState::new(1, Settings::default());
        state.end_session(Outcome::BlocksWin);
        state.end_session(Outcome::BallWins);
        assert!(state.is_over());
        assert_eq!(state.outcome, Some(Outcome::BlocksWin));
        assert_eq!(state.lives, 0);
        assert_eq!(state.events.len(), 1);
    }
}
