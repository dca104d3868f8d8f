//! Session controller
//!
//! Owns one [`GameState`] and exposes the command surface an adapter drives:
//! start/reset, per-frame ticks, piece moves and paddle position.

use rand::Rng;

use super::falling;
use super::piece::Piece;
use super::state::{GameEvent, GamePhase, GameState};
use super::tick::{TickInput, tick};
use crate::settings::Settings;

/// A single game, from countdown to game over and back
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
}

impl Session {
    pub fn new(seed: u64, settings: Settings) -> Self {
        Self {
            state: GameState::new(seed, settings),
        }
    }

    /// Build from settings, using the configured seed or the fallback
    pub fn from_settings(settings: Settings, fallback_seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(fallback_seed);
        Self::new(seed, settings)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Landing preview for the live piece
    pub fn ghost(&self) -> Option<Piece> {
        self.state.ghost()
    }

    /// Lay out the formation, spawn the first piece and begin the countdown.
    /// Ignored once the session has started.
    pub fn start(&mut self) {
        if self.state.phase != GamePhase::NotStarted {
            return;
        }
        log::info!("Session started with seed {}", self.state.seed);
        self.place_breakout_formation();
        falling::spawn_piece(&mut self.state);
        if self.state.phase != GamePhase::GameOver {
            self.state.begin_countdown();
        }
    }

    /// Throw the current game away and start a new one. The next seed comes
    /// from this session's RNG so a replay stays reproducible.
    pub fn reset(&mut self) {
        let seed = self.state.rng.random::<u64>();
        let settings = self.state.settings.clone();
        log::info!("Session reset (next seed {})", seed);
        self.state = GameState::new(seed, settings);
        self.start();
    }

    /// Advance one frame with no input
    pub fn tick(&mut self, dt_ms: f32) {
        tick(&mut self.state, &TickInput::default(), dt_ms);
    }

    /// Advance one frame applying `input` first
    pub fn tick_with(&mut self, input: &TickInput, dt_ms: f32) {
        tick(&mut self.state, input, dt_ms);
    }

    fn accepts_piece_input(&self) -> bool {
        matches!(self.state.phase, GamePhase::Countdown | GamePhase::Playing)
    }

    pub fn move_left(&mut self) -> bool {
        self.accepts_piece_input() && falling::move_sideways(&mut self.state, -1)
    }

    pub fn move_right(&mut self) -> bool {
        self.accepts_piece_input() && falling::move_sideways(&mut self.state, 1)
    }

    /// Soft drop; only while playing
    pub fn move_down(&mut self) -> bool {
        self.state.phase == GamePhase::Playing && falling::move_down(&mut self.state)
    }

    pub fn rotate(&mut self) -> bool {
        self.accepts_piece_input() && falling::rotate(&mut self.state)
    }

    /// Place the paddle's left edge (clamped to the canvas)
    pub fn set_paddle_x(&mut self, x: f32) {
        if self.state.phase != GamePhase::GameOver {
            self.state.paddle.set_x(x);
        }
    }

    /// Move the paddle by `dx` (clamped to the canvas)
    pub fn nudge_paddle(&mut self, dx: f32) {
        let x = self.state.paddle.x + dx;
        self.set_paddle_x(x);
    }

    /// Regenerate the Breakout band and move the live piece out of its way
    pub fn place_breakout_formation(&mut self) {
        let state = &mut self.state;
        state.grid.place_formation(&mut state.rng);
        falling::revalidate_piece(state);
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }
}
