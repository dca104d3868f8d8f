//! Simulation tick
//!
//! Advances the session by one frame of `dt_ms` milliseconds. Piece moves and
//! paddle position arrive through [`TickInput`] so a whole run can be replayed
//! from a seed and an input log.

use rand::Rng;

use super::falling;
use super::physics;
use super::state::{GameEvent, GamePhase, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Absolute paddle left edge (from mouse/touch position)
    pub paddle_x: Option<f32>,
    /// Relative paddle step (keyboard)
    pub paddle_nudge: f32,
    /// Piece column step: -1, 0 or 1
    pub shift: i32,
    pub rotate: bool,
    /// Soft drop one row
    pub drop: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    match state.phase {
        GamePhase::NotStarted | GamePhase::GameOver => return,
        _ => {}
    }

    state.time_ticks += 1;
    state.highlight.advance(dt_ms);
    apply_input(state, input);

    match state.phase {
        GamePhase::Countdown => tick_countdown(state, dt_ms),
        GamePhase::Playing => tick_playing(state, dt_ms),
        _ => {}
    }
}

/// Paddle and piece commands. Soft drop waits for the countdown to finish.
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(x) = input.paddle_x {
        state.paddle.set_x(x);
    }
    if input.paddle_nudge != 0.0 {
        let x = state.paddle.x + input.paddle_nudge;
        state.paddle.set_x(x);
    }
    if input.shift != 0 {
        falling::move_sideways(state, input.shift);
    }
    if input.rotate {
        falling::rotate(state);
    }
    if input.drop && state.phase == GamePhase::Playing {
        falling::move_down(state);
    }
}

fn tick_countdown(state: &mut GameState, dt_ms: f32) {
    // Ball rides the paddle until launch
    state.ball.rest_on(&state.paddle);

    state.countdown_elapsed_ms += dt_ms;
    let elapsed_secs = (state.countdown_elapsed_ms / 1000.0).floor() as i32;
    let value = state.settings.countdown_secs as i32 - elapsed_secs;

    if value <= 0 {
        state.countdown = 0;
        state.phase = GamePhase::Playing;
        let speed = state.settings.base_ball_speed();
        let rightward = state.rng.random_bool(0.5);
        state.ball.launch(speed, rightward);
        log::debug!("Ball launched at {:?}", state.ball.vel);
        let velocity = state.ball.vel;
        state.emit(GameEvent::BallLaunched { velocity });
    } else if value as u8 != state.countdown {
        state.countdown = value as u8;
        state.emit(GameEvent::CountdownTick {
            value: state.countdown,
        });
    }
}

fn tick_playing(state: &mut GameState, dt_ms: f32) {
    falling::advance_fall_timer(state, dt_ms);
    if state.phase != GamePhase::Playing {
        return;
    }

    physics::step_ball(state);
    if state.phase == GamePhase::GameOver {
        return;
    }

    // A piece knocked to nothing in flight is replaced at once
    if state.piece.is_some_and(|p| p.is_destroyed()) {
        falling::replace_destroyed(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::piece::{Piece, ShapeKind};
    use crate::sim::state::Outcome;
    use glam::Vec2;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    fn counting_state() -> GameState {
        let mut state = GameState::new(12345, Settings::default());
        falling::spawn_piece_of(&mut state, ShapeKind::T);
        state.begin_countdown();
        state
    }

    #[test]
    fn test_not_started_does_nothing() {
        let mut state = GameState::new(1, Settings::default());
        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.phase, GamePhase::NotStarted);
    }

    #[test]
    fn test_countdown_launches_after_three_seconds() {
        let mut state = counting_state();
        assert_eq!(state.countdown, 3);
        assert_eq!(state.ball.vel, Vec2::ZERO);

        let input = TickInput::default();
        for _ in 0..29 {
            tick(&mut state, &input, 100.0);
        }
        assert_eq!(state.phase, GamePhase::Countdown);
        assert_eq!(state.countdown, 1);
        assert_eq!(state.ball.vel, Vec2::ZERO);

        tick(&mut state, &input, 100.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.countdown, 0);
        let speed = Settings::default().base_ball_speed();
        assert_eq!(state.ball.vel.x.abs(), speed);
        assert_eq!(state.ball.vel.y, -speed);

        let ticks: Vec<u8> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::CountdownTick { value } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![3, 2, 1]);
    }

    #[test]
    fn test_countdown_freezes_piece_but_allows_side_moves() {
        let mut state = counting_state();
        let start = state.piece.unwrap();

        let input = TickInput {
            shift: -1,
            drop: true,
            ..Default::default()
        };
        tick(&mut state, &input, 1500.0);
        let piece = state.piece.unwrap();
        assert_eq!(piece.row, start.row);
        assert_eq!(piece.col, start.col - 1);
    }

    #[test]
    fn test_ball_follows_paddle_during_countdown() {
        let mut state = counting_state();
        let input = TickInput {
            paddle_x: Some(10.0),
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_MS);
        assert_eq!(state.ball.pos.x, state.paddle.center_x());
        assert_eq!(state.paddle.x, 10.0);
    }

    #[test]
    fn test_piece_knocked_out_in_flight_is_replaced_without_lock() {
        let mut state = GameState::new(8, Settings::default());
        state.phase = GamePhase::Playing;
        let mut piece = Piece::spawn(ShapeKind::O);
        piece.row = 5;
        // Leave one cell, (6, 5) in grid terms, a single hit from gone
        for (r, c, _) in piece.shape.filled().collect::<Vec<_>>() {
            let keep = if (r, c) == (1, 0) { 1 } else { 0 };
            while piece.shape.get(r, c) > keep {
                piece.shape.damage(r, c);
            }
        }
        state.piece = Some(piece);
        state.ball.pos = Vec2::new(162.0, 219.0);
        state.ball.vel = Vec2::new(0.0, -5.0);
        let grid = state.grid.clone();

        tick(&mut state, &TickInput::default(), 16.0);

        assert_eq!(
            state.events[..2],
            [
                GameEvent::BlockHit {
                    row: 6,
                    col: 5,
                    destroyed: true,
                    on_piece: true,
                },
                GameEvent::PieceDestroyed {
                    kind: ShapeKind::O
                },
            ]
        );
        assert!(matches!(state.events[2], GameEvent::PieceSpawned { .. }));
        assert!(!state.events.iter().any(|e| matches!(e, GameEvent::PieceLocked { .. })));
        assert_eq!(state.grid, grid);
        let fresh = state.piece.unwrap();
        assert_eq!(fresh.row, 0);
        assert!(!fresh.is_destroyed());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_over_stops_ticking() {
        let mut state = counting_state();
        state.end_session(Outcome::BallWins);
        let before = state.time_ticks;
        let ball = state.ball.pos;

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), FRAME_MS);
        }
        assert_eq!(state.time_ticks, before);
        assert_eq!(state.ball.pos, ball);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = counting_state();
        let mut state2 = counting_state();

        let inputs = [
            TickInput {
                paddle_x: Some(120.0),
                ..Default::default()
            },
            TickInput {
                rotate: true,
                ..Default::default()
            },
            TickInput {
                shift: 1,
                drop: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for frame in 0..600 {
            let input = &inputs[frame % inputs.len()];
            tick(&mut state1, input, FRAME_MS);
            tick(&mut state2, input, FRAME_MS);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.ball.pos, state2.ball.pos);
        assert_eq!(state1.grid, state2.grid);
        assert_eq!(state1.piece, state2.piece);
        assert_eq!(state1.events, state2.events);
    }
}
