//! Brickfall headless entry point
//!
//! Runs one session on an autopilot: the paddle chases the ball and pieces
//! are steered at random. Prints a JSON summary when the session ends.
//!
//! Usage: `brickfall [settings.json]`. Set `RUST_LOG=debug` to watch events.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use brickfall::Settings;
use brickfall::sim::{GameEvent, Session, TickInput};

/// Fixed frame length
const FRAME_MS: f32 = 16.0;
/// Give up after ten minutes of game time
const MAX_FRAMES: u64 = 10 * 60 * 1000 / FRAME_MS as u64;

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Next frame's commands from the autopilot
fn autopilot(session: &Session, rng: &mut Pcg32) -> TickInput {
    let state = session.state();
    let target = state.ball.pos.x - state.paddle.width / 2.0;
    // Paddle lags a little so it can miss
    let paddle_x = state.paddle.x + (target - state.paddle.x) * 0.6;

    let mut input = TickInput {
        paddle_x: Some(paddle_x),
        ..Default::default()
    };
    if rng.random_bool(0.05) {
        input.shift = if rng.random_bool(0.5) { 1 } else { -1 };
    }
    input.rotate = rng.random_bool(0.02);
    input.drop = rng.random_bool(0.01);
    input
}

fn event_name(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::CountdownTick { .. } => "countdown_tick",
        GameEvent::BallLaunched { .. } => "ball_launched",
        GameEvent::PieceSpawned { .. } => "piece_spawned",
        GameEvent::PieceLocked { .. } => "piece_locked",
        GameEvent::PieceDestroyed { .. } => "piece_destroyed",
        GameEvent::BlockHit { .. } => "block_hit",
        GameEvent::PaddleHit { .. } => "paddle_hit",
        GameEvent::WallHit { .. } => "wall_hit",
        GameEvent::CeilingTeleport { .. } => "ceiling_teleport",
        GameEvent::LinesCleared { .. } => "lines_cleared",
        GameEvent::BallLost { .. } => "ball_lost",
        GameEvent::SessionEnded { .. } => "session_ended",
    }
}

fn main() {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let mut session = Session::from_settings(settings, clock_seed());
    let seed = session.state().seed;
    log::info!("Brickfall (headless) starting with seed {}", seed);

    let mut pilot_rng = Pcg32::seed_from_u64(seed ^ 0x5eed_0f_a11);
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut frames = 0;

    session.start();
    while !session.state().is_over() && frames < MAX_FRAMES {
        let input = autopilot(&session, &mut pilot_rng);
        session.tick_with(&input, FRAME_MS);
        frames += 1;

        for event in session.drain_events() {
            match &event {
                GameEvent::BlockHit { .. } | GameEvent::PaddleHit { .. } | GameEvent::WallHit { .. } => {
                    log::trace!("{:?}", event)
                }
                _ => log::debug!("{:?}", event),
            }
            *counts.entry(event_name(&event)).or_default() += 1;
        }
    }

    if !session.state().is_over() {
        log::info!("Stopped after {} frames without a winner", frames);
    }

    let state = session.state();
    let summary = serde_json::json!({
        "seed": seed,
        "frames": frames,
        "phase": state.phase,
        "outcome": state.outcome,
        "tetris_score": state.tetris_score,
        "breakout_score": state.breakout_score,
        "total_score": state.total_score(),
        "lives": state.lives,
        "blocks_left": state.grid.blocks().count(),
        "events": counts,
    });
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode summary: {}", e),
    }
}
