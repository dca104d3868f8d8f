//! Gameplay settings
//!
//! Loaded from an optional JSON file; any missing field takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Ball speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BallSpeedPreset {
    #[default]
    Desktop,
    /// 25% slower, for small touch screens
    Mobile,
}

impl BallSpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallSpeedPreset::Desktop => "Desktop",
            BallSpeedPreset::Mobile => "Mobile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" | "normal" => Some(BallSpeedPreset::Desktop),
            "mobile" | "touch" => Some(BallSpeedPreset::Mobile),
            _ => None,
        }
    }

    /// Per-axis launch speed in units per tick
    pub fn speed(&self) -> f32 {
        match self {
            BallSpeedPreset::Desktop => BALL_SPEED,
            BallSpeedPreset::Mobile => MOBILE_BALL_SPEED,
        }
    }
}

/// Session tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ball_speed: BallSpeedPreset,
    /// Balls available at the start of a session
    pub starting_lives: u8,
    /// Milliseconds between automatic piece drops
    pub fall_interval_ms: f32,
    /// Length of the pre-launch countdown in seconds
    pub countdown_secs: u8,
    /// Fixed RNG seed; None picks one at startup
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_speed: BallSpeedPreset::Desktop,
            starting_lives: STARTING_LIVES,
            fall_interval_ms: FALL_INTERVAL_MS,
            countdown_secs: COUNTDOWN_SECS,
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a speed preset
    pub fn from_preset(preset: BallSpeedPreset) -> Self {
        Self {
            ball_speed: preset,
            ..Self::default()
        }
    }

    pub fn base_ball_speed(&self) -> f32 {
        self.ball_speed.speed()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings {}: {}", path.display(), e),
            },
            Err(e) => log::info!("No settings at {} ({}), using defaults", path.display(), e),
        }
        Self::default()
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
