//! Game configuration
//!
//! One immutable value handed to every wave, so tests can build independent
//! configurations instead of patching globals. Loadable from JSON; missing
//! fields fall back to [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Dimensions, speeds and rates for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Play field ===
    pub game_width: f32,
    pub game_height: f32,
    pub defense_line: f32,

    // === Ship ===
    pub ship_width: f32,
    pub ship_height: f32,
    pub ship_bottom: f32,
    pub ship_movement: f32,
    pub ship_lives: u32,

    // === Aliens ===
    pub alien_width: f32,
    pub alien_height: f32,
    pub alien_h_sep: f32,
    pub alien_v_sep: f32,
    pub alien_ceiling: f32,
    pub alien_rows: usize,
    pub aliens_in_row: usize,
    pub alien_h_walk: f32,
    pub alien_v_walk: f32,
    /// Base march interval in seconds
    pub alien_speed: f32,
    /// Multiplier applied to the march interval on every kill
    pub alien_speedup: f32,

    // === Bolts ===
    pub bolt_width: f32,
    pub bolt_height: f32,
    pub bolt_speed: f32,
    pub bolt_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_width: GAME_WIDTH,
            game_height: GAME_HEIGHT,
            defense_line: DEFENSE_LINE,

            ship_width: SHIP_WIDTH,
            ship_height: SHIP_HEIGHT,
            ship_bottom: SHIP_BOTTOM,
            ship_movement: SHIP_MOVEMENT,
            ship_lives: SHIP_LIVES,

            alien_width: ALIEN_WIDTH,
            alien_height: ALIEN_HEIGHT,
            alien_h_sep: ALIEN_H_SEP,
            alien_v_sep: ALIEN_V_SEP,
            alien_ceiling: ALIEN_CEILING,
            alien_rows: ALIEN_ROWS,
            aliens_in_row: ALIENS_IN_ROW,
            alien_h_walk: ALIEN_H_WALK,
            alien_v_walk: ALIEN_V_WALK,
            alien_speed: ALIEN_SPEED,
            alien_speedup: ALIEN_SPEEDUP,

            bolt_width: BOLT_WIDTH,
            bolt_height: BOLT_HEIGHT,
            bolt_speed: BOLT_SPEED,
            bolt_rate: BOLT_RATE,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)
            .inspect_err(|e| log::warn!("Rejected config {}: {e}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON (handy for writing a starter config)
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the values describe a playable field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alien_rows == 0 || self.aliens_in_row == 0 {
            return Err(invalid("alien grid must have at least one row and column"));
        }
        if self.bolt_rate == 0 {
            return Err(invalid("bolt_rate must be at least 1"));
        }
        let positive = [
            ("game_width", self.game_width),
            ("game_height", self.game_height),
            ("ship_width", self.ship_width),
            ("ship_height", self.ship_height),
            ("ship_movement", self.ship_movement),
            ("alien_width", self.alien_width),
            ("alien_height", self.alien_height),
            ("alien_h_walk", self.alien_h_walk),
            ("alien_v_walk", self.alien_v_walk),
            ("alien_speed", self.alien_speed),
            ("bolt_width", self.bolt_width),
            ("bolt_height", self.bolt_height),
            ("bolt_speed", self.bolt_speed),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(invalid(format!("{name} must be a positive number")));
        }
        let non_negative = [
            ("alien_h_sep", self.alien_h_sep),
            ("alien_v_sep", self.alien_v_sep),
        ];
        if let Some((name, _)) = non_negative.iter().find(|(_, v)| !(v.is_finite() && *v >= 0.0)) {
            return Err(invalid(format!("{name} must not be negative")));
        }
        if !(self.alien_speedup > 0.0 && self.alien_speedup <= 1.0) {
            return Err(invalid("alien_speedup must be in (0, 1]"));
        }
        if self.ship_width > self.game_width {
            return Err(invalid("ship is wider than the play field"));
        }
        if self.grid_width() > self.game_width {
            return Err(invalid(format!(
                "alien grid ({} px) does not fit the play width ({} px)",
                self.grid_width(),
                self.game_width
            )));
        }
        Ok(())
    }

    /// Horizontal span of a full row including the outer margins
    pub fn grid_width(&self) -> f32 {
        self.aliens_in_row as f32 * (self.alien_width + self.alien_h_sep) + self.alien_h_sep
    }

    /// Centre of the ship at spawn
    pub fn ship_spawn(&self) -> glam::Vec2 {
        glam::Vec2::new(self.game_width / 2.0, self.ship_bottom + self.ship_height / 2.0)
    }

    /// Vertical centre of the alien row `row` (row 0 is the top row)
    pub fn alien_row_y(&self, row: usize) -> f32 {
        self.game_height
            - self.alien_ceiling
            - row as f32 * (self.alien_height + self.alien_v_sep)
            - self.alien_height / 2.0
    }

    /// Horizontal centre of the alien column `col` at wave start
    pub fn alien_col_x(&self, col: usize) -> f32 {
        col as f32 * (self.alien_h_sep + self.alien_width) + self.alien_h_sep + self.alien_width / 2.0
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(reason.into())
}
