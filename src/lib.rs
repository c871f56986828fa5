//! Alien Invaders - a marching-formation arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wave controller, session state machine)
//! - `config`: Immutable game configuration
//! - `platform`: Input query abstraction and edge-triggered keys
//! - `renderer`: Draw-surface abstraction and drawable descriptors
//! - `audio`: Sound triggers and channel attach/detach

pub mod audio;
pub mod config;
pub mod platform;
pub mod renderer;
pub mod sim;

pub use audio::{AudioSink, SoundEffect};
pub use config::{ConfigError, GameConfig};
pub use platform::{EdgeTrigger, InputState, Key, KeyboardState};
pub use renderer::{DrawSurface, Drawable};
pub use sim::{SessionController, SessionState, WaveSimulation};

/// Game configuration constants (defaults for [`GameConfig`])
pub mod consts {
    /// Play field dimensions
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 700.0;

    /// Ship defaults
    pub const SHIP_WIDTH: f32 = 44.0;
    pub const SHIP_HEIGHT: f32 = 44.0;
    /// Distance from the bottom of the screen to the ship's bottom edge
    pub const SHIP_BOTTOM: f32 = 32.0;
    /// Pixels per frame while a direction key is held
    pub const SHIP_MOVEMENT: f32 = 5.0;
    pub const SHIP_LIVES: u32 = 3;

    /// Height of the line the aliens must not cross
    pub const DEFENSE_LINE: f32 = 100.0;

    /// Alien defaults
    pub const ALIEN_WIDTH: f32 = 33.0;
    pub const ALIEN_HEIGHT: f32 = 33.0;
    pub const ALIEN_H_SEP: f32 = 16.0;
    pub const ALIEN_V_SEP: f32 = 16.0;
    /// Gap between the top row and the top of the screen
    pub const ALIEN_CEILING: f32 = 100.0;
    pub const ALIEN_ROWS: usize = 5;
    pub const ALIENS_IN_ROW: usize = 12;
    pub const ALIEN_H_WALK: f32 = 8.0; // ALIEN_WIDTH / 4, truncated
    pub const ALIEN_V_WALK: f32 = 16.0; // ALIEN_HEIGHT / 2, truncated
    /// Seconds between march steps at the start of a wave
    pub const ALIEN_SPEED: f32 = 1.0;
    /// March interval multiplier applied on every kill
    pub const ALIEN_SPEEDUP: f32 = 0.98;

    /// Bolt defaults
    pub const BOLT_WIDTH: f32 = 4.0;
    pub const BOLT_HEIGHT: f32 = 16.0;
    /// Pixels per frame
    pub const BOLT_SPEED: f32 = 10.0;
    /// Upper bound of the random march-step count between alien volleys
    pub const BOLT_RATE: u32 = 5;

    /// Points per kill are `KILL_POINTS * (rows - row_index)`
    pub const KILL_POINTS: u64 = 100;
}

/// Clamp a frame delta to a usable value (negative or non-finite becomes 0)
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.max(0.0) } else { 0.0 }
}
