//! Canvas Pong - classic two-paddle Pong for the browser
//!
//! Core modules:
//! - `sim`: deterministic simulation (input intents, AI, physics, match state)
//! - `render`: read-only scene capture consumed by the canvas painter
//! - `settings`: player preferences persisted to LocalStorage
//! - `highscores`: local leaderboard

pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use highscores::HighScores;
pub use settings::{Settings, Theme};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;

    /// Field dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 400.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 10.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const PADDLE_SPEED: f32 = 480.0;
    /// Inset of each paddle's back edge from its wall
    pub const PADDLE_MARGIN: f32 = 10.0;
    /// Smallest paddle height the settings slider can produce
    pub const MIN_PADDLE_HEIGHT: f32 = 40.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_BASE_SPEED: f32 = 300.0;
    /// Rally ramp: speed added per consecutive paddle hit, and its cap
    pub const RALLY_SPEED_STEP: f32 = 6.0;
    pub const RALLY_SPEED_BONUS_MAX: f32 = 180.0;
    /// Serve angle spread around horizontal (±22.5°)
    pub const SERVE_ANGLE_SPREAD: f32 = std::f32::consts::FRAC_PI_8;

    /// Extra vertical velocity imparted at the paddle's very edge (px/s)
    pub const SPIN_MAX: f32 = 120.0;
    /// Geometric spin decay per step
    pub const SPIN_DECAY: f32 = 0.95;

    /// Global speed ramp: +0.1 every 10 seconds of play, capped at 2x
    pub const SPEED_RAMP_INTERVAL_TICKS: u64 = 600;
    pub const SPEED_RAMP_STEP: f32 = 0.1;
    pub const SPEED_MULTIPLIER_MAX: f32 = 2.0;

    /// Sudden death: both sides at this score triggers a one-time boost
    pub const SUDDEN_DEATH_SCORE: u32 = 10;
    pub const SUDDEN_DEATH_BOOST: f32 = 1.5;

    /// Dead zone around the AI's tracked target (px)
    pub const AI_DEAD_ZONE: f32 = 10.0;

    /// Multiball cap (canonical ball plus extras)
    pub const MAX_BALLS: usize = 3;

    /// Power-ups
    pub const POWERUP_SPAWN_INTERVAL_TICKS: u64 = 900;
    pub const POWERUP_LIFETIME_TICKS: u32 = 600;
    pub const POWERUP_EFFECT_TICKS: u32 = 600;
    pub const MAX_ACTIVE_POWERUPS: usize = 3;
    pub const POWERUP_SIZE: f32 = 20.0;
    pub const WIDEN_FACTOR: f32 = 1.5;
    pub const FAST_BALL_FACTOR: f32 = 1.5;

    /// Maximum cosmetic particles
    pub const MAX_PARTICLES: usize = 256;
}
