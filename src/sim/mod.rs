//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod input;
pub mod state;
pub mod tick;

pub use ai::ai_intent;
pub use collision::{Aabb, Wall, reflect_velocity, wall_contact};
pub use input::InputState;
pub use state::{
    ActiveEffects, Ball, Config, Difficulty, Field, GameEvent, GameMode, GameState, Intent,
    MatchPhase, Paddle, Particle, PowerUp, PowerUpKind, Side,
};
pub use tick::{FixedTimestep, TickInput, tick};
