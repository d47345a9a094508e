//! Match state and core simulation types
//!
//! Everything the physics step reads and mutates lives in one aggregate,
//! [`GameState`], owned by the loop driver. Event handlers never touch it
//! directly; they only flip intent flags that the driver samples once per
//! step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Which side of the court a paddle defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A paddle's desired movement for the current step, set by input or AI and
/// consumed once by the physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Intent {
    Up,
    Down,
    #[default]
    None,
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    /// Only reachable when a win score is configured
    Ended,
}

/// Who drives the right paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Single,
    Multiplayer,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Single => "single",
            GameMode::Multiplayer => "multiplayer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(GameMode::Single),
            "multiplayer" | "multi" => Some(GameMode::Multiplayer),
            _ => None,
        }
    }
}

/// AI strength, fixed per match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Fraction of full paddle speed the AI is allowed to use
    pub fn ai_speed_factor(self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Medium => 0.7,
            Difficulty::Hard => 0.9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Discrete events emitted by the physics step, drained once per frame by
/// the shell and fanned out to audio/HUD collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    WallHit,
    PaddleHit(Side),
    /// The named side scored a point
    Score(Side),
    PowerUpSpawned,
    PowerUpCollected(PowerUpKind),
    /// The named side reached the configured win score
    MatchOver(Side),
}

/// Playfield dimensions, fixed for the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

impl Field {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Simulation parameters chosen before a match starts.
///
/// Built from [`crate::Settings`] by the shell; the sim never reads
/// LocalStorage itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub field: Field,
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Serve speed magnitude (px/s)
    pub base_ball_speed: f32,
    pub ball_radius: f32,
    pub paddle_height: f32,
    pub paddle_speed: f32,
    /// `None` keeps the canonical unbounded-score behavior
    pub win_score: Option<u32>,
    pub powerups_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field: Field::default(),
            mode: GameMode::default(),
            difficulty: Difficulty::default(),
            base_ball_speed: BALL_BASE_SPEED,
            ball_radius: BALL_RADIUS,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            win_score: None,
            powerups_enabled: true,
        }
    }
}

impl Config {
    /// Clamp away NaN and non-positive dimensions that a misconfigured
    /// settings blob could produce. All failures are local; nothing here is
    /// fatal to the frame loop.
    pub fn sanitized(mut self) -> Self {
        self.field.width = finite_or(self.field.width, FIELD_WIDTH).max(100.0);
        self.field.height = finite_or(self.field.height, FIELD_HEIGHT).max(100.0);
        self.base_ball_speed = finite_or(self.base_ball_speed, BALL_BASE_SPEED).max(60.0);
        self.ball_radius = finite_or(self.ball_radius, BALL_RADIUS).clamp(2.0, 40.0);
        self.paddle_height = finite_or(self.paddle_height, PADDLE_HEIGHT)
            .clamp(MIN_PADDLE_HEIGHT, self.field.height / 2.0);
        self.paddle_speed = finite_or(self.paddle_speed, PADDLE_SPEED).max(60.0);
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// A ball in play
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Auxiliary vertical velocity from paddle contact, decays each step
    pub spin: f32,
    /// Speed magnitude, decoupled from `vel` so rally ramping can re-derive
    /// the velocity without changing direction
    pub speed: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            spin: 0.0,
            speed,
        }
    }
}

/// One of the two paddles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Horizontal position is fixed per side
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub intent: Intent,
    pub score: u32,
}

impl Paddle {
    pub fn new(side: Side, field: &Field, height: f32, speed: f32) -> Self {
        let x = match side {
            Side::Left => PADDLE_MARGIN,
            Side::Right => field.width - PADDLE_MARGIN - PADDLE_WIDTH,
        };
        Self {
            side,
            x,
            y: (field.height - height) / 2.0,
            width: PADDLE_WIDTH,
            height,
            speed,
            intent: Intent::None,
            score: 0,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// X coordinate of the face toward the court center
    pub fn face_x(&self) -> f32 {
        match self.side {
            Side::Left => self.x + self.width,
            Side::Right => self.x,
        }
    }

    /// True when the ball center's vertical position is within the paddle
    /// band. The overlap test uses the ball center, not the ball edge.
    pub fn covers_y(&self, ball_y: f32) -> bool {
        ball_y > self.y && ball_y < self.y + self.height
    }

    pub fn as_aabb(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// Keep the paddle fully inside the field
    pub fn clamp_to(&mut self, field: &Field) {
        self.y = self.y.clamp(0.0, field.height - self.height);
    }

    pub fn recenter(&mut self, field: &Field) {
        self.y = (field.height - self.height) / 2.0;
    }
}

/// Power-up kinds, spawned on the field and collected by a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    WidenPaddle,
    FastBall,
    ExtraBall,
}

/// A power-up pickup waiting on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
    pub ttl_ticks: u32,
}

impl PowerUp {
    pub fn as_aabb(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.size, self.size)
    }
}

/// Timed power-up effects, recomputed against the base config each tick so
/// expiry needs no restore bookkeeping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub widen_left: u32,
    pub widen_right: u32,
    pub fast_ball: u32,
}

impl ActiveEffects {
    pub fn widen_for(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.widen_left,
            Side::Right => self.widen_right,
        }
    }

    pub fn decay(&mut self) {
        self.widen_left = self.widen_left.saturating_sub(1);
        self.widen_right = self.widen_right.saturating_sub(1);
        self.fast_ball = self.fast_ball.saturating_sub(1);
    }
}

/// A cosmetic particle; never gameplay-affecting
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Palette slot resolved at scene capture (0 = paddle, 1 = ball, 2 = accent)
    pub color: u32,
    pub life: f32,
    pub size: f32,
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub config: Config,
    /// Match seed for reproducible serves
    pub seed: u64,
    pub phase: MatchPhase,
    /// Simulation tick counter; advances only while Running
    pub time_ticks: u64,
    pub ball: Ball,
    /// Multiball extras; despawned on out-of-bounds instead of resetting
    pub extra_balls: Vec<Ball>,
    pub left: Paddle,
    pub right: Paddle,
    /// Consecutive paddle hits since the last score
    pub rally: u32,
    pub max_rally: u32,
    /// Global time-ramp multiplier applied to ball displacement
    pub speed_multiplier: f32,
    pub sudden_death: bool,
    /// Which paddle last touched a ball (power-ups apply to this side)
    pub last_hitter: Option<Side>,
    pub powerups: Vec<PowerUp>,
    pub effects: ActiveEffects,
    /// Visual particles
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new match in the NotStarted phase with the given seed
    pub fn new(config: Config, seed: u64) -> Self {
        let config = config.sanitized();
        let field = config.field;
        let mut state = Self {
            left: Paddle::new(Side::Left, &field, config.paddle_height, config.paddle_speed),
            right: Paddle::new(Side::Right, &field, config.paddle_height, config.paddle_speed),
            ball: Ball::new(field.center(), config.ball_radius, config.base_ball_speed),
            extra_balls: Vec::new(),
            seed,
            phase: MatchPhase::NotStarted,
            time_ticks: 0,
            rally: 0,
            max_rally: 0,
            speed_multiplier: 1.0,
            sudden_death: false,
            last_hitter: None,
            powerups: Vec::new(),
            effects: ActiveEffects::default(),
            particles: Vec::new(),
            events: Vec::new(),
            config,
        };
        state.reset_ball();
        state
    }

    /// Derive a fresh RNG from the match seed and current tick, so state
    /// stays serializable and a replay from the same seed reproduces every
    /// serve.
    pub(crate) fn derived_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.time_ticks.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Re-center the canonical ball and serve it with a randomized
    /// direction: speed magnitude equals the configured base speed, the
    /// horizontal sign is uniform at random, and the angle stays within
    /// ±22.5° of horizontal so serves are never near-vertical.
    pub fn reset_ball(&mut self) {
        let mut rng = self.derived_rng();
        self.ball.pos = self.config.field.center();
        self.ball.spin = 0.0;
        self.ball.speed = self.config.base_ball_speed;
        self.rally = 0;

        let angle: f32 = rng.random_range(-SERVE_ANGLE_SPREAD..SERVE_ANGLE_SPREAD);
        let dir_x: f32 = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.ball.vel = Vec2::new(angle.cos() * dir_x, angle.sin()) * self.ball.speed;
    }

    /// Re-center both paddles vertically
    pub fn reset_paddles(&mut self) {
        let field = self.config.field;
        self.left.recenter(&field);
        self.right.recenter(&field);
    }

    /// Begin the match (from the menu or after a finished game)
    pub fn start(&mut self) {
        match self.phase {
            MatchPhase::NotStarted => self.phase = MatchPhase::Running,
            MatchPhase::Ended => self.restart(),
            _ => {}
        }
    }

    /// Zero the scores and serve fresh; keeps the configuration
    pub fn restart(&mut self) {
        self.left.score = 0;
        self.right.score = 0;
        self.left.intent = Intent::None;
        self.right.intent = Intent::None;
        self.max_rally = 0;
        self.speed_multiplier = 1.0;
        self.sudden_death = false;
        self.last_hitter = None;
        self.extra_balls.clear();
        self.powerups.clear();
        self.effects = ActiveEffects::default();
        self.particles.clear();
        self.reset_paddles();
        self.reset_ball();
        self.phase = MatchPhase::Running;
    }

    pub fn score_for(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left.score,
            Side::Right => self.right.score,
        }
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Total balls in play
    pub fn ball_count(&self) -> usize {
        1 + self.extra_balls.len()
    }

    /// Hand the events accumulated since the last drain to the caller
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
