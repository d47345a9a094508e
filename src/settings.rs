//! Game settings and preferences
//!
//! Persisted separately from the match state in LocalStorage. Everything
//! the menu screens can change lives here; the simulation only sees the
//! [`Config`] derived at match start.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::state::{Config, Difficulty, Field, GameMode};

/// Color palette applied at scene capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub background: &'static str,
    pub paddle: &'static str,
    pub ball: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

/// Visual themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Retro,
    Neon,
    Minimalist,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Retro => "retro",
            Theme::Neon => "neon",
            Theme::Minimalist => "minimalist",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "retro" => Some(Theme::Retro),
            "neon" => Some(Theme::Neon),
            "minimalist" | "minimal" => Some(Theme::Minimalist),
            _ => None,
        }
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            Theme::Retro => ThemeColors {
                background: "#000000",
                paddle: "#FFFFFF",
                ball: "#FFFFFF",
                text: "#FFFFFF",
                accent: "#FFD700",
            },
            Theme::Neon => ThemeColors {
                background: "#000000",
                paddle: "#00FFFF",
                ball: "#FF00FF",
                text: "#FFFFFF",
                accent: "#00FF00",
            },
            Theme::Minimalist => ThemeColors {
                background: "#FFFFFF",
                paddle: "#000000",
                ball: "#000000",
                text: "#000000",
                accent: "#555555",
            },
        }
    }
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub difficulty: Difficulty,
    pub mode: GameMode,

    // === Gameplay sliders ===
    /// Serve speed (px/s)
    pub ball_speed: f32,
    pub paddle_height: f32,
    pub powerups: bool,
    /// First to this many points wins; `None` plays unbounded
    pub win_score: Option<u32>,

    // === Audio ===
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when the window loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Retro,
            difficulty: Difficulty::Medium,
            mode: GameMode::Single,

            ball_speed: BALL_BASE_SPEED,
            paddle_height: PADDLE_HEIGHT,
            powerups: true,
            win_score: None,

            sound_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            show_fps: false,
        }
    }
}

impl Settings {
    /// Clamp slider values into their valid ranges. A hand-edited or stale
    /// LocalStorage blob must never feed NaN or zero-height paddles into
    /// the sim.
    pub fn sanitized(mut self) -> Self {
        self.ball_speed = finite_or(self.ball_speed, BALL_BASE_SPEED).clamp(120.0, 900.0);
        self.paddle_height =
            finite_or(self.paddle_height, PADDLE_HEIGHT).clamp(MIN_PADDLE_HEIGHT, FIELD_HEIGHT / 2.0);
        self.master_volume = finite_or(self.master_volume, 0.8).clamp(0.0, 1.0);
        self.sfx_volume = finite_or(self.sfx_volume, 1.0).clamp(0.0, 1.0);
        self
    }

    /// Build the simulation config for a new match
    pub fn to_config(&self) -> Config {
        Config {
            field: Field::default(),
            mode: self.mode,
            difficulty: self.difficulty,
            base_ball_speed: self.ball_speed,
            ball_radius: BALL_RADIUS,
            paddle_height: self.paddle_height,
            paddle_speed: PADDLE_SPEED,
            win_score: self.win_score,
            powerups_enabled: self.powerups,
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "canvas_pong_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Settings>(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings.sanitized();
                    }
                    Err(e) => log::warn!("Discarding corrupt settings blob: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_sliders() {
        let settings = Settings {
            ball_speed: f32::NAN,
            paddle_height: 0.0,
            master_volume: 7.0,
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(settings.ball_speed, BALL_BASE_SPEED);
        assert_eq!(settings.paddle_height, MIN_PADDLE_HEIGHT);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_to_config_carries_choices() {
        let settings = Settings {
            mode: GameMode::Multiplayer,
            difficulty: Difficulty::Hard,
            ball_speed: 360.0,
            powerups: false,
            win_score: Some(11),
            ..Settings::default()
        };
        let config = settings.to_config();

        assert_eq!(config.mode, GameMode::Multiplayer);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.base_ball_speed, 360.0);
        assert!(!config.powerups_enabled);
        assert_eq!(config.win_score, Some(11));
    }

    #[test]
    fn test_theme_round_trip() {
        for theme in [Theme::Retro, Theme::Neon, Theme::Minimalist] {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("vaporwave"), None);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = Settings {
            theme: Theme::Neon,
            win_score: Some(5),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.theme, Theme::Neon);
        assert_eq!(back.win_score, Some(5));
    }
}
