//! Read-only scene capture
//!
//! The simulation exposes its state to the renderer as a flat draw list:
//! capture never mutates game state, and the painter never reaches back
//! into the sim. Capture is pure and runs on any target; the actual canvas
//! painting lives in the wasm-only `canvas` submodule.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use crate::settings::{Theme, ThemeColors};
use crate::sim::state::{GameMode, GameState, MatchPhase, Side};

/// A filled axis-aligned rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: &'static str,
}

/// A filled circle with optional transparency
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCircle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub color: &'static str,
    pub alpha: f32,
}

/// Centered text
#[derive(Debug, Clone, PartialEq)]
pub struct SceneText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: &'static str,
}

/// One frame's draw list
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub background: &'static str,
    pub center_line: &'static str,
    pub rects: Vec<SceneRect>,
    pub circles: Vec<SceneCircle>,
    pub texts: Vec<SceneText>,
}

impl Scene {
    /// Snapshot the current match into a draw list using the active theme
    pub fn capture(state: &GameState, theme: Theme) -> Scene {
        let colors = theme.colors();
        let field = state.config.field;

        let mut scene = Scene {
            width: field.width,
            height: field.height,
            background: colors.background,
            center_line: colors.paddle,
            rects: Vec::new(),
            circles: Vec::new(),
            texts: Vec::new(),
        };

        for paddle in [&state.left, &state.right] {
            scene.rects.push(SceneRect {
                x: paddle.x,
                y: paddle.y,
                w: paddle.width,
                h: paddle.height,
                color: colors.paddle,
            });
        }

        for powerup in &state.powerups {
            scene.rects.push(SceneRect {
                x: powerup.pos.x,
                y: powerup.pos.y,
                w: powerup.size,
                h: powerup.size,
                color: colors.accent,
            });
        }

        for ball in std::iter::once(&state.ball).chain(state.extra_balls.iter()) {
            scene.circles.push(SceneCircle {
                x: ball.pos.x,
                y: ball.pos.y,
                r: ball.radius,
                color: colors.ball,
                alpha: 1.0,
            });
        }

        for particle in &state.particles {
            scene.circles.push(SceneCircle {
                x: particle.pos.x,
                y: particle.pos.y,
                r: particle.size,
                color: particle_color(&colors, particle.color),
                alpha: particle.life.clamp(0.0, 1.0),
            });
        }

        scene.texts.push(score_text(state, Side::Left, &colors));
        scene.texts.push(score_text(state, Side::Right, &colors));
        scene.texts.push(SceneText {
            text: caption(state),
            x: field.width / 2.0,
            y: 30.0,
            size: 16.0,
            color: colors.text,
        });

        if let Some(overlay) = overlay_text(state) {
            scene.texts.push(SceneText {
                text: overlay.to_string(),
                x: field.width / 2.0,
                y: field.height / 2.0 - 40.0,
                size: 32.0,
                color: colors.text,
            });
        }

        scene
    }
}

fn particle_color(colors: &ThemeColors, slot: u32) -> &'static str {
    match slot {
        0 => colors.paddle,
        1 => colors.ball,
        _ => colors.accent,
    }
}

fn score_text(state: &GameState, side: Side, colors: &ThemeColors) -> SceneText {
    let x = match side {
        Side::Left => state.config.field.width / 4.0,
        Side::Right => state.config.field.width * 3.0 / 4.0,
    };
    SceneText {
        text: state.score_for(side).to_string(),
        x,
        y: 60.0,
        size: 48.0,
        color: colors.text,
    }
}

fn caption(state: &GameState) -> String {
    match state.config.mode {
        GameMode::Single => format!(
            "Single Player - {}",
            state.config.difficulty.as_str().to_uppercase()
        ),
        GameMode::Multiplayer => "Two Players".to_string(),
    }
}

fn overlay_text(state: &GameState) -> Option<&'static str> {
    match state.phase {
        MatchPhase::NotStarted => Some("PRESS START"),
        MatchPhase::Paused => Some("PAUSED"),
        MatchPhase::Ended => Some(match (state.left.score, state.right.score) {
            (l, r) if l > r => "LEFT WINS",
            (l, r) if r > l => "RIGHT WINS",
            _ => "DRAW",
        }),
        MatchPhase::Running => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Config, MatchPhase};

    #[test]
    fn test_capture_has_expected_elements() {
        let state = GameState::new(Config::default(), 5);
        let scene = Scene::capture(&state, Theme::Retro);

        // Two paddles, one ball, scores + caption + start overlay
        assert_eq!(scene.rects.len(), 2);
        assert_eq!(scene.circles.len(), 1);
        assert_eq!(scene.texts.len(), 4);
        assert_eq!(scene.width, 800.0);
    }

    #[test]
    fn test_capture_is_pure() {
        let state = GameState::new(Config::default(), 5);
        let a = Scene::capture(&state, Theme::Neon);
        let b = Scene::capture(&state, Theme::Neon);
        assert_eq!(a, b);
    }

    #[test]
    fn test_theme_colors_applied() {
        let state = GameState::new(Config::default(), 5);
        let scene = Scene::capture(&state, Theme::Neon);
        assert_eq!(scene.background, "#000000");
        assert_eq!(scene.rects[0].color, "#00FFFF");
        assert_eq!(scene.circles[0].color, "#FF00FF");
    }

    #[test]
    fn test_overlay_follows_phase() {
        let mut state = GameState::new(Config::default(), 5);
        let overlay = |s: &GameState| {
            Scene::capture(s, Theme::Retro)
                .texts
                .last()
                .map(|t| t.text.clone())
        };

        assert_eq!(overlay(&state).as_deref(), Some("PRESS START"));
        state.phase = MatchPhase::Paused;
        assert_eq!(overlay(&state).as_deref(), Some("PAUSED"));
        state.phase = MatchPhase::Ended;
        state.left.score = 3;
        assert_eq!(overlay(&state).as_deref(), Some("LEFT WINS"));
    }

    #[test]
    fn test_scores_rendered_as_text() {
        let mut state = GameState::new(Config::default(), 5);
        state.left.score = 7;
        state.right.score = 12;
        let scene = Scene::capture(&state, Theme::Minimalist);
        assert!(scene.texts.iter().any(|t| t.text == "7"));
        assert!(scene.texts.iter().any(|t| t.text == "12"));
    }
}
