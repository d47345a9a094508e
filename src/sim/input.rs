//! Keyboard and touch input mapped to paddle intents
//!
//! Event handlers write only into this small state machine; the loop
//! driver samples it once per step. Holding a key keeps the intent until
//! release; pressing the opposite key overrides it; releasing the active
//! key while the opposite is still held falls back to it.
//!
//! In single-player mode the right paddle's manual input is resolved away
//! by the tick (the AI owns that paddle), so nothing here needs to know
//! the game mode.

use crate::sim::state::{Intent, Side};

/// Pressed state for one paddle's up/down pair
#[derive(Debug, Clone, Copy, Default)]
struct KeyPair {
    up: bool,
    down: bool,
    /// Most recently pressed of the two, for when both are held
    latest: Intent,
}

impl KeyPair {
    fn press(&mut self, intent: Intent) {
        match intent {
            Intent::Up => self.up = true,
            Intent::Down => self.down = true,
            Intent::None => return,
        }
        self.latest = intent;
    }

    fn release(&mut self, intent: Intent) {
        match intent {
            Intent::Up => self.up = false,
            Intent::Down => self.down = false,
            Intent::None => {}
        }
    }

    fn intent(&self) -> Intent {
        match (self.up, self.down) {
            (true, false) => Intent::Up,
            (false, true) => Intent::Down,
            (true, true) => self.latest,
            (false, false) => Intent::None,
        }
    }
}

/// Raw input state shared between event handlers and the loop driver
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: KeyPair,
    right: KeyPair,
    /// Active touch drives the left paddle and overrides its keys
    touch: Option<Intent>,
    /// One-shot: pause toggle requested (Escape / Space)
    pub pause_pressed: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key-down event. Unrecognized keys are ignored.
    pub fn key_down(&mut self, key: &str) {
        match key {
            "ArrowUp" => self.left.press(Intent::Up),
            "ArrowDown" => self.left.press(Intent::Down),
            "w" | "W" => self.right.press(Intent::Up),
            "s" | "S" => self.right.press(Intent::Down),
            "Escape" | " " => self.pause_pressed = true,
            _ => {}
        }
    }

    /// Feed a key-up event
    pub fn key_up(&mut self, key: &str) {
        match key {
            "ArrowUp" => self.left.release(Intent::Up),
            "ArrowDown" => self.left.release(Intent::Down),
            "w" | "W" => self.right.release(Intent::Up),
            "s" | "S" => self.right.release(Intent::Down),
            _ => {}
        }
    }

    /// A touch at vertical position `y`: top half of the field moves the
    /// left paddle up, bottom half moves it down.
    pub fn touch_at(&mut self, y: f32, field_height: f32) {
        self.touch = Some(if y < field_height / 2.0 {
            Intent::Up
        } else {
            Intent::Down
        });
    }

    pub fn touch_end(&mut self) {
        self.touch = None;
    }

    /// Current intent for a side's paddle
    pub fn intent_for(&self, side: Side) -> Intent {
        match side {
            Side::Left => self.touch.unwrap_or_else(|| self.left.intent()),
            Side::Right => self.right.intent(),
        }
    }

    /// Take the one-shot pause flag, clearing it
    pub fn take_pause(&mut self) -> bool {
        std::mem::take(&mut self.pause_pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_and_release() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        assert_eq!(input.intent_for(Side::Left), Intent::Up);
        // Held across any number of samples
        assert_eq!(input.intent_for(Side::Left), Intent::Up);
        input.key_up("ArrowUp");
        assert_eq!(input.intent_for(Side::Left), Intent::None);
    }

    #[test]
    fn test_opposite_key_overrides() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        input.key_down("ArrowDown");
        assert_eq!(input.intent_for(Side::Left), Intent::Down);
        // Releasing the override falls back to the still-held key
        input.key_up("ArrowDown");
        assert_eq!(input.intent_for(Side::Left), Intent::Up);
    }

    #[test]
    fn test_right_paddle_keys() {
        let mut input = InputState::new();
        input.key_down("w");
        assert_eq!(input.intent_for(Side::Right), Intent::Up);
        assert_eq!(input.intent_for(Side::Left), Intent::None);
        input.key_up("w");
        input.key_down("s");
        assert_eq!(input.intent_for(Side::Right), Intent::Down);
    }

    #[test]
    fn test_touch_maps_by_half() {
        let mut input = InputState::new();
        input.touch_at(50.0, 400.0);
        assert_eq!(input.intent_for(Side::Left), Intent::Up);
        input.touch_at(350.0, 400.0);
        assert_eq!(input.intent_for(Side::Left), Intent::Down);
        input.touch_end();
        assert_eq!(input.intent_for(Side::Left), Intent::None);
    }

    #[test]
    fn test_touch_overrides_keys() {
        let mut input = InputState::new();
        input.key_down("ArrowDown");
        input.touch_at(10.0, 400.0);
        assert_eq!(input.intent_for(Side::Left), Intent::Up);
        input.touch_end();
        assert_eq!(input.intent_for(Side::Left), Intent::Down);
    }

    #[test]
    fn test_pause_is_one_shot() {
        let mut input = InputState::new();
        input.key_down("Escape");
        assert!(input.take_pause());
        assert!(!input.take_pause());
        input.key_down(" ");
        assert!(input.take_pause());
    }
}
