//! Canvas Pong entry point
//!
//! Handles platform-specific initialization and runs the game loop: a
//! requestAnimationFrame-driven shell in the browser, and a headless
//! AI-vs-AI demo match on native for smoke testing the simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, TouchEvent};

    use canvas_pong::audio::{AudioManager, SoundEffect};
    use canvas_pong::consts::*;
    use canvas_pong::highscores::HighScores;
    use canvas_pong::render::Scene;
    use canvas_pong::render::canvas::CanvasPainter;
    use canvas_pong::settings::Settings;
    use canvas_pong::sim::{
        Difficulty, FixedTimestep, GameEvent, GameMode, GameState, InputState, MatchPhase, Side,
        TickInput, tick,
    };
    use canvas_pong::Theme;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: InputState,
        /// One-shot flags written by buttons, consumed by the next step
        pending: TickInput,
        timestep: FixedTimestep,
        settings: Settings,
        highscores: HighScores,
        audio: AudioManager,
        painter: Option<CanvasPainter>,
        last_time: f64,
        /// Attract mode: AI plays both paddles
        demo: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings, highscores: HighScores) -> Self {
            let seed = js_sys::Date::now() as u64;
            Self {
                state: GameState::new(settings.to_config(), seed),
                input: InputState::new(),
                pending: TickInput::default(),
                timestep: FixedTimestep::new(),
                settings,
                highscores,
                audio: AudioManager::new(),
                painter: None,
                last_time: 0.0,
                demo: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Build a fresh match from the latest settings and start it
        fn start_match(&mut self) {
            let seed = js_sys::Date::now() as u64;
            self.state = GameState::new(self.settings.to_config(), seed);
            self.timestep.reset();
            self.pending.start = true;
            log::info!("Match started (seed {seed})");
        }

        /// Run zero or more fixed simulation steps for this frame
        fn update(&mut self, dt: f64, time: f64) {
            let steps = self.timestep.advance(dt as f32);
            for _ in 0..steps {
                let input = TickInput {
                    left_intent: self.input.intent_for(Side::Left),
                    right_intent: self.input.intent_for(Side::Right),
                    start: self.pending.start,
                    pause: self.pending.pause || self.input.take_pause(),
                    restart: self.pending.restart,
                    demo: self.demo,
                };
                tick(&mut self.state, &input, SIM_DT);
                self.pending.clear_one_shots();
            }

            // Track frame times for the FPS readout
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 {
                let elapsed = time - oldest;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            self.handle_events();
        }

        /// Fan simulation events out to audio, HUD, and the leaderboard
        fn handle_events(&mut self) {
            for event in self.state.take_events() {
                if self.settings.sound_enabled {
                    if let Some(effect) = SoundEffect::for_event(&event) {
                        self.audio.play(effect);
                    }
                }
                if let GameEvent::MatchOver(side) = event {
                    let score = self.state.score_for(side);
                    let rank = self.highscores.add_score(
                        score,
                        self.state.max_rally,
                        self.state.config.mode,
                        js_sys::Date::now(),
                    );
                    self.highscores.save();
                    match rank {
                        Some(rank) => log::info!(
                            "match over: {} wins {} - leaderboard rank {rank}",
                            side.as_str(),
                            score
                        ),
                        None => log::info!("match over: {} wins {}", side.as_str(), score),
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&self) {
            if let Some(painter) = &self.painter {
                painter.draw(&Scene::capture(&self.state, self.settings.theme));
            }
        }

        /// Update HUD elements in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.get_element_by_id("leftScore") {
                el.set_text_content(Some(&self.state.left.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("rightScore") {
                el.set_text_content(Some(&self.state.right.score.to_string()));
            }
            if let Some(el) = document.get_element_by_id("rallyDisplay") {
                el.set_text_content(Some(&format!(
                    "Rally: {}  Max: {}",
                    self.state.rally, self.state.max_rally
                )));
            }
            if self.settings.show_fps {
                if let Some(el) = document.get_element_by_id("fpsDisplay") {
                    el.set_text_content(Some(&self.fps.to_string()));
                }
            }

            set_screen_visible(&document, "startScreen", self.state.phase == MatchPhase::NotStarted);
            set_screen_visible(&document, "pauseScreen", self.state.phase == MatchPhase::Paused);
            set_screen_visible(&document, "gameOverScreen", self.state.phase == MatchPhase::Ended);
        }
    }

    fn set_screen_visible(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "screen" } else { "screen hidden" });
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Canvas Pong starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load().sanitized();
        let highscores = HighScores::load();
        let mut game = Game::new(settings, highscores);
        game.painter = Some(CanvasPainter::new(ctx));
        let game = Rc::new(RefCell::new(game));

        setup_keyboard(game.clone());
        setup_touch(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_sliders(game.clone());
        setup_focus_handlers(game.clone());

        request_animation_frame(game);

        log::info!("Canvas Pong running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                // Keep arrows and space from scrolling the page
                if matches!(key.as_str(), "ArrowUp" | "ArrowDown" | " ") {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                match key.as_str() {
                    "i" | "I" => {
                        g.demo = !g.demo;
                        log::info!("Demo mode: {}", g.demo);
                    }
                    _ => g.input.key_down(&key),
                }
                // Any keypress is a gesture that may unlock audio
                g.audio.resume();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Map a touch's client Y into field coordinates
    fn touch_field_y(canvas: &HtmlCanvasElement, touch: &web_sys::Touch) -> f32 {
        let rect = canvas.get_bounding_client_rect();
        let height = rect.height().max(1.0);
        ((touch.client_y() as f64 - rect.top()) / height) as f32 * FIELD_HEIGHT
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        for event_name in ["touchstart", "touchmove"] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let y = touch_field_y(&canvas_clone, &touch);
                    let mut g = game.borrow_mut();
                    g.input.touch_at(y, FIELD_HEIGHT);
                    g.audio.resume();
                }
            });
            let _ =
                canvas.add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                game.borrow_mut().input.touch_end();
            });
            let _ =
                canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Attach a click handler to a single element by id
    fn on_click(game: &Rc<RefCell<Game>>, id: &str, apply: fn(&mut Game)) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id(id) {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                apply(&mut g);
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Attach click handlers to a selector group carrying a data attribute,
    /// moving the `active` class to the clicked element
    fn setup_button_group(
        game: Rc<RefCell<Game>>,
        selector: &'static str,
        attr: &'static str,
        apply: fn(&mut Game, &str),
    ) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Ok(list) = document.query_selector_all(selector) else {
            return;
        };
        for i in 0..list.length() {
            let Some(el) = list
                .item(i)
                .and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            let game = game.clone();
            let clicked = el.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Some(value) = clicked.get_attribute(attr) {
                    let mut g = game.borrow_mut();
                    apply(&mut g, &value);
                    g.settings.save();
                }
                let document = web_sys::window().unwrap().document().unwrap();
                if let Ok(list) = document.query_selector_all(selector) {
                    for j in 0..list.length() {
                        if let Some(other) = list
                            .item(j)
                            .and_then(|n| n.dyn_into::<web_sys::Element>().ok())
                        {
                            let _ = other.class_list().remove_1("active");
                        }
                    }
                }
                let _ = clicked.class_list().add_1("active");
            });
            let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click(&game, "startButton", |g| g.start_match());
        on_click(&game, "resumeButton", |g| g.pending.pause = true);
        on_click(&game, "restartButton", |g| g.pending.restart = true);
        on_click(&game, "playAgainButton", |g| g.start_match());

        setup_button_group(game.clone(), ".game-mode-button", "data-mode", |g, value| {
            if let Some(mode) = GameMode::from_str(value) {
                g.settings.mode = mode;
            }
        });
        setup_button_group(
            game.clone(),
            ".difficulty-button",
            "data-difficulty",
            |g, value| {
                if let Some(difficulty) = Difficulty::from_str(value) {
                    g.settings.difficulty = difficulty;
                }
            },
        );
        setup_button_group(game, ".theme-button", "data-theme", |g, value| {
            if let Some(theme) = Theme::from_str(value) {
                g.settings.theme = theme;
            }
        });
    }

    fn setup_sliders(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        // Master volume slider (0-100)
        if let Some(el) = document.get_element_by_id("volumeSlider") {
            if let Ok(slider) = el.dyn_into::<web_sys::HtmlInputElement>() {
                let game = game.clone();
                let slider_clone = slider.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    if let Ok(value) = slider_clone.value().parse::<f32>() {
                        let mut g = game.borrow_mut();
                        g.settings.master_volume = (value / 100.0).clamp(0.0, 1.0);
                        g.audio.set_master_volume(g.settings.master_volume);
                        g.settings.save();
                    }
                });
                let _ =
                    slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Ball speed slider (px/s)
        if let Some(el) = document.get_element_by_id("ballSpeedSlider") {
            if let Ok(slider) = el.dyn_into::<web_sys::HtmlInputElement>() {
                let game = game.clone();
                let slider_clone = slider.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    if let Ok(value) = slider_clone.value().parse::<f32>() {
                        let mut g = game.borrow_mut();
                        g.settings.ball_speed = value;
                        g.settings = g.settings.clone().sanitized();
                        g.settings.save();
                    }
                });
                let _ =
                    slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Paddle size slider
        if let Some(el) = document.get_element_by_id("paddleSizeSlider") {
            if let Ok(slider) = el.dyn_into::<web_sys::HtmlInputElement>() {
                let game = game.clone();
                let slider_clone = slider.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    if let Ok(value) = slider_clone.value().parse::<f32>() {
                        let mut g = game.borrow_mut();
                        g.settings.paddle_height = value;
                        g.settings = g.settings.clone().sanitized();
                        g.settings.save();
                    }
                });
                let _ =
                    slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Sound on/off checkbox
        if let Some(el) = document.get_element_by_id("soundToggle") {
            if let Ok(toggle) = el.dyn_into::<web_sys::HtmlInputElement>() {
                let toggle_clone = toggle.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    let mut g = game.borrow_mut();
                    g.settings.sound_enabled = toggle_clone.checked();
                    g.audio.set_muted(!g.settings.sound_enabled);
                    g.settings.save();
                });
                let _ =
                    toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Auto-pause when the tab is hidden
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == MatchPhase::Running {
                        g.pending.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Pause and optionally mute on window blur
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == MatchPhase::Running {
                    g.pending.pause = true;
                }
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let enabled = g.settings.sound_enabled;
                g.audio.set_muted(!enabled);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                (time - g.last_time) / 1000.0
            } else {
                SIM_DT as f64
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use canvas_pong::consts::SIM_DT;
    use canvas_pong::settings::Settings;
    use canvas_pong::sim::{GameEvent, GameState, TickInput, tick};

    env_logger::init();
    log::info!("Canvas Pong (native) starting headless demo match...");

    let settings = Settings::load().sanitized();
    let mut state = GameState::new(settings.to_config(), 0x00C0_FFEE);
    let mut input = TickInput {
        start: true,
        demo: true,
        ..TickInput::default()
    };

    // Thirty seconds of AI vs AI at the fixed step rate
    for _ in 0..(30 * 60) {
        tick(&mut state, &input, SIM_DT);
        input.clear_one_shots();
        for event in state.take_events() {
            if let GameEvent::Score(side) = event {
                log::info!(
                    "point to {}: {} - {}",
                    side.as_str(),
                    state.left.score,
                    state.right.score
                );
            }
        }
    }

    println!(
        "Final score after 30s demo: {} - {} (longest rally {})",
        state.left.score, state.right.score, state.max_rally
    );
}
