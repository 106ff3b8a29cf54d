//! Ball Tag entry point
//!
//! Wires the browser shell: canvas, HUD, input listeners, the frame loop,
//! and the coarse music-pump timer that drives the look-ahead sequencer.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, TouchEvent};

    use ball_tag::audio::sequencer::LOOKAHEAD_MS;
    use ball_tag::audio::Sequencer;
    use ball_tag::audio::synth::Synth;
    use ball_tag::input::{self, KeyboardState};
    use ball_tag::render::Renderer;
    use ball_tag::sim::{
        frame, CountdownDisplay, Difficulty, FrameInput, GameEvent, GamePhase, GameSession,
        MusicCommand,
    };
    use ball_tag::touch::{self, TouchJoystick};
    use ball_tag::Settings;

    /// Canvas size limits
    const MAX_WIDTH: f64 = 1440.0;
    const MAX_HEIGHT: f64 = 960.0;

    /// Everything the shell owns
    struct Game {
        session: GameSession,
        renderer: Renderer,
        keyboard: KeyboardState,
        joystick: TouchJoystick,
        sequencer: Sequencer,
        synth: Synth,
        settings: Settings,
        music_rng: Pcg32,
        // One-shot inputs, cleared after each frame
        spawn_flag: bool,
        pause_flag: bool,
    }

    impl Game {
        fn new(seed: u64, bounds: Vec2, renderer: Renderer) -> Self {
            let settings = Settings::load();
            let mut synth = Synth::new();
            synth.set_music_volume(settings.effective_music_volume());
            Self {
                session: GameSession::new(seed, bounds),
                renderer,
                keyboard: KeyboardState::default(),
                joystick: TouchJoystick::default(),
                sequencer: Sequencer::new(),
                synth,
                settings,
                music_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9),
                spawn_flag: false,
                pause_flag: false,
            }
        }

        /// One display frame: simulate, drain side effects, draw, poke HUD.
        fn update(&mut self, now_ms: f64) {
            let input = FrameInput {
                move_dir: input::resolve_direction(&self.keyboard, &self.joystick),
                spawn_player: self.spawn_flag,
                pause: self.pause_flag,
            };
            self.spawn_flag = false;
            self.pause_flag = false;

            frame(&mut self.session, &input, now_ms);

            for event in self.session.drain_events() {
                match event {
                    GameEvent::Beep { freq, duration_ms } => self.synth.beep(freq, duration_ms),
                    GameEvent::Music(MusicCommand::Start) => self.music_start(),
                    GameEvent::Music(MusicCommand::Pause) => {
                        self.sequencer.pause();
                        self.synth.fade_out();
                    }
                    GameEvent::Music(MusicCommand::Stop) => {
                        self.sequencer.stop();
                        self.synth.fade_out();
                    }
                }
            }

            self.renderer.draw(&self.session, now_ms);
        }

        /// Start (or resume) the sequencer against the audio clock.
        fn music_start(&mut self) {
            if !self.synth.ensure_ready() {
                // Audio unavailable; gameplay continues silent and the
                // next start signal retries
                return;
            }
            if self.sequencer.is_playing() {
                return;
            }
            self.synth.fade_in();
            if let Some(audio_now) = self.synth.current_time() {
                self.sequencer.start(audio_now, &mut self.music_rng);
                self.sequencer.pump(audio_now, &mut self.synth);
            }
        }

        /// Coarse poll driving the look-ahead scheduler.
        fn pump_music(&mut self) {
            if !self.sequencer.is_playing() {
                return;
            }
            if let Some(audio_now) = self.synth.current_time() {
                self.sequencer.pump(audio_now, &mut self.synth);
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let session = &self.session;

            if let Some(el) = document.get_element_by_id("time-remaining") {
                el.set_text_content(Some(&session.round_timer.remaining.to_string()));
            }
            if let Some(el) = document.get_element_by_id("ball-count") {
                el.set_text_content(Some(&session.ball_count.to_string()));
            }
            if let Some(el) = document.get_element_by_id("status-text") {
                el.set_text_content(Some(session.status.label()));
            }
            if let Some(el) = document.get_element_by_id("difficulty-label") {
                el.set_text_content(Some(&session.difficulty.label));
            }

            // Countdown overlay
            if let Some(el) = document.get_element_by_id("countdown-overlay") {
                match session.countdown.map(|c| c.display) {
                    Some(CountdownDisplay::Number(n)) => {
                        let _ = el.set_attribute("class", "");
                        el.set_text_content(Some(&n.to_string()));
                    }
                    Some(CountdownDisplay::Go) => {
                        let _ = el.set_attribute("class", "");
                        el.set_text_content(Some("GO!"));
                    }
                    None => {
                        let _ = el.set_attribute("class", "hidden");
                    }
                }
            }

            // Menu / HUD / game-over visibility follows the phase
            let in_menu = matches!(session.phase, GamePhase::Menu | GamePhase::Paused);
            if let Some(el) = document.get_element_by_id("main-menu") {
                let _ = el.set_attribute("class", if in_menu { "visible" } else { "" });
            }
            if let Some(el) = document.get_element_by_id("resume-container") {
                let paused = session.phase == GamePhase::Paused;
                let _ = el.set_attribute("class", if paused { "" } else { "hidden" });
            }
            if let Some(el) = document.get_element_by_id("hud") {
                let hide = session.phase == GamePhase::Menu;
                let _ = el.set_attribute("class", if hide { "hidden" } else { "" });
            }
            if let Some(el) = document.get_element_by_id("game-over-modal") {
                if session.phase == GamePhase::GameOver {
                    let _ = el.set_attribute("class", "visible");
                    if let Some(summary) = &session.summary {
                        if let Some(el) = document.get_element_by_id("final-rounds") {
                            el.set_text_content(Some(&summary.rounds_survived.to_string()));
                        }
                        if let Some(el) = document.get_element_by_id("final-difficulty") {
                            el.set_text_content(Some(&summary.difficulty_label));
                        }
                    }
                } else {
                    let _ = el.set_attribute("class", "");
                }
            }
        }
    }

    fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn sized_bounds(window: &web_sys::Window) -> Vec2 {
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(MAX_WIDTH)
            .min(MAX_WIDTH);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(MAX_HEIGHT)
            .min(MAX_HEIGHT);
        Vec2::new(w as f32, h as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("failed to init logger");

        log::info!("Ball Tag starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let bounds = sized_bounds(&window);
        canvas.set_width(bounds.x as u32);
        canvas.set_height(bounds.y as u32);

        let ctx: web_sys::CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");
        let overlay_ctx = ctx.clone();

        let seed = now_ms() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, bounds, Renderer::new(ctx))));
        log::info!("session seeded with {}", seed);

        setup_menu_buttons(game.clone());
        setup_keyboard(game.clone());
        setup_touch(&canvas, game.clone());
        setup_resize(&canvas, game.clone());
        setup_context_menu(game.clone());
        setup_music_pump(game.clone());

        request_animation_frame(game, overlay_ctx);

        log::info!("Ball Tag running");
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>, overlay: web_sys::CanvasRenderingContext2d) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game, overlay);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, overlay: web_sys::CanvasRenderingContext2d) {
        {
            let mut g = game.borrow_mut();
            let now = now_ms();
            g.update(now);
            if g.settings.show_joystick && g.session.phase == GamePhase::Playing {
                touch::render(&g.joystick, &overlay);
            }
            g.update_hud();
        }
        request_animation_frame(game, overlay);
    }

    fn setup_menu_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        for id in ["btn-easy", "btn-medium", "btn-hard"] {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let difficulty_id = id.trim_start_matches("btn-").to_string();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                let difficulty = Difficulty::from_id(&difficulty_id);
                g.keyboard.clear();
                g.joystick.reset();
                g.synth.ensure_ready();
                g.session.start_game(difficulty, now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("resume-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().session.resume(now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.keyboard.clear();
                g.joystick.reset();
                g.session.restart(now_ms());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().session.show_menu();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();

                if g.session.phase == GamePhase::GameOver {
                    if key == "Enter" || key == " " {
                        event.prevent_default();
                        g.session.restart(now_ms());
                    }
                    return;
                }
                if g.session.phase == GamePhase::Menu {
                    return;
                }
                if key == "Escape" {
                    g.pause_flag = true;
                    return;
                }
                if g.session.phase == GamePhase::Paused {
                    return;
                }
                if key == " " {
                    event.prevent_default();
                    g.spawn_flag = true;
                    return;
                }
                if g.keyboard.press(&key) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().keyboard.release(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn touch_point(canvas: &HtmlCanvasElement, touch: &web_sys::Touch) -> Vec2 {
        let rect = canvas.get_bounding_client_rect();
        Vec2::new(
            touch.client_x() as f32 - rect.left() as f32,
            touch.client_y() as f32 - rect.top() as f32,
        )
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.synth.ensure_ready();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let at = touch_point(&canvas_clone, &touch);
                        g.joystick.begin(touch.identifier(), at);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        let at = touch_point(&canvas_clone, &touch);
                        g.joystick.update(touch.identifier(), at);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for kind in ["touchend", "touchcancel"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    if let Some(touch) = touches.get(i) {
                        g.joystick.end(touch.identifier());
                    }
                }
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let bounds = sized_bounds(&window);
            canvas.set_width(bounds.x as u32);
            canvas.set_height(bounds.y as u32);
            game.borrow_mut().session.set_bounds(bounds);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_context_menu(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
            event.prevent_default();
            game.borrow_mut().pause_flag = true;
        });
        let _ = document
            .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// The sequencer's coarse poll; scheduling precision comes from the
    /// audio clock, not from this interval.
    fn setup_music_pump(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().pump_music();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            LOOKAHEAD_MS as i32,
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ball_tag::sim::{frame, Difficulty, FrameInput, GamePhase, GameSession};
    use glam::Vec2;

    env_logger::init();
    log::info!("Ball Tag (native) starting...");
    log::info!("the game shell is browser-only - run with `trunk serve` for the web version");

    // Headless smoke run: one countdown plus a second of frames
    let mut session = GameSession::new(42, Vec2::new(1440.0, 960.0));
    session.start_game(Difficulty::medium(), 0.0);
    let mut now = 0.0;
    while session.phase == GamePhase::Countdown {
        now += 100.0;
        frame(&mut session, &FrameInput::default(), now);
    }
    for _ in 0..60 {
        now += 16.0;
        frame(&mut session, &FrameInput::default(), now);
    }
    println!(
        "smoke run: {} players, {} enemies, {}s left in round",
        session.players.len(),
        session.enemies.len(),
        session.round_timer.remaining
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main; this exists to satisfy the compiler
}
