//! Coin Rush entry point
//!
//! Wires the browser (canvas, DOM, timers, input) to the `GameLoop` on wasm.
//! The native binary plays one headless session with a simple bot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, MouseEvent, TouchEvent, Window};

    use coin_rush::audio::WebAudioBackend;
    use coin_rush::consts::*;
    use coin_rush::platform::{AnimationLoop, DomHud, Interval, now_ms};
    use coin_rush::renderer::CanvasPainter;
    use coin_rush::sim::GamePhase;
    use coin_rush::{GameLoop, Settings};

    type Game = GameLoop<WebAudioBackend, DomHud>;
    type Shared = Rc<RefCell<App>>;

    /// Timers driving the current session
    #[derive(Default)]
    struct Drivers {
        countdown: Option<Interval>,
        frame: Option<AnimationLoop>,
        spawn: Option<Interval>,
        timer: Option<Interval>,
    }

    impl Drivers {
        /// Stop every timer. Safe from inside a driver callback; the handles
        /// themselves are dropped the next time the drivers are replaced.
        fn cancel_all(&mut self) {
            if let Some(countdown) = &mut self.countdown {
                countdown.cancel();
            }
            if let Some(frame) = &mut self.frame {
                frame.cancel();
            }
            if let Some(spawn) = &mut self.spawn {
                spawn.cancel();
            }
            if let Some(timer) = &mut self.timer {
                timer.cancel();
            }
        }
    }

    /// Everything the browser callbacks share
    struct App {
        game: Game,
        painter: CanvasPainter,
        drivers: Drivers,
    }

    fn viewport(window: &Window) -> (u32, u32) {
        let w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        (w as u32, h as u32)
    }

    fn started<T>(what: &str, handle: Result<T, JsValue>) -> Option<T> {
        match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to start {}: {:?}", what, e);
                None
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Coin Rush starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or_else(|| JsValue::from_str("no #gameCanvas"))?
            .dyn_into()?;
        let painter = CanvasPainter::new(canvas.clone())?;
        let (width, height) = viewport(&window);
        painter.set_size(width, height);

        let settings = Settings::load();
        let backend = WebAudioBackend::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let hud = DomHud::new(window.clone())?;

        let seed = js_sys::Date::now() as u64;
        let game = GameLoop::new(seed, width as f32, height as f32, backend, hud, settings);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            painter,
            drivers: Drivers::default(),
        }));

        setup_input_handlers(&canvas, &app);
        setup_controls(&document, &app);
        setup_resize(&window, &app);

        log::info!("Coin Rush ready!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: &Shared) {
        // Mouse click
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut()
                    .game
                    .handle_click(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (first finger only)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    app.borrow_mut()
                        .game
                        .handle_click(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(window: &Window, app: &Shared) {
        let app = app.clone();
        let window_clone = window.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (w, h) = viewport(&window_clone);
            let mut app = app.borrow_mut();
            app.painter.set_size(w, h);
            app.game.resize(w as f32, h as f32);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn bind_button(document: &Document, id: &str, app: &Shared, action: fn(&Shared)) {
        let Some(button) = document.get_element_by_id(id) else {
            log::warn!("No #{} button", id);
            return;
        };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| action(&app));
        let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_controls(document: &Document, app: &Shared) {
        bind_button(document, "startButton", app, start_session);
        bind_button(document, "restartButton", app, start_session);
        bind_button(document, "stopButton", app, stop_session);
        bind_button(document, "homeButton", app, go_home);
        bind_button(document, "homeButtonEnd", app, go_home);
        bind_button(document, "muteButton", app, |app| {
            app.borrow_mut().game.toggle_mute();
        });

        // Optional volume slider; any range max works
        if let Some(input) = document
            .get_element_by_id("volume")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let max = input_clone.max().parse::<f64>().unwrap_or(1.0).max(f64::EPSILON);
                let volume = input_clone.value_as_number() / max;
                app.borrow_mut().game.set_volume(volume as f32);
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn start_session(app: &Shared) {
        let mut guard = app.borrow_mut();
        if !guard.game.start() {
            return;
        }

        // Drop the previous session's (already cancelled) handles
        guard.drivers = Drivers::default();

        let weak = Rc::downgrade(app);
        guard.drivers.countdown = started(
            "countdown",
            Interval::start(TIMER_INTERVAL_MS, move || countdown_step(&weak)),
        );
    }

    fn stop_session(app: &Shared) {
        let mut guard = app.borrow_mut();
        guard.game.stop();
        guard.drivers = Drivers::default();
    }

    fn go_home(app: &Shared) {
        let mut guard = app.borrow_mut();
        guard.game.home();
        guard.drivers = Drivers::default();
    }

    fn countdown_step(weak: &Weak<RefCell<App>>) {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let mut guard = app.borrow_mut();
        match guard.game.countdown_tick(now_ms()) {
            GamePhase::Countdown => {}
            GamePhase::Running => {
                if let Some(countdown) = &mut guard.drivers.countdown {
                    countdown.cancel();
                }
                start_running_drivers(&app, &mut guard);
            }
            _ => guard.drivers.cancel_all(),
        }
    }

    fn start_running_drivers(app: &Shared, state: &mut App) {
        let weak = Rc::downgrade(app);
        state.drivers.frame = started(
            "frame loop",
            AnimationLoop::start(move |time| on_frame(&weak, time)),
        );

        let weak = Rc::downgrade(app);
        state.drivers.spawn = started(
            "spawner",
            Interval::start(SPAWN_INTERVAL_MS, move || {
                with_running(&weak, |game| {
                    game.spawn_tick();
                })
            }),
        );

        let weak = Rc::downgrade(app);
        state.drivers.timer = started(
            "session timer",
            Interval::start(TIMER_INTERVAL_MS, move || {
                with_running(&weak, |game| {
                    game.timer_tick();
                })
            }),
        );
    }

    /// Run a tick, then halt the drivers if the session is over
    fn with_running(weak: &Weak<RefCell<App>>, tick: impl FnOnce(&mut Game)) {
        let Some(app) = weak.upgrade() else {
            return;
        };
        let mut guard = app.borrow_mut();
        tick(&mut guard.game);
        if !guard.game.is_running() {
            guard.drivers.cancel_all();
        }
    }

    fn on_frame(weak: &Weak<RefCell<App>>, time: f64) -> bool {
        let Some(app) = weak.upgrade() else {
            return false;
        };
        let mut guard = app.borrow_mut();
        let App { game, painter, .. } = &mut *guard;
        game.frame(time, painter);
        game.is_running()
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Coin Rush failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Coin Rush (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    autoplay::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use coin_rush::audio::OfflineBackend;
    use coin_rush::consts::*;
    use coin_rush::hud::LogHud;
    use coin_rush::renderer::NullPainter;
    use coin_rush::{GameLoop, Settings};

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;
    /// Simulated time per loop iteration
    const STEP_MS: f64 = 17.0;
    /// The bot clicks this often
    const CLICK_EVERY_MS: f64 = 250.0;

    /// Play one session: the bot always clicks the lowest target
    pub fn run(seed: u64) {
        let mut game = GameLoop::new(
            seed,
            WIDTH,
            HEIGHT,
            OfflineBackend::new(),
            LogHud::default(),
            Settings::load(),
        );
        let mut painter = NullPainter;

        game.start();
        let mut now = 0.0;
        for _ in 0..COUNTDOWN_STEPS {
            now += 1000.0;
            game.countdown_tick(now);
        }

        let mut next_second = now + 1000.0;
        let mut next_click = now + CLICK_EVERY_MS;
        let mut hits = 0u32;
        while game.is_running() {
            now += STEP_MS;
            game.sound_mut().backend_mut().advance(STEP_MS / 1000.0);
            game.frame(now, &mut painter);

            if now >= next_click {
                next_click += CLICK_EVERY_MS;
                let lowest = game
                    .state()
                    .targets
                    .iter()
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|t| t.pos);
                if let Some(pos) = lowest {
                    if game.handle_click(pos.x, pos.y).is_some() {
                        hits += 1;
                    }
                }
            }

            if now >= next_second {
                next_second += 1000.0;
                game.spawn_tick();
                game.timer_tick();
            }
        }

        let summary = game.state().summary();
        log::info!(
            "Bot landed {} hits; {} tones scheduled",
            hits,
            game.sound().backend().voices_created()
        );
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize summary: {}", e),
        }
    }
}
