//! Arcade Duo entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
use arcade_duo::sim::GameKind;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, EventTarget, HtmlInputElement};

    use arcade_duo::audio::WebAudio;
    use arcade_duo::menu::{self, MenuAction, MenuSummary};
    use arcade_duo::persistence::Store;
    use arcade_duo::platform::{CanvasRenderer, LocalStorageBackend, command_for_key};
    use arcade_duo::session::{Flow, Session};
    use arcade_duo::sim::GameKind;
    use arcade_duo::{ArcadeError, Difficulty};

    type WebSession = Session<LocalStorageBackend, WebAudio>;

    /// Page state: at most one running session
    struct App {
        document: Document,
        renderer: CanvasRenderer,
        session: Option<WebSession>,
    }

    impl App {
        fn start(&mut self, name: &str) -> Result<(), ArcadeError> {
            let store = Store::new(LocalStorageBackend::new()?);
            let audio = WebAudio::new(store.settings().effective_sfx_volume());
            // The start click is the user gesture the audio context waits for
            audio.resume();
            let seed = js_sys::Date::now() as u64;
            let session = Session::start_by_name(name, store, audio, seed)?;
            self.renderer.fit(session.view());
            self.session = Some(session);
            self.show("menu", false);
            self.show("hud", true);
            Ok(())
        }

        fn to_menu(&mut self) {
            if let Some(session) = self.session.take() {
                log::info!("Leaving {} for the menu", session.kind());
            }
            self.show("hud", false);
            self.show("menu", true);
            self.refresh_menu();
        }

        /// Repaint best scores and settings controls from storage
        fn refresh_menu(&self) {
            let backend = match LocalStorageBackend::new() {
                Ok(backend) => backend,
                Err(e) => {
                    log::warn!("Menu without saved data: {}", e);
                    return;
                }
            };
            let summary = MenuSummary::load(&Store::new(backend));
            for kind in [GameKind::Snake, GameKind::Tetris] {
                self.set_text(&menu::high_score_id(kind), &summary.high_score(kind).to_string());
            }

            let settings = &summary.settings;
            self.mark_difficulty(settings.difficulty);
            self.set_text("sound-toggle", menu::sound_label(settings.sound_enabled));
            if let Some(slider) = self.sfx_slider() {
                slider.set_value(&((settings.sfx_volume * 100.0).round() as u32).to_string());
            }
        }

        fn mark_difficulty(&self, difficulty: Difficulty) {
            for btn in difficulty_buttons(&self.document) {
                let value = btn.get_attribute("data-difficulty");
                let active = value.as_deref() == Some(difficulty.as_str());
                let _ = btn.class_list().toggle_with_force("active", active);
            }
        }

        fn sfx_slider(&self) -> Option<HtmlInputElement> {
            self.document
                .get_element_by_id("sfx-volume")?
                .dyn_into::<HtmlInputElement>()
                .ok()
        }

        /// Route a settings change through the running session, or straight
        /// to storage from the menu
        fn change_settings(&mut self, action: MenuAction) -> Result<(), ArcadeError> {
            if action == MenuAction::ResetAll {
                self.to_menu();
            }
            if let Some(session) = self.session.as_mut() {
                let settings = menu::updated(session.settings().clone(), action);
                session.set_settings(settings);
            } else {
                let mut store = Store::new(LocalStorageBackend::new()?);
                menu::apply(&mut store, action);
            }
            self.refresh_menu();
            Ok(())
        }

        fn show(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn frame(&mut self, time: f64) {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            session.frame(time);
            session.render(&mut self.renderer);

            let (score, high) = (session.score(), session.high_score());
            self.set_text("score", &score.to_string());
            self.set_text("high-score", &high.to_string());
        }

        fn key(&mut self, key: &str) -> bool {
            let Some(session) = self.session.as_mut() else {
                return false;
            };
            let Some(command) = command_for_key(session.kind(), key, session.is_game_over()) else {
                return false;
            };
            if session.handle(command) == Flow::Menu {
                self.to_menu();
            }
            true
        }
    }

    pub fn run() -> Result<(), ArcadeError> {
        let window = web_sys::window().ok_or(ArcadeError::NoWindow)?;
        let document = window.document().ok_or(ArcadeError::NoWindow)?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let renderer = CanvasRenderer::new("canvas")?;
        let app = Rc::new(RefCell::new(App {
            document: document.clone(),
            renderer,
            session: None,
        }));

        setup_menu_buttons(&document, app.clone());
        setup_keyboard(app.clone());
        setup_auto_pause(&document, app.clone());
        app.borrow_mut().to_menu();

        request_animation_frame(app);

        log::info!("Arcade Duo running!");
        Ok(())
    }

    fn difficulty_buttons(document: &Document) -> Vec<Element> {
        let Ok(nodes) = document.query_selector_all(".difficulty-btn") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    /// Apply `action` whenever `target` fires `event`
    fn on_settings_event(
        target: &EventTarget,
        event: &str,
        app: Rc<RefCell<App>>,
        action: MenuAction,
    ) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Err(e) = app.borrow_mut().change_settings(action) {
                log::error!("Could not save settings: {}", e);
            }
        });
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for name in ["snake", "tetris"] {
            let Some(btn) = document.get_element_by_id(&format!("{name}-btn")) else {
                log::warn!("No start button for {}", name);
                continue;
            };
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut app = app.borrow_mut();
                if let Err(e) = app.start(name) {
                    log::error!("Could not start {}: {}", name, e);
                    app.to_menu();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for btn in difficulty_buttons(document) {
            let value = btn.get_attribute("data-difficulty").unwrap_or_default();
            let Some(action) = MenuAction::difficulty(&value) else {
                log::warn!("Unknown difficulty button: {:?}", value);
                continue;
            };
            on_settings_event(&btn, "click", app.clone(), action);
        }

        if let Some(toggle) = document.get_element_by_id("sound-toggle") {
            on_settings_event(&toggle, "click", app.clone(), MenuAction::ToggleSound);
        }

        let slider = document
            .get_element_by_id("sfx-volume")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        if let Some(slider) = slider {
            let app = app.clone();
            let input = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(action) = MenuAction::sfx_percent(&input.value()) else { return };
                if let Err(e) = app.borrow_mut().change_settings(action) {
                    log::error!("Could not save settings: {}", e);
                }
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(reset) = document.get_element_by_id("reset-data") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let confirmed = web_sys::window()
                    .and_then(|w| w.confirm_with_message(menu::RESET_CONFIRM).ok())
                    .unwrap_or(false);
                if !confirmed {
                    return;
                }
                if let Err(e) = app.borrow_mut().change_settings(MenuAction::ResetAll) {
                    log::error!("Could not reset saved data: {}", e);
                }
            });
            let _ =
                reset.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if app.borrow_mut().key(&event.key()) {
                event.prevent_default();
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pause when the tab is hidden
    fn setup_auto_pause(document: &Document, app: Rc<RefCell<App>>) {
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                if let Some(session) = app.borrow_mut().session.as_mut() {
                    session.pause();
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Arcade Duo starting...");
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Arcade Duo (native) starting...");
    log::info!("Native mode plays a headless demo; build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    for kind in [GameKind::Snake, GameKind::Tetris] {
        match demo::play(kind, seed) {
            Ok(summary) => println!(
                "{kind}: score {} (best {}), {} achievement(s) unlocked",
                summary.score, summary.high_score, summary.unlocked
            ),
            Err(e) => log::error!("{} demo failed: {}", kind, e),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless autopilot runs
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use arcade_duo::ArcadeError;
    use arcade_duo::audio::Muted;
    use arcade_duo::persistence::{MemoryBackend, Store};
    use arcade_duo::session::Session;
    use arcade_duo::sim::{Action, Direction, GameKind, GameView, SnakeGame, TetrisGame};

    /// Simulated frame length
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Stop after this many frames even if the autopilot survives
    const MAX_FRAMES: usize = 60 * 60 * 10;

    pub struct DemoResult {
        pub score: u64,
        pub high_score: u64,
        pub unlocked: usize,
    }

    pub fn play(kind: GameKind, seed: u64) -> Result<DemoResult, ArcadeError> {
        let store = Store::new(MemoryBackend::default());
        let mut session = Session::new(kind, store, Muted, seed)?;

        for _ in 0..MAX_FRAMES {
            if session.is_game_over() {
                break;
            }
            let action = match session.view() {
                GameView::Snake(snake) => steer_snake(snake).map(Action::Turn),
                GameView::Tetris(tetris) => steer_tetris(tetris),
            };
            if let Some(action) = action {
                session.input(action);
            }
            session.update(FRAME_MS);
        }

        Ok(DemoResult {
            score: session.score(),
            high_score: session.high_score(),
            unlocked: session.progress().unlocked,
        })
    }

    /// Head toward the food, falling back to any safe turn
    fn steer_snake(snake: &SnakeGame) -> Option<Direction> {
        let head = snake.head();
        let food = snake.food();

        let mut preferred = Vec::with_capacity(6);
        if food.x != head.x {
            preferred.push(if food.x > head.x { Direction::Right } else { Direction::Left });
        }
        if food.y != head.y {
            preferred.push(if food.y > head.y { Direction::Down } else { Direction::Up });
        }
        preferred.push(snake.facing());
        preferred.extend(Direction::ALL);

        let reverse = snake.facing().opposite();
        preferred.into_iter().filter(|d| *d != reverse).find(|d| {
            let next = head + d.delta();
            let inside =
                next.x >= 0 && next.y >= 0 && next.x < snake.columns() && next.y < snake.rows();
            inside && !snake.body().contains(&next)
        })
    }

    /// Aim for the placement that lands deepest
    fn steer_tetris(tetris: &TetrisGame) -> Option<Action> {
        let piece = tetris.piece()?;
        let width = tetris.board().width() as i32;

        let mut best: Option<(i32, u8, i32)> = None;
        for rotation in 0..4u8 {
            let shape = piece.kind.shape(rotation);
            for x in 0..=width - shape.cols() as i32 {
                if !tetris.fits(&shape, x, piece.y) {
                    continue;
                }
                let mut y = piece.y;
                while tetris.fits(&shape, x, y + 1) {
                    y += 1;
                }
                let bottom = y + shape.rows() as i32;
                if best.is_none_or(|(b, _, _)| bottom > b) {
                    best = Some((bottom, rotation, x));
                }
            }
        }

        let (_, rotation, x) = best?;
        let action = if piece.rotation != rotation && !piece.kind.is_square() {
            Action::Rotate
        } else if piece.x > x {
            Action::MoveLeft
        } else if piece.x < x {
            Action::MoveRight
        } else {
            Action::SoftDrop
        };
        Some(action)
    }
}
