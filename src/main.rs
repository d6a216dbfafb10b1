//! Drop Dodge entry point
//!
//! On the web this wires the DOM (styled boxes, keyboard, HUD) to a
//! `Session`. Natively it runs a headless autopilot session and logs it.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Document, HtmlElement, KeyboardEvent, Response};

    use drop_dodge::sim::{
        BoundsProvider, FallingObject, GameEvent, MaskLoadError, OpacityMask, Player, Rect,
        TickInput,
    };
    use drop_dodge::{Session, Settings};

    /// DOM elements backing the play field
    struct DomSurface {
        document: Document,
        area: HtmlElement,
        player: HtmlElement,
        game_over: Option<HtmlElement>,
        final_score: Option<HtmlElement>,
        realtime_score: Option<HtmlElement>,
        objects: RefCell<HashMap<u32, HtmlElement>>,
    }

    fn element(document: &Document, id: &str) -> Option<HtmlElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    fn rect_of(el: &HtmlElement) -> Rect {
        let r = el.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.right() as f32, r.bottom() as f32)
    }

    fn place(el: &HtmlElement, x: f32, y: Option<f32>) {
        let style = el.style();
        let _ = style.set_property("left", &format!("{}px", x));
        if let Some(y) = y {
            let _ = style.set_property("top", &format!("{}px", y));
        }
    }

    impl DomSurface {
        fn new(document: Document) -> Option<Self> {
            Some(Self {
                area: element(&document, "gameArea")?,
                player: element(&document, "player")?,
                game_over: element(&document, "gameOver"),
                final_score: element(&document, "score"),
                realtime_score: element(&document, "realtimeScore"),
                objects: RefCell::new(HashMap::new()),
                document,
            })
        }

        /// Element for an object, created on first use
        fn object_element(&self, id: u32) -> Option<HtmlElement> {
            if let Some(el) = self.objects.borrow().get(&id) {
                return Some(el.clone());
            }
            let el = self
                .document
                .create_element("div")
                .ok()?
                .dyn_into::<HtmlElement>()
                .ok()?;
            el.set_class_name("drop");
            self.area.append_child(&el).ok()?;
            self.objects.borrow_mut().insert(id, el.clone());
            Some(el)
        }

        fn remove_object(&self, id: u32) {
            if let Some(el) = self.objects.borrow_mut().remove(&id) {
                el.remove();
            }
        }

        fn set_text(el: &Option<HtmlElement>, text: &str) {
            if let Some(el) = el {
                el.set_text_content(Some(text));
            }
        }

        fn set_game_over_visible(&self, visible: bool) {
            if let Some(el) = &self.game_over {
                let _ = el
                    .style()
                    .set_property("display", if visible { "block" } else { "none" });
            }
        }

        fn apply(&self, events: &[GameEvent]) {
            for event in events {
                match *event {
                    GameEvent::ObjectSpawned { id } => {
                        let _ = self.object_element(id);
                    }
                    GameEvent::ObjectDespawned { id } => self.remove_object(id),
                    GameEvent::ScoreChanged { score } => {
                        Self::set_text(&self.realtime_score, &score.to_string());
                    }
                    GameEvent::GameOver { final_score } => {
                        Self::set_text(&self.final_score, &final_score.to_string());
                        self.set_game_over_visible(true);
                    }
                    GameEvent::Restarted => self.set_game_over_visible(false),
                }
            }
        }

        /// Push simulation positions into the DOM
        fn sync(&self, session: &Session) {
            let state = session.state();
            place(&self.player, state.player().pos.x, None);
            for object in state.entities.all() {
                if let Some(el) = self.object_element(object.id) {
                    place(&el, object.pos.x, Some(object.pos.y));
                }
            }
        }
    }

    impl BoundsProvider for DomSurface {
        fn player_bounds(&self, player: &Player) -> Rect {
            place(&self.player, player.pos.x, None);
            rect_of(&self.player)
        }

        fn object_bounds(&self, object: &FallingObject) -> Rect {
            match self.object_element(object.id) {
                Some(el) => {
                    place(&el, object.pos.x, Some(object.pos.y));
                    rect_of(&el)
                }
                // Detached element: no area, never overlaps
                None => Rect::new(f32::MAX, f32::MAX, f32::MAX, f32::MAX),
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        surface: DomSurface,
        input: TickInput,
        last_time: Option<f64>,
    }

    impl Game {
        fn update(&mut self, time: f64) {
            let elapsed = self.last_time.map_or(0.0, |last| time - last);
            self.last_time = Some(time);

            let events = self.session.advance(elapsed, &self.input, &self.surface);
            // One-shot input
            self.input.restart = false;

            self.surface.apply(&events);
            self.surface.sync(&self.session);
        }
    }

    async fn fetch_mask(path: &str) -> Result<OpacityMask, MaskLoadError> {
        let fetch_err = |e: JsValue| MaskLoadError::Fetch(format!("{:?}", e));
        let window = web_sys::window().ok_or_else(|| MaskLoadError::Fetch("no window".into()))?;

        let resp: Response = JsFuture::from(window.fetch_with_str(path))
            .await
            .map_err(fetch_err)?
            .dyn_into()
            .map_err(fetch_err)?;
        if !resp.ok() {
            return Err(MaskLoadError::Fetch(format!("HTTP {} for {}", resp.status(), path)));
        }

        let buffer = JsFuture::from(resp.array_buffer().map_err(fetch_err)?)
            .await
            .map_err(fetch_err)?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        OpacityMask::decode(&bytes)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
        log::info!("Drop Dodge starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let Some(surface) = DomSurface::new(document.clone()) else {
            log::error!("Missing #gameArea or #player element");
            return;
        };

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let mask_path = settings.mask_path.clone();

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(settings, seed),
            surface,
            input: TickInput::default(),
            last_time: None,
        }));

        // Mask decode runs alongside the ticks and flips collision to fine mode
        {
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = fetch_mask(&mask_path).await;
                game.borrow_mut().session.resolve_mask(result);
            });
        }

        setup_input_handlers(&document, game.clone());
        request_animation_frame(game);
        log::info!("Drop Dodge running!");
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let over = g.session.state().is_over();
                g.input.key_down(&event.code(), over);
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.code());
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().update(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
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
mod headless {
    use std::sync::mpsc;
    use std::time::{SystemTime, UNIX_EPOCH};

    use drop_dodge::sim::{BoundsProvider, FieldBounds, GameEvent, OpacityMask, TickInput};
    use drop_dodge::{Session, Settings};

    /// Simulated frame length
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after this much simulated time
    const MAX_SIM_MS: f64 = 120_000.0;
    const SETTINGS_PATH: &str = "drop_dodge.json";

    /// Step away from the lowest object that would land on the player
    fn autopilot(session: &Session, bounds: &FieldBounds) -> TickInput {
        let state = session.state();
        let player = bounds.player_bounds(state.player());
        let threat = state
            .entities
            .all()
            .iter()
            .map(|o| bounds.object_bounds(o))
            .filter(|r| r.right >= player.left && r.left <= player.right)
            .max_by(|a, b| a.top.total_cmp(&b.top));

        let Some(threat) = threat else {
            return TickInput::default();
        };
        let threat_center = (threat.left + threat.right) / 2.0;
        let player_center = (player.left + player.right) / 2.0;
        let at_left_wall = state.player().pos.x <= 0.0;
        let at_right_wall = state.player().pos.x >= session.settings().player_max_x();
        let go_left = (threat_center >= player_center && !at_left_wall) || at_right_wall;
        TickInput {
            left: go_left,
            right: !go_left,
            restart: false,
        }
    }

    pub fn run() {
        let settings = Settings::load_from(SETTINGS_PATH);
        let seed = settings.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        let bounds = FieldBounds::from_settings(&settings);

        // Decode the mask off the game loop; the session picks it up when ready
        let (tx, rx) = mpsc::channel();
        let mask_path = settings.mask_path.clone();
        std::thread::spawn(move || {
            let _ = tx.send(OpacityMask::load(&mask_path));
        });

        let mut session = Session::new(settings, seed);
        let mut elapsed = 0.0;
        while elapsed < MAX_SIM_MS {
            if session.mask().is_loading() {
                if let Ok(result) = rx.try_recv() {
                    session.resolve_mask(result);
                }
            }

            let input = autopilot(&session, &bounds);
            for event in session.advance(FRAME_MS, &input, &bounds) {
                match event {
                    GameEvent::ScoreChanged { score } => log::info!("Score: {}", score),
                    GameEvent::GameOver { final_score } => {
                        println!("Game over after {:.1}s, score {}", elapsed / 1000.0, final_score);
                        return;
                    }
                    _ => {}
                }
            }
            elapsed += FRAME_MS;
        }

        println!(
            "Survived {:.0}s, score {}",
            MAX_SIM_MS / 1000.0,
            session.state().score
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Drop Dodge (headless) starting...");
    headless::run();
}
