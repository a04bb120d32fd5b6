//! Browser host for the game
//!
//! A [`RocketGame`] handle owns one runtime: the canvas, its listeners, the
//! animation-frame callback and the current [`GameSession`]. Every callback
//! holds only a weak reference to the runtime and checks the torn-down flag
//! first, so nothing touches the canvas after [`RocketGame::destroy`].

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    MouseEvent, Window,
};

use crate::audio::WebAudio;
use crate::consts::SIM_DT;
use crate::leaderboard::Leaderboard;
use crate::renderer::canvas::CanvasRenderer;
use crate::session::{GameSession, OutcomeReporter};
use crate::settings::Settings;
use crate::sim::{Analytics, DecorTarget, DecorTargets, GameState, NoDecor, Rect};

/// Marks a glyph that has already been shot
const HIT_ATTR: &str = "data-hit";
const GLYPH_SELECTOR: &str = ".hero-char";
/// Page controls whose clicks never fire a laser
const INTERACTIVE_SELECTOR: &str =
    "a, button, input, textarea, select, label, [role=button]";
/// How far a struck glyph travels, in CSS pixels
const FLING_DISTANCE: f32 = 140.0;

type Listener = Closure<dyn FnMut(Event)>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// Outcome waiting to be handed to the page
enum Outcome {
    BossDefeated { time_ms: u64, analytics: Analytics },
    GameOver { score: u32 },
}

struct Runtime {
    window: Window,
    canvas: HtmlCanvasElement,
    renderer: CanvasRenderer,
    text_container: Option<Element>,
    on_boss_defeated: js_sys::Function,
    on_game_over: js_sys::Function,
    audio: Rc<WebAudio>,
    settings: RefCell<Settings>,
    session: RefCell<Option<GameSession>>,
    outcomes: Rc<RefCell<Vec<Outcome>>>,
    torn_down: Cell<bool>,
    last_time: Cell<f64>,
    raf_id: Cell<Option<i32>>,
    raf: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    listeners: RefCell<Vec<(EventTarget, &'static str, Listener)>>,
}

impl Runtime {
    /// Match the canvas backing store to its parent and return the new size
    fn fit_canvas(&self) -> Vec2 {
        let (w, h) = match self.canvas.parent_element() {
            Some(parent) => (parent.client_width(), parent.client_height()),
            None => (self.canvas.client_width(), self.canvas.client_height()),
        };
        let (w, h) = (w.max(1) as u32, h.max(1) as u32);
        if self.canvas.width() != w || self.canvas.height() != h {
            self.canvas.set_width(w);
            self.canvas.set_height(h);
            log::debug!("Canvas resized to {w}x{h}");
        }
        Vec2::new(w as f32, h as f32)
    }

    fn new_session(&self, seed: u64) -> GameSession {
        let bounds = self.fit_canvas();
        let state = GameState::new(seed, bounds);

        let on_boss = self.outcomes.clone();
        let on_over = self.outcomes.clone();
        let reporter = OutcomeReporter::new(
            move |time_ms, analytics| {
                on_boss
                    .borrow_mut()
                    .push(Outcome::BossDefeated { time_ms, analytics })
            },
            move |score| on_over.borrow_mut().push(Outcome::GameOver { score }),
        );

        let decor: Box<dyn DecorTargets> = match &self.text_container {
            Some(container) => Box::new(HeroText {
                container: container.clone(),
                canvas: self.canvas.clone(),
            }),
            None => Box::new(NoDecor),
        };

        let mut session = GameSession::new(state, Box::new(self.audio.clone()), decor, reporter);
        session.apply_settings(&self.settings.borrow());
        session
    }

    /// Run `f` against the live session, if any
    fn with_session(&self, f: impl FnOnce(&mut GameSession)) {
        if let Ok(mut guard) = self.session.try_borrow_mut() {
            if let Some(session) = guard.as_mut() {
                f(session);
            }
        }
    }

    fn apply_settings(&self, settings: Settings) {
        self.audio.set_master_volume(settings.master_volume);
        self.audio.set_sfx_volume(settings.sfx_volume);
        self.audio.set_muted(settings.muted);
        self.with_session(|s| s.apply_settings(&settings));
        *self.settings.borrow_mut() = settings;
    }

    fn schedule(&self) {
        let raf = self.raf.borrow();
        let Some(callback) = raf.as_ref() else {
            return;
        };
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
    }

    fn frame(&self, time: f64) {
        if self.torn_down.get() {
            return;
        }
        self.raf_id.set(None);

        let last = self.last_time.replace(time);
        let dt = if last > 0.0 {
            ((time - last) / 1000.0) as f32
        } else {
            SIM_DT
        };

        self.with_session(|session| {
            session.advance(dt);
            self.renderer.render(&session.frame((time / 1000.0) as f32));
        });

        // Page callbacks run with no session borrow held; they may restart or destroy
        self.deliver_outcomes();

        if !self.torn_down.get() {
            self.schedule();
        }
    }

    fn deliver_outcomes(&self) {
        let pending: Vec<Outcome> = self.outcomes.borrow_mut().drain(..).collect();
        for outcome in pending {
            if self.torn_down.get() {
                return;
            }
            let result = match outcome {
                Outcome::BossDefeated { time_ms, analytics } => {
                    let analytics = match serde_json::to_string(&analytics) {
                        Ok(json) => JsValue::from_str(&json),
                        Err(e) => {
                            log::warn!("Analytics not serialized, reporting null: {e}");
                            JsValue::NULL
                        }
                    };
                    self.on_boss_defeated.call2(
                        &JsValue::NULL,
                        &JsValue::from_f64(time_ms as f64),
                        &analytics,
                    )
                }
                Outcome::GameOver { score } => self
                    .on_game_over
                    .call1(&JsValue::NULL, &JsValue::from_f64(score as f64)),
            };
            if let Err(e) = result {
                log::warn!("Outcome callback threw: {e:?}");
            }
        }
    }

    fn destroy(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        if let Some(id) = self.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        for (target, kind, listener) in self.listeners.borrow().iter() {
            let _ = target
                .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
        if let Ok(mut session) = self.session.try_borrow_mut() {
            session.take();
        }
        log::info!("Hero rocket torn down");
    }
}

/// Attach `handler` to `target`; it is skipped once the runtime is torn down
fn listen(
    rt: &Rc<Runtime>,
    target: &EventTarget,
    kind: &'static str,
    handler: impl Fn(&Runtime, Event) + 'static,
) -> Result<(), JsValue> {
    let weak = Rc::downgrade(rt);
    let listener = Listener::new(move |event: Event| {
        let Some(rt) = weak.upgrade() else {
            return;
        };
        if !rt.torn_down.get() {
            handler(&rt, event);
        }
    });
    target.add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())?;
    rt.listeners
        .borrow_mut()
        .push((target.clone(), kind, listener));
    Ok(())
}

fn install_listeners(rt: &Rc<Runtime>) -> Result<(), JsValue> {
    let window: &EventTarget = rt.window.as_ref();

    // Window-level so the overlay can stay click-through
    listen(rt, window, "mousemove", |rt, event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let origin = rt.canvas.get_bounding_client_rect();
        let pos = Vec2::new(
            (mouse.client_x() as f64 - origin.left()) as f32,
            (mouse.client_y() as f64 - origin.top()) as f32,
        );
        rt.with_session(|s| s.pointer_moved(pos));
    })?;

    listen(rt, window, "click", |rt, event| {
        if on_page_control(&event) {
            return;
        }
        rt.audio.resume();
        rt.with_session(|s| s.fire());
    })?;

    listen(rt, window, "resize", |rt, _event| {
        let size = rt.fit_canvas();
        rt.with_session(|s| s.resize(size));
    })?;

    Ok(())
}

/// Click landed on a link, button or form field of the page
fn on_page_control(event: &Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(INTERACTIVE_SELECTOR).ok().flatten())
        .is_some()
}

fn seed_or_clock(seed: Option<f64>) -> u64 {
    seed.map(|s| s as u64)
        .unwrap_or_else(|| js_sys::Date::now() as u64)
}

/// Handle returned to the page
#[wasm_bindgen]
pub struct RocketGame {
    rt: Rc<Runtime>,
}

#[wasm_bindgen]
impl RocketGame {
    /// Start a game on `canvas`
    ///
    /// `text_container` holds `.hero-char` spans the rocket can shoot. The
    /// page receives `on_boss_defeated(time_ms, analytics_json)` or
    /// `on_game_over(score)`, never both.
    pub fn mount(
        canvas: HtmlCanvasElement,
        text_container: Option<Element>,
        on_boss_defeated: js_sys::Function,
        on_game_over: js_sys::Function,
        seed: Option<f64>,
    ) -> Result<RocketGame, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let settings = Settings::load();
        let audio = Rc::new(WebAudio::new());

        let rt = Rc::new(Runtime {
            window,
            canvas,
            renderer: CanvasRenderer::new(ctx),
            text_container,
            on_boss_defeated,
            on_game_over,
            audio,
            settings: RefCell::new(Settings::default()),
            session: RefCell::new(None),
            outcomes: Rc::new(RefCell::new(Vec::new())),
            torn_down: Cell::new(false),
            last_time: Cell::new(0.0),
            raf_id: Cell::new(None),
            raf: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        });
        rt.apply_settings(settings);

        let session = rt.new_session(seed_or_clock(seed));
        *rt.session.borrow_mut() = Some(session);

        let weak = Rc::downgrade(&rt);
        *rt.raf.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            if let Some(rt) = weak.upgrade() {
                rt.frame(time);
            }
        }));

        if let Err(e) = install_listeners(&rt) {
            rt.destroy();
            return Err(e);
        }
        rt.schedule();

        log::info!("Hero rocket running");
        Ok(RocketGame { rt })
    }

    /// Throw away the current game and start a fresh one
    pub fn restart(&self, seed: Option<f64>) {
        let rt = &self.rt;
        if rt.torn_down.get() {
            return;
        }
        let session = rt.new_session(seed_or_clock(seed));
        match rt.session.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(session),
            Err(_) => log::warn!("Restart ignored while a frame is running"),
        }
        rt.last_time.set(0.0);
    }

    /// Stop the frame loop and detach every listener
    pub fn destroy(&self) {
        self.rt.destroy();
    }

    /// Apply and persist a settings JSON object
    pub fn apply_settings_json(&self, json: &str) -> Result<(), JsValue> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        settings.save();
        self.rt.apply_settings(settings);
        Ok(())
    }

    /// Elapsed time of the current game in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.rt
            .session
            .try_borrow()
            .ok()
            .and_then(|s| s.as_ref().map(|s| s.state().elapsed_ms() as f64))
            .unwrap_or(0.0)
    }
}

impl Drop for RocketGame {
    fn drop(&mut self) {
        self.rt.destroy();
    }
}

/// Headline glyphs the rocket can shoot off the page
struct HeroText {
    container: Element,
    canvas: HtmlCanvasElement,
}

impl HeroText {
    fn glyphs(&self) -> Vec<HtmlElement> {
        let Ok(list) = self.container.query_selector_all(GLYPH_SELECTOR) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }
}

impl DecorTargets for HeroText {
    fn live_targets(&self) -> Vec<DecorTarget> {
        let origin = self.canvas.get_bounding_client_rect();
        self.glyphs()
            .iter()
            .enumerate()
            .filter(|(_, el)| !el.has_attribute(HIT_ATTR))
            .map(|(id, el)| {
                let r = el.get_bounding_client_rect();
                DecorTarget {
                    id,
                    rect: Rect::new(
                        (r.left() - origin.left()) as f32,
                        (r.top() - origin.top()) as f32,
                        r.width() as f32,
                        r.height() as f32,
                    ),
                }
            })
            .collect()
    }

    fn mark_hit(&mut self, id: usize, impulse: Vec2) {
        let Some(el) = self.glyphs().into_iter().nth(id) else {
            return;
        };
        let _ = el.set_attribute(HIT_ATTR, "");

        let fling = impulse.normalize_or_zero() * FLING_DISTANCE;
        let spin = if impulse.x >= 0.0 { 40.0 } else { -40.0 };
        let style = el.style();
        let _ = style.set_property("transition", "transform 0.6s ease-out, opacity 0.6s ease-out");
        let _ = style.set_property(
            "transform",
            &format!("translate({:.0}px, {:.0}px) rotate({spin}deg)", fling.x, fling.y),
        );
        let _ = style.set_property("opacity", "0");
    }
}

/// Fastest `limit` leaderboard entries as JSON
#[wasm_bindgen]
pub fn leaderboard_top(limit: usize) -> Result<String, JsValue> {
    serde_json::to_string(&Leaderboard::load().top(limit))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Record a run and return the stored entry as JSON
#[wasm_bindgen]
pub fn leaderboard_submit(
    player_name: &str,
    time_ms: f64,
    analytics_json: Option<String>,
) -> Result<String, JsValue> {
    let analytics = analytics_json.and_then(|json| match serde_json::from_str::<Analytics>(&json) {
        Ok(a) => Some(a),
        Err(e) => {
            log::warn!("Ignoring unreadable analytics: {e}");
            None
        }
    });

    let mut board = Leaderboard::load();
    let entry = board
        .submit_score(player_name, time_ms, analytics, js_sys::Date::now())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    board.save();
    serde_json::to_string(&entry).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rank a time would take on the board
#[wasm_bindgen]
pub fn leaderboard_rank(time_ms: f64) -> u32 {
    Leaderboard::load().player_rank(time_ms.max(0.0).round() as u64) as u32
}
