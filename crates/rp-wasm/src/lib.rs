//! WASM bridge for the route picker — exposes the selection session to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the canvas
//! and the animation frame; this crate owns the WebSocket to the route
//! service and everything behind it.

mod render2d;

use rp_core::{ClientConfig, GraphModel, SelectionMode, TransportError};
use rp_editor::selection::{Notice, NoticeLevel};
use rp_editor::{Modifiers, Session, Transport};
use rp_render::svg::render_svg;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, CloseEvent, Event, MessageEvent, WebSocket};

/// `Transport` over a browser WebSocket.
pub struct WsTransport {
    socket: WebSocket,
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        if self.socket.ready_state() != WebSocket::OPEN {
            return Err(TransportError::NotConnected);
        }
        self.socket
            .send_with_str(text)
            .map_err(|e| TransportError::Send(format!("{e:?}")))
    }

    fn close(&mut self) {
        let _ = self.socket.close();
    }
}

type SharedSession = Rc<RefCell<Session<WsTransport>>>;
type ChangeHook = Rc<RefCell<Option<js_sys::Function>>>;

/// Socket event handlers; dropping them detaches the socket.
struct SocketHandlers {
    _open: Closure<dyn FnMut(Event)>,
    _message: Closure<dyn FnMut(MessageEvent)>,
    _close: Closure<dyn FnMut(CloseEvent)>,
    _error: Closure<dyn FnMut(Event)>,
}

/// The JS-facing route picker.
#[wasm_bindgen]
pub struct RoutePicker {
    session: SharedSession,
    on_change: ChangeHook,
    handlers: SocketHandlers,
}

#[wasm_bindgen]
impl RoutePicker {
    /// Open the service connection and start a selection cycle on the
    /// reference grid. `config_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<RoutePicker, JsValue> {
        console_error_panic_hook_setup();

        let config = load_config(config_json).map_err(|e| JsValue::from_str(&e))?;
        let socket = open_socket(&config.service_url)?;
        let transport = WsTransport {
            socket: socket.clone(),
        };
        let session = Rc::new(RefCell::new(Session::new(
            GraphModel::reference(),
            transport,
            config,
        )));
        let on_change: ChangeHook = Rc::new(RefCell::new(None));
        let handlers = attach(&socket, &session, &on_change);

        Ok(Self {
            session,
            on_change,
            handlers,
        })
    }

    /// Register a callback fired whenever the session changes on its own
    /// (connection events, service responses).
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    /// Render to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let list = self.session.borrow().display_list();
        render2d::render_display_list(ctx, &list);
    }

    pub fn export_svg(&self) -> String {
        render_svg(&self.session.borrow().display_list())
    }

    /// Returns true if the session changed.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.borrow_mut().pointer_down(x, y)
    }

    /// `key` is the `KeyboardEvent.key` value. Returns true if the
    /// session changed.
    pub fn handle_key(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.session.borrow_mut().handle_key(key, modifiers)
    }

    pub fn confirm(&mut self) -> bool {
        self.session.borrow_mut().confirm()
    }

    pub fn back(&mut self) -> bool {
        self.session.borrow_mut().back()
    }

    pub fn cancel(&mut self) -> bool {
        self.session.borrow_mut().cancel()
    }

    pub fn reset(&mut self) -> bool {
        self.session.borrow_mut().reset()
    }

    pub fn pick_candidate(&mut self, index: usize) -> bool {
        self.session.borrow_mut().pick_candidate(index)
    }

    /// `"line"` or `"list"`. Returns false for an unknown name.
    pub fn set_mode(&mut self, name: &str) -> bool {
        match SelectionMode::from_name(name) {
            Some(mode) => {
                self.session.borrow_mut().set_mode(mode);
                true
            }
            None => false,
        }
    }

    pub fn mode(&self) -> String {
        self.session.borrow().mode().name().to_string()
    }

    /// Current stage as a camelCase name, e.g. `"awaitingRoutes"`.
    pub fn stage(&self) -> String {
        self.session.borrow().stage().name().to_string()
    }

    /// `"connecting"`, `"open"`, `"closed"` or `"failed"`.
    pub fn status(&self) -> String {
        self.session.borrow().status().name().to_string()
    }

    /// Feed the host clock; returns true if the route query timed out.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.borrow_mut().tick(now_ms.max(0.0) as u64)
    }

    /// Notices raised since the last call, as a JSON array of
    /// `{"level":"info"|"warning"|"error","message":"..."}`.
    pub fn take_notices(&mut self) -> String {
        notices_json(&self.session.borrow_mut().take_notices())
    }

    /// Re-send a confirmation that failed to go out. Returns false if it
    /// failed again.
    pub fn retry_confirmation(&mut self) -> bool {
        self.session.borrow_mut().retry_confirmation().is_ok()
    }

    /// Milliseconds to wait before calling `reconnect`, or `undefined`
    /// when the reconnect policy says to stay disconnected.
    pub fn reconnect_delay_ms(&mut self) -> Option<f64> {
        self.session
            .borrow_mut()
            .next_reconnect_delay()
            .map(|ms| ms as f64)
    }

    /// Open a fresh socket to the configured service. The old socket is
    /// detached first so its late events cannot reach the new session state.
    pub fn reconnect(&mut self) -> Result<(), JsValue> {
        let url = self.session.borrow().config().service_url.clone();
        detach(&self.session.borrow().connector().transport().socket);
        let socket = open_socket(&url)?;
        self.session.borrow_mut().reconnect(WsTransport {
            socket: socket.clone(),
        });
        self.handlers = attach(&socket, &self.session, &self.on_change);
        Ok(())
    }
}

fn open_socket(url: &str) -> Result<WebSocket, JsValue> {
    log::info!("connecting to route service at {url}");
    WebSocket::new(url)
}

/// Route socket events into the session. Handlers hold the session
/// weakly so a dropped picker stops reacting.
fn attach(socket: &WebSocket, session: &SharedSession, on_change: &ChangeHook) -> SocketHandlers {
    let open = {
        let (session, hook) = (Rc::downgrade(session), on_change.clone());
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            with_session(&session, &hook, |s| s.on_open());
        })
    };
    let message = {
        let (session, hook) = (Rc::downgrade(session), on_change.clone());
        Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => with_session(&session, &hook, |s| s.on_frame(&text)),
                None => log::warn!("ignoring non-text frame from route service"),
            }
        })
    };
    let close = {
        let (session, hook) = (Rc::downgrade(session), on_change.clone());
        Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            log::info!("socket closed: code {} {}", event.code(), event.reason());
            with_session(&session, &hook, |s| s.on_close());
        })
    };
    let error = {
        let (session, hook) = (Rc::downgrade(session), on_change.clone());
        Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            with_session(&session, &hook, |s| s.on_transport_error("websocket error"));
        })
    };

    socket.set_onopen(Some(open.as_ref().unchecked_ref()));
    socket.set_onmessage(Some(message.as_ref().unchecked_ref()));
    socket.set_onclose(Some(close.as_ref().unchecked_ref()));
    socket.set_onerror(Some(error.as_ref().unchecked_ref()));

    SocketHandlers {
        _open: open,
        _message: message,
        _close: close,
        _error: error,
    }
}

fn detach(socket: &WebSocket) {
    socket.set_onopen(None);
    socket.set_onmessage(None);
    socket.set_onclose(None);
    socket.set_onerror(None);
}

fn with_session(
    session: &Weak<RefCell<Session<WsTransport>>>,
    hook: &ChangeHook,
    f: impl FnOnce(&mut Session<WsTransport>) -> bool,
) {
    let Some(session) = session.upgrade() else {
        return;
    };
    let changed = match session.try_borrow_mut() {
        Ok(mut s) => f(&mut s),
        Err(_) => {
            log::warn!("socket event arrived while the session was busy; dropped");
            return;
        }
    };
    if changed {
        if let Some(callback) = hook.borrow().as_ref() {
            let _ = callback.call0(&JsValue::NULL);
        }
    }
}

fn load_config(json: &str) -> Result<ClientConfig, String> {
    if json.trim().is_empty() {
        return Ok(ClientConfig::default());
    }
    ClientConfig::from_json(json).map_err(|e| e.to_string())
}

fn notices_json(notices: &[Notice]) -> String {
    let items: Vec<serde_json::Value> = notices
        .iter()
        .map(|n| {
            let level = match n.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            serde_json::json!({ "level": level, "message": n.message })
        })
        .collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

/// Set up a panic hook that logs to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("route picker panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(load_config("  ").unwrap(), ClientConfig::default());
        assert!(load_config(r#"{"vertex_hit_radius":0}"#).is_err());
    }

    #[test]
    fn notices_serialize_for_the_page() {
        let json = notices_json(&[
            Notice::info("v0 set as start"),
            Notice::error("disconnected"),
        ]);
        assert_eq!(
            json,
            r#"[{"level":"info","message":"v0 set as start"},{"level":"error","message":"disconnected"}]"#
        );
    }
}
