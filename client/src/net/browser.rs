//! Browser runtime for [`ScaleSession`], built on `web_sys::WebSocket`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Socket callbacks and timers never touch the session directly. They push
//! [`SessionEvent`]s into one unbounded channel; a single `spawn_local` task
//! drains it, feeds the session, executes the returned effects, and publishes
//! a fresh [`ScaleState`] into a Leptos signal after every input.
//!
//! Timers are `gloo_timers` timeouts held by the runtime. Replacing or
//! dropping one cancels it, which is how `CancelReconnect` is carried out.

use futures::StreamExt;
use futures::channel::{mpsc, oneshot};
use gloo_timers::callback::Timeout;
use leptos::prelude::{RwSignal, Set};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::config::ClientConfig;
use crate::net::connection::Effect;
use crate::net::requests::CommandError;
use crate::net::session::{ScaleSession, SessionEvent, UserAction};
use crate::state::scale::ScaleState;

enum Input {
    Event(SessionEvent),
    Action(UserAction, oneshot::Sender<Result<(), CommandError>>),
}

/// Cheap, clonable front-end handle to the running session.
#[derive(Clone)]
pub struct ScaleHandle {
    inputs: mpsc::UnboundedSender<Input>,
    /// Latest display state, updated after every event and action.
    pub state: RwSignal<ScaleState>,
}

impl ScaleHandle {
    /// Run a user action and wait for its outcome.
    ///
    /// # Errors
    ///
    /// Whatever the session rejected the action with, or
    /// [`CommandError::NotConnected`] if the runtime is gone.
    pub async fn perform(&self, action: UserAction) -> Result<(), CommandError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.inputs.unbounded_send(Input::Action(action, reply_tx)).is_err() {
            return Err(CommandError::NotConnected);
        }
        reply_rx.await.unwrap_or(Err(CommandError::NotConnected))
    }

    /// Fire-and-forget variant of [`Self::perform`]; failures are logged.
    pub fn dispatch(&self, action: UserAction) {
        let handle = self.clone();
        leptos::task::spawn_local(async move {
            if let Err(err) = handle.perform(action).await {
                log::warn!("action failed: {err}");
            }
        });
    }
}

/// Config for the device that served this page.
#[must_use]
pub fn config_from_location() -> ClientConfig {
    let location = web_sys::window().map(|window| window.location());
    let protocol = location.as_ref().and_then(|l| l.protocol().ok()).unwrap_or_else(|| "http:".to_owned());
    let host = location.as_ref().and_then(|l| l.host().ok()).unwrap_or_else(|| "localhost".to_owned());
    ClientConfig::for_origin(&protocol, &host)
}

/// Start the session loop and return a handle to it.
#[must_use]
pub fn spawn_scale_session(config: ClientConfig) -> ScaleHandle {
    let (tx, rx) = mpsc::unbounded::<Input>();
    let session = ScaleSession::new(config);
    let state = RwSignal::new(session.state().clone());
    leptos::task::spawn_local(run_session(session, BrowserRuntime::new(tx.clone()), rx, state));
    ScaleHandle { inputs: tx, state }
}

async fn run_session(
    mut session: ScaleSession,
    mut runtime: BrowserRuntime,
    mut rx: mpsc::UnboundedReceiver<Input>,
    state: RwSignal<ScaleState>,
) {
    runtime.execute(session.start());
    state.set(session.state().clone());

    while let Some(input) = rx.next().await {
        match input {
            Input::Event(event) => {
                let effects = session.handle(event);
                runtime.execute(effects);
            }
            Input::Action(action, reply) => {
                let result = session.perform(action).map(|effects| runtime.execute(effects));
                let _ = reply.send(result);
            }
        }
        state.set(session.state().clone());
    }
}

/// Callbacks attached to the live socket. Dropping them detaches nothing on
/// their own, so [`BrowserRuntime::close_socket`] clears the handlers first.
struct SocketHandlers {
    _on_open: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
}

struct BrowserRuntime {
    inputs: mpsc::UnboundedSender<Input>,
    socket: Option<(WebSocket, SocketHandlers)>,
    settle: Option<Timeout>,
    reconnect: Option<Timeout>,
}

impl BrowserRuntime {
    fn new(inputs: mpsc::UnboundedSender<Input>) -> Self {
        Self { inputs, socket: None, settle: None, reconnect: None }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Open { url } => self.open(&url),
                Effect::Transmit(text) => self.transmit(&text),
                Effect::ScheduleSettle { delay, generation } => {
                    self.settle = Some(self.timer(delay, SessionEvent::SettleElapsed { generation }));
                }
                Effect::ScheduleReconnect { delay } => {
                    self.reconnect = Some(self.timer(delay, SessionEvent::ReconnectDue));
                }
                Effect::CancelReconnect => {
                    self.reconnect = None;
                }
            }
        }
    }

    fn open(&mut self, url: &str) {
        self.close_socket();
        let socket = match WebSocket::new(url) {
            Ok(socket) => socket,
            Err(err) => {
                log::error!("failed to create websocket for {url}: {err:?}");
                self.emit(SessionEvent::ErrorOccurred(format!("{err:?}")));
                self.emit(SessionEvent::Closed);
                return;
            }
        };

        let tx = self.inputs.clone();
        let on_open = Closure::wrap(Box::new(move |_: Event| {
            let _ = tx.unbounded_send(Input::Event(SessionEvent::Opened));
        }) as Box<dyn FnMut(Event)>);
        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let tx = self.inputs.clone();
        let on_close = Closure::wrap(Box::new(move |event: CloseEvent| {
            log::info!("websocket closed (code {})", event.code());
            let _ = tx.unbounded_send(Input::Event(SessionEvent::Closed));
        }) as Box<dyn FnMut(CloseEvent)>);
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let tx = self.inputs.clone();
        let on_error = Closure::wrap(Box::new(move |event: Event| {
            let _ = tx.unbounded_send(Input::Event(SessionEvent::ErrorOccurred(format!("websocket {}", event.type_()))));
        }) as Box<dyn FnMut(Event)>);
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let tx = self.inputs.clone();
        let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Some(text) = event.data().as_string() {
                let _ = tx.unbounded_send(Input::Event(SessionEvent::FrameReceived(text)));
            } else {
                log::warn!("ignoring non-text websocket message");
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let handlers = SocketHandlers {
            _on_open: on_open,
            _on_close: on_close,
            _on_error: on_error,
            _on_message: on_message,
        };
        self.socket = Some((socket, handlers));
    }

    fn close_socket(&mut self) {
        if let Some((socket, _handlers)) = self.socket.take() {
            socket.set_onopen(None);
            socket.set_onclose(None);
            socket.set_onerror(None);
            socket.set_onmessage(None);
            let _ = socket.close();
        }
    }

    fn transmit(&self, text: &str) {
        let Some((socket, _)) = &self.socket else {
            log::warn!("no socket for outbound frame");
            return;
        };
        if let Err(err) = socket.send_with_str(text) {
            log::warn!("websocket send failed: {err:?}");
        }
    }

    fn timer(&self, delay: std::time::Duration, event: SessionEvent) -> Timeout {
        let tx = self.inputs.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, move || {
            let _ = tx.unbounded_send(Input::Event(event));
        })
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.inputs.unbounded_send(Input::Event(event));
    }
}
