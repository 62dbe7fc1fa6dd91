//! Tokio runtime for the scale session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Mirrors the browser runtime: socket tasks and timers only push
//! [`SessionEvent`]s into one unbounded channel, and a single task owns the
//! [`ScaleSession`], executes its effects, and publishes each new
//! [`ScaleState`] on a `watch` channel for the command handlers.
//!
//! Each open channel gets its own socket task with a private writer queue.
//! Timers are spawned sleeps; aborting the task cancels the timer. Dropping
//! the runtime aborts the socket task and every pending timer.

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

use std::time::Duration;

use filascale_client::config::ClientConfig;
use filascale_client::net::requests::CommandError;
use filascale_client::net::{Effect, ScaleSession, SessionEvent, UserAction};
use filascale_client::state::scale::ScaleState;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::CliError;

enum Input {
    Event(SessionEvent),
    Action(UserAction, oneshot::Sender<Result<(), CommandError>>),
}

/// Handle to a session running on the tokio runtime.
pub struct ScaleClient {
    inputs: mpsc::UnboundedSender<Input>,
    state: watch::Receiver<ScaleState>,
    max_attempts: u32,
    task: JoinHandle<()>,
}

impl ScaleClient {
    /// Spawn the session task and start connecting.
    #[must_use]
    pub fn spawn(config: ClientConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let max_attempts = config.max_reconnect_attempts;
        let session = ScaleSession::new(config);
        let (state_tx, state_rx) = watch::channel(session.state().clone());
        let runtime = TokioRuntime::new(tx.clone());
        let task = tokio::spawn(run_session(session, runtime, rx, state_tx));
        Self { inputs: tx, state: state_rx, max_attempts, task }
    }

    /// Run a user action through the session.
    ///
    /// # Errors
    ///
    /// The session's rejection, or [`CliError::RuntimeStopped`].
    pub async fn perform(&self, action: UserAction) -> Result<(), CliError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inputs
            .send(Input::Action(action, reply_tx))
            .map_err(|_| CliError::RuntimeStopped)?;
        reply_rx.await.map_err(|_| CliError::RuntimeStopped)?.map_err(CliError::from)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Latest published state.
    #[must_use]
    pub fn snapshot(&self) -> ScaleState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScaleState> {
        self.state.clone()
    }

    /// Wait until `ready` holds for the published state.
    ///
    /// # Errors
    ///
    /// [`CliError::Timeout`] after `timeout`, or [`CliError::ConnectionFailed`]
    /// if the retry budget runs out first.
    pub async fn wait_until(
        &mut self,
        timeout: Duration,
        ready: impl Fn(&ScaleState) -> bool,
    ) -> Result<ScaleState, CliError> {
        let wait = self.state.wait_for(|state| state.is_failed() || ready(state));
        let state = tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| CliError::Timeout)?
            .map_err(|_| CliError::RuntimeStopped)?
            .clone();
        if !ready(&state) && state.is_failed() {
            return Err(CliError::ConnectionFailed(self.max_attempts));
        }
        Ok(state)
    }

    /// Wait for the first vessel snapshot, which also proves the channel is up.
    ///
    /// # Errors
    ///
    /// See [`Self::wait_until`].
    pub async fn ready(&mut self, timeout: Duration) -> Result<ScaleState, CliError> {
        self.wait_until(timeout, |state| state.vessels.rev > 0).await
    }

    /// Wait for the next status line reported by the device.
    ///
    /// # Errors
    ///
    /// See [`Self::wait_until`].
    pub async fn next_status(&mut self, after_rev: u64, timeout: Duration) -> Result<ScaleState, CliError> {
        self.wait_until(timeout, |state| state.status_rev > after_rev).await
    }
}

impl Drop for ScaleClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_session(
    mut session: ScaleSession,
    mut runtime: TokioRuntime,
    mut rx: mpsc::UnboundedReceiver<Input>,
    state: watch::Sender<ScaleState>,
) {
    runtime.execute(session.start());
    state.send_replace(session.state().clone());

    while let Some(input) = rx.recv().await {
        match input {
            Input::Event(event) => {
                tracing::trace!(?event, "session event");
                let effects = session.handle(event);
                runtime.execute(effects);
            }
            Input::Action(action, reply) => {
                let result = session.perform(action).map(|effects| runtime.execute(effects));
                let _ = reply.send(result);
            }
        }
        state.send_replace(session.state().clone());
    }
}

struct TokioRuntime {
    inputs: mpsc::UnboundedSender<Input>,
    writer: Option<mpsc::UnboundedSender<String>>,
    socket: Option<JoinHandle<()>>,
    settle: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
}

impl TokioRuntime {
    fn new(inputs: mpsc::UnboundedSender<Input>) -> Self {
        Self { inputs, writer: None, socket: None, settle: None, reconnect: None }
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Open { url } => self.open(url),
                Effect::Transmit(text) => self.transmit(text),
                Effect::ScheduleSettle { delay, generation } => {
                    abort(self.settle.take());
                    self.settle = Some(self.timer(delay, SessionEvent::SettleElapsed { generation }));
                }
                Effect::ScheduleReconnect { delay } => {
                    abort(self.reconnect.take());
                    self.reconnect = Some(self.timer(delay, SessionEvent::ReconnectDue));
                }
                Effect::CancelReconnect => abort(self.reconnect.take()),
            }
        }
    }

    fn open(&mut self, url: String) {
        abort(self.socket.take());
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        self.writer = Some(writer_tx);
        self.socket = Some(tokio::spawn(run_socket(url, self.inputs.clone(), writer_rx)));
    }

    fn transmit(&self, text: String) {
        let sent = self.writer.as_ref().is_some_and(|writer| writer.send(text).is_ok());
        if !sent {
            tracing::warn!("socket task gone; outbound frame dropped");
        }
    }

    fn timer(&self, delay: Duration, event: SessionEvent) -> JoinHandle<()> {
        let inputs = self.inputs.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = inputs.send(Input::Event(event));
        })
    }
}

impl Drop for TokioRuntime {
    fn drop(&mut self) {
        abort(self.socket.take());
        abort(self.settle.take());
        abort(self.reconnect.take());
    }
}

fn abort(task: Option<JoinHandle<()>>) {
    if let Some(task) = task {
        task.abort();
    }
}

/// Own one websocket until it closes, translating its lifecycle into events.
async fn run_socket(url: String, inputs: mpsc::UnboundedSender<Input>, mut outbound: mpsc::UnboundedReceiver<String>) {
    let emit = |event: SessionEvent| {
        let _ = inputs.send(Input::Event(event));
    };

    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(error) => {
            tracing::warn!(%url, %error, "websocket connect failed");
            emit(SessionEvent::ErrorOccurred(error.to_string()));
            emit(SessionEvent::Closed);
            return;
        }
    };
    tracing::info!(%url, "websocket connected");
    emit(SessionEvent::Opened);

    let (mut write, mut read) = stream.split();
    loop {
        tokio::select! {
            outgoing = outbound.recv() => {
                let Some(text) = outgoing else {
                    let _ = write.close().await;
                    return;
                };
                tracing::debug!(frame = %text, "send");
                if let Err(error) = write.send(Message::Text(text.into())).await {
                    emit(SessionEvent::ErrorOccurred(error.to_string()));
                    break;
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(frame = %text.as_str(), "recv");
                    emit(SessionEvent::FrameReceived(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    emit(SessionEvent::ErrorOccurred(error.to_string()));
                    break;
                }
            },
        }
    }
    tracing::info!(%url, "websocket closed");
    emit(SessionEvent::Closed);
}
