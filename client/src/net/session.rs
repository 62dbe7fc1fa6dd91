//! The scale session: one object owning all client-side connection state.
//!
//! SYSTEM CONTEXT
//! ==============
//! A runtime (browser or terminal) owns exactly one `ScaleSession` and feeds
//! it from a single consumer: lifecycle events and timer expiries through
//! [`ScaleSession::handle`], user actions through [`ScaleSession::perform`].
//! Both return [`Effect`]s for the runtime to execute. The session itself
//! performs no I/O, which keeps every transition testable without sockets.
//!
//! ERROR HANDLING
//! ==============
//! Malformed inbound frames are logged and dropped. User commands issued
//! while the channel is down fail with [`CommandError::NotConnected`] and are
//! not queued. Follow-up commands the session sends on its own (snapshot
//! request, intent replay, resync) are dropped with a log line instead.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use filascale_frames::{Command, Vessel, encode_command};

use crate::config::ClientConfig;
use crate::net::connection::{CloseOutcome, ConnectionManager, Effect};
use crate::net::requests::{
    CommandError, build_add_vessel, build_calibrate, build_delete_vessel, build_select_vessel, build_update_vessel,
};
use crate::net::router::route_text;
use crate::state::scale::{
    ConnectionStatus, STATUS_CONNECTED, STATUS_CONNECTION_ERROR, STATUS_CONNECTION_FAILED, STATUS_RECONNECTING,
    STATUS_TARING, STATUS_VESSELS_FAILED, ScaleState,
};

/// Notification delivered to the session by its runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    Closed,
    ErrorOccurred(String),
    FrameReceived(String),
    /// The settle timer scheduled for `generation` fired.
    SettleElapsed { generation: u64 },
    /// The reconnect timer fired.
    ReconnectDue,
}

/// Something the user asked for.
#[derive(Clone, Debug, PartialEq)]
pub enum UserAction {
    ToggleLiveUpdates,
    Tare,
    Calibrate { weight: f64 },
    RefreshVessels,
    SelectVessel(usize),
    AddVessel(Vessel),
    UpdateVessel { index: usize, vessel: Vessel },
    DeleteVessel(usize),
}

#[derive(Clone, Debug)]
pub struct ScaleSession {
    config: ClientConfig,
    connection: ConnectionManager,
    state: ScaleState,
}

impl ScaleSession {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let connection = ConnectionManager::new(&config);
        Self { config, connection, state: ScaleState::default() }
    }

    #[must_use]
    pub fn state(&self) -> &ScaleState {
        &self.state
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    /// Effects for the first connection attempt.
    pub fn start(&mut self) -> Vec<Effect> {
        self.connect()
    }

    /// React to a lifecycle notification or timer.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Opened => self.on_opened(),
            SessionEvent::Closed => self.on_closed(),
            SessionEvent::ErrorOccurred(message) => {
                log::warn!("channel error: {message}");
                if !self.connection.is_failed() {
                    self.state.set_local_status(STATUS_CONNECTION_ERROR);
                }
                Vec::new()
            }
            SessionEvent::FrameReceived(text) => self.on_frame(&text),
            SessionEvent::SettleElapsed { generation } => self.on_settled(generation),
            SessionEvent::ReconnectDue => self.connection.reconnect_due().map_or_else(Vec::new, |effect| {
                self.state.connection_status = ConnectionStatus::Connecting;
                vec![effect]
            }),
        }
    }

    /// Carry out a user action.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotConnected`] when the channel is not open (except
    /// for toggling live updates, which is remembered and replayed), or a
    /// validation error for the command's arguments.
    pub fn perform(&mut self, action: UserAction) -> Result<Vec<Effect>, CommandError> {
        if action != UserAction::ToggleLiveUpdates && !self.connection.is_open() {
            log::warn!("dropping {action:?}: not connected");
            return Err(CommandError::NotConnected);
        }

        let command = match action {
            UserAction::ToggleLiveUpdates => return self.toggle_live_updates(),
            UserAction::Tare => Command::Tare,
            UserAction::Calibrate { weight } => build_calibrate(weight)?,
            UserAction::RefreshVessels => Command::GetVessels,
            UserAction::SelectVessel(index) => build_select_vessel(&self.state.vessels, index)?,
            UserAction::AddVessel(vessel) => build_add_vessel(&self.state.vessels, self.config.max_vessels, vessel)?,
            UserAction::UpdateVessel { index, vessel } => build_update_vessel(&self.state.vessels, index, vessel)?,
            UserAction::DeleteVessel(index) => build_delete_vessel(&self.state.vessels, index)?,
        };
        let effect = self.transmit(&command)?;
        if command == Command::Tare {
            self.state.set_local_status(STATUS_TARING);
        }
        Ok(vec![effect])
    }

    /// Flip the intent; tell the device only if it can hear us. Otherwise the
    /// new value is replayed after the next open.
    fn toggle_live_updates(&mut self) -> Result<Vec<Effect>, CommandError> {
        let enabled = self.state.intent.toggle_live_updates();
        log::info!("live updates {}", if enabled { "enabled" } else { "disabled" });
        if !self.connection.is_open() {
            return Ok(Vec::new());
        }
        Ok(vec![self.transmit(&Command::ToggleUpdates { enabled })?])
    }

    fn connect(&mut self) -> Vec<Effect> {
        match self.connection.connect() {
            Some(effect) => {
                self.state.connection_status = ConnectionStatus::Connecting;
                vec![effect]
            }
            None => Vec::new(),
        }
    }

    fn on_opened(&mut self) -> Vec<Effect> {
        log::info!("channel open");
        self.state.connection_status = ConnectionStatus::Connected;
        self.state.set_local_status(STATUS_CONNECTED);
        self.connection.on_open()
    }

    fn on_closed(&mut self) -> Vec<Effect> {
        let (outcome, effect) = self.connection.on_close();
        match outcome {
            CloseOutcome::Scheduled(_) | CloseOutcome::AlreadyPending => {
                self.state.connection_status = ConnectionStatus::Disconnected;
                self.state.set_local_status(STATUS_RECONNECTING);
            }
            CloseOutcome::Exhausted => {
                self.state.connection_status = ConnectionStatus::Failed;
                self.state.set_local_status(STATUS_CONNECTION_FAILED);
            }
        }
        effect.into_iter().collect()
    }

    fn on_frame(&mut self, text: &str) -> Vec<Effect> {
        match route_text(&mut self.state, text) {
            Ok(outcome) if outcome.resync => self.send_internal(&Command::GetVessels).into_iter().collect(),
            Ok(_) => Vec::new(),
            Err(err) => {
                log::warn!("dropping inbound frame: {err}");
                Vec::new()
            }
        }
    }

    fn on_settled(&mut self, generation: u64) -> Vec<Effect> {
        if !self.connection.settle_is_current(generation) {
            log::debug!("ignoring settle timer for stale generation {generation}");
            return Vec::new();
        }
        let mut effects = Vec::with_capacity(2);
        match self.send_internal(&Command::GetVessels) {
            Some(effect) => effects.push(effect),
            None => self.state.set_local_status(STATUS_VESSELS_FAILED),
        }
        if self.state.intent.live_updates_enabled {
            log::info!("restoring live updates");
            effects.extend(self.send_internal(&Command::ToggleUpdates { enabled: true }));
        }
        effects
    }

    /// Send a command the session issues on its own; failures are logged.
    fn send_internal(&self, command: &Command) -> Option<Effect> {
        match self.transmit(command) {
            Ok(effect) => Some(effect),
            Err(err) => {
                log::warn!("dropping {}: {err}", command.name());
                None
            }
        }
    }

    fn transmit(&self, command: &Command) -> Result<Effect, CommandError> {
        let text = encode_command(command)?;
        log::debug!("send {text}");
        self.connection.send(text).ok_or(CommandError::NotConnected)
    }
}
