//! Channel lifecycle and reconnect loop, without I/O.
//!
//! DESIGN
//! ======
//! The manager never touches a socket or a timer. Each transition returns
//! [`Effect`]s that the runtime carries out, and the runtime reports back
//! through lifecycle calls. Exactly one channel is live at a time and at
//! most one reconnect timer is pending.
//!
//! Every `connect()` bumps a generation counter. Settle timers carry the
//! generation they were scheduled for, so a timer that outlived its channel
//! is recognised and ignored.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

use std::time::Duration;

use crate::config::ClientConfig;
use crate::net::backoff::ReconnectState;

/// Lifecycle of the single channel instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelState {
    /// Never connected.
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Instruction for the runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Open a new channel to `url`, replacing any previous one.
    Open { url: String },
    /// Send one text frame on the open channel.
    Transmit(String),
    /// Deliver `SettleElapsed { generation }` after `delay`.
    ScheduleSettle { delay: Duration, generation: u64 },
    /// Deliver `ReconnectDue` after `delay`.
    ScheduleReconnect { delay: Duration },
    /// Drop the pending reconnect timer, if any.
    CancelReconnect,
}

/// What a close did to the reconnect loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// A reconnect was scheduled after this delay.
    Scheduled(Duration),
    /// A reconnect was already pending; nothing new was scheduled.
    AlreadyPending,
    /// The retry budget is spent. No further attempts will be made.
    Exhausted,
}

#[derive(Clone, Debug)]
pub struct ConnectionManager {
    endpoint: String,
    settle_delay: Duration,
    state: ChannelState,
    generation: u64,
    backoff: ReconnectState,
    reconnect_pending: bool,
    failed: bool,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            settle_delay: config.settle_delay,
            state: ChannelState::Idle,
            generation: 0,
            backoff: ReconnectState::new(config.initial_reconnect_delay, config.max_reconnect_attempts),
            reconnect_pending: false,
            failed: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn backoff(&self) -> &ReconnectState {
        &self.backoff
    }

    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// True once the retry budget ran out.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Start a new channel unless one is already connecting or open.
    pub fn connect(&mut self) -> Option<Effect> {
        if self.failed || matches!(self.state, ChannelState::Connecting | ChannelState::Open) {
            return None;
        }
        self.generation += 1;
        self.state = ChannelState::Connecting;
        log::info!("connecting to {} (generation {})", self.endpoint, self.generation);
        Some(Effect::Open { url: self.endpoint.clone() })
    }

    /// Wrap a text frame for transmission, or `None` when the channel is not open.
    #[must_use]
    pub fn send(&self, text: String) -> Option<Effect> {
        self.is_open().then_some(Effect::Transmit(text))
    }

    /// The channel finished its handshake.
    pub fn on_open(&mut self) -> Vec<Effect> {
        self.state = ChannelState::Open;
        self.backoff.reset();
        let mut effects = Vec::with_capacity(2);
        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(Effect::CancelReconnect);
        }
        effects.push(Effect::ScheduleSettle { delay: self.settle_delay, generation: self.generation });
        effects
    }

    /// The channel closed, cleanly or not.
    pub fn on_close(&mut self) -> (CloseOutcome, Option<Effect>) {
        self.state = ChannelState::Closed;
        if self.failed {
            return (CloseOutcome::Exhausted, None);
        }
        if self.reconnect_pending {
            return (CloseOutcome::AlreadyPending, None);
        }
        let delay = self.backoff.next_delay();
        if self.backoff.exhausted() {
            self.failed = true;
            log::error!("giving up after {} reconnect attempts", self.backoff.max_attempts);
            return (CloseOutcome::Exhausted, None);
        }
        self.reconnect_pending = true;
        log::info!(
            "reconnecting in {}ms (attempt {}/{})",
            delay.as_millis(),
            self.backoff.attempts,
            self.backoff.max_attempts
        );
        (CloseOutcome::Scheduled(delay), Some(Effect::ScheduleReconnect { delay }))
    }

    /// The reconnect timer fired.
    pub fn reconnect_due(&mut self) -> Option<Effect> {
        if !self.reconnect_pending {
            return None;
        }
        self.reconnect_pending = false;
        self.connect()
    }

    /// True when a settle timer still belongs to the open channel.
    #[must_use]
    pub fn settle_is_current(&self, generation: u64) -> bool {
        self.is_open() && generation == self.generation
    }
}
