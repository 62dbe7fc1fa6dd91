//! Session configuration: endpoint, backoff budget, and device limits.
//!
//! Defaults mirror the device firmware and its bundled web page: a 2 s first
//! retry growing by 1.5x, five reconnect attempts, a 500 ms settle pause after
//! open, and at most ten stored vessels.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

/// Path of the control channel on the device.
pub const ENDPOINT_PATH: &str = "/ws";
pub const DEFAULT_INITIAL_RECONNECT_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
/// Vessel slots available on the device.
pub const DEVICE_MAX_VESSELS: usize = 10;
/// Longest vessel name the device stores (a 32-byte C string).
pub const DEVICE_MAX_NAME_LEN: usize = 31;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Full websocket URL, e.g. `ws://192.168.4.1/ws`.
    pub endpoint: String,
    pub initial_reconnect_delay: Duration,
    pub max_reconnect_attempts: u32,
    /// Pause between open and the first command.
    pub settle_delay: Duration,
    pub max_vessels: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_host("localhost")
    }
}

impl ClientConfig {
    /// Config for a device reachable at `host`.
    ///
    /// `host` may be bare (`192.168.4.1:80`) or carry an `http`, `https`,
    /// `ws`, or `wss` scheme; secure schemes select `wss`.
    #[must_use]
    pub fn for_host(host: &str) -> Self {
        Self::with_endpoint(endpoint_for_host(host))
    }

    /// Config derived from a page origin (`location.protocol`, `location.host`).
    #[must_use]
    pub fn for_origin(protocol: &str, host: &str) -> Self {
        Self::with_endpoint(endpoint_for_origin(protocol, host))
    }

    fn with_endpoint(endpoint: String) -> Self {
        Self {
            endpoint,
            initial_reconnect_delay: DEFAULT_INITIAL_RECONNECT_DELAY,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_vessels: DEVICE_MAX_VESSELS,
        }
    }
}

/// Build the channel URL for a page origin.
#[must_use]
pub fn endpoint_for_origin(protocol: &str, host: &str) -> String {
    let scheme = if protocol.starts_with("https") { "wss" } else { "ws" };
    format!("{scheme}://{}{ENDPOINT_PATH}", host.trim_end_matches('/'))
}

/// Build the channel URL for a user-supplied host string.
#[must_use]
pub fn endpoint_for_host(host: &str) -> String {
    let host = host.trim();
    for (prefix, protocol) in [("https://", "https:"), ("wss://", "https:"), ("http://", "http:"), ("ws://", "http:")] {
        if let Some(rest) = host.strip_prefix(prefix) {
            let rest = rest.trim_end_matches('/');
            let rest = rest.strip_suffix(ENDPOINT_PATH).unwrap_or(rest);
            return endpoint_for_origin(protocol, rest);
        }
    }
    endpoint_for_origin("http:", host)
}
