//! Observable display state for one scale session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session core mutates this model in response to channel lifecycle
//! events and inbound frames. Front ends (the Leptos signal in the browser,
//! the `watch` channel in the terminal client) only ever read a clone of it.

#[cfg(test)]
#[path = "scale_test.rs"]
mod scale_test;

use crate::state::intent::SessionIntent;
use crate::state::vessels::VesselRegistry;
use crate::util::format::format_reading;

pub const STATUS_CONNECTED: &str = "Connected";
pub const STATUS_RECONNECTING: &str = "Disconnected - Reconnecting...";
pub const STATUS_CONNECTION_ERROR: &str = "Connection error";
pub const STATUS_CONNECTION_FAILED: &str = "Connection failed - Please refresh page";
pub const STATUS_TARING: &str = "Taring...";
pub const STATUS_VESSELS_FAILED: &str = "Failed to load vessels";
pub const FILAMENT_PLACEHOLDER: &str = "No vessel selected";

/// Channel lifecycle as shown to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No channel yet, or the last one closed and a retry is pending.
    #[default]
    Disconnected,
    /// Handshake in progress.
    Connecting,
    Connected,
    /// Retry budget exhausted; only a restart recovers.
    Failed,
}

/// What the filament readout currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FilamentReading {
    /// Nothing received yet.
    #[default]
    Unknown,
    /// Formatted grams, two decimals.
    Weight(String),
    /// Live updates are on but the device reported no filament weight.
    NoVesselSelected,
}

impl FilamentReading {
    /// Text for the filament readout.
    #[must_use]
    pub fn display_text(&self) -> String {
        match self {
            Self::Unknown => String::new(),
            Self::Weight(grams) => format!("Filament: {grams}g"),
            Self::NoVesselSelected => FILAMENT_PLACEHOLDER.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScaleState {
    pub connection_status: ConnectionStatus,
    /// Status line, either local (lifecycle) or reported by the device.
    pub status: String,
    /// Bumped on every status reported by the device.
    pub status_rev: u64,
    /// Formatted total weight; only written while live updates are on.
    pub total_weight: Option<String>,
    pub filament: FilamentReading,
    /// Device's active vessel, as last reported.
    pub selected_vessel: Option<usize>,
    pub vessels: VesselRegistry,
    pub intent: SessionIntent,
}

impl ScaleState {
    /// Set a status produced locally by the connection lifecycle.
    pub fn set_local_status(&mut self, status: &str) {
        status.clone_into(&mut self.status);
    }

    /// Record a status line reported by the device.
    pub fn apply_server_status(&mut self, status: String) {
        self.status = status;
        self.status_rev += 1;
    }

    /// Vessel index to highlight, if the selection is inside the current list.
    #[must_use]
    pub fn highlighted_vessel(&self) -> Option<usize> {
        self.vessels.highlighted(self.selected_vessel)
    }

    /// Text for the total weight readout.
    #[must_use]
    pub fn total_text(&self) -> Option<String> {
        self.total_weight.as_ref().map(|grams| format!("Total: {grams}g"))
    }

    /// Filament left on the highlighted vessel for a raw total, computed locally.
    #[must_use]
    pub fn local_filament_text(&self, total: f64) -> Option<String> {
        let vessel = self.vessels.get(self.highlighted_vessel()?)?;
        Some(format_reading("Filament", vessel.filament_weight(total)))
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.connection_status == ConnectionStatus::Failed
    }
}
