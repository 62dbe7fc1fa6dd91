//! User-level session intent that outlives individual connections.

#[cfg(test)]
#[path = "intent_test.rs"]
mod intent_test;

/// Toggles the user set explicitly. Replayed to the device after every open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionIntent {
    /// Whether streamed weight telemetry is requested and rendered.
    pub live_updates_enabled: bool,
}

impl SessionIntent {
    /// Flip live updates and return the new value.
    pub fn toggle_live_updates(&mut self) -> bool {
        self.live_updates_enabled = !self.live_updates_enabled;
        self.live_updates_enabled
    }
}
