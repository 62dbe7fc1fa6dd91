//! Inbound frame classification.
//!
//! Each decoded frame is split into typed updates and applied to the display
//! state in a fixed order. Fields are independent and may co-occur.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use filascale_frames::{CodecError, InboundFrame, Update, decode_inbound};

use crate::state::scale::{FilamentReading, ScaleState};
use crate::util::format::format_grams;

/// Status substring that means the vessel table changed on the device.
pub const RESYNC_MARKER: &str = "Vessel";

/// Follow-up required after routing a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// The status line mentioned vessels; request a fresh snapshot.
    pub resync: bool,
}

/// Decode a text frame and apply it.
///
/// # Errors
///
/// Returns the decode error untouched; `state` is not modified in that case.
pub fn route_text(state: &mut ScaleState, text: &str) -> Result<RouteOutcome, CodecError> {
    let frame = decode_inbound(text)?;
    Ok(apply_frame(state, frame))
}

/// Apply every update carried by `frame`.
pub fn apply_frame(state: &mut ScaleState, frame: InboundFrame) -> RouteOutcome {
    let live = state.intent.live_updates_enabled;
    let has_filament = frame.filament_weight.is_some();
    let mut outcome = RouteOutcome::default();

    for update in frame.into_updates() {
        match update {
            Update::Weight(grams) => {
                if live {
                    state.total_weight = Some(format_grams(grams));
                }
            }
            Update::FilamentWeight(grams) => {
                state.filament = FilamentReading::Weight(format_grams(grams));
            }
            Update::Vessels(snapshot) => {
                log::debug!("vessel snapshot with {} entries", snapshot.len());
                state.vessels.replace(snapshot);
            }
            Update::SelectedVessel(index) => {
                state.selected_vessel = usize::try_from(index).ok();
            }
            Update::Status(status) => {
                outcome.resync |= status.contains(RESYNC_MARKER);
                state.apply_server_status(status);
            }
        }
    }

    if live && !has_filament {
        state.filament = FilamentReading::NoVesselSelected;
    }
    outcome
}
