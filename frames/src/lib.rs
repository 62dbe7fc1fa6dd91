//! Shared wire model and JSON text codec for the scale control channel.
//!
//! This crate owns the representation of everything that crosses the
//! websocket: outbound [`Command`] objects tagged by their `command` field,
//! and inbound status frames whose fields are all optional and may co-occur.
//! Inbound frames are decoded into [`InboundFrame`] and then split into a list
//! of typed [`Update`]s so consumers never touch raw JSON.

use serde::{Deserialize, Serialize};

/// Error returned by [`decode_inbound`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text was not JSON, or a known field had the wrong type.
    #[error("failed to decode inbound frame: {0}")]
    Json(#[from] serde_json::Error),
    /// The text was valid JSON but not an object.
    #[error("inbound frame is not a JSON object")]
    NotAnObject,
    /// The frame decoded but carried none of the known fields.
    #[error("inbound frame has no recognized fields")]
    UnrecognizedShape,
    /// A known field decoded but violates its value constraints.
    #[error("invalid value for field `{0}`")]
    InvalidField(&'static str),
}

/// A named container profile stored on the device.
///
/// Identity is positional: the same vessel is addressed by its index in the
/// most recent snapshot, never by a stable ID.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub name: String,
    /// Empty container weight in grams.
    pub vessel_weight: f64,
    /// Empty spool weight in grams.
    pub spool_weight: f64,
}

impl Vessel {
    #[must_use]
    pub fn new(name: impl Into<String>, vessel_weight: f64, spool_weight: f64) -> Self {
        Self { name: name.into(), vessel_weight, spool_weight }
    }

    /// Filament left on the spool for a given total reading.
    #[must_use]
    pub fn filament_weight(&self, total: f64) -> f64 {
        total - self.vessel_weight - self.spool_weight
    }
}

/// Outbound command sent from the client to the device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Request a full vessel snapshot.
    GetVessels,
    /// Subscribe to (or stop) streamed weight telemetry.
    ToggleUpdates { enabled: bool },
    /// Zero the scale.
    Tare,
    /// Calibrate against a known reference weight in grams.
    Calibrate { weight: f64 },
    /// Make the vessel at `index` the active one.
    SelectVessel { index: usize },
    AddVessel { vessel: Vessel },
    UpdateVessel { index: usize, vessel: Vessel },
    DeleteVessel { index: usize },
}

impl Command {
    /// Wire name of the command, as found in the `command` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetVessels => "getVessels",
            Self::ToggleUpdates { .. } => "toggleUpdates",
            Self::Tare => "tare",
            Self::Calibrate { .. } => "calibrate",
            Self::SelectVessel { .. } => "selectVessel",
            Self::AddVessel { .. } => "addVessel",
            Self::UpdateVessel { .. } => "updateVessel",
            Self::DeleteVessel { .. } => "deleteVessel",
        }
    }
}

/// Inbound frame as it appears on the wire. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filament_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vessel: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vessels: Option<Vec<Vessel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl InboundFrame {
    /// True when none of the known fields is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weight.is_none()
            && self.filament_weight.is_none()
            && self.selected_vessel.is_none()
            && self.vessels.is_none()
            && self.status.is_none()
    }

    /// Split the frame into typed updates.
    ///
    /// Order is fixed: readings first, then the snapshot, then selection, then
    /// status. Selection follows the snapshot so it is checked against the
    /// list delivered in the same frame.
    #[must_use]
    pub fn into_updates(self) -> Vec<Update> {
        let mut updates = Vec::new();
        if let Some(weight) = self.weight {
            updates.push(Update::Weight(weight));
        }
        if let Some(filament) = self.filament_weight {
            updates.push(Update::FilamentWeight(filament));
        }
        if let Some(vessels) = self.vessels {
            updates.push(Update::Vessels(vessels));
        }
        if let Some(index) = self.selected_vessel {
            updates.push(Update::SelectedVessel(index));
        }
        if let Some(status) = self.status {
            updates.push(Update::Status(status));
        }
        updates
    }

    fn validate(&self) -> Result<(), CodecError> {
        if self.weight.is_some_and(|w| !w.is_finite()) {
            return Err(CodecError::InvalidField("weight"));
        }
        if self.filament_weight.is_some_and(|w| !w.is_finite()) {
            return Err(CodecError::InvalidField("filamentWeight"));
        }
        if let Some(vessels) = &self.vessels {
            for vessel in vessels {
                if !vessel.vessel_weight.is_finite() || vessel.vessel_weight < 0.0 {
                    return Err(CodecError::InvalidField("vesselWeight"));
                }
                if !vessel.spool_weight.is_finite() || vessel.spool_weight < 0.0 {
                    return Err(CodecError::InvalidField("spoolWeight"));
                }
            }
        }
        Ok(())
    }
}

/// One typed piece of information carried by an inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Update {
    /// Total weight on the scale, in grams.
    Weight(f64),
    /// Filament weight for the selected vessel, in grams.
    FilamentWeight(f64),
    /// Full replacement list of vessels.
    Vessels(Vec<Vessel>),
    /// Index of the device's active vessel; negative means none.
    SelectedVessel(i64),
    /// Human-readable status line from the device.
    Status(String),
}

/// Encode a command as a JSON text frame.
///
/// # Errors
///
/// Returns the serializer error; in practice this only happens for
/// non-finite floats, which the command builders reject up front.
pub fn encode_command(command: &Command) -> Result<String, serde_json::Error> {
    serde_json::to_string(command)
}

/// Decode a JSON text frame from the device.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text or mistyped fields,
/// [`CodecError::NotAnObject`] for arrays and scalars,
/// [`CodecError::UnrecognizedShape`] when no known field is present, and
/// [`CodecError::InvalidField`] for out-of-range values.
pub fn decode_inbound(text: &str) -> Result<InboundFrame, CodecError> {
    let value = serde_json::from_str::<serde_json::Value>(text)?;
    if !value.is_object() {
        return Err(CodecError::NotAnObject);
    }
    let frame = serde_json::from_value::<InboundFrame>(value)?;
    if frame.is_empty() {
        return Err(CodecError::UnrecognizedShape);
    }
    frame.validate()?;
    Ok(frame)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
