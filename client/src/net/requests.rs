//! Outbound command builders with local pre-flight checks.
//!
//! The device stays authoritative: these checks only catch requests that it
//! would certainly reject (indices outside the mirrored list, names that do
//! not fit its storage, a full vessel table). Outcomes still arrive through
//! the generic status line.

#[cfg(test)]
#[path = "requests_test.rs"]
mod requests_test;

use filascale_frames::{Command, Vessel};

use crate::config::DEVICE_MAX_NAME_LEN;
use crate::state::vessels::VesselRegistry;

/// A vessel payload or index the device would not accept.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VesselError {
    #[error("vessel name must not be empty")]
    EmptyName,
    #[error("vessel name is {len} bytes, the device stores at most {max}")]
    NameTooLong { len: usize, max: usize },
    #[error("{field} must be a finite, non-negative number of grams")]
    InvalidWeight { field: &'static str },
    #[error("vessel index {index} is out of range ({len} vessels known)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("the device already holds the maximum of {max} vessels")]
    RegistryFull { max: usize },
}

/// Why a user action produced no outbound frame.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The channel is not open; the command was dropped, not queued.
    #[error("not connected to the scale, command dropped")]
    NotConnected,
    #[error(transparent)]
    Vessel(#[from] VesselError),
    #[error("calibration weight must be a positive number of grams, got {0}")]
    InvalidCalibrationWeight(f64),
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Check a vessel payload against what the device can store.
///
/// # Errors
///
/// Returns the first [`VesselError`] found.
pub fn validate_vessel(vessel: &Vessel) -> Result<(), VesselError> {
    if vessel.name.trim().is_empty() {
        return Err(VesselError::EmptyName);
    }
    if vessel.name.len() > DEVICE_MAX_NAME_LEN {
        return Err(VesselError::NameTooLong { len: vessel.name.len(), max: DEVICE_MAX_NAME_LEN });
    }
    if !is_valid_weight(vessel.vessel_weight) {
        return Err(VesselError::InvalidWeight { field: "vesselWeight" });
    }
    if !is_valid_weight(vessel.spool_weight) {
        return Err(VesselError::InvalidWeight { field: "spoolWeight" });
    }
    Ok(())
}

fn is_valid_weight(grams: f64) -> bool {
    grams.is_finite() && grams >= 0.0
}

fn check_index(registry: &VesselRegistry, index: usize) -> Result<(), VesselError> {
    if registry.contains_index(index) {
        Ok(())
    } else {
        Err(VesselError::IndexOutOfRange { index, len: registry.len() })
    }
}

/// # Errors
///
/// Rejects invalid payloads and a full registry.
pub fn build_add_vessel(registry: &VesselRegistry, max_vessels: usize, vessel: Vessel) -> Result<Command, VesselError> {
    validate_vessel(&vessel)?;
    if registry.len() >= max_vessels {
        return Err(VesselError::RegistryFull { max: max_vessels });
    }
    Ok(Command::AddVessel { vessel })
}

/// # Errors
///
/// Rejects invalid payloads and indices outside the mirrored list.
pub fn build_update_vessel(registry: &VesselRegistry, index: usize, vessel: Vessel) -> Result<Command, VesselError> {
    check_index(registry, index)?;
    validate_vessel(&vessel)?;
    Ok(Command::UpdateVessel { index, vessel })
}

/// # Errors
///
/// Rejects indices outside the mirrored list.
pub fn build_delete_vessel(registry: &VesselRegistry, index: usize) -> Result<Command, VesselError> {
    check_index(registry, index)?;
    Ok(Command::DeleteVessel { index })
}

/// # Errors
///
/// Rejects indices outside the mirrored list.
pub fn build_select_vessel(registry: &VesselRegistry, index: usize) -> Result<Command, VesselError> {
    check_index(registry, index)?;
    Ok(Command::SelectVessel { index })
}

/// # Errors
///
/// Rejects non-finite and non-positive reference weights.
pub fn build_calibrate(weight: f64) -> Result<Command, CommandError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(CommandError::InvalidCalibrationWeight(weight));
    }
    Ok(Command::Calibrate { weight })
}
