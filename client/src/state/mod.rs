//! Client-side state mirrored from the device.
//!
//! SYSTEM CONTEXT
//! ==============
//! `intent` holds user toggles replayed after every reconnect, `vessels`
//! mirrors the device's vessel list, and `scale` is the observable display
//! model that front ends render.

pub mod intent;
pub mod scale;
pub mod vessels;
