//! Utility helpers shared by the session core and front ends.
//!
//! SYSTEM CONTEXT
//! ==============
//! Formatting lives here so every front end renders readings identically.

pub mod format;
