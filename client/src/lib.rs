//! Client core for the filament scale.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net::session::ScaleSession` owns the channel lifecycle, reconnect
//! backoff, session intent, and the mirrored vessel list. It performs no I/O
//! itself. Runtimes feed it events and carry out the effects it returns.
//! The browser runtime lives behind the `hydrate` feature.

pub mod config;
pub mod net;
pub mod state;
pub mod util;

/// Install panic and log forwarding to the browser console.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("console logger already installed");
    }
}
