//! Session core: connection lifecycle, backoff, routing, and command building.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything here except `browser` is I/O-free. `session` ties the pieces
//! together and is driven by a runtime: `browser` under the `hydrate`
//! feature, or the tokio runtime in the terminal client.

pub mod backoff;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod connection;
pub mod requests;
pub mod router;
pub mod session;

pub use connection::Effect;
pub use session::{ScaleSession, SessionEvent, UserAction};
