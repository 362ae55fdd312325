//! Input-device classification and gesture disambiguation for paged drawing
//! canvases.
//!
//! [`input`] holds the event dispatcher and device handlers, [`config`] the
//! TOML-backed settings they read and [`replay`] the trace player used by the
//! `penflow` binary to reproduce input sessions offline.

pub mod config;
pub mod input;
pub mod replay;

pub use config::Config;
pub use input::InputContext;
