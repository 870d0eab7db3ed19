//! macOS capture support
//!
//! Screen recording on macOS is gated by the TCC privacy prompt.

pub mod permissions;

pub use permissions::*;
