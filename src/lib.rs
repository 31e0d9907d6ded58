//! Pure conversion core for the weft native bridge.
//!
//! Everything here works on plain Rust types — no runtime value
//! encoding, no ABI concerns. The platform library (`weft-semantic`)
//! wraps these functions for the host; tests exercise them directly.

pub mod coerce;
pub mod datetime;
pub mod error;
pub mod render;
