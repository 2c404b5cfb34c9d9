//! Configuration types
//!
//! Board-agnostic display configuration. Firmware builds compile the board
//! TOML into a `const DisplayConfig` at build time.

pub mod display;
pub mod touch;

pub use display::*;
pub use touch::*;
