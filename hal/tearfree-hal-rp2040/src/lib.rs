//! RP2040-specific HAL for the display firmware
//!
//! RP2040 implementations of the `tearfree-hal` traits:
//!
//! - PWM backlight
//! - Tearing-effect pin as the panel's vsync source

#![no_std]

pub mod backlight;
pub mod te;

pub use backlight::PwmBacklight;
pub use te::{TeVsync, TeVsyncError};
