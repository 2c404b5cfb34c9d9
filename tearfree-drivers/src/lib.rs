//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in tearfree-hal:
//!
//! - Panels (ILI9341 over SPI, with the TE line as vsync)
//! - Touch controllers (XPT2046 resistive)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod panel;
pub mod touch;
