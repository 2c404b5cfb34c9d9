//! Tearfree Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that board support
//! code implements for a specific panel, touch controller and chip. The
//! flush synchronization core only ever talks to these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (tearfree-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tearfree-core (rendezvous, flush)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tearfree-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  tearfree-    │       │  tearfree-    │
//! │   drivers     │       │  hal-rp2040   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`panel::PanelDriver`] - Panel bring-up and bitmap pushes
//! - [`vsync::VsyncSource`], [`vsync::VsyncHandler`] - Vertical sync events
//! - [`pointer::PointerSource`] - Touch controllers
//! - [`backlight::Backlight`] - Backlight brightness

#![no_std]
#![deny(unsafe_code)]

pub mod backlight;
pub mod panel;
pub mod pointer;
pub mod vsync;

// Re-export key traits at crate root for convenience
pub use backlight::{Backlight, BacklightError, FixedBacklight};
pub use panel::{PanelDriver, PanelError};
pub use pointer::{PointerError, PointerSource, RawTouch};
pub use vsync::{VsyncHandler, VsyncSource};
