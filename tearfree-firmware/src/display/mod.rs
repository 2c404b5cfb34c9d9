//! Display composition for this board
//!
//! Concrete panel, backlight and flush strategy types, and the display
//! shared between tasks.
//!
//! Only the UI task flushes, but the display still lives behind a mutex:
//! backlight and clock changes from other tasks can then never interleave
//! with a draw.

pub mod scene;

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use tearfree_core::{DisplaySubsystem, FlushNotify};
use tearfree_drivers::panel::Ili9341;
use tearfree_hal_rp2040::PwmBacklight;

#[cfg(feature = "avoid-tear-effect")]
use crate::channels::RENDEZVOUS;

pub type PanelSpi = ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>;
pub type Panel = Ili9341<PanelSpi, Output<'static>, Output<'static>, Delay>;

#[cfg(all(feature = "avoid-tear-effect", vsync_bounded))]
pub type Strategy = tearfree_core::BoundedVsyncSync<'static, CriticalSectionRawMutex, Delay>;

#[cfg(all(feature = "avoid-tear-effect", not(vsync_bounded)))]
pub type Strategy = tearfree_core::VsyncSync<'static, CriticalSectionRawMutex>;

#[cfg(not(feature = "avoid-tear-effect"))]
pub type Strategy = tearfree_core::DirectDraw;

pub type Display = DisplaySubsystem<Panel, PwmBacklight<'static>, Strategy>;
pub type SharedDisplay = Mutex<CriticalSectionRawMutex, Display>;

/// Flush strategy for this build
#[cfg(all(feature = "avoid-tear-effect", vsync_bounded))]
pub fn strategy() -> Strategy {
    let timeout_ms = crate::board::BOARD.vsync_timeout_ms.unwrap_or(50);
    tearfree_core::BoundedVsyncSync::new(&RENDEZVOUS, Delay, timeout_ms)
}

/// Flush strategy for this build
#[cfg(all(feature = "avoid-tear-effect", not(vsync_bounded)))]
pub fn strategy() -> Strategy {
    tearfree_core::VsyncSync::new(&RENDEZVOUS)
}

/// Flush strategy for this build
#[cfg(not(feature = "avoid-tear-effect"))]
pub fn strategy() -> Strategy {
    tearfree_core::DirectDraw
}

/// Tracks band completion for the UI loop
#[derive(Default)]
pub struct BandTracker {
    /// Bands released since boot
    pub completed: u32,
}

impl FlushNotify for BandTracker {
    fn flush_complete(&mut self) {
        self.completed = self.completed.wrapping_add(1);
    }
}
