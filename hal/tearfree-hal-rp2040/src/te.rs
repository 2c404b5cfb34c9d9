//! Tearing-effect (TE) vsync source
//!
//! SPI panels such as the ILI9341 pulse their TE output at the start of
//! vertical blanking. [`TeVsync::run`] waits for that edge and calls the
//! registered handler. Spawn it on an interrupt executor so it preempts
//! the UI task the way a vsync interrupt would.

use embassy_rp::gpio::Input;
use tearfree_hal::{VsyncHandler, VsyncSource};

/// TE vsync errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TeVsyncError {
    /// A handler is already registered
    AlreadyRegistered,
}

/// Vsync source on a TE GPIO
pub struct TeVsync<'d> {
    pin: Input<'d>,
    handler: Option<&'static dyn VsyncHandler>,
}

impl<'d> TeVsync<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin, handler: None }
    }

    /// Forward TE edges to the handler, forever
    pub async fn run(&mut self) -> ! {
        loop {
            self.pin.wait_for_rising_edge().await;
            if let Some(handler) = self.handler {
                handler.on_vsync();
            }
        }
    }
}

impl VsyncSource for TeVsync<'_> {
    type Error = TeVsyncError;

    fn register_vsync_callback(
        &mut self,
        handler: &'static dyn VsyncHandler,
    ) -> Result<(), Self::Error> {
        if self.handler.is_some() {
            return Err(TeVsyncError::AlreadyRegistered);
        }
        self.handler = Some(handler);
        Ok(())
    }
}
