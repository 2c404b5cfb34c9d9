//! Vertical sync abstractions
//!
//! A [`VsyncSource`] raises an event at the start of every frame scan-out.
//! RGB panels get this from their timing controller, SPI panels from a
//! tearing-effect (TE) output line.

/// Receiver of vertical sync events
///
/// `on_vsync` is called from interrupt context (or an interrupt-priority
/// executor). Implementations must complete in bounded, short time and must
/// not block, allocate or log.
pub trait VsyncHandler: Sync {
    /// Handle one vsync pulse
    ///
    /// Returns `true` if a waiting task was woken, so the interrupt epilogue
    /// can yield immediately.
    fn on_vsync(&self) -> bool;
}

/// Producer of vertical sync events
pub trait VsyncSource {
    /// Error type for registration
    type Error;

    /// Register the handler invoked on every vsync pulse
    ///
    /// Only one handler is active at a time; sources reject a second
    /// registration.
    fn register_vsync_callback(
        &mut self,
        handler: &'static dyn VsyncHandler,
    ) -> Result<(), Self::Error>;
}
