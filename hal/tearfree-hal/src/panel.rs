//! Panel driver abstractions
//!
//! A panel driver owns the physical display: its bus, its reset line and
//! whatever DMA machinery pushes pixels to it. Pixels are RGB565 words in
//! the panel's native order.

/// Panel driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelError {
    /// Bus transfer failed (SPI, i80 or RGB DMA)
    Bus,
    /// Control pin (reset, data/command) could not be driven
    Pin,
    /// Window lies outside the panel or is empty
    InvalidWindow,
    /// Panel has not been initialized yet
    NotInitialized,
    /// The operation is not supported by this panel
    Unsupported,
}

/// Display panel driver
///
/// Coordinates passed to [`draw_bitmap`](PanelDriver::draw_bitmap) use an
/// exclusive end bound: the window covers `x_start..x_end` by
/// `y_start..y_end`.
pub trait PanelDriver {
    /// Hardware reset of the panel
    fn reset(&mut self) -> Result<(), PanelError>;

    /// Run the panel initialization sequence
    fn init(&mut self) -> Result<(), PanelError>;

    /// Push a bitmap covering the given window
    ///
    /// `pixels` holds exactly `(x_end - x_start) * (y_end - y_start)` words.
    /// The call queues the transfer; it may return before the pixels have
    /// reached the glass.
    fn draw_bitmap(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        pixels: &[u16],
    ) -> Result<(), PanelError>;

    /// Swap the X and Y axes
    fn swap_xy(&mut self, swap: bool) -> Result<(), PanelError>;

    /// Mirror the X and/or Y axis
    fn mirror(&mut self, mirror_x: bool, mirror_y: bool) -> Result<(), PanelError>;

    /// Invert color data
    fn invert_color(&mut self, invert: bool) -> Result<(), PanelError>;

    /// Change the pixel clock
    ///
    /// Used to slow a bus shared with storage. Panels that cannot retune
    /// their clock keep the default.
    fn set_pixel_clock(&mut self, _hz: u32) -> Result<(), PanelError> {
        Err(PanelError::Unsupported)
    }

    /// Panel resolution as (width, height) in the current orientation
    fn resolution(&self) -> (u16, u16);
}
