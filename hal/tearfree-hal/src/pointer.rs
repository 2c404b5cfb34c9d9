//! Pointer (touch) input abstractions

/// Pointer source errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerError {
    /// Bus transfer with the touch controller failed
    Bus,
    /// Controller returned data that could not be decoded
    InvalidData,
}

/// Raw touch sample in controller coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTouch {
    /// Raw X coordinate
    pub x: u16,
    /// Raw Y coordinate
    pub y: u16,
    /// Whether the panel is currently touched
    pub pressed: bool,
}

/// Touch controller
pub trait PointerSource {
    /// Read the current touch state
    fn read(&mut self) -> Result<RawTouch, PointerError>;

    /// Raw coordinate span as (x_max, y_max); readings stay below these values
    fn raw_range(&self) -> (u16, u16);
}
