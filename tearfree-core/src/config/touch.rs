//! Touch calibration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Touch controller calibration
///
/// Applied after the raw reading has been scaled to display resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TouchCalibration {
    /// Exchange X and Y before scaling
    pub swap_xy: bool,
    /// Mirror horizontally
    pub invert_x: bool,
    /// Mirror vertically
    pub invert_y: bool,
    /// Offset added to X after scaling (pixels)
    pub offset_x: i16,
    /// Offset added to Y after scaling (pixels)
    pub offset_y: i16,
}

impl TouchCalibration {
    /// No swap, no inversion, no offset
    pub const IDENTITY: Self = Self {
        swap_xy: false,
        invert_x: false,
        invert_y: false,
        offset_x: 0,
        offset_y: 0,
    };
}
