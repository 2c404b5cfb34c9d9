//! Display configuration
//!
//! One `DisplayConfig` describes a board: resolution, orientation, clocks,
//! buffer layout and whether flushes are synchronized to vsync.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::touch::TouchCalibration;

/// Largest accepted resolution on either axis
pub const MAX_RESOLUTION: u16 = 4096;

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitInverted,
    Landscape,
    LandscapeInverted,
}

impl Orientation {
    /// Whether the panel must exchange its X and Y axes
    pub const fn swap_xy(self) -> bool {
        matches!(self, Orientation::Landscape | Orientation::LandscapeInverted)
    }

    /// Mirror flags (x, y) applied after the axis swap
    pub const fn mirror(self) -> (bool, bool) {
        match self {
            Orientation::Portrait => (false, false),
            Orientation::PortraitInverted => (true, true),
            Orientation::Landscape => (true, false),
            Orientation::LandscapeInverted => (false, true),
        }
    }

    /// Whether this is a landscape orientation
    pub const fn is_landscape(self) -> bool {
        self.swap_xy()
    }
}

/// Number of panel frame buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrameBufferCount {
    #[default]
    One,
    Two,
}

/// Where draw buffers are allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BufferPlacement {
    /// On-chip SRAM
    #[default]
    Internal,
    /// External PSRAM
    External,
}

/// Reduced pixel clock while the filesystem is accessed
///
/// Some RGB panels share a bus with flash; slowing the pixel clock during
/// filesystem access keeps the panel from starving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FsClockPatch {
    /// Pixel clock during filesystem access (Hz)
    pub clock_hz: u32,
    /// Settle time after each clock change (ms)
    pub settle_ms: u32,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Zero or oversized resolution
    InvalidResolution,
    /// Pixel clock of zero
    InvalidPixelClock,
    /// Backlight duty above 100%
    InvalidBacklightDuty,
    /// Filesystem patch clock must be non-zero and below the pixel clock
    InvalidPatchClock,
    /// Two full frame buffers only fit in external memory
    FrameBuffersNeedExternal,
    /// A vsync bound of 0 ms would never wait
    InvalidVsyncTimeout,
}

/// Board display configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct DisplayConfig {
    /// Horizontal resolution after orientation
    pub hor_res: u16,
    /// Vertical resolution after orientation
    pub ver_res: u16,
    pub orientation: Orientation,
    /// Panel expects inverted color data
    pub invert_color: bool,
    /// Nominal pixel clock (Hz)
    pub pixel_clock_hz: u32,
    pub fs_patch: Option<FsClockPatch>,
    /// Synchronize flushes to vsync
    pub avoid_tear_effect: bool,
    pub frame_buffers: FrameBufferCount,
    pub placement: BufferPlacement,
    /// Use two draw buffers so rendering overlaps the transfer
    pub double_draw_buffer: bool,
    /// Stream through an internal bounce buffer
    pub bounce_buffer: bool,
    /// Upper bound on the vsync wait; `None` waits forever
    pub vsync_timeout_ms: Option<u32>,
    /// Backlight duty after bring-up (percent)
    pub backlight_duty: u8,
    pub touch: TouchCalibration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new(320, 240)
    }
}

impl DisplayConfig {
    /// Single frame buffer, direct draw, full backlight
    pub const fn new(hor_res: u16, ver_res: u16) -> Self {
        Self {
            hor_res,
            ver_res,
            orientation: Orientation::Portrait,
            invert_color: false,
            pixel_clock_hz: 16_000_000,
            fs_patch: None,
            avoid_tear_effect: false,
            frame_buffers: FrameBufferCount::One,
            placement: BufferPlacement::Internal,
            double_draw_buffer: false,
            bounce_buffer: false,
            vsync_timeout_ms: None,
            backlight_duty: 100,
            touch: TouchCalibration::IDENTITY,
        }
    }

    /// Total pixels in one frame
    pub const fn frame_pixels(&self) -> usize {
        self.hor_res as usize * self.ver_res as usize
    }

    /// Renderer redraws the whole frame on every flush
    pub const fn full_refresh(&self) -> bool {
        matches!(self.frame_buffers, FrameBufferCount::Two)
    }

    /// Pixels per draw buffer: a full frame with two frame buffers, a
    /// quarter frame otherwise
    pub const fn draw_buffer_len(&self) -> usize {
        if self.full_refresh() {
            self.frame_pixels()
        } else {
            self.frame_pixels() / 4
        }
    }

    /// Number of draw buffers the renderer alternates between
    pub const fn draw_buffer_count(&self) -> usize {
        if self.full_refresh() || self.double_draw_buffer {
            2
        } else {
            1
        }
    }

    /// Bounce buffer size in pixels, zero when disabled
    pub const fn bounce_buffer_len(&self) -> usize {
        if self.bounce_buffer {
            self.draw_buffer_len()
        } else {
            0
        }
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hor_res == 0
            || self.ver_res == 0
            || self.hor_res > MAX_RESOLUTION
            || self.ver_res > MAX_RESOLUTION
        {
            return Err(ConfigError::InvalidResolution);
        }

        if self.pixel_clock_hz == 0 {
            return Err(ConfigError::InvalidPixelClock);
        }

        if self.backlight_duty > 100 {
            return Err(ConfigError::InvalidBacklightDuty);
        }

        if let Some(patch) = self.fs_patch {
            if patch.clock_hz == 0 || patch.clock_hz >= self.pixel_clock_hz {
                return Err(ConfigError::InvalidPatchClock);
            }
        }

        if self.full_refresh() && self.placement != BufferPlacement::External {
            return Err(ConfigError::FrameBuffersNeedExternal);
        }

        if self.vsync_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidVsyncTimeout);
        }

        Ok(())
    }
}
