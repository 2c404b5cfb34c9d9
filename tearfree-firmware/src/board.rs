//! Board configuration compiled from board.toml

#[allow(unused_imports)]
use tearfree_core::config::{
    BufferPlacement, DisplayConfig, FrameBufferCount, FsClockPatch, Orientation, TouchCalibration,
};

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));

/// Pixels per draw buffer
pub const DRAW_BUF_LEN: usize = BOARD.draw_buffer_len();

/// Frame period of the UI loop
pub const FRAME_MS: u64 = 33;

/// Touch controller poll period
pub const TOUCH_POLL_MS: u64 = 20;

/// Idle time before the backlight dims
pub const DIM_AFTER_S: u64 = 30;

/// Backlight duty while dimmed (percent)
pub const DIM_DUTY: u8 = 10;
