//! Board-agnostic core of the tear-free display flush
//!
//! This crate contains all display logic that does not depend on a
//! specific panel or chip:
//!
//! - Flush state machine and the two-token vsync rendezvous
//! - Vsync bridge invoked from interrupt context
//! - Flush strategies (vsync-synced, bounded, direct draw)
//! - Flush adapter translating inclusive areas to panel windows
//! - Draw buffer pool and touch coordinate mapping
//! - Board configuration and display subsystem bring-up
//!
//! # Protocol
//!
//! ```text
//!  UI task                     Vsync ISR                  Panel
//!  ───────                     ─────────                  ─────
//!  gui_ready.signal() ──────▶
//!  vsync_end.wait()            take gui_ready?
//!        ▲                       yes: vsync_end.signal()
//!        └─────────────────────────┘
//!  draw_bitmap(window) ──────────────────────────────────▶ DMA
//!  flush_complete()
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod buffer;
pub mod config;
pub mod flush;
pub mod geometry;
pub mod rendezvous;
pub mod state;
pub mod strategy;
pub mod subsystem;
pub mod touch;

pub use bridge::VsyncBridge;
pub use buffer::{BufferError, DrawBuffers};
pub use config::{
    BufferPlacement, ConfigError, DisplayConfig, FrameBufferCount, FsClockPatch, Orientation,
    TouchCalibration,
};
pub use flush::{FlushAdapter, FlushNotify, FlushOutcome, FlushStats};
pub use geometry::{Area, Window};
pub use rendezvous::{Rendezvous, RendezvousError, RendezvousStats};
pub use state::{FlushEvent, FlushState};
pub use strategy::{BoundedVsyncSync, DirectDraw, FlushSync, SyncOutcome, VsyncSync};
pub use subsystem::{BspError, DisplaySubsystem};
pub use touch::{PointerState, TouchMapper};
