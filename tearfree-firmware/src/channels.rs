//! Inter-task communication
//!
//! Static signals shared between Embassy tasks, and the rendezvous shared
//! with the TE vsync task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use tearfree_core::touch::PointerState;
use tearfree_core::{Rendezvous, VsyncBridge};

/// Vsync/GUI-ready rendezvous between the UI task and the TE line
pub static RENDEZVOUS: Rendezvous<CriticalSectionRawMutex> = Rendezvous::new();

/// Handler registered with the TE vsync source
pub static VSYNC_BRIDGE: VsyncBridge<CriticalSectionRawMutex> = VsyncBridge::new(&RENDEZVOUS);

/// Latest pointer state (updated by touch task)
pub static POINTER: Signal<CriticalSectionRawMutex, PointerState> = Signal::new();

/// Touch activity (wakes the dimming task)
pub static ACTIVITY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
