//! Flush synchronization strategies
//!
//! The strategy is a type parameter of the flush adapter, chosen once when
//! the board is composed. Direct-draw boards pay nothing for the handshake.
//!
//! | Strategy | Board | Wait |
//! |----------|-------|------|
//! | [`VsyncSync`] | RGB/TE panels with tear avoidance | until next vsync |
//! | [`BoundedVsyncSync`] | same, with a starvation guard | vsync or timeout |
//! | [`DirectDraw`] | single-buffer / tear-tolerant panels | none |

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::rendezvous::{Rendezvous, RendezvousError};

pub use crate::rendezvous::SyncOutcome;

/// Gate in front of every panel draw
pub trait FlushSync {
    /// Whether this strategy waits on the vsync rendezvous
    ///
    /// Must agree with `DisplayConfig::avoid_tear_effect`.
    const SYNCED: bool;

    /// Wait until the panel may be written
    fn acquire(
        &mut self,
    ) -> impl core::future::Future<Output = Result<SyncOutcome, RendezvousError>>;

    /// Called once the draw call has returned
    fn release(&mut self);
}

/// Full vsync handshake with no timeout
pub struct VsyncSync<'a, M: RawMutex> {
    rendezvous: &'a Rendezvous<M>,
}

impl<'a, M: RawMutex> VsyncSync<'a, M> {
    pub fn new(rendezvous: &'a Rendezvous<M>) -> Self {
        Self { rendezvous }
    }
}

impl<M: RawMutex> FlushSync for VsyncSync<'_, M> {
    const SYNCED: bool = true;

    async fn acquire(&mut self) -> Result<SyncOutcome, RendezvousError> {
        self.rendezvous.sync().await
    }

    fn release(&mut self) {
        self.rendezvous.complete();
    }
}

/// Vsync handshake that forces the draw after `timeout_ms`
///
/// Guards against a stopped panel clock hanging the UI task forever.
pub struct BoundedVsyncSync<'a, M: RawMutex, D: DelayNs> {
    rendezvous: &'a Rendezvous<M>,
    delay: D,
    timeout_ms: u32,
}

impl<'a, M: RawMutex, D: DelayNs> BoundedVsyncSync<'a, M, D> {
    pub fn new(rendezvous: &'a Rendezvous<M>, delay: D, timeout_ms: u32) -> Self {
        Self {
            rendezvous,
            delay,
            timeout_ms,
        }
    }

    /// Configured bound in milliseconds
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }
}

impl<M: RawMutex, D: DelayNs> FlushSync for BoundedVsyncSync<'_, M, D> {
    const SYNCED: bool = true;

    async fn acquire(&mut self) -> Result<SyncOutcome, RendezvousError> {
        self.rendezvous
            .sync_within(&mut self.delay, self.timeout_ms)
            .await
    }

    fn release(&mut self) {
        self.rendezvous.complete();
    }
}

/// No synchronization: draw immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDraw;

impl FlushSync for DirectDraw {
    const SYNCED: bool = false;

    async fn acquire(&mut self) -> Result<SyncOutcome, RendezvousError> {
        Ok(SyncOutcome::Unsynchronized)
    }

    fn release(&mut self) {}
}
