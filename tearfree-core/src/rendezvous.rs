//! Two-token vsync rendezvous
//!
//! Synchronizes the UI task with the panel's vertical sync so that a pixel
//! push only ever starts on a frame boundary.
//!
//! - `gui_ready` is set by the UI task when its pixels are ready and it
//!   wants to be woken on the next vsync.
//! - `vsync_end` is set only by the vsync handler, and only after it has
//!   consumed `gui_ready`. Only the waiting UI task clears it.
//!
//! Both tokens are single-slot signals: setting an already-set token is a
//! no-op, so at most one "ready" can ever be outstanding.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use crate::state::{FlushEvent, FlushState};

/// Rendezvous errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RendezvousError {
    /// Another flush is already waiting for vsync or transferring
    FlushInFlight,
}

/// How the wait for vsync ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncOutcome {
    /// Released by a fresh vsync edge
    Synced,
    /// No vsync within the bound; the caller draws anyway
    TimedOut,
    /// No synchronization requested (direct draw boards)
    Unsynchronized,
}

/// Snapshot of rendezvous counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RendezvousStats {
    /// Completed flush cycles
    pub flushes: u32,
    /// Vsyncs that released a waiting flush
    pub vsyncs_consumed: u32,
    /// Vsyncs raised with no flush pending
    pub vsyncs_dropped: u32,
    /// Bounded waits that expired
    pub timeouts: u32,
}

/// Vsync/GUI-ready rendezvous
///
/// Designed to live in a `static` and be shared between the vsync handler
/// and the UI task.
pub struct Rendezvous<M: RawMutex> {
    gui_ready: Signal<M, ()>,
    vsync_end: Signal<M, ()>,
    state: AtomicU8,
    flushes: AtomicU32,
    vsyncs_consumed: AtomicU32,
    vsyncs_dropped: AtomicU32,
    timeouts: AtomicU32,
}

impl<M: RawMutex> Default for Rendezvous<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> Rendezvous<M> {
    /// Create an idle rendezvous with both tokens unset
    pub const fn new() -> Self {
        Self {
            gui_ready: Signal::new(),
            vsync_end: Signal::new(),
            state: AtomicU8::new(FlushState::Idle.as_u8()),
            flushes: AtomicU32::new(0),
            vsyncs_consumed: AtomicU32::new(0),
            vsyncs_dropped: AtomicU32::new(0),
            timeouts: AtomicU32::new(0),
        }
    }

    /// Current flush state
    pub fn state(&self) -> FlushState {
        FlushState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Counter snapshot
    pub fn stats(&self) -> RendezvousStats {
        RendezvousStats {
            flushes: self.flushes.load(Ordering::Relaxed),
            vsyncs_consumed: self.vsyncs_consumed.load(Ordering::Relaxed),
            vsyncs_dropped: self.vsyncs_dropped.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }

    /// Handle one vsync pulse (interrupt context)
    ///
    /// Non-blocking: takes `gui_ready` if set and releases the waiting task
    /// through `vsync_end`. With no flush pending the vsync is dropped.
    /// Returns `true` if a task was woken.
    pub fn on_vsync(&self) -> bool {
        if self.gui_ready.try_take().is_some() {
            self.vsync_end.signal(());
            self.vsyncs_consumed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.vsyncs_dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Wait for the next vsync, without timeout
    ///
    /// On success the rendezvous is `Transferring` and the caller must issue
    /// its draw and then call [`complete`](Self::complete). If the returned
    /// future is dropped before a vsync arrives, the cycle is abandoned and
    /// the rendezvous returns to `Idle`.
    pub async fn sync(&self) -> Result<SyncOutcome, RendezvousError> {
        self.begin()?;
        let pending = PendingCycle::new(self);

        self.vsync_end.wait().await;

        pending.release(FlushEvent::VsyncObserved);
        Ok(SyncOutcome::Synced)
    }

    /// Wait for the next vsync, giving up after `timeout_ms`
    ///
    /// On timeout both tokens are cleared and the rendezvous still moves to
    /// `Transferring`: the caller forces its draw so the UI never stalls.
    /// A vsync that lands as the bound expires counts as synced, never as
    /// both a consumed vsync and a timeout.
    pub async fn sync_within<D: DelayNs>(
        &self,
        delay: &mut D,
        timeout_ms: u32,
    ) -> Result<SyncOutcome, RendezvousError> {
        self.begin()?;
        let pending = PendingCycle::new(self);

        match select(self.vsync_end.wait(), delay.delay_ms(timeout_ms)).await {
            Either::First(()) => {
                pending.release(FlushEvent::VsyncObserved);
                Ok(SyncOutcome::Synced)
            }
            Either::Second(()) => {
                // Once gui_ready is gone the handler can no longer set vsync_end
                self.gui_ready.reset();
                if self.vsync_end.try_take().is_some() {
                    pending.release(FlushEvent::VsyncObserved);
                    Ok(SyncOutcome::Synced)
                } else {
                    self.timeouts.fetch_add(1, Ordering::Relaxed);
                    pending.release(FlushEvent::VsyncTimedOut);
                    Ok(SyncOutcome::TimedOut)
                }
            }
        }
    }

    /// Finish the cycle once the draw call has returned
    pub fn complete(&self) {
        if self.state() == FlushState::Transferring {
            self.advance(FlushEvent::DrawIssued);
            self.flushes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Idle -> AwaitingVsync, then set `gui_ready`
    fn begin(&self) -> Result<(), RendezvousError> {
        let idle = FlushState::Idle;
        let next = idle.transition(FlushEvent::Ready);
        self.state
            .compare_exchange(idle.as_u8(), next.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RendezvousError::FlushInFlight)?;

        // A vsync_end left over from an abandoned cycle must not release this one
        self.vsync_end.reset();
        self.gui_ready.signal(());
        Ok(())
    }

    /// Drop the pending cycle and clear both tokens
    fn abandon(&self) {
        self.clear_tokens();
        self.advance(FlushEvent::Abandoned);
    }

    /// gui_ready first: once it is gone the handler can no longer set vsync_end
    fn clear_tokens(&self) {
        self.gui_ready.reset();
        self.vsync_end.reset();
    }

    fn advance(&self, event: FlushEvent) {
        let next = self.state().transition(event);
        self.state.store(next.as_u8(), Ordering::Release);
    }
}

/// Abandons the cycle if the waiting future is dropped
struct PendingCycle<'a, M: RawMutex> {
    rendezvous: &'a Rendezvous<M>,
    armed: bool,
}

impl<'a, M: RawMutex> PendingCycle<'a, M> {
    fn new(rendezvous: &'a Rendezvous<M>) -> Self {
        Self {
            rendezvous,
            armed: true,
        }
    }

    fn release(mut self, event: FlushEvent) {
        self.armed = false;
        self.rendezvous.advance(event);
    }
}

impl<M: RawMutex> Drop for PendingCycle<'_, M> {
    fn drop(&mut self) {
        if self.armed {
            self.rendezvous.abandon();
        }
    }
}
