//! Panel event bridge
//!
//! The handler registered with the panel's vsync source. It is bound to
//! one rendezvous at construction, so each panel instance gets its own
//! capability instead of a global semaphore pair.
//!
//! Runs in interrupt context: no blocking, no allocation, no logging.

use embassy_sync::blocking_mutex::raw::RawMutex;
use tearfree_hal::VsyncHandler;

use crate::rendezvous::Rendezvous;

/// Vsync handler bound to a [`Rendezvous`]
pub struct VsyncBridge<M: RawMutex + 'static> {
    rendezvous: &'static Rendezvous<M>,
}

impl<M: RawMutex + 'static> VsyncBridge<M> {
    /// Bind a bridge to a rendezvous
    pub const fn new(rendezvous: &'static Rendezvous<M>) -> Self {
        Self { rendezvous }
    }

    /// The rendezvous this bridge releases
    pub fn rendezvous(&self) -> &'static Rendezvous<M> {
        self.rendezvous
    }
}

impl<M: RawMutex + Sync + 'static> VsyncHandler for VsyncBridge<M> {
    fn on_vsync(&self) -> bool {
        self.rendezvous.on_vsync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FlushState;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Waker};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    #[test]
    fn test_bridge_drops_idle_vsync() {
        static RENDEZVOUS: Rendezvous<CriticalSectionRawMutex> = Rendezvous::new();
        static BRIDGE: VsyncBridge<CriticalSectionRawMutex> = VsyncBridge::new(&RENDEZVOUS);

        let handler: &'static dyn VsyncHandler = &BRIDGE;
        for _ in 0..10 {
            assert!(!handler.on_vsync());
        }
        assert_eq!(RENDEZVOUS.stats().vsyncs_dropped, 10);
    }

    #[test]
    fn test_bridge_wakes_pending_flush() {
        static RENDEZVOUS: Rendezvous<CriticalSectionRawMutex> = Rendezvous::new();
        static BRIDGE: VsyncBridge<CriticalSectionRawMutex> = VsyncBridge::new(&RENDEZVOUS);

        let mut cx = Context::from_waker(Waker::noop());
        let mut fut = pin!(BRIDGE.rendezvous().sync());
        assert!(fut.as_mut().poll(&mut cx).is_pending());

        let handler: &'static dyn VsyncHandler = &BRIDGE;
        assert!(handler.on_vsync());
        assert!(fut.as_mut().poll(&mut cx).is_ready());
        assert_eq!(RENDEZVOUS.state(), FlushState::Transferring);
    }
}
