//! Flush callback adapter
//!
//! Bridges the renderer's "flush this area" request to the panel: converts
//! the inclusive area to the panel's exclusive window, passes the flush
//! strategy's gate, issues the draw and releases the renderer.
//!
//! Completion is reported as soon as the draw call returns, not when the
//! DMA finishes. The panel driver's transfer queue provides back-pressure
//! on the next call.

use tearfree_hal::{PanelDriver, PanelError};

use crate::geometry::Area;
use crate::rendezvous::{RendezvousError, SyncOutcome};
use crate::strategy::FlushSync;

/// Renderer side of the flush contract
pub trait FlushNotify {
    /// The pixel buffer has been handed to the panel and may be reused
    fn flush_complete(&mut self);
}

/// Result of one flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushOutcome {
    /// Draw issued after the gate opened normally
    Drawn,
    /// Draw issued after the vsync wait timed out
    Forced,
    /// Panel rejected the transfer; the frame is dropped
    DrawFailed(PanelError),
    /// Area or buffer invalid, or another flush in flight; nothing drawn
    Rejected,
}

/// Flush counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushStats {
    pub drawn: u32,
    pub forced: u32,
    pub failed: u32,
    pub rejected: u32,
}

/// Flush adapter owning the panel
///
/// `flush` takes `&mut self`, so a single adapter can only ever have one
/// flush in flight. Share it behind an async mutex if several tasks flush.
pub struct FlushAdapter<P: PanelDriver, S: FlushSync> {
    panel: P,
    sync: S,
    stats: FlushStats,
}

impl<P: PanelDriver, S: FlushSync> FlushAdapter<P, S> {
    /// Create an adapter around an initialized panel
    pub fn new(panel: P, sync: S) -> Self {
        Self {
            panel,
            sync,
            stats: FlushStats::default(),
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    /// Take the panel and strategy back
    pub fn into_parts(self) -> (P, S) {
        (self.panel, self.sync)
    }

    /// Flush `pixels` to the inclusive `area`
    ///
    /// `notify.flush_complete()` is called exactly once, whatever the
    /// outcome, so the renderer is never left waiting.
    pub async fn flush<N: FlushNotify + ?Sized>(
        &mut self,
        area: Area,
        pixels: &[u16],
        notify: &mut N,
    ) -> FlushOutcome {
        let outcome = self.push(area, pixels).await;
        notify.flush_complete();
        outcome
    }

    async fn push(&mut self, area: Area, pixels: &[u16]) -> FlushOutcome {
        let window = match area.to_window() {
            Some(window) if window.pixel_count() == pixels.len() => window,
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "Flush rejected: area {} with {} pixels",
                    area,
                    pixels.len()
                );
                self.stats.rejected += 1;
                return FlushOutcome::Rejected;
            }
        };

        let sync = match self.sync.acquire().await {
            Ok(sync) => sync,
            Err(RendezvousError::FlushInFlight) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Flush rejected: rendezvous busy");
                self.stats.rejected += 1;
                return FlushOutcome::Rejected;
            }
        };

        let result = self.panel.draw_bitmap(
            window.x_start,
            window.y_start,
            window.x_end,
            window.y_end,
            pixels,
        );
        self.sync.release();

        match result {
            Ok(()) if sync == SyncOutcome::TimedOut => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No vsync within bound, forced draw of {}", area);
                self.stats.forced += 1;
                FlushOutcome::Forced
            }
            Ok(()) => {
                self.stats.drawn += 1;
                FlushOutcome::Drawn
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Draw failed, frame dropped: {}", e);
                self.stats.failed += 1;
                FlushOutcome::DrawFailed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendezvous::Rendezvous;
    use crate::state::FlushState;
    use crate::strategy::{BoundedVsyncSync, DirectDraw, VsyncSync};
    use core::cell::{Cell, RefCell};
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use embassy_futures::block_on;
    use embassy_futures::join::join4;
    use embassy_futures::yield_now;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::mutex::Mutex;
    use embedded_hal_async::delay::DelayNs;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Trace {
        Vsync,
        Draw(u16, u16, u16, u16),
        Complete,
    }

    type Log = Rc<RefCell<Vec<Trace>>>;

    /// Panel that records draw calls
    struct RecordingPanel {
        log: Log,
        fail_next: bool,
    }

    impl RecordingPanel {
        fn new(log: &Log) -> Self {
            Self {
                log: log.clone(),
                fail_next: false,
            }
        }
    }

    impl PanelDriver for RecordingPanel {
        fn reset(&mut self) -> Result<(), PanelError> {
            Ok(())
        }

        fn init(&mut self) -> Result<(), PanelError> {
            Ok(())
        }

        fn draw_bitmap(
            &mut self,
            x_start: u16,
            y_start: u16,
            x_end: u16,
            y_end: u16,
            _pixels: &[u16],
        ) -> Result<(), PanelError> {
            if self.fail_next {
                self.fail_next = false;
                return Err(PanelError::Bus);
            }
            self.log
                .borrow_mut()
                .push(Trace::Draw(x_start, y_start, x_end, y_end));
            Ok(())
        }

        fn swap_xy(&mut self, _swap: bool) -> Result<(), PanelError> {
            Ok(())
        }

        fn mirror(&mut self, _mirror_x: bool, _mirror_y: bool) -> Result<(), PanelError> {
            Ok(())
        }

        fn invert_color(&mut self, _invert: bool) -> Result<(), PanelError> {
            Ok(())
        }

        fn resolution(&self) -> (u16, u16) {
            (800, 480)
        }
    }

    struct RecordingNotify {
        log: Log,
    }

    impl FlushNotify for RecordingNotify {
        fn flush_complete(&mut self) {
            self.log.borrow_mut().push(Trace::Complete);
        }
    }

    struct ExpiredDelay;

    impl DelayNs for ExpiredDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn poll_once<F: Future>(fut: core::pin::Pin<&mut F>) -> Poll<F::Output> {
        let mut cx = Context::from_waker(Waker::noop());
        fut.poll(&mut cx)
    }

    fn draws(log: &Log) -> usize {
        log.borrow()
            .iter()
            .filter(|t| matches!(t, Trace::Draw(..)))
            .count()
    }

    #[test]
    fn test_scenario_draw_after_injected_vsync() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), VsyncSync::new(&rendezvous));
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0xF800u16; 100 * 50];

        let mut fut = pin!(adapter.flush(Area::new(0, 0, 99, 49), &pixels, &mut notify));

        // Blocked waiting for vsync, nothing drawn yet
        assert!(poll_once(fut.as_mut()).is_pending());
        assert!(log.borrow().is_empty());
        assert_eq!(rendezvous.state(), FlushState::AwaitingVsync);

        log.borrow_mut().push(Trace::Vsync);
        assert!(rendezvous.on_vsync());

        assert_eq!(poll_once(fut.as_mut()), Poll::Ready(FlushOutcome::Drawn));
        assert_eq!(
            *log.borrow(),
            [Trace::Vsync, Trace::Draw(0, 0, 100, 50), Trace::Complete]
        );
        assert_eq!(rendezvous.state(), FlushState::Idle);
    }

    #[test]
    fn test_no_draw_before_vsync() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), VsyncSync::new(&rendezvous));
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0u16; 4];

        for round in 0..5 {
            let mut fut = pin!(adapter.flush(Area::new(0, 0, 1, 1), &pixels, &mut notify));
            for _ in 0..3 {
                assert!(poll_once(fut.as_mut()).is_pending());
            }
            assert_eq!(draws(&log), round);

            log.borrow_mut().push(Trace::Vsync);
            assert!(rendezvous.on_vsync());
            assert!(poll_once(fut.as_mut()).is_ready());
        }

        // ready -> vsync -> draw, every cycle
        let log = log.borrow();
        for chunk in log.chunks(3) {
            assert_eq!(chunk, [Trace::Vsync, Trace::Draw(0, 0, 2, 2), Trace::Complete]);
        }
    }

    #[test]
    fn test_direct_draw_never_waits() {
        let log: Log = Rc::default();
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), DirectDraw);
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0x07E0u16; 320 * 24];

        for band in 0..100u16 {
            let y = (band % 10) * 24;
            let mut fut = pin!(adapter.flush(Area::new(0, y, 319, y + 23), &pixels, &mut notify));
            assert_eq!(poll_once(fut.as_mut()), Poll::Ready(FlushOutcome::Drawn));
        }

        assert_eq!(draws(&log), 100);
        assert_eq!(adapter.stats().drawn, 100);
    }

    #[test]
    fn test_window_translation_through_adapter() {
        let log: Log = Rc::default();
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), DirectDraw);
        let mut notify = RecordingNotify { log: log.clone() };

        let cases = [
            (Area::new(5, 7, 5, 7), Trace::Draw(5, 7, 6, 8)),
            (Area::new(0, 0, 799, 0), Trace::Draw(0, 0, 800, 1)),
            (Area::full(800, 480), Trace::Draw(0, 0, 800, 480)),
        ];

        for (area, expected) in cases {
            log.borrow_mut().clear();
            let pixels = std::vec![0u16; area.pixel_count()];
            block_on(adapter.flush(area, &pixels, &mut notify));
            assert_eq!(*log.borrow(), [expected, Trace::Complete]);
        }
    }

    #[test]
    fn test_mismatched_buffer_rejected_but_released() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), VsyncSync::new(&rendezvous));
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0u16; 10];

        // Never waits for vsync: rejected before the handshake
        let outcome = block_on(adapter.flush(Area::new(0, 0, 9, 9), &pixels, &mut notify));
        assert_eq!(outcome, FlushOutcome::Rejected);
        assert_eq!(*log.borrow(), [Trace::Complete]);
        assert_eq!(rendezvous.state(), FlushState::Idle);

        let outcome = block_on(adapter.flush(Area::new(9, 0, 0, 0), &pixels, &mut notify));
        assert_eq!(outcome, FlushOutcome::Rejected);
        assert_eq!(adapter.stats().rejected, 2);
    }

    #[test]
    fn test_draw_failure_drops_frame_and_continues() {
        let log: Log = Rc::default();
        let mut panel = RecordingPanel::new(&log);
        panel.fail_next = true;
        let mut adapter = FlushAdapter::new(panel, DirectDraw);
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0u16; 1];

        let first = block_on(adapter.flush(Area::new(0, 0, 0, 0), &pixels, &mut notify));
        assert_eq!(first, FlushOutcome::DrawFailed(PanelError::Bus));
        assert_eq!(*log.borrow(), [Trace::Complete]);

        let second = block_on(adapter.flush(Area::new(0, 0, 0, 0), &pixels, &mut notify));
        assert_eq!(second, FlushOutcome::Drawn);
        assert_eq!(adapter.stats().failed, 1);
        assert_eq!(adapter.stats().drawn, 1);
    }

    #[test]
    fn test_draw_failure_returns_rendezvous_to_idle() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let mut panel = RecordingPanel::new(&log);
        panel.fail_next = true;
        let mut adapter = FlushAdapter::new(panel, VsyncSync::new(&rendezvous));
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0u16; 1];

        let mut fut = pin!(adapter.flush(Area::new(0, 0, 0, 0), &pixels, &mut notify));
        assert!(poll_once(fut.as_mut()).is_pending());
        rendezvous.on_vsync();
        assert_eq!(
            poll_once(fut.as_mut()),
            Poll::Ready(FlushOutcome::DrawFailed(PanelError::Bus))
        );
        assert_eq!(rendezvous.state(), FlushState::Idle);
    }

    #[test]
    fn test_bounded_wait_forces_draw() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let sync = BoundedVsyncSync::new(&rendezvous, ExpiredDelay, 100);
        let mut adapter = FlushAdapter::new(RecordingPanel::new(&log), sync);
        let mut notify = RecordingNotify { log: log.clone() };
        let pixels = [0u16; 4];

        let outcome = block_on(adapter.flush(Area::new(0, 0, 1, 1), &pixels, &mut notify));
        assert_eq!(outcome, FlushOutcome::Forced);
        assert_eq!(*log.borrow(), [Trace::Draw(0, 0, 2, 2), Trace::Complete]);
        assert_eq!(rendezvous.state(), FlushState::Idle);
        assert_eq!(rendezvous.stats().timeouts, 1);
        assert_eq!(adapter.stats().forced, 1);
    }

    async fn flush_row<S: FlushSync>(
        adapter: &Mutex<NoopRawMutex, FlushAdapter<RecordingPanel, S>>,
        row: u16,
        log: &Log,
        finished: &Cell<u8>,
        pixels: &[u16],
    ) {
        let mut notify = RecordingNotify { log: log.clone() };
        for _ in 0..4 {
            let mut adapter = adapter.lock().await;
            let outcome = adapter
                .flush(Area::new(0, row, 15, row), pixels, &mut notify)
                .await;
            assert_eq!(outcome, FlushOutcome::Drawn);
        }
        finished.set(finished.get() + 1);
    }

    #[test]
    fn test_concurrent_flushes_never_overlap() {
        let log: Log = Rc::default();
        let rendezvous: Rendezvous<NoopRawMutex> = Rendezvous::new();
        let adapter: Mutex<NoopRawMutex, _> = Mutex::new(FlushAdapter::new(
            RecordingPanel::new(&log),
            VsyncSync::new(&rendezvous),
        ));
        let finished = Cell::new(0u8);
        let pixels = [0u16; 16];

        let isr = async {
            while finished.get() < 3 {
                if rendezvous.on_vsync() {
                    log.borrow_mut().push(Trace::Vsync);
                }
                yield_now().await;
            }
        };

        block_on(join4(
            flush_row(&adapter, 0, &log, &finished, &pixels),
            flush_row(&adapter, 1, &log, &finished, &pixels),
            flush_row(&adapter, 2, &log, &finished, &pixels),
            isr,
        ));

        // Each consumed vsync releases exactly one draw, followed by its
        // completion, before the next flush can set gui_ready.
        let log = log.borrow();
        assert_eq!(log.len(), 12 * 3);
        for chunk in log.chunks(3) {
            assert_eq!(chunk[0], Trace::Vsync);
            assert!(matches!(chunk[1], Trace::Draw(0, _, 16, _)));
            assert_eq!(chunk[2], Trace::Complete);
        }
        assert_eq!(rendezvous.stats().flushes, 12);
        assert_eq!(rendezvous.stats().vsyncs_consumed, 12);
    }
}
