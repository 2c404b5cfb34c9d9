//! Events that drive the flush cycle

/// Events that can trigger flush state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushEvent {
    /// UI task set the GUI-ready token and is waiting for vsync
    Ready,
    /// Vsync-end token observed by the waiting UI task
    VsyncObserved,
    /// No vsync arrived within the bound; the draw is forced
    VsyncTimedOut,
    /// Draw call returned (transfer queued)
    DrawIssued,
    /// Wait cancelled before any vsync (future dropped)
    Abandoned,
}
