//! Flush state definition

use super::events::FlushEvent;

/// Flush cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushState {
    /// No flush pending; both tokens unset
    Idle,
    /// GUI-ready token set, UI task blocked until the next vsync
    AwaitingVsync,
    /// Draw call in progress
    Transferring,
}

impl FlushState {
    /// Encode for atomic storage
    pub const fn as_u8(self) -> u8 {
        match self {
            FlushState::Idle => 0,
            FlushState::AwaitingVsync => 1,
            FlushState::Transferring => 2,
        }
    }

    /// Decode from atomic storage; unknown values read as `Idle`
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => FlushState::AwaitingVsync,
            2 => FlushState::Transferring,
            _ => FlushState::Idle,
        }
    }

    /// Check if a flush is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, FlushState::Idle)
    }

    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: FlushEvent) -> Self {
        use FlushEvent::*;
        use FlushState::*;

        match (self, event) {
            (Idle, Ready) => AwaitingVsync,

            (AwaitingVsync, VsyncObserved) => Transferring,
            (AwaitingVsync, VsyncTimedOut) => Transferring,
            (AwaitingVsync, Abandoned) => Idle,

            (Transferring, DrawIssued) => Idle,

            _ => self,
        }
    }
}
