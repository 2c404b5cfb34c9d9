//! Flush rendezvous state machine
//!
//! One flush cycle is `Idle -> AwaitingVsync -> Transferring -> Idle`.
//! The rendezvous stores the state in an atomic so interrupt and task
//! context agree on it.

pub mod events;
pub mod machine;

pub use events::FlushEvent;
pub use machine::FlushState;
