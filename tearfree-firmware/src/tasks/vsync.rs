//! TE vsync task
//!
//! Forwards TE rising edges to the registered vsync bridge. Spawned on the
//! interrupt executor so it preempts the UI task; it must never block or
//! log.

use tearfree_hal_rp2040::TeVsync;

#[embassy_executor::task]
pub async fn te_vsync_task(mut te: TeVsync<'static>) -> ! {
    te.run().await
}
