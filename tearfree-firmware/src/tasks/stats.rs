//! Periodic flush statistics

use defmt::*;
use embassy_time::Timer;

use crate::channels::RENDEZVOUS;
use crate::display::SharedDisplay;

const STATS_PERIOD_S: u64 = 10;

#[embassy_executor::task]
pub async fn stats_task(display: &'static SharedDisplay) {
    loop {
        Timer::after_secs(STATS_PERIOD_S).await;

        let flush = display.lock().await.adapter().stats();
        let sync = RENDEZVOUS.stats();
        info!(
            "Flushes: drawn={} forced={} failed={} rejected={} | vsync consumed={} dropped={} timeouts={}",
            flush.drawn,
            flush.forced,
            flush.failed,
            flush.rejected,
            sync.vsyncs_consumed,
            sync.vsyncs_dropped,
            sync.timeouts
        );
    }
}
