//! UI task
//!
//! Renders the scene band by band into the draw buffers and flushes each
//! band through the display. With tear avoidance every band push starts on
//! a TE pulse.

use defmt::*;
use embassy_time::{Duration, Ticker};

use tearfree_core::{Area, DrawBuffers, FlushOutcome};

use crate::board::{BOARD, FRAME_MS};
use crate::channels::POINTER;
use crate::display::scene::Scene;
use crate::display::{BandTracker, SharedDisplay};

#[embassy_executor::task]
pub async fn ui_task(display: &'static SharedDisplay, mut buffers: DrawBuffers<'static>) {
    let (hor_res, ver_res) = (BOARD.hor_res, BOARD.ver_res);
    let band_rows = ((buffers.len() / hor_res as usize) as u16).clamp(1, ver_res);
    info!(
        "UI task started: {}x{}, {}-row bands, {} draw buffer(s)",
        hor_res,
        ver_res,
        band_rows,
        if buffers.is_double() { 2 } else { 1 }
    );

    let mut scene = Scene::new(hor_res, ver_res);
    let mut tracker = BandTracker::default();
    let mut ticker = Ticker::every(Duration::from_millis(FRAME_MS));

    loop {
        if let Some(pointer) = POINTER.try_take() {
            scene.set_pointer(pointer);
        }

        let mut y = 0;
        while y < ver_res {
            let y_last = (y + band_rows).min(ver_res) - 1;
            let area = Area::new(0, y, hor_res - 1, y_last);
            let len = area.pixel_count();

            scene.render(area, &mut buffers.render_target()[..len]);

            let outcome = display
                .lock()
                .await
                .flush(area, &buffers.rendered()[..len], &mut tracker)
                .await;

            match outcome {
                FlushOutcome::Drawn => {}
                FlushOutcome::Forced => trace!("Band at row {} forced without TE", y),
                FlushOutcome::DrawFailed(e) => warn!("Band at row {} dropped: {:?}", y, e),
                FlushOutcome::Rejected => warn!("Band at row {} rejected", y),
            }

            buffers.swap();
            y = y_last + 1;
        }

        scene.advance();
        ticker.next().await;
    }
}
