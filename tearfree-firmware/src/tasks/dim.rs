//! Backlight dimming task
//!
//! Dims the backlight after a period without touches and restores the
//! configured duty on the next touch.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::Timer;

use crate::board::{BOARD, DIM_AFTER_S, DIM_DUTY};
use crate::channels::ACTIVITY;
use crate::display::SharedDisplay;

#[embassy_executor::task]
pub async fn dim_task(display: &'static SharedDisplay) {
    let mut dimmed = false;

    loop {
        let duty = match select(ACTIVITY.wait(), Timer::after_secs(DIM_AFTER_S)).await {
            Either::First(()) if dimmed => BOARD.backlight_duty,
            Either::Second(()) if !dimmed => DIM_DUTY,
            _ => continue,
        };

        match display.lock().await.set_brightness(duty) {
            Ok(()) => {
                dimmed = duty == DIM_DUTY;
                debug!("Backlight {}%", duty);
            }
            Err(e) => warn!("Backlight change failed: {:?}", e),
        }
    }
}
