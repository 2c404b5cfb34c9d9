//! Touch polling task
//!
//! Polls the touch controller, maps readings to display coordinates and
//! publishes pointer changes to the UI.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{Delay, Duration, Ticker};
use embedded_hal_bus::spi::ExclusiveDevice;

use tearfree_core::{PointerState, TouchMapper};
use tearfree_drivers::touch::Xpt2046;

use crate::board::TOUCH_POLL_MS;
use crate::channels::{ACTIVITY, POINTER};

pub type Touch = Xpt2046<ExclusiveDevice<Spi<'static, SPI1, Blocking>, Output<'static>, Delay>>;

#[embassy_executor::task]
pub async fn touch_task(mut touch: Touch, mut mapper: TouchMapper) {
    info!("Touch task started");

    let mut ticker = Ticker::every(Duration::from_millis(TOUCH_POLL_MS));
    let mut last = PointerState::default();

    loop {
        let state = mapper.read(&mut touch);

        if state != last {
            trace!("Pointer: {:?}", state);
            POINTER.signal(state);
            last = state;
        }
        if state.pressed {
            ACTIVITY.signal(());
        }

        ticker.next().await;
    }
}
