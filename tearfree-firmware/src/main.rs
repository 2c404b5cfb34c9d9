//! Tearfree - Tear-free touch display firmware
//!
//! Firmware for an RP2040 driving an ILI9341 SPI panel with an XPT2046
//! touch controller. Band pushes are synchronized to the panel's TE line
//! through a two-token rendezvous, so a frame never changes while the
//! panel is scanning it out.
//!
//! Two executors:
//! - High priority (SWI_IRQ_1): TE vsync task, standing in for the vsync ISR
//! - Thread mode: UI, touch, dimming and statistics tasks

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::{ConstStaticCell, StaticCell};
use {defmt_rtt as _, panic_probe as _};

use tearfree_core::{DisplaySubsystem, DrawBuffers, TouchMapper};
use tearfree_drivers::panel::{Ili9341, Ili9341Config};
use tearfree_drivers::touch::{Xpt2046, Xpt2046Config};
use tearfree_hal::PointerSource;
use tearfree_hal_rp2040::{PwmBacklight, TeVsync};

use crate::board::{BOARD, DRAW_BUF_LEN};
use crate::channels::VSYNC_BRIDGE;
use crate::display::{Display, SharedDisplay};

mod board;
mod channels;
mod display;
mod tasks;

/// XPT2046 is specified up to 2.5 MHz
const TOUCH_SPI_FREQ: u32 = 2_000_000;

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

// Static cells for state that must live forever
static DISPLAY: StaticCell<SharedDisplay> = StaticCell::new();
static DRAW_BUF_A: ConstStaticCell<[u16; DRAW_BUF_LEN]> = ConstStaticCell::new([0; DRAW_BUF_LEN]);
static DRAW_BUF_B: ConstStaticCell<[u16; DRAW_BUF_LEN]> = ConstStaticCell::new([0; DRAW_BUF_LEN]);

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Tearfree firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Panel on SPI0 (SCK=GPIO18, MOSI=GPIO19, CS=GPIO17, DC=GPIO20, RST=GPIO21)
    let mut panel_spi_config = SpiConfig::default();
    panel_spi_config.frequency = BOARD.pixel_clock_hz;
    let panel_bus = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, panel_spi_config);
    let panel_cs = Output::new(p.PIN_17, Level::High);
    let panel_spi = ExclusiveDevice::new(panel_bus, panel_cs, Delay).unwrap();
    let panel = Ili9341::new(
        panel_spi,
        Output::new(p.PIN_20, Level::Low),
        Output::new(p.PIN_21, Level::High),
        Delay,
        Ili9341Config {
            tearing_effect: BOARD.avoid_tear_effect,
            ..Ili9341Config::default()
        },
    );

    // Backlight on PWM slice 6 channel A (GPIO12)
    let backlight = PwmBacklight::new(Pwm::new_output_a(
        p.PWM_SLICE6,
        p.PIN_12,
        PwmConfig::default(),
    ));

    // TE line (GPIO22)
    let mut te = TeVsync::new(Input::new(p.PIN_22, Pull::Down));

    let display: Display = unwrap!(DisplaySubsystem::init_with_vsync(
        BOARD,
        panel,
        backlight,
        display::strategy(),
        &mut te,
        &VSYNC_BRIDGE,
    ));
    let display = DISPLAY.init(Mutex::new(display));
    info!("Display initialized");

    // Touch on SPI1 (SCK=GPIO10, MOSI=GPIO11, MISO=GPIO8, CS=GPIO9)
    let mut touch_spi_config = SpiConfig::default();
    touch_spi_config.frequency = TOUCH_SPI_FREQ;
    let touch_bus = Spi::new_blocking(p.SPI1, p.PIN_10, p.PIN_11, p.PIN_8, touch_spi_config);
    let touch_cs = Output::new(p.PIN_9, Level::High);
    let touch_spi = ExclusiveDevice::new(touch_bus, touch_cs, Delay).unwrap();
    let touch = Xpt2046::new(touch_spi, Xpt2046Config::default());
    let mapper = TouchMapper::new(&BOARD, touch.raw_range());
    info!("Touch initialized");

    let buffers = if BOARD.draw_buffer_count() > 1 {
        DrawBuffers::double(DRAW_BUF_A.take(), DRAW_BUF_B.take())
    } else {
        DrawBuffers::single(DRAW_BUF_A.take())
    };
    let buffers = unwrap!(buffers);

    // High-priority executor: TE vsync
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.spawn(tasks::te_vsync_task(te)).unwrap();

    // Low-priority executor: everything else
    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::ui_task(display, buffers)).unwrap();
        spawner.spawn(tasks::touch_task(touch, mapper)).unwrap();
        spawner.spawn(tasks::dim_task(display)).unwrap();
        spawner.spawn(tasks::stats_task(display)).unwrap();
        info!("All tasks spawned, firmware running");
    })
}
