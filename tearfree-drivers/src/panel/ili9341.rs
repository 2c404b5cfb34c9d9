//! ILI9341 TFT panel driver (4-wire SPI)
//!
//! 240x320 RGB565 controller with on-chip GRAM. The tearing-effect output
//! (TE pin) pulses at the start of vertical blanking and serves as the
//! vsync source for tear-free flushes.
//!
//! # Window writes
//!
//! `draw_bitmap` takes an exclusive end; CASET/PASET take inclusive end
//! registers, so one is subtracted before programming the window. Pixels
//! are sent big-endian, as the controller expects.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use tearfree_hal::{PanelDriver, PanelError};

/// ILI9341 commands
pub mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const TEOFF: u8 = 0x34;
    pub const TEON: u8 = 0x35;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// MADCTL bits
pub mod madctl {
    /// Row address order (mirror Y)
    pub const MY: u8 = 0x80;
    /// Column address order (mirror X)
    pub const MX: u8 = 0x40;
    /// Row/column exchange
    pub const MV: u8 = 0x20;
    /// BGR color filter panel
    pub const BGR: u8 = 0x08;
}

/// Native panel width (portrait)
pub const WIDTH: u16 = 240;
/// Native panel height (portrait)
pub const HEIGHT: u16 = 320;

/// Pixels converted per SPI write
const CHUNK_PIXELS: usize = 64;

/// COLMOD value for 16 bits per pixel
const PIXEL_FORMAT_RGB565: u8 = 0x55;

/// ILI9341 configuration
#[derive(Debug, Clone, Copy)]
pub struct Ili9341Config {
    /// Panel has a BGR color filter
    pub bgr: bool,
    /// Enable the TE output (V-blank only)
    pub tearing_effect: bool,
}

impl Default for Ili9341Config {
    fn default() -> Self {
        Self {
            bgr: true,
            tearing_effect: true,
        }
    }
}

/// ILI9341 panel driver
pub struct Ili9341<SPI, DC, RST, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    delay: D,
    config: Ili9341Config,
    madctl: u8,
    initialized: bool,
}

impl<SPI, DC, RST, D> Ili9341<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a driver; call [`PanelDriver::reset`] and [`PanelDriver::init`] next
    pub fn new(spi: SPI, dc: DC, rst: RST, delay: D, config: Ili9341Config) -> Self {
        let madctl = if config.bgr { madctl::BGR } else { 0 };
        Self {
            spi,
            dc,
            rst,
            delay,
            config,
            madctl,
            initialized: false,
        }
    }

    /// Current MADCTL register value
    pub fn madctl(&self) -> u8 {
        self.madctl
    }

    /// Turn the TE output on or off
    pub fn set_tearing_effect(&mut self, enable: bool) -> Result<(), PanelError> {
        if enable {
            // 0x00: V-blank information only
            self.command(cmd::TEON, &[0x00])
        } else {
            self.command(cmd::TEOFF, &[])
        }
    }

    fn command(&mut self, command: u8, params: &[u8]) -> Result<(), PanelError> {
        self.dc.set_low().map_err(|_| PanelError::Pin)?;
        self.spi.write(&[command]).map_err(|_| PanelError::Bus)?;
        if !params.is_empty() {
            self.dc.set_high().map_err(|_| PanelError::Pin)?;
            self.spi.write(params).map_err(|_| PanelError::Bus)?;
        }
        Ok(())
    }

    fn write_madctl(&mut self) -> Result<(), PanelError> {
        let value = self.madctl;
        self.command(cmd::MADCTL, &[value])
    }

    fn set_window(&mut self, x_start: u16, y_start: u16, x_end: u16, y_end: u16) -> Result<(), PanelError> {
        let (x_last, y_last) = (x_end - 1, y_end - 1);
        let [xs_hi, xs_lo] = x_start.to_be_bytes();
        let [xe_hi, xe_lo] = x_last.to_be_bytes();
        self.command(cmd::CASET, &[xs_hi, xs_lo, xe_hi, xe_lo])?;

        let [ys_hi, ys_lo] = y_start.to_be_bytes();
        let [ye_hi, ye_lo] = y_last.to_be_bytes();
        self.command(cmd::PASET, &[ys_hi, ys_lo, ye_hi, ye_lo])
    }

    fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), PanelError> {
        self.command(cmd::RAMWR, &[])?;
        self.dc.set_high().map_err(|_| PanelError::Pin)?;

        let mut bytes = [0u8; CHUNK_PIXELS * 2];
        for chunk in pixels.chunks(CHUNK_PIXELS) {
            for (dst, px) in bytes.chunks_exact_mut(2).zip(chunk) {
                dst.copy_from_slice(&px.to_be_bytes());
            }
            self.spi
                .write(&bytes[..chunk.len() * 2])
                .map_err(|_| PanelError::Bus)?;
        }
        Ok(())
    }
}

impl<SPI, DC, RST, D> PanelDriver for Ili9341<SPI, DC, RST, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    fn reset(&mut self) -> Result<(), PanelError> {
        self.rst.set_low().map_err(|_| PanelError::Pin)?;
        self.delay.delay_us(20);
        self.rst.set_high().map_err(|_| PanelError::Pin)?;
        self.delay.delay_ms(120);

        self.command(cmd::SWRESET, &[])?;
        self.delay.delay_ms(5);
        self.initialized = false;
        Ok(())
    }

    fn init(&mut self) -> Result<(), PanelError> {
        self.command(cmd::SLPOUT, &[])?;
        self.delay.delay_ms(120);

        self.command(cmd::COLMOD, &[PIXEL_FORMAT_RGB565])?;
        self.write_madctl()?;
        if self.config.tearing_effect {
            self.set_tearing_effect(true)?;
        }

        self.command(cmd::DISPON, &[])?;
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("ILI9341 initialized, TE {}", self.config.tearing_effect);
        Ok(())
    }

    fn draw_bitmap(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
        pixels: &[u16],
    ) -> Result<(), PanelError> {
        if !self.initialized {
            return Err(PanelError::NotInitialized);
        }

        let (width, height) = self.resolution();
        if x_start >= x_end || y_start >= y_end || x_end > width || y_end > height {
            return Err(PanelError::InvalidWindow);
        }
        let expected = (x_end - x_start) as usize * (y_end - y_start) as usize;
        if pixels.len() != expected {
            return Err(PanelError::InvalidWindow);
        }

        self.set_window(x_start, y_start, x_end, y_end)?;
        self.write_pixels(pixels)
    }

    fn swap_xy(&mut self, swap: bool) -> Result<(), PanelError> {
        if swap {
            self.madctl |= madctl::MV;
        } else {
            self.madctl &= !madctl::MV;
        }
        self.write_madctl()
    }

    fn mirror(&mut self, mirror_x: bool, mirror_y: bool) -> Result<(), PanelError> {
        self.madctl &= !(madctl::MX | madctl::MY);
        if mirror_x {
            self.madctl |= madctl::MX;
        }
        if mirror_y {
            self.madctl |= madctl::MY;
        }
        self.write_madctl()
    }

    fn invert_color(&mut self, invert: bool) -> Result<(), PanelError> {
        self.command(if invert { cmd::INVON } else { cmd::INVOFF }, &[])
    }

    fn resolution(&self) -> (u16, u16) {
        if self.madctl & madctl::MV != 0 {
            (HEIGHT, WIDTH)
        } else {
            (WIDTH, HEIGHT)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType as PinErrorType;
    use embedded_hal::spi::{ErrorKind, ErrorType, Operation};
    use proptest::prelude::*;
    use std::rc::Rc;
    use std::vec::Vec;

    /// A bus write: (DC level, bytes)
    type Frame = (bool, Vec<u8>);

    #[derive(Default)]
    struct Bus {
        dc: Cell<bool>,
        frames: RefCell<Vec<Frame>>,
        fail: Cell<bool>,
    }

    struct MockSpi(Rc<Bus>);

    #[derive(Debug)]
    struct BusError;

    impl embedded_hal::spi::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for MockSpi {
        type Error = BusError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), BusError> {
            if self.0.fail.get() {
                return Err(BusError);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.0
                        .frames
                        .borrow_mut()
                        .push((self.0.dc.get(), bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct DcPin(Rc<Bus>);

    impl PinErrorType for DcPin {
        type Error = Infallible;
    }

    impl OutputPin for DcPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.dc.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.dc.set(true);
            Ok(())
        }
    }

    struct NoPin;

    impl PinErrorType for NoPin {
        type Error = Infallible;
    }

    impl OutputPin for NoPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    type TestPanel = Ili9341<MockSpi, DcPin, NoPin, NoDelay>;

    fn panel(bus: &Rc<Bus>) -> TestPanel {
        Ili9341::new(
            MockSpi(bus.clone()),
            DcPin(bus.clone()),
            NoPin,
            NoDelay,
            Ili9341Config::default(),
        )
    }

    fn ready_panel(bus: &Rc<Bus>) -> TestPanel {
        let mut panel = panel(bus);
        panel.reset().unwrap();
        panel.init().unwrap();
        bus.frames.borrow_mut().clear();
        panel
    }

    /// Commands (DC low) in bus order
    fn commands(bus: &Bus) -> Vec<u8> {
        bus.frames
            .borrow()
            .iter()
            .filter(|(dc, _)| !dc)
            .map(|(_, bytes)| bytes[0])
            .collect()
    }

    #[test]
    fn test_init_enables_tearing_effect() {
        let bus = Rc::new(Bus::default());
        let mut panel = panel(&bus);
        panel.reset().unwrap();
        panel.init().unwrap();

        assert_eq!(
            commands(&bus),
            [
                cmd::SWRESET,
                cmd::SLPOUT,
                cmd::COLMOD,
                cmd::MADCTL,
                cmd::TEON,
                cmd::DISPON
            ]
        );
        let frames = bus.frames.borrow();
        let teon = frames.iter().position(|f| *f == (false, std::vec![cmd::TEON]));
        assert_eq!(frames[teon.unwrap() + 1], (true, std::vec![0x00]));
    }

    #[test]
    fn test_init_without_tearing_effect() {
        let bus = Rc::new(Bus::default());
        let mut panel = Ili9341::new(
            MockSpi(bus.clone()),
            DcPin(bus.clone()),
            NoPin,
            NoDelay,
            Ili9341Config {
                tearing_effect: false,
                ..Ili9341Config::default()
            },
        );
        panel.init().unwrap();
        assert!(!commands(&bus).contains(&cmd::TEON));
    }

    #[test]
    fn test_draw_before_init() {
        let bus = Rc::new(Bus::default());
        let mut panel = panel(&bus);
        assert_eq!(
            panel.draw_bitmap(0, 0, 1, 1, &[0]),
            Err(PanelError::NotInitialized)
        );
        assert!(bus.frames.borrow().is_empty());
    }

    #[test]
    fn test_window_registers_inclusive() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);
        let pixels = [0u16; 100 * 50];

        panel.draw_bitmap(0, 0, 100, 50, &pixels).unwrap();

        let frames = bus.frames.borrow();
        assert_eq!(frames[0], (false, std::vec![cmd::CASET]));
        assert_eq!(frames[1], (true, std::vec![0, 0, 0, 99]));
        assert_eq!(frames[2], (false, std::vec![cmd::PASET]));
        assert_eq!(frames[3], (true, std::vec![0, 0, 0, 49]));
        assert_eq!(frames[4], (false, std::vec![cmd::RAMWR]));
    }

    #[test]
    fn test_pixels_big_endian_in_chunks() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);
        let pixels: Vec<u16> = (0..100u16).map(|i| 0xF800 | i).collect();

        panel.draw_bitmap(10, 10, 20, 20, &pixels).unwrap();

        let data: Vec<u8> = bus
            .frames
            .borrow()
            .iter()
            .skip(5)
            .inspect(|(dc, _)| assert!(*dc))
            .flat_map(|(_, bytes)| bytes.clone())
            .collect();
        assert_eq!(data.len(), 200);
        assert_eq!(&data[..4], &[0xF8, 0x00, 0xF8, 0x01]);
        // 100 pixels in chunks of 64
        assert_eq!(bus.frames.borrow().len(), 5 + 2);
    }

    #[test]
    fn test_invalid_windows() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);

        assert_eq!(
            panel.draw_bitmap(5, 0, 5, 1, &[]),
            Err(PanelError::InvalidWindow)
        );
        assert_eq!(
            panel.draw_bitmap(0, 0, WIDTH + 1, 1, &[0; WIDTH as usize + 1]),
            Err(PanelError::InvalidWindow)
        );
        assert_eq!(
            panel.draw_bitmap(0, 0, 2, 2, &[0; 3]),
            Err(PanelError::InvalidWindow)
        );
        assert!(bus.frames.borrow().is_empty());
    }

    #[test]
    fn test_landscape_orientation() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);

        panel.swap_xy(true).unwrap();
        panel.mirror(true, false).unwrap();

        assert_eq!(panel.resolution(), (HEIGHT, WIDTH));
        assert_eq!(panel.madctl(), madctl::BGR | madctl::MV | madctl::MX);

        // Full landscape frame fits after the swap
        let row = [0u16; HEIGHT as usize];
        assert_eq!(panel.draw_bitmap(0, WIDTH - 1, HEIGHT, WIDTH, &row), Ok(()));
    }

    #[test]
    fn test_bus_error() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);
        bus.fail.set(true);
        assert_eq!(
            panel.draw_bitmap(0, 0, 1, 1, &[0]),
            Err(PanelError::Bus)
        );
    }

    #[test]
    fn test_pixel_clock_unsupported() {
        let bus = Rc::new(Bus::default());
        let mut panel = ready_panel(&bus);
        assert_eq!(panel.set_pixel_clock(8_000_000), Err(PanelError::Unsupported));
    }

    proptest! {
        #[test]
        fn prop_window_registers_match_exclusive_bounds(
            x in 0u16..WIDTH,
            y in 0u16..HEIGHT,
            w in 1u16..=16,
            h in 1u16..=16,
        ) {
            let x_end = (x + w).min(WIDTH);
            let y_end = (y + h).min(HEIGHT);
            let bus = Rc::new(Bus::default());
            let mut panel = ready_panel(&bus);
            let pixels = std::vec![0u16; (x_end - x) as usize * (y_end - y) as usize];

            prop_assert_eq!(panel.draw_bitmap(x, y, x_end, y_end, &pixels), Ok(()));

            let frames = bus.frames.borrow();
            let caset = &frames[1].1;
            let paset = &frames[3].1;
            prop_assert_eq!(u16::from_be_bytes([caset[0], caset[1]]), x);
            prop_assert_eq!(u16::from_be_bytes([caset[2], caset[3]]), x_end - 1);
            prop_assert_eq!(u16::from_be_bytes([paset[0], paset[1]]), y);
            prop_assert_eq!(u16::from_be_bytes([paset[2], paset[3]]), y_end - 1);
        }
    }
}
