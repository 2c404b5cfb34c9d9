//! XPT2046 resistive touch controller (SPI)
//!
//! 12-bit ADC with differential reference. Each channel is read with a
//! 3-byte transfer: control byte, then the result left-aligned over the
//! next 15 bits.

use embedded_hal::spi::SpiDevice;
use tearfree_hal::{PointerError, PointerSource, RawTouch};

/// Control bytes (start bit, channel, 12-bit, differential, power-down between conversions)
pub mod ctrl {
    pub const READ_X: u8 = 0xD0;
    pub const READ_Y: u8 = 0x90;
    pub const READ_Z1: u8 = 0xB0;
}

/// Full-scale ADC reading
pub const ADC_MAX: u16 = 4095;

/// XPT2046 configuration
#[derive(Debug, Clone, Copy)]
pub struct Xpt2046Config {
    /// Minimum Z1 pressure for a touch
    pub pressure_threshold: u16,
    /// Samples averaged per axis (at least 1)
    pub samples: u8,
}

impl Default for Xpt2046Config {
    fn default() -> Self {
        Self {
            pressure_threshold: 100,
            samples: 4,
        }
    }
}

/// XPT2046 driver
pub struct Xpt2046<SPI> {
    spi: SPI,
    config: Xpt2046Config,
}

impl<SPI: SpiDevice> Xpt2046<SPI> {
    pub fn new(spi: SPI, config: Xpt2046Config) -> Self {
        Self { spi, config }
    }

    /// Read one 12-bit channel
    fn channel(&mut self, control: u8) -> Result<u16, PointerError> {
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &[control, 0, 0])
            .map_err(|_| PointerError::Bus)?;
        Ok((u16::from_be_bytes([rx[1], rx[2]]) >> 3) & ADC_MAX)
    }

    /// Averaged reading of one channel
    fn averaged(&mut self, control: u8) -> Result<u16, PointerError> {
        let samples = self.config.samples.max(1) as u32;
        let mut sum = 0u32;
        for _ in 0..samples {
            sum += self.channel(control)? as u32;
        }
        Ok((sum / samples) as u16)
    }
}

impl<SPI: SpiDevice> PointerSource for Xpt2046<SPI> {
    fn read(&mut self) -> Result<RawTouch, PointerError> {
        let z1 = self.channel(ctrl::READ_Z1)?;
        if z1 < self.config.pressure_threshold {
            return Ok(RawTouch {
                x: 0,
                y: 0,
                pressed: false,
            });
        }

        let x = self.averaged(ctrl::READ_X)?;
        let y = self.averaged(ctrl::READ_Y)?;

        // Pen lifted mid-conversion: any railed axis is invalid
        if x == 0 || y == 0 || x == ADC_MAX || y == ADC_MAX {
            return Err(PointerError::InvalidData);
        }

        Ok(RawTouch {
            x,
            y,
            pressed: true,
        })
    }

    fn raw_range(&self) -> (u16, u16) {
        (ADC_MAX + 1, ADC_MAX + 1)
    }
}
