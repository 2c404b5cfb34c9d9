//! PWM backlight

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use tearfree_hal::{Backlight, BacklightError};

/// PWM top value; 125 MHz / 5000 = 25 kHz, above the audible range
pub const PWM_TOP: u16 = 4999;

/// Backlight driven from PWM channel A of one slice
pub struct PwmBacklight<'d> {
    pwm: Pwm<'d>,
    config: PwmConfig,
    duty: u8,
}

impl<'d> PwmBacklight<'d> {
    /// Take a PWM slice; the backlight starts off
    pub fn new(mut pwm: Pwm<'d>) -> Self {
        let mut config = PwmConfig::default();
        config.top = PWM_TOP;
        config.compare_a = 0;
        pwm.set_config(&config);
        Self {
            pwm,
            config,
            duty: 0,
        }
    }

    /// Current duty in percent
    pub fn duty(&self) -> u8 {
        self.duty
    }
}

impl Backlight for PwmBacklight<'_> {
    fn set_duty(&mut self, percent: u8) -> Result<(), BacklightError> {
        if percent > 100 {
            return Err(BacklightError::InvalidDuty);
        }
        self.config.compare_a = compare_for(percent, PWM_TOP);
        self.pwm.set_config(&self.config);
        self.duty = percent;
        Ok(())
    }
}

/// Compare value for `percent` duty at `top`
const fn compare_for(percent: u8, top: u16) -> u16 {
    ((top as u32 + 1) * percent as u32 / 100) as u16
}
