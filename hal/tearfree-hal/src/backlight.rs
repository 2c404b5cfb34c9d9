//! Backlight abstractions

/// Backlight errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightError {
    /// Duty cycle above 100%
    InvalidDuty,
    /// PWM or GPIO could not be driven
    Hardware,
}

/// Display backlight
pub trait Backlight {
    /// Set brightness as a duty cycle in percent (0-100)
    fn set_duty(&mut self, percent: u8) -> Result<(), BacklightError>;
}

/// Backlight that is hard-wired on
///
/// For boards where the backlight is tied to the supply rail.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedBacklight;

impl Backlight for FixedBacklight {
    fn set_duty(&mut self, percent: u8) -> Result<(), BacklightError> {
        if percent > 100 {
            return Err(BacklightError::InvalidDuty);
        }
        Ok(())
    }
}
