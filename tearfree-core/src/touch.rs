//! Touch coordinate mapping
//!
//! Scales raw controller readings to display pixels and keeps the last
//! pressed point, so a release is reported at the position where the
//! finger left the screen.

use tearfree_hal::{PointerError, PointerSource, RawTouch};

use crate::config::{DisplayConfig, TouchCalibration};

/// Pointer state handed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerState {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
}

/// Maps raw touch readings to display coordinates
#[derive(Debug, Clone)]
pub struct TouchMapper {
    hor_res: u16,
    ver_res: u16,
    x_max: u16,
    y_max: u16,
    calibration: TouchCalibration,
    last: PointerState,
}

impl TouchMapper {
    /// Create a mapper for a display and a controller's raw range
    pub fn new(config: &DisplayConfig, raw_range: (u16, u16)) -> Self {
        Self {
            hor_res: config.hor_res.max(1),
            ver_res: config.ver_res.max(1),
            x_max: raw_range.0.max(1),
            y_max: raw_range.1.max(1),
            calibration: config.touch,
            last: PointerState::default(),
        }
    }

    /// Last reported state
    pub fn last(&self) -> PointerState {
        self.last
    }

    /// Read the controller and map the result
    pub fn read<P: PointerSource>(&mut self, source: &mut P) -> PointerState {
        let reading = source.read();
        self.update(reading)
    }

    /// Map one reading
    ///
    /// A read error is reported as "not pressed" at the last position.
    pub fn update(&mut self, reading: Result<RawTouch, PointerError>) -> PointerState {
        match reading {
            Ok(raw) if raw.pressed => {
                let (x, y) = self.map(raw.x, raw.y);
                self.last = PointerState {
                    x,
                    y,
                    pressed: true,
                };
            }
            Ok(_) => self.last.pressed = false,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Touch read failed: {}", _e);
                self.last.pressed = false;
            }
        }
        self.last
    }

    fn map(&self, raw_x: u16, raw_y: u16) -> (u16, u16) {
        let cal = &self.calibration;
        let (raw_x, raw_y, x_max, y_max) = if cal.swap_xy {
            (raw_y, raw_x, self.y_max, self.x_max)
        } else {
            (raw_x, raw_y, self.x_max, self.y_max)
        };

        let mut x = scale(raw_x, x_max, self.hor_res);
        let mut y = scale(raw_y, y_max, self.ver_res);

        if cal.invert_x {
            x = self.hor_res - 1 - x;
        }
        if cal.invert_y {
            y = self.ver_res - 1 - y;
        }

        (
            offset(x, cal.offset_x, self.hor_res),
            offset(y, cal.offset_y, self.ver_res),
        )
    }
}

/// `raw * res / raw_max`, clamped to the last pixel
fn scale(raw: u16, raw_max: u16, res: u16) -> u16 {
    let scaled = raw as u32 * res as u32 / raw_max as u32;
    scaled.min(res as u32 - 1) as u16
}

fn offset(value: u16, delta: i16, res: u16) -> u16 {
    (value as i32 + delta as i32).clamp(0, res as i32 - 1) as u16
}
