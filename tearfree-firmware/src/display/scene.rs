//! Test scene renderer
//!
//! A gradient background with a vertical bar sweeping horizontally. The bar
//! is the classic tearing probe: a torn frame shows it with a sheared edge.
//! A square follows the finger while the screen is touched.

use tearfree_core::{Area, PointerState};

const BAR_WIDTH: u16 = 24;
const BAR_STEP: u16 = 6;
const CURSOR_HALF: u16 = 10;

const WHITE: u16 = 0xFFFF;
const BAR: u16 = 0xF800;

/// Pack 8-bit channels into RGB565
const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

pub struct Scene {
    hor_res: u16,
    ver_res: u16,
    bar_x: u16,
    pointer: PointerState,
}

impl Scene {
    pub fn new(hor_res: u16, ver_res: u16) -> Self {
        Self {
            hor_res: hor_res.max(1),
            ver_res: ver_res.max(1),
            bar_x: 0,
            pointer: PointerState::default(),
        }
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Move to the next frame
    pub fn advance(&mut self) {
        self.bar_x = (self.bar_x + BAR_STEP) % self.hor_res;
    }

    /// Render `area` into `pixels` (row-major, `area.pixel_count()` long)
    pub fn render(&self, area: Area, pixels: &mut [u16]) {
        let width = area.width() as usize;
        if width == 0 {
            return;
        }

        for (row, line) in pixels.chunks_mut(width).enumerate() {
            let y = area.y1 + row as u16;
            for (col, px) in line.iter_mut().enumerate() {
                let x = area.x1 + col as u16;
                *px = self.pixel(x, y);
            }
        }
    }

    fn pixel(&self, x: u16, y: u16) -> u16 {
        if self.pointer.pressed
            && x.abs_diff(self.pointer.x) <= CURSOR_HALF
            && y.abs_diff(self.pointer.y) <= CURSOR_HALF
        {
            return WHITE;
        }

        if x >= self.bar_x && x < self.bar_x + BAR_WIDTH {
            return BAR;
        }

        let g = (y as u32 * 255 / self.ver_res as u32) as u8;
        let b = (x as u32 * 255 / self.hor_res as u32) as u8;
        rgb565(0, g, b)
    }
}
