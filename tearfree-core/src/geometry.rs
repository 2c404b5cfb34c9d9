//! Flush geometry
//!
//! The rendering side describes dirty regions with inclusive bounds, the
//! panel draw primitive takes exclusive end bounds. Keeping the two as
//! distinct types makes the off-by-one impossible to forget.

/// Dirty region with inclusive bounds `[x1, x2] x [y1, y2]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

/// Panel window with exclusive end bounds `[x_start, x_end) x [y_start, y_end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x_start: u16,
    pub y_start: u16,
    pub x_end: u16,
    pub y_end: u16,
}

impl Area {
    /// Create an area from inclusive corners
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area covering a whole `width` x `height` screen
    pub const fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Check that the corners are ordered
    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        u32::from(self.x2) - u32::from(self.x1) + 1
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        u32::from(self.y2) - u32::from(self.y1) + 1
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    /// Convert to the panel's exclusive-end window
    ///
    /// Returns `None` for unordered corners or when the end bound does not
    /// fit in `u16` (x2 or y2 equal to `u16::MAX`).
    pub fn to_window(&self) -> Option<Window> {
        if !self.is_valid() {
            return None;
        }
        Some(Window {
            x_start: self.x1,
            y_start: self.y1,
            x_end: self.x2.checked_add(1)?,
            y_end: self.y2.checked_add(1)?,
        })
    }

    /// Check that the area lies within a `width` x `height` screen
    pub fn fits(&self, width: u16, height: u16) -> bool {
        self.is_valid() && self.x2 < width && self.y2 < height
    }
}

impl Window {
    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        let w = usize::from(self.x_end.saturating_sub(self.x_start));
        let h = usize::from(self.y_end.saturating_sub(self.y_start));
        w * h
    }

    /// Convert back to inclusive bounds
    ///
    /// Returns `None` for an empty window.
    pub fn to_area(&self) -> Option<Area> {
        if self.x_end <= self.x_start || self.y_end <= self.y_start {
            return None;
        }
        Some(Area::new(
            self.x_start,
            self.y_start,
            self.x_end - 1,
            self.y_end - 1,
        ))
    }
}
