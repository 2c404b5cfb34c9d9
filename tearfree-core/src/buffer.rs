//! Draw buffer pool
//!
//! The renderer draws into one buffer while the previous one is being
//! pushed to the panel. Buffers are caller-provided (usually `static`
//! arrays placed by the linker script) and exclusively borrowed here.

/// Draw buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// A buffer has no pixels
    Empty,
    /// The two buffers differ in length
    LengthMismatch,
}

/// One or two RGB565 draw buffers
pub struct DrawBuffers<'a> {
    buffers: [Option<&'a mut [u16]>; 2],
    active: usize,
}

impl<'a> DrawBuffers<'a> {
    /// A single buffer: rendering waits for each flush
    pub fn single(buffer: &'a mut [u16]) -> Result<Self, BufferError> {
        if buffer.is_empty() {
            return Err(BufferError::Empty);
        }
        Ok(Self {
            buffers: [Some(buffer), None],
            active: 0,
        })
    }

    /// Two equally sized buffers used alternately
    pub fn double(first: &'a mut [u16], second: &'a mut [u16]) -> Result<Self, BufferError> {
        if first.is_empty() || second.is_empty() {
            return Err(BufferError::Empty);
        }
        if first.len() != second.len() {
            return Err(BufferError::LengthMismatch);
        }
        Ok(Self {
            buffers: [Some(first), Some(second)],
            active: 0,
        })
    }

    pub fn is_double(&self) -> bool {
        self.buffers[1].is_some()
    }

    /// Pixels per buffer
    pub fn len(&self) -> usize {
        self.buffers[0].as_ref().map_or(0, |b| b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the buffer the renderer currently owns
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Buffer to render the next area into
    pub fn render_target(&mut self) -> &mut [u16] {
        match self.buffers[self.active].as_deref_mut() {
            Some(buffer) => buffer,
            None => &mut [],
        }
    }

    /// The buffer most recently rendered, for handing to the flush
    pub fn rendered(&self) -> &[u16] {
        self.buffers[self.active].as_deref().unwrap_or(&[])
    }

    /// Hand the rendered buffer to the panel and switch to the other one
    ///
    /// Call after the flush has reported completion. Single-buffer pools
    /// stay on the same buffer.
    pub fn swap(&mut self) {
        if self.is_double() {
            self.active ^= 1;
        }
    }
}
