//! The destination pixel buffer

use crate::error::{RenderError, Result};
use crate::geometry::CanvasSize;

/// A single-channel 8-bit image, row-major, top row first.
///
/// Owned by one render job until it is handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Allocate a zero-filled canvas.
    ///
    /// Zero-sized canvases are fine and own an empty buffer. Fails only when
    /// `width * height` bytes cannot be addressed or allocated.
    pub fn create(width: u32, height: u32) -> Result<Self> {
        let invalid = || RenderError::InvalidDimensions { width, height };

        let len = (width as usize)
            .checked_mul(height as usize)
            .filter(|len| *len <= isize::MAX as usize)
            .ok_or_else(invalid)?;

        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| invalid())?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap an existing buffer; its length must be `width * height`
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(pixels.len()) {
            return Err(RenderError::InvalidDimensions { width, height }.into());
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Pixel value, None outside the canvas
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Mutable row `y`, None outside the canvas
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.width as usize;
        self.pixels.get_mut(start..start + self.width as usize)
    }

    /// Give up the buffer: `(width, height, pixels)`
    pub fn into_parts(self) -> (u32, u32, Vec<u8>) {
        (self.width, self.height, self.pixels)
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = u32::try_from(y).ok().filter(|y| *y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }
}
