//! Decoded pixel data types

/// Channel arrangement of an 8-bit pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ColorLayout {
    pub fn channels(self) -> usize {
        match self {
            ColorLayout::Gray => 1,
            ColorLayout::GrayAlpha => 2,
            ColorLayout::Rgb => 3,
            ColorLayout::Rgba => 4,
        }
    }
}

/// Represents a decoded image held in memory
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// Channel layout of `data`
    pub layout: ColorLayout,
    /// Interleaved 8-bit samples, row-major
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// Number of samples `data` must hold for the declared size and layout.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.layout.channels()
    }
}
