/// Single-channel 8-bit image produced by grayscale conversion
#[derive(Debug, Clone)]
pub struct GrayImageData {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// One luma sample per pixel, row-major
    pub data: Vec<u8>,
}
