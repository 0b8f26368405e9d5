//! Image decoding module
//!
//! This module turns encoded image bytes into an 8-bit pixel buffer.

mod decoder;
mod standard_decoder;
pub mod types;

pub use decoder::ImageDecoder;
pub use standard_decoder::StandardImageDecoder;
pub use types::{ColorLayout, PixelBuffer};
