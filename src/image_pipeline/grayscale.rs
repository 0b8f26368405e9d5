//! Grayscale conversion module
//!
//! The converter is the only step that depends on a vision library; everything
//! around it only sees pixel buffers.

mod converter;
mod luma_converter;
pub mod types;

pub use converter::GrayscaleConverter;
pub use luma_converter::LumaConverter;
pub use types::GrayImageData;
