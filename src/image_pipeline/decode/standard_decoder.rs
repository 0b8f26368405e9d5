//! Decoder backed by the `image` crate.
//!
//! Format is sniffed from the leading bytes, so the file extension does not
//! matter. High bit depth and float images are narrowed to 8 bits per sample.

use image::{ColorType, DynamicImage};
use tracing::debug;

use crate::image_pipeline::common::error::{BridgeError, Result};
use crate::image_pipeline::decode::decoder::ImageDecoder;
use crate::image_pipeline::decode::types::{ColorLayout, PixelBuffer};

pub struct StandardImageDecoder;

impl ImageDecoder for StandardImageDecoder {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        debug!("Decoding image, {} bytes", data.len());

        let format = image::guess_format(data).map_err(BridgeError::decode)?;
        let decoded = image::load_from_memory_with_format(data, format).map_err(BridgeError::decode)?;

        debug!(
            "Decoded {:?} image: {}x{} {:?}",
            format,
            decoded.width(),
            decoded.height(),
            decoded.color()
        );

        Ok(into_pixel_buffer(decoded))
    }
}

fn into_pixel_buffer(image: DynamicImage) -> PixelBuffer {
    let (width, height) = (image.width(), image.height());
    let (layout, data) = match image.color() {
        ColorType::L8 => (ColorLayout::Gray, image.into_luma8().into_raw()),
        ColorType::La8 => (ColorLayout::GrayAlpha, image.into_luma_alpha8().into_raw()),
        ColorType::Rgb8 => (ColorLayout::Rgb, image.into_rgb8().into_raw()),
        ColorType::Rgba8 => (ColorLayout::Rgba, image.into_rgba8().into_raw()),
        // 16-bit and float variants
        ColorType::L16 => (ColorLayout::Gray, image.into_luma8().into_raw()),
        ColorType::La16 => (ColorLayout::GrayAlpha, image.into_luma_alpha8().into_raw()),
        other if other.has_alpha() => (ColorLayout::Rgba, image.into_rgba8().into_raw()),
        _ => (ColorLayout::Rgb, image.into_rgb8().into_raw()),
    };

    PixelBuffer {
        width,
        height,
        layout,
        data,
    }
}
