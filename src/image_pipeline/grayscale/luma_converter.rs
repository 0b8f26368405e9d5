//! Grayscale conversion delegated to the `image` crate.
//!
//! Luma weighting is whatever `image` applies for `into_luma8`, which is the
//! conventional Rec. 709 weighted sum. Alpha is discarded.

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};
use tracing::debug;

use crate::image_pipeline::common::error::{BridgeError, Result};
use crate::image_pipeline::decode::types::{ColorLayout, PixelBuffer};
use crate::image_pipeline::grayscale::converter::GrayscaleConverter;
use crate::image_pipeline::grayscale::types::GrayImageData;

pub struct LumaConverter;

impl GrayscaleConverter for LumaConverter {
    fn convert_to_grayscale(&self, pixels: &PixelBuffer) -> Result<GrayImageData> {
        debug!(
            "Converting {}x{} {:?} buffer to grayscale",
            pixels.width, pixels.height, pixels.layout
        );

        if pixels.data.len() != pixels.expected_len() {
            return Err(BridgeError::ConversionFailed(format!(
                "buffer holds {} samples, {}x{} {:?} needs {}",
                pixels.data.len(),
                pixels.width,
                pixels.height,
                pixels.layout,
                pixels.expected_len()
            )));
        }

        let (width, height) = (pixels.width, pixels.height);
        let data = pixels.data.clone();
        let image = match pixels.layout {
            ColorLayout::Gray => GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            ColorLayout::GrayAlpha => {
                GrayAlphaImage::from_raw(width, height, data).map(DynamicImage::ImageLumaA8)
            }
            ColorLayout::Rgb => RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            ColorLayout::Rgba => RgbaImage::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        }
        .ok_or_else(|| BridgeError::ConversionFailed("pixel buffer rejected by image container".to_string()))?;

        let gray = image.into_luma8();

        Ok(GrayImageData {
            width: gray.width(),
            height: gray.height(),
            data: gray.into_raw(),
        })
    }
}
