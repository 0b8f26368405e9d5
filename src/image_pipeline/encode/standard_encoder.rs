use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder as _};
use tracing::debug;

use crate::image_pipeline::common::error::{BridgeError, Result};
use crate::image_pipeline::encode::encoder::ImageEncoder;
use crate::image_pipeline::encode::types::OutputFormat;
use crate::image_pipeline::grayscale::types::GrayImageData;

pub struct StandardImageEncoder;

impl ImageEncoder for StandardImageEncoder {
    fn encode(&self, image: &GrayImageData, output: &mut dyn Write, format: OutputFormat) -> Result<()> {
        debug!(
            "Encoding {} image: {}x{}",
            format.name(),
            image.width,
            image.height
        );

        let expected = image.width as usize * image.height as usize;
        if image.data.len() != expected {
            return Err(BridgeError::EncodeOrWriteFailed {
                message: format!("expected {} samples, got {}", expected, image.data.len()),
                source: None,
            });
        }

        let mut buffer = Vec::new();

        match format {
            OutputFormat::Jpeg { quality } => {
                JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                    .write_image(&image.data, image.width, image.height, ExtendedColorType::L8)
                    .map_err(BridgeError::encode)?;
            }
            OutputFormat::Png => {
                PngEncoder::new(&mut buffer)
                    .write_image(&image.data, image.width, image.height, ExtendedColorType::L8)
                    .map_err(BridgeError::encode)?;
            }
        }

        output.write_all(&buffer).map_err(BridgeError::encode)?;

        debug!("Encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImageData {
        GrayImageData {
            width,
            height,
            data: (0..width * height).map(|i| (i % 256) as u8).collect(),
        }
    }

    #[test]
    fn png_is_lossless() {
        let image = gradient(16, 16);
        let mut out = Vec::new();
        StandardImageEncoder.encode(&image, &mut out, OutputFormat::Png).unwrap();

        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
        assert_eq!(decoded.into_luma8().into_raw(), image.data);
    }

    #[test]
    fn jpeg_is_single_channel() {
        let image = gradient(32, 8);
        let mut out = Vec::new();
        StandardImageEncoder
            .encode(&image, &mut out, OutputFormat::default())
            .unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), image::ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 8));
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[test]
    fn mismatched_buffer_fails() {
        let image = GrayImageData {
            width: 10,
            height: 10,
            data: vec![0; 3],
        };
        let mut out = Vec::new();
        let err = StandardImageEncoder
            .encode(&image, &mut out, OutputFormat::Png)
            .unwrap_err();
        assert_eq!(err.code(), "ENCODE_OR_WRITE_FAILED");
        assert!(out.is_empty());
    }
}
