use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::decode::types::PixelBuffer;
use crate::image_pipeline::grayscale::types::GrayImageData;

pub trait GrayscaleConverter {
    fn convert_to_grayscale(&self, pixels: &PixelBuffer) -> Result<GrayImageData>;
}
