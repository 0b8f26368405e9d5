use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::encode::types::OutputFormat;
use crate::image_pipeline::grayscale::types::GrayImageData;

pub trait ImageEncoder {
    fn encode(&self, image: &GrayImageData, output: &mut dyn Write, format: OutputFormat) -> Result<()>;
}
