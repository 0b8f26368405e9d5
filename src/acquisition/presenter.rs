use crate::image_pipeline::ImageReference;

/// Port for showing a processed image.
pub trait Presenter: Send + Sync {
    fn display(&self, reference: &ImageReference);
}
