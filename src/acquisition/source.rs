use std::path::PathBuf;

use tracing::debug;

use crate::image_pipeline::ImageReference;

/// How the user asked for an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionKind {
    Camera,
    Library,
}

/// Result of one acquisition attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    Selected(ImageReference),
    /// Dismissed without choosing, or nothing usable came back
    Cancelled,
    Failed { code: String, message: String },
}

/// Port for obtaining an image reference from the user.
pub trait ImageSource: Send + Sync {
    fn acquire(&self, kind: AcquisitionKind) -> AcquisitionOutcome;
}

/// Image source that always yields a fixed locator.
///
/// Stands in for a picker when the host already knows which file to use.
pub struct FsImageSource {
    path: PathBuf,
}

impl FsImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FsImageSource {
    fn acquire(&self, kind: AcquisitionKind) -> AcquisitionOutcome {
        debug!("Acquiring {:?} image from {}", kind, self.path.display());

        if kind == AcquisitionKind::Camera {
            return AcquisitionOutcome::Failed {
                code: "camera_unavailable".to_string(),
                message: "no camera attached to a filesystem source".to_string(),
            };
        }

        if !self.path.is_file() {
            return AcquisitionOutcome::Cancelled;
        }

        match self.path.to_str() {
            Some(locator) => AcquisitionOutcome::Selected(ImageReference::parse(locator)),
            None => AcquisitionOutcome::Failed {
                code: "invalid_path".to_string(),
                message: format!("path is not valid UTF-8: {}", self.path.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_pick_yields_reference() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = FsImageSource::new(file.path());

        match source.acquire(AcquisitionKind::Library) {
            AcquisitionOutcome::Selected(reference) => assert_eq!(reference.path(), file.path()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsImageSource::new(dir.path().join("none.jpg"));
        assert_eq!(source.acquire(AcquisitionKind::Library), AcquisitionOutcome::Cancelled);
    }

    #[test]
    fn camera_is_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = FsImageSource::new(file.path());
        assert!(matches!(
            source.acquire(AcquisitionKind::Camera),
            AcquisitionOutcome::Failed { .. }
        ));
    }
}
