use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::image_pipeline::{
    bridge::locks::PathLocks,
    common::error::{BridgeError, Result},
    decode::{ImageDecoder, StandardImageDecoder},
    encode::{BridgeConfig, ImageEncoder, StandardImageEncoder},
    grayscale::{GrayscaleConverter, LumaConverter},
    reference::ImageReference,
    runtime::VisionRuntime,
};

pub struct ProcessingBridge<D: ImageDecoder, C: GrayscaleConverter, E: ImageEncoder> {
    decoder: D,
    converter: C,
    encoder: E,
    config: BridgeConfig,
    runtime: Arc<VisionRuntime>,
    locks: PathLocks,
}

impl ProcessingBridge<StandardImageDecoder, LumaConverter, StandardImageEncoder> {
    pub fn new(runtime: Arc<VisionRuntime>, config: BridgeConfig) -> Self {
        Self::with_custom(
            StandardImageDecoder,
            LumaConverter,
            StandardImageEncoder,
            runtime,
            config,
        )
    }
}

impl<D: ImageDecoder, C: GrayscaleConverter, E: ImageEncoder> ProcessingBridge<D, C, E> {
    pub fn with_custom(
        decoder: D,
        converter: C,
        encoder: E,
        runtime: Arc<VisionRuntime>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            decoder,
            converter,
            encoder,
            config,
            runtime,
            locks: PathLocks::new(),
        }
    }

    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(BridgeError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!(
                    "Image dimensions {}x{} exceed maximum {}",
                    width, height, max
                );
                return Err(BridgeError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes `input_data`, converts it to grayscale and writes the encoded
    /// result to `output`. Returns the image dimensions.
    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<(u32, u32)> {
        let pixels = {
            let _span = tracing::info_span!("decode").entered();
            self.decoder.decode(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = pixels.width,
                height = pixels.height
            ).entered();
            self.validate_dimensions(pixels.width, pixels.height)?;
        }

        let gray = {
            let _span = tracing::info_span!("grayscale", layout = ?pixels.layout).entered();
            self.converter.convert_to_grayscale(&pixels)?
        };

        {
            let _span = tracing::info_span!("encode", format = self.config.format.name()).entered();
            self.encoder.encode(&gray, output, self.config.format)?;
        }

        Ok((gray.width, gray.height))
    }

    /// Processes the image at `locator` on the calling thread.
    ///
    /// Nothing is written unless every step before the write succeeded.
    #[instrument(skip(self))]
    pub fn process_blocking(&self, locator: &str) -> Result<ImageReference> {
        if !self.runtime.is_initialized() {
            error!("Processing requested before vision runtime initialization");
            return Err(BridgeError::NotInitialized);
        }

        let reference = ImageReference::parse(locator);
        if !reference.exists() {
            warn!(path = %reference.path().display(), "Input image not found");
            return Err(BridgeError::NotFound {
                locator: locator.to_string(),
            });
        }

        let target = self.config.target.resolve(reference.path(), self.config.format);
        // Writes land on the resolved file so symlinks survive and aliased
        // spellings of one file share a lock.
        let resolved = resolve_write_path(&target)?;

        let run = || self.rewrite(locator, reference.path(), &resolved);
        let (width, height) = if self.config.serialize_per_path {
            self.locks.run_locked(&resolved, run)?
        } else {
            run()?
        };

        let target = std::path::absolute(&target).unwrap_or(target);
        let processed = reference.with_path(target);
        info!(
            width,
            height,
            output = %processed,
            "Processing complete"
        );
        Ok(processed)
    }

    fn rewrite(&self, locator: &str, input_path: &Path, target: &Path) -> Result<(u32, u32)> {
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            fs::read(input_path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => BridgeError::NotFound {
                    locator: locator.to_string(),
                },
                _ => BridgeError::decode(e).for_locator(locator),
            })?
        };

        let mut encoded = Vec::new();
        let dimensions = self
            .convert(&input_data, &mut encoded)
            .map_err(|e| e.for_locator(locator))?;

        {
            let _span = tracing::info_span!("write_output_file", atomic = self.config.atomic_write).entered();
            if self.config.atomic_write {
                write_atomic(target, &encoded)?;
            } else {
                fs::write(target, &encoded).map_err(|e| BridgeError::write(target, e))?;
            }
        }

        Ok(dimensions)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: BridgeConfig) {
        self.config = config;
    }

    pub fn runtime(&self) -> &Arc<VisionRuntime> {
        &self.runtime
    }
}

impl<D, C, E> ProcessingBridge<D, C, E>
where
    D: ImageDecoder + Send + Sync + 'static,
    C: GrayscaleConverter + Send + Sync + 'static,
    E: ImageEncoder + Send + Sync + 'static,
{
    /// Processes the image at `locator` on the blocking pool.
    pub async fn process(self: &Arc<Self>, locator: impl Into<String>) -> Result<ImageReference> {
        let bridge = Arc::clone(self);
        let locator = locator.into();
        tokio::task::spawn_blocking(move || bridge.process_blocking(&locator))
            .await
            .map_err(|e| BridgeError::WorkerFailed(e.to_string()))?
    }

    /// Spawns processing and hands the outcome to `on_complete` exactly once.
    pub fn submit<F>(self: &Arc<Self>, locator: impl Into<String>, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<ImageReference>) + Send + 'static,
    {
        let bridge = Arc::clone(self);
        let locator = locator.into();
        tokio::spawn(async move {
            let result = bridge.process(locator).await;
            on_complete(result);
        })
    }
}

/// Follows symlinks and `..` in `target`. A target that does not exist yet is
/// resolved through its parent directory.
fn resolve_write_path(target: &Path) -> Result<PathBuf> {
    match fs::canonicalize(target) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let name = target
                .file_name()
                .ok_or_else(|| BridgeError::write(target, io::Error::from(ErrorKind::InvalidInput)))?;
            let parent = match target.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let parent = fs::canonicalize(parent).map_err(|e| BridgeError::write(target, e))?;
            Ok(parent.join(name))
        }
        Err(e) => Err(BridgeError::write(target, e)),
    }
}

/// Writes through a temporary file in the target's directory, then renames it
/// over the target.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| BridgeError::write(target, e))?;
    tmp.write_all(bytes).map_err(|e| BridgeError::write(target, e))?;
    tmp.as_file().sync_all().map_err(|e| BridgeError::write(target, e))?;

    if let Ok(metadata) = fs::metadata(target) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(|e| BridgeError::write(target, e))?;
    }

    tmp.persist(target).map_err(|e| BridgeError::write(target, e.error))?;
    Ok(())
}
