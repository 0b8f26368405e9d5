//! One-time vision runtime initialization
//!
//! The host calls [`initialize`] once at startup. Bridges bound to a runtime
//! refuse to process anything until that runtime reports ready.

use std::sync::{Arc, LazyLock, OnceLock};

use tracing::{error, info};

use crate::image_pipeline::common::error::InitError;
use crate::image_pipeline::decode::{ColorLayout, ImageDecoder, StandardImageDecoder};
use crate::image_pipeline::encode::{ImageEncoder, OutputFormat, StandardImageEncoder};
use crate::image_pipeline::grayscale::GrayImageData;

static GLOBAL: LazyLock<Arc<VisionRuntime>> = LazyLock::new(|| Arc::new(VisionRuntime::new()));

/// Proof that a runtime finished initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    _private: (),
}

#[derive(Debug, Default)]
pub struct VisionRuntime {
    ready: OnceLock<Ready>,
}

impl VisionRuntime {
    pub fn new() -> Self {
        Self {
            ready: OnceLock::new(),
        }
    }

    /// The process-wide runtime.
    pub fn global() -> Arc<VisionRuntime> {
        Arc::clone(&GLOBAL)
    }

    /// Probes the codec stack on first success and caches the result.
    ///
    /// Failures are not cached, so a host may call this again.
    pub fn initialize(&self) -> Result<Ready, InitError> {
        self.initialize_with(probe_codecs)
    }

    pub(crate) fn initialize_with<F>(&self, probe: F) -> Result<Ready, InitError>
    where
        F: FnOnce() -> Result<(), InitError>,
    {
        if let Some(ready) = self.ready.get() {
            return Ok(*ready);
        }

        match probe() {
            Ok(()) => {
                let ready = *self.ready.get_or_init(|| Ready { _private: () });
                info!("Vision runtime loaded successfully");
                Ok(ready)
            }
            Err(e) => {
                error!("Unable to load vision runtime: {}", e);
                Err(e)
            }
        }
    }

    pub fn ready(&self) -> Option<Ready> {
        self.ready.get().copied()
    }

    pub fn is_initialized(&self) -> bool {
        self.ready.get().is_some()
    }
}

/// Initializes the process-wide runtime.
pub fn initialize() -> Result<Ready, InitError> {
    GLOBAL.initialize()
}

/// Encodes and decodes a tiny gray image through every output format.
fn probe_codecs() -> Result<(), InitError> {
    const SIZE: u32 = 2;
    let image = GrayImageData {
        width: SIZE,
        height: SIZE,
        data: vec![0, 85, 170, 255],
    };

    for format in [OutputFormat::default(), OutputFormat::Png] {
        let name = format.name();
        let unavailable = |message: String| InitError::CodecUnavailable {
            format: name,
            message,
        };

        let mut bytes = Vec::new();
        StandardImageEncoder
            .encode(&image, &mut bytes, format)
            .map_err(|e| unavailable(e.to_string()))?;
        let decoded = StandardImageDecoder
            .decode(&bytes)
            .map_err(|e| unavailable(e.to_string()))?;

        if decoded.width != SIZE || decoded.height != SIZE || decoded.layout != ColorLayout::Gray {
            return Err(InitError::ProbeMismatch {
                format: name,
                width: decoded.width,
                height: decoded.height,
                channels: decoded.layout.channels() as u8,
            });
        }
    }

    Ok(())
}
