use std::error::Error as StdError;
use std::path::Path;

use thiserror::Error;

type Source = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Vision runtime is not initialized")]
    NotInitialized,

    #[error("Could not find image file at {locator}")]
    NotFound { locator: String },

    #[error("Failed to decode image: {message}")]
    DecodeFailed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Failed to convert image to grayscale: {0}")]
    ConversionFailed(String),

    #[error("Failed to encode or write image: {message}")]
    EncodeOrWriteFailed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    #[error("Processing worker failed: {0}")]
    WorkerFailed(String),
}

impl BridgeError {
    pub(crate) fn decode(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::DecodeFailed {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn encode(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::EncodeOrWriteFailed {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn write(target: &Path, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::EncodeOrWriteFailed {
            message: format!("{}: {}", target.display(), source),
            source: Some(Box::new(source)),
        }
    }

    /// Prefixes decode failures with the locator that was being read.
    pub(crate) fn for_locator(self, locator: &str) -> Self {
        match self {
            Self::DecodeFailed { message, source } => Self::DecodeFailed {
                message: format!("{locator}: {message}"),
                source,
            },
            other => other,
        }
    }

    /// Short, stable category code reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DecodeFailed { .. } => "DECODE_FAILED",
            Self::InvalidDimensions(..) => "INVALID_DIMENSIONS",
            Self::ConversionFailed(_) => "CONVERSION_FAILED",
            Self::EncodeOrWriteFailed { .. } => "ENCODE_OR_WRITE_FAILED",
            Self::WorkerFailed(_) => "WORKER_FAILED",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Codec probe failed for {format}: {message}")]
    CodecUnavailable { format: &'static str, message: String },

    #[error("Codec probe for {format} returned {width}x{height} {channels}-channel image")]
    ProbeMismatch {
        format: &'static str,
        width: u32,
        height: u32,
        channels: u8,
    },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
