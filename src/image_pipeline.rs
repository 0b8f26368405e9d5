//! Image processing pipeline module
//!
//! This module provides the grayscale processing bridge, with separate modules
//! for locators, decoding, conversion, encoding and runtime initialization.

pub mod bridge;
pub mod common;
pub mod decode;
pub mod encode;
pub mod grayscale;
pub mod reference;
pub mod runtime;

pub use common::{
    BridgeError,
    InitError,
    Result,
};

pub use reference::{
    ImageReference,
    LocatorScheme,
};

pub use decode::{
    ColorLayout,
    ImageDecoder,
    PixelBuffer,
    StandardImageDecoder,
};

pub use grayscale::{
    GrayImageData,
    GrayscaleConverter,
    LumaConverter,
};

pub use encode::{
    BridgeConfig,
    BridgeConfigBuilder,
    ImageEncoder,
    OutputFormat,
    OutputTarget,
    StandardImageEncoder,
};

pub use runtime::{
    initialize,
    Ready,
    VisionRuntime,
};

pub use bridge::{
    PathLocks,
    ProcessingBridge,
};

/// Bridge wired to the standard codecs and converter.
pub type StandardBridge = ProcessingBridge<StandardImageDecoder, LumaConverter, StandardImageEncoder>;
