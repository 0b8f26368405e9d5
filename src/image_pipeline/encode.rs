//! Image encoding module
//!
//! This module provides encoding of grayscale buffers and the configuration
//! that controls where and how processed images are written.

mod encoder;
mod standard_encoder;
pub mod types;

pub use encoder::ImageEncoder;
pub use standard_encoder::StandardImageEncoder;
pub use types::{BridgeConfig, BridgeConfigBuilder, OutputFormat, OutputTarget};
