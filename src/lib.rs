pub mod acquisition;
pub mod config;
pub mod image_pipeline;
pub mod logger;
