//! Configuration file support for the bridge host.
//!
//! Supports TOML configuration from:
//! - an explicit `--config <FILE>` (errors are fatal)
//! - otherwise `.grayscale-bridge.toml`, searched up from the working
//!   directory (errors are logged and the file ignored)
//!
//! CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::acquisition::{MediaPermissionPolicy, PermissionRequirements};
use crate::image_pipeline::encode::types::MAX_JPEG_QUALITY;
use crate::image_pipeline::{BridgeConfig, OutputFormat, OutputTarget};

pub const PROJECT_CONFIG_FILE: &str = ".grayscale-bridge.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub concurrency: ConcurrencyConfig,
    pub permissions: PermissionsConfig,
}

/// How processed images are encoded and written.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// "jpeg" or "png".
    pub format: Option<String>,
    /// JPEG quality (1-100).
    pub quality: Option<u8>,
    /// Write `<stem><suffix>.<ext>` instead of overwriting the input.
    pub suffix: Option<String>,
    /// Write through a temporary file.
    pub atomic_write: Option<bool>,
    /// Largest accepted width or height.
    pub max_dimension: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Serialize calls touching the same output path.
    pub serialize_per_path: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Platform API level; unset on hosts without runtime permissions.
    pub api_level: Option<u32>,
    pub media_policy: Option<MediaPermissionPolicy>,
    pub require_camera: Option<bool>,
}

impl AppConfig {
    /// Load configuration from `explicit` or the nearest project file.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            info!("Loading config: {}", path.display());
            return Self::from_file(path);
        }

        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                warn!("Cannot determine working directory: {}", e);
                return Ok(Self::default());
            }
        };

        match find_config_in_parents(&cwd) {
            Some(path) => {
                info!("Loading project config: {}", path.display());
                Ok(Self::from_file(&path).unwrap_or_else(|e| {
                    warn!("{}", e);
                    Self::default()
                }))
            }
            None => {
                debug!("No {} found above {}", PROJECT_CONFIG_FILE, cwd.display());
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref f) = self.output.format {
            if f != "jpeg" && f != "png" {
                return Err(ConfigError::Invalid(format!(
                    "output.format must be 'jpeg' or 'png', got '{f}'"
                )));
            }
        }
        if let Some(q) = self.output.quality {
            if !(1..=MAX_JPEG_QUALITY).contains(&q) {
                return Err(ConfigError::Invalid(format!("output.quality must be 1-100, got {q}")));
            }
            if self.output.format.as_deref() == Some("png") {
                return Err(ConfigError::Invalid(
                    "output.quality only applies to jpeg output".to_string(),
                ));
            }
        }
        if let Some(ref s) = self.output.suffix {
            if s.is_empty() || s.contains(['/', '\\']) {
                return Err(ConfigError::Invalid(format!(
                    "output.suffix must be non-empty and contain no path separators, got '{s}'"
                )));
            }
        }
        if self.output.max_dimension == Some(0) {
            return Err(ConfigError::Invalid("output.max_dimension must be positive".to_string()));
        }
        Ok(())
    }

    pub fn bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        self.validate()?;

        let format = match self.output.format.as_deref() {
            Some("png") => OutputFormat::Png,
            _ => OutputFormat::Jpeg {
                quality: self.output.quality.unwrap_or(MAX_JPEG_QUALITY),
            },
        };
        let target = match &self.output.suffix {
            Some(suffix) => OutputTarget::Sibling { suffix: suffix.clone() },
            None => OutputTarget::InPlace,
        };

        let mut builder = BridgeConfig::builder().format(format).target(target);
        if let Some(atomic) = self.output.atomic_write {
            builder = builder.atomic_write(atomic);
        }
        if let Some(serialize) = self.concurrency.serialize_per_path {
            builder = builder.serialize_per_path(serialize);
        }
        if let Some(max) = self.output.max_dimension {
            builder = builder.max_dimension(Some(max));
        }
        Ok(builder.build())
    }

    pub fn permission_requirements(&self) -> PermissionRequirements {
        let default = PermissionRequirements::default();
        PermissionRequirements {
            api_level: self.permissions.api_level.or(default.api_level),
            media_policy: self.permissions.media_policy.unwrap_or(default.media_policy),
            require_camera: self.permissions.require_camera.unwrap_or(default.require_camera),
        }
    }
}

/// Search for the project config in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(PROJECT_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}
