//! Bridge configuration types

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Highest JPEG quality, the closest the codec gets to lossless
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Encoded format of the processed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG at the given quality (1-100)
    Jpeg { quality: u8 },
    /// Lossless PNG
    Png,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpeg",
            OutputFormat::Png => "png",
        }
    }

    /// File extensions this format is written under, preferred one first
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Jpeg { .. } => &["jpg", "jpeg"],
            OutputFormat::Png => &["png"],
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Jpeg {
            quality: MAX_JPEG_QUALITY,
        }
    }
}

/// Where the processed image is written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// Overwrite the input file
    #[default]
    InPlace,
    /// Write next to the input as `<stem><suffix>.<ext>`, where `ext` matches
    /// the output format
    Sibling { suffix: String },
}

impl OutputTarget {
    pub fn resolve(&self, input: &Path, format: OutputFormat) -> PathBuf {
        match self {
            OutputTarget::InPlace => input.to_path_buf(),
            OutputTarget::Sibling { suffix } => {
                let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
                name.push(suffix);
                name.push(".");
                name.push(sibling_extension(input, format));
                input.with_file_name(name)
            }
        }
    }
}

/// Keeps the input's spelling when it already names `format`.
fn sibling_extension(input: &Path, format: OutputFormat) -> &OsStr {
    let extensions = format.extensions();
    match input.extension() {
        Some(ext)
            if ext
                .to_str()
                .is_some_and(|e| extensions.iter().any(|known| e.eq_ignore_ascii_case(known))) =>
        {
            ext
        }
        _ => OsStr::new(extensions[0]),
    }
}

/// Configuration for the processing bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Encoded format of the result
    pub format: OutputFormat,
    /// Output location relative to the input
    pub target: OutputTarget,
    /// Write through a temporary file and rename it over the target
    pub atomic_write: bool,
    /// Hold a per-path lock for the whole read-transform-write sequence
    pub serialize_per_path: bool,
    /// Whether to validate image dimensions before conversion
    pub validate_dimensions: bool,
    /// Largest accepted width or height
    pub max_dimension: Option<u32>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            target: OutputTarget::InPlace,
            atomic_write: true,
            serialize_per_path: true,
            validate_dimensions: true,
            max_dimension: Some(50000),
        }
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for BridgeConfig
#[derive(Default)]
pub struct BridgeConfigBuilder {
    format: Option<OutputFormat>,
    target: Option<OutputTarget>,
    atomic_write: Option<bool>,
    serialize_per_path: Option<bool>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<u32>>,
}

impl BridgeConfigBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn target(mut self, target: OutputTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn atomic_write(mut self, enable: bool) -> Self {
        self.atomic_write = Some(enable);
        self
    }

    pub fn serialize_per_path(mut self, enable: bool) -> Self {
        self.serialize_per_path = Some(enable);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<u32>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn build(self) -> BridgeConfig {
        let default = BridgeConfig::default();
        BridgeConfig {
            format: self.format.unwrap_or(default.format),
            target: self.target.unwrap_or(default.target),
            atomic_write: self.atomic_write.unwrap_or(default.atomic_write),
            serialize_per_path: self.serialize_per_path.unwrap_or(default.serialize_per_path),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
        }
    }
}
