//! Image locators
//!
//! A locator is either a `file://` URI or a bare filesystem path. The scheme
//! a reference was parsed from is kept so results can be reported back in the
//! caller's own convention.

use std::fmt;
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorScheme {
    /// `file:///abs/path`
    File,
    /// `/abs/path` or `relative/path`
    Bare,
}

/// Locator identifying image bytes accessible to this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    path: PathBuf,
    scheme: LocatorScheme,
}

impl ImageReference {
    /// Parses a locator, stripping a leading `file://` prefix.
    ///
    /// Anything without that prefix is taken as a path verbatim; a locator in
    /// some other scheme will simply fail to resolve later on.
    pub fn parse(locator: &str) -> Self {
        match locator.strip_prefix(FILE_SCHEME) {
            Some(rest) => Self {
                path: PathBuf::from(rest),
                scheme: LocatorScheme::File,
            },
            None => Self {
                path: PathBuf::from(locator),
                scheme: LocatorScheme::Bare,
            },
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, scheme: LocatorScheme) -> Self {
        Self {
            path: path.into(),
            scheme,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scheme(&self) -> LocatorScheme {
        self.scheme
    }

    /// Same scheme, different path.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scheme: self.scheme,
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn to_locator(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            LocatorScheme::File => write!(f, "{}{}", FILE_SCHEME, self.path.display()),
            LocatorScheme::Bare => write!(f, "{}", self.path.display()),
        }
    }
}

impl From<&str> for ImageReference {
    fn from(locator: &str) -> Self {
        Self::parse(locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_file_scheme() {
        let reference = ImageReference::parse("file:///tmp/photo.jpg");
        assert_eq!(reference.path(), Path::new("/tmp/photo.jpg"));
        assert_eq!(reference.scheme(), LocatorScheme::File);
        assert_eq!(reference.to_locator(), "file:///tmp/photo.jpg");
    }

    #[test]
    fn bare_path_round_trips() {
        let reference = ImageReference::parse("/tmp/photo.jpg");
        assert_eq!(reference.scheme(), LocatorScheme::Bare);
        assert_eq!(reference.to_locator(), "/tmp/photo.jpg");
    }

    #[test]
    fn only_leading_prefix_is_stripped() {
        let reference = ImageReference::parse("/data/file://cache/a.jpg");
        assert_eq!(reference.path(), Path::new("/data/file://cache/a.jpg"));
    }

    #[test]
    fn foreign_scheme_is_kept_as_path() {
        let reference = ImageReference::parse("content://media/external/images/1");
        assert_eq!(reference.scheme(), LocatorScheme::Bare);
        assert!(!reference.exists());
    }

    #[test]
    fn with_path_keeps_scheme() {
        let reference = ImageReference::parse("file:///tmp/a.jpg").with_path("/tmp/b.jpg");
        assert_eq!(reference.to_locator(), "file:///tmp/b.jpg");
    }
}
