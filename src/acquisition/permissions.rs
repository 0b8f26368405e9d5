//! Permission gating for acquisition
//!
//! Which permissions are requested depends on the platform API level; how a
//! partial grant of media permissions is judged is an explicit policy.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// First API level with per-media-type read permissions
pub const SCOPED_MEDIA_API_LEVEL: u32 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    ReadMediaImages,
    ReadMediaVideo,
    ReadExternalStorage,
}

impl Permission {
    pub fn is_media(self) -> bool {
        !matches!(self, Permission::Camera)
    }

    /// Platform identifier of the permission.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Camera => "android.permission.CAMERA",
            Permission::ReadMediaImages => "android.permission.READ_MEDIA_IMAGES",
            Permission::ReadMediaVideo => "android.permission.READ_MEDIA_VIDEO",
            Permission::ReadExternalStorage => "android.permission.READ_EXTERNAL_STORAGE",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NeverAskAgain,
}

/// Answers returned by a permission request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionGrants {
    statuses: HashMap<Permission, PermissionStatus>,
}

impl PermissionGrants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, permission: Permission, status: PermissionStatus) -> Self {
        self.statuses.insert(permission, status);
        self
    }

    pub fn status(&self, permission: Permission) -> Option<PermissionStatus> {
        self.statuses.get(&permission).copied()
    }

    pub fn is_granted(&self, permission: Permission) -> bool {
        self.status(permission) == Some(PermissionStatus::Granted)
    }
}

impl FromIterator<(Permission, PermissionStatus)> for PermissionGrants {
    fn from_iter<I: IntoIterator<Item = (Permission, PermissionStatus)>>(iter: I) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

/// How a partial grant of the requested media permissions is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaPermissionPolicy {
    /// Any one granted media permission is enough
    #[default]
    AnyMedia,
    /// Every requested media permission must be granted
    AllMedia,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied { missing: Vec<Permission> },
}

impl PermissionDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionDecision::Granted)
    }
}

/// Port for asking the platform for permissions.
pub trait PermissionGate: Send + Sync {
    fn request(&self, permissions: &[Permission]) -> Result<PermissionGrants, String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequirements {
    /// Platform API level; `None` on platforms without runtime permissions
    pub api_level: Option<u32>,
    pub media_policy: MediaPermissionPolicy,
    pub require_camera: bool,
}

impl Default for PermissionRequirements {
    fn default() -> Self {
        Self {
            api_level: None,
            media_policy: MediaPermissionPolicy::AnyMedia,
            require_camera: true,
        }
    }
}

impl PermissionRequirements {
    pub fn media_permissions(&self) -> Vec<Permission> {
        match self.api_level {
            None => Vec::new(),
            Some(level) if level >= SCOPED_MEDIA_API_LEVEL => {
                vec![Permission::ReadMediaImages, Permission::ReadMediaVideo]
            }
            Some(_) => vec![Permission::ReadExternalStorage],
        }
    }

    /// Everything that has to be asked for, media first.
    pub fn to_request(&self) -> Vec<Permission> {
        let mut permissions = self.media_permissions();
        if self.api_level.is_some() && self.require_camera {
            permissions.push(Permission::Camera);
        }
        permissions
    }

    pub fn evaluate(&self, grants: &PermissionGrants) -> PermissionDecision {
        let media = self.media_permissions();
        let denied_media: Vec<Permission> = media
            .iter()
            .copied()
            .filter(|p| !grants.is_granted(*p))
            .collect();

        let media_ok = match self.media_policy {
            MediaPermissionPolicy::AnyMedia => media.is_empty() || denied_media.len() < media.len(),
            MediaPermissionPolicy::AllMedia => denied_media.is_empty(),
        };

        let mut missing = if media_ok { Vec::new() } else { denied_media };
        let needs_camera = self.api_level.is_some() && self.require_camera;
        if needs_camera && !grants.is_granted(Permission::Camera) {
            missing.push(Permission::Camera);
        }

        if missing.is_empty() {
            PermissionDecision::Granted
        } else {
            PermissionDecision::Denied { missing }
        }
    }
}
