//! Image acquisition module
//!
//! Contracts for the host-side collaborators (image source, permission gate,
//! presenter) and a headless session that wires them to the bridge.

mod permissions;
mod presenter;
mod session;
mod source;

pub use permissions::{
    MediaPermissionPolicy, Permission, PermissionDecision, PermissionGate, PermissionGrants,
    PermissionRequirements, PermissionStatus, SCOPED_MEDIA_API_LEVEL,
};
pub use presenter::Presenter;
pub use session::{PickerSession, SelectionOutcome};
pub use source::{AcquisitionKind, AcquisitionOutcome, FsImageSource, ImageSource};
