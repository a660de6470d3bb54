//! Permission gate for location and photo access.
//!
//! A tagging session needs location access before it can search for a fix,
//! and camera or photo library access before a picture can be attached to a
//! saved record. This crate answers the question "may we?" for each of those
//! and exposes the three-way authorization gate the acquisition flow uses.

#![warn(missing_docs)]

/// Platform-specific implementations.
pub mod sys;

/// Types of permissions that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Permission {
    /// Access to device location while the app is in use.
    Location,
    /// Access to the camera, for taking a photo of a tagged place.
    Camera,
    /// Access to the photo library, for picking an existing photo.
    Photos,
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission is restricted (e.g., parental controls on iOS).
    Restricted,
    /// Permission has not been requested yet.
    NotDetermined,
}

/// What a caller should do given a [`PermissionStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authorization {
    /// Access is granted, proceed.
    Proceed,
    /// Nobody has asked yet: request authorization and abort the current attempt.
    Request,
    /// Access was refused (denied or restricted): report it and abort.
    Refused,
}

impl PermissionStatus {
    /// Collapse the status into the three-way gate used before starting work.
    #[must_use]
    pub const fn authorization(self) -> Authorization {
        match self {
            Self::Granted => Authorization::Proceed,
            Self::NotDetermined => Authorization::Request,
            Self::Denied | Self::Restricted => Authorization::Refused,
        }
    }

    /// Returns `true` if the permission has been granted.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// The permission type is not supported on this platform.
    #[error("permission not supported on this platform")]
    NotSupported,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Check the current status of a permission without requesting it.
pub async fn check(permission: Permission) -> PermissionStatus {
    sys::check(permission).await
}

/// Request a permission from the user.
///
/// If the permission has already been granted or denied, this returns
/// the current status without showing a prompt.
///
/// # Errors
/// Returns a `PermissionError` if:
/// - The permission type is not supported on this platform.
/// - An underlying platform error occurs.
pub async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    sys::request(permission).await
}
