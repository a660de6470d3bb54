//! Platform-specific permission implementations.

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub(crate) use linux::{check, request};

// Mobile and desktop vendor prompts are driven by the host application; until
// it reports a decision the status stays undetermined.
#[cfg(not(target_os = "linux"))]
pub(crate) async fn check(_permission: crate::Permission) -> crate::PermissionStatus {
    crate::PermissionStatus::NotDetermined
}

#[cfg(not(target_os = "linux"))]
pub(crate) async fn request(
    _permission: crate::Permission,
) -> Result<crate::PermissionStatus, crate::PermissionError> {
    Err(crate::PermissionError::NotSupported)
}
