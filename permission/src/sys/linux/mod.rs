//! Linux permission implementation.
//!
//! GeoClue2 decides location access itself (its agent may prompt the user when
//! a client starts), and camera or photo access is governed by file
//! permissions and desktop portals. There is no runtime prompt to drive here.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(_permission: Permission) -> PermissionStatus {
    PermissionStatus::Granted
}

pub(crate) async fn request(_permission: Permission) -> Result<PermissionStatus, PermissionError> {
    Ok(PermissionStatus::Granted)
}
