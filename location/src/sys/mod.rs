//! Platform-specific positioning sources.

use std::sync::Arc;

use crate::{LocationDelegate, LocationError, LocationResult, PermissionStatus, PositioningSource};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::GeoClueSource;

/// A source for platforms without a positioning backend.
///
/// Reports location services as disabled and refuses to start.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedSource;

impl PositioningSource for UnsupportedSource {
    fn authorization_status(&self) -> PermissionStatus {
        PermissionStatus::Restricted
    }

    fn request_authorization(&self) {}

    fn services_enabled(&self) -> bool {
        false
    }

    fn set_delegate(&self, _delegate: Arc<dyn LocationDelegate>) {}

    fn start_updates(&self) -> LocationResult<()> {
        Err(LocationError::NotAvailable)
    }

    fn stop_updates(&self) {}
}

/// The positioning source for the current platform.
#[cfg(target_os = "linux")]
#[must_use]
pub fn default_source() -> Arc<dyn PositioningSource> {
    Arc::new(GeoClueSource::new())
}

/// The positioning source for the current platform.
#[cfg(not(target_os = "linux"))]
#[must_use]
pub fn default_source() -> Arc<dyn PositioningSource> {
    Arc::new(UnsupportedSource)
}
