use geotag_geocode::GeocodeError;
use geotag_location::LocationError;

/// Why a session has no (complete) fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    /// Location access was denied or restricted.
    #[error("location permission denied")]
    PermissionDenied,
    /// Location services are switched off.
    #[error("location services disabled")]
    ServicesDisabled,
    /// No reading yet. Never stored as the session error.
    #[error("location currently unavailable")]
    PositioningUnavailable,
    /// The positioning source failed; the session stopped.
    #[error("positioning failed: {0}")]
    PositioningFailed(LocationError),
    /// No fix arrived before the deadline.
    #[error("no location fix before the deadline")]
    Timeout,
    /// The best fix could not be reverse geocoded. Positioning continues.
    #[error("reverse geocoding failed: {0}")]
    GeocodingFailed(#[from] GeocodeError),
}

impl AcquisitionError {
    /// Returns `true` if the user has to change a setting before retrying.
    #[must_use]
    pub const fn needs_settings_change(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::ServicesDisabled)
    }
}

impl From<LocationError> for AcquisitionError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::LocationUnknown => Self::PositioningUnavailable,
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::ServiceDisabled => Self::ServicesDisabled,
            other => Self::PositioningFailed(other),
        }
    }
}
