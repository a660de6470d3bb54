//! Location samples and positioning sources.
//!
//! This crate defines the raw readings a positioning subsystem delivers
//! ([`LocationSample`]), the events it emits while running ([`LocationEvent`]),
//! and the [`PositioningSource`] seam behind which each platform plugs its
//! location service. On Linux, [`sys::GeoClueSource`] talks to GeoClue2.

#![warn(missing_docs)]

mod geodesy;
/// Platform-specific implementations.
pub mod sys;

#[cfg(target_os = "linux")]
mod shutdown;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use geodesy::{EARTH_RADIUS_M, haversine_distance};
pub use geotag_permission::{Authorization, Permission, PermissionStatus};

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance(self, other)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.8}, {:.8}", self.latitude, self.longitude)
    }
}

/// One raw reading from a positioning subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Where the device was measured.
    pub coordinate: Coordinate,
    /// Horizontal accuracy radius in meters. Smaller is more precise;
    /// a negative value marks the reading as unusable.
    pub horizontal_accuracy: f64,
    /// When the reading was measured, as Unix epoch milliseconds.
    pub timestamp: u64,
}

impl LocationSample {
    /// Creates a sample from its parts.
    #[must_use]
    pub const fn new(coordinate: Coordinate, horizontal_accuracy: f64, timestamp: u64) -> Self {
        Self {
            coordinate,
            horizontal_accuracy,
            timestamp,
        }
    }

    /// Returns `false` for negative or NaN accuracy.
    #[must_use]
    pub fn has_valid_accuracy(&self) -> bool {
        self.horizontal_accuracy >= 0.0
    }

    /// Returns `true` if this sample is strictly more precise than `other`.
    #[must_use]
    pub fn is_more_accurate_than(&self, other: &Self) -> bool {
        self.horizontal_accuracy < other.horizontal_accuracy
    }

    /// Milliseconds between the measurement and `now_ms`; zero for readings
    /// stamped in the future.
    #[must_use]
    pub const fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }

    /// Distance between the two readings in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.coordinate.distance_to(&other.coordinate)
    }
}

/// Errors reported by a positioning source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// Location permission was not granted.
    #[error("location permission denied")]
    PermissionDenied,
    /// Location services are disabled on the device.
    #[error("location services disabled")]
    ServiceDisabled,
    /// No fix yet. Expected while the receiver warms up.
    #[error("location currently unknown")]
    LocationUnknown,
    /// Updates were started before a delegate was registered.
    #[error("no location delegate registered")]
    DelegateMissing,
    /// Location is not available on this platform.
    #[error("location not available")]
    NotAvailable,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl LocationError {
    /// Returns `true` for errors that only mean "no reading yet".
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::LocationUnknown)
    }
}

/// Convenience alias for results returned by positioning sources.
pub type LocationResult<T> = Result<T, LocationError>;

/// Events emitted by a running positioning source.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationEvent {
    /// A new reading.
    Sample(LocationSample),
    /// The source failed or has no reading yet.
    Error(LocationError),
}

/// Receiver of [`LocationEvent`]s.
///
/// Sources call this from whatever thread their platform delivers on;
/// implementations forward the event to the owner's sequential context.
pub trait LocationDelegate: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: LocationEvent);
}

/// A positioning subsystem that can be started and stopped.
pub trait PositioningSource: Send + Sync {
    /// Current authorization for location access.
    fn authorization_status(&self) -> PermissionStatus;

    /// Ask the user for location access. The answer arrives out of band;
    /// callers retry their operation afterwards.
    fn request_authorization(&self);

    /// Whether location services are switched on at all.
    fn services_enabled(&self) -> bool {
        true
    }

    /// Register the receiver of future events, replacing any previous one.
    fn set_delegate(&self, delegate: Arc<dyn LocationDelegate>);

    /// Begin emitting events to the delegate.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform service cannot be started.
    fn start_updates(&self) -> LocationResult<()>;

    /// Stop emitting events. Safe to call when not running.
    fn stop_updates(&self);
}

/// Current time as Unix epoch milliseconds.
#[must_use]
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_accuracy() {
        let coordinate = Coordinate::new(37.0, -122.0);
        assert!(!LocationSample::new(coordinate, -1.0, 0).has_valid_accuracy());
        assert!(!LocationSample::new(coordinate, f64::NAN, 0).has_valid_accuracy());
        assert!(LocationSample::new(coordinate, 0.0, 0).has_valid_accuracy());
    }

    #[test]
    fn test_more_accurate_is_strict() {
        let coordinate = Coordinate::new(37.0, -122.0);
        let a = LocationSample::new(coordinate, 10.0, 0);
        let b = LocationSample::new(coordinate, 10.0, 5);
        let c = LocationSample::new(coordinate, 9.5, 5);
        assert!(!b.is_more_accurate_than(&a));
        assert!(c.is_more_accurate_than(&a));
    }

    #[test]
    fn test_age_saturates_for_future_samples() {
        let sample = LocationSample::new(Coordinate::default(), 5.0, 10_000);
        assert_eq!(sample.age_ms(12_500), 2_500);
        assert_eq!(sample.age_ms(9_000), 0);
    }

    #[test]
    fn test_only_unknown_is_transient() {
        assert!(LocationError::LocationUnknown.is_transient());
        assert!(!LocationError::PermissionDenied.is_transient());
        assert!(!LocationError::Unknown("boom".into()).is_transient());
    }

    #[test]
    fn test_coordinate_display() {
        let coordinate = Coordinate::new(52.520_008, 13.404_954);
        assert_eq!(coordinate.to_string(), "52.52000800, 13.40495400");
    }
}
