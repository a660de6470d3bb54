//! Recorded GPS tracks.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use geotag_geocode::OfflineGeocoder;
use geotag_location::{Coordinate, LocationError, LocationEvent, LocationSample};

/// A track file: an address table plus what the receiver reported, in
/// order.
#[derive(Debug, Deserialize)]
pub struct Track {
    /// Addresses the replay geocoder knows.
    #[serde(default)]
    pub geocoder: OfflineGeocoder,
    /// Receiver output.
    pub steps: Vec<Step>,
}

/// One receiver report, `at_ms` after the session started.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// A reading.
    Sample {
        at_ms: u64,
        latitude: f64,
        longitude: f64,
        accuracy: f64,
        /// How old the reading already is when delivered.
        #[serde(default)]
        age_ms: u64,
    },
    /// A failure: `unknown`, `denied`, `disabled` or free text.
    Error { at_ms: u64, error: String },
}

impl Step {
    pub const fn at_ms(&self) -> u64 {
        match self {
            Self::Sample { at_ms, .. } | Self::Error { at_ms, .. } => *at_ms,
        }
    }

    /// The event the receiver emits, stamped against `now_ms`.
    pub fn event(&self, now_ms: u64) -> LocationEvent {
        match self {
            Self::Sample {
                latitude,
                longitude,
                accuracy,
                age_ms,
                ..
            } => LocationEvent::Sample(LocationSample::new(
                Coordinate::new(*latitude, *longitude),
                *accuracy,
                now_ms.saturating_sub(*age_ms),
            )),
            Self::Error { error, .. } => LocationEvent::Error(match error.as_str() {
                "unknown" => LocationError::LocationUnknown,
                "denied" => LocationError::PermissionDenied,
                "disabled" => LocationError::ServiceDisabled,
                other => LocationError::Unknown(other.to_owned()),
            }),
        }
    }
}

impl Track {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read track {}", path.display()))?;
        let mut track: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse track {}", path.display()))?;
        track.steps.sort_by_key(Step::at_ms);
        Ok(track)
    }

    /// Only the address table of a track file.
    pub fn load_places(path: &Path) -> Result<OfflineGeocoder> {
        #[derive(Deserialize)]
        struct Places {
            #[serde(default)]
            geocoder: OfflineGeocoder,
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let places: Places = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(places.geocoder)
    }
}
