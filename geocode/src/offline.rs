use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Coordinate, GeocodeError, GeocodeReply, GeocodeResult, GeocodingService, Placemark};

/// A known address and where it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflineEntry {
    /// Reference point of the address.
    pub coordinate: Coordinate,
    /// The address.
    pub placemark: Placemark,
}

/// Geocoder over a fixed table of addresses.
///
/// Answers with the nearest entry within `max_distance_m`, or
/// [`GeocodeError::NotFound`]. Replies synchronously on the caller's thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfflineGeocoder {
    #[serde(default)]
    entries: Vec<OfflineEntry>,
    #[serde(default = "default_max_distance")]
    max_distance_m: f64,
}

const fn default_max_distance() -> f64 {
    OfflineGeocoder::DEFAULT_MAX_DISTANCE_M
}

impl Default for OfflineGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OfflineGeocoder {
    /// Default search radius in meters.
    pub const DEFAULT_MAX_DISTANCE_M: f64 = 250.0;

    /// Create an empty table with the default search radius.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_distance_m: Self::DEFAULT_MAX_DISTANCE_M,
        }
    }

    /// Add an address.
    #[must_use]
    pub fn with_entry(mut self, coordinate: Coordinate, placemark: Placemark) -> Self {
        self.entries.push(OfflineEntry {
            coordinate,
            placemark,
        });
        self
    }

    /// Set the search radius in meters.
    #[must_use]
    pub const fn max_distance(mut self, meters: f64) -> Self {
        self.max_distance_m = meters;
        self
    }

    /// Number of known addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `coordinate` against the table.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] if no entry is close enough.
    pub fn lookup(&self, coordinate: &Coordinate) -> Result<Placemark, GeocodeError> {
        self.entries
            .iter()
            .map(|entry| (entry.coordinate.distance_to(coordinate), entry))
            .filter(|(distance, _)| *distance <= self.max_distance_m)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(distance, entry)| {
                debug!("resolved {coordinate} to entry {distance:.1} m away");
                entry.placemark.clone()
            })
            .ok_or(GeocodeError::NotFound)
    }
}

impl GeocodingService for OfflineGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate, reply: GeocodeReply) {
        reply.send(GeocodeResult::from(self.lookup(&coordinate)));
    }
}
