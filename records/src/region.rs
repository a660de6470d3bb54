use geotag_location::Coordinate;

use crate::TaggedLocation;

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_194.93;

/// Visible map area: a centre and a span in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapRegion {
    /// Centre of the area.
    pub center: Coordinate,
    /// North-south extent in degrees.
    pub latitude_delta: f64,
    /// East-west extent in degrees.
    pub longitude_delta: f64,
}

impl MapRegion {
    /// A square of `meters` on each side centred on `center`.
    #[must_use]
    pub fn around(center: Coordinate, meters: f64) -> Self {
        let latitude_delta = meters / METERS_PER_DEGREE;
        let scale = center.latitude.to_radians().cos().abs().max(f64::EPSILON);
        Self {
            center,
            latitude_delta,
            longitude_delta: latitude_delta / scale,
        }
    }

    /// Whether `coordinate` lies inside the area.
    #[must_use]
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (coordinate.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (coordinate.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}

/// The area a map of `records` should show.
///
/// No records: 100 m around `user`. One record: 1 km around it. Otherwise
/// the bounding box of all records with 10% extra on each span.
#[must_use]
pub fn region_for(records: &[TaggedLocation], user: Coordinate) -> MapRegion {
    match records {
        [] => MapRegion::around(user, 100.0),
        [only] => MapRegion::around(only.coordinate, 1000.0),
        _ => {
            let (mut north, mut south) = (f64::MIN, f64::MAX);
            let (mut east, mut west) = (f64::MIN, f64::MAX);
            for record in records {
                let c = record.coordinate;
                north = north.max(c.latitude);
                south = south.min(c.latitude);
                east = east.max(c.longitude);
                west = west.min(c.longitude);
            }

            let extra_space = 1.1;
            MapRegion {
                center: Coordinate::new(
                    north - (north - south) / 2.0,
                    west + (east - west) / 2.0,
                ),
                latitude_delta: (north - south).abs() * extra_space,
                longitude_delta: (east - west).abs() * extra_space,
            }
        }
    }
}
