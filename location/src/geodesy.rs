use crate::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (haversine).
#[must_use]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (lat1.cos() * lat2.cos()).mul_add((dlon / 2.0).sin().powi(2), (dlat / 2.0).sin().powi(2));
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = Coordinate::new(48.858_37, 2.294_481);
        assert!(haversine_distance(&p, &p).abs() < f64::EPSILON);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = haversine_distance(&a, &b);
        // 2 * pi * R / 360
        assert!((d - 111_194.93).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_sub_meter_offsets() {
        let a = Coordinate::new(37.331_7, -122.030_2);
        // ~0.55 m north
        let b = Coordinate::new(37.331_705, -122.030_2);
        let d = haversine_distance(&a, &b);
        assert!(d > 0.5 && d < 0.6, "got {d}");
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinate::new(51.5, -0.12);
        let b = Coordinate::new(40.71, -74.0);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
    }
}
