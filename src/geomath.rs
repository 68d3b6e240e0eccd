//! Great-circle distance and bounding box containment.

use geo::{Coord, Distance, HaversineMeasure, Point};

use crate::models::{BoundingBox, Coordinate};

/// Earth radius used for all station distances, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6367.0;

/// Haversine distance between two coordinates in kilometers.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let haversine = HaversineMeasure::new(EARTH_RADIUS_KM * 1000.0);
    haversine.distance(Point::from(Coord::from(a)), Point::from(Coord::from(b))) / 1000.0
}

/// Strict containment test. Points on an edge are outside.
///
/// Uses the corner convention of [`BoundingBox`]: latitude must fall between
/// `southwest` and `northeast`, longitude between `northeast` and `southwest`.
pub fn in_box(p: Coordinate, bbox: &BoundingBox) -> bool {
    bbox.southwest.lat() < p.lat()
        && p.lat() < bbox.northeast.lat()
        && bbox.northeast.lon() < p.lon()
        && p.lon() < bbox.southwest.lon()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        let pairs = [
            (c(37.7749, -122.4194), c(37.8044, -122.2712)),
            (c(89.9, 10.0), c(-45.0, -170.0)),
            (c(0.0, 179.9), c(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_relative_eq!(distance_km(a, b), distance_km(b, a), epsilon = 1e-9);
            assert_eq!(distance_km(a, a), 0.0);
        }
    }

    #[test]
    fn test_one_degree_at_equator() {
        let d = distance_km(c(0.0, 0.0), c(0.0, 1.0));
        assert_relative_eq!(d, 111.125, epsilon = 0.01);
        // Radius 6367 km, so one degree is 6367 * pi / 180
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI / 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_antimeridian_and_poles() {
        // 0.2 degrees of longitude across the antimeridian
        let d = distance_km(c(0.0, 179.9), c(0.0, -179.9));
        assert_relative_eq!(d, 22.225, epsilon = 0.01);

        // Two points at the pole are the same place whatever the longitude
        let d = distance_km(c(90.0, 0.0), c(90.0, 120.0));
        assert!(d < 1e-6);

        let d = distance_km(c(90.0, 0.0), c(-90.0, 0.0));
        assert_relative_eq!(d, EARTH_RADIUS_KM * std::f64::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn test_antipodes_are_half_circumference() {
        let half = EARTH_RADIUS_KM * std::f64::consts::PI;
        let pairs = [
            (c(0.0, 0.0), c(0.0, 180.0)),
            (c(37.7749, -122.4194), c(-37.7749, 57.5806)),
            (c(45.0, 90.0), c(-45.0, -90.0)),
        ];
        for (a, b) in pairs {
            let d = distance_km(a, b);
            assert!(d.is_finite());
            assert_relative_eq!(d, half, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_in_box_interior_and_exterior() {
        let soma = BoundingBox::new(c(37.76, -122.38), c(37.80, -122.43));
        assert!(in_box(c(37.78, -122.40), &soma));
        assert!(!in_box(c(37.75, -122.40), &soma));
        assert!(!in_box(c(37.78, -122.44), &soma));
    }

    #[test]
    fn test_in_box_is_strict() {
        let soma = BoundingBox::new(c(37.76, -122.38), c(37.80, -122.43));
        assert!(!in_box(soma.southwest, &soma));
        assert!(!in_box(soma.northeast, &soma));
        assert!(!in_box(c(37.76, -122.40), &soma));
        assert!(!in_box(c(37.78, -122.38), &soma));
    }

    #[test]
    fn test_in_box_with_swapped_longitudes_never_matches() {
        let swapped = BoundingBox::new(c(37.76, -122.43), c(37.80, -122.38));
        assert!(!in_box(c(37.78, -122.40), &swapped));
    }
}
