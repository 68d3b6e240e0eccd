//! Coordinate and bounding box value types.

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

/// Geographic point in degrees, (de)serialized as `[lat, lon]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = CoordinateError;

    fn try_from([lat, lon]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(lat, lon)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lat, c.lon]
    }
}

impl From<Coordinate> for geo::Coord<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// Rectangular neighborhood region.
///
/// Corners follow the listing-source convention: `southwest` holds the
/// lower latitude and the *greater* longitude, `northeast` the higher
/// latitude and the *lesser* longitude. Boxes crossing the antimeridian
/// cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub southwest: Coordinate,
    pub northeast: Coordinate,
}

impl BoundingBox {
    pub fn new(southwest: Coordinate, northeast: Coordinate) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    /// Whether the corners are ordered the way `geomath::in_box` expects.
    pub fn is_well_formed(&self) -> bool {
        self.southwest.lat < self.northeast.lat && self.northeast.lon < self.southwest.lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_deserialize_from_pair() {
        let c: Coordinate = serde_json::from_str("[37.7749, -122.4194]").unwrap();
        assert_eq!(c.lat(), 37.7749);
        assert_eq!(c.lon(), -122.4194);

        let bad: Result<Coordinate, _> = serde_json::from_str("[137.0, 0.0]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_box_orientation() {
        let good = BoundingBox::new(
            Coordinate::new(37.76, -122.38).unwrap(),
            Coordinate::new(37.80, -122.43).unwrap(),
        );
        assert!(good.is_well_formed());

        let flipped = BoundingBox::new(
            Coordinate::new(37.76, -122.43).unwrap(),
            Coordinate::new(37.80, -122.38).unwrap(),
        );
        assert!(!flipped.is_well_formed());
    }
}
