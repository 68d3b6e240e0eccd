//! Neighborhood and transit station lookups for a single point.

use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Neighborhood, RegionCatalog, Station};
use crate::geomath::{distance_km, in_box};
use crate::models::Coordinate;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AreaMatch {
    pub found: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationMatch {
    /// A station lies within the acceptance radius
    pub found: bool,
    /// Nearest station within the radius, empty when `found` is false
    pub name: String,
    /// Distance to the nearest station overall, in range or not
    pub distance_km: Option<f64>,
}

/// Find the neighborhood box containing `point`.
///
/// Every box is tested in catalog order and a later match replaces an
/// earlier one, so with overlapping boxes the last one listed wins.
pub fn resolve_area(point: Option<Coordinate>, neighborhoods: &[Neighborhood]) -> AreaMatch {
    let mut result = AreaMatch::default();
    let Some(point) = point else {
        return result;
    };

    for hood in neighborhoods {
        if in_box(point, &hood.bbox) {
            result.found = true;
            result.name = hood.name.clone();
        }
    }
    result
}

/// Scan all stations for the nearest one.
///
/// The reported distance always tracks the global minimum. The name is only
/// taken from a new minimum that is also strictly closer than `max_km`.
pub fn resolve_nearest_station(point: Coordinate, stations: &[Station], max_km: f64) -> StationMatch {
    let mut result = StationMatch::default();
    let mut min_dist: Option<f64> = None;

    for station in stations {
        let dist = distance_km(station.location, point);
        let is_new_min = min_dist.map_or(true, |m| dist < m);
        if !is_new_min {
            continue;
        }
        if dist < max_km {
            result.found = true;
            result.name = station.name.clone();
        }
        min_dist = Some(dist);
        result.distance_km = Some(dist);
    }
    result
}

/// First catalog name contained in the lower-cased `text`, or empty.
pub fn resolve_area_by_text(text: &str, names: &[String]) -> String {
    let text = text.to_lowercase();
    names
        .iter()
        .find(|name| text.contains(name.as_str()))
        .cloned()
        .unwrap_or_default()
}

/// Catalog-bound resolver shared by the orchestrator.
#[derive(Clone)]
pub struct ProximityResolver {
    catalog: Arc<RegionCatalog>,
}

impl ProximityResolver {
    /// Create a resolver over a shared catalog.
    pub fn new(catalog: Arc<RegionCatalog>) -> Self {
        Self { catalog }
    }

    /// Neighborhood box containing the point, last match wins.
    pub fn area(&self, point: Option<Coordinate>) -> AreaMatch {
        let area = resolve_area(point, self.catalog.neighborhoods());
        debug!("Area lookup at {:?}: {:?}", point, area);
        area
    }

    /// Closest station, named only when under the transit threshold.
    pub fn nearest_station(&self, point: Coordinate) -> StationMatch {
        let station = resolve_nearest_station(
            point,
            self.catalog.stations(),
            self.catalog.max_transit_km(),
        );
        debug!("Station lookup at {}: {:?}", point, station);
        station
    }

    /// First catalog name found in the listing text.
    pub fn area_by_text(&self, text: &str) -> String {
        resolve_area_by_text(text, self.catalog.text_neighborhoods())
    }

    /// The catalog this resolver reads from.
    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }
}
