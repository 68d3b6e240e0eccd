//! Validated, read-only region catalog.
//!
//! Built once from [`Config`] and shared behind an `Arc`. Everything the
//! resolver and the orchestrator need is checked here so that a bad config
//! fails at startup instead of per listing.

use geo::{coord, Coord, Rect};
use hashbrown::HashSet;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, PlacesConfig, RankBy, TravelConfig, TravelMode};
use crate::error::CatalogError;
use crate::models::{BoundingBox, Coordinate};

/// Google rejects nearby searches with a larger radius.
pub const MAX_PLACES_RADIUS_M: u32 = 50_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    pub name: String,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub location: Coordinate,
}

/// Overall lat/lon extent of everything in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

#[derive(Debug, Clone)]
pub struct RegionCatalog {
    neighborhoods: Vec<Neighborhood>,
    stations: Vec<Station>,
    text_neighborhoods: Vec<String>,
    max_transit_km: f64,
    travel: TravelConfig,
    places: PlacesConfig,
}

impl RegionCatalog {
    /// Build and validate the catalog from a parsed config.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        let neighborhoods = config
            .neighborhoods
            .iter()
            .map(|n| Neighborhood {
                name: n.name.trim().to_string(),
                bbox: BoundingBox::new(n.southwest, n.northeast),
            })
            .collect();
        let stations = config
            .stations
            .iter()
            .map(|s| Station {
                name: s.name.trim().to_string(),
                location: s.location,
            })
            .collect();

        let catalog = Self::new(
            neighborhoods,
            stations,
            config.text_neighborhoods.clone(),
            config.transit.max_distance_km,
            config.travel.clone(),
            config.places.clone(),
        )?;

        info!(
            "Loaded region catalog: {} neighborhoods, {} stations, {} text names",
            catalog.neighborhoods.len(),
            catalog.stations.len(),
            catalog.text_neighborhoods.len()
        );

        Ok(catalog)
    }

    /// Validate the parts and assemble a catalog.
    pub fn new(
        neighborhoods: Vec<Neighborhood>,
        stations: Vec<Station>,
        text_neighborhoods: Vec<String>,
        max_transit_km: f64,
        travel: TravelConfig,
        places: PlacesConfig,
    ) -> Result<Self, CatalogError> {
        check_names(neighborhoods.iter().map(|n| n.name.as_str()), "neighborhood")?;
        check_names(stations.iter().map(|s| s.name.as_str()), "station")?;
        for n in &neighborhoods {
            if !n.bbox.is_well_formed() {
                return Err(CatalogError::MalformedBox(n.name.clone()));
            }
        }

        // Matching lower-cases the listing text, so names are stored lower-case
        let mut names = Vec::with_capacity(text_neighborhoods.len());
        for raw in text_neighborhoods {
            let name = raw.trim().to_lowercase();
            if name.is_empty() {
                return Err(CatalogError::EmptyName {
                    kind: "text neighborhood",
                });
            }
            names.push(name);
        }

        if !max_transit_km.is_finite() || max_transit_km <= 0.0 {
            return Err(CatalogError::MaxDistance(max_transit_km));
        }

        validate_travel(&travel)?;
        validate_places(&places)?;

        Ok(Self {
            neighborhoods,
            stations,
            text_neighborhoods: names,
            max_transit_km,
            travel,
            places,
        })
    }

    /// Neighborhood boxes in config order.
    pub fn neighborhoods(&self) -> &[Neighborhood] {
        &self.neighborhoods
    }

    /// Transit stations in config order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Lower-cased names for the free-text fallback.
    pub fn text_neighborhoods(&self) -> &[String] {
        &self.text_neighborhoods
    }

    /// Station distance threshold in kilometers.
    pub fn max_transit_km(&self) -> f64 {
        self.max_transit_km
    }

    /// Commute destination used for routing and maps.
    pub fn destination(&self) -> Coordinate {
        self.travel.destination
    }

    /// Distance Matrix parameters.
    pub fn travel(&self) -> &TravelConfig {
        &self.travel
    }

    /// Nearby Search parameters.
    pub fn places(&self) -> &PlacesConfig {
        &self.places
    }

    /// Bounding rectangle over all box corners, stations and the destination.
    pub fn extent(&self) -> Extent {
        let destination = Coord::from(self.travel.destination);
        let rect = self
            .neighborhoods
            .iter()
            .flat_map(|n| [n.bbox.southwest, n.bbox.northeast])
            .chain(self.stations.iter().map(|s| s.location))
            .map(Coord::from)
            .fold(Rect::new(destination, destination), |rect, c| {
                Rect::new(
                    coord! { x: rect.min().x.min(c.x), y: rect.min().y.min(c.y) },
                    coord! { x: rect.max().x.max(c.x), y: rect.max().y.max(c.y) },
                )
            });

        Extent {
            min_lat: rect.min().y,
            min_lon: rect.min().x,
            max_lat: rect.max().y,
            max_lon: rect.max().x,
        }
    }
}

fn check_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &'static str,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(CatalogError::EmptyName { kind });
        }
        if !seen.insert(name) {
            return Err(CatalogError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_travel(travel: &TravelConfig) -> Result<(), CatalogError> {
    if travel.departure_time.is_some() && travel.arrival_time.is_some() {
        return Err(CatalogError::Travel(
            "departure_time and arrival_time are mutually exclusive".into(),
        ));
    }
    if travel.traffic_model.is_some() {
        if travel.mode != TravelMode::Driving {
            return Err(CatalogError::Travel(
                "traffic_model only applies to driving".into(),
            ));
        }
        if travel.departure_time.is_none() {
            return Err(CatalogError::Travel(
                "traffic_model requires a departure_time".into(),
            ));
        }
    }
    let has_transit_options =
        !travel.transit_mode.is_empty() || travel.transit_routing_preference.is_some();
    if has_transit_options && travel.mode != TravelMode::Transit {
        return Err(CatalogError::Travel(
            "transit_mode and transit_routing_preference require mode = \"transit\"".into(),
        ));
    }
    Ok(())
}

fn validate_places(places: &PlacesConfig) -> Result<(), CatalogError> {
    for price in [places.min_price, places.max_price].into_iter().flatten() {
        if price > 4 {
            return Err(CatalogError::Places(format!(
                "price level {} is outside 0-4",
                price
            )));
        }
    }
    if let (Some(min), Some(max)) = (places.min_price, places.max_price) {
        if min > max {
            return Err(CatalogError::Places(format!(
                "min_price {} exceeds max_price {}",
                min, max
            )));
        }
    }

    if places.rank_by == Some(RankBy::Distance) {
        if places.radius.is_some() {
            return Err(CatalogError::Places(
                "radius cannot be combined with rank_by = \"distance\"".into(),
            ));
        }
        if places.keyword.is_none() && places.name.is_none() && places.place_type.is_none() {
            return Err(CatalogError::Places(
                "rank_by = \"distance\" requires keyword, name or type".into(),
            ));
        }
    } else {
        match places.radius {
            None => return Err(CatalogError::Places("radius is required".into())),
            Some(r) if r == 0 || r > MAX_PLACES_RADIUS_M => {
                return Err(CatalogError::Places(format!(
                    "radius {} must be between 1 and {} meters",
                    r, MAX_PLACES_RADIUS_M
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}
