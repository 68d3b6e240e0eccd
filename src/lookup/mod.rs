//! External distance and places lookups.
//!
//! The orchestrator only sees the [`DistanceLookup`] and [`PlacesLookup`]
//! traits; [`GoogleMapsClient`] is the HTTP implementation used in
//! production, tests plug in canned fakes.

mod google;

pub use google::GoogleMapsClient;

use futures::future::BoxFuture;

use crate::catalog::RegionCatalog;
use crate::config::{
    Avoid, RankBy, TrafficModel, TransitMode, TransitRoutingPreference, TravelMode, TravelTime,
    Units,
};
use crate::error::ProviderError;
use crate::models::Coordinate;

/// Distance/duration query from one origin to the configured destinations.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRequest {
    pub origin: Coordinate,
    pub destinations: Vec<Coordinate>,
    pub mode: TravelMode,
    pub language: Option<String>,
    pub avoid: Vec<Avoid>,
    pub units: Option<Units>,
    pub departure_time: Option<TravelTime>,
    pub arrival_time: Option<TravelTime>,
    pub transit_mode: Vec<TransitMode>,
    pub transit_routing_preference: Option<TransitRoutingPreference>,
    pub traffic_model: Option<TrafficModel>,
}

impl DistanceRequest {
    pub fn for_origin(origin: Coordinate, catalog: &RegionCatalog) -> Self {
        let travel = catalog.travel();
        Self {
            origin,
            destinations: vec![travel.destination],
            mode: travel.mode,
            language: travel.language.clone(),
            avoid: travel.avoid.clone(),
            units: travel.units,
            departure_time: travel.departure_time,
            arrival_time: travel.arrival_time,
            transit_mode: travel.transit_mode.clone(),
            transit_routing_preference: travel.transit_routing_preference,
            traffic_model: travel.traffic_model,
        }
    }
}

/// Result for the first origin/destination pair.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteSummary {
    Route { distance: String, duration: String },
    /// The provider answered but found no route
    NoRoute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacesRequest {
    pub location: Coordinate,
    pub radius: Option<u32>,
    pub keyword: Option<String>,
    pub language: Option<String>,
    pub min_price: Option<u8>,
    pub max_price: Option<u8>,
    pub name: Option<String>,
    pub open_now: bool,
    pub rank_by: Option<RankBy>,
    pub place_type: Option<String>,
    pub page_token: Option<String>,
}

impl PlacesRequest {
    pub fn for_location(location: Coordinate, catalog: &RegionCatalog) -> Self {
        let places = catalog.places();
        Self {
            location,
            radius: places.radius,
            keyword: places.keyword.clone(),
            language: places.language.clone(),
            min_price: places.min_price,
            max_price: places.max_price,
            name: places.name.clone(),
            open_now: places.open_now,
            rank_by: places.rank_by,
            place_type: places.place_type.clone(),
            page_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    pub vicinity: Option<String>,
    pub location: Option<Coordinate>,
}

pub trait DistanceLookup: Send + Sync {
    fn distance<'a>(
        &'a self,
        request: &'a DistanceRequest,
    ) -> BoxFuture<'a, Result<RouteSummary, ProviderError>>;
}

pub trait PlacesLookup: Send + Sync {
    fn nearby<'a>(
        &'a self,
        request: &'a PlacesRequest,
    ) -> BoxFuture<'a, Result<Vec<PlaceSummary>, ProviderError>>;
}
