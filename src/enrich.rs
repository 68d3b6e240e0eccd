//! Listing enrichment: combines the local resolvers with the two external
//! lookups into one [`Annotation`].

use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::RegionCatalog;
use crate::error::EnrichError;
use crate::lookup::{DistanceLookup, DistanceRequest, PlacesLookup, PlacesRequest, RouteSummary};
use crate::models::{Annotation, Coordinate, Listing, NO_LOCATION, NO_ROUTE};
use crate::resolver::ProximityResolver;

/// Annotates listings using the catalog and the distance and places lookups.
pub struct Enricher {
    resolver: ProximityResolver,
    distance: Arc<dyn DistanceLookup>,
    places: Arc<dyn PlacesLookup>,
}

impl Enricher {
    /// Create an enricher over a catalog and two providers.
    pub fn new(
        catalog: Arc<RegionCatalog>,
        distance: Arc<dyn DistanceLookup>,
        places: Arc<dyn PlacesLookup>,
    ) -> Self {
        Self {
            resolver: ProximityResolver::new(catalog),
            distance,
            places,
        }
    }

    /// The catalog behind the resolver.
    pub fn catalog(&self) -> &RegionCatalog {
        self.resolver.catalog()
    }

    /// Annotate a listing from its geotag and location text.
    pub async fn annotate(&self, listing: &Listing) -> Result<Annotation, EnrichError> {
        self.annotate_point(listing.geotag, &listing.location).await
    }

    /// Annotate a geotag (if any) plus the free-text location.
    ///
    /// Without a geotag no provider is called and no station is resolved.
    /// A provider that answers without a route yields [`NO_ROUTE`]; a provider
    /// that fails outright fails the whole annotation.
    pub async fn annotate_point(
        &self,
        geotag: Option<Coordinate>,
        location: &str,
    ) -> Result<Annotation, EnrichError> {
        let mut annotation = Annotation::default();

        match geotag {
            Some(point) => {
                let area = self.resolver.area(Some(point));
                annotation.area_found = area.found;
                annotation.area = area.name;

                let catalog = self.resolver.catalog();
                let distance_request = DistanceRequest::for_origin(point, catalog);
                let places_request = PlacesRequest::for_location(point, catalog);

                // Both calls run to completion before either result is looked at
                let (route, places) = tokio::join!(
                    self.distance.distance(&distance_request),
                    self.places.nearby(&places_request)
                );

                annotation.distance_matrix_result = match route.map_err(EnrichError::Distance)? {
                    RouteSummary::Route { distance, duration } => {
                        format!("{} in {}", distance, duration)
                    }
                    RouteSummary::NoRoute => {
                        warn!("No route from {} to destination", point);
                        NO_ROUTE.to_string()
                    }
                };

                // Not part of the annotation yet
                let places = places.map_err(EnrichError::Places)?;
                debug!("Nearby search found {} places around {}", places.len(), point);

                let station = self.resolver.nearest_station(point);
                annotation.near_bart = station.found;
                annotation.bart = station.name;
                annotation.bart_dist = station.distance_km;
            }
            None => {
                annotation.distance_matrix_result = NO_LOCATION.to_string();
            }
        }

        if !annotation.area_found && !location.is_empty() {
            annotation.area = self.resolver.area_by_text(location);
        }

        Ok(annotation)
    }
}
