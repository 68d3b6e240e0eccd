//! Google Maps Distance Matrix and Places Nearby Search client.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{
    DistanceLookup, DistanceRequest, PlaceSummary, PlacesLookup, PlacesRequest, RouteSummary,
};
use crate::config::GoogleConfig;
use crate::error::ProviderError;
use crate::models::Coordinate;

// Relative to the base URL so that a path prefix (e.g. a proxy) is kept
const DISTANCE_MATRIX_PATH: &str = "maps/api/distancematrix/json";
const NEARBY_SEARCH_PATH: &str = "maps/api/place/nearbysearch/json";

/// Parse the configured base URL, adding the trailing `/` that `Url::join`
/// needs to keep the last path segment.
fn parse_base_url(base_url: &str) -> Result<Url, ProviderError> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{}/", base_url))?)
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<DistanceMatrixRow>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixRow {
    #[serde(default)]
    elements: Vec<DistanceMatrixElement>,
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixElement {
    status: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    name: String,
    vicinity: Option<String>,
    geometry: Option<NearbyGeometry>,
}

#[derive(Debug, Deserialize)]
struct NearbyGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// HTTP client for the Google Maps web services.
pub struct GoogleMapsClient {
    client: Client,
    base_url: Url,
    distance_key: String,
    places_key: String,
}

impl GoogleMapsClient {
    /// Build a client from the `[google]` config section.
    pub fn new(config: &GoogleConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("manzanita/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            distance_key: config.distance_key.clone(),
            places_key: config.places_key.clone(),
        })
    }

    /// Resolve an API path against the base URL and attach the query.
    fn endpoint(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url, ProviderError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn fetch_distance(&self, request: &DistanceRequest) -> Result<RouteSummary, ProviderError> {
        let url = self.endpoint(
            DISTANCE_MATRIX_PATH,
            &distance_params(request, &self.distance_key),
        )?;
        debug!(
            "Distance Matrix request from {} to {} destination(s)",
            request.origin,
            request.destinations.len()
        );
        let body: DistanceMatrixResponse = self.get_json(url).await?;
        parse_distance_matrix(body)
    }

    async fn fetch_nearby(&self, request: &PlacesRequest) -> Result<Vec<PlaceSummary>, ProviderError> {
        let url = self.endpoint(NEARBY_SEARCH_PATH, &places_params(request, &self.places_key))?;
        debug!("Nearby Search request at {}", request.location);
        let body: NearbySearchResponse = self.get_json(url).await?;
        parse_nearby_search(body)
    }
}

impl DistanceLookup for GoogleMapsClient {
    fn distance<'a>(
        &'a self,
        request: &'a DistanceRequest,
    ) -> BoxFuture<'a, Result<RouteSummary, ProviderError>> {
        self.fetch_distance(request).boxed()
    }
}

impl PlacesLookup for GoogleMapsClient {
    fn nearby<'a>(
        &'a self,
        request: &'a PlacesRequest,
    ) -> BoxFuture<'a, Result<Vec<PlaceSummary>, ProviderError>> {
        self.fetch_nearby(request).boxed()
    }
}

fn join_params<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join("|")
}

fn distance_params(request: &DistanceRequest, key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("origins", request.origin.to_string()),
        (
            "destinations",
            request
                .destinations
                .iter()
                .map(Coordinate::to_string)
                .collect::<Vec<_>>()
                .join("|"),
        ),
        ("mode", request.mode.as_param().to_string()),
    ];

    if let Some(language) = &request.language {
        params.push(("language", language.clone()));
    }
    if !request.avoid.is_empty() {
        params.push(("avoid", join_params(request.avoid.iter().map(|a| a.as_param()))));
    }
    if let Some(units) = request.units {
        params.push(("units", units.as_param().to_string()));
    }
    if let Some(t) = request.departure_time {
        params.push(("departure_time", t.as_param()));
    }
    if let Some(t) = request.arrival_time {
        params.push(("arrival_time", t.as_param()));
    }
    if !request.transit_mode.is_empty() {
        params.push((
            "transit_mode",
            join_params(request.transit_mode.iter().map(|m| m.as_param())),
        ));
    }
    if let Some(pref) = request.transit_routing_preference {
        params.push(("transit_routing_preference", pref.as_param().to_string()));
    }
    if let Some(model) = request.traffic_model {
        params.push(("traffic_model", model.as_param().to_string()));
    }

    params.push(("key", key.to_string()));
    params
}

fn places_params(request: &PlacesRequest, key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("location", request.location.to_string())];

    if let Some(radius) = request.radius {
        params.push(("radius", radius.to_string()));
    }
    if let Some(keyword) = &request.keyword {
        params.push(("keyword", keyword.clone()));
    }
    if let Some(language) = &request.language {
        params.push(("language", language.clone()));
    }
    if let Some(price) = request.min_price {
        params.push(("minprice", price.to_string()));
    }
    if let Some(price) = request.max_price {
        params.push(("maxprice", price.to_string()));
    }
    if let Some(name) = &request.name {
        params.push(("name", name.clone()));
    }
    if request.open_now {
        params.push(("opennow", "true".to_string()));
    }
    if let Some(rank_by) = request.rank_by {
        params.push(("rankby", rank_by.as_param().to_string()));
    }
    if let Some(place_type) = &request.place_type {
        params.push(("type", place_type.clone()));
    }
    if let Some(token) = &request.page_token {
        params.push(("pagetoken", token.clone()));
    }

    params.push(("key", key.to_string()));
    params
}

fn parse_distance_matrix(body: DistanceMatrixResponse) -> Result<RouteSummary, ProviderError> {
    if body.status != "OK" {
        return Err(ProviderError::Api {
            status: body.status,
            message: body.error_message,
        });
    }

    let element = body
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| ProviderError::Malformed("distance matrix has no elements".into()))?;

    match element.status.as_str() {
        "OK" => match (element.distance, element.duration) {
            (Some(distance), Some(duration)) => Ok(RouteSummary::Route {
                distance: distance.text,
                duration: duration.text,
            }),
            _ => Err(ProviderError::Malformed(
                "element is missing distance or duration".into(),
            )),
        },
        "ZERO_RESULTS" => Ok(RouteSummary::NoRoute),
        _ => Err(ProviderError::Api {
            status: element.status,
            message: None,
        }),
    }
}

fn parse_nearby_search(body: NearbySearchResponse) -> Result<Vec<PlaceSummary>, ProviderError> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        _ => {
            return Err(ProviderError::Api {
                status: body.status,
                message: body.error_message,
            })
        }
    }

    Ok(body
        .results
        .into_iter()
        .map(|r| PlaceSummary {
            place_id: r.place_id,
            name: r.name,
            vicinity: r.vicinity,
            location: r
                .geometry
                .and_then(|g| Coordinate::new(g.location.lat, g.location.lng).ok()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Avoid, RankBy, TransitMode, TravelMode, TravelTime};

    fn request() -> DistanceRequest {
        DistanceRequest {
            origin: Coordinate::new(37.765, -122.4197).unwrap(),
            destinations: vec![Coordinate::new(37.789, -122.401).unwrap()],
            mode: TravelMode::Transit,
            language: Some("en".into()),
            avoid: vec![Avoid::Tolls, Avoid::Ferries],
            units: None,
            departure_time: Some(TravelTime::Now),
            arrival_time: None,
            transit_mode: vec![TransitMode::Subway, TransitMode::Bus],
            transit_routing_preference: None,
            traffic_model: None,
        }
    }

    fn lookup<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_distance_params() {
        let params = distance_params(&request(), "secret");
        assert_eq!(lookup(&params, "origins"), Some("37.765,-122.4197"));
        assert_eq!(lookup(&params, "destinations"), Some("37.789,-122.401"));
        assert_eq!(lookup(&params, "mode"), Some("transit"));
        assert_eq!(lookup(&params, "avoid"), Some("tolls|ferries"));
        assert_eq!(lookup(&params, "transit_mode"), Some("subway|bus"));
        assert_eq!(lookup(&params, "departure_time"), Some("now"));
        assert_eq!(lookup(&params, "units"), None);
        assert_eq!(lookup(&params, "key"), Some("secret"));
    }

    #[test]
    fn test_places_params() {
        let request = PlacesRequest {
            location: Coordinate::new(37.765, -122.4197).unwrap(),
            radius: None,
            keyword: Some("cafe".into()),
            language: None,
            min_price: Some(0),
            max_price: Some(2),
            name: None,
            open_now: true,
            rank_by: Some(RankBy::Distance),
            place_type: Some("cafe".into()),
            page_token: None,
        };
        let params = places_params(&request, "secret");
        assert_eq!(lookup(&params, "location"), Some("37.765,-122.4197"));
        assert_eq!(lookup(&params, "radius"), None);
        assert_eq!(lookup(&params, "minprice"), Some("0"));
        assert_eq!(lookup(&params, "maxprice"), Some("2"));
        assert_eq!(lookup(&params, "opennow"), Some("true"));
        assert_eq!(lookup(&params, "rankby"), Some("distance"));
        assert_eq!(lookup(&params, "type"), Some("cafe"));
        assert_eq!(lookup(&params, "pagetoken"), None);
    }

    fn client_at(base_url: &str) -> GoogleMapsClient {
        GoogleMapsClient {
            client: Client::new(),
            base_url: parse_base_url(base_url).unwrap(),
            distance_key: "d".into(),
            places_key: "p".into(),
        }
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let client = client_at("http://localhost:8080");
        let url = client
            .endpoint(DISTANCE_MATRIX_PATH, &distance_params(&request(), "d"))
            .unwrap();
        assert_eq!(url.path(), "/maps/api/distancematrix/json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("avoid".to_string(), "tolls|ferries".to_string())));
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        for base in ["http://proxy.local/google/", "http://proxy.local/google"] {
            let client = client_at(base);
            let url = client.endpoint(DISTANCE_MATRIX_PATH, &[]).unwrap();
            assert_eq!(url.host_str(), Some("proxy.local"));
            assert_eq!(url.path(), "/google/maps/api/distancematrix/json");
            let url = client.endpoint(NEARBY_SEARCH_PATH, &[]).unwrap();
            assert_eq!(url.path(), "/google/maps/api/place/nearbysearch/json");
        }
    }

    #[test]
    fn test_parse_route() {
        let body: DistanceMatrixResponse = serde_json::from_str(
            r#"{
                "destination_addresses": ["Market St, San Francisco"],
                "origin_addresses": ["Mission St, San Francisco"],
                "rows": [{"elements": [{
                    "distance": {"text": "3.4 km", "value": 3412},
                    "duration": {"text": "14 mins", "value": 840},
                    "status": "OK"
                }]}],
                "status": "OK"
            }"#,
        )
        .unwrap();
        assert_eq!(
            parse_distance_matrix(body).unwrap(),
            RouteSummary::Route {
                distance: "3.4 km".into(),
                duration: "14 mins".into()
            }
        );
    }

    #[test]
    fn test_parse_zero_results() {
        let body: DistanceMatrixResponse = serde_json::from_str(
            r#"{"rows": [{"elements": [{"status": "ZERO_RESULTS"}]}], "status": "OK"}"#,
        )
        .unwrap();
        assert_eq!(parse_distance_matrix(body).unwrap(), RouteSummary::NoRoute);
    }

    #[test]
    fn test_parse_request_denied() {
        let body: DistanceMatrixResponse = serde_json::from_str(
            r#"{"error_message": "The provided API key is invalid.", "rows": [], "status": "REQUEST_DENIED"}"#,
        )
        .unwrap();
        let err = parse_distance_matrix(body).unwrap_err();
        assert!(matches!(err, ProviderError::Api { ref status, .. } if status == "REQUEST_DENIED"));
        assert!(err.to_string().contains("API key is invalid"));
    }

    #[test]
    fn test_parse_missing_elements() {
        let body: DistanceMatrixResponse =
            serde_json::from_str(r#"{"rows": [{"elements": []}], "status": "OK"}"#).unwrap();
        assert!(matches!(
            parse_distance_matrix(body),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_nearby() {
        let body: NearbySearchResponse = serde_json::from_str(
            r#"{
                "html_attributions": [],
                "results": [{
                    "place_id": "abc",
                    "name": "Ritual Coffee",
                    "vicinity": "1026 Valencia St",
                    "geometry": {"location": {"lat": 37.7565, "lng": -122.4213}}
                }],
                "status": "OK"
            }"#,
        )
        .unwrap();
        let places = parse_nearby_search(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Ritual Coffee");
        assert!(places[0].location.is_some());

        let empty: NearbySearchResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(parse_nearby_search(empty).unwrap().is_empty());

        let denied: NearbySearchResponse =
            serde_json::from_str(r#"{"results": [], "status": "OVER_QUERY_LIMIT"}"#).unwrap();
        assert!(parse_nearby_search(denied).is_err());
    }
}
