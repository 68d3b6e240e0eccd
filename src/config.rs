//! TOML configuration surface, loaded once at startup.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::Coordinate;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub text_neighborhoods: Vec<String>,
    pub google: GoogleConfig,
    pub travel: TravelConfig,
    pub places: PlacesConfig,
    pub transit: TransitConfig,
    #[serde(default)]
    pub neighborhoods: Vec<NeighborhoodConfig>,
    #[serde(default)]
    pub stations: Vec<StationConfig>,
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleConfig {
    pub distance_key: String,
    pub places_key: String,
    pub maps_key: String,
    /// API root. A path prefix is kept; a missing trailing `/` is added.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_GOOGLE_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Distance Matrix query parameters.
#[derive(Debug, Deserialize, Clone)]
pub struct TravelConfig {
    pub destination: Coordinate,
    #[serde(default)]
    pub mode: TravelMode,
    pub language: Option<String>,
    #[serde(default)]
    pub avoid: Vec<Avoid>,
    pub units: Option<Units>,
    pub departure_time: Option<TravelTime>,
    pub arrival_time: Option<TravelTime>,
    #[serde(default)]
    pub transit_mode: Vec<TransitMode>,
    pub transit_routing_preference: Option<TransitRoutingPreference>,
    pub traffic_model: Option<TrafficModel>,
}

/// Places Nearby Search query parameters.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlacesConfig {
    /// Search radius in meters
    pub radius: Option<u32>,
    pub keyword: Option<String>,
    pub language: Option<String>,
    pub min_price: Option<u8>,
    pub max_price: Option<u8>,
    pub name: Option<String>,
    #[serde(default)]
    pub open_now: bool,
    pub rank_by: Option<RankBy>,
    #[serde(rename = "type")]
    pub place_type: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransitConfig {
    pub max_distance_km: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NeighborhoodConfig {
    pub name: String,
    pub southwest: Coordinate,
    pub northeast: Coordinate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StationConfig {
    pub name: String,
    pub location: Coordinate,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: Option<String>,
    #[serde(default = "default_slack_username")]
    pub username: String,
    #[serde(default = "default_slack_icon")]
    pub icon_emoji: String,
}

impl SlackConfig {
    /// Webhook with the default bot name and icon.
    pub fn with_webhook(webhook_url: String) -> Self {
        Self {
            webhook_url,
            channel: None,
            username: default_slack_username(),
            icon_emoji: default_slack_icon(),
        }
    }
}

fn default_slack_username() -> String {
    "pybot".to_string()
}

fn default_slack_icon() -> String {
    ":robot_face:".to_string()
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Avoid {
    Tolls,
    Highways,
    Ferries,
    Indoor,
}

impl Avoid {
    pub fn as_param(&self) -> &'static str {
        match self {
            Avoid::Tolls => "tolls",
            Avoid::Highways => "highways",
            Avoid::Ferries => "ferries",
            Avoid::Indoor => "indoor",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    pub fn as_param(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Bus,
    Subway,
    Train,
    Tram,
    Rail,
}

impl TransitMode {
    pub fn as_param(&self) -> &'static str {
        match self {
            TransitMode::Bus => "bus",
            TransitMode::Subway => "subway",
            TransitMode::Train => "train",
            TransitMode::Tram => "tram",
            TransitMode::Rail => "rail",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitRoutingPreference {
    LessWalking,
    FewerTransfers,
}

impl TransitRoutingPreference {
    pub fn as_param(&self) -> &'static str {
        match self {
            TransitRoutingPreference::LessWalking => "less_walking",
            TransitRoutingPreference::FewerTransfers => "fewer_transfers",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrafficModel {
    BestGuess,
    Pessimistic,
    Optimistic,
}

impl TrafficModel {
    pub fn as_param(&self) -> &'static str {
        match self {
            TrafficModel::BestGuess => "best_guess",
            TrafficModel::Pessimistic => "pessimistic",
            TrafficModel::Optimistic => "optimistic",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RankBy {
    Prominence,
    Distance,
}

impl RankBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            RankBy::Prominence => "prominence",
            RankBy::Distance => "distance",
        }
    }
}

/// Departure or arrival time: `"now"` or an RFC 3339 timestamp.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum TravelTime {
    Now,
    At(DateTime<Utc>),
}

impl TravelTime {
    /// Query parameter value: `now` or seconds since the epoch.
    pub fn as_param(&self) -> String {
        match self {
            TravelTime::Now => "now".to_string(),
            TravelTime::At(t) => t.timestamp().to_string(),
        }
    }
}

impl TryFrom<String> for TravelTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("now") {
            return Ok(TravelTime::Now);
        }
        DateTime::parse_from_rfc3339(&value)
            .map(|t| TravelTime::At(t.with_timezone(&Utc)))
            .map_err(|e| format!("'{}' is neither \"now\" nor an RFC 3339 time: {}", value, e))
    }
}
