//! Error types shared across the library.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// Configuration that cannot be turned into a usable catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("neighborhood '{0}' has inverted or antimeridian-crossing corners")]
    MalformedBox(String),
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },
    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },
    #[error("max transit distance must be a positive number of kilometers, got {0}")]
    MaxDistance(f64),
    #[error("invalid travel parameters: {0}")]
    Travel(String),
    #[error("invalid places parameters: {0}")]
    Places(String),
}

/// Failure of an external lookup call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("provider rejected request: {status}{}", detail(.message))]
    Api {
        status: String,
        message: Option<String>,
    },
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({})", m))
        .unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("distance lookup failed: {0}")]
    Distance(#[source] ProviderError),
    #[error("places lookup failed: {0}")]
    Places(#[source] ProviderError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook rejected message: {0}")]
    Rejected(String),
}
