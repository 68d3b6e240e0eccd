//! Annotation server for the listing ingestion pipeline.
//!
//! Exposes the enrichment pipeline over HTTP so that scrapers can annotate
//! a listing with one POST.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use manzanita::catalog::Extent;
use manzanita::config::Config;
use manzanita::lookup::GoogleMapsClient;
use manzanita::{AnnotatedListing, Enricher, Listing, RegionCatalog};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "serve")]
#[command(about = "Listing annotation server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Path to the TOML configuration
    #[arg(short, long, default_value = "manzanita.toml")]
    config: PathBuf,
}

/// Application state shared across handlers
struct AppState {
    enricher: Enricher,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Manzanita Annotation Server");
    info!("Loading configuration from {}", args.config.display());

    let config = Config::load_from_file(&args.config)?;
    let catalog = Arc::new(RegionCatalog::from_config(&config).context("Invalid region catalog")?);
    info!("Catalog extent: {:?}", catalog.extent());

    let google = Arc::new(
        GoogleMapsClient::new(&config.google).context("Failed to create Google Maps client")?,
    );
    let enricher = Enricher::new(catalog, google.clone(), google);

    let state = Arc::new(AppState { enricher });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/catalog", get(catalog_handler))
        .route("/v1/annotate", post(annotate_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Summary of the loaded region catalog
async fn catalog_handler(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let catalog = state.enricher.catalog();
    Json(CatalogResponse {
        neighborhoods: catalog.neighborhoods().len(),
        stations: catalog.stations().len(),
        text_neighborhoods: catalog.text_neighborhoods().len(),
        max_transit_km: catalog.max_transit_km(),
        extent: catalog.extent(),
    })
}

#[derive(Serialize)]
struct CatalogResponse {
    neighborhoods: usize,
    stations: usize,
    text_neighborhoods: usize,
    max_transit_km: f64,
    extent: Extent,
}

/// Annotate a single listing
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(listing): Json<Listing>,
) -> Result<Json<AnnotatedListing>, (StatusCode, String)> {
    let annotation = state.enricher.annotate(&listing).await.map_err(|e| {
        tracing::warn!("Annotation failed for '{}': {}", listing.name, e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    Ok(Json(AnnotatedListing {
        listing,
        annotation,
    }))
}
