//! Manzanita - geographic annotations for real-estate listings
//!
//! This library provides the region catalog, proximity resolvers and the
//! enrichment pipeline shared by the `annotate` and `serve` binaries.

pub mod catalog;
pub mod config;
pub mod enrich;
pub mod error;
pub mod geomath;
pub mod lookup;
pub mod models;
pub mod resolver;
pub mod slack;

pub use catalog::RegionCatalog;
pub use enrich::Enricher;
pub use models::{AnnotatedListing, Annotation, Coordinate, Listing};
