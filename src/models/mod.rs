//! Core data models for the annotator.

pub mod coordinate;
pub mod listing;

pub use coordinate::{BoundingBox, Coordinate};
pub use listing::{AnnotatedListing, Annotation, Listing, NOT_AVAILABLE, NO_LOCATION, NO_ROUTE};
