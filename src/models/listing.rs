//! Listing input and annotation output records.

use serde::{Deserialize, Serialize, Serializer};

use super::Coordinate;

/// Annotation value used when the distance provider has no route.
pub const NO_ROUTE: &str = "Google Error.";

/// Annotation value used when the listing has no geotag.
pub const NO_LOCATION: &str = "Not enough location information available.";

/// Placeholder for a missing station distance.
pub const NOT_AVAILABLE: &str = "N/A";

/// A scraped listing as handed over by the ingestion pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub geotag: Option<Coordinate>,
    /// Free-text description of where the listing was posted
    #[serde(rename = "where", alias = "location", default)]
    pub location: String,
}

/// Geographic context computed for one listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Annotation {
    pub area_found: bool,
    pub area: String,
    pub near_bart: bool,
    pub bart: String,
    /// Kilometers to the nearest station, `None` when unknown
    #[serde(serialize_with = "serialize_distance")]
    pub bart_dist: Option<f64>,
    pub distance_matrix_result: String,
}

impl Annotation {
    /// Station distance as shown to people: two decimals or `N/A`.
    pub fn bart_dist_display(&self) -> String {
        match self.bart_dist {
            Some(km) => format!("{:.2}", km),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

fn serialize_distance<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(km) => s.serialize_f64(*km),
        None => s.serialize_str(NOT_AVAILABLE),
    }
}

/// Listing merged with its annotation, the record that gets emitted.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(flatten)]
    pub annotation: Annotation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_where_and_null_geotag() {
        let listing: Listing = serde_json::from_str(
            r#"{"name":"Sunny 1br","url":"https://x/1","price":"$2500","geotag":null,"where":"Mission"}"#,
        )
        .unwrap();
        assert!(listing.geotag.is_none());
        assert_eq!(listing.location, "Mission");

        let listing: Listing =
            serde_json::from_str(r#"{"geotag":[37.76,-122.42],"location":"soma"}"#).unwrap();
        assert_eq!(listing.location, "soma");
        assert!(listing.geotag.is_some());
    }

    #[test]
    fn test_annotation_serializes_distance_sentinel() {
        let annotation = Annotation {
            distance_matrix_result: NO_LOCATION.to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["bart_dist"], "N/A");
        assert_eq!(json["area_found"], false);

        let annotation = Annotation {
            bart_dist: Some(0.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&annotation).unwrap();
        assert_eq!(json["bart_dist"], 0.5);
        assert_eq!(annotation.bart_dist_display(), "0.50");
    }

    #[test]
    fn test_annotated_listing_is_flat() {
        let record = AnnotatedListing {
            listing: Listing {
                name: "Loft".into(),
                ..Default::default()
            },
            annotation: Annotation {
                area: "soma".into(),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "Loft");
        assert_eq!(json["area"], "soma");
        assert_eq!(json["where"], "");
    }
}
