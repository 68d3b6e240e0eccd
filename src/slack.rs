//! Slack notification for annotated listings.

use serde::Serialize;
use tracing::{error, info};
use url::form_urlencoded;

use crate::config::SlackConfig;
use crate::error::NotifyError;
use crate::models::{Annotation, Coordinate, Listing};

const STATIC_MAP_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/staticmap";
const STATIC_MAP_SIZE: &str = "500x400";

#[derive(Serialize, Debug)]
struct SlackAttachment {
    title: String,
    image_url: String,
}

#[derive(Serialize, Debug)]
struct SlackPayload {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<String>,
    username: String,
    icon_emoji: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<SlackAttachment>,
}

/// One-line summary: `area | price | station distance | name | <url>`.
pub fn format_listing_message(listing: &Listing, annotation: &Annotation) -> String {
    format!(
        "{} | {} | {} | {} | <{}>",
        annotation.area,
        listing.price,
        annotation.bart_dist_display(),
        listing.name,
        listing.url
    )
}

/// Static map with a blue `S` marker at the destination and a red `A`
/// marker at the listing.
pub fn static_map_url(maps_key: &str, destination: Coordinate, listing: Coordinate) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("size", STATIC_MAP_SIZE)
        .append_pair("markers", &format!("color:blue|label:S|{}", destination))
        .append_pair("markers", &format!("color:red|label:A|{}", listing))
        .append_pair("key", maps_key)
        .finish();
    format!("{}?{}", STATIC_MAP_ENDPOINT, query)
}

/// Posts annotated listings to a Slack incoming webhook.
pub struct SlackWebhook {
    config: SlackConfig,
    maps_key: String,
    destination: Coordinate,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a webhook client; `maps_key` signs the static map attachment.
    pub fn new(config: SlackConfig, maps_key: String, destination: Coordinate) -> Self {
        Self {
            config,
            maps_key,
            destination,
            client: reqwest::Client::new(),
        }
    }

    fn payload(&self, listing: &Listing, annotation: &Annotation) -> SlackPayload {
        let attachments = listing
            .geotag
            .map(|geotag| SlackAttachment {
                title: "map".to_string(),
                image_url: static_map_url(&self.maps_key, self.destination, geotag),
            })
            .into_iter()
            .collect();

        SlackPayload {
            text: format_listing_message(listing, annotation),
            channel: self.config.channel.clone(),
            username: self.config.username.clone(),
            icon_emoji: self.config.icon_emoji.clone(),
            attachments,
        }
    }

    /// Post one listing, with a map attachment when it has a geotag.
    pub async fn post_listing(
        &self,
        listing: &Listing,
        annotation: &Annotation,
    ) -> Result<(), NotifyError> {
        let payload = self.payload(listing, annotation);

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            error!("Failed to post listing to Slack: {}", error_text);
            return Err(NotifyError::Rejected(error_text));
        }

        info!("Posted listing to Slack: {}", listing.name);
        Ok(())
    }
}
