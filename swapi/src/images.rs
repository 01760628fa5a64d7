//! Portrait lookup from the secondary Star Wars image API.
//!
//! The image API shares SWAPI's numeric character ids.

use crate::client::get_json;
use crate::errors::Result;
use holocron_overlay::RecordId;
use serde::Deserialize;

pub const DEFAULT_IMAGE_BASE_URL: &str = "https://akabab.github.io/starwars-api/api";

#[derive(Debug, Deserialize)]
struct ImageRecord {
    #[serde(default)]
    image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImageLookup {
    http: reqwest::Client,
    base_url: String,
}

impl ImageLookup {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Image URL for a character, `None` when the record has no image.
    pub async fn image_url(&self, id: &RecordId) -> Result<Option<String>> {
        let url = format!("{}/id/{id}.json", self.base_url);
        let record: ImageRecord = get_json(&self.http, &url, &[]).await?;
        Ok(record.image.filter(|image| !image.is_empty()))
    }
}
