//! Geoapify forward-geocoding collaborator.
//!
//! Resolves a place name to the bounding box of the first returned feature.
//! Used only for the bbox-from-location fallback; failures are recoverable
//! by design and degrade to "no bbox" in the extractor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use geodex_core::{defaults, BoundingBox, Error, Geocoder, Result};

/// Geoapify geocoding backend.
pub struct GeoapifyGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GeoapifyGeocoder {
    /// Create a geocoder against a specific endpoint.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create from environment variables.
    ///
    /// Returns `None` when `GEOCODING_API_KEY` is unset — the extractor then
    /// runs without the bbox-from-location fallback.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(defaults::ENV_GEOCODING_API_KEY).ok()?;
        let base_url = std::env::var(defaults::ENV_GEOCODING_URL)
            .unwrap_or_else(|_| defaults::GEOCODING_URL.to_string());
        Some(Self::new(base_url, api_key))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    bbox: Option<Vec<f64>>,
}

#[async_trait]
impl Geocoder for GeoapifyGeocoder {
    async fn geocode_bbox(&self, location: &str) -> Result<Option<BoundingBox>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("text", location), ("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::Geocoding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "geocoding request returned {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(e.to_string()))?;

        let Some(feature) = body.features.into_iter().next() else {
            debug!(subsystem = "geocode", location, "no features returned");
            return Ok(None);
        };
        let Some(values) = feature.bbox else {
            return Ok(None);
        };

        let bbox = BoundingBox::from_slice(&values)
            .map_err(|e| Error::Geocoding(format!("unusable feature bbox: {e}")))?;
        Ok(Some(bbox))
    }
}
