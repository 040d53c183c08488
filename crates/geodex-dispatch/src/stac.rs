//! STAC collection-search backend.
//!
//! Speaks the STAC collection-search extension
//! (`GET {catalog}/collections?q=..&bbox=..&datetime=..&limit=..`) against
//! any catalog in the named registry or an explicit URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use geodex_core::{defaults, Error, Result};

use crate::backend::{CatalogQuery, CollectionCatalog};

/// Named catalog registry: short name → base URL. Used as the default
/// catalog source when no explicit URL is supplied.
pub const STAC_CATALOGS: &[(&str, &str)] = &[
    ("nasa", defaults::STAC_CATALOG_NASA),
    ("earth_search", defaults::STAC_CATALOG_EARTH_SEARCH),
    ("planetary_computer", defaults::STAC_CATALOG_PLANETARY_COMPUTER),
    ("maap", defaults::STAC_CATALOG_MAAP),
];

/// Resolve a registry short name to its catalog base URL.
pub fn catalog_url(name: &str) -> Option<&'static str> {
    STAC_CATALOGS
        .iter()
        .find(|(tag, _)| *tag == name)
        .map(|(_, url)| *url)
}

/// Provider-native STAC collection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StacCollection {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub links: Vec<StacLink>,
}

/// Link object on a STAC collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacLink {
    pub href: String,
    pub rel: String,
}

#[derive(Debug, Deserialize)]
struct StacCollectionsResponse {
    #[serde(default)]
    collections: Vec<StacCollection>,
}

/// Reqwest-backed STAC collection-search adapter.
pub struct StacBackend {
    client: Client,
    catalog_url: String,
}

impl StacBackend {
    /// Create a backend against a specific catalog.
    pub fn new(catalog_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            catalog_url: catalog_url.into(),
        }
    }

    /// Create from environment variables: `GEODEX_STAC_CATALOG_URL`
    /// override, else the `maap` registry entry.
    pub fn from_env() -> Self {
        let catalog_url = std::env::var(defaults::ENV_STAC_CATALOG_URL)
            .unwrap_or_else(|_| defaults::STAC_CATALOG_MAAP.to_string());
        Self::new(catalog_url)
    }

    /// The catalog base URL this backend queries.
    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }
}

#[async_trait]
impl CollectionCatalog for StacBackend {
    async fn search_collections(&self, query: &CatalogQuery) -> Result<Vec<StacCollection>> {
        let mut params = vec![
            ("bbox".to_string(), query.bbox.to_param()),
            ("limit".to_string(), query.limit.to_string()),
        ];
        if !query.keyword.is_empty() {
            params.push(("q".to_string(), query.keyword.clone()));
        }
        if let Some(datetime) = &query.datetime {
            params.push(("datetime".to_string(), datetime.clone()));
        }

        debug!(
            subsystem = "stac",
            catalog_url = %self.catalog_url,
            keyword = %query.keyword,
            "STAC collection search"
        );

        let url = format!("{}/collections", self.catalog_url.trim_end_matches('/'));
        let response = self.client.get(&url).query(&params).send().await?;
        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "STAC search returned {}",
                response.status()
            )));
        }

        let body: StacCollectionsResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("STAC response parse failed: {e}")))?;
        Ok(body.collections)
    }
}
