//! NASA CMR metadata-index backend.
//!
//! Speaks the CMR collection search API (`/search/collections.umm_json`).
//! Records come back as a `meta` envelope plus an unordered `umm` metadata
//! map queried by field name (`EntryTitle`, `DOI`, `RelatedUrls`), which is
//! exactly how normalization consumes them.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use geodex_core::{defaults, Error, Result};

use crate::backend::{IndexQuery, MetadataIndex};
use crate::session::EarthdataSession;

/// Provider-native CMR collection record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmrCollection {
    #[serde(default)]
    pub meta: CmrMeta,
    /// UMM metadata map, queried by field name.
    #[serde(default)]
    pub umm: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmrMeta {
    #[serde(rename = "concept-id", skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
}

impl CmrCollection {
    /// Provider concept identifier, e.g. `C1234567890-PROV`.
    pub fn concept_id(&self) -> Option<&str> {
        self.meta.concept_id.as_deref()
    }

    /// The UMM `Abstract` field.
    pub fn abstract_text(&self) -> Option<&str> {
        self.umm("Abstract").and_then(Value::as_str)
    }

    /// Look up a UMM metadata field by name.
    pub fn umm(&self, field: &str) -> Option<&Value> {
        self.umm.get(field)
    }
}

#[derive(Debug, Deserialize)]
struct CmrSearchResponse {
    #[serde(default)]
    items: Vec<CmrCollection>,
}

/// Reqwest-backed CMR metadata-index adapter.
pub struct CmrBackend {
    client: Client,
    base_url: String,
    session: Arc<EarthdataSession>,
}

impl CmrBackend {
    /// Create a backend against a specific CMR deployment.
    pub fn new(base_url: impl Into<String>, session: Arc<EarthdataSession>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    /// Create from environment variables (`GEODEX_CMR_URL` override).
    pub fn from_env(session: Arc<EarthdataSession>) -> Self {
        let base_url = std::env::var(defaults::ENV_CMR_BASE_URL)
            .unwrap_or_else(|_| defaults::CMR_BASE_URL.to_string());
        Self::new(base_url, session)
    }
}

#[async_trait]
impl MetadataIndex for CmrBackend {
    async fn search_collections(&self, query: &IndexQuery) -> Result<Vec<CmrCollection>> {
        // Auth is optional for collection search; a failed login degrades
        // to an anonymous request.
        let token = match self.session.ensure_authenticated().await {
            Ok(token) => token,
            Err(e) => {
                warn!(subsystem = "cmr", error = %e, "Earthdata authentication failed; searching anonymously");
                None
            }
        };

        let keyword = if query.keyword.is_empty() {
            "*"
        } else {
            &query.keyword
        };
        let mut params = vec![
            ("keyword".to_string(), keyword.to_string()),
            ("bounding_box".to_string(), query.bbox.to_param()),
            ("page_size".to_string(), query.count.to_string()),
        ];
        if query.temporal.0.is_some() || query.temporal.1.is_some() {
            let start = query.temporal.0.clone().unwrap_or_default();
            let end = query.temporal.1.clone().unwrap_or_default();
            params.push(("temporal".to_string(), format!("{start},{end}")));
        }

        debug!(subsystem = "cmr", keyword = %query.keyword, bbox = %query.bbox.to_param(), "CMR search");

        let url = format!(
            "{}/search/collections.umm_json",
            self.base_url.trim_end_matches('/')
        );
        let mut request = self.client.get(&url).query(&params);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "CMR search returned {}",
                response.status()
            )));
        }

        let body: CmrSearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("CMR response parse failed: {e}")))?;
        Ok(body.items)
    }
}
