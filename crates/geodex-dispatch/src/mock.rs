//! Mock catalog backends for deterministic testing.
//!
//! Each mock returns canned provider-native records (or a configured
//! failure) and keeps a call log so tests can assert on the queries the
//! dispatcher issued.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use geodex_core::{Error, Result};

use crate::backend::{CatalogQuery, CollectionCatalog, IndexQuery, MetadataIndex};
use crate::cmr::CmrCollection;
use crate::stac::{StacCollection, StacLink};

/// Canned CMR record with a concept id, title, and one valid link.
pub fn cmr_record(concept_id: &str, title: &str) -> CmrCollection {
    serde_json::from_value(json!({
        "meta": { "concept-id": concept_id },
        "umm": {
            "EntryTitle": title,
            "Abstract": format!("{title} abstract"),
            "DOI": { "DOI": format!("10.5067/{concept_id}") },
            "RelatedUrls": [
                { "URL": "https://data.example/granules", "Type": "GET DATA" }
            ]
        }
    }))
    .expect("static mock record must deserialize")
}

/// Canned STAC record with an id, title, and one valid link.
pub fn stac_record(id: &str, title: &str) -> StacCollection {
    StacCollection {
        id: id.to_string(),
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        links: vec![StacLink {
            href: format!("https://catalog.example/collections/{id}"),
            rel: "self".to_string(),
        }],
    }
}

/// Mock metadata-search index.
#[derive(Default)]
pub struct MockMetadataIndex {
    records: Vec<CmrCollection>,
    failure: Option<String>,
    fail_keyword: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<IndexQuery>>,
}

impl MockMetadataIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these records from every call.
    pub fn with_records(mut self, records: Vec<CmrCollection>) -> Self {
        self.records = records;
        self
    }

    /// Fail every call with a backend error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Fail only calls for this keyword; other keywords respond normally.
    pub fn failing_for_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.fail_keyword = Some(keyword.into());
        self
    }

    /// Sleep this long before responding, to drive timeout paths.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<IndexQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataIndex for MockMetadataIndex {
    async fn search_collections(&self, query: &IndexQuery) -> Result<Vec<CmrCollection>> {
        self.calls.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(Error::Backend(message.clone()));
        }
        if self.fail_keyword.as_deref() == Some(query.keyword.as_str()) {
            return Err(Error::Backend(format!(
                "injected failure for keyword {}",
                query.keyword
            )));
        }
        Ok(self.records.iter().take(query.count).cloned().collect())
    }
}

/// Mock collection-search catalog.
#[derive(Default)]
pub struct MockCollectionCatalog {
    records: Vec<StacCollection>,
    failure: Option<String>,
    fail_keyword: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<CatalogQuery>>,
}

impl MockCollectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these records from every call.
    pub fn with_records(mut self, records: Vec<StacCollection>) -> Self {
        self.records = records;
        self
    }

    /// Fail every call with a backend error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Fail only calls for this keyword; other keywords respond normally.
    pub fn failing_for_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.fail_keyword = Some(keyword.into());
        self
    }

    /// Sleep this long before responding, to drive timeout paths.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CollectionCatalog for MockCollectionCatalog {
    async fn search_collections(&self, query: &CatalogQuery) -> Result<Vec<StacCollection>> {
        self.calls.lock().unwrap().push(query.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(Error::Backend(message.clone()));
        }
        if self.fail_keyword.as_deref() == Some(query.keyword.as_str()) {
            return Err(Error::Backend(format!(
                "injected failure for keyword {}",
                query.keyword
            )));
        }
        Ok(self.records.iter().take(query.limit).cloned().collect())
    }
}
