//! Backend trait seams for the dispatcher.
//!
//! Each trait models one catalog family and returns provider-native records;
//! normalization into [`geodex_core::DatasetSummary`] is owned by the
//! dispatcher so a malformed record can be isolated without touching the
//! transport layer. Tests swap in the mock implementations from
//! [`crate::mock`].

use async_trait::async_trait;

use geodex_core::{BoundingBox, Result};

use crate::cmr::CmrCollection;
use crate::stac::StacCollection;

/// One metadata-index search call: a single keyword against NASA CMR.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub keyword: String,
    pub bbox: BoundingBox,
    /// `(start, end)` as `YYYY-MM-DD` strings; either side may be open.
    pub temporal: (Option<String>, Option<String>),
    /// Maximum records to request.
    pub count: usize,
}

/// One collection-search call: a single keyword against a STAC catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub keyword: String,
    pub bbox: BoundingBox,
    /// ISO-8601 interval string (`start/end`, `start/..`, `../end`).
    pub datetime: Option<String>,
    /// Maximum records to request.
    pub limit: usize,
}

/// NASA CMR-style metadata-search index.
#[async_trait]
pub trait MetadataIndex: Send + Sync {
    async fn search_collections(&self, query: &IndexQuery) -> Result<Vec<CmrCollection>>;
}

/// STAC-style collection-search catalog.
#[async_trait]
pub trait CollectionCatalog: Send + Sync {
    async fn search_collections(&self, query: &CatalogQuery) -> Result<Vec<StacCollection>>;
}
