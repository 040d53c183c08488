//! # geodex-dispatch
//!
//! Query dispatch for geodex: fans a structured query out per keyword to
//! the NASA CMR metadata index and STAC collection-search catalogs,
//! normalizes provider-native records into
//! [`geodex_core::DatasetSummary`], and aggregates results with per-source
//! failure isolation.

pub mod backend;
pub mod cmr;
pub mod dispatcher;
pub mod mock;
pub mod normalize;
pub mod session;
pub mod stac;

pub use backend::{CatalogQuery, CollectionCatalog, IndexQuery, MetadataIndex};
pub use cmr::{CmrBackend, CmrCollection};
pub use dispatcher::QueryDispatcher;
pub use normalize::{normalize_cmr, normalize_stac};
pub use session::EarthdataSession;
pub use stac::{catalog_url, StacBackend, StacCollection, StacLink, STAC_CATALOGS};
