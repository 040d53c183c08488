//! # geodex-core
//!
//! Core types, traits, and abstractions for geodex.
//!
//! This crate provides the shared data model (structured queries, bounding
//! boxes, temporal ranges, normalized dataset summaries), the error type,
//! default constants, structured-logging field names, and the trait seams
//! the extractor and dispatcher crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{
    truncate_summary, AdapterKind, BoundingBox, Coordinates, DatasetSummary, Link,
    SourceSelector, StructuredQuery, TemporalRange, DOI_UNAVAILABLE, SOURCE_NASA_CMR, SOURCE_STAC,
};
pub use traits::{BboxCorrector, Clock, FixedClock, Geocoder, SystemClock};
