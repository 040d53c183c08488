//! # geodex-extract
//!
//! Spatiotemporal parameter extraction for geodex: ordered regex cascades
//! turning natural-language queries into [`geodex_core::StructuredQuery`]
//! values, plus the Geoapify geocoding collaborator backing the
//! bbox-from-location fallback.

pub mod dates;
pub mod extractor;
pub mod geocode;

pub use dates::fuzzy_date;
pub use extractor::SpatiotemporalExtractor;
pub use geocode::GeoapifyGeocoder;
