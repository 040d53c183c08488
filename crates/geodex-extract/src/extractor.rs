//! Spatiotemporal parameter extraction from natural-language queries.
//!
//! Four independent, ordered pattern cascades (location, coordinates,
//! bounding box, temporal), first match wins per category. Extraction is
//! pure, synchronous pattern evaluation over a single string except for the
//! geocoding fallback, which is a network collaborator behind the
//! [`Geocoder`] trait.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};

use geodex_core::{
    BoundingBox, Clock, Coordinates, Geocoder, StructuredQuery, SystemClock, TemporalRange,
};

use crate::dates;
use crate::geocode::GeoapifyGeocoder;

/// Prepositional location templates. Case-sensitive: only capitalized word
/// sequences are recognized as place names. This is a deliberate
/// precision/recall tradeoff — lowercase place names are not matched.
static LOCATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"in\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"over\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"at\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
        r"near\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static location pattern must compile"))
    .collect()
});

/// Coordinate templates, tried in order: bare decimal pair, labeled
/// lat/lon, compass-suffixed.
static COORDINATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)",
        r"lat[itude]*[:=\s]+(-?\d+(?:\.\d+)?)[,\s]+lon[gitude]*[:=\s]+(-?\d+(?:\.\d+)?)",
        r"(-?\d+(?:\.\d+)?)\s*[NS]\s*,?\s*(-?\d+(?:\.\d+)?)\s*[EW]",
    ]
    .into_iter()
    .map(|p| {
        RegexBuilder::new(p)
            .case_insensitive(true)
            .build()
            .expect("static coordinate pattern must compile")
    })
    .collect()
});

/// Labeled 4-tuple bounding-box templates, comma-separated with optional
/// brackets, positional (min_lon, min_lat, max_lon, max_lat).
static BBOX_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"bbox\s*(?:[:=]\s*)?\[?\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\]?",
        r"bounds?\s*(?:[:=]\s*)?\[?\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*\]?",
    ]
    .into_iter()
    .map(|p| {
        RegexBuilder::new(p)
            .case_insensitive(true)
            .build()
            .expect("static bbox pattern must compile")
    })
    .collect()
});

/// Extracts spatiotemporal parameters from natural-language queries.
///
/// The clock is injectable so relative-date keywords ("last week") are
/// deterministic under test; the geocoder is optional and only consulted
/// when a location was found but no bbox or coordinates were.
pub struct SpatiotemporalExtractor {
    clock: Arc<dyn Clock>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl Default for SpatiotemporalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatiotemporalExtractor {
    /// Extractor with the system clock and no geocoding fallback.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            geocoder: None,
        }
    }

    /// Extractor configured from the environment: system clock, Geoapify
    /// geocoder when `GEOCODING_API_KEY` is set.
    pub fn from_env() -> Self {
        let geocoder = GeoapifyGeocoder::from_env();
        if geocoder.is_none() {
            debug!(subsystem = "extract", "no geocoding API key; bbox-from-location fallback disabled");
        }
        Self {
            clock: Arc::new(SystemClock),
            geocoder: geocoder.map(|g| Arc::new(g) as Arc<dyn Geocoder>),
        }
    }

    /// Replace the clock (tests pass a `FixedClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attach a geocoding collaborator for the bbox-from-location fallback.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Extract a place name from the query.
    ///
    /// Returns the first capture of the first matching prepositional
    /// template, or `None`. Matching is case-sensitive by design.
    pub fn extract_location(&self, query: &str) -> Option<String> {
        for pattern in LOCATION_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(query) {
                return Some(caps[1].to_string());
            }
        }
        None
    }

    /// Extract a (lat, lon) pair from the query.
    ///
    /// A float-parse failure or out-of-range value makes the pattern a
    /// non-match and the cascade continues; it is never an error.
    pub fn extract_coordinates(&self, query: &str) -> Option<Coordinates> {
        for pattern in COORDINATE_PATTERNS.iter() {
            let Some(caps) = pattern.captures(query) else {
                continue;
            };
            let (Ok(lat), Ok(lon)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
                continue;
            };
            if let Ok(coords) = Coordinates::try_new(lat, lon) {
                return Some(coords);
            }
        }
        None
    }

    /// Extract a labeled bounding box from the query.
    ///
    /// The four numbers are taken positionally as
    /// (min_lon, min_lat, max_lon, max_lat) in source order; a parse failure
    /// or geometrically invalid box skips to the next pattern.
    pub fn extract_bbox(&self, query: &str) -> Option<BoundingBox> {
        for pattern in BBOX_PATTERNS.iter() {
            let Some(caps) = pattern.captures(query) else {
                continue;
            };
            let mut values = [0.0_f64; 4];
            let mut ok = true;
            for (i, value) in values.iter_mut().enumerate() {
                match caps[i + 1].parse::<f64>() {
                    Ok(v) => *value = v,
                    Err(_) => {
                        ok = false;
                        break;
                    }
                }
            }
            if !ok {
                continue;
            }
            match BoundingBox::try_new(values[0], values[1], values[2], values[3]) {
                Ok(bbox) => return Some(bbox),
                Err(e) => {
                    debug!(
                        subsystem = "extract",
                        bbox = ?values,
                        error = %e,
                        "discarding matched but invalid bounding box"
                    );
                }
            }
        }
        None
    }

    /// Extract a temporal range from the query.
    ///
    /// Relative keywords first (resolved against the injected clock), then
    /// explicit range patterns. See [`crate::dates`].
    pub fn extract_temporal(&self, query: &str) -> Option<TemporalRange> {
        dates::extract_temporal(query, self.clock.as_ref())
    }

    /// Extract all spatiotemporal parameters from a query.
    ///
    /// Runs every cascade independently, then applies the
    /// bbox-from-location fallback: when a location was found and neither a
    /// bbox nor coordinates were, the geocoder (if configured) supplies the
    /// bbox. Geocoding failures degrade to "no bbox" with a warning; this
    /// function never fails.
    pub async fn extract_parameters(&self, query: &str) -> StructuredQuery {
        let mut params = StructuredQuery::new(query);

        params.location = self.extract_location(query);
        params.coordinates = self.extract_coordinates(query);
        params.bbox = self.extract_bbox(query);
        params.temporal = self.extract_temporal(query);

        if params.bbox.is_none() && params.coordinates.is_none() {
            if let Some(location) = params.location.as_deref() {
                params.bbox = self.geocode_location(location).await;
            }
        }

        debug!(
            subsystem = "extract",
            op = "extract_parameters",
            query,
            location = ?params.location,
            bbox = ?params.bbox,
            "extraction complete"
        );
        params
    }

    async fn geocode_location(&self, location: &str) -> Option<BoundingBox> {
        let geocoder = self.geocoder.as_ref()?;
        match geocoder.geocode_bbox(location).await {
            Ok(Some(bbox)) => {
                info!(subsystem = "extract", location, bbox = ?bbox, "geocoded location");
                Some(bbox)
            }
            Ok(None) => {
                debug!(subsystem = "extract", location, "geocoder found no bbox");
                None
            }
            Err(e) => {
                warn!(subsystem = "extract", location, error = %e, "geocoding failed; continuing without bbox");
                None
            }
        }
    }
}
