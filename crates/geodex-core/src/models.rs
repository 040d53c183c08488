//! Shared data model for geodex: structured queries, bounding boxes,
//! temporal ranges, and the normalized `DatasetSummary` record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// Source tag for records normalized from the NASA CMR metadata index.
pub const SOURCE_NASA_CMR: &str = "NASA CMR";

/// Source tag for records normalized from a STAC collection search.
pub const SOURCE_STAC: &str = "STAC";

// =============================================================================
// COORDINATES
// =============================================================================

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Create a coordinate pair, rejecting values outside
    /// lat ∈ [-90, 90], lon ∈ [-180, 180].
    pub fn try_new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidInput(format!(
                "latitude {lat} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(Error::InvalidInput(format!(
                "longitude {lon} outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// A geographic bounding box as (min_lon, min_lat, max_lon, max_lat).
///
/// Serialized as a 4-element array in source order, matching the wire shape
/// both CMR and STAC expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Whole-Earth bounding box, used when a search has no spatial filter.
    pub const GLOBAL: BoundingBox = BoundingBox {
        min_lon: -180.0,
        min_lat: -90.0,
        max_lon: 180.0,
        max_lat: 90.0,
    };

    /// Create a bounding box, rejecting out-of-range corners and inverted
    /// latitudes. Longitudes are not required to be ordered (antimeridian
    /// crossing is legal in CMR).
    pub fn try_new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self> {
        for lon in [min_lon, max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(Error::InvalidInput(format!(
                    "bbox longitude {lon} outside [-180, 180]"
                )));
            }
        }
        for lat in [min_lat, max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(Error::InvalidInput(format!(
                    "bbox latitude {lat} outside [-90, 90]"
                )));
            }
        }
        if min_lat > max_lat {
            return Err(Error::InvalidInput(format!(
                "bbox min_lat {min_lat} greater than max_lat {max_lat}"
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Create from a caller-supplied slice, rejecting anything that is not
    /// exactly four values.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [min_lon, min_lat, max_lon, max_lat] => {
                Self::try_new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => Err(Error::InvalidInput(format!(
                "bbox must have exactly 4 values, got {}",
                values.len()
            ))),
        }
    }

    /// Positional array form (min_lon, min_lat, max_lon, max_lat).
    pub fn as_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Comma-separated form for URL query parameters.
    pub fn to_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.as_array()
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = Error;

    fn try_from(v: [f64; 4]) -> Result<Self> {
        Self::try_new(v[0], v[1], v[2], v[3])
    }
}

// =============================================================================
// TEMPORAL RANGE
// =============================================================================

/// A date range extracted from natural language.
///
/// At least one of `start`/`end` is always populated; the constructors
/// enforce this, so a `TemporalRange` value is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalRange {
    #[serde(rename = "start_date", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(rename = "end_date", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl TemporalRange {
    /// Range with both endpoints.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Open-ended range with a start only.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Open-ended range with an end only (e.g. "before 2020").
    pub fn ending(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// A single day (start == end).
    pub fn single_day(day: NaiveDate) -> Self {
        Self::between(day, day)
    }

    /// The full calendar year `year` (Jan 1 through Dec 31).
    ///
    /// Returns `None` for years chrono cannot represent.
    pub fn calendar_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self::between(start, end))
    }

    /// Date pair as `YYYY-MM-DD` strings, the shape the CMR adapter sends.
    pub fn as_date_pair(&self) -> (Option<String>, Option<String>) {
        (
            self.start.map(|d| d.to_string()),
            self.end.map(|d| d.to_string()),
        )
    }

    /// ISO-8601 interval string for STAC: `start/end`, `start/..`, or
    /// `../end` when one side is open.
    pub fn to_interval(&self) -> String {
        match (self.start, self.end) {
            (Some(s), Some(e)) => format!("{s}/{e}"),
            (Some(s), None) => format!("{s}/.."),
            (None, Some(e)) => format!("../{e}"),
            // Unreachable via constructors; render the unbounded interval.
            (None, None) => "../..".to_string(),
        }
    }
}

// =============================================================================
// STRUCTURED QUERY
// =============================================================================

/// Normalized output of natural-language extraction.
///
/// Created once per incoming text, immutable after construction, consumed by
/// the dispatcher and then discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Verbatim input text.
    pub query: String,

    /// Free-text place name, if one was recognized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Point coordinates, if present in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    /// Bounding box, extracted directly or derived by geocoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Temporal range, if the text carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalRange>,
}

impl StructuredQuery {
    /// A query carrying only the original text (nothing extracted).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: None,
            coordinates: None,
            bbox: None,
            temporal: None,
        }
    }
}

// =============================================================================
// LINKS AND DATASET SUMMARIES
// =============================================================================

/// A related link on a normalized dataset record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub rel: String,
}

impl Link {
    /// Build a link only when `url` parses as http/https with a non-empty
    /// host. Invalid URLs are dropped at the boundary, never stored.
    pub fn checked(url: impl Into<String>, rel: impl Into<String>) -> Option<Self> {
        let url = url.into();
        let parsed = reqwest::Url::parse(&url).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        parsed.host_str().filter(|h| !h.is_empty())?;
        Some(Self {
            url,
            rel: rel.into(),
        })
    }
}

/// DOI sentinel for CMR records with no DOI field.
pub const DOI_UNAVAILABLE: &str = "Unavailable";

/// Normalized dataset metadata record returned by the dispatcher.
///
/// Owned solely by the caller after being returned; no persistence, no
/// shared mutable state across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Source tag: [`SOURCE_NASA_CMR`] or [`SOURCE_STAC`].
    pub source: String,
    /// Provider identifier (CMR concept id or STAC collection id).
    pub id: String,
    /// DOI, or the `"Unavailable"` sentinel for CMR records without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub title: String,
    /// Abstract/description truncated to [`defaults::SUMMARY_MAX_CHARS`].
    pub summary: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Truncate to at most `defaults::SUMMARY_MAX_CHARS` characters, respecting
/// char boundaries (upstream abstracts are frequently multi-byte).
pub fn truncate_summary(text: &str) -> String {
    text.chars().take(defaults::SUMMARY_MAX_CHARS).collect()
}

// =============================================================================
// SOURCE SELECTOR
// =============================================================================

/// Kind of catalog adapter a selector routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// NASA CMR metadata-search index.
    MetadataIndex,
    /// STAC-style collection-search catalog.
    CollectionCatalog,
}

/// Closed enumeration of source selector tags.
///
/// `maap` and `esa` are aliases selecting the STAC path; the routing table
/// below makes the aliasing a data change rather than repeated conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSelector {
    Nasa,
    Stac,
    Maap,
    Esa,
    All,
}

/// Selector tag → enabled adapter set.
const SELECTOR_ROUTES: &[(SourceSelector, &[AdapterKind])] = &[
    (SourceSelector::Nasa, &[AdapterKind::MetadataIndex]),
    (SourceSelector::Stac, &[AdapterKind::CollectionCatalog]),
    (SourceSelector::Maap, &[AdapterKind::CollectionCatalog]),
    (SourceSelector::Esa, &[AdapterKind::CollectionCatalog]),
    (
        SourceSelector::All,
        &[AdapterKind::MetadataIndex, AdapterKind::CollectionCatalog],
    ),
];

impl SourceSelector {
    /// The set of adapters this selector enables.
    pub fn routes(self) -> &'static [AdapterKind] {
        SELECTOR_ROUTES
            .iter()
            .find(|(tag, _)| *tag == self)
            .map(|(_, kinds)| *kinds)
            .unwrap_or(&[])
    }

    /// Whether this selector enables the given adapter kind.
    pub fn enables(self, kind: AdapterKind) -> bool {
        self.routes().contains(&kind)
    }
}

impl std::str::FromStr for SourceSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nasa" => Ok(Self::Nasa),
            "stac" => Ok(Self::Stac),
            "maap" => Ok(Self::Maap),
            "esa" => Ok(Self::Esa),
            "all" => Ok(Self::All),
            other => Err(Error::InvalidInput(format!(
                "unsupported source selector: {other:?} (expected nasa|stac|maap|esa|all)"
            ))),
        }
    }
}

impl std::fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Nasa => "nasa",
            Self::Stac => "stac",
            Self::Maap => "maap",
            Self::Esa => "esa",
            Self::All => "all",
        };
        write!(f, "{tag}")
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_range() {
        let c = Coordinates::try_new(37.7749, -122.4194).unwrap();
        assert_eq!(c.lat, 37.7749);
        assert_eq!(c.lon, -122.4194);
    }

    #[test]
    fn test_coordinates_out_of_range() {
        assert!(Coordinates::try_new(200.0, 300.0).is_err());
        assert!(Coordinates::try_new(0.0, 181.0).is_err());
        assert!(Coordinates::try_new(-90.5, 0.0).is_err());
    }

    #[test]
    fn test_bbox_from_slice_wrong_length() {
        let err = BoundingBox::from_slice(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_bbox_rejects_inverted_latitudes() {
        assert!(BoundingBox::try_new(-10.0, 50.0, 10.0, 40.0).is_err());
    }

    #[test]
    fn test_bbox_allows_antimeridian_crossing() {
        let b = BoundingBox::try_new(170.0, -10.0, -170.0, 10.0).unwrap();
        assert_eq!(b.to_param(), "170,-10,-170,10");
    }

    #[test]
    fn test_bbox_global() {
        assert_eq!(BoundingBox::GLOBAL.as_array(), [-180.0, -90.0, 180.0, 90.0]);
    }

    #[test]
    fn test_bbox_serde_array_form() {
        let b = BoundingBox::try_new(-122.5, 37.5, -122.0, 38.0).unwrap();
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[-122.5,37.5,-122.0,38.0]");

        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_temporal_interval_forms() {
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();

        assert_eq!(
            TemporalRange::between(d1, d2).to_interval(),
            "2020-01-01/2020-12-31"
        );
        assert_eq!(TemporalRange::starting(d1).to_interval(), "2020-01-01/..");
        assert_eq!(TemporalRange::ending(d2).to_interval(), "../2020-12-31");
    }

    #[test]
    fn test_temporal_date_pair() {
        let d = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        let (start, end) = TemporalRange::single_day(d).as_date_pair();
        assert_eq!(start.as_deref(), Some("2021-06-15"));
        assert_eq!(end.as_deref(), Some("2021-06-15"));
    }

    #[test]
    fn test_calendar_year() {
        let range = TemporalRange::calendar_year(2021).unwrap();
        assert_eq!(range.to_interval(), "2021-01-01/2021-12-31");
    }

    #[test]
    fn test_link_checked_valid() {
        let link = Link::checked("https://example.com/data", "self").unwrap();
        assert_eq!(link.url, "https://example.com/data");
        assert_eq!(link.rel, "self");
    }

    #[test]
    fn test_link_checked_rejects_missing_scheme_or_host() {
        assert!(Link::checked("example.com/data", "self").is_none());
        assert!(Link::checked("ftp://example.com/data", "self").is_none());
        assert!(Link::checked("relative/path", "self").is_none());
        assert!(Link::checked("", "self").is_none());
    }

    #[test]
    fn test_truncate_summary_char_boundary() {
        let long = "é".repeat(600);
        let truncated = truncate_summary(&long);
        assert_eq!(truncated.chars().count(), 500);
    }

    #[test]
    fn test_truncate_summary_short_text_unchanged() {
        assert_eq!(truncate_summary("short abstract"), "short abstract");
    }

    #[test]
    fn test_selector_routes() {
        use AdapterKind::*;
        assert_eq!(SourceSelector::Nasa.routes(), &[MetadataIndex]);
        assert_eq!(SourceSelector::Stac.routes(), &[CollectionCatalog]);
        assert_eq!(SourceSelector::Maap.routes(), &[CollectionCatalog]);
        assert_eq!(SourceSelector::Esa.routes(), &[CollectionCatalog]);
        assert_eq!(
            SourceSelector::All.routes(),
            &[MetadataIndex, CollectionCatalog]
        );
    }

    #[test]
    fn test_selector_from_str() {
        assert_eq!(
            "MAAP".parse::<SourceSelector>().unwrap(),
            SourceSelector::Maap
        );
        let err = "landsat".parse::<SourceSelector>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_structured_query_bare() {
        let q = StructuredQuery::new("Find some data");
        assert_eq!(q.query, "Find some data");
        assert!(q.location.is_none());
        assert!(q.coordinates.is_none());
        assert!(q.bbox.is_none());
        assert!(q.temporal.is_none());
    }

    #[test]
    fn test_structured_query_serializes_without_empty_fields() {
        let q = StructuredQuery::new("x");
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json, serde_json::json!({ "query": "x" }));
    }
}
