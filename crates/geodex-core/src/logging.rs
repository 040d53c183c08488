//! Structured logging field name constants for geodex.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-record iteration, high-volume data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "extract", "dispatch", "cmr", "stac", "geocode", "session"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "extract_parameters", "dispatch_collection_query", "search"
pub const OPERATION: &str = "op";

// ─── Query fields ──────────────────────────────────────────────────────────

/// Natural-language query text.
pub const QUERY: &str = "query";

/// Search keyword sent to a backend.
pub const KEYWORD: &str = "keyword";

/// Source selector tag ("nasa", "stac", "maap", "esa", "all").
pub const SOURCE: &str = "source";

/// Catalog base URL a call was issued against.
pub const CATALOG_URL: &str = "catalog_url";

/// Extracted or supplied bounding box.
pub const BBOX: &str = "bbox";

/// Extracted location name.
pub const LOCATION: &str = "location";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned by a search or dispatch.
pub const RESULT_COUNT: &str = "result_count";

/// Number of records skipped during normalization.
pub const SKIPPED_COUNT: &str = "skipped_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
