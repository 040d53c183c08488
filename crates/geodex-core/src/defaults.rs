//! Centralized default constants for geodex.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// CATALOG ENDPOINTS
// =============================================================================

/// NASA CMR search API base URL.
pub const CMR_BASE_URL: &str = "https://cmr.earthdata.nasa.gov";

/// NASA Earthdata Login token endpoint.
pub const EDL_TOKEN_URL: &str = "https://urs.earthdata.nasa.gov/api/users/tokens";

/// NASA CMR STAC catalog.
pub const STAC_CATALOG_NASA: &str = "https://cmr.earthdata.nasa.gov/stac";

/// AWS Earth Search STAC catalog.
pub const STAC_CATALOG_EARTH_SEARCH: &str = "https://earth-search.aws.element84.com/v1";

/// Microsoft Planetary Computer STAC catalog.
pub const STAC_CATALOG_PLANETARY_COMPUTER: &str =
    "https://planetarycomputer.microsoft.com/api/stac/v1";

/// NASA MAAP STAC catalog (default when no catalog URL is supplied).
pub const STAC_CATALOG_MAAP: &str = "https://stac.maap-project.org/";

// =============================================================================
// GEOCODING
// =============================================================================

/// Geoapify forward geocoding endpoint.
pub const GEOCODING_URL: &str = "https://api.geoapify.com/v1/geocode/search";

// =============================================================================
// RESULT LIMITS
// =============================================================================

/// Default number of records requested from each backend per keyword.
pub const RESULTS_PER_SOURCE: usize = 10;

/// Upper bound on the per-source result cap a caller may request.
pub const MAX_RESULTS_PER_SOURCE: usize = 100;

/// Maximum characters kept from an upstream abstract/description.
pub const SUMMARY_MAX_CHARS: usize = 500;

// =============================================================================
// TIMEOUTS
// =============================================================================

/// Per-backend-call timeout applied by the dispatcher (seconds).
pub const CALL_TIMEOUT_SECS: u64 = 30;

/// HTTP client request timeout for catalog and geocoding backends (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Override for the CMR base URL.
pub const ENV_CMR_BASE_URL: &str = "GEODEX_CMR_URL";

/// Override for the default STAC catalog URL.
pub const ENV_STAC_CATALOG_URL: &str = "GEODEX_STAC_CATALOG_URL";

/// Override for the geocoding endpoint.
pub const ENV_GEOCODING_URL: &str = "GEODEX_GEOCODING_URL";

/// Geoapify API key.
pub const ENV_GEOCODING_API_KEY: &str = "GEOCODING_API_KEY";

/// Earthdata Login username.
pub const ENV_EARTHDATA_USERNAME: &str = "EARTHDATA_USERNAME";

/// Earthdata Login password.
pub const ENV_EARTHDATA_PASSWORD: &str = "EARTHDATA_PASSWORD";

/// Pre-issued Earthdata Login bearer token (skips the login round-trip).
pub const ENV_EARTHDATA_TOKEN: &str = "EARTHDATA_TOKEN";

/// Override for the per-call dispatch timeout (seconds).
pub const ENV_CALL_TIMEOUT_SECS: &str = "GEODEX_CALL_TIMEOUT_SECS";
