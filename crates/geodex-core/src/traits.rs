//! Trait seams shared across geodex crates.
//!
//! The extractor's relative-date keywords depend on "today", so the clock is
//! injectable; geocoding is a network collaborator, so it sits behind an
//! async trait that tests can stub.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::Result;
use crate::models::{BoundingBox, StructuredQuery};

/// Source of "today" for relative-date keyword resolution.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation (UTC).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Fixed-date clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Forward geocoding: place name → bounding box.
///
/// `Ok(None)` means the service answered but found nothing; errors are
/// network or protocol failures. Callers treat both as "no bbox".
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode_bbox(&self, location: &str) -> Result<Option<BoundingBox>>;
}

/// Extension point for correcting an extracted bounding box before dispatch
/// (e.g. an external model that refines geocoded extents).
#[async_trait]
pub trait BboxCorrector: Send + Sync {
    async fn correct(&self, bbox: BoundingBox, params: &StructuredQuery) -> Result<BoundingBox>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_returns_fixed_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
        let clock = FixedClock(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_system_clock_is_current() {
        let today = SystemClock.today();
        let now = Utc::now().date_naive();
        // Tolerate a midnight rollover between the two calls.
        assert!((today - now).num_days().abs() <= 1);
    }
}
