//! Temporal extraction: relative-keyword lexicon, explicit range patterns,
//! and the fuzzy calendar-date parser backing them.
//!
//! Two tiers, first hit wins:
//! 1. Relative keywords ("yesterday", "last week", ...) matched against the
//!    lowercased query, resolved against the injected [`Clock`].
//! 2. Explicit range patterns ("from X to Y", "since X", "in 2021", ...),
//!    tried in order; a date-parse failure skips the pattern rather than
//!    raising, so exhaustion means "no temporal information found".

use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use geodex_core::{Clock, TemporalRange};

/// Relative keyword → day offset from today. Matched in order against the
/// lowercased query; the resulting range is `[today + offset, today]`.
const TEMPORAL_KEYWORDS: &[(&str, i64)] = &[
    ("today", 0),
    ("yesterday", -1),
    ("last week", -7),
    ("last month", -30),
    ("last year", -365),
];

/// Which explicit range template a pattern implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeKind {
    /// `from X to Y` — two dates, or two bare years.
    FromTo,
    /// `between X and Y` — same semantics as `FromTo`.
    Between,
    /// `since X` — start date, end = today.
    Since,
    /// `after X` — same semantics as `Since`.
    After,
    /// `before X` — end date only.
    Before,
    /// `in <yyyy>` — the full calendar year.
    InYear,
    /// `during X` — single day (start == end).
    During,
}

static DATE_RANGE_PATTERNS: Lazy<Vec<(RangeKind, Regex)>> = Lazy::new(|| {
    let patterns = [
        (RangeKind::FromTo, r"from\s+([\w\s,\-:]+?)\s+to\s+([\w\s,\-:]+)"),
        (
            RangeKind::Between,
            r"between\s+([\w\s,\-:]+?)\s+and\s+([\w\s,\-:]+)",
        ),
        (RangeKind::Since, r"since\s+([\w\s,\-:]+)"),
        (RangeKind::After, r"after\s+([\w\s,\-:]+)"),
        (RangeKind::Before, r"before\s+([\w\s,\-:]+)"),
        (RangeKind::InYear, r"in\s+(\d{4})"),
        (RangeKind::During, r"during\s+([\w\s,\-:]+)"),
    ];
    patterns
        .into_iter()
        .map(|(kind, pattern)| {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("static date range pattern must compile");
            (kind, re)
        })
        .collect()
});

static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}$").expect("static year pattern must compile"));

/// Calendar-date formats tried in order by [`fuzzy_date`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn parse_exact(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // Month-year ("June 2020") resolves to the first of the month.
    let with_day = format!("1 {text}");
    for format in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_day, format) {
            return Some(date);
        }
    }

    if BARE_YEAR.is_match(text) {
        let year: i32 = text.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

/// Longest leading run of whitespace tokens that parses as a calendar date.
///
/// The range patterns capture greedily to the end of the query, so the
/// capture often carries trailing words past the date ("June 30, 2020 in
/// Texas"). Dropping trailing tokens until the remainder parses recovers
/// the embedded date the way a fuzzy parser would.
fn date_prefix(text: &str) -> Option<(&str, NaiveDate)> {
    let mut candidate = text.trim();
    while !candidate.is_empty() {
        if let Some(date) = parse_exact(candidate) {
            return Some((candidate, date));
        }
        let Some(idx) = candidate.rfind(char::is_whitespace) else {
            return None;
        };
        candidate = candidate[..idx].trim_end();
    }
    None
}

/// Parse free-ish text to a calendar date via an ordered format cascade.
///
/// Covers ISO, slashed, US, and month-name forms; a bare month-year resolves
/// to the first of the month and a bare year to January 1. Trailing words
/// after the date are ignored. Anything else is `None`, which callers treat
/// as "skip this pattern".
pub fn fuzzy_date(text: &str) -> Option<NaiveDate> {
    date_prefix(text).map(|(_, date)| date)
}

/// Extract a temporal range from a natural-language query.
///
/// Returns `None` when neither tier matches; never errors.
pub fn extract_temporal(query: &str, clock: &dyn Clock) -> Option<TemporalRange> {
    let query_lower = query.to_lowercase();

    for (keyword, days_offset) in TEMPORAL_KEYWORDS {
        if query_lower.contains(keyword) {
            let today = clock.today();
            let start = today + Duration::days(*days_offset);
            return Some(TemporalRange::between(start, today));
        }
    }

    for (kind, re) in DATE_RANGE_PATTERNS.iter() {
        let Some(caps) = re.captures(query) else {
            continue;
        };
        let range = match kind {
            RangeKind::FromTo | RangeKind::Between => {
                let start = caps.get(1).and_then(|m| date_prefix(m.as_str()));
                let end = caps.get(2).and_then(|m| date_prefix(m.as_str()));
                match (start, end) {
                    (Some((start_text, _)), Some((end_text, _)))
                        if BARE_YEAR.is_match(start_text) && BARE_YEAR.is_match(end_text) =>
                    {
                        // Two bare years span Jan 1 of the first through
                        // Dec 31 of the second.
                        let start = start_text
                            .parse::<i32>()
                            .ok()
                            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
                        let end = end_text
                            .parse::<i32>()
                            .ok()
                            .and_then(|y| NaiveDate::from_ymd_opt(y, 12, 31));
                        match (start, end) {
                            (Some(s), Some(e)) => Some(TemporalRange::between(s, e)),
                            _ => None,
                        }
                    }
                    (Some((_, s)), Some((_, e))) => Some(TemporalRange::between(s, e)),
                    _ => None,
                }
            }
            RangeKind::Since | RangeKind::After => caps
                .get(1)
                .and_then(|m| fuzzy_date(m.as_str()))
                .map(|start| TemporalRange::between(start, clock.today())),
            RangeKind::Before => caps
                .get(1)
                .and_then(|m| fuzzy_date(m.as_str()))
                .map(TemporalRange::ending),
            RangeKind::InYear => caps
                .get(1)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .and_then(TemporalRange::calendar_year),
            RangeKind::During => caps
                .get(1)
                .and_then(|m| fuzzy_date(m.as_str()))
                .map(TemporalRange::single_day),
        };
        if let Some(range) = range {
            return Some(range);
        }
        // Parse failure: fall through to the next pattern.
    }

    None
}
