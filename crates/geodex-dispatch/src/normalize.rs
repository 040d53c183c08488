//! Normalization of provider-native records into [`DatasetSummary`].
//!
//! Each function maps exactly one record; the dispatcher isolates failures
//! per record (skip the bad one, keep the rest of the batch) rather than
//! letting one malformed record discard an adapter's whole batch.

use serde_json::Value;

use geodex_core::{
    truncate_summary, DatasetSummary, Error, Link, Result, DOI_UNAVAILABLE, SOURCE_NASA_CMR,
    SOURCE_STAC,
};

use crate::cmr::CmrCollection;
use crate::stac::StacCollection;

/// Map a CMR record into the common schema.
///
/// The concept id is the only hard requirement; everything else degrades to
/// an empty string or the `"Unavailable"` DOI sentinel.
pub fn normalize_cmr(record: &CmrCollection) -> Result<DatasetSummary> {
    let id = record
        .concept_id()
        .ok_or_else(|| Error::Normalization("CMR record has no concept id".to_string()))?
        .to_string();

    let doi = record
        .umm("DOI")
        .and_then(|v| v.get("DOI"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| DOI_UNAVAILABLE.to_string());

    let title = record
        .umm("EntryTitle")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let summary = truncate_summary(record.abstract_text().unwrap_or_default());

    // RelatedUrls entries need both a URL and a type tag; anything that does
    // not parse as a valid http/https URL is dropped.
    let links = record
        .umm("RelatedUrls")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    let url = entry.get("URL")?.as_str()?;
                    let rel = entry.get("Type")?.as_str()?;
                    Link::checked(url, rel)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(DatasetSummary {
        source: SOURCE_NASA_CMR.to_string(),
        id,
        doi: Some(doi),
        title,
        summary,
        links,
    })
}

/// Map a STAC collection record into the common schema.
pub fn normalize_stac(record: &StacCollection) -> Result<DatasetSummary> {
    if record.id.is_empty() {
        return Err(Error::Normalization(
            "STAC record has an empty id".to_string(),
        ));
    }

    let links = record
        .links
        .iter()
        .filter_map(|link| Link::checked(&link.href, &link.rel))
        .collect();

    Ok(DatasetSummary {
        source: SOURCE_STAC.to_string(),
        id: record.id.clone(),
        doi: None,
        title: record.title.clone().unwrap_or_default(),
        summary: truncate_summary(record.description.as_deref().unwrap_or_default()),
        links,
    })
}
