//! Query dispatch: per-keyword fan-out across catalog backends, record
//! normalization, and aggregation with per-source failure isolation.
//!
//! Every (keyword, adapter) pair is independent work and is issued
//! concurrently; `join_all` preserves the caller's keyword order and all
//! metadata-index results precede all catalog results, so the returned list
//! is deterministic regardless of completion order. A backend failure or
//! timeout degrades that one call to zero results; dispatch only errors for
//! caller-side input violations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};

use geodex_core::{
    defaults, AdapterKind, BboxCorrector, BoundingBox, DatasetSummary, Error, Result,
    SourceSelector, StructuredQuery,
};

use crate::backend::{CatalogQuery, CollectionCatalog, IndexQuery, MetadataIndex};
use crate::cmr::CmrBackend;
use crate::normalize::{normalize_cmr, normalize_stac};
use crate::session::EarthdataSession;
use crate::stac::StacBackend;

/// Dispatches structured queries to the enabled catalog adapters.
pub struct QueryDispatcher {
    index: Arc<dyn MetadataIndex>,
    catalog: Arc<dyn CollectionCatalog>,
    corrector: Option<Arc<dyn BboxCorrector>>,
    call_timeout: Duration,
}

impl QueryDispatcher {
    /// Create a dispatcher over explicit backends.
    pub fn new(index: Arc<dyn MetadataIndex>, catalog: Arc<dyn CollectionCatalog>) -> Self {
        Self {
            index,
            catalog,
            corrector: None,
            call_timeout: Duration::from_secs(defaults::CALL_TIMEOUT_SECS),
        }
    }

    /// Create with the real CMR and STAC backends, configured from the
    /// environment, sharing one Earthdata session.
    pub fn from_env() -> Self {
        let session = Arc::new(EarthdataSession::from_env());
        let call_timeout = std::env::var(defaults::ENV_CALL_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(defaults::CALL_TIMEOUT_SECS));

        Self {
            index: Arc::new(CmrBackend::from_env(session)),
            catalog: Arc::new(StacBackend::from_env()),
            corrector: None,
            call_timeout,
        }
    }

    /// Attach a bounding-box correction hook, applied to the resolved bbox
    /// before fan-out.
    pub fn with_bbox_corrector(mut self, corrector: Arc<dyn BboxCorrector>) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Override the per-backend-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Dispatch a structured query and aggregate normalized results.
    ///
    /// `bbox` overrides the extracted bounding box; when neither exists the
    /// search is global. Empty `keywords` falls back to splitting the
    /// original query text on whitespace. `max_results` caps each backend
    /// call.
    ///
    /// Errors only for input violations. Backend failures, timeouts, and
    /// per-record normalization failures are logged and degrade to fewer
    /// results. Dropping the returned future aborts in-flight backend calls.
    pub async fn dispatch_collection_query(
        &self,
        params: &StructuredQuery,
        bbox: Option<BoundingBox>,
        keywords: &[String],
        max_results: usize,
        source: SourceSelector,
    ) -> Result<Vec<DatasetSummary>> {
        if max_results == 0 || max_results > defaults::MAX_RESULTS_PER_SOURCE {
            return Err(Error::InvalidInput(format!(
                "max_results must be in 1..={}, got {max_results}",
                defaults::MAX_RESULTS_PER_SOURCE
            )));
        }

        let started = Instant::now();

        let keywords: Vec<String> = if keywords.is_empty() {
            params.query.split_whitespace().map(str::to_string).collect()
        } else {
            keywords.to_vec()
        };

        let bbox = self
            .resolve_bbox(bbox.or(params.bbox), params)
            .await
            .unwrap_or(BoundingBox::GLOBAL);

        let temporal_pair = params
            .temporal
            .map(|t| t.as_date_pair())
            .unwrap_or((None, None));
        let datetime = params.temporal.map(|t| t.to_interval());

        let index_futures = keywords
            .iter()
            .filter(|_| source.enables(AdapterKind::MetadataIndex))
            .map(|keyword| {
                self.index_call(IndexQuery {
                    keyword: keyword.clone(),
                    bbox,
                    temporal: temporal_pair.clone(),
                    count: max_results,
                })
            });
        let catalog_futures = keywords
            .iter()
            .filter(|_| source.enables(AdapterKind::CollectionCatalog))
            .map(|keyword| {
                self.catalog_call(CatalogQuery {
                    keyword: keyword.clone(),
                    bbox,
                    datetime: datetime.clone(),
                    limit: max_results,
                })
            });

        // join_all preserves keyword order within each group; index results
        // precede catalog results by construction.
        let (index_batches, catalog_batches) =
            tokio::join!(join_all(index_futures), join_all(catalog_futures));

        let mut results: Vec<DatasetSummary> = Vec::new();
        results.extend(index_batches.into_iter().flatten());
        results.extend(catalog_batches.into_iter().flatten());

        info!(
            subsystem = "dispatch",
            op = "dispatch_collection_query",
            source = %source,
            result_count = results.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "dispatch complete"
        );
        Ok(results)
    }

    /// Resolve the effective bounding box, applying the correction hook when
    /// one is attached. Hook failures keep the uncorrected bbox.
    async fn resolve_bbox(
        &self,
        bbox: Option<BoundingBox>,
        params: &StructuredQuery,
    ) -> Option<BoundingBox> {
        let bbox = bbox?;
        let Some(corrector) = self.corrector.as_ref() else {
            return Some(bbox);
        };
        match corrector.correct(bbox, params).await {
            Ok(corrected) => {
                if corrected != bbox {
                    debug!(
                        subsystem = "dispatch",
                        bbox = %corrected.to_param(),
                        "bbox correction applied"
                    );
                }
                Some(corrected)
            }
            Err(e) => {
                warn!(subsystem = "dispatch", error = %e, "bbox correction failed; keeping extracted bbox");
                Some(bbox)
            }
        }
    }

    /// One metadata-index call. Never fails: backend errors and timeouts
    /// degrade to an empty batch, normalization failures skip the record.
    async fn index_call(&self, query: IndexQuery) -> Vec<DatasetSummary> {
        let keyword = query.keyword.clone();
        match tokio::time::timeout(self.call_timeout, self.index.search_collections(&query)).await
        {
            Ok(Ok(records)) => {
                let mut out = Vec::with_capacity(records.len());
                for record in &records {
                    match normalize_cmr(record) {
                        Ok(summary) => out.push(summary),
                        Err(e) => {
                            warn!(subsystem = "cmr", keyword = %keyword, error = %e, "skipping malformed record");
                        }
                    }
                }
                out
            }
            Ok(Err(e)) => {
                warn!(subsystem = "cmr", keyword = %keyword, error = %e, "metadata index search failed");
                Vec::new()
            }
            Err(_) => {
                warn!(subsystem = "cmr", keyword = %keyword, "metadata index search timed out");
                Vec::new()
            }
        }
    }

    /// One collection-catalog call, with the same degradation contract as
    /// [`Self::index_call`].
    async fn catalog_call(&self, query: CatalogQuery) -> Vec<DatasetSummary> {
        let keyword = query.keyword.clone();
        match tokio::time::timeout(self.call_timeout, self.catalog.search_collections(&query)).await
        {
            Ok(Ok(records)) => {
                let mut out = Vec::with_capacity(records.len());
                for record in &records {
                    match normalize_stac(record) {
                        Ok(summary) => out.push(summary),
                        Err(e) => {
                            warn!(subsystem = "stac", keyword = %keyword, error = %e, "skipping malformed record");
                        }
                    }
                }
                out
            }
            Ok(Err(e)) => {
                warn!(subsystem = "stac", keyword = %keyword, error = %e, "catalog search failed");
                Vec::new()
            }
            Err(_) => {
                warn!(subsystem = "stac", keyword = %keyword, "catalog search timed out");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use geodex_core::{TemporalRange, SOURCE_NASA_CMR, SOURCE_STAC};

    use crate::cmr::CmrCollection;
    use crate::mock::{cmr_record, stac_record, MockCollectionCatalog, MockMetadataIndex};

    fn dispatcher(
        index: Arc<MockMetadataIndex>,
        catalog: Arc<MockCollectionCatalog>,
    ) -> QueryDispatcher {
        QueryDispatcher::new(index, catalog)
    }

    fn keyword(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[tokio::test]
    async fn test_rejects_zero_max_results() {
        let d = dispatcher(
            Arc::new(MockMetadataIndex::new()),
            Arc::new(MockCollectionCatalog::new()),
        );
        let err = d
            .dispatch_collection_query(
                &StructuredQuery::new("x"),
                None,
                &keyword("soil"),
                0,
                SourceSelector::All,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_rejects_excessive_max_results() {
        let d = dispatcher(
            Arc::new(MockMetadataIndex::new()),
            Arc::new(MockCollectionCatalog::new()),
        );
        let err = d
            .dispatch_collection_query(
                &StructuredQuery::new("x"),
                None,
                &keyword("soil"),
                defaults::MAX_RESULTS_PER_SOURCE + 1,
                SourceSelector::All,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_failed_index_does_not_block_catalog() {
        let index = Arc::new(MockMetadataIndex::new().failing("CMR unreachable"));
        let catalog = Arc::new(
            MockCollectionCatalog::new().with_records(vec![stac_record("s2", "Sentinel-2")]),
        );
        let d = dispatcher(index, catalog);

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("imagery"),
                None,
                &keyword("imagery"),
                10,
                SourceSelector::All,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.iter().all(|r| r.source == SOURCE_STAC));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_call_degrades_to_empty_batch() {
        // The index hangs past the deadline; the catalog answers instantly.
        let index = Arc::new(
            MockMetadataIndex::new()
                .with_records(vec![cmr_record("C1-PROV", "slow one")])
                .with_delay(Duration::from_secs(120)),
        );
        let catalog = Arc::new(
            MockCollectionCatalog::new().with_records(vec![stac_record("s1", "fast one")]),
        );
        let d = dispatcher(index, catalog).with_call_timeout(Duration::from_secs(1));

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("ice"),
                None,
                &keyword("ice"),
                10,
                SourceSelector::All,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results.iter().all(|r| r.source == SOURCE_STAC));
    }

    #[tokio::test]
    async fn test_failing_keyword_does_not_affect_other_keywords() {
        let index = Arc::new(
            MockMetadataIndex::new()
                .with_records(vec![cmr_record("C1-PROV", "one")])
                .failing_for_keyword("flood"),
        );
        let d = dispatcher(index.clone(), Arc::new(MockCollectionCatalog::new()));

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("flood drought"),
                None,
                &["flood".to_string(), "drought".to_string()],
                10,
                SourceSelector::Nasa,
            )
            .await
            .unwrap();

        // Both keywords were tried; only the healthy one contributed.
        assert_eq!(index.calls().len(), 2);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "C1-PROV");
    }

    #[tokio::test]
    async fn test_cmr_results_precede_stac_results() {
        let index = Arc::new(
            MockMetadataIndex::new().with_records(vec![cmr_record("C1-PROV", "CMR one")]),
        );
        let catalog = Arc::new(
            MockCollectionCatalog::new().with_records(vec![stac_record("s1", "STAC one")]),
        );
        let d = dispatcher(index, catalog);

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("water"),
                None,
                &["water".to_string(), "quality".to_string()],
                10,
                SourceSelector::All,
            )
            .await
            .unwrap();

        // Two keywords against each backend.
        assert_eq!(results.len(), 4);
        let first_stac = results
            .iter()
            .position(|r| r.source == SOURCE_STAC)
            .unwrap();
        assert!(results[..first_stac]
            .iter()
            .all(|r| r.source == SOURCE_NASA_CMR));
        assert!(results[first_stac..]
            .iter()
            .all(|r| r.source == SOURCE_STAC));
    }

    #[tokio::test]
    async fn test_empty_keywords_fall_back_to_query_split() {
        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(Arc::new(MockMetadataIndex::new()), catalog.clone());

        d.dispatch_collection_query(
            &StructuredQuery::new("soil moisture"),
            None,
            &[],
            10,
            SourceSelector::Stac,
        )
        .await
        .unwrap();

        let calls = catalog.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].keyword, "soil");
        assert_eq!(calls[1].keyword, "moisture");
    }

    #[tokio::test]
    async fn test_maap_and_esa_alias_to_catalog_only() {
        for source in [SourceSelector::Maap, SourceSelector::Esa] {
            let index = Arc::new(MockMetadataIndex::new());
            let catalog = Arc::new(MockCollectionCatalog::new());
            let d = dispatcher(index.clone(), catalog.clone());

            d.dispatch_collection_query(
                &StructuredQuery::new("biomass"),
                None,
                &keyword("biomass"),
                10,
                source,
            )
            .await
            .unwrap();

            assert!(index.calls().is_empty());
            assert_eq!(catalog.calls().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_nasa_routes_to_index_only() {
        let index = Arc::new(MockMetadataIndex::new());
        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(index.clone(), catalog.clone());

        d.dispatch_collection_query(
            &StructuredQuery::new("aerosol"),
            None,
            &keyword("aerosol"),
            10,
            SourceSelector::Nasa,
        )
        .await
        .unwrap();

        assert_eq!(index.calls().len(), 1);
        assert!(catalog.calls().is_empty());
    }

    #[tokio::test]
    async fn test_temporal_converted_per_adapter() {
        let index = Arc::new(MockMetadataIndex::new());
        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(index.clone(), catalog.clone());

        let mut params = StructuredQuery::new("fires in 2020");
        params.temporal = Some(TemporalRange::between(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        ));

        d.dispatch_collection_query(&params, None, &keyword("fires"), 10, SourceSelector::All)
            .await
            .unwrap();

        let index_call = &index.calls()[0];
        assert_eq!(
            index_call.temporal,
            (
                Some("2020-01-01".to_string()),
                Some("2020-12-31".to_string())
            )
        );
        let catalog_call = &catalog.calls()[0];
        assert_eq!(
            catalog_call.datetime.as_deref(),
            Some("2020-01-01/2020-12-31")
        );
    }

    #[tokio::test]
    async fn test_bbox_defaults_to_global() {
        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(Arc::new(MockMetadataIndex::new()), catalog.clone());

        d.dispatch_collection_query(
            &StructuredQuery::new("ice"),
            None,
            &keyword("ice"),
            10,
            SourceSelector::Stac,
        )
        .await
        .unwrap();

        assert_eq!(catalog.calls()[0].bbox, BoundingBox::GLOBAL);
    }

    #[tokio::test]
    async fn test_bbox_override_beats_extracted_bbox() {
        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(Arc::new(MockMetadataIndex::new()), catalog.clone());

        let mut params = StructuredQuery::new("ice");
        params.bbox = Some(BoundingBox::try_new(0.0, 0.0, 1.0, 1.0).unwrap());
        let override_bbox = BoundingBox::try_new(-10.0, -10.0, 10.0, 10.0).unwrap();

        d.dispatch_collection_query(
            &params,
            Some(override_bbox),
            &keyword("ice"),
            10,
            SourceSelector::Stac,
        )
        .await
        .unwrap();

        assert_eq!(catalog.calls()[0].bbox, override_bbox);
    }

    #[tokio::test]
    async fn test_malformed_record_is_skipped_not_fatal() {
        // Second record has no concept id and must not discard the batch.
        let index = Arc::new(MockMetadataIndex::new().with_records(vec![
            cmr_record("C1-PROV", "good one"),
            CmrCollection::default(),
            cmr_record("C2-PROV", "good two"),
        ]));
        let d = dispatcher(index, Arc::new(MockCollectionCatalog::new()));

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("soil"),
                None,
                &keyword("soil"),
                10,
                SourceSelector::Nasa,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "C1-PROV");
        assert_eq!(results[1].id, "C2-PROV");
    }

    #[tokio::test]
    async fn test_bbox_corrector_hook_applies() {
        struct ShiftCorrector;

        #[async_trait]
        impl BboxCorrector for ShiftCorrector {
            async fn correct(
                &self,
                _bbox: BoundingBox,
                _params: &StructuredQuery,
            ) -> geodex_core::Result<BoundingBox> {
                BoundingBox::try_new(5.0, 5.0, 6.0, 6.0)
            }
        }

        let catalog = Arc::new(MockCollectionCatalog::new());
        let d = dispatcher(Arc::new(MockMetadataIndex::new()), catalog.clone())
            .with_bbox_corrector(Arc::new(ShiftCorrector));

        let mut params = StructuredQuery::new("ice");
        params.bbox = Some(BoundingBox::try_new(0.0, 0.0, 1.0, 1.0).unwrap());

        d.dispatch_collection_query(&params, None, &keyword("ice"), 10, SourceSelector::Stac)
            .await
            .unwrap();

        assert_eq!(
            catalog.calls()[0].bbox,
            BoundingBox::try_new(5.0, 5.0, 6.0, 6.0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_result_cap_respected_per_call() {
        let index = Arc::new(MockMetadataIndex::new().with_records(vec![
            cmr_record("C1-PROV", "one"),
            cmr_record("C2-PROV", "two"),
            cmr_record("C3-PROV", "three"),
        ]));
        let d = dispatcher(index, Arc::new(MockCollectionCatalog::new()));

        let results = d
            .dispatch_collection_query(
                &StructuredQuery::new("soil"),
                None,
                &keyword("soil"),
                2,
                SourceSelector::Nasa,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
    }
}
