//! End-to-end pipeline tests: natural-language text through the extractor
//! into the dispatcher, with mock catalog backends.

use std::sync::Arc;

use chrono::NaiveDate;

use geodex_core::{FixedClock, SourceSelector, SOURCE_NASA_CMR, SOURCE_STAC};
use geodex_dispatch::mock::{cmr_record, stac_record, MockCollectionCatalog, MockMetadataIndex};
use geodex_dispatch::QueryDispatcher;
use geodex_extract::SpatiotemporalExtractor;

fn extractor() -> SpatiotemporalExtractor {
    SpatiotemporalExtractor::new().with_clock(Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
    )))
}

#[tokio::test]
async fn extracted_bbox_and_temporal_reach_the_backends() {
    let index = Arc::new(MockMetadataIndex::new());
    let catalog = Arc::new(MockCollectionCatalog::new());
    let dispatcher = QueryDispatcher::new(index.clone(), catalog.clone());

    let params = extractor()
        .extract_parameters("imagery bbox: [-124.4, 32.5, -114.1, 42.0] from 2020 to 2021")
        .await;

    dispatcher
        .dispatch_collection_query(
            &params,
            None,
            &["imagery".to_string()],
            10,
            SourceSelector::All,
        )
        .await
        .unwrap();

    let index_call = &index.calls()[0];
    assert_eq!(index_call.bbox.as_array(), [-124.4, 32.5, -114.1, 42.0]);
    assert_eq!(
        index_call.temporal,
        (
            Some("2020-01-01".to_string()),
            Some("2021-12-31".to_string())
        )
    );

    let catalog_call = &catalog.calls()[0];
    assert_eq!(
        catalog_call.datetime.as_deref(),
        Some("2020-01-01/2021-12-31")
    );
}

#[tokio::test]
async fn plain_text_query_dispatches_globally_with_split_keywords() {
    let index = Arc::new(
        MockMetadataIndex::new().with_records(vec![cmr_record("C1-PROV", "Soil Moisture")]),
    );
    let catalog = Arc::new(
        MockCollectionCatalog::new().with_records(vec![stac_record("s2", "Sentinel-2")]),
    );
    let dispatcher = QueryDispatcher::new(index.clone(), catalog.clone());

    let params = extractor().extract_parameters("soil moisture").await;
    let results = dispatcher
        .dispatch_collection_query(&params, None, &[], 10, SourceSelector::All)
        .await
        .unwrap();

    // Two keywords ("soil", "moisture") against both backends.
    assert_eq!(index.calls().len(), 2);
    assert_eq!(catalog.calls().len(), 2);
    assert_eq!(results.len(), 4);

    assert_eq!(results[0].source, SOURCE_NASA_CMR);
    assert_eq!(results[3].source, SOURCE_STAC);
    assert_eq!(
        index.calls()[0].bbox,
        geodex_core::BoundingBox::GLOBAL
    );
}
