mod common;

use std::sync::Arc;

use catalog_core::error::{Error, TransportErrorKind};
use catalog_core::types::{
    EngineHit, EngineSearchResponse, MappingMode, SearchFilters, SearchQuery,
};
use catalog_service::QueryFacade;
use common::{stored_hit, FakeEngine};
use serde_json::{json, Map, Value};

fn facade(engine: &Arc<FakeEngine>) -> QueryFacade {
    QueryFacade::new(engine.clone(), "products", MappingMode::FixedSchema)
}

#[tokio::test]
async fn blank_query_becomes_wildcard_without_filter() {
    let engine = Arc::new(FakeEngine::default());
    let query = SearchQuery {
        text: Some("  ".into()),
        ..SearchQuery::default()
    };

    facade(&engine).search(&query).await.expect("search");

    let sent = &engine.searches()[0];
    assert_eq!(sent.q, "*");
    assert_eq!(sent.query_by, "*");
    assert_eq!(sent.sort_by, "rank:asc");
    assert_eq!((sent.page, sent.per_page), (1, 12));
    assert_eq!(sent.filter_by, None);
    assert_eq!(sent.facet_by, None);
}

#[tokio::test]
async fn filters_and_facets_are_forwarded() {
    let engine = Arc::new(FakeEngine::default());
    let query = SearchQuery {
        text: Some("shirt".into()),
        page: 3,
        page_size: 5,
        filters: SearchFilters {
            collections: vec!["summer".into()],
            price_min: Some(10.0),
            ..SearchFilters::default()
        },
        facet_fields: vec!["collections".into(), "tags".into(), "price".into()],
    };

    facade(&engine).search(&query).await.expect("search");

    let sent = &engine.searches()[0];
    assert_eq!(sent.q, "shirt");
    assert_eq!((sent.page, sent.per_page), (3, 5));
    assert_eq!(
        sent.filter_by.as_deref(),
        Some("collections:=[`summer`] && price:>=10")
    );
    assert_eq!(sent.facet_by.as_deref(), Some("collections,tags,price"));
}

#[tokio::test]
async fn hits_decode_back_to_original_records() {
    let engine = Arc::new(FakeEngine::default());
    let first = json!({"_id": {"$oid": "a"}, "title": "Crème", "variants": [{"title": "x"}]});
    let second = json!({"_id": {"$oid": "b"}, "title": "Hat"});
    let facets = vec![json!({"field_name": "tags", "counts": [{"value": "new", "count": 2}]})];
    engine.answer_with(EngineSearchResponse {
        found: 25,
        hits: vec![stored_hit(&first), stored_hit(&second)],
        facet_counts: facets.clone(),
    });

    let query = SearchQuery {
        page: 2,
        page_size: 10,
        ..SearchQuery::default()
    };
    let result = facade(&engine).search(&query).await.expect("search");

    assert_eq!(result.documents, vec![first, second]);
    assert_eq!(result.total, 25);
    assert!(result.has_more);
    assert_eq!(result.facets, facets);
}

#[tokio::test]
async fn last_page_has_no_more() {
    let engine = Arc::new(FakeEngine::default());
    engine.answer_with(EngineSearchResponse {
        found: 15,
        hits: vec![],
        facet_counts: vec![],
    });

    let query = SearchQuery {
        page: 2,
        page_size: 10,
        ..SearchQuery::default()
    };
    let result = facade(&engine).search(&query).await.expect("search");

    assert!(!result.has_more);
    assert_eq!(result.total, 15);
}

#[tokio::test]
async fn passthrough_mode_returns_stored_documents() {
    let engine = Arc::new(FakeEngine::default());
    let mut document = Map::new();
    document.insert("id".into(), json!("a"));
    document.insert("title".into(), json!("Hat"));
    engine.answer_with(EngineSearchResponse {
        found: 1,
        hits: vec![EngineHit {
            document: document.clone(),
        }],
        facet_counts: vec![],
    });

    let facade = QueryFacade::new(
        engine.clone(),
        "products",
        MappingMode::PassthroughMinimal,
    );
    let result = facade.search(&SearchQuery::default()).await.expect("search");

    assert_eq!(result.documents, vec![Value::Object(document)]);
}

#[tokio::test]
async fn backtick_filter_fails_before_reaching_engine() {
    let engine = Arc::new(FakeEngine::default());
    let query = SearchQuery {
        filters: SearchFilters {
            tags: vec!["a`b".into()],
            ..SearchFilters::default()
        },
        ..SearchQuery::default()
    };

    let err = facade(&engine).search(&query).await.unwrap_err();

    assert!(matches!(err, Error::InvalidQuery(_)));
    assert!(engine.searches().is_empty());
}

#[tokio::test]
async fn transport_errors_surface_without_retry() {
    let engine = Arc::new(FakeEngine::default());
    engine.go_down(TransportErrorKind::Unreachable);

    let err = facade(&engine)
        .search(&SearchQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(ref e) if e.kind == TransportErrorKind::Unreachable));
    assert!(engine.searches().is_empty());
}
