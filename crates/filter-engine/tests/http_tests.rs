mod support;

use std::rc::Rc;

use filter_engine::catalog::{CatalogBackend, CatalogKey};
use filter_engine::counts::CountSource;
use filter_engine::http::{endpoint_url, HttpCatalog, HttpCounts};
use filter_engine::{CountEndpoint, FetchError};
use futures::executor::block_on;
use market_common::query::CanonicalQuery;
use support::{strings, FakeTransport};

#[test]
fn catalog_request_carries_parent_keys() {
    let transport = FakeTransport::new();
    transport.reply("generations", Ok(r#"["B8","B9"]"#));
    let catalog = HttpCatalog::new(transport.clone());

    let options = block_on(catalog.fetch(&CatalogKey::generations("Audi", "A4"))).unwrap();
    assert_eq!(options, strings(&["B8", "B9"]));
    assert_eq!(
        transport.requests(),
        vec![(
            "generations".to_string(),
            CanonicalQuery::from_pairs([("brand", "Audi"), ("model", "A4")])
        )]
    );
}

#[test]
fn malformed_catalog_body_is_a_decode_error() {
    let transport = FakeTransport::new();
    transport.reply("brands", Ok(r#"{"brands": []}"#));
    let catalog = HttpCatalog::new(transport);
    let err = block_on(catalog.fetch(&CatalogKey::Brands)).unwrap_err();
    assert!(matches!(err, FetchError::Decode { ref path, .. } if path == "brands"));
}

#[test]
fn filter_counts_resolve_aliases() {
    let transport = FakeTransport::new();
    transport.reply(
        "filter-counts",
        Ok(r#"{"filterCounts":{"make":{"Audi":4},"color":{"Red":2},"bogus":{"x":1}},"totalMatching":6}"#),
    );
    let counts = HttpCounts::new(transport, CountEndpoint::FilterCounts);
    let snapshot = block_on(counts.fetch_counts(&CanonicalQuery::new())).unwrap();
    assert_eq!(snapshot.total_matching, 6);
    assert_eq!(snapshot.count_for("brand", "Audi"), Some(4));
    assert_eq!(snapshot.count_for("color", "Red"), Some(2));
    assert!(snapshot.facet("bogus").is_none());
}

#[test]
fn search_stats_sum_models_across_brands() {
    let transport = FakeTransport::new();
    transport.reply(
        "search-stats",
        Ok(r#"{"totalCount":9,"brandCounts":{"Lexus":3,"Toyota":6},"modelCounts":{"Lexus":{"LX":3},"Toyota":{"Land Cruiser":4,"LX":2}}}"#),
    );
    let counts = HttpCounts::new(transport, CountEndpoint::SearchStats);
    let snapshot = block_on(counts.fetch_counts(&CanonicalQuery::new())).unwrap();
    assert_eq!(snapshot.total_matching, 9);
    assert_eq!(snapshot.count_for("brand", "Toyota"), Some(6));
    assert_eq!(snapshot.count_for("model", "LX"), Some(5));
}

#[test]
fn search_count_is_total_only() {
    let transport = FakeTransport::new();
    transport.reply("search/count", Ok(r#"{"count":128}"#));
    let counts = HttpCounts::new(transport, CountEndpoint::SearchCount);
    let snapshot = block_on(counts.fetch_counts(&CanonicalQuery::new())).unwrap();
    assert_eq!(snapshot.total_matching, 128);
    assert!(snapshot.facet_counts.is_empty());
}

#[test]
fn transport_errors_pass_through() {
    let transport: Rc<FakeTransport> = FakeTransport::new();
    let counts = HttpCounts::new(transport, CountEndpoint::FilterCounts);
    let err = block_on(counts.fetch_counts(&CanonicalQuery::new())).unwrap_err();
    assert_eq!(
        err,
        FetchError::Status {
            status: 404,
            path: "filter-counts".into()
        }
    );
}

#[test]
fn endpoint_urls_join_cleanly() {
    let query = CanonicalQuery::from_pairs([("brand", "Mercedes-Benz")]);
    assert_eq!(
        endpoint_url("https://cars.example/api/", "/models", &query),
        "https://cars.example/api/models?brand=Mercedes-Benz"
    );
    assert_eq!(
        endpoint_url("/api", "brands", &CanonicalQuery::new()),
        "/api/brands"
    );
}
