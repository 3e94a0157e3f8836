mod support;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use filter_engine::{EngineConfig, Host, ManualClock, MemoryStore, SearchEngine, SearchExecutor};
use futures::executor::{block_on, LocalPool};
use market_common::query::CanonicalQuery;
use support::FakeTransport;

#[test]
fn filter_changes_drive_count_requests() {
    let mut pool = LocalPool::new();
    let clock = Rc::new(ManualClock::default());
    let transport = FakeTransport::new();
    transport.reply("filter-counts", Ok(r#"{"filterCounts":{},"totalMatching":12}"#));
    let searched = Rc::new(RefCell::new(Vec::<CanonicalQuery>::new()));
    let sink = Rc::clone(&searched);
    let executor = SearchExecutor::builder()
        .on_search(move |q| sink.borrow_mut().push(q.clone()))
        .build()
        .unwrap();
    let host = Host {
        transport: transport.clone(),
        storage: Rc::new(MemoryStore::new()),
        clock: clock.clone(),
        spawner: Rc::new(pool.spawner()),
    };
    let config = EngineConfig::default();
    let engine = SearchEngine::new(&config, host, executor);

    clock.advance(Duration::from_millis(300));
    pool.run_until_stalled();
    assert_eq!(engine.counts.snapshot().total_matching, 12);

    block_on(engine.filters.set_value("brand", vec!["Audi"])).unwrap();
    block_on(engine.filters.set_value("model", vec!["A4"])).unwrap();
    clock.advance(Duration::from_millis(300));
    pool.run_until_stalled();

    let count_queries: Vec<CanonicalQuery> = transport
        .requests()
        .into_iter()
        .filter(|(path, _)| path == "filter-counts")
        .map(|(_, q)| q)
        .collect();
    assert_eq!(count_queries.len(), 2);
    assert_eq!(count_queries[1].to_query_string(), "brand=Audi&model=A4");

    let query = engine.search();
    assert_eq!(*searched.borrow(), vec![query]);
}

#[test]
fn config_picks_endpoint_debounce() {
    let config: EngineConfig = serde_json::from_str(r#"{"count_endpoint":"search/count"}"#).unwrap();
    assert_eq!(config.count_debounce(), Duration::from_millis(800));
    assert_eq!(config.request_timeout(), Duration::from_secs(8));

    let tuned = EngineConfig {
        count_debounce_ms: Some(150),
        ..EngineConfig::default()
    };
    assert_eq!(tuned.count_debounce(), Duration::from_millis(150));
}
