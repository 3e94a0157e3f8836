use std::rc::Rc;

use futures::task::LocalSpawn;

use crate::catalog::{CatalogCache, CatalogResolver};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::counts::CountAggregator;
use crate::executor::SearchExecutor;
use crate::filters::FilterStore;
use crate::http::{HttpCatalog, HttpCounts, Transport};
use crate::kv::KeyValueStore;

/// Environment services supplied by the embedding application.
pub struct Host {
    pub transport: Rc<dyn Transport>,
    pub storage: Rc<dyn KeyValueStore>,
    pub clock: Rc<dyn Clock>,
    pub spawner: Rc<dyn LocalSpawn>,
}

/// The four components wired together: store changes feed the aggregator.
pub struct SearchEngine {
    pub catalog: CatalogResolver,
    pub filters: FilterStore,
    pub counts: CountAggregator,
    pub executor: SearchExecutor,
}

impl SearchEngine {
    pub fn new(config: &EngineConfig, host: Host, executor: SearchExecutor) -> Self {
        let cache = Rc::new(CatalogCache::new(
            host.storage,
            Rc::clone(&host.clock),
            &config.cache_namespace,
            config.cache_ttl(),
        ));
        let catalog = CatalogResolver::standard(
            Rc::new(HttpCatalog::new(Rc::clone(&host.transport))),
            cache,
            Rc::clone(&host.clock),
            config.request_timeout(),
        );
        let counts = CountAggregator::new(
            Rc::new(HttpCounts::new(host.transport, config.count_endpoint)),
            host.clock,
            host.spawner,
            config.count_debounce(),
            config.request_timeout(),
        );
        let filters = FilterStore::new(catalog.clone());
        {
            let counts = counts.clone();
            filters.subscribe(move |state| counts.on_filter_state_changed(state));
        }
        counts.on_filter_state_changed(&filters.state());

        tracing::info!(
            "Search engine ready (counts via {}, debounce {:?})",
            config.count_endpoint.path(),
            config.count_debounce()
        );
        Self {
            catalog,
            filters,
            counts,
            executor,
        }
    }

    /// Execute a search for the current selection.
    pub fn search(&self) -> market_common::query::CanonicalQuery {
        self.executor.execute(&self.filters.state())
    }
}
