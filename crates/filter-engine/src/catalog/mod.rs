//! Brand → model → generation option lists.
//!
//! Every lookup walks an ordered list of [`CatalogSource`] tiers and stops at
//! the first one that yields a non-empty list. A remote answer is written
//! through to the cache before it is returned. Concurrent lookups for the same
//! key share a single walk. Failures are never surfaced: the worst case is an
//! empty list, which callers read as "no options".

pub mod cache;
pub mod source;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{LocalBoxFuture, Shared};
use futures::FutureExt;
use market_common::normalization::{sorted_options, unique_options};

use crate::clock::Clock;
pub use cache::CatalogCache;
pub use source::{
    CacheSource, CatalogBackend, CatalogKey, CatalogSource, RemoteSource, StaticSource, Tier,
};

type SharedLookup = Shared<LocalBoxFuture<'static, Vec<String>>>;

struct InFlight {
    id: u64,
    lookup: SharedLookup,
}

struct ResolverInner {
    sources: Vec<Rc<dyn CatalogSource>>,
    cache: Rc<CatalogCache>,
    in_flight: RefCell<HashMap<CatalogKey, InFlight>>,
    next_id: Cell<u64>,
}

/// Facet catalog resolver. Cheap to clone; clones share caches and in-flight
/// lookups.
#[derive(Clone)]
pub struct CatalogResolver {
    inner: Rc<ResolverInner>,
}

impl CatalogResolver {
    /// Resolver over an explicit tier order. `cache` receives write-through
    /// from every [`Tier::Remote`] source.
    pub fn new(sources: Vec<Rc<dyn CatalogSource>>, cache: Rc<CatalogCache>) -> Self {
        Self {
            inner: Rc::new(ResolverInner {
                sources,
                cache,
                in_flight: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// The storefront chain: remote service, persisted cache, embedded dataset.
    pub fn standard(
        backend: Rc<dyn CatalogBackend>,
        cache: Rc<CatalogCache>,
        clock: Rc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        let sources: Vec<Rc<dyn CatalogSource>> = vec![
            Rc::new(RemoteSource::new(backend, clock, timeout)),
            Rc::new(CacheSource::new(Rc::clone(&cache))),
            Rc::new(StaticSource::embedded()),
        ];
        Self::new(sources, cache)
    }

    pub fn list_brands(&self) -> impl Future<Output = Vec<String>> {
        self.resolve(CatalogKey::Brands)
    }

    pub fn list_models(&self, brand: &str) -> impl Future<Output = Vec<String>> {
        self.resolve(CatalogKey::models(brand))
    }

    pub fn list_generations(&self, brand: &str, model: &str) -> impl Future<Output = Vec<String>> {
        self.resolve(CatalogKey::generations(brand, model))
    }

    /// Lookup for `key`, joining an identical lookup already in flight.
    pub fn resolve(&self, key: CatalogKey) -> SharedLookup {
        if let Some(existing) = self.inner.in_flight.borrow().get(&key) {
            tracing::trace!("Joining in-flight catalog lookup for {}", key);
            return existing.lookup.clone();
        }

        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);

        let inner = Rc::clone(&self.inner);
        let lookup_key = key.clone();
        let lookup = async move {
            let options = inner.walk(&lookup_key).await;
            let mut in_flight = inner.in_flight.borrow_mut();
            if in_flight.get(&lookup_key).is_some_and(|f| f.id == id) {
                in_flight.remove(&lookup_key);
            }
            options
        }
        .boxed_local()
        .shared();

        self.inner.in_flight.borrow_mut().insert(
            key,
            InFlight {
                id,
                lookup: lookup.clone(),
            },
        );
        lookup
    }

    /// Number of distinct lookups currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.borrow().len()
    }

    /// Drop every persisted catalog entry.
    pub fn clear_cache(&self) -> usize {
        self.inner.cache.clear()
    }
}

impl ResolverInner {
    async fn walk(&self, key: &CatalogKey) -> Vec<String> {
        for source in &self.sources {
            let tier = source.tier();
            let Some(raw) = source.lookup(key).await else {
                tracing::debug!("{:?} tier had nothing for {}", tier, key);
                continue;
            };
            let options = if key.sorted() {
                sorted_options(raw)
            } else {
                unique_options(raw)
            };
            if options.is_empty() {
                tracing::debug!("{:?} tier returned an empty list for {}", tier, key);
                continue;
            }
            if tier == Tier::Remote {
                self.cache.put(&key.cache_key(), &options);
            }
            return options;
        }
        tracing::debug!("No catalog tier could answer {}", key);
        Vec::new()
    }
}
