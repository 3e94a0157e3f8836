use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use market_common::query::CanonicalQuery;
use market_common::static_catalog::{self, FacetCatalog};

use super::cache::CatalogCache;
use crate::clock::{with_timeout, Clock};
use crate::error::FetchError;

/// Identity of one option-list lookup. Each variant is its own namespace for
/// caching and in-flight de-duplication.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    Brands,
    Models { brand: String },
    Generations { brand: String, model: String },
}

impl CatalogKey {
    pub fn models(brand: &str) -> Self {
        CatalogKey::Models {
            brand: brand.to_string(),
        }
    }

    pub fn generations(brand: &str, model: &str) -> Self {
        CatalogKey::Generations {
            brand: brand.to_string(),
            model: model.to_string(),
        }
    }

    /// Backend path for this lookup.
    pub fn path(&self) -> &'static str {
        match self {
            CatalogKey::Brands => "brands",
            CatalogKey::Models { .. } => "models",
            CatalogKey::Generations { .. } => "generations",
        }
    }

    pub fn query(&self) -> CanonicalQuery {
        match self {
            CatalogKey::Brands => CanonicalQuery::new(),
            CatalogKey::Models { brand } => CanonicalQuery::from_pairs([("brand", brand.as_str())]),
            CatalogKey::Generations { brand, model } => {
                CanonicalQuery::from_pairs([("brand", brand.as_str()), ("model", model.as_str())])
            }
        }
    }

    /// Key shared by every tier: `brands`, `models:B`, `generations:B|M`.
    pub fn cache_key(&self) -> String {
        match self {
            CatalogKey::Brands => "brands".to_string(),
            CatalogKey::Models { brand } => format!("models:{brand}"),
            CatalogKey::Generations { brand, model } => format!("generations:{brand}|{model}"),
        }
    }

    /// Whether results are sorted (brands, models) or kept in source order.
    pub fn sorted(&self) -> bool {
        !matches!(self, CatalogKey::Generations { .. })
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    /// Live catalog service. Successful answers are written through to the cache.
    Remote,
    Cache,
    Static,
}

/// One tier of the fallback chain. `None` means "nothing here, ask the next".
pub trait CatalogSource {
    fn tier(&self) -> Tier;
    fn lookup(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Option<Vec<String>>>;
}

/// Raw catalog service client.
pub trait CatalogBackend {
    fn fetch(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Result<Vec<String>, FetchError>>;
}

/// Remote tier: a backend call bounded by the request timeout.
pub struct RemoteSource {
    backend: Rc<dyn CatalogBackend>,
    clock: Rc<dyn Clock>,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(backend: Rc<dyn CatalogBackend>, clock: Rc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            backend,
            clock,
            timeout,
        }
    }
}

impl CatalogSource for RemoteSource {
    fn tier(&self) -> Tier {
        Tier::Remote
    }

    fn lookup(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Option<Vec<String>>> {
        let request = with_timeout(&*self.clock, self.timeout, self.backend.fetch(key));
        let key = key.clone();
        async move {
            match request.await {
                Ok(options) => Some(options),
                Err(e) => {
                    tracing::warn!("Catalog fetch for {} failed, falling back: {}", key, e);
                    None
                }
            }
        }
        .boxed_local()
    }
}

/// Persisted-cache tier.
pub struct CacheSource {
    cache: Rc<CatalogCache>,
}

impl CacheSource {
    pub fn new(cache: Rc<CatalogCache>) -> Self {
        Self { cache }
    }
}

impl CatalogSource for CacheSource {
    fn tier(&self) -> Tier {
        Tier::Cache
    }

    fn lookup(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Option<Vec<String>>> {
        future::ready(self.cache.get::<Vec<String>>(&key.cache_key())).boxed_local()
    }
}

/// Embedded dataset tier. Always answers; may be incomplete.
pub struct StaticSource {
    catalog: &'static FacetCatalog,
}

impl StaticSource {
    pub fn new(catalog: &'static FacetCatalog) -> Self {
        Self { catalog }
    }

    /// The catalog bundled with `market-common`.
    pub fn embedded() -> Self {
        Self::new(static_catalog::embedded())
    }
}

impl CatalogSource for StaticSource {
    fn tier(&self) -> Tier {
        Tier::Static
    }

    fn lookup(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Option<Vec<String>>> {
        let options = match key {
            CatalogKey::Brands => Some(self.catalog.brands()),
            CatalogKey::Models { brand } => self.catalog.models(brand),
            CatalogKey::Generations { brand, model } => self.catalog.generations(brand, model),
        };
        future::ready(options).boxed_local()
    }
}
