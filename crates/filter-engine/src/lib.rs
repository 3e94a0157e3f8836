//! Cascading search-filter engine for the marketplace storefront.
//!
//! Four cooperating components share one single-threaded event loop:
//! the [`CatalogResolver`] answers brand → model → generation option lists
//! through an ordered remote / cache / embedded fallback chain, the
//! [`FilterStore`] owns the selection and prunes it when parents change, the
//! [`CountAggregator`] turns settled selections into debounced, supersedable
//! count requests, and the [`SearchExecutor`] hands the canonical query to a
//! callback or a navigator. Time and task spawning are supplied by the host so
//! the same code runs in the browser and under a deterministic test clock.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod counts;
pub mod engine;
pub mod error;
pub mod executor;
pub mod filters;
pub mod http;
pub mod kv;

pub use catalog::CatalogResolver;
pub use clock::{Clock, ManualClock};
pub use config::{CountEndpoint, EngineConfig};
pub use counts::CountAggregator;
pub use engine::{Host, SearchEngine};
pub use error::{ExecutorError, FetchError, FilterError};
pub use executor::SearchExecutor;
pub use filters::{FilterInput, FilterStore, SubscriptionId};
pub use kv::{KeyValueStore, MemoryStore};
