use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which backend endpoint feeds the count aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountEndpoint {
    /// Per-facet counts plus total (`filter-counts`).
    #[default]
    #[serde(rename = "filter-counts")]
    FilterCounts,
    /// Brand and model counts plus total (`search-stats`).
    #[serde(rename = "search-stats")]
    SearchStats,
    /// Total only (`search/count`).
    #[serde(rename = "search/count")]
    SearchCount,
}

impl CountEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            CountEndpoint::FilterCounts => "filter-counts",
            CountEndpoint::SearchStats => "search-stats",
            CountEndpoint::SearchCount => "search/count",
        }
    }

    /// Debounce window the storefront historically used for this endpoint.
    pub fn default_debounce(self) -> Duration {
        match self {
            CountEndpoint::FilterCounts | CountEndpoint::SearchStats => Duration::from_millis(300),
            CountEndpoint::SearchCount => Duration::from_millis(800),
        }
    }
}

/// Engine settings. Every field has a default so partial TOML files work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the marketplace API (`https://host/api`).
    pub api_base: String,
    /// Prefix for persisted catalog cache keys.
    pub cache_namespace: String,
    pub cache_ttl_secs: u64,
    /// Overrides the endpoint's default debounce window.
    pub count_debounce_ms: Option<u64>,
    pub request_timeout_ms: u64,
    pub count_endpoint: CountEndpoint,
    /// Results page used by standalone-mode search execution.
    pub results_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".into(),
            cache_namespace: "car_market_catalog".into(),
            cache_ttl_secs: 24 * 60 * 60,
            count_debounce_ms: None,
            request_timeout_ms: 8_000,
            count_endpoint: CountEndpoint::default(),
            results_path: "/search".into(),
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn count_debounce(&self) -> Duration {
        self.count_debounce_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.count_endpoint.default_debounce())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
