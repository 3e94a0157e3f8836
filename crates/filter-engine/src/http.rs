//! Backend adapters over a host-provided GET transport.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use market_common::query::CanonicalQuery;
use market_common::types::{
    CountSnapshot, FilterCountsResponse, SearchCountResponse, SearchStatsResponse,
};
use serde::de::DeserializeOwned;

use crate::catalog::{CatalogBackend, CatalogKey};
use crate::config::CountEndpoint;
use crate::counts::CountSource;
use crate::error::FetchError;

/// `GET <path>?<query>` returning the response body.
pub trait Transport {
    fn get(&self, path: &str, query: &CanonicalQuery) -> LocalBoxFuture<'static, Result<String, FetchError>>;
}

/// Join an API base and a relative path with exactly one slash.
pub fn endpoint_url(base: &str, path: &str, query: &CanonicalQuery) -> String {
    let mut url = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.to_query_string());
    }
    url
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Catalog service client: `brands`, `models`, `generations`.
pub struct HttpCatalog {
    transport: Rc<dyn Transport>,
}

impl HttpCatalog {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self { transport }
    }
}

impl CatalogBackend for HttpCatalog {
    fn fetch(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Result<Vec<String>, FetchError>> {
        let path = key.path();
        let request = self.transport.get(path, &key.query());
        async move {
            let body = request.await?;
            decode::<Vec<String>>(path, &body)
        }
        .boxed_local()
    }
}

/// Count client for one of the three count endpoints.
pub struct HttpCounts {
    transport: Rc<dyn Transport>,
    endpoint: CountEndpoint,
}

impl HttpCounts {
    pub fn new(transport: Rc<dyn Transport>, endpoint: CountEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }
}

impl CountSource for HttpCounts {
    fn fetch_counts(
        &self,
        query: &CanonicalQuery,
    ) -> LocalBoxFuture<'static, Result<CountSnapshot, FetchError>> {
        let endpoint = self.endpoint;
        let path = endpoint.path();
        let request = self.transport.get(path, query);
        async move {
            let body = request.await?;
            let snapshot = match endpoint {
                CountEndpoint::FilterCounts => decode::<FilterCountsResponse>(path, &body)?.into(),
                CountEndpoint::SearchStats => decode::<SearchStatsResponse>(path, &body)?.into(),
                CountEndpoint::SearchCount => decode::<SearchCountResponse>(path, &body)?.into(),
            };
            Ok(snapshot)
        }
        .boxed_local()
    }
}
