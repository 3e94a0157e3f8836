//! Hands a settled selection to whoever shows results.
//!
//! Embedded mode calls a callback with the canonical query; standalone mode
//! builds the results URL and asks a [`Navigator`] to go there. This is the
//! only place allowed to navigate.

use std::rc::Rc;

use market_common::query::{build_query, CanonicalQuery};
use market_common::types::FilterState;

use crate::error::ExecutorError;

/// Page transition, e.g. `window.location.assign`.
pub trait Navigator {
    fn navigate(&self, url: &str);
}

type SearchCallback = Rc<dyn Fn(&CanonicalQuery)>;

enum Target {
    Callback(SearchCallback),
    Navigate {
        results_path: String,
        navigator: Rc<dyn Navigator>,
    },
}

pub struct SearchExecutor {
    target: Target,
}

/// Collects exactly one execution target.
#[derive(Default)]
pub struct SearchExecutorBuilder {
    callback: Option<SearchCallback>,
    navigate: Option<(String, Rc<dyn Navigator>)>,
}

impl SearchExecutorBuilder {
    pub fn on_search(mut self, callback: impl Fn(&CanonicalQuery) + 'static) -> Self {
        self.callback = Some(Rc::new(callback));
        self
    }

    pub fn navigate_to(mut self, results_path: impl Into<String>, navigator: Rc<dyn Navigator>) -> Self {
        self.navigate = Some((results_path.into(), navigator));
        self
    }

    pub fn build(self) -> Result<SearchExecutor, ExecutorError> {
        let target = match (self.callback, self.navigate) {
            (Some(callback), None) => Target::Callback(callback),
            (None, Some((results_path, navigator))) => Target::Navigate {
                results_path,
                navigator,
            },
            (Some(_), Some(_)) => return Err(ExecutorError::ConflictingTargets),
            (None, None) => return Err(ExecutorError::NoTarget),
        };
        Ok(SearchExecutor { target })
    }
}

impl SearchExecutor {
    pub fn builder() -> SearchExecutorBuilder {
        SearchExecutorBuilder::default()
    }

    pub fn build_query(&self, state: &FilterState) -> CanonicalQuery {
        build_query(state)
    }

    /// Run the search for `state`. Returns the query that was handed off.
    pub fn execute(&self, state: &FilterState) -> CanonicalQuery {
        let query = build_query(state);
        match &self.target {
            Target::Callback(callback) => {
                tracing::debug!("Handing search to embedded callback ({} params)", query.pairs().len());
                callback(&query);
            }
            Target::Navigate {
                results_path,
                navigator,
            } => {
                let url = results_url(results_path, &query);
                tracing::info!("Navigating to {}", url);
                navigator.navigate(&url);
            }
        }
        query
    }
}

/// `results_path` with the query appended, minimal when nothing is selected.
pub fn results_url(results_path: &str, query: &CanonicalQuery) -> String {
    if query.is_empty() {
        return results_path.to_string();
    }
    let separator = if results_path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", results_path, separator, query.to_query_string())
}
