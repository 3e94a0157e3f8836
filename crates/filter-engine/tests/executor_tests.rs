use std::cell::RefCell;
use std::rc::Rc;

use filter_engine::executor::{results_url, Navigator};
use filter_engine::{ExecutorError, SearchExecutor};
use market_common::query::{build_query, CanonicalQuery};
use market_common::types::{FacetValue, FilterState};

#[derive(Default)]
struct RecordingNavigator {
    visited: RefCell<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited.borrow_mut().push(url.to_string());
    }
}

fn selection() -> FilterState {
    FilterState::new()
        .with("brand", FacetValue::set(["Audi", "BMW"]))
        .with("priceTo", FacetValue::Number(25_000))
}

#[test]
fn callback_receives_canonical_query() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let executor = SearchExecutor::builder()
        .on_search(move |q| sink.borrow_mut().push(q.clone()))
        .build()
        .unwrap();

    let query = executor.execute(&selection());
    assert_eq!(query, build_query(&selection()));
    assert_eq!(*seen.borrow(), vec![query]);
}

#[test]
fn navigation_builds_results_url() {
    let navigator = Rc::new(RecordingNavigator::default());
    let executor = SearchExecutor::builder()
        .navigate_to("/search", navigator.clone())
        .build()
        .unwrap();

    executor.execute(&selection());
    executor.execute(&FilterState::new());
    assert_eq!(
        *navigator.visited.borrow(),
        vec![
            "/search?brand=Audi&brand=BMW&priceTo=25000".to_string(),
            "/search".to_string(),
        ]
    );
}

#[test]
fn builder_needs_exactly_one_target() {
    assert_eq!(
        SearchExecutor::builder().build().err(),
        Some(ExecutorError::NoTarget)
    );
    let both = SearchExecutor::builder()
        .on_search(|_| {})
        .navigate_to("/search", Rc::new(RecordingNavigator::default()))
        .build();
    assert_eq!(both.err(), Some(ExecutorError::ConflictingTargets));
}

#[test]
fn results_url_appends_to_existing_query() {
    let query = CanonicalQuery::from_pairs([("brand", "Kia")]);
    assert_eq!(results_url("/search?lang=ru", &query), "/search?lang=ru&brand=Kia");
    assert_eq!(results_url("/search", &CanonicalQuery::new()), "/search");
}
