mod support;

use std::cell::RefCell;
use std::rc::Rc;

use filter_engine::catalog::CatalogKey;
use filter_engine::{FilterError, FilterInput, FilterStore};
use futures::executor::block_on;
use futures::FutureExt;
use market_common::types::{FacetValue, FilterState};
use support::{harness, FakeBackend};

/// Store over the embedded catalog plus a log of every published state.
fn offline_store() -> (FilterStore, Rc<RefCell<Vec<FilterState>>>) {
    let h = harness(FakeBackend::offline());
    let store = FilterStore::new(h.resolver);
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    store.subscribe(move |state| sink.borrow_mut().push(state.clone()));
    (store, log)
}

#[test]
fn deselecting_brand_prunes_its_models() {
    let (store, log) = offline_store();
    block_on(store.set_value("brand", vec!["Audi", "Volkswagen"])).unwrap();
    block_on(store.set_value("model", vec!["A4", "Golf"])).unwrap();
    assert_eq!(store.state().members("model").len(), 2);
    let before = log.borrow().len();

    block_on(store.toggle_value("brand", "Volkswagen")).unwrap();

    let state = store.state();
    assert_eq!(state.get("brand"), Some(&FacetValue::set(["Audi"])));
    assert_eq!(state.get("model"), Some(&FacetValue::set(["A4"])));
    assert_eq!(log.borrow().len(), before + 1, "one notification per mutation");
    assert_eq!(log.borrow().last(), Some(&state));
}

#[test]
fn generation_follows_its_model_out() {
    let (store, _) = offline_store();
    block_on(store.set_value("brand", "Audi")).unwrap();
    block_on(store.set_value("model", "A4")).unwrap();
    block_on(store.set_value("generation", vec!["B8", "Mk7"])).unwrap();
    assert_eq!(store.state().get("generation"), Some(&FacetValue::set(["B8"])));

    block_on(store.toggle_value("model", "A4")).unwrap();
    let state = store.state();
    assert!(!state.contains("model"));
    assert!(!state.contains("generation"));
}

#[test]
fn model_without_brand_is_dropped() {
    let (store, log) = offline_store();
    block_on(store.set_value("model", vec!["A4"])).unwrap();
    assert!(store.state().is_empty());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn reset_publishes_once() {
    let (store, log) = offline_store();
    block_on(store.set_value("brand", "Audi")).unwrap();
    block_on(store.set_value("model", "A4")).unwrap();
    block_on(store.set_value("priceTo", 20_000i64)).unwrap();
    block_on(store.set_value("customsCleared", true)).unwrap();
    log.borrow_mut().clear();

    store.reset();
    assert!(store.state().is_empty());
    assert_eq!(*log.borrow(), vec![FilterState::default()]);
}

#[test]
fn range_inputs_are_coerced() {
    let (store, log) = offline_store();
    block_on(store.set_value("priceFrom", -500i64)).unwrap();
    assert_eq!(store.state().number("priceFrom"), Some(0));

    block_on(store.set_value("priceFrom", "1 500 000")).unwrap();
    assert_eq!(store.state().number("priceFrom"), Some(1_500_000));

    block_on(store.set_value("priceTo", "25,000")).unwrap();
    assert_eq!(store.state().number("priceTo"), Some(25_000));
    block_on(store.set_value("priceTo", "12.500")).unwrap();
    assert_eq!(store.state().number("priceTo"), Some(12_500));

    log.borrow_mut().clear();
    block_on(store.set_value("priceFrom", "abc")).unwrap();
    assert_eq!(store.state().number("priceFrom"), Some(1_500_000));
    assert_eq!(log.borrow().len(), 1, "ignored input still publishes");

    block_on(store.set_value("priceFrom", "")).unwrap();
    assert!(!store.state().contains("priceFrom"));
}

#[test]
fn flags_and_clear() {
    let (store, _) = offline_store();
    block_on(store.set_value("withPhotos", true)).unwrap();
    block_on(store.set_value("exchangePossible", "false")).unwrap();
    assert_eq!(store.state().flag("withPhotos"), Some(true));
    assert_eq!(store.state().flag("exchangePossible"), Some(false));

    block_on(store.set_value("withPhotos", FilterInput::Clear)).unwrap();
    assert_eq!(store.state().flag("withPhotos"), None);
}

#[test]
fn kind_mismatches_are_rejected() {
    let (store, log) = offline_store();
    assert_eq!(
        block_on(store.toggle_value("priceFrom", "1")),
        Err(FilterError::KindMismatch {
            facet: "priceFrom".into(),
            operation: "toggle",
        })
    );
    assert!(matches!(
        block_on(store.set_value("city", vec!["Almaty"])),
        Err(FilterError::KindMismatch { .. })
    ));
    assert!(matches!(
        block_on(store.set_value("brand", 3i64)),
        Err(FilterError::KindMismatch { .. })
    ));
    assert!(log.borrow().is_empty(), "rejected mutations publish nothing");
}

#[test]
fn unknown_facet_is_rejected() {
    let (store, _) = offline_store();
    assert_eq!(
        block_on(store.set_value("wheels", "4")),
        Err(FilterError::UnknownFacet("wheels".into()))
    );
}

#[test]
fn alias_reaches_canonical_facet() {
    let (store, _) = offline_store();
    block_on(store.set_value("make", vec!["Audi"])).unwrap();
    assert!(store.state().has_member("brand", "Audi"));
}

#[test]
fn setting_the_same_value_twice_is_stable() {
    let (store, log) = offline_store();
    block_on(store.set_value("color", vec!["Red", "Black"])).unwrap();
    let once = store.state();
    block_on(store.set_value("color", vec!["Black", "Red"])).unwrap();
    assert_eq!(store.state(), once);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn query_string_restores_pruned_selection() {
    let (store, log) = offline_store();
    block_on(store.load_query_string(
        "?brand=Audi&model=A4&model=Golf&priceTo=30000&utm_source=mail",
    ));
    let state = store.state();
    assert_eq!(state.get("brand"), Some(&FacetValue::set(["Audi"])));
    assert_eq!(state.get("model"), Some(&FacetValue::set(["A4"])));
    assert_eq!(state.number("priceTo"), Some(30_000));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn unsubscribed_listener_stops_hearing() {
    let (store, log) = offline_store();
    let extra = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&extra);
    let id = store.subscribe(move |_| *counter.borrow_mut() += 1);
    block_on(store.set_value("color", "Red")).unwrap();
    store.unsubscribe(id);
    block_on(store.set_value("color", "Blue")).unwrap();
    assert_eq!(*extra.borrow(), 1);
    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn non_cascade_changes_skip_the_catalog() {
    let h = harness(FakeBackend::new());
    let backend = Rc::clone(&h.backend);
    let store = FilterStore::new(h.resolver);
    block_on(store.set_value("brand", "Audi")).unwrap();
    block_on(store.set_value("color", "Red")).unwrap();
    block_on(store.set_value("yearFrom", 2015i64)).unwrap();
    assert!(backend.calls().is_empty());
}

#[test]
fn slow_lookup_applies_to_latest_state() {
    let backend = FakeBackend::new();
    backend.answer(CatalogKey::models("Audi"), &["A4", "A6"]);
    let h = harness(backend);
    let backend = Rc::clone(&h.backend);
    let store = FilterStore::new(h.resolver);
    block_on(store.set_value("brand", "Audi")).unwrap();

    backend.hold.set(true);
    let mut pending = store.set_value("model", vec!["A4", "Golf"]).boxed_local();
    assert!((&mut pending).now_or_never().is_none());
    assert!(!store.state().contains("model"), "nothing published mid-lookup");

    block_on(store.set_value("color", "Red")).unwrap();
    backend.release();
    block_on(pending).unwrap();

    let state = store.state();
    assert_eq!(state.get("model"), Some(&FacetValue::set(["A4"])));
    assert!(state.has_member("color", "Red"));
}
