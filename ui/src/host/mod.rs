//! Browser wiring for the filter engine.

pub mod browser;
pub mod fetch;
pub mod storage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use dioxus::core::spawn_forever;
use filter_engine::{EngineConfig, Host, SearchEngine, SearchExecutor};
use futures::future::join_all;
use market_common::schema::{BRAND, MODEL};
use market_common::types::FilterState;

use crate::state::{
    GenerationGroup, ModelGroup, BRAND_OPTIONS, COUNTS, COUNTS_REFRESHING, COUNT_WARNING,
    FILTER_STATE, GENERATION_OPTIONS, MODEL_OPTIONS,
};
use browser::{location_search, BrowserClock, LocationNavigator, RuntimeSpawner};
use fetch::FetchTransport;
use storage::LocalStorage;

thread_local! {
    static ENGINE: RefCell<Option<Rc<SearchEngine>>> = const { RefCell::new(None) };
    /// Bumped on every option refresh so a slow lookup cannot overwrite a newer one.
    static OPTIONS_EPOCH: Cell<u64> = const { Cell::new(0) };
}

/// The running engine, once [`init`] has run.
pub fn engine() -> Option<Rc<SearchEngine>> {
    ENGINE.with(|cell| cell.borrow().clone())
}

pub fn init() {
    if engine().is_some() {
        return;
    }
    let config = EngineConfig::default();
    let executor = match SearchExecutor::builder()
        .navigate_to(config.results_path.clone(), Rc::new(LocationNavigator))
        .build()
    {
        Ok(executor) => executor,
        Err(e) => {
            tracing::error!("Search executor misconfigured: {}", e);
            return;
        }
    };
    let host = Host {
        transport: Rc::new(FetchTransport::new(config.api_base.clone())),
        storage: Rc::new(LocalStorage),
        clock: Rc::new(BrowserClock),
        spawner: Rc::new(RuntimeSpawner),
    };
    let engine = Rc::new(SearchEngine::new(&config, host, executor));

    engine.filters.subscribe(|state| {
        *FILTER_STATE.write() = state.clone();
        *COUNTS_REFRESHING.write() = true;
        refresh_options(state);
    });
    {
        let counts = engine.counts.clone();
        engine.counts.subscribe(move |snapshot| {
            *COUNTS.write() = snapshot.clone();
            *COUNT_WARNING.write() = counts.warning();
            *COUNTS_REFRESHING.write() = counts.is_refreshing();
        });
    }
    ENGINE.with(|cell| *cell.borrow_mut() = Some(Rc::clone(&engine)));

    let catalog = engine.catalog.clone();
    spawn_forever(async move {
        *BRAND_OPTIONS.write() = catalog.list_brands().await;
    });

    let search = location_search();
    if !search.is_empty() {
        let filters = engine.filters.clone();
        spawn_forever(async move {
            filters.load_query_string(&search).await;
        });
    }
    tracing::info!("Storefront filters initialized");
}

/// Reload the model and generation option groups for `state`.
fn refresh_options(state: &FilterState) {
    let Some(engine) = engine() else {
        return;
    };
    let epoch = OPTIONS_EPOCH.with(|e| {
        e.set(e.get() + 1);
        e.get()
    });
    let brands = state.members(BRAND);
    let models = state.members(MODEL);
    let catalog = engine.catalog.clone();

    spawn_forever(async move {
        let model_groups = join_all(brands.iter().map(|brand| {
            let lookup = catalog.list_models(brand);
            async move {
                ModelGroup {
                    brand: brand.clone(),
                    models: lookup.await,
                }
            }
        }))
        .await;

        let pairs: Vec<(String, String)> = model_groups
            .iter()
            .flat_map(|group| {
                group
                    .models
                    .iter()
                    .filter(|m| models.contains(*m))
                    .map(|m| (group.brand.clone(), m.clone()))
            })
            .collect();
        let generation_groups = join_all(pairs.into_iter().map(|(brand, model)| {
            let lookup = catalog.list_generations(&brand, &model);
            async move {
                GenerationGroup {
                    generations: lookup.await,
                    brand,
                    model,
                }
            }
        }))
        .await;

        if OPTIONS_EPOCH.with(Cell::get) != epoch {
            return;
        }
        *MODEL_OPTIONS.write() = model_groups;
        *GENERATION_OPTIONS.write() = generation_groups
            .into_iter()
            .filter(|g| !g.generations.is_empty())
            .collect();
    });
}

/// Run `f` against the engine from an event handler.
pub fn with_engine(f: impl FnOnce(&SearchEngine)) {
    match engine() {
        Some(engine) => f(&engine),
        None => tracing::warn!("Filter engine not initialized yet"),
    }
}
