#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use filter_engine::catalog::{CatalogBackend, CatalogCache, CatalogKey, CatalogResolver};
use filter_engine::counts::CountSource;
use filter_engine::http::Transport;
use filter_engine::{FetchError, ManualClock, MemoryStore};
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use market_common::query::CanonicalQuery;
use market_common::types::CountSnapshot;

pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const TIMEOUT: Duration = Duration::from_secs(8);

type Reply<T> = oneshot::Sender<Result<T, FetchError>>;

fn await_reply<T: 'static>(rx: oneshot::Receiver<Result<T, FetchError>>) -> LocalBoxFuture<'static, Result<T, FetchError>> {
    async move {
        rx.await
            .unwrap_or_else(|_| Err(FetchError::Transport("request dropped".into())))
    }
    .boxed_local()
}

/// Catalog service double. Answers from a table, or holds requests until
/// [`FakeBackend::release`] when `hold` is set.
#[derive(Default)]
pub struct FakeBackend {
    answers: RefCell<HashMap<CatalogKey, Vec<String>>>,
    calls: RefCell<Vec<CatalogKey>>,
    held: RefCell<Vec<(CatalogKey, Reply<Vec<String>>)>>,
    pub hold: Cell<bool>,
    pub offline: Cell<bool>,
}

impl FakeBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn offline() -> Rc<Self> {
        let backend = Self::new();
        backend.offline.set(true);
        backend
    }

    pub fn answer(&self, key: CatalogKey, options: &[&str]) {
        self.answers
            .borrow_mut()
            .insert(key, options.iter().map(|s| s.to_string()).collect());
    }

    pub fn calls(&self) -> Vec<CatalogKey> {
        self.calls.borrow().clone()
    }

    fn reply(&self, key: &CatalogKey) -> Result<Vec<String>, FetchError> {
        if self.offline.get() {
            return Err(FetchError::Transport("offline".into()));
        }
        self.answers
            .borrow()
            .get(key)
            .cloned()
            .ok_or(FetchError::Status {
                status: 404,
                path: key.path().to_string(),
            })
    }

    /// Answer every held request.
    pub fn release(&self) {
        let held: Vec<_> = self.held.borrow_mut().drain(..).collect();
        for (key, tx) in held {
            let _ = tx.send(self.reply(&key));
        }
    }
}

impl CatalogBackend for FakeBackend {
    fn fetch(&self, key: &CatalogKey) -> LocalBoxFuture<'static, Result<Vec<String>, FetchError>> {
        self.calls.borrow_mut().push(key.clone());
        if self.hold.get() {
            let (tx, rx) = oneshot::channel();
            self.held.borrow_mut().push((key.clone(), tx));
            return await_reply(rx);
        }
        future::ready(self.reply(key)).boxed_local()
    }
}

/// Count service double. Every request waits until the test answers it.
#[derive(Default)]
pub struct FakeCounts {
    queries: RefCell<Vec<CanonicalQuery>>,
    pending: RefCell<Vec<Option<Reply<CountSnapshot>>>>,
}

impl FakeCounts {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn queries(&self) -> Vec<CanonicalQuery> {
        self.queries.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.queries.borrow().len()
    }

    /// Answer request `index` (0-based, in issue order).
    pub fn respond(&self, index: usize, result: Result<CountSnapshot, FetchError>) {
        let tx = self.pending.borrow_mut()[index].take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
    }
}

impl CountSource for FakeCounts {
    fn fetch_counts(
        &self,
        query: &CanonicalQuery,
    ) -> LocalBoxFuture<'static, Result<CountSnapshot, FetchError>> {
        self.queries.borrow_mut().push(query.clone());
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(Some(tx));
        await_reply(rx)
    }
}

/// Transport double keyed by path.
#[derive(Default)]
pub struct FakeTransport {
    bodies: RefCell<HashMap<String, Result<String, FetchError>>>,
    requests: RefCell<Vec<(String, CanonicalQuery)>>,
}

impl FakeTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn reply(&self, path: &str, body: Result<&str, FetchError>) {
        self.bodies
            .borrow_mut()
            .insert(path.to_string(), body.map(str::to_string));
    }

    pub fn requests(&self) -> Vec<(String, CanonicalQuery)> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, path: &str, query: &CanonicalQuery) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self.requests
            .borrow_mut()
            .push((path.to_string(), query.clone()));
        let body = self.bodies.borrow().get(path).cloned().unwrap_or(Err(FetchError::Status {
            status: 404,
            path: path.to_string(),
        }));
        future::ready(body).boxed_local()
    }
}

pub struct Harness {
    pub clock: Rc<ManualClock>,
    pub store: Rc<MemoryStore>,
    pub cache: Rc<CatalogCache>,
    pub backend: Rc<FakeBackend>,
    pub resolver: CatalogResolver,
}

pub fn harness(backend: Rc<FakeBackend>) -> Harness {
    let clock = Rc::new(ManualClock::default());
    let store = Rc::new(MemoryStore::new());
    let cache = Rc::new(CatalogCache::new(
        store.clone(),
        clock.clone(),
        "test_catalog",
        TTL,
    ));
    let resolver = CatalogResolver::standard(backend.clone(), cache.clone(), clock.clone(), TIMEOUT);
    Harness {
        clock,
        store,
        cache,
        backend,
        resolver,
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
