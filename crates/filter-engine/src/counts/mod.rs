//! Per-facet match counts and the grand total for the current selection.
//!
//! The aggregator remembers the latest published [`FilterState`] and, through
//! a [`DebouncedTask`], sends one request per settled burst of changes, built
//! from whatever state is current when the window elapses. Successful
//! responses replace the snapshot wholesale. Failures keep the previous
//! snapshot, mark it stale and leave a warning for the UI.

pub mod debounce;
pub mod local;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::task::LocalSpawn;
use futures::FutureExt;
use market_common::query::{build_query, CanonicalQuery};
use market_common::types::{CountSnapshot, FilterState};

use crate::clock::{with_timeout, Clock};
use crate::error::FetchError;
use crate::filters::SubscriptionId;
pub use debounce::{DebouncedTask, SequenceGuard};
pub use local::ListingIndex;

/// Anything that can count listings for a canonical query.
pub trait CountSource {
    fn fetch_counts(
        &self,
        query: &CanonicalQuery,
    ) -> LocalBoxFuture<'static, Result<CountSnapshot, FetchError>>;
}

type Subscriber = Rc<dyn Fn(&CountSnapshot)>;

struct AggregatorInner {
    source: Rc<dyn CountSource>,
    clock: Rc<dyn Clock>,
    timeout: Duration,
    task: DebouncedTask,
    latest: RefCell<FilterState>,
    snapshot: RefCell<CountSnapshot>,
    warning: RefCell<Option<String>>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_subscriber: Cell<u64>,
}

/// Count aggregator. Cheap to clone; clones share the snapshot.
#[derive(Clone)]
pub struct CountAggregator {
    inner: Rc<AggregatorInner>,
}

impl CountAggregator {
    pub fn new(
        source: Rc<dyn CountSource>,
        clock: Rc<dyn Clock>,
        spawner: Rc<dyn LocalSpawn>,
        window: Duration,
        timeout: Duration,
    ) -> Self {
        let task = DebouncedTask::new(window, Rc::clone(&clock), spawner);
        Self {
            inner: Rc::new(AggregatorInner {
                source,
                clock,
                timeout,
                task,
                latest: RefCell::new(FilterState::default()),
                snapshot: RefCell::new(CountSnapshot::default()),
                warning: RefCell::new(None),
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(0),
            }),
        }
    }

    /// Record `state` as the latest selection and restart the debounce window.
    pub fn on_filter_state_changed(&self, state: &FilterState) {
        *self.inner.latest.borrow_mut() = state.clone();
        let start = Rc::clone(&self.inner);
        let settle = Rc::clone(&self.inner);
        self.inner
            .task
            .schedule(move || start.request(), move |seq, result| settle.settle(seq, result));
    }

    /// Most recent settled snapshot. Never blocks.
    pub fn snapshot(&self) -> CountSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Non-blocking warning left by the last failed refresh.
    pub fn warning(&self) -> Option<String> {
        self.inner.warning.borrow().clone()
    }

    /// A refresh is armed or in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.task.is_armed() || self.inner.task.guard().outstanding()
    }

    pub fn requests_issued(&self) -> u64 {
        self.inner.task.guard().latest_issued()
    }

    /// Register `subscriber` for every published snapshot, stale ones included.
    pub fn subscribe(&self, subscriber: impl Fn(&CountSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscriber.get());
        self.inner.next_subscriber.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(sub, _)| *sub != id);
    }
}

impl AggregatorInner {
    fn request(&self) -> LocalBoxFuture<'static, Result<CountSnapshot, FetchError>> {
        let query = build_query(&self.latest.borrow());
        tracing::debug!("Requesting counts for ?{}", query.to_query_string());
        with_timeout(&*self.clock, self.timeout, self.source.fetch_counts(&query)).boxed_local()
    }

    fn settle(&self, seq: u64, result: Result<CountSnapshot, FetchError>) {
        let published = match result {
            Ok(mut snapshot) => {
                snapshot.stale = false;
                *self.warning.borrow_mut() = None;
                *self.snapshot.borrow_mut() = snapshot.clone();
                snapshot
            }
            Err(e) => {
                tracing::warn!("Count request #{} failed, keeping last counts: {}", seq, e);
                *self.warning.borrow_mut() = Some(format!("Counts may be outdated: {e}"));
                let mut snapshot = self.snapshot.borrow_mut();
                snapshot.stale = true;
                snapshot.clone()
            }
        };
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&published);
        }
    }
}
