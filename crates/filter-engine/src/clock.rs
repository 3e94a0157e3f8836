//! Host-supplied time.
//!
//! The browser host backs [`Clock`] with `Date.now()` and `setTimeout`; tests
//! use [`ManualClock`] and move time forward explicitly.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures::channel::oneshot;
use futures::future::{self, Either, LocalBoxFuture};
use futures::FutureExt;

use crate::error::FetchError;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Resolves once `duration` has elapsed. Dropping the future cancels it.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Convert a std duration, saturating instead of failing.
pub fn to_time_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

struct Sleeper {
    deadline: DateTime<Utc>,
    wake: oneshot::Sender<()>,
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    sleepers: RefCell<Vec<Sleeper>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
            sleepers: RefCell::new(Vec::new()),
        }
    }

    /// Move time forward and wake every sleeper whose deadline has passed.
    ///
    /// Woken tasks still need their executor to run.
    pub fn advance(&self, duration: Duration) {
        let now = self.now.get() + to_time_delta(duration);
        self.now.set(now);
        let due: Vec<Sleeper> = {
            let mut sleepers = self.sleepers.borrow_mut();
            let (due, waiting) = sleepers
                .drain(..)
                .filter(|s| !s.wake.is_canceled())
                .partition(|s| s.deadline <= now);
            *sleepers = waiting;
            due
        };
        for sleeper in due {
            // A dropped receiver means the sleep was cancelled.
            let _ = sleeper.wake.send(());
        }
    }

    /// Sleeps still armed (not yet due and not cancelled).
    pub fn pending_sleepers(&self) -> usize {
        self.sleepers
            .borrow()
            .iter()
            .filter(|s| !s.wake.is_canceled())
            .count()
    }

    /// Sleep entries held, cancelled ones not yet swept included.
    pub fn tracked_sleepers(&self) -> usize {
        self.sleepers.borrow().len()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        if duration.is_zero() {
            return future::ready(()).boxed_local();
        }
        let (wake, wait) = oneshot::channel();
        let mut sleepers = self.sleepers.borrow_mut();
        sleepers.retain(|s| !s.wake.is_canceled());
        sleepers.push(Sleeper {
            deadline: self.now.get() + to_time_delta(duration),
            wake,
        });
        drop(sleepers);
        async move {
            let _ = wait.await;
        }
        .boxed_local()
    }
}

/// Bound `request` by `limit`; an expired deadline becomes [`FetchError::Timeout`].
pub fn with_timeout<T, F>(
    clock: &dyn Clock,
    limit: Duration,
    request: F,
) -> impl Future<Output = Result<T, FetchError>>
where
    F: Future<Output = Result<T, FetchError>>,
{
    let deadline = clock.sleep(limit);
    async move {
        let request = std::pin::pin!(request);
        match future::select(request, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(FetchError::Timeout(limit)),
        }
    }
}
