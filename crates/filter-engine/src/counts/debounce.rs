//! Debounced, supersedable async operation.
//!
//! Each [`DebouncedTask::schedule`] hard-cancels the pending timer and arms a
//! new one. When a timer survives its window the operation starts, tagged with
//! the next sequence number. Requests already in flight are never aborted;
//! their results are dropped instead if a later-issued request has already
//! been applied.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::clock::Clock;

/// Monotonic request numbering plus the "newest applied wins" check.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    issued: Cell<u64>,
    applied: Cell<u64>,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for the next outgoing request.
    pub fn issue(&self) -> u64 {
        let seq = self.issued.get() + 1;
        self.issued.set(seq);
        seq
    }

    /// Whether a result for `seq` may be applied. Records it when it may.
    pub fn accept(&self, seq: u64) -> bool {
        if seq > self.applied.get() {
            self.applied.set(seq);
            true
        } else {
            false
        }
    }

    pub fn latest_issued(&self) -> u64 {
        self.issued.get()
    }

    pub fn latest_applied(&self) -> u64 {
        self.applied.get()
    }

    /// Issued requests whose result has not been applied or superseded yet.
    pub fn outstanding(&self) -> bool {
        self.issued.get() > self.applied.get()
    }
}

struct Timer {
    id: u64,
    abort: AbortHandle,
}

struct DebounceState {
    pending: RefCell<Option<Timer>>,
    next_timer: Cell<u64>,
    guard: SequenceGuard,
}

pub struct DebouncedTask {
    window: Duration,
    clock: Rc<dyn Clock>,
    spawner: Rc<dyn LocalSpawn>,
    state: Rc<DebounceState>,
}

impl DebouncedTask {
    pub fn new(window: Duration, clock: Rc<dyn Clock>, spawner: Rc<dyn LocalSpawn>) -> Self {
        Self {
            window,
            clock,
            spawner,
            state: Rc::new(DebounceState {
                pending: RefCell::new(None),
                next_timer: Cell::new(0),
                guard: SequenceGuard::new(),
            }),
        }
    }

    /// Restart the window. Once it elapses `start` builds the request and
    /// `done` receives its output unless a newer result was applied first.
    pub fn schedule<S, Fut, T, D>(&self, start: S, done: D)
    where
        S: FnOnce() -> Fut + 'static,
        Fut: Future<Output = T> + 'static,
        D: FnOnce(u64, T) + 'static,
        T: 'static,
    {
        self.cancel();

        let id = self.state.next_timer.get() + 1;
        self.state.next_timer.set(id);
        let (abort, registration) = AbortHandle::new_pair();
        let timer = Abortable::new(self.clock.sleep(self.window), registration);
        let state = Rc::clone(&self.state);

        let task = async move {
            if timer.await.is_err() {
                return;
            }
            {
                let mut pending = state.pending.borrow_mut();
                if pending.as_ref().is_some_and(|t| t.id == id) {
                    *pending = None;
                }
            }
            let seq = state.guard.issue();
            tracing::debug!("Debounce window elapsed, issuing request #{}", seq);
            let output = start().await;
            if state.guard.accept(seq) {
                done(seq, output);
            } else {
                tracing::debug!(
                    "Discarding superseded result #{} (newest applied #{})",
                    seq,
                    state.guard.latest_applied()
                );
            }
        };

        match self.spawner.spawn_local(task) {
            Ok(()) => *self.state.pending.borrow_mut() = Some(Timer { id, abort }),
            Err(e) => tracing::warn!("Failed to spawn debounced task: {}", e),
        }
    }

    /// Hard-cancel the armed timer, if any. In-flight requests keep running.
    pub fn cancel(&self) {
        if let Some(timer) = self.state.pending.borrow_mut().take() {
            timer.abort.abort();
        }
    }

    /// A timer is armed and has not fired yet.
    pub fn is_armed(&self) -> bool {
        self.state.pending.borrow().is_some()
    }

    pub fn guard(&self) -> &SequenceGuard {
        &self.state.guard
    }
}
