use std::time::Duration;

use chrono::{DateTime, Utc};
use dioxus::core::spawn_forever;
use filter_engine::executor::Navigator;
use filter_engine::Clock;
use futures::channel::oneshot;
use futures::future::{LocalBoxFuture, LocalFutureObj};
use futures::task::{LocalSpawn, SpawnError};
use futures::FutureExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `Date.now()` and `setTimeout`.
pub struct BrowserClock;

/// Clears the browser timer when the sleep is dropped early.
struct Timeout {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        let callback: Closure<dyn FnMut()> = Closure::once(move || {
            let _ = tx.send(());
        });
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let timeout = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    millis,
                )
                .ok()
        });
        let Some(handle) = timeout else {
            tracing::warn!("setTimeout unavailable, sleep resolves immediately");
            return futures::future::ready(()).boxed_local();
        };
        let guard = Timeout {
            handle,
            _callback: callback,
        };
        async move {
            let _guard = guard;
            let _ = rx.await;
        }
        .boxed_local()
    }
}

/// Spawns onto the Dioxus runtime so signal writes from engine callbacks
/// happen inside it.
pub struct RuntimeSpawner;

impl LocalSpawn for RuntimeSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        let _ = spawn_forever(future);
        Ok(())
    }
}

/// Standalone-mode search: a full page load of the results URL.
pub struct LocationNavigator;

impl Navigator for LocationNavigator {
    fn navigate(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(e) = window.location().assign(url) {
            tracing::error!("Navigation to {} failed: {:?}", url, e);
        }
    }
}

/// `location.search` of the current page, empty outside a browser.
pub fn location_search() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}
