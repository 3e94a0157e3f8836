#![allow(non_snake_case)]

use dioxus::prelude::*;

use crate::host::with_engine;
use crate::state::{COUNTS, COUNTS_REFRESHING, COUNT_WARNING, FILTER_STATE};

#[component]
pub fn SummaryBar() -> Element {
    let total = COUNTS.read().total_matching;
    let stale = COUNTS.read().stale;
    let refreshing = *COUNTS_REFRESHING.read();
    let warning = COUNT_WARNING.read().clone();
    let active = FILTER_STATE.read().len();
    let plural = if total != 1 { "s" } else { "" };

    rsx! {
        div { class: "summary-bar",
            span { class: if stale { "match-count stale" } else { "match-count" },
                "{total} car{plural} found"
            }
            if refreshing {
                span { class: "scan-progress", "Updating..." }
            }
            if let Some(text) = warning {
                span { class: "count-warning", title: "{text}", "Counts may be outdated" }
            }

            div { class: "summary-actions",
                if active > 0 {
                    button {
                        class: "reset-btn",
                        onclick: move |_| with_engine(|engine| engine.filters.reset()),
                        "Reset ({active})"
                    }
                }
                button {
                    class: "search-btn",
                    onclick: move |_| with_engine(|engine| {
                        engine.search();
                    }),
                    "Show {total} car{plural}"
                }
            }
        }
    }
}
