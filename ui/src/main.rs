#![allow(non_snake_case)]

use dioxus::prelude::*;

mod host;
mod state;
mod views;

use views::attributes::AttributeFilters;
use views::cascade::CascadePanel;
use views::ranges::{FlagToggles, RangeInputs};
use views::summary::SummaryBar;

fn main() {
    dioxus::logger::initialize_default();
    launch(App);
}

#[component]
fn App() -> Element {
    use_effect(|| {
        host::init();
    });

    rsx! {
        document::Stylesheet { href: asset!("/assets/main.css") }

        div { class: "app-shell",
            header { class: "app-header",
                h1 { class: "app-title", "Find a car" }

                div { class: "header-controls",
                    button {
                        class: "clear-cache-btn",
                        title: "Forget cached brand and model lists",
                        onclick: move |_| {
                            host::with_engine(|engine| {
                                engine.catalog.clear_cache();
                            });
                        },
                        "Clear cache"
                    }
                }
            }

            SummaryBar {}

            aside { class: "filter-panel",
                CascadePanel {}
                AttributeFilters {}
                RangeInputs {}
                FlagToggles {}
            }
        }
    }
}
