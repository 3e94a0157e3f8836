#![allow(non_snake_case)]

use dioxus::prelude::*;
use filter_engine::FilterInput;
use market_common::normalization::sorted_options;
use market_common::schema::{self, FacetKind};

use super::option_list::OptionList;
use super::{facet_label, set};
use crate::state::{COUNTS, FILTER_STATE};

/// Non-cascade text facets. Options come from the count snapshot, plus
/// whatever is already selected so a selection never disappears.
#[component]
pub fn AttributeFilters() -> Element {
    let counts = COUNTS.read().clone();
    let state = FILTER_STATE.read().clone();

    rsx! {
        for spec in schema::FACETS.iter().filter(|s| s.parent.is_none() && s.name != schema::BRAND) {
            {
                let known = counts.facet(spec.name).map(|c| c.keys().cloned().collect::<Vec<_>>()).unwrap_or_default();
                match spec.kind {
                    FacetKind::Multi => {
                        let options = sorted_options(known.into_iter().chain(state.members(spec.name)));
                        rsx! {
                            if !options.is_empty() {
                                section { class: "facet-group", key: "{spec.name}",
                                    h3 { "{facet_label(spec.name)}" }
                                    OptionList { facet: spec.name, options }
                                }
                            }
                        }
                    }
                    FacetKind::Single => {
                        let facet = spec.name;
                        let current = state.text(facet).unwrap_or_default().to_string();
                        let options = sorted_options(known.into_iter().chain(state.text(facet).map(str::to_string)));
                        rsx! {
                            section { class: "facet-group", key: "{facet}",
                                h3 { "{facet_label(facet)}" }
                                select {
                                    value: "{current}",
                                    onchange: move |e: Event<FormData>| set(facet, FilterInput::Text(e.value())),
                                    option { value: "", "Any" }
                                    for choice in options {
                                        option { value: "{choice}", selected: choice == current, "{choice}" }
                                    }
                                }
                            }
                        }
                    }
                    _ => rsx! {},
                }
            }
        }
    }
}
