#![allow(non_snake_case)]

use dioxus::prelude::*;
use filter_engine::FilterInput;
use market_common::schema::{self, FacetKind};

use super::{facet_label, set};
use crate::state::FILTER_STATE;

/// From/to inputs for every numeric field. Input is committed on change
/// and coerced by the store; garbage leaves the bound as it was.
#[component]
pub fn RangeInputs() -> Element {
    let state = FILTER_STATE.read().clone();
    let pairs = schema::FACETS.iter().filter_map(|from| {
        if from.kind != FacetKind::RangeFrom {
            return None;
        }
        let field = from.range_field()?;
        let to = schema::FACETS
            .iter()
            .find(|s| s.kind == FacetKind::RangeTo && s.range_field() == Some(field))?;
        Some((field, from.name, to.name))
    });

    rsx! {
        for (field, from, to) in pairs {
            {
                let from_value = state.number(from).map(|n| n.to_string()).unwrap_or_default();
                let to_value = state.number(to).map(|n| n.to_string()).unwrap_or_default();
                rsx! {
                    section { class: "facet-group range", key: "{field}",
                        h3 { "{facet_label(field)}" }
                        div { class: "range-inputs",
                            input {
                                r#type: "text",
                                inputmode: "numeric",
                                placeholder: "from",
                                value: "{from_value}",
                                onchange: move |e: Event<FormData>| set(from, FilterInput::Text(e.value())),
                            }
                            input {
                                r#type: "text",
                                inputmode: "numeric",
                                placeholder: "to",
                                value: "{to_value}",
                                onchange: move |e: Event<FormData>| set(to, FilterInput::Text(e.value())),
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn FlagToggles() -> Element {
    let state = FILTER_STATE.read().clone();

    rsx! {
        section { class: "facet-group flags",
            for spec in schema::FACETS.iter().filter(|s| s.kind == FacetKind::Flag) {
                {
                    let facet = spec.name;
                    let checked = state.flag(facet) == Some(true);
                    rsx! {
                        label { class: "settings-toggle", key: "{facet}",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onchange: move |e: Event<FormData>| {
                                    let input = if e.checked() { FilterInput::Flag(true) } else { FilterInput::Clear };
                                    set(facet, input);
                                },
                            }
                            span { "{facet_label(facet)}" }
                        }
                    }
                }
            }
        }
    }
}
