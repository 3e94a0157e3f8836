#![allow(non_snake_case)]

use dioxus::prelude::*;
use market_common::schema::{BRAND, GENERATION, MODEL};

use super::option_list::OptionList;
use crate::state::{BRAND_OPTIONS, FILTER_STATE, GENERATION_OPTIONS, MODEL_OPTIONS};

/// Brand → model → generation checklists. Each level appears once its
/// parent has a selection.
#[component]
pub fn CascadePanel() -> Element {
    let brands = BRAND_OPTIONS.read().clone();
    let model_groups = MODEL_OPTIONS.read().clone();
    let generation_groups = GENERATION_OPTIONS.read().clone();
    let state = FILTER_STATE.read();
    let has_brand = state.contains(BRAND);
    let has_model = state.contains(MODEL);

    rsx! {
        section { class: "facet-group",
            h3 { "Brand" }
            if brands.is_empty() {
                p { class: "text-secondary", "Loading brands..." }
            } else {
                OptionList { facet: BRAND, options: brands }
            }
        }

        if has_brand {
            section { class: "facet-group",
                h3 { "Model" }
                for group in model_groups {
                    div { class: "option-group", key: "{group.brand}",
                        h4 { "{group.brand}" }
                        if group.models.is_empty() {
                            p { class: "text-secondary", "No models listed" }
                        } else {
                            OptionList { facet: MODEL, options: group.models }
                        }
                    }
                }
            }
        }

        if has_model && !generation_groups.is_empty() {
            section { class: "facet-group",
                h3 { "Generation" }
                for group in generation_groups {
                    div { class: "option-group", key: "{group.brand}/{group.model}",
                        h4 { "{group.brand} {group.model}" }
                        OptionList { facet: GENERATION, options: group.generations }
                    }
                }
            }
        }
    }
}
