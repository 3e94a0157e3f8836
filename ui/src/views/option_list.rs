#![allow(non_snake_case)]

use dioxus::prelude::*;

use super::toggle;
use crate::state::{COUNTS, FILTER_STATE};

/// Checklist for one multi-valued facet with per-option counts.
#[component]
pub fn OptionList(facet: &'static str, options: Vec<String>) -> Element {
    let state = FILTER_STATE.read();
    let counts = COUNTS.read();

    rsx! {
        ul { class: "option-list",
            for option in options.iter() {
                {
                    let checked = state.has_member(facet, option);
                    let count = counts.count_for(facet, option);
                    let member = option.clone();
                    rsx! {
                        li { key: "{option}",
                            label { class: if count == Some(0) { "option empty" } else { "option" },
                                input {
                                    r#type: "checkbox",
                                    checked: checked,
                                    onchange: move |_| toggle(facet, member.clone()),
                                }
                                span { class: "option-label", "{option}" }
                                if let Some(n) = count {
                                    span { class: "option-count", "{n}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
