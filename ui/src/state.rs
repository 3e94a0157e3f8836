use dioxus::prelude::*;
use market_common::types::{CountSnapshot, FilterState};

/// Models offered under one selected brand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelGroup {
    pub brand: String,
    pub models: Vec<String>,
}

/// Generations offered under one selected (brand, model) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationGroup {
    pub brand: String,
    pub model: String,
    pub generations: Vec<String>,
}

// --- Global signals ---

/// Last published filter selection
pub static FILTER_STATE: GlobalSignal<FilterState> = Global::new(FilterState::default);

/// Last settled count snapshot
pub static COUNTS: GlobalSignal<CountSnapshot> = Global::new(CountSnapshot::default);

/// Warning left by a failed count refresh
pub static COUNT_WARNING: GlobalSignal<Option<String>> = Global::new(|| None);

/// Whether a count refresh is pending
pub static COUNTS_REFRESHING: GlobalSignal<bool> = Global::new(|| false);

/// Brand options
pub static BRAND_OPTIONS: GlobalSignal<Vec<String>> = Global::new(Vec::new);

/// Model options, grouped by selected brand
pub static MODEL_OPTIONS: GlobalSignal<Vec<ModelGroup>> = Global::new(Vec::new);

/// Generation options, grouped by selected model
pub static GENERATION_OPTIONS: GlobalSignal<Vec<GenerationGroup>> = Global::new(Vec::new);
