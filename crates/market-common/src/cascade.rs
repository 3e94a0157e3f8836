//! Brand → model → generation consistency.
//!
//! A selected model must belong to one of the selected brands, and a selected
//! generation to one of the selected (brand, model) pairs. Violations are
//! pruned, never rejected. Pruning runs top-down in a single pass, which makes
//! it a fixed point: `prune(prune(s)) == prune(s)`.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::{BRAND, GENERATION, MODEL};
use crate::types::{FacetValue, FilterState};

/// A catalog lookup still needed before a state can be pruned.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DomainRequest {
    Models { brand: String },
    Generations { brand: String, model: String },
}

/// Option domains resolved so far for the brands and models in play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeDomains {
    models: BTreeMap<String, BTreeSet<String>>,
    generations: BTreeMap<(String, String), BTreeSet<String>>,
}

impl CascadeDomains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_models<I, S>(&mut self, brand: &str, models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models.insert(
            brand.to_string(),
            models.into_iter().map(Into::into).collect(),
        );
    }

    pub fn insert_generations<I, S>(&mut self, brand: &str, model: &str, generations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.generations.insert(
            (brand.to_string(), model.to_string()),
            generations.into_iter().map(Into::into).collect(),
        );
    }

    /// Record the answer to a [`DomainRequest`].
    pub fn resolve(&mut self, request: &DomainRequest, options: Vec<String>) {
        match request {
            DomainRequest::Models { brand } => self.insert_models(brand, options),
            DomainRequest::Generations { brand, model } => {
                self.insert_generations(brand, model, options)
            }
        }
    }

    /// Models allowed under any of `brands`.
    pub fn model_domain(&self, brands: &BTreeSet<String>) -> BTreeSet<String> {
        brands
            .iter()
            .filter_map(|b| self.models.get(b))
            .flatten()
            .cloned()
            .collect()
    }

    /// Generations allowed under any selected (brand, model) pair.
    pub fn generation_domain(
        &self,
        brands: &BTreeSet<String>,
        models: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        self.pairs(brands, models)
            .filter_map(|pair| self.generations.get(&pair))
            .flatten()
            .cloned()
            .collect()
    }

    /// (brand, model) pairs where the model is known to belong to the brand.
    fn pairs<'a>(
        &'a self,
        brands: &'a BTreeSet<String>,
        models: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = (String, String)> + 'a {
        brands.iter().flat_map(move |brand| {
            let known = self.models.get(brand);
            models
                .iter()
                .filter(move |m| known.is_some_and(|k| k.contains(*m)))
                .map(move |m| (brand.clone(), m.clone()))
        })
    }

    /// Lookups needed before `state` can be pruned.
    ///
    /// Model domains are only needed when models are selected, and generation
    /// domains only when generations are. Generation requests appear once the
    /// model domains they depend on are known, so callers loop until empty.
    pub fn missing(&self, state: &FilterState) -> Vec<DomainRequest> {
        let brands = state.members(BRAND);
        let models = state.members(MODEL);
        let generations = state.members(GENERATION);
        let mut out = Vec::new();
        if !models.is_empty() || !generations.is_empty() {
            out.extend(
                brands
                    .iter()
                    .filter(|b| !self.models.contains_key(*b))
                    .map(|b| DomainRequest::Models { brand: b.clone() }),
            );
        }
        if !generations.is_empty() && out.is_empty() {
            out.extend(
                self.pairs(&brands, &models)
                    .filter(|pair| !self.generations.contains_key(pair))
                    .map(|(brand, model)| DomainRequest::Generations { brand, model }),
            );
        }
        out
    }
}

/// Drop models and generations that fall outside their parents' domains.
pub fn prune(state: &FilterState, domains: &CascadeDomains) -> FilterState {
    let mut out = state.clone();
    let brands = state.members(BRAND);

    if state.contains(MODEL) {
        let allowed = domains.model_domain(&brands);
        let kept: BTreeSet<String> = state
            .members(MODEL)
            .into_iter()
            .filter(|m| allowed.contains(m))
            .collect();
        out.insert(MODEL, FacetValue::Set(kept));
    }

    if state.contains(GENERATION) {
        let models = out.members(MODEL);
        let allowed = domains.generation_domain(&brands, &models);
        let kept: BTreeSet<String> = state
            .members(GENERATION)
            .into_iter()
            .filter(|g| allowed.contains(g))
            .collect();
        out.insert(GENERATION, FacetValue::Set(kept));
    }

    out
}
