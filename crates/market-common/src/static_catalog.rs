use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::normalization::{canonical_option, sorted_options, unique_options};

/// Bundled brand → model → generation snapshot used as the last fallback tier.
const EMBEDDED_CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Brand → model → generation tree.
///
/// Every model maps to a generation list, possibly empty, never absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetCatalog {
    /// RFC 3339 time the snapshot was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub brands: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl FacetCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<FacetCatalog>(json).map(FacetCatalog::normalized)
    }

    /// Canonicalize every label, merging brands/models that collapse together.
    pub fn normalized(self) -> Self {
        let mut brands: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for (brand, models) in self.brands {
            let Some(brand) = canonical_option(&brand) else {
                continue;
            };
            let slot = brands.entry(brand).or_default();
            for (model, generations) in models {
                let Some(model) = canonical_option(&model) else {
                    continue;
                };
                let merged = slot.entry(model).or_default();
                merged.extend(generations);
                *merged = unique_options(merged.iter());
            }
        }
        Self {
            generated_at: self.generated_at,
            brands,
        }
    }

    pub fn brands(&self) -> Vec<String> {
        sorted_options(self.brands.keys())
    }

    /// Models of `brand`, or `None` when the brand is unknown.
    pub fn models(&self, brand: &str) -> Option<Vec<String>> {
        self.brands.get(brand).map(|models| sorted_options(models.keys()))
    }

    /// Generations of `brand`/`model`, or `None` when the pair is unknown.
    pub fn generations(&self, brand: &str, model: &str) -> Option<Vec<String>> {
        self.brands
            .get(brand)?
            .get(model)
            .cloned()
    }

    pub fn model_count(&self) -> usize {
        self.brands.values().map(BTreeMap::len).sum()
    }
}

/// The bundled catalog, parsed once. A malformed bundle degrades to empty.
pub fn embedded() -> &'static FacetCatalog {
    static CATALOG: OnceLock<FacetCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| FacetCatalog::from_json(EMBEDDED_CATALOG_JSON).unwrap_or_default())
}
