use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::query;

/// Value held by one facet of a [`FilterState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Flag(bool),
    Number(u64),
    Text(String),
    Set(BTreeSet<String>),
}

impl FacetValue {
    /// Empty values are never stored in a [`FilterState`].
    pub fn is_empty(&self) -> bool {
        match self {
            FacetValue::Text(s) => s.is_empty(),
            FacetValue::Set(s) => s.is_empty(),
            FacetValue::Number(_) | FacetValue::Flag(_) => false,
        }
    }

    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FacetValue::Set(values.into_iter().map(Into::into).collect())
    }
}

/// The user's current selection, keyed by canonical facet name.
///
/// Always in normalized form: a facet without a value is absent rather than
/// stored empty, so the default state is the empty map.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: BTreeMap<String, FacetValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, facet: &str, value: FacetValue) -> Self {
        self.insert(facet, value);
        self
    }

    /// Store `value` under `facet`; an empty value removes the facet.
    pub fn insert(&mut self, facet: &str, value: FacetValue) {
        if value.is_empty() {
            self.values.remove(facet);
        } else {
            self.values.insert(facet.to_string(), value);
        }
    }

    pub fn remove(&mut self, facet: &str) -> Option<FacetValue> {
        self.values.remove(facet)
    }

    pub fn get(&self, facet: &str) -> Option<&FacetValue> {
        self.values.get(facet)
    }

    pub fn contains(&self, facet: &str) -> bool {
        self.values.contains_key(facet)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn text(&self, facet: &str) -> Option<&str> {
        match self.values.get(facet) {
            Some(FacetValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, facet: &str) -> Option<u64> {
        match self.values.get(facet) {
            Some(FacetValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, facet: &str) -> Option<bool> {
        match self.values.get(facet) {
            Some(FacetValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Members of a multi-valued facet; empty when unset.
    pub fn members(&self, facet: &str) -> BTreeSet<String> {
        match self.values.get(facet) {
            Some(FacetValue::Set(s)) => s.clone(),
            _ => BTreeSet::new(),
        }
    }

    pub fn has_member(&self, facet: &str, value: &str) -> bool {
        matches!(self.values.get(facet), Some(FacetValue::Set(s)) if s.contains(value))
    }
}

/// Per-value match counts plus the grand total for one settled filter state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountSnapshot {
    pub facet_counts: BTreeMap<String, BTreeMap<String, u64>>,
    pub total_matching: u64,
    /// Set when the latest refresh failed and this is the last good snapshot.
    #[serde(default)]
    pub stale: bool,
}

impl CountSnapshot {
    pub fn total(total_matching: u64) -> Self {
        Self {
            total_matching,
            ..Self::default()
        }
    }

    pub fn facet(&self, facet: &str) -> Option<&BTreeMap<String, u64>> {
        self.facet_counts.get(facet)
    }

    pub fn count_for(&self, facet: &str, value: &str) -> Option<u64> {
        self.facet_counts.get(facet)?.get(value).copied()
    }

    fn add(&mut self, facet: &str, value: String, count: u64) {
        let slot = self
            .facet_counts
            .entry(facet.to_string())
            .or_default()
            .entry(value)
            .or_insert(0);
        *slot = slot.saturating_add(count);
    }
}

/// `GET filter-counts` response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCountsResponse {
    #[serde(default)]
    pub filter_counts: BTreeMap<String, BTreeMap<String, u64>>,
    #[serde(default)]
    pub total_matching: u64,
}

/// `GET search-stats` response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatsResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub brand_counts: BTreeMap<String, u64>,
    /// brand -> model -> count
    #[serde(default)]
    pub model_counts: BTreeMap<String, BTreeMap<String, u64>>,
}

/// `GET search/count` response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCountResponse {
    #[serde(default)]
    pub count: u64,
}

impl From<FilterCountsResponse> for CountSnapshot {
    fn from(resp: FilterCountsResponse) -> Self {
        let mut snapshot = CountSnapshot::total(resp.total_matching);
        for (facet, values) in resp.filter_counts {
            // Backend facet names go through the same alias table as queries.
            let Some(spec) = query::canonical_field(&facet) else {
                continue;
            };
            for (value, count) in values {
                snapshot.add(spec.name, value, count);
            }
        }
        snapshot
    }
}

impl From<SearchStatsResponse> for CountSnapshot {
    fn from(resp: SearchStatsResponse) -> Self {
        let mut snapshot = CountSnapshot::total(resp.total_count);
        for (brand, count) in resp.brand_counts {
            snapshot.add(crate::schema::BRAND, brand, count);
        }
        // Same model name under two brands is summed into one option.
        for models in resp.model_counts.into_values() {
            for (model, count) in models {
                snapshot.add(crate::schema::MODEL, model, count);
            }
        }
        snapshot
    }
}

impl From<SearchCountResponse> for CountSnapshot {
    fn from(resp: SearchCountResponse) -> Self {
        CountSnapshot::total(resp.count)
    }
}

/// One marketplace vehicle as seen by the local listing index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Listing {
    pub id: String,
    pub brand: String,
    pub model: String,
    pub generation: String,
    pub body_type: String,
    pub fuel_type: String,
    pub transmission: String,
    pub drive_type: String,
    pub color: String,
    pub condition: String,
    pub city: String,
    pub price: u64,
    pub year: u64,
    pub mileage: u64,
    /// Displacement in cubic centimetres.
    pub engine_volume: u64,
    pub power: u64,
    pub customs_cleared: bool,
    pub exchange_possible: bool,
    pub credit_available: bool,
    pub photo_count: u32,
}

impl Listing {
    /// Text attribute backing a multi or single facet.
    pub fn text_attribute(&self, facet: &str) -> Option<&str> {
        let value = match facet {
            "brand" => &self.brand,
            "model" => &self.model,
            "generation" => &self.generation,
            "bodyType" => &self.body_type,
            "fuelType" => &self.fuel_type,
            "transmission" => &self.transmission,
            "driveType" => &self.drive_type,
            "color" => &self.color,
            "condition" => &self.condition,
            "city" => &self.city,
            _ => return None,
        };
        Some(value)
    }

    /// Numeric attribute addressed by a range field (`price`, `year`...).
    pub fn numeric_attribute(&self, field: &str) -> Option<u64> {
        match field {
            "price" => Some(self.price),
            "year" => Some(self.year),
            "mileage" => Some(self.mileage),
            "engineVolume" => Some(self.engine_volume),
            "power" => Some(self.power),
            _ => None,
        }
    }

    pub fn flag_attribute(&self, facet: &str) -> Option<bool> {
        match facet {
            "customsCleared" => Some(self.customs_cleared),
            "exchangePossible" => Some(self.exchange_possible),
            "creditAvailable" => Some(self.credit_available),
            "withPhotos" => Some(self.photo_count > 0),
            _ => None,
        }
    }
}
