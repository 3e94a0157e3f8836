use std::collections::BTreeMap;

use futures::future::{self, LocalBoxFuture};
use futures::FutureExt;
use market_common::normalization::canonical_option;
use market_common::query::{parse_query, CanonicalQuery};
use market_common::schema::{self, FacetKind};
use market_common::types::{CountSnapshot, FacetValue, FilterState, Listing};

use super::CountSource;
use crate::error::FetchError;

/// Counts over an in-memory listing snapshot.
///
/// Facet counts are disjunctive: the count for a value of facet `f` applies
/// every constraint except those on `f`, so sibling options of a multi-select
/// keep their counts while one of them is selected.
#[derive(Clone, Debug, Default)]
pub struct ListingIndex {
    listings: Vec<Listing>,
}

impl ListingIndex {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Listings matching every constraint in `state`.
    pub fn matching<'a>(&'a self, state: &'a FilterState) -> impl Iterator<Item = &'a Listing> + 'a {
        self.listings
            .iter()
            .filter(move |listing| matches(listing, state, None))
    }

    pub fn snapshot(&self, state: &FilterState) -> CountSnapshot {
        let mut snapshot = CountSnapshot::total(self.matching(state).count() as u64);
        for spec in schema::counted_facets() {
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for listing in &self.listings {
                if !matches(listing, state, Some(spec.name)) {
                    continue;
                }
                if let Some(value) = text_option(listing, spec.name) {
                    *counts.entry(value).or_insert(0) += 1;
                }
            }
            if !counts.is_empty() {
                snapshot.facet_counts.insert(spec.name.to_string(), counts);
            }
        }
        snapshot
    }
}

impl CountSource for ListingIndex {
    fn fetch_counts(
        &self,
        query: &CanonicalQuery,
    ) -> LocalBoxFuture<'static, Result<CountSnapshot, FetchError>> {
        future::ready(Ok(self.snapshot(&parse_query(query)))).boxed_local()
    }
}

fn matches(listing: &Listing, state: &FilterState, skip: Option<&str>) -> bool {
    state.iter().all(|(facet, value)| {
        if skip == Some(facet) {
            return true;
        }
        let Some(spec) = schema::lookup(facet) else {
            return true;
        };
        match (spec.kind, value) {
            (FacetKind::Multi, FacetValue::Set(members)) => {
                text_option(listing, facet).is_some_and(|v| members.contains(&v))
            }
            (FacetKind::Single, FacetValue::Text(expected)) => {
                text_option(listing, facet).is_some_and(|v| v == *expected)
            }
            (FacetKind::RangeFrom, FacetValue::Number(bound)) => spec
                .range_field()
                .and_then(|field| listing.numeric_attribute(field))
                .is_some_and(|v| v >= *bound),
            (FacetKind::RangeTo, FacetValue::Number(bound)) => spec
                .range_field()
                .and_then(|field| listing.numeric_attribute(field))
                .is_some_and(|v| v <= *bound),
            (FacetKind::Flag, FacetValue::Flag(expected)) => {
                listing.flag_attribute(facet) == Some(*expected)
            }
            // A value of the wrong shape constrains nothing.
            _ => true,
        }
    })
}

/// Listing text attribute in the same canonical form as selected options.
fn text_option(listing: &Listing, facet: &str) -> Option<String> {
    listing.text_attribute(facet).and_then(canonical_option)
}
