use std::collections::BTreeSet;

use market_common::cascade::{prune, CascadeDomains};
use market_common::query::{build_query, parse_query, CanonicalQuery};
use market_common::schema::{FacetKind, FACETS};
use market_common::types::{FacetValue, FilterState};
use proptest::prelude::*;

fn member() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z0-9]{1,8}",
        "[A-Za-z]{1,4}[,\\\\][A-Za-z]{1,4}",
        Just("Land Cruiser".to_string()),
    ]
}

fn facet_value(kind: FacetKind) -> BoxedStrategy<Option<FacetValue>> {
    let value = match kind {
        FacetKind::Multi => prop::collection::btree_set(member(), 0..4)
            .prop_map(FacetValue::Set)
            .boxed(),
        FacetKind::Single => "[A-Za-z]{1,6}( [A-Za-z]{1,6})?"
            .prop_map(FacetValue::Text)
            .boxed(),
        FacetKind::RangeFrom | FacetKind::RangeTo => any::<u64>().prop_map(FacetValue::Number).boxed(),
        FacetKind::Flag => any::<bool>().prop_map(FacetValue::Flag).boxed(),
    };
    prop::option::of(value).boxed()
}

fn filter_state() -> impl Strategy<Value = FilterState> {
    let per_facet: Vec<_> = FACETS.iter().map(|spec| facet_value(spec.kind)).collect();
    per_facet.prop_map(|values| {
        let mut state = FilterState::new();
        for (spec, value) in FACETS.iter().zip(values) {
            if let Some(value) = value {
                state.insert(spec.name, value);
            }
        }
        state
    })
}

fn domains() -> impl Strategy<Value = CascadeDomains> {
    let brands = prop::collection::btree_map(member(), prop::collection::btree_set(member(), 0..4), 0..4);
    (brands, prop::collection::vec(member(), 0..6)).prop_map(|(brands, generations)| {
        let mut d = CascadeDomains::new();
        for (brand, models) in &brands {
            d.insert_models(brand, models.iter().cloned());
            for (i, model) in models.iter().enumerate() {
                let gens: BTreeSet<String> = generations.iter().skip(i).step_by(2).cloned().collect();
                d.insert_generations(brand, model, gens);
            }
        }
        d
    })
}

proptest! {
    #[test]
    fn query_round_trip(state in filter_state()) {
        let query = build_query(&state);
        prop_assert_eq!(parse_query(&query), state.clone());
        prop_assert_eq!(parse_query(&query.to_comma_joined()), state.clone());
        let reparsed = CanonicalQuery::from_query_string(&query.to_query_string());
        prop_assert_eq!(parse_query(&reparsed), state);
    }

    #[test]
    fn prune_is_idempotent(state in filter_state(), domains in domains()) {
        let once = prune(&state, &domains);
        let twice = prune(&once, &domains);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prune_only_removes(state in filter_state(), domains in domains()) {
        let pruned = prune(&state, &domains);
        for (facet, value) in pruned.iter() {
            match (value, state.get(facet)) {
                (FacetValue::Set(after), Some(FacetValue::Set(before))) => {
                    prop_assert!(after.is_subset(before));
                }
                (after, before) => prop_assert_eq!(Some(after), before),
            }
        }
    }

    #[test]
    fn comma_join_is_reversible(state in filter_state()) {
        let query = build_query(&state);
        prop_assert_eq!(query.to_comma_joined().to_repeated(), query);
    }
}
