//! The single source of truth for the user's selection.
//!
//! Mutations validate synchronously, then (only when they touch the
//! brand/model/generation cascade) resolve the option domains they need
//! through the catalog resolver. The mutation is applied to the state current
//! at that point, pruned, stored and published exactly once. Subscribers are
//! called synchronously, in registration order.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

use futures::future::join_all;
use market_common::cascade::{prune, CascadeDomains, DomainRequest};
use market_common::normalization::{canonical_option, clamp_number, coerce_number};
use market_common::query::{self, CanonicalQuery};
use market_common::schema::{FacetKind, FacetSpec, BRAND, GENERATION, MODEL};
use market_common::types::{FacetValue, FilterState};

use crate::catalog::{CatalogKey, CatalogResolver};
use crate::error::FilterError;

/// Raw value handed to [`FilterStore::set_value`] by the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterInput {
    /// Text as typed; range bounds coerce it to a number.
    Text(String),
    Number(i64),
    /// Replacement member set for a multi-valued facet.
    Values(Vec<String>),
    Flag(bool),
    Clear,
}

impl From<&str> for FilterInput {
    fn from(value: &str) -> Self {
        FilterInput::Text(value.to_string())
    }
}

impl From<String> for FilterInput {
    fn from(value: String) -> Self {
        FilterInput::Text(value)
    }
}

impl From<i64> for FilterInput {
    fn from(value: i64) -> Self {
        FilterInput::Number(value)
    }
}

impl From<bool> for FilterInput {
    fn from(value: bool) -> Self {
        FilterInput::Flag(value)
    }
}

impl From<Vec<String>> for FilterInput {
    fn from(values: Vec<String>) -> Self {
        FilterInput::Values(values)
    }
}

impl From<Vec<&str>> for FilterInput {
    fn from(values: Vec<&str>) -> Self {
        FilterInput::Values(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Clone, Debug)]
enum Mutation {
    /// Store a value; `None` clears the facet.
    Set {
        facet: &'static str,
        value: Option<FacetValue>,
    },
    Toggle {
        facet: &'static str,
        member: String,
    },
    Replace(FilterState),
    /// Input that coerced to nothing. Still published, changes nothing.
    Keep,
}

impl Mutation {
    fn apply(&self, current: &FilterState) -> FilterState {
        match self {
            Mutation::Set { facet, value } => {
                let mut next = current.clone();
                match value {
                    Some(value) => next.insert(facet, value.clone()),
                    None => {
                        next.remove(facet);
                    }
                }
                next
            }
            Mutation::Toggle { facet, member } => {
                let mut members = current.members(facet);
                if !members.remove(member) {
                    members.insert(member.clone());
                }
                let mut next = current.clone();
                next.insert(facet, FacetValue::Set(members));
                next
            }
            Mutation::Replace(state) => state.clone(),
            Mutation::Keep => current.clone(),
        }
    }

    fn touches_cascade(&self) -> bool {
        match self {
            Mutation::Set { facet, .. } | Mutation::Toggle { facet, .. } => {
                matches!(*facet, BRAND | MODEL | GENERATION)
            }
            Mutation::Replace(_) => true,
            Mutation::Keep => false,
        }
    }
}

type Subscriber = Rc<dyn Fn(&FilterState)>;

/// Handle returned by [`FilterStore::subscribe`] and [`CountAggregator::subscribe`].
///
/// [`CountAggregator::subscribe`]: crate::counts::CountAggregator::subscribe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(pub(crate) u64);

struct StoreInner {
    state: RefCell<FilterState>,
    resolver: CatalogResolver,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
    next_subscriber: Cell<u64>,
}

/// Filter state store. Cheap to clone; clones share state and subscribers.
#[derive(Clone)]
pub struct FilterStore {
    inner: Rc<StoreInner>,
}

impl FilterStore {
    pub fn new(resolver: CatalogResolver) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(FilterState::default()),
                resolver,
                subscribers: RefCell::new(Vec::new()),
                next_subscriber: Cell::new(0),
            }),
        }
    }

    /// Snapshot of the current selection.
    pub fn state(&self) -> FilterState {
        self.inner.state.borrow().clone()
    }

    /// Register `subscriber` for every published state.
    pub fn subscribe(&self, subscriber: impl Fn(&FilterState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_subscriber.get());
        self.inner.next_subscriber.set(id.0 + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|(sub, _)| *sub != id);
    }

    /// Replace a facet's value. Multi-valued facets get a whole new member set.
    pub async fn set_value(
        &self,
        facet: &str,
        input: impl Into<FilterInput>,
    ) -> Result<(), FilterError> {
        let spec = lookup(facet)?;
        let mutation = set_mutation(spec, input.into())?;
        self.commit(mutation).await;
        Ok(())
    }

    /// Add `member` to a multi-valued facet, or remove it if present.
    pub async fn toggle_value(&self, facet: &str, member: &str) -> Result<(), FilterError> {
        let spec = lookup(facet)?;
        if spec.kind != FacetKind::Multi {
            return Err(FilterError::KindMismatch {
                facet: spec.name.to_string(),
                operation: "toggle",
            });
        }
        let mutation = match canonical_option(member) {
            Some(member) => Mutation::Toggle {
                facet: spec.name,
                member,
            },
            None => Mutation::Keep,
        };
        self.commit(mutation).await;
        Ok(())
    }

    /// Load a whole selection (e.g. from the page URL), pruned as usual.
    pub async fn replace_state(&self, state: FilterState) {
        self.commit(Mutation::Replace(state)).await;
    }

    /// Restore a selection from a query string such as `location.search`.
    pub async fn load_query_string(&self, raw: &str) {
        let query = CanonicalQuery::from_query_string(raw);
        for key in query::unknown_keys(&query) {
            tracing::debug!("Ignoring unknown query key {}", key);
        }
        self.replace_state(query::parse_query(&query)).await;
    }

    /// Return every facet to its default in one step.
    pub fn reset(&self) {
        self.publish(FilterState::default());
    }

    async fn commit(&self, mutation: Mutation) {
        if !mutation.touches_cascade() {
            let next = mutation.apply(&self.inner.state.borrow());
            self.publish(next);
            return;
        }

        let mut domains = CascadeDomains::new();
        loop {
            let candidate = mutation.apply(&self.inner.state.borrow());
            let missing = domains.missing(&candidate);
            if missing.is_empty() {
                self.publish(prune(&candidate, &domains));
                return;
            }
            let lookups = missing.into_iter().map(|request| {
                let lookup = self.inner.resolver.resolve(catalog_key(&request));
                async move { (request, lookup.await) }
            });
            for (request, options) in join_all(lookups).await {
                domains.resolve(&request, options);
            }
        }
    }

    fn publish(&self, next: FilterState) {
        *self.inner.state.borrow_mut() = next.clone();
        let subscribers: Vec<Subscriber> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();
        for subscriber in subscribers {
            subscriber(&next);
        }
    }
}

fn lookup(facet: &str) -> Result<&'static FacetSpec, FilterError> {
    query::canonical_field(facet).ok_or_else(|| FilterError::UnknownFacet(facet.to_string()))
}

fn catalog_key(request: &DomainRequest) -> CatalogKey {
    match request {
        DomainRequest::Models { brand } => CatalogKey::models(brand),
        DomainRequest::Generations { brand, model } => CatalogKey::generations(brand, model),
    }
}

fn mismatch(spec: &FacetSpec, operation: &'static str) -> FilterError {
    FilterError::KindMismatch {
        facet: spec.name.to_string(),
        operation,
    }
}

fn set_mutation(spec: &'static FacetSpec, input: FilterInput) -> Result<Mutation, FilterError> {
    let facet = spec.name;
    if input == FilterInput::Clear {
        return Ok(Mutation::Set { facet, value: None });
    }
    let value = match (spec.kind, input) {
        (FacetKind::Multi, FilterInput::Values(values)) => {
            let members: BTreeSet<String> =
                values.iter().filter_map(|v| canonical_option(v)).collect();
            Some(FacetValue::Set(members))
        }
        (FacetKind::Multi, FilterInput::Text(text)) => {
            canonical_option(&text).map(|member| FacetValue::Set(BTreeSet::from([member])))
        }
        (FacetKind::Single, FilterInput::Text(text)) => canonical_option(&text).map(FacetValue::Text),
        (FacetKind::RangeFrom | FacetKind::RangeTo, FilterInput::Number(n)) => {
            Some(FacetValue::Number(clamp_number(n)))
        }
        (FacetKind::RangeFrom | FacetKind::RangeTo, FilterInput::Text(text)) => {
            if text.trim().is_empty() {
                None
            } else {
                match coerce_number(&text) {
                    Some(n) => Some(FacetValue::Number(n)),
                    None => {
                        tracing::debug!("Ignoring non-numeric input {:?} for {}", text, facet);
                        return Ok(Mutation::Keep);
                    }
                }
            }
        }
        (FacetKind::Flag, FilterInput::Flag(b)) => Some(FacetValue::Flag(b)),
        (FacetKind::Flag, FilterInput::Text(text)) => match text.trim() {
            "true" => Some(FacetValue::Flag(true)),
            "false" => Some(FacetValue::Flag(false)),
            "" => None,
            other => {
                tracing::debug!("Ignoring non-boolean input {:?} for {}", other, facet);
                return Ok(Mutation::Keep);
            }
        },
        (_, FilterInput::Values(_)) => return Err(mismatch(spec, "a value list")),
        (_, FilterInput::Number(_)) => return Err(mismatch(spec, "a number")),
        (_, FilterInput::Flag(_)) => return Err(mismatch(spec, "a boolean")),
        (_, FilterInput::Clear) => None,
    };
    Ok(Mutation::Set { facet, value })
}
