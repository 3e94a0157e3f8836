//! Canonical query codec shared by the search executor and the count requests.
//!
//! A [`FilterState`] becomes a flat list of key/value pairs in schema order.
//! Multi-valued facets are emitted as repeated keys; every member is escaped
//! (`\` and `,`) so the repeated form and the comma-joined form convert into
//! each other without loss. Field names used by the UI or the backend that
//! differ from the canonical schema name are translated here and nowhere else.

use std::collections::BTreeSet;

use crate::normalization::{canonical_option, coerce_number};
use crate::schema::{self, FacetKind, FacetSpec};
use crate::types::{FacetValue, FilterState};

/// Alternative field names accepted on input, mapped to the canonical name.
pub const FIELD_ALIASES: &[(&str, &str)] = &[("make", "brand")];

/// Resolve a field name (canonical or alias) to its schema entry.
pub fn canonical_field(name: &str) -> Option<&'static FacetSpec> {
    let canonical = FIELD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name);
    schema::lookup(canonical)
}

/// Ordered key/value pairs describing a search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CanonicalQuery {
    pairs: Vec<(String, String)>,
}

impl CanonicalQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// All values stored under `key`, in order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Percent-encoded `application/x-www-form-urlencoded` string.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// Parse a query string, with or without a leading `?`.
    pub fn from_query_string(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self::from_pairs(url::form_urlencoded::parse(raw.as_bytes()).into_owned())
    }

    /// Merge repeated keys into one comma-joined value per key.
    ///
    /// Values are already escaped by [`build_query`], so joining is lossless.
    pub fn to_comma_joined(&self) -> CanonicalQuery {
        let mut merged: Vec<(String, String)> = Vec::new();
        for (key, value) in &self.pairs {
            match merged.iter_mut().find(|(k, _)| k == key) {
                Some((_, joined)) => {
                    joined.push(',');
                    joined.push_str(value);
                }
                None => merged.push((key.clone(), value.clone())),
            }
        }
        CanonicalQuery { pairs: merged }
    }

    /// Split comma-joined multi-facet values back into repeated keys.
    pub fn to_repeated(&self) -> CanonicalQuery {
        let mut out = CanonicalQuery::new();
        for (key, value) in &self.pairs {
            let multi = canonical_field(key).is_some_and(|spec| spec.kind == FacetKind::Multi);
            if multi {
                for part in split_escaped(value) {
                    out.push(key.clone(), escape_value(&part));
                }
            } else {
                out.push(key.clone(), value.clone());
            }
        }
        out
    }
}

/// Escape `\` and `,` inside one multi-facet member.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ',') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split a value on unescaped commas and unescape each part.
///
/// A trailing lone backslash is kept literally.
pub fn split_escaped(value: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => current.push(next),
                None => current.push('\\'),
            },
            ',' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Serialize a filter state into its canonical query.
///
/// Facets appear in schema order and multi members in sorted order; empty
/// facets are omitted. Keys that are not part of the schema are dropped.
pub fn build_query(state: &FilterState) -> CanonicalQuery {
    let mut query = CanonicalQuery::new();
    for spec in schema::FACETS {
        let Some(value) = state.get(spec.name) else {
            continue;
        };
        match value {
            FacetValue::Set(members) => {
                for member in members {
                    query.push(spec.name, escape_value(member));
                }
            }
            FacetValue::Text(text) => query.push(spec.name, text.clone()),
            FacetValue::Number(n) => query.push(spec.name, n.to_string()),
            FacetValue::Flag(b) => query.push(spec.name, if *b { "true" } else { "false" }),
        }
    }
    query
}

/// Rebuild a filter state from a canonical (or alias-using) query.
///
/// Accepts repeated and comma-joined multi values alike. Unknown keys and
/// unparsable values are skipped; see [`unknown_keys`].
pub fn parse_query(query: &CanonicalQuery) -> FilterState {
    let mut state = FilterState::new();
    for (key, raw) in query.pairs() {
        let Some(spec) = canonical_field(key) else {
            continue;
        };
        match spec.kind {
            FacetKind::Multi => {
                let mut members: BTreeSet<String> = state.members(spec.name);
                members.extend(
                    split_escaped(raw)
                        .iter()
                        .filter_map(|part| canonical_option(part)),
                );
                state.insert(spec.name, FacetValue::Set(members));
            }
            FacetKind::Single => {
                if let Some(text) = canonical_option(raw) {
                    state.insert(spec.name, FacetValue::Text(text));
                }
            }
            FacetKind::RangeFrom | FacetKind::RangeTo => {
                if let Some(n) = coerce_number(raw) {
                    state.insert(spec.name, FacetValue::Number(n));
                }
            }
            FacetKind::Flag => match raw.as_str() {
                "true" => state.insert(spec.name, FacetValue::Flag(true)),
                "false" => state.insert(spec.name, FacetValue::Flag(false)),
                _ => {}
            },
        }
    }
    state
}

/// Keys in `query` that do not name a facet, even through an alias.
pub fn unknown_keys(query: &CanonicalQuery) -> Vec<&str> {
    query
        .pairs()
        .iter()
        .map(|(k, _)| k.as_str())
        .filter(|k| canonical_field(k).is_none())
        .collect()
}
