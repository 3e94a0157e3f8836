//! Shared data model for the marketplace search filters.
//!
//! Declares the facet schema, the normalized `FilterState`, count snapshots and
//! backend wire types, the canonical query codec, brand/model/generation
//! cascade pruning, and the embedded fallback catalog. Everything here is pure
//! and synchronous; I/O, timing and caching live in `filter-engine`.

pub mod cascade;
pub mod normalization;
pub mod query;
pub mod schema;
pub mod static_catalog;
pub mod types;
