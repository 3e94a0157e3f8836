/// Brand facet, root of the catalog cascade.
pub const BRAND: &str = "brand";
/// Model facet, constrained by the selected brands.
pub const MODEL: &str = "model";
/// Generation facet, constrained by the selected models.
pub const GENERATION: &str = "generation";

/// How a facet stores its value and how it is serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacetKind {
    /// One free-form string (`condition`, `city`).
    Single,
    /// A set of strings, OR-ed together when matching.
    Multi,
    /// Lower bound of a numeric range (`priceFrom`).
    RangeFrom,
    /// Upper bound of a numeric range (`priceTo`).
    RangeTo,
    /// Boolean switch, serialized as `"true"` / `"false"`.
    Flag,
}

/// Static description of one filterable dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacetSpec {
    pub name: &'static str,
    pub kind: FacetKind,
    /// Upstream facet whose selection bounds this facet's option domain.
    pub parent: Option<&'static str>,
}

impl FacetSpec {
    const fn new(name: &'static str, kind: FacetKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
        }
    }

    const fn child_of(name: &'static str, parent: &'static str) -> Self {
        Self {
            name,
            kind: FacetKind::Multi,
            parent: Some(parent),
        }
    }

    /// Numeric listing attribute a range bound applies to (`priceFrom` -> `price`).
    pub fn range_field(&self) -> Option<&'static str> {
        match self.kind {
            FacetKind::RangeFrom => self.name.strip_suffix("From"),
            FacetKind::RangeTo => self.name.strip_suffix("To"),
            _ => None,
        }
    }
}

/// Every facet the storefront filters on, in canonical query order.
pub const FACETS: &[FacetSpec] = &[
    FacetSpec::new(BRAND, FacetKind::Multi),
    FacetSpec::child_of(MODEL, BRAND),
    FacetSpec::child_of(GENERATION, MODEL),
    FacetSpec::new("bodyType", FacetKind::Multi),
    FacetSpec::new("fuelType", FacetKind::Multi),
    FacetSpec::new("transmission", FacetKind::Multi),
    FacetSpec::new("driveType", FacetKind::Multi),
    FacetSpec::new("color", FacetKind::Multi),
    FacetSpec::new("condition", FacetKind::Single),
    FacetSpec::new("city", FacetKind::Single),
    FacetSpec::new("priceFrom", FacetKind::RangeFrom),
    FacetSpec::new("priceTo", FacetKind::RangeTo),
    FacetSpec::new("yearFrom", FacetKind::RangeFrom),
    FacetSpec::new("yearTo", FacetKind::RangeTo),
    FacetSpec::new("mileageFrom", FacetKind::RangeFrom),
    FacetSpec::new("mileageTo", FacetKind::RangeTo),
    FacetSpec::new("engineVolumeFrom", FacetKind::RangeFrom),
    FacetSpec::new("engineVolumeTo", FacetKind::RangeTo),
    FacetSpec::new("powerFrom", FacetKind::RangeFrom),
    FacetSpec::new("powerTo", FacetKind::RangeTo),
    FacetSpec::new("customsCleared", FacetKind::Flag),
    FacetSpec::new("exchangePossible", FacetKind::Flag),
    FacetSpec::new("creditAvailable", FacetKind::Flag),
    FacetSpec::new("withPhotos", FacetKind::Flag),
];

/// Look up a facet by its canonical name.
pub fn lookup(name: &str) -> Option<&'static FacetSpec> {
    FACETS.iter().find(|spec| spec.name == name)
}

/// Facets that carry per-value counts (the selectable option lists).
pub fn counted_facets() -> impl Iterator<Item = &'static FacetSpec> {
    FACETS
        .iter()
        .filter(|spec| matches!(spec.kind, FacetKind::Multi | FacetKind::Single))
}
