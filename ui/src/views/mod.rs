pub mod attributes;
pub mod cascade;
pub mod option_list;
pub mod ranges;
pub mod summary;

use dioxus::core::spawn_forever;
use filter_engine::FilterInput;

use crate::host;

/// Human label for a facet or range field.
pub fn facet_label(name: &str) -> &str {
    match name {
        "brand" => "Brand",
        "model" => "Model",
        "generation" => "Generation",
        "bodyType" => "Body type",
        "fuelType" => "Fuel",
        "transmission" => "Transmission",
        "driveType" => "Drive",
        "color" => "Color",
        "condition" => "Condition",
        "city" => "City",
        "price" => "Price",
        "year" => "Year",
        "mileage" => "Mileage, km",
        "engineVolume" => "Engine, cm\u{00b3}",
        "power" => "Power, hp",
        "customsCleared" => "Customs cleared",
        "exchangePossible" => "Exchange possible",
        "creditAvailable" => "Credit available",
        "withPhotos" => "With photos",
        other => other,
    }
}

pub fn toggle(facet: &'static str, member: String) {
    let Some(engine) = host::engine() else {
        return;
    };
    spawn_forever(async move {
        if let Err(e) = engine.filters.toggle_value(facet, &member).await {
            tracing::warn!("Toggle on {} rejected: {}", facet, e);
        }
    });
}

pub fn set(facet: &'static str, input: FilterInput) {
    let Some(engine) = host::engine() else {
        return;
    };
    spawn_forever(async move {
        if let Err(e) = engine.filters.set_value(facet, input).await {
            tracing::warn!("Update of {} rejected: {}", facet, e);
        }
    });
}
