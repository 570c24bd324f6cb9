use std::collections::BTreeSet;

use serde_json::Value;

use crate::crawler::models::{Color, Price, Product};
use crate::error::ScrapeError;

/// The search document's entity list; a response without one is unusable.
pub fn entities(document: &Value) -> Result<&[Value], ScrapeError> {
    document
        .get("entities")
        .and_then(|v| v.as_array())
        .map(Vec::as_slice)
        .ok_or(ScrapeError::MalformedField {
            field: "entities",
            value: "missing".to_string(),
        })
}

/// Maps one search entity onto the shared product model.
pub fn parse_entity(entity: &Value) -> Result<Product, ScrapeError> {
    let raw_id = entity
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| missing("id"))?;
    let id: i64 = raw_id.parse().map_err(|_| ScrapeError::MalformedField {
        field: "id",
        value: raw_id.to_string(),
    })?;

    let attributes = entity.get("attributes").ok_or_else(|| missing("attributes"))?;
    let brand_name = primary_label(attributes, "brand")?;
    let product_name = primary_label(attributes, "name")?;

    let mut colors = BTreeSet::new();
    if let Some(values) = attributes
        .pointer("/colorDetail/values")
        .and_then(|v| v.as_array())
    {
        for value in values {
            if let Some(label) = value.get("label").and_then(|v| v.as_str()) {
                colors.insert(Color::new(label));
            }
        }
    }

    let min = entity
        .pointer("/priceRange/min")
        .ok_or_else(|| missing("priceRange.min"))?;
    let with_tax = match min.get("withTax") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| missing("priceRange.min.withTax"))?;
    let currency_code = min
        .get("currencyCode")
        .and_then(|v| v.as_str())
        .ok_or_else(|| missing("priceRange.min.currencyCode"))?;

    Ok(Product {
        id,
        product_name,
        brand_name,
        colors,
        // The API encodes prices in minor units, x100.
        price: Price::new(with_tax / 100.0, currency_code),
    })
}

/// The primary localized value of `attributes.<field>.values.label`. The
/// source format supplies one value; when it arrives as a list, the first
/// entry is the primary one.
fn primary_label(attributes: &Value, field: &'static str) -> Result<String, ScrapeError> {
    let values = attributes
        .pointer(&format!("/{}/values", field))
        .ok_or_else(|| missing(field))?;

    let label = match values {
        Value::Array(items) => items.first().and_then(|item| item.get("label")),
        other => other.get("label"),
    };

    label
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| missing(field))
}

fn missing(field: &'static str) -> ScrapeError {
    ScrapeError::MalformedField {
        field,
        value: "missing".to_string(),
    }
}
