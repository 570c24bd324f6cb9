use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
}

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub value: f64,
    pub currency_code: String,
}

impl Price {
    pub fn new(value: f64, currency_code: impl Into<String>) -> Self {
        Self {
            value: round_to_cents(value),
            currency_code: currency_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    pub brand_name: String,
    pub colors: BTreeSet<Color>,
    pub price: Price,
}

/// Rounds to the storefront's displayed 2-digit scale: the half-way point at
/// the third digit and anything beyond it rounds up. Scaled-integer math so
/// inputs like 1.005 survive their binary-float representation.
pub fn round_to_cents(value: f64) -> f64 {
    let mills = (value * 1000.0).round() as i64;
    let cents = (mills + 5).div_euclid(10);
    cents as f64 / 100.0
}
