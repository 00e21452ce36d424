//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Formats a decimal amount as a USD price string.
///
/// Usage in templates: `{{ product.price|usd }}`
#[askama::filter_fn]
pub fn usd(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .parse::<f64>()
        .map_or_else(|_| format!("${raw}"), |amount| format!("${amount:.2}")))
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}
