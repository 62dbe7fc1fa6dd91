//! Display formatting for scale readings.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// Render grams with two fixed decimals, e.g. `12.345` → `"12.35"`.
#[must_use]
pub fn format_grams(value: f64) -> String {
    format!("{value:.2}")
}

/// Render a whole reading line with unit, e.g. `"Total: 12.35g"`.
#[must_use]
pub fn format_reading(label: &str, value: f64) -> String {
    format!("{label}: {}g", format_grams(value))
}
