//! Option list normalization

use dashvar_domain::{DomainResult, SortOrder, VariableValue};

/// Returns the values ordered by `order`. The sort is stable, so equal
/// values keep their relative order.
#[must_use]
pub fn sort_values(values: &[VariableValue], order: SortOrder) -> Vec<VariableValue> {
    let mut sorted = values.to_vec();
    match order {
        SortOrder::Disabled => {}
        SortOrder::Ascending => sorted.sort(),
        SortOrder::Descending => sorted.sort_by(|a, b| b.cmp(a)),
    }
    sorted
}

/// Returns true if both lists hold equal values in the same order.
#[must_use]
pub fn values_equal(a: &[VariableValue], b: &[VariableValue]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Parses a comma-separated literal list: items are trimmed and empty
/// items dropped.
#[must_use]
pub fn parse_custom_values(custom_value: &str) -> Vec<VariableValue> {
    custom_value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(VariableValue::text)
        .collect()
}

/// Converts raw JSON values into scalar option values.
///
/// # Errors
///
/// Fails on the first value that is not a string, number or boolean.
pub fn normalize_values(raw: &[serde_json::Value]) -> DomainResult<Vec<VariableValue>> {
    raw.iter().map(VariableValue::from_json).collect()
}
