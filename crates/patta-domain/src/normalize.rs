//! Field normalisation
//!
//! Pure, total functions turning loosely-typed values into canonical ones.
//! None of them can fail: every unparseable input degrades to a default.
//!
//! Composite area descriptions such as
//! `"0.4 ha (habitation), 1.3 ha (self-cultivation)"` are summed. A number that
//! is not an area (a plot number, say) inside the same field is summed too;
//! the source text gives no way to tell the two apart.

use crate::claim::ClaimCategory;
use crate::field_map::FieldValue;
use regex::Regex;
use std::sync::LazyLock;

/// Sentinel used for absent text attributes
pub const UNKNOWN: &str = "Unknown";

static NUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.?\d*").expect("numeric run pattern is valid"));

/// Normalise an area value of any shape into a finite, non-negative number
///
/// # Examples
///
/// ```
/// use patta_domain::{normalize_area, FieldValue};
///
/// assert_eq!(normalize_area(&FieldValue::Null), 0.0);
/// assert_eq!(normalize_area(&2.5.into()), 2.5);
/// assert_eq!(normalize_area(&"2.5 ha".into()), 2.5);
/// ```
pub fn normalize_area(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Number(n) => n.as_f64().map_or(0.0, sanitize),
        FieldValue::Text(s) => normalize_area_str(s),
        _ => 0.0,
    }
}

/// Normalise a textual area expression
///
/// Tries a plain float first, then sums every numeric run in the text.
pub fn normalize_area_str(input: &str) -> f64 {
    let cleaned = input.trim().to_lowercase();
    if cleaned.is_empty() {
        return 0.0;
    }

    if let Ok(value) = cleaned.parse::<f64>() {
        return sanitize(value);
    }

    let total: f64 = NUMERIC_RUN
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .sum();

    sanitize(total)
}

/// Coerce any value into one of the two canonical categories
///
/// Unrecognised values (and non-text values) become `Individual`.
pub fn normalize_category(value: &FieldValue) -> ClaimCategory {
    value
        .as_str()
        .and_then(ClaimCategory::parse)
        .unwrap_or_default()
}

/// Stringify and trim a value, using [`UNKNOWN`] when nothing is left
pub fn canonical_text(value: &FieldValue) -> String {
    if value.is_blank() {
        return UNKNOWN.to_string();
    }
    let text = value.to_string();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(normalize_area(&FieldValue::Null), 0.0);
        assert_eq!(normalize_area(&"".into()), 0.0);
        assert_eq!(normalize_area(&"   ".into()), 0.0);
    }

    #[test]
    fn test_numeric_identity() {
        assert_eq!(normalize_area(&FieldValue::from(2.5)), 2.5);
        assert_eq!(normalize_area(&FieldValue::from(0.0)), 0.0);
    }

    #[test]
    fn test_plain_and_unit_strings() {
        assert_eq!(normalize_area(&"2.5".into()), 2.5);
        assert_eq!(normalize_area(&"2.5 ha".into()), 2.5);
        assert_eq!(normalize_area(&"Area: 2.8 ha".into()), 2.8);
        assert_eq!(normalize_area(&"1.2 hectares for cultivation".into()), 1.2);
    }

    #[test]
    fn test_composite_area_is_summed() {
        let area = normalize_area(&"0.4 ha (habitation), 1.3 ha (self-cultivation)".into());
        assert!(approx(area, 1.7), "got {}", area);

        let area = normalize_area(&"3.0 ha (individual), 1.5 ha (community)".into());
        assert!(approx(area, 4.5), "got {}", area);
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(normalize_area(&"No area specified".into()), 0.0);
    }

    #[test]
    fn test_degenerate_values_clamp_to_zero() {
        assert_eq!(normalize_area(&FieldValue::from(-4.0)), 0.0);
        assert_eq!(normalize_area(&FieldValue::from(f64::NAN)), 0.0);
        assert_eq!(normalize_area(&FieldValue::from(f64::INFINITY)), 0.0);
        assert_eq!(normalize_area(&"inf".into()), 0.0);
        assert_eq!(normalize_area(&"NaN".into()), 0.0);
        assert_eq!(normalize_area(&"-3".into()), 0.0);
    }

    #[test]
    fn test_non_scalar_values() {
        assert_eq!(normalize_area(&FieldValue::Bool(true)), 0.0);
        assert_eq!(normalize_area(&FieldValue::List(vec![FieldValue::from(2.0)])), 0.0);
    }

    #[test]
    fn test_category_coercion() {
        assert_eq!(normalize_category(&"community".into()), ClaimCategory::Community);
        assert_eq!(normalize_category(&"  COMMUNITY ".into()), ClaimCategory::Community);
        assert_eq!(normalize_category(&"Individual".into()), ClaimCategory::Individual);
        assert_eq!(normalize_category(&"joint".into()), ClaimCategory::Individual);
        assert_eq!(normalize_category(&FieldValue::Null), ClaimCategory::Individual);
        assert_eq!(normalize_category(&FieldValue::from(1.0)), ClaimCategory::Individual);
    }

    #[test]
    fn test_canonical_text() {
        assert_eq!(canonical_text(&FieldValue::Null), UNKNOWN);
        assert_eq!(canonical_text(&"".into()), UNKNOWN);
        assert_eq!(canonical_text(&"  Devpur  ".into()), "Devpur");
        assert_eq!(canonical_text(&FieldValue::from(12_u64)), "12");
    }
}
