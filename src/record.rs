use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

/// A single trade row: open schema, field name -> scalar JSON value.
/// Fields are not statically typed; coercion helpers below decide how a
/// value participates in filtering and aggregation.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Create a Dataset from a JSON array of objects
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let mut records = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;
            records.push(obj.clone());
        }

        Ok(Self { records })
    }
}

/// Coerce a field value to a finite number. Strings are trimmed and parsed;
/// null, booleans and non-finite results yield None.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a field value to its display string. Null and empty strings yield
/// None so grouping can skip records with no usable key.
pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const YEAR_MIN: i32 = 1900;
const YEAR_MAX: i32 = 2100;

// Formats tried after the compact YYYYMM / YYYY forms. Date-only formats
// resolve to midnight.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%SZ",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];

/// Parse a string as a point in time. Handles the compact `YYYYMM` and
/// `YYYY` period forms used by trade datasets (year restricted to
/// [1900, 2100]) before falling back to common date formats.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if s.len() == 6 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        if (YEAR_MIN..=YEAR_MAX).contains(&year) && (1..=12).contains(&month) {
            return NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.into());
        }
        return None;
    }

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = s.parse().ok()?;
        if (YEAR_MIN..=YEAR_MAX).contains(&year) {
            return NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.into());
        }
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.into());
        }
    }

    None
}

/// Coerce a field value to a point in time via its string form.
pub fn coerce_datetime(value: &Value) -> Option<NaiveDateTime> {
    coerce_string(value).and_then(|s| parse_datetime(&s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        let value = json!([
            {"commodity": "Gold", "mtm_pnl": 10.5},
            {"commodity": "Silver", "mtm_pnl": null},
        ]);
        let dataset = Dataset::from_json(&value).unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.records[0]["commodity"], json!("Gold"));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(Dataset::from_json(&json!([1, 2])).is_err());
        assert!(Dataset::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_coerce_f64() {
        assert_eq!(coerce_f64(&json!(3.5)), Some(3.5));
        assert_eq!(coerce_f64(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_f64(&json!("abc")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
        assert_eq!(coerce_f64(&json!("inf")), None);
    }

    #[test]
    fn test_coerce_string_skips_empty() {
        assert_eq!(coerce_string(&json!("")), None);
        assert_eq!(coerce_string(&json!("  ")), None);
        assert_eq!(coerce_string(&json!(null)), None);
        assert_eq!(coerce_string(&json!(7)), Some("7".to_string()));
    }

    #[test]
    fn test_parse_datetime_period_forms() {
        assert!(parse_datetime("202401").is_some());
        assert!(parse_datetime("202413").is_none()); // month out of range
        assert!(parse_datetime("189901").is_none()); // year out of range
        assert!(parse_datetime("2024").is_some());
        assert!(parse_datetime("1776").is_none());
    }

    #[test]
    fn test_parse_datetime_fallback_formats() {
        assert!(parse_datetime("2024-01-15").is_some());
        assert!(parse_datetime("2024-01-15 10:30:00").is_some());
        assert!(parse_datetime("01/15/2024").is_some());
        assert!(parse_datetime("not a date").is_none());
    }
}
