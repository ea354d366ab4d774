use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::record::{coerce_f64, coerce_string, parse_datetime, Record};

/// How many records the classifier samples (first N in iteration order).
pub const SAMPLE_SIZE: usize = 10;
/// Share of valid samples a type must win to claim the column.
pub const TYPE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Date,
    Text,
}

/// Derived column metadata; recomputed whenever the active record set changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub key: String,
    pub header: String,
    pub column_type: ColumnType,
}

/// Classify a field by majority vote over a fixed-size sample.
///
/// Only non-null, non-empty values count toward the vote. The numeric ratio
/// is compared before the date ratio, so a value like "202401" that matches
/// both counts as numeric when the ratios tie.
pub fn classify(records: &[Record], field: &str) -> ColumnType {
    let mut valid = 0usize;
    let mut numeric = 0usize;
    let mut date = 0usize;

    for record in records.iter().take(SAMPLE_SIZE) {
        let Some(value) = record.get(field) else {
            continue;
        };
        let Some(text) = coerce_string(value) else {
            continue;
        };
        valid += 1;
        if coerce_f64(value).is_some() {
            numeric += 1;
        }
        if parse_datetime(&text).is_some() {
            date += 1;
        }
    }

    if valid == 0 {
        return ColumnType::Text;
    }
    let valid = valid as f64;
    if numeric as f64 / valid >= TYPE_THRESHOLD {
        ColumnType::Numeric
    } else if date as f64 / valid >= TYPE_THRESHOLD {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

/// Profile every field present in the sample, preserving first-occurrence
/// order across records. `headers` supplies display-label overrides.
pub fn profile_columns(records: &[Record], headers: &HashMap<String, String>) -> Vec<ColumnInfo> {
    let mut keys: Vec<String> = Vec::new();
    for record in records.iter().take(SAMPLE_SIZE) {
        for key in record.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
    }

    keys.into_iter()
        .map(|key| {
            let header = headers
                .get(&key)
                .cloned()
                .unwrap_or_else(|| display_name(&key));
            let column_type = classify(records, &key);
            ColumnInfo {
                key,
                header,
                column_type,
            }
        })
        .collect()
}

/// Human-readable field label: snake_case -> Title Case.
pub fn display_name(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn records_for(field: &str, values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| {
                let mut m = Map::new();
                m.insert(field.to_string(), v);
                m
            })
            .collect()
    }

    #[test]
    fn test_majority_numeric() {
        // 8 numeric of 9 valid samples (null excluded): 0.88 >= 0.8
        let records = records_for(
            "v",
            vec![
                json!(1),
                json!(2),
                json!(3),
                json!(4),
                json!(5),
                json!(6),
                json!(7),
                json!(8),
                json!("x"),
                json!(null),
            ],
        );
        assert_eq!(classify(&records, "v"), ColumnType::Numeric);
    }

    #[test]
    fn test_minority_numeric_is_text() {
        let mut values = vec![json!("a")];
        values.extend((1..=9).map(|i| json!(format!("w{i}"))));
        let records = records_for("v", values);
        assert_eq!(classify(&records, "v"), ColumnType::Text);
    }

    #[test]
    fn test_yyyymm_is_numeric_first() {
        // every value matches both patterns; numeric is checked first
        let records = records_for("period", vec![json!("202401"), json!("202402")]);
        assert_eq!(classify(&records, "period"), ColumnType::Numeric);
    }

    #[test]
    fn test_date_column() {
        let records = records_for(
            "trade_date",
            vec![json!("2024-01-02"), json!("2024-01-03"), json!("2024-01-04")],
        );
        assert_eq!(classify(&records, "trade_date"), ColumnType::Date);
    }

    #[test]
    fn test_empty_field_is_text() {
        let records = records_for("v", vec![json!(null), json!("")]);
        assert_eq!(classify(&records, "v"), ColumnType::Text);
        assert_eq!(classify(&records, "missing"), ColumnType::Text);
    }

    #[test]
    fn test_sample_limited_to_first_ten() {
        // first 10 are numeric; the text tail is outside the sample
        let mut values: Vec<serde_json::Value> = (0..10).map(|i| json!(i)).collect();
        values.extend((0..10).map(|_| json!("x")));
        let records = records_for("v", values);
        assert_eq!(classify(&records, "v"), ColumnType::Numeric);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("mtm_pnl"), "Mtm Pnl");
        assert_eq!(display_name("commodity"), "Commodity");
        assert_eq!(display_name("p"), "P");
    }

    #[test]
    fn test_profile_columns_honors_overrides() {
        let mut record = Map::new();
        record.insert("mtm_pnl".to_string(), json!(5.0));
        let mut headers = HashMap::new();
        headers.insert("mtm_pnl".to_string(), "MTM PnL".to_string());
        let columns = profile_columns(&[record], &headers);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].header, "MTM PnL");
        assert_eq!(columns[0].column_type, ColumnType::Numeric);
    }
}
