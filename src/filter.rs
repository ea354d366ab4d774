use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::config::{FilterSpec, StringOp};
use crate::record::{coerce_datetime, coerce_f64, coerce_string, parse_datetime, Record};

/// The trade dataset encodes transaction type as 0/1; category filters see
/// the decoded labels instead.
pub const TRANSACTION_TYPE_FIELD: &str = "trade_transaction_type";

fn transaction_type_label(raw: &str) -> &str {
    match raw {
        "0" => "Buy",
        "1" => "Sell",
        other => other,
    }
}

/// Apply every configured filter conjunctively: a record passes only if it
/// satisfies all specs. Pure; the input is not mutated.
pub fn apply_filters(records: &[Record], filters: &HashMap<String, FilterSpec>) -> Vec<Record> {
    let active: Vec<(&String, &FilterSpec)> =
        filters.iter().filter(|(_, spec)| !spec.is_empty()).collect();
    if active.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| {
            active
                .iter()
                .all(|(field, spec)| matches_spec(record, field, spec))
        })
        .cloned()
        .collect()
}

fn matches_spec(record: &Record, field: &str, spec: &FilterSpec) -> bool {
    let value = record.get(field);
    match spec {
        FilterSpec::Text { operator, value: needle } => {
            let haystack = value
                .and_then(coerce_string)
                .unwrap_or_default()
                .to_lowercase();
            let needle = needle.trim().to_lowercase();
            match operator {
                StringOp::Contains => haystack.contains(&needle),
                StringOp::Equals => haystack == needle,
                StringOp::StartsWith => haystack.starts_with(&needle),
                StringOp::EndsWith => haystack.ends_with(&needle),
            }
        }
        FilterSpec::Numeric { min, max } => {
            // A record that fails numeric coercion is rejected rather than
            // treated as satisfying an unbounded range.
            let Some(n) = value.and_then(coerce_f64) else {
                return false;
            };
            if let Some(min) = min {
                if n < *min {
                    return false;
                }
            }
            if let Some(max) = max {
                if n > *max {
                    return false;
                }
            }
            true
        }
        FilterSpec::Category { selected_values } => {
            let Some(raw) = value.and_then(coerce_string) else {
                return false;
            };
            let label = if field == TRANSACTION_TYPE_FIELD {
                transaction_type_label(&raw).to_string()
            } else {
                raw
            };
            selected_values.iter().any(|v| v == &label)
        }
        FilterSpec::Date { start, end } => {
            let Some(when) = value.and_then(coerce_datetime) else {
                return false;
            };
            if let Some(lo) = start.as_deref().and_then(day_start) {
                if when < lo {
                    return false;
                }
            }
            if let Some(hi) = end.as_deref().and_then(day_end) {
                if when > hi {
                    return false;
                }
            }
            true
        }
    }
}

fn day_start(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s).map(|dt| dt.date().and_hms_opt(0, 0, 0).unwrap_or(dt))
}

// End bound is inclusive through the last millisecond of the day.
fn day_end(s: &str) -> Option<NaiveDateTime> {
    parse_datetime(s).map(|dt| dt.date().and_hms_milli_opt(23, 59, 59, 999).unwrap_or(dt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn record(fields: &[(&str, Value)]) -> Record {
        let mut m = Map::new();
        for (k, v) in fields {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    fn sample() -> Vec<Record> {
        vec![
            record(&[
                ("commodity", json!("Gold")),
                ("mtm_pnl", json!(120.0)),
                ("trade_date", json!("2024-01-10")),
                ("trade_transaction_type", json!(0)),
            ]),
            record(&[
                ("commodity", json!("Silver")),
                ("mtm_pnl", json!(-40.0)),
                ("trade_date", json!("2024-02-20")),
                ("trade_transaction_type", json!(1)),
            ]),
            record(&[
                ("commodity", json!("Goldman Basket")),
                ("mtm_pnl", json!("n/a")),
                ("trade_date", json!("bad date")),
                ("trade_transaction_type", json!(0)),
            ]),
        ]
    }

    fn single(field: &str, spec: FilterSpec) -> HashMap<String, FilterSpec> {
        let mut filters = HashMap::new();
        filters.insert(field.to_string(), spec);
        filters
    }

    #[test]
    fn test_no_filters_passes_all() {
        let records = sample();
        assert_eq!(apply_filters(&records, &HashMap::new()).len(), 3);
    }

    #[test]
    fn test_text_contains_case_insensitive() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single(
                "commodity",
                FilterSpec::Text {
                    operator: StringOp::Contains,
                    value: "GOLD".to_string(),
                },
            ),
        );
        assert_eq!(out.len(), 2); // Gold and Goldman Basket
    }

    #[test]
    fn test_text_equals() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single(
                "commodity",
                FilterSpec::Text {
                    operator: StringOp::Equals,
                    value: "gold".to_string(),
                },
            ),
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_numeric_range_rejects_unparseable() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single(
                "mtm_pnl",
                FilterSpec::Numeric {
                    min: Some(-100.0),
                    max: None,
                },
            ),
        );
        // the "n/a" record fails coercion and is rejected
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_category_translates_transaction_type() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single(
                "trade_transaction_type",
                FilterSpec::Category {
                    selected_values: vec!["Buy".to_string()],
                },
            ),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_date_range_inclusive_bounds() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single(
                "trade_date",
                FilterSpec::Date {
                    start: Some("2024-01-10".to_string()),
                    end: Some("2024-02-20".to_string()),
                },
            ),
        );
        // both parseable dates fall inside the inclusive range; the
        // unparseable one is rejected
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_empty_spec_is_noop() {
        let records = sample();
        let out = apply_filters(
            &records,
            &single("commodity", FilterSpec::default()),
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let records = sample();
        let mut filters = single(
            "commodity",
            FilterSpec::Text {
                operator: StringOp::Contains,
                value: "gold".to_string(),
            },
        );
        filters.insert(
            "mtm_pnl".to_string(),
            FilterSpec::Numeric {
                min: Some(0.0),
                max: None,
            },
        );
        let out = apply_filters(&records, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["commodity"], json!("Gold"));
    }
}
