use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::AggregatedGroup;
use crate::config::AggFn;
use crate::profile::display_name;

/// One named series, positionally aligned to `ChartData::categories`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub name: String,
    pub data: Vec<f64>,
}

/// Chart-library-agnostic output: x-categories plus named numeric series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Per-category totals across all series. All series of one chart share
    /// a single stack group, so downstream normalizers (percent stacking)
    /// can convert absolute values to percentages without re-aggregating.
    pub fn stack_totals(&self) -> Vec<f64> {
        (0..self.categories.len())
            .map(|i| {
                self.series
                    .iter()
                    .map(|s| s.data.get(i).copied().unwrap_or(0.0))
                    .sum()
            })
            .collect()
    }
}

/// Convert aggregated groups into the flat categories+series structure.
///
/// Without a legend there is one series per value field ("Sum of Mtm Pnl").
/// With a legend there is one series per (value field, legend value) pair
/// actually observed ("NY - Sum of Mtm Pnl"); combinations absent for a
/// category materialize as 0, never null, so charts get a full rectangular
/// matrix.
pub fn materialize(
    groups: &[AggregatedGroup],
    value_fields: &[String],
    legend: Option<&str>,
    aggregations: &HashMap<String, AggFn>,
    headers: &HashMap<String, String>,
) -> ChartData {
    if groups.is_empty() {
        // "no data" propagates as a fully empty chart, not empty series
        return ChartData::default();
    }

    let categories: Vec<String> = groups.iter().map(|g| g.axis_value.clone()).collect();

    let field_label = |field: &str| -> String {
        let agg = aggregations.get(field).copied().unwrap_or_default();
        let display = headers
            .get(field)
            .cloned()
            .unwrap_or_else(|| display_name(field));
        format!("{} of {}", agg.label(), display)
    };

    let series = match legend {
        None => value_fields
            .iter()
            .map(|field| SeriesData {
                name: field_label(field),
                data: groups
                    .iter()
                    .map(|g| g.value(field).unwrap_or(0.0))
                    .collect(),
            })
            .collect(),
        Some(_) => {
            // Distinct synthesized keys in first-observed order.
            let mut keys: Vec<(String, String, String)> = Vec::new();
            for group in groups {
                for lk in &group.legend_keys {
                    if !keys.iter().any(|(key, _, _)| key == &lk.key) {
                        keys.push((lk.key.clone(), lk.field.clone(), lk.legend.clone()));
                    }
                }
            }

            keys.into_iter()
                .map(|(key, field, legend_value)| SeriesData {
                    name: format!("{} - {}", legend_value, field_label(&field)),
                    data: groups
                        .iter()
                        .map(|g| g.value(&key).unwrap_or(0.0))
                        .collect(),
                })
                .collect()
        }
    };

    ChartData { categories, series }
}
