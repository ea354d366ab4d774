use std::collections::HashMap;

use crate::config::AggFn;
use crate::record::{coerce_f64, coerce_string, Record};

impl AggFn {
    /// Reduce the numeric values of one group. Inputs are already coerced
    /// and finite. Empty groups reduce to the function's identity (0, or 1
    /// for product) to keep the output matrix rectangular.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            AggFn::Sum => values.iter().sum(),
            AggFn::Count => values.len() as f64,
            AggFn::Average => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            AggFn::Min => values.iter().copied().reduce(f64::min).unwrap_or(0.0),
            AggFn::Max => values.iter().copied().reduce(f64::max).unwrap_or(0.0),
            AggFn::Product => values.iter().product(),
        }
    }
}

/// Maps a synthesized `"<field>_<legend>"` key back to its parts so the
/// materializer can reconstruct display names.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendKey {
    pub key: String,
    pub field: String,
    pub legend: String,
}

/// One axis category after aggregation. `values` is keyed by the value
/// field (or by the synthesized field-legend key when a legend is set) and
/// kept in insertion order so downstream output is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedGroup {
    pub axis_value: String,
    pub values: Vec<(String, f64)>,
    pub legend_keys: Vec<LegendKey>,
}

impl AggregatedGroup {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }
}

/// Group filtered records by the axis field (and optionally a legend field)
/// and reduce each value field per group.
///
/// Records contributing to none of the value fields are dropped before
/// grouping. Group order follows first occurrence of the axis (or
/// axis|legend composite) key in the record stream; sorting happens later.
pub fn aggregate(
    records: &[Record],
    axis: &str,
    legend: Option<&str>,
    value_fields: &[String],
    aggregations: &HashMap<String, AggFn>,
) -> Vec<AggregatedGroup> {
    let contributing: Vec<&Record> = records
        .iter()
        .filter(|r| {
            value_fields
                .iter()
                .any(|f| r.get(f).and_then(coerce_f64).is_some())
        })
        .collect();

    match legend {
        Some(legend) => aggregate_with_legend(&contributing, axis, legend, value_fields, aggregations),
        None => aggregate_by_axis(&contributing, axis, value_fields, aggregations),
    }
}

struct Accumulator {
    axis_value: String,
    legend_value: Option<String>,
    samples: HashMap<String, Vec<f64>>,
}

/// Collect per-group numeric samples keyed by `key(record)`, preserving
/// first-occurrence order of the keys.
fn collect_groups(
    records: &[&Record],
    value_fields: &[String],
    key: impl Fn(&Record) -> Option<(String, String, Option<String>)>,
) -> Vec<Accumulator> {
    let mut order: Vec<Accumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some((group_key, axis_value, legend_value)) = key(record) else {
            continue;
        };
        let slot = *index.entry(group_key).or_insert_with(|| {
            order.push(Accumulator {
                axis_value,
                legend_value,
                samples: HashMap::new(),
            });
            order.len() - 1
        });
        for field in value_fields {
            if let Some(n) = record.get(field).and_then(coerce_f64) {
                order[slot].samples.entry(field.clone()).or_default().push(n);
            }
        }
    }

    order
}

fn aggregate_by_axis(
    records: &[&Record],
    axis: &str,
    value_fields: &[String],
    aggregations: &HashMap<String, AggFn>,
) -> Vec<AggregatedGroup> {
    let groups = collect_groups(records, value_fields, |record| {
        let axis_value = record.get(axis).and_then(coerce_string)?;
        Some((axis_value.clone(), axis_value, None))
    });

    groups
        .into_iter()
        .map(|group| {
            let values = value_fields
                .iter()
                .map(|field| {
                    let agg = aggregations.get(field).copied().unwrap_or_default();
                    let samples = group.samples.get(field).map(Vec::as_slice).unwrap_or(&[]);
                    (field.clone(), agg.reduce(samples))
                })
                .collect();
            AggregatedGroup {
                axis_value: group.axis_value,
                values,
                legend_keys: Vec::new(),
            }
        })
        .collect()
}

fn aggregate_with_legend(
    records: &[&Record],
    axis: &str,
    legend: &str,
    value_fields: &[String],
    aggregations: &HashMap<String, AggFn>,
) -> Vec<AggregatedGroup> {
    // Records missing either key are skipped.
    let composites = collect_groups(records, value_fields, |record| {
        let axis_value = record.get(axis).and_then(coerce_string)?;
        let legend_value = record.get(legend).and_then(coerce_string)?;
        let composite = format!("{axis_value}|{legend_value}");
        Some((composite, axis_value, Some(legend_value)))
    });

    // Re-key composites into per-axis groups: each (field, legend) pair
    // becomes a synthesized "<field>_<legend>" entry on its axis row.
    let mut order: Vec<AggregatedGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for composite in composites {
        let legend_value = composite
            .legend_value
            .expect("composite groups always carry a legend value");
        let slot = *index.entry(composite.axis_value.clone()).or_insert_with(|| {
            order.push(AggregatedGroup {
                axis_value: composite.axis_value.clone(),
                values: Vec::new(),
                legend_keys: Vec::new(),
            });
            order.len() - 1
        });

        for field in value_fields {
            let Some(samples) = composite.samples.get(field) else {
                continue;
            };
            let agg = aggregations.get(field).copied().unwrap_or_default();
            let key = format!("{field}_{legend_value}");
            order[slot].values.push((key.clone(), agg.reduce(samples)));
            order[slot].legend_keys.push(LegendKey {
                key,
                field: field.clone(),
                legend: legend_value.clone(),
            });
        }
    }

    order
}
