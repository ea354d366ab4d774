use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::profile::{ColumnInfo, ColumnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    StackedBar,
    PercentStackedBar,
    HorizontalBar,
    Line,
    Area,
    /// Pie's category ("colorBy") field occupies the axis slot.
    Pie,
    Scatter,
}

/// Reduction applied to the numeric values within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AggFn {
    #[default]
    Sum,
    Count,
    Average,
    Min,
    Max,
    Product,
}

impl From<String> for AggFn {
    /// Unknown aggregation names fall back to sum.
    fn from(name: String) -> Self {
        match name.as_str() {
            "count" => AggFn::Count,
            "average" => AggFn::Average,
            "min" => AggFn::Min,
            "max" => AggFn::Max,
            "product" => AggFn::Product,
            _ => AggFn::Sum,
        }
    }
}

impl AggFn {
    /// Label used when synthesizing series names ("Sum of Mtm Pnl").
    pub fn label(&self) -> &'static str {
        match self {
            AggFn::Sum => "Sum",
            AggFn::Count => "Count",
            AggFn::Average => "Average",
            AggFn::Min => "Min",
            AggFn::Max => "Max",
            AggFn::Product => "Product",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum StringOp {
    #[default]
    Contains,
    Equals,
    StartsWith,
    EndsWith,
}

impl From<String> for StringOp {
    /// Unknown or missing operators default to contains.
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => StringOp::Equals,
            "startsWith" => StringOp::StartsWith,
            "endsWith" => StringOp::EndsWith,
            _ => StringOp::Contains,
        }
    }
}

/// Per-field filter predicate, one of four shapes. A spec with no
/// discriminating sub-fields set is treated as absent (see `is_empty`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterSpec {
    Text {
        #[serde(default)]
        operator: StringOp,
        #[serde(default)]
        value: String,
    },
    Numeric {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    Category {
        #[serde(rename = "selectedValues", default)]
        selected_values: Vec<String>,
    },
    Date {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
}

impl Default for FilterSpec {
    fn default() -> Self {
        FilterSpec::Text {
            operator: StringOp::Contains,
            value: String::new(),
        }
    }
}

impl FilterSpec {
    /// A cleared filter passes everything; the UI keeps the map entry, the
    /// evaluator skips it.
    pub fn is_empty(&self) -> bool {
        match self {
            FilterSpec::Text { value, .. } => value.trim().is_empty(),
            FilterSpec::Numeric { min, max } => min.is_none() && max.is_none(),
            FilterSpec::Category { selected_values } => selected_values.is_empty(),
            FilterSpec::Date { start, end } => start.is_none() && end.is_none(),
        }
    }
}

/// Caller-owned chart configuration: field roles, filters, aggregation
/// choices and display-label overrides. Immutable from the pipeline's point
/// of view; mutate through `apply_action`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub axis: Option<String>,
    pub legend: Option<String>,
    pub values: Vec<String>,
    pub aggregations: HashMap<String, AggFn>,
    pub filters: HashMap<String, FilterSpec>,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    Axis,
    Legend,
    Values,
    Filter,
}

impl FieldRole {
    fn name(&self) -> &'static str {
        match self {
            FieldRole::Axis => "axis",
            FieldRole::Legend => "legend",
            FieldRole::Values => "values",
            FieldRole::Filter => "filter",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigAction {
    SetChartKind(ChartKind),
    AssignField { field: String, role: FieldRole },
    RemoveField(String),
    SetFilter { field: String, spec: FilterSpec },
    ClearFilter(String),
    SetAggregation { field: String, agg: AggFn },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Field '{0}' does not exist in the dataset")]
    UnknownField(String),
    #[error("Field '{0}' is not numeric and cannot be used as a value field")]
    NonNumericValueField(String),
    #[error("The {role} slot is already occupied by '{field}'")]
    RoleOccupied { role: &'static str, field: String },
}

/// Pure reducer over chart configurations: returns a new config, leaving the
/// input untouched. A rejected action surfaces the reason and the caller
/// keeps the previous valid configuration.
pub fn apply_action(
    config: &ChartConfig,
    action: ConfigAction,
    columns: &[ColumnInfo],
) -> Result<ChartConfig, ConfigError> {
    let mut next = config.clone();
    match action {
        ConfigAction::SetChartKind(kind) => {
            next.kind = kind;
        }
        ConfigAction::AssignField { field, role } => {
            let column = columns
                .iter()
                .find(|c| c.key == field)
                .ok_or_else(|| ConfigError::UnknownField(field.clone()))?;

            match role {
                FieldRole::Axis => {
                    if let Some(current) = &next.axis {
                        if current != &field {
                            return Err(ConfigError::RoleOccupied {
                                role: role.name(),
                                field: current.clone(),
                            });
                        }
                    }
                }
                FieldRole::Legend => {
                    if let Some(current) = &next.legend {
                        if current != &field {
                            return Err(ConfigError::RoleOccupied {
                                role: role.name(),
                                field: current.clone(),
                            });
                        }
                    }
                }
                FieldRole::Values => {
                    if column.column_type != ColumnType::Numeric {
                        return Err(ConfigError::NonNumericValueField(field.clone()));
                    }
                }
                FieldRole::Filter => {}
            }

            // A field occupies at most one role; assigning moves it.
            detach_field(&mut next, &field);
            match role {
                FieldRole::Axis => next.axis = Some(field),
                FieldRole::Legend => next.legend = Some(field),
                FieldRole::Values => next.values.push(field),
                FieldRole::Filter => {
                    next.filters.entry(field).or_default();
                }
            }
        }
        ConfigAction::RemoveField(field) => {
            detach_field(&mut next, &field);
        }
        ConfigAction::SetFilter { field, spec } => {
            next.filters.insert(field, spec);
        }
        ConfigAction::ClearFilter(field) => {
            next.filters.remove(&field);
        }
        ConfigAction::SetAggregation { field, agg } => {
            next.aggregations.insert(field, agg);
        }
    }
    Ok(next)
}

fn detach_field(config: &mut ChartConfig, field: &str) {
    if config.axis.as_deref() == Some(field) {
        config.axis = None;
    }
    if config.legend.as_deref() == Some(field) {
        config.legend = None;
    }
    if let Some(pos) = config.values.iter().position(|v| v == field) {
        config.values.remove(pos);
        config.aggregations.remove(field);
    }
    config.filters.remove(field);
}
