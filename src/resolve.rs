use std::collections::HashMap;
use thiserror::Error;

use crate::config::{AggFn, ChartConfig, ChartKind};
use crate::profile::{ColumnInfo, ColumnType};

/// Configuration validated against the profiled columns, ready for the
/// aggregation engine. Aggregations are defaulted per value field.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub kind: ChartKind,
    pub axis: String,
    pub axis_type: ColumnType,
    pub legend: Option<String>,
    pub values: Vec<String>,
    pub aggregations: HashMap<String, AggFn>,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ResolveError {
    #[error("No axis field selected (pie charts use the category field as axis)")]
    MissingAxis,
    #[error("Field '{0}' does not exist in the dataset")]
    UnknownField(String),
    #[error("Value field '{0}' is not numeric")]
    NonNumericValue(String),
    #[error("Pie charts take exactly one value field, got {0}")]
    PieValueArity(usize),
    #[error("Scatter charts take exactly two value fields, got {0}")]
    ScatterValueArity(usize),
}

/// Validate a chart configuration and pin down the axis column type.
///
/// Configurations can arrive from outside the reducer (the AI chat layer
/// emits them as JSON), so every field is re-checked here even when the
/// config was built through `apply_action`.
pub fn resolve_config(
    config: &ChartConfig,
    columns: &[ColumnInfo],
) -> Result<ResolvedConfig, ResolveError> {
    let axis = config.axis.clone().ok_or(ResolveError::MissingAxis)?;
    let axis_column = find_column(columns, &axis)?;

    if let Some(legend) = &config.legend {
        find_column(columns, legend)?;
    }

    for value in &config.values {
        let column = find_column(columns, value)?;
        if column.column_type != ColumnType::Numeric {
            return Err(ResolveError::NonNumericValue(value.clone()));
        }
    }

    // Chart-kind arity constraints, checked before any aggregation runs.
    match config.kind {
        ChartKind::Pie if config.values.len() != 1 => {
            return Err(ResolveError::PieValueArity(config.values.len()));
        }
        ChartKind::Scatter if config.values.len() != 2 => {
            return Err(ResolveError::ScatterValueArity(config.values.len()));
        }
        _ => {}
    }

    let aggregations = config
        .values
        .iter()
        .map(|field| {
            let agg = config.aggregations.get(field).copied().unwrap_or_default();
            (field.clone(), agg)
        })
        .collect();

    Ok(ResolvedConfig {
        kind: config.kind,
        axis,
        axis_type: axis_column.column_type,
        legend: config.legend.clone(),
        values: config.values.clone(),
        aggregations,
        headers: config.headers.clone(),
    })
}

fn find_column<'a>(columns: &'a [ColumnInfo], key: &str) -> Result<&'a ColumnInfo, ResolveError> {
    columns
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| ResolveError::UnknownField(key.to_string()))
}
