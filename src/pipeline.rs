use thiserror::Error;

use crate::aggregate::aggregate;
use crate::config::{ChartConfig, ChartKind};
use crate::filter::apply_filters;
use crate::finalize::finalize;
use crate::postprocess::percent_stack;
use crate::profile::profile_columns;
use crate::record::Record;
use crate::resolve::{resolve_config, ResolveError};
use crate::series::{materialize, ChartData};

#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Run the full pipeline: profile -> resolve -> filter -> aggregate ->
/// materialize -> finalize.
///
/// Pure and idempotent for a fixed `(records, config)` pair; every
/// invocation recomputes from scratch. Without an axis field there is
/// nothing to chart, so the result is empty rather than an error. An empty
/// result after filtering also propagates as empty output (the renderer's
/// "no data" state).
pub fn run(records: &[Record], config: &ChartConfig) -> Result<ChartData, PipelineError> {
    if config.axis.is_none() {
        return Ok(ChartData::default());
    }

    let columns = profile_columns(records, &config.headers);
    let resolved = resolve_config(config, &columns)?;

    let filtered = apply_filters(records, &config.filters);
    log::debug!(
        "filtered {} of {} records for axis '{}'",
        filtered.len(),
        records.len(),
        resolved.axis
    );

    let groups = aggregate(
        &filtered,
        &resolved.axis,
        resolved.legend.as_deref(),
        &resolved.values,
        &resolved.aggregations,
    );
    log::debug!("aggregated into {} groups", groups.len());

    let chart = materialize(
        &groups,
        &resolved.values,
        resolved.legend.as_deref(),
        &resolved.aggregations,
        &resolved.headers,
    );
    let chart = finalize(chart, resolved.axis_type);

    let chart = match resolved.kind {
        ChartKind::PercentStackedBar => percent_stack(chart),
        _ => chart,
    };

    Ok(chart)
}
