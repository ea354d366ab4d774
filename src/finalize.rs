use crate::profile::ColumnType;
use crate::series::ChartData;

/// Fixed rendering cap: categories past this point are silently dropped
/// after sorting.
pub const MAX_CATEGORIES: usize = 100;

/// Order categories by axis type, then truncate to the cap.
///
/// Date axes sort by the raw (pre-formatted) string form, which is only
/// correct while the representation is lexicographically monotonic
/// (YYYYMM-style); callers must not pre-format to display strings first.
/// Numeric axes sort ascending by value; text axes keep first-occurrence
/// order. Every series is sliced to stay aligned with the categories.
pub fn finalize(chart: ChartData, axis_type: ColumnType) -> ChartData {
    let ChartData { categories, series } = chart;

    let mut indices: Vec<usize> = (0..categories.len()).collect();
    match axis_type {
        ColumnType::Date => {
            indices.sort_by(|&a, &b| categories[a].cmp(&categories[b]));
        }
        ColumnType::Numeric => {
            indices.sort_by(|&a, &b| {
                let na = categories[a].parse::<f64>().unwrap_or(f64::INFINITY);
                let nb = categories[b].parse::<f64>().unwrap_or(f64::INFINITY);
                na.partial_cmp(&nb).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        ColumnType::Text => {}
    }
    indices.truncate(MAX_CATEGORIES);

    let categories = indices.iter().map(|&i| categories[i].clone()).collect();
    let series = series
        .into_iter()
        .map(|mut s| {
            s.data = indices
                .iter()
                .map(|&i| s.data.get(i).copied().unwrap_or(0.0))
                .collect();
            s
        })
        .collect();

    ChartData { categories, series }
}
