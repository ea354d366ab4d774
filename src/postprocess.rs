use crate::series::ChartData;

/// Chart-kind-specific transforms layered on top of the shared pipeline.
/// Horizontal-bar orientation is a render concern and has no data
/// transform, so percent stacking is the only member today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessor {
    PercentStack,
}

pub fn apply(chart: ChartData, processor: PostProcessor) -> ChartData {
    match processor {
        PostProcessor::PercentStack => percent_stack(chart),
    }
}

/// Convert absolute values to per-category percentages of the stack total.
/// Categories with a zero total stay at 0 rather than dividing by zero.
pub fn percent_stack(mut chart: ChartData) -> ChartData {
    let totals = chart.stack_totals();
    for series in &mut chart.series {
        for (i, value) in series.data.iter_mut().enumerate() {
            let total = totals.get(i).copied().unwrap_or(0.0);
            *value = if total == 0.0 {
                0.0
            } else {
                *value / total * 100.0
            };
        }
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::SeriesData;

    #[test]
    fn test_percent_stack() {
        let chart = ChartData {
            categories: vec!["a".to_string(), "b".to_string()],
            series: vec![
                SeriesData {
                    name: "s1".to_string(),
                    data: vec![25.0, 0.0],
                },
                SeriesData {
                    name: "s2".to_string(),
                    data: vec![75.0, 0.0],
                },
            ],
        };
        let out = apply(chart, PostProcessor::PercentStack);
        assert_eq!(out.series[0].data, vec![25.0, 0.0]);
        assert_eq!(out.series[1].data, vec![75.0, 0.0]);
    }

    #[test]
    fn test_percent_stack_columns_sum_to_hundred() {
        let chart = ChartData {
            categories: vec!["a".to_string()],
            series: vec![
                SeriesData {
                    name: "s1".to_string(),
                    data: vec![10.0],
                },
                SeriesData {
                    name: "s2".to_string(),
                    data: vec![30.0],
                },
            ],
        };
        let out = percent_stack(chart);
        let total: f64 = out.series.iter().map(|s| s.data[0]).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
