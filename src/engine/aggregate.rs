/// Cross-source averaging and raw summary statistics
use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::models::{InterpolatedPoint, SensorAddress, SeriesPoint};
use crate::utils::{epoch_millis, round2};

/// Average the per-source grids into one chart series.
///
/// At each grid point the non-null samples across sources are averaged and
/// rounded to two decimals. Points where every source is null are omitted
/// entirely, so the series may be shorter than the grid. Sources are
/// visited in address order, keeping reruns bit-identical.
pub fn aggregate(
    per_source: &BTreeMap<SensorAddress, Vec<InterpolatedPoint>>,
    grid: &[OffsetDateTime],
) -> Vec<SeriesPoint> {
    let mut series = Vec::with_capacity(grid.len());

    for (index, timestamp) in grid.iter().enumerate() {
        let mut sum = 0.0;
        let mut count = 0usize;
        for points in per_source.values() {
            if let Some(value) = points.get(index).and_then(|point| point.value) {
                sum += value;
                count += 1;
            }
        }
        if count > 0 {
            series.push(SeriesPoint(
                epoch_millis(timestamp),
                round2(sum / count as f64),
            ));
        }
    }

    series
}

/// Min/max/average/count over one metric's flat raw values.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub count: usize,
}

/// Summary statistics over the raw values, before any gridding. `None` for
/// an empty stream.
pub fn summarize<I>(values: I) -> Option<RawStats>
where
    I: IntoIterator<Item = f64>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in values {
        min = min.min(value);
        max = max.max(value);
        sum += value;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(RawStats {
        min,
        max,
        average: round2(sum / count as f64),
        count,
    })
}
