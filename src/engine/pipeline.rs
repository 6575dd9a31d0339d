/// Per-metric resampling pipeline
use std::collections::BTreeMap;

use log::debug;
use time::OffsetDateTime;

use crate::engine::aggregate::{aggregate, summarize};
use crate::engine::grid::{build_grid, clamp_interval};
use crate::engine::interpolate::interpolate;
use crate::errors::EngineError;
use crate::models::{InterpolatedPoint, Metric, MetricSummary, Reading, SensorAddress};
use crate::store::ReadingStore;

/// Run the full resampling pipeline for one metric of one room.
///
/// Fetches the raw readings for the attached sensors, computes the summary
/// statistics over the flat raw values, then resamples: grid over the
/// observed range, per-source interpolation, cross-source averaging.
///
/// Returns `Ok(None)` when nothing can be charted: no source produced a
/// reading, or the observed range is shorter than the first grid step. The
/// metric is then simply absent from the room result. Fetch failures
/// propagate untouched.
pub async fn run_metric<S: ReadingStore>(
    store: &S,
    metric: Metric,
    addresses: &[SensorAddress],
    since: Option<OffsetDateTime>,
    interval_minutes: i64,
) -> Result<Option<MetricSummary>, EngineError> {
    if addresses.is_empty() {
        return Ok(None);
    }

    let interval = clamp_interval(interval_minutes);
    let readings = store.fetch(metric, addresses, since).await?;
    if readings.is_empty() {
        debug!(
            "No {} readings across {} sensor(s)",
            metric,
            addresses.len()
        );
        return Ok(None);
    }

    let stats = match summarize(readings.iter().map(|reading| reading.value)) {
        Some(stats) => stats,
        None => return Ok(None),
    };

    // Grid over the global observed range, across every contributing source.
    let mut earliest = readings[0].timestamp;
    let mut latest = readings[0].timestamp;
    for reading in &readings {
        earliest = earliest.min(reading.timestamp);
        latest = latest.max(reading.timestamp);
    }
    let grid = build_grid(earliest, latest, interval)?;
    if grid.is_empty() {
        debug!(
            "Observed {} range shorter than one {} minute step, nothing to chart",
            metric, interval
        );
        return Ok(None);
    }

    let mut by_source: BTreeMap<SensorAddress, Vec<Reading>> = BTreeMap::new();
    for reading in readings {
        by_source
            .entry(reading.sensor_address.clone())
            .or_default()
            .push(reading);
    }

    let per_source: BTreeMap<SensorAddress, Vec<InterpolatedPoint>> = by_source
        .iter()
        .map(|(address, readings)| (address.clone(), interpolate(readings, &grid)))
        .collect();

    let series = aggregate(&per_source, &grid);

    Ok(Some(MetricSummary {
        min: stats.min,
        max: stats.max,
        average: stats.average,
        count: stats.count,
        series,
    }))
}
