/// Per-source gap filling onto the target grid
use time::OffsetDateTime;

use crate::models::{InterpolatedPoint, Reading};
use crate::utils::round2;

/// Resample one sensor's readings onto the grid.
///
/// `readings` must be sorted by timestamp ascending, the order the store
/// returns them in. A single forward sweep tracks the neighbor pair around
/// each grid point: an exact timestamp hit takes the raw value as-is,
/// interior points interpolate linearly on a seconds ratio, and points
/// outside the observed range repeat the nearest known value instead of
/// extrapolating. A source with no readings yields `None` at every point.
pub fn interpolate(readings: &[Reading], grid: &[OffsetDateTime]) -> Vec<InterpolatedPoint> {
    let mut points = Vec::with_capacity(grid.len());
    // Index of the first reading at or after the current grid point; only
    // ever moves forward since the grid is increasing.
    let mut next = 0usize;

    for &target in grid {
        while next < readings.len() && readings[next].timestamp < target {
            next += 1;
        }

        let value = if next < readings.len() && readings[next].timestamp == target {
            Some(readings[next].value)
        } else {
            let before = next.checked_sub(1).map(|i| &readings[i]);
            let after = readings.get(next);
            match (before, after) {
                (Some(before), Some(after)) => Some(lerp(before, after, target)),
                (Some(before), None) => Some(before.value),
                (None, Some(after)) => Some(after.value),
                (None, None) => None,
            }
        };

        points.push(InterpolatedPoint {
            timestamp: target,
            value,
        });
    }

    points
}

/// Linear interpolation between two readings on a seconds-based ratio,
/// rounded to two decimals. Equal neighbor timestamps fall back to the
/// earlier value.
fn lerp(before: &Reading, after: &Reading, target: OffsetDateTime) -> f64 {
    let span = (after.timestamp - before.timestamp).whole_seconds();
    if span == 0 {
        return before.value;
    }
    let elapsed = (target - before.timestamp).whole_seconds();
    let ratio = elapsed as f64 / span as f64;
    round2(before.value + ratio * (after.value - before.value))
}
