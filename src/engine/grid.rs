/// Target-timestamp grid construction for resampling
use time::{Duration, OffsetDateTime};

use crate::errors::InvalidIntervalError;

/// Grid spacing used when the caller supplies none, or an unusable one.
pub const DEFAULT_INTERVAL_MINUTES: i64 = 30;

/// Largest selectable grid spacing: one full day.
pub const MAX_INTERVAL_MINUTES: i64 = 1440;

/// Clamp a caller-supplied smoothing interval into the supported range.
///
/// Non-positive values fall back to the default; values beyond one day are
/// capped at one day. Out-of-range requests are not an error for the caller.
pub fn clamp_interval(requested: i64) -> i64 {
    if requested <= 0 {
        DEFAULT_INTERVAL_MINUTES
    } else if requested > MAX_INTERVAL_MINUTES {
        MAX_INTERVAL_MINUTES
    } else {
        requested
    }
}

/// Build the uniform target grid spanning the observed data range.
///
/// The start is floor-aligned to the interval (minute of hour rounded down
/// to a multiple of `interval_minutes`, seconds and sub-seconds zeroed) and
/// the first emitted point sits one full interval after that floor, even
/// when `earliest` is already aligned; the consuming charts were built
/// against this placement. Points are then emitted every `interval_minutes`
/// while they stay `<= latest`; the grid never extends past the observed
/// bounds. `earliest > latest` yields an empty grid.
pub fn build_grid(
    earliest: OffsetDateTime,
    latest: OffsetDateTime,
    interval_minutes: i64,
) -> Result<Vec<OffsetDateTime>, InvalidIntervalError> {
    if interval_minutes <= 0 {
        return Err(InvalidIntervalError(interval_minutes));
    }
    if earliest > latest {
        return Ok(Vec::new());
    }

    let overshoot = i64::from(earliest.minute()) % interval_minutes;
    let floored = earliest
        - Duration::minutes(overshoot)
        - Duration::seconds(i64::from(earliest.second()))
        - Duration::nanoseconds(i64::from(earliest.nanosecond()));

    let step = Duration::minutes(interval_minutes);
    let mut grid = Vec::new();
    let mut current = floored + step;
    while current <= latest {
        grid.push(current);
        current += step;
    }

    Ok(grid)
}
