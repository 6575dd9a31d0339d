/// Utility functions for rounding and timestamp formatting
use time::{format_description, OffsetDateTime};

/// Round a value to two decimal places.
///
/// Interpolated samples, cross-source averages and summary averages all
/// carry at most two decimals on the wire.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Milliseconds since the Unix epoch, the timestamp unit of chart series.
pub fn epoch_millis(timestamp: &OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description::parse("[day].[month].[year] - [hour]:[minute]:[second]")
        .expect("Failed to create format description");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(21.3333), 21.33);
        assert_eq!(round2(21.336), 21.34);
        assert_eq!(round2(-3.456), -3.46);
        assert_eq!(round2(20.0), 20.0);
    }

    #[test]
    fn epoch_millis_matches_known_instant() {
        let ts = datetime!(2024-01-01 00:00:00.250 UTC);
        assert_eq!(epoch_millis(&ts), 1_704_067_200_250);
    }

    #[test]
    fn format_datetime_produces_expected_shape() {
        let ts = datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(format_datetime(&ts), "05.03.2024 - 07:08:09");
    }
}
