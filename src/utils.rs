/// Utility functions for timestamps and formatting
use time::macros::format_description;
use time::OffsetDateTime;

/// Format a timestamp for human-readable logging
///
/// Converts an OffsetDateTime to DD.MM.YYYY - HH:MM:SS format
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &OffsetDateTime) -> String {
    let format = format_description!("[day].[month].[year] - [hour]:[minute]:[second]");
    dt.format(format).unwrap_or_else(|_| dt.to_string())
}

/// Milliseconds since the Unix epoch, used as the image cache-busting value
pub fn epoch_millis(dt: &OffsetDateTime) -> i64 {
    (dt.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn now_millis() -> i64 {
    epoch_millis(&OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_format_datetime() {
        let dt = datetime!(2024-03-05 07:08:09 UTC);
        assert_eq!(format_datetime(&dt), "05.03.2024 - 07:08:09");
    }

    #[test]
    fn test_epoch_millis() {
        assert_eq!(epoch_millis(&OffsetDateTime::UNIX_EPOCH), 0);
        let dt = datetime!(2001-09-09 01:46:40.123 UTC);
        assert_eq!(epoch_millis(&dt), 1_000_000_000_123);
    }
}
