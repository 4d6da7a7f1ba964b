use chrono::{DateTime, NaiveDate, Utc};

/// Dates and timestamps cross the data-service boundary as nanoseconds since the Unix epoch.
pub type Nanos = i64;

/// Convert a timestamp to epoch nanoseconds.
/// Returns `None` outside the representable range (roughly years 1677..2262).
pub fn to_nanos(timestamp: DateTime<Utc>) -> Option<Nanos> {
    timestamp.timestamp_nanos_opt()
}

pub fn from_nanos(nanos: Nanos) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(nanos)
}

/// Parse a `YYYY-MM-DD` date into midnight UTC.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
