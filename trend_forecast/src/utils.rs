//! Utility functions for the trend_forecast crate

use chrono::{DateTime, Duration, Utc};

/// Parsing and rendering of the fixed `YYYY-MM-DD HH:MM:SS UTC` timestamp pattern
pub mod date_parser {
    use crate::error::{ForecastError, Result};
    use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

    /// chrono pattern for timestamps in input and output tables
    pub const UTC_PATTERN: &str = "%Y-%m-%d %H:%M:%S UTC";

    const NAIVE_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
    const DATE_PATTERN: &str = "%Y-%m-%d";

    /// Parse a timestamp in the fixed `YYYY-MM-DD HH:MM:SS UTC` pattern
    pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
        let naive = NaiveDateTime::parse_from_str(raw.trim(), UTC_PATTERN).map_err(|e| {
            ForecastError::ParseError(format!(
                "'{}' is not a 'YYYY-MM-DD HH:MM:SS UTC' timestamp: {}",
                raw, e
            ))
        })?;
        Ok(Utc.from_utc_datetime(&naive))
    }

    /// Parse a user-supplied date
    ///
    /// Accepts the fixed UTC pattern, the same without the designator, or a
    /// bare `YYYY-MM-DD` (midnight UTC).
    pub fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
        let trimmed = raw.trim();
        if let Ok(parsed) = parse_utc(trimmed) {
            return Ok(parsed);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, NAIVE_PATTERN) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
        if let Some(naive) = NaiveDate::parse_from_str(trimmed, DATE_PATTERN)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(Utc.from_utc_datetime(&naive));
        }

        Err(ForecastError::ParseError(format!(
            "Unrecognised date '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS UTC",
            raw
        )))
    }

    /// Render a timestamp in the fixed UTC pattern
    pub fn format_utc(timestamp: &DateTime<Utc>) -> String {
        timestamp.format(UTC_PATTERN).to_string()
    }

    /// serde adapter for `DateTime<Utc>` fields stored in the fixed pattern
    pub mod serde_utc {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            timestamp: &DateTime<Utc>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            serializer.serialize_str(&super::format_utc(timestamp))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<DateTime<Utc>, D::Error> {
            let raw = String::deserialize(deserializer)?;
            super::parse_date(&raw).map_err(serde::de::Error::custom)
        }
    }
}

/// Daily timestamps strictly after `last`, up to and including `end`
///
/// Each step is `last + k days`, so the time of day of `last` carries over.
/// An `end` earlier than `last + 1 day` yields an empty range.
pub fn daily_range_after(last: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let step = Duration::days(1);
    let mut timestamps = Vec::new();
    let mut current = last;

    while let Some(next) = current.checked_add_signed(step) {
        if next > end {
            break;
        }
        timestamps.push(next);
        current = next;
    }

    timestamps
}
