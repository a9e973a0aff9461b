use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Fixed-width UTC text (`2024-01-01T10:00:00.000000000Z`) so that SQL text ordering matches
/// chronological ordering.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value).with_context(|| format!("failed to parse {field} '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_datetimes_sort_chronologically() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let fractional = whole + chrono::TimeDelta::microseconds(1);
        assert!(format_datetime(&whole) < format_datetime(&fractional));
        assert_eq!(format_datetime(&whole), "2024-01-01T10:00:00.000000000Z");
    }

    #[test]
    fn datetime_round_trips_with_nanoseconds() {
        let value = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let parsed = parse_datetime(&format_datetime(&value), "started_at").unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn bad_uuid_names_the_field() {
        let err = parse_uuid("nope", "run_id").unwrap_err();
        assert!(err.to_string().contains("run_id"));
    }
}
