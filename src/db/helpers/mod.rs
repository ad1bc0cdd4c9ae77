use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;

/// Storage format for naive local timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn parse_datetime(value: &str, field: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn datetime_text_round_trip() {
        let value = NaiveDate::from_ymd_opt(2025, 1, 8)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap();
        let text = format_datetime(&value);
        assert_eq!(text, "2025-01-08T18:05:00");
        assert_eq!(parse_datetime(&text, "starts_at").unwrap(), value);
    }

    #[test]
    fn bad_values_name_the_field() {
        let err = parse_datetime("yesterday", "starts_at").unwrap_err();
        assert!(err.to_string().contains("starts_at"));
        assert!(to_u32(-5, "duration_minutes").is_err());
    }
}
