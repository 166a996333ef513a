use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses a point in time. ISO dates (`2024-05-01`, `2024-05-01 09:00`) are read
/// exactly; anything else goes through chrono-english ("tomorrow", "next friday").
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    match input.to_ascii_lowercase().as_str() {
        "now" => return Ok(Utc::now()),
        "today" => return Ok(Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()),
        _ => {}
    }
    if let Ok(at) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(at.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    parse_date_string(input, Utc::now(), Dialect::Us)
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a calendar day used as a listing reference.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    parse_datetime(input).map(|at| at.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_iso_date_is_midnight_utc() {
        assert_eq!(
            parse_datetime("2022-11-19").unwrap(),
            Utc.with_ymd_and_hms(2022, 11, 19, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_iso_date_with_time() {
        assert_eq!(
            parse_datetime(" 2022-11-19 09:30 ").unwrap(),
            Utc.with_ymd_and_hms(2022, 11, 19, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_relative_dates() {
        let today = Utc::now().date_naive();
        assert_eq!(parse_date("tomorrow").unwrap(), today + Duration::days(1));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_datetime("not a date at all").is_err());
    }
}
