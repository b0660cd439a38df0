use chrono::{DateTime, Local, Month, NaiveDate, NaiveDateTime, TimeZone, Weekday};

/// Parse a record timestamp into local time.
///
/// Accepts RFC 3339 (`2024-03-15T10:00:00+01:00`), a naive datetime which is
/// taken as local time, or a bare date which is taken as UTC midnight.
pub fn parse_record_date(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Local.from_local_datetime(&naive).earliest();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Local.from_local_datetime(&naive).earliest();
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().with_timezone(&Local))
}

/// English month name for a 1-based month number.
pub fn month_name(month: u32) -> Option<&'static str> {
    let month = u8::try_from(month).ok()?;
    Month::try_from(month).ok().map(|m| m.name())
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Utc};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_record_date("2024-04-10T12:00:00Z").unwrap();
        assert_eq!(
            dt.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_offset() {
        let dt = parse_record_date("2024-04-10T12:00:00+02:00").unwrap();
        assert_eq!(
            dt.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 4, 10, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_naive_datetime_is_local() {
        let dt = parse_record_date("2024-04-10T12:30:00").unwrap();
        assert_eq!(dt.day(), 10);
        assert_eq!(dt.month(), 4);
    }

    #[test]
    fn test_parse_bare_date_is_utc_midnight() {
        let dt = parse_record_date("2024-04-10").unwrap();
        assert_eq!(
            dt.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_record_date("").is_none());
        assert!(parse_record_date("yesterday").is_none());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), Some("January"));
        assert_eq!(month_name(4), Some("April"));
        assert_eq!(month_name(12), Some("December"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
        assert_eq!(weekday_name(Weekday::Wed), "Wednesday");
    }
}
