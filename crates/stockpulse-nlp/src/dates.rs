//! Source date parsing.

use chrono::{NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

const SOURCE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `day/month/year` string into a calendar date.
///
/// Day and month may be one or two digits. Surrounding whitespace is ignored;
/// anything else after the year is rejected.
#[must_use]
pub fn parse_day_month_year(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, SOURCE_DATE_FORMAT).ok()
}

/// Convert a `day/month/year` source date to an ISO-8601 timestamp at UTC
/// midnight, e.g. `"15/03/2024"` becomes `"2024-03-15T00:00:00+00:00"`.
///
/// Returns `None` and logs a warning when the input does not match.
#[must_use]
pub fn parse_date(raw: &str) -> Option<String> {
    let Some(date) = parse_day_month_year(raw) else {
        tracing::warn!(raw, "could not parse date, expected day/month/year");
        return None;
    };
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    Some(midnight.to_rfc3339_opts(SecondsFormat::Secs, false))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_to_utc_midnight() {
        assert_eq!(
            parse_date("15/03/2024").as_deref(),
            Some("2024-03-15T00:00:00+00:00")
        );
    }

    #[test]
    fn accepts_unpadded_day_and_month() {
        assert_eq!(
            parse_date("5/3/2024").as_deref(),
            Some("2024-03-05T00:00:00+00:00")
        );
    }

    #[test]
    fn date_component_matches_input_for_every_day_of_a_leap_year() {
        let mut day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while day.year() == 2024 {
            let raw = format!("{:02}/{:02}/{}", day.day(), day.month(), day.year());
            let parsed = parse_date(&raw).expect("valid date must parse");
            let ts = DateTime::parse_from_rfc3339(&parsed).unwrap();
            assert_eq!(ts.date_naive(), day, "input {raw}");
            assert_eq!(ts.offset().local_minus_utc(), 0);
            assert_eq!((ts.hour(), ts.minute(), ts.second()), (0, 0, 0));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn malformed_inputs_are_absent() {
        for raw in [
            "",
            "   ",
            "2024-03-15",
            "15-03-2024",
            "31/02/2024",
            "15/13/2024",
            "15/03",
            "15/03/2024 10:00",
            "hôm qua",
            "//",
        ] {
            assert!(parse_date(raw).is_none(), "expected None for {raw:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(
            parse_day_month_year(" 01/12/2023 \n"),
            NaiveDate::from_ymd_opt(2023, 12, 1)
        );
    }
}
