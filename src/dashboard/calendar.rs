//! Calendar windows used by the dashboard.
//!
//! All boundaries are computed in the offset carried by `now`.

use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, Timelike, Utc, Weekday};

/// Midnight at the start of `at`'s day.
pub fn start_of_day(at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    at - TimeDelta::seconds(i64::from(at.num_seconds_from_midnight()))
        - TimeDelta::nanoseconds(i64::from(at.nanosecond()))
}

/// Midnight of the Monday starting `at`'s week. Sunday belongs to the week
/// that started six days earlier.
pub fn start_of_week(at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let days_back = match at.weekday() {
        Weekday::Sun => 6,
        other => i64::from(other.num_days_from_monday()),
    };
    start_of_day(at) - TimeDelta::days(days_back)
}

pub fn is_same_day(instant: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
    instant.with_timezone(now.offset()).date_naive() == now.date_naive()
}

pub fn is_same_month(instant: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
    let local = instant.with_timezone(now.offset());
    local.year() == now.year() && local.month() == now.month()
}

/// `instant ∈ [start_of_week(now), start_of_week(now) + 7d)`.
pub fn is_in_week_of(instant: DateTime<Utc>, now: DateTime<FixedOffset>) -> bool {
    let start = start_of_week(now).with_timezone(&Utc);
    let end = start + TimeDelta::days(7);
    instant >= start && instant < end
}

/// 12-hour time of day in `now`'s offset, e.g. `3:07 PM`.
pub fn time_of_day(instant: DateTime<Utc>, now: DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(now.offset())
        .format("%-I:%M %p")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).unwrap()
    }

    fn utc(raw: &str) -> DateTime<Utc> {
        at(raw).with_timezone(&Utc)
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-05-15 is a Wednesday
        assert_eq!(
            start_of_week(at("2024-05-15T13:45:00+00:00")),
            at("2024-05-13T00:00:00+00:00")
        );
        // Monday maps to itself
        assert_eq!(
            start_of_week(at("2024-05-13T08:00:00+00:00")),
            at("2024-05-13T00:00:00+00:00")
        );
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        assert_eq!(
            start_of_week(at("2024-05-19T23:59:00+00:00")),
            at("2024-05-13T00:00:00+00:00")
        );
    }

    #[test]
    fn same_day_ignores_time_of_day() {
        let now = at("2024-05-15T09:00:00+00:00");
        assert!(is_same_day(utc("2024-05-15T00:00:00+00:00"), now));
        assert!(is_same_day(utc("2024-05-15T23:59:59+00:00"), now));
        assert!(!is_same_day(utc("2024-05-16T00:00:00+00:00"), now));
    }

    #[test]
    fn same_day_uses_the_offset_of_now() {
        let now = at("2024-05-15T09:00:00+03:00");
        // 22:30 UTC on the 14th is 01:30 on the 15th at +03:00
        assert!(is_same_day(utc("2024-05-14T22:30:00+00:00"), now));
    }

    #[test]
    fn week_window_is_half_open() {
        let now = at("2024-05-15T12:00:00+00:00");
        assert!(is_in_week_of(utc("2024-05-13T00:00:00+00:00"), now));
        assert!(is_in_week_of(utc("2024-05-19T23:59:59+00:00"), now));
        assert!(!is_in_week_of(utc("2024-05-20T00:00:00+00:00"), now));
        assert!(!is_in_week_of(utc("2024-05-12T23:59:59+00:00"), now));
    }

    #[test]
    fn month_and_time_of_day() {
        let now = at("2024-05-15T12:00:00+00:00");
        assert!(is_same_month(utc("2024-05-01T00:00:00+00:00"), now));
        assert!(!is_same_month(utc("2023-05-15T00:00:00+00:00"), now));
        assert_eq!(time_of_day(utc("2024-05-15T15:07:00+00:00"), now), "3:07 PM");
    }
}
