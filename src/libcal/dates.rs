//! "Today" and "tomorrow" in the service's time zone.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The `start`/`end` pair sent to the grid endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// A one-day range beginning at `start`. `None` only at the end of the calendar.
    pub fn one_day(start: NaiveDate) -> Option<Self> {
        Some(Self {
            start,
            end: start.succ_opt()?,
        })
    }

    /// The range starting on the local date of `now` in `tz`.
    pub fn today(now: DateTime<Utc>, tz: Tz) -> Option<Self> {
        Self::one_day(now.with_timezone(&tz).date_naive())
    }
}

/// `now` rendered in `tz`, for diagnostics.
pub fn local_timestamp(now: DateTime<Utc>, tz: Tz) -> DateTime<FixedOffset> {
    now.with_timezone(&tz).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_is_the_next_calendar_day() {
        for start in [date(2024, 6, 1), date(2024, 2, 28), date(2023, 2, 28), date(2024, 12, 31)] {
            let range = DateRange::one_day(start).unwrap();
            assert_eq!(range.start, start);
            assert_eq!(range.end, start.succ_opt().unwrap());
        }
        assert_eq!(DateRange::one_day(date(2024, 2, 28)).unwrap().end, date(2024, 2, 29));
        assert_eq!(DateRange::one_day(date(2024, 12, 31)).unwrap().end, date(2025, 1, 1));
        assert!(DateRange::one_day(NaiveDate::MAX).is_none());
    }

    #[test]
    fn today_follows_the_configured_zone() {
        // 02:30 UTC on June 2nd is still June 1st in New York.
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 2, 30, 0).unwrap();
        let range = DateRange::today(now, chrono_tz::America::New_York).unwrap();
        assert_eq!(range, DateRange { start: date(2024, 6, 1), end: date(2024, 6, 2) });

        let range = DateRange::today(now, chrono_tz::UTC).unwrap();
        assert_eq!(range.start, date(2024, 6, 2));
    }

    #[test]
    fn serializes_as_iso_dates() {
        let range = DateRange::one_day(date(2024, 6, 1)).unwrap();
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            serde_json::json!({ "start": "2024-06-01", "end": "2024-06-02" })
        );
    }

    #[test]
    fn local_timestamp_carries_the_offset() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let local = local_timestamp(now, chrono_tz::America::New_York);
        assert_eq!(local.to_rfc3339(), "2024-01-15T07:00:00-05:00");
    }
}
